use thiserror::Error;

/// Code generation error types.
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("enum {enum_name}: '{referent}' not defined before use by '{member}'")]
    EnumForwardReference {
        enum_name: String,
        member: String,
        referent: String,
    },
}
