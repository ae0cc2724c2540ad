use crate::parser::VarType;
use crate::utils::upper_first_letter;

/// Map a resolved `VarType` to its Go type spelling.
#[must_use]
pub fn go_type(ty: &VarType) -> String {
    match ty {
        VarType::Bool => "bool".to_string(),
        VarType::Byte { unsigned } => if *unsigned { "uint8" } else { "int8" }.to_string(),
        VarType::Short { unsigned } => if *unsigned { "uint16" } else { "int16" }.to_string(),
        VarType::Int { unsigned } => if *unsigned { "uint32" } else { "int32" }.to_string(),
        VarType::Long => "int64".to_string(),
        VarType::Float => "float32".to_string(),
        VarType::Double => "float64".to_string(),
        VarType::String => "string".to_string(),
        VarType::Vector(elem) => format!("[]{}", go_type(elem)),
        VarType::Map(key, value) => format!("map[{}]{}", go_type(key), go_type(value)),
        VarType::Array(elem, length) => format!("[{length}]{}", go_type(elem)),
        VarType::Named(named) => {
            // base::request -> base.Request; the last segment is a type name
            let parts: Vec<&str> = named.name.split("::").collect();
            let mut out = Vec::with_capacity(parts.len());
            for (i, part) in parts.iter().enumerate() {
                if i == parts.len() - 1 {
                    out.push(upper_first_letter(part));
                } else {
                    out.push((*part).to_string());
                }
            }
            out.join(".")
        }
    }
}

/// Suffix of the codec runtime call for a primitive type:
/// `int32` reads via `ReadInt32`, writes via `WriteInt32`, and so on.
#[must_use]
pub fn codec_suffix(ty: &VarType) -> String {
    upper_first_letter(&go_type(ty))
}
