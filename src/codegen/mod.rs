pub mod driver;
pub mod errors;
pub mod format;
pub mod generator;
pub mod types;

pub use driver::*;
pub use errors::*;
pub use format::*;
pub use generator::*;
pub use types::*;
