pub mod definition;
pub mod operations;
pub mod types;

pub use definition::*;
pub use operations::*;
pub use types::{Diagnostic, IrSpec, NormalizedName, SpecMetaInfo};
