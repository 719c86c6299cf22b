pub mod codec;
pub mod context;
pub mod emitters;
pub mod generator;
pub mod templates;

pub use generator::TypeScriptGenerator;
