pub mod auth_headers;
pub mod definition_normalizer;
pub mod name_normalizer;
pub mod operation_parser;
pub mod scope;
pub mod spec_to_ir;

pub use spec_to_ir::{transform, transform_bundle, transform_with_fragments};
