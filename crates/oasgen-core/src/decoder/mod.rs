//! Response-decoder planning.
//!
//! A [`DecoderPlan`] is the target-independent decoder table of one
//! operation. Renderers emit code from it; [`ComposedDecoder`] evaluates it
//! against JSON payloads.

mod plan;
mod runtime;

pub use plan::{DecoderEntry, DecoderOverride, DecoderPlan, DecoderStrategy, DefaultTypes};
pub use runtime::{ComposedDecoder, Decoded};
