//! Request and response validation.
//!
//! `input` bounds the scenario before anything else runs; `response` checks
//! the generated payload against the output contract the prompts document.

pub mod input;
pub mod response;

pub use input::{InputError, InputValidator};
pub use response::ValidationReport;
