//! Validation and conversion of untrusted outlines.
//!
//! Outline payloads arrive from the external generator or from user-pasted
//! structured text. [`validate()`] is the gate: it checks the raw value
//! against the outline shape (and, for constrained projects, the depth
//! limit) and either produces [`crate::models::OutlineNode`]s or rejects the
//! whole payload with a reproducible reason. [`convert()`] then turns a
//! validated outline into a fresh section forest.

mod convert;
mod validate;

pub use convert::{convert, default_prompt};
pub use validate::{validate, OutlineError};
