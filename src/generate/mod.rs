//! Boundary to the external text generator.
//!
//! The generator is an HTTP service that proposes document outlines and
//! drafts section content. Everything it returns is untrusted: outline
//! payloads go through [`crate::outline::validate()`] before touching a
//! project, and content strings are stored verbatim without interpretation.

mod client;

pub use client::{ContentRequest, GeneratorClient, OutlineRequest};

use thiserror::Error;

/// Generator boundary errors.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generator request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generator returned an error: {0}")]
    Upstream(String),

    #[error("generator response had no usable payload")]
    EmptyResponse,
}
