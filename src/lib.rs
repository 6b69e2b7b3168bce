//! Draftsmith: a local studio server for AI-assisted outline documents.
//!
//! A project is a tree of named sections, each independently promptable,
//! generatable, and editable. The library is organized around that tree:
//!
//! - [`models`]: domain types (projects, sections, outlines)
//! - [`tree`]: pure structural operations over the section tree
//! - [`outline`]: validation and conversion of untrusted outlines
//! - [`history`]: bounded, deduplicated undo history
//! - [`editor`]: the editing engine tying tree, history and store together
//! - [`store`]: the device-local persisted project store
//! - [`generate`]: the boundary to the external text generator
//! - [`api`]: the HTTP surface consumed by editor clients

pub mod api;
pub mod editor;
pub mod generate;
pub mod history;
pub mod models;
pub mod outline;
pub mod store;
pub mod tree;
