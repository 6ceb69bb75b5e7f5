//! Convolutional text classification over tab-separated `label<TAB>text` files.
//!
//! The crate is split into layers:
//!
//! - [`domain`]      plain types and the seams other layers implement
//! - [`data`]        fields, vocabularies, bucketed batch iteration
//! - [`ml`]          the CNN classifier, training loop and inference
//! - [`infra`]       checkpoints, vocabulary persistence, metrics
//! - [`application`] train / classify orchestration used by the binary

#![recursion_limit = "256"]

pub mod application;
pub mod data;
pub mod domain;
pub mod error;
pub mod infra;
pub mod ml;

pub use error::{Error, Result};
