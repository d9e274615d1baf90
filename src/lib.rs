//! Promo image studio - generates AI image variations for promotional use
//!
//! Dispatches mode-shaped generation requests (edit, generate, text
//! extraction, combined product cleanup) to a remote multimodal model and
//! normalizes the heterogeneous reply shapes into uniform image variations.

pub mod api;
pub mod app;
pub mod compose;
pub mod error;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod provider;

pub use error::{Error, Result};
