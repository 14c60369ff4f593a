//! Library crate for indic-translate.
//!
//! Exposes the language registry, the model router, the translation provider
//! and the model store so the `indic-translate` CLI, the demo binary and the
//! integration tests share one implementation.

pub mod config;
pub mod i18n;
pub mod inference;
pub mod models;
pub mod retry;
pub mod router;
pub mod translation;
