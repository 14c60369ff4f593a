//! Language metadata for the IndicTrans2 language set.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for the 26 supported language codes
//!   and their display names
//! - `strings`: Native-script sentences used by placeholder translations
//!
//! Language codes are opaque strings such as `hin_Deva` (language tag plus
//! script tag). Nothing here validates or normalizes them: an unknown code is
//! simply absent from the registry and callers fall back to the raw code.
//!
//! # Example
//!
//! ```rust,ignore
//! use indic_translate::i18n::LanguageRegistry;
//!
//! let registry = LanguageRegistry::get();
//! assert_eq!(registry.display_name("hin_Deva"), "Hindi");
//! assert_eq!(registry.display_name("xyz_Latn"), "xyz_Latn");
//! ```

mod registry;
mod strings;

pub use registry::{LanguageConfig, LanguageRegistry, ENGLISH_CODE};
pub use strings::native_sample;
