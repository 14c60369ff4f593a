//! Language registry: Single source of truth for all supported languages.
//!
//! The registry is built once on first access (`OnceLock`) and is read-only
//! afterwards. Entry order is the order reported by `--list-languages`.

use serde::Serialize;
use std::sync::OnceLock;

/// Code of the English language, the pivot for model category resolution.
pub const ENGLISH_CODE: &str = "eng_Latn";

/// A supported language: its code and English display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageConfig {
    /// Language tag plus script tag (e.g., "hin_Deva", "kas_Arab")
    pub code: &'static str,

    /// English display name (e.g., "Hindi", "Kashmiri (Arabic)")
    pub name: &'static str,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its exact code.
    ///
    /// Matching is case-sensitive; `"HIN_DEVA"` is not `"hin_Deva"`.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Display name for a code, or the code itself when it is not registered.
    pub fn display_name<'a>(&self, code: &'a str) -> &'a str {
        match self.get_by_code(code) {
            Some(config) => config.name,
            None => code,
        }
    }

    /// All languages, in registry order.
    pub fn list_all(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// Check if a language code is registered.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    const LANGUAGES: [(&str, &str); 26] = [
        ("asm_Beng", "Assamese"),
        ("ben_Beng", "Bengali"),
        ("brx_Deva", "Bodo"),
        ("doi_Deva", "Dogri"),
        (ENGLISH_CODE, "English"),
        ("gom_Deva", "Konkani"),
        ("guj_Gujr", "Gujarati"),
        ("hin_Deva", "Hindi"),
        ("kan_Knda", "Kannada"),
        ("kas_Arab", "Kashmiri (Arabic)"),
        ("kas_Deva", "Kashmiri (Devanagari)"),
        ("mai_Deva", "Maithili"),
        ("mal_Mlym", "Malayalam"),
        ("mar_Deva", "Marathi"),
        ("mni_Beng", "Manipuri (Bengali)"),
        ("mni_Mtei", "Manipuri (Meitei)"),
        ("npi_Deva", "Nepali"),
        ("ory_Orya", "Odia"),
        ("pan_Guru", "Punjabi"),
        ("san_Deva", "Sanskrit"),
        ("sat_Olck", "Santali"),
        ("snd_Arab", "Sindhi (Arabic)"),
        ("snd_Deva", "Sindhi (Devanagari)"),
        ("tam_Taml", "Tamil"),
        ("tel_Telu", "Telugu"),
        ("urd_Arab", "Urdu"),
    ];

    LANGUAGES
        .iter()
        .map(|&(code, name)| LanguageConfig { code, name })
        .collect()
}
