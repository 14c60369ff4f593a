use crate::i18n::ENGLISH_CODE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an IndicTrans2 model.
///
/// Each category is a separate model checkpoint with its own directory under
/// the models root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelCategory {
    #[serde(rename = "en-indic")]
    EnglishToIndic,
    #[serde(rename = "indic-en")]
    IndicToEnglish,
    #[serde(rename = "indic-indic")]
    IndicToIndic,
}

impl ModelCategory {
    pub const ALL: [ModelCategory; 3] = [
        ModelCategory::EnglishToIndic,
        ModelCategory::IndicToEnglish,
        ModelCategory::IndicToIndic,
    ];

    /// Directory name of the model under the models root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ModelCategory::EnglishToIndic => "en-indic",
            ModelCategory::IndicToEnglish => "indic-en",
            ModelCategory::IndicToIndic => "indic-indic",
        }
    }

    /// Hugging Face repository hosting the model checkpoint.
    pub fn repo_name(&self) -> &'static str {
        match self {
            ModelCategory::EnglishToIndic => "indictrans2-en-indic-1B",
            ModelCategory::IndicToEnglish => "indictrans2-indic-en-1B",
            ModelCategory::IndicToIndic => "indictrans2-indic-indic-1B",
        }
    }

    /// Whether the model expects a `>>tgt<<` tag in front of the input.
    ///
    /// The Indic-to-English model only ever produces English, so it takes
    /// untagged input.
    pub fn needs_target_tag(&self) -> bool {
        !matches!(self, ModelCategory::IndicToEnglish)
    }
}

impl fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Pick the model category for a language pair.
///
/// Codes are compared by exact string equality. Anything that is neither
/// English-to-X nor X-to-English lands in `IndicToIndic`, including
/// English-to-English and unrecognized codes.
pub fn resolve(source_code: &str, target_code: &str) -> ModelCategory {
    let source_is_english = source_code == ENGLISH_CODE;
    let target_is_english = target_code == ENGLISH_CODE;

    if source_is_english && !target_is_english {
        ModelCategory::EnglishToIndic
    } else if !source_is_english && target_is_english {
        ModelCategory::IndicToEnglish
    } else {
        ModelCategory::IndicToIndic
    }
}
