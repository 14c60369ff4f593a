use crate::i18n::{native_sample, LanguageRegistry, ENGLISH_CODE};
use crate::inference::InferenceEngine;
use crate::models::ModelStore;
use crate::router::{resolve, ModelCategory};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Number of input characters echoed in a placeholder translation.
pub const PLACEHOLDER_PREVIEW_CHARS: usize = 100;

/// How a request should be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationMode {
    /// Run the installed IndicTrans2 model through the inference engine
    ModelBacked,
    /// Produce a deterministic stand-in string, no model involved
    Placeholder,
}

/// A single translation call.
#[derive(Debug, Clone, Copy)]
pub struct TranslationRequest<'a> {
    pub text: &'a str,
    pub source_code: &'a str,
    pub target_code: &'a str,
    pub mode: TranslationMode,
}

impl<'a> TranslationRequest<'a> {
    /// English source, model-backed mode.
    pub fn new(text: &'a str, target_code: &'a str) -> Self {
        Self {
            text,
            source_code: ENGLISH_CODE,
            target_code,
            mode: TranslationMode::ModelBacked,
        }
    }

    pub fn with_source(mut self, source_code: &'a str) -> Self {
        self.source_code = source_code;
        self
    }

    pub fn with_mode(mut self, mode: TranslationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Why a model-backed translation produced no text.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("no translation models installed in {}", models_dir.display())]
    ModelUnavailable { models_dir: PathBuf },

    #[error("{0}")]
    Inference(String),
}

/// Placeholder translation for `target_code`.
///
/// `"[<name> Translation] "`, then the native sample sentence and a space if
/// the language has one, then the first 100 characters of `text`, then `...`.
/// Unknown codes use the raw code as the name.
pub fn simulate(text: &str, target_code: &str) -> String {
    let name = LanguageRegistry::get().display_name(target_code);
    let preview: String = text.chars().take(PLACEHOLDER_PREVIEW_CHARS).collect();

    match native_sample(target_code) {
        Some(sentence) => format!("[{} Translation] {} {}...", name, sentence, preview),
        None => format!("[{} Translation] {}...", name, preview),
    }
}

/// Engine input for `category`: `>>tgt<< text` when the model needs a target
/// tag, the bare text otherwise.
pub fn prepare_input(category: ModelCategory, text: &str, target_code: &str) -> String {
    if category.needs_target_tag() {
        format!(">>{}<< {}", target_code, text)
    } else {
        text.to_string()
    }
}

/// Serves translation requests in either mode.
pub struct Translator<E> {
    store: ModelStore,
    engine: E,
}

impl<E: InferenceEngine> Translator<E> {
    pub fn new(store: ModelStore, engine: E) -> Self {
        Self { store, engine }
    }

    pub async fn translate(
        &self,
        request: &TranslationRequest<'_>,
    ) -> std::result::Result<String, TranslateError> {
        match request.mode {
            TranslationMode::Placeholder => {
                debug!("Placeholder translation to {}", request.target_code);
                Ok(simulate(request.text, request.target_code))
            }
            TranslationMode::ModelBacked => self.translate_with_model(request).await,
        }
    }

    async fn translate_with_model(
        &self,
        request: &TranslationRequest<'_>,
    ) -> std::result::Result<String, TranslateError> {
        let availability = self.store.availability();
        if !availability.available {
            warn!(
                "No translation models found in {}",
                self.store.models_dir().display()
            );
            return Err(TranslateError::ModelUnavailable {
                models_dir: self.store.models_dir().to_path_buf(),
            });
        }

        let category = resolve(request.source_code, request.target_code);
        if !availability.is_available(category) {
            let model_dir = self.store.model_dir(category);
            warn!("The {} model is missing or incomplete", category);
            return Err(TranslateError::Inference(format!(
                "Model directory not found or incomplete: {}",
                model_dir.display()
            )));
        }

        let input = prepare_input(category, request.text, request.target_code);
        info!(
            "Translating {} -> {} with {} model",
            request.source_code, request.target_code, category
        );

        self.engine
            .generate(category, &self.store.model_dir(category), &input)
            .await
            .map_err(|e| TranslateError::Inference(format!("{:#}", e)))
    }

    /// Translate a text file line by line.
    ///
    /// Lines are trimmed and blank lines dropped; each remaining line becomes
    /// one output line, in order. Returns the number of lines written.
    pub async fn translate_file(
        &self,
        input: &Path,
        output: &Path,
        source_code: &str,
        target_code: &str,
        mode: TranslationMode,
    ) -> Result<usize> {
        let content = tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read {}", input.display()))?;

        let mut translated = String::new();
        let mut count = 0;
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let request = TranslationRequest::new(line, target_code)
                .with_source(source_code)
                .with_mode(mode);
            let text = self
                .translate(&request)
                .await
                .with_context(|| format!("Failed to translate line {}", count + 1))?;
            translated.push_str(&text);
            translated.push('\n');
            count += 1;
        }

        tokio::fs::write(output, translated)
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;

        info!("Translation completed. Output written to {}", output.display());
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::REQUIRED_FILES;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Engine that records its calls and answers with a fixed reply.
    struct RecordingEngine {
        calls: Mutex<Vec<(ModelCategory, PathBuf, String)>>,
        reply: std::result::Result<String, String>,
    }

    impl RecordingEngine {
        fn replying(reply: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Ok(reply.to_string()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply: Err(message.to_string()),
            }
        }

        fn calls(&self) -> Vec<(ModelCategory, PathBuf, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InferenceEngine for RecordingEngine {
        async fn generate(
            &self,
            category: ModelCategory,
            model_dir: &Path,
            input: &str,
        ) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((category, model_dir.to_path_buf(), input.to_string()));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(anyhow::anyhow!(message.clone())),
            }
        }
    }

    fn install_all(dir: &TempDir) -> ModelStore {
        let store = ModelStore::new(dir.path());
        for category in ModelCategory::ALL {
            let model_dir = store.model_dir(category);
            std::fs::create_dir_all(&model_dir).unwrap();
            for file in REQUIRED_FILES {
                std::fs::write(model_dir.join(file), b"stub").unwrap();
            }
        }
        store
    }

    // ==================== simulate Tests ====================

    #[test]
    fn test_simulate_hindi() {
        assert_eq!(
            simulate("Hello world", "hin_Deva"),
            "[Hindi Translation] यह एक अनुवादित नोटिस है। Hello world..."
        );
    }

    #[test]
    fn test_simulate_urdu_truncates_to_100_chars() {
        let text = "x".repeat(150);
        assert_eq!(
            simulate(&text, "urd_Arab"),
            format!("[Urdu Translation] {}...", "x".repeat(100))
        );
    }

    #[test]
    fn test_simulate_native_sentences_follow_prefix() {
        for (code, name) in [
            ("hin_Deva", "Hindi"),
            ("tam_Taml", "Tamil"),
            ("ben_Beng", "Bengali"),
            ("mal_Mlym", "Malayalam"),
        ] {
            let sentence = native_sample(code).unwrap();
            let expected_start = format!("[{} Translation] {} ", name, sentence);
            assert!(simulate("notice", code).starts_with(&expected_start), "{code}");
        }
    }

    #[test]
    fn test_simulate_other_language_has_no_sentence() {
        assert_eq!(
            simulate("Privacy notice", "tel_Telu"),
            "[Telugu Translation] Privacy notice..."
        );
    }

    #[test]
    fn test_simulate_unknown_code_uses_raw_code() {
        assert_eq!(simulate("Hi", "xyz_Abcd"), "[xyz_Abcd Translation] Hi...");
    }

    #[test]
    fn test_simulate_empty_text() {
        assert_eq!(simulate("", "guj_Gujr"), "[Gujarati Translation] ...");
        assert_eq!(
            simulate("", "hin_Deva"),
            "[Hindi Translation] यह एक अनुवादित नोटिस है। ..."
        );
    }

    #[test]
    fn test_simulate_counts_characters_not_bytes() {
        let text = "अ".repeat(120);
        let result = simulate(&text, "mar_Deva");
        assert_eq!(result, format!("[Marathi Translation] {}...", "अ".repeat(100)));
    }

    #[test]
    fn test_simulate_exactly_100_chars_untouched() {
        let text = "y".repeat(100);
        assert_eq!(
            simulate(&text, "asm_Beng"),
            format!("[Assamese Translation] {}...", text)
        );
    }

    proptest! {
        #[test]
        fn prop_simulate_is_prefix_preview_ellipsis(text in ".{0,200}") {
            let preview: String = text.chars().take(100).collect();
            let result = simulate(&text, "kan_Knda");
            prop_assert_eq!(result, format!("[Kannada Translation] {}...", preview));
        }

        #[test]
        fn prop_simulate_is_deterministic(text in ".{0,50}", code in "[a-z]{3}_[A-Z][a-z]{3}") {
            prop_assert_eq!(simulate(&text, &code), simulate(&text, &code));
        }
    }

    // ==================== prepare_input Tests ====================

    #[test]
    fn test_prepare_input_tags_english_to_indic() {
        assert_eq!(
            prepare_input(ModelCategory::EnglishToIndic, "Hello", "hin_Deva"),
            ">>hin_Deva<< Hello"
        );
    }

    #[test]
    fn test_prepare_input_tags_indic_to_indic() {
        assert_eq!(
            prepare_input(ModelCategory::IndicToIndic, "वणक्कम", "tam_Taml"),
            ">>tam_Taml<< वणक्कम"
        );
    }

    #[test]
    fn test_prepare_input_leaves_indic_to_english_untouched() {
        assert_eq!(
            prepare_input(ModelCategory::IndicToEnglish, "नमस्ते", "eng_Latn"),
            "नमस्ते"
        );
    }

    // ==================== Translator Tests ====================

    #[tokio::test]
    async fn test_placeholder_mode_never_calls_engine() {
        let dir = TempDir::new().unwrap();
        let translator = Translator::new(install_all(&dir), RecordingEngine::replying("unused"));

        let request = TranslationRequest::new("Hello world", "hin_Deva")
            .with_mode(TranslationMode::Placeholder);
        let result = translator.translate(&request).await.unwrap();

        assert_eq!(result, simulate("Hello world", "hin_Deva"));
        assert!(translator.engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_model_mode_without_models_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let translator = Translator::new(
            ModelStore::new(dir.path().join("missing")),
            RecordingEngine::replying("unused"),
        );

        let err = translator
            .translate(&TranslationRequest::new("Hello", "hin_Deva"))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::ModelUnavailable { .. }));
        assert!(translator.engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_model_mode_with_empty_model_dirs_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());
        for category in ModelCategory::ALL {
            std::fs::create_dir_all(store.model_dir(category)).unwrap();
        }
        let translator = Translator::new(store, RecordingEngine::replying("unused"));

        let err = translator
            .translate(&TranslationRequest::new("Hello", "tam_Taml"))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::ModelUnavailable { .. }));
        assert!(translator.engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_model_mode_english_to_indic() {
        let dir = TempDir::new().unwrap();
        let store = install_all(&dir);
        let expected_dir = store.model_dir(ModelCategory::EnglishToIndic);
        let translator = Translator::new(store, RecordingEngine::replying("नमस्ते दुनिया"));

        let result = translator
            .translate(&TranslationRequest::new("Hello world", "hin_Deva"))
            .await
            .unwrap();

        assert_eq!(result, "नमस्ते दुनिया");
        assert_eq!(
            translator.engine.calls(),
            vec![(
                ModelCategory::EnglishToIndic,
                expected_dir,
                ">>hin_Deva<< Hello world".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_model_mode_indic_to_english_passes_text_unmodified() {
        let dir = TempDir::new().unwrap();
        let translator = Translator::new(install_all(&dir), RecordingEngine::replying("Hello"));

        translator
            .translate(&TranslationRequest::new("வணக்கம்", ENGLISH_CODE).with_source("tam_Taml"))
            .await
            .unwrap();

        let calls = translator.engine.calls();
        assert_eq!(calls[0].0, ModelCategory::IndicToEnglish);
        assert_eq!(calls[0].2, "வணக்கம்");
    }

    #[tokio::test]
    async fn test_model_mode_indic_to_indic() {
        let dir = TempDir::new().unwrap();
        let translator = Translator::new(install_all(&dir), RecordingEngine::replying("ok"));

        translator
            .translate(&TranslationRequest::new("வணக்கம்", "hin_Deva").with_source("tam_Taml"))
            .await
            .unwrap();

        let calls = translator.engine.calls();
        assert_eq!(calls[0].0, ModelCategory::IndicToIndic);
        assert_eq!(calls[0].2, ">>hin_Deva<< வணக்கம்");
    }

    #[tokio::test]
    async fn test_engine_failure_is_wrapped_as_inference_error() {
        let dir = TempDir::new().unwrap();
        let translator = Translator::new(install_all(&dir), RecordingEngine::failing("CUDA out of memory"));

        let err = translator
            .translate(&TranslationRequest::new("Hello", "hin_Deva"))
            .await
            .unwrap_err();

        match err {
            TranslateError::Inference(message) => assert!(message.contains("CUDA out of memory")),
            other => panic!("expected inference error, got {other:?}"),
        }
        // Not retried
        assert_eq!(translator.engine.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_model_mode_incomplete_category_is_inference_error() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());
        let installed = store.model_dir(ModelCategory::IndicToEnglish);
        std::fs::create_dir_all(&installed).unwrap();
        for file in REQUIRED_FILES {
            std::fs::write(installed.join(file), b"stub").unwrap();
        }
        // English-to-Indic exists but lacks its weights
        let partial = store.model_dir(ModelCategory::EnglishToIndic);
        std::fs::create_dir_all(&partial).unwrap();
        std::fs::write(partial.join("config.json"), b"{}").unwrap();
        let translator = Translator::new(store, RecordingEngine::replying("unused"));

        let err = translator
            .translate(&TranslationRequest::new("Hello", "hin_Deva"))
            .await
            .unwrap_err();

        match err {
            TranslateError::Inference(message) => {
                assert!(message.contains("Model directory not found or incomplete"));
                assert!(message.contains("en-indic"));
            }
            other => panic!("expected inference error, got {other:?}"),
        }
        assert!(translator.engine.calls().is_empty());
    }

    // ==================== translate_file Tests ====================

    #[tokio::test]
    async fn test_translate_file_drops_blank_lines_and_keeps_order() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input.txt");
        let output = dir.path().join("output.txt");
        std::fs::write(&input, "  First line  \n\n   \nSecond line\n").unwrap();

        let translator = Translator::new(
            ModelStore::new(dir.path().join("models")),
            RecordingEngine::replying("unused"),
        );
        let count = translator
            .translate_file(&input, &output, ENGLISH_CODE, "ben_Beng", TranslationMode::Placeholder)
            .await
            .unwrap();

        assert_eq!(count, 2);
        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            format!(
                "{}\n{}\n",
                simulate("First line", "ben_Beng"),
                simulate("Second line", "ben_Beng")
            )
        );
    }

    #[tokio::test]
    async fn test_translate_file_missing_input() {
        let dir = TempDir::new().unwrap();
        let translator = Translator::new(
            ModelStore::new(dir.path()),
            RecordingEngine::replying("unused"),
        );

        let err = translator
            .translate_file(
                &dir.path().join("absent.txt"),
                &dir.path().join("out.txt"),
                ENGLISH_CODE,
                "hin_Deva",
                TranslationMode::Placeholder,
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to read"));
    }

    #[tokio::test]
    async fn test_translate_file_model_unavailable_aborts() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input.txt");
        let output = dir.path().join("output.txt");
        std::fs::write(&input, "One\nTwo\n").unwrap();

        let translator = Translator::new(
            ModelStore::new(dir.path().join("models")),
            RecordingEngine::replying("unused"),
        );
        let err = translator
            .translate_file(&input, &output, ENGLISH_CODE, "hin_Deva", TranslationMode::ModelBacked)
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("no translation models installed"));
        assert!(!output.exists());
    }
}
