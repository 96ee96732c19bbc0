//! Stop-word language detection.
//!
//! Every supported language has a short list of very common words. The
//! language with the most hits wins; ties, no hits and unsupported
//! languages fall back to the configured default.

use crate::utils::toml_config::ChatConfig;

const STOP_WORDS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "is", "are", "you", "what", "how", "do", "i", "to", "of", "in", "for",
            "can", "my", "your", "with", "this", "that", "hello", "hi", "please", "want",
        ],
    ),
    (
        "es",
        &[
            "el", "la", "los", "las", "y", "es", "son", "que", "qué", "cómo", "como", "de", "en",
            "para", "por", "un", "una", "hola", "quiero", "cursos", "gracias", "mi", "tu",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "les", "et", "est", "sont", "que", "quoi", "comment", "de", "des", "en",
            "pour", "un", "une", "bonjour", "je", "vous", "merci", "mon", "cours", "avec",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "ist", "sind", "was", "wie", "ich", "zu", "von", "mit",
            "für", "ein", "eine", "hallo", "bitte", "danke", "mein", "kurse", "nicht", "sie",
        ],
    ),
];

#[derive(Debug, Clone)]
pub struct LanguageDetector {
    enabled: bool,
    supported: Vec<String>,
    default_language: String,
}

impl LanguageDetector {
    pub fn new(enabled: bool, supported: Vec<String>, default_language: impl Into<String>) -> Self {
        Self {
            enabled,
            supported,
            default_language: default_language.into(),
        }
    }

    pub fn from_config(chat: &ChatConfig) -> Self {
        Self::new(
            chat.enable_language_detection,
            chat.supported_languages.clone(),
            chat.default_language.clone(),
        )
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Best-guess language code for `text`.
    pub fn detect(&self, text: &str) -> String {
        if !self.enabled {
            return self.default_language.clone();
        }

        let words: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();

        let mut best: Option<(&str, usize)> = None;
        let mut tied = false;
        for (code, stop_words) in STOP_WORDS {
            if !self.supported.iter().any(|s| s == code) {
                continue;
            }
            let hits = words
                .iter()
                .filter(|w| stop_words.contains(&w.as_str()))
                .count();
            if hits == 0 {
                continue;
            }
            match best {
                Some((_, top)) if hits < top => {}
                Some((_, top)) if hits == top => tied = true,
                _ => {
                    best = Some((*code, hits));
                    tied = false;
                }
            }
        }

        match best {
            Some((code, _)) if !tied => code.to_string(),
            _ => self.default_language.clone(),
        }
    }
}
