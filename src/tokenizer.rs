//! Word/sentence tokenizer capability map
//!
//! Tokenization is an external capability: the engine only needs
//! `word_tokenize` and `sent_tokenize` from whoever provides it. Language
//! dispatch is an explicit registry injected into the collector at
//! construction, with one designated fallback entry for languages the
//! registry does not know.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Tokenization capability required by the collector.
///
/// Implementations may be arbitrarily expensive and language-specific;
/// the engine treats both operations as pure functions of the text.
pub trait WordTokenizer: Send + Sync {
    fn word_tokenize(&self, text: &str) -> Vec<String>;
    fn sent_tokenize(&self, text: &str) -> Vec<String>;
}

/// Naive whitespace/terminal-punctuation tokenizer.
///
/// Shipped only as the built-in fallback so the registry always has a
/// usable entry; real deployments register language-specific
/// implementations on top.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenizer;

impl WordTokenizer for WhitespaceTokenizer {
    fn word_tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn sent_tokenize(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();
        for c in text.chars() {
            current.push(c);
            if matches!(c, '.' | '!' | '?' | '…') {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_string());
                }
                current.clear();
            }
        }
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            sentences.push(trimmed.to_string());
        }
        sentences
    }
}

/// Language-tag to tokenizer mapping with a designated fallback.
pub struct TokenizerRegistry {
    tokenizers: HashMap<String, Arc<dyn WordTokenizer>>,
    fallback: Arc<dyn WordTokenizer>,
    // Languages we already warned about, so a large corpus in one
    // unregistered language produces a single warning, not millions.
    warned: Mutex<HashSet<String>>,
}

impl TokenizerRegistry {
    /// Create a registry with the given fallback tokenizer and no
    /// language-specific entries.
    pub fn new(fallback: Arc<dyn WordTokenizer>) -> Self {
        Self {
            tokenizers: HashMap::new(),
            fallback,
            warned: Mutex::new(HashSet::new()),
        }
    }

    /// Register a tokenizer for a language tag, consuming and returning
    /// the registry.
    pub fn with_tokenizer(mut self, language: impl Into<String>, tokenizer: Arc<dyn WordTokenizer>) -> Self {
        self.tokenizers.insert(language.into(), tokenizer);
        self
    }

    /// Resolve the tokenizer for `language`, falling back (with a one-time
    /// warning per language) when no specific entry is registered.
    pub fn get(&self, language: &str) -> &dyn WordTokenizer {
        match self.tokenizers.get(language) {
            Some(tokenizer) => tokenizer.as_ref(),
            None => {
                if let Ok(mut warned) = self.warned.lock() {
                    if warned.insert(language.to_string()) {
                        warn!("No tokenizer registered for language '{language}', using fallback");
                    }
                }
                self.fallback.as_ref()
            }
        }
    }
}

impl Default for TokenizerRegistry {
    fn default() -> Self {
        Self::new(Arc::new(WhitespaceTokenizer))
    }
}
