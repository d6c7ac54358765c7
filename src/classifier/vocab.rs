//! Text-to-sequence tokenizers.
//!
//! Two artifact formats are understood:
//! - the word-index document written by Keras' `Tokenizer.to_json()`, which is
//!   what the reference model was fitted with;
//! - a HuggingFace `tokenizer.json`, loaded through the `tokenizers` crate.
//!
//! Neither adds special tokens, and neither pads: width normalization happens
//! afterwards in [`super::sequence`].

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokenizers::Tokenizer;

use super::sequence::DEFAULT_PAD_ID;

const KERAS_DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

fn default_filters() -> String {
    KERAS_DEFAULT_FILTERS.to_string()
}

fn default_split() -> String {
    " ".to_string()
}

fn default_true() -> bool {
    true
}

/// `word_index` is stored as a JSON-encoded string by `to_json()`, but a plain
/// object is accepted as well.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WordIndexField {
    Map(HashMap<String, u32>),
    Encoded(String),
}

#[derive(Debug, Deserialize)]
struct WordIndexConfig {
    word_index: WordIndexField,
    #[serde(default)]
    num_words: Option<usize>,
    #[serde(default = "default_filters")]
    filters: String,
    #[serde(default = "default_true")]
    lower: bool,
    #[serde(default = "default_split")]
    split: String,
    #[serde(default)]
    char_level: bool,
    #[serde(default)]
    oov_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WordIndexDocument {
    Wrapped { config: WordIndexConfig },
    Bare(WordIndexConfig),
}

/// Word-level tokenizer driven by a fitted word index.
///
/// Id 0 is never assigned to a word and serves as the padding id.
#[derive(Debug, Clone)]
pub struct WordIndexTokenizer {
    word_index: HashMap<String, u32>,
    num_words: Option<usize>,
    filters: String,
    lower: bool,
    split: String,
    char_level: bool,
    oov_id: Option<u32>,
}

impl WordIndexTokenizer {
    /// Build a tokenizer with Keras' default text filters and no OOV token.
    pub fn new(word_index: HashMap<String, u32>) -> Self {
        Self {
            word_index,
            num_words: None,
            filters: default_filters(),
            lower: true,
            split: default_split(),
            char_level: false,
            oov_id: None,
        }
    }

    /// Map unknown words to the id of `token`, which must be in the index.
    pub fn with_oov_token(mut self, token: &str) -> Result<Self> {
        let id = *self
            .word_index
            .get(token)
            .with_context(|| format!("OOV token '{}' is not in the word index", token))?;
        self.oov_id = Some(id);
        Ok(self)
    }

    /// Only keep words whose id is below `num_words`.
    pub fn with_num_words(mut self, num_words: usize) -> Self {
        self.num_words = Some(num_words);
        self
    }

    fn from_json(json: &str) -> Result<Self> {
        let document: WordIndexDocument =
            serde_json::from_str(json).context("Failed to parse word-index tokenizer")?;
        let config = match document {
            WordIndexDocument::Wrapped { config } => config,
            WordIndexDocument::Bare(config) => config,
        };

        let word_index = match config.word_index {
            WordIndexField::Map(map) => map,
            WordIndexField::Encoded(encoded) => serde_json::from_str(&encoded)
                .context("Failed to decode embedded word_index string")?,
        };

        if word_index.is_empty() {
            anyhow::bail!("word_index is empty");
        }
        if word_index.values().any(|&id| id == DEFAULT_PAD_ID) {
            anyhow::bail!("word_index assigns the reserved padding id 0");
        }

        // Keras resolves the OOV id through the index; a declared but
        // unindexed OOV token silently drops unknown words.
        let oov_id = config
            .oov_token
            .as_deref()
            .and_then(|token| word_index.get(token).copied());

        Ok(Self {
            word_index,
            num_words: config.num_words,
            filters: config.filters,
            lower: config.lower,
            split: config.split,
            char_level: config.char_level,
            oov_id,
        })
    }

    fn words(&self, text: &str) -> Vec<String> {
        let text = if self.lower {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        if self.char_level {
            return text.chars().map(String::from).collect();
        }

        let translated: String = text
            .chars()
            .map(|c| {
                if self.filters.contains(c) {
                    self.split.clone()
                } else {
                    c.to_string()
                }
            })
            .collect();

        translated
            .split(self.split.as_str())
            .filter(|w| !w.is_empty())
            .map(String::from)
            .collect()
    }

    /// Convert text to word ids. Unknown words become the OOV id, or are
    /// dropped when the index has none.
    pub fn text_to_sequence(&self, text: &str) -> Vec<u32> {
        self.words(text)
            .iter()
            .filter_map(|word| match self.word_index.get(word) {
                Some(&id) => match self.num_words {
                    Some(limit) if id as usize >= limit => self.oov_id,
                    _ => Some(id),
                },
                None => self.oov_id,
            })
            .collect()
    }

    /// Exclusive upper bound on ids this tokenizer can emit.
    pub fn id_upper_bound(&self) -> usize {
        let max_indexed = self.word_index.values().copied().max().unwrap_or(0) as usize + 1;
        let bound = match self.num_words {
            Some(limit) => limit.min(max_indexed),
            None => max_indexed,
        };
        match self.oov_id {
            Some(oov) => bound.max(oov as usize + 1),
            None => bound,
        }
    }
}

/// Vocabulary entries accepted in the padding slot of a tokenizer that
/// declares no padding of its own.
const PAD_TOKENS: &[&str] = &["[PAD]", "<pad>", "<PAD>", "[pad]"];

/// The implicit pad id must not belong to a real word, or the model would
/// mask that word out of every input.
fn check_pad_slot(tokenizer: &Tokenizer, pad_id: u32) -> Result<()> {
    let Some(token) = tokenizer.id_to_token(pad_id) else {
        return Ok(());
    };
    let special = tokenizer
        .get_added_tokens_decoder()
        .get(&pad_id)
        .is_some_and(|added| added.special);
    if special || PAD_TOKENS.contains(&token.as_str()) {
        return Ok(());
    }
    anyhow::bail!(
        "tokenizer declares no padding and assigns the padding id {} to '{}'",
        pad_id,
        token
    )
}

/// The tokenizer half of the classifier artifacts.
pub enum TextEncoder {
    WordIndex(WordIndexTokenizer),
    Pretrained { tokenizer: Box<Tokenizer>, pad_id: u32 },
}

impl TextEncoder {
    /// Load a tokenizer artifact, detecting its format from the JSON shape.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tokenizer {}", path.display()))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(contents).context("Tokenizer artifact is not valid JSON")?;

        if value.get("model").is_some() {
            let mut tokenizer: Tokenizer = contents
                .parse()
                .map_err(|e| anyhow::anyhow!("Failed to load HuggingFace tokenizer: {}", e))?;
            let pad_id = match tokenizer.get_padding() {
                Some(padding) => padding.pad_id,
                None => {
                    check_pad_slot(&tokenizer, DEFAULT_PAD_ID)?;
                    DEFAULT_PAD_ID
                }
            };
            // Width is fixed downstream; artifact-level padding would only hide it.
            tokenizer.with_padding(None);
            return Ok(Self::Pretrained {
                tokenizer: Box::new(tokenizer),
                pad_id,
            });
        }

        Ok(Self::WordIndex(WordIndexTokenizer::from_json(contents)?))
    }

    /// Tokenize text into ids, without padding or truncation.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        match self {
            Self::WordIndex(tokenizer) => Ok(tokenizer.text_to_sequence(text)),
            Self::Pretrained { tokenizer, .. } => {
                let encoding = tokenizer
                    .encode(text, false)
                    .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;
                Ok(encoding.get_ids().to_vec())
            }
        }
    }

    pub fn pad_id(&self) -> u32 {
        match self {
            Self::WordIndex(_) => DEFAULT_PAD_ID,
            Self::Pretrained { pad_id, .. } => *pad_id,
        }
    }

    /// Exclusive upper bound on emitted ids, used to validate the embedding table.
    pub fn id_upper_bound(&self) -> usize {
        match self {
            Self::WordIndex(tokenizer) => tokenizer.id_upper_bound(),
            Self::Pretrained { tokenizer, .. } => tokenizer.get_vocab_size(true),
        }
    }
}

impl From<WordIndexTokenizer> for TextEncoder {
    fn from(tokenizer: WordIndexTokenizer) -> Self {
        Self::WordIndex(tokenizer)
    }
}
