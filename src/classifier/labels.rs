//! Label decoder: maps the model's output index back to a label string.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LabelDocument {
    /// `["anger", "fear", ...]`
    List(Vec<String>),
    /// `{"classes": [...]}`, as exported from a fitted label encoder.
    Classes { classes: Vec<String> },
    /// `{"id2label": {"0": "anger", ...}}`, as found in model configs.
    IdToLabel { id2label: BTreeMap<String, String> },
}

/// Ordered set of labels the loaded model can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDecoder {
    labels: Vec<String>,
}

impl LabelDecoder {
    pub fn new(labels: Vec<String>) -> Result<Self> {
        if labels.is_empty() {
            anyhow::bail!("label decoder has no classes");
        }
        if labels.iter().any(|l| l.trim().is_empty()) {
            anyhow::bail!("label decoder contains a blank class name");
        }
        Ok(Self { labels })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read label decoder {}", path.display()))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let document: LabelDocument =
            serde_json::from_str(contents).context("Failed to parse label decoder")?;

        let labels = match document {
            LabelDocument::List(labels) => labels,
            LabelDocument::Classes { classes } => classes,
            LabelDocument::IdToLabel { id2label } => {
                let mut entries: Vec<(usize, String)> = id2label
                    .into_iter()
                    .map(|(k, v)| {
                        k.parse::<usize>()
                            .map(|idx| (idx, v))
                            .with_context(|| format!("id2label key '{}' is not an index", k))
                    })
                    .collect::<Result<_>>()?;
                entries.sort_by_key(|(idx, _)| *idx);

                if let Some((pos, (idx, _))) = entries
                    .iter()
                    .enumerate()
                    .find(|(pos, (idx, _))| pos != idx)
                {
                    anyhow::bail!("id2label has a gap: expected index {}, found {}", pos, idx);
                }
                entries.into_iter().map(|(_, label)| label).collect()
            }
        };

        Self::new(labels)
    }

    /// Label for an output index, or `None` if the index is out of range.
    pub fn decode(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
