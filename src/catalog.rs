//! Response catalog: canned replies keyed by emotion label.
//!
//! The classifier's label set comes from an external artifact, so lookups
//! never fail. Labels the catalog does not know resolve to the fallback
//! entry through [`CatalogMatch::Fallback`].

use std::fmt;

use serde::Serialize;

/// Emotions the catalog has responses for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Love,
    Surprise,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Love,
        Emotion::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Love => "love",
            Emotion::Surprise => "surprise",
        }
    }

    /// Parse a decoder label. Case-insensitive, surrounding whitespace ignored.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display content for one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseEntry {
    pub glyph: &'static str,
    pub message: &'static str,
    /// Hex colour used to tint the reply.
    pub accent: &'static str,
}

static JOY: ResponseEntry = ResponseEntry {
    glyph: "🤩",
    message: "Fantastic! Your positivity is radiating!",
    accent: "#fdcb6e",
};
static SADNESS: ResponseEntry = ResponseEntry {
    glyph: "😢",
    message: "It's okay not to be okay. I'm here for you.",
    accent: "#74b9ff",
};
static ANGER: ResponseEntry = ResponseEntry {
    glyph: "🤬",
    message: "Take a deep breath. Let's process this calmly.",
    accent: "#ff7675",
};
static FEAR: ResponseEntry = ResponseEntry {
    glyph: "😱",
    message: "You are safe. Focus on your breathing.",
    accent: "#a29bfe",
};
static LOVE: ResponseEntry = ResponseEntry {
    glyph: "🥰",
    message: "Love is in the air! Cherish this feeling.",
    accent: "#e84393",
};
static SURPRISE: ResponseEntry = ResponseEntry {
    glyph: "😲",
    message: "Wow! That sounds unexpected!",
    accent: "#fab1a0",
};

/// Served for any label without a catalog entry.
pub static FALLBACK: ResponseEntry = ResponseEntry {
    glyph: "🤔",
    message: "Interesting...",
    accent: "#dfe6e9",
};

/// Outcome of resolving a label against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogMatch<'a> {
    Known(Emotion, &'a ResponseEntry),
    Fallback(&'a ResponseEntry),
}

impl<'a> CatalogMatch<'a> {
    pub fn entry(&self) -> &'a ResponseEntry {
        match *self {
            CatalogMatch::Known(_, entry) => entry,
            CatalogMatch::Fallback(entry) => entry,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, CatalogMatch::Fallback(_))
    }
}

/// Stateless label → response lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseCatalog;

impl ResponseCatalog {
    pub fn new() -> Self {
        Self
    }

    /// Entry for a known emotion.
    pub fn entry(&self, emotion: Emotion) -> &'static ResponseEntry {
        match emotion {
            Emotion::Joy => &JOY,
            Emotion::Sadness => &SADNESS,
            Emotion::Anger => &ANGER,
            Emotion::Fear => &FEAR,
            Emotion::Love => &LOVE,
            Emotion::Surprise => &SURPRISE,
        }
    }

    pub fn fallback(&self) -> &'static ResponseEntry {
        &FALLBACK
    }

    pub fn resolve(&self, label: &str) -> CatalogMatch<'static> {
        match Emotion::from_label(label) {
            Some(emotion) => CatalogMatch::Known(emotion, self.entry(emotion)),
            None => CatalogMatch::Fallback(self.fallback()),
        }
    }

    /// Response for `label`; the fallback entry when the label is unknown.
    ///
    /// Matching is looser than an exact key lookup on purpose: `"Joy"` and
    /// `" joy\n"` resolve to the joy entry, so decoder artifacts that differ
    /// only in case or padding keep their responses.
    pub fn lookup(&self, label: &str) -> &'static ResponseEntry {
        self.resolve(label).entry()
    }

    /// All known entries in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = (Emotion, &'static ResponseEntry)> + '_ {
        Emotion::ALL.into_iter().map(|e| (e, self.entry(e)))
    }
}
