// WHY: one façade over the two manuscript conventions so the pipeline picks a
// format from configuration and never branches on segmenter internals

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::error::Result;

pub mod label_segmenter;
pub mod normalization;
pub mod quote_segmenter;

pub use label_segmenter::{KnownLabels, LabelSegmenter};
pub use normalization::{normalize_line_endings, normalize_text, normalize_text_into};
pub use quote_segmenter::{QuoteRules, QuoteSegmentation, QuoteSegmenter, QuoteState};

/// Speaker attached to a block or sentence record
///
/// Serialized as a plain string. `"NARRATOR"` and `"DIALOGUE"` always map to the
/// dedicated variants so a round trip through JSON never produces `Named("NARRATOR")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SpeakerTag {
    Narrator,
    Dialogue,
    /// A script label or a canonical character name
    Named(String),
}

impl SpeakerTag {
    pub const NARRATOR: &'static str = "NARRATOR";
    pub const DIALOGUE: &'static str = "DIALOGUE";

    pub fn named(tag: impl Into<String>) -> Self {
        Self::from(tag.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            SpeakerTag::Narrator => Self::NARRATOR,
            SpeakerTag::Dialogue => Self::DIALOGUE,
            SpeakerTag::Named(name) => name,
        }
    }
}

impl From<String> for SpeakerTag {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            Self::NARRATOR => SpeakerTag::Narrator,
            Self::DIALOGUE => SpeakerTag::Dialogue,
            _ => SpeakerTag::Named(tag),
        }
    }
}

impl From<SpeakerTag> for String {
    fn from(tag: SpeakerTag) -> Self {
        match tag {
            SpeakerTag::Named(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for SpeakerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A segmenter's output unit before ids are assigned
///
/// `text` is always normalized and non-empty; use [`Block::from_raw`] to build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub speaker: SpeakerTag,
    pub text: String,
}

impl Block {
    /// Normalize `raw` and wrap it, or `None` when nothing but whitespace remains
    pub fn from_raw(speaker: SpeakerTag, raw: String) -> Option<Self> {
        let text = normalize_text(&raw);
        if text.is_empty() {
            None
        } else {
            Some(Self { speaker, text })
        }
    }
}

/// Which textual convention a manuscript follows
#[derive(Debug, Clone)]
pub enum ManuscriptFormat {
    /// Prose where dialogue sits between double quotation marks
    Quotes(QuoteRules),
    /// Script where a `LABEL:` line introduces each speech
    Labels(KnownLabels),
}

/// Blocks from one segmentation run plus what the run noticed about its input
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub blocks: Vec<Block>,
    /// Quote characters seen, only tracked for quote-delimited manuscripts
    pub quote_count: Option<usize>,
}

impl Segmentation {
    /// Odd quote count: the trailing segment was emitted as narration and should be checked by hand
    pub fn needs_review(&self) -> bool {
        self.quote_count.is_some_and(|count| count % 2 == 1)
    }
}

enum SegmenterKind {
    Quotes(QuoteSegmenter),
    Labels(LabelSegmenter),
}

/// Segmenter chosen per manuscript format
pub struct Segmenter {
    kind: SegmenterKind,
}

impl Segmenter {
    pub fn new(format: ManuscriptFormat) -> Result<Self> {
        let kind = match format {
            ManuscriptFormat::Quotes(rules) => SegmenterKind::Quotes(QuoteSegmenter::new(rules)),
            ManuscriptFormat::Labels(labels) => SegmenterKind::Labels(LabelSegmenter::new(labels)?),
        };
        Ok(Self { kind })
    }

    /// Quote segmenter with the default typographic quote set
    pub fn quotes() -> Self {
        Self {
            kind: SegmenterKind::Quotes(QuoteSegmenter::new(QuoteRules::default())),
        }
    }

    /// Normalize line endings, then split the manuscript into blocks
    pub fn segment(&self, text: &str) -> Segmentation {
        let text = normalize_line_endings(text);

        let segmentation = match &self.kind {
            SegmenterKind::Quotes(segmenter) => {
                let QuoteSegmentation { blocks, quote_count } = segmenter.segment(&text);
                Segmentation {
                    blocks,
                    quote_count: Some(quote_count),
                }
            }
            SegmenterKind::Labels(segmenter) => Segmentation {
                blocks: segmenter.segment(&text),
                quote_count: None,
            },
        };

        info!("Segmented manuscript into {} blocks", segmentation.blocks.len());
        segmentation
    }
}
