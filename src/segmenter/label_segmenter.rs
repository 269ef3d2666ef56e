// WHY: script manuscripts announce each speech with a `LABEL:` line, so the
// segmenter only needs to remember the last label seen and buffer lines until the next one

use regex_automata::meta::Regex;
use tracing::debug;

use super::{Block, SpeakerTag};
use crate::error::{Result, VoicesError};

/// Closed set of speaker labels recognised in one script manuscript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownLabels {
    labels: Vec<String>,
}

impl KnownLabels {
    /// Validate and collect labels, dropping duplicates while keeping first-seen order
    ///
    /// A label must be non-empty, single-line and free of surrounding whitespace,
    /// since label lines are matched after trimming.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut collected: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            validate_label(&label)?;
            if !collected.contains(&label) {
                collected.push(label);
            }
        }

        if collected.is_empty() {
            return Err(VoicesError::InvalidConfig(
                "label set must contain at least one speaker label".to_string(),
            ));
        }

        Ok(Self { labels: collected })
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|known| known == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

fn validate_label(label: &str) -> Result<()> {
    let well_formed = !label.is_empty()
        && label.trim() == label
        && !label.contains(|ch: char| ch == '\n' || ch == '\r');

    if well_formed {
        Ok(())
    } else {
        Err(VoicesError::InvalidConfig(format!(
            "speaker label {label:?} must be non-empty, on one line, without surrounding whitespace"
        )))
    }
}

/// Buffers text lines under the most recent speaker label
struct LabelMachine<'t> {
    current_speaker: SpeakerTag,
    lines: Vec<&'t str>,
    blocks: Vec<Block>,
}

impl<'t> LabelMachine<'t> {
    fn new() -> Self {
        Self {
            current_speaker: SpeakerTag::Narrator,
            lines: Vec::new(),
            blocks: Vec::new(),
        }
    }

    fn on_label(&mut self, label: &str) {
        self.flush();
        self.current_speaker = SpeakerTag::named(label);
    }

    fn on_text(&mut self, line: &'t str) {
        self.lines.push(line);
    }

    fn flush(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        let joined = self.lines.join(" ");
        self.lines.clear();
        if let Some(block) = Block::from_raw(self.current_speaker.clone(), joined) {
            self.blocks.push(block);
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

/// Splits speaker-labelled script text into one block per label occurrence
#[derive(Debug)]
pub struct LabelSegmenter {
    label_count: usize,
    label_line: Regex,
}

impl LabelSegmenter {
    pub fn new(labels: KnownLabels) -> Result<Self> {
        // labels are matched literally, so `MR. SMITH` only matches itself
        let alternation = labels.iter().map(regex_syntax::escape).collect::<Vec<_>>().join("|");
        let pattern = format!("^(?:{alternation}):$");
        let label_line = Regex::new(&pattern).map_err(|e| {
            VoicesError::InvalidConfig(format!("cannot compile label pattern {pattern:?}: {e}"))
        })?;

        Ok(Self {
            label_count: labels.labels.len(),
            label_line,
        })
    }

    /// Label named by a trimmed line, if the line is exactly `LABEL:` for a known label
    pub fn match_label<'l>(&self, trimmed: &'l str) -> Option<&'l str> {
        if self.label_line.is_match(trimmed) {
            trimmed.strip_suffix(':')
        } else {
            None
        }
    }

    /// Segment text whose line endings are already `\n`
    pub fn segment(&self, text: &str) -> Vec<Block> {
        debug!("Starting label segmentation with {} known labels", self.label_count);

        let mut machine = LabelMachine::new();
        let mut label_lines = 0usize;

        for line in text.lines() {
            let trimmed = line.trim();
            if let Some(label) = self.match_label(trimmed) {
                label_lines += 1;
                machine.on_label(label);
            } else if !trimmed.is_empty() {
                machine.on_text(trimmed);
            }
        }

        let blocks = machine.finish();
        debug!(
            "Label segmentation produced {} blocks from {} label lines",
            blocks.len(),
            label_lines
        );
        blocks
    }
}
