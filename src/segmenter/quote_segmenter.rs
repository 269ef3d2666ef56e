// WHY: prose manuscripts mark dialogue only by quotation marks, so a two-state
// machine toggled on each quote is enough to alternate narration and dialogue

use tracing::{debug, warn};

use super::{Block, SpeakerTag};

/// Configuration for quote recognition
#[derive(Debug, Clone)]
pub struct QuoteRules {
    /// Character the scanner toggles on
    pub canonical_quote: char,
    /// Typographic variants rewritten to `canonical_quote` before scanning
    pub typographic_quotes: Vec<char>,
}

impl Default for QuoteRules {
    fn default() -> Self {
        Self {
            canonical_quote: '"',
            // WHY: double quotes only; U+2019 doubles as the apostrophe and must stay text
            typographic_quotes: vec!['\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}'],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteState {
    OutsideQuote,
    InsideQuote,
}

impl QuoteState {
    /// Speaker for the text buffered so far, and the state after this quote
    fn on_quote(self) -> (SpeakerTag, QuoteState) {
        match self {
            QuoteState::OutsideQuote => (SpeakerTag::Narrator, QuoteState::InsideQuote),
            QuoteState::InsideQuote => (SpeakerTag::Dialogue, QuoteState::OutsideQuote),
        }
    }
}

/// Blocks produced from one prose manuscript
#[derive(Debug, Clone)]
pub struct QuoteSegmentation {
    pub blocks: Vec<Block>,
    pub quote_count: usize,
}

impl QuoteSegmentation {
    pub fn is_balanced(&self) -> bool {
        self.quote_count % 2 == 0
    }
}

struct QuoteMachine {
    state: QuoteState,
    buffer: String,
    blocks: Vec<Block>,
    quote_count: usize,
}

impl QuoteMachine {
    fn new(capacity: usize) -> Self {
        Self {
            state: QuoteState::OutsideQuote,
            buffer: String::with_capacity(capacity),
            blocks: Vec::new(),
            quote_count: 0,
        }
    }

    fn on_quote(&mut self) {
        self.quote_count += 1;
        let (speaker, next_state) = self.state.on_quote();
        self.flush(speaker);
        self.state = next_state;
    }

    fn on_char(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    /// Move the buffer into a block; whitespace-only buffers vanish
    fn flush(&mut self, speaker: SpeakerTag) {
        let raw = std::mem::take(&mut self.buffer);
        if let Some(block) = Block::from_raw(speaker, raw) {
            self.blocks.push(block);
        }
    }

    fn finish(mut self) -> QuoteSegmentation {
        // WHY: the trailing buffer is always narration, even after an unmatched
        // opening quote; callers flag odd counts for review instead
        self.flush(SpeakerTag::Narrator);
        QuoteSegmentation {
            blocks: self.blocks,
            quote_count: self.quote_count,
        }
    }
}

/// Splits quote-delimited prose into alternating NARRATOR / DIALOGUE blocks
#[derive(Debug, Clone, Default)]
pub struct QuoteSegmenter {
    rules: QuoteRules,
}

impl QuoteSegmenter {
    pub fn new(rules: QuoteRules) -> Self {
        Self { rules }
    }

    /// Rewrite every typographic quote to the canonical quote character
    pub fn canonicalize_quotes(&self, text: &str) -> String {
        text.chars()
            .map(|ch| {
                if self.rules.typographic_quotes.contains(&ch) {
                    self.rules.canonical_quote
                } else {
                    ch
                }
            })
            .collect()
    }

    pub fn segment(&self, text: &str) -> QuoteSegmentation {
        let text = self.canonicalize_quotes(text);
        debug!("Starting quote segmentation on {} characters", text.len());

        let mut machine = QuoteMachine::new(text.len().min(4096));
        for ch in text.chars() {
            if ch == self.rules.canonical_quote {
                machine.on_quote();
            } else {
                machine.on_char(ch);
            }
        }

        let segmentation = machine.finish();
        if !segmentation.is_balanced() {
            warn!(
                "Odd number of quotation marks ({}); trailing text was tagged NARRATOR and needs review",
                segmentation.quote_count
            );
        }
        debug!(
            "Quote segmentation produced {} blocks from {} quotes",
            segmentation.blocks.len(),
            segmentation.quote_count
        );
        segmentation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(segmentation: &QuoteSegmentation) -> Vec<(String, String)> {
        segmentation
            .blocks
            .iter()
            .map(|b| (b.speaker.to_string(), b.text.clone()))
            .collect()
    }

    fn pair(speaker: &str, text: &str) -> (String, String) {
        (speaker.to_string(), text.to_string())
    }

    #[test]
    fn test_simple_dialogue_split() {
        let segmenter = QuoteSegmenter::default();
        let result = segmenter.segment("He said \"Hello there\" and left.");

        assert_eq!(
            tagged(&result),
            vec![
                pair("NARRATOR", "He said"),
                pair("DIALOGUE", "Hello there"),
                pair("NARRATOR", "and left."),
            ]
        );
        assert!(result.is_balanced());
    }

    #[test]
    fn test_alternation_over_balanced_quotes() {
        let segmenter = QuoteSegmenter::default();
        let result = segmenter.segment("A\"B\"C\"D\"E");

        assert_eq!(
            tagged(&result),
            vec![
                pair("NARRATOR", "A"),
                pair("DIALOGUE", "B"),
                pair("NARRATOR", "C"),
                pair("DIALOGUE", "D"),
                pair("NARRATOR", "E"),
            ]
        );
        assert_eq!(result.quote_count, 4);
    }

    #[test]
    fn test_typographic_quotes_are_canonicalized() {
        let segmenter = QuoteSegmenter::default();
        let result = segmenter.segment("The prince asked, \u{201C}Please draw me a sheep!\u{201D} I was startled.");

        assert_eq!(
            tagged(&result),
            vec![
                pair("NARRATOR", "The prince asked,"),
                pair("DIALOGUE", "Please draw me a sheep!"),
                pair("NARRATOR", "I was startled."),
            ]
        );
    }

    #[test]
    fn test_apostrophes_stay_in_text() {
        let segmenter = QuoteSegmenter::default();
        let result = segmenter.segment("It\u{2019}s mine, \"I don\u{2019}t know\" he said.");

        assert_eq!(result.blocks.len(), 3);
        assert_eq!(result.blocks[0].text, "It\u{2019}s mine,");
        assert_eq!(result.blocks[1].text, "I don\u{2019}t know");
    }

    #[test]
    fn test_no_quotes_yields_single_narrator_block() {
        let segmenter = QuoteSegmenter::default();
        let result = segmenter.segment("Once when I was\nsix years old\n\nI saw a picture.");

        assert_eq!(tagged(&result), vec![pair("NARRATOR", "Once when I was six years old I saw a picture.")]);
        assert_eq!(result.quote_count, 0);
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        let segmenter = QuoteSegmenter::default();
        // back-to-back speeches leave only whitespace between them
        let result = segmenter.segment("\"First.\"\n\n\"Second.\"   \"\"");

        assert_eq!(
            tagged(&result),
            vec![pair("DIALOGUE", "First."), pair("DIALOGUE", "Second.")]
        );
        assert_eq!(result.quote_count, 6);
    }

    #[test]
    fn test_unbalanced_trailing_segment_is_narration() {
        let segmenter = QuoteSegmenter::default();
        let result = segmenter.segment("He said \"Hi\" and then \"never finished");

        assert_eq!(
            tagged(&result),
            vec![
                pair("NARRATOR", "He said"),
                pair("DIALOGUE", "Hi"),
                pair("NARRATOR", "and then"),
                pair("NARRATOR", "never finished"),
            ]
        );
        assert!(!result.is_balanced());
    }

    #[test]
    fn test_multiline_dialogue_is_one_block() {
        let segmenter = QuoteSegmenter::default();
        let result = segmenter.segment("\"Draw me\na sheep,\"\nsaid the little prince.");

        assert_eq!(
            tagged(&result),
            vec![pair("DIALOGUE", "Draw me a sheep,"), pair("NARRATOR", "said the little prince.")]
        );
    }

    #[test]
    fn test_custom_rules() {
        let rules = QuoteRules {
            canonical_quote: '"',
            typographic_quotes: vec!['\u{00AB}', '\u{00BB}'],
        };
        let segmenter = QuoteSegmenter::new(rules);
        let result = segmenter.segment("Il dit \u{00AB}Bonjour\u{00BB} puis partit.");

        assert_eq!(result.blocks.len(), 3);
        assert_eq!(result.blocks[1].speaker, SpeakerTag::Dialogue);
        assert_eq!(result.blocks[1].text, "Bonjour");
    }

    #[test]
    fn test_empty_input() {
        let result = QuoteSegmenter::default().segment("");
        assert!(result.blocks.is_empty());
        assert!(result.is_balanced());
    }
}
