pub mod character_map;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod segmenter;
pub mod sentence_table;

// Re-export main types for convenient access
pub use character_map::{
    canonicalize_name, merge, merge_with_options, Character, CharacterMap, MergeOptions, MergeOutcome,
};
pub use config::{FormatConfig, Manifest, ManuscriptConfig};
pub use error::{Result, VoicesError};
pub use segmenter::{
    Block, KnownLabels, ManuscriptFormat, QuoteRules, Segmentation, Segmenter, SpeakerTag,
};
pub use sentence_table::{assemble, SentenceRecord, SentenceTable};

// Re-export batch processing types for the CLI and benchmarks
pub use pipeline::{
    process_manuscript, run_batch, write_run_stats, write_table, ManuscriptStats, PipelineOptions,
    RunStats,
};
