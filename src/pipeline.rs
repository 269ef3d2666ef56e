// WHY: batch driver shared by the CLI and integration tests; one manuscript's
// failure is recorded in its stats instead of ending the run

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{error, info, warn};

use crate::character_map::{merge_with_options, CharacterMap, MergeOptions, MergeOutcome};
use crate::config::{Manifest, ManuscriptConfig};
use crate::error::VoicesError;
use crate::reader::{read_input_async, read_to_string_async, ManuscriptReader, ReaderConfig};
use crate::segmenter::Segmenter;
use crate::sentence_table::{assemble, SentenceTable};

/// Batch-level switches, usually straight from the CLI
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Abort the batch on the first failed manuscript
    pub fail_fast: bool,
    /// Reject character map ids that are not in the table
    pub strict_merge: bool,
    pub show_progress: bool,
}

/// Result of running one manuscript through segmentation and merging
#[derive(Debug, Clone)]
pub struct ProcessedManuscript {
    /// Table as produced by the segmenter (or loaded from a table input)
    pub segmented: SentenceTable,
    pub merge: Option<MergeOutcome>,
    /// Quote characters seen by the quote segmenter
    pub quote_count: Option<usize>,
    /// Odd quote count; trailing narration should be checked by hand
    pub needs_review: bool,
    pub chars_processed: u64,
}

impl ProcessedManuscript {
    /// Merged table when a character map was applied, otherwise the segmented one
    pub fn final_table(&self) -> &SentenceTable {
        self.merge.as_ref().map_or(&self.segmented, |outcome| &outcome.table)
    }
}

/// Per-manuscript processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ManuscriptStats {
    pub name: String,
    pub input: String,
    /// success, skipped or failed
    pub status: String,
    pub error: Option<String>,
    pub chars_processed: u64,
    pub sentences: u64,
    /// Speaker counts straight from segmentation
    pub segment_speakers: BTreeMap<String, usize>,
    /// Speaker counts after the character map merge
    pub merged_speakers: Option<BTreeMap<String, usize>>,
    pub quote_count: Option<usize>,
    /// Odd quote count; trailing narration should be checked by hand
    pub needs_review: bool,
    pub mapped_ids: Option<usize>,
    pub unknown_ids: Option<usize>,
    /// Ids claimed by more than one character in the map
    pub contested_ids: Option<Vec<u32>>,
    pub processing_time_ms: u64,
}

impl ManuscriptStats {
    fn new(config: &ManuscriptConfig, status: &str) -> Self {
        Self {
            name: config.name.clone(),
            input: config.input.display().to_string(),
            status: status.to_string(),
            error: None,
            chars_processed: 0,
            sentences: 0,
            segment_speakers: BTreeMap::new(),
            merged_speakers: None,
            quote_count: None,
            needs_review: false,
            mapped_ids: None,
            unknown_ids: None,
            contested_ids: None,
            processing_time_ms: 0,
        }
    }

    /// Final speaker counts, merged when a map was applied, most frequent first
    pub fn speaker_summary(&self) -> Vec<(&str, usize)> {
        let counts = self.merged_speakers.as_ref().unwrap_or(&self.segment_speakers);
        let mut summary: Vec<(&str, usize)> =
            counts.iter().map(|(speaker, count)| (speaker.as_str(), *count)).collect();
        // ties keep the BTreeMap's name order
        summary.sort_by(|a, b| b.1.cmp(&a.1));
        summary
    }

    fn from_processed(config: &ManuscriptConfig, processed: &ProcessedManuscript) -> Self {
        let mut stats = Self::new(config, "success");
        stats.chars_processed = processed.chars_processed;
        stats.sentences = processed.segmented.len() as u64;
        stats.segment_speakers = processed.segmented.speaker_counts();
        stats.quote_count = processed.quote_count;
        stats.needs_review = processed.needs_review;
        if let Some(outcome) = &processed.merge {
            stats.merged_speakers = Some(outcome.table.speaker_counts());
            stats.mapped_ids = Some(outcome.mapped_ids);
            stats.unknown_ids = Some(outcome.unknown_ids.len());
            stats.contested_ids = Some(outcome.contested_ids.clone());
        }
        stats
    }
}

/// Summary of a whole batch run
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunStats {
    /// Seconds since the Unix epoch
    pub run_start: u64,
    pub total_processing_time_ms: u64,
    pub manuscripts_processed: u64,
    pub manuscripts_skipped: u64,
    pub manuscripts_failed: u64,
    pub manuscripts_needing_review: u64,
    pub manuscripts: Vec<ManuscriptStats>,
}

/// Read, segment and optionally merge one manuscript without writing anything
pub async fn process_manuscript(
    config: &ManuscriptConfig,
    options: &PipelineOptions,
) -> crate::error::Result<ProcessedManuscript> {
    let format = config.format.manuscript_format()?;
    let (segmented, quote_count, needs_review, chars_processed) = match format {
        Some(format) => {
            let reader = ManuscriptReader::new(ReaderConfig::default());
            let (text, read_stats) = reader.read_manuscript(&config.input).await?;
            let segmentation = Segmenter::new(format)?.segment(&text);
            let needs_review = segmentation.needs_review();
            if needs_review {
                warn!(
                    "{}: odd quote count ({:?}), flagging for manual review",
                    config.name, segmentation.quote_count
                );
            }
            (
                assemble(segmentation.blocks),
                segmentation.quote_count,
                needs_review,
                read_stats.chars_read,
            )
        }
        None => {
            let json = read_input_async(&config.input).await?;
            let context = config.input.display().to_string();
            let table = SentenceTable::from_json_str(&json, &context)?;
            (table, None, false, json.chars().count() as u64)
        }
    };

    let merge = match &config.character_map {
        Some(map_path) => {
            let json = read_to_string_async(map_path).await?;
            let map = CharacterMap::from_json_str(&json, &map_path.display().to_string())?;
            let merge_options = MergeOptions {
                strict: options.strict_merge,
            };
            Some(merge_with_options(&segmented, &map, merge_options)?)
        }
        None => None,
    };

    Ok(ProcessedManuscript {
        segmented,
        merge,
        quote_count,
        needs_review,
        chars_processed,
    })
}

/// Write a sentence table as pretty JSON, creating parent directories
pub async fn write_table(path: &Path, table: &SentenceTable) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = table.to_json_pretty()?;
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Write run statistics as pretty JSON, creating parent directories
pub async fn write_run_stats(path: &Path, stats: &RunStats) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(stats)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

async fn write_outputs(config: &ManuscriptConfig, processed: &ProcessedManuscript) -> Result<()> {
    if let Some(segments_path) = &config.segments_output {
        write_table(segments_path, &processed.segmented).await?;
        info!("{}: wrote segmented table to {}", config.name, segments_path.display());
    }
    write_table(&config.output, processed.final_table()).await?;
    info!(
        "{}: wrote {} sentences to {}",
        config.name,
        processed.final_table().len(),
        config.output.display()
    );
    Ok(())
}

/// Only a missing or unreadable manuscript is skipped; a missing character map is a failure
fn is_missing_input(config: &ManuscriptConfig, err: &VoicesError) -> bool {
    matches!(err, VoicesError::NotFound { path, .. } if *path == config.input)
}

fn progress_bar(len: usize, visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    Ok(pb)
}

/// Process every manuscript of the manifest in order and write their outputs
pub async fn run_batch(manifest: &Manifest, options: &PipelineOptions) -> Result<RunStats> {
    let run_start = Instant::now();
    let run_start_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    info!("Starting batch of {} manuscripts", manifest.manuscripts.len());

    let pb = progress_bar(manifest.manuscripts.len(), options.show_progress)?;
    let mut all_stats = Vec::with_capacity(manifest.manuscripts.len());

    for config in &manifest.manuscripts {
        pb.set_message(config.name.clone());
        let started = Instant::now();

        let mut stats = match process_manuscript(config, options).await {
            Ok(processed) => match write_outputs(config, &processed).await {
                Ok(()) => ManuscriptStats::from_processed(config, &processed),
                Err(e) => {
                    error!("{}: failed to write output: {:#}", config.name, e);
                    if options.fail_fast {
                        pb.abandon();
                        return Err(e.context(format!("writing output for {}", config.name)));
                    }
                    let mut stats = ManuscriptStats::from_processed(config, &processed);
                    stats.status = "failed".to_string();
                    stats.error = Some(format!("{e:#}"));
                    stats
                }
            },
            Err(e) if is_missing_input(config, &e) => {
                warn!("{}: manuscript missing or unreadable, skipping: {}", config.name, e);
                let mut stats = ManuscriptStats::new(config, "skipped");
                stats.error = Some(e.to_string());
                stats
            }
            Err(e) => {
                error!("{}: processing failed: {}", config.name, e);
                if options.fail_fast {
                    pb.abandon();
                    return Err(anyhow::Error::new(e).context(format!("processing {}", config.name)));
                }
                let mut stats = ManuscriptStats::new(config, "failed");
                stats.error = Some(e.to_string());
                stats
            }
        };

        stats.processing_time_ms = started.elapsed().as_millis() as u64;
        all_stats.push(stats);
        pb.inc(1);
    }

    pb.finish_with_message("done");

    let count = |status: &str| all_stats.iter().filter(|s| s.status == status).count() as u64;
    let run_stats = RunStats {
        run_start: run_start_secs,
        total_processing_time_ms: run_start.elapsed().as_millis() as u64,
        manuscripts_processed: count("success"),
        manuscripts_skipped: count("skipped"),
        manuscripts_failed: count("failed"),
        manuscripts_needing_review: all_stats.iter().filter(|s| s.needs_review).count() as u64,
        manuscripts: all_stats,
    };

    info!(
        "Batch complete: {} processed, {} skipped, {} failed",
        run_stats.manuscripts_processed, run_stats.manuscripts_skipped, run_stats.manuscripts_failed
    );
    Ok(run_stats)
}
