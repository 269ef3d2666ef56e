// WHY: label sets and file locations differ per manuscript, so they live in a
// TOML manifest rather than in the segmenters

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, VoicesError};
use crate::segmenter::{KnownLabels, ManuscriptFormat, QuoteRules};

/// How a manuscript's input should be turned into a sentence table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatConfig {
    /// Quote-delimited prose
    Quotes {
        /// Replaces the default typographic double quotes when set
        #[serde(default)]
        typographic_quotes: Option<Vec<char>>,
    },
    /// Script with `LABEL:` lines
    Labels { known_labels: Vec<String> },
    /// Input is an already segmented sentence table (JSON) to merge against
    Table,
}

impl FormatConfig {
    /// Segmenter format for text inputs, `None` for pre-segmented tables
    pub fn manuscript_format(&self) -> Result<Option<ManuscriptFormat>> {
        match self {
            FormatConfig::Quotes { typographic_quotes } => {
                let mut rules = QuoteRules::default();
                if let Some(quotes) = typographic_quotes {
                    rules.typographic_quotes = quotes.clone();
                }
                Ok(Some(ManuscriptFormat::Quotes(rules)))
            }
            FormatConfig::Labels { known_labels } => {
                let labels = KnownLabels::new(known_labels.iter().cloned())?;
                Ok(Some(ManuscriptFormat::Labels(labels)))
            }
            FormatConfig::Table => Ok(None),
        }
    }
}

/// One manuscript entry of the manifest
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManuscriptConfig {
    /// Unique name used in logs and run statistics
    pub name: String,
    /// Manuscript text, or a sentence table when `format.kind = "table"`
    pub input: PathBuf,
    pub format: FormatConfig,
    /// Curated character → sentence id map applied after segmentation
    #[serde(default)]
    pub character_map: Option<PathBuf>,
    /// Where to write the table before merging
    #[serde(default)]
    pub segments_output: Option<PathBuf>,
    /// Where to write the final table
    pub output: PathBuf,
}

/// Batch of manuscripts to process in one run
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Base for relative output paths; defaults to the manifest's directory
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(rename = "manuscript", default)]
    pub manuscripts: Vec<ManuscriptConfig>,
}

impl Manifest {
    /// Read, parse and validate a manifest file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| VoicesError::from_io(path, e))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&content, base_dir)
    }

    /// Parse a manifest, resolving relative paths against `base_dir`
    ///
    /// Inputs and character maps resolve against `base_dir`; outputs resolve
    /// against `output_dir` (itself relative to `base_dir`) when given.
    pub fn from_toml_str(content: &str, base_dir: &Path) -> Result<Self> {
        let mut manifest: Manifest =
            toml::from_str(content).map_err(|e| VoicesError::format("manifest", e))?;
        manifest.validate()?;
        manifest.resolve_paths(base_dir);
        debug!("Loaded manifest with {} manuscripts", manifest.manuscripts.len());
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if self.manuscripts.is_empty() {
            return Err(VoicesError::InvalidConfig(
                "manifest must list at least one [[manuscript]]".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for manuscript in &self.manuscripts {
            if manuscript.name.trim().is_empty() {
                return Err(VoicesError::InvalidConfig(
                    "manuscript name must not be empty".to_string(),
                ));
            }
            if !names.insert(manuscript.name.as_str()) {
                return Err(VoicesError::InvalidConfig(format!(
                    "duplicate manuscript name {:?}",
                    manuscript.name
                )));
            }
            if manuscript.segments_output.as_ref() == Some(&manuscript.output) {
                return Err(VoicesError::InvalidConfig(format!(
                    "manuscript {:?} writes segments and final output to the same file",
                    manuscript.name
                )));
            }
            if manuscript.format == FormatConfig::Table && manuscript.character_map.is_none() {
                return Err(VoicesError::InvalidConfig(format!(
                    "manuscript {:?} reads a sentence table but has no character_map to merge",
                    manuscript.name
                )));
            }
            // WHY: surface bad label sets at load time, before any manuscript is read
            manuscript.format.manuscript_format()?;
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        let output_base = match &self.output_dir {
            Some(dir) => base_dir.join(dir),
            None => base_dir.to_path_buf(),
        };

        for manuscript in &mut self.manuscripts {
            manuscript.input = base_dir.join(&manuscript.input);
            if let Some(map) = manuscript.character_map.as_mut() {
                *map = base_dir.join(&*map);
            }
            if let Some(segments) = manuscript.segments_output.as_mut() {
                *segments = output_base.join(&*segments);
            }
            manuscript.output = output_base.join(&manuscript.output);
        }
    }
}
