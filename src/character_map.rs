// WHY: speaker tags from segmentation are only a first guess; a curated
// character→sentence-id map is the ground truth and replaces them wholesale

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU32;
use tracing::{debug, info, warn};

use crate::error::{Result, VoicesError};
use crate::segmenter::SpeakerTag;
use crate::sentence_table::SentenceTable;

/// One curated character and the sentence ids it speaks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub name: String,
    pub ids: Vec<u32>,
}

/// Character display name → sentence ids, in document order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharacterMap {
    characters: Vec<Character>,
}

impl CharacterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a character, or replace the ids of one already present while keeping its position
    pub fn insert(&mut self, name: impl Into<String>, ids: impl IntoIterator<Item = u32>) {
        let name = name.into();
        let ids: Vec<u32> = ids.into_iter().collect();
        match self.characters.iter().position(|character| character.name == name) {
            Some(index) => {
                debug!("Character {} listed twice; keeping the later id list", name);
                self.characters[index].ids = ids;
            }
            None => self.characters.push(Character { name, ids }),
        }
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Parse a `{"Name": [1, 2, ...], ...}` document; any other shape is a `Format` error
    pub fn from_json_str(json: &str, context: &str) -> Result<Self> {
        let map: CharacterMap =
            serde_json::from_str(json).map_err(|e| VoicesError::format(context, e))?;
        debug!("Loaded {} characters from {}", map.len(), context);
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for CharacterMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CharacterMapVisitor;

        impl<'de> Visitor<'de> for CharacterMapVisitor {
            type Value = CharacterMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from character name to a list of positive sentence ids")
            }

            // WHY: visiting entries directly keeps document order, which decides
            // who wins when two characters claim the same id
            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<CharacterMap, A::Error> {
                let mut map = CharacterMap {
                    characters: Vec::with_capacity(access.size_hint().unwrap_or(0)),
                };
                while let Some((name, ids)) = access.next_entry::<String, Vec<NonZeroU32>>()? {
                    map.insert(name, ids.into_iter().map(NonZeroU32::get));
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(CharacterMapVisitor)
    }
}

/// Uppercase a display name and turn spaces into underscores: `"Little Prince"` → `LITTLE_PRINCE`
pub fn canonicalize_name(name: &str) -> String {
    name.to_uppercase().replace(' ', "_")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Fail on ids the table does not contain instead of ignoring them
    pub strict: bool,
}

/// Merged table plus bookkeeping from the merge
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub table: SentenceTable,
    /// Distinct table ids assigned to some character
    pub mapped_ids: usize,
    /// (character, id) pairs whose id is not in the table
    pub unknown_ids: Vec<(String, u32)>,
    /// Ids claimed by more than one character; the later character wins
    pub contested_ids: Vec<u32>,
}

/// Overlay `map` onto `table`: mapped ids take the canonical character tag,
/// every other id becomes NARRATOR, unknown ids are ignored
pub fn merge(table: &SentenceTable, map: &CharacterMap) -> SentenceTable {
    merge_outcome(table, map).table
}

/// [`merge`] with strictness control and merge statistics
pub fn merge_with_options(
    table: &SentenceTable,
    map: &CharacterMap,
    options: MergeOptions,
) -> Result<MergeOutcome> {
    let outcome = merge_outcome(table, map);

    if options.strict {
        if let Some((character, id)) = outcome.unknown_ids.first() {
            return Err(VoicesError::UnknownSentenceId {
                character: character.clone(),
                id: *id,
            });
        }
    }

    Ok(outcome)
}

fn merge_outcome(table: &SentenceTable, map: &CharacterMap) -> MergeOutcome {
    let mut assignments: HashMap<u32, SpeakerTag> = HashMap::new();
    let mut unknown_ids = Vec::new();
    let mut contested_ids = Vec::new();

    for character in map.characters() {
        let tag = SpeakerTag::named(canonicalize_name(&character.name));

        for &id in &character.ids {
            if !table.contains_id(id) {
                debug!("Ignoring id {} for {}: not in sentence table", id, character.name);
                unknown_ids.push((character.name.clone(), id));
                continue;
            }

            if let Some(previous) = assignments.insert(id, tag.clone()) {
                if previous != tag {
                    warn!(
                        "Sentence {} claimed by both {} and {}; keeping {}",
                        id, previous, tag, tag
                    );
                    contested_ids.push(id);
                }
            }
        }
    }

    let merged = table.with_speakers(|record| {
        assignments
            .get(&record.id)
            .cloned()
            .unwrap_or(SpeakerTag::Narrator)
    });

    info!(
        "Merged {} characters: {} of {} sentences attributed, {} unknown ids ignored",
        map.len(),
        assignments.len(),
        table.len(),
        unknown_ids.len()
    );

    MergeOutcome {
        table: merged,
        mapped_ids: assignments.len(),
        unknown_ids,
        contested_ids,
    }
}
