// WHY: the id→record table is the hand-off shape for downstream classification,
// so ids stay contiguous and serialization keeps numeric id order

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Result, VoicesError};
use crate::segmenter::{Block, SpeakerTag};

/// One numbered, speaker-tagged sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceRecord {
    pub id: u32,
    pub speaker: SpeakerTag,
    pub sentence: String,
}

/// Ordered sentence records with ids exactly `1..=N`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SentenceTable {
    records: Vec<SentenceRecord>,
}

/// Number blocks `1..=N` in the order they were produced
pub fn assemble(blocks: Vec<Block>) -> SentenceTable {
    let records = blocks
        .into_iter()
        .zip(1u32..)
        .map(|(block, id)| SentenceRecord {
            id,
            speaker: block.speaker,
            sentence: block.text,
        })
        .collect();
    SentenceTable { records }
}

impl SentenceTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SentenceRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &SentenceRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: u32) -> Option<&SentenceRecord> {
        // ids are 1-based and contiguous, so the index is id - 1
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.records.get(index)
    }

    pub fn contains_id(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// New table with every speaker recomputed from its record; ids and text are kept
    pub fn with_speakers<F>(&self, mut speaker_for: F) -> SentenceTable
    where
        F: FnMut(&SentenceRecord) -> SpeakerTag,
    {
        let records = self
            .records
            .iter()
            .map(|record| SentenceRecord {
                id: record.id,
                speaker: speaker_for(record),
                sentence: record.sentence.clone(),
            })
            .collect();
        SentenceTable { records }
    }

    /// Records grouped per speaker, each group in id order
    pub fn by_speaker(&self) -> BTreeMap<&SpeakerTag, Vec<&SentenceRecord>> {
        let mut groups: BTreeMap<&SpeakerTag, Vec<&SentenceRecord>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(&record.speaker).or_default().push(record);
        }
        groups
    }

    pub fn speaker_counts(&self) -> BTreeMap<String, usize> {
        self.by_speaker()
            .into_iter()
            .map(|(speaker, records)| (speaker.to_string(), records.len()))
            .collect()
    }

    /// Pretty-printed JSON document keyed by string ids in numeric order
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| VoicesError::format("sentence table", e))
    }

    /// Parse and validate a sentence table document
    ///
    /// Unparseable JSON or a wrong shape is a `Format` error; a record without a
    /// `sentence` is a `MissingField` error. `speaker` defaults to NARRATOR and
    /// extra fields such as `emotions` are ignored.
    pub fn from_json_str(json: &str, context: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).map_err(|e| VoicesError::format(context, e))?;
        let Value::Object(entries) = value else {
            return Err(VoicesError::format(context, "expected an object keyed by sentence id"));
        };

        let mut records = entries
            .iter()
            .map(|(key, body)| parse_record(key, body, context))
            .collect::<Result<Vec<_>>>()?;
        records.sort_by_key(|record| record.id);

        for (expected, record) in (1u32..).zip(&records) {
            if record.id != expected {
                let message = format!(
                    "sentence ids must run 1..={} without gaps, found {} at position {}",
                    records.len(),
                    record.id,
                    expected
                );
                return Err(VoicesError::format(context, message));
            }
        }

        debug!("Loaded {} sentence records from {}", records.len(), context);
        Ok(Self { records })
    }
}

fn parse_record(key: &str, body: &Value, context: &str) -> Result<SentenceRecord> {
    let id = key
        .parse::<u32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            VoicesError::format(context, format!("sentence id {key:?} is not a positive integer"))
        })?;

    let fields: &Map<String, Value> = body
        .as_object()
        .ok_or_else(|| VoicesError::format(context, format!("sentence {key} is not an object")))?;

    let sentence = match fields.get("sentence") {
        None => {
            return Err(VoicesError::MissingField {
                id: key.to_string(),
                field: "sentence",
            })
        }
        Some(Value::String(sentence)) => sentence.clone(),
        Some(_) => {
            let message = format!("sentence {key} has a non-string `sentence`");
            return Err(VoicesError::format(context, message));
        }
    };

    let speaker = match fields.get("speaker") {
        None | Some(Value::Null) => SpeakerTag::Narrator,
        Some(Value::String(speaker)) => SpeakerTag::named(speaker.clone()),
        Some(_) => {
            let message = format!("sentence {key} has a non-string `speaker`");
            return Err(VoicesError::format(context, message));
        }
    };

    Ok(SentenceRecord { id, speaker, sentence })
}

#[derive(Serialize)]
struct RecordBody<'a> {
    speaker: &'a SpeakerTag,
    sentence: &'a str,
}

impl Serialize for SentenceTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(
                &record.id.to_string(),
                &RecordBody {
                    speaker: &record.speaker,
                    sentence: &record.sentence,
                },
            )?;
        }
        map.end()
    }
}
