//! crates/study_relay_core/src/normalize.rs
//!
//! Turns a raw model reply into `AiData`. Parsing never fails: a reply that is not a
//! study-material object degrades to a `DegradedResult` carrying the cleaned text.

use crate::domain::{char_prefix, AiData, DegradedResult, GenerationMode, StudyMaterial};
use serde_json::Value;
use tracing::warn;

/// Marker placed in `DegradedResult::error`.
pub const JSON_PARSE_ERROR: &str = "JSON_PARSE_ERROR";
/// Characters of raw text kept in the degraded summary for study-aid requests.
pub const PROCESS_FALLBACK_LIMIT: usize = 500;

/// Removes markdown code-fence markers anywhere in `raw`, then trims.
///
/// This is a literal substring pass: fences inside legitimate content are removed too.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    fallback_limit: Option<usize>,
}

impl Normalizer {
    /// A normalizer that keeps the full cleaned text in degraded summaries.
    pub const fn new() -> Self {
        Self { fallback_limit: None }
    }

    /// A normalizer that cuts degraded summaries to `limit` characters.
    pub const fn with_fallback_limit(limit: usize) -> Self {
        Self {
            fallback_limit: Some(limit),
        }
    }

    pub fn normalize(&self, raw: &str, mode: GenerationMode) -> AiData {
        let cleaned = strip_code_fences(raw);

        match parse_material(&cleaned) {
            Ok(material) => {
                let missing = material.missing_fragments(mode);
                if !missing.is_empty() {
                    warn!(%mode, ?missing, "Model reply is missing requested fields.");
                }
                AiData::Material(material)
            }
            Err(reason) => {
                warn!(%mode, %reason, "Failed to parse JSON from model. Wrapping raw response.");
                AiData::Degraded(self.degrade(&cleaned))
            }
        }
    }

    fn degrade(&self, cleaned: &str) -> DegradedResult {
        let summary = match self.fallback_limit {
            Some(limit) => char_prefix(cleaned, limit),
            None => cleaned,
        };
        DegradedResult {
            summary: summary.to_string(),
            quiz: Vec::new(),
            flashcards: Vec::new(),
            error: JSON_PARSE_ERROR.to_string(),
        }
    }
}

/// Only the top level is checked: any JSON object is accepted as study material.
fn parse_material(cleaned: &str) -> Result<StudyMaterial, serde_json::Error> {
    match serde_json::from_str::<Value>(cleaned)? {
        Value::Object(fields) => Ok(StudyMaterial::from_fields(fields)),
        _ => Err(serde::de::Error::custom("reply is not a JSON object")),
    }
}
