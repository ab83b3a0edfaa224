//! crates/study_relay_core/src/domain.rs
//!
//! Defines the pure, core data structures for the relay.
//! Everything here lives for the duration of a single request; nothing is persisted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

//=========================================================================================
// Generation Modes and Schema Fragments
//=========================================================================================

/// The subset of study-material kinds a caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GenerationMode {
    Summary,
    Quiz,
    Flashcards,
    #[default]
    All,
}

impl GenerationMode {
    /// Resolves a caller-supplied mode string. Anything unrecognised resolves to `All`.
    pub fn from_request(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "summary" => Self::Summary,
            "quiz" => Self::Quiz,
            "flashcards" => Self::Flashcards,
            _ => Self::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Quiz => "quiz",
            Self::Flashcards => "flashcards",
            Self::All => "all",
        }
    }

    /// The schema fragments requested from the model for this mode, in prompt order.
    pub fn fragments(self) -> &'static [SchemaFragment] {
        match self {
            Self::Summary => &[SchemaFragment::Summary, SchemaFragment::KeyPoints],
            Self::Quiz => &[SchemaFragment::Quiz],
            Self::Flashcards => &[SchemaFragment::Flashcards],
            Self::All => &[
                SchemaFragment::Summary,
                SchemaFragment::KeyPoints,
                SchemaFragment::Quiz,
                SchemaFragment::Flashcards,
            ],
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One top-level field of the study-material object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaFragment {
    Summary,
    KeyPoints,
    Quiz,
    Flashcards,
}

impl SchemaFragment {
    /// The JSON key this fragment occupies.
    pub fn key(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::KeyPoints => "key_points",
            Self::Quiz => "quiz",
            Self::Flashcards => "flashcards",
        }
    }

    /// The example JSON member shown to the model for this fragment.
    pub fn skeleton(self) -> &'static str {
        match self {
            Self::Summary => r#"    "summary": "A concise summary of the text (max 300 words).""#,
            Self::KeyPoints => r#"    "key_points": ["Point 1", "Point 2", "Point 3"]"#,
            Self::Quiz => {
                r#"    "quiz": [
        {
            "question": "Question text?",
            "options": ["Option A", "Option B", "Option C", "Option D"],
            "answer": "Option A"
        },
        ... (generate 3 questions)
    ]"#
            }
            Self::Flashcards => {
                r#"    "flashcards": [
        { "front": "Term", "back": "Definition" },
        ... (generate 5 flashcards)
    ]"#
            }
        }
    }
}

//=========================================================================================
// Documents
//=========================================================================================

/// How the caller labelled the referenced file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    /// Raw text or a web page reference (`Ref_TEXT` / `Ref_URL`).
    Reference,
    Other(String),
}

impl FileKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "PDF" => Self::Pdf,
            "Ref_TEXT" | "Ref_URL" => Self::Reference,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Plain text extracted from a document. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentText(String);

impl DocumentText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty document short-circuits the pipeline before the model is called.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Length in characters, not bytes.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// The first `limit` characters of the text.
    pub fn prefix(&self, limit: usize) -> &str {
        char_prefix(&self.0, limit)
    }
}

/// Cuts `text` after `limit` characters without splitting a code point.
pub fn char_prefix(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

//=========================================================================================
// Study Material
//=========================================================================================

/// A multiple-choice question read leniently from the model reply.
///
/// `answer` is expected to be one of `options`, but nothing enforces it. Options that
/// are not strings are rendered as JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub question: Option<String>,
    pub options: Vec<String>,
    pub answer: Option<String>,
}

impl QuizQuestion {
    fn from_value(value: &Value) -> Option<Self> {
        let item = value.as_object()?;
        Some(Self {
            question: string_field(item, "question"),
            options: item
                .get("options")
                .and_then(Value::as_array)
                .map(|options| options.iter().map(display_value).collect())
                .unwrap_or_default(),
            answer: string_field(item, "answer"),
        })
    }
}

/// A flashcard read leniently from the model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub front: Option<String>,
    pub back: Option<String>,
}

impl Flashcard {
    fn from_value(value: &Value) -> Option<Self> {
        let item = value.as_object()?;
        Some(Self {
            front: string_field(item, "front"),
            back: string_field(item, "back"),
        })
    }
}

/// The study aids returned by the model.
///
/// The reply object is kept exactly as received, so missing, extra or `null` fields
/// pass through to the caller untouched. The accessors give a typed view of the
/// known fields and skip anything that does not fit it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudyMaterial {
    fields: Map<String, Value>,
}

impl StudyMaterial {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn summary(&self) -> Option<&str> {
        self.fields.get("summary").and_then(Value::as_str)
    }

    /// String entries of `key_points`.
    pub fn key_points(&self) -> Vec<&str> {
        self.array(SchemaFragment::KeyPoints)
            .filter_map(Value::as_str)
            .collect()
    }

    /// Object entries of `quiz`.
    pub fn quiz(&self) -> Vec<QuizQuestion> {
        self.array(SchemaFragment::Quiz)
            .filter_map(QuizQuestion::from_value)
            .collect()
    }

    /// Object entries of `flashcards`.
    pub fn flashcards(&self) -> Vec<Flashcard> {
        self.array(SchemaFragment::Flashcards)
            .filter_map(Flashcard::from_value)
            .collect()
    }

    /// Fragments requested by `mode` that the model left out or sent as `null`.
    pub fn missing_fragments(&self, mode: GenerationMode) -> Vec<SchemaFragment> {
        mode.fragments()
            .iter()
            .copied()
            .filter(|fragment| self.fields.get(fragment.key()).map_or(true, Value::is_null))
            .collect()
    }

    fn array(&self, fragment: SchemaFragment) -> impl Iterator<Item = &Value> {
        self.fields
            .get(fragment.key())
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
    }
}

fn string_field(item: &Map<String, Value>, key: &str) -> Option<String> {
    item.get(key).and_then(Value::as_str).map(str::to_string)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// The fallback payload used when the model reply could not be parsed.
/// `quiz` and `flashcards` are always empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedResult {
    pub summary: String,
    pub quiz: Vec<Value>,
    pub flashcards: Vec<Value>,
    pub error: String,
}

/// What the normalizer hands back: parsed material or the degraded fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AiData {
    Material(StudyMaterial),
    Degraded(DegradedResult),
}

//=========================================================================================
// Chat
//=========================================================================================

/// Who authored a chat turn. Web clients send `assistant` (or `bot`) for model turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    #[serde(alias = "assistant", alias = "bot")]
    Model,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}
