pub mod domain;
pub mod normalize;
pub mod ports;
pub mod prompt;

pub use domain::{
    AiData, ChatRole, ChatTurn, DegradedResult, DocumentText, FileKind, Flashcard, GenerationMode,
    QuizQuestion, SchemaFragment, StudyMaterial,
};
pub use normalize::{strip_code_fences, Normalizer, JSON_PARSE_ERROR, PROCESS_FALLBACK_LIMIT};
pub use ports::{DocumentFetcher, ModelClient, PortError, PortResult, TextExtractor};
pub use prompt::{build_chat_messages, build_study_prompt};
