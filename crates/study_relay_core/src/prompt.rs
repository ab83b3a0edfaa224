//! crates/study_relay_core/src/prompt.rs
//!
//! Builds the text sent to the model: a single study-aid prompt per mode, or a
//! persona-primed message sequence for chat.

use crate::domain::{ChatTurn, DocumentText, GenerationMode};

/// Characters of document text embedded in a study-aid prompt.
pub const STUDY_CONTEXT_LIMIT: usize = 30_000;
/// Characters of document text given to the chat persona.
pub const CHAT_CONTEXT_LIMIT: usize = 50_000;

pub const DOCUMENT_OPEN: &str = "<document>\n";
pub const DOCUMENT_CLOSE: &str = "\n</document>";

const STUDY_TEMPLATE: &str = r#"You are an expert AI tutor.
I will provide you with a text from a study material.
Your goal is to extract the key information and generate study aids.

Please output a VALID JSON object with the following structure (do not use markdown backticks in output, just raw JSON):
{
{schema}
}

Only include the fields shown above. Respond with the JSON object and nothing else.

TEXT TO ANALYZE:
{document}

(Note: Text truncated to the first {limit} characters if it was longer.)"#;

const CHAT_PERSONA_TEMPLATE: &str = r#"You are A+ Gerima, a friendly and patient AI tutor.
A student is studying the material below and will ask you questions about it.

Guidelines:
- Ground your answers in the study material. If the material does not cover something, say so before using general knowledge.
- Explain concepts clearly, with short examples when they help.
- Keep answers focused and conversational; use plain text or light markdown.

STUDY MATERIAL:
{document}"#;

const CHAT_ACKNOWLEDGEMENT: &str =
    "Understood. I've read the study material and I'm ready to help you learn it.";

/// Builds the study-aid prompt for `mode`, embedding at most `STUDY_CONTEXT_LIMIT`
/// characters of the document.
pub fn build_study_prompt(text: &DocumentText, mode: GenerationMode) -> String {
    let schema = mode
        .fragments()
        .iter()
        .map(|fragment| fragment.skeleton())
        .collect::<Vec<_>>()
        .join(",\n");

    // The document goes in last so text that happens to contain a placeholder is left alone.
    STUDY_TEMPLATE
        .replace("{schema}", &schema)
        .replace("{limit}", &STUDY_CONTEXT_LIMIT.to_string())
        .replace("{document}", &delimit(text.prefix(STUDY_CONTEXT_LIMIT)))
}

/// Builds the chat message sequence: persona pair, then `history` in order, then `message`.
pub fn build_chat_messages(text: &DocumentText, message: &str, history: &[ChatTurn]) -> Vec<ChatTurn> {
    let persona = CHAT_PERSONA_TEMPLATE.replace("{document}", &delimit(text.prefix(CHAT_CONTEXT_LIMIT)));

    let mut turns = Vec::with_capacity(history.len() + 3);
    turns.push(ChatTurn::user(persona));
    turns.push(ChatTurn::model(CHAT_ACKNOWLEDGEMENT));
    turns.extend(history.iter().cloned());
    turns.push(ChatTurn::user(message));
    turns
}

/// Returns the document segment embedded in a built prompt, if present.
#[cfg(test)]
fn embedded_document(prompt: &str) -> Option<&str> {
    let start = prompt.find(DOCUMENT_OPEN)? + DOCUMENT_OPEN.len();
    let end = prompt.rfind(DOCUMENT_CLOSE)?;
    prompt.get(start..end)
}

fn delimit(segment: &str) -> String {
    format!("{DOCUMENT_OPEN}{segment}{DOCUMENT_CLOSE}")
}
