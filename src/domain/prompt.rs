use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::action::{DraftAction, UserPromptStyle};

/// Persona and compliance preamble shared by every action
pub const SYSTEM_INSTRUCTION: &str = "You are AutoLex Architect, a senior litigation strategist specializing in California family law and pro per representation.

CORE PRINCIPLES:
- Every factual claim MUST cite a source
- NO fabrication of facts, dates, names, or case numbers
- CRC 2.111 formatting for court documents
- Small, well-placed leverage creates big outcomes

FORMATTING:
- Use proper legal document structure
- Include headers, footers, and page numbering references
- Maintain professional tone throughout
- Cite specific California codes where applicable";

/// System and user prompt for one upstream call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptBundle {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl PromptBundle {
    /// Build the prompt pair for `action`. `now` stamps documents that arrive
    /// without a timestamp of their own.
    pub fn compose(action: DraftAction, payload: &Value, now: DateTime<Utc>) -> Self {
        let profile = action.profile();
        let system_prompt = format!("{}\n\n{}", SYSTEM_INSTRUCTION, profile.system_extension);

        let user_prompt = match profile.user_prompt {
            UserPromptStyle::Passthrough => payload_str(payload, "prompt").unwrap_or("").to_string(),
            UserPromptStyle::DocumentAnalysis { content_limit } => {
                document_prompt(payload, content_limit, now)
            }
        };

        Self {
            system_prompt,
            user_prompt,
        }
    }

    pub fn has_user_content(&self) -> bool {
        !self.user_prompt.trim().is_empty()
    }
}

fn document_prompt(payload: &Value, content_limit: usize, now: DateTime<Utc>) -> String {
    let content = payload_str(payload, "content")
        .filter(|c| !c.is_empty())
        .or_else(|| payload_str(payload, "prompt"))
        .unwrap_or("");
    let content: String = content.chars().take(content_limit).collect();

    // No content means no prompt, so the caller's emptiness check applies.
    if content.trim().is_empty() {
        return String::new();
    }

    let file_name = payload_str(payload, "fileName").unwrap_or("unknown");
    let mime_type = payload_str(payload, "mimeType").unwrap_or("text/plain");
    let timestamp = payload_str(payload, "timestamp")
        .map(str::to_string)
        .unwrap_or_else(|| now.to_rfc3339());

    format!(
        "Analyze and convert the following document:\n\n\
         FILENAME: {}\n\
         MIME TYPE: {}\n\
         TIMESTAMP: {}\n\n\
         CONTENT:\n{}",
        file_name, mime_type, timestamp, content
    )
}

/// Non-empty string field of the payload, if present.
fn payload_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
}
