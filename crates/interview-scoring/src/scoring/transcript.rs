use serde::{Deserialize, Serialize};

/// One turn of a recorded interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: String,
    pub content: String,
}

/// Free text or role-tagged messages; free text wins when both are supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptInput {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<TranscriptMessage>>,
}

impl TranscriptInput {
    pub fn into_text(self) -> Result<String, TranscriptError> {
        if let Some(text) = self.text {
            return Ok(text);
        }
        match self.messages {
            Some(messages) if messages.is_empty() => Err(TranscriptError::NoMessages),
            Some(messages) => Ok(format_messages(&messages)),
            None => Err(TranscriptError::Missing),
        }
    }
}

/// Flatten messages as `- role: content` lines.
pub fn format_messages(messages: &[TranscriptMessage]) -> String {
    messages
        .iter()
        .map(|message| format!("- {}: {}\n", message.role, message.content))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranscriptError {
    #[error("request must include either `text` or `messages`")]
    Missing,
    #[error("transcript contains no messages")]
    NoMessages,
}
