//! Tool outcomes and the wire envelope
//!
//! Normalizers produce a [`ToolOutcome`]; only the router turns it into a
//! [`ResultEnvelope`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a tool produced: a payload, or a business-level failure message
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(Value),
    Failure(String),
}

impl ToolOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// A single content block inside an envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

/// Uniform result returned for every tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ResultEnvelope {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// Text of the first content block
    pub fn text(&self) -> &str {
        match self.content.first() {
            Some(ContentBlock::Text { text }) => text,
            None => "",
        }
    }

    /// First content block parsed as JSON, if it is JSON
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(self.text()).ok()
    }
}

impl From<ToolOutcome> for ResultEnvelope {
    fn from(outcome: ToolOutcome) -> Self {
        match outcome {
            ToolOutcome::Success(payload) => match serde_json::to_string_pretty(&payload) {
                Ok(text) => Self::success(text),
                Err(e) => Self::error(format!("Error: {}", e)),
            },
            ToolOutcome::Failure(message) => Self::error(message),
        }
    }
}
