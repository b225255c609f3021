use std::{fmt, str::FromStr};

use crate::{ai::dto::AiRequest, auth::services::present, error::AppError};

/// A text transformation the assistant offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiOperation {
    Reformulate,
    Enhance,
    Plan,
    Idea,
    WritingAssistant,
    /// Legacy endpoint: reformulates, answers under `improved`.
    Improve,
}

struct OperationEntry {
    path: &'static str,
    instruction: &'static str,
    result_key: &'static str,
}

const REFORMULATE_INSTRUCTION: &str =
    "You are a writing assistant. Rewrite the user's text so that it is clearer, more fluid \
     and better styled, keeping its meaning and its language.";

impl AiOperation {
    pub const ALL: [AiOperation; 6] = [
        AiOperation::Reformulate,
        AiOperation::Enhance,
        AiOperation::Plan,
        AiOperation::Idea,
        AiOperation::WritingAssistant,
        AiOperation::Improve,
    ];

    fn entry(self) -> OperationEntry {
        match self {
            AiOperation::Reformulate => OperationEntry {
                path: "reformulate",
                instruction: REFORMULATE_INSTRUCTION,
                result_key: "reformulated",
            },
            AiOperation::Enhance => OperationEntry {
                path: "enhance",
                instruction: "You are a writing assistant. Enrich the user's text with more \
                              style, detail and precision without changing its intent.",
                result_key: "enhanced",
            },
            AiOperation::Plan => OperationEntry {
                path: "plan",
                instruction: "You are a writing assistant. Produce a detailed, structured \
                              outline for the user's text or article.",
                result_key: "plan",
            },
            AiOperation::Idea => OperationEntry {
                path: "idea",
                instruction: "You are a creative writing assistant. Propose story ideas that \
                              fit the given genre and build on the given summary.",
                result_key: "ideas",
            },
            AiOperation::WritingAssistant => OperationEntry {
                path: "writing-assistant",
                instruction: "You are a writing assistant. Suggest corrections, improvements \
                              and creative ways to continue the user's text.",
                result_key: "suggestions",
            },
            AiOperation::Improve => OperationEntry {
                path: "improve",
                instruction: REFORMULATE_INSTRUCTION,
                result_key: "improved",
            },
        }
    }

    pub fn path(self) -> &'static str {
        self.entry().path
    }

    pub fn instruction(self) -> &'static str {
        self.entry().instruction
    }

    /// JSON key the generated text is returned under.
    pub fn result_key(self) -> &'static str {
        self.entry().result_key
    }

    /// User message for the model. `idea` needs a summary (genre optional),
    /// every other operation needs non-blank `text`, which is passed through untouched.
    pub fn prompt(self, req: AiRequest) -> Result<String, AppError> {
        match self {
            AiOperation::Idea => {
                let summary = present(req.summary)
                    .ok_or_else(|| AppError::validation("summary is required to generate ideas"))?;
                let genre = present(req.genre).unwrap_or_else(|| "text".to_string());
                Ok(format!("Genre: {genre}\nSummary: {summary}"))
            }
            _ => req
                .text
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| AppError::validation("text is required")),
        }
    }
}

impl fmt::Display for AiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown AI operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for AiOperation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AiOperation::ALL
            .into_iter()
            .find(|op| op.path() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}
