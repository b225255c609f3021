use std::sync::Arc;

use serde::{ser::SerializeMap, Serialize, Serializer};
use tracing::{debug, warn};

use crate::ai::{client::TextGenerator, operation::AiOperation};

/// Which engine produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Engine {
    #[serde(rename = "openai")]
    Remote,
    /// No credential configured.
    #[serde(rename = "local")]
    Local,
    /// The remote call failed and the placeholder was used instead.
    #[serde(rename = "local-fallback")]
    LocalFallback,
}

/// Generated text for one operation. Serializes as
/// `{"<result key>": text, "engine": ...}`.
#[derive(Debug, Clone)]
pub struct AiReply {
    pub operation: AiOperation,
    pub text: String,
    pub engine: Engine,
}

impl Serialize for AiReply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.operation.result_key(), &self.text)?;
        map.serialize_entry("engine", &self.engine)?;
        map.end()
    }
}

/// Deterministic stand-in used whenever the remote engine is unavailable.
pub fn local_placeholder(prompt: &str) -> String {
    format!(
        "LOCAL AI MODE (placeholder reply).\n\n\
         Your request:\n{prompt}\n\n\
         (This answer was generated locally because the remote AI engine is unavailable.)"
    )
}

pub struct AiDispatcher {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl AiDispatcher {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn has_remote(&self) -> bool {
        self.generator.is_some()
    }

    /// Never fails: remote errors degrade to the local placeholder.
    pub async fn dispatch(&self, operation: AiOperation, prompt: &str) -> AiReply {
        let Some(generator) = &self.generator else {
            debug!(%operation, "no remote engine configured");
            return AiReply {
                operation,
                text: local_placeholder(prompt),
                engine: Engine::Local,
            };
        };

        match generator.complete(operation.instruction(), prompt).await {
            Ok(text) => AiReply {
                operation,
                text,
                engine: Engine::Remote,
            },
            Err(e) => {
                warn!(error = %e, %operation, "remote AI unavailable, using local fallback");
                AiReply {
                    operation,
                    text: local_placeholder(prompt),
                    engine: Engine::LocalFallback,
                }
            }
        }
    }
}
