use serde::Deserialize;

/// Body of every AI endpoint. `idea` reads `genre`/`summary`, the others `text`.
#[derive(Debug, Default, Deserialize)]
pub struct AiRequest {
    pub text: Option<String>,
    pub genre: Option<String>,
    pub summary: Option<String>,
}
