use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::services::ai;
use crate::state::AppState;

// POST /api/assistant
#[derive(Deserialize)]
pub struct AssistantRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct AssistantResponse {
    pub reply: String,
}

/// Style-assistant passthrough. Provider failures never reach the
/// customer; they get the canned apology instead.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AssistantRequest>,
) -> Json<AssistantResponse> {
    let reply = match state
        .llm
        .reply(ai::STYLE_ASSISTANT_INSTRUCTION, &body.message)
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(error = %e, "assistant provider failed, using fallback reply");
            ai::FALLBACK_REPLY.to_string()
        }
    };

    Json(AssistantResponse { reply })
}
