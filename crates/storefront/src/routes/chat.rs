//! Chat widget endpoints (HTMX fragments).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::chat::{ChatMessage, ChatTranscript};
use crate::error::Result;
use crate::i18n::Translator;
use crate::page::translator_for;
use crate::state::AppState;

/// Chat transcript fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/chat_messages.html")]
pub struct ChatMessagesTemplate {
    pub t: Translator,
    pub messages: Vec<ChatMessage>,
}

/// Chat message form data.
#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

/// Show the transcript.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let transcript = ChatTranscript::load(&session).await;
    ChatMessagesTemplate {
        t: translator_for(&state, &session).await,
        messages: transcript.messages().to_vec(),
    }
}

/// Post a visitor message and answer with the updated transcript.
#[instrument(skip(state, session, form))]
pub async fn send(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ChatForm>,
) -> Result<impl IntoResponse> {
    let mut transcript = ChatTranscript::load(&session).await;
    if transcript.ask(&form.message) {
        transcript.save(&session).await?;
    }

    Ok(ChatMessagesTemplate {
        t: translator_for(&state, &session).await,
        messages: transcript.messages().to_vec(),
    })
}

/// Create the chat routes router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(show).post(send))
}
