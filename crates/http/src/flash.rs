//! One-shot notices carried across a redirect.
//!
//! A handler pushes a [`FlashMessage`] into the session before redirecting; the
//! next page handler extracts [`FlashMessages`], which removes them from the
//! session so they render exactly once.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::AppError;

const FLASH_SESSION_KEY: &str = "_flash_messages";

/// Flash message severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    /// CSS class used by the page layout.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "flash-success",
            Self::Error => "flash-error",
        }
    }
}

/// A single flash message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub message: String,
}

impl FlashMessage {
    pub fn new(kind: FlashKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FlashKind::Error, message)
    }
}

/// Flash messages extractor; extraction consumes them from the session.
#[derive(Debug, Default)]
pub struct FlashMessages {
    messages: Vec<FlashMessage>,
}

impl FlashMessages {
    /// Messages that were pending for this request.
    pub fn messages(&self) -> &[FlashMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<FlashMessage> {
        self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Queue a message for the next rendered page.
    pub async fn push(session: &Session, message: FlashMessage) -> Result<(), AppError> {
        let mut messages: Vec<FlashMessage> = session
            .get(FLASH_SESSION_KEY)
            .await
            .map_err(|e| anyhow::anyhow!("failed to read flash messages: {e}"))?
            .unwrap_or_default();

        messages.push(message);

        session
            .insert(FLASH_SESSION_KEY, &messages)
            .await
            .map_err(|e| anyhow::anyhow!("failed to write flash messages: {e}"))?;
        Ok(())
    }

    /// Read and remove pending messages.
    pub async fn take(session: &Session) -> Result<Self, AppError> {
        let messages: Vec<FlashMessage> = session
            .remove(FLASH_SESSION_KEY)
            .await
            .map_err(|e| anyhow::anyhow!("failed to read flash messages: {e}"))?
            .unwrap_or_default();

        Ok(Self { messages })
    }
}

impl<S> FromRequestParts<S> for FlashMessages
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts.extensions.get::<Session>().cloned().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "session not found in request extensions for flash messages"
            ))
        })?;

        Self::take(&session).await
    }
}
