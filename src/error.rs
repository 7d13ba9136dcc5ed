use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("could not encode store: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("task title cannot be empty")]
    EmptyTitle,

    #[error("default tasks in the '{column}' column cannot be removed")]
    ProtectedTask { id: String, column: &'static str },

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("invalid board data: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("session expired, please log in again")]
    SessionExpired,

    #[error("request failed with status {0}")]
    Status(u16),

    #[error("could not reach the server: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(#[from] io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub type Result<T, E = BoardError> = std::result::Result<T, E>;
