use tokio_tungstenite::tungstenite::Error as WsError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("WebSocket error: {0}")]
    Ws(#[from] WsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Signaling error: {0}")]
    Signaling(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("User session already assigned for peer {0}")]
    SessionAlreadyAssigned(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
