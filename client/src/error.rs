#[derive(Debug, thiserror::Error)]
pub enum ChatClientError {
    #[error("Username does not exist or role does not match")]
    UserNotFound,

    #[error("Incorrect password")]
    BadCredential,

    #[error("Failed to open channel: {0}")]
    ChannelOpen(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ChatClientError>;
