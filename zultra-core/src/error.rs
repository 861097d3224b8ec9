use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl BotError {
    /// Generic user-facing line for this kind of error. Handlers send this
    /// instead of internal detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            BotError::Config(_) => "The bot is misconfigured. Please contact an administrator.",
            BotError::Persistence(_) => "A storage problem occurred. Please try again later.",
            BotError::ExternalService(_) => {
                "An external service is unavailable right now. Please try again later."
            }
            BotError::PermissionDenied => "You don't have permission to use this command.",
            BotError::Transport(_) | BotError::Io(_) | BotError::Unexpected(_) => {
                "Something went wrong. Please try again later."
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
