use std::io;

/// Errors raised while configuring or running a training session
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid decay schedule: {0}")]
    Decay(&'static str),

    #[error("Invalid field configuration: {0}")]
    Field(String),

    #[error("Terminal error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
