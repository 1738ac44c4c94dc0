use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotebookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid image data for '{name}': {source}")]
    Base64 {
        name: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Markdown error: {0}")]
    Markdown(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl From<confique::Error> for NotebookError {
    fn from(err: confique::Error) -> Self {
        NotebookError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NotebookError>;
