use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TSV error: {0}")]
    Csv(Box<csv::Error>),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error(
        "Could not connect to Anki at {url}. \
         Make sure Anki is running and AnkiConnect add-on is installed."
    )]
    AnkiUnreachable { url: String },

    #[error("AnkiConnect error ({action}): {message}")]
    AnkiOperation { action: String, message: String },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Deck '{deck}' not found. Available decks: {}", .available.join(", "))]
    DeckNotFound { deck: String, available: Vec<String> },

    #[error("No notes found in deck '{0}'")]
    EmptyDeck(String),

    #[error("Text too short or invalid for TTS: '{0}'. Try longer text.")]
    InputUnsuitable(String),

    #[error("ElevenLabs TTS error: {0}")]
    Synthesis(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<std::io::Error> for EnrichError {
    fn from(error: std::io::Error) -> Self {
        EnrichError::Io(Box::new(error))
    }
}

impl From<csv::Error> for EnrichError {
    fn from(error: csv::Error) -> Self {
        EnrichError::Csv(Box::new(error))
    }
}

impl From<reqwest::Error> for EnrichError {
    fn from(error: reqwest::Error) -> Self {
        EnrichError::Reqwest(Box::new(error))
    }
}
