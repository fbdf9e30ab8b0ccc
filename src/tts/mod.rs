use serde::{
    Deserialize,
    Serialize,
};

use crate::core::EnrichError;

pub mod cache;
pub mod elevenlabs;
pub mod media;
pub mod processor;

pub use cache::{
    media_filename,
    AudioCache,
};
pub use elevenlabs::ElevenLabsClient;
pub use processor::{
    TtsProcessor,
    TtsSummary,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub voice_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Voice {
    pub fn description(&self) -> &str {
        self.description.as_deref().filter(|d| !d.is_empty()).unwrap_or("No description")
    }

    pub fn category(&self) -> &str {
        self.category.as_deref().filter(|c| !c.is_empty()).unwrap_or("Unknown")
    }
}

/// Text-to-speech backend.
///
/// `synthesize` fails with [`EnrichError::InputUnsuitable`] when the service
/// rejects the text itself, and [`EnrichError::Synthesis`] otherwise.
#[allow(async_fn_in_trait)]
pub trait SpeechApi {
    async fn synthesize(
        &self,
        text: &str,
        stability: f32,
        similarity_boost: f32,
    ) -> Result<Vec<u8>, EnrichError>;

    async fn list_voices(&self) -> Result<Vec<Voice>, EnrichError>;
}
