use std::time::Duration;

use log::debug;
use reqwest::{
    Client,
    StatusCode,
};
use serde::{
    Deserialize,
    Serialize,
};

use super::{
    SpeechApi,
    Voice,
};
use crate::core::{
    http::{
        error_body,
        http_client,
    },
    EnrichError,
};

pub const API_BASE: &str = "https://api.elevenlabs.io";
/// Multilingual model; the monolingual ones cannot speak Bulgarian.
pub const MODEL_ID: &str = "eleven_multilingual_v2";
pub const OUTPUT_FORMAT: &str = "mp3_44100_128";
/// The service refuses very short input.
pub const MIN_TEXT_CHARS: usize = 3;

#[derive(Debug, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

#[derive(Debug, Serialize)]
pub struct SynthesisRequest<'a> {
    pub text: &'a str,
    pub model_id: &'a str,
    pub voice_settings: VoiceSettings,
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    voices: Vec<Voice>,
}

/// Pads text below the minimum length with a trailing period.
pub fn pad_short_text(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() < MIN_TEXT_CHARS {
        format!("{}.", text)
    } else {
        text.to_string()
    }
}

pub struct ElevenLabsClient {
    client: Client,
    api_key: String,
    voice_id: String,
    base_url: String,
}

impl ElevenLabsClient {
    pub fn new(
        api_key: impl Into<String>,
        voice_id: impl Into<String>,
    ) -> Result<Self, EnrichError> {
        Ok(Self {
            client: http_client(Duration::from_secs(60))?,
            api_key: api_key.into(),
            voice_id: voice_id.into(),
            base_url: API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn speech_url(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.base_url, self.voice_id, OUTPUT_FORMAT
        )
    }
}

impl SpeechApi for ElevenLabsClient {
    async fn synthesize(
        &self,
        text: &str,
        stability: f32,
        similarity_boost: f32,
    ) -> Result<Vec<u8>, EnrichError> {
        let text = pad_short_text(text);
        let request = SynthesisRequest {
            text: &text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings {
                stability,
                similarity_boost,
                style: 0.0,
                use_speaker_boost: true,
            },
        };
        debug!("Requesting TTS for '{}' with voice {}", text, self.voice_id);

        let resp = self
            .client
            .post(self.speech_url())
            .header("xi-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EnrichError::Synthesis(e.to_string()))?;

        match resp.status() {
            StatusCode::BAD_REQUEST => Err(EnrichError::InputUnsuitable(text)),
            status if !status.is_success() => Err(EnrichError::Synthesis(error_body(resp).await)),
            _ => {
                let audio = resp.bytes().await.map_err(|e| EnrichError::Synthesis(e.to_string()))?;
                Ok(audio.to_vec())
            }
        }
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, EnrichError> {
        let resp = self
            .client
            .get(format!("{}/v1/voices", self.base_url))
            .header("xi-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| EnrichError::Synthesis(format!("Error fetching voices: {}", e)))?;

        if !resp.status().is_success() {
            let body = error_body(resp).await;
            return Err(EnrichError::Synthesis(format!("Error fetching voices: {}", body)));
        }

        let voices: VoicesResponse = resp.json().await?;
        Ok(voices.voices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serve_once;

    #[test]
    fn test_pad_short_text() {
        assert_eq!(pad_short_text("да"), "да.");
        assert_eq!(pad_short_text(" я "), "я.");
        assert_eq!(pad_short_text("две"), "две");
        assert_eq!(pad_short_text("Здравей"), "Здравей");
    }

    #[test]
    fn test_synthesis_request_body() {
        let request = SynthesisRequest {
            text: "Здравей",
            model_id: MODEL_ID,
            voice_settings: VoiceSettings {
                stability: 0.75,
                similarity_boost: 0.5,
                style: 0.0,
                use_speaker_boost: true,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["text"], "Здравей");
        assert_eq!(json["model_id"], "eleven_multilingual_v2");
        assert_eq!(json["voice_settings"]["stability"], 0.75);
        assert_eq!(json["voice_settings"]["similarity_boost"], 0.5);
        assert_eq!(json["voice_settings"]["use_speaker_boost"], true);
    }

    #[test]
    fn test_parse_voices() {
        let json = r#"{"voices": [
            {"voice_id": "21m00Tcm4TlvDq8ikWAM", "name": "Rachel", "category": "premade",
             "description": null, "labels": {"accent": "american"}},
            {"voice_id": "abc", "name": "Custom"}
        ]}"#;
        let parsed: VoicesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.voices.len(), 2);
        assert_eq!(parsed.voices[0].name, "Rachel");
        assert_eq!(parsed.voices[0].description(), "No description");
        assert_eq!(parsed.voices[0].category(), "premade");
        assert_eq!(parsed.voices[1].category(), "Unknown");
    }

    #[test]
    fn test_speech_url() {
        let client = ElevenLabsClient::new("key", "voice123")
            .unwrap()
            .with_base_url("http://localhost:9000/");
        assert_eq!(
            client.speech_url(),
            "http://localhost:9000/v1/text-to-speech/voice123?output_format=mp3_44100_128"
        );
    }

    #[tokio::test]
    async fn test_bad_request_is_unsuitable_input() {
        let url = serve_once("400 Bad Request", r#"{"detail": "text too short"}"#).await;
        let client = ElevenLabsClient::new("key", "voice123").unwrap().with_base_url(url);
        match client.synthesize("да", 0.75, 0.75).await {
            Err(EnrichError::InputUnsuitable(text)) => assert_eq!(text, "да."),
            other => panic!("Expected InputUnsuitable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_synthesis_failure() {
        let url = serve_once("500 Internal Server Error", r#"{"detail": "overloaded"}"#).await;
        let client = ElevenLabsClient::new("key", "voice123").unwrap().with_base_url(url);
        match client.synthesize("Здравей", 0.75, 0.75).await {
            Err(EnrichError::Synthesis(message)) => {
                assert!(message.contains("500"));
                assert!(message.contains("overloaded"));
            }
            other => panic!("Expected Synthesis, got {:?}", other),
        }
    }
}
