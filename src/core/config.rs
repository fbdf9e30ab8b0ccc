use std::{
    path::PathBuf,
    time::Duration,
};

use crate::core::EnrichError;

pub const DEFAULT_ANKI_URL: &str = "http://localhost:8765";
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_BULGARIAN_FIELD: &str = "Front";
pub const DEFAULT_AUDIO_FIELD: &str = "Audio";
pub const DEFAULT_CACHE_DIR: &str = "tts_cache";
pub const DEFAULT_TSV_FILE: &str = "bulgarian_words_1000_v2.tsv";
pub const DEFAULT_DECK_NAME: &str = "Rees-Bulgarian-Vocab";
pub const BULGARIAN_EXAMPLE_FIELD: &str = "Bulgarian_Example";
pub const ENGLISH_EXAMPLE_FIELD: &str = "English_Example";

#[derive(Debug, Clone)]
pub struct ExamplesConfig {
    pub anki_url: String,
    pub tsv_file: PathBuf,
    pub deck_name: String,
    pub key_field: String,
    pub bulgarian_example_field: String,
    pub english_example_field: String,
    pub dry_run: bool,
}

impl Default for ExamplesConfig {
    fn default() -> Self {
        Self {
            anki_url: DEFAULT_ANKI_URL.to_string(),
            tsv_file: PathBuf::from(DEFAULT_TSV_FILE),
            deck_name: DEFAULT_DECK_NAME.to_string(),
            key_field: DEFAULT_BULGARIAN_FIELD.to_string(),
            bulgarian_example_field: BULGARIAN_EXAMPLE_FIELD.to_string(),
            english_example_field: ENGLISH_EXAMPLE_FIELD.to_string(),
            dry_run: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub anki_url: String,
    pub api_key: String,
    pub voice_id: String,
    pub bulgarian_field: String,
    pub audio_field: String,
    pub rate_limit_delay: Duration,
    pub stability: f32,
    pub similarity_boost: f32,
    /// `None` disables the local audio cache.
    pub cache_dir: Option<PathBuf>,
    pub dry_run: bool,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            anki_url: DEFAULT_ANKI_URL.to_string(),
            api_key: String::new(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            bulgarian_field: DEFAULT_BULGARIAN_FIELD.to_string(),
            audio_field: DEFAULT_AUDIO_FIELD.to_string(),
            rate_limit_delay: Duration::from_millis(500),
            stability: 0.75,
            similarity_boost: 0.75,
            cache_dir: Some(PathBuf::from(DEFAULT_CACHE_DIR)),
            dry_run: false,
        }
    }
}

impl TtsConfig {
    pub fn validate(&self) -> Result<(), EnrichError> {
        check_unit_range("stability", self.stability)?;
        check_unit_range("similarity boost", self.similarity_boost)?;

        if self.bulgarian_field.trim().is_empty() {
            return Err(EnrichError::Config("Bulgarian field name is empty".to_string()));
        }
        if self.audio_field.trim().is_empty() {
            return Err(EnrichError::Config("audio field name is empty".to_string()));
        }
        if self.bulgarian_field == self.audio_field {
            return Err(EnrichError::Config(format!(
                "Bulgarian and audio field are both '{}'",
                self.audio_field
            )));
        }
        if self.voice_id.trim().is_empty() {
            return Err(EnrichError::Config("voice id is empty".to_string()));
        }
        Ok(())
    }
}

fn check_unit_range(name: &str, value: f32) -> Result<(), EnrichError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(EnrichError::Config(format!("{} must be within 0.0-1.0, got {}", name, value)));
    }
    Ok(())
}

/// Parses a delay in seconds, as given by `RATE_LIMIT_DELAY` or `--rate-limit-delay`.
pub fn parse_delay(value: &str) -> Result<Duration, EnrichError> {
    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|_| EnrichError::Config(format!("invalid delay '{}'", value)))?;
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        EnrichError::Config(format!("delay must be a non-negative number, got '{}'", value))
    })
}
