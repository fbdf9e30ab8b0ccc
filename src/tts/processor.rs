use std::{
    collections::HashMap,
    fmt,
};

use log::{
    debug,
    info,
    warn,
};
use tokio::time::sleep;

use super::{
    cache::{
        media_filename,
        AudioCache,
    },
    media::validate_mp3,
    SpeechApi,
};
use crate::{
    anki::{
        notes_in_deck_by_cards,
        AnkiApi,
        FieldValue,
        MediaReference,
        Note,
    },
    core::{
        utils::{
            check_tts_suitability,
            clean_text_for_tts,
            preview,
            Unsuitable,
        },
        EnrichError,
        TtsConfig,
    },
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TtsSummary {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl TtsSummary {
    pub fn print(&self) {
        println!("\nProcessing complete!");
        println!("Processed: {}", self.processed);
        println!("Skipped: {}", self.skipped);
        println!("Errors: {}", self.errors);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MissingTextField(String),
    EmptyText,
    Unsuitable(Unsuitable),
    MissingAudioField(String),
    HasValidAudio(String),
    AlreadyInMedia(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingTextField(field) => write!(f, "field '{}' not found", field),
            SkipReason::EmptyText => write!(f, "text field is empty"),
            SkipReason::Unsuitable(reason) => write!(f, "{}", reason),
            SkipReason::MissingAudioField(field) => write!(f, "audio field '{}' not found", field),
            SkipReason::HasValidAudio(file) => {
                write!(f, "audio field has valid content ({})", file)
            }
            SkipReason::AlreadyInMedia(file) => {
                write!(f, "audio file '{}' already exists in Anki media collection", file)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NoteOutcome {
    Generated { filename: String, from_cache: bool },
    WouldGenerate { filename: String },
    Skipped(SkipReason),
}

pub struct TtsProcessor<A: AnkiApi, S: SpeechApi> {
    anki: A,
    speech: S,
    cache: Option<AudioCache>,
    config: TtsConfig,
}

impl<A: AnkiApi, S: SpeechApi> TtsProcessor<A, S> {
    pub fn new(anki: A, speech: S, config: TtsConfig) -> Self {
        let cache = config.cache_dir.clone().map(AudioCache::new);
        Self { anki, speech, cache, config }
    }

    pub fn anki(&self) -> &A {
        &self.anki
    }

    pub fn speech(&self) -> &S {
        &self.speech
    }

    pub async fn process_deck(&self, deck_name: &str) -> Result<TtsSummary, EnrichError> {
        info!("Processing deck: {}", deck_name);

        let notes = notes_in_deck_by_cards(&self.anki, deck_name).await?;
        let mut summary = TtsSummary::default();
        if notes.is_empty() {
            info!("No cards found in deck");
            return Ok(summary);
        }
        info!("Found {} notes in deck", notes.len());

        for note in &notes {
            match self.process_note(note).await {
                Ok(NoteOutcome::Generated { .. } | NoteOutcome::WouldGenerate { .. }) => {
                    summary.processed += 1
                }
                Ok(NoteOutcome::Skipped(reason)) => {
                    debug!("Skipping note {}: {}", note.note_id, reason);
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!("Error processing note {}: {}", note.note_id, e);
                    summary.errors += 1;
                }
            }
        }

        Ok(summary)
    }

    pub async fn process_note(&self, note: &Note) -> Result<NoteOutcome, EnrichError> {
        let text_field = &self.config.bulgarian_field;
        let raw_text = match note.field(text_field) {
            FieldValue::Missing => {
                warn!("Field '{}' not found in note {}", text_field, note.note_id);
                return Ok(NoteOutcome::Skipped(SkipReason::MissingTextField(text_field.clone())));
            }
            FieldValue::Empty => return Ok(NoteOutcome::Skipped(SkipReason::EmptyText)),
            FieldValue::Filled(text) => text,
        };

        let clean_text = clean_text_for_tts(raw_text);
        if let Err(reason) = check_tts_suitability(&clean_text) {
            info!("Skipping text '{}': {}", preview(&clean_text, 20), reason);
            return Ok(NoteOutcome::Skipped(SkipReason::Unsuitable(reason)));
        }

        let audio_field = &self.config.audio_field;
        match note.field(audio_field) {
            FieldValue::Missing => {
                warn!("Audio field '{}' not found in note {}", audio_field, note.note_id);
                return Ok(NoteOutcome::Skipped(SkipReason::MissingAudioField(audio_field.clone())));
            }
            FieldValue::Filled(content) => {
                if let Some(valid) = self.check_existing_audio(note.note_id, content).await? {
                    info!(
                        "Audio field has valid content for note {} (file: {})",
                        note.note_id, valid.filename
                    );
                    return Ok(NoteOutcome::Skipped(SkipReason::HasValidAudio(valid.filename)));
                }
            }
            FieldValue::Empty => {}
        }

        // From here on the audio field is empty, or would be outside a dry run.
        let filename = media_filename(&clean_text);
        if self.media_is_valid(&filename).await? {
            info!(
                "Audio file '{}' already exists in Anki media collection for note {}",
                filename, note.note_id
            );
            if !self.config.dry_run {
                self.set_audio_field(note.note_id, &MediaReference::new(&filename).to_field_value())
                    .await?;
            }
            info!("Added existing audio reference to note {}", note.note_id);
            return Ok(NoteOutcome::Skipped(SkipReason::AlreadyInMedia(filename)));
        }

        info!("Processing: {}", preview(&clean_text, 50));
        if self.config.dry_run {
            info!("[DRY RUN] Would generate TTS for: {}", clean_text);
            return Ok(NoteOutcome::WouldGenerate { filename });
        }

        let (audio, from_cache) = self.audio_for(&clean_text).await?;

        // The local cache can outlive the media store, so always push.
        self.anki.store_media_file(&filename, &audio).await?;
        self.set_audio_field(note.note_id, &MediaReference::new(&filename).to_field_value()).await?;
        info!("Successfully added audio to note {}", note.note_id);

        sleep(self.config.rate_limit_delay).await;
        Ok(NoteOutcome::Generated { filename, from_cache })
    }

    /// Returns the reference when it points at usable audio. Otherwise the
    /// field is cleared unless this is a dry run; the media file itself stays.
    async fn check_existing_audio(
        &self,
        note_id: u64,
        content: &str,
    ) -> Result<Option<MediaReference>, EnrichError> {
        match MediaReference::find(content) {
            Some(reference) => match self.anki.retrieve_media_file(&reference.filename).await? {
                Some(data) => match validate_mp3(&data) {
                    Ok(()) => return Ok(Some(reference)),
                    Err(problem) => warn!(
                        "Audio field references invalid file '{}' for note {} ({}), regenerating",
                        reference.filename, note_id, problem
                    ),
                },
                None => warn!(
                    "Audio field references missing file '{}' for note {}, regenerating",
                    reference.filename, note_id
                ),
            },
            None => warn!(
                "Audio field has unrecognized content for note {}: '{}', regenerating",
                note_id, content
            ),
        }

        if !self.config.dry_run {
            self.set_audio_field(note_id, "").await?;
        }
        Ok(None)
    }

    async fn media_is_valid(&self, filename: &str) -> Result<bool, EnrichError> {
        match self.anki.retrieve_media_file(filename).await? {
            Some(data) => match validate_mp3(&data) {
                Ok(()) => Ok(true),
                Err(problem) => {
                    debug!("Media file '{}' exists but is {}", filename, problem);
                    Ok(false)
                }
            },
            None => Ok(false),
        }
    }

    async fn audio_for(&self, clean_text: &str) -> Result<(Vec<u8>, bool), EnrichError> {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.lookup(clean_text)? {
                match validate_mp3(&cached) {
                    Ok(()) => {
                        info!("Using cached audio");
                        return Ok((cached, true));
                    }
                    Err(problem) => warn!(
                        "Cached audio {} is {}, regenerating",
                        cache.path_for(clean_text).display(),
                        problem
                    ),
                }
            }
        }

        let audio = self
            .speech
            .synthesize(clean_text, self.config.stability, self.config.similarity_boost)
            .await?;
        if let Some(cache) = &self.cache {
            cache.store(clean_text, &audio)?;
        }
        info!("Generated new TTS audio");
        Ok((audio, false))
    }

    async fn set_audio_field(&self, note_id: u64, value: &str) -> Result<(), EnrichError> {
        let fields = HashMap::from([(self.config.audio_field.clone(), value.to_string())]);
        self.anki.update_note_fields(note_id, &fields).await
    }
}
