//! Enriches Anki vocabulary notes through AnkiConnect: example sentences
//! from a TSV file, and Bulgarian TTS audio from ElevenLabs.

pub mod anki;
pub mod core;
pub mod sentences;
pub mod tts;

#[cfg(test)]
mod testing;
