use std::{
    fs,
    io,
    path::PathBuf,
};

use crate::core::{
    utils::text_digest,
    EnrichError,
};

/// Deterministic name shared by the local cache and Anki's media store.
pub fn media_filename(clean_text: &str) -> String {
    format!("tts_bg_{}.mp3", text_digest(clean_text))
}

/// Synthesized audio on local disk, keyed by the digest of the cleaned text.
///
/// Entries are never evicted; the vocabulary is a fixed list.
#[derive(Debug, Clone)]
pub struct AudioCache {
    dir: PathBuf,
}

impl AudioCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, clean_text: &str) -> PathBuf {
        self.dir.join(media_filename(clean_text))
    }

    pub fn lookup(&self, clean_text: &str) -> Result<Option<Vec<u8>>, EnrichError> {
        match fs::read(self.path_for(clean_text)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn store(&self, clean_text: &str, audio: &[u8]) -> Result<PathBuf, EnrichError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(clean_text);
        fs::write(&path, audio)?;
        Ok(path)
    }
}
