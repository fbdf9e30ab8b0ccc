use std::fmt;

/// Anything smaller is an empty or truncated download, not speech.
pub const MIN_AUDIO_BYTES: usize = 1024;

const ID3_TAG: &[u8] = b"ID3";
const FRAME_SYNC: [[u8; 2]; 4] = [[0xFF, 0xFB], [0xFF, 0xFA], [0xFF, 0xF3], [0xFF, 0xF2]];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidAudio {
    TooSmall(usize),
    NotMp3,
}

impl fmt::Display for InvalidAudio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidAudio::TooSmall(len) => {
                write!(f, "too small ({} bytes) - likely empty or corrupted", len)
            }
            InvalidAudio::NotMp3 => write!(f, "doesn't appear to be valid MP3 format"),
        }
    }
}

/// Cheap header check: at least 1KB and starting with an ID3 tag or an MPEG frame sync.
pub fn validate_mp3(data: &[u8]) -> Result<(), InvalidAudio> {
    if data.len() < MIN_AUDIO_BYTES {
        return Err(InvalidAudio::TooSmall(data.len()));
    }
    if data.starts_with(ID3_TAG) || FRAME_SYNC.iter().any(|sync| data.starts_with(sync)) {
        return Ok(());
    }
    Err(InvalidAudio::NotMp3)
}
