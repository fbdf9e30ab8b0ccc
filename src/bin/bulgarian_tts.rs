use std::{
    path::PathBuf,
    time::Duration,
};

use anki_enrich::{
    anki::{
        check_connection,
        AnkiApi,
        AnkiConnect,
    },
    core::{
        config::{
            parse_delay,
            DEFAULT_ANKI_URL,
            DEFAULT_AUDIO_FIELD,
            DEFAULT_BULGARIAN_FIELD,
            DEFAULT_CACHE_DIR,
            DEFAULT_VOICE_ID,
        },
        TtsConfig,
    },
    tts::{
        ElevenLabsClient,
        SpeechApi,
        TtsProcessor,
    },
};
use anyhow::bail;
use clap::Parser;

#[derive(Parser)]
#[command(name = "bulgarian-tts", about = "Add TTS audio to Bulgarian Anki cards", version)]
struct Cli {
    /// ElevenLabs API key
    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Deck name to process
    #[arg(long)]
    deck: Option<String>,

    /// Field containing Bulgarian text
    #[arg(long, env = "DEFAULT_BULGARIAN_FIELD", default_value = DEFAULT_BULGARIAN_FIELD)]
    bulgarian_field: String,

    /// Field to add audio to
    #[arg(long, env = "DEFAULT_AUDIO_FIELD", default_value = DEFAULT_AUDIO_FIELD)]
    audio_field: String,

    /// ElevenLabs voice ID to use
    #[arg(long, env = "ELEVENLABS_VOICE_ID", default_value = DEFAULT_VOICE_ID)]
    voice_id: String,

    /// Voice stability (0.0 - 1.0)
    #[arg(long, env = "TTS_STABILITY", default_value_t = 0.75)]
    stability: f32,

    /// Voice similarity boost (0.0 - 1.0)
    #[arg(long, env = "TTS_SIMILARITY_BOOST", default_value_t = 0.75)]
    similarity_boost: f32,

    /// Pause after each generated note, in seconds
    #[arg(long, env = "RATE_LIMIT_DELAY", default_value = "0.5", value_parser = parse_delay)]
    rate_limit_delay: Duration,

    /// Local audio cache directory
    #[arg(long, env = "TTS_CACHE_DIR", default_value = DEFAULT_CACHE_DIR)]
    cache_dir: PathBuf,

    /// Do not read or write the local audio cache
    #[arg(long)]
    no_cache: bool,

    /// AnkiConnect endpoint
    #[arg(long, env = "ANKI_CONNECT_URL", default_value = DEFAULT_ANKI_URL)]
    anki_url: String,

    /// List available decks
    #[arg(long)]
    list_decks: bool,

    /// List available voices
    #[arg(long)]
    list_voices: bool,

    /// Show what would be processed without making changes
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn to_config(&self) -> TtsConfig {
        TtsConfig {
            anki_url: self.anki_url.clone(),
            api_key: self.api_key.clone().unwrap_or_default().trim().to_string(),
            voice_id: self.voice_id.clone(),
            bulgarian_field: self.bulgarian_field.clone(),
            audio_field: self.audio_field.clone(),
            rate_limit_delay: self.rate_limit_delay,
            stability: self.stability,
            similarity_boost: self.similarity_boost,
            cache_dir: (!self.no_cache).then(|| self.cache_dir.clone()),
            dry_run: self.dry_run,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.to_config();
    let anki = AnkiConnect::new(config.anki_url.clone())?;

    if cli.list_decks {
        check_connection(&anki).await?;
        let decks = anki.deck_names().await?;
        println!("Available decks:");
        for (i, deck) in decks.iter().enumerate() {
            println!("{}. {}", i + 1, deck);
        }
        return Ok(());
    }

    if config.api_key.is_empty() {
        bail!(
            "ElevenLabs API key is required. \
             Set it via --api-key argument or ELEVENLABS_API_KEY environment variable."
        );
    }

    config.validate()?;
    let speech = ElevenLabsClient::new(config.api_key.clone(), config.voice_id.clone())?;

    if cli.list_voices {
        let voices = speech.list_voices().await?;
        println!("Available voices:");
        for voice in voices {
            println!("- {} (ID: {}) - {}", voice.name, voice.voice_id, voice.description());
        }
        return Ok(());
    }

    let Some(deck) = cli.deck.as_deref() else {
        bail!("Please specify a deck name with --deck or use --list-decks to see available decks");
    };

    check_connection(&anki).await?;
    let processor = TtsProcessor::new(anki, speech, config);
    let summary = processor.process_deck(deck).await?;
    summary.print();
    Ok(())
}
