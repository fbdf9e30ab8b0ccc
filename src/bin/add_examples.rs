use std::path::PathBuf;

use anki_enrich::{
    anki::{
        check_connection,
        AnkiConnect,
    },
    core::{
        config::{
            DEFAULT_ANKI_URL,
            DEFAULT_BULGARIAN_FIELD,
            DEFAULT_DECK_NAME,
            DEFAULT_TSV_FILE,
        },
        ExamplesConfig,
    },
    sentences::{
        load_examples,
        ExampleUpdater,
    },
};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "add-examples",
    about = "Add Bulgarian and English examples to Anki cards from a TSV file",
    version
)]
struct Cli {
    /// Path to TSV file with examples
    #[arg(long, default_value = DEFAULT_TSV_FILE)]
    tsv_file: PathBuf,

    /// Name of Anki deck to update
    #[arg(long, default_value = DEFAULT_DECK_NAME)]
    deck_name: String,

    /// Field holding the Bulgarian word matched against the TSV
    #[arg(long, default_value = DEFAULT_BULGARIAN_FIELD)]
    key_field: String,

    /// Show what would be updated without making changes
    #[arg(long)]
    dry_run: bool,

    /// Actually make the changes (default is dry run)
    #[arg(long)]
    execute: bool,

    /// AnkiConnect endpoint
    #[arg(long, env = "ANKI_CONNECT_URL", default_value = DEFAULT_ANKI_URL)]
    anki_url: String,
}

impl Cli {
    fn into_config(self) -> ExamplesConfig {
        ExamplesConfig {
            anki_url: self.anki_url,
            tsv_file: self.tsv_file,
            deck_name: self.deck_name,
            key_field: self.key_field,
            dry_run: self.dry_run || !self.execute,
            ..ExamplesConfig::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config();
    let dry_run = config.dry_run;

    println!("{}", "=".repeat(60));
    println!("ANKI EXAMPLES UPDATER");
    println!("{}", "=".repeat(60));

    // Local input errors surface before any request is made.
    let examples = load_examples(&config.tsv_file)?;

    let anki = AnkiConnect::new(config.anki_url.clone())?;
    check_connection(&anki).await?;

    let updater = ExampleUpdater::new(anki, config, examples);
    let summary = updater.run().await?;
    summary.print(dry_run);

    if dry_run {
        println!("\nTo execute the changes, run:");
        println!("add-examples --execute");
    }
    Ok(())
}
