use std::{
    collections::HashMap,
    io::Read,
    path::Path,
};

use log::{
    debug,
    info,
};

use crate::core::EnrichError;

pub const WORD_COLUMN: &str = "Bulgarian";
pub const TRANSLATION_COLUMN: &str = "English";
pub const BULGARIAN_EXAMPLE_COLUMN: &str = "Bulgarian_Example";
pub const ENGLISH_EXAMPLE_COLUMN: &str = "English_Example";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleRecord {
    pub english: String,
    pub bulgarian_example: String,
    pub english_example: String,
}

/// Bulgarian word -> examples, as loaded from the vocabulary TSV.
pub type ExampleMap = HashMap<String, ExampleRecord>;

pub fn load_examples(path: &Path) -> Result<ExampleMap, EnrichError> {
    info!("Loading examples from {}...", path.display());

    if !path.exists() {
        return Err(EnrichError::FileNotFound(path.to_path_buf()));
    }

    let examples = read_examples(std::fs::File::open(path)?)?;
    info!("Loaded {} examples from TSV file", examples.len());
    Ok(examples)
}

/// Rows lacking the word or either example are skipped; later duplicates win.
pub fn read_examples<R: Read>(reader: R) -> Result<ExampleMap, EnrichError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| EnrichError::MissingColumn(name.to_string()))
    };
    let word_col = column(WORD_COLUMN)?;
    let english_col = column(TRANSLATION_COLUMN)?;
    let bg_example_col = column(BULGARIAN_EXAMPLE_COLUMN)?;
    let en_example_col = column(ENGLISH_EXAMPLE_COLUMN)?;

    let mut examples = ExampleMap::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        let get = |idx: usize| record.get(idx).map(str::trim).unwrap_or_default().to_string();

        let word = get(word_col);
        let bulgarian_example = get(bg_example_col);
        let english_example = get(en_example_col);

        if word.is_empty() || bulgarian_example.is_empty() || english_example.is_empty() {
            debug!("Skipping incomplete row {}", row_idx + 2);
            continue;
        }

        examples.insert(
            word,
            ExampleRecord { english: get(english_col), bulgarian_example, english_example },
        );
    }

    Ok(examples)
}
