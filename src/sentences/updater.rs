use std::collections::HashMap;

use log::{
    info,
    warn,
};

use super::source::{
    ExampleMap,
    ExampleRecord,
};
use crate::{
    anki::{
        deck_query,
        AnkiApi,
        FieldValue,
        Note,
    },
    core::{
        EnrichError,
        ExamplesConfig,
    },
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    pub total: usize,
    pub matched: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// What a single note needs, decided before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteDecision {
    EmptyKey,
    NoExample(String),
    AlreadyFilled(String),
    Update { key: String, fields: HashMap<String, String> },
}

pub struct ExampleUpdater<A: AnkiApi> {
    anki: A,
    config: ExamplesConfig,
    examples: ExampleMap,
}

impl<A: AnkiApi> ExampleUpdater<A> {
    pub fn new(anki: A, config: ExamplesConfig, examples: ExampleMap) -> Self {
        Self { anki, config, examples }
    }

    pub fn anki(&self) -> &A {
        &self.anki
    }

    pub async fn run(&self) -> Result<UpdateSummary, EnrichError> {
        self.check_deck_exists().await?;
        let notes = self.notes_from_deck().await?;
        self.ensure_example_fields_exist(&notes).await;
        Ok(self.match_and_update_notes(&notes).await)
    }

    async fn check_deck_exists(&self) -> Result<(), EnrichError> {
        let decks = self.anki.deck_names().await?;
        if decks.iter().any(|deck| deck == &self.config.deck_name) {
            return Ok(());
        }
        Err(EnrichError::DeckNotFound { deck: self.config.deck_name.clone(), available: decks })
    }

    async fn notes_from_deck(&self) -> Result<Vec<Note>, EnrichError> {
        let note_ids = self.anki.find_notes(&deck_query(&self.config.deck_name)).await?;
        if note_ids.is_empty() {
            return Err(EnrichError::EmptyDeck(self.config.deck_name.clone()));
        }

        let notes = self.anki.notes_info(&note_ids).await?;
        info!("Found {} notes in deck '{}'", notes.len(), self.config.deck_name);
        Ok(notes)
    }

    /// Adds the example fields to the note type of the first note. Failures are logged only.
    async fn ensure_example_fields_exist(&self, notes: &[Note]) {
        let Some(first) = notes.first() else {
            return;
        };
        let model_name = &first.model_name;
        info!("Working with note type: {}", model_name);

        let current_fields = match self.anki.model_field_names(model_name).await {
            Ok(fields) => fields,
            Err(e) => {
                warn!("Could not read fields of note type '{}': {}", model_name, e);
                return;
            }
        };

        for field in [&self.config.bulgarian_example_field, &self.config.english_example_field] {
            if current_fields.contains(field) {
                continue;
            }
            if self.config.dry_run {
                info!("[DRY RUN] Would add '{}' field to '{}'", field, model_name);
                continue;
            }
            info!("Adding '{}' field...", field);
            match self.anki.add_model_field(model_name, field).await {
                Ok(()) => info!("Added {} field", field),
                Err(e) => warn!("Could not add {} field: {}", field, e),
            }
        }
    }

    pub fn decide(&self, note: &Note) -> NoteDecision {
        let key = match note.field(&self.config.key_field) {
            FieldValue::Filled(key) => key,
            _ => return NoteDecision::EmptyKey,
        };

        let Some(record) = self.examples.get(key) else {
            return NoteDecision::NoExample(key.to_string());
        };

        let fields = self.missing_examples(note, record);
        if fields.is_empty() {
            return NoteDecision::AlreadyFilled(key.to_string());
        }
        NoteDecision::Update { key: key.to_string(), fields }
    }

    fn missing_examples(&self, note: &Note, record: &ExampleRecord) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        let targets = [
            (&self.config.bulgarian_example_field, &record.bulgarian_example),
            (&self.config.english_example_field, &record.english_example),
        ];
        for (field, example) in targets {
            if note.field(field).filled().is_none() {
                fields.insert(field.clone(), example.clone());
            }
        }
        fields
    }

    pub async fn match_and_update_notes(&self, notes: &[Note]) -> UpdateSummary {
        let dry_run = self.config.dry_run;
        let mut summary = UpdateSummary { total: notes.len(), ..UpdateSummary::default() };

        info!("{}Matching and updating notes...", if dry_run { "DRY RUN - " } else { "" });

        for note in notes {
            let (key, fields) = match self.decide(note) {
                NoteDecision::EmptyKey => {
                    warn!("Note {} has empty {} field", note.note_id, self.config.key_field);
                    summary.skipped += 1;
                    continue;
                }
                NoteDecision::NoExample(key) => {
                    info!("  No examples found for: {}", key);
                    summary.skipped += 1;
                    continue;
                }
                NoteDecision::AlreadyFilled(key) => {
                    summary.matched += 1;
                    info!("  Note {} ({}): Already has examples, skipping", note.note_id, key);
                    summary.skipped += 1;
                    continue;
                }
                NoteDecision::Update { key, fields } => (key, fields),
            };

            summary.matched += 1;
            info!(
                "  {}Updating note {} ({})",
                if dry_run { "[DRY RUN] " } else { "" },
                note.note_id,
                key
            );
            for (field, value) in &fields {
                info!("    {}: {}", field, value);
            }

            if dry_run {
                summary.updated += 1;
                continue;
            }

            match self.anki.update_note_fields(note.note_id, &fields).await {
                Ok(()) => summary.updated += 1,
                Err(e) => {
                    warn!("    Error updating note {}: {}", note.note_id, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

impl UpdateSummary {
    pub fn print(&self, dry_run: bool) {
        println!("\n{}", "=".repeat(60));
        println!("SUMMARY");
        println!("{}", "=".repeat(60));
        println!("Total notes in deck: {}", self.total);
        println!("Notes matched with examples: {}", self.matched);
        println!("Notes {}updated: {}", if dry_run { "would be " } else { "" }, self.updated);
        println!("Notes skipped: {}", self.skipped);
        if self.failed > 0 {
            println!("Notes failed: {}", self.failed);
        }

        if dry_run {
            println!("\nThis was a DRY RUN. No changes were made.");
            println!("Run again with --execute to make actual changes.");
        } else {
            println!("\nSuccessfully updated {} notes!", self.updated);
        }
    }
}
