use std::collections::{
    HashMap,
    HashSet,
};

use crate::core::EnrichError;

pub mod api;
pub mod types;

pub use api::{
    deck_query,
    AnkiConnect,
};
pub use types::{
    Card,
    Field,
    FieldValue,
    MediaReference,
    Note,
};

/// The AnkiConnect actions the enrichment pipelines rely on.
///
/// Every call is one request/response round trip. Connection failures come
/// back as [`EnrichError::AnkiUnreachable`], a non-null `error` payload as
/// [`EnrichError::AnkiOperation`].
#[allow(async_fn_in_trait)]
pub trait AnkiApi {
    async fn version(&self) -> Result<u32, EnrichError>;

    async fn deck_names(&self) -> Result<Vec<String>, EnrichError>;

    async fn find_notes(&self, query: &str) -> Result<Vec<u64>, EnrichError>;

    async fn find_cards(&self, query: &str) -> Result<Vec<u64>, EnrichError>;

    async fn cards_info(&self, card_ids: &[u64]) -> Result<Vec<Card>, EnrichError>;

    async fn notes_info(&self, note_ids: &[u64]) -> Result<Vec<Note>, EnrichError>;

    async fn model_field_names(&self, model_name: &str) -> Result<Vec<String>, EnrichError>;

    /// Not idempotent on the host side; check `model_field_names` first.
    async fn add_model_field(&self, model_name: &str, field_name: &str) -> Result<(), EnrichError>;

    /// Partial patch: fields not named in `fields` are left untouched.
    async fn update_note_fields(
        &self,
        note_id: u64,
        fields: &HashMap<String, String>,
    ) -> Result<(), EnrichError>;

    async fn store_media_file(&self, filename: &str, data: &[u8]) -> Result<String, EnrichError>;

    /// `None` when the media store has no file by that name.
    async fn retrieve_media_file(&self, filename: &str) -> Result<Option<Vec<u8>>, EnrichError>;
}

/// Notes behind every card of a deck, each note once, in card order.
pub async fn notes_in_deck_by_cards<A: AnkiApi>(
    anki: &A,
    deck_name: &str,
) -> Result<Vec<Note>, EnrichError> {
    let card_ids = anki.find_cards(&deck_query(deck_name)).await?;
    if card_ids.is_empty() {
        return Ok(Vec::new());
    }

    let cards = anki.cards_info(&card_ids).await?;
    let mut seen = HashSet::new();
    let note_ids: Vec<u64> =
        cards.iter().map(|card| card.note).filter(|id| seen.insert(*id)).collect();

    anki.notes_info(&note_ids).await
}

/// Fails fast with [`EnrichError::AnkiUnreachable`] when Anki is not running.
pub async fn check_connection<A: AnkiApi>(anki: &A) -> Result<u32, EnrichError> {
    let version = anki.version().await?;
    log::info!("AnkiConnect is online. Version: {}", version);
    Ok(version)
}
