use std::{
    collections::HashMap,
    time::Duration,
};

use base64::{
    engine::general_purpose::STANDARD as BASE64,
    Engine,
};
use log::debug;
use reqwest::Client;
use serde::{
    Deserialize,
    Serialize,
};

use super::{
    types::{
        Card,
        Note,
    },
    AnkiApi,
};
use crate::core::{
    http::http_client,
    EnrichError,
};

const API_VERSION: u32 = 6;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self, action: &str) -> Result<Option<T>, EnrichError> {
        match self.error {
            Some(message) => {
                Err(EnrichError::AnkiOperation { action: action.to_string(), message })
            }
            None => Ok(self.result),
        }
    }
}

pub fn request_body(action: &str, params: Option<serde_json::Value>) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert("action".to_string(), serde_json::Value::String(action.to_string()));
    body.insert("version".to_string(), serde_json::Value::Number(API_VERSION.into()));
    body.insert("params".to_string(), params.unwrap_or_else(|| serde_json::json!({})));
    serde_json::Value::Object(body)
}

/// Search query matching a deck name exactly.
pub fn deck_query(deck_name: &str) -> String {
    format!("deck:\"{}\"", deck_name.replace('"', "\\\""))
}

/// `retrieveMediaFile` answers `false` for a missing file and base64 otherwise.
fn decode_media(result: Option<serde_json::Value>) -> Result<Option<Vec<u8>>, EnrichError> {
    match result {
        Some(serde_json::Value::String(encoded)) => Ok(Some(BASE64.decode(encoded.as_bytes())?)),
        _ => Ok(None),
    }
}

pub struct AnkiConnect {
    client: Client,
    url: String,
}

impl AnkiConnect {
    pub fn new(url: impl Into<String>) -> Result<Self, EnrichError> {
        Ok(Self { client: http_client(Duration::from_secs(120))?, url: url.into() })
    }

    async fn make_request<T: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        params: Option<serde_json::Value>,
    ) -> Result<Option<T>, EnrichError> {
        debug!("AnkiConnect request: {}", action);
        let body = request_body(action, params);

        let resp = self.client.post(&self.url).json(&body).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                EnrichError::AnkiUnreachable { url: self.url.clone() }
            } else {
                EnrichError::from(e)
            }
        })?;

        let response: ApiResponse<T> = resp.error_for_status()?.json().await?;
        response.into_result(action)
    }
}

impl AnkiApi for AnkiConnect {
    async fn version(&self) -> Result<u32, EnrichError> {
        Ok(self.make_request("version", None).await?.unwrap_or_default())
    }

    async fn deck_names(&self) -> Result<Vec<String>, EnrichError> {
        Ok(self.make_request("deckNames", None).await?.unwrap_or_default())
    }

    async fn find_notes(&self, query: &str) -> Result<Vec<u64>, EnrichError> {
        let params = serde_json::json!({ "query": query });
        Ok(self.make_request("findNotes", Some(params)).await?.unwrap_or_default())
    }

    async fn find_cards(&self, query: &str) -> Result<Vec<u64>, EnrichError> {
        let params = serde_json::json!({ "query": query });
        Ok(self.make_request("findCards", Some(params)).await?.unwrap_or_default())
    }

    async fn cards_info(&self, card_ids: &[u64]) -> Result<Vec<Card>, EnrichError> {
        let params = serde_json::json!({ "cards": card_ids });
        Ok(self.make_request("cardsInfo", Some(params)).await?.unwrap_or_default())
    }

    async fn notes_info(&self, note_ids: &[u64]) -> Result<Vec<Note>, EnrichError> {
        let params = serde_json::json!({ "notes": note_ids });
        Ok(self.make_request("notesInfo", Some(params)).await?.unwrap_or_default())
    }

    async fn model_field_names(&self, model_name: &str) -> Result<Vec<String>, EnrichError> {
        let params = serde_json::json!({ "modelName": model_name });
        Ok(self.make_request("modelFieldNames", Some(params)).await?.unwrap_or_default())
    }

    async fn add_model_field(&self, model_name: &str, field_name: &str) -> Result<(), EnrichError> {
        let params = serde_json::json!({ "modelName": model_name, "fieldName": field_name });
        self.make_request::<serde_json::Value>("modelFieldAdd", Some(params)).await?;
        Ok(())
    }

    async fn update_note_fields(
        &self,
        note_id: u64,
        fields: &HashMap<String, String>,
    ) -> Result<(), EnrichError> {
        let params = serde_json::json!({ "note": { "id": note_id, "fields": fields } });
        self.make_request::<serde_json::Value>("updateNoteFields", Some(params)).await?;
        Ok(())
    }

    async fn store_media_file(&self, filename: &str, data: &[u8]) -> Result<String, EnrichError> {
        let params = serde_json::json!({ "filename": filename, "data": BASE64.encode(data) });
        let stored: Option<String> = self.make_request("storeMediaFile", Some(params)).await?;
        Ok(stored.unwrap_or_else(|| filename.to_string()))
    }

    async fn retrieve_media_file(&self, filename: &str) -> Result<Option<Vec<u8>>, EnrichError> {
        let params = serde_json::json!({ "filename": filename });
        decode_media(self.make_request("retrieveMediaFile", Some(params)).await?)
    }
}
