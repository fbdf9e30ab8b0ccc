//! In-memory stand-ins for AnkiConnect and the speech service.

use std::{
    collections::{
        HashMap,
        HashSet,
    },
    sync::Mutex,
};

use tokio::{
    io::{
        AsyncReadExt,
        AsyncWriteExt,
    },
    net::{
        TcpListener,
        TcpStream,
    },
};

use crate::{
    anki::{
        deck_query,
        AnkiApi,
        Card,
        Field,
        Note,
    },
    core::EnrichError,
    tts::{
        SpeechApi,
        Voice,
    },
};

/// Valid-looking MP3 data of the given length.
pub fn mp3_bytes(len: usize) -> Vec<u8> {
    let mut data = b"ID3".to_vec();
    data.resize(len.max(3), 0xAA);
    data.truncate(len);
    data
}

/// Serves one request with a fixed response and returns the server's base URL.
pub async fn serve_once(status: &str, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\
         connection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });
    url
}

/// Reads the request head and as much body as its content-length announces.
async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= head_end + 4 + body_len {
            return;
        }
    }
}

#[derive(Default)]
struct State {
    decks: Vec<String>,
    notes: Vec<(String, Note)>,
    cards: Vec<(String, Card)>,
    media: HashMap<String, Vec<u8>>,
    updates: Vec<(u64, HashMap<String, String>)>,
    added_fields: Vec<(String, String)>,
    stored: Vec<String>,
    failing_updates: HashSet<u64>,
    failing_field_creation: bool,
    offline: bool,
}

#[derive(Default)]
pub struct FakeAnki {
    state: Mutex<State>,
}

impl FakeAnki {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deck(self, deck: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            if !state.decks.iter().any(|d| d == deck) {
                state.decks.push(deck.to_string());
            }
        }
        self
    }

    /// Adds a note with one card (id `note_id * 10`) in `deck`.
    pub fn with_note(self, deck: &str, note_id: u64, model: &str, fields: &[(&str, &str)]) -> Self {
        let note = Note {
            note_id,
            model_name: model.to_string(),
            tags: Vec::new(),
            fields: fields
                .iter()
                .enumerate()
                .map(|(i, (name, value))| {
                    (name.to_string(), Field { value: value.to_string(), order: i as u32 })
                })
                .collect(),
            cards: Vec::new(),
        };
        self.state.lock().unwrap().notes.push((deck.to_string(), note));
        self.with_card(deck, note_id * 10, note_id)
    }

    pub fn with_card(self, deck: &str, card_id: u64, note_id: u64) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let card = Card { card_id, note: note_id };
            state.cards.push((deck.to_string(), card));
            if let Some((_, note)) = state.notes.iter_mut().find(|(_, n)| n.note_id == note_id) {
                note.cards.push(card_id);
            }
        }
        self.with_deck(deck)
    }

    pub fn with_media(self, filename: &str, data: Vec<u8>) -> Self {
        self.state.lock().unwrap().media.insert(filename.to_string(), data);
        self
    }

    pub fn failing_updates_for(self, note_id: u64) -> Self {
        self.state.lock().unwrap().failing_updates.insert(note_id);
        self
    }

    pub fn failing_field_creation(self) -> Self {
        self.state.lock().unwrap().failing_field_creation = true;
        self
    }

    pub fn offline(self) -> Self {
        self.state.lock().unwrap().offline = true;
        self
    }

    pub fn note(&self, note_id: u64) -> Note {
        let state = self.state.lock().unwrap();
        state.notes.iter().find(|(_, n)| n.note_id == note_id).map(|(_, n)| n.clone()).unwrap()
    }

    pub fn field_value(&self, note_id: u64, field: &str) -> Option<String> {
        self.note(note_id).fields.get(field).map(|f| f.value.clone())
    }

    pub fn media(&self, filename: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().media.get(filename).cloned()
    }

    pub fn updates(&self) -> Vec<(u64, HashMap<String, String>)> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn added_fields(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().added_fields.clone()
    }

    pub fn stored(&self) -> Vec<String> {
        self.state.lock().unwrap().stored.clone()
    }

    fn online(&self) -> Result<std::sync::MutexGuard<'_, State>, EnrichError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(EnrichError::AnkiUnreachable { url: "http://localhost:8765".to_string() });
        }
        Ok(state)
    }
}

impl AnkiApi for FakeAnki {
    async fn version(&self) -> Result<u32, EnrichError> {
        self.online().map(|_| 6)
    }

    async fn deck_names(&self) -> Result<Vec<String>, EnrichError> {
        Ok(self.online()?.decks.clone())
    }

    async fn find_notes(&self, query: &str) -> Result<Vec<u64>, EnrichError> {
        let state = self.online()?;
        Ok(state
            .notes
            .iter()
            .filter(|(deck, _)| deck_query(deck) == query)
            .map(|(_, note)| note.note_id)
            .collect())
    }

    async fn find_cards(&self, query: &str) -> Result<Vec<u64>, EnrichError> {
        let state = self.online()?;
        Ok(state
            .cards
            .iter()
            .filter(|(deck, _)| deck_query(deck) == query)
            .map(|(_, card)| card.card_id)
            .collect())
    }

    async fn cards_info(&self, card_ids: &[u64]) -> Result<Vec<Card>, EnrichError> {
        let state = self.online()?;
        Ok(card_ids
            .iter()
            .filter_map(|id| state.cards.iter().find(|(_, c)| c.card_id == *id))
            .map(|(_, card)| card.clone())
            .collect())
    }

    async fn notes_info(&self, note_ids: &[u64]) -> Result<Vec<Note>, EnrichError> {
        let state = self.online()?;
        Ok(note_ids
            .iter()
            .filter_map(|id| state.notes.iter().find(|(_, n)| n.note_id == *id))
            .map(|(_, note)| note.clone())
            .collect())
    }

    async fn model_field_names(&self, model_name: &str) -> Result<Vec<String>, EnrichError> {
        let state = self.online()?;
        let mut names: Vec<String> = Vec::new();
        for (_, note) in state.notes.iter().filter(|(_, n)| n.model_name == model_name) {
            for name in note.fields.keys() {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        Ok(names)
    }

    async fn add_model_field(&self, model_name: &str, field_name: &str) -> Result<(), EnrichError> {
        let mut state = self.online()?;
        if state.failing_field_creation {
            return Err(EnrichError::AnkiOperation {
                action: "modelFieldAdd".to_string(),
                message: "field creation refused".to_string(),
            });
        }
        for (_, note) in state.notes.iter_mut().filter(|(_, n)| n.model_name == model_name) {
            let order = note.fields.len() as u32;
            note.fields
                .entry(field_name.to_string())
                .or_insert(Field { value: String::new(), order });
        }
        state.added_fields.push((model_name.to_string(), field_name.to_string()));
        Ok(())
    }

    async fn update_note_fields(
        &self,
        note_id: u64,
        fields: &HashMap<String, String>,
    ) -> Result<(), EnrichError> {
        let mut state = self.online()?;
        if state.failing_updates.contains(&note_id) {
            return Err(EnrichError::AnkiOperation {
                action: "updateNoteFields".to_string(),
                message: "collection is locked".to_string(),
            });
        }
        let Some((_, note)) = state.notes.iter_mut().find(|(_, n)| n.note_id == note_id) else {
            return Err(EnrichError::AnkiOperation {
                action: "updateNoteFields".to_string(),
                message: "note was not found".to_string(),
            });
        };
        for (name, value) in fields {
            let order = note.fields.len() as u32;
            note.fields
                .entry(name.clone())
                .or_insert(Field { value: String::new(), order })
                .value = value.clone();
        }
        state.updates.push((note_id, fields.clone()));
        Ok(())
    }

    async fn store_media_file(&self, filename: &str, data: &[u8]) -> Result<String, EnrichError> {
        let mut state = self.online()?;
        state.media.insert(filename.to_string(), data.to_vec());
        state.stored.push(filename.to_string());
        Ok(filename.to_string())
    }

    async fn retrieve_media_file(&self, filename: &str) -> Result<Option<Vec<u8>>, EnrichError> {
        Ok(self.online()?.media.get(filename).cloned())
    }
}

#[derive(Default)]
pub struct FakeSpeech {
    calls: Mutex<Vec<String>>,
    rejected: HashSet<String>,
}

impl FakeSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the service refuse this exact text.
    pub fn rejecting(mut self, text: &str) -> Self {
        self.rejected.insert(text.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl SpeechApi for FakeSpeech {
    async fn synthesize(
        &self,
        text: &str,
        _stability: f32,
        _similarity_boost: f32,
    ) -> Result<Vec<u8>, EnrichError> {
        if self.rejected.contains(text) {
            return Err(EnrichError::InputUnsuitable(text.to_string()));
        }
        self.calls.lock().unwrap().push(text.to_string());
        Ok(mp3_bytes(2048))
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, EnrichError> {
        Ok(vec![Voice {
            voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
            name: "Rachel".to_string(),
            description: None,
            category: Some("premade".to_string()),
        }])
    }
}
