use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{
    Deserialize,
    Serialize,
};

static SOUND_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[sound:([^\]]+)\]").unwrap());

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Field {
    pub value: String,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub note_id: u64,
    pub model_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub fields: HashMap<String, Field>,
    #[serde(default)]
    pub cards: Vec<u64>,
}

/// A note field is either absent from the template, present but blank, or filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Missing,
    Empty,
    Filled(&'a str),
}

impl<'a> FieldValue<'a> {
    pub fn filled(self) -> Option<&'a str> {
        match self {
            FieldValue::Filled(value) => Some(value),
            _ => None,
        }
    }
}

impl Note {
    /// Trimmed value of a field, keeping "missing" apart from "blank".
    pub fn field(&self, name: &str) -> FieldValue<'_> {
        match self.fields.get(name) {
            None => FieldValue::Missing,
            Some(field) => match field.value.trim() {
                "" => FieldValue::Empty,
                value => FieldValue::Filled(value),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub card_id: u64,
    pub note: u64,
}

/// `[sound:<filename>]` as embedded in a note field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    pub filename: String,
}

impl MediaReference {
    pub fn new(filename: impl Into<String>) -> Self {
        Self { filename: filename.into() }
    }

    /// Finds the first sound tag in a field value.
    pub fn find(field_value: &str) -> Option<Self> {
        SOUND_TAG.captures(field_value).map(|caps| Self::new(&caps[1]))
    }

    pub fn to_field_value(&self) -> String {
        format!("[sound:{}]", self.filename)
    }
}
