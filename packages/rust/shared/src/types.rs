//! Core domain types for fieldpress records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FieldpressError, Result};

/// The CRM truncates multi-select picklist references to 40 characters.
/// Truncated titles are expanded back to full titles during resolution.
pub const TITLE_LIMIT: usize = 40;

/// Fixed mapping between canonical front-matter field names and CRM
/// source field names. 1:1 in both directions.
pub const FIELD_MAP: [(&str, &str); 20] = [
    ("contributors", "Primary_contributor_name__c"),
    ("id", "Id"),
    ("image_caption", "image_caption__c"),
    ("image_link", "IMAGE_LINK__c"),
    ("image_name", "image_name__c"),
    ("image_source", "image_source__c"),
    ("image_source_url", "image_source_url__c"),
    ("learn_more", "Learn_More__c"),
    ("related_solutions", "Related_Solutions__c"),
    ("related_stories", "Related_Stories__c"),
    ("related_theories", "Related_Theories__c"),
    ("scale", "Scale__c"),
    ("short_write_up", "Short_Write_Up__c"),
    ("tags", "Tags__c"),
    ("title", "Name"),
    ("type", "Type__c"),
    ("values", "Values_exemplified__c"),
    ("when", "When__c"),
    ("where", "Where_del__c"),
    ("who", "Who__c"),
];

/// Canonical field names, in `FIELD_MAP` order. The derived `slug` field
/// is added by the transform stage and is not part of this table.
pub const CANONICAL_FIELDS: [&str; 20] = [
    "contributors",
    "id",
    "image_caption",
    "image_link",
    "image_name",
    "image_source",
    "image_source_url",
    "learn_more",
    "related_solutions",
    "related_stories",
    "related_theories",
    "scale",
    "short_write_up",
    "tags",
    "title",
    "type",
    "values",
    "when",
    "where",
    "who",
];

/// CRM-side field names, for building the selection query.
pub fn source_fields() -> impl Iterator<Item = &'static str> {
    FIELD_MAP.iter().map(|(_, source)| *source)
}

/// A raw record as returned by the CRM query (or the snapshot cache):
/// source field name → JSON value (string or null).
pub type RawRecord = BTreeMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// RecordType
// ---------------------------------------------------------------------------

/// The four content types published to the site. The type determines the
/// output collection directory and which relation bucket a record's
/// backlinks land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    Solution,
    Story,
    Theory,
    Value,
}

impl RecordType {
    /// All record types, in relation-bucket order.
    pub const ALL: [RecordType; 4] = [
        RecordType::Solution,
        RecordType::Story,
        RecordType::Theory,
        RecordType::Value,
    ];

    /// Parse the CRM `type` field value.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "Solution" => Ok(Self::Solution),
            "Story" => Ok(Self::Story),
            "Theory" => Ok(Self::Theory),
            "Value" => Ok(Self::Value),
            other => Err(FieldpressError::validation(format!(
                "unknown record type '{other}'"
            ))),
        }
    }

    /// The relation field that records of this type contribute to on
    /// *other* records (e.g. a Solution referencing a Story shows up in
    /// that Story's `related_solutions`).
    pub fn relation_field(self) -> &'static str {
        match self {
            Self::Solution => "related_solutions",
            Self::Story => "related_stories",
            Self::Theory => "related_theories",
            Self::Value => "values",
        }
    }

    /// Jekyll collection directory for this type.
    pub fn output_dir(self) -> &'static str {
        match self {
            Self::Solution => "_solutions",
            Self::Story => "_stories",
            Self::Theory => "_theories",
            Self::Value => "_values",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Solution => "Solution",
            Self::Story => "Story",
            Self::Theory => "Theory",
            Self::Value => "Value",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One content record: a mapping from canonical field name to string value.
///
/// Records are built by the field mapper, mutated in place by the
/// relationship resolver and the transform pipeline, then rendered once
/// and discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value, treating absent fields as empty.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    /// Set a field value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// The record's title — its natural identifier. Titles are unique
    /// across the record set.
    pub fn title(&self) -> &str {
        self.get("title")
    }

    /// The record's parsed type.
    pub fn record_type(&self) -> Result<RecordType> {
        RecordType::from_name(self.get("type"))
    }
}

impl FromIterator<(String, String)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
