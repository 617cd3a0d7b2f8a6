//! Catalog import files.
//!
//! Two layouts are accepted: a plain JSON array of movies, or a Douban-style
//! document with the movies under `subjects`. Person and genre columns may
//! be given either as a `" / "`-delimited string or as a list (of strings
//! or of `{"name": ...}` objects).

use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;

use reelshelf_model::{DEFAULT_STOCK, LIST_SEPARATOR, NewMovie};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImportDocument {
    Subjects { subjects: Vec<ImportRecord> },
    List(Vec<ImportRecord>),
}

#[derive(Debug, Deserialize)]
struct ImportRecord {
    title: String,
    #[serde(default)]
    original_title: Option<String>,
    #[serde(default)]
    directors: NameList,
    #[serde(default)]
    casts: NameList,
    #[serde(default)]
    genres: NameList,
    #[serde(default)]
    year: Option<Year>,
    #[serde(default)]
    rating: Option<Rating>,
    #[serde(default)]
    images: Option<Images>,
    #[serde(default)]
    alt: Option<String>,
    #[serde(default)]
    amount: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NameList {
    Joined(String),
    Entries(Vec<NameEntry>),
}

impl Default for NameList {
    fn default() -> Self {
        NameList::Joined(String::new())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NameEntry {
    Plain(String),
    Person { name: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Year {
    Number(i32),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Rating {
    Score(f64),
    Summary { average: f64 },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Images {
    Url(String),
    Sizes {
        large: Option<String>,
        medium: Option<String>,
    },
}

impl NameList {
    fn joined(self) -> String {
        match self {
            NameList::Joined(raw) => raw,
            NameList::Entries(entries) => entries
                .into_iter()
                .map(|entry| match entry {
                    NameEntry::Plain(name) | NameEntry::Person { name } => name,
                })
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
        }
    }
}

impl From<ImportRecord> for NewMovie {
    fn from(record: ImportRecord) -> Self {
        let year = match record.year {
            Some(Year::Number(year)) => year,
            Some(Year::Text(raw)) => raw.trim().parse().unwrap_or_default(),
            None => 0,
        };
        let rating = match record.rating {
            Some(Rating::Score(score) | Rating::Summary { average: score }) => score,
            None => 0.0,
        };
        let images = record.images.and_then(|images| match images {
            Images::Url(url) => Some(url),
            Images::Sizes { large, medium } => large.or(medium),
        });

        NewMovie {
            original_title: record
                .original_title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| record.title.clone()),
            title: record.title,
            directors: record.directors.joined(),
            casts: record.casts.joined(),
            genres: record.genres.joined(),
            year,
            rating,
            images,
            alt: record.alt,
            amount: record.amount.unwrap_or(DEFAULT_STOCK),
        }
    }
}

/// Parse an import document.
pub fn parse_movies(raw: &str) -> anyhow::Result<Vec<NewMovie>> {
    let document: ImportDocument =
        serde_json::from_str(raw).context("unrecognised movie import document")?;
    let records = match document {
        ImportDocument::Subjects { subjects } => subjects,
        ImportDocument::List(records) => records,
    };
    Ok(records.into_iter().map(NewMovie::from).collect())
}

pub fn read_movies(path: &Path) -> anyhow::Result<Vec<NewMovie>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_movies(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
