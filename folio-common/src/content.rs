//! Content document model
//!
//! One JSON document describes the whole site. Every field is optional on the
//! wire: absent sections and absent collections deserialize to empty values so
//! that incomplete content never fails to load. A field of the wrong type is
//! dropped on its own (a `null` section, a string width, a fractional year)
//! rather than failing the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// Root of the content document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentDocument {
    #[serde(deserialize_with = "lenient")]
    pub site: Site,
    #[serde(deserialize_with = "lenient")]
    pub musician: Musician,
    #[serde(deserialize_with = "lenient")]
    pub writer: Writer,
    #[serde(deserialize_with = "lenient")]
    pub analysis: Analysis,
    #[serde(deserialize_with = "lenient")]
    pub art: Art,
    #[serde(deserialize_with = "lenient")]
    pub games: ProjectList,
    #[serde(deserialize_with = "lenient")]
    pub photography: Photography,
    #[serde(deserialize_with = "lenient")]
    pub apps: ProjectList,
    #[serde(deserialize_with = "lenient")]
    pub contact: Contact,
}

impl ContentDocument {
    /// Parse a content document from JSON text
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Document substituted when the real one cannot be loaded
    pub fn minimal() -> Self {
        Self {
            site: Site {
                name: Some(DEFAULT_SITE_NAME.to_string()),
                tagline: Some(String::new()),
            },
            ..Self::default()
        }
    }
}

/// Placeholder name shown when the document has none
pub const DEFAULT_SITE_NAME: &str = "YOUR NAME";

/// Site-wide header fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Site {
    pub name: Option<String>,
    pub tagline: Option<String>,
}

/// A labelled external link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub label: Option<String>,
    pub url: Option<String>,
}

impl Link {
    /// Label shown on the button, "Link" when unset
    pub fn display_label(&self) -> &str {
        non_empty(&self.label).unwrap_or("Link")
    }

    /// Target URL, "#" when unset
    pub fn href(&self) -> &str {
        non_empty(&self.url).unwrap_or("#")
    }
}

/// Year field, authored either as a number or a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Number(i64),
    Text(String),
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Number(n) => write!(f, "{}", n),
            Year::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Stringified year, empty when absent
pub fn year_string(year: &Option<Year>) -> String {
    year.as_ref().map(|y| y.to_string()).unwrap_or_default()
}

/// Musician section: bio plus the track list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Musician {
    pub bio: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub tracks: Vec<Track>,
}

/// One audio track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Track {
    pub title: Option<String>,
    pub file: Option<String>,
    #[serde(deserialize_with = "lenient_year")]
    pub year: Option<Year>,
    #[serde(deserialize_with = "lenient_list")]
    pub links: Vec<Link>,
    /// Legacy external-storage reference not yet migrated to the CDN
    #[serde(rename = "driveId")]
    pub drive_id: Option<String>,
}

impl Track {
    /// A track plays only from a CDN file with no pending migration
    pub fn is_playable(&self) -> bool {
        non_empty(&self.file).is_some() && non_empty(&self.drive_id).is_none()
    }
}

/// Writer section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Writer {
    pub intro: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub posts: Vec<Post>,
}

/// Game design analysis section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    pub intro: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub essays: Vec<Post>,
}

/// A rich-text post or essay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(deserialize_with = "tag_list")]
    pub tags: Vec<String>,
    pub html: Option<String>,
}

/// Art gallery section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Art {
    pub intro: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub works: Vec<Work>,
}

/// Photography gallery section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Photography {
    pub intro: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub photos: Vec<Work>,
}

/// One gallery image (art work or photo)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Work {
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_year")]
    pub year: Option<Year>,
    #[serde(deserialize_with = "tag_list")]
    pub tags: Vec<String>,
    pub src: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub srcset: Vec<SrcsetEntry>,
    #[serde(rename = "driveId")]
    pub drive_id: Option<String>,
}

/// Responsive image candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrcsetEntry {
    #[serde(alias = "path")]
    pub src: Option<String>,
    #[serde(alias = "width", deserialize_with = "lenient_width")]
    pub w: Option<u32>,
}

/// Project list section (games, apps)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectList {
    pub intro: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub projects: Vec<Project>,
}

/// One project card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_year")]
    pub year: Option<Year>,
    #[serde(deserialize_with = "tag_list")]
    pub tags: Vec<String>,
    pub thumb: Option<String>,
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub links: Vec<Link>,
    #[serde(deserialize_with = "lenient")]
    pub embed: Option<Embed>,
}

/// Video embed reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Embed {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub id: Option<String>,
    pub url: Option<String>,
}

impl Embed {
    /// Legacy Drive embeds must be replaced before they can play
    pub fn is_drive(&self) -> bool {
        self.kind.as_deref() == Some("gdrive")
    }
}

/// Contact section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub links: Vec<Link>,
}

/// Accept tags authored as strings, numbers or booleans
///
/// Tags are flattened to strings once, at load time; anything that is not a
/// scalar is dropped.
fn tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|value| match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect())
}

/// Take a value of the expected shape, or its default for anything else
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("Ignoring malformed content field: {}", e);
        T::default()
    }))
}

/// Keep the entries of a list that parse; a non-list is an empty list
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!("Ignoring content field: expected a list, found {}", other);
            return Ok(Vec::new());
        }
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping malformed content entry: {}", e);
                None
            }
        })
        .collect())
}

/// Whole numbers stay numeric; other finite numbers keep their printed form
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<Year>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Year::Number(i)),
            None => n.as_f64().filter(|f| f.is_finite()).map(|f| {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Year::Number(f as i64)
                } else {
                    Year::Text(f.to_string())
                }
            }),
        },
        Value::String(s) => Some(Year::Text(s)),
        _ => None,
    })
}

/// Width in pixels from a number or a numeric string
fn lenient_width<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let width = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('w').parse::<f64>().ok(),
        _ => None,
    };
    Ok(width
        .filter(|w| w.is_finite() && *w >= 0.0 && *w <= u32::MAX as f64)
        .map(|w| w as u32))
}

/// Borrow an optional string only when it is non-empty
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
