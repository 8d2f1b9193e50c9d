//! Front-matter parsing

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Front-matter data from a page or post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub draft: bool,
    /// Entries are published unless marked otherwise
    #[serde(default = "default_published")]
    pub published: bool,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

fn default_published() -> bool {
    true
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            date: None,
            draft: false,
            published: true,
            extra: HashMap::new(),
        }
    }
}

/// Where the front-matter block of a file ends and its body begins
enum Block<'a> {
    Yaml { data: &'a str, body: &'a str },
    Json { data: &'a str, body: &'a str },
    /// A leading `{` object; its end is found by the JSON parser
    JsonObject(&'a str),
    None,
}

impl<'a> Block<'a> {
    fn split(content: &'a str) -> Self {
        if let Some(rest) = content.strip_prefix("---") {
            let rest = rest.trim_start_matches(['\n', '\r']);
            return match rest.split_once("\n---") {
                Some((data, body)) => Block::Yaml {
                    data,
                    body: body.trim_start_matches(['\n', '\r']),
                },
                None => Block::None,
            };
        }

        if let Some(rest) = content.strip_prefix(";;;") {
            return match rest.split_once(";;;") {
                Some((data, body)) => Block::Json {
                    data,
                    body: body.trim_start_matches(['\n', '\r']),
                },
                None => Block::None,
            };
        }

        if content.starts_with('{') {
            return Block::JsonObject(content);
        }

        Block::None
    }
}

impl FrontMatter {
    /// Split a source file into its front-matter and the remaining markdown.
    ///
    /// Files without front-matter, and YAML blocks that turn out to be prose
    /// between two horizontal rules, come back whole with default metadata.
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let content = content.trim_start();

        match Block::split(content) {
            Block::Yaml { data, body } => {
                if data.trim().is_empty() {
                    return Ok((Self::default(), body));
                }
                if !looks_like_yaml(data) {
                    return Ok((Self::default(), content));
                }
                match serde_yaml::from_str::<Self>(data) {
                    Ok(fm) => Ok((fm, body)),
                    Err(e) => {
                        tracing::warn!("Ignoring malformed YAML front-matter: {}", e);
                        Ok((Self::default(), content))
                    }
                }
            }
            Block::Json { data, body } => {
                let fm = serde_json::from_str(data)
                    .map_err(|e| anyhow!("Malformed JSON front-matter: {}", e))?;
                Ok((fm, body))
            }
            Block::JsonObject(source) => {
                let mut stream = serde_json::Deserializer::from_str(source).into_iter::<Self>();
                let fm = stream
                    .next()
                    .ok_or_else(|| anyhow!("Empty JSON front-matter"))?
                    .map_err(|e| anyhow!("Malformed JSON front-matter: {}", e))?;
                let body = source[stream.byte_offset()..].trim_start_matches(['\n', '\r']);
                Ok((fm, body))
            }
            Block::None => Ok((Self::default(), content)),
        }
    }

    /// Whether the entry should be left out of a normal build
    pub fn is_draft(&self) -> bool {
        self.draft || !self.published
    }

    /// Parse the date field, reading offset-less values in `tz`
    pub fn parse_date<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<FixedOffset>> {
        self.date.as_deref().and_then(|s| parse_date_string(s, tz))
    }
}

/// At least one `key: value` line, where the key is a plain identifier and
/// not a URL scheme.
fn looks_like_yaml(block: &str) -> bool {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .any(|(key, value)| {
            !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                && !matches!(key, "http" | "https" | "ftp" | "mailto")
                && (value.is_empty() || value.starts_with(' '))
        })
}

/// Parse a date string in the formats authors actually write.
///
/// Values with an explicit offset keep it; naive values are placed in `tz`.
pub fn parse_date_string<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt);
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    let naive = datetime_formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            ["%Y-%m-%d", "%Y/%m/%d"]
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    // Ambiguous local times (DST fold) take the earlier instant.
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}
