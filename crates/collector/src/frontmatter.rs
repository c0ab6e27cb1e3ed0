//! Frontmatter block extraction and field conversion.
//!
//! A document opens with a `---` line, carries YAML, and closes the block with
//! another `---` (or `...`) line. Everything after the closing line is the
//! markdown body.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use folio_core::Route;
use serde::Deserialize;
use serde_yaml::Value;

/// Frontmatter fields as they appear in the YAML block
#[derive(Debug, Default, Deserialize)]
struct RawFrontmatter {
    path: Option<String>,
    title: Option<Value>,
    date: Option<Value>,
    date_updated: Option<Value>,
    description: Option<Value>,
    tags: Option<Value>,
}

/// Typed frontmatter of one document
#[derive(Debug, Clone, PartialEq)]
pub struct Frontmatter {
    pub path: Route,
    pub title: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub date_updated: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Why a document could not be turned into [`Frontmatter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterIssue {
    /// No `path` field; the document has no route
    MissingPath,
    /// The block is present but unusable
    Invalid(String),
}

/// Split a document into its YAML block and markdown body.
///
/// Returns `Ok((None, text))` when the document has no frontmatter.
pub fn split(text: &str) -> Result<(Option<&str>, &str), FrontmatterIssue> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let Some(first_end) = text.find('\n') else {
        return Ok((None, text));
    };
    if text[..first_end].trim_end() != "---" {
        return Ok((None, text));
    }

    let yaml_start = first_end + 1;
    let mut offset = yaml_start;
    while offset <= text.len() {
        let line_end = text[offset..]
            .find('\n')
            .map(|i| offset + i)
            .unwrap_or(text.len());
        let line = text[offset..line_end].trim_end();
        if line == "---" || line == "..." {
            let yaml = &text[yaml_start..offset];
            let body = if line_end < text.len() {
                &text[line_end + 1..]
            } else {
                ""
            };
            return Ok((Some(yaml), body));
        }
        if line_end == text.len() {
            break;
        }
        offset = line_end + 1;
    }

    Err(FrontmatterIssue::Invalid(String::from(
        "frontmatter block is not closed with '---'",
    )))
}

/// Parse and validate a YAML frontmatter block
pub fn parse(yaml: &str) -> Result<Frontmatter, FrontmatterIssue> {
    let raw: RawFrontmatter = if yaml.trim().is_empty() {
        RawFrontmatter::default()
    } else {
        serde_yaml::from_str(yaml)
            .map_err(|e| FrontmatterIssue::Invalid(format!("invalid YAML: {}", e)))?
    };

    let path = match raw.path {
        Some(p) if !p.trim().is_empty() => {
            Route::parse(&p).map_err(|e| FrontmatterIssue::Invalid(e.to_string()))?
        }
        _ => return Err(FrontmatterIssue::MissingPath),
    };

    Ok(Frontmatter {
        path,
        title: scalar_string(raw.title, "title")?,
        date: date_field(raw.date, "date")?,
        date_updated: date_field(raw.date_updated, "date_updated")?,
        description: scalar_string(raw.description, "description")?,
        tags: tags_field(raw.tags)?,
    })
}

/// Parse a publish date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` (space separator too) and
/// RFC 3339. Offsets are normalized to UTC so ordering is consistent.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn scalar_string(value: Option<Value>, field: &str) -> Result<Option<String>, FrontmatterIssue> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(FrontmatterIssue::Invalid(format!(
            "'{}' must be a plain value",
            field
        ))),
    }
}

fn date_field(value: Option<Value>, field: &str) -> Result<Option<NaiveDateTime>, FrontmatterIssue> {
    match scalar_string(value, field)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_date(&s).map(Some).ok_or_else(|| {
            FrontmatterIssue::Invalid(format!("unparseable {} '{}'", field, s))
        }),
    }
}

fn tags_field(value: Option<Value>) -> Result<Vec<String>, FrontmatterIssue> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Sequence(items)) => items,
        Some(single) => vec![single],
    };

    let mut tags = Vec::with_capacity(items.len());
    for item in items {
        match scalar_string(Some(item), "tags")? {
            Some(tag) if !tag.trim().is_empty() => tags.push(tag.trim().to_string()),
            _ => {}
        }
    }
    Ok(tags)
}
