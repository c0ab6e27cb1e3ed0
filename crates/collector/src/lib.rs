//! Frontmatter collection.
//!
//! Walks a content directory, reads the frontmatter of every markdown
//! document, and turns each one into a [`Post`] (or a standalone [`Page`]).
//! Posts come back sorted ascending by date; documents that cannot be routed
//! are excluded and reported instead of aborting the build.

pub mod frontmatter;
pub mod markdown;

use folio_core::{Error, Page, Post, Result, Route};
use frontmatter::{Frontmatter, FrontmatterIssue};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Options applied while reading documents
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub excerpt_length: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self { excerpt_length: 140 }
    }
}

impl From<&folio_core::ContentConfig> for CollectOptions {
    fn from(content: &folio_core::ContentConfig) -> Self {
        Self {
            excerpt_length: content.excerpt_length,
        }
    }
}

/// A problem with one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub source: PathBuf,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source.display(), self.message)
    }
}

/// What happened to the documents that did not make it into the output
#[derive(Debug, Clone, Default)]
pub struct CollectReport {
    /// Documents rejected because their frontmatter is unusable
    pub errors: Vec<Diagnostic>,
    /// Documents skipped because they carry no `path`
    pub warnings: Vec<Diagnostic>,
    pub info: Vec<String>,
}

impl CollectReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn merge(&mut self, other: CollectReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.info.extend(other.info);
    }

    /// The first rejected document as an error
    pub fn first_error(&self) -> Option<Error> {
        self.errors.first().map(|d| Error::Frontmatter {
            source: d.source.clone(),
            message: d.message.clone(),
        })
    }
}

/// Collected items together with the report of excluded documents
#[derive(Debug, Clone)]
pub struct Collection<T> {
    pub items: Vec<T>,
    pub report: CollectReport,
}

/// Collect blog posts from `dir`, sorted ascending by date.
///
/// Undated posts follow every dated one. The sort is stable, so posts sharing
/// a date keep discovery order (file names, depth first).
///
/// # Errors
///
/// Fails on I/O errors and when two documents declare the same `path`.
pub fn collect_posts(dir: &Path, options: &CollectOptions) -> Result<Collection<Post>> {
    let Collection { items, report } = collect_documents(dir)?;

    let mut posts: Vec<Post> = items
        .into_iter()
        .map(|doc| {
            let title = doc
                .frontmatter
                .title
                .unwrap_or_else(|| doc.frontmatter.path.to_string());
            Post {
                excerpt: markdown::excerpt(&doc.body, options.excerpt_length),
                html: markdown::render_html(&doc.body),
                path: doc.frontmatter.path,
                title,
                date: doc.frontmatter.date,
                date_updated: doc.frontmatter.date_updated,
                description: doc.frontmatter.description,
                tags: doc.frontmatter.tags,
                source: doc.source,
            }
        })
        .collect();

    posts.sort_by(|a, b| compare_dates(a, b));
    debug!(count = posts.len(), dir = %dir.display(), "collected posts");

    Ok(Collection {
        items: posts,
        report,
    })
}

/// Collect standalone pages from `dir` in discovery order.
///
/// Dates and tags are ignored; the same `path` rules as for posts apply.
pub fn collect_pages(dir: &Path) -> Result<Collection<Page>> {
    let Collection { items, report } = collect_documents(dir)?;

    let pages = items
        .into_iter()
        .map(|doc| Page {
            html: markdown::render_html(&doc.body),
            title: doc
                .frontmatter
                .title
                .unwrap_or_else(|| doc.frontmatter.path.to_string()),
            path: doc.frontmatter.path,
            description: doc.frontmatter.description,
            source: doc.source,
        })
        .collect::<Vec<_>>();
    debug!(count = pages.len(), dir = %dir.display(), "collected pages");

    Ok(Collection {
        items: pages,
        report,
    })
}

fn compare_dates(a: &Post, b: &Post) -> Ordering {
    match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

struct Document {
    source: PathBuf,
    frontmatter: Frontmatter,
    body: String,
}

fn collect_documents(dir: &Path) -> Result<Collection<Document>> {
    let mut report = CollectReport::default();

    if !dir.exists() {
        report
            .info
            .push(format!("{} does not exist, nothing collected", dir.display()));
        return Ok(Collection {
            items: Vec::new(),
            report,
        });
    }

    let mut documents: Vec<Document> = Vec::new();
    let mut routes: HashMap<Route, PathBuf> = HashMap::new();

    for source in markdown_files(dir)? {
        let text = match String::from_utf8(fs::read(&source)?) {
            Ok(text) => text,
            Err(e) => {
                warn!(source = %source.display(), "document is not valid UTF-8, rejecting");
                report.errors.push(Diagnostic {
                    source,
                    message: format!("not valid UTF-8: {}", e.utf8_error()),
                });
                continue;
            }
        };

        let parsed = frontmatter::split(&text).and_then(|(yaml, body)| {
            frontmatter::parse(yaml.unwrap_or_default()).map(|fm| (fm, body))
        });

        match parsed {
            Ok((frontmatter, body)) => {
                if let Some(first) = routes.get(&frontmatter.path) {
                    return Err(Error::DuplicatePath {
                        path: frontmatter.path.to_string(),
                        first: first.clone(),
                        second: source,
                    });
                }
                routes.insert(frontmatter.path.clone(), source.clone());
                documents.push(Document {
                    source,
                    frontmatter,
                    body: body.to_string(),
                });
            }
            Err(FrontmatterIssue::MissingPath) => {
                warn!(source = %source.display(), "document has no `path`, skipping");
                report.warnings.push(Diagnostic {
                    source,
                    message: String::from("missing required `path`, document excluded"),
                });
            }
            Err(FrontmatterIssue::Invalid(message)) => {
                warn!(source = %source.display(), %message, "rejecting document");
                report.errors.push(Diagnostic { source, message });
            }
        }
    }

    report.info.push(format!(
        "{} document(s) collected from {}",
        documents.len(),
        dir.display()
    ));

    Ok(Collection {
        items: documents,
        report,
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.') || name.starts_with('_'))
        .unwrap_or(false)
}

/// Markdown files under `dir`, in a reproducible order
fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !is_hidden(e) {
                return true;
            }
            debug!(path = %e.path().display(), "skipping hidden or `_`-prefixed entry");
            false
        });

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_markdown = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| MARKDOWN_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if is_markdown {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
