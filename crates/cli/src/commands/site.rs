use anyhow::{Context, Result};
use folio_collector::{CollectOptions, CollectReport, collect_pages, collect_posts};
use folio_core::{Page, Post, SiteConfig, parse_site_toml};
use std::path::{Path, PathBuf};

/// Configuration and content of a site directory
pub struct LoadedSite {
    pub root: PathBuf,
    pub config: SiteConfig,
    pub posts: Vec<Post>,
    pub pages: Vec<Page>,
    pub report: CollectReport,
}

impl LoadedSite {
    pub fn static_dir(&self) -> PathBuf {
        self.root.join(&self.config.content.static_dir)
    }
}

/// Load site.toml and collect posts and pages
pub fn load(path: &Path) -> Result<LoadedSite> {
    let config = load_config(path)?;
    collect(path, config)
}

/// Parse site.toml without touching the content directories
pub fn load_config(path: &Path) -> Result<SiteConfig> {
    if !path.exists() {
        anyhow::bail!(
            "Site directory does not exist: {}\nRun 'folio init {}' first",
            path.display(),
            path.display()
        );
    }

    let site_toml_path = path.join("site.toml");
    if !site_toml_path.exists() {
        anyhow::bail!(
            "site.toml not found in {}\nRun 'folio init {}' first",
            path.display(),
            path.display()
        );
    }

    parse_site_toml(&site_toml_path).context("Failed to parse site.toml")
}

/// Collect posts and pages for an already parsed `config`
pub fn collect(path: &Path, config: SiteConfig) -> Result<LoadedSite> {
    let options = CollectOptions::from(&config.content);
    let posts_dir = path.join(&config.content.posts_dir);
    let posts = collect_posts(&posts_dir, &options)
        .with_context(|| format!("Failed to collect posts from {}", posts_dir.display()))?;

    let pages_dir = path.join(&config.content.pages_dir);
    let pages = collect_pages(&pages_dir)
        .with_context(|| format!("Failed to collect pages from {}", pages_dir.display()))?;

    let mut report = posts.report;
    report.merge(pages.report);

    Ok(LoadedSite {
        root: path.to_path_buf(),
        config,
        posts: posts.items,
        pages: pages.items,
        report,
    })
}

/// Print excluded and rejected documents
pub fn print_report(report: &CollectReport) {
    for warning in &report.warnings {
        eprintln!("   ⚠ Warning: {}", warning);
    }
    for error in &report.errors {
        eprintln!("   ✗ Rejected: {}", error);
    }
}

/// Fail when documents were rejected and `strict` is set
pub fn ensure_strict(report: &CollectReport, strict: bool) -> Result<()> {
    match report.first_error() {
        Some(err) if strict => Err(anyhow::Error::new(err)
            .context(format!("{} document(s) rejected (--strict)", report.errors.len()))),
        _ => Ok(()),
    }
}
