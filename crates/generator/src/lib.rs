//! Static site generation with Leptos SSR.
//!
//! [`generate_site`] plans every page for the collected content, renders each
//! one to HTML and returns the result in memory. `build` writes it to disk and
//! `preview` serves it straight from memory.

pub mod assets;
pub mod components;
pub mod plan;
pub mod render;
pub mod theme;

use components::Chrome;
use folio_core::{Page, Post, Result, Route, SiteConfig};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Add the live-reload hook to every page
    pub preview: bool,
}

/// Rendered pages and assets of a site
#[derive(Debug, Clone, Default)]
pub struct GeneratedSite {
    pub pages: Vec<(Route, String)>,
    pub assets: Vec<(String, Vec<u8>)>,
}

impl GeneratedSite {
    pub fn page(&self, route: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|(r, _)| r.as_str() == route)
            .map(|(_, html)| html.as_str())
    }

    pub fn asset(&self, name: &str) -> Option<&[u8]> {
        self.assets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Write every page to `<route>/index.html` and every asset to the root
    /// of `out`. Returns the number of files written.
    pub fn write_to(&self, out: &Path) -> Result<usize> {
        fs::create_dir_all(out)?;

        for (route, html) in &self.pages {
            let file = route.output_file(out);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&file, html)?;
            debug!(route = %route, file = %file.display(), "wrote page");
        }

        for (name, bytes) in &self.assets {
            fs::write(out.join(name), bytes)?;
        }

        Ok(self.pages.len() + self.assets.len())
    }
}

/// Plan and render the whole site.
///
/// `posts` must be in publish order, as returned by the collector.
///
/// # Errors
///
/// Fails when two pages share a route, a tag cannot be routed, or the theme
/// scripts cannot be produced.
pub fn generate_site(
    site: &SiteConfig,
    posts: &[Post],
    pages: &[Page],
    options: GenerateOptions,
) -> Result<GeneratedSite> {
    let plan = plan::build_plan(posts, pages, &site.projects)?;
    debug!(pages = plan.len(), "planned site");

    let chrome = Chrome {
        site_title: site.metadata.title.clone(),
        site_url: site.metadata.url.clone(),
        description: site.metadata.description.clone(),
        nav: site.nav.clone(),
        social: site.social.clone(),
        theme_script: theme::initial_theme_script(&site.theme)?,
        initial_theme: site.theme.default,
        date_format: site.content.date_format.clone(),
        preview: options.preview,
    };

    let rendered = plan
        .pages
        .iter()
        .map(|page| (page.route.clone(), render::render_page(&chrome, page)))
        .collect();

    Ok(GeneratedSite {
        pages: rendered,
        assets: assets::site_assets(&site.theme)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::config::parse_site_toml_str;
    use std::path::PathBuf;

    fn site() -> SiteConfig {
        parse_site_toml_str(
            r#"
[site]
title = "lennythedev"

[[project]]
id = "shoppy"
name = "Shoppy"
description = "A shop"
"#,
        )
        .unwrap()
    }

    fn post(path: &str, tags: &[&str]) -> Post {
        Post {
            path: Route::parse(path).unwrap(),
            title: path.to_string(),
            date: None,
            date_updated: None,
            description: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            excerpt: String::new(),
            html: String::from("<p>body</p>"),
            source: PathBuf::from("post.md"),
        }
    }

    #[test]
    fn test_generate_site_routes() {
        let posts = vec![post("/blog/a", &["rust"]), post("/blog/b", &[])];
        let generated = generate_site(&site(), &posts, &[], GenerateOptions::default()).unwrap();

        let routes: Vec<&str> = generated.pages.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(
            routes,
            vec!["/blog", "/projects", "/blog/a", "/blog/b", "/tags", "/tags/rust"]
        );
        assert!(generated.page("/blog/a").unwrap().contains("<p>body</p>"));
        assert!(generated.asset("style.css").is_some());
        assert!(generated.asset("theme.js").is_some());
    }

    #[test]
    fn test_generate_site_duplicate_route() {
        let posts = vec![post("/blog", &[])];
        let err = generate_site(&site(), &posts, &[], GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, folio_core::Error::DuplicateRoute(_)));
    }

    #[test]
    fn test_write_to() {
        let dir = tempfile::tempdir().unwrap();
        let posts = vec![post("/blog/a", &[])];
        let generated = generate_site(&site(), &posts, &[], GenerateOptions::default()).unwrap();

        let written = generated.write_to(dir.path()).unwrap();
        assert_eq!(written, generated.pages.len() + 2);
        assert!(dir.path().join("blog/a/index.html").is_file());
        assert!(dir.path().join("tags/index.html").is_file());
        assert!(dir.path().join("style.css").is_file());

        let html = std::fs::read_to_string(dir.path().join("blog/index.html")).unwrap();
        assert!(html.contains("/blog/a"));
    }
}
