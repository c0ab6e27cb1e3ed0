use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Complete site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub metadata: SiteMetadata,
    pub content: ContentConfig,
    pub theme: ThemeConfig,
    pub nav: Vec<NavLink>,
    pub social: Vec<SocialLink>,
    pub projects: Vec<Project>,
}

/// Site-wide metadata shown in page heads and the header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteMetadata {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Where content lives relative to the site directory, and how it is presented
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    pub posts_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub static_dir: PathBuf,
    pub excerpt_length: usize,
    pub date_format: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            posts_dir: PathBuf::from("posts"),
            pages_dir: PathBuf::from("pages"),
            static_dir: PathBuf::from("static"),
            excerpt_length: 140,
            date_format: String::from("%b %d, %Y"),
        }
    }
}

/// Theme persistence settings and color palettes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Client-local storage key holding the chosen theme
    pub storage_key: String,
    /// Theme rendered when no script runs
    pub default: Theme,
    pub palettes: Palettes,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: String::from("theme"),
            default: Theme::Light,
            palettes: Palettes::default(),
        }
    }
}

/// Named colors, keyed by variable name (`text`, `background`, ...)
pub type Palette = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palettes {
    pub light: Palette,
    pub dark: Palette,
}

impl Palettes {
    pub fn get(&self, theme: Theme) -> &Palette {
        match theme {
            Theme::Light => &self.light,
            Theme::Dark => &self.dark,
        }
    }
}

impl Default for Palettes {
    fn default() -> Self {
        fn palette(entries: &[(&str, &str)]) -> Palette {
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        }

        Self {
            light: palette(&[
                ("text", "black"),
                ("background", "white"),
                ("primary", "#1d048d"),
                ("secondary", "#1ca086"),
                ("subtle-background", "#e6e6e6bb"),
            ]),
            dark: palette(&[
                ("text", "white"),
                ("background", "black"),
                ("primary", "#1ca086"),
                ("secondary", "#ffdf00"),
                ("subtle-background", "#333333"),
            ]),
        }
    }
}

/// Color scheme of the rendered site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub const fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(Error::InvalidData(format!(
                "Unknown theme '{}', expected 'light' or 'dark'",
                other
            ))),
        }
    }
}

/// Header navigation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub name: String,
    pub path: Route,
}

impl NavLink {
    pub fn defaults() -> Vec<NavLink> {
        [
            ("Home", "/"),
            ("Blog", "/blog"),
            ("Projects", "/projects"),
            ("About", "/about"),
            ("Contact", "/contact"),
        ]
        .into_iter()
        .map(|(name, path)| NavLink {
            name: name.to_string(),
            path: Route(path.to_string()),
        })
        .collect()
    }
}

/// Footer link to an external profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Portfolio entry listed on the projects page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_link: Option<String>,
}

/// Absolute, normalized site route such as `/blog/hello-world`.
///
/// Segments are never empty, `.` or `..`, so a route always maps to a file
/// inside the output directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Route(String);

impl Route {
    pub fn root() -> Route {
        Route(String::from("/"))
    }

    /// Normalize and validate a route string.
    ///
    /// A missing leading slash is added and a single trailing slash is
    /// dropped; everything else that could escape the output directory is
    /// rejected.
    pub fn parse(raw: &str) -> Result<Route> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidRoute(String::from("empty route")));
        }
        if trimmed.contains('\\') {
            return Err(Error::InvalidRoute(format!(
                "backslashes are not allowed: '{}'",
                raw
            )));
        }

        let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let body = body.strip_suffix('/').unwrap_or(body);
        if body.is_empty() {
            return Ok(Route::root());
        }

        for segment in body.split('/') {
            match segment {
                "" => {
                    return Err(Error::InvalidRoute(format!(
                        "empty segment in '{}'",
                        raw
                    )));
                }
                "." | ".." => {
                    return Err(Error::InvalidRoute(format!(
                        "relative segment '{}' in '{}'",
                        segment, raw
                    )));
                }
                _ => {}
            }
        }

        Ok(Route(format!("/{}", body)))
    }

    /// Route of the page listing every post tagged `tag`
    pub fn tag(tag: &str) -> Result<Route> {
        Route::parse(&format!("/tags/{}", tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// File the page for this route is written to under `root`
    pub fn output_file(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.segments() {
            path.push(segment);
        }
        path.push("index.html");
        path
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Route {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Route::parse(&value)
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.0
    }
}

impl AsRef<str> for Route {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Blog post collected from a markdown document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub path: Route,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub excerpt: String,
    /// Rendered body
    pub html: String,
    /// Markdown file the post was read from
    pub source: PathBuf,
}

impl Post {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Tags in declaration order, each listed once
    pub fn unique_tags(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            if !seen.contains(&tag.as_str()) {
                seen.push(tag);
            }
        }
        seen
    }
}

/// Standalone page (home, about, contact...) collected from a markdown document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub path: Route,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub html: String,
    pub source: PathBuf,
}

/// Helper to format an optional timestamp for display
pub fn format_date(date: Option<NaiveDateTime>, format: &str) -> String {
    match date {
        Some(d) => d.format(format).to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_normalizes_slashes() {
        assert_eq!(Route::parse("/blog/hello").unwrap().as_str(), "/blog/hello");
        assert_eq!(Route::parse("blog/hello").unwrap().as_str(), "/blog/hello");
        assert_eq!(Route::parse("/blog/hello/").unwrap().as_str(), "/blog/hello");
        assert_eq!(Route::parse(" /about ").unwrap().as_str(), "/about");
        assert!(Route::parse("/").unwrap().is_root());
    }

    #[test]
    fn test_route_rejects_escaping_segments() {
        assert!(Route::parse("").is_err());
        assert!(Route::parse("/../etc/passwd").is_err());
        assert!(Route::parse("/blog/./post").is_err());
        assert!(Route::parse("/blog//post").is_err());
        assert!(Route::parse("\\windows\\path").is_err());

        let err = Route::parse("/a/../b").unwrap_err();
        assert!(err.to_string().contains("relative segment"));
    }

    #[test]
    fn test_route_output_file() {
        let root = Path::new("/out");
        assert_eq!(
            Route::parse("/blog/hello").unwrap().output_file(root),
            PathBuf::from("/out/blog/hello/index.html")
        );
        assert_eq!(
            Route::root().output_file(root),
            PathBuf::from("/out/index.html")
        );
    }

    #[test]
    fn test_tag_route() {
        assert_eq!(Route::tag("react").unwrap().as_str(), "/tags/react");
        assert!(Route::tag("..").is_err());
    }

    #[test]
    fn test_theme_parse_and_toggle() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" light ".parse::<Theme>().unwrap(), Theme::Light);
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().to_string(), "light");
    }

    #[test]
    fn test_unique_tags_keeps_first_occurrence() {
        let post = Post {
            path: Route::parse("/p").unwrap(),
            title: String::from("P"),
            date: None,
            date_updated: None,
            description: None,
            tags: vec!["x".into(), "y".into(), "x".into()],
            excerpt: String::new(),
            html: String::new(),
            source: PathBuf::from("p.md"),
        };
        assert_eq!(post.unique_tags(), vec!["x", "y"]);
        assert!(post.has_tag("y"));
        assert!(!post.has_tag("z"));
    }

    #[test]
    fn test_format_date() {
        let date = chrono::NaiveDate::from_ymd_opt(2021, 6, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(format_date(Some(date), "%b %d, %Y"), "Jun 10, 2021");
        assert_eq!(format_date(None, "%b %d, %Y"), "");
    }
}
