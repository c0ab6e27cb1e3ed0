use crate::error::{Error, Result};
use crate::types::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    site: RawSiteMetadata,
    #[serde(default)]
    content: RawContent,
    #[serde(default)]
    theme: RawTheme,
    nav: Option<Vec<RawNavLink>>,
    #[serde(default)]
    social: Vec<SocialLink>,
    #[serde(default)]
    project: Vec<Project>,
}

#[derive(Debug, Deserialize)]
struct RawSiteMetadata {
    title: String,
    url: Option<String>,
    description: Option<String>,
    author: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContent {
    posts_dir: Option<String>,  // Convert to PathBuf
    pages_dir: Option<String>,  // Convert to PathBuf
    static_dir: Option<String>, // Convert to PathBuf
    excerpt_length: Option<usize>,
    date_format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTheme {
    storage_key: Option<String>,
    default: Option<String>, // Parse as Theme
    #[serde(default)]
    light: Palette,
    #[serde(default)]
    dark: Palette,
}

#[derive(Debug, Deserialize)]
struct RawNavLink {
    name: String,
    path: String, // Parse as Route
}

/// Parse site.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
    let content = fs::read_to_string(path)?;
    parse_site_toml_str(&content)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<SiteConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.site.title.trim().is_empty() {
        return Err(Error::ConfigParse(String::from(
            "site.title must not be empty",
        )));
    }

    let metadata = SiteMetadata {
        title: raw.site.title,
        url: raw.site.url.map(|u| u.trim_end_matches('/').to_string()),
        description: raw.site.description,
        author: raw.site.author,
    };

    let defaults = ContentConfig::default();
    let content = ContentConfig {
        posts_dir: optional_dir(raw.content.posts_dir, "content.posts_dir")?
            .unwrap_or(defaults.posts_dir),
        pages_dir: optional_dir(raw.content.pages_dir, "content.pages_dir")?
            .unwrap_or(defaults.pages_dir),
        static_dir: optional_dir(raw.content.static_dir, "content.static_dir")?
            .unwrap_or(defaults.static_dir),
        excerpt_length: raw.content.excerpt_length.unwrap_or(defaults.excerpt_length),
        date_format: raw.content.date_format.unwrap_or(defaults.date_format),
    };

    if content.excerpt_length == 0 {
        return Err(Error::ConfigParse(String::from(
            "content.excerpt_length must be greater than zero",
        )));
    }

    let theme = parse_theme(raw.theme)?;

    let nav = match raw.nav {
        Some(links) => links
            .into_iter()
            .map(|link| {
                let path = Route::parse(&link.path).map_err(|e| {
                    Error::ConfigParse(format!("Invalid nav path for '{}': {}", link.name, e))
                })?;
                Ok(NavLink {
                    name: link.name,
                    path,
                })
            })
            .collect::<Result<Vec<_>>>()?,
        None => NavLink::defaults(),
    };

    let mut seen_ids: Vec<&str> = Vec::new();
    for project in &raw.project {
        if seen_ids.contains(&project.id.as_str()) {
            return Err(Error::ConfigParse(format!(
                "Duplicate project id '{}'",
                project.id
            )));
        }
        seen_ids.push(&project.id);
    }

    Ok(SiteConfig {
        metadata,
        content,
        theme,
        nav,
        social: raw.social,
        projects: raw.project,
    })
}

fn parse_theme(raw: RawTheme) -> Result<ThemeConfig> {
    let defaults = ThemeConfig::default();

    let storage_key = raw.storage_key.unwrap_or(defaults.storage_key);
    if storage_key.trim().is_empty() {
        return Err(Error::ConfigParse(String::from(
            "theme.storage_key must not be empty",
        )));
    }

    let default = match raw.default {
        Some(name) => name
            .parse::<Theme>()
            .map_err(|e| Error::ConfigParse(format!("Invalid theme.default: {}", e)))?,
        None => defaults.default,
    };

    // Overrides are merged over the built-in palettes so a partial table
    // never leaves a variable undefined.
    let mut palettes = defaults.palettes;
    for (name, value) in raw.light {
        validate_color_name(&name, "theme.light")?;
        palettes.light.insert(name, value);
    }
    for (name, value) in raw.dark {
        validate_color_name(&name, "theme.dark")?;
        palettes.dark.insert(name, value);
    }

    Ok(ThemeConfig {
        storage_key,
        default,
        palettes,
    })
}

/// Color names become CSS custom properties (`--color-<name>`)
fn validate_color_name(name: &str, table: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::ConfigParse(format!(
            "Invalid color name '{}' in [{}]: use letters, digits, '-' or '_'",
            name, table
        )))
    }
}

fn optional_dir(value: Option<String>, field_name: &str) -> Result<Option<PathBuf>> {
    value.map(|v| validate_path(&v, field_name)).transpose()
}

/// Validate and convert a path string to PathBuf.
///
/// Configured directories are resolved against the site directory, so this
/// rejects:
/// - Absolute paths (starting with `/` or Windows drive letters)
/// - Paths containing parent directory references (`..`)
///
/// # Examples
///
/// ```text
/// validate_path("posts", "content.posts_dir")  → Ok(PathBuf)
/// validate_path("/etc", "content.posts_dir")  → Err("Absolute paths not allowed...")
/// validate_path("../shared", "content.static_dir")  → Err("Parent directory references...")
/// ```
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    if path.is_absolute() {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path_valid_relative() {
        assert!(validate_path("posts", "content.posts_dir").is_ok());
        assert!(validate_path("content/blog", "content.posts_dir").is_ok());
    }

    #[test]
    fn test_validate_path_rejects_absolute_unix() {
        let result = validate_path("/etc", "content.posts_dir");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Absolute paths not allowed")
        );
    }

    #[test]
    fn test_validate_path_rejects_parent_dir() {
        let result = validate_path("../shared", "content.static_dir");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Parent directory references")
        );

        assert!(validate_path("posts/../../secret", "content.posts_dir").is_err());
    }

    #[test]
    fn test_validate_path_rejects_empty() {
        let result = validate_path("   ", "content.pages_dir");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Empty path"));
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = r##"
[site]
title = "lennythedev"
        "##;

        let site = parse_site_toml_str(toml).unwrap();
        assert_eq!(site.metadata.title, "lennythedev");
        assert_eq!(site.content.posts_dir, PathBuf::from("posts"));
        assert_eq!(site.content.excerpt_length, 140);
        assert_eq!(site.theme.storage_key, "theme");
        assert_eq!(site.theme.default, Theme::Light);
        assert_eq!(site.theme.palettes, Palettes::default());
        assert_eq!(site.nav.len(), 5);
        assert_eq!(site.nav[1].path.as_str(), "/blog");
        assert!(site.projects.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r##"
[site]
title = "lennythedev"
url = "https://example.com/"
description = "dev adventures"

[content]
posts_dir = "markdown-pages"
excerpt_length = 80
date_format = "%Y-%m-%d"

[theme]
storage_key = "color-mode"
default = "dark"

[theme.dark]
primary = "#ff00ff"
accent = "#00ffff"

[[nav]]
name = "Blog"
path = "blog/"

[[social]]
name = "DEV"
url = "https://dev.to/someone"

[[project]]
id = "shoppy"
name = "Shoppy"
description = "E-commerce site"
tags = ["react", "node"]
live_link = "https://theshop.example.com"
        "##;

        let site = parse_site_toml_str(toml).unwrap();
        assert_eq!(site.metadata.url.as_deref(), Some("https://example.com"));
        assert_eq!(site.content.posts_dir, PathBuf::from("markdown-pages"));
        assert_eq!(site.content.pages_dir, PathBuf::from("pages"));
        assert_eq!(site.content.excerpt_length, 80);
        assert_eq!(site.theme.storage_key, "color-mode");
        assert_eq!(site.theme.default, Theme::Dark);
        assert_eq!(site.theme.palettes.dark["primary"], "#ff00ff");
        assert_eq!(site.theme.palettes.dark["accent"], "#00ffff");
        // untouched entries keep their defaults
        assert_eq!(site.theme.palettes.dark["background"], "black");
        assert_eq!(site.nav.len(), 1);
        assert_eq!(site.nav[0].path.as_str(), "/blog");
        assert_eq!(site.social[0].name, "DEV");
        assert_eq!(site.projects[0].tags, vec!["react", "node"]);
        assert_eq!(site.projects[0].github_link, None);
    }

    #[test]
    fn test_parse_config_rejects_path_traversal() {
        let toml = r##"
[site]
title = "Site"

[content]
posts_dir = "../../etc"
        "##;

        let result = parse_site_toml_str(toml);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("content.posts_dir")
        );
    }

    #[test]
    fn test_parse_config_rejects_unknown_theme() {
        let toml = r##"
[site]
title = "Site"

[theme]
default = "sepia"
        "##;

        let err = parse_site_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("theme.default"));
    }

    #[test]
    fn test_parse_config_rejects_bad_color_name() {
        let toml = r##"
[site]
title = "Site"

[theme.light]
"text; color" = "red"
        "##;

        assert!(parse_site_toml_str(toml).is_err());
    }

    #[test]
    fn test_parse_config_rejects_invalid_nav_path() {
        let toml = r##"
[site]
title = "Site"

[[nav]]
name = "Escape"
path = "/../up"
        "##;

        let err = parse_site_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("Escape"));
    }

    #[test]
    fn test_parse_config_rejects_duplicate_project_ids() {
        let toml = r##"
[site]
title = "Site"

[[project]]
id = "a"
name = "A"
description = "first"

[[project]]
id = "a"
name = "Also A"
description = "second"
        "##;

        let err = parse_site_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("Duplicate project id"));
    }

    #[test]
    fn test_parse_config_requires_site_title() {
        assert!(parse_site_toml_str("[content]\nposts_dir = \"posts\"").is_err());
        assert!(parse_site_toml_str("[site]\ntitle = \"  \"").is_err());
    }
}
