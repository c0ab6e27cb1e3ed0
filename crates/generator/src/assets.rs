use crate::theme::{root_css, toggle_script};
use folio_core::{Result, ThemeConfig};

/// Layout rules; every color comes from a `--color-*` variable
const LAYOUT_CSS: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    line-height: 1.6;
    color: var(--color-text);
    background: var(--color-background);
    transition: color 0.2s ease-out, background 0.2s ease-out;
}

a { color: var(--color-primary); }
a:hover { color: var(--color-secondary); }

.site-header {
    display: flex;
    flex-wrap: wrap;
    gap: 1rem;
    align-items: center;
    max-width: 900px;
    margin: 0 auto;
    padding: 1.5rem 1rem;
}
.site-title { font-weight: bold; font-size: 1.3rem; text-decoration: none; }
.site-nav { display: flex; gap: 1rem; flex: 1; }
.site-nav a { text-decoration: none; }
.site-nav a[aria-current="page"] { border-bottom: 2px solid var(--color-secondary); }

.theme-toggle {
    background: var(--color-subtle-background);
    border: none;
    border-radius: 50%;
    width: 2.2rem;
    height: 2.2rem;
    cursor: pointer;
    font-size: 1.1rem;
}

main { max-width: 900px; margin: 0 auto; padding: 1rem; }
main h1 { margin-bottom: 1rem; }

.post-header { margin-bottom: 2rem; }
.post-description { font-size: 1.15rem; opacity: 0.85; }
.post-updated, time { font-size: 0.9rem; opacity: 0.7; }
.post-body p, .page-body p { margin: 1rem 0; }
.post-body pre {
    background: var(--color-subtle-background);
    padding: 1rem;
    overflow-x: auto;
    border-radius: 4px;
}
.post-nav {
    display: flex;
    justify-content: space-between;
    margin-top: 3rem;
    padding-top: 1rem;
    border-top: 1px solid var(--color-subtle-background);
}
.post-nav .next { margin-left: auto; }

.tags { display: flex; flex-wrap: wrap; gap: 0.5rem; list-style: none; margin: 0.5rem 0; }
.tag {
    background: var(--color-subtle-background);
    padding: 0.1rem 0.6rem;
    border-radius: 1rem;
    font-size: 0.85rem;
    text-decoration: none;
}

.post-preview { margin: 1.5rem 0; }
.post-preview h2 { font-size: 1.3rem; }
.all-tags { display: inline-block; margin: 1rem 0; }

.project-grid {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(260px, 1fr));
    gap: 1.5rem;
}
.project-card {
    background: var(--color-subtle-background);
    border-radius: 8px;
    padding: 1rem;
}
.project-image { width: 100%; border-radius: 4px; }
.project-links { display: flex; gap: 1rem; }

.site-footer {
    max-width: 900px;
    margin: 3rem auto 0;
    padding: 1.5rem 1rem;
    border-top: 1px solid var(--color-subtle-background);
}
.social-links { display: flex; gap: 1rem; list-style: none; }
.social-icon { width: 1.2rem; height: 1.2rem; vertical-align: middle; margin-right: 0.3rem; }

@media (max-width: 600px) {
    .site-nav { flex-basis: 100%; order: 3; }
}
"#;

/// `style.css`: the default theme's variables followed by the layout rules
pub fn stylesheet(config: &ThemeConfig) -> String {
    let mut css = root_css(config.default, &config.palettes);
    css.push_str(LAYOUT_CSS);
    css
}

/// Files written next to the pages, as `(file name, contents)`
pub fn site_assets(config: &ThemeConfig) -> Result<Vec<(String, Vec<u8>)>> {
    Ok(vec![
        (String::from("style.css"), stylesheet(config).into_bytes()),
        (String::from("theme.js"), toggle_script(config)?.into_bytes()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Theme;

    #[test]
    fn test_stylesheet_uses_default_theme() {
        let mut config = ThemeConfig::default();
        config.default = Theme::Dark;
        let css = stylesheet(&config);

        assert!(css.starts_with(":root {"));
        assert!(css.contains("--color-background: black;"));
        assert!(css.contains("--initial-theme: dark;"));
        assert!(css.contains("background: var(--color-background);"));
    }

    #[test]
    fn test_site_assets() {
        let assets = site_assets(&ThemeConfig::default()).unwrap();
        let names: Vec<&str> = assets.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["style.css", "theme.js"]);
    }
}
