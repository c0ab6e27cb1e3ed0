use anyhow::{Context, Result};
use chrono::Local;
use folio_core::config::parse_site_toml_str;
use std::fs;
use std::path::{Path, PathBuf};

/// Escape a string for a TOML basic string.
///
/// The scaffold is written by hand to keep its comments, so user input is
/// escaped here rather than serialized.
fn toml_escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\x08', "\\b")
        .replace('\x0C', "\\f")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Title used when none is given: the directory name, or "My Site"
fn default_title(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.trim())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(String::from)
        .unwrap_or_else(|| String::from("My Site"))
}

/// Create a new site directory with a config, an example post and the
/// standalone pages linked from the default navigation.
pub async fn run(path: PathBuf, title: Option<String>, author: Option<String>) -> Result<()> {
    println!("Initializing site directory: {}", path.display());

    let site_toml_path = path.join("site.toml");
    if site_toml_path.exists() {
        anyhow::bail!(
            "site.toml already exists at {}\nHint: Delete it first or use a different directory",
            site_toml_path.display()
        );
    }

    fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let title = title.unwrap_or_else(|| default_title(&path));
    generate_site_toml(&path, &title, author.as_deref())?;
    println!("✓ Wrote site.toml");

    create_directory_structure(&path)?;
    generate_example_content(&path)?;
    println!("✓ Wrote example content");

    println!("\n✓ Initialization complete!");
    println!("\nGenerated structure:");
    println!("  {}/", path.display());
    println!("  ├── site.toml            ← Site title, navigation, theme colors");
    println!("  ├── posts/");
    println!("  │   └── hello-world.md   ← Blog posts, one markdown file each");
    println!("  ├── pages/");
    println!("  │   ├── index.md");
    println!("  │   ├── about.md");
    println!("  │   └── contact.md");
    println!("  └── static/              ← Copied to the output as-is");

    println!("\nNext steps:");
    println!("  1. Edit site.toml");
    println!("  2. Write a post in posts/");
    println!("  3. Preview: folio preview {}", path.display());

    Ok(())
}

fn create_directory_structure(base: &Path) -> Result<()> {
    for dir in ["posts", "pages", "static"] {
        fs::create_dir_all(base.join(dir))
            .with_context(|| format!("Failed to create {}/", dir))?;
    }
    Ok(())
}

fn generate_site_toml(base: &Path, title: &str, author: Option<&str>) -> Result<()> {
    let title = toml_escape_string(title);
    let author_line = match author {
        Some(author) => format!("author = \"{}\"\n", toml_escape_string(author)),
        None => String::from("# author = \"Your Name\"\n"),
    };

    let toml = format!(
        "# Generated by folio init\n\
# Edit this file to customize your site\n\
\n\
[site]\n\
title = \"{title}\"\n\
description = \"Notes, projects and experiments\"\n\
{author_line}\
# url = \"https://example.com\"  # Enables canonical links\n\
\n\
[content]\n\
posts_dir = \"posts\"\n\
pages_dir = \"pages\"\n\
static_dir = \"static\"\n\
excerpt_length = 140\n\
date_format = \"%b %d, %Y\"\n\
\n\
[theme]\n\
storage_key = \"theme\"\n\
default = \"light\"\n\
\n\
# Override palette entries; each becomes a --color-<name> variable\n\
# [theme.light]\n\
# primary = \"#1d048d\"\n\
# [theme.dark]\n\
# primary = \"#1ca086\"\n\
\n\
# Navigation defaults to Home, Blog, Projects, About and Contact\n\
# [[nav]]\n\
# name = \"Blog\"\n\
# path = \"/blog\"\n\
\n\
[[social]]\n\
name = \"GitHub\"\n\
url = \"https://github.com/\"\n\
\n\
# [[project]]\n\
# id = \"my-project\"\n\
# name = \"My Project\"\n\
# description = \"What it does\"\n\
# tags = [\"rust\"]\n\
# github_link = \"https://github.com/\"\n"
    );

    parse_site_toml_str(&toml)
        .context("Generated site.toml is invalid - this is a bug in the template generator")?;

    fs::write(base.join("site.toml"), toml)?;

    Ok(())
}

fn generate_example_content(base: &Path) -> Result<()> {
    let today = Local::now().format("%Y-%m-%d").to_string();

    let post = format!(
        r##"---
path: /blog/hello-world
title: Hello, world
date: {today}
description: The first post on this site
tags: [meta]
---

Welcome! This post lives in `posts/hello-world.md`.

Every document starts with a frontmatter block. `path` decides where the page
is served; `title`, `date`, `description` and `tags` are optional.

```rust
fn main() {{
    println!("hello");
}}
```
"##
    );
    fs::write(base.join("posts").join("hello-world.md"), post)?;

    let pages = [
        (
            "index.md",
            "---\npath: /\ntitle: Home\n---\n\nHi, welcome to my corner of the web.\n",
        ),
        (
            "about.md",
            "---\npath: /about\ntitle: About\n---\n\nA few words about me.\n",
        ),
        (
            "contact.md",
            "---\npath: /contact\ntitle: Contact\n---\n\nWhere to find me.\n",
        ),
    ];
    for (name, content) in pages {
        fs::write(base.join("pages").join(name), content)?;
    }

    Ok(())
}
