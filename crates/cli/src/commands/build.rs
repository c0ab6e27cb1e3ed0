use super::site;
use anyhow::{Context, Result};
use folio_generator::{GenerateOptions, generate_site};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Build static site for deployment
pub async fn run(path: PathBuf, output: PathBuf, strict: bool) -> Result<()> {
    println!("🔨 Building static site...");
    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    let site = site::load(&path)?;

    println!("✓ Loaded: {}", site.config.metadata.title);
    println!("  Posts: {}", site.posts.len());
    println!("  Pages: {}", site.pages.len());
    site::print_report(&site.report);
    site::ensure_strict(&site.report, strict)?;
    println!();

    println!("📄 Rendering pages...");
    let generated = generate_site(
        &site.config,
        &site.posts,
        &site.pages,
        GenerateOptions::default(),
    )
    .context("Failed to generate site")?;
    println!("   ✓ Rendered {} pages", generated.pages.len());

    println!("📁 Writing output...");
    let written = generated
        .write_to(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("   ✓ Wrote {} files", written);

    println!("🎨 Copying static files...");
    let copied = copy_static(&site.static_dir(), &output)?;
    println!("   ✓ Copied {} static files", copied);

    println!();
    println!("✅ Build complete!");
    println!("   Output: {}", output.display());
    println!();
    println!("To test locally:");
    println!("   cd {} && python3 -m http.server 8000", output.display());
    println!();

    Ok(())
}

/// Copy `src` into `dst` preserving the directory layout.
///
/// Runs after the pages are written, so a static file replaces a generated
/// asset with the same name.
fn copy_static(src: &Path, dst: &Path) -> Result<usize> {
    if !src.exists() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::site::fixtures;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_build_writes_site() {
        let dir = TempDir::new().unwrap();
        fixtures::write_site(dir.path());
        let out = dir.path().join("dist");

        run(dir.path().to_path_buf(), out.clone(), true).await.unwrap();

        for file in [
            "about/index.html",
            "blog/index.html",
            "blog/first/index.html",
            "blog/second/index.html",
            "tags/index.html",
            "tags/rust/index.html",
            "tags/web/index.html",
            "style.css",
            "theme.js",
            "img/logo.svg",
        ] {
            assert!(out.join(file).is_file(), "missing {}", file);
        }
        assert!(!out.join("projects").exists());

        let first = fs::read_to_string(out.join("blog/first/index.html")).unwrap();
        assert!(first.contains("<strong>first</strong>"));
        assert!(first.contains("Next post ➡"));
        assert!(first.contains(r#"href="https://example.com/blog/first""#));
    }

    #[tokio::test]
    async fn test_build_strict_rejects_bad_dates() {
        let dir = TempDir::new().unwrap();
        fixtures::write_site(dir.path());
        fs::write(
            dir.path().join("posts/bad.md"),
            "---\npath: /blog/bad\ndate: 31/12/2020\n---\n",
        )
        .unwrap();
        let out = dir.path().join("dist");

        assert!(run(dir.path().to_path_buf(), out.clone(), true).await.is_err());
        assert!(!out.exists());

        run(dir.path().to_path_buf(), out.clone(), false).await.unwrap();
        assert!(!out.join("blog/bad").exists());
    }

    #[tokio::test]
    async fn test_build_fails_on_duplicate_path() {
        let dir = TempDir::new().unwrap();
        fixtures::write_site(dir.path());
        fs::write(
            dir.path().join("posts/copy.md"),
            "---\npath: /blog/first\n---\n",
        )
        .unwrap();

        let err = run(dir.path().to_path_buf(), dir.path().join("dist"), false)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Duplicate path '/blog/first'"));
    }

    #[test]
    fn test_copy_static_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(copy_static(&dir.path().join("nope"), dir.path()).unwrap(), 0);
    }
}
