use super::site;
use folio_generator::plan::build_plan;
use std::path::PathBuf;

pub async fn run(path: PathBuf, strict: bool) -> anyhow::Result<()> {
    println!("Validating site at: {}", path.display());

    let site = site::load(&path)?;

    println!("✓ site.toml valid");
    println!("  Site: {}", site.config.metadata.title);
    println!("  Posts: {}", site.posts.len());
    println!("  Pages: {}", site.pages.len());
    println!("  Projects: {}", site.config.projects.len());

    for line in &site.report.info {
        println!("  {}", line);
    }
    site::print_report(&site.report);

    let plan = build_plan(&site.posts, &site.pages, &site.config.projects)?;
    println!("✓ {} pages planned", plan.len());

    site::ensure_strict(&site.report, strict)?;

    if site.report.is_clean() {
        println!("\n✅ Everything looks good");
    } else {
        println!(
            "\n⚠ {} warning(s), {} rejected document(s)",
            site.report.warnings.len(),
            site.report.errors.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::site::fixtures;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_validate_clean_site() {
        let dir = TempDir::new().unwrap();
        fixtures::write_site(dir.path());
        run(dir.path().to_path_buf(), true).await.unwrap();
    }

    #[tokio::test]
    async fn test_validate_reports_route_collisions() {
        let dir = TempDir::new().unwrap();
        fixtures::write_site(dir.path());
        fs::write(
            dir.path().join("pages/blog.md"),
            "---\npath: /blog/first\n---\nClash\n",
        )
        .unwrap();

        let err = run(dir.path().to_path_buf(), false).await.unwrap_err();
        assert!(err.to_string().contains("/blog/first"));
    }
}
