// src/site/output.rs
// =============================================================================
// Output directory housekeeping: wipe it, copy static assets into it, and
// write the redirects.json index.
// =============================================================================

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::Error;
use crate::table::RedirectTable;

/// File name of the machine-readable redirect index
pub const INDEX_FILE: &str = "redirects.json";

/// Refuses output locations that would delete the assets on cleanup
pub fn check_output_dir(output: &Path, assets: &Path) -> Result<(), Error> {
    let (Ok(output), Ok(assets)) = (absolute(output), absolute(assets)) else {
        return Ok(());
    };
    if assets.starts_with(&output) {
        return Err(Error::Config(format!(
            "output directory {} would contain the assets directory {}",
            output.display(),
            assets.display()
        )));
    }
    Ok(())
}

// Like canonicalize, but works for paths that do not exist yet
fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(path) => Ok(path),
        Err(_) => Ok(std::env::current_dir()?.join(path)),
    }
}

/// Removes the output directory (if any) and creates it empty
pub fn prepare_output_dir(output: &Path) -> Result<()> {
    if output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to remove {}", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    Ok(())
}

/// Copies the assets tree into `output`, skipping the template file
///
/// Returns the number of files copied.
pub fn copy_assets(assets: &Path, output: &Path, template: &Path) -> Result<usize> {
    if !assets.is_dir() {
        return Err(Error::Config(format!(
            "assets directory {} does not exist",
            assets.display()
        ))
        .into());
    }

    let template = fs::canonicalize(template).ok();
    let mut copied = 0;

    for entry in WalkDir::new(assets).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to read {}", assets.display()))?;
        let relative = entry
            .path()
            .strip_prefix(assets)
            .context("Asset path outside the assets directory")?;
        let destination = output.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)
                .with_context(|| format!("Failed to create {}", destination.display()))?;
            continue;
        }

        if template.is_some() && fs::canonicalize(entry.path()).ok() == template {
            continue;
        }

        fs::copy(entry.path(), &destination)
            .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        copied += 1;
    }

    Ok(copied)
}

/// Writes redirects.json into `output`
pub fn write_index(output: &Path, table: &RedirectTable) -> Result<PathBuf> {
    let path = output.join(INDEX_FILE);
    let json = table.index_json().context("Failed to serialize redirect index")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Target;
    use crate::table::TableBuilder;

    #[test]
    fn test_prepare_output_dir_clears_old_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("dist");
        fs::create_dir_all(output.join("old")).unwrap();
        fs::write(output.join("old/stale.html"), "stale").unwrap();

        prepare_output_dir(&output).unwrap();
        assert!(output.is_dir());
        assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
    }

    #[test]
    fn test_copy_assets_skips_template() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("src");
        let output = dir.path().join("dist");
        fs::create_dir_all(assets.join("theme")).unwrap();
        fs::create_dir_all(&output).unwrap();
        fs::write(assets.join("index.html"), "index").unwrap();
        fs::write(assets.join("theme/style.css"), "body {}").unwrap();
        fs::write(assets.join("template.html"), "{{url}}").unwrap();

        let copied = copy_assets(&assets, &output, &assets.join("template.html")).unwrap();
        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(output.join("index.html")).unwrap(), "index");
        assert_eq!(
            fs::read_to_string(output.join("theme/style.css")).unwrap(),
            "body {}"
        );
        assert!(!output.join("template.html").exists());
    }

    #[test]
    fn test_missing_assets_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = copy_assets(&dir.path().join("nope"), dir.path(), Path::new("t.html"));
        assert!(result.is_err());
    }

    #[test]
    fn test_output_containing_assets_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("site/src");
        fs::create_dir_all(&assets).unwrap();

        assert!(check_output_dir(&dir.path().join("site"), &assets).is_err());
        assert!(check_output_dir(&assets, &assets).is_err());
        assert!(check_output_dir(&dir.path().join("dist"), &assets).is_ok());
    }

    #[test]
    fn test_write_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = TableBuilder::new();
        builder.insert("a,b", Target::url("https://x"));
        let table = builder.expand().unwrap();

        let path = write_index(dir.path(), &table).unwrap();
        assert_eq!(path, dir.path().join("redirects.json"));
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            r#"[{"name":"a","target":"https://x"},{"name":"b","target":"https://x"}]"#
        );
    }
}
