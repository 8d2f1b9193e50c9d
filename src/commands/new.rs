//! Create a new post or page

use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::Collection;
use crate::Folio;

/// Create a new post or page and return its path.
///
/// `path` overrides the slugified title and may contain `/` for nested pages.
pub fn create_entry(folio: &Folio, title: &str, layout: &str, path: Option<&str>) -> Result<PathBuf> {
    let collection = match layout {
        "post" => Collection::Posts,
        "page" => Collection::Pages,
        other => return Err(anyhow!("Unknown layout: {}. Available: post, page", other)),
    };

    let relative = match path {
        Some(p) => p.trim_matches('/').to_string(),
        None => slug::slugify(title),
    };
    if relative.is_empty() || relative.split('/').any(|s| s.is_empty() || s == "..") {
        return Err(anyhow!("Cannot derive a file name from {:?}", title));
    }

    let file_path = folio
        .content_dir
        .join(collection.dir_name())
        .join(format!("{}.md", relative));

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let now = chrono::Local::now();
    let content = match collection {
        Collection::Posts => format!(
            "---\ntitle: {}\ndescription:\ndate: {}\n---\n",
            yaml_string(title),
            now.format("%Y-%m-%d %H:%M:%S")
        ),
        Collection::Pages => format!("---\ntitle: {}\ndescription:\n---\n", yaml_string(title)),
    };

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Quote a title so `:` and `#` survive YAML parsing
fn yaml_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
