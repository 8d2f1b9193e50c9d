//! Build the static site

use anyhow::Result;
use std::ops::ControlFlow;
use std::time::Instant;

use crate::generator::{BuildReport, Generator};
use crate::helpers::watch_paths;
use crate::Folio;

/// Load content and write the whole site to the public directory
pub fn run(folio: &Folio) -> Result<()> {
    build(folio).map(|_| ())
}

/// Like [`run`], returning what was written
pub fn build(folio: &Folio) -> Result<BuildReport> {
    let start = Instant::now();

    let store = folio.load_store()?;
    let generator = Generator::new(folio)?;
    let report = generator.generate(&store)?;

    tracing::info!(
        "Generated {} pages, {} posts and {} assets in {:.2}s",
        report.pages,
        report.posts,
        report.assets,
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}

/// Watch content, static files and config, rebuilding after each burst of changes
pub async fn watch(folio: &Folio) -> Result<()> {
    let base_dir = folio.base_dir.clone();
    let watched = vec![
        folio.content_dir.clone(),
        folio.static_dir.clone(),
        folio.config_path(),
    ];

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    tokio::task::spawn_blocking(move || {
        watch_paths(&watched, || {
            tracing::info!("Change detected, rebuilding...");
            // Config may have changed too
            if let Err(e) = Folio::new(&base_dir).and_then(|folio| run(&folio)) {
                tracing::error!("Build failed: {:#}", e);
            }
            ControlFlow::Continue(())
        })
    })
    .await?
}
