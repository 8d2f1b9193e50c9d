//! Debounced file watching shared by `build --watch` and the server

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Quiet period that closes a burst of events
const DEBOUNCE: Duration = Duration::from_millis(300);

/// Editor droppings and VCS internals that never affect the site
pub fn is_relevant(path: &Path) -> bool {
    let path = path.to_string_lossy();
    !path.contains(".git") && !path.contains(".DS_Store") && !path.ends_with('~')
}

/// Block, calling `on_change` once per burst of relevant changes.
///
/// A burst ends after a quiet period, so the last write of a burst always
/// triggers a call. Missing paths are skipped. Returns when `on_change`
/// breaks or the watcher goes away.
pub fn watch_paths<F>(paths: &[PathBuf], mut on_change: F) -> Result<()>
where
    F: FnMut() -> ControlFlow<()>,
{
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(DEBOUNCE, tx)?;

    for path in paths {
        let mode = if path.is_dir() {
            RecursiveMode::Recursive
        } else if path.exists() {
            RecursiveMode::NonRecursive
        } else {
            continue;
        };
        debouncer.watcher().watch(path, mode)?;
        tracing::debug!("Watching: {:?}", path);
    }

    for result in rx {
        match result {
            Ok(events) => {
                if !events.iter().any(|e| is_relevant(&e.path)) {
                    continue;
                }
                if on_change().is_break() {
                    break;
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Instant;
    use tempfile::TempDir;

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant(Path::new("content/posts/a.md")));
        assert!(!is_relevant(Path::new("content/.git/index")));
        assert!(!is_relevant(Path::new("content/posts/a.md~")));
        assert!(!is_relevant(Path::new("content/.DS_Store")));
    }

    #[test]
    fn test_last_write_of_a_burst_triggers_a_call() {
        let dir = TempDir::new().unwrap();
        let watched = vec![dir.path().to_path_buf()];
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            watch_paths(&watched, || match tx.send(Instant::now()) {
                Ok(()) => ControlFlow::Continue(()),
                Err(_) => ControlFlow::Break(()),
            })
        });
        thread::sleep(Duration::from_millis(200));

        for i in 0..5 {
            fs::write(dir.path().join("post.md"), format!("edit {}", i)).unwrap();
            thread::sleep(Duration::from_millis(50));
        }
        let last_write = Instant::now();

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut saw_trailing_call = false;
        while Instant::now() < deadline {
            match rx.recv_timeout(Duration::from_millis(500)) {
                Ok(at) if at >= last_write => {
                    saw_trailing_call = true;
                    break;
                }
                Ok(_) | Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        assert!(saw_trailing_call);

        // The watcher stops on its next call once nobody listens.
        drop(rx);
        fs::write(dir.path().join("post.md"), "stop").unwrap();
        drop(handle);
    }
}
