//! Configuration file watcher for hot reload.
//!
//! Editors and orchestrators often save by writing a sibling file and renaming
//! it over the original, which replaces the inode. The watch is therefore held
//! on the parent directory and events are filtered on the file name, so every
//! save is seen and not just the first.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::DashboardConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<DashboardConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<DashboardConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for updates to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let file_name = self.path.file_name().map(OsString::from).ok_or_else(|| {
            notify::Error::generic("configuration path has no file name").add_path(self.path.clone())
        })?;
        let dir = watched_dir(&self.path);

        let tx = self.update_tx;
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    if !touches_file(&event, &file_name) {
                        return;
                    }

                    tracing::info!(path = %path.display(), "Config file change detected, reloading");
                    match load_config(&path) {
                        Ok(config) => {
                            let _ = tx.send(config);
                        }
                        Err(e) => tracing::error!(
                            error = %e,
                            "Failed to reload config, keeping current configuration"
                        ),
                    }
                }
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), dir = %dir.display(), "Config watcher started");
        Ok(watcher)
    }
}

/// Directory holding the file; a bare file name lives in the working directory.
fn watched_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn touches_file(event: &Event, file_name: &OsString) -> bool {
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    fn write_config(dir: &Path, name: &str, username: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("[appfigures]\nusername = \"{}\"\n", username)).unwrap();
        path
    }

    /// Save the way editors do: write a sibling file, then rename it over the target.
    fn replace_config(target: &Path, username: &str) {
        let dir = target.parent().unwrap();
        let staged = write_config(dir, ".dashboard.toml.swp", username);
        std::fs::rename(staged, target).unwrap();
    }

    async fn next_username(rx: &mut mpsc::UnboundedReceiver<DashboardConfig>, expected: &str) {
        let wait = async {
            while let Some(config) = rx.recv().await {
                if config.appfigures.username == expected {
                    return;
                }
            }
            panic!("watcher channel closed");
        };
        timeout(Duration::from_secs(10), wait)
            .await
            .unwrap_or_else(|_| panic!("no reload with username {}", expected));
    }

    #[test]
    fn test_watched_dir() {
        assert_eq!(watched_dir(Path::new("dashboard.toml")), PathBuf::from("."));
        assert_eq!(
            watched_dir(Path::new("/etc/wall/dashboard.toml")),
            PathBuf::from("/etc/wall")
        );
    }

    #[tokio::test]
    async fn test_reloads_after_every_rename_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "dashboard.toml", "a");

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _watcher = watcher.run().unwrap();

        replace_config(&path, "b");
        next_username(&mut rx, "b").await;

        replace_config(&path, "c");
        next_username(&mut rx, "c").await;

        write_config(dir.path(), "dashboard.toml", "d");
        next_username(&mut rx, "d").await;
    }

    #[tokio::test]
    async fn test_ignores_other_files_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "dashboard.toml", "a");

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _watcher = watcher.run().unwrap();

        write_config(dir.path(), "unrelated.toml", "x");
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }
}
