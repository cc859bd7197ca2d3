// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token storage: in-memory and JSON-file backed, both behind [`TokenStore`].

use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::credential::Credential;

/// Holder of the session's token pair.
///
/// Writes are infallible from the caller's point of view: a store that
/// persists somewhere logs write failures and keeps serving the in-memory
/// value, so a full disk never breaks an in-flight refresh.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<Credential>;
    fn save(&self, credential: Credential);
    fn clear(&self);

    fn access_token(&self) -> Option<String> {
        self.load().map(|c| c.access_token)
    }
}

/// Process-local store, used by tests and one-shot embedders.
#[derive(Default)]
pub struct MemoryTokenStore {
    current: RwLock<Option<Credential>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self { current: RwLock::new(Some(credential)) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<Credential> {
        self.current.read().clone()
    }

    fn save(&self, credential: Credential) {
        *self.current.write() = Some(credential);
    }

    fn clear(&self) {
        *self.current.write() = None;
    }
}

/// Store persisted to a JSON file (`{"accessToken": .., "refreshToken": ..}`).
///
/// The file is read once on open and rewritten atomically on every change.
pub struct FileTokenStore {
    path: PathBuf,
    current: RwLock<Option<Credential>>,
}

impl FileTokenStore {
    /// Open the store, loading an existing token file if there is one.
    ///
    /// A missing file is an empty store. An unreadable or malformed file is
    /// an error rather than a silent sign-out.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let current = if path.exists() { Some(load(&path)?) } else { None };
        Ok(Self { path, current: RwLock::new(current) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<Credential> {
        self.current.read().clone()
    }

    fn save(&self, credential: Credential) {
        let mut current = self.current.write();
        if let Err(e) = save(&self.path, &credential) {
            tracing::warn!(path = %self.path.display(), err = %e, "failed to persist credentials");
        }
        *current = Some(credential);
    }

    fn clear(&self) {
        let mut current = self.current.write();
        *current = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), err = %e, "failed to remove credentials");
            }
        }
    }
}

/// Load a credential from a JSON file.
pub fn load(path: &Path) -> anyhow::Result<Credential> {
    let contents = std::fs::read_to_string(path)?;
    let credential: Credential = serde_json::from_str(&contents)?;
    Ok(credential)
}

/// Save a credential to a JSON file atomically (write tmp + rename).
///
/// Uses a unique temp filename (PID + counter) so concurrent saves never
/// share a `.tmp` file.
pub fn save(path: &Path, credential: &Credential) -> anyhow::Result<()> {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let json = serde_json::to_string_pretty(credential)?;
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(
        "{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        seq,
    );
    let tmp_path = path.with_file_name(tmp_name);
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
