//! Interaction record persistence with file locking.
//!
//! The record of which content each user has consumed lives in a single
//! JSON document that is replaced atomically on every save.

use crate::{ContentId, Error, Interaction, Result, UserId};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Consumed content per user
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct InteractionState {
    #[serde(default)]
    pub users: BTreeMap<UserId, Vec<Interaction>>,
}

impl InteractionState {
    /// Ids the user has interacted with
    pub fn consumed_ids(&self, user_id: UserId) -> HashSet<ContentId> {
        self.users
            .get(&user_id)
            .map(|list| list.iter().map(|i| i.content_id).collect())
            .unwrap_or_default()
    }

    /// Interactions for a user in recording order
    pub fn interactions(&self, user_id: UserId) -> &[Interaction] {
        self.users.get(&user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Add an interaction, rejecting ratings outside 1-5
    pub fn record(&mut self, user_id: UserId, interaction: Interaction) -> Result<()> {
        if let Some(rating) = interaction.rating {
            if !(1..=5).contains(&rating) {
                return Err(Error::Validation(format!(
                    "Rating must be between 1 and 5, got {}",
                    rating
                )));
            }
        }
        self.users.entry(user_id).or_default().push(interaction);
        Ok(())
    }

    /// Load state from a file with shared locking
    ///
    /// Returns empty state if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns empty state.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No interaction file found, starting empty");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open interaction file {:?}: {}. Starting empty.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock interaction file {:?}: {}. Starting empty.",
                path,
                e
            );
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read interaction file {:?}: {}. Starting empty.",
                path,
                e
            );
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<InteractionState>(&contents) {
            Ok(state) => {
                tracing::debug!("Loaded interactions from {:?}", path);
                Ok(state)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse interaction file {:?}: {}. Starting empty.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save state atomically: temp file, fsync, rename over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Store(format!("{:?} has no parent directory", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved interactions to {:?}", path);
        Ok(())
    }

    /// Load, modify and save back under an exclusive lock.
    ///
    /// The lock lives on a sidecar `<file>.lock` so it survives the rename
    /// that replaces the state file on save.
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut InteractionState) -> Result<()>,
    {
        let lock_path = lock_path(path);
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)?;
        lock.lock_exclusive()?;

        let result = Self::load(path).and_then(|mut state| {
            f(&mut state)?;
            state.save(path)?;
            Ok(state)
        });

        lock.unlock()?;
        result
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}
