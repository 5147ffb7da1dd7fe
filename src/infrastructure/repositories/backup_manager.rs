//! Backup manager
//!
//! Full snapshots of the state directory as timestamped archives in
//! `backups/`. Archives are never modified after creation.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::domain::entities::{backup_file_name, Backup, ARCHIVE_EXTENSION};
use crate::domain::ports::Archiver;
use crate::domain::value_objects::{validate_label, BackupTimestamp, RollbackSelector};
use crate::error::{IoContext, NixlayerError, NixlayerResult};
use crate::infrastructure::fs::mirror_dir;
use crate::infrastructure::layout::StateLayout;

pub struct BackupManager<A> {
    layout: StateLayout,
    archiver: A,
}

impl<A: Archiver> BackupManager<A> {
    pub fn new(layout: StateLayout, archiver: A) -> Self {
        Self { layout, archiver }
    }

    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    /// Snapshot the state directory now.
    pub fn create(&self, label: Option<&str>) -> NixlayerResult<Backup> {
        self.create_at(label, BackupTimestamp::now())
    }

    /// Snapshot the state directory, named for `timestamp`.
    ///
    /// If a backup with that timestamp exists, the timestamp moves forward
    /// one second at a time until it is free.
    pub fn create_at(&self, label: Option<&str>, timestamp: BackupTimestamp) -> NixlayerResult<Backup> {
        if let Some(label) = label {
            validate_label(label)?;
        }

        let dir = self.layout.backups_dir();
        fs::create_dir_all(&dir).io_context(|| format!("creating {}", dir.display()))?;

        let taken: Vec<BackupTimestamp> = self.list()?.iter().map(|b| b.timestamp).collect();
        let mut timestamp = timestamp;
        while taken.contains(&timestamp) {
            timestamp = timestamp.next_second();
        }

        let temp = tempfile::Builder::new()
            .prefix(".tmp-")
            .suffix(&format!(".{ARCHIVE_EXTENSION}"))
            .tempfile_in(&dir)
            .io_context(|| format!("creating temp archive in {}", dir.display()))?;
        self.archiver.create(
            self.layout.root(),
            temp.path(),
            &self.layout.snapshot_excludes(),
        )?;

        let path = dir.join(backup_file_name(label, timestamp));
        temp.persist_noclobber(&path)
            .map_err(|e| e.error)
            .io_context(|| format!("renaming archive into {}", path.display()))?;
        let size = fs::metadata(&path)
            .io_context(|| format!("inspecting {}", path.display()))?
            .len();

        tracing::info!(backup = %path.display(), size, "created backup");
        Ok(Backup {
            timestamp,
            label: label.map(str::to_string),
            path,
            size,
        })
    }

    /// Every backup, oldest first.
    pub fn list(&self) -> NixlayerResult<Vec<Backup>> {
        let dir = self.layout.backups_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(NixlayerError::io(format!("listing {}", dir.display()), e)),
        };

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.io_context(|| format!("listing {}", dir.display()))?;
            let meta = entry
                .metadata()
                .io_context(|| format!("inspecting {}", entry.path().display()))?;
            if !meta.is_file() {
                continue;
            }
            if let Some(backup) = Backup::from_path(&entry.path(), meta.len()) {
                backups.push(backup);
            }
        }
        backups.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.path.cmp(&b.path))
        });
        Ok(backups)
    }

    /// Look a backup up by exact timestamp, file name or path.
    pub fn find(&self, identifier: &str) -> NixlayerResult<Backup> {
        let backups = self.list()?;
        let identifier = identifier.trim();

        let found = match BackupTimestamp::parse(identifier) {
            Some(ts) => backups.into_iter().find(|b| b.timestamp == ts),
            None => {
                let file_name = Path::new(identifier)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(identifier);
                backups.into_iter().find(|b| b.file_name() == file_name)
            }
        };
        found.ok_or_else(|| NixlayerError::not_found("backup", identifier))
    }

    /// Pick the backup a rollback request refers to.
    ///
    /// `Within(d)` selects the most recent backup at or after `now - d`.
    pub fn resolve(&self, selector: &RollbackSelector, now: NaiveDateTime) -> NixlayerResult<Backup> {
        match selector {
            RollbackSelector::Exact(ts) => self
                .list()?
                .into_iter()
                .find(|b| b.timestamp == *ts)
                .ok_or_else(|| NixlayerError::not_found("backup", ts.to_string())),
            RollbackSelector::Within(_) => {
                let cutoff = selector.cutoff(now).ok_or_else(|| {
                    NixlayerError::validation("backup", "duration reaches before the calendar start")
                })?;
                self.list()?
                    .into_iter()
                    .rev()
                    .find(|b| b.timestamp.as_datetime() >= cutoff)
                    .ok_or_else(|| {
                        NixlayerError::not_found(
                            "backup",
                            format!(
                                "at or after {} ({})",
                                cutoff.format("%Y-%m-%d %H:%M:%S"),
                                BackupTimestamp::new(cutoff)
                            ),
                        )
                    })
            }
        }
    }

    /// Restore `backup` over the state directory.
    pub fn restore(&self, backup: &Backup) -> NixlayerResult<()> {
        self.restore_to(&backup.path, self.layout.root())
    }

    /// Two-phase restore: extract `archive` completely into a staging
    /// directory, then mirror the staged tree into `target`.
    ///
    /// A corrupt or truncated archive fails in the first phase and leaves
    /// `target` untouched. The backup and log directories of `target` are
    /// never modified.
    pub fn restore_to(&self, archive: &Path, target: &Path) -> NixlayerResult<()> {
        if !archive.is_file() {
            return Err(NixlayerError::not_found(
                "backup",
                archive.display().to_string(),
            ));
        }

        let dir = self.layout.backups_dir();
        fs::create_dir_all(&dir).io_context(|| format!("creating {}", dir.display()))?;
        let staging = tempfile::Builder::new()
            .prefix(".restore-")
            .tempdir_in(&dir)
            .io_context(|| format!("creating staging directory in {}", dir.display()))?;

        self.archiver.extract(archive, staging.path())?;
        tracing::debug!(archive = %archive.display(), staging = %staging.path().display(), "staged backup");

        mirror_dir(staging.path(), target, &self.layout.snapshot_excludes())?;

        tracing::info!(archive = %archive.display(), target = %target.display(), "restored backup");
        Ok(())
    }

    /// Remove the backup named by `identifier`.
    pub fn delete(&self, identifier: &str) -> NixlayerResult<Backup> {
        let backup = self.find(identifier)?;
        fs::remove_file(&backup.path)
            .io_context(|| format!("removing {}", backup.path.display()))?;
        tracing::info!(backup = %backup.path.display(), "deleted backup");
        Ok(backup)
    }

    /// Delete all but the newest `keep` backups. Returns what was deleted.
    pub fn prune(&self, keep: usize) -> NixlayerResult<Vec<Backup>> {
        let backups = self.list()?;
        let excess = backups.len().saturating_sub(keep);
        let mut deleted = Vec::with_capacity(excess);
        for backup in backups.into_iter().take(excess) {
            fs::remove_file(&backup.path)
                .io_context(|| format!("removing {}", backup.path.display()))?;
            deleted.push(backup);
        }
        if !deleted.is_empty() {
            tracing::info!(deleted = deleted.len(), kept = keep, "pruned backups");
        }
        Ok(deleted)
    }
}
