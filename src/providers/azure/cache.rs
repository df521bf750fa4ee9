use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use log::{debug, info};

use crate::error::{Result, WorkLensError};

use super::types::Snapshot;

/// Daily snapshot cache for fetched work items.
///
/// Persists the flat item collection once per calendar date so repeated runs
/// on the same day reuse the stored snapshot instead of querying the remote
/// collection again. The cache key is the calendar date only: a same-day
/// snapshot is always preferred over refetching, which is an accepted
/// staleness tolerance, not a defect. Uses per-project cache files in
/// platform-specific cache directories:
/// - Linux: `~/.cache/worklens/{project-slug}/items_{date}.json`
/// - macOS: `~/Library/Caches/worklens/{project-slug}/items_{date}.json`
pub struct SnapshotCache {
    cache_dir: PathBuf,
    enabled: bool,
}

impl SnapshotCache {
    /// Creates a cache instance for one project.
    ///
    /// # Arguments
    ///
    /// * `project` - Team project name
    /// * `enabled` - Whether caching is enabled
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be determined or
    /// created.
    pub fn new(project: &str, enabled: bool) -> Result<Self> {
        if !enabled {
            debug!("Snapshot cache disabled");
            return Ok(Self {
                cache_dir: PathBuf::new(),
                enabled: false,
            });
        }

        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| WorkLensError::CacheRead("No cache directory found".into()))?
            .join("worklens")
            .join(project.replace(['/', '\\'], "-"));

        fs::create_dir_all(&cache_dir)?;

        info!("Snapshot cache enabled at: {}", cache_dir.display());

        Ok(Self {
            cache_dir,
            enabled: true,
        })
    }

    /// Loads the snapshot stored for a calendar date, if any.
    ///
    /// A missing snapshot is a cache miss (`Ok(None)`), not an error.
    ///
    /// # Errors
    ///
    /// Returns [`WorkLensError::CacheRead`] when a stored snapshot exists but
    /// cannot be read or parsed. A corrupt snapshot is never returned as a
    /// partial result.
    pub fn load(&self, date: NaiveDate) -> Result<Option<Snapshot>> {
        if !self.enabled {
            return Ok(None);
        }

        let file = self.snapshot_file(date);
        if !file.exists() {
            debug!("Cache miss for {date}");
            return Ok(None);
        }

        let contents = fs::read_to_string(&file)
            .map_err(|e| WorkLensError::CacheRead(format!("{}: {e}", file.display())))?;
        let snapshot: Snapshot = serde_json::from_str(&contents)
            .map_err(|e| WorkLensError::CacheRead(format!("{}: {e}", file.display())))?;

        info!(
            "Loaded {} work items from cache: {}",
            snapshot.len(),
            file.display()
        );

        Ok(Some(snapshot))
    }

    /// Persists the snapshot for a calendar date, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`WorkLensError::CacheWrite`] when the snapshot cannot be
    /// persisted.
    pub fn store(&self, date: NaiveDate, snapshot: &Snapshot) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let file = self.snapshot_file(date);
        let contents = serde_json::to_string(snapshot)?;
        fs::write(&file, contents)
            .map_err(|e| WorkLensError::CacheWrite(format!("{}: {e}", file.display())))?;

        debug!(
            "Saved {} work items to cache: {}",
            snapshot.len(),
            file.display()
        );

        Ok(())
    }

    fn snapshot_file(&self, date: NaiveDate) -> PathBuf {
        self.cache_dir
            .join(format!("items_{}.json", date.format("%Y%m%d")))
    }
}
