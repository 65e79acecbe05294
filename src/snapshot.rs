use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::world::{World, WorldSnapshot};

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub written_at: DateTime<Utc>,
    pub world: WorldSnapshot,
}

/// Writes `<dir>/<level>/frame_NNNNNN.json` every `interval` frames.
/// An interval of zero disables snapshots.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval,
        }
    }

    pub fn maybe_write(&self, world: &World, level: &str) -> Result<Option<PathBuf>> {
        if self.interval == 0 || world.frame() % self.interval != 0 {
            return Ok(None);
        }
        let dir = self.dir.join(level);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("frame_{:06}.json", world.frame()));
        let file = SnapshotFile {
            written_at: Utc::now(),
            world: world.snapshot(level),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}

pub fn read_snapshot(path: impl AsRef<Path>) -> Result<SnapshotFile> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let file = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    #[test]
    fn disabled_writer_never_writes() {
        let temp = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(temp.path(), 0);
        let mut world = World::new(Rect::new(0.0, 0.0, 640.0, 480.0), 16.0);
        world.advance_time(0.016);
        assert!(writer.maybe_write(&world, "lvl").unwrap().is_none());
        assert!(!temp.path().join("lvl").exists());
    }

    #[test]
    fn writes_on_interval_frames() {
        let temp = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(temp.path(), 2);
        let mut world = World::new(Rect::new(0.0, 0.0, 640.0, 480.0), 16.0);
        world.advance_time(0.016);
        assert!(writer.maybe_write(&world, "lvl").unwrap().is_none());
        world.advance_time(0.016);
        let path = writer.maybe_write(&world, "lvl").unwrap().expect("snapshot");
        assert_eq!(path, temp.path().join("lvl").join("frame_000002.json"));
        let file = read_snapshot(&path).unwrap();
        assert_eq!(file.world.frame, 2);
        assert_eq!(file.world.level, "lvl");
    }
}
