//! File-based storage backend.
//!
//! One file per aggregate under a data directory: `period-<id>.bin`,
//! postcard-encoded. Persisting writes to a temporary file in the same
//! directory, fsyncs, then renames over the final name — the rename is the
//! atomic commit point, so a crash mid-persist leaves either the previous
//! file or the new one, never a torn record.

use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use snafu::ResultExt;

use flexreg_types::error::{CodecSnafu, IoSnafu, StorageSnafu};
use flexreg_types::{decode, encode, FlexPeriod, PeriodId, Result};

use super::StorageBackend;

/// Extension of aggregate files inside the data directory.
const PERIOD_FILE_EXT: &str = "bin";

/// File-based storage backend rooted at a data directory.
#[derive(Debug)]
pub struct FileBackend {
    /// Data directory; created on open if missing.
    dir: PathBuf,
}

impl FileBackend {
    /// Opens the backend, creating the data directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the directory cannot be created (bad permissions,
    /// or the path names an existing non-directory).
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| {
                StorageSnafu {
                    message: format!("cannot create data directory {}: {e}", dir.display()),
                }
                .build()
            })?;
        Ok(Self { dir })
    }

    /// Path of the aggregate file for a period.
    fn period_path(&self, period_id: PeriodId) -> PathBuf {
        self.dir.join(format!("period-{}.{PERIOD_FILE_EXT}", period_id.value()))
    }

    /// Whether a directory entry looks like an aggregate file.
    fn is_period_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == PERIOD_FILE_EXT)
    }
}

impl StorageBackend for FileBackend {
    fn load_all(&self) -> Result<Vec<FlexPeriod>> {
        let mut periods = Vec::new();
        for entry in fs::read_dir(&self.dir).context(IoSnafu)? {
            let path = entry.context(IoSnafu)?.path();
            if !Self::is_period_file(&path) {
                continue;
            }
            let bytes = fs::read(&path).context(IoSnafu)?;
            periods.push(decode(&bytes).context(CodecSnafu)?);
        }
        Ok(periods)
    }

    fn persist(&self, period: &FlexPeriod) -> Result<()> {
        let bytes = encode(period).context(CodecSnafu)?;

        let final_path = self.period_path(period.id);
        let tmp_path = final_path.with_extension("tmp");

        let mut tmp = File::create(&tmp_path).context(IoSnafu)?;
        tmp.write_all(&bytes).context(IoSnafu)?;
        tmp.sync_all().context(IoSnafu)?;
        drop(tmp);

        fs::rename(&tmp_path, &final_path).context(IoSnafu)?;
        Ok(())
    }
}
