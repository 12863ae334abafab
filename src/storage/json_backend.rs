use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{tracker::Tracker, utils};

use super::{Result, StorageBackend};

const TMP_SUFFIX: &str = "tmp";

/// JSON file storage for a single tracker document.
///
/// Loading is deliberately forgiving: a missing file and an unparseable one
/// both yield the default document, so a corrupt store never takes the caller
/// down with it.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    data_file: PathBuf,
}

impl JsonStorage {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
        }
    }

    /// Storage bound to the default data file under the app data directory.
    pub fn new_default() -> Self {
        Self::new(utils::data_file())
    }

    pub fn path(&self) -> &Path {
        &self.data_file
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, tracker: &Tracker) -> Result<()> {
        if let Some(parent) = self.data_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(tracker)?;
        let tmp = tmp_path(&self.data_file);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.data_file)?;
        Ok(())
    }

    fn load(&self) -> Result<Tracker> {
        if !self.data_file.exists() {
            return Ok(Tracker::default());
        }
        let data = fs::read_to_string(&self.data_file)?;
        if data.trim().is_empty() {
            return Ok(Tracker::default());
        }
        match serde_json::from_str(&data) {
            Ok(tracker) => Ok(tracker),
            Err(err) => {
                tracing::warn!(
                    path = %self.data_file.display(),
                    %err,
                    "tracker document unreadable, starting from defaults"
                );
                Ok(Tracker::default())
            }
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
