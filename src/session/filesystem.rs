use std::fs;
use std::path::PathBuf;

use super::store::SessionStore;
use super::upsert_into;
use crate::error::Result;
use crate::models::ChatSession;

/// Session store backed by a single JSON file holding the array of
/// sessions. Reads are tolerant: a missing or unparsable file is the
/// empty list. Writes replace the whole file via a temp-and-rename so a
/// crashed write never leaves a half-written store behind.
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("biochat").join("sessions.json"))
            .unwrap_or_else(|| PathBuf::from("biochat-sessions.json"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStore for JsonFileSessionStore {
    fn load_all(&self) -> Vec<ChatSession> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&contents) {
            Ok(sessions) => sessions,
            Err(e) => {
                log::warn!(
                    "ignoring corrupt session store at {}: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn find(&self, id: &str) -> Option<ChatSession> {
        self.load_all().into_iter().find(|s| s.id == id)
    }

    fn upsert(&self, session: &ChatSession) -> Result<()> {
        let mut sessions = self.load_all();
        upsert_into(&mut sessions, session.clone());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(&sessions)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
