use std::fs;
use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde_json::Error as SerdeError;

use crate::domain::PersistedSession;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "FreightDesk";
const APP_NAME: &str = "FreightDesk";

const SESSION_FILE: &str = "session.json";

/// Platform config directory shared by the session and config files.
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

fn session_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(SESSION_FILE))
}

pub fn load_session() -> Option<PersistedSession> {
    let path = session_file()?;
    let data = match fs::read_to_string(&path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read session file");
            return None;
        }
    };
    match serde_json::from_str(&data) {
        Ok(session) => Some(session),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable session file");
            None
        }
    }
}

pub fn save_session(session: &PersistedSession) -> Result<(), PersistSaveError> {
    let path = session_file().ok_or(PersistSaveError::StorageUnavailable)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(session)?;
    fs::write(&path, json)?;
    tracing::debug!(path = %path.display(), "session saved");
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PersistSaveError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}
