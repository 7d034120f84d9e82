//! Command-line settings

use std::path::{Path, PathBuf};

use propstream::codec::Endian;
use propstream::schema::MANIFEST;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default settings file, looked up in the working directory.
pub const SETTINGS_FILE: &str = "propstream.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the variant manifest and schema descriptions
    pub templates_dir: PathBuf,
    pub manifest: String,
    /// Byte order for binary input and output
    pub endian: Endian,
    /// Root element name of text documents
    pub text_root: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            manifest: MANIFEST.to_string(),
            endian: Endian::Big,
            text_root: "PropertyStream".to_string(),
        }
    }
}

impl Settings {
    /// Load settings; a missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.unwrap_or(Path::new(SETTINGS_FILE));
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => {
                debug!(file = %path.display(), "no settings file, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(file = %path.display(), "ignoring invalid settings: {e}");
                Self::default()
            }
        }
    }
}
