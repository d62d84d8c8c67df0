use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core_api::{CoreError, CoreErrorCode};
use crate::document::SaveFiles;

const USER_ENV_VARS: [&str; 2] = ["USER", "USERNAME"];

#[cfg(target_os = "windows")]
const DEFAULT_LOCATION: (&str, &str, &str) = (
    "C:/Users/",
    "/AppData/LocalLow/DefaultCompany/Roguelands/PlayerPrefs.txt",
    "/AppData/LocalLow/DefaultCompany/Roguelands/PlayerPrefs.tmp",
);

#[cfg(target_os = "macos")]
const DEFAULT_LOCATION: (&str, &str, &str) = (
    "/Users/",
    "/Library/Application Support/DefaultCompany/Roguelands/PlayerPrefs.txt",
    "/Library/Application Support/DefaultCompany/Roguelands/PlayerPrefs.tmp",
);

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const DEFAULT_LOCATION: (&str, &str, &str) = (
    "/home/",
    "/.config/unity3d/DefaultCompany/Roguelands/PlayerPrefs.txt",
    "/.config/unity3d/DefaultCompany/Roguelands/PlayerPrefs.tmp",
);

/// Where the game keeps `PlayerPrefs.txt`: `prefix + user + suffix`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SaveLocation {
    pub prefix: String,
    pub suffix: String,
    pub temp_suffix: String,
}

impl Default for SaveLocation {
    fn default() -> Self {
        let (prefix, suffix, temp_suffix) = DEFAULT_LOCATION;
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            temp_suffix: temp_suffix.to_string(),
        }
    }
}

impl SaveLocation {
    pub fn files_for(&self, user_name: &str) -> SaveFiles {
        SaveFiles::new(
            format!("{}{user_name}{}", self.prefix, self.suffix),
            format!("{}{user_name}{}", self.prefix, self.temp_suffix),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub save_path: Option<PathBuf>,
    pub temp_path: Option<PathBuf>,
    pub user_name: Option<String>,
    pub location: SaveLocation,
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|e| {
            CoreError::new(CoreErrorCode::Parse, format!("invalid editor config: {e}"))
        })
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let json = fs::read_to_string(path).map_err(|e| CoreError::io_at("read", path, e))?;
        Self::from_json_str(&json)
    }

    pub fn with_save_path(mut self, save_path: impl Into<PathBuf>) -> Self {
        self.save_path = Some(save_path.into());
        self
    }

    /// An explicit save path wins; otherwise the path is derived from the
    /// current user.
    pub fn resolve_files(&self) -> Result<SaveFiles, CoreError> {
        let mut files = match &self.save_path {
            Some(path) => SaveFiles::beside(path),
            None => self.location.files_for(&self.resolve_user_name()?),
        };
        if let Some(temp_path) = &self.temp_path {
            files.temp_path = temp_path.clone();
        }
        Ok(files)
    }

    pub fn resolve_user_name(&self) -> Result<String, CoreError> {
        if let Some(name) = self.user_name.as_deref().filter(|name| !name.is_empty()) {
            return Ok(name.to_string());
        }

        USER_ENV_VARS
            .iter()
            .find_map(|var| env::var(var).ok().filter(|value| !value.is_empty()))
            .ok_or_else(|| {
                CoreError::new(
                    CoreErrorCode::Io,
                    format!(
                        "could not determine the current user; set {} or user_name in the config",
                        USER_ENV_VARS.join("/")
                    ),
                )
            })
    }
}
