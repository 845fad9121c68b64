use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::cache::atomic_write;

/// Runtime settings resolved from the command line and the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub cache_dir: PathBuf,
    pub editor: String,
}

impl Config {
    pub fn resolve(cache_dir: Option<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.unwrap_or_else(default_cache_dir),
            editor: std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string()),
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.cache_dir.join("hquiz.log")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.cache_dir.join("settings.json")
    }

    /// Pick where log output goes. With `to_file` the log file is opened
    /// (and the cache directory created) up front.
    pub fn log_target(&self, to_file: bool) -> LogTarget {
        if !to_file {
            return LogTarget::Stderr;
        }
        let opened = fs::create_dir_all(&self.cache_dir).and_then(|_| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.log_file())
        });
        match opened {
            Ok(file) => LogTarget::File(file),
            Err(e) => LogTarget::ErrorsToStderr(e),
        }
    }
}

#[derive(Debug)]
pub enum LogTarget {
    Stderr,
    File(File),
    /// The log file could not be opened; only errors reach stderr so the
    /// terminal UI stays readable.
    ErrorsToStderr(io::Error),
}

pub fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("", "", "hquiz")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".hquiz"))
}

/// Presenter preferences kept between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_show_question_text")]
    pub show_question_text: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_question_text: default_show_question_text(),
        }
    }
}

fn default_show_question_text() -> bool {
    true
}

impl Settings {
    /// Missing or unreadable settings fall back to the defaults.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "cannot read settings: {}", e);
                return Self::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), "ignoring corrupt settings: {}", e);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        atomic_write(path, content.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        assert_eq!(Settings::load(&path), Settings::default());

        let settings = Settings {
            show_question_text: false,
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);

        fs::write(&path, "{ broken").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn unopenable_log_file_falls_back_to_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let config = Config {
            cache_dir: blocker,
            editor: "vi".into(),
        };
        assert!(matches!(
            config.log_target(true),
            LogTarget::ErrorsToStderr(_)
        ));
        assert!(matches!(config.log_target(false), LogTarget::Stderr));

        let config = Config {
            cache_dir: dir.path().join("cache"),
            editor: "vi".into(),
        };
        assert!(matches!(config.log_target(true), LogTarget::File(_)));
        assert!(config.log_file().exists());
    }
}
