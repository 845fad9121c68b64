use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::cache::atomic_write;
use crate::error::GatewayError;
use crate::gateway::{FileDialog, FileFilter};

/// Open `initial_content` in `editor` and return the edited text.
pub fn open_editor(editor: &str, initial_content: &str) -> io::Result<String> {
    let tmp_file = std::env::temp_dir().join(format!("hquiz_{}.json", std::process::id()));
    fs::write(&tmp_file, initial_content)?;

    let status = Command::new(editor).arg(&tmp_file).status();
    let result = match status {
        Ok(status) if status.success() => fs::read_to_string(&tmp_file),
        Ok(status) => Err(io::Error::other(format!("editor exited with {}", status))),
        Err(e) => Err(io::Error::new(
            e.kind(),
            format!("cannot open editor '{}': {}", editor, e),
        )),
    };

    let _ = fs::remove_file(&tmp_file);
    result
}

/// File dialogs through `zenity`, file I/O on the local filesystem.
#[derive(Debug, Default)]
pub struct ZenityDialog;

impl ZenityDialog {
    fn select(args: Vec<String>) -> Result<Option<PathBuf>, GatewayError> {
        let output = Command::new("zenity")
            .args(&args)
            .output()
            .map_err(|e| GatewayError::Dialog(format!("cannot run zenity: {}", e)))?;

        // zenity exits non-zero when the dialog is dismissed
        if !output.status.success() {
            return Ok(None);
        }
        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if path.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PathBuf::from(path)))
        }
    }
}

fn filter_args(filters: &[FileFilter]) -> impl Iterator<Item = String> + '_ {
    filters.iter().map(|f| {
        let patterns: Vec<String> = f.extensions.iter().map(|e| format!("*.{}", e)).collect();
        format!("--file-filter={} | {}", f.name, patterns.join(" "))
    })
}

impl FileDialog for ZenityDialog {
    fn open_file(&mut self, filters: &[FileFilter]) -> Result<Option<PathBuf>, GatewayError> {
        let mut args = vec![
            "--file-selection".to_string(),
            "--title=Open questionnaire".to_string(),
        ];
        args.extend(filter_args(filters));
        Self::select(args)
    }

    fn save_file_as(
        &mut self,
        default_name: &str,
        filters: &[FileFilter],
    ) -> Result<Option<PathBuf>, GatewayError> {
        let mut args = vec![
            "--file-selection".to_string(),
            "--save".to_string(),
            "--confirm-overwrite".to_string(),
            "--title=Save questionnaire as".to_string(),
            format!("--filename={}", default_name),
        ];
        args.extend(filter_args(filters));
        Self::select(args)
    }

    fn read_file(&mut self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_file(&mut self, path: &Path, content: &str) -> io::Result<()> {
        atomic_write(path, content.as_bytes())
    }
}

/// Non-interactive dialog: every selection answers with a preset path, or
/// counts as canceled when there is none.
#[derive(Debug, Default)]
pub struct PresetDialog {
    path: Option<PathBuf>,
}

impl PresetDialog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl FileDialog for PresetDialog {
    fn open_file(&mut self, _filters: &[FileFilter]) -> Result<Option<PathBuf>, GatewayError> {
        Ok(self.path.clone())
    }

    fn save_file_as(
        &mut self,
        _default_name: &str,
        _filters: &[FileFilter],
    ) -> Result<Option<PathBuf>, GatewayError> {
        Ok(self.path.clone())
    }

    fn read_file(&mut self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_file(&mut self, path: &Path, content: &str) -> io::Result<()> {
        atomic_write(path, content.as_bytes())
    }
}
