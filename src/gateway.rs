//! Keeps the questionnaire document in step with its two durability
//! targets: the user-chosen file (the active path) and the local cache.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::{Cache, CacheKey};
use crate::error::GatewayError;
use crate::model::{Questionnaire, DEFAULT_TITLE};
use crate::validate::{parse_document, suggested_file_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFilter {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

pub const QUESTIONNAIRE_FILTERS: &[FileFilter] = &[FileFilter {
    name: "Questionnaire (JSON)",
    extensions: &["json"],
}];

/// File selection and file I/O provided by the host environment.
///
/// `Ok(None)` from a selection means the user dismissed the dialog.
pub trait FileDialog {
    fn open_file(&mut self, filters: &[FileFilter]) -> Result<Option<PathBuf>, GatewayError>;

    fn save_file_as(
        &mut self,
        default_name: &str,
        filters: &[FileFilter],
    ) -> Result<Option<PathBuf>, GatewayError>;

    fn read_file(&mut self, path: &Path) -> io::Result<String>;

    fn write_file(&mut self, path: &Path, content: &str) -> io::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome<T> {
    Completed(T),
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    New,
    Open,
    Save,
    SaveAs,
}

/// A serialized copy of a document for the user to take away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    pub file_name: String,
    pub content: String,
}

/// Serialized on-disk form: pretty JSON with 2-space indentation.
pub fn serialize_document(doc: &Questionnaire) -> Result<String, GatewayError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

pub struct PersistenceGateway<D> {
    dialog: D,
    cache: Arc<dyn Cache>,
    active_path: Option<PathBuf>,
    document: Option<Questionnaire>,
}

impl<D: FileDialog> PersistenceGateway<D> {
    pub fn new(dialog: D, cache: Arc<dyn Cache>) -> Self {
        Self {
            dialog,
            cache,
            active_path: None,
            document: None,
        }
    }

    pub fn document(&self) -> Option<&Questionnaire> {
        self.document.as_ref()
    }

    pub fn active_path(&self) -> Option<&Path> {
        self.active_path.as_deref()
    }

    /// Load the last cached questionnaire, if the cache holds a readable one.
    pub fn restore_cached(&mut self) -> Option<&Questionnaire> {
        let bytes = match self.cache.get(CacheKey::Questionnaire) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("cannot read cached questionnaire: {}", e);
                return None;
            }
        };
        match serde_json::from_slice::<Questionnaire>(&bytes) {
            Ok(mut doc) => {
                doc.normalize();
                tracing::debug!(id = %doc.id, "restored questionnaire from cache");
                self.document = Some(doc);
                self.document.as_ref()
            }
            Err(e) => {
                tracing::warn!("ignoring corrupt cached questionnaire: {}", e);
                None
            }
        }
    }

    /// Replace the current document with an empty one and forget the path.
    pub fn new_document(&mut self, title: &str) -> &Questionnaire {
        let doc = Questionnaire::new(title);
        self.write_cache(&doc);
        self.active_path = None;
        self.document.insert(doc)
    }

    /// Let the user pick a file and make it the current document.
    pub fn open(&mut self) -> Result<DialogOutcome<PathBuf>, GatewayError> {
        let Some(path) = self.dialog.open_file(QUESTIONNAIRE_FILTERS)? else {
            tracing::debug!("open canceled");
            return Ok(DialogOutcome::Canceled);
        };
        self.open_path(&path)?;
        Ok(DialogOutcome::Completed(path))
    }

    /// Open a known file without asking. On failure nothing changes.
    pub fn open_path(&mut self, path: &Path) -> Result<&Questionnaire, GatewayError> {
        let content = self
            .dialog
            .read_file(path)
            .map_err(|source| GatewayError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let doc = parse_document(&content)?;

        self.write_cache(&doc);
        self.active_path = Some(path.to_path_buf());
        tracing::info!(path = %path.display(), "opened questionnaire");
        Ok(self.document.insert(doc))
    }

    /// Make `doc` current and write it to the active path, if any, and the
    /// cache.
    ///
    /// A failed path write is returned; a failed cache write is only
    /// logged. The in-memory document is replaced either way.
    pub fn save(&mut self, doc: Questionnaire) -> Result<(), GatewayError> {
        let written = match &self.active_path {
            Some(path) => {
                let content = serialize_document(&doc)?;
                self.dialog
                    .write_file(path, &content)
                    .map_err(|source| GatewayError::WriteFailed {
                        path: path.clone(),
                        source,
                    })
            }
            None => Ok(()),
        };
        self.write_cache(&doc);
        self.document = Some(doc);

        if let Err(e) = &written {
            tracing::error!("{}", e);
        }
        written
    }

    /// Ask for a new path; on success it becomes the active path and both
    /// targets are written. Canceling changes nothing.
    pub fn save_as(&mut self, doc: Questionnaire) -> Result<DialogOutcome<PathBuf>, GatewayError> {
        let default_name = suggested_file_name(&doc.title);
        let Some(path) = self
            .dialog
            .save_file_as(&default_name, QUESTIONNAIRE_FILTERS)?
        else {
            tracing::debug!("save as canceled");
            return Ok(DialogOutcome::Canceled);
        };

        let content = serialize_document(&doc)?;
        self.dialog
            .write_file(&path, &content)
            .map_err(|source| GatewayError::WriteFailed {
                path: path.clone(),
                source,
            })?;

        self.write_cache(&doc);
        self.document = Some(doc);
        self.active_path = Some(path.clone());
        tracing::info!(path = %path.display(), "saved questionnaire as");
        Ok(DialogOutcome::Completed(path))
    }

    /// Accept a serialized document from outside, stamp it as modified and
    /// save it. Invalid content is rejected without touching current state.
    pub fn import(&mut self, raw: &str) -> Result<(), GatewayError> {
        let mut doc = parse_document(raw).map_err(|e| {
            tracing::warn!("import rejected: {}", e);
            GatewayError::Rejected(e)
        })?;
        doc.touch();
        tracing::info!(id = %doc.id, "imported questionnaire");
        self.save(doc)
    }

    /// Serialized copy of `doc`; neither the active path nor the cache
    /// change.
    pub fn export(&self, doc: &Questionnaire) -> Result<Exported, GatewayError> {
        Ok(Exported {
            file_name: suggested_file_name(&doc.title),
            content: serialize_document(doc)?,
        })
    }

    /// Apply an authoring change to the current document and save it.
    pub fn edit(&mut self, change: impl FnOnce(&mut Questionnaire)) -> Result<(), GatewayError> {
        let mut doc = self.document.clone().ok_or(GatewayError::NoDocument)?;
        change(&mut doc);
        doc.touch();
        self.save(doc)
    }

    /// Menu entry points. Save without an active path falls back to Save As.
    pub fn handle(&mut self, command: MenuCommand) -> Result<DialogOutcome<()>, GatewayError> {
        match command {
            MenuCommand::New => {
                self.new_document(DEFAULT_TITLE);
                Ok(DialogOutcome::Completed(()))
            }
            MenuCommand::Open => Ok(discard_path(self.open()?)),
            MenuCommand::Save => {
                let doc = self.document.clone().ok_or(GatewayError::NoDocument)?;
                if self.active_path.is_some() {
                    self.save(doc)?;
                    Ok(DialogOutcome::Completed(()))
                } else {
                    Ok(discard_path(self.save_as(doc)?))
                }
            }
            MenuCommand::SaveAs => {
                let doc = self.document.clone().ok_or(GatewayError::NoDocument)?;
                Ok(discard_path(self.save_as(doc)?))
            }
        }
    }

    fn write_cache(&self, doc: &Questionnaire) {
        let result = serde_json::to_vec(doc)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                self.cache
                    .put(CacheKey::Questionnaire, &bytes)
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            tracing::warn!("cannot cache questionnaire: {}", e);
        }
    }
}

fn discard_path(outcome: DialogOutcome<PathBuf>) -> DialogOutcome<()> {
    match outcome {
        DialogOutcome::Completed(_) => DialogOutcome::Completed(()),
        DialogOutcome::Canceled => DialogOutcome::Canceled,
    }
}
