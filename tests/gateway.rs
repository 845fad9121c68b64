use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use hquiz::cache::{Cache, CacheKey, MemoryCache};
use hquiz::error::{GatewayError, StorageError, ValidationError};
use hquiz::gateway::{
    DialogOutcome, FileDialog, FileFilter, MenuCommand, PersistenceGateway,
};
use hquiz::model::{QuestionKind, Questionnaire};

/// In-memory file system with scripted dialog answers.
#[derive(Default)]
struct FakeFs {
    files: HashMap<PathBuf, String>,
    open_answer: Option<PathBuf>,
    save_as_answer: Option<PathBuf>,
    offered_names: Vec<String>,
    fail_writes: bool,
    writes: usize,
}

#[derive(Clone, Default)]
struct FakeDialog(Rc<RefCell<FakeFs>>);

impl FileDialog for FakeDialog {
    fn open_file(&mut self, _filters: &[FileFilter]) -> Result<Option<PathBuf>, GatewayError> {
        Ok(self.0.borrow().open_answer.clone())
    }

    fn save_file_as(
        &mut self,
        default_name: &str,
        _filters: &[FileFilter],
    ) -> Result<Option<PathBuf>, GatewayError> {
        let mut fs = self.0.borrow_mut();
        fs.offered_names.push(default_name.to_string());
        Ok(fs.save_as_answer.clone())
    }

    fn read_file(&mut self, path: &Path) -> io::Result<String> {
        self.0
            .borrow()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn write_file(&mut self, path: &Path, content: &str) -> io::Result<()> {
        let mut fs = self.0.borrow_mut();
        if fs.fail_writes {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        fs.writes += 1;
        fs.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}

fn setup() -> (PersistenceGateway<FakeDialog>, FakeDialog, Arc<MemoryCache>) {
    let dialog = FakeDialog::default();
    let cache = Arc::new(MemoryCache::new());
    let gateway = PersistenceGateway::new(dialog.clone(), Arc::clone(&cache) as Arc<dyn Cache>);
    (gateway, dialog, cache)
}

fn sample() -> Questionnaire {
    let mut doc = Questionnaire::new("Capital Cities");
    let id = doc.add_question(QuestionKind::MultipleChoice);
    doc.update_question(&id, |q| {
        q.prompt = "Capital of Portugal?".into();
        q.answers = vec!["Porto".into(), "Lisbon".into()];
        q.correct_answer = 1;
        q.time_limit = 20;
    });
    doc.add_question(QuestionKind::TrueFalse);
    doc
}

fn cached(cache: &MemoryCache) -> Option<Vec<u8>> {
    cache.get(CacheKey::Questionnaire).unwrap()
}

#[test]
fn test_save_as_canceled_changes_nothing() {
    let (mut gateway, dialog, cache) = setup();
    let first = PathBuf::from("/quizzes/first.json");
    dialog.0.borrow_mut().save_as_answer = Some(first.clone());
    gateway.save_as(sample()).unwrap();
    let cache_before = cached(&cache);

    dialog.0.borrow_mut().save_as_answer = None;
    let mut edited = sample();
    edited.set_title("Changed");
    let outcome = gateway.save_as(edited).unwrap();

    assert_eq!(outcome, DialogOutcome::Canceled);
    assert_eq!(gateway.active_path(), Some(first.as_path()));
    assert_eq!(cached(&cache), cache_before);
    assert_eq!(gateway.document().unwrap().title, "Capital Cities");
}

#[test]
fn test_save_as_offers_name_from_title() {
    let (mut gateway, dialog, _cache) = setup();
    dialog.0.borrow_mut().save_as_answer = Some(PathBuf::from("/tmp/x.json"));
    gateway.save_as(sample()).unwrap();
    assert_eq!(
        dialog.0.borrow().offered_names,
        vec!["capital_cities_questionnaire.json".to_string()]
    );
}

#[test]
fn test_save_writes_path_and_cache_identically_twice() {
    let (mut gateway, dialog, cache) = setup();
    let path = PathBuf::from("/quizzes/capitals.json");
    dialog.0.borrow_mut().save_as_answer = Some(path.clone());

    let doc = sample();
    gateway.save_as(doc.clone()).unwrap();
    gateway.save(doc.clone()).unwrap();
    let first = dialog.0.borrow().files[&path].clone();
    let first_cache = cached(&cache);

    gateway.save(doc).unwrap();
    let second = dialog.0.borrow().files[&path].clone();

    assert_eq!(first, second);
    assert_eq!(first_cache, cached(&cache));
    assert_eq!(dialog.0.borrow().writes, 3);
}

#[test]
fn test_save_without_path_only_writes_cache() {
    let (mut gateway, dialog, cache) = setup();
    gateway.save(sample()).unwrap();
    assert!(cached(&cache).is_some());
    assert_eq!(dialog.0.borrow().writes, 0);
    assert!(gateway.active_path().is_none());
}

#[test]
fn test_path_write_failure_is_surfaced() {
    let (mut gateway, dialog, cache) = setup();
    dialog.0.borrow_mut().save_as_answer = Some(PathBuf::from("/quizzes/a.json"));
    gateway.save_as(sample()).unwrap();

    dialog.0.borrow_mut().fail_writes = true;
    let mut edited = sample();
    edited.set_title("Edited");
    let err = gateway.save(edited).unwrap_err();

    assert!(matches!(err, GatewayError::WriteFailed { .. }));
    // the cache backup and the in-memory document still move forward
    let backup: Questionnaire = serde_json::from_slice(&cached(&cache).unwrap()).unwrap();
    assert_eq!(backup.title, "Edited");
    assert_eq!(gateway.document().unwrap().title, "Edited");
}

#[test]
fn test_file_format_is_pretty_camel_case_json() {
    let (mut gateway, dialog, _cache) = setup();
    let path = PathBuf::from("/quizzes/format.json");
    dialog.0.borrow_mut().save_as_answer = Some(path.clone());
    gateway.save_as(sample()).unwrap();

    let content = dialog.0.borrow().files[&path].clone();
    assert!(content.starts_with("{\n  \"id\": "));
    assert!(content.contains("\"correctAnswer\": 1"));
    assert!(content.contains("\"timeLimit\": 20"));
    assert!(content.contains("\"type\": \"true-false\""));
    assert!(content.contains("\"question\": \"Capital of Portugal?\""));
    assert!(content.contains("\"createdAt\""));
    assert!(content.contains("\"updatedAt\""));
}

#[test]
fn test_export_then_import_round_trips() {
    let (mut gateway, _dialog, cache) = setup();
    let doc = sample();

    let exported = gateway.export(&doc).unwrap();
    assert_eq!(exported.file_name, "capital_cities_questionnaire.json");
    assert!(cached(&cache).is_none());
    assert!(gateway.active_path().is_none());

    gateway.import(&exported.content).unwrap();
    let imported = gateway.document().unwrap().clone();

    assert!(imported.updated_at >= doc.updated_at);
    let mut normalized = imported.clone();
    normalized.updated_at = doc.updated_at;
    assert_eq!(normalized, doc);
    assert!(cached(&cache).is_some());
}

#[test]
fn test_invalid_import_is_rejected_without_changes() {
    let (mut gateway, _dialog, cache) = setup();
    gateway.save(sample()).unwrap();
    let cache_before = cached(&cache);

    let err = gateway
        .import(r#"{"id":"x","questions":[]}"#)
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Rejected(ValidationError::MissingField("title"))
    ));

    let err = gateway.import("not json at all").unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Rejected(ValidationError::Malformed(_))
    ));

    assert_eq!(gateway.document().unwrap().title, "Capital Cities");
    assert_eq!(cached(&cache), cache_before);
}

#[test]
fn test_open_replaces_document_and_cache() {
    let (mut gateway, dialog, cache) = setup();
    gateway.save(sample()).unwrap();

    let other = Questionnaire::new("Other");
    let path = PathBuf::from("/quizzes/other.json");
    {
        let mut fs = dialog.0.borrow_mut();
        fs.files
            .insert(path.clone(), serde_json::to_string_pretty(&other).unwrap());
        fs.open_answer = Some(path.clone());
    }

    let outcome = gateway.open().unwrap();
    assert_eq!(outcome, DialogOutcome::Completed(path.clone()));
    assert_eq!(gateway.active_path(), Some(path.as_path()));
    assert_eq!(gateway.document(), Some(&other));

    let backup: Questionnaire = serde_json::from_slice(&cached(&cache).unwrap()).unwrap();
    assert_eq!(backup, other);
}

#[test]
fn test_open_canceled_or_invalid_keeps_state() {
    let (mut gateway, dialog, cache) = setup();
    gateway.save(sample()).unwrap();
    let cache_before = cached(&cache);

    assert_eq!(gateway.open().unwrap(), DialogOutcome::Canceled);

    let path = PathBuf::from("/quizzes/broken.json");
    {
        let mut fs = dialog.0.borrow_mut();
        fs.files.insert(path.clone(), "{\"title\": \"\"}".into());
        fs.open_answer = Some(path);
    }
    assert!(matches!(gateway.open(), Err(GatewayError::Rejected(_))));

    assert!(gateway.active_path().is_none());
    assert_eq!(gateway.document().unwrap().title, "Capital Cities");
    assert_eq!(cached(&cache), cache_before);
}

#[test]
fn test_menu_save_without_path_asks_for_one() {
    let (mut gateway, dialog, _cache) = setup();
    gateway.handle(MenuCommand::New).unwrap();
    assert_eq!(gateway.document().unwrap().title, "New Questionnaire");

    assert_eq!(
        gateway.handle(MenuCommand::Save).unwrap(),
        DialogOutcome::Canceled
    );
    assert!(gateway.active_path().is_none());

    let path = PathBuf::from("/quizzes/new.json");
    dialog.0.borrow_mut().save_as_answer = Some(path.clone());
    assert_eq!(
        gateway.handle(MenuCommand::Save).unwrap(),
        DialogOutcome::Completed(())
    );
    assert_eq!(gateway.active_path(), Some(path.as_path()));

    // New forgets the active path
    gateway.handle(MenuCommand::New).unwrap();
    assert!(gateway.active_path().is_none());
}

#[test]
fn test_menu_save_requires_a_document() {
    let (mut gateway, _dialog, _cache) = setup();
    assert!(matches!(
        gateway.handle(MenuCommand::SaveAs),
        Err(GatewayError::NoDocument)
    ));
}

#[test]
fn test_edit_stamps_and_saves() {
    let (mut gateway, dialog, cache) = setup();
    let path = PathBuf::from("/quizzes/edit.json");
    dialog.0.borrow_mut().save_as_answer = Some(path.clone());
    gateway.save_as(sample()).unwrap();
    let before = gateway.document().unwrap().updated_at;

    gateway
        .edit(|doc| doc.set_description(Some("Europe".into())))
        .unwrap();

    let doc = gateway.document().unwrap();
    assert!(doc.updated_at >= before);
    assert!(dialog.0.borrow().files[&path].contains("\"description\": \"Europe\""));
    let backup: Questionnaire = serde_json::from_slice(&cached(&cache).unwrap()).unwrap();
    assert_eq!(backup.description.as_deref(), Some("Europe"));
}

#[test]
fn test_cached_document_is_restored() {
    let (mut gateway, _dialog, cache) = setup();
    gateway.save(sample()).unwrap();

    let mut fresh = PersistenceGateway::new(FakeDialog::default(), cache as Arc<dyn Cache>);
    let restored = fresh.restore_cached().cloned();
    assert_eq!(restored.as_ref(), gateway.document());
    assert!(fresh.active_path().is_none());
}

#[test]
fn test_import_accepts_minimal_shape() {
    let (mut gateway, _dialog, cache) = setup();
    gateway
        .import(r#"{"id":"abc","title":"T","questions":[]}"#)
        .unwrap();

    let doc = gateway.document().unwrap();
    assert_eq!(doc.id, "abc");
    assert!(doc.questions.is_empty());
    let backup: Questionnaire = serde_json::from_slice(&cached(&cache).unwrap()).unwrap();
    assert_eq!(&backup, doc);
}

/// Cache that rejects every write.
struct FullDiskCache;

impl Cache for FullDiskCache {
    fn get(&self, _key: CacheKey) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(None)
    }

    fn put(&self, key: CacheKey, _value: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::WriteFailed {
            key: key.as_str().to_string(),
            reason: "no space left on device".into(),
        })
    }

    fn remove(&self, _key: CacheKey) -> Result<(), StorageError> {
        Ok(())
    }
}

#[test]
fn test_cache_failure_does_not_fail_path_save() {
    let dialog = FakeDialog::default();
    let mut gateway = PersistenceGateway::new(dialog.clone(), Arc::new(FullDiskCache));
    let path = PathBuf::from("/quizzes/kept.json");
    dialog.0.borrow_mut().save_as_answer = Some(path.clone());

    let doc = sample();
    assert_eq!(
        gateway.save_as(doc.clone()).unwrap(),
        DialogOutcome::Completed(path.clone())
    );
    gateway.save(doc.clone()).unwrap();

    let on_disk: Questionnaire =
        serde_json::from_str(&dialog.0.borrow().files[&path]).unwrap();
    assert_eq!(on_disk, doc);
    assert_eq!(gateway.document(), Some(&doc));
    assert_eq!(gateway.active_path(), Some(path.as_path()));
}
