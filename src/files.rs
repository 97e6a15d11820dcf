use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use uuid::Uuid;

use crate::constants::{ALLOWED_EXTENSIONS, ALLOWED_TYPES, MAX_FILE_SIZE_BYTES, MAX_FILE_SIZE_MB};
use crate::models::{FileStatus, UploadedFile};

/// Outcome of a submission. `Rejected` still leaves an error record in the
/// list so the failure stays visible until the user removes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    Accepted(Uuid),
    Rejected(Uuid),
    Skipped,
}

/// Name, size and declared MIME type of a file the user picked, before any
/// bytes are read.
#[derive(Clone, Debug)]
pub struct FileProbe {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub declared_type: String,
}

/// List of user-selected files and their encode lifecycle. Every mutation is
/// keyed by id against the current list, so a completion that lands after a
/// removal is a no-op rather than a lost update.
#[derive(Default)]
pub struct FileStore {
    files: Vec<UploadedFile>,
}

impl FileStore {
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// The attachment set: files eligible for inclusion in a request.
    pub fn ready_files(&self) -> Vec<UploadedFile> {
        self.files.iter().filter(|f| f.is_ready()).cloned().collect()
    }

    pub fn ready_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_ready()).count()
    }

    /// Validates and appends a record. Re-submitting a name that is already
    /// ready is skipped silently; a validation failure appends an error
    /// record that never reaches the encode step.
    pub fn submit(&mut self, name: &str, declared_type: &str, size: u64) -> Submission {
        if self
            .files
            .iter()
            .any(|f| f.name == name && f.status == FileStatus::Ready)
        {
            return Submission::Skipped;
        }

        let valid = validate(name, declared_type, size).is_ok();
        let id = Uuid::new_v4();
        self.files.push(UploadedFile {
            id,
            name: name.to_string(),
            size,
            declared_type: declared_type.to_string(),
            status: if valid { FileStatus::Uploading } else { FileStatus::Error },
            progress: 0,
            content: None,
            mime_type: None,
        });

        if valid {
            Submission::Accepted(id)
        } else {
            Submission::Rejected(id)
        }
    }

    /// Advances the synthetic progress ticker (UX affordance only, capped at
    /// 90 until the encode lands). Returns whether another tick should be
    /// scheduled. Saturating the cap moves the record to Processing.
    pub fn tick_progress(&mut self, id: Uuid) -> bool {
        match self.files.iter_mut().find(|f| f.id == id) {
            Some(file) if file.status == FileStatus::Uploading => {
                file.progress = (file.progress + 15).min(90);
                if file.progress >= 90 {
                    file.status = FileStatus::Processing;
                    false
                } else {
                    true
                }
            }
            _ => false,
        }
    }

    /// Marks the encode as finished; the transport MIME type is resolved
    /// from the declared one here. No-op if the record was removed while the
    /// encode was still running, or already reached a terminal status.
    pub fn complete(&mut self, id: Uuid, content: String) {
        if let Some(file) = self.files.iter_mut().find(|f| f.id == id) {
            if matches!(file.status, FileStatus::Uploading | FileStatus::Processing) {
                file.mime_type = Some(resolve_mime(&file.declared_type));
                file.status = FileStatus::Ready;
                file.progress = 100;
                file.content = Some(content);
            }
        }
    }

    /// Marks the record as failed; progress freezes where it was.
    pub fn fail(&mut self, id: Uuid) {
        if let Some(file) = self.files.iter_mut().find(|f| f.id == id) {
            if file.status != FileStatus::Ready {
                file.status = FileStatus::Error;
                file.content = None;
            }
        }
    }

    pub fn remove(&mut self, id: Uuid) {
        self.files.retain(|f| f.id != id);
    }
}

fn validate(name: &str, declared_type: &str, size: u64) -> Result<(), String> {
    let extension_ok = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if !ALLOWED_TYPES.contains(&declared_type) && !extension_ok {
        return Err("Formato no soportado".to_string());
    }
    if size > MAX_FILE_SIZE_BYTES {
        return Err(format!("Archivo excede {}MB", MAX_FILE_SIZE_MB));
    }
    Ok(())
}

/// MIME type guessed from the extension; empty when unknown, mirroring a
/// picker that reports no type.
pub fn guess_mime(name: &str) -> String {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf".to_string(),
        Some(ext) if ext.eq_ignore_ascii_case("txt") => "text/plain".to_string(),
        _ => String::new(),
    }
}

/// Looks up name, size and declared type without reading the content.
pub async fn probe(path: PathBuf) -> Result<FileProbe> {
    let metadata = tokio::fs::metadata(&path)
        .await
        .with_context(|| format!("Failed to read metadata for {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();
    let declared_type = guess_mime(&name);
    Ok(FileProbe {
        path,
        name,
        size: metadata.len(),
        declared_type,
    })
}

/// Reads the full byte content and produces its base64 representation.
pub async fn read_and_encode(path: PathBuf) -> Result<String> {
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read file {}", path.display()))?;
    Ok(STANDARD.encode(bytes))
}

/// Resolved transport MIME type for an accepted file.
pub fn resolve_mime(declared_type: &str) -> String {
    if declared_type.is_empty() {
        "text/plain".to_string()
    } else {
        declared_type.to_string()
    }
}
