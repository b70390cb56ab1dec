use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::io::atomic::{atomic_create, atomic_write};
use crate::io::layout::is_document;
use crate::model::ticket::{Ticket, TicketDocument};
use crate::parse::{parse_document, serialize_document};

/// Error type for ticket store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("could not list {path}: {source}")]
    List { path: PathBuf, source: io::Error },
    #[error("{path} already exists")]
    AlreadyExists { path: PathBuf },
}

/// A directory of ticket documents.
///
/// Implementations only move text in and out; all parsing and generation
/// goes through the document codec, so any backing store behaves the same.
pub trait TicketStore {
    /// Every document in the directory, sorted by file name
    fn load_documents(&self) -> Result<Vec<TicketDocument>, StoreError>;

    /// Parse one document. A missing file is an empty document.
    fn load_one(&self, path: &Path) -> Result<TicketDocument, StoreError>;

    /// Regenerate and overwrite a document
    fn save(&self, doc: &TicketDocument) -> Result<(), StoreError>;

    /// Write a document that must not exist yet
    fn create(&self, doc: &TicketDocument) -> Result<(), StoreError>;

    /// Create an empty document (and parent directories) if absent
    fn ensure_exists(&self, path: &Path) -> Result<(), StoreError>;

    /// All tickets across all documents, in document then source order
    fn load_all(&self) -> Result<Vec<Ticket>, StoreError> {
        Ok(self
            .load_documents()?
            .into_iter()
            .flat_map(|doc| doc.tickets)
            .collect())
    }

    /// Append a ticket to a document, creating the document if needed
    fn append(&self, path: &Path, ticket: Ticket) -> Result<TicketDocument, StoreError> {
        let mut doc = self.load_one(path)?;
        doc.tickets.push(ticket);
        self.save(&doc)?;
        Ok(doc)
    }
}

/// Ticket documents stored as files in one directory
#[derive(Debug, Clone)]
pub struct FsTicketStore {
    dir: PathBuf,
}

impl FsTicketStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FsTicketStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_paths(&self) -> Result<Vec<PathBuf>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::List {
                    path: self.dir.clone(),
                    source: e,
                });
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| entry.path())
            .filter(|path| is_document(path))
            .collect();
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }
}

impl TicketStore for FsTicketStore {
    fn load_documents(&self) -> Result<Vec<TicketDocument>, StoreError> {
        let mut docs = Vec::new();
        for path in self.document_paths()? {
            match fs::read_to_string(&path) {
                Ok(text) => docs.push(TicketDocument {
                    tickets: parse_document(&text),
                    path,
                }),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable document"),
            }
        }
        Ok(docs)
    }

    fn load_one(&self, path: &Path) -> Result<TicketDocument, StoreError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(TicketDocument {
                path: path.to_path_buf(),
                tickets: parse_document(&text),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(TicketDocument::empty(path)),
            Err(e) => Err(StoreError::Read {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn save(&self, doc: &TicketDocument) -> Result<(), StoreError> {
        let content = serialize_document(&doc.tickets);
        atomic_write(&doc.path, content.as_bytes()).map_err(|e| StoreError::Write {
            path: doc.path.clone(),
            source: e,
        })?;
        debug!(path = %doc.path.display(), tickets = doc.tickets.len(), "document written");
        Ok(())
    }

    fn create(&self, doc: &TicketDocument) -> Result<(), StoreError> {
        let content = serialize_document(&doc.tickets);
        atomic_create(&doc.path, content.as_bytes()).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => StoreError::AlreadyExists {
                path: doc.path.clone(),
            },
            _ => StoreError::Write {
                path: doc.path.clone(),
                source: e,
            },
        })?;
        debug!(path = %doc.path.display(), tickets = doc.tickets.len(), "document created");
        Ok(())
    }

    fn ensure_exists(&self, path: &Path) -> Result<(), StoreError> {
        let write_err = |e| StoreError::Write {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(write_err)?;
        Ok(())
    }
}

/// In-memory document store keyed by path.
///
/// Holds document text rather than parsed tickets so reads and writes go
/// through the same codec as the filesystem store.
#[derive(Debug, Default)]
pub struct MemoryTicketStore {
    dir: PathBuf,
    files: RefCell<BTreeMap<PathBuf, String>>,
}

impl MemoryTicketStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        MemoryTicketStore {
            dir: dir.into(),
            files: RefCell::new(BTreeMap::new()),
        }
    }

    /// Seed a document with raw text
    pub fn insert(&self, path: impl Into<PathBuf>, text: &str) {
        self.files.borrow_mut().insert(path.into(), text.to_string());
    }

    /// Raw text of a document, if present
    pub fn text(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }
}

impl TicketStore for MemoryTicketStore {
    fn load_documents(&self) -> Result<Vec<TicketDocument>, StoreError> {
        Ok(self
            .files
            .borrow()
            .iter()
            .filter(|(path, _)| path.parent() == Some(self.dir.as_path()) && is_document(path))
            .map(|(path, text)| TicketDocument {
                path: path.clone(),
                tickets: parse_document(text),
            })
            .collect())
    }

    fn load_one(&self, path: &Path) -> Result<TicketDocument, StoreError> {
        Ok(match self.files.borrow().get(path) {
            Some(text) => TicketDocument {
                path: path.to_path_buf(),
                tickets: parse_document(text),
            },
            None => TicketDocument::empty(path),
        })
    }

    fn save(&self, doc: &TicketDocument) -> Result<(), StoreError> {
        self.files
            .borrow_mut()
            .insert(doc.path.clone(), serialize_document(&doc.tickets));
        Ok(())
    }

    fn create(&self, doc: &TicketDocument) -> Result<(), StoreError> {
        if self.contains(&doc.path) {
            return Err(StoreError::AlreadyExists {
                path: doc.path.clone(),
            });
        }
        self.save(doc)
    }

    fn ensure_exists(&self, path: &Path) -> Result<(), StoreError> {
        self.files
            .borrow_mut()
            .entry(path.to_path_buf())
            .or_default();
        Ok(())
    }
}
