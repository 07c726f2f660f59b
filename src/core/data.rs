//! Document store backed by one JSON collection file per record kind.
//!
//! The store is addressed by a connection string (`file://<path>` or a bare
//! path). A handle built from a missing or rejected connection string is
//! *disconnected*: it keeps the process serving while every data operation
//! fails with [`StoreError::Unavailable`].

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A record kind the store knows how to persist.
///
/// The store assigns identity on insert; records are written with whatever
/// placeholder identity they were constructed with and overwritten here.
pub trait Document: Serialize + DeserializeOwned {
    /// Collection file name (without extension) holding this kind.
    const COLLECTION: &'static str;

    fn assign_id(&mut self, id: Uuid);
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store is not connected")]
    Unavailable,
    #[error("unsupported store uri scheme `{0}`")]
    UnsupportedScheme(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("collection data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub struct DocStore {
    root: Option<PathBuf>,
    // Serializes the read-modify-write cycle on the collection files so the
    // handle is safe to share across request handlers.
    lock: Mutex<()>,
}

impl DocStore {
    /// Connect to the store named by `uri`, creating its root directory.
    pub fn connect(uri: &str) -> Result<Self, StoreError> {
        let root = parse_store_uri(uri)?;
        fs::create_dir_all(&root)?;
        Ok(DocStore {
            root: Some(root),
            lock: Mutex::new(()),
        })
    }

    /// A handle whose every operation fails with [`StoreError::Unavailable`].
    pub fn disconnected() -> Self {
        DocStore {
            root: None,
            lock: Mutex::new(()),
        }
    }

    /// Persist `doc`, assigning it a fresh identity. Returns the identity.
    pub fn insert<T: Document>(&self, mut doc: T) -> Result<Uuid, StoreError> {
        let path = self.collection_path(T::COLLECTION)?;
        let _guard = self.lock.lock().unwrap_or_else(|poison| poison.into_inner());
        let mut docs = read_collection::<T>(&path)?;
        let id = Uuid::new_v4();
        doc.assign_id(id);
        docs.push(doc);
        write_collection(&path, &docs)?;
        Ok(id)
    }

    /// Every record of kind `T`, in insertion order. A collection that has
    /// never been written lists as empty.
    pub fn list<T: Document>(&self) -> Result<Vec<T>, StoreError> {
        let path = self.collection_path(T::COLLECTION)?;
        let _guard = self.lock.lock().unwrap_or_else(|poison| poison.into_inner());
        read_collection(&path)
    }

    fn collection_path(&self, collection: &str) -> Result<PathBuf, StoreError> {
        match &self.root {
            Some(root) => Ok(root.join(format!("{}.json", collection))),
            None => Err(StoreError::Unavailable),
        }
    }
}

/// Accepts `file://<path>` or a bare filesystem path; anything with another
/// scheme is rejected so a misdirected connection string fails loudly.
fn parse_store_uri(uri: &str) -> Result<PathBuf, StoreError> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if let Some((scheme, _)) = uri.split_once("://") {
        return Err(StoreError::UnsupportedScheme(scheme.to_string()));
    }
    Ok(PathBuf::from(uri))
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    match File::open(path) {
        Ok(file) => {
            let reader = BufReader::new(file);
            Ok(serde_json::from_reader(reader)?)
        }
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(error) => Err(error.into()),
    }
}

fn write_collection<T: Serialize>(path: &Path, docs: &[T]) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, docs)?;
    writer.flush()?;
    Ok(())
}
