//! Upload storage: collision-resistant stored names under a fixed directory.
//!
//! Stored names are `<stamp>-<original-name>`, where the stamp is a
//! millisecond wall-clock reading made strictly monotonic per process, so two
//! uploads of the same original name in the same millisecond still land in
//! distinct files. The file must exist before any record references it.

use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::Utc;

const FALLBACK_NAME: &str = "upload";

/// Per-route upload rules: the accepted field, a size ceiling, and the
/// declared content types the route admits.
pub struct UploadPolicy {
    pub field: &'static str,
    pub max_bytes: usize,
    pub allowed_types: &'static [&'static str],
}

impl UploadPolicy {
    pub fn allows(&self, essence: &str) -> bool {
        self.allowed_types.iter().any(|allowed| *allowed == essence)
    }
}

/// Policy for the `image` field on both insert routes.
pub static IMAGE_UPLOADS: UploadPolicy = UploadPolicy {
    field: "image",
    max_bytes: 5 * 1024 * 1024,
    allowed_types: &[
        "image/png",
        "image/jpeg",
        "image/gif",
        "image/webp",
        "image/svg+xml",
    ],
};

pub struct UploadStore {
    dir: PathBuf,
    stamp: MonotonicStamp,
}

impl UploadStore {
    pub fn open(dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(UploadStore {
            dir: dir.to_path_buf(),
            stamp: MonotonicStamp::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` under a fresh stored name and return that name, the
    /// reference token records embed.
    pub fn save(&self, original_name: &str, bytes: &[u8]) -> std::io::Result<String> {
        let original = sanitize_name(original_name);
        loop {
            let stored = format!("{}-{}", self.stamp.next(), original);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&stored))
            {
                Ok(mut file) => {
                    file.write_all(bytes)?;
                    return Ok(stored);
                }
                // A pre-existing file under the same stamp (left over from an
                // earlier process) just bumps the stamp and tries again.
                Err(error) if error.kind() == ErrorKind::AlreadyExists => continue,
                Err(error) => return Err(error),
            }
        }
    }
}

/// Strictly increasing millisecond-resolution token source.
struct MonotonicStamp {
    last: AtomicU64,
}

impl MonotonicStamp {
    fn new() -> Self {
        MonotonicStamp {
            last: AtomicU64::new(0),
        }
    }

    fn next(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange(prev, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Reduce a client-supplied name to its final path segment.
fn sanitize_name(original: &str) -> &str {
    let segment = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(FALLBACK_NAME);
    match segment {
        "" | "." | ".." => FALLBACK_NAME,
        name => name,
    }
}
