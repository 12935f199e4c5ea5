//! File handles consumed by the extractors.
//!
//! [`FileSource`] is the only input abstraction the library needs: a name, a
//! declared size, and async access to the bytes. Two implementations ship with the
//! crate: [`InMemoryFile`] for uploads already held in memory and [`DiskFile`] for
//! paths read through `tokio::fs`.

use crate::extraction::text::decode_utf8_lossy;
use crate::{FilegistError, Result};
use async_trait::async_trait;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A named file whose content can be read asynchronously.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// File name as shown to the user, including the extension.
    fn name(&self) -> &str;

    /// Declared size in bytes.
    fn size(&self) -> u64;

    /// Full byte content.
    async fn bytes(&self) -> Result<Cow<'_, [u8]>>;

    /// Full content decoded as UTF-8, replacing invalid sequences with U+FFFD.
    async fn text(&self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(decode_utf8_lossy(&bytes).into_owned())
    }
}

/// A file held entirely in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryFile {
    name: String,
    data: Vec<u8>,
}

impl InMemoryFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[async_trait]
impl FileSource for InMemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    async fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.data))
    }
}

/// A file on disk, read lazily.
///
/// The size is captured when the handle is opened; the content is read on each
/// call to [`FileSource::bytes`].
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
    name: String,
    size: u64,
}

impl DiskFile {
    /// Open a handle to `path`, recording its name and current size.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).await.map_err(FilegistError::Io)?;

        if !metadata.is_file() {
            return Err(FilegistError::validation(format!(
                "Path is not a regular file: {}",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            name: display_name(path),
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileSource for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    async fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        let data = fs::read(&self.path).await.map_err(FilegistError::Io)?;
        Ok(Cow::Owned(data))
    }
}

/// Last path component, or the whole path when there is none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Open every path as a [`DiskFile`]. One result per path, in order; a path
/// that cannot be opened does not stop the others.
pub async fn open_all(paths: &[PathBuf]) -> Vec<Result<DiskFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(DiskFile::open(path).await);
    }
    files
}
