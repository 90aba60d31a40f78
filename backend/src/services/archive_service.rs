use crate::error::ArchiveError;
use chrono::Utc;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const FILE_PREFIX: &str = "comparison";
const JSON_SUFFIX: &str = ".json";
const MAX_SLUG_LEN: usize = 32;
const MAX_COLLISION_RETRIES: u32 = 100;

/// Flat directory of saved comparisons, one pretty-printed JSON file each.
#[derive(Debug, Clone)]
pub struct Archive {
    data_dir: PathBuf,
}

#[derive(Deserialize)]
struct TermPair {
    term1: String,
    term2: String,
}

impl Archive {
    /// Opens the archive rooted at `data_dir`, creating the directory if needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        info!("Archive directory: {}", data_dir.display());
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub async fn save<T: Serialize>(&self, value: &T) -> Result<String, ArchiveError> {
        let json = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;

        let stem = match serde_json::from_slice::<TermPair>(&json) {
            Ok(terms) => format!(
                "{FILE_PREFIX}-{}-vs-{}-{}",
                slugify(&terms.term1),
                slugify(&terms.term2),
                timestamp()
            ),
            Err(_) => format!("{FILE_PREFIX}-{}", timestamp()),
        };

        let (filename, mut file) = self.create_unique(&stem).await?;
        write_or_discard(&self.data_dir.join(&filename), &mut file, &json).await?;

        info!("Saved comparison to {filename}");
        Ok(filename)
    }

    pub async fn load<T: DeserializeOwned>(&self, filename: &str) -> Result<T, ArchiveError> {
        validate_filename(filename)?;

        let bytes = match fs::read(self.data_dir.join(filename)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ArchiveError::NotFound(filename.to_string()))
            }
            Err(e) => return Err(ArchiveError::Storage(e)),
        };

        serde_json::from_slice(&bytes).map_err(|source| ArchiveError::CorruptData {
            filename: filename.to_string(),
            source,
        })
    }

    /// Lists `.json` entries in directory enumeration order.
    pub async fn list(&self) -> Result<Vec<String>, ArchiveError> {
        let mut entries = fs::read_dir(&self.data_dir).await?;
        let mut filenames = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            if name.ends_with(JSON_SUFFIX) && entry.file_type().await?.is_file() {
                filenames.push(name);
            }
        }

        debug!("Found {} archived comparisons", filenames.len());
        Ok(filenames)
    }

    async fn create_unique(&self, stem: &str) -> Result<(String, fs::File), ArchiveError> {
        for attempt in 0..=MAX_COLLISION_RETRIES {
            let filename = if attempt == 0 {
                format!("{stem}{JSON_SUFFIX}")
            } else {
                format!("{stem}-{attempt}{JSON_SUFFIX}")
            };

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.data_dir.join(&filename))
                .await
            {
                Ok(file) => return Ok((filename, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(ArchiveError::Storage(e)),
            }
        }

        Err(ArchiveError::Storage(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free archive filename for {stem}"),
        )))
    }
}

/// Writes `bytes`, removing the file again if the write does not complete.
async fn write_or_discard(
    path: &Path,
    file: &mut fs::File,
    bytes: &[u8],
) -> Result<(), ArchiveError> {
    let written = match file.write_all(bytes).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        warn!("Discarding partially written {}: {e}", path.display());
        if let Err(remove_err) = fs::remove_file(path).await {
            warn!("Failed to remove {}: {remove_err}", path.display());
        }
        return Err(ArchiveError::Storage(e));
    }
    Ok(())
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H-%M-%S-%6fZ").to_string()
}

/// Lowercase ASCII alphanumerics, every other run collapsed to a single `-`.
fn slugify(term: &str) -> String {
    let mut slug = String::new();
    for ch in term.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "term".to_string()
    } else {
        slug.to_string()
    }
}

/// Only bare names inside the archive directory are accepted.
fn validate_filename(filename: &str) -> Result<(), ArchiveError> {
    let invalid = filename.is_empty()
        || filename.starts_with('.')
        || filename.contains(|c: char| matches!(c, '/' | '\\' | '\0'));
    if invalid {
        return Err(ArchiveError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}
