use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::{check_key, StateStorage, StorageError, StorageFuture};

const EXTENSION: &str = "json";

/// Directory-backed storage: one file per key, written atomically.
///
/// Keys are escaped into file names (`roomly:bookings` ->
/// `roomly%3Abookings.json`) so prefix removal can recover them.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{EXTENSION}", encode_key(key)))
    }
}

impl StateStorage for FileStorage {
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<Bytes>> {
        Box::pin(async move {
            check_key(key)?;
            match tokio::fs::read(self.path_for(key)).await {
                Ok(bytes) => Ok(Some(Bytes::from(bytes))),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            }
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: Bytes) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            check_key(key)?;
            let path = self.path_for(key);
            let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
            tokio::fs::write(&tmp, &value).await?;
            tokio::fs::rename(&tmp, &path).await?;
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            check_key(key)?;
            match tokio::fs::remove_file(self.path_for(key)).await {
                Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
                _ => Ok(()),
            }
        })
    }

    fn remove_by_prefix<'a>(&'a self, prefix: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            let mut entries = tokio::fs::read_dir(&self.dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                let Some(stem) = name
                    .to_str()
                    .and_then(|n| n.strip_suffix(&format!(".{EXTENSION}")))
                else {
                    continue;
                };
                let Some(key) = decode_key(stem) else {
                    tracing::debug!(file = %stem, "skipping file with undecodable name");
                    continue;
                };
                if key.starts_with(prefix) {
                    tokio::fs::remove_file(entry.path()).await?;
                }
            }
            Ok(())
        })
    }
}

fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn decode_key(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_encoding_is_reversible() {
        for key in ["roomly:bookings", "a b/c.d", "plain-key_1", "ví:dụ"] {
            assert_eq!(decode_key(&encode_key(key)).as_deref(), Some(key));
        }
        assert_eq!(encode_key("roomly:bookings"), "roomly%3Abookings");
    }

    #[test]
    fn bad_escape_is_rejected() {
        assert_eq!(decode_key("abc%4"), None);
        assert_eq!(decode_key("abc%ZZ"), None);
    }
}
