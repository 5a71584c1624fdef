//! Content digests used for duplicate detection.

use std::fmt;
use std::path::Path;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::Result;

/// Number of bytes read per chunk while hashing.
pub const HASH_CHUNK_SIZE: usize = 4096;

/// SHA-256 digest of a file's full byte content.
///
/// Two files with equal digests are treated as duplicates regardless of
/// their names or paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hexadecimal representation.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Digest an in-memory buffer.
pub fn digest_bytes(bytes: &[u8]) -> ContentDigest {
    ContentDigest(Sha256::digest(bytes).into())
}

/// Digest everything readable from `reader`, one chunk at a time.
pub async fn digest_reader<R>(mut reader: R) -> std::io::Result<ContentDigest>
where
    R: AsyncRead + Unpin,
{
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(ContentDigest(hasher.finalize().into()))
}

/// Digest a local file without loading it into memory.
///
/// Fails with [`crate::VaultError::LocalIo`] if the file cannot be opened or read.
pub async fn digest_file(path: impl AsRef<Path>) -> Result<ContentDigest> {
    let file = File::open(path.as_ref()).await?;
    Ok(digest_reader(file).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VaultError;
    use tempfile::TempDir;

    #[test]
    fn test_digest_bytes_deterministic() {
        assert_eq!(digest_bytes(b"hello"), digest_bytes(b"hello"));
    }

    #[test]
    fn test_digest_bytes_differs() {
        assert_ne!(digest_bytes(b"hello"), digest_bytes(b"hello!"));
        assert_ne!(digest_bytes(b""), digest_bytes(b"\0"));
    }

    #[test]
    fn test_known_sha256_vector() {
        assert_eq!(
            digest_bytes(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_serialize_as_hex_string() {
        let digest = digest_bytes(b"abc");
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest.to_hex()));
    }

    #[tokio::test]
    async fn test_digest_reader_matches_bytes_across_chunk_boundaries() {
        for size in [0, 1, HASH_CHUNK_SIZE - 1, HASH_CHUNK_SIZE, HASH_CHUNK_SIZE + 1, 3 * HASH_CHUNK_SIZE + 17] {
            let content: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
            let from_reader = digest_reader(content.as_slice()).await.unwrap();
            assert_eq!(from_reader, digest_bytes(&content), "size {size}");
        }
    }

    #[tokio::test]
    async fn test_digest_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.csv");
        std::fs::write(&path, b"a,b,c\n1,2,3\n").unwrap();

        let digest = digest_file(&path).await.unwrap();
        assert_eq!(digest, digest_bytes(b"a,b,c\n1,2,3\n"));
    }

    #[tokio::test]
    async fn test_digest_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let result = digest_file(temp_dir.path().join("missing.bin")).await;
        assert!(matches!(result, Err(VaultError::LocalIo(_))));
    }
}
