//! Content fingerprinting
//!
//! Two files are considered identical iff their fingerprints are equal. The
//! fingerprint is a 128-bit digest (the first 16 bytes of BLAKE3's extendable
//! output) over the complete byte stream.

use crate::types::SyncError;
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Read size used when streaming a file through the hasher
pub const CHUNK_SIZE: usize = 4096;

/// Length of a fingerprint in bytes
pub const FINGERPRINT_LEN: usize = 16;

/// 128-bit content digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Digest of an in-memory buffer in a single update
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(bytes);
        Self::finish(&hasher)
    }

    fn finish(hasher: &blake3::Hasher) -> Self {
        let mut out = [0u8; FINGERPRINT_LEN];
        hasher.finalize_xof().fill(&mut out);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hex encoding (32 characters)
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Fingerprint a byte stream read in `CHUNK_SIZE` chunks
///
/// The digest is only produced once the reader reports EOF.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> std::io::Result<Fingerprint> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(Fingerprint::finish(&hasher))
}

/// Fingerprint the file at `path`
///
/// # Errors
/// Returns an IO error naming `path` if the file cannot be opened or a read
/// fails part way through.
///
/// # Example
/// ```no_run
/// use mirrorsync::hash::fingerprint;
/// use std::path::Path;
///
/// let digest = fingerprint(Path::new("file.txt"))?;
/// println!("{digest}");
/// # Ok::<(), mirrorsync::SyncError>(())
/// ```
pub fn fingerprint(path: &Path) -> Result<Fingerprint, SyncError> {
    let file = File::open(path).map_err(|e| SyncError::from_io(path, e))?;
    let digest = fingerprint_reader(file).map_err(|e| SyncError::from_io(path, e))?;
    tracing::trace!("fingerprint {}: {}", path.display(), digest);
    Ok(digest)
}
