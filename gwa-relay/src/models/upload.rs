//! In-memory uploaded file

use bytes::Bytes;

/// One uploaded file, held in memory for the duration of a single relay
/// call. Nothing is written to disk; the buffer is dropped when the call
/// returns.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original filename, if the client supplied one
    pub file_name: Option<String>,
    /// MIME type reported by the client
    pub mime_type: String,
    /// Raw file contents
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Size of the upload in bytes
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}
