use std::fmt::{self, Debug, Formatter};
use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::sync::Arc;

use http::HeaderMap;

/// A file part received in a multipart request.
#[derive(Debug)]
pub struct UploadValue {
    /// The name of the file, as sent by the client.
    pub filename: String,
    /// The content type of the file.
    pub content_type: Option<String>,
    /// All headers of the part.
    pub headers: HeaderMap,
    /// The size of the file in bytes.
    pub size: u64,
    /// The file itself, spooled to a temporary file.
    pub content: File,
}

/// Uploaded file.
///
/// **Reference:** <https://github.com/jaydenseric/graphql-multipart-request-spec>
///
/// An `Upload` is a cheap handle to a file part of the current request. It is what ends up in the
/// variables of an operation at every location the `map` field names, so the executor can pick
/// it up with [`Value::as_upload`](enum.Value.html#method.as_upload).
///
/// # Example Curl Request
///
/// ```curl
/// curl 'localhost:8000' \
/// --form 'operations={
///         "query": "mutation ($file: Upload!) { upload(file: $file)  }",
///         "variables": { "file": null }}' \
/// --form 'map={ "0": ["variables.file"] }' \
/// --form '0=@myFile.txt'
/// ```
#[derive(Clone)]
pub struct Upload(Arc<UploadValue>);

static_assertions::assert_impl_all!(Upload: Send, Sync);

impl Upload {
    /// Create an upload from a received file part.
    pub fn new(value: UploadValue) -> Self {
        Self(Arc::new(value))
    }

    /// The name of the file, as sent by the client.
    #[inline]
    pub fn filename(&self) -> &str {
        &self.0.filename
    }

    /// The content type of the file.
    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.0.content_type.as_deref()
    }

    /// All headers of the part, a name may carry several values.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.0.headers
    }

    /// The size of the file in bytes.
    #[inline]
    pub fn size(&self) -> u64 {
        self.0.size
    }

    /// Open a new handle to the content, positioned at the start of the file.
    ///
    /// Handles share the underlying cursor, so reading several of them concurrently is not
    /// supported.
    pub fn content(&self) -> io::Result<File> {
        let mut file = self.0.content.try_clone()?;
        file.seek(SeekFrom::Start(0))?;
        Ok(file)
    }

    /// Convert to an `AsyncRead` over the content.
    #[cfg(feature = "unblock")]
    #[cfg_attr(feature = "nightly", doc(cfg(feature = "unblock")))]
    pub fn into_async_read(self) -> io::Result<impl futures_util::io::AsyncRead> {
        Ok(blocking::Unblock::new(self.content()?))
    }
}

impl Debug for Upload {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("filename", &self.0.filename)
            .field("content_type", &self.0.content_type)
            .field("size", &self.0.size)
            .finish()
    }
}

/// Two uploads are equal when they refer to the same file part.
impl PartialEq for Upload {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
pub(crate) fn test_upload(filename: &str, content: &[u8]) -> Upload {
    use std::io::Write;

    let mut file = tempfile::tempfile().unwrap();
    file.write_all(content).unwrap();
    Upload::new(UploadValue {
        filename: filename.to_string(),
        content_type: Some("text/plain".to_string()),
        headers: HeaderMap::new(),
        size: content.len() as u64,
        content: file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_upload_content() {
        let upload = test_upload("a.txt", b"hello");
        assert_eq!(upload.filename(), "a.txt");
        assert_eq!(upload.content_type(), Some("text/plain"));
        assert_eq!(upload.size(), 5);

        for _ in 0..2 {
            let mut content = String::new();
            upload.content().unwrap().read_to_string(&mut content).unwrap();
            assert_eq!(content, "hello");
        }
    }

    #[test]
    fn test_upload_eq() {
        let a = test_upload("a.txt", b"a");
        let b = test_upload("a.txt", b"a");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[cfg(feature = "unblock")]
    #[async_std::test]
    async fn test_upload_async_read() {
        use futures_util::io::AsyncReadExt;

        let upload = test_upload("a.txt", b"hello async");
        let mut content = String::new();
        upload
            .into_async_read()
            .unwrap()
            .read_to_string(&mut content)
            .await
            .unwrap();
        assert_eq!(content, "hello async");
    }
}
