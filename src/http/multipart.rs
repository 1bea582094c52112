use std::collections::HashMap;
use std::io::{self, Seek, SeekFrom, Write};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::io::AsyncRead;
use futures_util::stream::Stream;
use multer::{Constraints, Multipart, SizeLimit};
use pin_project_lite::pin_project;
use serde::Deserialize;

use crate::{ParseRequestError, Upload, UploadValue};

/// The default budget for text fields, 32 MiB.
pub const DEFAULT_MAX_MEMORY: usize = 32 << 20;

/// Options for `receive_multipart`.
///
/// Text fields are buffered in memory up to [`DEFAULT_MAX_MEMORY`](constant.DEFAULT_MAX_MEMORY.html)
/// bytes in total by default, the file limits are disabled. Exceeding any limit fails the whole
/// request with `ParseRequestError::PayloadTooLarge` as soon as it is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MultipartOptions {
    /// The maximum total size of the text fields (`operations`, `map` and any other non-file
    /// part), which are buffered in memory. `None` removes the bound.
    pub max_memory: Option<usize>,

    /// The maximum size of a single part.
    pub max_file_size: Option<usize>,

    /// The maximum number of file parts.
    pub max_num_files: Option<usize>,
}

impl Default for MultipartOptions {
    fn default() -> Self {
        Self {
            max_memory: Some(DEFAULT_MAX_MEMORY),
            max_file_size: None,
            max_num_files: None,
        }
    }
}

impl MultipartOptions {
    /// Set maximum total size of the text fields.
    #[must_use]
    pub fn max_memory(self, size: usize) -> Self {
        MultipartOptions {
            max_memory: Some(size),
            ..self
        }
    }

    /// Set maximum file size.
    #[must_use]
    pub fn max_file_size(self, size: usize) -> Self {
        MultipartOptions {
            max_file_size: Some(size),
            ..self
        }
    }

    /// Set maximum number of files.
    #[must_use]
    pub fn max_num_files(self, n: usize) -> Self {
        MultipartOptions {
            max_num_files: Some(n),
            ..self
        }
    }

    /// Remove the bound on the text fields.
    #[must_use]
    pub fn unbounded_memory(self) -> Self {
        MultipartOptions {
            max_memory: None,
            ..self
        }
    }

    /// The limit on the whole body, only known when every limit is set. Sums too large to be
    /// represented leave the body unbounded.
    fn whole_stream_limit(&self) -> Option<u64> {
        let max_memory = self.max_memory? as u64;
        let max_file_size = self.max_file_size? as u64;
        let max_num_files = self.max_num_files? as u64;
        max_file_size
            .checked_mul(max_num_files)?
            .checked_add(max_memory)
    }

    fn size_limit(&self) -> SizeLimit {
        let mut limit = SizeLimit::new();
        if let Some(whole_stream) = self.whole_stream_limit() {
            limit = limit.whole_stream(whole_stream);
        }
        if let Some(max_file_size) = self.max_file_size {
            limit = limit.per_field(max_file_size as u64);
        }
        limit
    }
}

/// A decoded `multipart/form-data` body.
///
/// Parts carrying a filename are file parts, everything else is a text field. Several parts may
/// share a name, the accessors for a single value return the first one.
#[derive(Debug, Default)]
pub struct MultipartForm {
    values: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<Upload>>,
}

static_assertions::assert_impl_all!(MultipartForm: Send, Sync);

impl MultipartForm {
    /// The first text field named `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All text fields named `name`.
    pub fn values(&self, name: &str) -> &[String] {
        self.values.get(name).map_or(&[], Vec::as_slice)
    }

    /// The first file part named `name`.
    pub fn file(&self, name: &str) -> Option<&Upload> {
        self.files.get(name).and_then(|files| files.first())
    }

    /// All file parts named `name`.
    pub fn files(&self, name: &str) -> &[Upload] {
        self.files.get(name).map_or(&[], Vec::as_slice)
    }

    /// The names of the file parts.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

/// Receive a `multipart/form-data` body.
///
/// Text fields are kept in memory, file parts are spooled to temporary files.
pub async fn receive_multipart(
    body: impl AsyncRead + Send + 'static,
    boundary: impl Into<String>,
    opts: MultipartOptions,
) -> Result<MultipartForm, ParseRequestError> {
    let mut multipart = Multipart::with_constraints(
        ReaderStream::new(body),
        boundary,
        Constraints::new().size_limit(opts.size_limit()),
    );

    let mut form = MultipartForm::default();
    let mut memory = 0;
    let mut num_files = 0;

    while let Some(mut field) = multipart.next_field().await? {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        // An empty file input is sent with an empty filename, it carries no file.
        match field
            .file_name()
            .filter(|filename| !filename.is_empty())
            .map(ToString::to_string)
        {
            Some(filename) => {
                num_files += 1;
                if matches!(opts.max_num_files, Some(max_num_files) if num_files > max_num_files) {
                    return Err(ParseRequestError::PayloadTooLarge);
                }

                let content_type = field.content_type().map(|mime| mime.to_string());
                let headers = field.headers().clone();
                let mut content = tempfile::tempfile()?;
                let mut size = 0;
                while let Some(chunk) = field.chunk().await? {
                    size += chunk.len() as u64;
                    content.write_all(&chunk)?;
                }
                content.seek(SeekFrom::Start(0))?;

                #[cfg(feature = "log")]
                log::debug!("received file part {} ({}, {} bytes)", name, filename, size);
                form.files.entry(name).or_default().push(Upload::new(UploadValue {
                    filename,
                    content_type,
                    headers,
                    size,
                    content,
                }));
            }
            None => {
                let mut data = Vec::new();
                while let Some(chunk) = field.chunk().await? {
                    memory += chunk.len();
                    if matches!(opts.max_memory, Some(max_memory) if memory > max_memory) {
                        return Err(ParseRequestError::PayloadTooLarge);
                    }
                    data.extend_from_slice(&chunk);
                }
                let text = String::from_utf8(data)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
                form.values.entry(name).or_default().push(text);
            }
        }
    }

    Ok(form)
}

pin_project! {
    pub(crate) struct ReaderStream<T> {
        buf: [u8; 2048],
        #[pin]
        reader: T,
    }
}

impl<T> ReaderStream<T> {
    pub(crate) fn new(reader: T) -> Self {
        Self {
            buf: [0; 2048],
            reader,
        }
    }
}

impl<T: AsyncRead> Stream for ReaderStream<T> {
    type Item = io::Result<Vec<u8>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        Poll::Ready(
            match futures_util::ready!(this.reader.poll_read(cx, this.buf)?) {
                0 => None,
                size => Some(Ok(this.buf[..size].to_vec())),
            },
        )
    }
}
