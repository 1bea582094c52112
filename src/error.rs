use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SPEC_URL: &str = "https://github.com/jaydenseric/graphql-multipart-request-spec/tree/v2.0.0";

/// An error in the format of an executor's response, or produced while decoding a request.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ServerError {
    /// An explanatory message of the error.
    pub message: String,
}

impl ServerError {
    /// Create a new server error with the message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An error parsing a multipart request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseRequestError {
    /// An IO error occurred.
    #[error("Failed to parse multipart form")]
    Io(#[from] io::Error),

    /// The request's multipart data was invalid.
    #[error("Failed to parse multipart form")]
    InvalidMultipart(#[source] multer::Error),

    /// The request's payload was too large, and the server rejected it.
    #[error("Failed to parse multipart form: payload too large")]
    PayloadTooLarge,

    /// The request is missing the `operations` field.
    #[error("Field \"operations\" was not found in the form ({url})", url = SPEC_URL)]
    MissingOperationsField,

    /// The request is missing the `map` field.
    #[error("Field \"map\" was not found in the form ({url})", url = SPEC_URL)]
    MissingMapField,

    /// The `operations` field was not a valid operation or list of operations.
    #[error("Field \"operations\" format is not valid ({url})", url = SPEC_URL)]
    InvalidRequest(#[source] serde_json::Error),

    /// The `map` field was not an object of file names to lists of paths.
    #[error("Field \"map\" format is not valid ({url})", url = SPEC_URL)]
    InvalidFilesMap(#[source] serde_json::Error),

    /// A file named in the `map` field was not uploaded.
    #[error("Field {0} is missing, but exists in the map association ({url})", url = SPEC_URL)]
    MissingFile(String),

    /// A path in the `map` field does not resolve against the operation's variables.
    #[error("Invalid mapping path \"{path}\" for file {field} ({url})", url = SPEC_URL)]
    InvalidMapPath {
        /// The path as written in the `map` field.
        path: String,
        /// The file the path belongs to.
        field: String,
    },
}

impl From<multer::Error> for ParseRequestError {
    fn from(err: multer::Error) -> Self {
        match err {
            multer::Error::FieldSizeExceeded { .. } | multer::Error::StreamSizeExceeded { .. } => {
                ParseRequestError::PayloadTooLarge
            }
            _ => ParseRequestError::InvalidMultipart(err),
        }
    }
}

impl From<ParseRequestError> for ServerError {
    fn from(err: ParseRequestError) -> Self {
        ServerError::new(err.to_string())
    }
}
