//! Useful GraphQL types.

mod upload;

pub use upload::{Upload, UploadValue};

#[cfg(test)]
pub(crate) use upload::test_upload;
