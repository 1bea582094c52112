//! # GraphQL multipart requests for async-graphql
//!
//! This crate implements the
//! [GraphQL multipart request specification](https://github.com/jaydenseric/graphql-multipart-request-spec),
//! the convention used to send files alongside GraphQL operations over HTTP, in front of any
//! GraphQL [`Executor`](trait.Executor.html).
//!
//! A multipart request carries three kinds of parts:
//!
//! * `operations`, a single operation `{ query, variables, operationName }` or an array of them
//! * `map`, an object associating the name of each file part to the paths it must be placed at,
//!   such as `variables.file` or `1.variables.input.files.0` in a batch
//! * the file parts themselves
//!
//! [`http::MultipartHandler`](http/struct.MultipartHandler.html) decodes the form, places an
//! [`Upload`](struct.Upload.html) handle at every mapped location of the variables and executes
//! each operation independently. Problems with the files of one operation only fail that
//! operation.
//!
//! ## Features
//!
//! This crate offers the following features, all of which are activated by default:
//!
//! - `log`: Log forwarded requests, received files and rejected requests.
//! - `tracing`: Wrap the execution of each operation in a span.
//! - `unblock`: Support [`Upload::into_async_read`](struct.Upload.html#method.into_async_read).
//!
//! ## Example Curl Request
//!
//! ```curl
//! curl 'localhost:8000' \
//! --form 'operations={
//!         "query": "mutation ($files: [Upload!]!) { upload(files: $files) }",
//!         "variables": { "files": [null, null] }}' \
//! --form 'map={ "0": ["variables.files.0"], "1": ["variables.files.1"] }' \
//! --form '0=@a.txt' \
//! --form '1=@b.txt'
//! ```

#![warn(missing_docs)]
#![allow(clippy::needless_doctest_main)]
#![allow(clippy::needless_lifetimes)]
#![forbid(unsafe_code)]
#![cfg_attr(feature = "nightly", feature(doc_cfg))]
#![recursion_limit = "256"]

mod error;
mod executor;
mod request;
mod response;
mod value;

pub mod http;
pub mod path;
pub mod types;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}

pub use error::{ParseRequestError, ServerError};
pub use executor::Executor;
pub use request::{BatchRequest, Request};
pub use response::{BatchResponse, Response};
pub use types::{Upload, UploadValue};
pub use value::Value;

/// Construct a `Value` from a JSON literal.
///
/// ```rust
/// use async_graphql_multipart::{value, Value};
///
/// let value = value!({ "files": [null, null] });
/// assert_eq!(value.as_object().unwrap()["files"].as_list().unwrap().len(), 2);
/// ```
#[macro_export]
macro_rules! value {
    ($($json:tt)+) => {
        $crate::Value::from($crate::__private::serde_json::json!($($json)+))
    };
}
