use serde::Deserialize;

use crate::{path, ParseRequestError, Upload, Value};

const SINGLE_PREFIX: &str = "variables.";

/// GraphQL request.
///
/// This is one operation of the `operations` field. Its variables have already had every mapped
/// file spliced in by the time it reaches an [`Executor`](trait.Executor.html).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// The query source of the request.
    #[serde(default)]
    pub query: String,

    /// The operation name of the request.
    #[serde(default)]
    pub operation_name: Option<String>,

    /// The variables of the request.
    #[serde(default)]
    pub variables: Value,

    /// Where this request's variables live in the decoded `operations` value.
    #[serde(skip)]
    path_prefix: String,
}

impl Request {
    /// Create a request object with query source.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
            variables: Value::Null,
            path_prefix: SINGLE_PREFIX.to_string(),
        }
    }

    /// Specify the operation name of the request.
    pub fn operation_name<T: Into<String>>(self, name: T) -> Self {
        Self {
            operation_name: Some(name.into()),
            ..self
        }
    }

    /// Specify the variables.
    pub fn variables(self, variables: Value) -> Self {
        Self { variables, ..self }
    }

    /// The prefix `map` paths must carry to address this request's variables, `variables.` for
    /// a single request and `<index>.variables.` for a request of a batch.
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// Set a variable to an upload. `var_path` is a dot-separated path to the item that begins
    /// with a variable name, without the `variables.` prefix.
    ///
    /// Returns `false` if the path does not resolve, the variables are unchanged in that case.
    pub fn set_upload(&mut self, var_path: &str, upload: Upload) -> bool {
        path::set_value_at_path(&mut self.variables, var_path, Value::Upload(upload))
    }
}

impl<T: Into<String>> From<T> for Request {
    fn from(query: T) -> Self {
        Self::new(query)
    }
}

/// Batch support for GraphQL requests, which is either a single query, or an array of queries.
#[derive(Debug, Clone)]
pub enum BatchRequest {
    /// Single query
    Single(Request),

    /// Array of queries
    Batch(Vec<Request>),
}

impl BatchRequest {
    /// Decode the `operations` field of a multipart request.
    ///
    /// An array of operations is tried first, then a single operation. The path prefix of each
    /// request is derived from its position.
    pub fn decode(operations: &str) -> Result<Self, ParseRequestError> {
        match serde_json::from_str::<Vec<Request>>(operations) {
            Ok(requests) => Ok(BatchRequest::Batch(
                requests
                    .into_iter()
                    .enumerate()
                    .map(|(idx, request)| Request {
                        path_prefix: format!("{}.variables.", idx),
                        ..request
                    })
                    .collect(),
            )),
            Err(_) => serde_json::from_str::<Request>(operations)
                .map(|request| {
                    BatchRequest::Single(Request {
                        path_prefix: SINGLE_PREFIX.to_string(),
                        ..request
                    })
                })
                .map_err(ParseRequestError::InvalidRequest),
        }
    }

    /// Returns true if the request was an array of operations.
    pub fn is_batch(&self) -> bool {
        matches!(self, BatchRequest::Batch(_))
    }

    /// The number of operations.
    pub fn len(&self) -> usize {
        match self {
            BatchRequest::Single(_) => 1,
            BatchRequest::Batch(requests) => requests.len(),
        }
    }

    /// Returns true if the request is an empty batch.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the requests.
    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        match self {
            BatchRequest::Single(request) => std::slice::from_ref(request).iter(),
            BatchRequest::Batch(requests) => requests.iter(),
        }
    }
}
