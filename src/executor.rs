use std::sync::Arc;

use http::request::Parts;

use crate::{Request, Response};

/// A GraphQL execution engine.
///
/// Each operation of a multipart request whose files were all mapped successfully is handed to
/// the executor, with the uploads already spliced into its variables. `parts` are the head of the
/// inbound HTTP request (method, uri, headers and extensions).
///
/// Operations of a batch are executed concurrently, so `execute` may be called several times at
/// once. An execution is cancelled by dropping its future, which happens when the inbound request
/// is dropped.
///
/// # Examples
///
/// ```rust
/// use async_graphql_multipart::{Executor, Request, Response};
/// use http::request::Parts;
///
/// struct Echo;
///
/// #[async_trait::async_trait]
/// impl Executor for Echo {
///     async fn execute(&self, request: Request, _parts: &Parts) -> Response {
///         Response::new(request.variables)
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Executor: Send + Sync + 'static {
    /// Execute a GraphQL request.
    async fn execute(&self, request: Request, parts: &Parts) -> Response;
}

#[async_trait::async_trait]
impl<T: Executor> Executor for Arc<T> {
    async fn execute(&self, request: Request, parts: &Parts) -> Response {
        T::execute(self, request, parts).await
    }
}
