#[cfg(feature = "log")]
use std::error::Error as StdError;

use ::http::header::{HeaderValue, CONTENT_TYPE};
use ::http::request::Parts;
use futures_util::future::join_all;
use futures_util::io::AsyncRead;

use super::{is_multipart, receive_multipart, Endpoint, FileMap, MultipartForm, MultipartOptions};
use crate::{BatchRequest, BatchResponse, Executor, ParseRequestError, Request, Response};

/// An HTTP handler for GraphQL multipart requests.
///
/// Requests whose `Content-Type` is `multipart/form-data` are decoded: the `operations` field
/// gives one request or a batch of them, the `map` field tells where the uploaded files go in
/// their variables. Every request whose files could all be placed is handed to the executor, the
/// others are answered with their mapping errors. Any other request is forwarded to the fallback
/// endpoint untouched.
///
/// The response is always `200 OK` with a JSON body, a single response or an array of them
/// depending on whether `operations` was an array.
///
/// # Examples
///
/// ```rust
/// use async_graphql_multipart::http::{MultipartHandler, MultipartOptions};
/// use async_graphql_multipart::{Executor, Request, Response};
/// use futures_util::io::Cursor;
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
///
/// async fn not_found(_req: http::Request<Cursor<Vec<u8>>>) -> http::Response<Vec<u8>> {
///     let mut resp = http::Response::new(Vec::new());
///     *resp.status_mut() = http::StatusCode::NOT_FOUND;
///     resp
/// }
///
/// let handler = MultipartHandler::new(Echo, MultipartOptions::default(), not_found);
/// ```
pub struct MultipartHandler<E, F> {
    executor: E,
    opts: MultipartOptions,
    fallback: F,
}

impl<E: Executor, F> MultipartHandler<E, F> {
    /// Create a handler executing multipart requests with `executor` and forwarding everything
    /// else to `fallback`.
    ///
    /// With `MultipartOptions::default()` the text fields are bounded by
    /// [`DEFAULT_MAX_MEMORY`](constant.DEFAULT_MAX_MEMORY.html) and files are not limited, set
    /// `max_file_size` and `max_num_files` to bound the temporary files written per request.
    pub fn new(executor: E, opts: MultipartOptions, fallback: F) -> Self {
        Self {
            executor,
            opts,
            fallback,
        }
    }

    /// Returns a function that wraps a fallback endpoint in a handler, for use as a middleware.
    pub fn wrapper(executor: E, opts: MultipartOptions) -> impl Fn(F) -> Self
    where
        E: Clone,
    {
        move |fallback| Self::new(executor.clone(), opts, fallback)
    }

    /// The executor of this handler.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// The options used to decode multipart bodies.
    pub fn options(&self) -> MultipartOptions {
        self.opts
    }

    /// Handle an HTTP request.
    pub async fn handle<B>(&self, req: ::http::Request<B>) -> ::http::Response<Vec<u8>>
    where
        B: AsyncRead + Send + 'static,
        F: Endpoint<B>,
    {
        if !is_multipart(req.headers()) {
            #[cfg(feature = "log")]
            log::debug!("forwarding {} {} to the fallback endpoint", req.method(), req.uri());
            return self.fallback.call(req).await;
        }

        let (parts, body) = req.into_parts();
        let response = match self.receive(&parts, body).await {
            Ok(response) => response,
            Err(err) => {
                #[cfg(feature = "log")]
                match err.source() {
                    Some(source) => log::warn!("{}: {}", err, source),
                    None => log::warn!("{}", err),
                }
                Response::from_errors(vec![err.into()]).into()
            }
        };
        json_response(&response)
    }

    async fn receive<B>(&self, parts: &Parts, body: B) -> Result<BatchResponse, ParseRequestError>
    where
        B: AsyncRead + Send + 'static,
    {
        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let boundary = multer::parse_boundary(content_type)?;
        let form = receive_multipart(body, boundary, self.opts).await?;

        let operations = form
            .value("operations")
            .ok_or(ParseRequestError::MissingOperationsField)?;
        let batch_request = BatchRequest::decode(operations)?;
        let map = form.value("map").ok_or(ParseRequestError::MissingMapField)?;
        let file_map = FileMap::parse(map)?;

        Ok(match batch_request {
            BatchRequest::Single(request) => {
                self.execute(request, &file_map, &form, parts).await.into()
            }
            BatchRequest::Batch(requests) => join_all(
                requests
                    .into_iter()
                    .map(|request| self.execute(request, &file_map, &form, parts)),
            )
            .await
            .into(),
        })
    }

    async fn execute(
        &self,
        mut request: Request,
        file_map: &FileMap,
        form: &MultipartForm,
        parts: &Parts,
    ) -> Response {
        let errors = file_map.apply(&mut request, |name| form.file(name));
        if !errors.is_empty() {
            #[cfg(feature = "log")]
            log::debug!(
                "not executing operation at \"{}\": {} mapping error(s)",
                request.path_prefix(),
                errors.len()
            );
            return Response::from_errors(errors);
        }

        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("execute", operation_name = ?request.operation_name);
        let fut = self.executor.execute(request, parts);
        #[cfg(feature = "tracing")]
        let fut = tracing::Instrument::instrument(fut, span);
        fut.await
    }
}

#[async_trait::async_trait]
impl<E, F, B> Endpoint<B> for MultipartHandler<E, F>
where
    E: Executor,
    F: Endpoint<B>,
    B: AsyncRead + Send + 'static,
{
    async fn call(&self, req: ::http::Request<B>) -> ::http::Response<Vec<u8>> {
        self.handle(req).await
    }
}

fn json_response(response: &BatchResponse) -> ::http::Response<Vec<u8>> {
    let body = serde_json::to_vec(response).unwrap_or_else(|_err| {
        #[cfg(feature = "log")]
        log::error!("failed to serialize response: {}", _err);
        br#"{"data":null,"errors":[{"message":"Failed to serialize response"}]}"#.to_vec()
    });
    let mut resp = ::http::Response::new(body);
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}
