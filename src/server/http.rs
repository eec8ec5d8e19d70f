//! HTTP frontend: `POST /query` with the SQL text as the raw body
//!
//! Handlers return `Result<String, ApiError>` so they can bail out with `?`;
//! the final `into_response` turns either side into a reply. Rejections are
//! left for requests no route matches.

use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Reply};

use crate::coordinator::Coordinator;
use crate::error::Error;

/// Errors a query request can end in
#[derive(Debug)]
pub enum ApiError {
    /// Body was empty or only whitespace
    EmptyQuery,
    /// Body was not UTF-8
    InvalidBody,
    /// The statement failed
    Engine(Error),
    /// The blocking task running the statement died
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Engine(err)
    }
}

impl ApiError {
    fn status_code_body(self) -> (StatusCode, String) {
        match self {
            ApiError::EmptyQuery => (StatusCode::BAD_REQUEST, "Error: Empty query".to_string()),
            ApiError::InvalidBody => (
                StatusCode::BAD_REQUEST,
                "Error: Query must be UTF-8 text".to_string(),
            ),
            // Failing to write the snapshot is the server's fault, not the caller's
            ApiError::Engine(e) if e.is_persistence_error() => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
            }
            ApiError::Engine(e) => (StatusCode::BAD_REQUEST, format!("Error: {}", e)),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", msg)),
        }
    }
}

impl Reply for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_code_body();
        warp::reply::with_status(body, status).into_response()
    }
}

fn into_response<S: Reply, E: Reply>(reply_res: Result<S, E>) -> Response {
    match reply_res {
        Ok(resp) => resp.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn execute_query(coordinator: Arc<Coordinator>, body: Bytes) -> Result<String, ApiError> {
    let sql = std::str::from_utf8(&body)
        .map_err(|_| ApiError::InvalidBody)?
        .trim()
        .to_string();
    if sql.is_empty() {
        return Err(ApiError::EmptyQuery);
    }
    debug!(query = %sql, "received query");

    // The coordinator blocks on its mutex and on file I/O
    let result = tokio::task::spawn_blocking(move || coordinator.execute(&sql))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(result.to_string())
}

// POST /query
pub fn query(
    coordinator: Arc<Coordinator>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("query")
        .and(warp::post())
        .and(warp::body::bytes())
        .then(move |body: Bytes| {
            let coordinator = coordinator.clone();
            async move { into_response(execute_query(coordinator, body).await) }
        })
}

/// All routes served by the HTTP frontend
pub fn filters(
    coordinator: Arc<Coordinator>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    query(coordinator).with(warp::trace::request())
}
