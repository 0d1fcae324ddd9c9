//! Client side of the external VRP solver.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Coordinate, Route, ViewerError};

mod http;

pub use http::HttpSolverClient;

const SUCCESS_STATUS: &str = "success";
const SERVER_ERROR_MESSAGE: &str = "Server error";
const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Body of a solve request: `{"depot": {"lat": .., "lng": ..}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveRequest {
    /// Depot the routes start from.
    pub depot: Coordinate,
}

impl SolveRequest {
    /// Creates a request for the given depot.
    pub fn new(depot: Coordinate) -> Self {
        Self { depot }
    }
}

/// Something that can produce routes for a depot.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait SolverClient {
    /// Requests routes for `request.depot`.
    async fn solve(&self, request: &SolveRequest) -> Result<Vec<Route>, ViewerError>;
}

// Fields stay untyped until `status` says which of them matter, so a failure body with odd
// `status` or `routes` values still yields its message.
#[derive(Debug, Deserialize)]
struct SolveResponse {
    status: Option<Value>,
    routes: Option<Value>,
    message: Option<Value>,
}

impl SolveResponse {
    fn message(&self) -> Option<String> {
        self.message.as_ref()?.as_str().map(str::to_string)
    }
}

/// Converts an HTTP answer of the solver into routes or an error.
///
/// * A non-success HTTP status gives [`ViewerError::Server`] with the `message` of the body, or
///   `"Server error"` if the body has none or is not JSON.
/// * A success status with `"status": "success"` gives the `routes` of the body.
/// * Any other `status` gives [`ViewerError::Solver`] with the `message` of the body, or
///   `"Unknown error"`.
/// * A success body that is not valid JSON gives [`ViewerError::Decoding`].
pub fn interpret_response(status: StatusCode, body: &[u8]) -> Result<Vec<Route>, ViewerError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<SolveResponse>(body)
            .ok()
            .and_then(|response| response.message())
            .unwrap_or_else(|| SERVER_ERROR_MESSAGE.to_string());
        log::info!("Solver responded with {status}: {message}");
        return Err(ViewerError::Server(message));
    }

    let response: SolveResponse = serde_json::from_slice(body)?;
    if response.status.as_ref().and_then(Value::as_str) != Some(SUCCESS_STATUS) {
        return Err(ViewerError::Solver(
            response
                .message()
                .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
        ));
    }

    match response.routes {
        Some(routes) => Ok(serde_json::from_value(routes)?),
        None => Err(ViewerError::Decoding("solver response has no routes".into())),
    }
}
