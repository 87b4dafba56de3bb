use std::io::Cursor;

use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::handlers;
use crate::state::SharedState;

pub type JsonResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Builds a header, dropping values tiny_http refuses (non-ASCII).
pub fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

pub fn json_response<T: Serialize>(status: u16, body: &T) -> JsonResponse {
    let (status, bytes) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, bytes),
        Err(e) => {
            tracing::error!(error = %e, "Could not serialize response body");
            (500, br#"{"error":"Internal Server Error"}"#.to_vec())
        }
    };
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        header("Content-Type", "application/json").into_iter().collect(),
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

pub fn error_response(status: u16, message: &str) -> JsonResponse {
    json_response(status, &ErrorBody { error: message })
}

pub fn empty_response(status: u16) -> JsonResponse {
    Response::new(StatusCode(status), Vec::new(), Cursor::new(Vec::new()), Some(0), None)
}

pub fn not_found() -> JsonResponse {
    error_response(404, "Not Found")
}

// ---------------------------------------------------------------------------
// CORS
// ---------------------------------------------------------------------------

/// Adds the cross-origin headers when `origin` is on the allow-list.
/// Requests from other origins get a plain response and the browser blocks it.
fn apply_cors(response: &mut JsonResponse, origin: Option<&str>, preflight: bool, state: &SharedState) {
    let Some(origin) = origin.filter(|o| state.origin_allowed(o)) else {
        return;
    };

    let mut headers = vec![
        header("Access-Control-Allow-Origin", origin),
        header("Vary", "Origin"),
    ];
    if preflight {
        headers.push(header("Access-Control-Allow-Methods", "GET, POST, OPTIONS"));
        headers.push(header("Access-Control-Allow-Headers", "Content-Type"));
        headers.push(header("Access-Control-Max-Age", "600"));
    }
    for h in headers.into_iter().flatten() {
        response.add_header(h);
    }
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Preflight,
    Predict,
    Health,
    MethodNotAllowed,
    NotFound,
}

fn route(method: &Method, path: &str) -> Route {
    match (method, path) {
        (Method::Options, "/predict") => Route::Preflight,
        (Method::Post,    "/predict") => Route::Predict,
        (Method::Get,     "/health")  => Route::Health,
        (_,               "/predict") | (_, "/health") => Route::MethodNotAllowed,
        _ => Route::NotFound,
    }
}

/// Dispatches incoming requests to the appropriate handler.
///
/// Handlers receive a `&mut Request` so that the dispatcher retains ownership
/// and can call `request.respond(response)` at the end.
pub fn dispatch(mut request: Request, state: SharedState) {
    let response = handle(&mut request, &state);

    tracing::debug!(
        method = %request.method(),
        url = %request.url(),
        status = response.status_code().0,
        "Handled request"
    );

    if let Err(e) = request.respond(response) {
        tracing::warn!(error = %e, "Failed to write response");
    }
}

/// Routes one request and decorates the result with CORS headers.
fn handle(request: &mut Request, state: &SharedState) -> JsonResponse {
    let path = request.url().split('?').next().unwrap_or("").to_owned();

    let origin = request.headers().iter()
        .find(|h| h.field.equiv("Origin"))
        .map(|h| h.value.as_str().to_owned());

    let matched = route(request.method(), &path);

    let mut response = match matched {
        Route::Preflight        => empty_response(200),
        Route::Predict          => handlers::predict::handle(request, state),
        Route::Health           => handlers::health::handle(state),
        Route::MethodNotAllowed => error_response(405, "Method Not Allowed"),
        Route::NotFound         => not_found(),
    };

    apply_cors(&mut response, origin.as_deref(), matched == Route::Preflight, state);
    response
}
