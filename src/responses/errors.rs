use crate::errors::ServerError;
use crate::templates::html_error_response;
use astra::{Body, Response, ResponseBuilder};
use serde::Serialize;

pub type ResultResp = Result<Response, ServerError>;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: bool,
    message: &'a str,
}

/// API callers get a JSON error body, browsers get the HTML error page.
pub fn error_to_response(err: ServerError, wants_json: bool) -> Response {
    if !wants_json {
        return html_error_response(err);
    }

    let status = err.status_code();
    let message = err.to_string();
    let body = serde_json::to_string(&ErrorBody {
        error: true,
        message: &message,
    })
    .unwrap_or_else(|_| r#"{"error":true,"message":"Internal Server Error"}"#.to_string());

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
