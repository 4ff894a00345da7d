use http::StatusCode;
use may_minihttp::Response;
use serde_json::Value;

use super::service::HandlerResponse;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

// may_minihttp only accepts 'static header lines; computed values have to
// be leaked to get them on the wire.
fn push_header(res: &mut Response, line: String) {
    res.header(Box::leak(line.into_boxed_str()));
}

/// Serialize a handler's response onto the wire.
pub fn write_handler_response(res: &mut Response, hr: &HandlerResponse) {
    res.status_code(hr.status as usize, status_reason(hr.status));
    for (name, value) in &hr.headers {
        push_header(res, format!("{name}: {value}"));
    }

    if let Some(bytes) = &hr.raw {
        // Content type comes from the handler's headers
        res.body_vec(bytes.clone());
        return;
    }

    match &hr.body {
        Value::String(s) => {
            res.header("Content-Type: text/plain");
            res.body_vec(s.clone().into_bytes());
        }
        other => {
            res.header("Content-Type: application/json");
            res.body_vec(serde_json::to_vec(other).unwrap_or_default());
        }
    }
}

/// Write a JSON error body with the given status.
pub fn write_json_error(res: &mut Response, status: u16, body: Value) {
    res.status_code(status as usize, status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}

pub(crate) fn write_redirect(res: &mut Response, location: &str, code: StatusCode) {
    let status = code.as_u16();
    res.status_code(status as usize, status_reason(status));
    push_header(res, format!("Location: {location}"));
}

pub(crate) fn write_allow(res: &mut Response, allow: &str) {
    push_header(res, format!("Allow: {allow}"));
}
