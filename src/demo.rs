//! Demonstration set-up: a POST-only guard, JSON content type, timing
//! callbacks and the `echo` message.

use std::time::Instant;

use axum::body::Bytes;
use axum::http::{header, HeaderValue, Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::dispatch::{Callback, Context, RegistryBuilder, Reply};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EchoRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct EchoReply {
    pub result: i32,
    pub description: String,
}

/// Accepts any well-formed `EchoRequest` and answers `{"Result":0,"Description":"OK"}`.
pub fn echo(_ctx: &mut Context, payload: Bytes) -> Reply {
    let request: EchoRequest = match serde_json::from_slice(&payload) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "Rejecting malformed echo payload");
            return StatusCode::BAD_REQUEST.into();
        }
    };
    tracing::trace!(token = %request.token, "Echo");

    Reply::json(EchoReply {
        result: 0,
        description: "OK".to_string(),
    })
}

/// Rejects every method except POST with 405.
pub fn post_only() -> Callback {
    Callback::named("post_only", |_, parts, sink| {
        if parts.method != Method::POST {
            sink.set_status(StatusCode::METHOD_NOT_ALLOWED);
            return false;
        }
        true
    })
}

/// Sets the JSON content type up front.
pub fn json_content_type() -> Callback {
    Callback::named("json_content_type", |_, _, sink| {
        sink.insert_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        true
    })
}

#[derive(Debug, Clone, Copy)]
struct StartedAt(Instant);

/// Records when the procedure pipeline started.
pub fn start_timer() -> Callback {
    Callback::named("start_timer", |ctx, _, _| {
        ctx.insert(StartedAt(Instant::now()));
        true
    })
}

/// Logs how long the pipeline took, paired with [`start_timer`].
pub fn log_elapsed() -> Callback {
    Callback::named("log_elapsed", |ctx, parts, sink| {
        if let Some(StartedAt(begin)) = ctx.get::<StartedAt>() {
            tracing::info!(
                request_id = %ctx.request_id(),
                path = %parts.uri.path(),
                status = sink.status().as_u16(),
                elapsed = ?begin.elapsed(),
                "Message processed"
            );
        }
        true
    })
}

/// Install the demonstration callbacks and messages.
pub fn install(registry: &mut RegistryBuilder) {
    registry
        .add_global_pre_callback(post_only())
        .add_global_pre_callback(json_content_type())
        .add_global_pre_callback(start_timer())
        .add_global_post_callback(log_elapsed())
        .register("echo", echo);
}
