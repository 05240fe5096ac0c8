//! Per-request pipeline execution.
//!
//! # Stages
//! ```text
//! Received → PreChain → BodyRead → Procedure → Reply → PostChain → Done
//!               │           │          │
//!               │ false     │ error    │ status-only reply
//!               ▼           ▼          ▼
//!              Done   Done (417)     Done
//! ```
//!
//! # Design Decisions
//! - The context lives exactly as long as this call
//! - Body read is the only await point; a dropped connection drops the
//!   future there and nothing after it runs
//! - An unencodable reply is a programming error and panics; the HTTP layer
//!   contains it to the one request

use std::fmt;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::response::Response;

use crate::dispatch::context::Context;
use crate::dispatch::reply::Reply;
use crate::dispatch::table::CompiledRoute;
use crate::http::{RequestIdExt, ResponseSink};
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Received,
    PreChain,
    BodyRead,
    Procedure,
    Reply,
    PostChain,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::PreChain => "pre_chain",
            Stage::BodyRead => "body_read",
            Stage::Procedure => "procedure",
            Stage::Reply => "reply",
            Stage::PostChain => "post_chain",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// How a dispatch ended, used as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Pre-chain returned `false`.
    Rejected,
    /// Payload could not be read.
    BodyError,
    /// Procedure returned a status-only reply.
    Status,
    /// Body reply written and post-chain run.
    Ok,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Rejected => "rejected",
            Outcome::BodyError => "body_error",
            Outcome::Status => "status",
            Outcome::Ok => "ok",
        }
    }
}

/// Runs compiled pipelines.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    body_limit: usize,
}

impl Dispatcher {
    /// `body_limit` caps the payload read in the `BodyRead` stage.
    pub fn new(body_limit: usize) -> Self {
        Self { body_limit }
    }

    pub async fn dispatch(&self, route: &CompiledRoute, request: Request<Body>) -> Response {
        let (parts, body) = request.into_parts();
        let request_id = parts.request_id().unwrap_or("unknown").to_string();

        let mut ctx = Context::new(request_id, route.shared_name());
        let mut sink = ResponseSink::new();
        enter(Stage::Received, &ctx);

        enter(Stage::PreChain, &ctx);
        if !route.pre_chain().run(&mut ctx, &parts, &mut sink) {
            return finish(ctx, Outcome::Rejected, sink.commit());
        }

        enter(Stage::BodyRead, &ctx);
        let payload = match to_bytes(body, self.body_limit).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    route = %route.name(),
                    error = %e,
                    "Failed to read request body"
                );
                sink.set_status(StatusCode::EXPECTATION_FAILED);
                return finish(ctx, Outcome::BodyError, sink.commit());
            }
        };

        enter(Stage::Procedure, &ctx);
        let reply = route.procedure().call(&mut ctx, payload);

        enter(Stage::Reply, &ctx);
        let body = match reply {
            Reply::Status(status) => {
                sink.set_status(status);
                return finish(ctx, Outcome::Status, sink.commit());
            }
            Reply::Body(body) => body,
        };

        let encoded = match body.encode() {
            Ok(encoded) => encoded,
            Err(e) => panic!("reply of message {:?} cannot be encoded: {e}", route.name()),
        };
        if !sink.has_content_type() {
            sink.insert_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        sink.set_body(encoded);
        let response = sink.commit();

        enter(Stage::PostChain, &ctx);
        route.post_chain().run(&mut ctx, &parts, &mut sink);

        finish(ctx, Outcome::Ok, response)
    }
}

fn enter(stage: Stage, ctx: &Context) {
    tracing::trace!(request_id = %ctx.request_id(), route = %ctx.route(), stage = %stage, "Dispatch stage");
}

fn finish(ctx: Context, outcome: Outcome, response: Response) -> Response {
    enter(Stage::Done, &ctx);
    tracing::debug!(
        request_id = %ctx.request_id(),
        route = %ctx.route(),
        outcome = outcome.as_str(),
        status = response.status().as_u16(),
        "Dispatch finished"
    );
    metrics::record_dispatch(ctx.route(), outcome, ctx.elapsed());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::callback::Callback;
    use crate::dispatch::options::HandlerOptions;
    use crate::dispatch::registry::RegistryBuilder;
    use axum::body::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Debug)]
    struct Seen;

    fn post(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("x-request-id", "test-1")
            .body(Body::from(body))
            .unwrap()
    }

    fn counting(name: &'static str, counter: &Arc<AtomicUsize>, keep_going: bool) -> Callback {
        let counter = counter.clone();
        Callback::named(name, move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            keep_going
        })
    }

    fn echo_len(ctx: &mut Context, payload: Bytes) -> Reply {
        ctx.insert(Seen);
        Reply::json(payload.len())
    }

    #[tokio::test]
    async fn test_full_pipeline() {
        let post_runs = Arc::new(AtomicUsize::new(0));
        let mut registry = RegistryBuilder::new();
        registry
            .add_global_pre_callback(Callback::new(|ctx, parts, _| {
                assert_eq!(ctx.request_id(), "test-1");
                assert_eq!(parts.method, "POST");
                true
            }))
            .add_global_post_callback(counting("post", &post_runs, true))
            .register("len", echo_len);
        let table = registry.compile();

        let response = Dispatcher::new(1024)
            .dispatch(table.get("/len").unwrap(), post("/len", "hello"))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(body, Bytes::from_static(b"5"));
        assert_eq!(post_runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pre_chain_stop_skips_everything_after() {
        let procedure_runs = Arc::new(AtomicUsize::new(0));
        let post_runs = Arc::new(AtomicUsize::new(0));
        let later_pre = Arc::new(AtomicUsize::new(0));

        let runs = procedure_runs.clone();
        let mut registry = RegistryBuilder::new();
        registry
            .add_global_pre_callback(Callback::new(|_, _, sink| {
                sink.set_status(StatusCode::METHOD_NOT_ALLOWED);
                false
            }))
            .add_global_pre_callback(counting("later", &later_pre, true))
            .add_global_post_callback(counting("post", &post_runs, true))
            .register("guarded", move |_: &mut Context, _: Bytes| {
                runs.fetch_add(1, Ordering::SeqCst);
                Reply::status(StatusCode::OK)
            });
        let table = registry.compile();

        let response = Dispatcher::new(1024)
            .dispatch(table.get("/guarded").unwrap(), post("/guarded", "{}"))
            .await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(later_pre.load(Ordering::SeqCst), 0);
        assert_eq!(procedure_runs.load(Ordering::SeqCst), 0);
        assert_eq!(post_runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_status_reply_skips_body_and_post_chain() {
        let post_runs = Arc::new(AtomicUsize::new(0));
        let mut registry = RegistryBuilder::new();
        registry
            .add_global_post_callback(counting("post", &post_runs, true))
            .register("teapot", |_: &mut Context, _: Bytes| Reply::status(StatusCode::IM_A_TEAPOT));
        let table = registry.compile();

        let response = Dispatcher::new(1024)
            .dispatch(table.get("/teapot").unwrap(), post("/teapot", "{}"))
            .await;

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert!(to_bytes(response.into_body(), 1024).await.unwrap().is_empty());
        assert_eq!(post_runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversized_body_is_expectation_failed() {
        let mut registry = RegistryBuilder::new();
        registry.register("len", echo_len);
        let table = registry.compile();

        let response = Dispatcher::new(4)
            .dispatch(table.get("/len").unwrap(), post("/len", "too long"))
            .await;

        assert_eq!(response.status(), StatusCode::EXPECTATION_FAILED);
    }

    #[tokio::test]
    async fn test_post_chain_cannot_change_response() {
        let second = Arc::new(AtomicUsize::new(0));
        let mut registry = RegistryBuilder::new();
        registry.register_with_options(
            "len",
            echo_len,
            HandlerOptions::new()
                .with_post(Callback::new(|ctx, _, sink| {
                    assert!(sink.is_committed());
                    assert!(ctx.get::<Seen>().is_some());
                    sink.set_status(StatusCode::INTERNAL_SERVER_ERROR);
                    false
                }))
                .with_post(counting("second", &second, true)),
        );
        let table = registry.compile();

        let response = Dispatcher::new(1024)
            .dispatch(table.get("/len").unwrap(), post("/len", "abc"))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_callback_content_type_is_kept() {
        let mut registry = RegistryBuilder::new();
        registry
            .add_global_pre_callback(Callback::new(|_, _, sink| {
                sink.insert_header(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json; charset=utf-8"),
                );
                true
            }))
            .register("len", echo_len);
        let table = registry.compile();

        let response = Dispatcher::new(1024)
            .dispatch(table.get("/len").unwrap(), post("/len", "abc"))
            .await;

        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
    }

    #[test]
    fn test_every_exit_is_counted() {
        use axum::http::Method;
        use metrics_util::debugging::{DebugValue, DebuggingRecorder};
        use metrics_util::MetricKind;

        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        ::metrics::with_local_recorder(&recorder, || {
            runtime.block_on(async {
                let mut registry = RegistryBuilder::new();
                registry
                    .add_global_pre_callback(Callback::new(|_, parts, sink| {
                        if parts.method != Method::POST {
                            sink.set_status(StatusCode::METHOD_NOT_ALLOWED);
                            return false;
                        }
                        true
                    }))
                    .register("status", |_: &mut Context, _: Bytes| Reply::status(StatusCode::ACCEPTED))
                    .register("body", echo_len);
                let table = registry.compile();
                let status = table.get("/status").unwrap();
                let body = table.get("/body").unwrap();
                let dispatcher = Dispatcher::new(8);

                let _ = dispatcher.dispatch(status, post("/status", "{}")).await;
                let _ = dispatcher.dispatch(body, post("/body", "{}")).await;
                let get = Request::builder().method("GET").uri("/body").body(Body::empty()).unwrap();
                let _ = dispatcher.dispatch(body, get).await;
                let _ = dispatcher.dispatch(body, post("/body", "far too long")).await;
            });
        });

        let mut counters = Vec::new();
        let mut body_samples = 0;
        for (key, _, _, value) in snapshotter.snapshot().into_vec() {
            let label = |name: &str| {
                key.key()
                    .labels()
                    .find(|l| l.key() == name)
                    .map(|l| l.value().to_string())
                    .unwrap_or_default()
            };
            match (key.kind(), value) {
                (MetricKind::Counter, DebugValue::Counter(count)) => {
                    assert_eq!(key.key().name(), "jwa_requests_total");
                    counters.push((label("route"), label("outcome"), count));
                }
                (MetricKind::Histogram, DebugValue::Histogram(samples)) => {
                    assert_eq!(key.key().name(), "jwa_request_duration_seconds");
                    if label("route") == "body" {
                        body_samples += samples.len();
                    }
                }
                _ => {}
            }
        }
        counters.sort();

        let expected = [
            ("body", "body_error"),
            ("body", "ok"),
            ("body", "rejected"),
            ("status", "status"),
        ];
        let expected: Vec<_> = expected
            .iter()
            .map(|(route, outcome)| (route.to_string(), outcome.to_string(), 1u64))
            .collect();
        assert_eq!(counters, expected);
        assert_eq!(body_samples, 3);
    }
}
