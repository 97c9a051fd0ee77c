//! Per-request trace id and completion log.
//!
//! Generates a UUID, stores it in the request extensions, runs the rest of
//! the chain inside a `request` span and the task-local trace scope, and
//! echoes it back as `x-request-id`. When the response is ready it emits one
//! `request_completed` event whose level follows the status class.

use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::HttpMessage;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::{error, info, info_span, warn, Instrument, Level};
use uuid::Uuid;

use crate::trace_ctx;

/// Trace id as stored in request extensions.
#[derive(Debug, Clone)]
pub struct TraceId(pub String);

/// Id of the user `CurrentUser` resolved for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUserId(pub i32);

/// Server errors log at ERROR, client errors at WARN, the rest at INFO.
pub fn completion_level(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

pub struct RequestTrace;

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequestTraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceMiddleware { service }))
    }
}

pub struct RequestTraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let trace_id = Uuid::new_v4().to_string();
        req.extensions_mut().insert(TraceId(trace_id.clone()));

        let method = req.method().to_string();
        let path = req.path().to_string();
        let span = info_span!(
            "request",
            trace_id = %trace_id,
            method = %method,
            path = %path
        );

        // The downstream future is created here but only polled inside the
        // scope below, which is where extractors and handlers run.
        let fut = self.service.call(req);

        Box::pin(async move {
            let result = trace_ctx::with_trace_id(trace_id.clone(), fut.instrument(span)).await;

            let (status, user_id) = match &result {
                Ok(res) => (
                    res.status(),
                    res.request()
                        .extensions()
                        .get::<AuthenticatedUserId>()
                        .map(|u| u.0),
                ),
                Err(err) => (err.as_response_error().status_code(), None),
            };
            let status_code = status.as_u16();
            let duration_us = start.elapsed().as_micros() as u64;

            let level = completion_level(status);
            if level == Level::ERROR {
                error!(http.method = %method, url.path = %path, http.status_code = status_code, user_id, duration_us, trace_id = %trace_id, "request_completed");
            } else if level == Level::WARN {
                warn!(http.method = %method, url.path = %path, http.status_code = status_code, user_id, duration_us, trace_id = %trace_id, "request_completed");
            } else {
                info!(http.method = %method, url.path = %path, http.status_code = status_code, user_id, duration_us, trace_id = %trace_id, "request_completed");
            }

            let mut res = result?;
            if let Ok(value) = HeaderValue::from_str(&trace_id) {
                res.headers_mut()
                    .insert(HeaderName::from_static("x-request-id"), value);
            }

            Ok(res)
        })
    }
}
