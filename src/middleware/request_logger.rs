//! Request logging middleware: one line when a request arrives, one when it completes.

use std::future::{Ready, ready};
use std::time::{Duration, Instant};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::StatusCode;
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error, info, warn};

/// How a completed request is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Ok,
    ClientError,
    ServerError,
}

impl Outcome {
    fn of(status: StatusCode) -> Self {
        if status.is_client_error() {
            Outcome::ClientError
        } else if status.is_server_error() {
            Outcome::ServerError
        } else {
            Outcome::Ok
        }
    }
}

/// Method and path of the request being served.
struct RequestLine {
    method: String,
    path: String,
}

impl RequestLine {
    fn completed(&self, status: StatusCode, elapsed: Duration) {
        let (method, path) = (&self.method, &self.path);
        let outcome = Outcome::of(status);
        let status = status.as_u16();
        let duration_ms = elapsed.as_millis().to_string();
        match outcome {
            Outcome::Ok => {
                info!(target: "api", %method, %path, status, %duration_ms, "Request completed")
            }
            Outcome::ClientError => {
                warn!(target: "api", %method, %path, status, %duration_ms, "Client error")
            }
            Outcome::ServerError => {
                error!(target: "api", %method, %path, status, %duration_ms, "Server error")
            }
        }
    }
}

pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let line = RequestLine {
            method: req.method().to_string(),
            path: req.path().to_string(),
        };

        debug!(
            target: "api",
            method = %line.method,
            path = %line.path,
            query = %req.query_string(),
            remote_addr = %req.connection_info().realip_remote_addr().unwrap_or("unknown"),
            "Request started"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            line.completed(res.status(), start.elapsed());
            Ok(res)
        })
    }
}
