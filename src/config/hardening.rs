//! Response hardening middleware: attaches the API security headers
//! and records per-request status/latency through tracing.

use axum::http::{HeaderValue, Request, Response};
use std::{
    env,
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};

const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";

#[derive(Clone)]
pub struct HardeningLayer {
    include_hsts: bool,
}

impl HardeningLayer {
    pub fn new(include_hsts: bool) -> Self {
        Self { include_hsts }
    }

    /// HSTS only makes sense behind TLS, so it is gated on
    /// `RUST_ENV=production`.
    pub fn from_env() -> Self {
        let is_production = env::var("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);
        Self::new(is_production)
    }
}

impl<S> Layer<S> for HardeningLayer {
    type Service = HardeningService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HardeningService {
            inner,
            include_hsts: self.include_hsts,
        }
    }
}

#[derive(Clone)]
pub struct HardeningService<S> {
    inner: S,
    include_hsts: bool,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for HardeningService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = HardeningFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        HardeningFuture {
            future: self.inner.call(request),
            include_hsts: self.include_hsts,
            started_at: Instant::now(),
            method,
            path,
        }
    }
}

#[pin_project::pin_project]
pub struct HardeningFuture<F> {
    #[pin]
    future: F,
    include_hsts: bool,
    started_at: Instant,
    method: axum::http::Method,
    path: String,
}

impl<F, ResBody, E> std::future::Future for HardeningFuture<F>
where
    F: std::future::Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: std::pin::Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match this.future.poll(cx) {
            Poll::Ready(Ok(mut response)) => {
                let headers = response.headers_mut();
                headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
                headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
                headers.insert(
                    "Content-Security-Policy",
                    HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
                );
                headers.insert(
                    "Referrer-Policy",
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                );
                if *this.include_hsts {
                    headers.insert(
                        "Strict-Transport-Security",
                        HeaderValue::from_static(HSTS_VALUE),
                    );
                }

                tracing::debug!(
                    method = %this.method,
                    path = %this.path,
                    status = response.status().as_u16(),
                    elapsed_ms = this.started_at.elapsed().as_millis() as u64,
                    "Request completed"
                );

                Poll::Ready(Ok(response))
            }
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
            Poll::Pending => Poll::Pending,
        }
    }
}

pub fn create_hardening_layer() -> HardeningLayer {
    HardeningLayer::from_env()
}
