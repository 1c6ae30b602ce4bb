//! Route guards.
//!
//! Guards run after routing and before binding. Each one can reject the
//! request with an error or stash data in the [`Context`] for the handler.
//! Group guards run in registration order, outer groups first.

use std::future::Future;
use std::pin::Pin;

use base64::{engine::general_purpose, Engine as _};
use http::header::AUTHORIZATION;
use http::StatusCode;
use portico_core::{Error, HttpError};

use crate::context::Context;

/// Boxed future returned by guards and handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A check run before the handler.
pub trait Guard: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str {
        "guard"
    }

    /// Lets the request through or rejects it.
    fn check<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, Result<(), Error>>;
}

impl<F> Guard for F
where
    F: Fn(&mut Context) -> Result<(), Error> + Send + Sync + 'static,
{
    fn check<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, Result<(), Error>> {
        let result = self(ctx);
        Box::pin(async move { result })
    }
}

/// Requires `Authorization: Bearer <token>` and stores what the verifier
/// returns in the context.
///
/// ```rust,ignore
/// #[derive(Clone)]
/// struct Claims { name: String }
///
/// let guard = BearerAuth::new(|token: &str| {
///     verify(token).ok_or_else(|| HttpError::with_message(StatusCode::UNAUTHORIZED, "invalid token").into())
/// });
/// let admin = service.group("/admin").guard(guard);
/// ```
pub struct BearerAuth<F> {
    verify: F,
}

impl<F, T> BearerAuth<F>
where
    F: Fn(&str) -> Result<T, Error> + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Creates a guard that verifies tokens with `verify`.
    pub fn new(verify: F) -> Self {
        Self { verify }
    }
}

impl<F, T> Guard for BearerAuth<F>
where
    F: Fn(&str) -> Result<T, Error> + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    fn check<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let token = ctx
                .header(AUTHORIZATION.as_str())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .ok_or_else(|| {
                    HttpError::with_message(StatusCode::UNAUTHORIZED, "missing or malformed bearer token")
                })?;
            let claims = (self.verify)(token)?;
            ctx.insert(claims);
            Ok::<(), Error>(())
        })
    }
}

/// Requires `Authorization: Basic <base64(user:password)>` and stores what
/// the verifier returns in the context.
pub struct BasicAuth<F> {
    verify: F,
}

impl<F, T> BasicAuth<F>
where
    F: Fn(&str, &str) -> Result<T, Error> + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Creates a guard that checks credentials with `verify(user, password)`.
    pub fn new(verify: F) -> Self {
        Self { verify }
    }
}

fn malformed_basic() -> HttpError {
    HttpError::with_message(StatusCode::UNAUTHORIZED, "missing or malformed basic credentials")
}

impl<F, T> Guard for BasicAuth<F>
where
    F: Fn(&str, &str) -> Result<T, Error> + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "basic_auth"
    }

    fn check<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let credentials = ctx
                .header(AUTHORIZATION.as_str())
                .and_then(|value| value.strip_prefix("Basic "))
                .and_then(|encoded| general_purpose::STANDARD.decode(encoded.trim()).ok())
                .and_then(|decoded| String::from_utf8(decoded).ok())
                .ok_or_else(malformed_basic)?;
            let (user, password) = credentials
                .split_once(':')
                .ok_or_else(malformed_basic)?;
            let verified = (self.verify)(user, password)?;
            ctx.insert(verified);
            Ok::<(), Error>(())
        })
    }
}
