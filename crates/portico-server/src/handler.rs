//! Typed handlers.
//!
//! A [`Handler`] wraps an async function from a [`Context`] and a bound
//! input to an output. Around the call it runs the request pipeline:
//!
//! 1. bind the input from the request (defaults, body, parameters)
//! 2. validate it location by location
//! 3. call the function
//! 4. project the output into headers, cookies and a JSON body
//!
//! ```rust,ignore
//! use portico_server::{Context, Handler};
//!
//! let hello = Handler::new(|_ctx: Context, input: HelloInput| async move {
//!     Ok::<_, portico_core::Error>(HelloOutput { message: format!("Hello, {}!", input.name) })
//! })
//! .summary("Greets someone");
//! ```

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use portico_core::Error;
use portico_extract::{bind, project_output, BindConfig, OutputParts, RequestParts};
use portico_schema::{validate_value, Describe, Shape, TypeDescriptor, TypeInfo};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::context::Context;
use crate::guard::BoxFuture;
use crate::options::{self, OperationOption};

/// A type-erased handler as stored in the route table.
pub trait Interactor: Send + Sync + 'static {
    /// Shape of the input, for documentation and binding.
    fn input(&self) -> Shape;

    /// Type of the output, for documentation.
    fn output(&self) -> TypeDescriptor;

    /// Options applied to the route's operation.
    fn options(&self) -> &[OperationOption];

    /// Binds, validates, runs and projects one request.
    fn interact(
        &self,
        ctx: Context,
        request: RequestParts,
        config: &BindConfig,
    ) -> BoxFuture<'static, Result<OutputParts, Error>>;
}

/// Handler built from an async function.
pub struct Handler<I, O, F> {
    f: Arc<F>,
    options: Vec<OperationOption>,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O, F, Fut> Handler<I, O, F>
where
    I: Describe + DeserializeOwned + Serialize + Send + 'static,
    O: TypeInfo + Serialize + Send + 'static,
    F: Fn(Context, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, Error>> + Send + 'static,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self {
            f: Arc::new(f),
            options: Vec::new(),
            _types: PhantomData,
        }
    }
}

impl<I, O, F> Handler<I, O, F> {
    /// Adds an operation option.
    #[must_use]
    pub fn option(mut self, option: impl Into<OperationOption>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Sets the operation summary.
    #[must_use]
    pub fn summary(self, text: impl Into<String>) -> Self {
        self.option(options::summary(text))
    }

    /// Sets the operation description.
    #[must_use]
    pub fn description(self, text: impl Into<String>) -> Self {
        self.option(options::description(text))
    }

    /// Adds operation tags.
    #[must_use]
    pub fn tags<T, S>(self, tags: T) -> Self
    where
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.option(options::tags(tags))
    }

    /// Sets the operation id.
    #[must_use]
    pub fn operation_id(self, id: impl Into<String>) -> Self {
        self.option(options::operation_id(id))
    }

    /// Marks the operation deprecated.
    #[must_use]
    pub fn deprecated(self) -> Self {
        self.option(options::deprecated())
    }

    /// Requires a security scheme.
    #[must_use]
    pub fn security(self, key: impl Into<String>) -> Self {
        self.option(options::security(key))
    }
}

impl<I, O, F> fmt::Debug for Handler<I, O, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("input", &std::any::type_name::<I>())
            .field("output", &std::any::type_name::<O>())
            .field("options", &self.options.len())
            .finish()
    }
}

impl<I, O, F, Fut> Interactor for Handler<I, O, F>
where
    I: Describe + DeserializeOwned + Serialize + Send + 'static,
    O: TypeInfo + Serialize + Send + 'static,
    F: Fn(Context, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, Error>> + Send + 'static,
{
    fn input(&self) -> Shape {
        I::describe()
    }

    fn output(&self) -> TypeDescriptor {
        O::type_info()
    }

    fn options(&self) -> &[OperationOption] {
        &self.options
    }

    fn interact(
        &self,
        ctx: Context,
        request: RequestParts,
        config: &BindConfig,
    ) -> BoxFuture<'static, Result<OutputParts, Error>> {
        let f = Arc::clone(&self.f);
        let config = config.clone();

        Box::pin(async move {
            let input: I = bind(&request, &config).await?;

            let value = serde_json::to_value(&input)?;
            if let Err(err) = validate_value(&I::describe(), &value) {
                debug!(
                    route = %ctx.route(),
                    location = %err.location,
                    "input failed validation"
                );
                portico_telemetry::metrics::record_validation_failure(err.location.tag());
                return Err(err.into());
            }

            let output = f(ctx, input).await?;
            project_output(&output)
        })
    }
}
