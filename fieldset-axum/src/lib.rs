//! Axum integration for fieldset.
//!
//! This crate reads the client's selection out of the request so handlers
//! can render and plan with it.
//!
//! # Features
//!
//! - **Extractor**: [`Fields`] parses the `fields` query parameter and the
//!   pagination hints into a [`RenderContext`]
//! - **Middleware**: [`SelectionLayer`] carries parsing settings, loaded from
//!   `fieldset.toml`, to the extractor
//! - **Rejections**: malformed selections answer `400 Bad Request`
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{Json, Router, routing::get};
//! use fieldset_axum::{Fields, SelectionLayer};
//! use fieldset_query::prelude::*;
//! use serde_json::Value;
//!
//! struct User { name: String, email: String }
//!
//! fn users() -> Serializer<User> {
//!     Serializer::new("User")
//!         .field(Field::serialize("name", |u: &User| &u.name))
//!         .field(Field::serialize("email", |u: &User| &u.email))
//! }
//!
//! async fn show(fields: Fields) -> Json<Value> {
//!     let user = User { name: "Ada".into(), email: "ada@example.com".into() };
//!     let serializer = users();
//!     let out = fields.bind(&serializer).render(&user).unwrap_or_default();
//!     Json(Value::Object(out))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .route("/user", get(show))
//!         .layer(SelectionLayer::default());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::{FromRequestParts, Query};
use axum::response::{IntoResponse, Response};
use fieldset_query::{Bound, PageHint, RenderContext, Serializer};
use fieldset_selection::{FieldsetConfig, ParseOptions, Selection, SelectionError};
use http::request::Parts;
use http::{Request, StatusCode};
use thiserror::Error;
use tower_layer::Layer;
use tower_service::Service;
use tracing::{debug, info};

pub use fieldset_query::prelude::*;

/// Errors raised while reading the selection from a request.
#[derive(Error, Debug)]
pub enum FieldsRejection {
    /// The selection string was rejected by the strict policy.
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] SelectionError),

    /// A pagination hint was not a non-negative integer.
    #[error("invalid value `{value}` for `{param}`")]
    InvalidPage { param: String, value: String },

    /// The query string could not be decoded.
    #[error("invalid query string: {0}")]
    InvalidQuery(String),
}

impl IntoResponse for FieldsRejection {
    fn into_response(self) -> Response {
        let status = match &self {
            FieldsRejection::InvalidSelection(e) if !e.is_client_error() => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// Result type for request extraction.
pub type Result<T> = std::result::Result<T, FieldsRejection>;

/// Parameter names and parse options used by the [`Fields`] extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSettings {
    /// Query parameter carrying the selection.
    pub param: String,
    /// Query parameter carrying the page size.
    pub limit_param: String,
    /// Query parameter carrying the page offset.
    pub offset_param: String,
    /// How selection strings are parsed.
    pub options: ParseOptions,
}

impl SelectionSettings {
    /// Settings derived from a loaded configuration.
    pub fn from_config(config: &FieldsetConfig) -> Self {
        Self {
            param: config.selection.param.clone(),
            limit_param: config.pagination.limit_param.clone(),
            offset_param: config.pagination.offset_param.clone(),
            options: config.parse_options(),
        }
    }

    /// Build a render context from decoded query parameters.
    pub fn context_from(&self, params: &HashMap<String, String>) -> Result<RenderContext> {
        let mut context = RenderContext::new();

        if let Some(raw) = params.get(&self.param).filter(|raw| !raw.trim().is_empty()) {
            let selection = Selection::parse_with(raw, &self.options)?;
            debug!(param = %self.param, selection = %selection, "selection requested");
            context = context.with_selection(selection);
        }

        let page = PageHint {
            limit: page_param(params, &self.limit_param)?,
            offset: page_param(params, &self.offset_param)?,
        };
        if !page.is_empty() {
            context = context.with_page(page);
        }

        Ok(context)
    }
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self::from_config(&FieldsetConfig::default())
    }
}

fn page_param(params: &HashMap<String, String>, param: &str) -> Result<Option<u64>> {
    params
        .get(param)
        .map(|value| {
            value.trim().parse().map_err(|_| FieldsRejection::InvalidPage {
                param: param.to_owned(),
                value: value.clone(),
            })
        })
        .transpose()
}

/// Tower layer that makes [`SelectionSettings`] available to [`Fields`].
///
/// Without the layer the extractor falls back to the default settings.
///
/// ```rust
/// use fieldset_axum::SelectionLayer;
/// use fieldset_selection::FieldsetConfig;
///
/// let config = FieldsetConfig::from_str("[selection]\nparam = \"only\"").unwrap();
/// let layer = SelectionLayer::from_config(&config);
/// assert_eq!(layer.settings().param, "only");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectionLayer {
    settings: Arc<SelectionSettings>,
}

impl SelectionLayer {
    /// Create a layer with explicit settings.
    pub fn new(settings: SelectionSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    /// Create a layer from a loaded configuration.
    pub fn from_config(config: &FieldsetConfig) -> Self {
        let settings = SelectionSettings::from_config(config);
        info!(
            param = %settings.param,
            policy = ?settings.options.policy,
            max_depth = settings.options.max_depth,
            "SelectionLayer created"
        );
        Self::new(settings)
    }

    /// The settings handed to each request.
    pub fn settings(&self) -> &SelectionSettings {
        &self.settings
    }
}

impl<S> Layer<S> for SelectionLayer {
    type Service = SelectionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SelectionMiddleware {
            inner,
            settings: Arc::clone(&self.settings),
        }
    }
}

/// Tower middleware service inserting [`SelectionSettings`] into request extensions.
#[derive(Debug, Clone)]
pub struct SelectionMiddleware<S> {
    inner: S,
    settings: Arc<SelectionSettings>,
}

impl<S, ReqBody> Service<Request<ReqBody>> for SelectionMiddleware<S>
where
    S: Service<Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        request.extensions_mut().insert(Arc::clone(&self.settings));
        self.inner.call(request)
    }
}

/// Extractor yielding the request's [`RenderContext`].
///
/// ```rust,ignore
/// async fn handler(fields: Fields) -> Json<Value> {
///     let out = fields.bind(&serializer).render(&user)?;
///     Json(Value::Object(out))
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(pub RenderContext);

impl Fields {
    /// Unwrap the context.
    pub fn into_inner(self) -> RenderContext {
        self.0
    }

    /// Bind a serializer to this request's context.
    pub fn bind<'a, T>(&'a self, serializer: &'a Serializer<T>) -> Bound<'a, T> {
        serializer.bind(&self.0)
    }

    /// Read the context from request parts using `settings`.
    pub fn from_parts(parts: &Parts, settings: &SelectionSettings) -> Result<Self> {
        let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|e| FieldsRejection::InvalidQuery(e.body_text()))?;
        settings.context_from(&params).map(Fields)
    }
}

impl Deref for Fields {
    type Target = RenderContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Fields
where
    S: Send + Sync,
{
    type Rejection = FieldsRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        match parts.extensions.get::<Arc<SelectionSettings>>() {
            Some(settings) => Self::from_parts(parts, settings),
            None => Self::from_parts(parts, &SelectionSettings::default()),
        }
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{Fields, FieldsRejection, SelectionLayer, SelectionMiddleware, SelectionSettings};
    pub use fieldset_query::prelude::*;
}
