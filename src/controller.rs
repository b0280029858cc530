//!
//! Content handlers built from a [`Section`] description.
//!
//! Every content endpoint is one of two handlers, picked by the section's
//! [`ContentKind`]:
//!
//! - **translated** reads the first document of the collection and resolves
//!   the payload for the request locale
//! - **collection** reads every document of the collection as is
//!
//! Both perform exactly one store read and wrap the result in a
//! [`SuccessEnvelope`]. Failures are returned as [`Error`] and rendered by
//! its `IntoResponse` implementation.
//!
use {
    crate::{
        ContentKind, ContentStore, Environment, Error, Locale, Result, Section,
        content::{ResolveError, TranslatedDocument, resolve, validate_collection},
    },
    axum::{
        Extension, Json,
        extract::State,
        middleware,
        routing::{MethodRouter, get},
    },
    serde::Serialize,
    serde_json::Value,
    std::sync::Arc,
};

/// Shared state of every content route.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub environment: Environment,
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>, environment: Environment) -> Self {
        Self { store, environment }
    }
}

// Derived Clone would require S: Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            environment: self.environment,
        }
    }
}

/// The success envelope returned by every content endpoint.
#[derive(Debug, Serialize)]
pub struct SuccessEnvelope {
    pub success: bool,
    pub message: String,
    pub data: Value,
}

impl SuccessEnvelope {
    pub fn new(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

///
/// Builds the GET route for `section`.
///
/// Translated sections get the locale validation middleware, so a missing or
/// malformed locale is rejected before the store is touched. Other methods on
/// the path fall through to the router's 405 handler.
///
pub fn content_route<S: ContentStore>(section: Section) -> MethodRouter<AppState<S>> {
    match section.kind() {
        ContentKind::Translated => get(
            move |State(state): State<AppState<S>>, Extension(locale): Extension<Locale>| async move {
                translated_content(section, state.store.as_ref(), &locale)
                    .await
                    .map(Json)
            },
        )
        .route_layer(middleware::from_fn(crate::fluent::validate_locale)),
        ContentKind::Collection => get(move |State(state): State<AppState<S>>| async move {
            collection_content(section, state.store.as_ref()).await.map(Json)
        }),
    }
}

///
/// Resolves the payload of a translated section for `locale`.
///
/// No document or an exhausted fallback chain is `NotFound`. A document of
/// the wrong shape is `DataIntegrity`. Store failures stay `Upstream`.
///
pub async fn translated_content<S: ContentStore>(
    section: Section,
    store: &S,
    locale: &Locale,
) -> Result<SuccessEnvelope> {
    let Some(value) = store.find_one(section.collection()).await? else {
        return Err(Error::not_found(section.not_found_message()));
    };
    let document = TranslatedDocument::from_value(section, value)?;

    match resolve(&document, locale) {
        Ok(resolution) => {
            if resolution.is_fallback() {
                tracing::debug!(
                    section = %section,
                    requested = %locale,
                    served = resolution.served_locale,
                    "Served fallback translation"
                );
            }
            Ok(SuccessEnvelope::new(
                section.success_message(),
                resolution.payload.clone(),
            ))
        }
        Err(ResolveError::NoData) => {
            tracing::warn!(section = %section, "Stored document has no translations");
            Err(Error::not_found(section.not_found_message()))
        }
        Err(e @ ResolveError::TranslationNotFound(_)) => Err(Error::not_found(e.to_string())),
    }
}

///
/// Returns every document of a collection section.
///
/// An empty collection is `NotFound`. A document without the section's item
/// array is `DataIntegrity`.
///
pub async fn collection_content<S: ContentStore>(
    section: Section,
    store: &S,
) -> Result<SuccessEnvelope> {
    let documents = store.find(section.collection()).await?;
    if documents.is_empty() {
        return Err(Error::not_found(section.not_found_message()));
    }
    validate_collection(section, &documents)?;
    Ok(SuccessEnvelope::new(
        section.success_message(),
        Value::Array(documents),
    ))
}
