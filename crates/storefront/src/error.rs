//! Unified error handling with Sentry integration.
//!
//! Each layer has its own `thiserror` enum; `AppError` wraps them for
//! callers that drive several stores (the CLI, the [`crate::Storefront`]
//! context). Every error normalizes to an [`ErrorPayload`] before it reaches
//! the user.

use serde::Serialize;
use thiserror::Error;

use barberbook_core::SelectionError;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::persist::PersistError;
use crate::stores::{AuthError, BookingError};

/// Uniform `{code, message}` shape surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

impl ErrorPayload {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local state could not be read or written.
    #[error("Storage error: {0}")]
    Persist(#[from] PersistError),

    /// Login, registration or logout failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Booking list or cancellation failed.
    #[error("Booking error: {0}")]
    Booking(#[from] BookingError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Shop-page selection is incomplete or inconsistent.
    #[error("Invalid selection: {0}")]
    Selection(#[from] SelectionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Normalize into the `{code, message}` shape shown to users.
    #[must_use]
    pub fn payload(&self) -> ErrorPayload {
        match self {
            Self::Config(e) => ErrorPayload::new("CONFIG_ERROR", e.to_string()),
            Self::Api(e) => e.payload(),
            Self::Persist(_) => ErrorPayload::new("STORAGE_ERROR", "Could not access local storage"),
            Self::Auth(e) => e.payload(),
            Self::Booking(e) => e.payload(),
            Self::Checkout(e) => e.payload(),
            Self::Selection(e) => ErrorPayload::new("INVALID_SELECTION", e.to_string()),
            Self::NotFound(what) => ErrorPayload::new("NOT_FOUND", format!("{what} not found")),
        }
    }

    /// The backend failure underneath, if any.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e)
            | Self::Auth(AuthError::Api(e))
            | Self::Booking(BookingError::Api(e))
            | Self::Checkout(CheckoutError::Api(e)) => Some(e),
            _ => None,
        }
    }

    /// Capture faults that are not the user's doing to Sentry.
    ///
    /// Validation failures and 4xx answers are expected and only logged.
    pub fn report(&self) {
        let is_fault = matches!(self, Self::Persist(_) | Self::Config(_))
            || self.api_error().is_some_and(ApiError::is_server_fault);

        if is_fault {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::warn!(error = %self, "Operation rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("service_id", "svc-cut")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
