//! REST client for the booking backend.
//!
//! # Architecture
//!
//! - One typed request/response struct per endpoint (see [`types`])
//! - The backend is the source of truth; bookings and sessions are never cached
//! - Read-only catalog responses are cached in memory via `moka`
//!
//! # Example
//!
//! ```rust,ignore
//! use barberbook_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config)?;
//! let shops = client.list_shops(&SearchFilters::default()).await?;
//! let slots = client.time_slots(&shops[0].id, date, None).await?;
//! ```

mod cache;
pub mod types;

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use barberbook_core::{
    Barbershop, Booking, BookingId, BookingRequest, BookingStatus, SearchFilters, Service, ServiceId,
    ShopId, TimeSlot, User,
};

use crate::config::StorefrontConfig;
use crate::error::ErrorPayload;

use cache::{CacheKey, CacheValue};
pub use types::{AuthResponse, LoginRequest, Page, RegisterRequest};
use types::{ErrorBody, TimeSlotQuery};

/// Fallback code for non-2xx answers that carry no code of their own.
const SERVER_ERROR_CODE: &str = "SERVER_ERROR";

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur when talking to the booking backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: DNS, connect, timeout, broken body.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx answer from the backend.
    #[error("Server error {status}: {message}")]
    Server {
        status: u16,
        code: String,
        message: String,
    },

    /// The body of a 2xx answer did not match the expected shape.
    #[error("Invalid response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The token is missing, expired or revoked.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl ApiError {
    /// Normalize into the uniform `{code, message}` shape shown to users.
    #[must_use]
    pub fn payload(&self) -> ErrorPayload {
        match self {
            Self::Network(e) => ErrorPayload::new(
                "NETWORK_ERROR",
                if e.is_timeout() {
                    "The server took too long to respond".to_string()
                } else {
                    "Could not reach the server".to_string()
                },
            ),
            Self::Server { code, message, .. } => ErrorPayload::new(code, message.clone()),
            Self::Parse(_) => ErrorPayload::new(
                "INVALID_RESPONSE",
                "The server sent an unexpected response".to_string(),
            ),
            Self::Unauthorized(message) => ErrorPayload::new("UNAUTHORIZED", message.clone()),
        }
    }

    /// HTTP status of the failed answer, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Unauthorized(_) => Some(401),
            Self::Network(_) | Self::Parse(_) => None,
        }
    }

    /// Whether the failure happened on the server side (5xx).
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        matches!(self, Self::Server { status, .. } if *status >= 500)
    }
}

fn server_error(status: StatusCode, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
    ApiError::Server {
        status: status.as_u16(),
        code: parsed.code.unwrap_or_else(|| SERVER_ERROR_CODE.to_string()),
        message,
    }
}

fn unauthorized(body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    ApiError::Unauthorized(
        parsed
            .message
            .or(parsed.error)
            .unwrap_or_else(|| "Session expired, please log in again".to_string()),
    )
}

/// List endpoints answer either a bare array or a page envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Paged(Page<T>),
    Items(Vec<T>),
}

impl<T> Listing<T> {
    fn into_page(self) -> Page<T> {
        match self {
            Self::Paged(page) => page,
            Self::Items(items) => Page::of(items),
        }
    }
}

// =============================================================================
// Trait seams
// =============================================================================

/// Session lifecycle endpoints.
pub trait AuthApi: Send + Sync {
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    fn logout(&self, token: &SecretString) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn current_user(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<User, ApiError>> + Send;
}

/// Booking endpoints used by the booking store and checkout.
pub trait BookingsApi: Send + Sync {
    /// Create every request in one batch; the body is a bare JSON array.
    fn create_multiple(
        &self,
        token: &SecretString,
        requests: &[BookingRequest],
    ) -> impl Future<Output = Result<Vec<Booking>, ApiError>> + Send;

    fn list_bookings(
        &self,
        token: &SecretString,
        status: Option<BookingStatus>,
    ) -> impl Future<Output = Result<Page<Booking>, ApiError>> + Send;

    fn cancel_booking(
        &self,
        token: &SecretString,
        id: &BookingId,
    ) -> impl Future<Output = Result<Booking, ApiError>> + Send;
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the booking REST backend.
///
/// Cheap to clone; clones share the connection pool and catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    /// Base URL every endpoint path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.inner
            .client
            .get(self.url(path))
            .header("Content-Type", "application/json")
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.inner
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
    }

    /// Send a request and decode a JSON answer.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send_raw(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request and return the raw body of a 2xx answer.
    async fn send_raw(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(unauthorized(&body));
        }

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(server_error(status, &body));
        }

        Ok(body)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List barbershops matching `filters`.
    ///
    /// Only the unfiltered listing is cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_shops(&self, filters: &SearchFilters) -> Result<Vec<Barbershop>, ApiError> {
        let cacheable = filters.is_empty();
        if cacheable
            && let Some(CacheValue::Shops(shops)) = self.inner.cache.get(&CacheKey::Shops).await
        {
            debug!("Cache hit for shop listing");
            return Ok(shops);
        }

        let listing: Listing<Barbershop> =
            self.send(self.get("/barbershops").query(filters)).await?;
        let shops = listing.into_page().data;

        if cacheable {
            self.inner
                .cache
                .insert(CacheKey::Shops, CacheValue::Shops(shops.clone()))
                .await;
        }

        Ok(shops)
    }

    /// Get one barbershop with its services and barbers.
    ///
    /// # Errors
    ///
    /// Returns an error if the shop does not exist or the API request fails.
    #[instrument(skip(self), fields(shop_id = %id))]
    pub async fn get_shop(&self, id: &ShopId) -> Result<Barbershop, ApiError> {
        let key = CacheKey::Shop(id.clone());
        if let Some(CacheValue::Shop(shop)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for shop");
            return Ok(*shop);
        }

        let shop: Barbershop = self.send(self.get(&format!("/barbershops/{id}"))).await?;

        self.inner
            .cache
            .insert(key, CacheValue::Shop(Box::new(shop.clone())))
            .await;

        Ok(shop)
    }

    /// Free-text shop search. Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_shops(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<Barbershop>, ApiError> {
        let listing: Listing<Barbershop> = self
            .send(
                self.get("/barbershops/search")
                    .query(&[("q", query)])
                    .query(filters),
            )
            .await?;
        Ok(listing.into_page().data)
    }

    /// Services offered by one shop.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(shop_id = %shop))]
    pub async fn services_for_shop(&self, shop: &ShopId) -> Result<Vec<Service>, ApiError> {
        let key = CacheKey::Services(shop.clone());
        if let Some(CacheValue::Services(services)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for services");
            return Ok(services);
        }

        let listing: Listing<Service> = self
            .send(self.get("/services").query(&[("barbershopId", shop.as_str())]))
            .await?;
        let services = listing.into_page().data;

        self.inner
            .cache
            .insert(key, CacheValue::Services(services.clone()))
            .await;

        Ok(services)
    }

    /// Bookable start times for a shop on `date`. Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(shop_id = %shop, date = %date))]
    pub async fn time_slots(
        &self,
        shop: &ShopId,
        date: NaiveDate,
        service: Option<&ServiceId>,
    ) -> Result<Vec<TimeSlot>, ApiError> {
        let query = TimeSlotQuery {
            barbershop_id: shop.as_str(),
            date: date.to_string(),
            service_id: service.map(ServiceId::as_str),
        };
        let listing: Listing<TimeSlot> = self
            .send(self.get("/bookings/time-slots").query(&query))
            .await?;
        Ok(listing.into_page().data)
    }

    /// Drop every cached catalog response.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }
}

impl AuthApi for ApiClient {
    #[instrument(skip_all, fields(email = %request.email))]
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.send(self.post("/auth/login").json(request)).await
    }

    #[instrument(skip_all, fields(email = %request.email))]
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.send(self.post("/auth/register").json(request)).await
    }

    #[instrument(skip_all)]
    async fn logout(&self, token: &SecretString) -> Result<(), ApiError> {
        self.send_raw(self.post("/auth/logout").bearer_auth(token.expose_secret()))
            .await
            .map(|_| ())
    }

    #[instrument(skip_all)]
    async fn current_user(&self, token: &SecretString) -> Result<User, ApiError> {
        self.send(self.get("/auth/me").bearer_auth(token.expose_secret()))
            .await
    }
}

impl BookingsApi for ApiClient {
    #[instrument(skip_all, fields(count = requests.len()))]
    async fn create_multiple(
        &self,
        token: &SecretString,
        requests: &[BookingRequest],
    ) -> Result<Vec<Booking>, ApiError> {
        let listing: Listing<Booking> = self
            .send(
                self.post("/bookings/multiple")
                    .bearer_auth(token.expose_secret())
                    .json(requests),
            )
            .await?;
        Ok(listing.into_page().data)
    }

    #[instrument(skip(self, token))]
    async fn list_bookings(
        &self,
        token: &SecretString,
        status: Option<BookingStatus>,
    ) -> Result<Page<Booking>, ApiError> {
        let mut request = self.get("/bookings").bearer_auth(token.expose_secret());
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }
        let listing: Listing<Booking> = self.send(request).await?;
        Ok(listing.into_page())
    }

    #[instrument(skip(self, token), fields(booking_id = %id))]
    async fn cancel_booking(&self, token: &SecretString, id: &BookingId) -> Result<Booking, ApiError> {
        self.send(
            self.post(&format!("/bookings/{id}/cancel"))
                .bearer_auth(token.expose_secret()),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_uses_body_code_and_message() {
        let err = server_error(
            StatusCode::CONFLICT,
            r#"{"code":"SLOT_TAKEN","message":"15:00 is no longer available"}"#,
        );
        let payload = err.payload();
        assert_eq!(payload.code, "SLOT_TAKEN");
        assert_eq!(payload.message, "15:00 is no longer available");
        assert_eq!(err.status(), Some(409));
        assert!(!err.is_server_fault());
    }

    #[test]
    fn test_server_error_falls_back_to_reason() {
        let err = server_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        let payload = err.payload();
        assert_eq!(payload.code, "SERVER_ERROR");
        assert_eq!(payload.message, "Bad Gateway");
        assert!(err.is_server_fault());

        let err = server_error(StatusCode::BAD_REQUEST, r#"{"error":"date is in the past"}"#);
        assert_eq!(err.payload().message, "date is in the past");
    }

    #[test]
    fn test_unauthorized_message() {
        let err = unauthorized("");
        assert_eq!(err.payload().code, "UNAUTHORIZED");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_listing_accepts_array_and_page() {
        let bare: Listing<u32> = serde_json::from_str("[1,2]").unwrap();
        assert_eq!(bare.into_page().total, 2);

        let paged: Listing<u32> =
            serde_json::from_str(r#"{"data":[1],"total":40,"page":3,"limit":1}"#).unwrap();
        let page = paged.into_page();
        assert_eq!(page.total, 40);
        assert_eq!(page.page, 3);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = StorefrontConfig::for_api_url("http://localhost:3001/api/").unwrap();
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3001/api");
        assert_eq!(client.url("/bookings"), "http://localhost:3001/api/bookings");
    }
}
