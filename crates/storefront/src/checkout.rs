//! Cart-to-bookings checkout.
//!
//! Checkout is a two-phase commit over the local cart: entries stay staged
//! until the backend accepts the whole batch, and only then is the booking
//! list refreshed and the cart cleared. Any failure before that point leaves
//! the cart exactly as it was.

use thiserror::Error;
use tracing::instrument;

use barberbook_core::{Booking, BookingRequest, Price};

use crate::api::{ApiError, BookingsApi};
use crate::error::{ErrorPayload, add_breadcrumb};
use crate::persist::KeyValueStore;
use crate::stores::{BookingStore, CartStore, SessionReader};

/// Why a checkout did not go through.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Please log in first")]
    NotAuthenticated,

    #[error("Cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckoutError {
    #[must_use]
    pub fn payload(&self) -> ErrorPayload {
        match self {
            Self::NotAuthenticated => ErrorPayload::new("NOT_AUTHENTICATED", self.to_string()),
            Self::EmptyCart => ErrorPayload::new("EMPTY_CART", self.to_string()),
            Self::Api(e) => e.payload(),
        }
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    /// Bookings as created by the backend.
    pub created: Vec<Booking>,
    pub total_price: Price,
    /// Total duration in minutes.
    pub total_duration: u32,
    /// Whether the booking list was refreshed afterwards.
    pub refreshed: bool,
}

/// Submits the cart as one batch and reconciles local state.
#[derive(Debug)]
pub struct CheckoutCoordinator<'a, A> {
    session: SessionReader,
    bookings: &'a BookingStore<A>,
}

impl<'a, A: BookingsApi> CheckoutCoordinator<'a, A> {
    #[must_use]
    pub const fn new(session: SessionReader, bookings: &'a BookingStore<A>) -> Self {
        Self { session, bookings }
    }

    /// Turn every cart entry into a booking.
    ///
    /// Preconditions are checked in order (session, then cart) before any
    /// network call. All entries go out in a single `create_multiple` call.
    /// On success the booking list is refreshed and then the cart cleared;
    /// a failed refresh still clears the cart because the bookings already
    /// exist on the backend.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotAuthenticated`, `CheckoutError::EmptyCart`,
    /// or `CheckoutError::Api` if the batch was rejected. The cart is
    /// untouched in every error case.
    #[instrument(skip(self, cart), fields(items = cart.len()))]
    pub async fn checkout<S: KeyValueStore>(
        &self,
        cart: &mut CartStore<S>,
        notes: Option<&str>,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let token = self
            .session
            .token()
            .await
            .ok_or(CheckoutError::NotAuthenticated)?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let requests: Vec<BookingRequest> = cart
            .items()
            .iter()
            .map(|entry| BookingRequest::from(entry).with_notes(notes))
            .collect();
        let total_price = cart.total_price();
        let total_duration = cart.total_duration();

        let count = requests.len().to_string();
        add_breadcrumb("checkout", "Submitting bookings", Some(&[("count", count.as_str())]));

        let created = self
            .bookings
            .api()
            .create_multiple(&token, &requests)
            .await?;

        let refreshed = match self.bookings.fetch_bookings(None).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Bookings created but list refresh failed");
                false
            }
        };

        cart.clear_cart();
        tracing::info!(created = created.len(), %total_price, "Checkout completed");

        Ok(CheckoutReceipt {
            created,
            total_price,
            total_duration,
            refreshed,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use barberbook_core::BookingStatus;

    use super::*;
    use crate::persist::MemoryStore;
    use crate::stores::AuthStore;
    use crate::testing::{Call, Endpoint, MockBackend, entry, logged_in};

    fn cart_with(entries: &[(&str, u32)]) -> CartStore<MemoryStore> {
        let mut cart = CartStore::load(MemoryStore::new());
        for (service, hour) in entries {
            cart.add_to_cart(entry(service, *hour));
        }
        cart
    }

    #[tokio::test]
    async fn test_unauthenticated_checkout_makes_no_request() {
        let backend = MockBackend::new();
        let auth = AuthStore::load(backend.clone(), MemoryStore::new());
        let bookings = BookingStore::new(backend.clone(), auth.reader());
        let mut cart = cart_with(&[("svc-cut", 10)]);

        let err = CheckoutCoordinator::new(auth.reader(), &bookings)
            .checkout(&mut cart, None)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::NotAuthenticated));
        assert!(backend.calls().is_empty());
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn test_unauthenticated_wins_over_empty_cart() {
        let backend = MockBackend::new();
        let auth = AuthStore::load(backend.clone(), MemoryStore::new());
        let bookings = BookingStore::new(backend.clone(), auth.reader());
        let mut cart = cart_with(&[]);

        let err = CheckoutCoordinator::new(auth.reader(), &bookings)
            .checkout(&mut cart, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_empty_cart_makes_no_request() {
        let backend = MockBackend::new();
        let auth = logged_in(&backend).await;
        backend.reset_calls();
        let bookings = BookingStore::new(backend.clone(), auth.reader());
        let mut cart = cart_with(&[]);

        let err = CheckoutCoordinator::new(auth.reader(), &bookings)
            .checkout(&mut cart, None)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(err.payload().message, "Cart is empty");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_success_sends_one_batch_then_refreshes_then_clears() {
        let backend = MockBackend::new();
        let auth = logged_in(&backend).await;
        backend.reset_calls();
        let bookings = BookingStore::new(backend.clone(), auth.reader());
        let mut cart = cart_with(&[("svc-cut", 10), ("svc-beard", 11)]);
        let expected: Vec<BookingRequest> = cart
            .items()
            .iter()
            .map(|e| BookingRequest::from(e).with_notes(Some("window seat")))
            .collect();

        let receipt = CheckoutCoordinator::new(auth.reader(), &bookings)
            .checkout(&mut cart, Some("window seat"))
            .await
            .unwrap();

        assert!(cart.is_empty());
        assert_eq!(
            backend.calls(),
            [Call::CreateMultiple(expected), Call::ListBookings(None)]
        );
        assert_eq!(receipt.created.len(), 2);
        assert_eq!(receipt.total_price, Price::new(120_000));
        assert_eq!(receipt.total_duration, 75);
        assert!(receipt.refreshed);
    }

    #[tokio::test]
    async fn test_single_entry_checkout_lands_in_booking_list() {
        let backend = MockBackend::new();
        let auth = logged_in(&backend).await;
        let bookings = BookingStore::new(backend.clone(), auth.reader());
        let mut cart = cart_with(&[("svc-cut", 10)]);

        let receipt = CheckoutCoordinator::new(auth.reader(), &bookings)
            .checkout(&mut cart, None)
            .await
            .unwrap();

        assert_eq!(cart.len(), 0);
        let listed = bookings.bookings().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, receipt.created[0].id);
        assert!(matches!(
            listed[0].status,
            BookingStatus::Pending | BookingStatus::Confirmed
        ));
    }

    #[tokio::test]
    async fn test_failed_batch_keeps_cart_and_skips_refresh() {
        let backend = MockBackend::new();
        let auth = logged_in(&backend).await;
        backend.reset_calls();
        let bookings = BookingStore::new(backend.clone(), auth.reader());
        let mut cart = cart_with(&[("svc-cut", 10), ("svc-beard", 11)]);
        let before = cart.items().to_vec();

        backend.fail_next(
            Endpoint::CreateMultiple,
            ApiError::Server {
                status: 409,
                code: "SLOT_TAKEN".to_string(),
                message: "10:00 is no longer available".to_string(),
            },
        );

        let err = CheckoutCoordinator::new(auth.reader(), &bookings)
            .checkout(&mut cart, None)
            .await
            .unwrap_err();

        assert_eq!(err.payload().code, "SLOT_TAKEN");
        assert_eq!(cart.items(), before.as_slice());
        assert!(
            !backend
                .calls()
                .iter()
                .any(|c| matches!(c, Call::ListBookings(_)))
        );
        assert!(bookings.bookings().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_still_clears_cart() {
        let backend = MockBackend::new();
        let auth = logged_in(&backend).await;
        let bookings = BookingStore::new(backend.clone(), auth.reader());
        let mut cart = cart_with(&[("svc-cut", 10)]);

        backend.fail_next(Endpoint::ListBookings, MockBackend::server_error(503));

        let receipt = CheckoutCoordinator::new(auth.reader(), &bookings)
            .checkout(&mut cart, None)
            .await
            .unwrap();

        assert!(!receipt.refreshed);
        assert!(cart.is_empty());
        assert_eq!(backend.server_bookings().len(), 1);
    }
}
