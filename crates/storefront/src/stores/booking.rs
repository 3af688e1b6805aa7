//! Cached, server-authoritative list of the user's bookings.
//!
//! The cache is only ever replaced by a fetch response or patched after the
//! backend acknowledged a cancellation. Overlapping fetches are sequenced:
//! each call takes a ticket, and a response older than the last applied one
//! is dropped.
//!
//! The cache belongs to the session that fetched it. Once that session ends
//! the list is hidden, and responses still in flight for it are discarded.

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

use barberbook_core::{Booking, BookingId, BookingStatus};

use crate::api::{ApiError, BookingsApi};
use crate::error::ErrorPayload;
use crate::stores::SessionReader;

/// Errors from booking list and cancellation.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Please log in first")]
    NotAuthenticated,

    #[error("Booking {id} is {status} and can no longer be cancelled")]
    NotCancellable { id: BookingId, status: BookingStatus },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl BookingError {
    #[must_use]
    pub fn payload(&self) -> ErrorPayload {
        match self {
            Self::NotAuthenticated => ErrorPayload::new("NOT_AUTHENTICATED", self.to_string()),
            Self::NotCancellable { .. } => ErrorPayload::new("NOT_CANCELLABLE", self.to_string()),
            Self::Api(e) => e.payload(),
        }
    }
}

#[derive(Debug, Default)]
struct BookingCache {
    bookings: Vec<Booking>,
    /// Ticket of the fetch whose response is currently cached.
    applied: u64,
    /// Session generation the cached list was fetched under.
    generation: u64,
}

impl BookingCache {
    fn visible(&self, session: Option<u64>) -> &[Booking] {
        match session {
            Some(generation) if generation == self.generation => &self.bookings,
            _ => &[],
        }
    }
}

/// Booking list cache plus the cancel round-trip.
#[derive(Debug)]
pub struct BookingStore<A> {
    api: A,
    session: SessionReader,
    cache: RwLock<BookingCache>,
    next_ticket: AtomicU64,
}

impl<A: BookingsApi> BookingStore<A> {
    #[must_use]
    pub fn new(api: A, session: SessionReader) -> Self {
        Self {
            api,
            session,
            cache: RwLock::new(BookingCache::default()),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Backend used by this store.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Replace the cache with the backend's list, optionally filtered.
    ///
    /// Returns the cache after the call. A response that arrives after a
    /// newer fetch was applied, or after its session ended, leaves the cache
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::NotAuthenticated` without a network call when
    /// there is no session, or `BookingError::Api` when the request fails.
    /// The cache is unchanged on error.
    #[instrument(skip(self))]
    pub async fn fetch_bookings(
        &self,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, BookingError> {
        let (token, generation) = self
            .session
            .token_and_generation()
            .await
            .ok_or(BookingError::NotAuthenticated)?;
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);

        let page = self.api.list_bookings(&token, status).await?;

        let current = self.session.generation().await;
        let mut cache = self.cache.write().await;
        if current != Some(generation) {
            tracing::debug!(ticket, "Dropping booking list of an ended session");
        } else if cache.generation != generation || ticket > cache.applied {
            tracing::debug!(ticket, count = page.data.len(), "Booking list replaced");
            cache.bookings = page.data;
            cache.applied = ticket;
            cache.generation = generation;
        } else {
            tracing::debug!(
                ticket,
                applied = cache.applied,
                "Dropping stale booking list response"
            );
        }
        Ok(cache.visible(current).to_vec())
    }

    /// Cancel a booking on the backend, then mark it cancelled locally.
    ///
    /// A booking the cache already knows to be completed or cancelled is
    /// rejected without a network call.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::NotCancellable`, `BookingError::NotAuthenticated`,
    /// or `BookingError::Api` when the backend refuses. The cache is unchanged
    /// on error.
    #[instrument(skip(self), fields(booking_id = %id))]
    pub async fn cancel_booking(&self, id: &BookingId) -> Result<Booking, BookingError> {
        if let Some(cached) = self.find(id).await
            && !cached.status.is_cancellable()
        {
            return Err(BookingError::NotCancellable {
                id: id.clone(),
                status: cached.status,
            });
        }

        let (token, generation) = self
            .session
            .token_and_generation()
            .await
            .ok_or(BookingError::NotAuthenticated)?;

        let mut confirmed = self.api.cancel_booking(&token, id).await?;
        confirmed.status = BookingStatus::Cancelled;

        let mut cache = self.cache.write().await;
        if cache.generation == generation
            && let Some(booking) = cache.bookings.iter_mut().find(|b| &b.id == id)
        {
            booking.status = BookingStatus::Cancelled;
        }
        tracing::info!("Booking cancelled");
        Ok(confirmed)
    }

    /// Cached bookings with the given status.
    pub async fn get_bookings_by_status(&self, status: BookingStatus) -> Vec<Booking> {
        let session = self.session.generation().await;
        self.cache
            .read()
            .await
            .visible(session)
            .iter()
            .filter(|b| b.status == status)
            .cloned()
            .collect()
    }

    /// Snapshot of the cache, empty when no session owns it.
    pub async fn bookings(&self) -> Vec<Booking> {
        let session = self.session.generation().await;
        self.cache.read().await.visible(session).to_vec()
    }

    pub async fn find(&self, id: &BookingId) -> Option<Booking> {
        let session = self.session.generation().await;
        self.cache
            .read()
            .await
            .visible(session)
            .iter()
            .find(|b| &b.id == id)
            .cloned()
    }
}
