//! Client-side state owners.
//!
//! - [`CartStore`]: staged booking intents, local only
//! - [`BookingStore`]: cached server bookings and cancellation
//! - [`AuthStore`]: the session, shared read-only through [`SessionReader`]

mod auth;
mod booking;
mod cart;

pub use auth::{AuthError, AuthState, AuthStore, SessionReader};
pub use booking::{BookingError, BookingStore};
pub use cart::CartStore;
