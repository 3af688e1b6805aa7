//! BarberBook storefront client library.
//!
//! Holds the client-side state of the booking storefront: a local cart of
//! staged appointments, the server-sourced booking list, the session, and the
//! checkout flow that turns one into the other. Front ends (the `bb` CLI,
//! tests) drive it through [`Storefront`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notice;
pub mod persist;
pub mod state;
pub mod stores;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, ApiError, AuthApi, BookingsApi};
pub use checkout::{CheckoutCoordinator, CheckoutError, CheckoutReceipt};
pub use config::StorefrontConfig;
pub use error::{AppError, ErrorPayload};
pub use notice::{Notice, NoticeLevel};
pub use state::{BookingChoice, Storefront};
