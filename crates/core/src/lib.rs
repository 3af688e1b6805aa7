//! Barberbook Core - Shared types library.
//!
//! This crate provides common types used across all Barberbook components:
//! - `storefront` - Booking client: REST API, cart, checkout, sessions
//! - `cli` - Terminal front end for browsing shops and booking appointments
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no persistence. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`models`] - Cart entries, booking requests, bookings, catalog records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
