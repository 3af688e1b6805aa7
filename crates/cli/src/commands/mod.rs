//! Subcommand implementations.
//!
//! Each command runs one storefront operation and prints its outcome.

pub mod auth;
pub mod bookings;
pub mod cart;
pub mod checkout;
pub mod shops;
