//! Domain models shared by the storefront client and its front ends.
//!
//! Wire shapes follow the booking backend: camelCase field names, ISO
//! calendar dates (`YYYY-MM-DD`) and `HH:mm` times of day.

pub mod booking;
pub mod cart;
pub mod catalog;
pub mod user;
pub mod wire;

pub use booking::{Booking, BookingRequest};
pub use cart::{
    CartEntry, CartEntryPatch, DEFAULT_BOOKING_WINDOW_DAYS, Selection, SelectionError,
    ShopSnapshot, booking_dates,
};
pub use catalog::{Barber, Barbershop, SearchFilters, Service, TimeSlot, WorkingHours};
pub use user::User;
