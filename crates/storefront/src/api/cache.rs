//! Cache types for catalog responses.

use barberbook_core::{Barbershop, Service, ShopId};

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Shop(ShopId),
    /// Unfiltered shop listing.
    Shops,
    Services(ShopId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Shop(Box<Barbershop>),
    Shops(Vec<Barbershop>),
    Services(Vec<Service>),
}
