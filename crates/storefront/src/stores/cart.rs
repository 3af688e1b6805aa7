//! Local cart of staged booking intents.
//!
//! The cart never talks to the network. Entries are kept in insertion order
//! and mirrored to the `cart-storage` key after every change.

use barberbook_core::{CartEntry, CartEntryId, CartEntryPatch, Price};

use crate::error::add_breadcrumb;
use crate::persist::{CART_KEY, DurableSlice, KeyValueStore};

/// Ordered, persisted list of cart entries.
#[derive(Debug)]
pub struct CartStore<S> {
    items: DurableSlice<Vec<CartEntry>, S>,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Load the cart persisted in `store`.
    pub fn load(store: S) -> Self {
        let items: DurableSlice<Vec<CartEntry>, S> = DurableSlice::load(store, CART_KEY);
        tracing::debug!(count = items.get().len(), "Cart loaded");
        Self { items }
    }

    /// Append an entry.
    ///
    /// Entries for the same shop and time are allowed; the backend decides
    /// conflicts at checkout.
    pub fn add_to_cart(&mut self, entry: CartEntry) {
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[
                ("shop_id", entry.shop.id.as_str()),
                ("service_id", entry.service_id.as_str()),
            ]),
        );
        self.items.update(|items| items.push(entry));
    }

    /// Remove the entry with `id`; no-op when absent.
    pub fn remove_from_cart(&mut self, id: &CartEntryId) {
        if self.find(id).is_none() {
            return;
        }
        add_breadcrumb("cart", "Removed from cart", Some(&[("entry_id", id.as_str())]));
        self.items.update(|items| items.retain(|entry| &entry.id != id));
    }

    /// Patch the entry with `id` in place; no-op when absent.
    ///
    /// Returns whether an entry was updated.
    pub fn update_cart_item(&mut self, id: &CartEntryId, patch: CartEntryPatch) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        self.items.update(|items| {
            if let Some(entry) = items.iter_mut().find(|entry| &entry.id == id) {
                entry.apply(patch);
            }
        });
        true
    }

    /// Empty the cart unconditionally.
    pub fn clear_cart(&mut self) {
        add_breadcrumb("cart", "Cleared cart", None);
        self.items.clear();
    }

    /// Sum of entry prices; zero for an empty cart.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.get().iter().map(|entry| entry.price).sum()
    }

    /// Sum of entry durations in minutes; zero for an empty cart.
    #[must_use]
    pub fn total_duration(&self) -> u32 {
        self.items
            .get()
            .iter()
            .fold(0_u32, |total, entry| total.saturating_add(entry.duration))
    }

    #[must_use]
    pub fn items(&self) -> &[CartEntry] {
        self.items.get()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.get().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.get().is_empty()
    }

    #[must_use]
    pub fn find(&self, id: &CartEntryId) -> Option<&CartEntry> {
        self.items.get().iter().find(|entry| &entry.id == id)
    }
}
