//! Cart entries and the shop-page selection that produces them.

use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::Barbershop;
use crate::types::{BarberId, CartEntryId, Price, ServiceId, ShopId};

/// How many days ahead the date picker offers.
pub const DEFAULT_BOOKING_WINDOW_DAYS: u64 = 14;

/// Shop details copied into a cart entry for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSnapshot {
    pub id: ShopId,
    pub name: String,
    pub image: String,
    pub address: String,
}

impl From<&Barbershop> for ShopSnapshot {
    fn from(shop: &Barbershop) -> Self {
        Self {
            id: shop.id.clone(),
            name: shop.name.clone(),
            image: shop.image.clone(),
            address: shop.address.clone(),
        }
    }
}

/// A locally staged, unconfirmed booking intent.
///
/// Date and time are typed and mandatory, so every constructed entry is
/// eligible for checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub id: CartEntryId,
    pub shop: ShopSnapshot,
    pub service_id: ServiceId,
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barber_id: Option<BarberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barber_name: Option<String>,
    pub date: NaiveDate,
    #[serde(with = "super::wire::hhmm")]
    pub time: NaiveTime,
    pub price: Price,
    /// Duration in minutes.
    pub duration: u32,
}

/// Partial update applied to a cart entry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartEntryPatch {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    /// `Some(None)` removes the barber preference.
    pub barber: Option<Option<(BarberId, String)>>,
}

impl CartEntry {
    /// Apply a patch, leaving unspecified fields untouched.
    pub fn apply(&mut self, patch: CartEntryPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(time) = patch.time {
            self.time = time;
        }
        if let Some(barber) = patch.barber {
            let (id, name) = barber.unzip();
            self.barber_id = id;
            self.barber_name = name;
        }
    }
}

/// Why a selection cannot become a cart entry yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("please select a service")]
    MissingService,
    #[error("please select a date")]
    MissingDate,
    #[error("please select a time")]
    MissingTime,
    #[error("service {0} is not offered by this shop")]
    UnknownService(ServiceId),
    #[error("barber {0} does not work at this shop")]
    UnknownBarber(BarberId),
    #[error("barber {barber} does not perform service {service}")]
    BarberDoesNotOffer { barber: BarberId, service: ServiceId },
}

/// The in-progress choice on a shop page.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    shop: &'a Barbershop,
    service: Option<ServiceId>,
    barber: Option<BarberId>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
}

impl<'a> Selection<'a> {
    /// Start an empty selection for a shop.
    #[must_use]
    pub const fn new(shop: &'a Barbershop) -> Self {
        Self {
            shop,
            service: None,
            barber: None,
            date: None,
            time: None,
        }
    }

    /// Choose a service; drops the barber if they do not perform it.
    #[must_use]
    pub fn service(mut self, id: ServiceId) -> Self {
        let shop = self.shop;
        if let Some(current) = &self.barber
            && shop.barber(current).is_some_and(|b| !b.offers(&id))
        {
            self.barber = None;
        }
        self.service = Some(id);
        self
    }

    /// Choose a barber, or none for "any barber".
    #[must_use]
    pub fn barber(mut self, id: Option<BarberId>) -> Self {
        self.barber = id;
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Currently chosen barber, if still valid for the chosen service.
    #[must_use]
    pub const fn selected_barber(&self) -> Option<&BarberId> {
        self.barber.as_ref()
    }

    /// Turn the selection into a cart entry with a fresh local ID.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectionError`] when service, date or time is missing, or
    /// when the chosen service or barber does not belong to the shop.
    pub fn into_entry(self) -> Result<CartEntry, SelectionError> {
        let service_id = self.service.ok_or(SelectionError::MissingService)?;
        let date = self.date.ok_or(SelectionError::MissingDate)?;
        let time = self.time.ok_or(SelectionError::MissingTime)?;

        let service = self
            .shop
            .service(&service_id)
            .ok_or_else(|| SelectionError::UnknownService(service_id.clone()))?;

        let barber = match self.barber {
            Some(id) => {
                let barber = self
                    .shop
                    .barber(&id)
                    .ok_or_else(|| SelectionError::UnknownBarber(id.clone()))?;
                if !barber.offers(&service_id) {
                    return Err(SelectionError::BarberDoesNotOffer {
                        barber: id,
                        service: service_id,
                    });
                }
                Some(barber)
            }
            None => None,
        };

        Ok(CartEntry {
            id: CartEntryId::generate(),
            shop: ShopSnapshot::from(self.shop),
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            barber_id: barber.map(|b| b.id.clone()),
            barber_name: barber.map(|b| b.name.clone()),
            date,
            time,
            price: service.price,
            duration: service.duration,
        })
    }
}

/// Calendar dates offered for booking, starting with `today`.
#[must_use]
pub fn booking_dates(today: NaiveDate, days: u64) -> Vec<NaiveDate> {
    (0..days)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .collect()
}
