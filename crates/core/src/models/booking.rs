//! Booking requests and server-confirmed bookings.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartEntry;
use crate::types::{BarberId, BookingId, BookingStatus, Price, ServiceId, ShopId};

/// Wire request to create one booking, derived from a cart entry at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub shop_id: ShopId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barber_id: Option<BarberId>,
    pub service_id: ServiceId,
    pub date: NaiveDate,
    #[serde(with = "super::wire::hhmm")]
    pub time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BookingRequest {
    /// Attach free-form notes for the barber; blank notes are dropped.
    #[must_use]
    pub fn with_notes(mut self, notes: Option<&str>) -> Self {
        self.notes = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned);
        self
    }
}

impl From<&CartEntry> for BookingRequest {
    fn from(entry: &CartEntry) -> Self {
        Self {
            shop_id: entry.shop.id.clone(),
            barber_id: entry.barber_id.clone(),
            service_id: entry.service_id.clone(),
            date: entry.date,
            time: entry.time,
            notes: None,
        }
    }
}

/// An appointment as confirmed by the backend.
///
/// Status changes only arrive through server responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    #[serde(rename = "barbershopId", alias = "shopId")]
    pub shop_id: ShopId,
    #[serde(rename = "barbershopName", alias = "shopName")]
    pub shop_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barber_id: Option<BarberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barber_name: Option<String>,
    pub service_id: ServiceId,
    pub service_name: String,
    pub date: NaiveDate,
    #[serde(with = "super::wire::hhmm")]
    pub time: NaiveTime,
    /// Duration in minutes.
    pub duration: u32,
    pub price: Price,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}
