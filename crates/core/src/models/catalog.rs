//! Read-only catalog records: barbershops, their services and barbers.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::types::{BarberId, Price, ServiceCategory, ServiceId, ShopId, ShopSortKey, TimeSlotId};

/// Daily opening hours of a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    /// Opening time (`HH:mm`).
    #[serde(with = "super::wire::hhmm")]
    pub open: NaiveTime,
    /// Closing time (`HH:mm`).
    #[serde(with = "super::wire::hhmm")]
    pub close: NaiveTime,
    /// Whether the shop is closed altogether.
    #[serde(default)]
    pub closed: bool,
}

impl WorkingHours {
    /// Whether an appointment starting at `time` falls inside opening hours.
    #[must_use]
    pub fn admits(&self, time: NaiveTime) -> bool {
        !self.closed && time >= self.open && time < self.close
    }
}

/// A bookable service offered by a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Duration in minutes.
    pub duration: u32,
    pub price: Price,
    #[serde(default)]
    pub category: ServiceCategory,
}

/// A barber working at a shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barber {
    pub id: BarberId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    /// Years of experience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// IDs of the services this barber performs.
    #[serde(default)]
    pub services: Vec<ServiceId>,
}

impl Barber {
    /// Whether this barber performs the given service.
    #[must_use]
    pub fn offers(&self, service: &ServiceId) -> bool {
        self.services.contains(service)
    }
}

/// A barbershop with its service menu and staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barbershop {
    pub id: ShopId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<WorkingHours>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub barbers: Vec<Barber>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl Barbershop {
    /// Look up one of this shop's services.
    #[must_use]
    pub fn service(&self, id: &ServiceId) -> Option<&Service> {
        self.services.iter().find(|s| &s.id == id)
    }

    /// Look up one of this shop's barbers.
    #[must_use]
    pub fn barber(&self, id: &BarberId) -> Option<&Barber> {
        self.barbers.iter().find(|b| &b.id == id)
    }

    /// Barbers able to perform `service`; every barber when no service is chosen.
    pub fn barbers_for<'a>(
        &'a self,
        service: Option<&'a ServiceId>,
    ) -> impl Iterator<Item = &'a Barber> + 'a {
        self.barbers
            .iter()
            .filter(move |b| service.is_none_or(|id| b.offers(id)))
    }
}

/// One bookable start time returned by the availability endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TimeSlotId>,
    #[serde(with = "super::wire::hhmm")]
    pub time: NaiveTime,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barber_id: Option<BarberId>,
}

impl TimeSlot {
    /// Keep only the open slots, optionally restricted to one barber.
    ///
    /// Slots without a barber are shop-wide and match any barber.
    #[must_use]
    pub fn available<'a>(slots: &'a [Self], barber: Option<&BarberId>) -> Vec<&'a Self> {
        slots
            .iter()
            .filter(|slot| slot.available)
            .filter(|slot| match (barber, &slot.barber_id) {
                (Some(wanted), Some(assigned)) => wanted == assigned,
                _ => true,
            })
            .collect()
    }
}

/// Filters for the barbershop listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<ShopSortKey>,
}

impl SearchFilters {
    /// Whether any filter is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.district.is_none()
            && self.service.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.sort_by.is_none()
    }
}
