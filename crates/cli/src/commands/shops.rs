//! Catalog browsing: shop listing, search, details and time slots.

use chrono::{Local, NaiveDate};

use barberbook_core::{
    BarberId, DEFAULT_BOOKING_WINDOW_DAYS, SearchFilters, ServiceId, ShopId, TimeSlot,
    booking_dates,
};
use barberbook_storefront::{AppError, Storefront};

use crate::output;

pub async fn list(app: &Storefront, filters: &SearchFilters) -> Result<(), AppError> {
    let shops = app.api().list_shops(filters).await?;
    output::shops(&shops);
    Ok(())
}

pub async fn search(app: &Storefront, query: &str, filters: &SearchFilters) -> Result<(), AppError> {
    let shops = app.api().search_shops(query, filters).await?;
    output::shops(&shops);
    Ok(())
}

pub async fn show(app: &Storefront, id: &ShopId) -> Result<(), AppError> {
    let shop = app.api().get_shop(id).await?;
    output::shop(&shop);
    Ok(())
}

/// Without a date, list the booking window; with one, list open slots.
pub async fn slots(
    app: &Storefront,
    shop: &ShopId,
    date: Option<NaiveDate>,
    service: Option<&ServiceId>,
    barber: Option<&BarberId>,
) -> Result<(), AppError> {
    let Some(date) = date else {
        let today = Local::now().date_naive();
        output::dates(&booking_dates(today, DEFAULT_BOOKING_WINDOW_DAYS));
        return Ok(());
    };

    let slots = app.api().time_slots(shop, date, service).await?;
    output::slots(date, &TimeSlot::available(&slots, barber));
    Ok(())
}
