//! Booking list and cancellation.

use barberbook_core::{BookingId, BookingStatus};
use barberbook_storefront::{AppError, Notice, Storefront};

use crate::output;

pub async fn list(app: &Storefront, status: Option<BookingStatus>) -> Result<(), AppError> {
    let bookings = app.bookings().fetch_bookings(status).await?;
    output::bookings(&bookings);
    Ok(())
}

pub async fn cancel(app: &Storefront, id: &BookingId) -> Result<(), AppError> {
    // A fresh list lets already-finished bookings be rejected locally.
    if let Err(e) = app.bookings().fetch_bookings(None).await {
        tracing::warn!(error = %e, "Could not refresh bookings before cancelling");
    }

    let cancelled = app.bookings().cancel_booking(id).await?;
    output::notice(&Notice::success(format!(
        "Cancelled {} at {} on {}",
        cancelled.service_name, cancelled.shop_name, cancelled.date
    )));
    Ok(())
}
