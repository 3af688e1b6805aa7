//! Checkout command.

use barberbook_storefront::{AppError, Notice, Storefront};

use crate::output;

pub async fn run(app: &mut Storefront, notes: Option<&str>) -> Result<(), AppError> {
    let receipt = app.checkout(notes).await?;

    output::notice(&Notice::from(&receipt));
    output::bookings(&receipt.created);
    output::notice(&Notice::info(format!(
        "Total: {}, {} min",
        receipt.total_price, receipt.total_duration
    )));
    if !receipt.refreshed {
        output::notice(&Notice::info(
            "Could not refresh your booking list; run `bb bookings list` to see it",
        ));
    }
    Ok(())
}
