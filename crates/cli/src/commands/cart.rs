//! Local cart commands. Only `add` touches the network, to validate the
//! choice against the shop.

use barberbook_core::{CartEntryId, ShopId};
use barberbook_storefront::{AppError, BookingChoice, Notice, Storefront};

use crate::output;

pub async fn add(app: &mut Storefront, shop: &ShopId, choice: BookingChoice) -> Result<(), AppError> {
    let entry = app.stage(shop, choice).await?;
    output::notice(&Notice::success(format!(
        "Added {} at {} to cart",
        entry.service_name, entry.shop.name
    )));
    output::cart_entry(&entry);
    Ok(())
}

pub fn list(app: &Storefront) {
    let cart = app.cart();
    output::cart(cart.items(), cart.total_price(), cart.total_duration());
}

pub fn remove(app: &mut Storefront, id: &CartEntryId) -> Result<(), AppError> {
    if app.cart().find(id).is_none() {
        return Err(AppError::NotFound(format!("Cart entry {id}")));
    }
    app.cart_mut().remove_from_cart(id);
    output::notice(&Notice::success("Removed from cart"));
    Ok(())
}

pub fn clear(app: &mut Storefront) {
    app.cart_mut().clear_cart();
    output::notice(&Notice::success("Cart cleared"));
}
