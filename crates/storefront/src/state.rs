//! Client context wiring the stores together.

use chrono::{NaiveDate, NaiveTime};

use barberbook_core::{BarberId, CartEntry, Selection, ServiceId, ShopId};

use crate::api::ApiClient;
use crate::checkout::{CheckoutCoordinator, CheckoutError, CheckoutReceipt};
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::persist::FileStore;
use crate::stores::{AuthStore, BookingStore, CartStore};

/// What the user picked on a shop page.
#[derive(Debug, Clone)]
pub struct BookingChoice {
    pub service: ServiceId,
    pub barber: Option<BarberId>,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Everything a front end needs: configuration, the backend client and the
/// three stores.
///
/// Each store is owned once here. The booking store and checkout only see
/// the session through a read-only handle.
pub struct Storefront {
    config: StorefrontConfig,
    api: ApiClient,
    auth: AuthStore<ApiClient, FileStore>,
    bookings: BookingStore<ApiClient>,
    cart: CartStore<FileStore>,
}

impl Storefront {
    /// Build the context, restoring cart and session from the state directory.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if the HTTP client cannot be built, or
    /// `AppError::Persist` if the state directory cannot be created.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let api = ApiClient::new(&config)?;
        let store = FileStore::open(config.state_dir.clone())?;

        let auth = AuthStore::load(api.clone(), store.clone());
        let bookings = BookingStore::new(api.clone(), auth.reader());
        let cart = CartStore::load(store);

        Ok(Self {
            config,
            api,
            auth,
            bookings,
            cart,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Backend client, for catalog lookups.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthStore<ApiClient, FileStore> {
        &self.auth
    }

    #[must_use]
    pub const fn bookings(&self) -> &BookingStore<ApiClient> {
        &self.bookings
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore<FileStore> {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartStore<FileStore> {
        &mut self.cart
    }

    /// Look up the shop, validate the choice against it and stage it in the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if the shop cannot be loaded, or
    /// `AppError::Selection` if the service or barber does not fit the shop.
    pub async fn stage(&mut self, shop: &ShopId, choice: BookingChoice) -> Result<CartEntry, AppError> {
        let shop = self.api.get_shop(shop).await?;
        let entry = Selection::new(&shop)
            .service(choice.service)
            .barber(choice.barber)
            .date(choice.date)
            .time(choice.time)
            .into_entry()?;
        self.cart.add_to_cart(entry.clone());
        Ok(entry)
    }

    /// Submit the cart.
    ///
    /// # Errors
    ///
    /// See [`CheckoutCoordinator::checkout`].
    pub async fn checkout(&mut self, notes: Option<&str>) -> Result<CheckoutReceipt, CheckoutError> {
        CheckoutCoordinator::new(self.auth.reader(), &self.bookings)
            .checkout(&mut self.cart, notes)
            .await
    }
}
