//! Shared fixtures and an in-memory backend double for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use secrecy::SecretString;
use tokio::sync::oneshot;

use barberbook_core::{
    Barbershop, Booking, BookingId, BookingRequest, BookingStatus, CartEntry, Price, Selection,
    User,
};

use crate::api::{
    ApiError, AuthApi, AuthResponse, BookingsApi, LoginRequest, Page, RegisterRequest,
};
use crate::persist::MemoryStore;
use crate::stores::AuthStore;

pub fn sample_shop() -> Barbershop {
    serde_json::from_value(serde_json::json!({
        "id": "shop-1",
        "name": "Chilonzor Barbers",
        "address": "Bunyodkor 12, Tashkent",
        "image": "https://cdn.example.uz/shop-1.jpg",
        "services": [
            { "id": "svc-cut", "name": "Haircut", "duration": 30, "price": 50000 },
            { "id": "svc-beard", "name": "Beard trim", "duration": 45, "price": 70000 }
        ],
        "barbers": [
            { "id": "barber-a", "name": "Jasur", "services": ["svc-cut", "svc-beard"] },
            { "id": "barber-b", "name": "Otabek", "services": ["svc-cut"] }
        ]
    }))
    .unwrap()
}

pub fn hm(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

/// Cart entry for `service` at `hour`:00 on 2026-05-02.
pub fn entry(service: &str, hour: u32) -> CartEntry {
    let shop = sample_shop();
    Selection::new(&shop)
        .service(service.into())
        .date(NaiveDate::from_ymd_opt(2026, 5, 2).unwrap())
        .time(hm(hour))
        .into_entry()
        .unwrap()
}

pub fn user() -> User {
    serde_json::from_value(serde_json::json!({
        "id": "user-1",
        "name": "Aziz Karimov",
        "email": "client@barber.uz",
        "phone": "+998901234567"
    }))
    .unwrap()
}

pub fn booking(id: &str, status: BookingStatus) -> Booking {
    Booking {
        id: BookingId::new(id),
        shop_id: "shop-1".into(),
        shop_name: "Chilonzor Barbers".to_string(),
        barber_id: None,
        barber_name: None,
        service_id: "svc-cut".into(),
        service_name: "Haircut".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
        time: hm(10),
        duration: 30,
        price: Price::new(50_000),
        status,
        created_at: Utc.with_ymd_and_hms(2026, 4, 30, 8, 0, 0).unwrap(),
    }
}

/// Auth store already logged in against `backend`.
pub async fn logged_in(backend: &MockBackend) -> AuthStore<MockBackend, MemoryStore> {
    let auth = AuthStore::load(backend.clone(), MemoryStore::new());
    auth.login("client@barber.uz", SecretString::from("hunter22"))
        .await
        .unwrap();
    auth
}

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login,
    Register,
    Logout,
    CurrentUser,
    CreateMultiple(Vec<BookingRequest>),
    ListBookings(Option<BookingStatus>),
    CancelBooking(BookingId),
}

/// Endpoint selector for injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Register,
    Logout,
    CurrentUser,
    CreateMultiple,
    ListBookings,
    CancelBooking,
}

type Gate = (oneshot::Sender<()>, oneshot::Receiver<()>);

/// In-memory backend that records calls and fails on request.
#[derive(Clone, Default)]
pub struct MockBackend {
    inner: Arc<MockInner>,
}

#[derive(Default)]
struct MockInner {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Endpoint, ApiError>>,
    bookings: Mutex<Vec<Booking>>,
    gates: Mutex<VecDeque<Gate>>,
    next_id: AtomicU64,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.inner.calls.lock().unwrap().clear();
    }

    /// Make the next call to `endpoint` fail with `error`.
    pub fn fail_next(&self, endpoint: Endpoint, error: ApiError) {
        self.inner.failures.lock().unwrap().insert(endpoint, error);
    }

    pub fn seed_bookings(&self, bookings: Vec<Booking>) {
        *self.inner.bookings.lock().unwrap() = bookings;
    }

    pub fn server_bookings(&self) -> Vec<Booking> {
        self.inner.bookings.lock().unwrap().clone()
    }

    /// Stall the next list call after it has read its data.
    ///
    /// Returns the release handle and a receiver that fires once the call is
    /// stalled.
    pub fn gate_next_list(&self) -> (oneshot::Sender<()>, oneshot::Receiver<()>) {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.inner
            .gates
            .lock()
            .unwrap()
            .push_back((entered_tx, release_rx));
        (release_tx, entered_rx)
    }

    pub fn server_error(status: u16) -> ApiError {
        ApiError::Server {
            status,
            code: "SERVER_ERROR".to_string(),
            message: "Something went wrong".to_string(),
        }
    }

    fn record(&self, call: Call, endpoint: Endpoint) -> Result<(), ApiError> {
        self.inner.calls.lock().unwrap().push(call);
        self.inner
            .failures
            .lock()
            .unwrap()
            .remove(&endpoint)
            .map_or(Ok(()), Err)
    }
}

impl AuthApi for MockBackend {
    async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.record(Call::Login, Endpoint::Login)?;
        Ok(AuthResponse {
            token: "token-1".to_string(),
            user: user(),
        })
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.record(Call::Register, Endpoint::Register)?;
        Ok(AuthResponse {
            token: "token-2".to_string(),
            user: User {
                id: "user-2".into(),
                name: request.name.clone(),
                email: request.email.clone(),
                phone: request.phone.clone(),
                avatar: None,
            },
        })
    }

    async fn logout(&self, _token: &SecretString) -> Result<(), ApiError> {
        self.record(Call::Logout, Endpoint::Logout)
    }

    async fn current_user(&self, _token: &SecretString) -> Result<User, ApiError> {
        self.record(Call::CurrentUser, Endpoint::CurrentUser)?;
        Ok(user())
    }
}

impl BookingsApi for MockBackend {
    async fn create_multiple(
        &self,
        _token: &SecretString,
        requests: &[BookingRequest],
    ) -> Result<Vec<Booking>, ApiError> {
        self.record(
            Call::CreateMultiple(requests.to_vec()),
            Endpoint::CreateMultiple,
        )?;

        let created: Vec<Booking> = requests
            .iter()
            .map(|request| {
                let n = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
                let mut created = booking(&format!("new-{n}"), BookingStatus::Pending);
                created.shop_id = request.shop_id.clone();
                created.service_id = request.service_id.clone();
                created.barber_id = request.barber_id.clone();
                created.date = request.date;
                created.time = request.time;
                created
            })
            .collect();

        self.inner
            .bookings
            .lock()
            .unwrap()
            .extend(created.iter().cloned());
        Ok(created)
    }

    async fn list_bookings(
        &self,
        _token: &SecretString,
        status: Option<BookingStatus>,
    ) -> Result<Page<Booking>, ApiError> {
        self.record(Call::ListBookings(status), Endpoint::ListBookings)?;

        let data: Vec<Booking> = self
            .server_bookings()
            .into_iter()
            .filter(|b| status.is_none_or(|s| b.status == s))
            .collect();

        let gate = self.inner.gates.lock().unwrap().pop_front();
        if let Some((entered, release)) = gate {
            let _ = entered.send(());
            let _ = release.await;
        }

        Ok(Page::of(data))
    }

    async fn cancel_booking(&self, _token: &SecretString, id: &BookingId) -> Result<Booking, ApiError> {
        self.record(Call::CancelBooking(id.clone()), Endpoint::CancelBooking)?;

        let mut bookings = self.inner.bookings.lock().unwrap();
        let found = bookings.iter_mut().find(|b| &b.id == id).ok_or_else(|| {
            ApiError::Server {
                status: 404,
                code: "NOT_FOUND".to_string(),
                message: "Booking not found".to_string(),
            }
        })?;
        found.status = BookingStatus::Cancelled;
        Ok(found.clone())
    }
}
