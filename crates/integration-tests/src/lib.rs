//! Integration tests for Barberbook.
//!
//! The tests drive the real [`ApiClient`](barberbook_storefront::ApiClient)
//! and stores over HTTP against [`FakeBackend`], an in-process `axum` server
//! that implements the booking REST contract on an ephemeral port.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p barberbook-integration-tests
//! ```
//!
//! # Fake backend
//!
//! ```text
//! POST /api/auth/login | /api/auth/register | /api/auth/logout
//! GET  /api/auth/me
//! GET  /api/barbershops | /api/barbershops/search | /api/barbershops/{id}
//! GET  /api/services?barbershopId=
//! GET  /api/bookings/time-slots
//! POST /api/bookings/multiple
//! GET  /api/bookings
//! POST /api/bookings/{id}/cancel
//! ```
//!
//! Seed data: shop `shop-1` with services `svc-cut` (30 min, 50 000 UZS) and
//! `svc-beard` (45 min, 70 000 UZS), shop `shop-2` in Samarkand, and the
//! account `client@barber.uz` / `hunter22`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path as UrlPath, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use secrecy::SecretString;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use barberbook_core::{
    Barbershop, Booking, BookingId, BookingRequest, BookingStatus, TimeSlot, User,
};
use barberbook_storefront::{BookingChoice, Storefront, StorefrontConfig};

/// Password of the seeded account.
pub const SEED_PASSWORD: &str = "hunter22";

/// Email of the seeded account.
pub const SEED_EMAIL: &str = "client@barber.uz";

// =============================================================================
// FakeBackend
// =============================================================================

/// A running fake booking backend.
pub struct FakeBackend {
    base_url: String,
    state: FakeState,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Start a server with the seed data on `127.0.0.1:0`.
    pub async fn start() -> Self {
        let state = FakeState::seeded();
        let app = router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Fake backend has no address");

        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Fake backend crashed");
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
            server,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client configuration pointing at this backend, persisting into `state_dir`.
    #[must_use]
    pub fn config(&self, state_dir: &Path) -> StorefrontConfig {
        let mut config =
            StorefrontConfig::for_api_url(&self.base_url).expect("Fake backend URL is valid");
        config.state_dir = state_dir.to_path_buf();
        config
    }

    /// A fresh storefront context talking to this backend.
    #[must_use]
    pub fn storefront(&self, state_dir: &Path) -> Storefront {
        Storefront::new(self.config(state_dir)).expect("Failed to build storefront")
    }

    /// A storefront with the seeded account logged in.
    pub async fn signed_in(&self, state_dir: &Path) -> Storefront {
        let app = self.storefront(state_dir);
        app.auth()
            .login(SEED_EMAIL, SecretString::from(SEED_PASSWORD.to_string()))
            .await
            .expect("Seed login failed");
        app
    }

    /// Requests received so far, as `"METHOD /path"` without the `/api` prefix.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().requests.clone()
    }

    /// Number of received requests matching `"METHOD /path"`.
    #[must_use]
    pub fn count(&self, request: &str) -> usize {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.as_str() == request)
            .count()
    }

    pub fn clear_requests(&self) {
        self.state.lock().requests.clear();
    }

    /// Bookings as stored on the server.
    #[must_use]
    pub fn bookings(&self) -> Vec<Booking> {
        self.state.lock().bookings.clone()
    }

    /// Raw JSON body of the last `POST /bookings/multiple`.
    #[must_use]
    pub fn last_batch(&self) -> Option<Value> {
        self.state.lock().last_batch.clone()
    }

    /// Overwrite a booking's status server-side.
    pub fn set_status(&self, id: &str, status: BookingStatus) {
        let mut data = self.state.lock();
        if let Some(booking) = data.bookings.iter_mut().find(|b| b.id.as_str() == id) {
            booking.status = status;
        }
    }

    /// Forget every issued token, as if sessions expired.
    pub fn revoke_sessions(&self) {
        self.state.lock().tokens.clear();
    }

    /// Answer the next request to `route` (`"METHOD /path"`) with an error.
    pub fn fail_next(&self, route: &str, status: StatusCode, body: Value) {
        self.state
            .lock()
            .failures
            .insert(route.to_string(), (status, body));
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// The day every test books on.
#[must_use]
pub fn booking_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 2).expect("valid date")
}

/// A cart choice at `hour:00` on [`booking_day`].
#[must_use]
pub fn choice(service: &str, barber: Option<&str>, hour: u32) -> BookingChoice {
    BookingChoice {
        service: service.into(),
        barber: barber.map(Into::into),
        date: booking_day(),
        time: NaiveTime::from_hms_opt(hour, 0, 0).expect("valid hour"),
    }
}

// =============================================================================
// State
// =============================================================================

#[derive(Clone)]
struct FakeState {
    inner: Arc<Mutex<FakeData>>,
}

struct Account {
    user: User,
    password: String,
}

struct FakeData {
    shops: Vec<Barbershop>,
    slots: Vec<TimeSlot>,
    accounts: Vec<Account>,
    tokens: HashMap<String, usize>,
    bookings: Vec<Booking>,
    requests: Vec<String>,
    failures: HashMap<String, (StatusCode, Value)>,
    last_batch: Option<Value>,
    next_id: u64,
}

impl FakeState {
    fn seeded() -> Self {
        let shops: Vec<Barbershop> = serde_json::from_value(json!([
            {
                "id": "shop-1",
                "name": "Chilonzor Barbers",
                "address": "Bunyodkor 12",
                "city": "Tashkent",
                "district": "Chilonzor",
                "image": "https://cdn.barberbook.uz/shop-1.jpg",
                "workingHours": { "open": "09:00", "close": "21:00" },
                "services": [
                    { "id": "svc-cut", "name": "Haircut", "duration": 30, "price": 50000, "category": "haircut" },
                    { "id": "svc-beard", "name": "Beard trim", "duration": 45, "price": 70000, "category": "beard" }
                ],
                "barbers": [
                    { "id": "barber-a", "name": "Jasur", "services": ["svc-cut", "svc-beard"] },
                    { "id": "barber-b", "name": "Otabek", "services": ["svc-cut"] }
                ]
            },
            {
                "id": "shop-2",
                "name": "Registan Cuts",
                "address": "Registan 3",
                "city": "Samarkand",
                "services": [
                    { "id": "svc-kids", "name": "Kids cut", "duration": 20, "price": 35000 }
                ],
                "barbers": []
            }
        ]))
        .expect("Seed shops are valid");

        let slots: Vec<TimeSlot> = serde_json::from_value(json!([
            { "time": "09:00", "available": true },
            { "time": "09:30", "available": false },
            { "time": "10:00", "available": true, "barberId": "barber-a" },
            { "time": "10:30", "available": true, "barberId": "barber-b" }
        ]))
        .expect("Seed slots are valid");

        let user: User = serde_json::from_value(json!({
            "id": "user-1",
            "name": "Aziz Karimov",
            "email": SEED_EMAIL,
            "phone": "+998901234567"
        }))
        .expect("Seed user is valid");

        Self {
            inner: Arc::new(Mutex::new(FakeData {
                shops,
                slots,
                accounts: vec![Account {
                    user,
                    password: SEED_PASSWORD.to_string(),
                }],
                tokens: HashMap::new(),
                bookings: Vec::new(),
                requests: Vec::new(),
                failures: HashMap::new(),
                last_batch: None,
                next_id: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeData> {
        self.inner.lock().expect("Fake backend state poisoned")
    }
}

impl FakeData {
    fn issue_token(&mut self, account: usize) -> String {
        self.next_id += 1;
        let token = format!("tok-{}", self.next_id);
        self.tokens.insert(token.clone(), account);
        token
    }

    fn account_for(&self, headers: &HeaderMap) -> Result<usize, Failure> {
        bearer(headers)
            .and_then(|token| self.tokens.get(token).copied())
            .ok_or_else(|| Failure::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Not logged in"))
    }

    fn user(&self, account: usize) -> Result<User, Failure> {
        self.accounts
            .get(account)
            .map(|a| a.user.clone())
            .ok_or_else(|| Failure::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Unknown account"))
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}


// =============================================================================
// Router
// =============================================================================

struct Failure(StatusCode, Value);

impl Failure {
    fn new(status: StatusCode, code: &str, message: &str) -> Self {
        Self(status, json!({ "code": code, "message": message }))
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

type Answer<T> = Result<Json<T>, Failure>;

fn router(state: FakeState) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/barbershops", get(list_shops))
        .route("/barbershops/search", get(search_shops))
        .route("/barbershops/{id}", get(get_shop))
        .route("/services", get(list_services))
        .route("/bookings", get(list_bookings))
        .route("/bookings/multiple", post(create_multiple))
        .route("/bookings/time-slots", get(time_slots))
        .route("/bookings/{id}/cancel", post(cancel_booking))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state);

    Router::new().nest("/api", api)
}

/// Log every request and serve injected failures.
async fn record(State(state): State<FakeState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    let key = format!("{} {}", request.method(), path.strip_prefix("/api").unwrap_or(path));
    let injected = {
        let mut data = state.lock();
        data.requests.push(key.clone());
        data.failures.remove(&key)
    };
    match injected {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => next.run(request).await,
    }
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(State(state): State<FakeState>, Json(body): Json<Credentials>) -> Answer<Value> {
    let mut data = state.lock();
    let account = data
        .accounts
        .iter()
        .position(|a| a.user.email.as_str() == body.email && a.password == body.password)
        .ok_or_else(|| {
            Failure::new(
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password",
            )
        })?;
    let token = data.issue_token(account);
    let user = data.user(account)?;
    Ok(Json(json!({ "token": token, "user": user })))
}

#[derive(Deserialize)]
struct Registration {
    name: String,
    email: String,
    phone: String,
    password: String,
}

async fn register(State(state): State<FakeState>, Json(body): Json<Registration>) -> Answer<Value> {
    let mut data = state.lock();
    if data.accounts.iter().any(|a| a.user.email.as_str() == body.email) {
        return Err(Failure::new(
            StatusCode::CONFLICT,
            "EMAIL_TAKEN",
            "An account with this email already exists",
        ));
    }

    let user: User = serde_json::from_value(json!({
        "id": format!("user-{}", data.accounts.len() + 1),
        "name": body.name,
        "email": body.email,
        "phone": body.phone,
    }))
    .map_err(|e| Failure::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", &e.to_string()))?;

    data.accounts.push(Account {
        user: user.clone(),
        password: body.password,
    });
    let account = data.accounts.len() - 1;
    let token = data.issue_token(account);
    Ok(Json(json!({ "token": token, "user": user })))
}

async fn logout(State(state): State<FakeState>, headers: HeaderMap) -> Result<StatusCode, Failure> {
    let mut data = state.lock();
    data.account_for(&headers)?;
    if let Some(token) = bearer(&headers) {
        data.tokens.remove(token);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn me(State(state): State<FakeState>, headers: HeaderMap) -> Answer<User> {
    let data = state.lock();
    let account = data.account_for(&headers)?;
    data.user(account).map(Json)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShopQuery {
    q: Option<String>,
    city: Option<String>,
    max_price: Option<u64>,
}

impl ShopQuery {
    fn matches(&self, shop: &Barbershop) -> bool {
        let text = self.q.as_deref().map(str::to_lowercase);
        text.is_none_or(|q| {
            shop.name.to_lowercase().contains(&q) || shop.address.to_lowercase().contains(&q)
        }) && self.city.as_ref().is_none_or(|city| &shop.city == city)
            && self
                .max_price
                .is_none_or(|max| shop.services.iter().any(|s| s.price.amount() <= max))
    }
}

async fn list_shops(State(state): State<FakeState>, Query(query): Query<ShopQuery>) -> Json<Value> {
    let data = state.lock();
    let shops: Vec<&Barbershop> = data.shops.iter().filter(|s| query.matches(s)).collect();
    Json(json!({ "data": shops, "total": shops.len(), "page": 1, "limit": 20 }))
}

async fn search_shops(
    State(state): State<FakeState>,
    Query(query): Query<ShopQuery>,
) -> Json<Vec<Barbershop>> {
    let data = state.lock();
    Json(
        data.shops
            .iter()
            .filter(|s| query.matches(s))
            .cloned()
            .collect(),
    )
}

async fn get_shop(State(state): State<FakeState>, UrlPath(id): UrlPath<String>) -> Answer<Barbershop> {
    let data = state.lock();
    data.shops
        .iter()
        .find(|s| s.id.as_str() == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Barbershop not found"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceQuery {
    barbershop_id: String,
}

async fn list_services(
    State(state): State<FakeState>,
    Query(query): Query<ServiceQuery>,
) -> Json<Value> {
    let data = state.lock();
    let services = data
        .shops
        .iter()
        .find(|s| s.id.as_str() == query.barbershop_id)
        .map(|s| s.services.clone())
        .unwrap_or_default();
    Json(json!(services))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlotQuery {
    barbershop_id: String,
    date: String,
    service_id: Option<String>,
}

async fn time_slots(State(state): State<FakeState>, Query(query): Query<SlotQuery>) -> Answer<Vec<TimeSlot>> {
    let data = state.lock();
    let shop = data
        .shops
        .iter()
        .find(|s| s.id.as_str() == query.barbershop_id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Barbershop not found"))?;
    if query.date.parse::<chrono::NaiveDate>().is_err() {
        return Err(Failure::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Invalid date"));
    }
    if let Some(service) = &query.service_id
        && shop.service(&service.as_str().into()).is_none()
    {
        return Err(Failure::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Unknown service"));
    }
    Ok(Json(data.slots.clone()))
}

/// All-or-nothing: one invalid request rejects the whole batch.
///
/// The body is a bare array of booking requests.
async fn create_multiple(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(raw): Json<Value>,
) -> Answer<Vec<Booking>> {
    let mut data = state.lock();
    data.account_for(&headers)?;
    data.last_batch = Some(raw.clone());
    let requests: Vec<BookingRequest> = serde_json::from_value(raw).map_err(|e| {
        Failure::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", &e.to_string())
    })?;
    if requests.is_empty() {
        return Err(Failure::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "No bookings"));
    }

    let mut created = Vec::with_capacity(requests.len());
    for request in &requests {
        let shop = data
            .shops
            .iter()
            .find(|s| s.id == request.shop_id)
            .ok_or_else(|| Failure::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Unknown shop"))?;
        let service = shop.service(&request.service_id).ok_or_else(|| {
            Failure::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Unknown service")
        })?;
        let barber_name = match &request.barber_id {
            Some(id) => Some(
                shop.barber(id)
                    .ok_or_else(|| {
                        Failure::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Unknown barber")
                    })?
                    .name
                    .clone(),
            ),
            None => None,
        };

        created.push(Booking {
            id: BookingId::new(String::new()),
            shop_id: shop.id.clone(),
            shop_name: shop.name.clone(),
            barber_id: request.barber_id.clone(),
            barber_name,
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            date: request.date,
            time: request.time,
            duration: service.duration,
            price: service.price,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        });
    }

    for booking in &mut created {
        data.next_id += 1;
        booking.id = BookingId::new(format!("bk-{}", data.next_id));
    }
    data.bookings.extend(created.iter().cloned());
    Ok(Json(created))
}

#[derive(Deserialize)]
struct BookingQuery {
    status: Option<BookingStatus>,
}

async fn list_bookings(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Value>, Failure> {
    let data = state.lock();
    data.account_for(&headers)?;
    let bookings: Vec<&Booking> = data
        .bookings
        .iter()
        .filter(|b| query.status.is_none_or(|s| b.status == s))
        .collect();
    Ok(Json(
        json!({ "data": bookings, "total": bookings.len(), "page": 1, "limit": 50 }),
    ))
}

async fn cancel_booking(
    State(state): State<FakeState>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<String>,
) -> Answer<Booking> {
    let mut data = state.lock();
    data.account_for(&headers)?;
    let booking = data
        .bookings
        .iter_mut()
        .find(|b| b.id.as_str() == id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Booking not found"))?;
    if !booking.status.is_cancellable() {
        return Err(Failure::new(
            StatusCode::CONFLICT,
            "NOT_CANCELLABLE",
            "This booking can no longer be cancelled",
        ));
    }
    booking.status = BookingStatus::Cancelled;
    Ok(Json(booking.clone()))
}
