//! Integration tests for submitting the cart.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use barberbook_core::{BookingStatus, Price, ShopId};
use barberbook_integration_tests::{FakeBackend, choice};
use barberbook_storefront::{ApiError, CheckoutError, Notice, NoticeLevel};
use serde_json::json;

fn shop() -> ShopId {
    ShopId::new("shop-1")
}

#[tokio::test]
async fn test_checkout_books_every_entry_and_clears_cart() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = backend.signed_in(dir.path()).await;

    app.stage(&shop(), choice("svc-cut", Some("barber-a"), 10))
        .await
        .unwrap();
    app.stage(&shop(), choice("svc-beard", None, 11))
        .await
        .unwrap();
    backend.clear_requests();

    let receipt = app.checkout(Some("  first visit  ")).await.unwrap();

    assert_eq!(receipt.created.len(), 2);
    assert_eq!(receipt.total_price, Price::new(120_000));
    assert_eq!(receipt.total_duration, 75);
    assert!(receipt.refreshed);
    assert!(
        receipt
            .created
            .iter()
            .all(|b| b.status == BookingStatus::Pending)
    );

    // One batch, then the list refresh, then nothing else.
    assert_eq!(
        backend.requests(),
        vec!["POST /bookings/multiple", "GET /bookings"]
    );
    assert!(app.cart().is_empty());
    assert_eq!(app.bookings().bookings().await.len(), 2);
    assert_eq!(backend.bookings().len(), 2);

    let notice = Notice::from(&receipt);
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.message, "Booking completed successfully!");
}

#[tokio::test]
async fn test_batch_is_sent_as_bare_array() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = backend.signed_in(dir.path()).await;

    app.stage(&shop(), choice("svc-cut", Some("barber-a"), 15))
        .await
        .unwrap();
    app.stage(&shop(), choice("svc-beard", None, 16))
        .await
        .unwrap();
    app.checkout(Some("  first visit  ")).await.unwrap();

    let body = backend.last_batch().unwrap();
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0],
        json!({
            "shopId": "shop-1",
            "barberId": "barber-a",
            "serviceId": "svc-cut",
            "date": "2026-05-02",
            "time": "15:00",
            "notes": "first visit"
        })
    );
    assert!(items[1].get("barberId").is_none());
    assert_eq!(items[1]["time"], "16:00");
}

#[tokio::test]
async fn test_cleared_cart_stays_cleared_after_restart() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();

    {
        let mut app = backend.signed_in(dir.path()).await;
        app.stage(&shop(), choice("svc-cut", None, 9)).await.unwrap();
        app.checkout(None).await.unwrap();
    }

    let app = backend.storefront(dir.path());
    assert!(app.cart().is_empty());
    assert!(app.auth().is_authenticated().await);
}

#[tokio::test]
async fn test_rejected_batch_keeps_cart() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = backend.signed_in(dir.path()).await;

    app.stage(&shop(), choice("svc-cut", Some("barber-b"), 10))
        .await
        .unwrap();
    app.stage(&shop(), choice("svc-beard", Some("barber-a"), 12))
        .await
        .unwrap();
    backend.fail_next(
        "POST /bookings/multiple",
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "code": "SLOT_TAKEN", "message": "That time is no longer available" }),
    );
    backend.clear_requests();

    let err = app.checkout(None).await.unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Api(ApiError::Server { status: 422, .. })
    ));
    let payload = err.payload();
    assert_eq!(payload.code, "SLOT_TAKEN");
    assert_eq!(payload.message, "That time is no longer available");

    assert_eq!(app.cart().len(), 2);
    assert_eq!(backend.requests(), vec!["POST /bookings/multiple"]);
    assert!(backend.bookings().is_empty());

    // The cart on disk survived too.
    drop(app);
    let app = backend.storefront(dir.path());
    assert_eq!(app.cart().len(), 2);
}

#[tokio::test]
async fn test_checkout_requires_session() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = backend.storefront(dir.path());

    app.stage(&shop(), choice("svc-cut", None, 10)).await.unwrap();
    backend.clear_requests();

    let err = app.checkout(None).await.unwrap_err();

    assert!(matches!(err, CheckoutError::NotAuthenticated));
    assert_eq!(err.payload().code, "NOT_AUTHENTICATED");
    assert!(backend.requests().is_empty());
    assert_eq!(app.cart().len(), 1);
}

#[tokio::test]
async fn test_empty_cart_makes_no_requests() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = backend.signed_in(dir.path()).await;
    backend.clear_requests();

    let err = app.checkout(None).await.unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(Notice::from(&err).message, "Cart is empty");
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_failed_refresh_still_clears_cart() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = backend.signed_in(dir.path()).await;

    app.stage(&shop(), choice("svc-cut", None, 14)).await.unwrap();
    backend.fail_next(
        "GET /bookings",
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "message": "database unavailable" }),
    );

    let receipt = app.checkout(None).await.unwrap();

    assert!(!receipt.refreshed);
    assert_eq!(receipt.created.len(), 1);
    assert!(app.cart().is_empty());
    assert_eq!(backend.bookings().len(), 1);
}

#[tokio::test]
async fn test_expired_session_keeps_cart() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = backend.signed_in(dir.path()).await;

    app.stage(&shop(), choice("svc-beard", None, 16)).await.unwrap();
    backend.revoke_sessions();

    let err = app.checkout(None).await.unwrap_err();

    assert!(matches!(err, CheckoutError::Api(ApiError::Unauthorized(_))));
    assert_eq!(err.payload().code, "UNAUTHORIZED");
    assert_eq!(app.cart().len(), 1);
}
