//! Integration tests for listing and cancelling bookings.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use barberbook_core::{BookingId, BookingStatus, ShopId};
use barberbook_integration_tests::{FakeBackend, choice};
use barberbook_storefront::stores::BookingError;
use barberbook_storefront::{ApiError, Storefront};

/// Book two appointments and return their ids.
async fn book_two(backend: &FakeBackend, app: &mut Storefront) -> (BookingId, BookingId) {
    let shop = ShopId::new("shop-1");
    app.stage(&shop, choice("svc-cut", None, 10)).await.unwrap();
    app.stage(&shop, choice("svc-beard", Some("barber-a"), 12))
        .await
        .unwrap();
    let receipt = app.checkout(None).await.unwrap();
    backend.clear_requests();
    (receipt.created[0].id.clone(), receipt.created[1].id.clone())
}

#[tokio::test]
async fn test_fetch_filters_by_status() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = backend.signed_in(dir.path()).await;
    let (first, second) = book_two(&backend, &mut app).await;

    backend.set_status(second.as_str(), BookingStatus::Confirmed);

    let confirmed = app
        .bookings()
        .fetch_bookings(Some(BookingStatus::Confirmed))
        .await
        .unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, second);

    let all = app.bookings().fetch_bookings(None).await.unwrap();
    assert_eq!(all.len(), 2);
    let pending = app
        .bookings()
        .get_bookings_by_status(BookingStatus::Pending)
        .await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, first);
}

#[tokio::test]
async fn test_fetch_requires_session() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let app = backend.storefront(dir.path());

    let err = app.bookings().fetch_bookings(None).await.unwrap_err();

    assert!(matches!(err, BookingError::NotAuthenticated));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_cancel_updates_backend_and_cache() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = backend.signed_in(dir.path()).await;
    let (first, second) = book_two(&backend, &mut app).await;

    let cancelled = app.bookings().cancel_booking(&first).await.unwrap();

    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(
        app.bookings().find(&first).await.unwrap().status,
        BookingStatus::Cancelled
    );
    assert_eq!(
        app.bookings().find(&second).await.unwrap().status,
        BookingStatus::Pending
    );
    let on_server = backend.bookings();
    assert_eq!(
        on_server.iter().find(|b| b.id == first).unwrap().status,
        BookingStatus::Cancelled
    );
    assert_eq!(
        backend.requests(),
        vec![format!("POST /bookings/{first}/cancel")]
    );
}

#[tokio::test]
async fn test_finished_booking_is_rejected_locally() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = backend.signed_in(dir.path()).await;
    let (first, _) = book_two(&backend, &mut app).await;

    backend.set_status(first.as_str(), BookingStatus::Completed);
    app.bookings().fetch_bookings(None).await.unwrap();
    backend.clear_requests();

    let err = app.bookings().cancel_booking(&first).await.unwrap_err();

    assert!(matches!(
        err,
        BookingError::NotCancellable {
            status: BookingStatus::Completed,
            ..
        }
    ));
    assert_eq!(err.payload().code, "NOT_CANCELLABLE");
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_backend_refusal_leaves_cache_alone() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = backend.signed_in(dir.path()).await;
    let (first, _) = book_two(&backend, &mut app).await;

    // The cache still believes the booking is pending.
    backend.set_status(first.as_str(), BookingStatus::Completed);

    let err = app.bookings().cancel_booking(&first).await.unwrap_err();

    assert!(matches!(
        err,
        BookingError::Api(ApiError::Server { status: 409, .. })
    ));
    assert_eq!(err.payload().code, "NOT_CANCELLABLE");
    assert_eq!(
        app.bookings().find(&first).await.unwrap().status,
        BookingStatus::Pending
    );
}

#[tokio::test]
async fn test_unknown_booking_is_not_found() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let app = backend.signed_in(dir.path()).await;

    let err = app
        .bookings()
        .cancel_booking(&BookingId::new("bk-missing"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BookingError::Api(ApiError::Server { status: 404, .. })
    ));
    assert_eq!(err.payload().code, "NOT_FOUND");
}

#[tokio::test]
async fn test_logout_clears_visible_bookings() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = backend.signed_in(dir.path()).await;
    book_two(&backend, &mut app).await;
    assert_eq!(app.bookings().fetch_bookings(None).await.unwrap().len(), 2);

    app.auth().logout().await.unwrap();

    assert!(app.bookings().bookings().await.is_empty());
    assert!(matches!(
        app.bookings().fetch_bookings(None).await.unwrap_err(),
        BookingError::NotAuthenticated
    ));
}

#[tokio::test]
async fn test_expired_session_hides_bookings_after_refresh() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut app = backend.signed_in(dir.path()).await;
    book_two(&backend, &mut app).await;

    backend.revoke_sessions();
    assert!(app.auth().refresh_session().await.unwrap().is_none());

    assert!(app.bookings().bookings().await.is_empty());
}
