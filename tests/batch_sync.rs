mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::{field, store_with, test_config, FakeCarrier, Scripted, HOME, HOME_WITH_CAPTCHA};
use shipment_sync::clients::OrderStore;
use shipment_sync::services::{CarrierSession, ReconcileWriter};
use shipment_sync::{App, AppError, BatchProcessor, LifecycleStatus, OrderFlow, OrderRef, QueryError, StatusOutcome};
use tokio_test::{assert_err, assert_ok};

fn app(carrier: FakeCarrier, store: Arc<shipment_sync::MemoryOrderStore>, k: usize) -> App {
    let store: Arc<dyn OrderStore> = store;
    App::with_parts(test_config(k), Arc::new(carrier), Some(store))
}

#[tokio::test]
async fn test_delivered_in_transit_and_timeout_batch() {
    let carrier = FakeCarrier::new(HOME)
        .page("A", "<div>貨態：已送達門市</div>")
        .page("B", "<div>處理中</div>")
        .script("C", Scripted::Hang);
    let stats = carrier.stats.clone();
    let store = store_with(&["A", "B", "C"]).await;

    let report = assert_ok!(app(carrier, store.clone(), 5).run_batch(None).await);

    assert_eq!(report.total_count, 3);
    assert_eq!(report.updated_count, 2);
    assert_eq!(report.failed, 1);

    let outcomes: Vec<_> = report.details.iter().map(|e| e.outcome.clone()).collect();
    assert_eq!(
        outcomes,
        vec![StatusOutcome::Delivered, StatusOutcome::InTransit, StatusOutcome::Timeout]
    );
    assert!(report.details[0].updated);
    assert!(report.details[1].updated);
    assert!(!report.details[2].updated);

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].tracking_number, "C");

    let a = store.get("A").await.unwrap();
    assert_eq!(a.lifecycle_status, LifecycleStatus::Delivered);
    assert_eq!(a.status_info.as_deref(), Some("已送達門市"));
    let b = store.get("B").await.unwrap();
    assert_eq!(b.lifecycle_status, LifecycleStatus::Shipped);
    assert_eq!(b.status_info.as_deref(), Some("配送中"));
    let c = store.get("C").await.unwrap();
    assert_eq!(c.status_info, None);
    assert!(c.last_checked.is_none());

    assert_eq!(stats.posts_for("A"), 1);
    assert_eq!(stats.posts_for("C"), 1);
}

#[tokio::test]
async fn test_captcha_without_code_completes_summary() {
    let carrier = FakeCarrier::new(HOME_WITH_CAPTCHA).page("X", "已送達");
    let stats = carrier.stats.clone();
    let store = store_with(&["X", "Y"]).await;

    let report = assert_ok!(app(carrier, store.clone(), 5).run_batch(None).await);

    assert_eq!(report.total_count, 2);
    assert_eq!(report.needs_captcha, 2);
    assert_eq!(report.details.len(), 2);
    assert!(report
        .details
        .iter()
        .all(|e| e.outcome == StatusOutcome::NeedsCaptcha));
    assert_eq!(stats.get_count(), 2);
    assert_eq!(stats.post_count(), 0);

    let x = store.get("X").await.unwrap();
    assert_eq!(x.status_info.as_deref(), Some("需要驗證碼"));
    assert_eq!(x.lifecycle_status, LifecycleStatus::Shipped);
}

#[tokio::test]
async fn test_retry_with_captcha_is_a_new_batch() {
    let carrier = FakeCarrier::new(HOME_WITH_CAPTCHA).page("X", "已到店");
    let stats = carrier.stats.clone();
    let store = store_with(&["X"]).await;
    let app = app(carrier, store.clone(), 5);

    let first = assert_ok!(app.run_batch(None).await);
    assert_eq!(first.needs_captcha, 1);
    assert_eq!(stats.post_count(), 0);

    let second = assert_ok!(app.run_batch(Some("7K2Q".to_string())).await);
    assert_eq!(second.details[0].outcome, StatusOutcome::Delivered);
    assert_eq!(stats.post_count(), 1);
    let posts = stats.posts.lock().unwrap();
    assert_eq!(field(&posts[0], "tbChkCode"), Some("7K2Q"));
    assert_eq!(field(&posts[0], "__VIEWSTATE"), Some("VS-CAPTCHA"));
}

#[tokio::test]
async fn test_concurrency_never_exceeds_limit() {
    let numbers: Vec<String> = (1..=12).map(|i| format!("F{:03}", i)).collect();
    let mut carrier = FakeCarrier::new(HOME).with_latency(Duration::from_millis(20));
    for no in &numbers {
        carrier = carrier.page(no, "配送中");
    }
    let stats = carrier.stats.clone();
    let refs: Vec<&str> = numbers.iter().map(String::as_str).collect();
    let store = store_with(&refs).await;

    let report = assert_ok!(app(carrier, store, 3).run_batch(None).await);

    assert_eq!(report.total_count, 12);
    assert_eq!(report.updated_count, 12);
    assert_eq!(stats.max_in_flight(), 3);
}

#[tokio::test]
async fn test_every_order_appears_exactly_once_in_input_order() {
    let orders: Vec<OrderRef> = ["Q1", "Q2", "Q3", "Q4", "Q5", "Q6", "Q7"]
        .iter()
        .map(|no| OrderRef::shipped(*no).unwrap())
        .collect();
    let carrier = FakeCarrier::new(HOME)
        .with_latency(Duration::from_millis(5))
        .page("Q1", "配送中")
        .script("Q2", Scripted::Error(QueryError::AccessDenied))
        .page("Q3", "系統忙碌中")
        .script("Q4", Scripted::Error(QueryError::NotFound))
        .page("Q5", "已送達");
    let stats = carrier.stats.clone();
    let store = store_with(&["Q1", "Q2", "Q3", "Q4", "Q5", "Q6", "Q7"]).await;

    let config = test_config(2);
    let session = CarrierSession::new(&config, Arc::new(carrier));
    let writer = ReconcileWriter::new(store.clone());
    let processor = BatchProcessor::new(OrderFlow::new(session, writer), 2);

    let result = processor.run(orders.clone(), None).await;

    let seen: Vec<_> = result.entries.iter().map(|e| e.order.clone()).collect();
    assert_eq!(seen, orders);
    let unique: HashSet<_> = seen.iter().map(|o| o.tracking_number().to_string()).collect();
    assert_eq!(unique.len(), orders.len());
    for order in &orders {
        assert_eq!(stats.posts_for(order.tracking_number()), 1);
    }

    let outcomes: Vec<_> = result.entries.iter().map(|e| e.outcome.clone()).collect();
    assert_eq!(
        outcomes,
        vec![
            StatusOutcome::InTransit,
            StatusOutcome::AccessDenied,
            StatusOutcome::Busy,
            StatusOutcome::NotFound,
            StatusOutcome::Delivered,
            StatusOutcome::NoData,
            StatusOutcome::NoData,
        ]
    );
    assert_eq!(result.summary().failed, 2);
}

#[tokio::test]
async fn test_panicking_order_is_isolated() {
    let carrier = FakeCarrier::new(HOME)
        .page("P1", "已送達")
        .script("P2", Scripted::Panic)
        .page("P3", "配送中");
    let store = store_with(&["P1", "P2", "P3"]).await;

    let report = assert_ok!(app(carrier, store.clone(), 2).run_batch(None).await);

    assert_eq!(report.total_count, 3);
    assert_eq!(report.updated_count, 2);
    assert!(matches!(report.details[1].outcome, StatusOutcome::QueryFailed(_)));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].tracking_number, "P2");
    assert_eq!(
        store.get("P3").await.unwrap().status_info.as_deref(),
        Some("配送中")
    );
}

#[tokio::test]
async fn test_store_failure_only_affects_its_order() {
    let carrier = FakeCarrier::new(HOME).page("S1", "配送中").page("S2", "配送中");
    let store = store_with(&["S1", "S2"]).await;
    store.fail_updates_for("S1").await;

    let report = assert_ok!(app(carrier, store.clone(), 5).run_batch(None).await);

    assert_eq!(report.updated_count, 1);
    assert!(!report.details[0].updated);
    assert_eq!(report.details[0].outcome, StatusOutcome::InTransit);
    assert!(report.details[1].updated);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].tracking_number, "S1");
}

#[tokio::test]
async fn test_delivered_order_is_not_requeried() {
    let carrier = FakeCarrier::new(HOME).page("D1", "已送達");
    let stats = carrier.stats.clone();
    let store = store_with(&["D1"]).await;
    let app = app(carrier, store.clone(), 5);

    assert_ok!(app.run_batch(None).await);
    assert_eq!(store.pending_orders().await.unwrap().len(), 0);

    let second = assert_ok!(app.run_batch(None).await);
    assert_eq!(second.total_count, 0);
    assert_eq!(stats.get_count(), 1);
}

#[tokio::test]
async fn test_pending_list_failure_is_fatal() {
    let store = store_with(&["A"]).await;
    store.fail_listing();

    let err = assert_err!(app(FakeCarrier::new(HOME), store, 5).run_batch(None).await);
    assert!(matches!(err, AppError::Store(_)));
}

#[tokio::test]
async fn test_batch_requires_store() {
    let app = App::with_parts(test_config(5), Arc::new(FakeCarrier::new(HOME)), None);
    let err = assert_err!(app.run_batch(None).await);
    assert!(matches!(err, AppError::Config(_)));
}
