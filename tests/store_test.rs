//! Tests for the JSON-backed subscriber and notification stores.

use std::sync::Arc;

use kickoff_bot::service::subscription_service::SubscribeResult;
use kickoff_bot::service::subscription_service::SubscriptionService;
use kickoff_bot::store::NotificationLog;
use kickoff_bot::store::SentNotifications;
use kickoff_bot::store::SubscriberStore;

mod common;

#[tokio::test]
async fn test_subscribe_twice_keeps_one_entry() {
    let dir = common::setup_data_dir();
    let store = Arc::new(SubscriberStore::new(dir.join("users.json")));
    let service = SubscriptionService::new(store.clone());

    let first = service.subscribe(123456).await.unwrap();
    let second = service.subscribe(123456).await.unwrap();

    assert_eq!(first, SubscribeResult::Success);
    assert_eq!(second, SubscribeResult::AlreadySubscribed);
    assert_eq!(store.all().await.unwrap(), vec![123456]);

    let raw = std::fs::read_to_string(dir.join("users.json")).unwrap();
    assert_eq!(raw, r#"{"123456":true}"#);

    common::teardown_data_dir(dir);
}

#[tokio::test]
async fn test_concurrent_subscribes_are_not_lost() {
    let dir = common::setup_data_dir();
    let store = Arc::new(SubscriberStore::new(dir.join("users.json")));

    let handles: Vec<_> = (1..=20)
        .map(|chat_id| {
            let store = store.clone();
            tokio::spawn(async move { store.add(chat_id).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().unwrap());
    }

    assert_eq!(store.count().await.unwrap(), 20);

    common::teardown_data_dir(dir);
}

#[tokio::test]
async fn test_reads_existing_users_file() {
    let dir = common::setup_data_dir();
    let path = dir.join("users.json");
    std::fs::write(&path, r#"{"-1001234567890": true, "42": true, "not-a-chat": true}"#).unwrap();

    let store = SubscriberStore::new(&path);
    let mut chats = store.all().await.unwrap();
    chats.sort();
    assert_eq!(chats, vec![-1001234567890, 42]);

    common::teardown_data_dir(dir);
}

#[tokio::test]
async fn test_notification_log_round_trip() {
    let dir = common::setup_data_dir();
    let log = NotificationLog::new(dir.join("nested").join("sent_notifications.json"));

    let empty = log.load().await.unwrap();
    assert!(empty.is_empty());

    let mut sent = SentNotifications::default();
    sent.insert("1001_24h");
    sent.insert("1001_1h");
    log.save(&sent).await.unwrap();

    let reloaded = log.load().await.unwrap();
    assert_eq!(reloaded, sent);
    assert!(reloaded.contains("1001_1h"));
    assert!(!reloaded.contains("1001_result"));

    common::teardown_data_dir(dir);
}
