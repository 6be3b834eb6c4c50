use tokio::time::{timeout, Duration};
use uuid::Uuid;

use token_queue_cell::*;

fn event(kind: QueueEventKind, number: u32) -> QueueEvent {
    QueueEvent {
        event: kind,
        token_id: Uuid::new_v4(),
        token_number: number,
        status: None,
        priority: None,
    }
}

#[tokio::test]
async fn test_subscriber_receives_published_event() {
    let broadcaster = QueueBroadcaster::new(16);
    let doctor = Uuid::new_v4();

    let mut rx = broadcaster.subscribe(doctor).await;
    let sent = event(QueueEventKind::TokenCreated, 1);
    broadcaster.publish(doctor, sent.clone()).await;

    let received = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("Should receive within timeout")
        .expect("Channel should be open");
    assert_eq!(received.event, QueueEventKind::TokenCreated);
    assert_eq!(received.token_id, sent.token_id);
}

#[tokio::test]
async fn test_no_cross_talk_between_doctor_channels() {
    let broadcaster = QueueBroadcaster::new(16);
    let doctor_a = Uuid::new_v4();
    let doctor_b = Uuid::new_v4();

    let mut rx_a = broadcaster.subscribe(doctor_a).await;
    let mut rx_b = broadcaster.subscribe(doctor_b).await;

    broadcaster
        .publish(doctor_a, event(QueueEventKind::TokenCalled, 4))
        .await;

    let received = timeout(Duration::from_secs(1), rx_a.recv())
        .await
        .expect("Doctor A's subscriber should receive")
        .expect("Channel should be open");
    assert_eq!(received.token_number, 4);

    let nothing = timeout(Duration::from_millis(100), rx_b.recv()).await;
    assert!(nothing.is_err(), "Doctor B's subscriber must see nothing");
}

#[tokio::test]
async fn test_many_subscribers_per_channel() {
    let broadcaster = QueueBroadcaster::new(16);
    let doctor = Uuid::new_v4();

    let mut receivers = vec![];
    for _ in 0..5 {
        receivers.push(broadcaster.subscribe(doctor).await);
    }
    assert_eq!(broadcaster.subscriber_count(doctor).await, 5);

    broadcaster
        .publish(doctor, event(QueueEventKind::TokenCompleted, 9))
        .await;

    for rx in receivers.iter_mut() {
        let received = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("Every subscriber should receive")
            .expect("Channel should be open");
        assert_eq!(received.token_number, 9);
    }
}

#[tokio::test]
async fn test_publish_without_subscribers_is_a_noop() {
    let broadcaster = QueueBroadcaster::new(16);
    let doctor = Uuid::new_v4();

    // Must not panic or error; the event is simply dropped.
    broadcaster
        .publish(doctor, event(QueueEventKind::TokenCreated, 1))
        .await;
    assert_eq!(broadcaster.subscriber_count(doctor).await, 0);
}

#[tokio::test]
async fn test_channel_pruned_after_last_subscriber_leaves() {
    let broadcaster = QueueBroadcaster::new(16);
    let doctor = Uuid::new_v4();

    let rx = broadcaster.subscribe(doctor).await;
    assert_eq!(broadcaster.active_channels().await.len(), 1);
    drop(rx);

    // The next publish notices the dead channel and removes it.
    broadcaster
        .publish(doctor, event(QueueEventKind::TokenCreated, 1))
        .await;
    assert!(broadcaster.active_channels().await.is_empty());
}

#[tokio::test]
async fn test_publish_order_preserved_per_subscriber() {
    let broadcaster = QueueBroadcaster::new(16);
    let doctor = Uuid::new_v4();

    let mut rx = broadcaster.subscribe(doctor).await;
    for number in 1..=5 {
        broadcaster
            .publish(doctor, event(QueueEventKind::TokenCreated, number))
            .await;
    }

    for expected in 1..=5 {
        let received = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("Should receive within timeout")
            .expect("Channel should be open");
        assert_eq!(received.token_number, expected);
    }
}

#[tokio::test]
async fn test_event_payload_serializes_without_null_optionals() {
    let token_event = QueueEvent {
        event: QueueEventKind::TokenPriorityUpdated,
        token_id: Uuid::new_v4(),
        token_number: 3,
        status: None,
        priority: Some(TokenPriority::Emergency),
    };

    let json = serde_json::to_value(&token_event).expect("Should serialize");
    assert_eq!(json["event"], "token_priority_updated");
    assert_eq!(json["priority"], 1);
    assert!(json.get("status").is_none(), "Absent fields stay absent");
}
