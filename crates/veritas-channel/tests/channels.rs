//! Integration tests for the in-process broadcast hub and the
//! connectivity monitor.

use std::time::Duration;

use veritas_channel::{
    BroadcastHub, ChannelOpener, ConnectivityEvent, ConnectivityMonitor, ConnectivityObserver,
    CrossTabChannel,
};

#[tokio::test]
async fn test_message_reaches_peer_but_not_sender() {
    let hub = BroadcastHub::new();
    let a = hub.open("veritas_session_sync").unwrap();
    let mut b = hub.open("veritas_session_sync").unwrap();
    let mut a_rx = hub.open("veritas_session_sync").unwrap();
    assert_ne!(a.id(), b.id());

    a.post_message(b"hello").unwrap();

    assert_eq!(b.recv().await.as_deref(), Some(&b"hello"[..]));
    // A third endpoint sees it too; only the sender itself is skipped.
    assert_eq!(a_rx.recv().await.as_deref(), Some(&b"hello"[..]));
}

#[tokio::test(start_paused = true)]
async fn test_sender_never_receives_its_own_message() {
    let hub = BroadcastHub::new();
    let mut a = hub.open("sync").unwrap();
    let _b = hub.open("sync").unwrap();

    a.post_message(b"mine").unwrap();

    let result = tokio::time::timeout(Duration::from_secs(1), a.recv()).await;
    assert!(result.is_err(), "own message must not be echoed");
}

#[tokio::test]
async fn test_channels_with_different_names_are_isolated() {
    let hub = BroadcastHub::new();
    let a = hub.open("one").unwrap();
    let mut b = hub.open("two").unwrap();
    let c = hub.open("two").unwrap();

    a.post_message(b"lost").unwrap();
    c.post_message(b"kept").unwrap();

    assert_eq!(b.recv().await.as_deref(), Some(&b"kept"[..]));
}

#[tokio::test]
async fn test_lagging_receiver_skips_and_continues() {
    let hub = BroadcastHub::with_capacity(2);
    let a = hub.open("sync").unwrap();
    let mut b = hub.open("sync").unwrap();

    for i in 0..5u8 {
        a.post_message(&[i]).unwrap();
    }

    // Oldest frames were overwritten; the receiver resumes with what's left.
    assert_eq!(b.recv().await, Some(vec![3]));
    assert_eq!(b.recv().await, Some(vec![4]));
}

#[tokio::test]
async fn test_recv_after_close_returns_none() {
    let hub = BroadcastHub::new();
    let mut a = hub.open("sync").unwrap();
    a.close().unwrap();
    assert_eq!(a.recv().await, None);
}

#[tokio::test]
async fn test_monitor_emits_only_on_change() {
    let monitor = ConnectivityMonitor::new(true);
    let mut rx = monitor.subscribe();

    monitor.set_online(true); // no change, no event
    monitor.set_online(false);
    monitor.focus();
    monitor.set_online(true);

    assert_eq!(rx.recv().await.unwrap(), ConnectivityEvent::Offline);
    assert_eq!(rx.recv().await.unwrap(), ConnectivityEvent::Focus);
    assert_eq!(rx.recv().await.unwrap(), ConnectivityEvent::Online);
    assert!(monitor.is_online());
}

#[test]
fn test_monitor_listener_count_tracks_subscriptions() {
    let monitor = ConnectivityMonitor::default();
    assert_eq!(monitor.listener_count(), 0);
    let rx = monitor.subscribe();
    assert_eq!(monitor.listener_count(), 1);
    drop(rx);
    assert_eq!(monitor.listener_count(), 0);
}
