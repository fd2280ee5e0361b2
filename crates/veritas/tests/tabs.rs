//! End-to-end tests: several tabs sharing one provider and one hub.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;
use veritas::prelude::*;
use veritas::backoff::unix_millis_now;

/// One identity provider seen by every tab. Renewals always succeed.
#[derive(Clone)]
struct Provider {
    session: Arc<Mutex<Option<Session>>>,
    events: broadcast::Sender<AuthEvent>,
    renewals: Arc<AtomicUsize>,
}

impl Provider {
    fn new(session: Option<Session>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            events: broadcast::channel(16).0,
            renewals: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn renewals(&self) -> usize {
        self.renewals.load(Ordering::SeqCst)
    }
}

fn session(n: usize, expires_in: i64) -> Session {
    Session {
        access_token: format!("access-{n}"),
        refresh_token: format!("refresh-{n}"),
        expires_at: unix_millis_now() / 1000 + expires_in,
        user: SessionUser {
            id: UserId::new("user-42"),
            email: None,
            email_confirmed_at: None,
        },
    }
}

impl AuthClient for Provider {
    fn current_session(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }

    async fn refresh_session(&self) -> Result<Session, AuthError> {
        let n = self.renewals.fetch_add(1, Ordering::SeqCst) + 1;
        let renewed = session(100 + n, 3600);
        *self.session.lock().unwrap() = Some(renewed.clone());
        Ok(renewed)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

struct NoNavigation;

impl Navigator for NoNavigation {
    fn navigate(&self, redirect: SignInRedirect) {
        panic!("unexpected redirect to {}", redirect.location());
    }
}

fn open_tab(provider: &Provider, hub: &BroadcastHub) -> SyncHandle {
    SessionSynchronizer::builder(SyncConfig::default()).spawn(
        provider.clone(),
        hub.clone(),
        ConnectivityMonitor::default(),
        NoNavigation,
    )
}

async fn wait_until(tab: &SyncHandle, predicate: impl FnMut(&SessionView) -> bool) -> SessionView {
    let mut rx = tab.subscribe();
    time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .expect("tab never reached the expected view")
        .expect("tab stopped")
        .clone()
}

#[tokio::test(start_paused = true)]
async fn test_renewal_in_one_tab_reaches_the_others() {
    let provider = Provider::new(Some(session(1, 3600)));
    let hub = BroadcastHub::new();
    let a = open_tab(&provider, &hub);
    let b = open_tab(&provider, &hub);
    let c = open_tab(&provider, &hub);
    for tab in [&a, &b, &c] {
        wait_until(tab, |v| !v.loading).await;
    }

    let RefreshOutcome::Renewed(renewed) = a.refresh_session().await.unwrap() else {
        panic!("expected a renewal");
    };

    for tab in [&b, &c] {
        let view = wait_until(tab, |v| v.session.as_ref() == Some(&renewed)).await;
        assert_eq!(view.state, SyncState::Scheduled);
    }
    assert_eq!(provider.renewals(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sign_out_in_one_tab_signs_out_all() {
    let provider = Provider::new(Some(session(1, 3600)));
    let hub = BroadcastHub::new();
    let a = open_tab(&provider, &hub);
    let b = open_tab(&provider, &hub);
    wait_until(&b, |v| v.is_authenticated()).await;

    a.sign_out().await.unwrap();

    let view = wait_until(&b, |v| v.session.is_none()).await;
    assert_eq!(view.state, SyncState::Unauthenticated);

    // Nobody renews a session that no longer exists.
    time::sleep(Duration::from_secs(7200)).await;
    assert_eq!(provider.renewals(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_closed_tab_stops_hearing_peers() {
    let provider = Provider::new(Some(session(1, 3600)));
    let hub = BroadcastHub::new();
    let a = open_tab(&provider, &hub);
    let b = open_tab(&provider, &hub);
    let before = wait_until(&b, |v| !v.loading).await;

    b.cleanup();
    b.closed().await;
    assert_eq!(hub.subscriber_count(veritas::sync::DEFAULT_CHANNEL_NAME), 1);

    a.refresh_session().await.unwrap();
    time::sleep(Duration::from_millis(10)).await;
    assert_eq!(b.view(), before);
}

#[tokio::test(start_paused = true)]
async fn test_sync_error_converts_into_veritas_error() {
    let provider = Provider::new(None);
    let tab = open_tab(&provider, &BroadcastHub::new());
    tab.cleanup();
    tab.closed().await;

    let result: Result<RefreshOutcome, VeritasError> =
        tab.refresh_session().await.map_err(VeritasError::from);
    assert!(matches!(result, Err(VeritasError::Sync(SyncError::ShutDown))));
}
