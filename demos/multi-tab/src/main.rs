use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{info, warn};
use veritas::backoff::unix_millis_now;
use veritas::prelude::*;

// ---------------------------------------------------------------------------
// Scripted identity provider
// ---------------------------------------------------------------------------

/// An in-memory identity provider shared by every tab.
///
/// Renewals succeed with a fresh one-hour session unless a failure was
/// queued with [`ScriptedAuth::fail_next`].
#[derive(Clone)]
struct ScriptedAuth {
    inner: Arc<Provider>,
}

struct Provider {
    session: Mutex<Option<Session>>,
    failures: Mutex<VecDeque<AuthError>>,
    events: broadcast::Sender<AuthEvent>,
    issued: AtomicU64,
}

impl ScriptedAuth {
    fn new() -> Self {
        Self {
            inner: Arc::new(Provider {
                session: Mutex::new(None),
                failures: Mutex::new(VecDeque::new()),
                events: broadcast::channel(16).0,
                issued: AtomicU64::new(0),
            }),
        }
    }

    fn issue(&self, expires_in: Duration) -> Session {
        let n = self.inner.issued.fetch_add(1, Ordering::Relaxed) + 1;
        Session {
            access_token: format!("access-{n}"),
            refresh_token: format!("refresh-{n}"),
            expires_at: unix_millis_now() / 1000 + expires_in.as_secs() as i64,
            user: SessionUser {
                id: UserId::new("demo-user"),
                email: Some("demo@example.com".into()),
                email_confirmed_at: Some(unix_millis_now() / 1000),
            },
        }
    }

    /// Signs the user in, as if they had just completed the login form.
    fn sign_in(&self) -> Session {
        let session = self.issue(Duration::from_secs(3600));
        *self.lock_session() = Some(session.clone());
        let _ = self.inner.events.send(AuthEvent::SignedIn(session.clone()));
        session
    }

    fn fail_next(&self, err: AuthError) {
        self.inner
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(err);
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuthClient for ScriptedAuth {
    fn current_session(&self) -> Option<Session> {
        self.lock_session().clone()
    }

    async fn refresh_session(&self) -> Result<Session, AuthError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let failure = self
            .inner
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(err) = failure {
            return Err(err);
        }
        let session = self.issue(Duration::from_secs(3600));
        *self.lock_session() = Some(session.clone());
        Ok(session)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.lock_session() = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Prints where the tab would navigate and the banner the sign-in page shows.
struct ConsoleNavigator {
    tab: &'static str,
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, redirect: SignInRedirect) {
        let banner = redirect.reason.banner();
        warn!(
            tab = self.tab,
            location = %redirect.location(),
            "redirecting to sign-in"
        );
        eprintln!("[{}] {}: {}", self.tab, banner.title, banner.description);
    }
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

fn open_tab(
    name: &'static str,
    auth: &ScriptedAuth,
    hub: &BroadcastHub,
    connectivity: &ConnectivityMonitor,
) -> SyncHandle {
    SessionSynchronizer::builder(SyncConfig::default()).spawn(
        auth.clone(),
        hub.clone(),
        connectivity.clone(),
        ConsoleNavigator { tab: name },
    )
}

/// Waits (briefly) for `tab` to reach a view matching `predicate`.
async fn settle(tab: &SyncHandle, predicate: impl FnMut(&SessionView) -> bool) -> SessionView {
    let mut rx = tab.subscribe();
    match tokio::time::timeout(Duration::from_secs(2), rx.wait_for(predicate)).await {
        Ok(Ok(view)) => view.clone(),
        _ => {
            warn!("tab did not reach the expected state");
            tab.view()
        }
    }
}

fn describe(view: &SessionView) -> String {
    match &view.session {
        Some(session) => format!("{} ({}, {})", session.access_token, session.user_id(), view.state),
        None => format!("signed out ({})", view.state),
    }
}

#[tokio::main]
async fn main() -> Result<(), VeritasError> {
    init_tracing();

    let auth = ScriptedAuth::new();
    auth.sign_in();

    let hub = BroadcastHub::new();
    let connectivity_a = ConnectivityMonitor::default();
    let connectivity_b = ConnectivityMonitor::default();
    let tab_a = open_tab("tab-a", &auth, &hub, &connectivity_a);
    let tab_b = open_tab("tab-b", &auth, &hub, &connectivity_b);

    let a = settle(&tab_a, |v| !v.loading).await;
    let b = settle(&tab_b, |v| !v.loading).await;
    info!(a = %describe(&a), b = %describe(&b), "tabs loaded");

    // A renewal in one tab is adopted by the other.
    if let RefreshOutcome::Renewed(session) = tab_a.refresh_session().await? {
        let b = settle(&tab_b, |v| v.session.as_ref() == Some(&session)).await;
        info!(b = %describe(&b), "tab-b adopted tab-a's renewal");
    }

    // Tab B loses connectivity, then renews as soon as it's back.
    connectivity_b.set_online(false);
    let b = settle(&tab_b, |v| v.state == SyncState::Offline).await;
    info!(b = %describe(&b), "tab-b offline");
    connectivity_b.set_online(true);
    let b = settle(&tab_b, |v| v.state == SyncState::Scheduled).await;
    info!(b = %describe(&b), "tab-b back online");

    // Signing out in one tab signs out everywhere.
    tab_b.sign_out().await?;
    let a = settle(&tab_a, |v| v.session.is_none()).await;
    info!(a = %describe(&a), "tab-a followed tab-b's sign-out");

    // Signing back in reaches both tabs through the provider.
    auth.sign_in();
    let a = settle(&tab_a, |v| v.is_authenticated()).await;
    info!(a = %describe(&a), "signed back in");

    // A rejected refresh token ends the session.
    auth.fail_next(AuthError::from_status(401, "refresh token revoked", None));
    let outcome = tab_a.refresh_session().await?;
    info!(?outcome, "tab-a refresh after revocation");

    tab_a.cleanup();
    tab_b.cleanup();
    tab_a.closed().await;
    tab_b.closed().await;
    info!(
        listeners = connectivity_a.listener_count() + connectivity_b.listener_count(),
        "tabs closed"
    );
    Ok(())
}
