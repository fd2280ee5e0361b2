//! The session synchronizer: a per-tab Tokio task that owns one session.
//!
//! Handle commands, auth client events, connectivity events, peer
//! messages, renewal results and the renewal deadline are all multiplexed
//! into one `select!` loop. The actor owns every piece of state and
//! handles one input at a time, so renewals within a tab are serialized.

use std::future::pending;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinSet;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, error, info, trace, warn};
use veritas_auth::{AuthClient, AuthError, AuthEvent, Navigator, RedirectReason, SignInRedirect};
use veritas_backoff::{RateLimitHint, refresh_delay, unix_millis_now};
use veritas_channel::{ChannelOpener, ConnectivityEvent, ConnectivityObserver, CrossTabChannel};
use veritas_protocol::{Codec, JsonCodec, Session, SyncMessage};

use crate::{FailureClass, SessionView, SyncConfig, SyncError, SyncState, classify};

/// What a call to [`SyncHandle::refresh_session`] led to.
///
/// Every caller that joined the same in-flight renewal receives the
/// same outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The session was renewed.
    Renewed(Session),
    /// The renewal failed; another attempt is armed after `delay`.
    /// `attempt` is the consecutive-failure count (rate limits don't count).
    RetryScheduled { delay: Duration, attempt: u32 },
    /// The tab is offline; renewal resumes on the next `online` event.
    Deferred,
    /// The failure was fatal and the user was sent to sign in.
    SignedOut(RedirectReason),
    /// The session was signed out while the call was in flight; its
    /// result was thrown away.
    Discarded,
}

/// Which session a renewal was started for. Bumped whenever the cached
/// session is cleared, so late results from before can be recognized.
type Epoch = u64;

/// Commands sent from a [`SyncHandle`] to the actor.
enum SyncCommand {
    Refresh {
        reply: oneshot::Sender<RefreshOutcome>,
    },
    SignOut {
        reply: oneshot::Sender<Result<(), SyncError>>,
    },
    Shutdown,
}

/// One unit of work for the actor loop.
enum Input {
    Command(SyncCommand),
    RefreshCompleted(Epoch, Result<Session, AuthError>),
    Auth(Result<AuthEvent, broadcast::error::RecvError>),
    Connectivity(Result<ConnectivityEvent, broadcast::error::RecvError>),
    Peer(Option<Vec<u8>>),
    DeadlineElapsed,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Entry point for starting a tab's session synchronizer.
///
/// Spawn exactly one synchronizer per tab and pass its [`SyncHandle`] to
/// whatever needs it; two synchronizers in one tab would renew the same
/// session twice.
///
/// # Example
///
/// ```rust,ignore
/// let sync = SessionSynchronizer::builder(SyncConfig::default())
///     .refresh_threshold(Duration::from_secs(60))
///     .spawn(auth_client, broadcast_hub, connectivity, navigator);
///
/// let view = sync.view();
/// // ... on unmount:
/// sync.cleanup();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SessionSynchronizer;

impl SessionSynchronizer {
    /// Creates a builder starting from `config`.
    pub fn builder(config: SyncConfig) -> SessionSynchronizerBuilder {
        SessionSynchronizerBuilder::new(config)
    }
}

/// Configures and spawns a session synchronizer.
#[derive(Debug, Clone, Default)]
pub struct SessionSynchronizerBuilder {
    config: SyncConfig,
}

impl SessionSynchronizerBuilder {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    /// Sets how long before expiry sessions are renewed.
    pub fn refresh_threshold(mut self, threshold: Duration) -> Self {
        self.config.refresh_threshold = threshold;
        self
    }

    /// Sets the retry policy for failed renewals.
    pub fn retry_policy(mut self, retry: veritas_backoff::RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Sets the cross-tab channel name.
    pub fn channel_name(mut self, name: impl Into<String>) -> Self {
        self.config.channel_name = name.into();
        self
    }

    /// Sets the sign-in entry point for fatal redirects.
    pub fn sign_in_path(mut self, path: impl Into<String>) -> Self {
        self.config.sign_in_path = path.into();
        self
    }

    /// Wires up the collaborators and starts the synchronizer task.
    ///
    /// Listeners are registered and the cross-tab channel is opened before
    /// this returns, so no event fired afterwards is missed. The initial
    /// session read happens on the task; until then the view reports
    /// `loading`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<A, O, C, N>(
        self,
        auth: A,
        opener: O,
        connectivity: C,
        navigator: N,
    ) -> SyncHandle
    where
        A: AuthClient,
        O: ChannelOpener,
        C: ConnectivityObserver,
        N: Navigator,
    {
        let config = self.config.validated();

        let auth_events = auth.subscribe();
        let connectivity_events = connectivity.subscribe();
        let channel = opener.open(&config.channel_name);
        if channel.is_none() {
            warn!(
                channel = %config.channel_name,
                class = %FailureClass::ChannelUnavailable,
                "cross-tab channel unavailable, running local-only"
            );
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(SessionView::loading());

        let actor = SyncActor {
            config,
            auth: Arc::new(auth),
            opener,
            navigator,
            codec: JsonCodec,
            channel,
            commands: rx,
            auth_events: Some(auth_events),
            connectivity: Some(connectivity_events),
            completions_tx,
            completions: completions_rx,
            sign_outs: JoinSet::new(),
            view: view_tx,
            session: None,
            loading: true,
            state: SyncState::Unauthenticated,
            online: connectivity.is_online(),
            attempt_count: 0,
            deadline: None,
            in_flight: None,
            epoch: 0,
            retry_on_online: false,
        };

        tokio::spawn(actor.run());

        SyncHandle {
            sender: tx,
            view: view_rx,
        }
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to a running session synchronizer.
///
/// Cheap to clone. Dropping every clone tears the synchronizer down the
/// same way [`cleanup`](Self::cleanup) does.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    sender: mpsc::UnboundedSender<SyncCommand>,
    view: watch::Receiver<SessionView>,
}

impl SyncHandle {
    /// Renews the session now.
    ///
    /// If a renewal is already in flight, no second call is made: this
    /// caller waits for the pending one and gets the same outcome.
    pub async fn refresh_session(&self) -> Result<RefreshOutcome, SyncError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SyncCommand::Refresh { reply: reply_tx })
            .map_err(|_| SyncError::ShutDown)?;
        reply_rx.await.map_err(|_| SyncError::ShutDown)
    }

    /// Clears this tab's session, tells the other tabs and signs out with
    /// the auth client.
    ///
    /// Local state is cleared before the auth client is called, so the
    /// result only reports what the provider said. A renewal in flight is
    /// abandoned and its callers get [`RefreshOutcome::Discarded`].
    pub async fn sign_out(&self) -> Result<(), SyncError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SyncCommand::SignOut { reply: reply_tx })
            .map_err(|_| SyncError::ShutDown)?;
        reply_rx.await.map_err(|_| SyncError::ShutDown)?
    }

    /// Stops the synchronizer: cancels the timer, closes the cross-tab
    /// channel and drops every listener.
    ///
    /// Idempotent, and safe to call from drop or unmount paths. A renewal
    /// already in flight is allowed to finish, but its result is ignored.
    pub fn cleanup(&self) {
        if self.sender.send(SyncCommand::Shutdown).is_ok() {
            debug!("session synchronizer cleanup requested");
        }
    }

    /// Resolves once the synchronizer task has stopped.
    pub async fn closed(&self) {
        self.sender.closed().await;
    }

    /// Whether the synchronizer task is still running.
    pub fn is_active(&self) -> bool {
        !self.sender.is_closed()
    }

    /// The current session view.
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// A receiver notified on every view change.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct SyncActor<A, O: ChannelOpener, N> {
    config: SyncConfig,
    auth: Arc<A>,
    opener: O,
    navigator: N,
    codec: JsonCodec,
    /// `None` = local-only.
    channel: Option<O::Channel>,
    commands: mpsc::UnboundedReceiver<SyncCommand>,
    auth_events: Option<broadcast::Receiver<AuthEvent>>,
    connectivity: Option<broadcast::Receiver<ConnectivityEvent>>,
    completions_tx: mpsc::UnboundedSender<(Epoch, Result<Session, AuthError>)>,
    completions: mpsc::UnboundedReceiver<(Epoch, Result<Session, AuthError>)>,
    /// Provider sign-out calls still running. Aborted on teardown.
    sign_outs: JoinSet<()>,
    view: watch::Sender<SessionView>,

    session: Option<Session>,
    loading: bool,
    state: SyncState,
    online: bool,
    attempt_count: u32,
    /// The one pending timer. Replacing it cancels the old one.
    deadline: Option<TokioInstant>,
    /// Waiters of the renewal in flight; `Some` iff a call is in flight.
    in_flight: Option<Vec<oneshot::Sender<RefreshOutcome>>>,
    epoch: Epoch,
    /// A renewal failed while offline and must run on reconnect.
    retry_on_online: bool,
}

impl<A, O, N> SyncActor<A, O, N>
where
    A: AuthClient,
    O: ChannelOpener,
    N: Navigator,
{
    async fn run(mut self) {
        info!(channel = %self.config.channel_name, online = self.online, "session synchronizer started");

        self.load_initial_session();
        self.publish();

        loop {
            let input = tokio::select! {
                cmd = self.commands.recv() => {
                    Input::Command(cmd.unwrap_or(SyncCommand::Shutdown))
                }
                Some((epoch, result)) = self.completions.recv() => {
                    Input::RefreshCompleted(epoch, result)
                }
                event = next_event(&mut self.auth_events) => Input::Auth(event),
                event = next_event(&mut self.connectivity) => Input::Connectivity(event),
                payload = next_peer_message(&mut self.channel) => Input::Peer(payload),
                () = sleep_until_deadline(self.deadline) => Input::DeadlineElapsed,
            };

            if self.handle(input).is_break() {
                break;
            }
            self.publish();
        }

        self.teardown();
    }

    fn handle(&mut self, input: Input) -> ControlFlow<()> {
        match input {
            Input::Command(SyncCommand::Refresh { reply }) => self.start_refresh(Some(reply)),
            Input::Command(SyncCommand::SignOut { reply }) => self.sign_out(reply),
            Input::Command(SyncCommand::Shutdown) => return ControlFlow::Break(()),
            Input::RefreshCompleted(epoch, result) => self.on_refresh_completed(epoch, result),
            Input::Auth(event) => self.on_auth_event(event),
            Input::Connectivity(event) => self.on_connectivity_event(event),
            Input::Peer(payload) => self.on_peer_message(payload),
            Input::DeadlineElapsed => {
                self.deadline = None;
                trace!(state = %self.state, "renewal deadline elapsed");
                self.start_refresh(None);
            }
        }
        ControlFlow::Continue(())
    }

    fn load_initial_session(&mut self) {
        self.loading = false;
        match self.auth.current_session() {
            Some(session) => {
                debug!(user_id = %session.user_id(), "initial session loaded");
                self.adopt(session);
            }
            None => debug!("no initial session"),
        }
    }

    // -- scheduling -------------------------------------------------------

    /// Arms the renewal timer from the cached session's expiry.
    ///
    /// While offline no timer is armed; the `online` event renews instead.
    fn schedule_refresh(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        if !self.online {
            self.deadline = None;
            self.set_state(SyncState::Offline);
            return;
        }

        let delay = refresh_delay(
            session.expires_at,
            unix_millis_now(),
            self.config.refresh_threshold,
        );
        debug!(
            user_id = %session.user_id(),
            expires_at = session.expires_at,
            delay_ms = delay.as_millis() as u64,
            "renewal scheduled"
        );
        self.arm(delay);
        self.set_state(SyncState::Scheduled);
    }

    fn arm(&mut self, delay: Duration) {
        self.deadline = Some(TokioInstant::now() + delay);
    }

    fn set_state(&mut self, next: SyncState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(next) {
            debug!(from = %self.state, to = %next, "unexpected state transition");
        }
        trace!(from = %self.state, to = %next, "state transition");
        self.state = next;
    }

    // -- renewal ----------------------------------------------------------

    /// Starts a renewal, or joins the one in flight.
    ///
    /// Automatic triggers (`reply == None`) do nothing without a cached
    /// session; explicit requests always reach the auth client.
    fn start_refresh(&mut self, reply: Option<oneshot::Sender<RefreshOutcome>>) {
        if let Some(waiters) = &mut self.in_flight {
            debug!(waiters = waiters.len() + 1, "joining renewal in flight");
            waiters.extend(reply);
            return;
        }
        if reply.is_none()
            && self.session.is_none()
            && !self.retry_on_online
            && self.state != SyncState::Backoff
        {
            trace!("no session cached, skipping automatic renewal");
            return;
        }

        self.deadline = None;
        self.retry_on_online = false;
        self.set_state(SyncState::Refreshing);
        self.in_flight = Some(reply.into_iter().collect());

        let auth = Arc::clone(&self.auth);
        let completions = self.completions_tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = auth.refresh_session().await;
            // Fails only after teardown, when nobody cares any more.
            let _ = completions.send((epoch, result));
        });
        debug!(attempt_count = self.attempt_count, epoch, "renewal started");
    }

    fn on_refresh_completed(&mut self, epoch: Epoch, result: Result<Session, AuthError>) {
        if epoch != self.epoch {
            debug!(
                epoch,
                current = self.epoch,
                ok = result.is_ok(),
                "discarding renewal started before sign-out"
            );
            return;
        }
        let waiters = self.in_flight.take().unwrap_or_default();
        let outcome = match result {
            Ok(session) => self.on_renewed(session),
            Err(err) => self.on_refresh_failed(&err),
        };
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }

    fn on_renewed(&mut self, session: Session) -> RefreshOutcome {
        info!(
            user_id = %session.user_id(),
            expires_at = session.expires_at,
            "session renewed"
        );
        self.attempt_count = 0;
        self.retry_on_online = false;
        self.session = Some(session.clone());
        self.schedule_refresh();
        self.broadcast(&SyncMessage::session_updated(session.clone()));
        RefreshOutcome::Renewed(session)
    }

    fn on_refresh_failed(&mut self, err: &AuthError) -> RefreshOutcome {
        let class = classify(err, self.online);
        if let Some(reason) = class.redirect_reason() {
            return self.fail(class, reason, err);
        }

        let policy = &self.config.retry;

        match class {
            FailureClass::RateLimited { retry_after } => {
                let delay = policy.next_delay(self.attempt_count, Some(RateLimitHint(retry_after)));
                warn!(error = %err, %class, delay_ms = delay.as_millis() as u64, "renewal rate limited");
                self.arm(delay);
                self.set_state(SyncState::Backoff);
                RefreshOutcome::RetryScheduled {
                    delay,
                    attempt: self.attempt_count,
                }
            }
            FailureClass::TransientOnline => {
                self.attempt_count += 1;
                if policy.is_exhausted(self.attempt_count) {
                    return self.fail(
                        FailureClass::RetryBudgetExhausted,
                        RedirectReason::MaxRetries,
                        err,
                    );
                }
                let delay = policy.next_delay(self.attempt_count, None);
                warn!(
                    error = %err,
                    %class,
                    attempt = self.attempt_count,
                    delay_ms = delay.as_millis() as u64,
                    "renewal failed, backing off"
                );
                self.arm(delay);
                self.set_state(SyncState::Backoff);
                RefreshOutcome::RetryScheduled {
                    delay,
                    attempt: self.attempt_count,
                }
            }
            FailureClass::TransientOffline => {
                info!(error = %err, %class, "renewal failed while offline, deferring until online");
                self.deadline = None;
                self.retry_on_online = true;
                self.set_state(SyncState::Offline);
                RefreshOutcome::Deferred
            }
            // Fatal classes returned above; renewal calls never report a
            // channel failure.
            FailureClass::AuthRejected
            | FailureClass::RetryBudgetExhausted
            | FailureClass::ChannelUnavailable
            | FailureClass::Unclassified => self.fail(class, RedirectReason::Unknown, err),
        }
    }

    /// Ends the session locally and sends the user to sign in.
    fn fail(
        &mut self,
        class: FailureClass,
        reason: RedirectReason,
        err: &AuthError,
    ) -> RefreshOutcome {
        let redirect = SignInRedirect::new(self.config.sign_in_path.clone(), reason);
        error!(
            error = %err,
            status = ?err.status(),
            %class,
            attempt_count = self.attempt_count,
            location = %redirect.location(),
            "session renewal failed permanently, redirecting to sign-in"
        );
        self.clear_local();
        self.navigator.navigate(redirect);
        RefreshOutcome::SignedOut(reason)
    }

    /// Clears the session here and in every peer right away; the
    /// provider call runs on its own task and answers `reply` when done.
    fn sign_out(&mut self, reply: oneshot::Sender<Result<(), SyncError>>) {
        let had_session = self.session.is_some();
        self.clear_local();
        if had_session {
            info!("signed out");
            self.broadcast(&SyncMessage::signed_out());
        }

        while self.sign_outs.try_join_next().is_some() {}
        let auth = Arc::clone(&self.auth);
        self.sign_outs.spawn(async move {
            let result = auth.sign_out().await;
            if let Err(err) = &result {
                warn!(error = %err, "auth client sign-out failed, local session already cleared");
            }
            let _ = reply.send(result.map_err(SyncError::from));
        });
    }

    // -- inputs -----------------------------------------------------------

    fn on_auth_event(&mut self, event: Result<AuthEvent, broadcast::error::RecvError>) {
        match event {
            Ok(AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session)) => {
                debug!(user_id = %session.user_id(), "auth client reported a session");
                self.adopt(session);
            }
            Ok(AuthEvent::SignedOut) => {
                if self.session.is_some() {
                    info!("auth client signed out");
                    self.clear_local();
                    self.broadcast(&SyncMessage::signed_out());
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "auth events lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("auth client closed its event stream");
                self.auth_events = None;
            }
        }
    }

    fn on_connectivity_event(
        &mut self,
        event: Result<ConnectivityEvent, broadcast::error::RecvError>,
    ) {
        match event {
            Ok(ConnectivityEvent::Online) => {
                info!("back online");
                self.online = true;
                self.attempt_count = 0;
                self.start_refresh(None);
                if self.state == SyncState::Offline {
                    self.set_state(SyncState::Unauthenticated);
                }
            }
            Ok(ConnectivityEvent::Offline) => {
                info!("went offline, suspending renewal timer");
                self.online = false;
                self.deadline = None;
                if self.in_flight.is_none() && self.session.is_some() {
                    self.set_state(SyncState::Offline);
                }
            }
            Ok(ConnectivityEvent::Focus) => {
                trace!("window focused");
                self.start_refresh(None);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "connectivity events lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("connectivity observer closed its event stream");
                self.connectivity = None;
            }
        }
    }

    fn on_peer_message(&mut self, payload: Option<Vec<u8>>) {
        let Some(payload) = payload else {
            warn!(
                class = %FailureClass::ChannelUnavailable,
                "cross-tab channel ended, running local-only"
            );
            self.close_channel();
            return;
        };

        let message: SyncMessage = match self.codec.decode(&payload) {
            Ok(message) => message,
            Err(err) => {
                debug!(error = %err, "ignoring undecodable peer message");
                return;
            }
        };

        // Never re-broadcast what a peer told us.
        match message.into_session() {
            Some(session) => {
                if let Err(err) = session.validate() {
                    debug!(error = %err, "ignoring invalid peer session");
                    return;
                }
                debug!(user_id = %session.user_id(), "adopting session from peer");
                self.adopt(session);
            }
            None => {
                if self.session.is_some() {
                    info!("peer signed out");
                }
                self.clear_local();
            }
        }
    }

    // -- state helpers ----------------------------------------------------

    /// Replaces the cached session wholesale and re-arms the timer.
    fn adopt(&mut self, session: Session) {
        self.session = Some(session);
        self.attempt_count = 0;
        self.retry_on_online = false;
        if self.in_flight.is_none() {
            self.schedule_refresh();
        }
    }

    /// Forgets the session. A renewal in flight is abandoned: its
    /// waiters are answered now and its result is ignored when it lands.
    fn clear_local(&mut self) {
        self.session = None;
        self.deadline = None;
        self.attempt_count = 0;
        self.retry_on_online = false;
        self.epoch += 1;
        if let Some(waiters) = self.in_flight.take() {
            debug!(waiters = waiters.len(), "abandoning renewal in flight");
            for waiter in waiters {
                let _ = waiter.send(RefreshOutcome::Discarded);
            }
        }
        self.set_state(SyncState::Unauthenticated);
    }

    fn publish(&self) {
        let next = SessionView {
            session: self.session.clone(),
            loading: self.loading,
            state: self.state,
            attempt_count: self.attempt_count,
        };
        self.view.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    // -- cross-tab --------------------------------------------------------

    /// Posts a message to peers. Failures never leave this function: the
    /// channel is reopened once, and dropped if that fails too.
    fn broadcast(&mut self, message: &SyncMessage) {
        let payload = match self.codec.encode(message) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "failed to encode cross-tab message");
                return;
            }
        };

        let Some(channel) = &self.channel else {
            trace!("local-only, not broadcasting");
            return;
        };
        let Err(err) = channel.post_message(&payload) else {
            trace!("broadcast session update");
            return;
        };

        warn!(
            error = %err,
            class = %FailureClass::ChannelUnavailable,
            "broadcast failed, reopening channel"
        );
        self.close_channel();
        self.channel = self.opener.open(&self.config.channel_name);

        match self.channel.as_ref().map(|channel| channel.post_message(&payload)) {
            Some(Ok(())) => debug!("broadcast delivered after reopening channel"),
            Some(Err(err)) => {
                warn!(error = %err, "broadcast failed again, running local-only");
                self.close_channel();
            }
            None => warn!("could not reopen channel, running local-only"),
        }
    }

    fn close_channel(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            if let Err(err) = channel.close() {
                debug!(error = %err, "ignoring channel close error");
            }
        }
    }

    fn teardown(&mut self) {
        self.deadline = None;
        self.close_channel();
        self.auth_events = None;
        self.connectivity = None;
        if let Some(waiters) = self.in_flight.take() {
            debug!(waiters = waiters.len(), "abandoning renewal in flight");
        }
        if !self.sign_outs.is_empty() {
            debug!(pending = self.sign_outs.len(), "aborting provider sign-out");
            self.sign_outs.abort_all();
        }
        info!("session synchronizer stopped");
    }
}

// ---------------------------------------------------------------------------
// select! helpers
// ---------------------------------------------------------------------------

async fn next_event<T: Clone>(
    rx: &mut Option<broadcast::Receiver<T>>,
) -> Result<T, broadcast::error::RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => pending().await,
    }
}

async fn next_peer_message<C: CrossTabChannel>(channel: &mut Option<C>) -> Option<Vec<u8>> {
    match channel {
        Some(channel) => channel.recv().await,
        None => pending().await,
    }
}

async fn sleep_until_deadline(deadline: Option<TokioInstant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => pending().await,
    }
}
