use std::time::Duration;

use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::sync::channel::{ChangeChannel, ChannelMessage, ChannelStatus};
use crate::sync::fetcher::{FetchError, SnapshotFetcher};
use crate::sync::model::{ConnectionState, TeamRecord};
use crate::sync::poller::{FallbackPoller, PollTick};
use crate::sync::view_model::ViewModel;

/// How long the change channel may stay unacknowledged before the session
/// degrades to polling.
pub const CONNECT_DEADLINE: Duration = Duration::from_secs(5);

/// Internal phase of the sync state machine. A controller that has not been
/// spawned yet is implicitly in its init state; teardown can happen from any
/// phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncPhase {
    /// Channel opened, acknowledgement pending, deadline armed.
    Connecting,
    /// Push events are authoritative.
    Live,
    /// Push channel given up on; the fallback poller is authoritative.
    /// Never promoted back to live for the rest of the session.
    Degraded,
}

type SnapshotFuture = BoxFuture<'static, Result<Vec<TeamRecord>, FetchError>>;

/// Handle to a running sync session.
///
/// The watch receivers always hold the latest published ranked list and
/// connection state. Dropping the handle ends the session lazily; calling
/// [`SyncHandle::shutdown`] ends it and waits until the session task has
/// finished, after which nothing can fire anymore.
#[derive(Debug)]
pub struct SyncHandle {
    teams: watch::Receiver<Vec<TeamRecord>>,
    connection: watch::Receiver<ConnectionState>,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Receiver tracking the published ranked team list.
    pub fn teams(&self) -> watch::Receiver<Vec<TeamRecord>> {
        self.teams.clone()
    }

    /// Receiver tracking the data-path state shown to viewers.
    pub fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.connection.clone()
    }

    /// Tear the session down: stop the poller, release the channel
    /// subscription, cancel the pending deadline and wait for the session
    /// task to finish.
    pub async fn shutdown(self) {
        let SyncHandle { stop, task, .. } = self;
        let _ = stop.send(());
        let _ = task.await;
    }
}

/// Orchestrator for one display session.
///
/// Owns the view model exclusively and drives it from three inputs: the
/// initial/polled snapshots, the push channel messages and the connection
/// deadline. All mutations happen on one task, so event application is
/// serialized by construction.
pub struct SyncController<F, C> {
    fetcher: F,
    channel: C,
    poller: FallbackPoller,
    ticks: mpsc::Receiver<PollTick>,
}

impl<F, C> SyncController<F, C>
where
    F: SnapshotFetcher + 'static,
    C: ChangeChannel + 'static,
{
    /// Assemble a controller from its collaborators. The tick receiver must
    /// be the one handed out by [`FallbackPoller::new`] for `poller`.
    pub fn new(
        fetcher: F,
        channel: C,
        poller: FallbackPoller,
        ticks: mpsc::Receiver<PollTick>,
    ) -> Self {
        SyncController {
            fetcher,
            channel,
            poller,
            ticks,
        }
    }

    /// Start the session: fire the initial snapshot fetch and open the
    /// change channel concurrently, then run the state machine until
    /// teardown.
    pub fn spawn(self) -> SyncHandle {
        let (teams_tx, teams_rx) = watch::channel(Vec::new());
        let (connection_tx, connection_rx) = watch::channel(ConnectionState::Connecting);
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(teams_tx, connection_tx, stop_rx));
        SyncHandle {
            teams: teams_rx,
            connection: connection_rx,
            stop: stop_tx,
            task,
        }
    }

    async fn run(
        self,
        teams: watch::Sender<Vec<TeamRecord>>,
        connection: watch::Sender<ConnectionState>,
        mut stop: oneshot::Receiver<()>,
    ) {
        let SyncController {
            fetcher,
            mut channel,
            mut poller,
            mut ticks,
        } = self;

        info!("sync session starting");

        let mut view = ViewModel::new();
        let mut phase = SyncPhase::Connecting;
        let mut events = Some(channel.open());
        let mut snapshot_in_flight: Option<SnapshotFuture> = Some(fetcher.fetch());

        let deadline = tokio::time::sleep(CONNECT_DEADLINE);
        tokio::pin!(deadline);
        let mut deadline_armed = true;

        loop {
            tokio::select! {
                _ = &mut stop => break,
                () = &mut deadline, if deadline_armed => {
                    deadline_armed = false;
                    if phase == SyncPhase::Live {
                        debug!("connection deadline elapsed after channel went live");
                    } else {
                        warn!(
                            deadline = ?CONNECT_DEADLINE,
                            "change channel not acknowledged before deadline"
                        );
                        enter_degraded(&mut phase, &mut poller, &connection);
                    }
                }
                message = next_channel_message(&mut events), if events.is_some() => {
                    match message {
                        Some(ChannelMessage::Status(ChannelStatus::Connected)) => {
                            if phase == SyncPhase::Connecting {
                                info!("change channel live");
                                phase = SyncPhase::Live;
                                poller.stop();
                                let _ = connection.send(ConnectionState::Connected);
                            } else {
                                debug!("late channel acknowledgement ignored");
                            }
                        }
                        Some(ChannelMessage::Status(ChannelStatus::Failed(reason))) => {
                            warn!(%reason, "change channel failed");
                            enter_degraded(&mut phase, &mut poller, &connection);
                        }
                        Some(ChannelMessage::Event(event)) => {
                            debug!(team_id = %event.team_id(), "applying change event");
                            if view.apply_event(event) {
                                let _ = teams.send(view.teams().to_vec());
                            }
                        }
                        None => {
                            warn!("change channel stream ended");
                            events = None;
                            enter_degraded(&mut phase, &mut poller, &connection);
                        }
                    }
                }
                result = await_snapshot(&mut snapshot_in_flight), if snapshot_in_flight.is_some() => {
                    snapshot_in_flight = None;
                    match result {
                        Ok(records) => {
                            if view.apply_snapshot(records) {
                                let _ = teams.send(view.teams().to_vec());
                            }
                        }
                        Err(error) => {
                            warn!(error = %error, "snapshot fetch failed, keeping previous view");
                        }
                    }
                }
                Some(PollTick) = ticks.recv() => {
                    if snapshot_in_flight.is_none() {
                        snapshot_in_flight = Some(fetcher.fetch());
                    } else {
                        debug!("snapshot still in flight, skipping poll tick");
                    }
                }
            }
        }

        poller.stop();
        drop(events);
        let _ = connection.send(ConnectionState::Disconnected);
        info!("sync session torn down");
    }
}

/// Move the session to degraded mode and start polling. Calling this while
/// already degraded keeps the existing poll schedule.
fn enter_degraded(
    phase: &mut SyncPhase,
    poller: &mut FallbackPoller,
    connection: &watch::Sender<ConnectionState>,
) {
    if *phase == SyncPhase::Degraded {
        return;
    }
    *phase = SyncPhase::Degraded;
    poller.start();
    let _ = connection.send(ConnectionState::Polling);
}

async fn next_channel_message(
    events: &mut Option<BoxStream<'static, ChannelMessage>>,
) -> Option<ChannelMessage> {
    match events.as_mut() {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

async fn await_snapshot(slot: &mut Option<SnapshotFuture>) -> Result<Vec<TeamRecord>, FetchError> {
    match slot.as_mut() {
        Some(fetch) => fetch.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::model::{ChangeEvent, TeamStatus};
    use crate::sync::poller::POLL_INTERVAL;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::{Instant, advance};
    use tokio_stream::wrappers::UnboundedReceiverStream;
    use uuid::Uuid;

    #[derive(Clone)]
    struct ScriptedFetcher {
        store: Arc<Mutex<Vec<TeamRecord>>>,
        fail: Arc<AtomicBool>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedFetcher {
        fn new(teams: Vec<TeamRecord>) -> Self {
            ScriptedFetcher {
                store: Arc::new(Mutex::new(teams)),
                fail: Arc::new(AtomicBool::new(false)),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn set_store(&self, teams: Vec<TeamRecord>) {
            *self.store.lock().unwrap() = teams;
        }

        fn set_failing(&self, failing: bool) {
            self.fail.store(failing, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SnapshotFetcher for ScriptedFetcher {
        fn fetch(&self) -> BoxFuture<'static, Result<Vec<TeamRecord>, FetchError>> {
            let store = self.store.clone();
            let fail = self.fail.clone();
            let calls = self.calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if fail.load(Ordering::SeqCst) {
                    Err(FetchError::new("scripted failure"))
                } else {
                    Ok(store.lock().unwrap().clone())
                }
            })
        }
    }

    struct ScriptedChannel {
        messages: Option<mpsc::UnboundedReceiver<ChannelMessage>>,
    }

    fn scripted_channel() -> (mpsc::UnboundedSender<ChannelMessage>, ScriptedChannel) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, ScriptedChannel { messages: Some(rx) })
    }

    impl ChangeChannel for ScriptedChannel {
        fn open(&mut self) -> BoxStream<'static, ChannelMessage> {
            match self.messages.take() {
                Some(rx) => UnboundedReceiverStream::new(rx).boxed(),
                None => futures::stream::empty().boxed(),
            }
        }
    }

    fn team_with_id(id: Uuid, name: &str, score: i64) -> TeamRecord {
        TeamRecord {
            id,
            name: name.to_string(),
            score,
            status: TeamStatus::Active,
            last_score_update: None,
        }
    }

    fn team(name: &str, score: i64) -> TeamRecord {
        team_with_id(Uuid::new_v4(), name, score)
    }

    fn spawn_session(fetcher: ScriptedFetcher, channel: ScriptedChannel) -> SyncHandle {
        let (poller, ticks) = FallbackPoller::new(POLL_INTERVAL);
        SyncController::new(fetcher, channel, poller, ticks).spawn()
    }

    async fn wait_for_calls(fetcher: &ScriptedFetcher, at_least: usize) {
        for _ in 0..200 {
            if fetcher.calls() >= at_least {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("fetcher never reached {at_least} calls (got {})", fetcher.calls());
    }

    /// Let every ready task run to quiescence without advancing time.
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn initial_snapshot_populates_the_view_in_canonical_order() {
        let fetcher = ScriptedFetcher::new(vec![team("Beta", 10), team("Alpha", 10)]);
        let (_events, channel) = scripted_channel();
        let handle = spawn_session(fetcher, channel);

        let mut teams = handle.teams();
        teams.changed().await.unwrap();
        let names: Vec<String> = teams.borrow().iter().map(|t| t.name.clone()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn acknowledged_channel_goes_live_and_never_polls() {
        let fetcher = ScriptedFetcher::new(vec![team("Solo", 1)]);
        let (events, channel) = scripted_channel();
        let handle = spawn_session(fetcher.clone(), channel);

        events
            .send(ChannelMessage::Status(ChannelStatus::Connected))
            .unwrap();

        let mut connection = handle.connection();
        connection.changed().await.unwrap();
        assert_eq!(*connection.borrow(), ConnectionState::Connected);

        // The deadline still fires once, but a live session ignores it.
        advance(Duration::from_secs(6)).await;
        settle().await;
        assert_eq!(*connection.borrow(), ConnectionState::Connected);
        assert_eq!(fetcher.calls(), 1, "no poll fetches expected while live");

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn silent_channel_degrades_at_the_deadline_with_poller_running() {
        let fetcher = ScriptedFetcher::new(vec![team("Solo", 1)]);
        let (_events, channel) = scripted_channel();
        let started = Instant::now();
        let handle = spawn_session(fetcher.clone(), channel);

        let mut connection = handle.connection();
        connection.changed().await.unwrap();
        assert_eq!(*connection.borrow(), ConnectionState::Polling);
        assert_eq!(started.elapsed(), CONNECT_DEADLINE);

        // Immediate poll on degrade, then the steady 2s cadence.
        wait_for_calls(&fetcher, 2).await;
        advance(POLL_INTERVAL).await;
        wait_for_calls(&fetcher, 3).await;
        advance(POLL_INTERVAL).await;
        wait_for_calls(&fetcher, 4).await;

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_channel_failure_degrades_immediately() {
        let fetcher = ScriptedFetcher::new(Vec::new());
        let (events, channel) = scripted_channel();
        let started = Instant::now();
        let handle = spawn_session(fetcher.clone(), channel);

        events
            .send(ChannelMessage::Status(ChannelStatus::Failed(
                "subscription refused".to_string(),
            )))
            .unwrap();

        let mut connection = handle.connection();
        connection.changed().await.unwrap();
        assert_eq!(*connection.borrow(), ConnectionState::Polling);
        assert_eq!(started.elapsed(), Duration::ZERO);

        // The deadline fires later regardless; the session must stay in
        // degraded mode without restarting anything.
        advance(CONNECT_DEADLINE).await;
        assert_eq!(*connection.borrow(), ConnectionState::Polling);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn channel_stream_ending_counts_as_failure() {
        let fetcher = ScriptedFetcher::new(Vec::new());
        let (events, channel) = scripted_channel();
        let handle = spawn_session(fetcher, channel);

        drop(events);

        let mut connection = handle.connection();
        connection.changed().await.unwrap();
        assert_eq!(*connection.borrow(), ConnectionState::Polling);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn late_acknowledgement_never_promotes_a_degraded_session() {
        let fetcher = ScriptedFetcher::new(Vec::new());
        let (events, channel) = scripted_channel();
        let handle = spawn_session(fetcher.clone(), channel);

        events
            .send(ChannelMessage::Status(ChannelStatus::Failed(
                "timed out".to_string(),
            )))
            .unwrap();
        let mut connection = handle.connection();
        connection.changed().await.unwrap();
        assert_eq!(*connection.borrow(), ConnectionState::Polling);

        events
            .send(ChannelMessage::Status(ChannelStatus::Connected))
            .unwrap();
        wait_for_calls(&fetcher, 2).await;
        assert_eq!(*connection.borrow(), ConnectionState::Polling);

        // Polling keeps going.
        advance(POLL_INTERVAL).await;
        wait_for_calls(&fetcher, 3).await;

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn events_apply_immediately_while_degraded_and_snapshots_do_not_regress() {
        let id = Uuid::new_v4();
        let fetcher = ScriptedFetcher::new(vec![team_with_id(id, "Alpha", 10)]);
        let (events, channel) = scripted_channel();
        let handle = spawn_session(fetcher.clone(), channel);

        let mut teams = handle.teams();
        teams.changed().await.unwrap();
        assert_eq!(teams.borrow()[0].score, 10);

        events
            .send(ChannelMessage::Status(ChannelStatus::Failed(
                "gone".to_string(),
            )))
            .unwrap();
        wait_for_calls(&fetcher, 2).await;

        events
            .send(ChannelMessage::Event(ChangeEvent::Update(team_with_id(
                id, "Alpha", 50,
            ))))
            .unwrap();
        teams.changed().await.unwrap();
        assert_eq!(teams.borrow()[0].score, 50);

        // Store agrees on the next tick: the identical snapshot must not
        // republish the view.
        fetcher.set_store(vec![team_with_id(id, "Alpha", 50)]);
        advance(POLL_INTERVAL).await;
        wait_for_calls(&fetcher, 3).await;
        settle().await;
        assert!(!teams.has_changed().unwrap());
        assert_eq!(teams.borrow()[0].score, 50);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_keeps_the_previous_view() {
        let fetcher = ScriptedFetcher::new(vec![team("Stable", 7)]);
        let (events, channel) = scripted_channel();
        let handle = spawn_session(fetcher.clone(), channel);

        let mut teams = handle.teams();
        teams.changed().await.unwrap();
        assert_eq!(teams.borrow().len(), 1);

        events
            .send(ChannelMessage::Status(ChannelStatus::Failed(
                "gone".to_string(),
            )))
            .unwrap();
        wait_for_calls(&fetcher, 2).await;

        fetcher.set_failing(true);
        advance(POLL_INTERVAL).await;
        wait_for_calls(&fetcher, 3).await;
        assert_eq!(teams.borrow()[0].name, "Stable");

        // The next healthy tick recovers new data.
        fetcher.set_failing(false);
        fetcher.set_store(vec![team("Stable", 7), team("Fresh", 9)]);
        advance(POLL_INTERVAL).await;
        teams.changed().await.unwrap();
        assert_eq!(teams.borrow().len(), 2);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_polling_and_releases_the_channel() {
        let fetcher = ScriptedFetcher::new(Vec::new());
        let (events, channel) = scripted_channel();
        let handle = spawn_session(fetcher.clone(), channel);

        events
            .send(ChannelMessage::Status(ChannelStatus::Failed(
                "gone".to_string(),
            )))
            .unwrap();
        let mut connection = handle.connection();
        connection.changed().await.unwrap();
        wait_for_calls(&fetcher, 2).await;

        handle.shutdown().await;
        assert_eq!(*connection.borrow(), ConnectionState::Disconnected);

        let calls_at_teardown = fetcher.calls();
        advance(Duration::from_secs(30)).await;
        tokio::task::yield_now().await;
        assert_eq!(fetcher.calls(), calls_at_teardown);

        // The subscription is gone, so scripted sends have no receiver.
        assert!(
            events
                .send(ChannelMessage::Event(ChangeEvent::Delete(Uuid::new_v4())))
                .is_err()
        );
    }
}
