//! tests/common/harness.rs
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tether::cancel::CancelToken;
use tether::connector::Connector;
use tether::error::{Error, Result};
use tether::event::{EventKind, LinkEvent, Subscription};
use tether::link::{Link, Signals};

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "tether=debug".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// What the next `open` call of a [`ScriptedConnector`] should do.
#[derive(Debug, Clone, Copy)]
pub enum OpenOutcome {
    /// Resolve with a fresh handle after the delay.
    Ok(Duration),
    /// Reject after the delay.
    Fail(Duration),
    /// Never resolve; only cancellation releases the attempt.
    Hang,
}

/// The handle type produced by the scripted connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestHandle {
    pub id: u32,
}

struct ScriptState {
    plan: Mutex<VecDeque<OpenOutcome>>,
    fallback: OpenOutcome,
    close_delay: Mutex<Duration>,
    fail_pings: AtomicBool,
    opens: AtomicU32,
    closes: AtomicU32,
    forced_closes: AtomicU32,
    pings: AtomicU32,
}

/// A connector whose `open` outcomes follow a per-test script, falling back
/// to a fixed outcome once the script runs out. Clones share counters, so a
/// test can hand one clone to the link and keep another for assertions.
#[derive(Clone)]
pub struct ScriptedConnector {
    state: Arc<ScriptState>,
}

impl ScriptedConnector {
    pub fn new(fallback: OpenOutcome) -> Self {
        Self {
            state: Arc::new(ScriptState {
                plan: Mutex::new(VecDeque::new()),
                fallback,
                close_delay: Mutex::new(Duration::ZERO),
                fail_pings: AtomicBool::new(false),
                opens: AtomicU32::new(0),
                closes: AtomicU32::new(0),
                forced_closes: AtomicU32::new(0),
                pings: AtomicU32::new(0),
            }),
        }
    }

    /// Every open succeeds immediately.
    pub fn always_ok() -> Self {
        Self::new(OpenOutcome::Ok(Duration::ZERO))
    }

    /// Every open fails immediately.
    pub fn always_failing() -> Self {
        Self::new(OpenOutcome::Fail(Duration::ZERO))
    }

    /// Queues outcomes consumed before the fallback applies.
    pub fn plan(&self, outcomes: impl IntoIterator<Item = OpenOutcome>) {
        self.state.plan.lock().unwrap().extend(outcomes);
    }

    /// Makes every `close` call take `delay` before resolving.
    pub fn set_close_delay(&self, delay: Duration) {
        *self.state.close_delay.lock().unwrap() = delay;
    }

    /// Makes every subsequent `ping` call fail.
    pub fn set_fail_pings(&self, fail: bool) {
        self.state.fail_pings.store(fail, Ordering::SeqCst);
    }

    pub fn opens(&self) -> u32 {
        self.state.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> u32 {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn forced_closes(&self) -> u32 {
        self.state.forced_closes.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> u32 {
        self.state.pings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Handle = TestHandle;

    async fn open(&self, _signals: Signals<Self>, token: CancelToken) -> Result<TestHandle> {
        let id = self.state.opens.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .state
            .plan
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.state.fallback);
        match outcome {
            OpenOutcome::Ok(delay) => {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => Ok(TestHandle { id }),
                    _ = token.cancelled() => Err(Error::Cancelled),
                }
            }
            OpenOutcome::Fail(delay) => {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        Err(Error::Connector("scripted open failure".into()))
                    }
                    _ = token.cancelled() => Err(Error::Cancelled),
                }
            }
            OpenOutcome::Hang => {
                token.cancelled().await;
                Err(Error::Cancelled)
            }
        }
    }

    async fn close(&self, _handle: &TestHandle, force: bool) -> Result<()> {
        let delay = *self.state.close_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        if force {
            self.state.forced_closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn ping(&self, _handle: &TestHandle) -> Result<()> {
        self.state.pings.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_pings.load(Ordering::SeqCst) {
            Err(Error::Connector("scripted ping failure".into()))
        } else {
            Ok(())
        }
    }
}

/// A plain-data snapshot of one emitted event, for ordering assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    Connect(u32),
    Reconnect,
    Close { has_error: bool },
    Offline,
    Error(String),
    End,
}

impl RecordedEvent {
    fn from_event(event: &LinkEvent<TestHandle>) -> Self {
        match event {
            LinkEvent::Connect(handle) => RecordedEvent::Connect(handle.id),
            LinkEvent::Reconnect => RecordedEvent::Reconnect,
            LinkEvent::Close { has_error } => RecordedEvent::Close {
                has_error: *has_error,
            },
            LinkEvent::Offline => RecordedEvent::Offline,
            LinkEvent::Error(error) => RecordedEvent::Error(error.to_string()),
            LinkEvent::End => RecordedEvent::End,
        }
    }
}

/// Records every event a link emits, in emission order, for the lifetime of
/// the held subscriptions.
pub struct EventLog {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
    _subs: Vec<Subscription<TestHandle>>,
}

impl EventLog {
    pub fn attach(link: &Link<ScriptedConnector>) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let kinds = [
            EventKind::Connect,
            EventKind::Reconnect,
            EventKind::Close,
            EventKind::Offline,
            EventKind::Error,
            EventKind::End,
        ];
        let subs = kinds
            .into_iter()
            .map(|kind| {
                let events = events.clone();
                link.on(kind, move |event| {
                    events.lock().unwrap().push(RecordedEvent::from_event(event));
                })
            })
            .collect();
        Self {
            events,
            _subs: subs,
        }
    }

    pub fn snapshot(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&RecordedEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| matches(e)).count()
    }
}
