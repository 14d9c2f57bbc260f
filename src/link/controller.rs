//! 生命周期控制器。拥有状态机、连接超时竞速、重连退避竞速与保活子状态机。
//! The lifecycle controller. Owns the state machine, the connect-timeout
//! race, the reconnect-backoff race and the keepalive sub-machine.
//!
//! All transitions happen under one mutex. Events are queued under that lock
//! and delivered through a single ordered dispatch queue after it is
//! released, so listeners observe a serialized, in-order stream and may call
//! back into the link freely.
//!
//! 所有迁移都在同一把互斥锁下进行。事件在锁内入队，释放锁之后经由
//! 单一有序分发队列送出，因此监听器观察到的是串行有序的事件流，
//! 并且可以自由地回调链路。

use crate::backoff::RetryPolicy;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::connector::Connector;
use crate::error::Error;
use crate::event::{EventBus, EventKind, LinkEvent, Subscription};
use crate::link::signals::Signals;
use crate::link::state::LinkState;
use crate::timer::RearmTimer;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// 排队的手动重连请求。在 Ending 期间最多只存在一个。
/// A queued manual reconnect request. At most one exists during Ending.
struct DeferredReconnect {
    cancel: Option<CancelToken>,
}

/// 锁保护的可变部分。
/// The mutex-guarded mutable half.
struct Guarded<C: Connector> {
    state: LinkState,
    handle: Option<Arc<C::Handle>>,
    heartbeat_seen: bool,
    /// Failed attempts in the current cycle. Reset to zero on success.
    /// 当前周期内的失败次数。成功后清零。
    attempt: u32,
    connect_token: Option<CancelToken>,
    backoff_token: Option<CancelToken>,
    keepalive: Option<RearmTimer>,
    deferred_reconnect: Option<DeferredReconnect>,
    last_error: Option<Arc<Error>>,
}

type Pending<C> = Vec<LinkEvent<<C as Connector>::Handle>>;

/// 待分发的事件批次。批次按到达顺序由单一排空者送出，
/// 因此监听器观察到的是一条全局有序的事件流。
/// Queued event batches. Batches are delivered by a single drainer in
/// arrival order, so listeners observe one globally ordered event stream.
struct Dispatch<C: Connector> {
    queue: VecDeque<LinkEvent<C::Handle>>,
    draining: bool,
}

pub(crate) struct LinkCore<C: Connector> {
    connector: C,
    config: Config,
    events: Arc<EventBus<C::Handle>>,
    /// Bumped on every arrival at Ended. Monotonic, so end waiters cannot
    /// miss a terminal state that a deferred reconnect immediately leaves.
    ///
    /// 每次到达 Ended 时递增。单调递增，因此即使被推迟的重连立刻离开终态，
    /// 等待者也不会错过它。
    ended_gen: watch::Sender<u64>,
    dispatch: Mutex<Dispatch<C>>,
    guarded: Mutex<Guarded<C>>,
}

impl<C: Connector> LinkCore<C> {
    fn new(connector: C, config: Config) -> Self {
        let (ended_gen, _) = watch::channel(0u64);
        Self {
            connector,
            config,
            events: Arc::new(EventBus::new()),
            ended_gen,
            dispatch: Mutex::new(Dispatch {
                queue: VecDeque::new(),
                draining: false,
            }),
            guarded: Mutex::new(Guarded {
                state: LinkState::Idle,
                handle: None,
                heartbeat_seen: false,
                attempt: 0,
                connect_token: None,
                backoff_token: None,
                keepalive: None,
                deferred_reconnect: None,
                last_error: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Guarded<C>> {
        self.guarded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Delivers a batch of events in order. All batches funnel through one
    /// queue with a single drainer, so concurrent feeders cannot interleave
    /// and a batch produced inside a listener is delivered after the current
    /// one.
    ///
    /// 按顺序送出一批事件。所有批次汇入同一条队列并由单一排空者送出，
    /// 因此并发的投喂方不会交错，监听器内部产生的批次会排在当前批次之后。
    fn emit_all(&self, pending: Pending<C>) {
        {
            let mut d = self
                .dispatch
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            d.queue.extend(pending);
            if d.draining {
                return;
            }
            d.draining = true;
        }
        loop {
            let event = {
                let mut d = self
                    .dispatch
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                match d.queue.pop_front() {
                    Some(event) => event,
                    None => {
                        d.draining = false;
                        return;
                    }
                }
            };
            self.events.emit(&event);
        }
    }

    /// Applies a lifecycle step, refusing illegal ones.
    /// 应用一次生命周期步骤，拒绝非法迁移。
    fn transition(&self, g: &mut Guarded<C>, target: LinkState) -> bool {
        if !g.state.can_transition_to(target) {
            tracing::warn!(from = %g.state, to = %target, "illegal lifecycle transition ignored");
            return false;
        }
        tracing::debug!(from = %g.state, to = %target, "lifecycle transition");
        g.state = target;
        if target == LinkState::Ended {
            self.ended_gen.send_modify(|generation| *generation += 1);
        }
        true
    }

    // ---- connect attempts ------------------------------------------------

    /// Launches one connect attempt raced against the configured timeout.
    /// The caller holds the lock; at most one attempt is ever in flight.
    ///
    /// 发起一次与配置超时竞速的连接尝试。调用者持有锁；
    /// 任何时刻最多只有一次尝试在进行。
    fn spawn_connect(self: &Arc<Self>, g: &mut Guarded<C>) {
        let token = CancelToken::new();
        g.connect_token = Some(token.clone());
        let attempt = g.attempt;
        let signals = Signals {
            core: Arc::downgrade(self),
        };
        let timeout = self.config.connect_timeout;
        let core = self.clone();
        tokio::spawn(async move {
            tracing::debug!(failed_attempts = attempt, "starting connect attempt");
            let open_token = token.child();
            let result = tokio::select! {
                result = core.connector.open(signals, open_token.clone()) => result,
                _ = tokio::time::sleep(timeout) => {
                    open_token.cancel();
                    Err(Error::ConnectTimeout)
                }
                _ = token.cancelled() => return,
            };
            match result {
                Ok(handle) => core.on_connect_resolved(&token, handle),
                Err(error) => core.on_connect_failed(&token, error),
            }
        });
    }

    fn on_connect_resolved(self: &Arc<Self>, token: &CancelToken, handle: C::Handle) {
        let handle = Arc::new(handle);
        let pending = {
            let mut g = self.lock();
            let current = g
                .connect_token
                .as_ref()
                .is_some_and(|t| t.same_signal(token));
            if !current {
                tracing::debug!("connection from a superseded attempt, closing it");
                drop(g);
                self.spawn_close(handle, true);
                return;
            }
            g.connect_token = None;
            g.handle = Some(handle.clone());
            g.attempt = 0;
            g.last_error = None;
            self.transition(&mut g, LinkState::Connected);
            self.arm_keepalive(&mut g);
            vec![LinkEvent::Connect(handle)]
        };
        self.emit_all(pending);
    }

    fn on_connect_failed(self: &Arc<Self>, token: &CancelToken, error: Error) {
        let pending = {
            let mut g = self.lock();
            let current = g
                .connect_token
                .as_ref()
                .is_some_and(|t| t.same_signal(token));
            if !current {
                return;
            }
            g.connect_token = None;
            let error = Arc::new(error);
            tracing::debug!(error = %error, "connect attempt failed");
            g.last_error = Some(error.clone());
            let mut pending = vec![LinkEvent::Error(error.clone())];
            self.closed_path(&mut g, true, &error, &mut pending);
            pending
        };
        self.emit_all(pending);
    }

    // ---- closed path and retry scheduling --------------------------------

    /// The closed path: tear down keepalive, report the closure, enter
    /// Reconnecting (emitting `Offline` on first entry) and schedule a retry.
    ///
    /// 关闭路径：拆除保活、报告关闭、进入 Reconnecting
    /// （首次进入时发出 `Offline`）并调度重试。
    fn closed_path(
        self: &Arc<Self>,
        g: &mut Guarded<C>,
        has_error: bool,
        cause: &Error,
        pending: &mut Pending<C>,
    ) {
        g.keepalive = None;
        g.heartbeat_seen = false;
        pending.push(LinkEvent::Close { has_error });
        if matches!(g.state, LinkState::Ending | LinkState::Ended) {
            return;
        }
        let was_reconnecting = g.state == LinkState::Reconnecting;
        if !self.transition(g, LinkState::Reconnecting) {
            return;
        }
        if !was_reconnecting {
            pending.push(LinkEvent::Offline);
        }
        self.schedule_retry(g, cause, pending);
    }

    /// Counts the failure, consults policy and predicate, and either starts
    /// a cancellable backoff wait or parks the link in Ended.
    ///
    /// 计入此次失败，咨询策略与断言，然后要么启动一次可取消的退避等待，
    /// 要么将链路停驻在 Ended。
    fn schedule_retry(self: &Arc<Self>, g: &mut Guarded<C>, cause: &Error, pending: &mut Pending<C>) {
        g.attempt += 1;
        let attempt = g.attempt;
        let policy: &RetryPolicy = &self.config.retry;

        // Exhaustion wins over the predicate when both would apply.
        // 两者同时适用时，以次数用尽为准。
        if policy.is_exhausted(attempt) {
            self.park_exhausted(g, Error::RetriesExhausted { attempts: attempt }, pending);
            return;
        }
        if let Some(predicate) = &policy.predicate {
            if !predicate(cause, attempt) {
                self.park_exhausted(g, Error::RetryRefused { attempts: attempt }, pending);
                return;
            }
        }
        let Some(delay) = policy.delay_for(attempt) else {
            self.park_exhausted(g, Error::RetriesExhausted { attempts: attempt }, pending);
            return;
        };

        tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "backoff wait scheduled");
        let token = CancelToken::new();
        g.backoff_token = Some(token.clone());
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = token.cancelled() => return,
            }
            if let Some(core) = weak.upgrade() {
                core.on_backoff_elapsed(&token);
            }
        });
    }

    /// Automatic retry gave up. The link parks in Ended without an `End`
    /// event; only a manual reconnect revives it.
    ///
    /// 自动重试放弃。链路停驻在 Ended 而不发出 `End` 事件；
    /// 只有手动重连才能复活它。
    fn park_exhausted(&self, g: &mut Guarded<C>, error: Error, pending: &mut Pending<C>) {
        let error = Arc::new(error);
        tracing::warn!(error = %error, "giving up on automatic reconnect");
        g.last_error = Some(error.clone());
        g.connect_token = None;
        g.backoff_token = None;
        g.keepalive = None;
        self.transition(g, LinkState::Ended);
        pending.push(LinkEvent::Error(error));
    }

    fn on_backoff_elapsed(self: &Arc<Self>, token: &CancelToken) {
        let pending = {
            let mut g = self.lock();
            let current = g
                .backoff_token
                .as_ref()
                .is_some_and(|t| t.same_signal(token));
            if !current || g.state != LinkState::Reconnecting {
                return;
            }
            g.backoff_token = None;
            if let Some(stale) = g.handle.take() {
                self.spawn_close(stale, false);
            }
            self.spawn_connect(&mut g);
            vec![LinkEvent::Reconnect]
        };
        self.emit_all(pending);
    }

    // ---- keepalive -------------------------------------------------------

    /// Arms the keepalive timer on entry to Connected. A zero interval
    /// disables the sub-machine entirely.
    ///
    /// 进入 Connected 时装填保活定时器。间隔为零则完全禁用该子状态机。
    fn arm_keepalive(self: &Arc<Self>, g: &mut Guarded<C>) {
        let interval = self.config.keepalive_interval;
        g.heartbeat_seen = true;
        if interval.is_zero() {
            return;
        }
        let weak = Arc::downgrade(self);
        let timer = RearmTimer::spawn(move || {
            if let Some(core) = weak.upgrade() {
                core.on_keepalive_tick();
            }
        });
        timer.rearm(interval);
        g.keepalive = Some(timer);
    }

    /// One liveness check. A seen heartbeat rearms the window and sends a
    /// fire-and-forget ping; a missed one force-closes the connection.
    ///
    /// 一次存活检查。见到心跳则重置窗口并发送即发即弃的 ping；
    /// 未见心跳则强制关闭连接。
    fn on_keepalive_tick(self: &Arc<Self>) {
        let (pending, ping) = {
            let mut g = self.lock();
            if g.state != LinkState::Connected {
                return;
            }
            if g.heartbeat_seen {
                g.heartbeat_seen = false;
                if let Some(timer) = &g.keepalive {
                    timer.rearm(self.config.keepalive_interval);
                }
                (Vec::new(), g.handle.clone())
            } else {
                tracing::warn!("no heartbeat within the keepalive window, forcing close");
                if let Some(dead) = g.handle.take() {
                    self.spawn_close(dead, true);
                }
                let mut pending = Vec::new();
                self.closed_path(&mut g, true, &Error::ConnectionClosed, &mut pending);
                (pending, None)
            }
        };
        self.emit_all(pending);
        if let Some(handle) = ping {
            let core = self.clone();
            tokio::spawn(async move {
                if let Err(error) = core.connector.ping(&handle).await {
                    tracing::warn!(error = %error, "keepalive ping failed");
                    core.report_error(error);
                }
            });
        }
    }

    pub(crate) fn reschedule_ping_timer(&self) {
        let g = self.lock();
        if g.state != LinkState::Connected {
            return;
        }
        if let Some(timer) = &g.keepalive {
            timer.rearm(self.config.keepalive_interval);
        }
    }

    // ---- external feeds --------------------------------------------------

    pub(crate) fn feed_heartbeat(&self) {
        let mut g = self.lock();
        if g.state == LinkState::Connected {
            g.heartbeat_seen = true;
        }
    }

    pub(crate) fn feed_error(self: &Arc<Self>, error: Error) {
        let pending = {
            let mut g = self.lock();
            if g.state != LinkState::Connected {
                tracing::debug!(state = %g.state, error = %error, "error fed while not connected, ignored");
                return;
            }
            let error = Arc::new(error);
            g.last_error = Some(error.clone());
            let mut pending = vec![LinkEvent::Error(error.clone())];
            self.closed_path(&mut g, true, &error, &mut pending);
            pending
        };
        self.emit_all(pending);
    }

    pub(crate) fn feed_close(self: &Arc<Self>, error: Option<Error>) {
        let pending = {
            let mut g = self.lock();
            if g.state != LinkState::Connected {
                tracing::debug!(state = %g.state, "close fed while not connected, ignored");
                return;
            }
            let mut pending = Vec::new();
            let has_error = error.is_some();
            let cause = match error {
                Some(error) => {
                    let error = Arc::new(error);
                    g.last_error = Some(error.clone());
                    pending.push(LinkEvent::Error(error.clone()));
                    error
                }
                None => Arc::new(Error::ConnectionClosed),
            };
            self.closed_path(&mut g, has_error, &cause, &mut pending);
            pending
        };
        self.emit_all(pending);
    }

    fn report_error(&self, error: Error) {
        let event = {
            let mut g = self.lock();
            let error = Arc::new(error);
            g.last_error = Some(error.clone());
            LinkEvent::Error(error)
        };
        self.emit_all(vec![event]);
    }

    fn spawn_close(self: &Arc<Self>, handle: Arc<C::Handle>, force: bool) {
        let core = self.clone();
        tokio::spawn(async move {
            if let Err(error) = core.connector.close(&handle, force).await {
                tracing::warn!(error = %error, force, "connector close failed");
                core.report_error(error);
            }
        });
    }

    // ---- end and reconnect -----------------------------------------------

    /// Begins a deliberate shutdown. Idempotent; later calls just return
    /// another waiter for the same terminal state.
    ///
    /// 开始一次主动关闭。幂等；后续调用只是返回同一终态的另一个等待器。
    pub(crate) fn end(self: &Arc<Self>, force: bool) -> EndWait {
        let mut g = self.lock();
        // The target generation is fixed under the lock, so the waiter
        // resolves for this shutdown even if a deferred reconnect leaves
        // Ended again before it polls.
        //
        // 目标代号在锁内确定，因此即使被推迟的重连在等待者轮询前
        // 再次离开 Ended，等待者也会因这次关闭而完成。
        let reached = *self.ended_gen.borrow();
        let target = if g.state == LinkState::Ended {
            reached
        } else {
            reached + 1
        };
        let wait = EndWait {
            rx: self.ended_gen.subscribe(),
            target,
        };
        if matches!(g.state, LinkState::Ending | LinkState::Ended) {
            tracing::debug!(state = %g.state, "end requested again, ignored");
            return wait;
        }
        if let Some(token) = g.connect_token.take() {
            token.cancel();
        }
        if let Some(token) = g.backoff_token.take() {
            token.cancel();
        }
        g.keepalive = None;
        self.transition(&mut g, LinkState::Ending);
        let handle = g.handle.take();
        let core = self.clone();
        tokio::spawn(async move {
            core.finish_end(handle, force).await;
        });
        wait
    }

    /// Closes the handle (if any), reaches Ended, emits `Close`/`End`, then
    /// runs a reconnect that was deferred during Ending.
    ///
    /// 关闭句柄（如有）、到达 Ended、发出 `Close`/`End`，
    /// 然后执行在 Ending 期间被推迟的重连。
    async fn finish_end(self: Arc<Self>, handle: Option<Arc<C::Handle>>, force: bool) {
        let had_handle = handle.is_some();
        if let Some(handle) = handle {
            if let Err(error) = self.connector.close(&handle, force).await {
                tracing::warn!(error = %error, "connector close failed during shutdown");
                self.report_error(error);
            }
        }
        let (pending, deferred) = {
            let mut g = self.lock();
            if g.state != LinkState::Ending {
                return;
            }
            let mut pending = Vec::new();
            if had_handle {
                pending.push(LinkEvent::Close { has_error: false });
            }
            self.transition(&mut g, LinkState::Ended);
            pending.push(LinkEvent::End);
            (pending, g.deferred_reconnect.take())
        };
        self.emit_all(pending);
        if let Some(deferred) = deferred {
            let cancelled = deferred.cancel.as_ref().is_some_and(CancelToken::is_cancelled);
            if !cancelled {
                tracing::debug!("running reconnect deferred during shutdown");
                self.reconnect(None);
            }
        }
    }

    /// Manual reconnect request. Behavior depends on the current state; see
    /// the transition table in [`LinkState`].
    ///
    /// 手动重连请求。行为取决于当前状态；见 [`LinkState`] 的迁移表。
    pub(crate) fn reconnect(self: &Arc<Self>, cancel: Option<CancelToken>) {
        if cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return;
        }
        let pending = {
            let mut g = self.lock();
            match g.state {
                LinkState::Ending => {
                    // Queued for right after Ended; the first request wins.
                    // 排队到 Ended 之后立即执行；以第一个请求为准。
                    if g.deferred_reconnect.is_none() {
                        g.deferred_reconnect = Some(DeferredReconnect { cancel });
                    }
                    return;
                }
                LinkState::Idle | LinkState::Ended => {
                    g.attempt = 0;
                    g.last_error = None;
                    self.transition(&mut g, LinkState::Connecting);
                    self.spawn_connect(&mut g);
                    Vec::new()
                }
                LinkState::Reconnecting => {
                    if g.connect_token.is_some() {
                        // An attempt is already in flight.
                        return;
                    }
                    if let Some(token) = g.backoff_token.take() {
                        token.cancel();
                    }
                    if let Some(stale) = g.handle.take() {
                        self.spawn_close(stale, false);
                    }
                    self.spawn_connect(&mut g);
                    vec![LinkEvent::Reconnect]
                }
                LinkState::Connecting | LinkState::Connected => return,
            }
        };
        self.emit_all(pending);
    }
}

/// Resolves once the shutdown it was issued for reaches Ended.
/// 在发起它的那次关闭到达 Ended 时完成。
#[derive(Debug)]
pub struct EndWait {
    rx: watch::Receiver<u64>,
    target: u64,
}

impl EndWait {
    /// Waits until the link has ended at least once since this waiter was
    /// issued. Returns immediately if it already has.
    ///
    /// 等待链路自本等待器发出以来至少到达过一次 Ended。若已到达则立即返回。
    pub async fn wait(mut self) {
        loop {
            if *self.rx.borrow_and_update() >= self.target {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// A resilient logical connection.
///
/// Wraps the lifecycle controller behind a cheaply cloneable handle. The
/// connection mechanics come from the caller's [`Connector`]; the link
/// supplies the policy: when to (re)connect, how long to back off, when to
/// give up, and when to declare a connection dead.
///
/// 一条具备韧性的逻辑连接。
///
/// 将生命周期控制器封装在可廉价克隆的句柄之后。连接机制来自调用方的
/// [`Connector`]；链路提供策略：何时（重新）连接、退避多久、何时放弃，
/// 以及何时判定连接已死。
pub struct Link<C: Connector> {
    core: Arc<LinkCore<C>>,
}

impl<C: Connector> Link<C> {
    /// Creates an idle link that will not connect until asked to.
    /// 创建一条空闲链路，在被要求之前不会连接。
    pub fn new(connector: C, config: Config) -> Self {
        Self {
            core: Arc::new(LinkCore::new(connector, config)),
        }
    }

    /// Creates a link and immediately starts its first connect attempt.
    /// 创建链路并立即开始第一次连接尝试。
    pub fn connect(connector: C, config: Config) -> Self {
        let link = Self::new(connector, config);
        link.core.reconnect(None);
        link
    }

    /// The current lifecycle state.
    /// 当前的生命周期状态。
    pub fn state(&self) -> LinkState {
        self.core.lock().state
    }

    /// Whether the link is in its terminal state.
    /// 链路是否处于终态。
    pub fn is_ended(&self) -> bool {
        self.state() == LinkState::Ended
    }

    /// The current connection handle. Live while connected; after a failure
    /// the closed handle may linger through Reconnecting until the next
    /// attempt starts.
    ///
    /// 当前连接句柄。连接期间有效；失败后已关闭的句柄可能在 Reconnecting
    /// 期间保留，直到下一次尝试开始。
    pub fn handle(&self) -> Option<Arc<C::Handle>> {
        self.core.lock().handle.clone()
    }

    /// Failed attempts in the current reconnect cycle.
    /// 当前重连周期内的失败次数。
    pub fn attempts(&self) -> u32 {
        self.core.lock().attempt
    }

    /// The most recent failure, if any.
    /// 最近一次失败（如有）。
    pub fn last_error(&self) -> Option<Arc<Error>> {
        self.core.lock().last_error.clone()
    }

    /// Subscribes a listener for `kind`.
    /// 为 `kind` 订阅一个监听器。
    pub fn on(
        &self,
        kind: EventKind,
        listener: impl Fn(&LinkEvent<C::Handle>) + Send + Sync + 'static,
    ) -> Subscription<C::Handle> {
        self.core.events.on(kind, listener)
    }

    /// Subscribes a listener that fires at most once.
    /// 订阅一个最多触发一次的监听器。
    pub fn once(
        &self,
        kind: EventKind,
        listener: impl Fn(&LinkEvent<C::Handle>) + Send + Sync + 'static,
    ) -> Subscription<C::Handle> {
        self.core.events.once(kind, listener)
    }

    /// Requests a reconnect. Safe in every state; deferred during Ending.
    /// 请求重连。任何状态下都安全；Ending 期间会被推迟。
    pub fn reconnect(&self) {
        self.core.reconnect(None);
    }

    /// Like [`Link::reconnect`], but the request is dropped if `cancel`
    /// fires before it runs.
    ///
    /// 与 [`Link::reconnect`] 类似，但若 `cancel` 在请求执行前触发，
    /// 该请求会被丢弃。
    pub fn reconnect_with(&self, cancel: CancelToken) {
        self.core.reconnect(Some(cancel));
    }

    /// Shuts the link down, gracefully or forcefully. Idempotent.
    /// 关闭链路，可优雅或强制。幂等。
    pub fn end(&self, force: bool) -> EndWait {
        self.core.end(force)
    }

    /// See [`Signals::feed_heartbeat`].
    pub fn feed_heartbeat(&self) {
        self.core.feed_heartbeat();
    }

    /// See [`Signals::feed_close`].
    pub fn feed_close(&self, error: Option<Error>) {
        self.core.feed_close(error);
    }

    /// See [`Signals::feed_error`].
    pub fn feed_error(&self, error: Error) {
        self.core.feed_error(error);
    }

    /// See [`Signals::reschedule_ping_timer`].
    pub fn reschedule_ping_timer(&self) {
        self.core.reschedule_ping_timer();
    }

    /// A feed handle for the connection side, holding only a weak reference.
    /// 供连接一侧使用的反馈句柄，仅持有弱引用。
    pub fn signals(&self) -> Signals<C> {
        Signals {
            core: Arc::downgrade(&self.core),
        }
    }
}

impl<C: Connector> Clone for Link<C> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<C: Connector> std::fmt::Debug for Link<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let g = self.core.lock();
        f.debug_struct("Link")
            .field("state", &g.state)
            .field("attempt", &g.attempt)
            .field("has_handle", &g.handle.is_some())
            .finish()
    }
}
