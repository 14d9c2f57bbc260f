//! 针对生命周期通知的按事件发布/订阅机制。
//! Per-event publish/subscribe for lifecycle notifications.
//!
//! Listeners for a given kind fire synchronously, in registration order, on
//! the call path that emitted the event. Subscriptions unregister explicitly
//! (or on drop) so listeners do not leak across reconnect cycles. Emission
//! snapshots the listener list first, so a listener may subscribe or
//! unsubscribe re-entrantly without deadlocking.
//!
//! 对某一事件种类注册的监听器按注册顺序、在发出事件的调用路径上同步触发。
//! 订阅需要显式注销（或随丢弃注销），因此监听器不会跨越重连周期泄漏。
//! 发布前会先对监听器列表做快照，因此监听器可以重入地订阅或取消订阅
//! 而不会死锁。

use crate::error::Error;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// The named lifecycle events a link emits.
/// 链路发出的具名生命周期事件。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A connection was established.
    /// 连接已建立。
    Connect,
    /// A new connect attempt is starting after a backoff wait.
    /// 退避等待结束，新的连接尝试即将开始。
    Reconnect,
    /// The current connection or attempt was torn down.
    /// 当前连接或连接尝试已被拆除。
    Close,
    /// The link transitioned into the reconnecting state.
    /// 链路进入了重连状态。
    Offline,
    /// A failure was observed. Never fatal by itself.
    /// 观察到一次失败。其本身绝不致命。
    Error,
    /// The link reached its terminal ended state.
    /// 链路到达了终态。
    End,
}

/// The payload dispatched to listeners. `H` is the connector's handle type.
/// 分发给监听器的载荷。`H` 是连接器的句柄类型。
pub enum LinkEvent<H> {
    /// Carries the live handle of the freshly established connection.
    /// 携带刚建立连接的活动句柄。
    Connect(Arc<H>),
    /// A new connect attempt is starting.
    /// 新的连接尝试即将开始。
    Reconnect,
    /// Whether the teardown was caused by an error.
    /// 本次拆除是否由错误引起。
    Close {
        /// True when the teardown was caused by an error.
        has_error: bool,
    },
    /// The link went offline and will retry.
    /// 链路离线，将进行重试。
    Offline,
    /// The observed failure.
    /// 观察到的失败。
    Error(Arc<Error>),
    /// The link ended.
    /// 链路已结束。
    End,
}

impl<H> LinkEvent<H> {
    /// The kind this payload is dispatched under.
    /// 该载荷对应的事件种类。
    pub fn kind(&self) -> EventKind {
        match self {
            LinkEvent::Connect(_) => EventKind::Connect,
            LinkEvent::Reconnect => EventKind::Reconnect,
            LinkEvent::Close { .. } => EventKind::Close,
            LinkEvent::Offline => EventKind::Offline,
            LinkEvent::Error(_) => EventKind::Error,
            LinkEvent::End => EventKind::End,
        }
    }
}

impl<H> Clone for LinkEvent<H> {
    fn clone(&self) -> Self {
        match self {
            LinkEvent::Connect(handle) => LinkEvent::Connect(handle.clone()),
            LinkEvent::Reconnect => LinkEvent::Reconnect,
            LinkEvent::Close { has_error } => LinkEvent::Close {
                has_error: *has_error,
            },
            LinkEvent::Offline => LinkEvent::Offline,
            LinkEvent::Error(error) => LinkEvent::Error(error.clone()),
            LinkEvent::End => LinkEvent::End,
        }
    }
}

impl<H> std::fmt::Debug for LinkEvent<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkEvent::Connect(_) => f.write_str("Connect(..)"),
            LinkEvent::Reconnect => f.write_str("Reconnect"),
            LinkEvent::Close { has_error } => {
                f.debug_struct("Close").field("has_error", has_error).finish()
            }
            LinkEvent::Offline => f.write_str("Offline"),
            LinkEvent::Error(error) => f.debug_tuple("Error").field(error).finish(),
            LinkEvent::End => f.write_str("End"),
        }
    }
}

type Listener<H> = Arc<dyn Fn(&LinkEvent<H>) + Send + Sync>;

struct Entry<H> {
    id: u64,
    once: bool,
    listener: Listener<H>,
}

struct BusState<H> {
    next_id: u64,
    listeners: HashMap<EventKind, Vec<Entry<H>>>,
}

/// Fan-out notification bus with independent listener lists per event kind.
/// 按事件种类维护独立监听器列表的扇出通知总线。
pub struct EventBus<H> {
    state: Mutex<BusState<H>>,
}

impl<H> EventBus<H> {
    /// Creates an empty bus.
    /// 创建一个空总线。
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BusState {
                next_id: 1,
                listeners: HashMap::new(),
            }),
        }
    }

    /// Registers `listener` for `kind`. It fires on every matching emission
    /// until the returned [`Subscription`] unregisters it.
    ///
    /// 为 `kind` 注册 `listener`。在返回的 [`Subscription`] 注销之前，
    /// 它会在每次匹配的事件发布时触发。
    pub fn on(
        self: &Arc<Self>,
        kind: EventKind,
        listener: impl Fn(&LinkEvent<H>) + Send + Sync + 'static,
    ) -> Subscription<H> {
        self.subscribe(kind, false, Arc::new(listener))
    }

    /// Like [`EventBus::on`], but the listener is removed right before its
    /// first invocation runs.
    ///
    /// 与 [`EventBus::on`] 类似，但监听器会在第一次调用执行之前被移除。
    pub fn once(
        self: &Arc<Self>,
        kind: EventKind,
        listener: impl Fn(&LinkEvent<H>) + Send + Sync + 'static,
    ) -> Subscription<H> {
        self.subscribe(kind, true, Arc::new(listener))
    }

    fn subscribe(self: &Arc<Self>, kind: EventKind, once: bool, listener: Listener<H>) -> Subscription<H> {
        let mut state = lock_state(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        state
            .listeners
            .entry(kind)
            .or_default()
            .push(Entry { id, once, listener });
        Subscription {
            bus: Arc::downgrade(self),
            kind,
            id,
        }
    }

    /// Dispatches the event to its kind's listeners in registration order.
    /// 按注册顺序把事件分发给对应种类的监听器。
    pub fn emit(&self, event: &LinkEvent<H>) {
        let batch: Vec<Listener<H>> = {
            let mut state = lock_state(&self.state);
            let Some(entries) = state.listeners.get_mut(&event.kind()) else {
                return;
            };
            let batch = entries.iter().map(|entry| entry.listener.clone()).collect();
            entries.retain(|entry| !entry.once);
            batch
        };

        for listener in batch {
            listener(event);
        }
    }

    fn remove(&self, kind: EventKind, id: u64) {
        let mut state = lock_state(&self.state);
        if let Some(entries) = state.listeners.get_mut(&kind) {
            entries.retain(|entry| entry.id != id);
        }
    }
}

impl<H> Default for EventBus<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> std::fmt::Debug for EventBus<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock_state(&self.state);
        let count: usize = state.listeners.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("listener_count", &count)
            .finish()
    }
}

fn lock_state<H>(state: &Mutex<BusState<H>>) -> MutexGuard<'_, BusState<H>> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Keeps one listener registered. Dropping it unregisters the listener;
/// call [`Subscription::detach`] to keep the listener for the life of the bus.
///
/// 维持一个监听器的注册。丢弃它会注销监听器；
/// 调用 [`Subscription::detach`] 可让监听器在总线存续期间一直保留。
#[must_use = "dropping a Subscription unregisters the listener; call detach() to keep it"]
pub struct Subscription<H> {
    bus: Weak<EventBus<H>>,
    kind: EventKind,
    id: u64,
}

impl<H> Subscription<H> {
    /// Unregisters the listener now.
    /// 立即注销监听器。
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    /// Leaves the listener registered for the life of the bus.
    /// 让监听器在总线存续期间一直保持注册。
    pub fn detach(mut self) {
        self.bus = Weak::new();
    }

    fn remove(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.kind, self.id);
        }
        self.bus = Weak::new();
    }
}

impl<H> Drop for Subscription<H> {
    fn drop(&mut self) {
        self.remove();
    }
}

impl<H> std::fmt::Debug for Subscription<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}
