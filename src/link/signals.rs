//! 连接向状态机回报情况的反馈通道。
//! The feedback path a connection uses to report back into the state machine.

use crate::connector::Connector;
use crate::error::Error;
use crate::link::controller::LinkCore;
use std::sync::Weak;

/// A cheap, cloneable handle a connection uses to feed liveness and failure
/// signals back into its [`Link`](crate::link::Link).
///
/// Holds only a weak reference, so a connection keeping its `Signals` alive
/// never keeps a dropped link alive. All methods are no-ops once the link is
/// gone or once the signal no longer applies to the current connection.
///
/// 连接用来向其 [`Link`](crate::link::Link) 回馈存活与失败信号的
/// 轻量可克隆句柄。
///
/// 仅持有弱引用，因此连接保留 `Signals` 不会延长已丢弃链路的生命周期。
/// 一旦链路消失，或信号不再适用于当前连接，所有方法都成为空操作。
pub struct Signals<C: Connector> {
    pub(super) core: Weak<LinkCore<C>>,
}

impl<C: Connector> Signals<C> {
    /// Reports proof of life from the peer. Clears the keepalive miss flag.
    /// 报告来自对端的存活证明。清除保活未命中标记。
    pub fn feed_heartbeat(&self) {
        if let Some(core) = self.core.upgrade() {
            core.feed_heartbeat();
        }
    }

    /// Reports that the connection closed underneath the link.
    ///
    /// `error` carries the cause when the closure was not clean. Triggers the
    /// reconnect path.
    ///
    /// 报告连接已在链路之下关闭。
    ///
    /// 关闭不干净时 `error` 携带原因。会触发重连路径。
    pub fn feed_close(&self, error: Option<Error>) {
        if let Some(core) = self.core.upgrade() {
            core.feed_close(error);
        }
    }

    /// Reports a non-fatal failure observed on the connection.
    /// 报告连接上观察到的非致命失败。
    pub fn feed_error(&self, error: Error) {
        if let Some(core) = self.core.upgrade() {
            core.feed_error(error);
        }
    }

    /// Pushes the next keepalive probe a full interval into the future.
    ///
    /// Call this whenever application traffic already proves liveness, to
    /// avoid redundant pings.
    ///
    /// 将下一次保活探测推迟整整一个间隔。
    ///
    /// 当应用流量已能证明存活时调用，以避免多余的 ping。
    pub fn reschedule_ping_timer(&self) {
        if let Some(core) = self.core.upgrade() {
            core.reschedule_ping_timer();
        }
    }
}

impl<C: Connector> Clone for Signals<C> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<C: Connector> std::fmt::Debug for Signals<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signals")
            .field("link_alive", &(self.core.strong_count() > 0))
            .finish()
    }
}
