//! 链路生命周期状态及其合法迁移表。
//! The link lifecycle states and their legal transition table.

/// The lifecycle state of a [`Link`](crate::link::Link).
/// [`Link`](crate::link::Link) 的生命周期状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Constructed but never asked to connect.
    /// 已构造但尚未请求连接。
    Idle,
    /// The first connect attempt of a cycle is in flight.
    /// 本周期的首次连接尝试正在进行。
    Connecting,
    /// A connection is established and healthy.
    /// 连接已建立且健康。
    Connected,
    /// Waiting out a backoff delay, or re-attempting after one.
    /// 正在等待退避延迟，或在等待后重新尝试。
    Reconnecting,
    /// A deliberate shutdown is in progress.
    /// 主动关闭正在进行。
    Ending,
    /// Terminal. Nothing runs; only an explicit reconnect revives the link.
    /// 终态。一切停止；只有显式重连才能复活链路。
    Ended,
}

impl LinkState {
    /// A stable lowercase name for logging.
    /// 用于日志的稳定小写名称。
    pub fn name(&self) -> &'static str {
        match self {
            LinkState::Idle => "idle",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
            LinkState::Reconnecting => "reconnecting",
            LinkState::Ending => "ending",
            LinkState::Ended => "ended",
        }
    }

    /// Whether the link is actively trying to be, or is, connected.
    /// 链路是否正在尝试连接或已处于连接状态。
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            LinkState::Connecting | LinkState::Connected | LinkState::Reconnecting
        )
    }

    /// Whether moving from `self` to `target` is a legal lifecycle step.
    /// 从 `self` 迁移到 `target` 是否为合法的生命周期步骤。
    pub fn can_transition_to(&self, target: LinkState) -> bool {
        use LinkState::*;
        match (self, target) {
            (Idle, Connecting) => true,
            (Idle, Ending) => true,
            (Connecting, Connected) => true,
            (Connecting, Reconnecting) => true,
            (Connecting, Ending) => true,
            (Connected, Reconnecting) => true,
            (Connected, Ending) => true,
            (Reconnecting, Connected) => true,
            (Reconnecting, Reconnecting) => true,
            (Reconnecting, Ending) => true,
            (Reconnecting, Ended) => true,
            (Ending, Ended) => true,
            (Ended, Connecting) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
