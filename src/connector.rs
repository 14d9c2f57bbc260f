//! 传输抽象。链路状态机通过该 trait 打开、关闭并探测底层连接，
//! 自身不绑定任何具体传输。
//! The transport abstraction. The link state machine opens, closes and probes
//! the underlying connection through this trait, without being tied to any
//! particular transport.

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::link::Signals;
use async_trait::async_trait;

/// A pluggable factory for the underlying connection.
///
/// The link drives this trait; implementations never call back into the link
/// directly. Instead, the [`Signals`] handed to [`Connector::open`] lets an
/// established connection report heartbeats, closure and errors back to the
/// state machine.
///
/// 可插拔的底层连接工厂。
///
/// 状态机负责驱动该 trait；实现不应直接回调链路。交给
/// [`Connector::open`] 的 [`Signals`] 允许已建立的连接向状态机
/// 回报心跳、关闭与错误。
#[async_trait]
pub trait Connector: Sized + Send + Sync + 'static {
    /// The live-connection handle produced by a successful open.
    /// 成功打开后产生的活动连接句柄。
    type Handle: Send + Sync + 'static;

    /// Establishes one connection.
    ///
    /// `token` is cancelled when the attempt is superseded or the link is
    /// ended; a well-behaved implementation abandons the attempt promptly.
    /// The link enforces its own connect timeout regardless, so a hung open
    /// cannot stall the machine.
    ///
    /// 建立一条连接。
    ///
    /// 当该次尝试被取代或链路被终止时 `token` 会被取消；良好的实现应当
    /// 尽快放弃尝试。无论如何，链路都会执行自身的连接超时，因此卡住的
    /// open 不会使状态机停滞。
    async fn open(&self, signals: Signals<Self>, token: CancelToken) -> Result<Self::Handle>;

    /// Tears down a previously opened handle.
    ///
    /// `force` is true when the link wants the connection gone immediately
    /// (keepalive miss, forced end) rather than drained gracefully.
    ///
    /// 拆除先前打开的句柄。
    ///
    /// 当链路希望连接立即消失（心跳超时、强制终止）而非优雅排空时，
    /// `force` 为 true。
    async fn close(&self, handle: &Self::Handle, force: bool) -> Result<()>;

    /// Probes liveness of an established connection.
    ///
    /// Invoked by the keepalive timer. The default is a no-op for transports
    /// whose liveness is observed passively.
    ///
    /// 探测已建立连接的存活性。
    ///
    /// 由保活定时器调用。对于被动观测存活性的传输，默认实现为空操作。
    async fn ping(&self, _handle: &Self::Handle) -> Result<()> {
        Ok(())
    }
}
