//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use thiserror::Error;

/// The primary error type for the connection lifecycle library.
/// 连接生命周期库的主要错误类型。
#[derive(Debug, Error)]
pub enum Error {
    /// An underlying I/O error occurred in the transport.
    /// 传输层发生了底层的I/O错误。
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A connect attempt did not finish within the configured timeout.
    /// 连接尝试未在配置的超时时间内完成。
    #[error("Connect attempt timed out")]
    ConnectTimeout,

    /// The connection closed without a more specific cause being reported.
    /// 连接关闭且未报告更具体的原因。
    #[error("Connection closed")]
    ConnectionClosed,

    /// The connector reported a failure while opening, closing, or pinging.
    /// 连接器在打开、关闭或探活时报告了失败。
    #[error("Connector failure: {0}")]
    Connector(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A transmission error fed in by the transport.
    /// 由传输层反馈进来的传输错误。
    #[error("Transmission error: {0}")]
    Transmission(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The backoff policy ran out of attempts.
    ///
    /// Terminal for automatic retry; a manual reconnect request may still
    /// restart the link.
    ///
    /// 退避策略的尝试次数已用尽。对自动重试而言是终态；
    /// 手动的重连请求仍然可以重新启动链路。
    #[error("Retries exhausted after {attempts} attempts")]
    RetriesExhausted {
        /// How many failed attempts were made before giving up.
        attempts: u32,
    },

    /// The retry predicate declined to continue.
    /// 重试断言拒绝继续。
    #[error("Retry refused after attempt {attempts}")]
    RetryRefused {
        /// The 1-based attempt number the predicate rejected.
        attempts: u32,
    },

    /// The operation was aborted by a cancellation token.
    /// 操作被取消令牌中止。
    #[error("Operation cancelled")]
    Cancelled,
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;
