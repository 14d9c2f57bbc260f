//! 定义了链路的可配置参数。
//! Defines configurable parameters for a link.

use crate::backoff::RetryPolicy;
use std::time::Duration;

/// A structure containing all configurable parameters for a link.
/// Immutable after construction.
///
/// 包含链路所有可配置参数的结构体。构造之后不可变。
#[derive(Debug, Clone)]
pub struct Config {
    /// How long a single connect attempt may run before it is treated as
    /// failed. The losing side of the race is cancelled.
    ///
    /// 单次连接尝试在被视为失败之前最多可以运行多久。竞速中落败的一方会被取消。
    pub connect_timeout: Duration,

    /// The keepalive check interval. `Duration::ZERO` disables the
    /// keepalive sub-machine entirely; no timer is armed.
    ///
    /// 保活检查间隔。`Duration::ZERO` 完全禁用保活子状态机，不会装填任何定时器。
    pub keepalive_interval: Duration,

    /// The backoff policy applied between reconnect attempts.
    /// 重连尝试之间应用的退避策略。
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            keepalive_interval: Duration::ZERO,
            retry: RetryPolicy::default(),
        }
    }
}
