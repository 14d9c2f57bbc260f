//! 重连尝试之间的退避延迟策略。
//! The backoff delay policy applied between reconnect attempts.
//!
//! The policy is a pure function from a 1-based failed-attempt count to
//! either "wait this long, then retry" or "stop, exhausted". The lifecycle
//! controller consumes it as a black box; nothing in here sleeps or spawns.
//!
//! 该策略是一个纯函数：输入从 1 开始计数的失败次数，输出
//! “等待这么久后重试”或“停止，次数已用尽”。生命周期控制器把它当作
//! 黑盒消费；这里不会休眠也不会派生任务。

use crate::error::Error;
use std::sync::Arc;
use std::time::Duration;

/// How the base delay grows between attempts.
/// 基础延迟在多次尝试之间如何增长。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// `initial * growth_factor^(n-1)`, capped at the maximum delay.
    /// `initial * growth_factor^(n-1)`，以最大延迟为上限。
    Exponential,
    /// `initial * fib(n)` (1, 1, 2, 3, 5, ...), capped at the maximum delay.
    /// `initial * fib(n)`（1、1、2、3、5……），以最大延迟为上限。
    Fibonacci,
}

/// How the computed delay is randomized.
/// 计算出的延迟如何被随机化。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JitterMode {
    /// Use the base delay as-is.
    /// 原样使用基础延迟。
    None,
    /// Draw uniformly from `[0, base]`.
    /// 在 `[0, base]` 区间内均匀抽取。
    Full,
}

/// Decides per failed attempt whether automatic retry continues. Receives
/// the causing error and the 1-based attempt number.
///
/// 逐次判定自动重试是否继续。参数为导致失败的错误和从 1 开始的尝试序号。
pub type RetryPredicate = Arc<dyn Fn(&Error, u32) -> bool + Send + Sync>;

/// The full set of backoff policy parameters.
/// 退避策略的全部参数。
#[derive(Clone)]
pub struct RetryPolicy {
    /// Growth strategy for the base delay.
    /// 基础延迟的增长策略。
    pub strategy: BackoffStrategy,
    /// Randomization applied on top of the base delay.
    /// 在基础延迟之上应用的随机化。
    pub jitter: JitterMode,
    /// The delay for the first step of the growth series.
    /// 增长序列第一步的延迟。
    pub initial_delay: Duration,
    /// Upper bound for any single delay, before jitter.
    /// 抖动之前，单次延迟的上限。
    pub max_delay: Duration,
    /// How many failed attempts are allowed before giving up.
    /// `None` means unbounded.
    ///
    /// 放弃之前允许的失败次数。`None` 表示不设上限。
    pub max_attempts: Option<u32>,
    /// Multiplier for the exponential strategy.
    /// 指数策略的增长因子。
    pub growth_factor: f64,
    /// When false, the first retry fires immediately and the growth series
    /// starts with the second retry.
    ///
    /// 为 false 时，第一次重试立即进行，增长序列从第二次重试开始。
    pub delay_first_attempt: bool,
    /// Optional veto over continuing automatic retry.
    /// 对是否继续自动重试的可选否决。
    pub predicate: Option<RetryPredicate>,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("strategy", &self.strategy)
            .field("jitter", &self.jitter)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .field("max_attempts", &self.max_attempts)
            .field("growth_factor", &self.growth_factor)
            .field("delay_first_attempt", &self.delay_first_attempt)
            .field("predicate", &self.predicate.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            strategy: BackoffStrategy::Exponential,
            jitter: JitterMode::Full,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            max_attempts: None,
            growth_factor: 2.0,
            delay_first_attempt: false,
            predicate: None,
        }
    }
}

impl RetryPolicy {
    /// An exponential-growth policy starting at `initial_delay`.
    /// 从 `initial_delay` 开始指数增长的策略。
    pub fn exponential(initial_delay: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Exponential,
            initial_delay,
            ..Default::default()
        }
    }

    /// A fibonacci-growth policy starting at `initial_delay`.
    /// 从 `initial_delay` 开始斐波那契增长的策略。
    pub fn fibonacci(initial_delay: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Fibonacci,
            initial_delay,
            ..Default::default()
        }
    }

    /// Whether the 1-based failed-attempt count exceeds the attempt cap.
    /// 从 1 开始的失败次数是否超出了尝试预算。
    pub fn is_exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempt > max)
    }

    /// The un-jittered delay preceding retry `attempt` (1-based), or `None`
    /// once attempts are exhausted.
    ///
    /// 第 `attempt` 次重试（从 1 开始）之前未加抖动的延迟；
    /// 次数用尽后返回 `None`。
    pub fn base_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || self.is_exhausted(attempt) {
            return None;
        }

        let step = if self.delay_first_attempt {
            attempt
        } else if attempt == 1 {
            return Some(Duration::ZERO);
        } else {
            attempt - 1
        };

        let secs = match self.strategy {
            BackoffStrategy::Exponential => {
                self.initial_delay.as_secs_f64() * self.growth_factor.powi(step as i32 - 1)
            }
            BackoffStrategy::Fibonacci => self.initial_delay.as_secs_f64() * fib(step) as f64,
        };

        // powi can overflow to infinity for large steps; the cap keeps the
        // value finite before it becomes a Duration.
        // 对较大的 step，powi 可能溢出为无穷大；封顶保证转成 Duration 前为有限值。
        Some(Duration::from_secs_f64(
            secs.min(self.max_delay.as_secs_f64()),
        ))
    }

    /// The jittered delay actually slept before retry `attempt`, or `None`
    /// once attempts are exhausted.
    ///
    /// 第 `attempt` 次重试之前实际休眠的、带抖动的延迟；次数用尽后返回 `None`。
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        let base = self.base_delay(attempt)?;
        Some(match self.jitter {
            JitterMode::None => base,
            JitterMode::Full => base.mul_f64(rand::random::<f64>()),
        })
    }
}

/// The fibonacci number for a 1-based index: 1, 1, 2, 3, 5, ...
/// 从 1 开始计数的斐波那契数：1、1、2、3、5……
fn fib(n: u32) -> u64 {
    let (mut a, mut b) = (1u64, 1u64);
    for _ in 1..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    a
}
