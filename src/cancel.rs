//! 具有父子联动的协作式取消令牌。
//! A cooperative cancellation token with parent/child linkage.
//!
//! Cancelling a parent cancels all of its live children. Observers registered
//! with [`CancelToken::on_cancel`] run exactly once when the token fires.
//! Waiting is exposed as the async [`CancelToken::cancelled`] so tasks can
//! race it inside `tokio::select!`.
//!
//! 取消父令牌会取消它所有仍然存活的子令牌。通过 [`CancelToken::on_cancel`]
//! 注册的观察者在令牌触发时恰好运行一次。等待以异步方法
//! [`CancelToken::cancelled`] 的形式暴露，以便任务在 `tokio::select!` 中与其竞速。

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::watch;

type Observer = Box<dyn FnOnce() + Send>;

struct Registry {
    cancelled: bool,
    observers: Vec<Observer>,
    children: Vec<Weak<TokenCore>>,
}

struct TokenCore {
    flag: watch::Sender<bool>,
    registry: Mutex<Registry>,
}

/// A cloneable handle to one cancellation signal.
///
/// Clones observe the same signal; [`CancelToken::child`] creates a new,
/// linked signal instead.
///
/// 指向同一个取消信号的可克隆句柄。克隆观察同一个信号；
/// [`CancelToken::child`] 则会创建一个新的、联动的信号。
#[derive(Clone)]
pub struct CancelToken {
    core: Arc<TokenCore>,
}

impl CancelToken {
    /// Whether two handles refer to the same underlying signal.
    /// 两个句柄是否指向同一个底层信号。
    pub(crate) fn same_signal(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    /// Creates a fresh, un-cancelled token with no parent.
    /// 创建一个全新的、未取消的、没有父令牌的令牌。
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            core: Arc::new(TokenCore {
                flag,
                registry: Mutex::new(Registry {
                    cancelled: false,
                    observers: Vec::new(),
                    children: Vec::new(),
                }),
            }),
        }
    }

    /// Creates a child token that is cancelled whenever this token is
    /// cancelled. A child created from an already-cancelled parent starts
    /// out cancelled. Cancelling the child does not affect the parent.
    ///
    /// 创建一个子令牌：当本令牌被取消时，它也会被取消。
    /// 从已取消的父令牌创建的子令牌一出生就是已取消状态。
    /// 取消子令牌不会影响父令牌。
    pub fn child(&self) -> Self {
        let child = CancelToken::new();
        let mut registry = lock_registry(&self.core.registry);
        if registry.cancelled {
            drop(registry);
            child.cancel();
        } else {
            registry.children.push(Arc::downgrade(&child.core));
        }
        child
    }

    /// Cancels this token, its observers, and all of its live children.
    /// Further calls are no-ops.
    ///
    /// 取消本令牌、其观察者以及所有仍然存活的子令牌。后续调用为空操作。
    pub fn cancel(&self) {
        Self::cancel_core(&self.core);
    }

    fn cancel_core(core: &Arc<TokenCore>) {
        let (observers, children) = {
            let mut registry = lock_registry(&core.registry);
            if registry.cancelled {
                return;
            }
            registry.cancelled = true;
            (
                std::mem::take(&mut registry.observers),
                std::mem::take(&mut registry.children),
            )
        };

        // Observers and children run outside the registry lock so they may
        // touch this token again without deadlocking.
        // 观察者与子令牌在注册表锁之外运行，因此它们可以再次触碰本令牌而不会死锁。
        core.flag.send_replace(true);
        for observer in observers {
            observer();
        }
        for child in children {
            if let Some(child) = child.upgrade() {
                Self::cancel_core(&child);
            }
        }
    }

    /// Whether the token has been cancelled.
    /// 令牌是否已被取消。
    pub fn is_cancelled(&self) -> bool {
        lock_registry(&self.core.registry).cancelled
    }

    /// Completes once the token is cancelled. Completes immediately if it
    /// already was.
    ///
    /// 在令牌被取消后完成。如果此前已被取消则立即完成。
    pub async fn cancelled(&self) {
        let mut rx = self.core.flag.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Registers an observer that runs exactly once at cancellation, or
    /// immediately if the token is already cancelled.
    ///
    /// 注册一个在取消时恰好运行一次的观察者；若令牌已被取消则立即运行。
    pub fn on_cancel(&self, observer: impl FnOnce() + Send + 'static) {
        let mut registry = lock_registry(&self.core.registry);
        if registry.cancelled {
            drop(registry);
            observer();
        } else {
            registry.observers.push(Box::new(observer));
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

fn lock_registry(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
