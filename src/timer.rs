//! 可以在不触发的情况下重新装填的一次性截止时间定时器。
//! A one-shot deadline timer that can be rearmed without firing.
//!
//! The timer is a small spawned task driven by a command channel, in the same
//! shape as the other background tasks in this crate. [`RearmTimer::rearm`]
//! replaces the pending deadline, [`RearmTimer::clear`] disarms it, and
//! dropping the handle shuts the task down. The callback runs at most once
//! per arm.
//!
//! 定时器是一个由命令通道驱动的小型后台任务，与本库其他后台任务形态一致。
//! [`RearmTimer::rearm`] 替换当前的截止时间，[`RearmTimer::clear`] 撤销装填，
//! 丢弃句柄则关闭任务。每次装填最多触发一次回调。

use std::time::Duration;
use tokio::{
    sync::mpsc,
    time::{Instant, sleep_until},
};
use tracing::trace;

enum TimerCmd {
    Arm(Instant),
    Clear,
}

/// Handle to a rearmable one-shot timer task.
/// 可重新装填的一次性定时器任务的句柄。
pub struct RearmTimer {
    cmd_tx: mpsc::UnboundedSender<TimerCmd>,
}

impl RearmTimer {
    /// Spawns the timer task in a disarmed state. `on_fire` is invoked each
    /// time an armed deadline elapses without being rearmed or cleared first.
    ///
    /// 以未装填状态启动定时器任务。每当一个已装填的截止时间在未被重新装填
    /// 或撤销的情况下到期，就会调用一次 `on_fire`。
    pub fn spawn<F>(on_fire: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut deadline: Option<Instant> = None;
            loop {
                match deadline {
                    Some(at) => {
                        tokio::select! {
                            cmd = cmd_rx.recv() => match cmd {
                                Some(TimerCmd::Arm(next)) => deadline = Some(next),
                                Some(TimerCmd::Clear) => deadline = None,
                                None => break,
                            },
                            _ = sleep_until(at) => {
                                deadline = None;
                                on_fire();
                            }
                        }
                    }
                    None => match cmd_rx.recv().await {
                        Some(TimerCmd::Arm(next)) => deadline = Some(next),
                        Some(TimerCmd::Clear) => {}
                        None => break,
                    },
                }
            }
            trace!("Rearm timer task exited");
        });

        Self { cmd_tx }
    }

    /// Arms the timer, or replaces a pending deadline without firing it.
    /// The callback will run `delay` from now unless rearmed or cleared.
    ///
    /// 装填定时器，或在不触发的情况下替换当前的截止时间。
    /// 除非再次装填或撤销，回调将在从现在起 `delay` 之后运行。
    pub fn rearm(&self, delay: Duration) {
        let _ = self.cmd_tx.send(TimerCmd::Arm(Instant::now() + delay));
    }

    /// Disarms the pending deadline, if any, without firing it.
    /// 撤销当前的截止时间（若有），不触发回调。
    pub fn clear(&self) {
        let _ = self.cmd_tx.send(TimerCmd::Clear);
    }
}

impl std::fmt::Debug for RearmTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RearmTimer").finish_non_exhaustive()
    }
}
