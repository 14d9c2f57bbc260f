//! 链路：单条逻辑连接的韧性状态机。
//! The link: the resilience state machine for one logical connection.

mod controller;
mod signals;
mod state;

pub use controller::{EndWait, Link};
pub use signals::Signals;
pub use state::LinkState;
