#![deny(clippy::expect_used, clippy::unwrap_used)]

//! The root of the resilient connection lifecycle library.
//! 弹性连接生命周期库的根。
//!
//! The caller supplies the transport mechanics for one logical connection
//! through a [`connector::Connector`]; this crate supplies the resilience
//! policy: when to (re)connect, how long to wait between attempts, when to
//! give up, and how to declare a connection dead via heartbeats.
//!
//! 调用方通过 [`connector::Connector`] 提供一条逻辑连接的传输机制；
//! 本库只提供弹性策略：何时（重新）连接、两次尝试之间等待多久、
//! 何时放弃，以及如何通过心跳判定连接已死。

pub mod backoff;
pub mod cancel;
pub mod config;
pub mod connector;
pub mod error;
pub mod event;
pub mod timer;

pub mod link;
