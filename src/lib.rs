//! mis 是使用 Rust 实现的最大独立集问题求解器，核心是一个增量维护冲突数的成员引擎，在其上实现了模拟退火与遗传算法。
//!
//! 它同时是一个库和一个命令行程序。作为库使用时，调用者提供图、运行预算和随机数发生器，
//! 并通过实现 [`Interface`] 特征来接收求解过程中的消息；作为命令行程序使用时，用法见 `mis --help`。

pub mod config;
pub mod construct;
pub mod engine;
pub mod error;
pub mod graph;
pub mod interfaces;
pub mod io;
pub mod operators;
pub mod optimizers;
pub mod validate;

pub use error::Error;
pub use graph::Graph;
pub use interfaces::command_line::{Command, CommandLine, CommandLineArgs};
pub use interfaces::{Interface, Message, Recorder};
pub use optimizers::{Budget, Metaheuristic, Outcome, Solution};
