//! 动作层 - 调用方入口，每个动作都显式接收 `ServerContext`

pub mod local;
pub mod remote;
