//! 查询层 - 供处理器和调用方使用的只读查询

pub mod group;

pub use group::QueryHandle;
