//! 翻译管道模块
//!
//! 请求文本在进入翻译服务提供方之前的处理步骤

pub mod chunker;

pub use chunker::split_text;
