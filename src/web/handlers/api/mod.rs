//! API 处理器

pub mod cache;
pub mod system;
pub mod translation;

pub use cache::*;
pub use system::*;
pub use translation::*;
