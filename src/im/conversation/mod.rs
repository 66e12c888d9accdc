//! 会话模块
//!
//! 提供快拍聚合所需的会话查询

pub mod cache;
pub mod lookup;

pub use cache::ConversationCache;
pub use lookup::ConversationLookup;
