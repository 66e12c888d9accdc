pub mod conversation;
pub mod story;
pub mod types;

// 重新导出快拍相关类型
pub use story::{StoriesResult, StoriesState, StorySelector, StoryStore, StoryStoreConfig};
