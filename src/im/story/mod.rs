//! 快拍模块
//!
//! 把平铺的快拍记录聚合为按会话分组、排好序的展示列表

pub mod listener;
pub mod memo;
pub mod models;
pub mod selector;
pub mod store;
pub mod types;

// 重新导出主要类型和函数
pub use listener::{EmptyStoryListener, StoryListener};
pub use memo::StorySelector;
pub use models::{
    ConversationStory, ConversationSummary, LocalStory, SenderSummary, StoriesResult,
    StoriesState, StoryView,
};
pub use selector::{
    aggregate_stories, compare_by_recency_and_unread, get_stories, should_show_stories_view,
    sort_by_recency_and_unread,
};
pub use store::{StoryStore, StoryStoreConfig};
pub use types::StoriesSnapshot;
