pub mod im;

// 重新导出常用类型和函数，方便外部使用
pub use im::{
    conversation::{ConversationCache, ConversationLookup},
    story::{get_stories, LocalStory, StoriesResult, StoriesState, StorySelector, StoryStore},
    types::{ConversationAttributes, ReadStatus},
};
