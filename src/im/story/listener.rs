//! 快拍监听器回调接口

use async_trait::async_trait;

/// 快拍监听器回调接口
#[async_trait]
pub trait StoryListener: Send + Sync {
    /// 快拍列表发生变更，参数为 `StoriesResult` 的 JSON 字符串
    async fn on_stories_changed(&self, stories_json: String);

    /// 可见快拍中最新一条未读的会话数发生变更
    async fn on_unread_story_count_changed(&self, unread_count: usize);
}

/// 默认空实现（无操作）
pub struct EmptyStoryListener;

#[async_trait]
impl StoryListener for EmptyStoryListener {
    async fn on_stories_changed(&self, _stories_json: String) {}
    async fn on_unread_story_count_changed(&self, _unread_count: usize) {}
}
