//! 快拍状态存储
//!
//! 持有快拍列表、展示开关和会话查询，对外提供带缓存的快拍列表，
//! 列表内容变化时通过 [`StoryListener`] 通知调用方。

use crate::im::conversation::lookup::ConversationLookup;
use crate::im::story::listener::{EmptyStoryListener, StoryListener};
use crate::im::story::memo::StorySelector;
use crate::im::story::models::{LocalStory, StoriesResult, StoriesState};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// 快拍存储配置
#[derive(Clone, Debug)]
pub struct StoryStoreConfig {
    /// 当前登录用户 ID
    pub user_id: String,
    /// 初始是否展示快拍页
    pub show_stories_view: bool,
}

impl StoryStoreConfig {
    /// 创建默认配置（快拍页默认不展示）
    pub fn new(user_id: String) -> Self {
        Self {
            user_id,
            show_stories_view: false,
        }
    }
}

/// 参与计算的输入
#[derive(Clone)]
struct StoreInputs {
    state: StoriesState,
    lookup: Arc<dyn ConversationLookup>,
}

struct StoreInner {
    inputs: StoreInputs,
    /// 最近一次通知给监听器的结果
    delivered: Arc<StoriesResult>,
}

/// 变更通知内容（在释放锁之后再回调）
struct Notification {
    stories_json: String,
    unread_count: Option<usize>,
}

/// 快拍状态存储
pub struct StoryStore {
    config: StoryStoreConfig,
    inner: RwLock<StoreInner>,
    /// 串行化“修改 + 通知”，保证回调顺序与提交顺序一致
    notify_lock: Mutex<()>,
    selector: StorySelector,
    listener: Arc<dyn StoryListener>,
}

impl StoryStore {
    /// 创建快拍存储（使用默认空监听器）
    pub fn new(config: StoryStoreConfig, lookup: Arc<dyn ConversationLookup>) -> Self {
        Self::with_listener(config, lookup, Arc::new(EmptyStoryListener))
    }

    /// 创建快拍存储（带自定义监听器）
    pub fn with_listener(
        config: StoryStoreConfig,
        lookup: Arc<dyn ConversationLookup>,
        listener: Arc<dyn StoryListener>,
    ) -> Self {
        info!(
            "[StoryStore] 创建快拍存储，用户ID: {}, 展示快拍页: {}",
            config.user_id, config.show_stories_view
        );
        let inner = StoreInner {
            inputs: StoreInputs {
                state: StoriesState::new(config.show_stories_view, Vec::new()),
                lookup,
            },
            delivered: Arc::new(StoriesResult::default()),
        };
        Self {
            config,
            inner: RwLock::new(inner),
            notify_lock: Mutex::new(()),
            selector: StorySelector::new(),
            listener,
        }
    }

    pub fn config(&self) -> &StoryStoreConfig {
        &self.config
    }

    /// 当前快拍状态（快拍列表为共享引用）
    pub async fn stories_state(&self) -> StoriesState {
        self.inner.read().await.inputs.state.clone()
    }

    /// 获取快拍列表（输入未变化时返回同一个 Arc）
    pub async fn get_stories(&self) -> Result<Arc<StoriesResult>> {
        let inner = self.inner.read().await;
        self.selector
            .select(&inner.inputs.state, &inner.inputs.lookup)
    }

    /// 替换快拍列表
    pub async fn set_stories(&self, stories: Vec<LocalStory>) -> Result<()> {
        debug!("[StoryStore] 替换快拍列表: {} 条", stories.len());
        self.update(|inputs| inputs.state.stories = Arc::new(stories))
            .await
    }

    /// 切换快拍页展示状态
    pub async fn set_showing_stories_view(&self, is_showing: bool) -> Result<()> {
        debug!("[StoryStore] 快拍页展示状态: {}", is_showing);
        self.update(|inputs| inputs.state.is_showing_stories_view = is_showing)
            .await
    }

    /// 替换会话查询（会话属性变化后由调用方传入新的查询）
    pub async fn set_conversation_lookup(&self, lookup: Arc<dyn ConversationLookup>) -> Result<()> {
        debug!("[StoryStore] 替换会话查询");
        self.update(|inputs| inputs.lookup = lookup).await
    }

    /// 修改状态并在结果变化时通知监听器
    ///
    /// 修改先作用在副本上，重新计算成功后才提交；失败时状态保持不变。
    /// 回调在持有 `notify_lock` 时执行，监听器内不能再调用本存储的修改方法。
    async fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut StoreInputs),
    {
        let operation_id = Uuid::new_v4().to_string();
        let _notify_guard = self.notify_lock.lock().await;
        let notification = {
            let mut inner = self.inner.write().await;
            let mut staged = inner.inputs.clone();
            apply(&mut staged);

            let result = self
                .selector
                .select(&staged.state, &staged.lookup)
                .with_context(|| format!("刷新快拍列表失败, operationID: {}", operation_id))?;
            inner.inputs = staged;
            if Arc::ptr_eq(&result, &inner.delivered) || *result == *inner.delivered {
                debug!(
                    "[StoryStore] 快拍列表无变化, operationID: {}",
                    operation_id
                );
                None
            } else {
                let unread_count = result.unread_count();
                let unread_changed = unread_count != inner.delivered.unread_count();
                let stories_json =
                    serde_json::to_string(result.as_ref()).context("序列化快拍列表失败")?;
                inner.delivered = result;
                Some(Notification {
                    stories_json,
                    unread_count: unread_changed.then_some(unread_count),
                })
            }
        };

        if let Some(notification) = notification {
            info!(
                "[StoryStore] 快拍列表已变更, operationID: {}",
                operation_id
            );
            self.listener
                .on_stories_changed(notification.stories_json)
                .await;
            if let Some(unread_count) = notification.unread_count {
                self.listener
                    .on_unread_story_count_changed(unread_count)
                    .await;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::im::conversation::cache::ConversationCache;
    use crate::im::types::{ConversationAttributes, ReadStatus};
    use async_trait::async_trait;
    use std::sync::{Mutex, Once};
    use tracing::info;

    static INIT_LOGGER: Once = Once::new();

    fn init_test_logger() {
        INIT_LOGGER.call_once(|| {
            use tracing_subscriber::prelude::*;
            use tracing_subscriber::EnvFilter;

            let filter_layer = EnvFilter::new("info,openim_story_core=debug");

            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_test_writer();

            tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt_layer)
                .init();
        });
    }

    #[derive(Default)]
    struct RecordingListener {
        changes: Mutex<Vec<String>>,
        unread_counts: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl StoryListener for RecordingListener {
        async fn on_stories_changed(&self, stories_json: String) {
            info!("快拍列表变更: {}", stories_json);
            self.changes.lock().unwrap().push(stories_json);
        }

        async fn on_unread_story_count_changed(&self, unread_count: usize) {
            info!("未读快拍会话数变更: {}", unread_count);
            self.unread_counts.lock().unwrap().push(unread_count);
        }
    }

    fn contact(id: &str, hide_story: bool) -> ConversationAttributes {
        ConversationAttributes {
            id: id.to_string(),
            title: id.to_string(),
            hide_story,
            ..Default::default()
        }
    }

    fn story(conv: &str, ts: i64, read_status: ReadStatus) -> LocalStory {
        LocalStory {
            conversation_id: conv.to_string(),
            source_uuid: Some(conv.to_string()),
            source: None,
            message_id: format!("{}-{}", conv, ts),
            attachment: None,
            timestamp: ts,
            read_status,
            selected_reaction: None,
        }
    }

    fn showing_config() -> StoryStoreConfig {
        StoryStoreConfig {
            show_stories_view: true,
            ..StoryStoreConfig::new("me".to_string())
        }
    }

    fn store_with(
        config: StoryStoreConfig,
        convs: Vec<ConversationAttributes>,
    ) -> (StoryStore, Arc<RecordingListener>) {
        let listener = Arc::new(RecordingListener::default());
        let lookup: Arc<dyn ConversationLookup> =
            Arc::new(ConversationCache::from_conversations(convs));
        let store = StoryStore::with_listener(config, lookup, listener.clone());
        (store, listener)
    }

    #[tokio::test]
    async fn set_stories_notifies_listener() -> Result<()> {
        init_test_logger();
        let (store, listener) = store_with(showing_config(), vec![contact("A", false)]);

        store
            .set_stories(vec![story("A", 10, ReadStatus::Unread)])
            .await?;

        let changes = listener.changes.lock().unwrap().clone();
        assert_eq!(changes.len(), 1);
        let result: StoriesResult = serde_json::from_str(&changes[0])?;
        assert_eq!(result.stories.len(), 1);
        assert_eq!(result.stories[0].conversation_id, "A");
        assert_eq!(*listener.unread_counts.lock().unwrap(), vec![1]);
        Ok(())
    }

    #[tokio::test]
    async fn hidden_view_does_not_notify() -> Result<()> {
        init_test_logger();
        let (store, listener) = store_with(
            StoryStoreConfig::new("me".to_string()),
            vec![contact("A", false)],
        );

        store
            .set_stories(vec![story("A", 10, ReadStatus::Unread)])
            .await?;
        assert!(listener.changes.lock().unwrap().is_empty());
        assert!(store.get_stories().await?.is_empty());

        store.set_showing_stories_view(true).await?;
        assert_eq!(listener.changes.lock().unwrap().len(), 1);
        assert_eq!(store.get_stories().await?.unread_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn repeated_reads_share_result() -> Result<()> {
        let (store, _listener) = store_with(showing_config(), vec![contact("A", false)]);
        store
            .set_stories(vec![story("A", 10, ReadStatus::Read)])
            .await?;

        let first = store.get_stories().await?;
        let second = store.get_stories().await?;
        assert!(Arc::ptr_eq(&first, &second));
        Ok(())
    }

    #[tokio::test]
    async fn unchanged_content_is_not_announced_twice() -> Result<()> {
        let (store, listener) = store_with(showing_config(), vec![contact("A", false)]);
        let stories = vec![story("A", 10, ReadStatus::Read)];

        store.set_stories(stories.clone()).await?;
        store.set_stories(stories).await?;

        assert_eq!(listener.changes.lock().unwrap().len(), 1);
        // 没有未读，未读数保持 0，不回调
        assert!(listener.unread_counts.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn new_lookup_moves_story_to_hidden() -> Result<()> {
        let (store, listener) = store_with(showing_config(), vec![contact("A", false)]);
        store
            .set_stories(vec![story("A", 10, ReadStatus::Unread)])
            .await?;

        let hidden_lookup: Arc<dyn ConversationLookup> =
            Arc::new(ConversationCache::from_conversations(vec![contact("A", true)]));
        store.set_conversation_lookup(hidden_lookup).await?;

        let result = store.get_stories().await?;
        assert!(result.stories.is_empty());
        assert_eq!(result.hidden_stories.len(), 1);
        assert_eq!(result.hidden_unread_count(), 1);
        assert_eq!(*listener.unread_counts.lock().unwrap(), vec![1, 0]);
        Ok(())
    }

    #[tokio::test]
    async fn stories_state_shares_story_list() -> Result<()> {
        let (store, _listener) = store_with(showing_config(), Vec::new());
        store
            .set_stories(vec![story("A", 1, ReadStatus::Read)])
            .await?;

        let first = store.stories_state().await;
        let second = store.stories_state().await;
        assert!(Arc::ptr_eq(&first.stories, &second.stories));
        assert!(first.is_showing_stories_view);
        assert_eq!(store.config().user_id, "me");
        Ok(())
    }

    #[tokio::test]
    async fn lookup_failure_is_reported() {
        let failing: Arc<dyn ConversationLookup> =
            Arc::new(|id: &str| -> Result<Option<ConversationAttributes>> {
                Err(anyhow::anyhow!("会话表不可用: {}", id))
            });
        let store = StoryStore::new(showing_config(), failing);

        let err = store
            .set_stories(vec![story("A", 1, ReadStatus::Unread)])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("刷新快拍列表失败"));
    }

    #[tokio::test]
    async fn failed_update_keeps_previous_inputs() -> Result<()> {
        let (store, listener) = store_with(showing_config(), vec![contact("A", false)]);
        store
            .set_stories(vec![story("A", 10, ReadStatus::Unread)])
            .await?;
        let before = store.get_stories().await?;

        let failing: Arc<dyn ConversationLookup> =
            Arc::new(|id: &str| -> Result<Option<ConversationAttributes>> {
                Err(anyhow::anyhow!("会话表不可用: {}", id))
            });
        assert!(store.set_conversation_lookup(failing).await.is_err());
        assert!(store
            .set_stories(vec![story("A", 20, ReadStatus::Read)])
            .await
            .is_ok());

        // 失败的查询没有被提交，后续修改与读取仍使用原来的会话表
        let after = store.get_stories().await?;
        assert_eq!(after.stories[0].stories[0].timestamp, 20);
        assert_ne!(before, after);
        assert_eq!(listener.changes.lock().unwrap().len(), 2);
        Ok(())
    }

    /// 收到包含会话 A 的列表时先等待一段时间再记录
    #[derive(Default)]
    struct SlowListener {
        changes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl StoryListener for SlowListener {
        async fn on_stories_changed(&self, stories_json: String) {
            if stories_json.contains("\"conversationID\":\"A\"") {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
            self.changes.lock().unwrap().push(stories_json);
        }

        async fn on_unread_story_count_changed(&self, _unread_count: usize) {}
    }

    #[tokio::test]
    async fn concurrent_updates_notify_in_commit_order() -> Result<()> {
        init_test_logger();
        let listener = Arc::new(SlowListener::default());
        let lookup: Arc<dyn ConversationLookup> = Arc::new(ConversationCache::from_conversations(
            vec![contact("A", false), contact("B", false)],
        ));
        let store = StoryStore::with_listener(showing_config(), lookup, listener.clone());

        let (first, second) = tokio::join!(
            store.set_stories(vec![story("A", 1, ReadStatus::Unread)]),
            store.set_stories(vec![story("B", 2, ReadStatus::Unread)]),
        );
        first?;
        second?;

        let changes = listener.changes.lock().unwrap().clone();
        assert_eq!(changes.len(), 2);
        let last: StoriesResult = serde_json::from_str(&changes[1])?;
        assert_eq!(last, *store.get_stories().await?);
        assert_eq!(last.stories[0].conversation_id, "B");
        Ok(())
    }
}
