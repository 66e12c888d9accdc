//! 快拍列表单槽缓存
//!
//! 只缓存最近一次结果；快拍列表 Arc、展示开关、会话查询 Arc 三者都未变化时直接返回上次结果。

use crate::im::conversation::lookup::ConversationLookup;
use crate::im::story::models::{LocalStory, StoriesResult, StoriesState};
use crate::im::story::selector::get_stories;
use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// 缓存槽：上次的输入与结果
struct CacheSlot {
    stories: Arc<Vec<LocalStory>>,
    is_showing_stories_view: bool,
    lookup: Arc<dyn ConversationLookup>,
    result: Arc<StoriesResult>,
}

impl CacheSlot {
    fn matches(&self, state: &StoriesState, lookup: &Arc<dyn ConversationLookup>) -> bool {
        Arc::ptr_eq(&self.stories, &state.stories)
            && self.is_showing_stories_view == state.is_showing_stories_view
            && Arc::ptr_eq(&self.lookup, lookup)
    }
}

/// 带缓存的快拍列表查询
#[derive(Default)]
pub struct StorySelector {
    slot: Mutex<Option<CacheSlot>>,
}

impl StorySelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取快拍列表；输入未变化时返回同一个 Arc
    ///
    /// 计算失败时不更新缓存。
    pub fn select(
        &self,
        state: &StoriesState,
        lookup: &Arc<dyn ConversationLookup>,
    ) -> Result<Arc<StoriesResult>> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow!("快拍缓存锁已损坏"))?;

        if let Some(cached) = slot.as_ref().filter(|s| s.matches(state, lookup)) {
            debug!("[StorySelector] 命中缓存");
            return Ok(cached.result.clone());
        }

        let result = Arc::new(get_stories(state, lookup.as_ref())?);
        *slot = Some(CacheSlot {
            stories: state.stories.clone(),
            is_showing_stories_view: state.is_showing_stories_view,
            lookup: lookup.clone(),
            result: result.clone(),
        });
        Ok(result)
    }

    /// 清空缓存
    ///
    /// 锁已损坏时清空槽位并恢复锁，之后的查询可以重新计算。
    pub fn reset(&self) {
        match self.slot.lock() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => {
                warn!("[StorySelector] 快拍缓存锁已损坏，清空并恢复");
                *poisoned.into_inner() = None;
                self.slot.clear_poison();
            }
        }
    }
}
