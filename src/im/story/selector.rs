//! 快拍列表聚合与排序
//!
//! 把平铺的快拍记录按会话分组，拆成可见 / 隐藏两组，并按“未读优先、新的在前”排序。

use crate::im::conversation::lookup::ConversationLookup;
use crate::im::story::models::{
    ConversationStory, ConversationSummary, LocalStory, SenderSummary, StoriesResult,
    StoriesState, StoryView,
};
use crate::im::types::ReadStatus;
use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// 是否展示快拍页
pub fn should_show_stories_view(state: &StoriesState) -> bool {
    state.is_showing_stories_view
}

/// 计算快拍列表（不带缓存）
pub fn get_stories(
    state: &StoriesState,
    lookup: &dyn ConversationLookup,
) -> Result<StoriesResult> {
    if !should_show_stories_view(state) {
        return Ok(StoriesResult::default());
    }

    let (mut hidden_stories, mut stories) = aggregate_stories(&state.stories, lookup)?;
    sort_by_recency_and_unread(&mut hidden_stories);
    sort_by_recency_and_unread(&mut stories);

    debug!(
        "[StorySelector] 聚合完成: 快拍 {} 条, 可见会话 {} 个, 隐藏会话 {} 个",
        state.stories.len(),
        stories.len(),
        hidden_stories.len()
    );
    Ok(StoriesResult {
        stories,
        hidden_stories,
    })
}

/// 按会话聚合的中间结果，保持首次出现的顺序
#[derive(Default)]
struct StoryBuckets {
    index: HashMap<String, usize>,
    entries: Vec<ConversationStory>,
}

impl StoryBuckets {
    fn push(&mut self, conversation: &ConversationSummary, sender: &SenderSummary, view: StoryView) {
        let pos = match self.index.get(&conversation.id) {
            Some(&pos) => pos,
            None => {
                // 会话 ID 与发送者不同说明是群快拍
                let group = (conversation.id != sender.id).then(|| conversation.clone());
                self.entries.push(ConversationStory {
                    conversation_id: conversation.id.clone(),
                    group,
                    is_hidden: sender.hides_story(),
                    stories: Vec::new(),
                });
                let pos = self.entries.len() - 1;
                self.index.insert(conversation.id.clone(), pos);
                pos
            }
        };
        self.entries[pos].stories.push(view);
    }
}

/// 按会话聚合快拍，返回 (隐藏, 可见)，顺序为会话首次出现的顺序
pub fn aggregate_stories(
    stories: &[LocalStory],
    lookup: &dyn ConversationLookup,
) -> Result<(Vec<ConversationStory>, Vec<ConversationStory>)> {
    let mut visible = StoryBuckets::default();
    let mut hidden = StoryBuckets::default();

    for story in stories {
        let sender_id = story.sender_id();
        let sender_attrs = lookup
            .get_conversation(sender_id)
            .with_context(|| format!("查询快拍发送者失败: {}", sender_id))?;
        let sender = SenderSummary::project(sender_id, sender_attrs.as_ref());

        let conversation_attrs = lookup
            .get_conversation(&story.conversation_id)
            .with_context(|| format!("查询快拍会话失败: {}", story.conversation_id))?;
        let conversation =
            ConversationSummary::project(&story.conversation_id, conversation_attrs.as_ref());

        let view = StoryView {
            attachment: story.attachment.clone(),
            timestamp: story.timestamp,
            is_unread: story.read_status == ReadStatus::Unread,
            message_id: story.message_id.clone(),
            selected_reaction: story.selected_reaction.clone(),
            sender: sender.clone(),
        };

        let target = if sender.hides_story() {
            &mut hidden
        } else {
            &mut visible
        };
        target.push(&conversation, &sender, view);
    }

    Ok((hidden.entries, visible.entries))
}

/// 比较两个会话的最新快拍：都未读或都已读时新的在前；否则未读在前
///
/// 键相同返回 `Equal`，配合稳定排序保持原有先后顺序。
pub fn compare_by_recency_and_unread(a: &ConversationStory, b: &ConversationStory) -> Ordering {
    let key = |s: &ConversationStory| {
        s.newest_story()
            .map(|story| (story.is_unread, story.timestamp))
            .unwrap_or((false, i64::MIN))
    };
    let (a_unread, a_ts) = key(a);
    let (b_unread, b_ts) = key(b);

    b_unread.cmp(&a_unread).then_with(|| b_ts.cmp(&a_ts))
}

/// 就地排序（稳定排序）
pub fn sort_by_recency_and_unread(stories: &mut [ConversationStory]) {
    stories.sort_by(compare_by_recency_and_unread);
}
