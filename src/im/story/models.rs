//! 快拍本地模型定义

use crate::im::types::{ConversationAttributes, ReadStatus, StoryAttachment};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 本地快拍记录（一条快拍消息对应一条）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalStory {
    /// 快拍所属会话 ID
    #[serde(rename = "conversationID")]
    pub conversation_id: String,
    /// 发送者 UUID
    #[serde(rename = "sourceUUID", default)]
    pub source_uuid: Option<String>,
    /// 发送者（旧版本客户端只有手机号等标识）
    #[serde(default)]
    pub source: Option<String>,
    #[serde(rename = "messageID")]
    pub message_id: String,
    #[serde(default)]
    pub attachment: Option<StoryAttachment>,
    /// 发送时间（毫秒）
    pub timestamp: i64,
    #[serde(default)]
    pub read_status: ReadStatus,
    /// 当前用户对该快拍的表情回应
    #[serde(default)]
    pub selected_reaction: Option<String>,
}

impl LocalStory {
    /// 发送者 ID：优先 `source_uuid`，为空时退回 `source`
    pub fn sender_id(&self) -> &str {
        self.source_uuid
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.source.as_deref())
            .unwrap_or_default()
    }
}

/// 快拍状态
#[derive(Debug, Clone, Default)]
pub struct StoriesState {
    /// 是否正在展示快拍页
    pub is_showing_stories_view: bool,
    /// 快拍列表（Arc 指针作为缓存比较依据，修改时必须替换为新的 Arc）
    pub stories: Arc<Vec<LocalStory>>,
}

impl StoriesState {
    pub fn new(is_showing_stories_view: bool, stories: Vec<LocalStory>) -> Self {
        Self {
            is_showing_stories_view,
            stories: Arc::new(stories),
        }
    }
}

/// 发送者摘要
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderSummary {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_me: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_message_request: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_story: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_group_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl SenderSummary {
    /// 从查询结果构造；查不到时只保留 ID，其余字段为空
    pub fn project(sender_id: &str, attrs: Option<&ConversationAttributes>) -> Self {
        match attrs {
            Some(attrs) => Self {
                id: attrs.id.clone(),
                name: attrs.name.clone(),
                profile_name: attrs.profile_name.clone(),
                first_name: attrs.first_name.clone(),
                avatar_path: attrs.avatar_path.clone(),
                color: attrs.color.clone(),
                is_me: Some(attrs.is_me),
                accepted_message_request: Some(attrs.accepted_message_request),
                hide_story: Some(attrs.hide_story),
                shared_group_names: Some(attrs.shared_group_names.clone()),
                title: Some(attrs.title.clone()),
            },
            None => Self {
                id: sender_id.to_string(),
                ..Default::default()
            },
        }
    }

    /// 是否隐藏该发送者的快拍
    pub fn hides_story(&self) -> bool {
        self.hide_story.unwrap_or(false)
    }
}

/// 会话摘要
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ConversationSummary {
    pub fn project(conversation_id: &str, attrs: Option<&ConversationAttributes>) -> Self {
        match attrs {
            Some(attrs) => Self {
                id: attrs.id.clone(),
                title: Some(attrs.title.clone()),
            },
            None => Self {
                id: conversation_id.to_string(),
                title: None,
            },
        }
    }
}

/// 单条快拍的展示数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<StoryAttachment>,
    pub timestamp: i64,
    pub is_unread: bool,
    #[serde(rename = "messageID")]
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_reaction: Option<String>,
    pub sender: SenderSummary,
}

/// 按会话聚合后的快拍
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStory {
    #[serde(rename = "conversationID")]
    pub conversation_id: String,
    /// 群快拍时为群会话摘要；单聊快拍为 None
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<ConversationSummary>,
    pub is_hidden: bool,
    /// 按到达顺序排列，最后一条为最新
    pub stories: Vec<StoryView>,
}

impl ConversationStory {
    /// 最新一条快拍
    pub fn newest_story(&self) -> Option<&StoryView> {
        self.stories.last()
    }

    /// 最新一条快拍是否未读
    pub fn has_unread(&self) -> bool {
        self.newest_story().is_some_and(|s| s.is_unread)
    }
}

/// 快拍列表查询结果
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoriesResult {
    pub stories: Vec<ConversationStory>,
    pub hidden_stories: Vec<ConversationStory>,
}

impl StoriesResult {
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty() && self.hidden_stories.is_empty()
    }

    /// 可见快拍中最新一条未读的会话数
    pub fn unread_count(&self) -> usize {
        self.stories.iter().filter(|s| s.has_unread()).count()
    }

    /// 隐藏快拍中最新一条未读的会话数
    pub fn hidden_unread_count(&self) -> usize {
        self.hidden_stories.iter().filter(|s| s.has_unread()).count()
    }
}
