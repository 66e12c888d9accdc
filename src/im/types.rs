use serde::{Deserialize, Serialize};

/// 会话类型常量
pub mod conversation_type {
    /// 单聊
    pub const SINGLE: i32 = 1;
    /// 普通群聊
    pub const GROUP: i32 = 2;
}

/// 消息已读状态（与客户端本地消息表的 readStatus 字段一致，序列化为整数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum ReadStatus {
    /// 已读
    Read,
    /// 未读
    #[default]
    Unread,
    /// 已查看（快拍被打开过）
    Viewed,
}

impl From<ReadStatus> for i32 {
    fn from(status: ReadStatus) -> Self {
        match status {
            ReadStatus::Read => 0,
            ReadStatus::Unread => 1,
            ReadStatus::Viewed => 2,
        }
    }
}

impl TryFrom<i32> for ReadStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ReadStatus::Read),
            1 => Ok(ReadStatus::Unread),
            2 => Ok(ReadStatus::Viewed),
            other => Err(format!("未知的 readStatus: {}", other)),
        }
    }
}

/// 快拍附件（图片或视频），只保留展示层需要的字段
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryAttachment {
    /// MIME 类型，例如 "image/jpeg"、"video/mp4"
    pub content_type: String,
    /// 本地路径（已下载时存在）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// 远端 URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
    /// 缩略图本地路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    /// 文字说明
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl StoryAttachment {
    /// 是否为视频附件
    pub fn is_video(&self) -> bool {
        self.content_type.starts_with("video/")
    }
}

/// 会话 / 联系人属性（会话查询返回的完整属性集）
/// 可以直接从 JSON 反序列化，缺失的字段使用默认值
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAttributes {
    /// 会话 ID（单聊时与对方用户 ID 相同）
    pub id: String,
    /// 会话类型：1=单聊, 2=普通群聊
    #[serde(default = "default_conversation_type")]
    pub conversation_type: i32,
    /// 通讯录名称
    #[serde(default)]
    pub name: Option<String>,
    /// 对方设置的资料名称
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    /// 展示标题（名称 / 资料名称 / 手机号中第一个可用的）
    #[serde(default)]
    pub title: String,
    /// 头像本地路径
    #[serde(default)]
    pub avatar_path: Option<String>,
    /// 头像底色
    #[serde(default)]
    pub color: Option<String>,
    /// 是否为当前登录用户自己
    #[serde(default)]
    pub is_me: bool,
    /// 是否已接受消息请求
    #[serde(default)]
    pub accepted_message_request: bool,
    /// 是否隐藏该联系人的快拍
    #[serde(default)]
    pub hide_story: bool,
    /// 与当前用户共同所在的群名称
    #[serde(default)]
    pub shared_group_names: Vec<String>,
    /// 是否置顶
    #[serde(default)]
    pub is_pinned: bool,
    /// 未读消息数
    #[serde(default)]
    pub unread_count: i32,
    /// 草稿文本
    #[serde(default)]
    pub draft_text: String,
}

fn default_conversation_type() -> i32 {
    conversation_type::SINGLE
}

impl ConversationAttributes {
    /// 是否为群聊会话
    pub fn is_group(&self) -> bool {
        self.conversation_type == conversation_type::GROUP
    }
}
