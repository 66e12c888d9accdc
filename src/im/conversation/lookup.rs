//! 会话查询接口
//!
//! 快拍聚合通过该接口把会话 ID 解析为会话 / 联系人属性。

use crate::im::types::ConversationAttributes;
use anyhow::Result;
use std::collections::HashMap;

/// 会话查询（由调用方注入）
///
/// 查不到时返回 `Ok(None)`；只有查询方自身出错时才返回 `Err`。
pub trait ConversationLookup: Send + Sync {
    /// 根据会话 ID 获取会话属性
    fn get_conversation(&self, conversation_id: &str) -> Result<Option<ConversationAttributes>>;
}

impl ConversationLookup for HashMap<String, ConversationAttributes> {
    fn get_conversation(&self, conversation_id: &str) -> Result<Option<ConversationAttributes>> {
        Ok(self.get(conversation_id).cloned())
    }
}

impl<F> ConversationLookup for F
where
    F: Fn(&str) -> Result<Option<ConversationAttributes>> + Send + Sync,
{
    fn get_conversation(&self, conversation_id: &str) -> Result<Option<ConversationAttributes>> {
        self(conversation_id)
    }
}
