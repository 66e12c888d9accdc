//! 会话内存表
//!
//! 以会话 ID 为主键保存会话属性，供快拍聚合查询使用。

use crate::im::conversation::lookup::ConversationLookup;
use crate::im::types::ConversationAttributes;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// 会话内存表
#[derive(Default)]
pub struct ConversationCache {
    conversations: RwLock<HashMap<String, ConversationAttributes>>,
}

impl ConversationCache {
    /// 创建空的会话表
    pub fn new() -> Self {
        Self::default()
    }

    /// 用会话列表创建会话表
    pub fn from_conversations(conversations: Vec<ConversationAttributes>) -> Self {
        let map = conversations
            .into_iter()
            .map(|conv| (conv.id.clone(), conv))
            .collect();
        Self {
            conversations: RwLock::new(map),
        }
    }

    /// 插入或更新会话
    pub fn upsert_conversation(&self, conv: ConversationAttributes) -> Result<()> {
        let mut conversations = self
            .conversations
            .write()
            .map_err(|_| anyhow!("会话表写锁已损坏"))?;
        debug!("[ConvCache] 写入会话: {}", conv.id);
        conversations.insert(conv.id.clone(), conv);
        Ok(())
    }

    /// 删除会话
    pub fn delete_conversation(&self, conversation_id: &str) -> Result<()> {
        let mut conversations = self
            .conversations
            .write()
            .map_err(|_| anyhow!("会话表写锁已损坏"))?;
        if conversations.remove(conversation_id).is_some() {
            debug!("[ConvCache] 删除会话: {}", conversation_id);
        }
        Ok(())
    }

    /// 获取所有会话 ID
    pub fn get_all_conversation_ids(&self) -> Result<Vec<String>> {
        let conversations = self
            .conversations
            .read()
            .map_err(|_| anyhow!("会话表读锁已损坏"))?;
        Ok(conversations.keys().cloned().collect())
    }

    /// 会话数量
    pub fn len(&self) -> Result<usize> {
        let conversations = self
            .conversations
            .read()
            .map_err(|_| anyhow!("会话表读锁已损坏"))?;
        Ok(conversations.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl ConversationLookup for ConversationCache {
    fn get_conversation(&self, conversation_id: &str) -> Result<Option<ConversationAttributes>> {
        let conversations = self
            .conversations
            .read()
            .map_err(|_| anyhow!("会话表读锁已损坏"))?;
        Ok(conversations.get(conversation_id).cloned())
    }
}
