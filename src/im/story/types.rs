//! 快拍快照 DTO（可直接从 JSON 反序列化）

use crate::im::conversation::cache::ConversationCache;
use crate::im::story::models::{LocalStory, StoriesState};
use crate::im::types::ConversationAttributes;
use serde::{Deserialize, Serialize};

/// 快拍快照：快拍状态 + 会话列表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoriesSnapshot {
    #[serde(default)]
    pub is_showing_stories_view: bool,
    #[serde(default)]
    pub stories: Vec<LocalStory>,
    #[serde(default)]
    pub conversations: Vec<ConversationAttributes>,
}

impl StoriesSnapshot {
    /// 拆分为快拍状态和会话表
    pub fn into_parts(self) -> (StoriesState, ConversationCache) {
        (
            StoriesState::new(self.is_showing_stories_view, self.stories),
            ConversationCache::from_conversations(self.conversations),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::im::story::selector::get_stories;

    #[test]
    fn snapshot_json_drives_selector() {
        let json = r#"{
            "isShowingStoriesView": true,
            "stories": [
                {"conversationID": "G", "sourceUUID": "alice", "messageID": "m1", "timestamp": 100, "readStatus": 0},
                {"conversationID": "bob", "source": "bob", "messageID": "m2", "timestamp": 50, "readStatus": 1,
                 "attachment": {"contentType": "video/mp4", "url": "https://cdn.example/v.mp4"}}
            ],
            "conversations": [
                {"id": "alice", "title": "Alice"},
                {"id": "bob", "title": "Bob", "hideStory": true},
                {"id": "G", "title": "Family", "conversationType": 2}
            ]
        }"#;
        let snapshot: StoriesSnapshot = serde_json::from_str(json).unwrap();
        let (state, conversations) = snapshot.into_parts();

        let result = get_stories(&state, &conversations).unwrap();
        assert_eq!(result.stories.len(), 1);
        assert_eq!(result.stories[0].group.as_ref().unwrap().title.as_deref(), Some("Family"));
        assert_eq!(result.hidden_stories.len(), 1);
        let hidden = &result.hidden_stories[0].stories[0];
        assert!(hidden.is_unread);
        assert!(hidden.attachment.as_ref().unwrap().is_video());

        let output = serde_json::to_value(&result).unwrap();
        assert_eq!(output["hiddenStories"][0]["conversationID"], "bob");
        assert_eq!(output["stories"][0]["isHidden"], false);
    }
}
