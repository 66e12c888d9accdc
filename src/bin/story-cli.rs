//! 快拍列表 CLI（调试用）
//!
//! 读取 JSON 快照，计算分组排序后的快拍列表并输出为 JSON

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use openim_story_core::im::conversation::{ConversationCache, ConversationLookup};
use openim_story_core::im::story::{
    StoriesSnapshot, StoryListener, StoryStore, StoryStoreConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// 快拍列表 CLI
#[derive(Parser, Debug)]
#[command(name = "story-cli")]
#[command(about = "快拍列表 CLI - 按会话分组并排序快照中的快拍", long_about = None)]
struct Args {
    /// 快照 JSON 文件路径
    #[arg(short, long)]
    input: PathBuf,

    /// 只输出隐藏的快拍
    #[arg(long)]
    hidden: bool,

    /// 当前用户 ID（仅用于日志）
    #[arg(short, long, default_value = "cli")]
    user_id: String,

    /// 日志级别（默认: info,openim_story_core=debug）
    #[arg(long, default_value = "info,openim_story_core=debug")]
    log_level: String,
}

/// 初始化日志（输出到 stderr，stdout 只留给结果 JSON）
fn init_logger(log_level: &str) {
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stderr_layer)
        .init();
}

/// 毫秒时间戳转本地时间字符串
fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp_millis(timestamp)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{}ms", timestamp))
}

/// 统计会话表中的群聊数量
fn count_groups(conversations: &ConversationCache) -> Result<usize> {
    let mut count = 0;
    for id in conversations.get_all_conversation_ids()? {
        if let Some(conv) = conversations.get_conversation(&id)? {
            if conv.is_group() {
                count += 1;
            }
        }
    }
    Ok(count)
}

struct CliStoryListener;

#[async_trait::async_trait]
impl StoryListener for CliStoryListener {
    async fn on_stories_changed(&self, stories_json: String) {
        info!("[CLI/Story] 🔄 快拍列表变更: {} 字节", stories_json.len());
    }

    async fn on_unread_story_count_changed(&self, unread_count: usize) {
        info!("[CLI/Story] 📬 未读快拍会话数: {}", unread_count);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(&args.log_level);

    info!("[CLI] 📂 读取快照: {}", args.input.display());
    let raw = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("读取快照文件失败: {}", args.input.display()))?;
    let snapshot: StoriesSnapshot =
        serde_json::from_str(&raw).context("解析快照 JSON 失败")?;
    if !snapshot.is_showing_stories_view {
        warn!("[CLI] 快照中快拍页未展示，结果为空");
    }

    let (state, conversations) = snapshot.into_parts();
    let conversations = Arc::new(conversations);
    let group_count = count_groups(&conversations)?;
    info!(
        "[CLI] 快拍 {} 条, 会话 {} 个（群聊 {} 个）",
        state.stories.len(),
        conversations.len()?,
        group_count
    );

    let config = StoryStoreConfig {
        show_stories_view: state.is_showing_stories_view,
        ..StoryStoreConfig::new(args.user_id.clone())
    };
    let lookup: Arc<dyn ConversationLookup> = conversations.clone();
    let store = StoryStore::with_listener(config, lookup, Arc::new(CliStoryListener));
    store.set_stories(state.stories.as_ref().clone()).await?;

    let result = store.get_stories().await?;
    let groups = if args.hidden {
        &result.hidden_stories
    } else {
        &result.stories
    };
    for group in groups {
        if let Some(newest) = group.newest_story() {
            let video_count = group
                .stories
                .iter()
                .filter(|s| s.attachment.as_ref().is_some_and(|a| a.is_video()))
                .count();
            info!(
                "[CLI]   - {} [{}] | 快拍: {}（视频 {}） | 最新: {}{}",
                group.conversation_id,
                if group.group.is_some() { "群聊" } else { "单聊" },
                group.stories.len(),
                video_count,
                format_timestamp(newest.timestamp),
                if newest.is_unread { " (未读)" } else { "" }
            );
        }
    }

    let output = serde_json::to_string_pretty(groups).context("序列化结果失败")?;
    println!("{}", output);
    Ok(())
}
