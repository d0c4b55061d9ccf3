use std::sync::Arc;

use crate::ai::llm::GenerationRequest;
use crate::ai::ContentGenerator;
use crate::content::{AnalyticsLedger, Catalog, CommandKind, UsageLedger};
use crate::prompts;

/// Inline menu entries and their callback ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    FlowAdvice,
    WritingTips,
    RhymeIdeas,
    TopTracks,
}

impl MenuAction {
    pub const ALL: [MenuAction; 4] = [
        Self::FlowAdvice,
        Self::WritingTips,
        Self::RhymeIdeas,
        Self::TopTracks,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::FlowAdvice => "flow_advice",
            Self::WritingTips => "writing_tips",
            Self::RhymeIdeas => "rhyme_ideas",
            Self::TopTracks => "top_tracks",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FlowAdvice => "🎤 Совет по flow",
            Self::WritingTips => "✍️ Как писать тексты",
            Self::RhymeIdeas => "🧩 Идеи для рифм",
            Self::TopTracks => "🎧 Топ треки",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }
}

/// Answers user commands. Independent of the Telegram transport.
pub struct CommandRouter {
    generator: Arc<dyn ContentGenerator>,
    analytics: AnalyticsLedger,
    usage: UsageLedger,
    catalog: Arc<Catalog>,
}

impl CommandRouter {
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        analytics: AnalyticsLedger,
        usage: UsageLedger,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            generator,
            analytics,
            usage,
            catalog,
        }
    }

    pub async fn advice(&self, chat_id: i64) -> String {
        self.count(CommandKind::Advice, chat_id).await;
        self.generate_or_fallback("advice", &prompts::flow_advice())
            .await
    }

    /// Five lines on `theme`; a blank theme falls back to the default one.
    pub async fn lyrics(&self, chat_id: i64, theme: &str) -> String {
        let theme = match theme.trim() {
            "" => prompts::DEFAULT_LYRICS_THEME,
            t => t,
        };
        self.count(CommandKind::Lyrics, chat_id).await;
        let lyrics = self
            .generate_or_fallback("lyrics", &prompts::lyrics(theme))
            .await;
        prompts::lyrics_reply(theme, &lyrics)
    }

    /// Reply for an inline menu button.
    pub async fn callback(&self, data: &str) -> String {
        match MenuAction::from_id(data) {
            Some(MenuAction::FlowAdvice) => {
                self.generate_or_fallback("flow_advice", &prompts::flow_advice())
                    .await
            }
            Some(MenuAction::WritingTips) => {
                self.generate_or_fallback("writing_tips", &prompts::writing_tips())
                    .await
            }
            Some(MenuAction::RhymeIdeas) => {
                self.generate_or_fallback("rhyme_ideas", &prompts::rhyme_ideas())
                    .await
            }
            Some(MenuAction::TopTracks) => prompts::track_listing(&self.catalog.tracks),
            None => {
                tracing::debug!("Unknown callback data: {}", data);
                prompts::UNKNOWN_ACTION_TEXT.to_string()
            }
        }
    }

    pub async fn stats(&self) -> anyhow::Result<String> {
        let state = self.analytics.snapshot().await?;
        let used = self.usage.used().await?;
        let mut text = format!("📊 Пользователей: {}\n", state.users.len());
        for command in [CommandKind::Advice, CommandKind::Lyrics] {
            text.push_str(&format!("/{}: {}\n", command.as_str(), state.count(command)));
        }
        let in_rotation = self
            .catalog
            .topics
            .iter()
            .filter(|t| used.contains(*t))
            .count();
        text.push_str(&format!(
            "🔁 Тем в текущем круге: {}/{}",
            in_rotation,
            self.catalog.topics.len()
        ));
        Ok(text)
    }

    async fn count(&self, command: CommandKind, chat_id: i64) {
        if let Err(e) = self.analytics.record(command, chat_id).await {
            tracing::error!("Failed to record /{} usage: {}", command.as_str(), e);
        }
    }

    async fn generate_or_fallback(&self, operation: &str, request: &GenerationRequest) -> String {
        match self.generator.generate(request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Generation for {} failed: {}", operation, e);
                prompts::REPLY_FALLBACK_TEXT.to_string()
            }
        }
    }
}
