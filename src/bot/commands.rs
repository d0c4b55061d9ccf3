use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::command::{BotCommands, ParseError};

use crate::bot::router::MenuAction;
use crate::bot::AppState;
use crate::prompts;
use crate::scheduler::PostingMessage;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum BotCommand {
    #[command(description = "Запустить бота")]
    Start,
    #[command(description = "Открыть меню")]
    Menu,
    #[command(description = "Совет по развитию flow")]
    Advice,
    #[command(description = "Строки рэпа на тему, например /lyrics любовь", parse_with = parse_theme)]
    Lyrics(String),
    #[command(description = "Список команд")]
    Help,
    #[command(description = "Статистика использования (для админов)")]
    Stats,
    #[command(description = "Опубликовать пост в канал сейчас (для админов)")]
    PostNow,
}

/// The whole remainder of the message is the theme; it may be empty.
fn parse_theme(input: String) -> Result<(String,), ParseError> {
    Ok((input.trim().to_string(),))
}

pub fn menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        MenuAction::ALL
            .iter()
            .map(|a| vec![InlineKeyboardButton::callback(a.label(), a.id())]),
    )
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: BotCommand,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let user_id = msg.from.as_ref().map(|u| u.id.0 as i64).unwrap_or(0);
    let chat_id = msg.chat.id;

    match cmd {
        BotCommand::Start => {
            bot.send_message(chat_id, prompts::WELCOME_TEXT).await?;
        }

        BotCommand::Menu => {
            bot.send_message(chat_id, prompts::MENU_TEXT)
                .reply_markup(menu_keyboard())
                .await?;
        }

        BotCommand::Advice => {
            bot.send_chat_action(chat_id, ChatAction::Typing).await?;
            let advice = state.router.advice(chat_id.0).await;
            bot.send_message(chat_id, advice).await?;
        }

        BotCommand::Lyrics(theme) => {
            bot.send_chat_action(chat_id, ChatAction::Typing).await?;
            let reply = state.router.lyrics(chat_id.0, &theme).await;
            bot.send_message(chat_id, reply).await?;
        }

        BotCommand::Help => {
            bot.send_message(chat_id, BotCommand::descriptions().to_string())
                .await?;
        }

        BotCommand::Stats => {
            if !state.config.is_admin(user_id) {
                bot.send_message(chat_id, "❌ Статистика доступна только админам.")
                    .await?;
                return Ok(());
            }
            let stats = state.router.stats().await?;
            bot.send_message(chat_id, stats).await?;
        }

        BotCommand::PostNow => {
            if !state.config.is_admin(user_id) {
                bot.send_message(chat_id, "❌ Публиковать посты могут только админы.")
                    .await?;
                return Ok(());
            }
            state.posting.send(PostingMessage::PostNext).await?;
            tracing::info!("Admin {} requested an immediate post", user_id);
            bot.send_message(chat_id, "📬 Публикую пост в канал...")
                .await?;
        }
    }

    Ok(())
}
