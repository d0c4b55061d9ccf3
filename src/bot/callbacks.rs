use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ChatAction;

use crate::bot::AppState;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Acknowledge first so the button stops spinning while we generate.
    bot.answer_callback_query(&q.id).await?;

    let data = match q.data.as_deref() {
        Some(d) => d,
        None => return Ok(()),
    };

    let chat_id = match &q.message {
        Some(m) => m.chat().id,
        None => {
            tracing::debug!("Callback '{}' has no message to reply to", data);
            return Ok(());
        }
    };

    bot.send_chat_action(chat_id, ChatAction::Typing).await?;
    let reply = state.router.callback(data).await;
    bot.send_message(chat_id, reply).await?;

    Ok(())
}
