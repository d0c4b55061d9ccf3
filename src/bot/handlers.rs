use teloxide::prelude::*;

/// Plain messages are not answered, only logged.
pub async fn handle_message(msg: Message) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let username = msg
        .from
        .as_ref()
        .and_then(|u| u.username.as_deref())
        .unwrap_or("unknown");

    if let Some(text) = msg.text() {
        tracing::info!("📩 Message from {}: {}", username, text);
    }

    Ok(())
}
