//! Fixed prompts, fallback texts and generation parameters.

use crate::ai::llm::GenerationRequest;
use crate::content::Track;

/// Posted instead of generated text when generation fails.
pub const POST_FALLBACK_TEXT: &str = "Произошла ошибка при генерации текста.";
/// Shown to a user when an on-demand generation fails.
pub const REPLY_FALLBACK_TEXT: &str = "Не удалось сгенерировать текст.";
/// Posted instead of a stock photo when the image lookup fails.
pub const FALLBACK_IMAGE_URL: &str = "https://images.unsplash.com/photo-1519389950473-47ba0277781c?ixlib=rb-4.0.3&auto=format&w=600&q=60";

pub const DEFAULT_LYRICS_THEME: &str = "рэп";

pub const WELCOME_TEXT: &str =
    "👋 Привет! Я могу дать тебе советы по рэпу, генерировать тексты и публиковать посты в канал.";
pub const MENU_TEXT: &str = "Выбери, что хочешь узнать:";
pub const UNKNOWN_ACTION_TEXT: &str = "🤷 Неизвестная команда.";

const ADVICE_PROMPT: &str = "Дай совет начинающему рэперу по развитию уникального flow.";
const WRITING_TIPS_PROMPT: &str =
    "Дай три практических совета, как писать сильные рэп-тексты. Коротко, по пунктам.";
const RHYME_IDEAS_PROMPT: &str =
    "Предложи десять свежих пар рифм для рэп-куплета на русском языке.";

pub fn channel_post(topic: &str) -> GenerationRequest {
    GenerationRequest::prompt(
        format!("Напиши интересный пост про рэп на тему: \"{}\"", topic),
        300,
        0.8,
    )
}

pub fn flow_advice() -> GenerationRequest {
    short_answer(ADVICE_PROMPT)
}

pub fn writing_tips() -> GenerationRequest {
    short_answer(WRITING_TIPS_PROMPT)
}

pub fn rhyme_ideas() -> GenerationRequest {
    short_answer(RHYME_IDEAS_PROMPT)
}

pub fn lyrics(theme: &str) -> GenerationRequest {
    GenerationRequest::prompt(
        format!(
            "Напиши 5 оригинальных строк рэпа на тему \"{}\". Сделай их разными каждый раз.",
            theme
        ),
        200,
        0.85,
    )
    .repetition_penalty(1.2)
}

fn short_answer(prompt: &str) -> GenerationRequest {
    GenerationRequest::prompt(prompt, 200, 0.8)
        .top_p(0.9)
        .repetition_penalty(1.2)
}

pub fn track_announcement(track: &Track) -> String {
    format!("🎧 Слушай мой новый трек:\n{}\n{}", track.title, track.link)
}

pub fn lyrics_reply(theme: &str, lyrics: &str) -> String {
    format!("🎵 Вот строки по теме \"{}\":\n\n{}", theme, lyrics)
}

pub fn track_listing(tracks: &[Track]) -> String {
    let mut text = String::from("🔥 Топ треки:\n");
    for (i, track) in tracks.iter().enumerate() {
        text.push_str(&format!("\n{}. {}\n{}", i + 1, track.title, track.link));
    }
    text
}
