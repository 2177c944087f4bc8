mod config;
mod error;
mod quiz;

use std::sync::Arc;

use config::Config;
use dotenv::dotenv;
use quiz::{
    ai_helper::QuizHelper,
    session::{QuizSession, Report, Stage},
    Level, LANGUAGES,
};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{ChatAction, KeyboardButton, KeyboardMarkup},
};

type QuizDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Dialogue state per chat. Every state after `Start` carries the chat's quiz session,
/// and the variant always matches the session's stage.
#[derive(Debug, Clone, Default)]
pub enum State {
    #[default]
    Start,
    ReceiveLanguage {
        session: QuizSession,
    },
    ReceiveLevel {
        session: QuizSession,
    },
    Asking {
        session: QuizSession,
    },
    Results {
        session: QuizSession,
    },
}

impl From<QuizSession> for State {
    fn from(session: QuizSession) -> Self {
        match session.stage() {
            Stage::SelectLanguage => State::ReceiveLanguage { session },
            Stage::SelectLevel => State::ReceiveLevel { session },
            Stage::Asking => State::Asking { session },
            Stage::Results => State::Results { session },
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting quiz bot...");

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let quiz_helper = match QuizHelper::new(&config) {
        Ok(helper) => Arc::new(helper),
        Err(err) => {
            log::error!("Unable to connect with ChatGPT: {}", err);
            std::process::exit(1);
        }
    };

    let bot = Bot::from_env();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveLanguage { session }].endpoint(receive_language))
            .branch(dptree::case![State::ReceiveLevel { session }].endpoint(receive_level))
            .branch(dptree::case![State::Asking { session }].endpoint(receive_answer))
            .branch(dptree::case![State::Results { session }].endpoint(start_new_quiz)),
    )
    .dependencies(dptree::deps![InMemStorage::<State>::new(), quiz_helper, config])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

const GREETING_TEXT: &str = "Hi! I will check your programming skills with a short multiple-choice quiz. Choose a programming language (or type your own):";
const RETRY: &str = "🔁 Retry";
const PREVIOUS: &str = "⬅️ Previous";
const FINISH: &str = "🏁 Finish now";
const NEW_QUIZ: &str = "🚀 New quiz";
// Telegram rejects messages longer than 4096 characters.
const MESSAGE_LIMIT: usize = 4000;
const RAW_EXCERPT_LIMIT: usize = 1500;

fn language_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(
        LANGUAGES
            .chunks(3)
            .map(|row| row.iter().map(|language| KeyboardButton::new(*language)).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    )
}

fn level_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![Level::ALL
        .iter()
        .map(|level| KeyboardButton::new(level.to_string()))
        .collect::<Vec<_>>()])
}

fn retry_keyboard() -> KeyboardMarkup {
    let mut rows = vec![vec![KeyboardButton::new(RETRY)]];
    rows.extend(level_keyboard().keyboard);
    KeyboardMarkup::new(rows)
}

async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT)
        .reply_markup(language_keyboard())
        .await?;

    dialogue.update(State::from(QuizSession::new())).await?;
    Ok(())
}

async fn receive_language(
    bot: Bot,
    dialogue: QuizDialogue,
    mut session: QuizSession,
    msg: Message,
) -> HandlerResult {
    let Some(language) = msg.text() else {
        bot.send_message(msg.chat.id, "Please choose a language (as text)")
            .await?;
        return Ok(());
    };

    let selected = session
        .select_language(language)
        .and_then(|()| session.confirm_language());
    if let Err(err) = selected {
        bot.send_message(msg.chat.id, format!("{}. Please choose a language", err))
            .await?;
        return Ok(());
    }

    bot.send_message(
        msg.chat.id,
        format!("{} it is! Now choose your skill level:", language.trim()),
    )
    .reply_markup(level_keyboard())
    .await?;

    dialogue.update(State::from(session)).await?;
    Ok(())
}

async fn receive_level(
    bot: Bot,
    dialogue: QuizDialogue,
    mut session: QuizSession,
    quiz_helper: Arc<QuizHelper>,
    config: Arc<Config>,
    msg: Message,
) -> HandlerResult {
    match msg.text() {
        Some(RETRY) if session.level().is_some() => {}
        Some(text) => match text.parse::<Level>() {
            Ok(level) => session.select_level(level)?,
            Err(err) => {
                bot.send_message(msg.chat.id, err.to_string())
                    .reply_markup(level_keyboard())
                    .await?;
                return Ok(());
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Please choose one of the levels")
                .reply_markup(level_keyboard())
                .await?;
            return Ok(());
        }
    }

    let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;
    bot.send_message(
        msg.chat.id,
        format!(
            "Generating {} questions, this can take a minute...",
            session.language().unwrap_or_default()
        ),
    )
    .await?;

    match session
        .confirm_level(quiz_helper.as_ref(), config.question_count)
        .await
    {
        Ok(count) => {
            log::debug!("Raw response for chat {}: {:?}", msg.chat.id.0, session.raw_response());
            bot.send_message(msg.chat.id, format!("Generated {} questions. Let's go!", count))
                .await?;
            send_question(&bot, msg.chat.id, &session).await?;
        }
        Err(err) => {
            log::warn!("Quiz generation failed for chat {}: {}", msg.chat.id.0, err);
            let mut text = format!("⚠️ {}", err);
            if let Some(raw) = err.raw_response() {
                text.push_str("\n\nRaw model output:\n");
                text.push_str(&excerpt(raw, RAW_EXCERPT_LIMIT));
            }
            text.push_str("\n\nPress Retry or choose a level to try again.");
            bot.send_message(msg.chat.id, excerpt(&text, MESSAGE_LIMIT))
                .reply_markup(retry_keyboard())
                .await?;
        }
    }

    dialogue.update(State::from(session)).await?;
    Ok(())
}

async fn receive_answer(
    bot: Bot,
    dialogue: QuizDialogue,
    mut session: QuizSession,
    msg: Message,
) -> HandlerResult {
    match msg.text() {
        Some(PREVIOUS) => session.previous()?,
        Some(FINISH) => session.finish()?,
        Some(choice) => {
            if let Err(err) = session.answer(choice) {
                bot.send_message(msg.chat.id, format!("{}. Please use the buttons", err))
                    .await?;
                return Ok(());
            }
        }
        None => {
            bot.send_message(msg.chat.id, "Please choose one of the options")
                .await?;
            return Ok(());
        }
    }

    match session.report() {
        Some(report) => {
            log::info!(
                "Chat {} finished a {} quiz with {} / {}",
                msg.chat.id.0,
                session.language().unwrap_or_default(),
                session.score(),
                report.total
            );
            let keyboard = KeyboardMarkup::new(vec![vec![KeyboardButton::new(NEW_QUIZ)]]);
            for text in format_report(&report) {
                bot.send_message(msg.chat.id, text)
                    .reply_markup(keyboard.clone())
                    .await?;
            }
        }
        None => send_question(&bot, msg.chat.id, &session).await?,
    }

    dialogue.update(State::from(session)).await?;
    Ok(())
}

async fn start_new_quiz(
    bot: Bot,
    dialogue: QuizDialogue,
    mut session: QuizSession,
    msg: Message,
) -> HandlerResult {
    session.reset();
    bot.send_message(msg.chat.id, "Let's start a new quiz! Choose a programming language:")
        .reply_markup(language_keyboard())
        .await?;

    dialogue.update(State::from(session)).await?;
    Ok(())
}

async fn send_question(bot: &Bot, chat_id: ChatId, session: &QuizSession) -> HandlerResult {
    let Some(question) = session.current() else {
        return Ok(());
    };

    let text = format!(
        "🧠 Question {} of {}\n\n{}",
        session.cursor() + 1,
        session.quiz().len(),
        question.question
    );

    let mut rows = question
        .options()
        .iter()
        .map(|option| vec![KeyboardButton::new(option.clone())])
        .collect::<Vec<_>>();
    rows.push(vec![KeyboardButton::new(PREVIOUS), KeyboardButton::new(FINISH)]);

    bot.send_message(chat_id, text)
        .reply_markup(KeyboardMarkup::new(rows))
        .await?;
    Ok(())
}

/// Renders the results as one or more messages that each fit Telegram's size limit.
fn format_report(report: &Report) -> Vec<String> {
    let mut header = format!(
        "🎉 Evaluation complete!\n✅ You scored {} / {}",
        report.score, report.total
    );
    if report.total > 0 && report.score * 5 >= report.total * 4 {
        header.push_str("\n🎈 Outstanding result!");
    }
    header.push_str("\n\nYour answers:");

    let mut paragraphs = vec![header];
    for (index, entry) in report.entries.iter().enumerate() {
        paragraphs.push(format!(
            "Q{}: {}\nYour answer: {} | {}\nCorrect answer: {}",
            index + 1,
            entry.question,
            entry.given.as_deref().unwrap_or("-"),
            if entry.is_correct { "✅ Correct" } else { "❌ Incorrect" },
            entry.correct_option.as_deref().unwrap_or("Unknown"),
        ));
    }

    let mut messages: Vec<String> = Vec::new();
    for paragraph in paragraphs {
        let paragraph = excerpt(&paragraph, MESSAGE_LIMIT);
        match messages.last_mut() {
            Some(last) if last.chars().count() + paragraph.chars().count() + 2 <= MESSAGE_LIMIT => {
                last.push_str("\n\n");
                last.push_str(&paragraph);
            }
            _ => messages.push(paragraph),
        }
    }
    messages
}

fn excerpt(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
