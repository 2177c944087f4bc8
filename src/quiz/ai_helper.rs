use async_trait::async_trait;
use chatgpt::client::ChatGPT;
use chatgpt::config::ChatGPTEngine;
use chatgpt::types::CompletionResponse;

use crate::config::Config;
use crate::error::QuizError;
use crate::quiz::session::QuestionGenerator;
use crate::quiz::Level;

/// Asks ChatGPT for quiz questions. Returns the completion text untouched.
pub struct QuizHelper {
    chat_gpt: ChatGPT,
}

impl QuizHelper {
    pub fn new(config: &Config) -> Result<Self, QuizError> {
        let mut chat_gpt = ChatGPT::new(config.api_key.clone())?;

        chat_gpt.config.engine = engine_for(&config.model);
        chat_gpt.config.timeout = config.generation_timeout;

        Ok(Self { chat_gpt })
    }
}

#[async_trait]
impl QuestionGenerator for QuizHelper {
    async fn generate(&self, language: &str, level: Level, count: usize) -> Result<String, QuizError> {
        log::info!("Generating {} {} questions about {}", count, level, language);
        let prompt = build_prompt(language, level, count);

        let response: CompletionResponse = self.chat_gpt.send_message(&prompt).await?;
        let content = response.message().clone().content;

        log::debug!("Completion: {:?}", content);

        Ok(content)
    }
}

fn engine_for(model: &str) -> ChatGPTEngine {
    match model.trim().to_ascii_lowercase().as_str() {
        "gpt-3.5-turbo" => ChatGPTEngine::Gpt35Turbo,
        "gpt-4" => ChatGPTEngine::Gpt4,
        other => {
            log::warn!("Unknown model {:?}, falling back to gpt-3.5-turbo", other);
            ChatGPTEngine::Gpt35Turbo
        }
    }
}

pub fn build_prompt(language: &str, level: Level, count: usize) -> String {
    format!(
        "You are an assistant that MUST output only valid JSON (no commentary, no extra text).
        Generate {count} multiple-choice questions to evaluate a learner of {language} at {level} level.
        Return a JSON array of objects exactly like:
        [
          {{
            \"question\": \"Question text here?\",
            \"options\": [\"A) ...\", \"B) ...\", \"C) ...\", \"D) ...\"],
            \"answer\": \"B\"
          }}
        ]
        Each object has the keys question, options (an array of 4 strings) and answer (a single letter A, B, C or D).
        Options start with 'A)', 'B)', 'C)', 'D)'.
        Do NOT put any commentary outside the JSON."
    )
}
