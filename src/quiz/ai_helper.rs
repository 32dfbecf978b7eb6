use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chatgpt::client::ChatGPT;
use chatgpt::config::ChatGPTEngine;
use chatgpt::types::CompletionResponse;
use thiserror::Error;

use crate::quiz::{parse_questions, Quiz};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("topic is empty")]
    EmptyTopic,

    #[error("language model request failed: {0}")]
    ChatGpt(#[from] chatgpt::err::Error),
}

/// Which model answers the generation prompt. The parser is the same for all of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Model {
    #[default]
    Gpt35Turbo,
    Gpt4,
}

impl Model {
    pub fn engine(self) -> ChatGPTEngine {
        match self {
            Model::Gpt35Turbo => ChatGPTEngine::Gpt35Turbo,
            Model::Gpt4 => ChatGPTEngine::Gpt4,
        }
    }

    pub fn api_name(self) -> &'static str {
        match self {
            Model::Gpt35Turbo => "gpt-3.5-turbo",
            Model::Gpt4 => "gpt-4",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gpt-3.5-turbo" => Ok(Model::Gpt35Turbo),
            "gpt-4" => Ok(Model::Gpt4),
            other => Err(other.to_string()),
        }
    }
}

/// Prompt asking for questions in the line template understood by
/// [`parse_questions`]. Changing the template means changing the parser too.
pub fn build_prompt(topic: &str) -> String {
    format!(
        "Generate multiple choice questions on {} in the format:

  1. Question text
     a) Option 1
     b) Option 2
     c) Option 3
     d) Option 4
     Answer: a

  Only provide questions and answers in this specific format and options length must not exceed 100.",
        topic.trim()
    )
}

pub struct QuizGenerator {
    model: Model,
    chat_gpt: ChatGPT,
}

impl QuizGenerator {
    pub fn new(api_key: &str, model: Model, timeout: Duration) -> Result<Self, GenerationError> {
        let mut chat_gpt = ChatGPT::new(api_key)?;

        chat_gpt.config.engine = model.engine();
        chat_gpt.config.timeout = timeout;

        Ok(Self { model, chat_gpt })
    }

    pub fn model(&self) -> Model {
        self.model
    }

    /// Sends the generation prompt and returns the raw completion text.
    pub async fn generate_text(&self, topic: &str) -> Result<String, GenerationError> {
        if topic.trim().is_empty() {
            return Err(GenerationError::EmptyTopic);
        }

        log::info!("Generating questions on {:?} with {}", topic, self.model);
        let prompt = build_prompt(topic);

        let response: CompletionResponse = self.chat_gpt.send_message(prompt).await?;
        let content = response.message().clone().content;

        log::debug!("Completion: {:?}", content);

        Ok(content)
    }

    pub async fn generate_quiz(&self, topic: &str) -> Result<Quiz, GenerationError> {
        let text = self.generate_text(topic).await?;
        let questions = parse_questions(&text);

        log::debug!("Parsed questions: {:?}", questions);

        Ok(Quiz::new(topic.trim().to_string(), questions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prompt_mentions_topic_and_template() {
        let prompt = build_prompt("  photosynthesis ");
        assert!(prompt.contains("questions on photosynthesis in the format"));
        assert!(prompt.contains("1. Question text"));
        assert!(prompt.contains("d) Option 4"));
        assert!(prompt.contains("Answer: a"));
        assert!(prompt.contains("must not exceed 100"));
    }

    #[test]
    fn prompt_template_parses_as_one_question() {
        let questions = parse_questions(&build_prompt("anything"));
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Question text");
        assert_eq!(
            questions[0].options,
            vec!["Option 1", "Option 2", "Option 3", "Option 4"]
        );
        assert_eq!(questions[0].answer_index, Some(0));
    }

    #[test]
    fn model_names_round_trip() {
        for model in [Model::Gpt35Turbo, Model::Gpt4] {
            assert_eq!(model.api_name().parse::<Model>(), Ok(model));
        }
        assert_eq!("GPT-4".parse::<Model>(), Ok(Model::Gpt4));
        assert_eq!("gemini-1.5-pro".parse::<Model>(), Err("gemini-1.5-pro".to_string()));
        assert_eq!(Model::default(), Model::Gpt35Turbo);
    }
}
