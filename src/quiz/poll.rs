//! Decides which parsed questions can go out as Telegram quiz polls.
//!
//! The parser keeps whatever the model wrote. Here each question is checked
//! against the quiz-poll limits of the Bot API and either accepted as a
//! [`QuizPoll`] or skipped with a [`PollRejection`]. Nothing is truncated.

use thiserror::Error;

use crate::quiz::Question;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollRejection {
    #[error("no correct answer was given")]
    MissingAnswer,

    #[error("question text is empty")]
    EmptyQuestion,

    #[error("question is {len} characters long, the limit is {max}")]
    QuestionTooLong { len: usize, max: usize },

    #[error("{count} options given, at least {min} are required")]
    TooFewOptions { count: usize, min: usize },

    #[error("{count} options given, at most {max} are allowed")]
    TooManyOptions { count: usize, max: usize },

    #[error("option {index} is empty")]
    EmptyOption { index: usize },

    #[error("option {index} is {len} characters long, the limit is {max}")]
    OptionTooLong { index: usize, len: usize, max: usize },

    #[error("answer index {index} is outside of {count} options")]
    AnswerOutOfRange { index: usize, count: usize },
}

/// Size limits of a quiz poll, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollLimits {
    pub max_question_chars: usize,
    pub min_options: usize,
    pub max_options: usize,
    pub max_option_chars: usize,
}

impl Default for PollLimits {
    fn default() -> Self {
        Self {
            max_question_chars: 300,
            min_options: 2,
            max_options: 10,
            max_option_chars: 100,
        }
    }
}

/// A question that satisfies every transport limit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct QuizPoll {
    pub question: String,
    pub options: Vec<String>,
    pub correct_option_id: u8,
}

impl PollLimits {
    pub fn check(&self, question: &Question) -> Result<QuizPoll, PollRejection> {
        let answer_index = question.answer_index.ok_or(PollRejection::MissingAnswer)?;

        let question_len = question.question.chars().count();
        if question_len == 0 {
            return Err(PollRejection::EmptyQuestion);
        }
        if question_len > self.max_question_chars {
            return Err(PollRejection::QuestionTooLong {
                len: question_len,
                max: self.max_question_chars,
            });
        }

        let count = question.options.len();
        if count < self.min_options {
            return Err(PollRejection::TooFewOptions {
                count,
                min: self.min_options,
            });
        }
        if count > self.max_options {
            return Err(PollRejection::TooManyOptions {
                count,
                max: self.max_options,
            });
        }

        for (index, option) in question.options.iter().enumerate() {
            let len = option.chars().count();
            if len == 0 {
                return Err(PollRejection::EmptyOption { index });
            }
            if len > self.max_option_chars {
                return Err(PollRejection::OptionTooLong {
                    index,
                    len,
                    max: self.max_option_chars,
                });
            }
        }

        let out_of_range = PollRejection::AnswerOutOfRange {
            index: answer_index,
            count,
        };
        if answer_index >= count {
            return Err(out_of_range);
        }
        let correct_option_id = u8::try_from(answer_index).map_err(|_| out_of_range)?;

        Ok(QuizPoll {
            question: question.question.clone(),
            options: question.options.clone(),
            correct_option_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedQuestion {
    pub question: Question,
    pub reason: PollRejection,
}

/// Parsed questions split into polls to send and questions to report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryPlan {
    pub polls: Vec<QuizPoll>,
    pub skipped: Vec<SkippedQuestion>,
}

impl DeliveryPlan {
    pub fn new(questions: Vec<Question>, limits: &PollLimits) -> Self {
        let mut plan = Self::default();

        for question in questions {
            match limits.check(&question) {
                Ok(poll) => plan.polls.push(poll),
                Err(reason) => {
                    log::warn!("Skipping question {:?}: {}", question.question, reason);
                    plan.skipped.push(SkippedQuestion { question, reason });
                }
            }
        }

        plan
    }

    pub fn total(&self) -> usize {
        self.polls.len() + self.skipped.len()
    }

    /// Partial-failure notice for the user, `None` when nothing was skipped.
    pub fn summary(&self) -> Option<String> {
        if self.skipped.is_empty() {
            return None;
        }
        Some(format!(
            "Skipped {} of {} questions that could not be sent as quiz polls.",
            self.skipped.len(),
            self.total()
        ))
    }
}
