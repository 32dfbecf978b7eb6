pub mod ai_helper;
pub mod parser;
pub mod poll;

pub use parser::parse_questions;

/// One generation round: the requested topic and the questions parsed from the reply.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Quiz {
    pub topic: String,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn new(topic: String, questions: Vec<Question>) -> Self {
        Self { topic, questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions for which the model gave no usable answer line.
    pub fn answerless(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| q.answer_index.is_none())
    }
}

/// A multiple-choice question as parsed from model output.
///
/// Text and options are kept exactly as parsed; transport limits are checked
/// later by [`poll::PollLimits`].
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index of the correct option, if the model stated one.
    pub answer_index: Option<usize>,
}

impl Question {
    pub fn new(question: String, options: Vec<String>, answer_index: Option<usize>) -> Self {
        Self {
            question,
            options,
            answer_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn quiz_reports_answerless_questions() {
        let quiz = Quiz::new(
            "rust".to_string(),
            parse_questions("1. A?\na) x\nAnswer: a\n2. B?\na) y\nb) z"),
        );

        assert_eq!(quiz.len(), 2);
        assert!(!quiz.is_empty());
        let answerless: Vec<_> = quiz.answerless().map(|q| q.question.as_str()).collect();
        assert_eq!(answerless, vec!["B?"]);
    }

    #[test]
    fn empty_quiz() {
        let quiz = Quiz::new("nothing".to_string(), parse_questions("no questions here"));
        assert!(quiz.is_empty());
        assert_eq!(quiz.answerless().count(), 0);
    }
}
