//! Turns model-generated quiz text into [`Question`] records.
//!
//! The expected template looks like this:
//! ```text
//! 1. What is 2+2?
//! a) 3
//! b) 4
//! c) 5
//! d) 6
//! Answer: b
//! ```
//! The model does not always follow it: bold markers, stray lines and missing
//! answers all show up. Anything unrecognised is skipped instead of failing.

use std::sync::LazyLock;

use regex::Regex;

use crate::quiz::Question;

const ANSWER_LETTERS: [char; 4] = ['a', 'b', 'c', 'd'];

static PATTERNS: LazyLock<LinePatterns> = LazyLock::new(LinePatterns::new);

struct LinePatterns {
    // **12. Text** / 12. **Text** / 12. Text
    question: Regex,
    // a) Text
    option: Regex,
    // Answer: b / **Answer: b** / **Answer:** b)
    answer_prefix: Regex,
    answer_letter: Regex,
}

impl LinePatterns {
    fn new() -> Self {
        Self {
            question: Regex::new(r"^(?:\*\*)?\s*\d+\.\s*(?:\*\*)?\s*(.*?)\s*(?:\*\*)?$")
                .expect("static regex must compile"),
            option: Regex::new(r"^([a-dA-D])\)\s*(.*)$").expect("static regex must compile"),
            answer_prefix: Regex::new(r"(?i)^(?:\*\*)?answer:").expect("static regex must compile"),
            answer_letter: Regex::new(r"(?i)\b([a-d])\)?(?:\*\*)?$")
                .expect("static regex must compile"),
        }
    }
}

/// What a single line of model output means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// A numbered question header, with ordinal and bold markers stripped.
    QuestionStart(&'a str),
    OptionLine { letter: char, text: &'a str },
    /// `Answer:` line. `None` when no answer letter could be found on it.
    AnswerLine(Option<char>),
    Ignored,
}

/// Classifies one trimmed, non-blank line without looking at its neighbours.
pub fn classify(line: &str) -> LineKind<'_> {
    let patterns = &*PATTERNS;

    if let Some(caps) = patterns.question.captures(line) {
        let text = caps.get(1).map_or("", |m| m.as_str());
        return LineKind::QuestionStart(text.trim());
    }

    if let Some(caps) = patterns.option.captures(line) {
        let letter = first_letter(&caps[1]);
        let text = caps.get(2).map_or("", |m| m.as_str());
        return LineKind::OptionLine {
            letter,
            text: text.trim(),
        };
    }

    if patterns.answer_prefix.is_match(line) {
        let letter = patterns
            .answer_letter
            .captures(line)
            .map(|caps| first_letter(&caps[1]));
        return LineKind::AnswerLine(letter);
    }

    LineKind::Ignored
}

// Capture groups holding a letter always match exactly one ASCII character.
fn first_letter(group: &str) -> char {
    char::from(group.as_bytes()[0]).to_ascii_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq)]
struct QuestionDraft {
    question_text: String,
    options: Vec<String>,
    answer_letter: Option<char>,
}

impl QuestionDraft {
    fn new(question_text: &str) -> Self {
        Self {
            question_text: question_text.to_string(),
            ..Self::default()
        }
    }

    /// Drafts without options are not actionable and produce nothing.
    fn finalize(self) -> Option<Question> {
        if self.options.is_empty() {
            log::debug!(
                "Dropping question without options: {:?}",
                self.question_text
            );
            return None;
        }

        let answer_index = self
            .answer_letter
            .and_then(|letter| ANSWER_LETTERS.iter().position(|&l| l == letter))
            .filter(|&index| index < self.options.len());

        Some(Question::new(self.question_text, self.options, answer_index))
    }
}

/// Fold state: the open draft, if any, and every draft closed so far.
#[derive(Debug, Default)]
struct Accumulator {
    open: Option<QuestionDraft>,
    closed: Vec<QuestionDraft>,
}

impl Accumulator {
    fn step(self, line: LineKind<'_>) -> Self {
        let Accumulator { open, mut closed } = self;

        let open = match (line, open) {
            (LineKind::QuestionStart(text), previous) => {
                closed.extend(previous);
                Some(QuestionDraft::new(text))
            }
            (LineKind::OptionLine { letter, text }, Some(mut draft)) => {
                if ANSWER_LETTERS.get(draft.options.len()) != Some(&letter) {
                    log::debug!(
                        "Option {}) out of sequence in {:?}",
                        letter,
                        draft.question_text
                    );
                }
                draft.options.push(text.to_string());
                Some(draft)
            }
            (LineKind::AnswerLine(Some(letter)), Some(mut draft)) => {
                draft.answer_letter = Some(letter);
                Some(draft)
            }
            // Options or answers before the first question, answer lines
            // without a letter and ignored lines leave the state alone.
            (_, open) => open,
        };

        Accumulator { open, closed }
    }

    fn finish(self) -> Vec<QuestionDraft> {
        let Accumulator { open, mut closed } = self;
        closed.extend(open);
        closed
    }
}

/// Parses a raw model response into questions, in the order they appear.
///
/// Never fails: malformed input yields fewer questions, possibly none.
pub fn parse_questions(text: &str) -> Vec<Question> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(classify)
        .fold(Accumulator::default(), Accumulator::step)
        .finish()
        .into_iter()
        .filter_map(QuestionDraft::finalize)
        .collect()
}
