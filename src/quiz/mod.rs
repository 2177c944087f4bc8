pub mod ai_helper;
pub mod evaluator;
pub mod extractor;
pub mod normalizer;
pub mod raw;
pub mod session;

use std::fmt;
use std::str::FromStr;

use crate::error::QuizError;

pub const LANGUAGES: [&str; 9] = [
    "Python",
    "C++",
    "Java",
    "JavaScript",
    "C#",
    "Go",
    "Rust",
    "Kotlin",
    "Swift",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        };
        f.write_str(name)
    }
}

impl FromStr for Level {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| QuizError::UnknownLevel(s.trim().to_string()))
    }
}

/// Option label. The label is the option's position: A is the first option, D the fourth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Letter {
    A,
    B,
    C,
    D,
}

impl Letter {
    pub const ALL: [Letter; 4] = [Letter::A, Letter::B, Letter::C, Letter::D];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_char(self) -> char {
        (b'A' + self as u8) as char
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A validated multiple-choice question.
///
/// Options are stored in canonical `"A) text"` form and there are always exactly four of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    pub question: String,
    options: [String; 4],
    pub answer: Option<Letter>,
}

impl QuestionRecord {
    pub fn new(question: String, options: [String; 4], answer: Option<Letter>) -> Self {
        Self {
            question,
            options,
            answer,
        }
    }

    pub fn options(&self) -> &[String; 4] {
        &self.options
    }

    pub fn option(&self, letter: Letter) -> &str {
        &self.options[letter.index()]
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.answer.map(|letter| self.option(letter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_to_positions() {
        assert_eq!(Letter::from_index(0), Some(Letter::A));
        assert_eq!(Letter::from_index(3), Some(Letter::D));
        assert_eq!(Letter::from_index(4), None);
        assert_eq!(Letter::from_char('c'), Some(Letter::C));
        assert_eq!(Letter::from_char('E'), None);
        assert_eq!(Letter::D.index(), 3);
        assert_eq!(Letter::B.to_string(), "B");
    }

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!(" intermediate ".parse::<Level>().unwrap(), Level::Intermediate);
        assert_eq!("ADVANCED".parse::<Level>().unwrap(), Level::Advanced);
        assert!(matches!(
            "Expert".parse::<Level>(),
            Err(QuizError::UnknownLevel(level)) if level == "Expert"
        ));
    }

    #[test]
    fn correct_option_follows_the_answer_letter() {
        let record = QuestionRecord::new(
            "What is 2+2?".to_string(),
            ["A) 3".into(), "B) 4".into(), "C) 5".into(), "D) 6".into()],
            Some(Letter::B),
        );
        assert_eq!(record.correct_option(), Some("B) 4"));

        let unknown = QuestionRecord { answer: None, ..record };
        assert_eq!(unknown.correct_option(), None);
    }
}
