use async_trait::async_trait;

use crate::error::QuizError;
use crate::quiz::{evaluator, extractor, normalizer, Level, QuestionRecord};

/// Produces raw quiz text for a language and level. The text is not guaranteed to parse.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, language: &str, level: Level, count: usize) -> Result<String, QuizError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    SelectLanguage,
    SelectLevel,
    Asking,
    Results,
}

/// One question of the final review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    pub question: String,
    pub given: Option<String>,
    pub correct_option: Option<String>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub score: usize,
    pub total: usize,
    pub entries: Vec<ReviewEntry>,
}

/// State of one quiz run: selection, the generated questions, the cursor and the answers so far.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    stage: Stage,
    language: Option<String>,
    level: Option<Level>,
    quiz: Vec<QuestionRecord>,
    cursor: usize,
    answers: Vec<Option<String>>,
    score: usize,
    raw_response: Option<String>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn level(&self) -> Option<Level> {
        self.level
    }

    pub fn quiz(&self) -> &[QuestionRecord] {
        &self.quiz
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn score(&self) -> usize {
        self.score
    }

    /// Model output of the last generation, kept for inspection.
    pub fn raw_response(&self) -> Option<&str> {
        self.raw_response.as_deref()
    }

    fn expect_stage(&self, stage: Stage, action: &'static str) -> Result<(), QuizError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(QuizError::InvalidStage {
                stage: self.stage,
                action,
            })
        }
    }

    pub fn select_language(&mut self, language: &str) -> Result<(), QuizError> {
        self.expect_stage(Stage::SelectLanguage, "select a language")?;
        let language = language.trim();
        if language.is_empty() {
            return Err(QuizError::EmptyLanguage);
        }
        self.language = Some(language.to_string());
        Ok(())
    }

    pub fn confirm_language(&mut self) -> Result<(), QuizError> {
        self.expect_stage(Stage::SelectLanguage, "confirm the language")?;
        if self.language.is_none() {
            return Err(QuizError::EmptyLanguage);
        }
        self.stage = Stage::SelectLevel;
        Ok(())
    }

    pub fn select_level(&mut self, level: Level) -> Result<(), QuizError> {
        self.expect_stage(Stage::SelectLevel, "select a level")?;
        self.level = Some(level);
        Ok(())
    }

    /// Generates the quiz for the selected language and level and starts asking.
    ///
    /// On any failure the session stays in level selection so the user can retry.
    /// Returns the number of questions that survived parsing, which may be fewer than `count`.
    pub async fn confirm_level<G>(&mut self, generator: &G, count: usize) -> Result<usize, QuizError>
    where
        G: QuestionGenerator + ?Sized,
    {
        self.expect_stage(Stage::SelectLevel, "generate questions")?;
        let (Some(language), Some(level)) = (self.language.clone(), self.level) else {
            return Err(QuizError::InvalidStage {
                stage: self.stage,
                action: "generate questions without a level",
            });
        };

        let raw = generator.generate(&language, level, count).await?;
        self.raw_response = Some(raw.clone());

        let candidates = extractor::extract(&raw).ok_or_else(|| QuizError::Parse { raw: raw.clone() })?;
        let quiz = normalizer::normalize(&candidates);
        if quiz.is_empty() {
            return Err(QuizError::EmptyQuiz { raw });
        }
        if quiz.len() < count {
            log::warn!(
                "Only {} of {} requested questions could be parsed, continuing with those",
                quiz.len(),
                count
            );
        }

        self.answers = vec![None; quiz.len()];
        self.quiz = quiz;
        self.cursor = 0;
        self.score = 0;
        self.stage = Stage::Asking;
        Ok(self.quiz.len())
    }

    /// The question under the cursor while asking.
    pub fn current(&self) -> Option<&QuestionRecord> {
        match self.stage {
            Stage::Asking => self.quiz.get(self.cursor),
            _ => None,
        }
    }

    pub fn previous(&mut self) -> Result<(), QuizError> {
        self.expect_stage(Stage::Asking, "go back")?;
        self.cursor = self.cursor.saturating_sub(1);
        Ok(())
    }

    /// Records `choice` for the current question and moves on. Returns whether it was right.
    pub fn answer(&mut self, choice: &str) -> Result<bool, QuizError> {
        self.expect_stage(Stage::Asking, "answer")?;
        let choice = choice.trim();
        let question = &self.quiz[self.cursor];
        if !question.options().iter().any(|option| option == choice) {
            return Err(QuizError::UnknownOption(choice.to_string()));
        }

        let is_correct = evaluator::is_correct(question, choice);
        self.answers[self.cursor] = Some(choice.to_string());
        // Re-scored from scratch so answering a revisited question never counts twice.
        self.score = evaluator::score(&self.quiz, &self.answers).correct;

        self.cursor += 1;
        if self.cursor >= self.quiz.len() {
            self.stage = Stage::Results;
        }
        Ok(is_correct)
    }

    /// Ends the quiz early; unanswered questions count as wrong.
    pub fn finish(&mut self) -> Result<(), QuizError> {
        self.expect_stage(Stage::Asking, "finish")?;
        self.stage = Stage::Results;
        Ok(())
    }

    pub fn report(&self) -> Option<Report> {
        if self.stage != Stage::Results {
            return None;
        }
        let evaluation = evaluator::score(&self.quiz, &self.answers);
        let entries = self
            .quiz
            .iter()
            .zip(&self.answers)
            .zip(evaluation.per_question)
            .map(|((question, given), is_correct)| ReviewEntry {
                question: question.question.clone(),
                given: given.clone(),
                correct_option: question.correct_option().map(str::to_string),
                is_correct,
            })
            .collect();

        Some(Report {
            score: evaluation.correct,
            total: self.quiz.len(),
            entries,
        })
    }

    /// Throws the run away and starts over at language selection.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
