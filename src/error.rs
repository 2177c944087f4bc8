use thiserror::Error;

use crate::quiz::session::Stage;

/// Everything that can go wrong between picking a language and seeing the results.
///
/// None of these are fatal: the bot reports them and lets the user retry.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The model call itself failed (network, auth, quota, timeout).
    #[error("question generation failed: {0}")]
    Generation(String),

    /// No extraction strategy recovered anything from the model output.
    #[error("could not find any questions in the model response")]
    Parse { raw: String },

    /// Something was extracted, but not a single four-option question survived.
    #[error("the model response did not contain any four-option questions")]
    EmptyQuiz { raw: String },

    #[error("cannot {action} while the quiz is in the {stage:?} stage")]
    InvalidStage { stage: Stage, action: &'static str },

    #[error("\"{0}\" is not one of the options")]
    UnknownOption(String),

    #[error("unknown level \"{0}\", expected Beginner, Intermediate or Advanced")]
    UnknownLevel(String),

    #[error("language must not be empty")]
    EmptyLanguage,
}

impl QuizError {
    /// Raw model output attached to the error, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            QuizError::Parse { raw } | QuizError::EmptyQuiz { raw } => Some(raw),
            _ => None,
        }
    }
}

impl From<chatgpt::err::Error> for QuizError {
    fn from(err: chatgpt::err::Error) -> Self {
        QuizError::Generation(err.to_string())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} has an invalid value \"{value}\"")]
    Invalid { var: &'static str, value: String },
}
