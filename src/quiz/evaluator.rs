use crate::quiz::QuestionRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub correct: usize,
    pub per_question: Vec<bool>,
}

/// An answer is right when it is exactly the option text behind the answer letter.
/// Questions with an unknown answer can never be answered correctly.
pub fn is_correct(record: &QuestionRecord, answer: &str) -> bool {
    record
        .correct_option()
        .is_some_and(|correct| correct.trim() == answer.trim())
}

/// Scores a quiz. Unanswered questions (`None`, or past the end of `answers`) count as wrong.
pub fn score<A: AsRef<str>>(quiz: &[QuestionRecord], answers: &[Option<A>]) -> Evaluation {
    let per_question: Vec<bool> = quiz
        .iter()
        .enumerate()
        .map(|(index, record)| {
            answers
                .get(index)
                .and_then(Option::as_ref)
                .is_some_and(|answer| is_correct(record, answer.as_ref()))
        })
        .collect();

    Evaluation {
        correct: per_question.iter().filter(|correct| **correct).count(),
        per_question,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::extractor::extract;
    use crate::quiz::normalizer::normalize;
    use crate::quiz::Letter;

    fn record(answer: Option<Letter>) -> QuestionRecord {
        QuestionRecord::new(
            "What is 2+2?".to_string(),
            ["A) 3".into(), "B) 4".into(), "C) 5".into(), "D) 6".into()],
            answer,
        )
    }

    #[test]
    fn exact_option_text_is_required() {
        let question = record(Some(Letter::B));
        assert!(is_correct(&question, "B) 4"));
        assert!(is_correct(&question, "  B) 4 "));
        assert!(!is_correct(&question, "b) 4"));
        assert!(!is_correct(&question, "4"));
        assert!(!is_correct(&question, "A) 3"));
    }

    #[test]
    fn unknown_answer_is_always_wrong() {
        let question = record(None);
        for option in question.options().clone() {
            assert!(!is_correct(&question, &option));
        }
    }

    #[test]
    fn missing_answers_count_as_wrong_and_score_stays_in_range() {
        let quiz = vec![record(Some(Letter::B)), record(Some(Letter::A)), record(None)];
        let answers = vec![Some("B) 4"), None];

        let evaluation = score(&quiz, &answers);
        assert_eq!(evaluation.per_question, vec![true, false, false]);
        assert_eq!(evaluation.correct, 1);
        assert!(evaluation.correct <= quiz.len());

        let nothing: Vec<Option<String>> = Vec::new();
        assert_eq!(score(&[], &nothing), Evaluation::default());
    }

    #[test]
    fn five_questions_all_answered_with_option_b() {
        let items: Vec<String> = (1..=5)
            .map(|n| {
                format!(
                    r#"{{"question": "Question {n}?", "options": ["A) a{n}", "B) b{n}", "C) c{n}", "D) d{n}"], "answer": "B"}}"#
                )
            })
            .collect();
        let text = format!("[{}]", items.join(","));

        let quiz = normalize(&extract(&text).unwrap());
        assert_eq!(quiz.len(), 5);

        let answers: Vec<Option<String>> = quiz
            .iter()
            .map(|question| Some(question.option(Letter::B).to_string()))
            .collect();
        let evaluation = score(&quiz, &answers);
        assert_eq!(evaluation.correct, 5);
        assert!(evaluation.per_question.iter().all(|correct| *correct));
    }
}
