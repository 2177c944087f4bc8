use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::quiz::raw::{RawOptions, RawRecord};

type Strategy = fn(&str) -> Option<Vec<RawRecord>>;

/// Tried in order; the first one that recovers at least one candidate wins.
const STRATEGIES: [(&str, Strategy); 3] = [
    ("strict", parse_strict),
    ("embedded array", parse_embedded_array),
    ("plaintext", parse_plaintext),
];

static EMBEDDED_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("Invalid regex for embedded arrays"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("Invalid regex for trailing commas"));

static LEADING_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:#+|>+|[-•]\s)\s*").expect("Invalid regex for line noise"));
static QUESTION_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d+\s*[.)]|question|q\d*[:.)\s])").expect("Invalid regex for question start")
});
static QUESTION_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d+\s*[.)]|q(?:uestions?)?\s*\d*\s*[:.)]?)\s*")
        .expect("Invalid regex for question prefix")
});
static OPTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\(?[a-d](?:\)|[.:](?:\s|$))").expect("Invalid regex for option lines")
});
static ANSWER_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:correct\s+answer|correct\s+option|correct|answer)\s*(?:is\s+)?[:\-=]?\s*")
        .expect("Invalid regex for answer labels")
});

/// Recovers question candidates from whatever text the model returned.
///
/// Returns `None` only when no strategy found a single candidate.
pub fn extract(raw_text: &str) -> Option<Vec<RawRecord>> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let records = strategy(raw_text).filter(|records| !records.is_empty())?;
        log::debug!("{} parse recovered {} candidate(s)", name, records.len());
        Some(records)
    })
}

fn records_from_array(value: Value) -> Option<Vec<RawRecord>> {
    match value {
        Value::Array(items) => Some(RawRecord::from_values(&items)),
        _ => None,
    }
}

/// The whole text must be a JSON array.
fn parse_strict(text: &str) -> Option<Vec<RawRecord>> {
    serde_json::from_str::<Value>(text.trim())
        .ok()
        .and_then(records_from_array)
}

/// YAML flow syntax is a superset of JSON that also takes single-quoted strings.
fn parse_literal(text: &str) -> Option<Vec<RawRecord>> {
    serde_yaml::from_str::<Value>(text)
        .ok()
        .and_then(records_from_array)
}

fn repair(candidate: &str) -> String {
    let quoted = candidate.replace('\'', "\"");
    TRAILING_COMMA.replace_all(&quoted, "$1").into_owned()
}

/// First `[` to last `]`, e.g. an array wrapped in prose or a markdown fence.
fn parse_embedded_array(text: &str) -> Option<Vec<RawRecord>> {
    let candidate = EMBEDDED_ARRAY.find(text)?.as_str();

    parse_strict(candidate)
        .or_else(|| parse_literal(candidate))
        .or_else(|| parse_strict(&repair(candidate)))
}

#[derive(Default)]
struct PendingQuestion {
    question: String,
    options: Vec<String>,
    answer: Option<String>,
}

impl PendingQuestion {
    fn into_raw(self) -> RawRecord {
        let question = (!self.question.is_empty()).then_some(self.question);
        RawRecord {
            fallback: question.clone().unwrap_or_default(),
            question,
            options: Some(RawOptions::List(self.options)),
            answer: self.answer,
        }
    }
}

fn clean_line(line: &str) -> String {
    let line = line.trim().replace("**", "");
    LEADING_NOISE.replace(line.trim(), "").trim().to_string()
}

/// Line-by-line scan for `1. question` / `A) option` / `Answer: B` layouts.
fn parse_plaintext(text: &str) -> Option<Vec<RawRecord>> {
    let mut records = Vec::new();
    let mut current: Option<PendingQuestion> = None;

    for line in text.lines() {
        let line = clean_line(line);
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();

        if QUESTION_START.is_match(&line) {
            if let Some(done) = current.take() {
                records.push(done.into_raw());
            }
            current = Some(PendingQuestion {
                question: QUESTION_PREFIX.replace(&line, "").trim().to_string(),
                ..Default::default()
            });
        } else if OPTION_LINE.is_match(&line) {
            current.get_or_insert_with(Default::default).options.push(line);
        } else if lower.starts_with("answer") || lower.starts_with("correct") {
            let answer = ANSWER_LABEL.replace(&line, "").trim().to_string();
            if let Some(pending) = current.as_mut().filter(|_| !answer.is_empty()) {
                pending.answer = Some(answer);
            }
        } else if let Some(pending) = current.as_mut() {
            // Wrapped lines. Anything after the answer line is an explanation.
            if pending.options.is_empty() {
                pending.question = format!("{} {}", pending.question, line).trim().to_string();
            } else if pending.answer.is_none() {
                if let Some(last) = pending.options.last_mut() {
                    last.push(' ');
                    last.push_str(&line);
                }
            }
        }
    }

    if let Some(done) = current {
        records.push(done.into_raw());
    }

    (!records.is_empty()).then_some(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_of(record: &RawRecord) -> Vec<String> {
        match record.options.clone() {
            Some(RawOptions::List(options)) => options,
            other => panic!("expected an option list, got {:?}", other),
        }
    }

    #[test]
    fn strict_json_array_is_taken_as_is() {
        let text = r#"[
            {"question": "What is 2+2?", "options": ["A) 3", "B) 4", "C) 5", "D) 6"], "answer": "B"},
            {"question": "What is 3+3?", "options": ["A) 6", "B) 7", "C) 8", "D) 9"], "answer": "A"}
        ]"#;
        let records = extract(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].question.as_deref(), Some("What is 3+3?"));
        assert_eq!(records[1].answer.as_deref(), Some("A"));
    }

    #[test]
    fn array_inside_a_markdown_fence_is_recovered() {
        let text = "Sure! Here are your questions:\n```json\n[{\"question\": \"Q?\", \"options\": [\"a\", \"b\", \"c\", \"d\"], \"answer\": \"C\"}]\n```\nGood luck!";
        let records = extract(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(options_of(&records[0]), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn single_quoted_literal_is_recovered() {
        let text = "Output: [{'question': 'Which keyword declares a constant?', 'options': ['A) let', 'B) const', 'C) static', 'D) mut'], 'answer': 'B'}]";
        let records = extract(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].question.as_deref(),
            Some("Which keyword declares a constant?")
        );
        assert_eq!(records[0].answer.as_deref(), Some("B"));
    }

    #[test]
    fn trailing_commas_are_repaired() {
        let candidate = "[{'question': 'q', 'options': ['a', 'b', 'c', 'd',], 'answer': 'D',},]";
        assert_eq!(
            repair(candidate),
            r#"[{"question": "q", "options": ["a", "b", "c", "d"], "answer": "D"}]"#
        );
    }

    #[test]
    fn escaped_single_quote_is_recovered_by_repair() {
        let candidate = r"[{'question': 'What\'s 2+2?', 'options': ['A) 3', 'B) 4', 'C) 5', 'D) 6'], 'answer': 'B'}]";
        assert!(parse_strict(candidate).is_none());
        assert!(parse_literal(candidate).is_none());

        let records = extract(&format!("Output: {}", candidate)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question.as_deref(), Some(r#"What"s 2+2?"#));
        assert_eq!(options_of(&records[0]), vec!["A) 3", "B) 4", "C) 5", "D) 6"]);
        assert_eq!(records[0].answer.as_deref(), Some("B"));
    }

    #[test]
    fn plaintext_numbered_question_with_answer_line() {
        let text = "1. What is 2+2?\nA) 3\nB) 4\nC) 5\nD) 6\nCorrect Answer: B";
        let records = extract(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question.as_deref(), Some("What is 2+2?"));
        assert_eq!(options_of(&records[0]), vec!["A) 3", "B) 4", "C) 5", "D) 6"]);
        assert_eq!(records[0].answer.as_deref(), Some("B"));
    }

    #[test]
    fn plaintext_handles_q_prefixes_wrapping_and_markdown() {
        let text = "Here you go:\n\n**Q1.** Which of these\nis immutable?\nA. list\nB. tuple that\n   spans two lines\nC. dict\nD. set\nAnswer: B\nExplanation: tuples cannot change.\n\nQ2: Pick one\nA) x\nB) y\nC) z\nD) w\n";
        let records = extract(text).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].question.as_deref(), Some("Which of these is immutable?"));
        assert_eq!(
            options_of(&records[0]),
            vec!["A. list", "B. tuple that spans two lines", "C. dict", "D. set"]
        );
        assert_eq!(records[0].answer.as_deref(), Some("B"));

        assert_eq!(records[1].question.as_deref(), Some("Pick one"));
        assert_eq!(records[1].answer, None);
    }

    #[test]
    fn option_before_any_question_opens_a_record() {
        let records = parse_plaintext("A) alone\nB) together").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question, None);
        assert_eq!(options_of(&records[0]).len(), 2);
    }

    #[test]
    fn prose_yields_nothing() {
        let text = "I'm sorry, I can't help with generating a quiz right now.\nPlease try again later.";
        assert_eq!(extract(text), None);
    }

    #[test]
    fn array_without_objects_falls_through_to_plaintext() {
        let text = "1. Which list is sorted? [1, 2, 3]\nA) yes\nB) no\nC) maybe\nD) unknown\nAnswer: A";
        let records = extract(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question.as_deref(), Some("Which list is sorted? [1, 2, 3]"));
    }
}
