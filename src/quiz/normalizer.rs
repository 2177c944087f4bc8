use std::sync::LazyLock;

use regex::Regex;

use crate::quiz::raw::{RawOptions, RawRecord};
use crate::quiz::{Letter, QuestionRecord};

static OPTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\(?([a-d])\s*[).:]\s*").expect("Invalid regex for option markers")
});
static EMBEDDED_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-D][).:]\s").expect("Invalid regex for embedded option markers")
});
static ENUMERATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:q(?:uestion)?\s*\d+\s*[.:)]|\d+\s*[.)])\s+")
        .expect("Invalid regex for question enumeration")
});
static CORRECT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*[(\[]correct[)\]]").expect("Invalid regex for correctness tags")
});
// "B", "b)", "(C)", "D.", "Option A", "Correct answer: B) 4", "B - 4", "B because ..."
// A letter followed by a space must be uppercase; "C++" and "C#" are never letters.
static LETTER_ANSWER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:the\s+)?(?:correct\s+)?(?:answer|option)\s*(?:is\s+)?[:\-=]?\s*)?\(?(?:([a-d])(?:[).:,]|$)|(?-i:([A-D]))\s)",
    )
    .expect("Invalid regex for letter answers")
});

/// Turns loosely shaped candidates into validated questions.
///
/// Candidates that cannot be coerced into exactly four options are dropped.
pub fn normalize(raw_records: &[RawRecord]) -> Vec<QuestionRecord> {
    raw_records
        .iter()
        .filter_map(|raw| {
            let record = normalize_record(raw);
            if record.is_none() {
                log::debug!("dropping candidate without four options: {}", raw.fallback);
            }
            record
        })
        .collect()
}

pub fn normalize_record(raw: &RawRecord) -> Option<QuestionRecord> {
    let options: [String; 4] = split_options(raw.options.as_ref()?).try_into().ok()?;
    let mut options: [String; 4] =
        std::array::from_fn(|index| canonical_option(Letter::ALL[index], &options[index]));

    let answer = raw
        .answer
        .as_deref()
        .map(str::trim)
        .filter(|answer| !answer.is_empty())
        .and_then(|answer| letter_answer(answer).or_else(|| descriptive_answer(answer, &options)));

    // Correctness markers only count (and are only removed) when no answer field resolved.
    let answer = answer.or_else(|| {
        let (index, unmarked) = options
            .iter()
            .enumerate()
            .find_map(|(index, option)| Some((index, without_correct_marker(option)?)))?;
        options[index] = unmarked;
        Letter::from_index(index)
    });

    let question = raw.question.as_deref().unwrap_or(&raw.fallback);
    Some(QuestionRecord::new(strip_enumeration(question), options, answer))
}

fn strip_enumeration(question: &str) -> String {
    let mut question = question.trim();
    while let Some(prefix) = ENUMERATION.find(question) {
        question = question[prefix.end()..].trim_start();
    }
    question.to_string()
}

fn split_options(options: &RawOptions) -> Vec<String> {
    match options {
        RawOptions::Block(block) => {
            let lines: Vec<String> = block
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
            match lines.as_slice() {
                [single] => split_embedded(single),
                _ => lines,
            }
        }
        RawOptions::List(items) => match items.as_slice() {
            [single] => split_embedded(single),
            _ => items.clone(),
        },
    }
}

/// `"A) 3 B) 4 C) 5 D) 6"` into its four pieces. Anything else stays one piece.
fn split_embedded(text: &str) -> Vec<String> {
    let mut bounds: Vec<usize> = EMBEDDED_MARKER.find_iter(text).map(|m| m.start()).collect();
    bounds.push(text.len());

    let mut pieces = Vec::new();
    let mut start = 0;
    for end in bounds {
        let piece = text[start..end].trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        start = end;
    }

    if pieces.len() == 4 {
        pieces
    } else {
        vec![text.trim().to_string()]
    }
}

/// Returns the option as `"<letter>) text"`.
fn canonical_option(letter: Letter, raw: &str) -> String {
    let mut text = raw.trim();

    // A marker is only a label when it names the option's own position.
    if let Some(caps) = OPTION_MARKER.captures(text) {
        if caps[1].eq_ignore_ascii_case(&letter.to_string()) {
            text = &text[caps[0].len()..];
        }
    }

    format!("{}) {}", letter, text.trim()).trim_end().to_string()
}

/// The option without its `(correct)`, `[correct]` or trailing `*` marker, if it has one.
fn without_correct_marker(option: &str) -> Option<String> {
    let untagged = CORRECT_TAG.replace_all(option, "");
    let mut marked = untagged.len() != option.len();

    let mut text = untagged.trim_end();
    if text.ends_with('*') {
        marked = true;
        text = text.trim_end_matches('*').trim_end();
    }

    marked.then(|| text.to_string())
}

fn letter_answer(answer: &str) -> Option<Letter> {
    let caps = LETTER_ANSWER.captures(answer)?;
    let letter = caps.get(1).or_else(|| caps.get(2))?;
    letter.as_str().chars().next().and_then(Letter::from_char)
}

fn descriptive_answer(answer: &str, options: &[String; 4]) -> Option<Letter> {
    let needle = answer.to_lowercase();
    options
        .iter()
        .position(|option| option.to_lowercase().contains(&needle))
        .and_then(Letter::from_index)
}
