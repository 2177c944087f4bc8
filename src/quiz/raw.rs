use serde_json::{Map, Value};

const QUESTION_KEYS: [&str; 3] = ["question", "prompt", "text"];
const OPTION_KEYS: [&str; 2] = ["options", "choices"];
const ANSWER_KEYS: [&str; 4] = ["answer", "correct", "correct_answer", "answer_letter"];

#[derive(Debug, Clone, PartialEq)]
pub enum RawOptions {
    /// All options in one string, e.g. `"A) 3\nB) 4\nC) 5\nD) 6"`.
    Block(String),
    List(Vec<String>),
}

/// A question candidate as the model wrote it, before any validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub question: Option<String>,
    pub options: Option<RawOptions>,
    pub answer: Option<String>,
    /// String form of the whole source object, used when no question key is present.
    pub fallback: String,
}

impl RawRecord {
    /// Builds a candidate from one element of a parsed array. Anything but an object is skipped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        let question = lookup(object, &QUESTION_KEYS).map(value_text);
        let options = lookup(object, &OPTION_KEYS).and_then(raw_options);
        let answer = lookup(object, &ANSWER_KEYS).and_then(|v| v.as_str().map(str::to_string));

        Some(Self {
            question,
            options,
            answer,
            fallback: value.to_string(),
        })
    }

    pub fn from_values(values: &[Value]) -> Vec<Self> {
        values.iter().filter_map(Self::from_value).collect()
    }
}

/// First key (in priority order, case-insensitive) holding a non-empty value.
fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|wanted| {
        object
            .iter()
            .find(|(key, value)| key.eq_ignore_ascii_case(wanted) && !is_empty(value))
            .map(|(_, value)| value)
    })
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn raw_options(value: &Value) -> Option<RawOptions> {
    match value {
        Value::String(block) => Some(RawOptions::Block(block.clone())),
        Value::Array(items) => Some(RawOptions::List(items.iter().map(value_text).collect())),
        // {"A": "...", "B": "..."}
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by_key(|(key, _)| key.to_ascii_uppercase());
            Some(RawOptions::List(
                entries
                    .into_iter()
                    .map(|(key, option)| {
                        let text = value_text(option);
                        match key.trim() {
                            label if label.len() == 1 && "ABCDabcd".contains(label) => {
                                format!("{}) {}", label.to_ascii_uppercase(), text)
                            }
                            _ => text,
                        }
                    })
                    .collect(),
            ))
        }
        _ => None,
    }
}
