use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_QUESTION_COUNT: usize = 15;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub question_count: usize,
    pub generation_timeout: Duration,
}

impl Config {
    /// Reads the configuration from the process environment (after `.env` was loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("CHATGPT_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("CHATGPT_API_KEY"))?;

        let model = lookup("QUIZ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let question_count = match lookup("QUIZ_QUESTION_COUNT") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(count) if count > 0 => count,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "QUIZ_QUESTION_COUNT",
                        value,
                    })
                }
            },
            None => DEFAULT_QUESTION_COUNT,
        };

        let timeout_secs = match lookup("QUIZ_GENERATION_TIMEOUT_SECS") {
            Some(value) => value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                var: "QUIZ_GENERATION_TIMEOUT_SECS",
                value: value.clone(),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            model,
            question_count,
            generation_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config = Config::from_lookup(lookup_from(&[("CHATGPT_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.question_count, 15);
        assert_eq!(config.generation_timeout, Duration::from_secs(60));
    }

    #[test]
    fn missing_api_key_is_reported() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("CHATGPT_API_KEY"));

        let err = Config::from_lookup(lookup_from(&[("CHATGPT_API_KEY", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("CHATGPT_API_KEY"));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("CHATGPT_API_KEY", "sk-test"),
            ("QUIZ_MODEL", "gpt-4"),
            ("QUIZ_QUESTION_COUNT", "5"),
            ("QUIZ_GENERATION_TIMEOUT_SECS", "20"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.question_count, 5);
        assert_eq!(config.generation_timeout, Duration::from_secs(20));
    }

    #[test]
    fn zero_or_garbage_question_count_is_rejected() {
        for value in ["0", "many"] {
            let err = Config::from_lookup(lookup_from(&[
                ("CHATGPT_API_KEY", "sk-test"),
                ("QUIZ_QUESTION_COUNT", value),
            ]))
            .unwrap_err();
            assert_eq!(
                err,
                ConfigError::Invalid {
                    var: "QUIZ_QUESTION_COUNT",
                    value: value.to_string()
                }
            );
        }
    }
}
