//! # Configuration
//!
//! The shell has no configuration file and takes no flags.
//! The only knob is [`MATCH_VAR`], read from the environment at startup.

use crate::constants::{MATCH_VAR, MAX_LINE_LEN, PROMPT};
use crate::errors::SetupError;
use std::env;

/// How the built-in command names are compared against the input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// The whole command must equal the built-in name
    #[default]
    Exact,
    /// Any command that starts with the built-in name matches,
    /// so `exitfoo` exits and `explode2` explodes
    Prefix,
}

impl MatchMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "exact" => Some(MatchMode::Exact),
            "prefix" => Some(MatchMode::Prefix),
            _ => None,
        }
    }
}

/// Settings of a shell session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Written before every read, without a newline
    pub prompt: String,
    /// Longest accepted line, not counting the line ending
    pub max_line_len: usize,
    pub match_mode: MatchMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: PROMPT.to_string(),
            max_line_len: MAX_LINE_LEN,
            match_mode: MatchMode::default(),
        }
    }
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, SetupError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults; a set but unsupported value is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SetupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(MATCH_VAR) {
            config.match_mode = MatchMode::parse(&value).ok_or_else(|| SetupError::Config {
                var: MATCH_VAR.to_string(),
                value,
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_variables() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(Config::default(), config);
        assert_eq!("prompt> ", config.prompt);
        assert_eq!(79, config.max_line_len);
        assert_eq!(MatchMode::Exact, config.match_mode);
    }

    #[test]
    fn prefix_mode_from_variable() {
        let config = Config::from_lookup(|key| {
            (key == "PROMPT_SHELL_MATCH").then(|| "prefix".to_string())
        })
        .unwrap();
        assert_eq!(MatchMode::Prefix, config.match_mode);
    }

    #[test]
    fn unsupported_mode_is_rejected() {
        let err = Config::from_lookup(|_| Some("glob".to_string())).unwrap_err();
        assert_eq!(
            SetupError::Config {
                var: "PROMPT_SHELL_MATCH".to_string(),
                value: "glob".to_string(),
            },
            err
        );
    }
}
