//! Raw strategy parameters and their validated extraction.
//!
//! Parameters arrive as strings (INI `[params]` section, `--param key=value`).
//! Each strategy pulls the keys it recognises through a [`ParamReader`];
//! [`ParamReader::finish`] rejects anything left over.

use std::collections::BTreeMap;

use crate::domain::error::BacktestError;

/// Longest window or interval a strategy may ask for, in bars.
pub const MAX_PERIOD: usize = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyParams {
    values: BTreeMap<String, String>,
}

impl StrategyParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl ToString) {
        self.values
            .insert(key.trim().to_string(), value.to_string().trim().to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse a `key=value` assignment as given on the command line.
    pub fn parse_assignment(input: &str) -> Result<(String, String), BacktestError> {
        match input.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(BacktestError::ConfigInvalid {
                section: "params".into(),
                key: input.to_string(),
                reason: "expected key=value".into(),
            }),
        }
    }

    pub fn reader(&self, strategy: &'static str) -> ParamReader {
        ParamReader {
            strategy,
            remaining: self.values.clone(),
        }
    }
}

impl FromIterator<(String, String)> for StrategyParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut params = StrategyParams::new();
        for (k, v) in iter {
            params.insert(&k, v);
        }
        params
    }
}

pub struct ParamReader {
    strategy: &'static str,
    remaining: BTreeMap<String, String>,
}

impl ParamReader {
    fn invalid(&self, key: &str, reason: &str) -> BacktestError {
        BacktestError::ParamInvalid {
            strategy: self.strategy.to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    fn number(&mut self, key: &str) -> Result<Option<f64>, BacktestError> {
        let Some(raw) = self.remaining.remove(key) else {
            return Ok(None);
        };
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(self.invalid(key, &format!("not a number: {raw}"))),
        }
    }

    /// A window length or bar count: a whole number in `1..=MAX_PERIOD`.
    pub fn period(&mut self, key: &str, default: usize) -> Result<usize, BacktestError> {
        match self.number(key)? {
            None => Ok(default),
            Some(v) if v >= 1.0 && v <= MAX_PERIOD as f64 && v.fract() == 0.0 => Ok(v as usize),
            Some(_) => Err(self.invalid(
                key,
                &format!("must be a whole number between 1 and {MAX_PERIOD}"),
            )),
        }
    }

    pub fn positive(&mut self, key: &str, default: f64) -> Result<f64, BacktestError> {
        match self.number(key)? {
            None => Ok(default),
            Some(v) if v > 0.0 => Ok(v),
            Some(_) => Err(self.invalid(key, "must be positive")),
        }
    }

    pub fn non_negative(&mut self, key: &str, default: f64) -> Result<f64, BacktestError> {
        match self.number(key)? {
            None => Ok(default),
            Some(v) if v >= 0.0 => Ok(v),
            Some(_) => Err(self.invalid(key, "must be non-negative")),
        }
    }

    /// A share of something, in `(0, 1]`.
    pub fn fraction(&mut self, key: &str, default: f64) -> Result<f64, BacktestError> {
        match self.number(key)? {
            None => Ok(default),
            Some(v) if v > 0.0 && v <= 1.0 => Ok(v),
            Some(_) => Err(self.invalid(key, "must be in (0, 1]")),
        }
    }

    /// An oscillator level in `[0, 100]`.
    pub fn level(&mut self, key: &str, default: f64) -> Result<f64, BacktestError> {
        match self.number(key)? {
            None => Ok(default),
            Some(v) if (0.0..=100.0).contains(&v) => Ok(v),
            Some(_) => Err(self.invalid(key, "must be between 0 and 100")),
        }
    }

    /// Fail with `reason` against `key` when `ok` is false.
    pub fn ensure(&self, ok: bool, key: &str, reason: &str) -> Result<(), BacktestError> {
        if ok {
            Ok(())
        } else {
            Err(self.invalid(key, reason))
        }
    }

    /// Reject any parameter the strategy did not consume.
    pub fn finish(self) -> Result<(), BacktestError> {
        match self.remaining.into_keys().next() {
            None => Ok(()),
            Some(key) => Err(BacktestError::UnknownParam {
                strategy: self.strategy.to_string(),
                key,
            }),
        }
    }
}
