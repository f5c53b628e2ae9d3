//! Lookup queries and the structured filter handed to source adapters.
//!
//! A [`Query`] can only be built through [`Query::parse`], which trims the
//! raw input and rejects empty codes. Everything downstream (key derivation,
//! dispatch) can therefore assume a normalized, non-empty code.
//!
//! Adapters never receive a pre-formatted predicate string. They get a
//! [`StockFilter`] and translate it into whatever parameterized form their
//! backend understands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::lookup::LookupError;

/// A normalized stock lookup request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    code: String,
}

impl Query {
    /// Trim and validate a raw product code.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Validation`] if the code is empty or
    /// whitespace-only.
    pub fn parse(raw: &str) -> Result<Self, LookupError> {
        let code = raw.trim();
        if code.is_empty() {
            return Err(LookupError::Validation(
                "product code must not be empty".to_string(),
            ));
        }
        Ok(Self {
            code: code.to_string(),
        })
    }

    /// The trimmed product code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Build the filter adapters apply for this query.
    pub fn filter(&self, mode: MatchMode) -> StockFilter {
        StockFilter {
            code: self.code.clone(),
            mode,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// How a source compares its product codes against the requested code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Product code contains the requested code.
    #[default]
    Contains,
    /// Product code equals the requested code.
    Exact,
}

impl MatchMode {
    /// Lowercase name used in config files and HTTP query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Contains => "contains",
            MatchMode::Exact => "exact",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "contains" => Ok(MatchMode::Contains),
            "exact" => Ok(MatchMode::Exact),
            other => Err(format!(
                "unknown match mode '{}' (expected 'contains' or 'exact')",
                other
            )),
        }
    }
}

/// Structured single-field predicate on the product code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockFilter {
    /// The trimmed code to match against.
    pub code: String,
    /// Comparison to apply.
    pub mode: MatchMode,
}

impl StockFilter {
    /// Evaluate the filter in-process against a product code.
    ///
    /// Case-insensitive in both modes, like the back-office `LIKE`.
    pub fn matches(&self, product_code: &str) -> bool {
        let code = self.code.to_lowercase();
        let product_code = product_code.to_lowercase();
        match self.mode {
            MatchMode::Contains => product_code.contains(&code),
            MatchMode::Exact => product_code == code,
        }
    }

    /// A SQL `LIKE` pattern for this filter with `\` as the escape character.
    ///
    /// `%`, `_` and `\` in the user's code are escaped so they match
    /// literally. The result is always passed as a bound parameter.
    pub fn like_pattern(&self) -> String {
        let mut escaped = String::with_capacity(self.code.len() + 2);
        for c in self.code.chars() {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        match self.mode {
            MatchMode::Contains => format!("%{}%", escaped),
            MatchMode::Exact => escaped,
        }
    }
}
