use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed reading keyword policy at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid keyword policy json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid legal-suffix token {token:?}: {source}")]
    Token {
        token: String,
        #[source]
        source: regex::Error,
    },
}

/// Keyword table behind the heuristic classifier. The line between "explicit Dutch
/// entity intent" and "generic foreign-entity wording" is a judgment call, so the
/// lists live in data and can be replaced from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordPolicy {
    /// Legal-suffix markers. This list and the urgency, relaxed and hiring terms are
    /// matched as whole tokens; the rest are substrings.
    pub bv_suffix_tokens: Vec<String>,
    pub bv_synonyms: Vec<String>,
    pub holding_terms: Vec<String>,
    pub urgent_terms: Vec<String>,
    pub relaxed_terms: Vec<String>,
    pub tech_terms: Vec<String>,
    /// Only looked up in entry goals.
    pub tech_goal_tokens: Vec<String>,
    pub financial_terms: Vec<String>,
    pub tech_exclusions: Vec<String>,
    pub hiring_terms: Vec<String>,
    pub advisory_terms: Vec<String>,
    pub compliance_terms: Vec<String>,
}

impl Default for KeywordPolicy {
    fn default() -> Self {
        Self {
            bv_suffix_tokens: strings(&["b.v.", "b.v", "bv"]),
            bv_synonyms: strings(&[
                "besloten vennootschap",
                "dutch limited liability company",
                "dutch limited liability co",
                "dutch private limited company",
                "dutch bv",
            ]),
            holding_terms: strings(&[
                "holding",
                "participation exemption",
                "deelnemingsvrijstelling",
            ]),
            urgent_terms: strings(&[
                "asap",
                "urgent",
                "urgently",
                "fast",
                "short",
                "1 month",
                "immediate",
                "immediately",
                "quick",
                "quickly",
            ]),
            relaxed_terms: strings(&["flexible", "long", "12 months", "no rush"]),
            tech_terms: strings(&["software", "technology", "biotech", "engineering", "saas"]),
            tech_goal_tokens: strings(&["r&d"]),
            financial_terms: strings(&["financial", "banking", "insurance"]),
            tech_exclusions: strings(&["financial services"]),
            hiring_terms: strings(&[
                "hire",
                "hiring",
                "recruit",
                "recruiting",
                "recruitment",
                "local staff",
                "local employees",
            ]),
            advisory_terms: strings(&["advice", "advisory", "consult"]),
            compliance_terms: strings(&["compliance", "audit", "filing obligations"]),
        }
    }
}

impl KeywordPolicy {
    pub fn from_json_str(raw: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn suffix_matchers(&self) -> Result<Vec<TokenMatcher>, PolicyError> {
        whole_token_matchers(&self.bv_suffix_tokens)
    }

    pub fn urgent_matchers(&self) -> Result<Vec<TokenMatcher>, PolicyError> {
        whole_token_matchers(&self.urgent_terms)
    }

    pub fn relaxed_matchers(&self) -> Result<Vec<TokenMatcher>, PolicyError> {
        whole_token_matchers(&self.relaxed_terms)
    }

    pub fn hiring_matchers(&self) -> Result<Vec<TokenMatcher>, PolicyError> {
        whole_token_matchers(&self.hiring_terms)
    }
}

/// A policy term that only matches between non-alphanumeric boundaries, so "fast"
/// never fires inside "breakfast".
#[derive(Debug, Clone)]
pub struct TokenMatcher {
    pub term: String,
    regex: Regex,
}

impl TokenMatcher {
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }
}

/// Compiles each non-blank term to a [`TokenMatcher`]. Blank entries are skipped; a
/// blank pattern would match every empty field.
pub fn whole_token_matchers(terms: &[String]) -> Result<Vec<TokenMatcher>, PolicyError> {
    terms
        .iter()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .map(|term| {
            let pattern = format!(r"(?:^|[^\p{{L}}\p{{N}}]){}(?:$|[^\p{{L}}\p{{N}}])", regex::escape(&term));
            match Regex::new(&pattern) {
                Ok(regex) => Ok(TokenMatcher { term, regex }),
                Err(source) => Err(PolicyError::Token { token: term, source }),
            }
        })
        .collect()
}

/// First needle contained in `input`, if any. Both sides are expected lowercase.
pub fn first_match<'a>(input: &str, needles: &'a [String]) -> Option<&'a str> {
    needles
        .iter()
        .map(String::as_str)
        .find(|needle| !needle.is_empty() && input.contains(needle))
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
