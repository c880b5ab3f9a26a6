use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BibrankError, Result};
use crate::models::entry::normalize_journal_name;

/// Separator between category tokens in a ranking row.
pub const TOKEN_SEPARATOR: &str = "; ";

/// Start of the quartile suffix inside a category token.
const QUARTILE_SUFFIX_START: &str = " (Q";

static CATEGORY_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>.+) \((?P<quartile>Q[1-4])\)$").expect("valid category token regex")
});

/// Journal quality tier, Q1 (best) to Q4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quartile {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quartile {
    pub const ALL: [Quartile; 4] = [Self::Q1, Self::Q2, Self::Q3, Self::Q4];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            Self::Q1 => 0,
            Self::Q2 => 1,
            Self::Q3 => 2,
            Self::Q4 => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Quartile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Quartile {
    type Err = BibrankError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('Q')
            .or_else(|| trimmed.strip_prefix('q'))
            .unwrap_or(trimmed);
        digits
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(Self::from_index)
            .ok_or_else(|| BibrankError::Validation(format!("unknown quartile: {s}")))
    }
}

/// A parsed `"<Category Name> (<Quartile>)"` fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryToken {
    pub name: String,
    pub quartile: Quartile,
}

impl CategoryToken {
    pub fn new(name: impl Into<String>, quartile: Quartile) -> Self {
        Self {
            name: name.into(),
            quartile,
        }
    }
}

impl fmt::Display for CategoryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.quartile)
    }
}

/// Parses a single category token. Returns `None` when the token carries no
/// well-formed quartile suffix.
pub fn parse_category_token(token: &str) -> Option<CategoryToken> {
    let caps = CATEGORY_TOKEN_RE.captures(token.trim())?;
    let quartile = caps["quartile"].parse().ok()?;
    Some(CategoryToken::new(&caps["name"], quartile))
}

/// Bare category name of a token: everything before `" (Q"`.
pub fn category_name(token: &str) -> &str {
    token
        .split_once(QUARTILE_SUFFIX_START)
        .map(|(name, _)| name)
        .unwrap_or(token)
}

/// One row of the journal ranking dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub title: String,
    pub categories: String,
}

impl RankingEntry {
    /// Builds an entry, normalizing the title for matching.
    pub fn new(title: &str, categories: impl Into<String>) -> Self {
        Self {
            title: normalize_journal_name(title),
            categories: categories.into(),
        }
    }

    /// The raw category tokens, in source order.
    pub fn category_tokens(&self) -> impl Iterator<Item = &str> {
        self.categories
            .split(TOKEN_SEPARATOR)
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}
