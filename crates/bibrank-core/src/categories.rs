use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{RankingEntry, category_name, parse_category_token};

/// How often a category occurs across the matched journals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

impl CategoryCount {
    /// Checkbox label shown next to the category.
    pub fn label(&self) -> String {
        format!("{} (appears {} times)", self.name, self.count)
    }
}

/// Counts category names across `journals`, most frequent first.
///
/// Each token a journal carries counts once, so a journal listed under a
/// category in two quartiles contributes twice. Equal counts keep the order in
/// which the categories were first seen.
pub fn count_categories(journals: &[RankingEntry]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for journal in journals {
        for token in journal.category_tokens() {
            if parse_category_token(token).is_none() {
                warn!(journal = %journal.title, token, "category token without quartile suffix");
            }

            let name = category_name(token);
            match positions.get(name).copied() {
                Some(pos) => counts[pos].count += 1,
                None => {
                    positions.insert(name.to_string(), counts.len());
                    counts.push(CategoryCount {
                        name: name.to_string(),
                        count: 1,
                    });
                }
            }
        }
    }

    // stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));

    debug!(categories = counts.len(), "counted categories");
    counts
}
