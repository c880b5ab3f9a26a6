use serde::{Deserialize, Serialize};

use crate::error::{BibrankError, Result};
use crate::models::ranking::Quartile;

/// The user's picks: quartile flags (index 0 is Q1) and category names.
///
/// Categories accumulate in pick order. Picking the same category twice
/// leaves a duplicate, which the winner filter tolerates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    quartiles: [bool; 4],
    categories: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts<I, S>(quartiles: &[Quartile], categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::new();
        for quartile in quartiles {
            selection.set_quartile(*quartile, true);
        }
        selection.categories = categories.into_iter().map(Into::into).collect();
        selection
    }

    /// Flips the quartile at `index` and returns its new state.
    pub fn toggle_quartile(&mut self, index: usize) -> Result<bool> {
        let flag = self.quartiles.get_mut(index).ok_or_else(|| {
            BibrankError::Validation(format!("quartile index {index} out of range (0-3)"))
        })?;
        *flag = !*flag;
        Ok(*flag)
    }

    pub fn set_quartile(&mut self, quartile: Quartile, selected: bool) {
        self.quartiles[quartile.index()] = selected;
    }

    pub fn pick_category(&mut self, name: impl Into<String>) {
        self.categories.push(name.into());
    }

    /// Removes every occurrence of `name`. Returns whether anything was removed.
    pub fn drop_category(&mut self, name: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|category| category != name);
        self.categories.len() != before
    }

    pub fn quartile_flags(&self) -> [bool; 4] {
        self.quartiles
    }

    pub fn quartiles(&self) -> Vec<Quartile> {
        Quartile::ALL
            .into_iter()
            .filter(|q| self.quartiles[q.index()])
            .collect()
    }

    pub fn has_quartile(&self) -> bool {
        self.quartiles.iter().any(|selected| *selected)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}
