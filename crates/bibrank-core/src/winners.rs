use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BibrankError, Result};
use crate::models::{BibEntry, CategoryToken, RankingEntry, Selection};

/// Journals that matched the selection and the articles published in them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winners {
    pub journals: Vec<RankingEntry>,
    pub articles: Vec<BibEntry>,
}

/// Every `"<category> (<quartile>)"` token the selection accepts.
pub fn required_tokens(selection: &Selection) -> HashSet<String> {
    let quartiles = selection.quartiles();
    selection
        .categories()
        .iter()
        .flat_map(|category| {
            quartiles
                .iter()
                .map(move |quartile| CategoryToken::new(category.as_str(), *quartile).to_string())
        })
        .collect()
}

/// Applies the selection to the matched journals and the bibliography.
///
/// A journal wins when any one of its category tokens is in
/// [`required_tokens`]. An article wins when its journal is a winning title.
/// Both lists keep their source order.
pub fn find_winners(
    journals: &[RankingEntry],
    entries: &[BibEntry],
    selection: &Selection,
) -> Result<Winners> {
    if !selection.has_quartile() {
        return Err(BibrankError::Validation(
            "select at least one quartile".to_string(),
        ));
    }

    let required = required_tokens(selection);
    debug!(?required, "required category tokens");

    let winning_journals: Vec<RankingEntry> = journals
        .iter()
        .filter(|journal| {
            journal
                .category_tokens()
                .any(|token| required.contains(token))
        })
        .cloned()
        .collect();

    let titles: HashSet<&str> = winning_journals
        .iter()
        .map(|journal| journal.title.as_str())
        .collect();
    let winning_articles: Vec<BibEntry> = entries
        .iter()
        .filter(|entry| entry.journal().is_some_and(|journal| titles.contains(journal)))
        .cloned()
        .collect();

    debug!(
        journals = winning_journals.len(),
        articles = winning_articles.len(),
        "computed winners"
    );
    Ok(Winners {
        journals: winning_journals,
        articles: winning_articles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quartile;

    fn article(key: &str, journal: &str) -> BibEntry {
        BibEntry::new(key, "article").with_field("journal", journal)
    }

    fn ranking() -> Vec<RankingEntry> {
        vec![
            RankingEntry::new("Nature", "Physics (Q1); Biology (Q2)"),
            RankingEntry::new("Foo Journal", "Physics (Q3)"),
            RankingEntry::new("Algo Letters", "Computer Science (Q2)"),
            RankingEntry::new("Theory Journal", "Computer Science (Q1); Mathematics (Q1)"),
        ]
    }

    fn bibliography() -> Vec<BibEntry> {
        vec![
            article("a", "NATURE"),
            article("b", "FOO JOURNAL"),
            article("c", "NATURE"),
            article("d", "ALGO LETTERS"),
            article("e", "THEORY JOURNAL"),
        ]
    }

    #[test]
    fn required_tokens_are_the_cross_product() {
        let selection =
            Selection::from_parts(&[Quartile::Q1, Quartile::Q2], ["Physics", "Biology", "Physics"]);
        let tokens = required_tokens(&selection);
        let expected: HashSet<String> = [
            "Physics (Q1)",
            "Physics (Q2)",
            "Biology (Q1)",
            "Biology (Q2)",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn exact_category_quartile_pair_required() {
        let selection = Selection::from_parts(&[Quartile::Q1], ["Computer Science"]);
        let winners = find_winners(&ranking(), &bibliography(), &selection).unwrap();

        let titles: Vec<_> = winners.journals.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["THEORY JOURNAL"]);
        let keys: Vec<_> = winners.articles.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["e"]);
    }

    #[test]
    fn one_matching_pair_is_enough() {
        let selection = Selection::from_parts(&[Quartile::Q2], ["Biology", "Chemistry"]);
        let winners = find_winners(&ranking(), &bibliography(), &selection).unwrap();
        assert_eq!(winners.journals.len(), 1);
        assert_eq!(winners.journals[0].title, "NATURE");
    }

    #[test]
    fn duplicate_articles_are_kept_in_order() {
        let selection = Selection::from_parts(&[Quartile::Q1], ["Physics"]);
        let winners = find_winners(&ranking(), &bibliography(), &selection).unwrap();
        let keys: Vec<_> = winners.articles.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn empty_categories_yield_no_winners() {
        let selection = Selection::from_parts(&[Quartile::Q1, Quartile::Q2], Vec::<String>::new());
        let winners = find_winners(&ranking(), &bibliography(), &selection).unwrap();
        assert_eq!(winners, Winners::default());
    }

    #[test]
    fn no_quartile_is_a_validation_error() {
        let selection = Selection::from_parts(&[], ["Physics"]);
        let result = find_winners(&ranking(), &bibliography(), &selection);
        assert!(matches!(result, Err(BibrankError::Validation(_))));
    }
}
