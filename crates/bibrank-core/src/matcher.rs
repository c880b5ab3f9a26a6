use std::collections::HashSet;

use tracing::debug;

use crate::models::{BibEntry, RankingEntry};

/// Keeps the ranking rows whose title is the journal of at least one entry.
///
/// Ranking order and duplicate rows are preserved. Both sides are expected to
/// be normalized already, so the comparison is exact.
pub fn match_journals(entries: &[BibEntry], ranking: &[RankingEntry]) -> Vec<RankingEntry> {
    let journals: HashSet<&str> = entries.iter().filter_map(BibEntry::journal).collect();

    let matched: Vec<RankingEntry> = ranking
        .iter()
        .filter(|row| journals.contains(row.title.as_str()))
        .cloned()
        .collect();

    debug!(
        journals = journals.len(),
        ranking_rows = ranking.len(),
        matched = matched.len(),
        "matched bibliography journals against ranking"
    );
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(key: &str, journal: &str) -> BibEntry {
        BibEntry::new(key, "article").with_field("journal", journal)
    }

    #[test]
    fn keeps_only_referenced_journals() {
        let entries = vec![article("a", "NATURE"), article("b", "NATURE")];
        let ranking = vec![
            RankingEntry::new("Science", "Physics (Q1)"),
            RankingEntry::new("Nature", "Physics (Q1)"),
        ];

        let matched = match_journals(&entries, &ranking);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].title, "NATURE");
    }

    #[test]
    fn preserves_duplicate_ranking_rows_in_order() {
        let entries = vec![article("a", "NATURE"), article("b", "CELL")];
        let ranking = vec![
            RankingEntry::new("Nature", "Physics (Q1)"),
            RankingEntry::new("Cell", "Biology (Q1)"),
            RankingEntry::new("Nature", "Biology (Q2)"),
        ];

        let titles: Vec<_> = match_journals(&entries, &ranking)
            .into_iter()
            .map(|row| row.title)
            .collect();
        assert_eq!(titles, vec!["NATURE", "CELL", "NATURE"]);
    }

    #[test]
    fn mixed_case_sources_match_once_normalized() {
        let bib = "@article{a, journal = {Nature}, title = {T}}";
        let entries = crate::formats::read_bibtex(bib.as_bytes()).unwrap();
        let ranking = vec![RankingEntry::new("NATURE", "Physics (Q1)")];
        assert_eq!(match_journals(&entries, &ranking).len(), 1);
    }

    #[test]
    fn no_entries_match_nothing() {
        let ranking = vec![RankingEntry::new("Nature", "Physics (Q1)")];
        assert!(match_journals(&[], &ranking).is_empty());
    }
}
