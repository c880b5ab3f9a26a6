use serde::{Deserialize, Serialize};
use tracing::info;

use crate::categories::{CategoryCount, count_categories};
use crate::config::RankingConfig;
use crate::error::Result;
use crate::formats::{BIBTEX_MIME_TYPE, read_bibtex, read_ranking, write_bibtex};
use crate::matcher::match_journals;
use crate::models::{BibEntry, RankingEntry, Selection};
use crate::winners::{Winners, find_winners};

/// Everything the selecting stage needs from the uploaded files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResults {
    pub matched_journals: Vec<RankingEntry>,
    pub category_counts: Vec<CategoryCount>,
    pub bibliography: Vec<BibEntry>,
}

/// A bibliography ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BibExport {
    pub file_name: String,
    pub mime_type: &'static str,
    pub content: String,
}

/// Reads both files, matches journals and counts their categories.
pub fn upload_service(
    bib_bytes: &[u8],
    ranking_bytes: &[u8],
    config: &RankingConfig,
) -> Result<UploadResults> {
    let bibliography = read_bibtex(bib_bytes)?;
    let ranking = read_ranking(ranking_bytes, config)?;

    let matched_journals = match_journals(&bibliography, &ranking);
    let category_counts = count_categories(&matched_journals);

    info!(
        entries = bibliography.len(),
        matched = matched_journals.len(),
        categories = category_counts.len(),
        "upload processed"
    );
    Ok(UploadResults {
        matched_journals,
        category_counts,
        bibliography,
    })
}

/// Applies the user's quartile and category picks.
pub fn category_picking_service(upload: &UploadResults, selection: &Selection) -> Result<Winners> {
    let winners = find_winners(&upload.matched_journals, &upload.bibliography, selection)?;
    info!(
        journals = winners.journals.len(),
        articles = winners.articles.len(),
        "selection applied"
    );
    Ok(winners)
}

/// Serializes the winning articles for download.
pub fn create_bib_file_service(articles: &[BibEntry], file_name: &str) -> BibExport {
    BibExport {
        file_name: file_name.to_string(),
        mime_type: BIBTEX_MIME_TYPE,
        content: write_bibtex(articles),
    }
}
