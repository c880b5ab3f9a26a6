pub mod entry;
pub mod ranking;
pub mod selection;

pub use entry::{BibEntry, normalize_journal_name};
pub use ranking::{
    CategoryToken, Quartile, RankingEntry, TOKEN_SEPARATOR, category_name, parse_category_token,
};
pub use selection::Selection;
