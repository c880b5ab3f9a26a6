pub mod bibtex;
pub mod ranking;

pub use bibtex::{read_bibtex, write_bibtex};
pub use ranking::read_ranking;

/// MIME type offered for exported bibliographies.
pub const BIBTEX_MIME_TYPE: &str = "application/x-bibtex";
