//! bibrank — filter a bibliography down to articles from journals in chosen
//! quartiles and subject categories.

pub mod categories;
pub mod config;
pub mod error;
pub mod formats;
pub mod matcher;
pub mod models;
pub mod services;
pub mod session;
pub mod winners;

pub use categories::{CategoryCount, count_categories};
pub use config::{AppConfig, ExportConfig, RankingConfig};
pub use error::{BibrankError, ExitCode, Result};
pub use matcher::match_journals;
pub use models::*;
pub use services::{
    BibExport, UploadResults, category_picking_service, create_bib_file_service, upload_service,
};
pub use session::{Session, Stage};
pub use winners::{Winners, find_winners, required_tokens};
