//! The three-stage filtering wizard.
//!
//! A [`Session`] owns all state for one user: the uploaded data, the
//! accumulated selection and the winners. Each method is one user action; an
//! action that fails leaves the session exactly as it was.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AppConfig;
use crate::error::{BibrankError, Result};
use crate::models::{Quartile, Selection};
use crate::services::{
    BibExport, UploadResults, category_picking_service, create_bib_file_service, upload_service,
};
use crate::winners::Winners;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Upload,
    Selecting,
    Results,
}

impl Stage {
    pub fn number(&self) -> u8 {
        match self {
            Self::Upload => 1,
            Self::Selecting => 2,
            Self::Results => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Upload => "File upload",
            Self::Selecting => "Quartiles & categories",
            Self::Results => "Results",
        }
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Upload => Some(Self::Selecting),
            Self::Selecting => Some(Self::Results),
            Self::Results => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    config: AppConfig,
    stage: Stage,
    upload: Option<UploadResults>,
    selection: Selection,
    winners: Option<Winners>,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn upload(&self) -> Option<&UploadResults> {
        self.upload.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn winners(&self) -> Option<&Winners> {
        self.winners.as_ref()
    }

    /// Checkbox labels for the categories, in display order.
    pub fn category_labels(&self) -> Vec<String> {
        self.upload
            .as_ref()
            .map(|upload| upload.category_counts.iter().map(|c| c.label()).collect())
            .unwrap_or_default()
    }

    // ─── Upload ────────────────────────────────────────────

    /// Processes both uploaded files and moves on to selecting.
    pub fn submit_files(
        &mut self,
        bibliography: Option<&[u8]>,
        ranking: Option<&[u8]>,
    ) -> Result<&UploadResults> {
        self.expect_stage(Stage::Upload)?;
        let (Some(bibliography), Some(ranking)) = (bibliography, ranking) else {
            return Err(BibrankError::MissingInput(
                "please upload both the bibliography and the ranking file".to_string(),
            ));
        };

        let upload = upload_service(bibliography, ranking, &self.config.ranking)?;
        self.selection = Selection::new();
        self.winners = None;
        self.advance();
        Ok(&*self.upload.insert(upload))
    }

    // ─── Selecting ─────────────────────────────────────────

    pub fn toggle_quartile(&mut self, index: usize) -> Result<bool> {
        self.expect_stage(Stage::Selecting)?;
        self.selection.toggle_quartile(index)
    }

    /// Marks `quartile` as selected. Selecting it again has no effect.
    pub fn select_quartile(&mut self, quartile: Quartile) -> Result<()> {
        self.expect_stage(Stage::Selecting)?;
        self.selection.set_quartile(quartile, true);
        Ok(())
    }

    pub fn pick_category(&mut self, name: impl Into<String>) -> Result<()> {
        self.expect_stage(Stage::Selecting)?;
        self.selection.pick_category(name);
        Ok(())
    }

    pub fn drop_category(&mut self, name: &str) -> Result<bool> {
        self.expect_stage(Stage::Selecting)?;
        Ok(self.selection.drop_category(name))
    }

    /// Applies the selection and moves on to the results.
    pub fn submit_selection(&mut self) -> Result<&Winners> {
        self.expect_stage(Stage::Selecting)?;
        let Some(upload) = self.upload.as_ref() else {
            return Err(BibrankError::MissingInput("no uploaded data".to_string()));
        };

        let winners = category_picking_service(upload, &self.selection)?;
        self.advance();
        Ok(&*self.winners.insert(winners))
    }

    // ─── Results ───────────────────────────────────────────

    pub fn export(&self) -> Result<BibExport> {
        self.expect_stage(Stage::Results)?;
        let articles = self
            .winners
            .as_ref()
            .map(|winners| winners.articles.as_slice())
            .unwrap_or_default();
        Ok(create_bib_file_service(
            articles,
            &self.config.export.file_name,
        ))
    }

    // ─── Navigation ────────────────────────────────────────

    /// Steps back one stage. Going back to upload discards the uploaded data.
    pub fn back(&mut self) {
        self.stage = match self.stage {
            Stage::Upload => Stage::Upload,
            Stage::Selecting => {
                self.upload = None;
                self.selection = Selection::new();
                Stage::Upload
            }
            Stage::Results => {
                self.winners = None;
                Stage::Selecting
            }
        };
        info!(stage = %self.stage, "stepped back");
    }

    /// Discards everything and starts again at upload.
    pub fn restart(&mut self) {
        *self = Self::new(self.config.clone());
    }

    fn expect_stage(&self, expected: Stage) -> Result<()> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(BibrankError::InvalidStage {
                expected,
                actual: self.stage,
            })
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            info!(from = %self.stage, to = %next, "stage transition");
            self.stage = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIB: &[u8] = b"@article{n1, journal = {Nature}, title = {Birds}}
@article{f1, journal = {Foo Journal}, title = {Fish}}
@article{n2, journal = {nature}, title = {Bees}}
";

    const RANKING: &[u8] = b"Title;Categories
Nature;\"Physics (Q1); Biology (Q2)\"
Foo Journal;Physics (Q3)
";

    fn selecting_session() -> Session {
        let mut session = Session::new(AppConfig::default());
        session.submit_files(Some(BIB), Some(RANKING)).unwrap();
        session
    }

    #[test]
    fn stage_sequence() {
        assert_eq!(Stage::default(), Stage::Upload);
        assert_eq!(Stage::Upload.next(), Some(Stage::Selecting));
        assert_eq!(Stage::Selecting.next(), Some(Stage::Results));
        assert_eq!(Stage::Results.next(), None);
        assert_eq!(Stage::Results.number(), 3);
    }

    #[test]
    fn missing_file_blocks_upload() {
        let mut session = Session::new(AppConfig::default());
        let result = session.submit_files(Some(BIB), None);
        assert!(matches!(result, Err(BibrankError::MissingInput(_))));
        assert_eq!(session.stage(), Stage::Upload);
        assert!(session.upload().is_none());
    }

    #[test]
    fn parse_error_blocks_upload() {
        let mut session = Session::new(AppConfig::default());
        let result = session.submit_files(Some(BIB), Some(b"Name;Areas\nx;y\n"));
        assert!(matches!(result, Err(BibrankError::Parse(_))));
        assert_eq!(session.stage(), Stage::Upload);
    }

    #[test]
    fn upload_moves_to_selecting_with_labels() {
        let session = selecting_session();
        assert_eq!(session.stage(), Stage::Selecting);
        assert_eq!(
            session.category_labels(),
            vec![
                "Physics (appears 2 times)".to_string(),
                "Biology (appears 1 times)".to_string(),
            ]
        );
    }

    #[test]
    fn selecting_a_quartile_twice_keeps_it_selected() {
        let mut session = selecting_session();
        session.select_quartile(Quartile::Q2).unwrap();
        session.select_quartile(Quartile::Q2).unwrap();
        assert_eq!(session.selection().quartile_flags(), [false, true, false, false]);

        let mut fresh = Session::new(AppConfig::default());
        assert!(matches!(
            fresh.select_quartile(Quartile::Q1),
            Err(BibrankError::InvalidStage { .. })
        ));
    }

    #[test]
    fn selection_without_quartile_stays_in_selecting() {
        let mut session = selecting_session();
        session.pick_category("Physics").unwrap();

        let result = session.submit_selection();
        assert!(matches!(result, Err(BibrankError::Validation(_))));
        assert_eq!(session.stage(), Stage::Selecting);
        assert_eq!(session.selection().categories(), ["Physics"]);
    }

    #[test]
    fn full_wizard_run() {
        let mut session = selecting_session();
        session.toggle_quartile(0).unwrap();
        session.pick_category("Physics").unwrap();

        let winners = session.submit_selection().unwrap();
        assert_eq!(winners.journals.len(), 1);
        assert_eq!(winners.articles.len(), 2);
        assert_eq!(session.stage(), Stage::Results);

        let export = session.export().unwrap();
        assert_eq!(export.file_name, "winners.bib");
        assert!(export.content.contains("@article{n1,"));
        assert!(export.content.contains("@article{n2,"));
        assert!(!export.content.contains("f1"));
    }

    #[test]
    fn empty_category_selection_is_valid() {
        let mut session = selecting_session();
        session.toggle_quartile(1).unwrap();

        let winners = session.submit_selection().unwrap();
        assert!(winners.journals.is_empty());
        assert!(winners.articles.is_empty());
        assert_eq!(session.export().unwrap().content, "");
    }

    #[test]
    fn actions_outside_their_stage_are_rejected() {
        let mut session = Session::new(AppConfig::default());
        assert!(matches!(
            session.toggle_quartile(0),
            Err(BibrankError::InvalidStage { .. })
        ));
        assert!(session.export().is_err());

        let mut session = selecting_session();
        assert!(matches!(
            session.submit_files(Some(BIB), Some(RANKING)),
            Err(BibrankError::InvalidStage { .. })
        ));
        assert_eq!(session.stage(), Stage::Selecting);
    }

    #[test]
    fn back_from_results_keeps_selection() {
        let mut session = selecting_session();
        session.toggle_quartile(0).unwrap();
        session.pick_category("Physics").unwrap();
        session.submit_selection().unwrap();

        session.back();
        assert_eq!(session.stage(), Stage::Selecting);
        assert!(session.winners().is_none());
        assert_eq!(session.selection().quartile_flags(), [true, false, false, false]);

        session.back();
        assert_eq!(session.stage(), Stage::Upload);
        assert!(session.upload().is_none());
    }

    #[test]
    fn restart_clears_everything() {
        let mut session = selecting_session();
        session.toggle_quartile(3).unwrap();
        session.restart();
        assert_eq!(session.stage(), Stage::Upload);
        assert!(session.upload().is_none());
        assert_eq!(session.selection(), &Selection::new());
    }
}
