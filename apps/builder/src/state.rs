use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::backends::preview::VisualTree;
use crate::backends::stylesheet::Stylesheet;
use crate::backends::{Artifact, ResumeRenderer};
use crate::completeness::{compute_completion_report, CompletionReport};
use crate::compose::{compose, ComposeOptions};
use crate::errors::Result;
use crate::export::{ExportController, Notice};
use crate::models::edit::RecordEdit;
use crate::models::resume::ResumeRecord;
use crate::store::{load_record, save_record, DebouncedSaver, ResumeStore};

/// One editing session over a persisted record.
///
/// The record is held as an `Arc` snapshot and replaced wholesale on every
/// edit, so a running export keeps rendering the version it was handed.
pub struct Session {
    record: Arc<ResumeRecord>,
    store: Arc<dyn ResumeStore>,
    /// Absent when saves are written synchronously.
    saver: Option<DebouncedSaver>,
    exporter: ExportController,
    options: ComposeOptions,
}

impl Session {
    /// Loads the persisted record, starting from the empty record when there
    /// is none. A zero `save_debounce` writes every edit immediately.
    pub async fn load(
        store: Arc<dyn ResumeStore>,
        renderer: Arc<dyn ResumeRenderer>,
        options: ComposeOptions,
        save_debounce: Duration,
    ) -> Self {
        let record = match load_record(store.as_ref()).await {
            Some(record) => record,
            None => {
                info!("Starting from an empty record");
                ResumeRecord::empty()
            }
        };
        let saver = (!save_debounce.is_zero())
            .then(|| DebouncedSaver::spawn(store.clone(), save_debounce));

        Self {
            record: Arc::new(record),
            store,
            saver,
            exporter: ExportController::new(renderer),
            options,
        }
    }

    pub fn record(&self) -> Arc<ResumeRecord> {
        self.record.clone()
    }

    pub fn options(&self) -> &ComposeOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ComposeOptions) {
        self.options = options;
    }

    pub fn exporter(&self) -> &ExportController {
        &self.exporter
    }

    /// Applies `edit` and persists the new record. A rejected edit leaves
    /// the session unchanged.
    pub async fn apply_edit(&mut self, edit: RecordEdit) -> Result<Arc<ResumeRecord>> {
        let next = Arc::new(self.record.apply(edit).inspect_err(|e| {
            warn!("Rejected edit: {e}");
        })?);
        self.record = next.clone();
        self.persist().await?;
        Ok(next)
    }

    /// Replaces the whole record, e.g. after an import.
    pub async fn replace(&mut self, record: ResumeRecord) -> Result<()> {
        self.record = Arc::new(record);
        self.persist().await
    }

    async fn persist(&self) -> Result<()> {
        match &self.saver {
            Some(saver) => {
                saver.schedule(self.record.clone());
                Ok(())
            }
            None => save_record(self.store.as_ref(), &self.record).await,
        }
    }

    pub fn completion(&self) -> CompletionReport {
        compute_completion_report(&self.record)
    }

    /// The on-screen preview of the current record.
    pub fn preview(&self) -> VisualTree {
        let doc = compose(&self.record, &self.options);
        debug!("Previewing {} section(s)", doc.sections.len());
        VisualTree::build(&doc, &Stylesheet::default())
    }

    pub async fn export(&self) -> Result<Artifact> {
        self.exporter
            .export(self.record.clone(), self.options.clone())
            .await
    }

    pub async fn export_with_notice(&self) -> (Result<Artifact>, Notice) {
        self.exporter
            .export_with_notice(self.record.clone(), self.options.clone())
            .await
    }

    /// Writes any pending debounced save.
    pub async fn flush(&self) -> Result<()> {
        match &self.saver {
            Some(saver) => saver.flush().await,
            None => Ok(()),
        }
    }

    /// Flushes pending saves and stops the background saver.
    pub async fn close(self) -> Result<()> {
        match self.saver {
            Some(saver) => saver.shutdown().await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{renderer_for, BackendKind, RendererSettings};
    use crate::compose::tests::{full_record, jane_doe};
    use crate::errors::BuilderError;
    use crate::models::edit::{EntryKind, PersonalField};
    use crate::sections::SectionId;
    use crate::store::{MemoryStore, RESUME_DATA_KEY};

    fn latex() -> Arc<dyn ResumeRenderer> {
        renderer_for(BackendKind::TemplateSubstitution, &RendererSettings::default())
    }

    async fn session_over(store: Arc<MemoryStore>, debounce: Duration) -> Session {
        Session::load(store, latex(), ComposeOptions::default(), debounce).await
    }

    #[tokio::test]
    async fn test_load_without_saved_record_starts_empty() {
        let session = session_over(Arc::new(MemoryStore::new()), Duration::ZERO).await;
        assert_eq!(*session.record(), ResumeRecord::empty());
        assert_eq!(session.completion().completed, 0);
    }

    #[tokio::test]
    async fn test_load_restores_saved_record() {
        let store = Arc::new(MemoryStore::new());
        save_record(store.as_ref(), &full_record()).await.unwrap();
        let session = session_over(store, Duration::ZERO).await;
        assert_eq!(*session.record(), full_record());
    }

    #[tokio::test]
    async fn test_edit_persists_immediately_without_debounce() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session_over(store.clone(), Duration::ZERO).await;

        let before = session.record();
        let after = session
            .apply_edit(RecordEdit::SetPersonal {
                field: PersonalField::Name,
                value: "Jane Doe".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(before.personal_info.name, None);
        assert_eq!(after.personal_info.name.as_deref(), Some("Jane Doe"));
        assert_eq!(load_record(store.as_ref()).await.as_ref(), Some(after.as_ref()));
    }

    #[tokio::test]
    async fn test_rejected_edit_keeps_previous_record() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session_over(store.clone(), Duration::ZERO).await;
        let err = session
            .apply_edit(RecordEdit::RemoveEntry {
                kind: EntryKind::Award,
                index: 0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BuilderError::InvalidEdit(_)));
        assert_eq!(*session.record(), ResumeRecord::empty());
        assert_eq!(store.get(RESUME_DATA_KEY).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_session_saves_on_close() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session_over(store.clone(), Duration::from_secs(30)).await;
        session.replace(jane_doe()).await.unwrap();
        session
            .apply_edit(RecordEdit::AddEntry(EntryKind::Project))
            .await
            .unwrap();
        assert_eq!(store.get(RESUME_DATA_KEY).await.unwrap(), None);

        let expected = session.record();
        session.close().await.unwrap();
        assert_eq!(load_record(store.as_ref()).await.as_ref(), Some(expected.as_ref()));
    }

    #[tokio::test]
    async fn test_export_and_preview_follow_options() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session_over(store, Duration::ZERO).await;
        session.replace(jane_doe()).await.unwrap();
        session.set_options(
            ComposeOptions::with_order(["experience"]).heading(SectionId::Experience, "Work"),
        );

        let tree = session.preview();
        assert!(tree.text_runs().any(|t| t == "WORK"));
        assert!(!tree.text_runs().any(|t| t == "JANE DOE"));

        let (artifact, notice) = session.export_with_notice().await;
        let artifact = artifact.unwrap();
        assert_eq!(artifact.filename, "Jane Doe.tex");
        let source = String::from_utf8(artifact.bytes.to_vec()).unwrap();
        assert!(source.contains("Work"));
        assert_eq!(
            notice,
            Notice::Success {
                filename: "Jane Doe.tex".to_string()
            }
        );
        assert!(!session.exporter().is_busy());
    }
}
