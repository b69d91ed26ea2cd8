use crate::date_key::storage_key;
use crate::errors::AppResult;
use crate::models::{NoteRecord, StorageMode};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub date: NaiveDate,
    pub key: String,
    pub mode: StorageMode,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub date: NaiveDate,
    pub key: String,
    pub mode: StorageMode,
    pub record: NoteRecord,
    /// False until a load for the current key and mode has been applied.
    pub loaded: bool,
}

#[derive(Debug)]
struct EditingState {
    date: NaiveDate,
    key: String,
    mode: StorageMode,
    record: NoteRecord,
    generation: u64,
    loaded: bool,
}

impl EditingState {
    fn ticket(&self) -> LoadTicket {
        LoadTicket {
            date: self.date,
            key: self.key.clone(),
            mode: self.mode,
            generation: self.generation,
        }
    }

    fn matches(&self, ticket: &LoadTicket) -> bool {
        self.key == ticket.key && self.generation == ticket.generation
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            date: self.date,
            key: self.key.clone(),
            mode: self.mode,
            record: self.record.clone(),
            loaded: self.loaded,
        }
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.loaded = false;
    }
}

/// The selected date, its in-memory record and the active storage mode.
///
/// Every change of selection bumps a generation counter; responses that come
/// back for an older generation are dropped instead of being applied.
#[derive(Debug, Clone)]
pub struct NoteEditingSession {
    state: Arc<Mutex<EditingState>>,
}

impl NoteEditingSession {
    pub fn new(date: NaiveDate, mode: StorageMode) -> Self {
        Self {
            state: Arc::new(Mutex::new(EditingState {
                date,
                key: storage_key(date),
                mode,
                record: NoteRecord::default(),
                generation: 0,
                loaded: false,
            })),
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn checkout(&self) -> (LoadTicket, SessionSnapshot) {
        let state = self.state.lock().await;
        (state.ticket(), state.snapshot())
    }

    pub async fn mode(&self) -> StorageMode {
        self.state.lock().await.mode
    }

    pub async fn current_ticket(&self) -> LoadTicket {
        self.state.lock().await.ticket()
    }

    pub async fn select_date(&self, date: NaiveDate) -> LoadTicket {
        let mut state = self.state.lock().await;
        state.date = date;
        state.key = storage_key(date);
        state.record = NoteRecord::default();
        state.invalidate();
        state.ticket()
    }

    pub async fn begin_reload(&self) -> LoadTicket {
        let mut state = self.state.lock().await;
        state.invalidate();
        state.ticket()
    }

    pub async fn set_mode(&self, mode: StorageMode) -> bool {
        let mut state = self.state.lock().await;
        if state.mode == mode {
            return false;
        }
        state.mode = mode;
        state.invalidate();
        true
    }

    pub async fn apply_loaded(&self, ticket: &LoadTicket, record: NoteRecord) -> bool {
        let mut state = self.state.lock().await;
        if !state.matches(ticket) {
            return false;
        }
        state.record = record;
        state.loaded = true;
        true
    }

    pub async fn edit_if_current<T>(
        &self,
        ticket: &LoadTicket,
        edit: impl FnOnce(&mut NoteRecord) -> AppResult<T>,
    ) -> AppResult<Option<T>> {
        let mut state = self.state.lock().await;
        if !state.matches(ticket) {
            return Ok(None);
        }
        apply_whole(&mut state.record, edit).map(Some)
    }

    pub async fn edit<T>(&self, edit: impl FnOnce(&mut NoteRecord) -> AppResult<T>) -> AppResult<T> {
        let mut state = self.state.lock().await;
        apply_whole(&mut state.record, edit)
    }

    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.record = NoteRecord::default();
        state.invalidate();
    }
}

fn apply_whole<T>(
    record: &mut NoteRecord,
    edit: impl FnOnce(&mut NoteRecord) -> AppResult<T>,
) -> AppResult<T> {
    let mut draft = record.clone();
    let value = edit(&mut draft)?;
    *record = draft;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).expect("date")
    }

    fn text(value: &str) -> NoteRecord {
        NoteRecord {
            text: value.to_string(),
            ..NoteRecord::default()
        }
    }

    #[tokio::test]
    async fn stale_ticket_is_ignored() {
        let session = NoteEditingSession::new(day(1), StorageMode::Local);
        let first = session.select_date(day(1)).await;
        let second = session.select_date(day(2)).await;

        assert!(session.apply_loaded(&second, text("day two")).await);
        assert!(!session.apply_loaded(&first, text("day one")).await);

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.key, "notes-2024-07-02");
        assert_eq!(snapshot.record.text, "day two");
    }

    #[tokio::test]
    async fn returning_to_a_date_still_rejects_older_loads() {
        let session = NoteEditingSession::new(day(1), StorageMode::Local);
        let early = session.select_date(day(1)).await;
        session.select_date(day(2)).await;
        let current = session.select_date(day(1)).await;

        assert!(!session.apply_loaded(&early, text("stale")).await);
        assert!(session.apply_loaded(&current, text("fresh")).await);
        assert_eq!(session.snapshot().await.record.text, "fresh");
    }

    #[tokio::test]
    async fn date_change_discards_unsaved_edits() {
        let session = NoteEditingSession::new(day(1), StorageMode::Local);
        session.edit(|record| {
            record.set_text("unsaved");
            Ok(())
        })
        .await
        .expect("edit");
        session.select_date(day(3)).await;
        assert!(session.snapshot().await.record.is_empty());
    }

    #[tokio::test]
    async fn mode_switch_keeps_record_and_invalidates_loads() {
        let session = NoteEditingSession::new(day(1), StorageMode::Local);
        let ticket = session.begin_reload().await;
        session.apply_loaded(&ticket, text("local copy")).await;

        let pending = session.current_ticket().await;
        assert!(session.set_mode(StorageMode::Remote).await);
        assert!(!session.set_mode(StorageMode::Remote).await);
        assert!(!session.apply_loaded(&pending, text("late")).await);

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.mode, StorageMode::Remote);
        assert_eq!(snapshot.record.text, "local copy");
    }

    #[tokio::test]
    async fn failed_edit_changes_nothing() {
        let session = NoteEditingSession::new(day(1), StorageMode::Local);
        let result: AppResult<()> = session
            .edit(|record| {
                record.set_text("half done");
                Err(AppError::InvalidInput("nope".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(session.snapshot().await.record.text, "");
    }

    #[tokio::test]
    async fn edits_for_a_stale_ticket_are_skipped() {
        let session = NoteEditingSession::new(day(1), StorageMode::Local);
        let ticket = session.current_ticket().await;
        session.select_date(day(2)).await;
        let applied = session
            .edit_if_current(&ticket, |record| {
                record.set_text("late lookup");
                Ok(())
            })
            .await
            .expect("edit");
        assert!(applied.is_none());
        assert!(session.snapshot().await.record.is_empty());
    }

    #[tokio::test]
    async fn only_applied_loads_mark_record_loaded() {
        let session = NoteEditingSession::new(day(1), StorageMode::Remote);
        assert!(!session.snapshot().await.loaded);

        let ticket = session.select_date(day(4)).await;
        assert!(!session.snapshot().await.loaded);
        session.apply_loaded(&ticket, text("stored")).await;
        assert!(session.snapshot().await.loaded);

        session.begin_reload().await;
        assert!(!session.snapshot().await.loaded);
        let ticket = session.begin_reload().await;
        session.apply_loaded(&ticket, text("stored")).await;
        session.set_mode(StorageMode::Local).await;
        assert!(!session.snapshot().await.loaded);
    }

    #[tokio::test]
    async fn reset_clears_record() {
        let session = NoteEditingSession::new(day(1), StorageMode::Remote);
        let ticket = session.current_ticket().await;
        session.apply_loaded(&ticket, text("remote")).await;
        session.reset().await;
        assert!(!session.apply_loaded(&ticket, text("again")).await);
        assert!(session.snapshot().await.record.is_empty());
    }
}
