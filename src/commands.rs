use crate::errors::AppError;
use crate::models::{
    AuthStatus, BooleanResponse, ExportFile, LinkEntry, LoadResponse, NoteRecord, SaveReceipt, StorageMode,
    VocabularyEntry,
};
use crate::{to_client_error, AppState};
use chrono::NaiveDate;
use std::path::PathBuf;

fn parse_date(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|error| AppError::InvalidInput(format!("'{}' is not a YYYY-MM-DD date: {}", date, error)))
        .map_err(to_client_error)
}

fn parse_mode(mode: &str) -> Result<StorageMode, String> {
    mode.parse::<StorageMode>().map_err(to_client_error)
}

pub async fn select_date(state: &AppState, date: String) -> Result<LoadResponse, String> {
    let date = parse_date(&date)?;
    state.core.select_date(date).await.map_err(to_client_error)
}

pub async fn reload_notes(state: &AppState) -> Result<LoadResponse, String> {
    state.core.reload().await.map_err(to_client_error)
}

pub async fn get_notes(state: &AppState) -> Result<NoteRecord, String> {
    Ok(state.core.current_notes().await)
}

pub async fn get_storage_mode(state: &AppState) -> Result<StorageMode, String> {
    Ok(state.core.storage_mode().await)
}

pub async fn set_storage_mode(state: &AppState, mode: String) -> Result<StorageMode, String> {
    let mode = parse_mode(&mode)?;
    Ok(state.core.set_storage_mode(mode).await)
}

pub async fn save_notes(state: &AppState) -> Result<SaveReceipt, String> {
    state.core.save().await.map_err(to_client_error)
}

pub async fn add_vocabulary(state: &AppState, word: String) -> Result<Option<VocabularyEntry>, String> {
    state.core.add_vocabulary(&word).await.map_err(to_client_error)
}

pub async fn select_meaning(
    state: &AppState,
    entry_index: usize,
    meaning_index: usize,
) -> Result<VocabularyEntry, String> {
    state
        .core
        .select_meaning(entry_index, meaning_index)
        .await
        .map_err(to_client_error)
}

pub async fn delete_vocabulary(state: &AppState, entry_index: usize) -> Result<NoteRecord, String> {
    state.core.delete_vocabulary(entry_index).await.map_err(to_client_error)
}

pub async fn set_text(state: &AppState, text: String) -> Result<NoteRecord, String> {
    state.core.set_text(&text).await.map_err(to_client_error)
}

pub async fn clear_text(state: &AppState) -> Result<NoteRecord, String> {
    state.core.clear_text().await.map_err(to_client_error)
}

pub async fn add_link(state: &AppState, url: String) -> Result<Option<LinkEntry>, String> {
    state.core.add_link(&url).await.map_err(to_client_error)
}

pub async fn delete_link(state: &AppState, link_index: usize) -> Result<NoteRecord, String> {
    state.core.delete_link(link_index).await.map_err(to_client_error)
}

pub async fn lookup_in_chat(state: &AppState, word: String) -> Result<String, String> {
    state.core.lookup_in_chat(&word).await.map_err(to_client_error)
}

pub async fn export_notes(state: &AppState) -> Result<ExportFile, String> {
    state.core.export_notes().await.map_err(to_client_error)
}

pub async fn write_export(state: &AppState, dir: String) -> Result<String, String> {
    state
        .core
        .write_export(&PathBuf::from(dir))
        .await
        .map(|path| path.display().to_string())
        .map_err(to_client_error)
}

pub async fn register(state: &AppState, email: String, password: String) -> Result<AuthStatus, String> {
    state.core.register(&email, &password).await.map_err(to_client_error)
}

pub async fn login(state: &AppState, email: String, password: String) -> Result<AuthStatus, String> {
    state.core.login(&email, &password).await.map_err(to_client_error)
}

pub async fn logout(state: &AppState) -> Result<AuthStatus, String> {
    state.core.logout().await.map_err(to_client_error)
}

pub async fn auth_status(state: &AppState) -> Result<AuthStatus, String> {
    Ok(state.core.auth_status().await)
}

pub async fn store_api_key(state: &AppState, entry: String, value: String) -> Result<BooleanResponse, String> {
    state
        .core
        .store_api_key(&entry, &value)
        .await
        .map_err(to_client_error)?;
    Ok(BooleanResponse { success: true })
}
