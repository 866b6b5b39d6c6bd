/// Tools for reading and changing settings
///
/// This module implements settings_get and settings_update.

use serde::{Deserialize, Serialize};
use crate::domain::{Settings, SettingsPatch, Theme, WeekStart};
use crate::storage::BlobStore;
use crate::store::HabitStore;
use crate::tools::ToolError;

/// Parameters for updating settings; omitted fields keep their value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsParams {
    pub theme: Option<Theme>,
    pub notifications: Option<bool>,
    pub week_starts_on: Option<WeekStart>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: Settings,
    pub message: String,
}

pub fn get_settings<S: BlobStore>(store: &HabitStore<S>) -> Result<SettingsResponse, ToolError> {
    Ok(SettingsResponse {
        settings: store.settings().clone(),
        message: "Current settings".to_string(),
    })
}

pub fn update_settings<S: BlobStore>(
    store: &mut HabitStore<S>,
    params: UpdateSettingsParams,
) -> Result<SettingsResponse, ToolError> {
    store.update_settings(SettingsPatch {
        theme: params.theme,
        notifications: params.notifications,
        week_starts_on: params.week_starts_on,
    })?;

    Ok(SettingsResponse {
        settings: store.settings().clone(),
        message: "⚙️ Settings saved".to_string(),
    })
}
