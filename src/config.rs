//! Настройки клиента: адрес портала, таймаут и уровень логирования.

use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::error::WatcardError;

/// Адрес формы портала WatCard.
pub const DEFAULT_ENDPOINT: &str = "https://account.watcard.uwaterloo.ca/watgopher661.asp";

/// Настройки, читаемые из JSON-файла. Отсутствующие поля берутся по умолчанию.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// URL формы портала.
    pub endpoint: String,
    /// Таймаут соединения и запроса, секунды.
    pub timeout_secs: u64,
    /// Уровень логирования (`trace` … `error`).
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Читает настройки из JSON-файла.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WatcardError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Разбирает настройки из JSON-строки.
    pub fn from_json(json: &str) -> Result<Self, WatcardError> {
        Ok(serde_json::from_str(json)?)
    }
}
