//! Работа с исходным HTML страницы портала и её DOM-деревом.

use std::sync::LazyLock;

use crate::error::WatcardError;
use crate::types::Table;
use crate::utils::collect_text;
use scraper::{Html, Selector};

/// Сколько строк в начале каждой таблицы портала занимают заголовки.
const HEADER_ROWS: usize = 2;

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid table selector"));
static TR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid tr selector"));
static TD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("valid td selector"));

/// Исходный HTML страницы без разбора DOM.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Полный HTML страницы.
    pub html: String,
}

impl RawPage {
    /// Создаёт страницу из готовой HTML-строки.
    #[inline]
    pub fn from_str(s: &str) -> Self {
        Self {
            html: s.to_string(),
        }
    }
}

/// Разобранный DOM страницы.
#[derive(Debug, Clone)]
pub struct DomPage {
    pub(crate) doc: Html,
}

impl DomPage {
    /// Парсит DOM из исходного HTML.
    #[inline]
    pub fn parse(raw: &RawPage) -> Self {
        Self {
            doc: Html::parse_document(&raw.html),
        }
    }

    /// Извлекает таблицу с идентификатором `table_id`.
    ///
    /// Первые две строки считаются заголовочными и пропускаются. Текст ячеек
    /// каждой оставшейся строки передаётся в `process`; `Ok(None)` означает,
    /// что строку нужно пропустить.
    pub fn parse_table<T, F>(
        &self,
        table_id: &'static str,
        headers: &'static [&'static str],
        mut process: F,
    ) -> Result<Table<T>, WatcardError>
    where
        F: FnMut(&[String]) -> Result<Option<T>, WatcardError>,
    {
        let table = self
            .doc
            .select(&TABLE_SELECTOR)
            .find(|t| t.value().id() == Some(table_id))
            .ok_or(WatcardError::TableNotFound { table: table_id })?;

        let mut output = Table::new(headers);
        let mut skipped = 0usize;
        for tr in table.select(&TR_SELECTOR).skip(HEADER_ROWS) {
            let cells: Vec<String> = tr.select(&TD_SELECTOR).map(collect_text).collect();
            match process(&cells)? {
                Some(record) => output.rows.push(record),
                None => skipped += 1,
            }
        }

        tracing::debug!(
            table = table_id,
            rows = output.len(),
            skipped,
            "parsed portal table"
        );
        Ok(output)
    }
}
