//! Обработчики строк таблиц транзакций и балансов.

use crate::accounts::lookup_code;
use crate::error::WatcardError;
use crate::raw::DomPage;
use crate::types::{BALANCE_HEADERS, Balance, TRANSACTION_HEADERS, Table, Transaction};
use crate::utils::{parse_money, parse_timestamp};

/// Идентификатор таблицы истории операций.
pub const TRANSACTIONS_TABLE: &str = "oneweb_financial_history_table";
/// Идентификатор таблицы балансов.
pub const BALANCES_TABLE: &str = "oneweb_balance_information_table";

const TRANSACTION_CELLS: usize = 7;
const BALANCE_CELLS: usize = 6;

impl DomPage {
    /// Парсит таблицу истории операций.
    pub fn transactions(&self) -> Result<Table<Transaction>, WatcardError> {
        self.parse_table(TRANSACTIONS_TABLE, TRANSACTION_HEADERS, |cells| {
            process_transaction(cells).map(Some)
        })
    }

    /// Парсит таблицу балансов, пропуская строки с неизвестными кодами.
    pub fn balances(&self) -> Result<Table<Balance>, WatcardError> {
        self.parse_table(BALANCES_TABLE, BALANCE_HEADERS, process_balance)
    }
}

/// Разбирает строку истории операций.
///
/// Ячейки: дата, время, сумма, код счёта, …, терминал (седьмая). Неизвестный
/// код счёта — ошибка, а не пропуск строки.
pub fn process_transaction(cells: &[String]) -> Result<Transaction, WatcardError> {
    ensure_len(cells, TRANSACTIONS_TABLE, TRANSACTION_CELLS)?;

    let timestamp = parse_timestamp(&cells[0], &cells[1])?;
    let amount = parse_money(&cells[2], "Amount")?;
    let code = cells[3].trim_end();
    let (_, account) = lookup_code(code).ok_or_else(|| WatcardError::UnknownAccount {
        code: code.to_string(),
    })?;

    Ok(Transaction {
        timestamp,
        amount,
        account,
        terminal: cells[6].clone(),
    })
}

/// Разбирает строку балансов. Строки с кодом вне справочника (в том числе
/// итоговые строки портала) возвращают `None`.
pub fn process_balance(cells: &[String]) -> Result<Option<Balance>, WatcardError> {
    let Some((code, _)) = cells.first().and_then(|cell| lookup_code(cell)) else {
        return Ok(None);
    };
    ensure_len(cells, BALANCES_TABLE, BALANCE_CELLS)?;

    Ok(Some(Balance {
        code,
        account: cells[2].trim_end().to_string(),
        amount: parse_money(&cells[5], "Amount")?,
    }))
}

fn ensure_len(cells: &[String], table: &'static str, expected: usize) -> Result<(), WatcardError> {
    if cells.len() < expected {
        return Err(WatcardError::ShortRow {
            table,
            expected,
            found: cells.len(),
        });
    }
    Ok(())
}
