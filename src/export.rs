//! Выгрузка операций в CSV для HomeBank.

use csv::{Terminator, WriterBuilder};

use crate::error::WatcardError;
use crate::types::Transaction;

/// Столбцы файла импорта HomeBank.
pub const HOMEBANK_HEADERS: [&str; 7] = [
    "date",
    "paymode",
    "info",
    "payee",
    "description",
    "amount",
    "category",
];

/// Код способа оплаты «электронный платёж».
const PAYMODE_ELECTRONIC: &str = "6";

/// Формирует CSV с разделителем `;` для операций счёта `account`.
///
/// Дата пишется как `dd-mm-yy`, терминал идёт в описание, имя счёта в категорию.
pub fn homebank_csv<'a, I>(transactions: I, account: &str) -> Result<String, WatcardError>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(HOMEBANK_HEADERS)?;

    for tx in transactions.into_iter().filter(|tx| tx.account == account) {
        let date = tx.timestamp.format("%d-%m-%y").to_string();
        let amount = tx.amount.to_string();
        writer.write_record([
            date.as_str(),
            PAYMODE_ELECTRONIC,
            "",
            "",
            tx.terminal.as_str(),
            amount.as_str(),
            tx.account,
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| WatcardError::Io(err.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|err| WatcardError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}
