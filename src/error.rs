//! Ошибки загрузки, разбора и построения отчётов WatCard.

use chrono::NaiveDate;

/// Ошибка работы с порталом WatCard и кэшированными данными.
#[derive(thiserror::Error, Debug)]
pub enum WatcardError {
    /// Ошибка ввода-вывода (чтение конфигурации, запись выгрузки).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Ошибка HTTP-запроса к порталу.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Портал ответил неуспешным HTTP-статусом без признака ошибки авторизации.
    #[error("Portal responded with HTTP status {status}")]
    Status {
        /// Код ответа.
        status: u16,
    },
    /// Портал отклонил номер счёта или PIN.
    #[error("The Account or PIN code is incorrect")]
    Authentication,
    /// На странице нет ожидаемой таблицы.
    #[error("Table '{table}' not found")]
    TableNotFound {
        /// Идентификатор таблицы.
        table: &'static str,
    },
    /// В строке таблицы меньше ячеек, чем нужно обработчику.
    #[error("Row in table '{table}' has {found} cells, expected at least {expected}")]
    ShortRow {
        /// Идентификатор таблицы.
        table: &'static str,
        /// Минимальное число ячеек.
        expected: usize,
        /// Фактическое число ячеек.
        found: usize,
    },
    /// Ошибка разбора числового значения.
    #[error("Invalid number '{value}' in column '{column}'")]
    Number {
        /// Некорректное исходное значение.
        value: String,
        /// Название столбца.
        column: &'static str,
    },
    /// Ошибка разбора даты и времени.
    #[error("Invalid date '{value}'")]
    Date {
        /// Некорректная дата.
        value: String,
    },
    /// Транзакция ссылается на код счёта, которого нет в справочнике.
    #[error("Unknown account code '{code}'")]
    UnknownAccount {
        /// Исходный код из таблицы.
        code: String,
    },
    /// Для счёта не определён опорный баланс.
    #[error("Balance history is not supported for account '{account}'")]
    UnsupportedAccount {
        /// Запрошенное имя счёта.
        account: String,
    },
    /// В таблице балансов нет строки для счёта.
    #[error("Balance for account '{account}' missing")]
    MissingBalance {
        /// Имя счёта из справочника.
        account: &'static str,
    },
    /// Транзакции идут не в порядке убывания дат.
    #[error("Transactions out of order: {next} follows {previous}")]
    UnorderedTransactions {
        /// Дата предыдущей транзакции.
        previous: NaiveDate,
        /// Дата транзакции, нарушившей порядок.
        next: NaiveDate,
    },
    /// Окно усреднения нулевой длины.
    #[error("Averaging window must be at least one day")]
    EmptyWindow,
    /// Ошибка чтения файла настроек.
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    /// Ошибка записи выгрузки.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl WatcardError {
    /// Возвращает `true`, если страница портала не совпала с ожидаемой разметкой.
    pub const fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::TableNotFound { .. }
                | Self::ShortRow { .. }
                | Self::Number { .. }
                | Self::Date { .. }
        )
    }
}
