//! Доменные типы: транзакции, балансы и табличные наборы данных.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Денежное значение, используем `Decimal` для точных расчётов.
pub type Money = Decimal;

/// Заголовки таблицы транзакций.
pub const TRANSACTION_HEADERS: &[&str] = &["Datetime", "Amount", "Account", "Terminal"];
/// Заголовки таблицы балансов.
pub const BALANCE_HEADERS: &[&str] = &["Account", "Amount"];
/// Заголовки истории баланса.
pub const HISTORY_HEADERS: &[&str] = &["Date", "Balance"];
/// Заголовки гистограммы активности.
pub const WEEKDAY_HEADERS: &[&str] = &[
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Операция по карте.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Дата и время операции (локальное время портала).
    pub timestamp: NaiveDateTime,
    /// Сумма со знаком: списания отрицательные, пополнения положительные.
    pub amount: Money,
    /// Имя счёта из справочника.
    pub account: &'static str,
    /// Терминал, через который прошла операция.
    pub terminal: String,
}

/// Остаток на одном подсчёте.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    /// Код счёта, с которым строка пришла с портала.
    pub code: char,
    /// Название счёта в формулировке портала.
    pub account: String,
    /// Остаток.
    pub amount: Money,
}

/// Точка истории баланса: остаток на начало дня.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancePoint {
    /// Дата.
    pub date: NaiveDate,
    /// Остаток.
    pub balance: Money,
}

/// Упорядоченный набор строк с подписанными столбцами.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<R> {
    /// Названия столбцов.
    pub headers: &'static [&'static str],
    /// Строки в исходном порядке.
    pub rows: Vec<R>,
}

impl<R> Table<R> {
    /// Создаёт пустую таблицу с заданными заголовками.
    #[inline]
    pub const fn new(headers: &'static [&'static str]) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Количество строк.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Пуста ли таблица.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Итератор по строкам.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }
}

impl Default for Table<Balance> {
    fn default() -> Self {
        Self::new(BALANCE_HEADERS)
    }
}

impl Default for Table<Transaction> {
    fn default() -> Self {
        Self::new(TRANSACTION_HEADERS)
    }
}

impl<'a, R> IntoIterator for &'a Table<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl<R> IntoIterator for Table<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Гистограмма активности: 24 часа × 7 дней недели (с понедельника).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Punchcard {
    /// Названия столбцов (дни недели).
    pub headers: &'static [&'static str],
    /// Счётчики `counts[час][день]`.
    pub counts: [[u32; 7]; 24],
}

impl Default for Punchcard {
    fn default() -> Self {
        Self {
            headers: WEEKDAY_HEADERS,
            counts: [[0; 7]; 24],
        }
    }
}

impl Punchcard {
    /// Счётчик для часа `0..24` и дня недели `0..7` (0 — понедельник).
    /// Вне этих диапазонов возвращает `None`.
    #[inline]
    pub fn count(&self, hour: usize, weekday: usize) -> Option<u32> {
        self.counts.get(hour)?.get(weekday).copied()
    }

    /// Суммарное число транзакций.
    pub fn total(&self) -> u32 {
        self.counts.iter().flatten().sum()
    }

    /// Ячейки по строкам: сначала час, внутри него дни недели.
    pub fn cells(&self) -> impl Iterator<Item = u32> + '_ {
        self.counts.iter().flat_map(|row| row.iter().copied())
    }
}
