//! Вспомогательные парсеры чисел, дат и текста ячеек.

use crate::error::WatcardError;
use crate::types::Money;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use scraper::ElementRef;
use std::str::FromStr;

/// Формат даты и времени транзакции на портале.
const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Нормализует последовательность символов, схлопывая группы пробельных.
fn normalize_chars<I: IntoIterator<Item = char>>(iter: I) -> String {
    let mut output = String::new();
    let mut prev_space = false;
    for ch in iter {
        let is_space = ch.is_whitespace();
        if is_space {
            if !prev_space {
                output.push(' ');
            }
        } else {
            output.push(ch);
        }
        prev_space = is_space;
    }
    output.trim().to_string()
}

/// Нормализует числовую строку, удаляя пробелы, знак плюса, валюту и разделители тысяч.
fn normalize_number(input: &str) -> String {
    input
        .chars()
        .filter(|ch| !matches!(*ch, ' ' | '\u{a0}' | '\u{202f}' | '+' | '$' | ','))
        .collect()
}

/// Разбирает денежное значение. Пустая ячейка считается ошибкой.
pub fn parse_money(value: &str, column: &'static str) -> Result<Money, WatcardError> {
    let normalized = normalize_number(value);
    Decimal::from_str(&normalized).map_err(|_| WatcardError::Number {
        value: value.trim().to_string(),
        column,
    })
}

/// Собирает дату `mm/dd/yyyy` и время `HH:MM:SS` в одну отметку.
pub fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, WatcardError> {
    let value = format!("{} {}", date.trim(), time.trim());
    NaiveDateTime::parse_from_str(&value, TIMESTAMP_FORMAT)
        .map_err(|_| WatcardError::Date { value })
}

/// Собирает текст всех потомков элемента и нормализует пробелы.
pub fn collect_text(element: ElementRef) -> String {
    normalize_chars(element.text().flat_map(|s| s.chars()))
}
