//! Снимок данных счёта и отчёты, которые строятся по нему без обращения к порталу.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::accounts::{FLEX, MEALPLAN, anchor_code};
use crate::client::{Credentials, Portal};
use crate::error::WatcardError;
use crate::raw::{DomPage, RawPage};
use crate::types::{
    Balance, BalancePoint, HISTORY_HEADERS, Money, Punchcard, TRANSACTION_HEADERS, Table,
    Transaction,
};

/// Фильтр списка транзакций.
///
/// Граница `start` строгая, `end` включительная: `start < ts <= end`.
///
/// # Пример
///
/// ```
/// # use watcard::TransactionQuery;
/// let query = TransactionQuery::new().account("flex");
/// assert!(!query.is_unfiltered());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionQuery<'a> {
    /// Имя счёта из справочника.
    pub account: Option<&'a str>,
    /// Нижняя граница (не включая). По умолчанию минимальная дата.
    pub start: Option<NaiveDateTime>,
    /// Верхняя граница (включая). По умолчанию текущий момент.
    pub end: Option<NaiveDateTime>,
}

impl<'a> TransactionQuery<'a> {
    /// Фильтр без ограничений.
    #[inline]
    pub const fn new() -> Self {
        Self {
            account: None,
            start: None,
            end: None,
        }
    }

    /// Оставляет только транзакции счёта.
    #[inline]
    pub const fn account(mut self, account: &'a str) -> Self {
        self.account = Some(account);
        self
    }

    /// Задаёт нижнюю границу.
    #[inline]
    pub const fn start(mut self, start: NaiveDateTime) -> Self {
        self.start = Some(start);
        self
    }

    /// Задаёт верхнюю границу.
    #[inline]
    pub const fn end(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Не задано ни одного условия.
    #[inline]
    pub const fn is_unfiltered(&self) -> bool {
        self.account.is_none() && self.start.is_none() && self.end.is_none()
    }

    fn matches(&self, tx: &Transaction, now: NaiveDateTime) -> bool {
        let start = self.start.unwrap_or(NaiveDateTime::MIN);
        let end = self.end.unwrap_or(now);
        start < tx.timestamp
            && tx.timestamp <= end
            && self.account.is_none_or(|account| tx.account == account)
    }
}

/// Данные счёта, загруженные за одно обновление.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Балансы подсчетов в порядке портала.
    pub balances: Table<Balance>,
    /// История операций в порядке портала.
    pub transactions: Table<Transaction>,
}

impl Snapshot {
    /// Собирает снимок из уже загруженных страниц.
    pub fn from_pages(balances: &RawPage, transactions: &RawPage) -> Result<Self, WatcardError> {
        Ok(Self {
            balances: DomPage::parse(balances).balances()?,
            transactions: DomPage::parse(transactions).transactions()?,
        })
    }

    /// Загружает и разбирает обе страницы. Любая ошибка прерывает загрузку целиком.
    pub fn fetch<P: Portal + ?Sized>(
        portal: &P,
        credentials: &Credentials,
    ) -> Result<Self, WatcardError> {
        let balances = portal.fetch_balances(credentials)?;
        let transactions = portal.fetch_transactions(credentials)?;
        Self::from_pages(&balances, &transactions)
    }

    /// Строка баланса с указанным кодом.
    pub fn balance(&self, code: char) -> Option<&Balance> {
        self.balances.iter().find(|b| b.code == code)
    }

    /// Опорный баланс для счёта `mealplan` или `flex`.
    pub fn anchor_balance(&self, account: &str) -> Result<Money, WatcardError> {
        let (code, name) =
            anchor_code(account).ok_or_else(|| WatcardError::UnsupportedAccount {
                account: account.to_string(),
            })?;
        self.balance(code)
            .map(|b| b.amount)
            .ok_or(WatcardError::MissingBalance { account: name })
    }

    /// Баланс счёта питания.
    #[inline]
    pub fn mealplan(&self) -> Result<Money, WatcardError> {
        self.anchor_balance(MEALPLAN)
    }

    /// Баланс flex-долларов.
    #[inline]
    pub fn flex(&self) -> Result<Money, WatcardError> {
        self.anchor_balance(FLEX)
    }

    /// Транзакции по фильтру; отсутствующая верхняя граница — текущий момент.
    #[inline]
    pub fn transactions(&self, query: &TransactionQuery) -> Table<&Transaction> {
        self.transactions_at(query, Local::now().naive_local())
    }

    /// То же, что [`Self::transactions`], с явным «сейчас».
    pub fn transactions_at(
        &self,
        query: &TransactionQuery,
        now: NaiveDateTime,
    ) -> Table<&Transaction> {
        let rows = if query.is_unfiltered() {
            self.transactions.iter().collect()
        } else {
            self.transactions
                .iter()
                .filter(|tx| query.matches(tx, now))
                .collect()
        };
        Table {
            headers: TRANSACTION_HEADERS,
            rows,
        }
    }

    /// История баланса `mealplan` или `flex` по дням, от `end` (по умолчанию
    /// сегодня) назад к самой ранней транзакции.
    #[inline]
    pub fn balance_history(
        &self,
        account: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        coalesce_days: u32,
    ) -> Result<Table<BalancePoint>, WatcardError> {
        let today = Local::now().date_naive();
        self.balance_history_at(account, start, end.unwrap_or(today), coalesce_days)
    }

    /// Восстанавливает остатки на начало дня, откатывая операции от текущего баланса.
    ///
    /// Учитываются транзакции счёта с датой в `[start, end]`; они должны идти
    /// по невозрастанию даты. Точки идут с шагом `coalesce_days` от `end`,
    /// последняя точка приходится на день самой ранней транзакции.
    pub fn balance_history_at(
        &self,
        account: &str,
        start: Option<NaiveDate>,
        end: NaiveDate,
        coalesce_days: u32,
    ) -> Result<Table<BalancePoint>, WatcardError> {
        if coalesce_days == 0 {
            return Err(WatcardError::EmptyWindow);
        }
        let anchor = self.anchor_balance(account)?;
        let step = TimeDelta::days(i64::from(coalesce_days));

        let mut history = Table::new(HISTORY_HEADERS);
        let mut cursor = Some(end);
        let mut replayed = Decimal::ZERO;
        let mut previous: Option<NaiveDate> = None;

        let visible = self.transactions.iter().filter(|tx| {
            let date = tx.timestamp.date();
            tx.account == account && date <= end && start.is_none_or(|s| date >= s)
        });
        for tx in visible {
            let date = tx.timestamp.date();
            if let Some(prev) = previous.filter(|prev| date > *prev) {
                return Err(WatcardError::UnorderedTransactions {
                    previous: prev,
                    next: date,
                });
            }
            previous = Some(date);

            while let Some(day) = cursor.filter(|day| date < *day) {
                history.rows.push(BalancePoint {
                    date: day,
                    balance: anchor - replayed,
                });
                // Шаг за пределы календаря: дальнейших точек нет.
                cursor = day.checked_sub_signed(step);
            }
            replayed += tx.amount;
        }

        if let (Some(_), Some(day)) = (previous, cursor) {
            history.rows.push(BalancePoint {
                date: day,
                balance: anchor - replayed,
            });
        }
        Ok(history)
    }

    /// Средний дневной расход за последние `days` дней. Пополнения не учитываются.
    #[inline]
    pub fn mean_daily_spend(&self, days: u32, account: Option<&str>) -> Result<f64, WatcardError> {
        self.mean_daily_spend_at(days, account, Local::now().naive_local())
    }

    /// То же, что [`Self::mean_daily_spend`], с явным «сейчас».
    pub fn mean_daily_spend_at(
        &self,
        days: u32,
        account: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<f64, WatcardError> {
        if days == 0 {
            return Err(WatcardError::EmptyWindow);
        }
        let query = TransactionQuery {
            account,
            // Окно за пределами календаря chrono охватывает всю историю.
            start: Some(
                now.checked_sub_signed(TimeDelta::days(i64::from(days)))
                    .unwrap_or(NaiveDateTime::MIN),
            ),
            end: None,
        };
        let spent: Money = self
            .transactions_at(&query, now)
            .iter()
            .map(|tx| tx.amount)
            .filter(|amount| *amount < Decimal::ZERO)
            .sum();
        Ok((spent / Decimal::from(days)).to_f64().unwrap_or_default())
    }

    /// Гистограмма операций по часу суток и дню недели.
    pub fn punchcard(&self, account: Option<&str>) -> Punchcard {
        let query = TransactionQuery {
            account,
            ..TransactionQuery::new()
        };
        let mut card = Punchcard::default();
        for tx in &self.transactions(&query) {
            let hour = tx.timestamp.hour() as usize;
            let weekday = tx.timestamp.weekday().num_days_from_monday() as usize;
            card.counts[hour][weekday] += 1;
        }
        card
    }
}
