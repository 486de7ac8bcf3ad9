//! Счёт WatCard одного владельца: учётные данные, кэш и отчёты.

use std::fmt;

use chrono::NaiveDate;

use crate::client::{Credentials, HttpPortal, Portal};
use crate::error::WatcardError;
use crate::export::homebank_csv;
use crate::report::{Snapshot, TransactionQuery};
use crate::types::{Balance, BalancePoint, Money, Punchcard, Table, Transaction};

/// Счёт одного владельца карты.
///
/// Хранит учётные данные и снимок, полученный последним успешным
/// [`Watcard::refresh`]. Отчёты читают только снимок и в сеть не ходят.
pub struct Watcard<P = HttpPortal> {
    portal: P,
    credentials: Credentials,
    snapshot: Snapshot,
}

impl<P> fmt::Debug for Watcard<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcard")
            .field("userid", &self.credentials.userid)
            .field("balances", &self.snapshot.balances.len())
            .field("transactions", &self.snapshot.transactions.len())
            .finish_non_exhaustive()
    }
}

impl<P: Portal> Watcard<P> {
    /// Создаёт счёт и сразу загружает данные с портала.
    pub fn connect(portal: P, credentials: Credentials) -> Result<Self, WatcardError> {
        let snapshot = Snapshot::fetch(&portal, &credentials)?;
        tracing::info!(
            userid = %credentials.userid,
            balances = snapshot.balances.len(),
            transactions = snapshot.transactions.len(),
            "watcard loaded"
        );
        Ok(Self {
            portal,
            credentials,
            snapshot,
        })
    }

    /// Создаёт счёт из готового снимка, не обращаясь к порталу.
    pub fn from_snapshot(portal: P, credentials: Credentials, snapshot: Snapshot) -> Self {
        Self {
            portal,
            credentials,
            snapshot,
        }
    }

    /// Перезагружает балансы и историю операций.
    ///
    /// Снимок заменяется целиком только после успешной загрузки и разбора обеих
    /// страниц; при ошибке остаётся прежний.
    pub fn refresh(&mut self) -> Result<(), WatcardError> {
        let snapshot = Snapshot::fetch(&self.portal, &self.credentials)?;
        tracing::info!(
            userid = %self.credentials.userid,
            balances = snapshot.balances.len(),
            transactions = snapshot.transactions.len(),
            "watcard refreshed"
        );
        self.snapshot = snapshot;
        Ok(())
    }
}

impl<P> Watcard<P> {
    /// Источник страниц.
    #[inline]
    pub const fn portal(&self) -> &P {
        &self.portal
    }

    /// Учётные данные.
    #[inline]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Текущий снимок.
    #[inline]
    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Балансы всех известных подсчетов.
    #[inline]
    pub const fn balances(&self) -> &Table<Balance> {
        &self.snapshot.balances
    }

    /// Баланс счёта питания.
    #[inline]
    pub fn mealplan(&self) -> Result<Money, WatcardError> {
        self.snapshot.mealplan()
    }

    /// Баланс flex-долларов.
    #[inline]
    pub fn flex(&self) -> Result<Money, WatcardError> {
        self.snapshot.flex()
    }

    /// Транзакции по фильтру. Пустой фильтр возвращает всю историю.
    #[inline]
    pub fn transactions(&self, query: &TransactionQuery) -> Table<&Transaction> {
        self.snapshot.transactions(query)
    }

    /// История баланса `mealplan` или `flex`.
    #[inline]
    pub fn balance_history(
        &self,
        account: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        coalesce_days: u32,
    ) -> Result<Table<BalancePoint>, WatcardError> {
        self.snapshot.balance_history(account, start, end, coalesce_days)
    }

    /// Средний дневной расход за последние `days` дней.
    #[inline]
    pub fn mean_daily_spend(&self, days: u32, account: Option<&str>) -> Result<f64, WatcardError> {
        self.snapshot.mean_daily_spend(days, account)
    }

    /// Гистограмма операций по часу и дню недели.
    #[inline]
    pub fn punchcard(&self, account: Option<&str>) -> Punchcard {
        self.snapshot.punchcard(account)
    }

    /// Выгрузка операций счёта в формате HomeBank.
    #[inline]
    pub fn homebank_csv(&self, account: &str) -> Result<String, WatcardError> {
        homebank_csv(&self.snapshot.transactions, account)
    }
}
