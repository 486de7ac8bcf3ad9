#![warn(missing_docs)]
//! Библиотека для выгрузки транзакций и балансов с портала WatCard
//! и построения отчётов по ним.

mod account;
mod accounts;
mod client;
mod config;
mod error;
mod export;
pub mod logging;
mod parser;
mod raw;
mod report;
mod types;
mod utils;

pub use crate::account::Watcard;
pub use crate::accounts::{ACCOUNTS, FLEX, MEALPLAN, account_name};
pub use crate::client::{
    AUTH_FAILURE_MARKER, Credentials, HttpPortal, Portal, PortalPage, check_auth, check_response,
};
pub use crate::config::{DEFAULT_ENDPOINT, Settings};
pub use crate::error::WatcardError;
pub use crate::export::{HOMEBANK_HEADERS, homebank_csv};
pub use crate::parser::{BALANCES_TABLE, TRANSACTIONS_TABLE, process_balance, process_transaction};
pub use crate::raw::{DomPage, RawPage};
pub use crate::report::{Snapshot, TransactionQuery};
pub use crate::types::*;
