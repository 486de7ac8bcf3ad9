use std::cell::Cell;

use chrono::{NaiveDate, NaiveDateTime};
use watcard::{
    Balance, BalancePoint, Credentials, Money, Portal, PortalPage, RawPage, Snapshot, Table,
    Transaction, TransactionQuery, Watcard, WatcardError, check_auth, check_response,
};

fn fixture(name: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(path).expect("read fixture")
}

fn money(s: &str) -> Money {
    s.parse().expect("valid decimal")
}

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").expect("valid timestamp")
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

fn tx(timestamp: &str, amount: &str, account: &'static str) -> Transaction {
    Transaction {
        timestamp: ts(timestamp),
        amount: money(amount),
        account,
        terminal: "TEST TERMINAL".to_string(),
    }
}

fn snapshot(balances: Vec<Balance>, transactions: Vec<Transaction>) -> Snapshot {
    let mut snapshot = Snapshot::default();
    snapshot.balances.rows = balances;
    snapshot.transactions.rows = transactions;
    snapshot
}

fn balance(code: char, amount: &str) -> Balance {
    Balance {
        code,
        account: "ANCHOR".to_string(),
        amount: money(amount),
    }
}

/// Портал, отдающий страницы из `tests/fixtures`.
struct FixturePortal {
    transactions: String,
    balances: String,
    fetches: Cell<usize>,
    broken: Cell<bool>,
}

impl FixturePortal {
    fn new() -> Self {
        Self {
            transactions: fixture("transactions.html"),
            balances: fixture("balances.html"),
            fetches: Cell::new(0),
            broken: Cell::new(false),
        }
    }
}

impl Portal for FixturePortal {
    fn fetch(&self, page: PortalPage, credentials: &Credentials) -> Result<RawPage, WatcardError> {
        self.fetches.set(self.fetches.get() + 1);
        if credentials.pin != "1234" {
            return check_auth(fixture("auth_failure.html"));
        }
        let body = match page {
            PortalPage::Balances => self.balances.clone(),
            PortalPage::Transactions if self.broken.get() => fixture("maintenance.html"),
            PortalPage::Transactions => self.transactions.clone(),
        };
        check_auth(body)
    }
}

fn connect() -> Watcard<FixturePortal> {
    Watcard::connect(FixturePortal::new(), Credentials::new("20123456", "1234"))
        .expect("connect with fixture portal")
}

#[test]
fn connect_caches_balances_and_transactions() {
    let card = connect();
    assert_eq!(card.credentials().userid, "20123456");
    assert_eq!(card.balances().len(), 5);
    assert_eq!(card.mealplan().unwrap(), money("1234.56"));
    assert_eq!(card.flex().unwrap(), money("87.40"));

    let all = card.transactions(&TransactionQuery::new());
    assert_eq!(all.len(), card.snapshot().transactions.len());
    for (listed, cached) in all.iter().zip(card.snapshot().transactions.iter()) {
        assert!(std::ptr::eq(*listed, cached));
    }
}

#[test]
fn bad_pin_is_authentication_error() {
    let portal = FixturePortal::new();
    let err = Watcard::connect(portal, Credentials::new("20123456", "0000")).unwrap_err();
    assert!(matches!(err, WatcardError::Authentication));
}

#[test]
fn check_auth_detects_marker() {
    assert!(matches!(
        check_auth(fixture("auth_failure.html")),
        Err(WatcardError::Authentication)
    ));
    let page = check_auth(fixture("balances.html")).expect("regular page");
    assert!(page.html.contains("oneweb_balance_information_table"));
}

#[test]
fn failed_refresh_keeps_previous_snapshot() {
    let mut card = connect();
    let before = card.snapshot().clone();

    card.refresh().expect("refresh with fixtures");
    assert_eq!(card.snapshot(), &before);

    let mut card = Watcard::from_snapshot(
        FixturePortal {
            broken: Cell::new(true),
            ..FixturePortal::new()
        },
        Credentials::new("20123456", "1234"),
        before.clone(),
    );
    let err = card.refresh().unwrap_err();
    assert!(err.is_parse_error());
    assert_eq!(card.snapshot(), &before);
}

#[test]
fn refresh_with_rejected_pin_keeps_previous_snapshot() {
    let before = connect().snapshot().clone();
    let mut card = Watcard::from_snapshot(
        FixturePortal::new(),
        Credentials::new("20123456", "0000"),
        before.clone(),
    );
    let err = card.refresh().unwrap_err();
    assert!(matches!(err, WatcardError::Authentication));
    assert_eq!(card.snapshot(), &before);
    assert_eq!(card.portal().fetches.get(), 1);
}

#[test]
fn rejection_page_wins_over_http_status() {
    assert!(matches!(
        check_response(401, fixture("auth_failure.html")),
        Err(WatcardError::Authentication)
    ));
    assert!(matches!(
        check_response(503, fixture("maintenance.html")),
        Err(WatcardError::Status { status: 503 })
    ));
    let page = check_response(200, fixture("balances.html")).expect("regular page");
    assert!(page.html.contains("oneweb_balance_information_table"));
}

#[test]
fn reports_do_not_touch_the_portal() {
    let card = connect();
    assert_eq!(card.portal().fetches.get(), 2);
    let _ = card.transactions(&TransactionQuery::new().account("flex"));
    let _ = card.punchcard(None);
    let _ = card.mean_daily_spend(7, None);
    let _ = card.balance_history("mealplan", None, Some(date("2026-10-14")), 1);
    let _ = card.homebank_csv("mealplan");
    assert_eq!(card.portal().fetches.get(), 2);
}

#[test]
fn filter_uses_half_open_interval() {
    let snapshot = snapshot(
        vec![],
        vec![
            tx("2024-03-03 12:00:00", "-3.00", "mealplan"),
            tx("2024-03-02 12:00:00", "-2.00", "flex"),
            tx("2024-03-01 12:00:00", "-1.00", "mealplan"),
        ],
    );
    let now = ts("2024-03-10 00:00:00");
    let query = TransactionQuery::new()
        .start(ts("2024-03-01 12:00:00"))
        .end(ts("2024-03-03 12:00:00"));
    let table = snapshot.transactions_at(&query, now);
    let amounts: Vec<Money> = table.iter().map(|tx| tx.amount).collect();
    assert_eq!(amounts, [money("-3.00"), money("-2.00")]);

    let table = snapshot.transactions_at(&query.account("mealplan"), now);
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows[0].amount, money("-3.00"));

    // Верхняя граница по умолчанию — «сейчас».
    let early = ts("2024-03-02 12:00:00");
    let table = snapshot.transactions_at(&TransactionQuery::new().account("flex"), early);
    assert_eq!(table.len(), 1);
    let table = snapshot.transactions_at(&TransactionQuery::new().account("mealplan"), early);
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows[0].timestamp, ts("2024-03-01 12:00:00"));
}

#[test]
fn mealplan_history_replays_backwards() {
    let card = connect();
    let history = card
        .balance_history("mealplan", None, Some(date("2026-10-14")), 1)
        .expect("history");
    assert_eq!(history.headers, ["Date", "Balance"]);
    assert_eq!(history.len(), 10);
    assert_eq!(
        history.rows[0],
        BalancePoint {
            date: date("2026-10-14"),
            balance: money("1240.81"),
        }
    );
    assert_eq!(history.rows[2].date, date("2026-10-12"));
    assert_eq!(history.rows[2].balance, money("1245.56"));
    assert_eq!(history.rows[8].date, date("2026-10-06"));
    assert_eq!(history.rows[8].balance, money("1245.56"));

    // Самая ранняя точка: опорный баланс минус все откатанные операции.
    let last = history.rows.last().unwrap();
    assert_eq!(last.date, date("2026-10-05"));
    assert_eq!(last.balance, money("1234.56") - money("-13.00"));
}

#[test]
fn coalesced_history_keeps_every_transaction() {
    let card = connect();
    let history = card
        .balance_history("mealplan", None, Some(date("2026-10-14")), 3)
        .expect("history");
    let dates: Vec<NaiveDate> = history.iter().map(|p| p.date).collect();
    assert_eq!(
        dates,
        [
            date("2026-10-14"),
            date("2026-10-11"),
            date("2026-10-08"),
            date("2026-10-05"),
        ]
    );
    assert_eq!(history.rows[0].balance, money("1240.81"));
    assert_eq!(history.rows[1].balance, money("1245.56"));
    assert_eq!(history.rows[3].balance, money("1247.56"));
}

#[test]
fn flex_history_counts_deposits() {
    let card = connect();
    let history = card
        .balance_history("flex", Some(date("2026-10-01")), Some(date("2026-10-13")), 1)
        .expect("history");
    assert_eq!(
        history.rows,
        [
            BalancePoint {
                date: date("2026-10-13"),
                balance: money("90.90"),
            },
            BalancePoint {
                date: date("2026-10-12"),
                balance: money("40.90"),
            },
        ]
    );
}

#[test]
fn history_rejects_unsupported_and_unordered_input() {
    let card = connect();
    assert!(matches!(
        card.balance_history("FLEXIBLE", None, None, 1),
        Err(WatcardError::UnsupportedAccount { ref account }) if account == "FLEXIBLE"
    ));
    assert!(matches!(
        card.balance_history("mealplan", None, None, 0),
        Err(WatcardError::EmptyWindow)
    ));

    let ascending = snapshot(
        vec![balance('1', "10.00")],
        vec![
            tx("2024-03-01 08:00:00", "-1.00", "mealplan"),
            tx("2024-03-02 08:00:00", "-1.00", "mealplan"),
        ],
    );
    assert!(matches!(
        ascending.balance_history_at("mealplan", None, date("2024-03-05"), 1),
        Err(WatcardError::UnorderedTransactions { previous, next })
            if previous == date("2024-03-01") && next == date("2024-03-02")
    ));

    let no_anchor = snapshot(vec![balance('5', "1.00")], vec![]);
    assert!(matches!(
        no_anchor.flex(),
        Err(WatcardError::MissingBalance { account: "flex" })
    ));
}

#[test]
fn history_round_trip_from_anchor() {
    let snapshot = snapshot(
        vec![balance('4', "100.00")],
        vec![
            tx("2024-05-20 18:00:00", "-7.25", "flex"),
            tx("2024-05-20 09:00:00", "-2.75", "flex"),
            tx("2024-05-18 10:00:00", "25.00", "flex"),
            tx("2024-05-17 10:00:00", "-3.10", "mealplan"),
            tx("2024-05-15 13:30:00", "-4.40", "flex"),
        ],
    );
    let history = snapshot
        .balance_history_at("flex", None, date("2024-05-21"), 1)
        .expect("history");
    let delta: Money = ["-7.25", "-2.75", "25.00", "-4.40"]
        .into_iter()
        .map(money)
        .sum();
    let earliest = history.rows.last().unwrap();
    assert_eq!(earliest.date, date("2024-05-15"));
    assert_eq!(earliest.balance, money("100.00") - delta);
    assert_eq!(history.rows[0].balance, money("100.00"));
    assert_eq!(history.rows[1].balance, money("110.00"));
}

#[test]
fn mean_daily_spend_ignores_deposits() {
    let snapshot = snapshot(
        vec![],
        vec![
            tx("2024-03-09 12:00:00", "50.00", "flex"),
            tx("2024-03-08 12:00:00", "-20.00", "flex"),
            tx("2024-02-01 12:00:00", "-99.00", "flex"),
        ],
    );
    let now = ts("2024-03-10 00:00:00");
    let mean = snapshot.mean_daily_spend_at(7, None, now).expect("mean");
    assert!((mean - (-20.0 / 7.0)).abs() < 1e-9);

    let mean = snapshot
        .mean_daily_spend_at(7, Some("mealplan"), now)
        .expect("mean");
    assert!(mean.abs() < f64::EPSILON);

    assert!(matches!(
        snapshot.mean_daily_spend_at(0, None, now),
        Err(WatcardError::EmptyWindow)
    ));
}

#[test]
fn punchcard_counts_hour_and_weekday() {
    let snapshot = snapshot(
        vec![],
        vec![
            tx("2024-03-05 15:20:00", "-1.00", "flex"),
            tx("2024-03-04 09:40:00", "-1.00", "mealplan"),
            tx("2024-03-04 09:05:00", "-1.00", "mealplan"),
        ],
    );
    let card = snapshot.punchcard(None);
    assert_eq!(card.headers[0], "Monday");
    assert_eq!(card.headers.len(), 7);
    assert_eq!(card.count(9, 0), Some(2));
    assert_eq!(card.count(15, 1), Some(1));
    assert_eq!(card.count(24, 0), None);
    assert_eq!(card.count(0, 7), None);
    assert_eq!(card.total(), 3);
    assert_eq!(card.cells().count(), 24 * 7);
    assert_eq!(card.cells().position(|c| c == 2), Some(9 * 7));

    let mealplan = snapshot.punchcard(Some("mealplan"));
    assert_eq!(mealplan.total(), 2);
    assert_eq!(mealplan.count(15, 1), Some(0));
}

#[test]
fn homebank_export_uses_requested_account() {
    let card = connect();
    let csv = card.homebank_csv("flex").expect("export");
    assert_eq!(
        csv,
        "date;paymode;info;payee;description;amount;category\n\
         13-10-26;6;;;TIM HORTONS SLC;-3.50;flex\n\
         12-10-26;6;;;WEB DEPOSIT;50.00;flex\n"
    );

    let empty: Table<Transaction> = Table::default();
    let csv = watcard::homebank_csv(&empty, "mealplan").expect("export");
    assert_eq!(csv, "date;paymode;info;payee;description;amount;category\n");
}

#[test]
fn oversized_coalesce_stops_at_calendar_edge() {
    let snapshot = snapshot(
        vec![balance('1', "10.00")],
        vec![tx("2024-03-01 08:00:00", "-1.00", "mealplan")],
    );
    let history = snapshot
        .balance_history_at("mealplan", None, date("2024-03-05"), u32::MAX)
        .expect("history");
    assert_eq!(
        history.rows,
        [BalancePoint {
            date: date("2024-03-05"),
            balance: money("10.00"),
        }]
    );
}

#[test]
fn oversized_mean_window_covers_whole_history() {
    let snapshot = snapshot(
        vec![],
        vec![
            tx("2024-03-08 12:00:00", "-20.00", "flex"),
            tx("1999-01-01 12:00:00", "-10.00", "flex"),
        ],
    );
    let now = ts("2024-03-10 00:00:00");
    let mean = snapshot
        .mean_daily_spend_at(u32::MAX, None, now)
        .expect("mean");
    assert!((mean - (-30.0 / f64::from(u32::MAX))).abs() < 1e-15);
}
