//! CLI: загружает данные WatCard и печатает балансы, операции и отчёты.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};

use watcard::{Credentials, HttpPortal, Settings, TransactionQuery, Watcard, logging};

#[derive(Debug, Parser)]
#[command(name = "watcard", version, about = "Transactions and balances from the WatCard portal")]
struct Cli {
    /// JSON file with endpoint, timeout_secs and log_level.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Waterloo ID number.
    #[arg(long, env = "WATCARD_USERID")]
    userid: String,
    /// WatCard PIN.
    #[arg(long, env = "WATCARD_PIN", hide_env_values = true)]
    pin: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every known sub-account balance.
    Balances,
    /// List transactions, optionally filtered.
    Transactions {
        #[arg(long)]
        account: Option<String>,
        /// Exclusive lower bound, `YYYY-MM-DDTHH:MM:SS`.
        #[arg(long)]
        start: Option<NaiveDateTime>,
        /// Inclusive upper bound, `YYYY-MM-DDTHH:MM:SS`.
        #[arg(long)]
        end: Option<NaiveDateTime>,
    },
    /// Day-by-day balance history of `mealplan` or `flex`.
    History {
        #[arg(long)]
        account: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value_t = 1)]
        coalesce: u32,
    },
    /// Mean daily spending over the trailing window.
    Mean {
        #[arg(long)]
        days: u32,
        #[arg(long)]
        account: Option<String>,
    },
    /// Transaction counts per hour of the week.
    Punchcard {
        #[arg(long)]
        account: Option<String>,
    },
    /// HomeBank CSV export for one account.
    Export {
        #[arg(long)]
        account: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    logging::init(&settings.log_level);

    let portal = HttpPortal::new(&settings)?;
    let card = Watcard::connect(portal, Credentials::new(cli.userid, cli.pin))?;

    match cli.command {
        Command::Balances => {
            for balance in card.balances() {
                println!("{}\t{}\t{}", balance.code, balance.account, balance.amount);
            }
        }
        Command::Transactions {
            account,
            start,
            end,
        } => {
            let query = TransactionQuery {
                account: account.as_deref(),
                start,
                end,
            };
            for tx in &card.transactions(&query) {
                println!(
                    "{}\t{}\t{}\t{}",
                    tx.timestamp, tx.amount, tx.account, tx.terminal
                );
            }
        }
        Command::History {
            account,
            start,
            end,
            coalesce,
        } => {
            for point in &card.balance_history(&account, start, end, coalesce)? {
                println!("{}\t{}", point.date, point.balance);
            }
        }
        Command::Mean { days, account } => {
            let mean = card.mean_daily_spend(days, account.as_deref())?;
            println!("{mean:.2}");
        }
        Command::Punchcard { account } => {
            let card = card.punchcard(account.as_deref());
            println!("hour\t{}", card.headers.join("\t"));
            for (hour, row) in card.counts.iter().enumerate() {
                let cells: Vec<String> = row.iter().map(u32::to_string).collect();
                println!("{hour}\t{}", cells.join("\t"));
            }
        }
        Command::Export { account } => {
            print!("{}", card.homebank_csv(&account)?);
        }
    }
    Ok(())
}
