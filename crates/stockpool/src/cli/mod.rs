//! `stockpool` command-line front end.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

pub mod admin_cmd;
pub mod client_cmd;
pub mod sale_cmd;
pub mod stock_cmd;

use std::io::{self, Write};
use std::time::Duration;

use clap::Subcommand;
use stockpool_core::Config;

use crate::auth::Caller;
use crate::error::Error;
use crate::service::Stockpool;
use crate::storage::Sale;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Longest wait for order notifications before the process exits. Covers
/// one webhook request timeout.
const NOTIFICATION_FLUSH_TIMEOUT: Duration = Duration::from_secs(15);

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Client flow: browse services, place orders, view subscriptions
    Client {
        #[command(subcommand)]
        action: client_cmd::ClientAction,
    },
    /// Manage the shared-account inventory (admin)
    Stock {
        #[command(subcommand)]
        action: stock_cmd::StockAction,
    },
    /// Fulfill pending orders (admin)
    Sale {
        #[command(subcommand)]
        action: sale_cmd::SaleAction,
    },
    /// Administrative utilities and reports
    Admin {
        #[command(subcommand)]
        action: admin_cmd::AdminAction,
    },
}

/// Credentials supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    pub admin_password: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
}

impl Identity {
    fn admin(&self, pool: &Stockpool) -> anyhow::Result<Caller> {
        let password = self.admin_password.as_deref().ok_or_else(|| {
            anyhow::anyhow!("admin password required (--admin-password or STOCKPOOL_ADMIN_PASSWORD)")
        })?;
        Ok(pool.login_admin(password)?)
    }

    async fn client(&self, pool: &Stockpool) -> anyhow::Result<Caller> {
        let phone = self
            .phone
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("phone required (--phone or STOCKPOOL_PHONE)"))?;
        Ok(pool.login_client(phone, self.name.as_deref()).await?)
    }
}

/// Execute a top-level subcommand.
pub async fn run(command: Commands, identity: &Identity, config: &Config) -> anyhow::Result<()> {
    // Hashing a password needs neither a database nor a login.
    if let Commands::Admin {
        action: admin_cmd::AdminAction::HashPassword { password },
    } = &command
    {
        return admin_cmd::hash(password);
    }

    let pool = Stockpool::open(config).await?;
    run_with(&pool, command, identity).await
}

/// Execute a subcommand against an open service, then wait for the order
/// notifications it started.
pub async fn run_with(
    pool: &Stockpool,
    command: Commands,
    identity: &Identity,
) -> anyhow::Result<()> {
    let result = execute(pool, command, identity).await;
    pool.flush_notifications(NOTIFICATION_FLUSH_TIMEOUT).await;
    result
}

async fn execute(pool: &Stockpool, command: Commands, identity: &Identity) -> anyhow::Result<()> {
    match command {
        Commands::Client { action } => {
            let caller = match action {
                client_cmd::ClientAction::Catalog => Caller::Anonymous,
                _ => identity.client(pool).await?,
            };
            client_cmd::run(pool, &caller, action).await
        }
        Commands::Stock { action } => {
            let caller = identity.admin(pool)?;
            stock_cmd::run(pool, &caller, action).await
        }
        Commands::Sale { action } => {
            let caller = identity.admin(pool)?;
            sale_cmd::run(pool, &caller, action).await
        }
        Commands::Admin { action } => {
            let caller = identity.admin(pool)?;
            admin_cmd::run(pool, &caller, action).await
        }
    }
}

/// Human-readable message for an engine error.
pub fn describe_error(err: &Error) -> String {
    match err {
        Error::SaleNotEligible { sale_id } => {
            format!("Sale {sale_id} is no longer waiting for stock (missing or already assigned).")
        }
        Error::StockNotEligible { stock_item_id } => format!(
            "Stock item {stock_item_id} cannot be used: it is missing, already assigned, or for another service."
        ),
        Error::NotFound(what) => format!("Not found: {what}."),
        Error::Validation(msg) => format!("Invalid input: {msg}."),
        Error::InvalidState(msg) => format!("Not allowed right now: {msg}."),
        Error::Forbidden(_) => "Permission denied.".to_string(),
        Error::Transient(_) => "The database is busy; please try again.".to_string(),
        Error::Config(msg) => format!("Configuration problem: {msg}."),
        Error::Storage(msg) => format!("Storage failure: {msg}"),
    }
}

pub(crate) fn days(count: u32) -> Duration {
    Duration::from_secs(u64::from(count) * SECS_PER_DAY)
}

pub(crate) fn write_sale_header(out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "{:<6}  {:<6}  {:<16}  {:<8}  {:<6}  {:<12}  {:<12}",
        "SALE", "CLIENT", "SERVICE", "STATUS", "STOCK", "START", "END"
    )
}

pub(crate) fn write_sale_row(out: &mut impl Write, sale: &Sale) -> io::Result<()> {
    writeln!(
        out,
        "{:<6}  {:<6}  {:<16}  {:<8}  {:<6}  {:<12}  {:<12}",
        sale.id,
        sale.client_id,
        truncate(&sale.service, 16),
        sale.status.as_str(),
        opt_display(sale.stock_item_id),
        opt_display(sale.start_time),
        opt_display(sale.end_time),
    )
}

pub(crate) fn write_sales(out: &mut impl Write, sales: &[Sale], empty: &str) -> io::Result<()> {
    if sales.is_empty() {
        return writeln!(out, "{empty}");
    }
    write_sale_header(out)?;
    for sale in sales {
        write_sale_row(out, sale)?;
    }
    writeln!(out, "\n{} sale(s)", sales.len())
}

fn opt_display(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Truncate to at most `max` characters, marking the cut with `~`.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use stockpool_core::ManualClock;

    use super::*;
    use crate::notifications::tests::RecordingNotifier;
    use crate::storage::{Database, SaleStatus};

    #[tokio::test]
    async fn order_command_returns_after_notification_is_delivered() {
        let notifier = Arc::new(RecordingNotifier {
            delay: Duration::from_millis(50),
            ..Default::default()
        });
        let db = Database::open_in_memory().await.unwrap();
        let pool = Stockpool::new(
            db,
            Arc::new(ManualClock::new(1_750_000_000)),
            &Config::default(),
            notifier.clone(),
        );
        let identity = Identity {
            phone: Some("987654321".to_string()),
            name: Some("Ana".to_string()),
            ..Default::default()
        };

        run_with(
            &pool,
            Commands::Client {
                action: client_cmd::ClientAction::Order {
                    service: "Netflix".to_string(),
                    payment_ref: Some("OP-9".to_string()),
                },
            },
            &identity,
        )
        .await
        .unwrap();

        let seen = notifier.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].service, "Netflix");
        assert_eq!(seen[0].client_name, "Ana");
    }

    #[tokio::test]
    async fn admin_command_without_password_is_rejected() {
        let db = Database::open_in_memory().await.unwrap();
        let pool = Stockpool::new(
            db,
            Arc::new(ManualClock::new(1_750_000_000)),
            &Config::default(),
            Arc::new(RecordingNotifier::default()),
        );

        let err = run_with(
            &pool,
            Commands::Sale {
                action: sale_cmd::SaleAction::Pending,
            },
            &Identity::default(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("admin password required"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("Netflix", 16), "Netflix");
        assert_eq!(truncate("Disney Plus Premium", 8), "Disney ~");
    }

    #[test]
    fn describe_maps_kinds_to_messages() {
        assert!(describe_error(&Error::StockNotEligible { stock_item_id: 4 }).contains("Stock item 4"));
        assert_eq!(
            describe_error(&Error::Forbidden("admin capability required".into())),
            "Permission denied."
        );
        assert_eq!(
            describe_error(&Error::Validation("service is required".into())),
            "Invalid input: service is required."
        );
    }

    #[test]
    fn pending_sale_row_shows_dashes() {
        let sale = Sale {
            id: 3,
            client_id: 1,
            stock_item_id: None,
            service: "Netflix".into(),
            payment_reference: None,
            status: SaleStatus::Pending,
            start_time: None,
            end_time: None,
            created_at: 0,
        };
        let mut buf = Vec::new();
        write_sales(&mut buf, &[sale], "none").unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("pending"));
        assert!(text.contains("1 sale(s)"));
    }

    #[test]
    fn days_converts_to_seconds() {
        assert_eq!(days(30), Duration::from_secs(2_592_000));
    }
}
