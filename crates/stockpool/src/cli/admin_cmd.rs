//! Admin utilities and reports.

use std::io::{self, Write};

use clap::Subcommand;

use super::{days, write_sales};
use crate::auth::Caller;
use crate::auth::password::hash_password;
use crate::service::Stockpool;

#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// Print an argon2 hash for the admin password setting
    HashPassword {
        /// Password to hash
        password: String,
    },
    /// Sales ending soon (already expired ones included)
    Expiring {
        /// Window in days (defaults to the configured window)
        #[arg(long)]
        days: Option<u32>,
    },
}

pub fn hash(password: &str) -> anyhow::Result<()> {
    let hash = hash_password(password).map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;
    writeln!(io::stdout(), "{hash}")?;
    Ok(())
}

/// Execute an admin subcommand that needs the database.
pub async fn run(pool: &Stockpool, caller: &Caller, action: AdminAction) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        AdminAction::HashPassword { password } => hash(&password)?,
        AdminAction::Expiring { days: count } => {
            let sales = match count {
                Some(count) => pool.report_expiring_within(caller, days(count)).await?,
                None => pool.report_expiring_soon(caller).await?,
            };
            write_sales(&mut out, &sales, "Nothing expiring.")?;
        }
    }
    Ok(())
}
