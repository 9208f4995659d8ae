//! Client subcommands.

use std::io::{self, Write};

use clap::Subcommand;

use super::write_sales;
use crate::auth::Caller;
use crate::service::Stockpool;

#[derive(Subcommand, Debug)]
pub enum ClientAction {
    /// List services with stock on hand
    Catalog,
    /// Place an order for a service
    Order {
        /// Service name, as shown by `catalog`
        service: String,
        /// Payment operation number
        #[arg(long)]
        payment_ref: Option<String>,
    },
    /// Show your active and expired subscriptions
    Subscriptions,
    /// Correct the name on your account
    Rename {
        /// New display name
        name: String,
    },
}

/// Execute a client subcommand.
pub async fn run(pool: &Stockpool, caller: &Caller, action: ClientAction) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        ClientAction::Catalog => {
            let services = pool.catalog().await?;
            if services.is_empty() {
                writeln!(out, "No services available right now.")?;
            } else {
                for service in &services {
                    writeln!(out, "{service}")?;
                }
            }
        }
        ClientAction::Order {
            service,
            payment_ref,
        } => {
            let sale = pool
                .create_sale(caller, &service, payment_ref.as_deref())
                .await?;
            writeln!(
                out,
                "Order {} for {} received. It will be fulfilled shortly.",
                sale.id, sale.service
            )?;
        }
        ClientAction::Subscriptions => {
            let client_id = caller
                .client_id()
                .ok_or_else(|| anyhow::anyhow!("client login required"))?;
            let sales = pool.list_active_for_client(caller, client_id).await?;
            write_sales(&mut out, &sales, "No subscriptions yet.")?;
        }
        ClientAction::Rename { name } => {
            let client_id = caller
                .client_id()
                .ok_or_else(|| anyhow::anyhow!("client login required"))?;
            let client = pool.rename_client(caller, client_id, &name).await?;
            writeln!(out, "Name updated to {}.", client.name)?;
        }
    }
    Ok(())
}
