//! Sale fulfillment subcommands (admin).

use std::io::{self, Write};

use clap::Subcommand;

use super::{days, write_sale_header, write_sale_row, write_sales};
use crate::auth::Caller;
use crate::service::Stockpool;

#[derive(Subcommand, Debug)]
pub enum SaleAction {
    /// List orders waiting for stock, oldest first
    Pending,
    /// Show one sale
    Show {
        /// Sale ID
        id: i64,
    },
    /// Hand a stock item to a pending sale
    Assign {
        /// Sale ID
        sale_id: i64,
        /// Stock item ID
        stock_item_id: i64,
        /// Subscription length in days (defaults to the configured length)
        #[arg(long)]
        days: Option<u32>,
    },
}

/// Execute a sale subcommand.
pub async fn run(pool: &Stockpool, caller: &Caller, action: SaleAction) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        SaleAction::Pending => {
            let sales = pool.list_pending(caller).await?;
            write_sales(&mut out, &sales, "No pending orders.")?;
        }
        SaleAction::Show { id } => {
            let sale = pool.get_sale(caller, id).await?;
            write_sale_header(&mut out)?;
            write_sale_row(&mut out, &sale)?;
            if let Some(reference) = &sale.payment_reference {
                writeln!(out, "\nPayment reference: {reference}")?;
            }
        }
        SaleAction::Assign {
            sale_id,
            stock_item_id,
            days: count,
        } => {
            let sale = pool
                .assign(caller, sale_id, stock_item_id, count.map(days))
                .await?;
            writeln!(
                out,
                "Sale {} assigned stock item {} until {}.",
                sale.id,
                stock_item_id,
                sale.end_time.unwrap_or_default()
            )?;
        }
    }
    Ok(())
}
