//! Stock inventory subcommands (admin).

use std::io::{self, Write};

use clap::Subcommand;

use super::truncate;
use crate::auth::Caller;
use crate::service::Stockpool;
use crate::storage::{StockItem, StockItemUpdate};

#[derive(Subcommand, Debug)]
pub enum StockAction {
    /// Add a shared-account credential to the pool
    Add {
        /// Service name (e.g. Netflix)
        service: String,
        /// Credential handed to the buyer
        secret: String,
        /// Profile within the shared account
        #[arg(long)]
        profile: Option<String>,
        /// Free-form admin note
        #[arg(long)]
        note: Option<String>,
    },
    /// List stock items
    List {
        /// Only available items for this service, oldest first
        #[arg(long)]
        service: Option<String>,
    },
    /// Show one stock item and the sale holding it
    Show {
        /// Stock item ID
        id: i64,
    },
    /// Edit descriptive fields of a stock item
    Update {
        /// Stock item ID
        id: i64,
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        secret: Option<String>,
        #[arg(long, conflicts_with = "clear_profile")]
        profile: Option<String>,
        /// Remove the profile
        #[arg(long)]
        clear_profile: bool,
        #[arg(long, conflicts_with = "clear_note")]
        note: Option<String>,
        /// Remove the note
        #[arg(long)]
        clear_note: bool,
    },
    /// Remove an unassigned stock item
    Remove {
        /// Stock item ID
        id: i64,
    },
}

/// Build a partial update from CLI flags.
fn build_update(
    service: Option<String>,
    secret: Option<String>,
    profile: Option<String>,
    clear_profile: bool,
    note: Option<String>,
    clear_note: bool,
) -> StockItemUpdate {
    StockItemUpdate {
        service,
        secret,
        profile: if clear_profile { Some(None) } else { profile.map(Some) },
        note: if clear_note { Some(None) } else { note.map(Some) },
    }
}

/// Execute a stock subcommand.
pub async fn run(pool: &Stockpool, caller: &Caller, action: StockAction) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        StockAction::Add {
            service,
            secret,
            profile,
            note,
        } => {
            let item = pool
                .add_stock(caller, &service, &secret, profile.as_deref(), note.as_deref())
                .await?;
            writeln!(out, "Added stock item {} for {}.", item.id, item.service)?;
        }
        StockAction::List { service } => {
            let items = match service {
                Some(service) => pool.list_available(caller, &service).await?,
                None => pool.list_stock(caller).await?,
            };
            write_items(&mut out, &items)?;
        }
        StockAction::Show { id } => {
            let item = pool.get_stock_item(caller, id).await?;
            write_detail(&mut out, &item)?;
            match pool.sale_for_stock_item(caller, id).await? {
                Some(sale) => writeln!(
                    out,
                    "  Held by:  sale {} (client {}, ends {})",
                    sale.id,
                    sale.client_id,
                    sale.end_time.unwrap_or_default()
                )?,
                None => writeln!(out, "  Held by:  -")?,
            }
        }
        StockAction::Update {
            id,
            service,
            secret,
            profile,
            clear_profile,
            note,
            clear_note,
        } => {
            let update = build_update(service, secret, profile, clear_profile, note, clear_note);
            if update.is_empty() {
                anyhow::bail!("nothing to update: pass at least one field flag");
            }
            let item = pool.update_stock(caller, id, update).await?;
            writeln!(out, "Updated stock item {}:", item.id)?;
            write_detail(&mut out, &item)?;
        }
        StockAction::Remove { id } => {
            pool.remove_stock(caller, id).await?;
            writeln!(out, "Stock item {id} removed.")?;
        }
    }
    Ok(())
}

fn write_items(out: &mut impl Write, items: &[StockItem]) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "No stock items found.");
    }
    writeln!(
        out,
        "{:<6}  {:<16}  {:<10}  {:<16}  {:<20}",
        "ID", "SERVICE", "STATUS", "PROFILE", "NOTE"
    )?;
    for item in items {
        writeln!(
            out,
            "{:<6}  {:<16}  {:<10}  {:<16}  {:<20}",
            item.id,
            truncate(&item.service, 16),
            item.status.as_str(),
            truncate(item.profile.as_deref().unwrap_or("-"), 16),
            truncate(item.note.as_deref().unwrap_or(""), 20),
        )?;
    }
    writeln!(out, "\n{} item(s)", items.len())
}

fn write_detail(out: &mut impl Write, item: &StockItem) -> io::Result<()> {
    writeln!(out, "  ID:       {}", item.id)?;
    writeln!(out, "  Service:  {}", item.service)?;
    writeln!(out, "  Secret:   {}", item.secret)?;
    writeln!(out, "  Profile:  {}", item.profile.as_deref().unwrap_or("-"))?;
    writeln!(out, "  Status:   {}", item.status)?;
    if let Some(note) = &item.note {
        writeln!(out, "  Note:     {note}")?;
    }
    Ok(())
}
