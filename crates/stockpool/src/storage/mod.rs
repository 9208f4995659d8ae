//! `SQLite` storage for `Stockpool`.
//!
//! Provides persistence for clients, stock items and sales. Every query takes
//! its timestamps from the caller so the clock stays in one place.

mod db;
mod models;
mod queries_clients;
mod queries_sales;
mod queries_stock;


pub use db::{Database, DatabaseError};
pub use models::*;
pub use queries_sales::{AssignOutcome, NewSale};
pub use queries_stock::{NewStockItem, StockItemUpdate};
