//! Data models for `Stockpool` storage.

use serde::{Deserialize, Serialize};

/// A status column held a value this build does not know.
#[derive(Debug, thiserror::Error)]
#[error("unknown status value: {0}")]
pub struct UnknownStatus(pub String);

/// Availability of a stock item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Available,
    Assigned,
}

impl StockStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Assigned => "assigned",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for StockStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "available" => Ok(Self::Available),
            "assigned" => Ok(Self::Assigned),
            _ => Err(UnknownStatus(value)),
        }
    }
}

/// Fulfillment state of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Pending,
    Assigned,
}

impl SaleStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
        }
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for SaleStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "assigned" => Ok(Self::Assigned),
            _ => Err(UnknownStatus(value)),
        }
    }
}

/// Client identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: i64,
    pub phone: String,
    pub name: String,
    pub created_at: i64,
}

/// One service credential held in inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockItem {
    pub id: i64,
    pub service: String,
    pub secret: String,
    pub profile: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: StockStatus,
    pub note: Option<String>,
    pub created_at: i64,
}

impl StockItem {
    pub fn is_available(&self) -> bool {
        self.status == StockStatus::Available
    }
}

/// One client purchase request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sale {
    pub id: i64,
    pub client_id: i64,
    pub stock_item_id: Option<i64>,
    pub service: String,
    pub payment_reference: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: SaleStatus,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub created_at: i64,
}

impl Sale {
    pub fn is_pending(&self) -> bool {
        self.status == SaleStatus::Pending
    }

    /// Assigned and the active window has not closed at `now`.
    pub fn is_active(&self, now: i64) -> bool {
        self.status == SaleStatus::Assigned && self.end_time.is_none_or(|end| end >= now)
    }

    /// Assigned and the active window closed before `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.status == SaleStatus::Assigned && self.end_time.is_some_and(|end| end < now)
    }
}
