use serde::{Deserialize, Serialize};

use crate::charts::Currency;
use crate::types::{ResourceId, Timestamp};

/// A single revenue transaction shown in the finance history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: ResourceId,
    pub title: String,
    pub usd: f64,
    pub naira: f64,
    pub created_at: Timestamp,
}

impl Transaction {
    /// Amount in the selected display currency.
    pub fn amount(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Usd => self.usd,
            Currency::Ngn => self.naira,
        }
    }
}
