use serde::{Deserialize, Serialize};

/// Aggregates behind the dashboard summary cards and charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub total_subscribers: u64,
    pub total_users: u64,
    #[serde(default)]
    pub total_instructors: u64,
    #[serde(default)]
    pub total_reports: u64,
    #[serde(default)]
    pub total_revenue_usd: f64,
    #[serde(default)]
    pub subscribers_history: Vec<SubscriberMonth>,
    #[serde(default)]
    pub revenue_history: Vec<RevenueMonth>,
}

/// New subscribers in a month keyed `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberMonth {
    pub month: String,
    pub count: u64,
}

/// Revenue in a month keyed `YYYY-MM`, in both display currencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueMonth {
    pub month: String,
    pub usd: f64,
    pub naira: f64,
}
