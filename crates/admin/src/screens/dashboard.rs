//! Dashboard cards and charts, and the finance history.

use upbreed_core::charts::{
    format_compact, format_number, revenue_series, subscriber_growth_series, subscriber_share,
    Currency, FinanceWindow, GrowthPoint, RevenuePoint, SubscriberShare,
};
use upbreed_core::models::{DashboardData, Transaction};
use upbreed_core::pagination::{ListResponse, PageRequest};
use upbreed_core::query_key::KeyFilter;
use upbreed_query::{fetcher, Loadable, QueryObserver};

use crate::app::AdminApp;
use crate::keys;

pub const SUBSCRIBER_ERROR: &str = "Failed to load subscriber data.";
pub const GROWTH_ERROR: &str = "Failed to load subscriber growth data.";

/// Everything the dashboard draws, in the selected currency.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub currency: Currency,
    pub total_users: String,
    pub total_subscribers: String,
    pub total_instructors: String,
    pub total_reports: String,
    pub total_revenue: String,
    pub share: SubscriberShare,
    pub growth: Vec<GrowthPoint>,
    pub revenue: Vec<RevenuePoint>,
}

impl DashboardView {
    pub fn build(data: &DashboardData, currency: Currency) -> Self {
        Self {
            currency,
            total_users: format_number(data.total_users),
            total_subscribers: format_number(data.total_subscribers),
            total_instructors: format_number(data.total_instructors),
            total_reports: format_number(data.total_reports),
            total_revenue: format!("$ {}", format_compact(data.total_revenue_usd)),
            share: subscriber_share(data.total_subscribers, data.total_users),
            growth: subscriber_growth_series(&data.subscribers_history),
            revenue: revenue_series(&data.revenue_history),
        }
    }

    /// Revenue chart values in the selected currency.
    pub fn revenue_amounts(&self) -> Vec<f64> {
        self.revenue.iter().map(|p| p.amount(self.currency)).collect()
    }
}

pub struct DashboardScreen {
    app: AdminApp,
    pub data: QueryObserver<DashboardData>,
}

impl DashboardScreen {
    pub fn new(app: &AdminApp) -> Self {
        let api = app.api.clone();
        let data = app.cache.observe(
            keys::dashboard(),
            fetcher(move || {
                let api = api.clone();
                async move { api.dashboard().await }
            }),
        );
        Self {
            app: app.clone(),
            data,
        }
    }

    pub fn currency(&self) -> Currency {
        self.app.query_state.currency().get()
    }

    pub fn toggle_currency(&self) -> Currency {
        let next = self.currency().toggle();
        self.app.query_state.currency().set(next);
        next
    }

    pub fn view(&self) -> Loadable<DashboardView> {
        let currency = self.currency();
        self.data
            .current()
            .map(|data| DashboardView::build(&data, currency))
    }

    pub async fn settled(&mut self) -> Loadable<DashboardView> {
        let currency = self.currency();
        self.data
            .settled()
            .await
            .map(|data| DashboardView::build(&data, currency))
    }

    /// Refetch after an error.
    pub fn retry(&self) {
        self.app
            .cache
            .invalidate_because(KeyFilter::exact(self.data.key()), "retry");
    }
}

/// The transaction history, one page at a time.
pub struct FinanceScreen {
    app: AdminApp,
    page: PageRequest,
    pub transactions: QueryObserver<ListResponse<Transaction>>,
}

impl FinanceScreen {
    pub fn new(app: &AdminApp) -> Self {
        let page = PageRequest::new(1, app.config.page_limit);
        Self {
            transactions: observe_page(app, page),
            app: app.clone(),
            page,
        }
    }

    pub fn page(&self) -> u32 {
        self.page.page
    }

    pub fn set_page(&mut self, page: u32) {
        let page = PageRequest::new(page.max(1), self.page.limit);
        if page == self.page {
            return;
        }
        self.page = page;
        self.transactions = observe_page(&self.app, page);
    }

    pub fn currency(&self) -> Currency {
        self.app.query_state.currency().get()
    }

    pub fn toggle_currency(&self) -> Currency {
        let next = self.currency().toggle();
        self.app.query_state.currency().set(next);
        next
    }

    /// Selected revenue window tab.
    pub fn window(&self) -> FinanceWindow {
        self.app.query_state.tab().get()
    }

    pub fn set_window(&self, window: FinanceWindow) {
        self.app.query_state.tab().set(window);
    }

    /// Rows as `(title, amount)` in the selected currency.
    pub fn rows(&self) -> Loadable<Vec<(String, f64)>> {
        let currency = self.currency();
        self.transactions.current().map(|list| {
            list.data
                .iter()
                .map(|t| (t.title.clone(), t.amount(currency)))
                .collect()
        })
    }
}

fn observe_page(app: &AdminApp, page: PageRequest) -> QueryObserver<ListResponse<Transaction>> {
    let api = app.api.clone();
    app.cache.observe(
        keys::transactions(page),
        fetcher(move || {
            let api = api.clone();
            async move { api.list_transactions(page).await }
        }),
    )
}

#[cfg(test)]
mod tests {
    use upbreed_core::models::{RevenueMonth, SubscriberMonth};

    use super::*;

    fn data() -> DashboardData {
        DashboardData {
            total_subscribers: 2_500,
            total_users: 10_000,
            total_instructors: 12,
            total_reports: 3,
            total_revenue_usd: 15_000.0,
            subscribers_history: vec![SubscriberMonth {
                month: "2024-06".into(),
                count: 4,
            }],
            revenue_history: vec![RevenueMonth {
                month: "2024-06".into(),
                usd: 100.0,
                naira: 150_000.0,
            }],
        }
    }

    #[test]
    fn view_formats_cards_and_series() {
        let view = DashboardView::build(&data(), Currency::Ngn);
        assert_eq!(view.total_users, "10,000");
        assert_eq!(view.total_revenue, "$ 15K");
        assert_eq!(view.share.subscribers, 25.0);
        assert_eq!(view.growth.len(), 6);
        assert_eq!(view.revenue_amounts().last(), Some(&150_000.0));
    }

    #[test]
    fn currency_selects_the_amount() {
        let view = DashboardView::build(&data(), Currency::Usd);
        assert_eq!(view.revenue_amounts().last(), Some(&100.0));
        assert_eq!(view.revenue_amounts()[0], 0.0);
    }
}
