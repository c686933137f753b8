use axum::extract::{Query, State};
use axum::Json;
use upbreed_core::models::{DashboardData, Transaction};
use upbreed_core::pagination::{paginate, ListResponse};

use crate::handlers::{DataResponse, ListParams};
use crate::state::MockState;

/// GET /dashboard
pub async fn dashboard(State(state): State<MockState>) -> Json<DataResponse<DashboardData>> {
    Json(DataResponse {
        data: state.store().dashboard.clone(),
    })
}

/// GET /transaction, newest first.
pub async fn list_transactions(
    State(state): State<MockState>,
    Query(params): Query<ListParams>,
) -> Json<DataResponse<ListResponse<Transaction>>> {
    let mut rows = state.store().transactions.clone();
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(DataResponse {
        data: paginate(&rows, params.page_request()),
    })
}
