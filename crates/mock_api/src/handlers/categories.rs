use axum::extract::{Query, State};
use axum::Json;
use upbreed_core::models::Category;
use upbreed_core::pagination::{paginate, ListResponse};

use crate::handlers::{DataResponse, ListParams};
use crate::state::MockState;

/// GET /category
pub async fn list_categories(
    State(state): State<MockState>,
    Query(params): Query<ListParams>,
) -> Json<DataResponse<ListResponse<Category>>> {
    let store = state.store();
    Json(DataResponse {
        data: paginate(&store.categories, params.page_request()),
    })
}
