//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    family::{add_family_endpoint, get_add_family_page, get_families_page, get_family_page},
    ledger::{create_collection_endpoint, get_new_collection_page, record_payment_endpoint},
    error_page::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::FAMILIES_VIEW, get(get_families_page))
        .route(endpoints::NEW_FAMILY_VIEW, get(get_add_family_page))
        .route(endpoints::FAMILY_VIEW, get(get_family_page))
        .route(endpoints::NEW_COLLECTION_VIEW, get(get_new_collection_page))
        .route(endpoints::FAMILIES_API, post(add_family_endpoint))
        .route(endpoints::FAMILY_PAYMENTS_API, post(record_payment_endpoint))
        .route(endpoints::COLLECTIONS_API, post(create_collection_endpoint))
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the family list.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::FAMILIES_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_families() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::FAMILIES_VIEW);
    }
}
