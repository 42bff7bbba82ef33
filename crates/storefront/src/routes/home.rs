//! Catalog page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::catalog::ProductCardView;
use crate::state::AppState;

use super::LayoutView;

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: LayoutView,
    pub products: Vec<ProductCardView>,
}

/// Display the catalog page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    HomeTemplate {
        layout: LayoutView::from_state(&state),
        products: state.catalog().cards(),
    }
}
