use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
};

use crate::{
    error::Result,
    pages::{self, RenderedPage},
    state::AppState,
    views::{DetailView, LOGO_SVG},
};

/// 配置页面路由。
///
/// 路由包括：
/// - `GET /`：首页
/// - `GET /post/{uid}`：文章页
/// - `GET /images/logo.svg`：logo
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/post/{uid}", get(post))
        .route("/images/logo.svg", get(logo))
}

async fn home(State(app): State<AppState>) -> Result<RenderedPage> {
    pages::serve_home(app.cms(), app.pages()).await
}

/// 文章页。不合法的 uid 直接返回 404，不进入缓存。
async fn post(Path(uid): Path<String>, State(app): State<AppState>) -> RenderedPage {
    if !is_valid_uid(&uid) {
        let view = DetailView::NotFound;
        return RenderedPage::new(view.status(), view.render().into_string());
    }
    pages::serve_post(app.cms(), app.pages(), &uid)
}

async fn logo() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], LOGO_SVG)
}

/// uid 只允许字母、数字、`-` 和 `_`
fn is_valid_uid(uid: &str) -> bool {
    !uid.is_empty()
        && uid.len() <= 128
        && uid
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}
