use axum::{Json, Router, extract::State, routing::get};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};

use crate::{
    cms::PrismicClient,
    error::Result,
    pagination::{Cursor, PostPage},
    posts,
    state::AppState,
    views,
};

/// 配置分页接口路由。
///
/// - `GET /api/posts`：第一页
/// - `GET /api/posts?cursor=..`：按游标获取下一页
pub fn setup_route() -> Router<AppState> {
    Router::new().route("/posts", get(post_page))
}

/// 查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostsParams {
    cursor: Option<String>,
}

/// 一页文章，附带渲染好的列表项 HTML
#[derive(Debug, Serialize)]
pub struct PostPageResponse {
    #[serde(flatten)]
    page: PostPage,
    html: String,
}

/// 获取一页文章摘要。
///
/// 游标必须属于配置的 CMS，否则返回 400。
async fn post_page(
    Query(params): Query<PostsParams>,
    State(cms): State<PrismicClient>,
) -> Result<Json<PostPageResponse>> {
    let cursor = params
        .cursor
        .filter(|c| !c.trim().is_empty())
        .map(Cursor::new);

    let page = posts::fetch_post_page(&cms, cursor.as_ref()).await?;
    let html = views::post_items(&page.items).into_string();

    Ok(Json(PostPageResponse { page, html }))
}
