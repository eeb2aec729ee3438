//! 静态页面生成与再生成
//!
//! - 启动时预生成首页和所有已知文章页
//! - 页面过期后先返回旧页面，同时在后台重新生成
//! - 未预生成的文章页首次请求时返回过渡页，后台生成完成后再返回正文

mod store;

use std::sync::Arc;

use tracing::instrument;

pub use self::store::{Claim, PageStore, RenderedPage};

use crate::{
    cms::Cms,
    error::{Error, Result},
    pagination::ListState,
    posts,
    views::{self, DetailView},
};

/// 首页路由
pub const HOME_ROUTE: &str = "/";

/// 文章页路由
pub fn post_route(uid: &str) -> String {
    format!("/post/{}", uid)
}

/// 生成首页
#[instrument(skip(cms))]
pub async fn generate_home<C: Cms>(cms: &C) -> Result<RenderedPage> {
    let page = posts::fetch_post_page(cms, None).await?;
    let state = ListState::new(page);
    Ok(RenderedPage::new(
        axum::http::StatusCode::OK,
        views::home(&state).into_string(),
    ))
}

/// 获取文章并转换为页面状态
pub async fn post_view<C: Cms>(cms: &C, uid: &str) -> DetailView {
    match posts::fetch_post_by_identifier(cms, uid).await {
        Ok(post) => DetailView::Ready(post),
        Err(Error::NotFound) => DetailView::NotFound,
        Err(e) => {
            tracing::error!(uid, error = %e, "failed to generate post page");
            DetailView::Error(e.to_string())
        }
    }
}

/// 生成文章页并写入缓存
///
/// - 重新生成失败时保留旧页面
/// - 从未生成过正文的路由，404 和错误页只返回一次，不长期占用缓存
#[instrument(skip(cms, store))]
pub async fn generate_post<C: Cms>(cms: &C, store: &PageStore, uid: &str) -> DetailView {
    let route = post_route(uid);
    let view = post_view(cms, uid).await;

    match &view {
        DetailView::Error(_) if store.has_page(&route) => {
            tracing::warn!(uid, "post regeneration failed, serving stale page");
            store.abandon(&route);
        }
        DetailView::Ready(_) => store.complete(&route, rendered(&view), store.revalidate()),
        // 文章已下线
        DetailView::NotFound if store.has_page(&route) => {
            store.complete(&route, rendered(&view), store.revalidate())
        }
        _ => store.complete_transient(&route, rendered(&view)),
    }
    view
}

fn rendered(view: &DetailView) -> RenderedPage {
    RenderedPage::new(view.status(), view.render().into_string())
}

async fn regenerate_home<C: Cms>(cms: &C, store: &PageStore) -> Result<RenderedPage> {
    match generate_home(cms).await {
        Ok(page) => {
            store.complete(HOME_ROUTE, page.clone(), store.revalidate());
            Ok(page)
        }
        Err(e) => {
            store.abandon(HOME_ROUTE);
            Err(e)
        }
    }
}

fn spawn_home<C>(cms: &C, store: &Arc<PageStore>)
where
    C: Cms + Clone + 'static,
{
    let (cms, store) = (cms.clone(), store.clone());
    tokio::spawn(async move {
        if let Err(e) = regenerate_home(&cms, &store).await {
            tracing::warn!(error = %e, "home regeneration failed, serving stale page");
        }
    });
}

fn spawn_post<C>(cms: &C, store: &Arc<PageStore>, uid: &str)
where
    C: Cms + Clone + 'static,
{
    let (cms, store, uid) = (cms.clone(), store.clone(), uid.to_string());
    tokio::spawn(async move {
        generate_post(&cms, &store, &uid).await;
    });
}

/// 返回首页
///
/// 没有缓存时同步生成；过期时返回旧页面并在后台重新生成。
pub async fn serve_home<C>(cms: &C, store: &Arc<PageStore>) -> Result<RenderedPage>
where
    C: Cms + Clone + 'static,
{
    match store.claim(HOME_ROUTE) {
        Claim::Fresh(page) => Ok(page),
        Claim::Stale { page, regenerate } => {
            if regenerate {
                spawn_home(cms, store);
            }
            Ok(page)
        }
        Claim::Generate => regenerate_home(cms, store).await,
        Claim::Pending => generate_home(cms).await,
    }
}

/// 返回文章页
///
/// 未生成的文章先返回过渡页，生成在后台进行。
pub fn serve_post<C>(cms: &C, store: &Arc<PageStore>, uid: &str) -> RenderedPage
where
    C: Cms + Clone + 'static,
{
    match store.claim(&post_route(uid)) {
        Claim::Fresh(page) => page,
        Claim::Stale { page, regenerate } => {
            if regenerate {
                spawn_post(cms, store, uid);
            }
            page
        }
        Claim::Generate => {
            spawn_post(cms, store, uid);
            fallback()
        }
        Claim::Pending => fallback(),
    }
}

fn fallback() -> RenderedPage {
    rendered(&DetailView::Loading)
}

/// 预生成首页和所有已知文章页
///
/// 失败只记录日志，不影响启动。
#[instrument(skip_all)]
pub async fn prerender<C: Cms>(cms: &C, store: &PageStore) {
    match generate_home(cms).await {
        Ok(page) => store.complete(HOME_ROUTE, page, store.revalidate()),
        Err(e) => tracing::warn!(error = %e, "failed to prerender home"),
    }

    let uids = match posts::list_all_post_identifiers(cms).await {
        Ok(uids) => uids,
        Err(e) => {
            tracing::warn!(error = %e, "failed to list posts, pages will be generated on demand");
            return;
        }
    };

    for uid in &uids {
        generate_post(cms, store, uid).await;
    }
    tracing::info!(posts = uids.len(), "prerendered pages");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;

    use super::*;
    use crate::{cms::PrismicClient, config::CmsConfig, posts::tests::FakeCms};

    fn store() -> Arc<PageStore> {
        Arc::new(PageStore::new(Duration::from_secs(60)))
    }

    #[tokio::test]
    async fn test_prerender() {
        let cms = FakeCms::two_pages();
        let store = store();
        prerender(&cms, &store).await;

        let home = store.get(HOME_ROUTE).expect("首页应已生成");
        assert!(home.html.contains("/post/a"));
        assert!(home.html.contains("Carregar mais posts"));

        for uid in ["a", "b", "c", "d"] {
            let page = store.get(&post_route(uid)).expect("文章页应已生成");
            assert_eq!(page.status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_serve_home_generates_and_caches() {
        let cms = Arc::new(FakeCms::two_pages());
        let store = store();

        let page = serve_home(&cms, &store).await.expect("生成失败");
        assert_eq!(page.status, StatusCode::OK);
        serve_home(&cms, &store).await.expect("生成失败");

        assert_eq!(cms.queries().len(), 1, "第二次请求应命中缓存");
    }

    #[tokio::test]
    async fn test_unknown_post_falls_back_then_renders() {
        let cms = Arc::new(FakeCms::two_pages());
        let store = store();

        let first = serve_post(&cms, &store, "c");
        assert!(first.html.contains("Carregando..."));

        let mut page = first;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            page = serve_post(&cms, &store, "c");
            if !page.html.contains("Carregando...") {
                break;
            }
        }
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.html.contains("<h1>C</h1>"));
    }

    #[tokio::test]
    async fn test_missing_post_is_served_once() {
        let cms = FakeCms::two_pages();
        let store = store();
        let route = post_route("nope");

        assert!(matches!(store.claim(&route), Claim::Generate));
        let view = generate_post(&cms, &store, "nope").await;
        assert_eq!(view, DetailView::NotFound);

        match store.claim(&route) {
            Claim::Fresh(page) => assert_eq!(page.status, StatusCode::NOT_FOUND),
            other => panic!("应返回 404 页面: {:?}", other),
        }
        assert!(matches!(store.claim(&route), Claim::Generate));
    }

    #[tokio::test]
    async fn test_random_uids_do_not_grow_cache() {
        let cms = Arc::new(FakeCms::two_pages());
        let store = store();

        for i in 0..1000 {
            let uid = format!("random-{}", i);
            assert!(matches!(store.claim(&post_route(&uid)), Claim::Generate));
            generate_post(&cms, &store, &uid).await;
        }

        assert!(store.len() <= 257, "缓存条目: {}", store.len());
    }

    #[tokio::test]
    async fn test_failed_regeneration_keeps_stale_post() {
        let cms = Arc::new(FakeCms::two_pages());
        let store = store();
        let route = post_route("a");

        store.complete(
            &route,
            RenderedPage::new(StatusCode::OK, "<h1>A</h1>"),
            Duration::ZERO,
        );
        cms.set_failing(true);

        let page = serve_post(&cms, &store, "a");
        assert_eq!(page.html, "<h1>A</h1>");

        let view = generate_post(&cms, &store, "a").await;
        assert!(matches!(view, DetailView::Error(_)));

        let page = store.get(&route).expect("旧页面应保留");
        assert_eq!(page.status, StatusCode::OK);
        assert_eq!(page.html, "<h1>A</h1>");
        assert!(matches!(
            store.claim(&route),
            Claim::Stale {
                regenerate: true,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_failed_first_generation_is_retried() {
        let cms = Arc::new(FakeCms::two_pages());
        let store = store();
        let route = post_route("a");
        cms.set_failing(true);

        assert!(matches!(store.claim(&route), Claim::Generate));
        generate_post(&cms, &store, "a").await;
        match store.claim(&route) {
            Claim::Fresh(page) => assert_eq!(page.status, StatusCode::BAD_GATEWAY),
            other => panic!("应返回错误页: {:?}", other),
        }

        cms.set_failing(false);
        assert!(matches!(store.claim(&route), Claim::Generate));
        assert!(matches!(
            generate_post(&cms, &store, "a").await,
            DetailView::Ready(_)
        ));
    }

    #[tokio::test]
    async fn test_error_page_never_shows_token() {
        let cms = PrismicClient::new(&CmsConfig {
            endpoint: reqwest::Url::parse("http://127.0.0.1:1/api/v2").expect("非法地址"),
            access_token: "SECRET-TOKEN".into(),
        })
        .expect("创建客户端失败");

        let view = post_view(&cms, "a").await;
        assert!(matches!(view, DetailView::Error(_)));
        assert!(!view.render().into_string().contains("SECRET-TOKEN"));
    }
}
