use tracing::instrument;

use crate::{
    cms::{Cms, Predicate, Query, SearchResponse},
    content::{POST_TYPE, PostDetail, PostSummary},
    error::{Error, Result},
    pagination::{Cursor, PostPage},
};

/// 列表每页文章数
pub const PAGE_SIZE: u32 = 2;

/// 列表需要的字段
const SUMMARY_FIELDS: [&str; 3] = ["posts.title", "posts.subtitle", "posts.author"];

/// 获取一页文章摘要。
///
/// - 没有游标时，按 CMS 默认排序查询第一页
/// - 有游标时，直接请求 CMS 返回的下一页地址
///
/// 返回的 [`PostPage::next_cursor`] 为 `None` 表示没有更多文章。
#[instrument(skip(cms))]
pub async fn fetch_post_page<C: Cms>(cms: &C, cursor: Option<&Cursor>) -> Result<PostPage> {
    let resp = match cursor {
        None => {
            let query = Query::new()
                .predicate(Predicate::at("document.type", POST_TYPE))
                .fetch(SUMMARY_FIELDS)
                .page_size(PAGE_SIZE);
            cms.query(&query).await?
        }
        Some(cursor) => cms.follow(cursor).await?,
    };

    into_post_page(resp)
}

fn into_post_page(resp: SearchResponse) -> Result<PostPage> {
    let mut items = Vec::with_capacity(resp.results.len());
    for doc in &resp.results {
        let Some(uid) = doc.identifier() else {
            tracing::warn!(id = %doc.id, "skip post without uid");
            continue;
        };
        items.push(PostSummary::project(uid, doc)?);
    }

    Ok(PostPage {
        items,
        next_cursor: resp.next_page.map(Cursor::new),
    })
}

/// 获取所有文章的 uid，用于预生成文章页。
///
/// 会沿着 `next_page` 一直翻到最后一页。
#[instrument(skip(cms))]
pub async fn list_all_post_identifiers<C: Cms>(cms: &C) -> Result<Vec<String>> {
    let query = Query::new()
        .predicate(Predicate::at("document.type", POST_TYPE))
        .fetch(["posts.uid"]);

    let mut resp = cms.query(&query).await?;
    let mut uids = Vec::new();

    loop {
        uids.extend(
            resp.results
                .iter()
                .filter_map(|doc| doc.identifier().map(ToOwned::to_owned)),
        );

        match resp.next_page.take() {
            Some(next) => resp = cms.follow(&Cursor::new(next)).await?,
            None => break,
        }
    }

    tracing::debug!(count = uids.len(), "listed post identifiers");
    Ok(uids)
}

/// 根据 uid 获取文章详情。
///
/// 文章不存在时返回 [`Error::NotFound`]。
#[instrument(skip(cms))]
pub async fn fetch_post_by_identifier<C: Cms>(cms: &C, uid: &str) -> Result<PostDetail> {
    let doc = cms
        .get_by_uid(POST_TYPE, uid)
        .await?
        .ok_or(Error::NotFound)?;

    let uid = doc.identifier().unwrap_or(uid).to_owned();
    Ok(PostDetail::project(uid, &doc)?)
}
