use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{cms::Cms, content::PostSummary, error::Result, posts};

/// 分页游标：CMS 返回的下一页地址
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(s: impl Into<String>) -> Self {
        Cursor(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 一页文章摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    pub items: Vec<PostSummary>,
    /// `None` 表示已经没有更多文章
    pub next_cursor: Option<Cursor>,
}

/// 文章列表页的状态。
///
/// 列表只追加不删除，`cursor` 为 `None` 时不再加载。
/// `loading` 为真时拒绝新的加载，避免重复触发导致乱序或重复。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListState {
    pub posts: Vec<PostSummary>,
    pub cursor: Option<Cursor>,
    #[serde(default)]
    pub loading: bool,
}

impl ListState {
    /// 使用服务端渲染时获取的第一页初始化
    pub fn new(page: PostPage) -> Self {
        let mut state = Self {
            posts: Vec::with_capacity(page.items.len()),
            cursor: None,
            loading: false,
        };
        state.append(page);
        state
    }

    /// 是否可以加载更多
    pub fn can_load_more(&self) -> bool {
        self.cursor.is_some() && !self.loading
    }

    /// 开始加载下一页
    ///
    /// 返回需要请求的游标。没有更多页或已有加载在进行时返回 `None`，状态不变。
    pub fn begin_load(&mut self) -> Option<Cursor> {
        if !self.can_load_more() {
            return None;
        }
        self.loading = true;
        self.cursor.clone()
    }

    /// 加载完成：追加文章并更新游标
    pub fn finish_load(&mut self, page: PostPage) {
        self.loading = false;
        self.append(page);
    }

    /// 加载失败：恢复为空闲状态，保留原游标以便重试
    pub fn abort_load(&mut self) {
        self.loading = false;
    }

    fn append(&mut self, page: PostPage) {
        let mut seen: HashSet<String> = self.posts.iter().map(|p| p.uid.clone()).collect();
        for post in page.items {
            if seen.insert(post.uid.clone()) {
                self.posts.push(post);
            } else {
                tracing::warn!(uid = %post.uid, "skip duplicated post");
            }
        }
        self.cursor = page.next_cursor;
    }
}

/// 执行一次完整的“加载更多”。
///
/// 没有可用的加载时返回 `Ok(false)`；请求失败时状态恢复为空闲并返回错误。
pub async fn load_more<C: Cms>(state: &mut ListState, cms: &C) -> Result<bool> {
    let Some(cursor) = state.begin_load() else {
        return Ok(false);
    };

    match posts::fetch_post_page(cms, Some(&cursor)).await {
        Ok(page) => {
            state.finish_load(page);
            Ok(true)
        }
        Err(e) => {
            state.abort_load();
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::tests::{FakeCms, page, post};

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: uid.into(),
            first_publication_date: None,
            title: uid.to_uppercase(),
            subtitle: String::new(),
            author: String::new(),
        }
    }

    fn uids(state: &ListState) -> Vec<&str> {
        state.posts.iter().map(|p| p.uid.as_str()).collect()
    }

    #[test]
    fn test_transitions_concatenate_pages() {
        let mut state = ListState::new(PostPage {
            items: vec![summary("a"), summary("b")],
            next_cursor: Some(Cursor::new("C1")),
        });
        assert!(state.can_load_more());

        let cursor = state.begin_load().expect("应可以加载");
        assert_eq!(cursor, Cursor::new("C1"));
        assert!(state.loading);

        state.finish_load(PostPage {
            items: vec![summary("c"), summary("d")],
            next_cursor: None,
        });

        assert_eq!(uids(&state), ["a", "b", "c", "d"]);
        assert!(!state.can_load_more());
        assert_eq!(state.begin_load(), None);
    }

    #[test]
    fn test_begin_load_is_not_reentrant() {
        let mut state = ListState::new(PostPage {
            items: vec![summary("a")],
            next_cursor: Some(Cursor::new("C1")),
        });

        assert!(state.begin_load().is_some());
        assert_eq!(state.begin_load(), None, "加载中不应再次开始");

        state.abort_load();
        assert_eq!(state.cursor, Some(Cursor::new("C1")), "失败后保留游标");
        assert!(state.begin_load().is_some(), "失败后可以重试");
    }

    #[test]
    fn test_duplicates_are_skipped() {
        let mut state = ListState::new(PostPage {
            items: vec![summary("a"), summary("b")],
            next_cursor: Some(Cursor::new("C1")),
        });
        state.begin_load();
        state.finish_load(PostPage {
            items: vec![summary("b"), summary("c")],
            next_cursor: None,
        });
        assert_eq!(uids(&state), ["a", "b", "c"]);
    }

    #[test]
    fn test_state_serializes() {
        let state = ListState::new(PostPage {
            items: vec![summary("a")],
            next_cursor: Some(Cursor::new("https://cms/next")),
        });
        let value = serde_json::to_value(&state).expect("序列化失败");
        assert_eq!(value["cursor"], "https://cms/next");

        let back: ListState = serde_json::from_value(value).expect("反序列化失败");
        assert_eq!(back, state);
    }

    #[tokio::test]
    async fn test_load_more_scenario() {
        let cms = FakeCms::two_pages();
        let first = posts::fetch_post_page(&cms, None).await.expect("获取失败");
        let mut state = ListState::new(first);

        assert!(load_more(&mut state, &cms).await.expect("加载失败"));
        assert_eq!(uids(&state), ["a", "b", "c", "d"]);
        assert_eq!(state.cursor, None);

        assert!(!load_more(&mut state, &cms).await.expect("加载失败"));
        assert_eq!(cms.queries().len(), 2, "游标耗尽后不应再请求");
    }

    #[tokio::test]
    async fn test_load_more_failure_keeps_state() {
        let cms = FakeCms {
            first: page(vec![post("a", "A")], Some("missing")),
            ..Default::default()
        };
        let first = posts::fetch_post_page(&cms, None).await.expect("获取失败");
        let mut state = ListState::new(first);

        assert!(load_more(&mut state, &cms).await.is_err());
        assert!(!state.loading);
        assert_eq!(state.cursor, Some(Cursor::new("missing")));
        assert_eq!(uids(&state), ["a"]);
    }
}
