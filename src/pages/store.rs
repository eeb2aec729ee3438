use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
    time::{Duration, Instant},
};

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};

/// 已生成的页面
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub status: StatusCode,
    pub html: String,
}

impl RenderedPage {
    pub fn new(status: StatusCode, html: impl Into<String>) -> Self {
        Self {
            status,
            html: html.into(),
        }
    }
}

impl IntoResponse for RenderedPage {
    fn into_response(self) -> axum::response::Response {
        (self.status, Html(self.html)).into_response()
    }
}

/// 一次性页面的最长保留时间
const TRANSIENT_TTL: Duration = Duration::from_secs(30);

/// 一次性页面的最大数量
const MAX_TRANSIENT: usize = 256;

#[derive(Debug)]
struct Entry {
    page: Option<RenderedPage>,
    /// 一次性页面记录的是生成时间
    expires_at: Instant,
    generating: bool,
    /// 读取一次后即移除
    transient: bool,
}

/// [`PageStore::claim`] 的结果
#[derive(Debug)]
pub enum Claim {
    /// 页面有效，直接返回
    Fresh(RenderedPage),
    /// 页面已过期；`regenerate` 为真时调用方负责重新生成
    Stale {
        page: RenderedPage,
        regenerate: bool,
    },
    /// 页面正在首次生成
    Pending,
    /// 页面不存在，调用方负责生成
    Generate,
}

/// 已生成页面的缓存，按路由保存
///
/// 同一路由同一时间只允许一个生成任务。锁不会跨越 `.await` 持有。
///
/// 一次性页面（[`PageStore::complete_transient`]）只返回一次，数量有上限，
/// 任意路径的请求不会让缓存无限增长。
#[derive(Debug)]
pub struct PageStore {
    entries: RwLock<HashMap<String, Entry>>,
    revalidate: Duration,
}

impl PageStore {
    pub fn new(revalidate: Duration) -> Self {
        Self {
            entries: RwLock::default(),
            revalidate,
        }
    }

    /// 页面有效期
    pub fn revalidate(&self) -> Duration {
        self.revalidate
    }

    /// 查询页面状态，必要时为调用方认领生成任务
    pub fn claim(&self, route: &str) -> Claim {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if entries.get(route).is_some_and(|e| e.transient) {
            if let Some(Entry {
                page: Some(page), ..
            }) = entries.remove(route)
            {
                return Claim::Fresh(page);
            }
        }

        let Some(entry) = entries.get_mut(route) else {
            entries.insert(
                route.to_string(),
                Entry {
                    page: None,
                    expires_at: now,
                    generating: true,
                    transient: false,
                },
            );
            return Claim::Generate;
        };

        match &entry.page {
            None => Claim::Pending,
            Some(page) if now < entry.expires_at => Claim::Fresh(page.clone()),
            Some(page) => {
                let regenerate = !entry.generating;
                entry.generating = true;
                Claim::Stale {
                    page: page.clone(),
                    regenerate,
                }
            }
        }
    }

    /// 保存生成结果，`ttl` 为零时页面立即过期
    pub fn complete(&self, route: &str, page: RenderedPage, ttl: Duration) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            route.to_string(),
            Entry {
                page: Some(page),
                expires_at: Instant::now() + ttl,
                generating: false,
                transient: false,
            },
        );
    }

    /// 保存只返回一次的页面，用于从未成功生成过的路由
    ///
    /// 超过 [`TRANSIENT_TTL`] 未被读取的一次性页面会被清理；
    /// 数量达到 [`MAX_TRANSIENT`] 时丢弃最早的一个。
    pub fn complete_transient(&self, route: &str, page: RenderedPage) {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        entries.retain(|_, e| !e.transient || now.duration_since(e.expires_at) < TRANSIENT_TTL);

        let transient = entries.values().filter(|e| e.transient).count();
        if transient >= MAX_TRANSIENT {
            let oldest = entries
                .iter()
                .filter(|(_, e)| e.transient)
                .min_by_key(|(_, e)| e.expires_at)
                .map(|(route, _)| route.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            route.to_string(),
            Entry {
                page: Some(page),
                expires_at: now,
                generating: false,
                transient: true,
            },
        );
    }

    /// 路由是否已有页面，不考虑是否过期
    pub fn has_page(&self, route: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(route)
            .is_some_and(|e| e.page.is_some() && !e.transient)
    }

    /// 缓存中的路由数量
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 生成失败：保留旧页面，没有旧页面时移除记录
    pub fn abandon(&self, route: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(route) {
            Some(entry) if entry.page.is_some() => entry.generating = false,
            Some(_) => {
                entries.remove(route);
            }
            None => {}
        }
    }

    /// 读取页面，不考虑是否过期
    pub fn get(&self, route: &str) -> Option<RenderedPage> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(route)
            .and_then(|e| e.page.clone())
    }
}
