use std::sync::Arc;

use axum::extract::FromRef;

use crate::{cms::PrismicClient, pages::PageStore};

/// 应用程序上下文
///
/// [`AppState`] 封装了 CMS 客户端和已生成页面的缓存，提供统一访问入口。
#[derive(Clone, FromRef)]
pub struct AppState {
    cms: PrismicClient,
    pages: Arc<PageStore>,
}

impl AppState {
    /// 创建一个新的 [`AppState`] 实例
    pub fn new(cms: PrismicClient, pages: PageStore) -> Self {
        Self {
            cms,
            pages: Arc::new(pages),
        }
    }

    /// 获取 CMS 客户端
    pub fn cms(&self) -> &PrismicClient {
        &self.cms
    }

    /// 获取页面缓存
    pub fn pages(&self) -> &Arc<PageStore> {
        &self.pages
    }
}
