mod client;
mod document;
mod error;
mod predicate;

use std::{future::Future, sync::Arc};

use crate::pagination::Cursor;

pub use self::{
    client::PrismicClient,
    document::{ApiInfo, ApiRef, Document, SearchResponse},
    error::CmsError,
    predicate::{Predicate, Query},
};

/// 无头 CMS 的查询接口
///
/// 提供文档检索、按分页游标续取以及按 uid 获取单个文档。
pub trait Cms: Send + Sync {
    /// 按 [`Query`] 检索文档
    fn query(&self, query: &Query)
    -> impl Future<Output = Result<SearchResponse, CmsError>> + Send;

    /// 请求 CMS 返回的下一页地址
    fn follow(
        &self,
        cursor: &Cursor,
    ) -> impl Future<Output = Result<SearchResponse, CmsError>> + Send;

    /// 按类型和 uid 获取单个文档
    ///
    /// 文档不存在时返回 `None`。
    fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
    ) -> impl Future<Output = Result<Option<Document>, CmsError>> + Send;
}

impl<T: Cms> Cms for Arc<T> {
    fn query(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<SearchResponse, CmsError>> + Send {
        (**self).query(query)
    }

    fn follow(
        &self,
        cursor: &Cursor,
    ) -> impl Future<Output = Result<SearchResponse, CmsError>> + Send {
        (**self).follow(cursor)
    }

    fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
    ) -> impl Future<Output = Result<Option<Document>, CmsError>> + Send {
        (**self).get_by_uid(doc_type, uid)
    }
}
