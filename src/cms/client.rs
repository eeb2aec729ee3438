use std::time::Duration;

use reqwest::{Url, header};
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::{ApiInfo, Cms, CmsError, Document, Predicate, Query, SearchResponse};
use crate::{config::CmsConfig, pagination::Cursor};

/// Prismic REST API v2 客户端
///
/// 每次调用都是一次新的网络请求，不做缓存和重试。
#[derive(Clone)]
pub struct PrismicClient {
    client: reqwest::Client,
    endpoint: Url,
    access_token: String,
}

impl PrismicClient {
    /// 使用指定的 CMS 配置创建客户端
    ///
    /// ```ignore
    /// let config = Config::from_env()?;
    /// let cms = PrismicClient::new(&config.cms)?;
    /// ```
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers({
                let mut header = header::HeaderMap::new();
                header.insert(
                    header::ACCEPT,
                    header::HeaderValue::from_static("application/json"),
                );
                header
            })
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// API 入口
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// 获取当前的 master ref
    #[instrument(skip(self))]
    async fn master_ref(&self) -> Result<String, CmsError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token);

        let info: ApiInfo = self.get_json(url).await?;
        info.master_ref()
            .map(ToOwned::to_owned)
            .ok_or(CmsError::MissingMasterRef)
    }

    /// `{endpoint}/documents/search`
    fn search_url(&self) -> Result<Url, CmsError> {
        let mut url = self.endpoint.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| CmsError::InvalidUrl(self.endpoint.to_string()))?
            .pop_if_empty()
            .push("documents")
            .push("search");
        Ok(url)
    }

    fn build_search_url(&self, master_ref: &str, query: &Query) -> Result<Url, CmsError> {
        let mut url = self.search_url()?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", master_ref);
            for (key, value) in query.params() {
                pairs.append_pair(key, &value);
            }
            pairs.append_pair("access_token", &self.access_token);
        }
        Ok(url)
    }

    /// 校验游标属于配置的 CMS，并在缺少时补上 `access_token`
    fn cursor_url(&self, cursor: &str) -> Result<Url, CmsError> {
        let mut url = Url::parse(cursor).map_err(|_| CmsError::InvalidUrl(cursor.to_string()))?;

        if url.origin() != self.endpoint.origin() {
            return Err(CmsError::ForeignCursor(cursor.to_string()));
        }

        if !url.query_pairs().any(|(k, _)| k == "access_token") {
            url.query_pairs_mut()
                .append_pair("access_token", &self.access_token);
        }
        Ok(url)
    }

    /// 去掉游标中的 `access_token`，游标会原样交给浏览器
    fn strip_token(cursor: String) -> String {
        let Ok(mut url) = Url::parse(&cursor) else {
            return cursor;
        };
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "access_token")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        url.into()
    }

    async fn search(&self, url: Url) -> Result<SearchResponse, CmsError> {
        let mut resp: SearchResponse = self.get_json(url).await?;
        resp.next_page = resp.next_page.map(Self::strip_token);
        Ok(resp)
    }

    /// 请求地址中带有 `access_token`，错误里不保留地址
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CmsError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CmsError::Http(e.without_url()))?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, "cms request failed");
            return Err(CmsError::Status(status));
        }
        resp.json()
            .await
            .map_err(|e| CmsError::Http(e.without_url()))
    }
}

impl Cms for PrismicClient {
    #[instrument(skip(self))]
    async fn query(&self, query: &Query) -> Result<SearchResponse, CmsError> {
        let master_ref = self.master_ref().await?;
        let url = self.build_search_url(&master_ref, query)?;
        self.search(url).await
    }

    // 游标中可能带有 access_token，不记录到 span
    #[instrument(skip_all)]
    async fn follow(&self, cursor: &Cursor) -> Result<SearchResponse, CmsError> {
        let url = self.cursor_url(cursor.as_str())?;
        self.search(url).await
    }

    #[instrument(skip(self))]
    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Option<Document>, CmsError> {
        let query = Query::new()
            .predicate(Predicate::at(format!("my.{}.uid", doc_type), uid))
            .page_size(1);

        let resp = self.query(&query).await?;
        Ok(resp.results.into_iter().next())
    }
}
