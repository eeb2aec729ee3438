use reqwest::StatusCode;

/// CMS 访问统一错误类型。
///
/// 包含常见错误来源和场景：
///
/// - [`CmsError::Http`]：网络请求或响应反序列化失败
/// - [`CmsError::Status`]：CMS 返回非 2xx 状态码
/// - [`CmsError::MissingMasterRef`]：API 入口没有返回 master ref
/// - [`CmsError::ForeignCursor`]：分页游标不属于配置的 CMS
/// - [`CmsError::InvalidUrl`]：无法构造请求地址
#[derive(Debug, thiserror::Error)]
pub enum CmsError {
    /// 底层 reqwest 错误
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// CMS 返回了错误状态码
    #[error("cms responded with status {0}")]
    Status(StatusCode),

    /// API 入口中没有 master ref
    #[error("cms api did not expose a master ref")]
    MissingMasterRef,

    /// 游标指向配置之外的地址
    #[error("cursor does not belong to the configured cms: {0}")]
    ForeignCursor(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}
