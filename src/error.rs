use axum::response::IntoResponse;
use reqwest::StatusCode;

use crate::{cms::CmsError, config::ConfigError};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cms(#[from] CmsError),

    /// CMS 返回的文档结构不符合预期
    #[error("malformed cms document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Not Found")]
    NotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// 对应的 HTTP 状态码
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Cms(CmsError::ForeignCursor(_) | CmsError::InvalidUrl(_)) => {
                StatusCode::BAD_REQUEST
            }
            Error::Cms(_) | Error::Decode(_) => StatusCode::BAD_GATEWAY,
            Error::Config(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        match self {
            Error::NotFound => (status, "NOT FOUND").into_response(),
            Error::Cms(e @ (CmsError::ForeignCursor(_) | CmsError::InvalidUrl(_))) => {
                (status, e.to_string()).into_response()
            }
            Error::Cms(e) => {
                tracing::error!(%e, "cms error");
                (status, "Bad Gateway").into_response()
            }
            Error::Decode(e) => {
                tracing::error!(%e, "cms document decode error");
                (status, "Bad Gateway").into_response()
            }
            Error::Config(e) => {
                tracing::error!(%e, "config error");
                (status, "Internal Server Error").into_response()
            }
            Error::Io(e) => {
                tracing::error!(%e, "file io error");
                (status, "Internal Server Error").into_response()
            }
        }
    }
}
