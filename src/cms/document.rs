use serde::{Deserialize, Serialize};

/// API 入口返回的信息，只保留需要的 `refs` 字段
#[derive(Debug, Clone, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

/// 内容版本引用
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRef {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

impl ApiInfo {
    /// 返回 master ref
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

/// 文档检索结果。
///
/// `next_page` 为下一页的完整地址，`None` 表示没有更多结果。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub results: Vec<Document>,
}

/// CMS 原始文档
///
/// `data` 的结构取决于文档类型，由上层按需反序列化。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    #[serde(default)]
    pub slugs: Vec<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Document {
    /// 文档标识：优先使用 `uid`，否则退回到第一个 slug
    pub fn identifier(&self) -> Option<&str> {
        self.uid
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.slugs.first().map(String::as_str))
            .filter(|s| !s.is_empty())
    }
}
