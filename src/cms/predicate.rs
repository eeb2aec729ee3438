use std::fmt;

/// 检索谓词
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `[at(path,"value")]`，字段与值完全相等
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::At {
            path: path.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::At { path, value } => {
                write!(f, "[at({},\"{}\")]", path, value.replace('"', "\\\""))
            }
        }
    }
}

/// 文档检索参数
///
/// ```ignore
/// let query = Query::new()
///     .predicate(Predicate::at("document.type", "posts"))
///     .fetch(["posts.title"])
///     .page_size(2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    predicates: Vec<Predicate>,
    fetch: Vec<String>,
    page_size: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// 只返回指定字段
    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// `q` 参数，所有谓词包在一对方括号里
    pub fn q(&self) -> String {
        let inner: String = self.predicates.iter().map(ToString::to_string).collect();
        format!("[{}]", inner)
    }

    /// 转换为查询字符串参数（不含 `ref` 和 `access_token`）
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", self.q())];
        if !self.fetch.is_empty() {
            params.push(("fetch", self.fetch.join(",")));
        }
        if let Some(size) = self.page_size {
            params.push(("pageSize", size.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params() {
        let query = Query::new()
            .predicate(Predicate::at("document.type", "posts"))
            .fetch(["posts.title", "posts.subtitle"])
            .page_size(2);

        assert_eq!(
            query.params(),
            vec![
                ("q", r#"[[at(document.type,"posts")]]"#.to_string()),
                ("fetch", "posts.title,posts.subtitle".to_string()),
                ("pageSize", "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_predicate_escapes_quotes() {
        let p = Predicate::at("my.posts.uid", r#"a"b"#);
        assert_eq!(p.to_string(), r#"[at(my.posts.uid,"a\"b")]"#);
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(Query::new().params(), vec![("q", "[]".to_string())]);
    }
}
