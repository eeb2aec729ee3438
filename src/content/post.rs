use serde::{Deserialize, Serialize};

use super::{
    date::format_publication_date,
    rich_text::{self, RichTextBlock},
};
use crate::cms::Document;

/// 阅读速度：每分钟字数
const WORDS_PER_MINUTE: usize = 200;

/// 文章摘要，用于列表展示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: String,
    /// 已格式化的发布时间，例如 `15 mar 2021`
    pub first_publication_date: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// 文章详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub uid: String,
    pub first_publication_date: Option<String>,
    pub title: String,
    pub banner: Banner,
    pub author: String,
    pub content: Vec<ContentSection>,
    /// 预计阅读时间（分钟，向上取整）
    pub reading_time_minutes: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Banner {
    pub url: Option<String>,
    pub alt: Option<String>,
}

/// 正文段落：一个小标题和若干富文本块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    pub heading: String,
    pub body: Vec<RichTextBlock>,
}

/// 文本字段，可能是纯文本（Key Text）也可能是富文本
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextField {
    Plain(String),
    Rich(Vec<RichTextBlock>),
}

impl TextField {
    fn into_text(field: Option<TextField>) -> String {
        match field {
            Some(TextField::Plain(s)) => s,
            Some(TextField::Rich(blocks)) => rich_text::as_text(&blocks),
            None => String::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPostData {
    title: Option<TextField>,
    subtitle: Option<TextField>,
    author: Option<TextField>,
    banner: Option<RawImage>,
    content: Option<Vec<RawSection>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawImage {
    url: Option<String>,
    alt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSection {
    heading: Option<TextField>,
    body: Option<Vec<RichTextBlock>>,
}

impl RawPostData {
    fn from_document(doc: &Document) -> Result<Self, serde_json::Error> {
        if doc.data.is_null() {
            return Ok(Self::default());
        }
        RawPostData::deserialize(&doc.data)
    }
}

impl PostSummary {
    /// 从 CMS 文档投影出列表项
    pub fn project(uid: impl Into<String>, doc: &Document) -> Result<Self, serde_json::Error> {
        let data = RawPostData::from_document(doc)?;
        Ok(Self {
            uid: uid.into(),
            first_publication_date: format_publication_date(doc.first_publication_date.as_deref()),
            title: TextField::into_text(data.title),
            subtitle: TextField::into_text(data.subtitle),
            author: TextField::into_text(data.author),
        })
    }
}

impl PostDetail {
    /// 从 CMS 文档构建文章详情
    pub fn project(uid: impl Into<String>, doc: &Document) -> Result<Self, serde_json::Error> {
        let data = RawPostData::from_document(doc)?;

        let content: Vec<ContentSection> = data
            .content
            .unwrap_or_default()
            .into_iter()
            .map(|section| ContentSection {
                heading: TextField::into_text(section.heading),
                body: section.body.unwrap_or_default(),
            })
            .collect();

        let banner = data
            .banner
            .map(|b| Banner {
                url: b.url.filter(|u| !u.is_empty()),
                alt: b.alt,
            })
            .unwrap_or_default();

        Ok(Self {
            uid: uid.into(),
            first_publication_date: format_publication_date(doc.first_publication_date.as_deref()),
            title: TextField::into_text(data.title),
            banner,
            author: TextField::into_text(data.author),
            reading_time_minutes: reading_time(&content),
            content,
        })
    }
}

/// 统计所有小标题和正文的单词数，按每分钟 200 字计算阅读时间
pub fn reading_time(content: &[ContentSection]) -> usize {
    let words: usize = content
        .iter()
        .map(|section| {
            section.heading.split_whitespace().count()
                + section
                    .body
                    .iter()
                    .map(|b| b.text.split_whitespace().count())
                    .sum::<usize>()
        })
        .sum();

    words.div_ceil(WORDS_PER_MINUTE)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::content::BlockKind;

    fn document(value: serde_json::Value) -> Document {
        serde_json::from_value(value).expect("反序列化失败")
    }

    #[test]
    fn test_project_summary() {
        let doc = document(json!({
            "id": "YD1",
            "uid": "como-utilizar-hooks",
            "type": "posts",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "data": {
                "title": "Como utilizar Hooks",
                "subtitle": "Pensando em sincronização em vez de ciclos de vida",
                "author": "Joseph Oliveira"
            }
        }));

        let summary = PostSummary::project("como-utilizar-hooks", &doc).expect("投影失败");
        assert_eq!(
            summary,
            PostSummary {
                uid: "como-utilizar-hooks".into(),
                first_publication_date: Some("15 mar 2021".into()),
                title: "Como utilizar Hooks".into(),
                subtitle: "Pensando em sincronização em vez de ciclos de vida".into(),
                author: "Joseph Oliveira".into(),
            }
        );
    }

    #[test]
    fn test_project_summary_without_date_or_data() {
        let doc = document(json!({ "id": "YD2", "uid": "x", "first_publication_date": null }));
        let summary = PostSummary::project("x", &doc).expect("投影失败");

        assert_eq!(summary.first_publication_date, None);
        assert_eq!(summary.title, "");
    }

    #[test]
    fn test_rich_title_is_flattened() {
        let doc = document(json!({
            "id": "YD3",
            "data": { "title": [ { "type": "heading1", "text": "Criando um app", "spans": [] } ] }
        }));
        let summary = PostSummary::project("x", &doc).expect("投影失败");
        assert_eq!(summary.title, "Criando um app");
    }

    #[test]
    fn test_project_detail() {
        let doc = document(json!({
            "id": "YD4",
            "uid": "criando-um-app",
            "type": "posts",
            "first_publication_date": "2021-03-25T19:27:35+0000",
            "data": {
                "title": "Criando um app CRA do zero",
                "author": "Danilo Vieira",
                "banner": { "url": "https://images.prismic.io/banner.png", "alt": null },
                "content": [
                    {
                        "heading": "Proin et varius",
                        "body": [
                            { "type": "paragraph", "text": "Lorem ipsum dolor sit amet", "spans": [] },
                            { "type": "list-item", "text": "Nullam dolor", "spans": [] }
                        ]
                    },
                    { "heading": null, "body": null }
                ]
            }
        }));

        let detail = PostDetail::project("criando-um-app", &doc).expect("投影失败");
        assert_eq!(detail.first_publication_date.as_deref(), Some("25 mar 2021"));
        assert_eq!(
            detail.banner.url.as_deref(),
            Some("https://images.prismic.io/banner.png")
        );
        assert_eq!(detail.content.len(), 2);
        assert_eq!(detail.content[0].heading, "Proin et varius");
        assert_eq!(detail.content[0].body[1].kind, BlockKind::ListItem);
        assert!(detail.content[1].body.is_empty());
        assert_eq!(detail.reading_time_minutes, 1);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let words = vec!["palavra"; 201].join(" ");
        let content = vec![ContentSection {
            heading: String::new(),
            body: vec![RichTextBlock::new(BlockKind::Paragraph, words)],
        }];
        assert_eq!(reading_time(&content), 2);
        assert_eq!(reading_time(&[]), 0);
    }

    #[test]
    fn test_malformed_data_is_an_error() {
        let doc = document(json!({ "id": "YD5", "data": { "content": "not a list" } }));
        assert!(PostDetail::project("x", &doc).is_err());
    }
}
