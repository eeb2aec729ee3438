use maud::{Markup, PreEscaped, html};
use serde::{Deserialize, Serialize};

/// 富文本块类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Preformatted,
    ListItem,
    OListItem,
    Image,
    Embed,
    #[serde(other)]
    Unknown,
}

/// 富文本块
///
/// `text` 为纯文本，`spans` 标记其中的强调、链接等区间。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    /// 图片地址，仅 `image` 块
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// 嵌入内容，仅 `embed` 块
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

impl RichTextBlock {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unknown,
}

/// 文本区间，`start`/`end` 以 UTF-16 码元计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default)]
    pub data: SpanData,
}

impl Span {
    pub fn new(kind: SpanKind, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            kind,
            data: SpanData::default(),
        }
    }
}

/// 区间附加数据：外链的 `url`、文档链接的 `uid`/`type` 或标签名
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SpanData {
    /// 链接地址。外链只允许 http、https、mailto 和相对路径
    fn href(&self) -> Option<String> {
        if let Some(url) = &self.url {
            return is_safe_url(url).then(|| url.clone());
        }
        match (self.doc_type.as_deref(), self.uid.as_deref()) {
            (Some(super::POST_TYPE), Some(uid)) => Some(format!("/post/{}", uid)),
            _ => None,
        }
    }
}

fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    match url.split_once(':') {
        // 冒号出现在路径、查询或片段中时仍是相对地址
        Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => {
            let scheme = scheme.to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
        _ => true,
    }
}

/// 将多个富文本块拼接为纯文本，块之间以换行分隔
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// 渲染富文本块为 HTML
///
/// 连续的 `list-item` / `o-list-item` 合并为同一个 `<ul>` / `<ol>`。
/// 所有文本和属性都会转义。
pub fn as_html(blocks: &[RichTextBlock]) -> Markup {
    let mut out = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list_tag = match block.kind {
            BlockKind::ListItem => Some("ul"),
            BlockKind::OListItem => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                out.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                out.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        match block.kind {
            BlockKind::Paragraph => push_element(&mut out, "p", block),
            BlockKind::Heading1 => push_element(&mut out, "h1", block),
            BlockKind::Heading2 => push_element(&mut out, "h2", block),
            BlockKind::Heading3 => push_element(&mut out, "h3", block),
            BlockKind::Heading4 => push_element(&mut out, "h4", block),
            BlockKind::Heading5 => push_element(&mut out, "h5", block),
            BlockKind::Heading6 => push_element(&mut out, "h6", block),
            BlockKind::Preformatted => push_element(&mut out, "pre", block),
            BlockKind::ListItem | BlockKind::OListItem => push_element(&mut out, "li", block),
            BlockKind::Image => {
                if let Some(url) = &block.url {
                    let img = html! {
                        p.block-img { img src=(url) alt=(block.alt.as_deref().unwrap_or_default()); }
                    };
                    out.push_str(&img.into_string());
                }
            }
            BlockKind::Embed => {
                if let Some(url) = block
                    .oembed
                    .as_ref()
                    .and_then(|e| e.embed_url.as_deref())
                    .filter(|url| is_safe_url(url))
                {
                    let title = block
                        .oembed
                        .as_ref()
                        .and_then(|e| e.title.as_deref())
                        .unwrap_or(url);
                    let embed = html! {
                        div.embed { a href=(url) target="_blank" rel="noopener noreferrer" { (title) } }
                    };
                    out.push_str(&embed.into_string());
                }
            }
            BlockKind::Unknown => {
                tracing::debug!("skip unknown rich text block");
            }
        }
    }

    if let Some(tag) = open_list {
        out.push_str(&format!("</{}>", tag));
    }

    PreEscaped(out)
}

fn escape(s: &str) -> String {
    html! { (s) }.into_string()
}

fn push_element(out: &mut String, tag: &str, block: &RichTextBlock) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    push_spanned_text(out, &block.text, &block.spans);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn open_tag(span: &Span) -> String {
    match span.kind {
        SpanKind::Strong => "<strong>".to_string(),
        SpanKind::Em => "<em>".to_string(),
        SpanKind::Hyperlink => match span.data.href() {
            Some(href) if span.data.target.as_deref() == Some("_blank") => format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer">"#,
                escape(&href)
            ),
            Some(href) => format!(r#"<a href="{}">"#, escape(&href)),
            None => "<a>".to_string(),
        },
        SpanKind::Label => format!(
            r#"<span class="{}">"#,
            escape(span.data.label.as_deref().unwrap_or_default())
        ),
        SpanKind::Unknown => String::new(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink => "</a>",
        SpanKind::Label => "</span>",
        SpanKind::Unknown => "",
    }
}

/// 按区间插入标签。交叉的区间会在边界处先关闭再重新打开，保证输出结构合法。
fn push_spanned_text(out: &mut String, text: &str, spans: &[Span]) {
    let len: usize = text.chars().map(char::len_utf16).sum();

    let mut spans: Vec<&Span> = spans
        .iter()
        .filter(|s| s.kind != SpanKind::Unknown && s.start < s.end && s.start < len)
        .collect();
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut stack: Vec<&Span> = Vec::new();
    let mut next = 0;
    let mut pos = 0;
    let mut chars = text.chars();

    loop {
        close_ended(out, &mut stack, pos);

        while next < spans.len() && spans[next].start <= pos {
            out.push_str(&open_tag(spans[next]));
            stack.push(spans[next]);
            next += 1;
        }

        let Some(c) = chars.next() else { break };
        match c {
            '\n' => out.push_str("<br />"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
        pos += c.len_utf16();
    }

    while let Some(span) = stack.pop() {
        out.push_str(close_tag(span));
    }
}

fn close_ended(out: &mut String, stack: &mut Vec<&Span>, pos: usize) {
    if !stack.iter().any(|s| s.end <= pos) {
        return;
    }

    let mut reopen = Vec::new();
    while let Some(span) = stack.pop() {
        out.push_str(close_tag(span));
        if span.end > pos {
            reopen.push(span);
        }
        if !stack.iter().any(|s| s.end <= pos) {
            break;
        }
    }

    for span in reopen.into_iter().rev() {
        out.push_str(&open_tag(span));
        stack.push(span);
    }
}
