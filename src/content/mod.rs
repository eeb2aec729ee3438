mod date;
mod post;
mod rich_text;

/// 文章在 CMS 中的文档类型
pub const POST_TYPE: &str = "posts";

pub use self::{
    date::{format_publication_date, parse_cms_datetime},
    post::{Banner, ContentSection, PostDetail, PostSummary, reading_time},
    rich_text::{BlockKind, Embed, RichTextBlock, Span, SpanData, SpanKind, as_html, as_text},
};
