use axum::http::StatusCode;
use maud::{Markup, html};

use super::layout;
use crate::content::{PostDetail, as_html};

/// 文章页的渲染状态
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    /// 页面尚未生成，显示过渡占位并自动刷新
    Loading,
    Ready(PostDetail),
    NotFound,
    /// 获取失败，原因只写入日志，不展示给访客
    Error(String),
}

impl DetailView {
    pub fn status(&self) -> StatusCode {
        match self {
            DetailView::Loading | DetailView::Ready(_) => StatusCode::OK,
            DetailView::NotFound => StatusCode::NOT_FOUND,
            DetailView::Error(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn render(&self) -> Markup {
        match self {
            DetailView::Loading => layout(
                "Carregando",
                true,
                html! { main.container { div.loading { "Carregando..." } } },
            ),
            DetailView::Ready(post) => layout(&post.title, false, ready(post)),
            DetailView::NotFound => layout(
                "Post não encontrado",
                false,
                html! {
                    main.container.not-found {
                        h1 { "Post não encontrado" }
                        a href="/" { "Voltar para a página inicial" }
                    }
                },
            ),
            DetailView::Error(_) => layout(
                "Erro",
                false,
                html! {
                    main.container.error {
                        h1 { "Não foi possível carregar este post" }
                        p.error-reason { "O conteúdo está temporariamente indisponível." }
                        a href="" { "Tentar novamente" }
                    }
                },
            ),
        }
    }
}

fn ready(post: &PostDetail) -> Markup {
    html! {
        @if let Some(url) = &post.banner.url {
            img.banner src=(url) alt=(post.banner.alt.as_deref().unwrap_or(&post.title));
        }
        main.container {
            article.post {
                h1 { (post.title) }
                div.post-info {
                    @if let Some(date) = &post.first_publication_date {
                        time.post-info-item { (date) }
                    }
                    span.post-info-item { (post.author) }
                    span.post-info-item { (post.reading_time_minutes) " min" }
                }
                @for section in &post.content {
                    section.post-section {
                        h2 { (section.heading) }
                        div.post-body { (as_html(&section.body)) }
                    }
                }
            }
        }
    }
}
