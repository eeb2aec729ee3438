use maud::{Markup, PreEscaped, html};

use super::layout;
use crate::{content::PostSummary, pagination::ListState};

/// 浏览器端“加载更多”：请求期间禁用按钮，失败时显示错误并允许重试
const LOAD_MORE_SCRIPT: &str = r#"
(function () {
  var button = document.querySelector('[data-load-more]');
  if (!button) return;
  var list = document.querySelector('[data-posts]');
  var error = document.querySelector('[data-load-error]');

  button.addEventListener('click', function () {
    if (button.disabled) return;
    button.disabled = true;
    error.hidden = true;

    fetch('/api/posts?cursor=' + encodeURIComponent(button.dataset.cursor))
      .then(function (res) {
        if (!res.ok) throw new Error('status ' + res.status);
        return res.json();
      })
      .then(function (page) {
        var tpl = document.createElement('template');
        tpl.innerHTML = page.html;
        Array.from(tpl.content.children).forEach(function (item) {
          var uid = item.getAttribute('data-uid');
          if (!list.querySelector('[data-uid="' + CSS.escape(uid) + '"]')) {
            list.appendChild(item);
          }
        });
        if (page.next_cursor === null) {
          button.remove();
        } else {
          button.dataset.cursor = page.next_cursor;
          button.disabled = false;
        }
      })
      .catch(function () {
        error.hidden = false;
        button.disabled = false;
      });
  });
})();
"#;

/// 文章列表项，首页和 `/api/posts` 共用
pub fn post_items(posts: &[PostSummary]) -> Markup {
    html! {
        @for post in posts {
            div.post data-uid=(post.uid) {
                a href={ "/post/" (post.uid) } {
                    strong { (post.title) }
                }
                p { (post.subtitle) }
                div.post-info {
                    @if let Some(date) = &post.first_publication_date {
                        time.post-info-item { (date) }
                    }
                    span.post-info-item { (post.author) }
                }
            }
        }
    }
}

/// 首页
///
/// 游标耗尽时不渲染“加载更多”按钮。
pub fn home(state: &ListState) -> Markup {
    let body = html! {
        main.container {
            div.posts data-posts {
                (post_items(&state.posts))
            }
            @if let Some(cursor) = &state.cursor {
                button.load-more-posts type="button" data-load-more data-cursor=(cursor.as_str()) disabled[state.loading] {
                    "Carregar mais posts"
                }
                p.load-error data-load-error hidden {
                    "Não foi possível carregar mais posts. Tente novamente."
                }
                script { (PreEscaped(LOAD_MORE_SCRIPT)) }
            }
        }
    };

    layout("Home", false, body)
}
