//! 页面模板
//!
//! 所有页面使用 maud 渲染，动态内容统一转义。

mod header;
mod home;
mod post;

use maud::{DOCTYPE, Markup, html};

pub use self::{
    header::{LOGO_SVG, header},
    home::{home, post_items},
    post::DetailView,
};

/// 站点名称，用于页面标题
pub const SITE_NAME: &str = "spacetraveling";

/// 页面骨架：`<head>`、顶部 logo 和正文
///
/// `refresh` 为真时页面每秒自动刷新一次，用于等待后台生成。
pub fn layout(title: &str, refresh: bool, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                @if refresh {
                    meta http-equiv="refresh" content="1";
                }
                title { (title) " | " (SITE_NAME) }
            }
            body {
                (header())
                (body)
            }
        }
    }
}
