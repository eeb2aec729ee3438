use maud::{Markup, html};

/// 站点 logo
pub const LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="239" height="27" viewBox="0 0 239 27" fill="none"><circle cx="13" cy="13.5" r="12" stroke="#FF57B2" stroke-width="2"/><path d="M7 19L19 8" stroke="#F9F8FF" stroke-width="2" stroke-linecap="round"/><text x="34" y="21" fill="#F9F8FF" font-family="Inter, sans-serif" font-size="20" font-weight="700">spacetraveling<tspan fill="#FF57B2">.</tspan></text></svg>"##;

/// 页面顶部的 logo，点击返回首页
pub fn header() -> Markup {
    html! {
        header.header-container {
            div.header-content {
                a href="/" {
                    img src="/images/logo.svg" alt="logo";
                }
            }
        }
    }
}
