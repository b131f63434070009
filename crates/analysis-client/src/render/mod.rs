//! HTML renderers for analysis results.
//!
//! Every renderer is a pure function from a response to an HTML fragment.
//! Server-provided text is escaped; image payloads are inlined as data URIs.

mod cover;
mod skating;

pub use cover::{render_analysis, render_genre_stats, render_similarity};
pub use skating::{
    render_contrastive, render_jump_analyses, render_overlay, render_skating_overview,
    render_skating_report, render_video_failure, FrameOverlay, METRIC_ALLOW_LIST,
};

/// Escape text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `data:` URI for a base64 PNG payload.
pub(crate) fn png_src(base64: &str) -> String {
    format!("data:image/png;base64,{}", escape(base64))
}

const REPORT_STYLE: &str = "body{font-family:sans-serif;margin:2em;background:#fafafa}\
.error,.error-message{color:#c33;background:#fee;padding:15px;border-radius:8px}\
table{border-collapse:collapse;width:100%}th,td{padding:8px 12px;border-bottom:1px solid #ddd}\
.jump-gallery{cursor:pointer;display:inline-block;margin:0 25px 15px 0;text-align:center}\
.frames-overlay{position:fixed;inset:0;background:rgba(0,0,0,.9);display:flex;flex-wrap:wrap;\
align-items:center;justify-content:center;gap:15px;z-index:1000;padding:20px}\
.frames-overlay[hidden]{display:none}.overlay-close{position:absolute;top:20px;right:20px;\
color:#fff;font-size:24px;cursor:pointer}.positive{color:#2a7}.negative{color:#c33}";

const REPORT_SCRIPT: &str = "document.querySelectorAll('.jump-gallery').forEach(g=>g.onclick=()=>\
{const o=document.getElementById(g.dataset.overlay);if(o)o.hidden=false;});\
document.querySelectorAll('.frames-overlay').forEach(o=>o.onclick=()=>{o.hidden=true;});";

/// Wrap rendered fragments into a standalone HTML document.
pub fn report_page(title: &str, fragments: &[String]) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>{REPORT_STYLE}</style>\n</head>\n<body>\n<h1>{title}</h1>\n{body}\n\
         <script>{REPORT_SCRIPT}</script>\n</body>\n</html>\n",
        title = escape(title),
        body = fragments.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"Tom & Jerry's"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_report_page_wraps_fragments() {
        let page = report_page("Cover <1>", &["<p>a</p>".to_string(), "<p>b</p>".to_string()]);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Cover &lt;1&gt;</title>"));
        assert!(page.contains("<p>a</p>\n<p>b</p>"));
    }
}
