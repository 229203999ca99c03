//! Frame assembler: deterministic meta-tag document construction.

use std::fmt::Write as _;

use shared::error::FrameError;

pub const FRAME_VERSION: &str = "vNext";
pub const MAX_BUTTONS: usize = 4;

const PAGE_TITLE: &str = "Frame Maze";
const OG_FALLBACK_IMAGE: &str = "https://example.com/img.png";

/// Inputs for one frame document.
#[derive(Debug, Clone)]
pub struct FrameProps {
    pub version: &'static str,
    pub image: String,
    pub buttons: Vec<String>,
    pub post_url: Option<String>,
}

/// Render the HTML document for a frame. All-or-nothing: an oversized
/// button set fails before any output is produced. Equal props yield
/// byte-identical documents.
pub fn frame_html(props: &FrameProps) -> Result<String, FrameError> {
    if props.buttons.len() > MAX_BUTTONS {
        return Err(FrameError::TooManyButtons(props.buttons.len()));
    }

    let mut tags = String::new();
    let _ = writeln!(
        tags,
        r#"<meta property="fc:frame" content="{}" />"#,
        escape_attr(props.version)
    );
    let _ = writeln!(
        tags,
        r#"<meta property="fc:frame:image" content="{}" />"#,
        escape_attr(&props.image)
    );
    for (index, button) in props.buttons.iter().enumerate() {
        let _ = writeln!(
            tags,
            r#"<meta property="fc:frame:button:{}" content="{}" />"#,
            index + 1,
            escape_attr(button)
        );
    }
    if let Some(post_url) = &props.post_url {
        let _ = writeln!(
            tags,
            r#"<meta property="fc:frame:post_url" content="{}" />"#,
            escape_attr(post_url)
        );
    }

    Ok(format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{PAGE_TITLE}</title>\n\
         <meta property=\"og:title\" content=\"{PAGE_TITLE}\" />\n\
         <meta property=\"og:image\" content=\"{OG_FALLBACK_IMAGE}\" />\n\
         {tags}\
         </head>\n\
         </html>\n"
    ))
}

fn escape_attr(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::FrameError;

    fn props(buttons: &[&str]) -> FrameProps {
        FrameProps {
            version: FRAME_VERSION,
            image: "x".to_string(),
            buttons: buttons.iter().map(|b| b.to_string()).collect(),
            post_url: None,
        }
    }

    #[test]
    fn five_buttons_fail_closed() {
        let result = frame_html(&props(&["a", "b", "c", "d", "e"]));
        assert!(matches!(result, Err(FrameError::TooManyButtons(5))));
    }

    #[test]
    fn two_buttons_emit_numbered_tags_in_order() {
        let html = frame_html(&props(&["a", "b"])).expect("html");
        let first = html
            .find(r#"<meta property="fc:frame:button:1" content="a" />"#)
            .expect("button 1");
        let second = html
            .find(r#"<meta property="fc:frame:button:2" content="b" />"#)
            .expect("button 2");
        assert!(first < second);
        assert!(!html.contains("fc:frame:button:3"));
    }

    #[test]
    fn post_url_tag_only_when_present() {
        let without = frame_html(&props(&["a"])).expect("html");
        assert!(!without.contains("fc:frame:post_url"));

        let mut with_post = props(&["a"]);
        with_post.post_url = Some("https://maze.example/frame".to_string());
        let html = frame_html(&with_post).expect("html");
        assert!(html.contains(
            r#"<meta property="fc:frame:post_url" content="https://maze.example/frame" />"#
        ));
    }

    #[test]
    fn version_tag_precedes_image_tag() {
        let html = frame_html(&props(&[])).expect("html");
        let version = html.find(r#"property="fc:frame""#).expect("version tag");
        let image = html.find(r#"property="fc:frame:image""#).expect("image tag");
        assert!(version < image);
        assert!(html.contains(r#"<meta property="fc:frame" content="vNext" />"#));
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut quoted = props(&[r#"say "go""#]);
        quoted.image = "https://img.example/?a=1&b=2".to_string();
        let html = frame_html(&quoted).expect("html");
        assert!(html.contains("say &quot;go&quot;"));
        assert!(html.contains("a=1&amp;b=2"));
    }

    #[test]
    fn equal_props_yield_identical_documents() {
        let a = frame_html(&props(&["up", "down"])).expect("html");
        let b = frame_html(&props(&["up", "down"])).expect("html");
        assert_eq!(a, b);
    }
}
