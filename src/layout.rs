//! Layout composition: structured parameters to a renderable document
//!
//! This is a pure transformation with no I/O. Identical requests always
//! produce byte-identical documents; the artifact filename timestamp is the
//! pipeline's concern and never enters the composition.

use crate::request::{Direction, GenerationRequest};
use crate::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Brightness factor applied to the background photo for text legibility
const BACKGROUND_BRIGHTNESS: f32 = 0.7;

/// Height of the contrast gradient strips at the top and bottom edges
const GRADIENT_STRIP_HEIGHT: u32 = 100;

/// Compose the complete HTML document for a validated request.
///
/// Geometry is fixed: a 1080x1080 canvas with absolutely positioned children.
/// The logo is pinned to the top corner opposite the reading direction, the
/// three text fragments flow centered near the bottom, and the decorative
/// flourish sits bottom-right regardless of direction.
pub fn compose_document(request: &GenerationRequest) -> String {
    let logo_corner = match request.direction {
        Direction::Ltr => "logo--right",
        Direction::Rtl => "logo--left",
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<style>
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  body {{ width: {w}px; height: {h}px; overflow: hidden; font-family: 'Helvetica Neue', Arial, sans-serif; }}
  .canvas {{ position: relative; width: {w}px; height: {h}px; background: #000; }}
  .background {{ position: absolute; top: 0; left: 0; width: 100%; height: 100%; object-fit: cover; filter: brightness({brightness}); }}
  .strip {{ position: absolute; left: 0; width: 100%; height: {strip}px; }}
  .strip--top {{ top: 0; background: linear-gradient(to bottom, rgba(0, 0, 0, 0.65), rgba(0, 0, 0, 0)); }}
  .strip--bottom {{ bottom: 0; background: linear-gradient(to top, rgba(0, 0, 0, 0.65), rgba(0, 0, 0, 0)); }}
  .logo {{ position: absolute; top: 48px; width: 120px; height: auto; }}
  .logo--right {{ right: 48px; }}
  .logo--left {{ left: 48px; }}
  .caption {{ position: absolute; bottom: 180px; left: 72px; right: 72px; display: flex; flex-wrap: wrap; justify-content: center; align-items: center; gap: 14px; text-align: center; }}
  .caption span {{ color: #fff; font-size: 52px; font-weight: 700; line-height: 1.3; text-shadow: 0 2px 8px rgba(0, 0, 0, 0.6); }}
  .caption .focus {{ background: {focus_color}; color: #fff; padding: 6px 28px; border-radius: 18px; box-shadow: 0 6px 16px rgba(0, 0, 0, 0.4); text-shadow: none; }}
  .flourish {{ position: absolute; bottom: 56px; right: 72px; }}
  .flourish div {{ height: 8px; border-radius: 4px; margin-top: 10px; }}
  .flourish .flourish--accent {{ width: 96px; background: {focus_color}; }}
  .flourish .flourish--plain {{ width: 64px; background: #fff; }}
</style>
</head>
<body>
<div class="canvas">
  <img class="background" src="{image_url}" alt="">
  <div class="strip strip--top"></div>
  <div class="strip strip--bottom"></div>
  <img class="logo {logo_corner}" src="{logo_url}" alt="">
  <p class="caption" dir="{dir}">
    <span>{text01}</span>
    <span class="focus">{focus_text}</span>
    <span>{text02}</span>
  </p>
  <div class="flourish">
    <div class="flourish--accent"></div>
    <div class="flourish--plain"></div>
  </div>
</div>
</body>
</html>
"#,
        lang = escape_html(&request.language),
        w = CANVAS_WIDTH,
        h = CANVAS_HEIGHT,
        brightness = BACKGROUND_BRIGHTNESS,
        strip = GRADIENT_STRIP_HEIGHT,
        focus_color = escape_html(&request.focus_text_color),
        image_url = escape_html(request.image_url.as_str()),
        logo_url = escape_html(request.logo_url.as_str()),
        logo_corner = logo_corner,
        dir = request.direction.dir_attr(),
        text01 = escape_html(&request.text01),
        focus_text = escape_html(&request.focus_text),
        text02 = escape_html(&request.text02),
    )
}

/// Minimal HTML entity escaping so user text cannot break the markup
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{GenerationPayload, DEFAULT_FOCUS_COLOR};

    fn request(direction: Option<&str>, color: Option<&str>) -> GenerationRequest {
        GenerationPayload {
            image_url: Some("https://x/a.png".into()),
            logo_url: Some("https://x/b.png".into()),
            text01: Some("Breaking".into()),
            focus_text: Some("news".into()),
            text02: Some("today".into()),
            direction: direction.map(Into::into),
            language: None,
            focus_text_color: color.map(Into::into),
        }
        .validate()
        .expect("fixture payload should validate")
    }

    #[test]
    fn identical_requests_compose_identical_documents() {
        let a = compose_document(&request(Some("ltr"), Some("#123456")));
        let b = compose_document(&request(Some("ltr"), Some("#123456")));
        assert_eq!(a, b);
    }

    #[test]
    fn logo_mirrors_with_direction() {
        let ltr = compose_document(&request(Some("ltr"), None));
        assert!(ltr.contains("logo logo--right"));
        assert!(!ltr.contains("logo logo--left"));

        let rtl = compose_document(&request(Some("rtl"), None));
        assert!(rtl.contains("logo logo--left"));
        assert!(!rtl.contains("logo logo--right"));

        // Omitted direction behaves as ltr
        let default = compose_document(&request(None, None));
        assert!(default.contains("logo logo--right"));
    }

    #[test]
    fn caption_direction_propagates() {
        let rtl = compose_document(&request(Some("rtl"), None));
        assert!(rtl.contains(r#"dir="rtl""#));
        let ltr = compose_document(&request(Some("ltr"), None));
        assert!(ltr.contains(r#"dir="ltr""#));
    }

    #[test]
    fn focus_color_substituted_into_pill_and_flourish() {
        let doc = compose_document(&request(None, Some("#1a2b3c")));
        assert_eq!(doc.matches("#1a2b3c").count(), 2);

        let default = compose_document(&request(None, None));
        assert!(default.contains(DEFAULT_FOCUS_COLOR));
    }

    #[test]
    fn canvas_dimensions_fixed() {
        let doc = compose_document(&request(None, None));
        assert!(doc.contains("width: 1080px"));
        assert!(doc.contains("height: 1080px"));
        assert!(doc.contains("brightness(0.7)"));
        assert!(doc.contains("height: 100px"));
    }

    #[test]
    fn fragments_ordered_and_escaped() {
        let mut req = request(None, None);
        req.text01 = "<b>unsafe</b>".into();
        let doc = compose_document(&req);
        assert!(doc.contains("&lt;b&gt;unsafe&lt;/b&gt;"));
        assert!(!doc.contains("<b>unsafe</b>"));

        // text01 before focusText before text02
        let doc = compose_document(&request(None, None));
        let i1 = doc.find("Breaking").unwrap();
        let i2 = doc.find("news").unwrap();
        let i3 = doc.find("today").unwrap();
        assert!(i1 < i2 && i2 < i3);
    }

    #[test]
    fn language_sets_document_locale_only() {
        let mut req = request(None, None);
        req.language = "ar".into();
        let doc = compose_document(&req);
        assert!(doc.contains(r#"<html lang="ar">"#));
        // Layout is not locale-dependent: only the lang attribute differs
        let mut other = request(None, None);
        other.language = "en".into();
        let base = compose_document(&other);
        assert_eq!(
            doc.replace(r#"lang="ar""#, r#"lang="en""#),
            base
        );
    }
}
