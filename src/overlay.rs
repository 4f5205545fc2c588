use crate::constants::{INSTRUCTIONS_FADE, INSTRUCTIONS_ID, INSTRUCTIONS_TEXT};
use crate::dom;
use web_sys as web;

/// The "drag to make some noise" hint, created if the page does not provide one.
pub fn instructions(document: &web::Document) -> anyhow::Result<web::HtmlElement> {
    let el = dom::ensure_element(document, INSTRUCTIONS_ID)?;
    if el.text_content().map_or(true, |t| t.trim().is_empty()) {
        el.set_text_content(Some(INSTRUCTIONS_TEXT));
    }
    dom::set_styles(&el, [("transition", INSTRUCTIONS_FADE), ("pointer-events", "none")]);
    Ok(el)
}

#[inline]
pub fn set_visible(el: &web::HtmlElement, visible: bool) {
    _ = el
        .style()
        .set_property("opacity", if visible { "1" } else { "0" });
}
