use crate::input::viewport_from_inner;
use anyhow::anyhow;
use arp_core::{Viewport, ViewportSource};
use wasm_bindgen::JsCast;
use web_sys as web;

/// Look up `#id`, creating a `div` with that id under `<body>` if the page lacks one.
pub fn ensure_element(document: &web::Document, id: &str) -> anyhow::Result<web::HtmlElement> {
    let el = match document.get_element_by_id(id) {
        Some(el) => el,
        None => {
            let el = document
                .create_element("div")
                .map_err(|e| anyhow!("{:?}", e))?;
            el.set_id(id);
            let body = document.body().ok_or_else(|| anyhow!("no body"))?;
            body.append_child(&el).map_err(|e| anyhow!("{:?}", e))?;
            el
        }
    };
    el.dyn_into::<web::HtmlElement>()
        .map_err(|e| anyhow!("#{} is not an HTML element: {:?}", id, e))
}

#[inline]
pub fn set_styles<'a>(el: &web::HtmlElement, props: impl IntoIterator<Item = (&'a str, &'a str)>) {
    let style = el.style();
    for (name, value) in props {
        _ = style.set_property(name, value);
    }
}

/// Browser window measured on every call, so resizes are picked up mid-gesture.
pub struct WindowViewport(web::Window);

impl WindowViewport {
    pub fn new(window: web::Window) -> Self {
        Self(window)
    }
}

impl ViewportSource for WindowViewport {
    fn viewport(&self) -> Viewport {
        viewport_from_inner(
            self.0.inner_width().ok().and_then(|v| v.as_f64()),
            self.0.inner_height().ok().and_then(|v| v.as_f64()),
        )
    }
}
