use crate::overlay;
use crate::SharedInstrument;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

pub struct FrameContext {
    pub instrument: SharedInstrument,
    pub instructions: web::HtmlElement,
    pub instructions_shown: bool,
    pub started: Instant,
}

impl FrameContext {
    pub fn new(instrument: SharedInstrument, instructions: web::HtmlElement) -> Self {
        overlay::set_visible(&instructions, true);
        Self {
            instrument,
            instructions,
            instructions_shown: true,
            started: Instant::now(),
        }
    }

    pub fn frame(&mut self) {
        let now = self.started.elapsed();
        let visible = {
            let mut inst = self.instrument.borrow_mut();
            inst.frame(now);
            inst.audio_mut().pump();
            inst.instructions_visible()
        };
        if visible != self.instructions_shown {
            self.instructions_shown = visible;
            overlay::set_visible(&self.instructions, visible);
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref().map(|c| JsValue::clone(c.as_ref())))
    else {
        return;
    };
    _ = w.request_animation_frame(cb.unchecked_ref());
}
