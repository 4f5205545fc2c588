use crate::input::{client_to_position, PointerAction, PointerTracker};
use crate::SharedInstrument;
use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Route window pointer events into the instrument.
///
/// Listening on the window (rather than an element) keeps the gesture alive
/// when the pointer leaves the page body mid-drag.
pub fn wire_pointer_handlers(window: &web::Window, instrument: SharedInstrument) {
    let tracker = Rc::new(RefCell::new(PointerTracker::default()));
    for kind in ["pointerdown", "pointermove", "pointerup", "pointercancel"] {
        let instrument = instrument.clone();
        let tracker = tracker.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let id = ev.pointer_id();
            let action = match kind {
                "pointerdown" => tracker.borrow_mut().down(id, ev.is_primary()),
                "pointermove" => tracker.borrow().moved(id),
                _ => tracker.borrow_mut().up(id),
            };
            handle(&instrument, action, &ev);
        }) as Box<dyn FnMut(_)>);
        _ = window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

fn handle(instrument: &SharedInstrument, action: PointerAction, ev: &web::PointerEvent) {
    let client = Vec2::new(ev.client_x() as f32, ev.client_y() as f32);
    let position = client_to_position(client, Vec2::ZERO);
    if action.claims_default() {
        ev.prevent_default();
    }
    let mut inst = instrument.borrow_mut();
    match (action, position) {
        (PointerAction::Down, Some(p)) => {
            inst.audio().resume();
            inst.pointer_down(p);
        }
        (PointerAction::Move, Some(p)) => inst.pointer_move(p),
        (PointerAction::Up, _) => inst.pointer_up(),
        _ => {}
    }
}
