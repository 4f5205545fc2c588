#![cfg(target_arch = "wasm32")]
use arp_core::{Instrument, InstrumentConfig};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod overlay;
mod particles;
mod style;

pub(crate) type WebInstrument = Instrument<audio::WebAudio, particles::DomParticles, dom::WindowViewport>;
pub(crate) type SharedInstrument = Rc<RefCell<WebInstrument>>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("drag-arp starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    static STARTED: AtomicBool = AtomicBool::new(false);
    if STARTED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let body = document.body().ok_or_else(|| anyhow::anyhow!("no body"))?;
    dom::set_styles(&body, input::GESTURE_SURFACE_STYLES);

    let container = dom::ensure_element(&document, constants::PARTICLES_ID)?;
    let instructions = overlay::instructions(&document)?;

    let audio = audio::WebAudio::new()?;
    let animator = particles::DomParticles::new(document.clone(), container);
    let viewport = dom::WindowViewport::new(window.clone());
    let config = InstrumentConfig::default().with_seed(rand::random());
    let instrument = Rc::new(RefCell::new(Instrument::new(
        config, audio, animator, viewport,
    )?));

    events::wire_pointer_handlers(&window, instrument.clone());

    if !instrument.borrow_mut().start_onboarding() {
        log::warn!("onboarding did not start");
    }

    frame::start_loop(Rc::new(RefCell::new(frame::FrameContext::new(
        instrument,
        instructions,
    ))));
    Ok(())
}
