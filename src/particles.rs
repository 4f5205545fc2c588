use crate::constants::{ANIMATED_CLASS, NOTE_CLASS};
use crate::dom;
use crate::style::{batch_placement, piece_class, piece_vars};
use anyhow::anyhow;
use arp_core::{ParticleAnimator, ParticleBatch};
use wasm_bindgen::JsCast;
use web_sys as web;

/// Turns particle batches into DOM nodes under a fixed, click-through container.
pub struct DomParticles {
    document: web::Document,
    container: web::HtmlElement,
    notes: Vec<web::HtmlElement>,
}

impl DomParticles {
    pub fn new(document: web::Document, container: web::HtmlElement) -> Self {
        dom::set_styles(
            &container,
            [
                ("position", "fixed"),
                ("inset", "0"),
                ("overflow", "hidden"),
                ("pointer-events", "none"),
            ],
        );
        Self {
            document,
            container,
            notes: Vec::new(),
        }
    }

    fn div(&self, class: &str) -> anyhow::Result<web::HtmlElement> {
        let el = self
            .document
            .create_element("div")
            .map_err(|e| anyhow!("{:?}", e))?;
        el.set_class_name(class);
        el.dyn_into::<web::HtmlElement>()
            .map_err(|e| anyhow!("{:?}", e))
    }

    fn build(&self, batch: &ParticleBatch) -> anyhow::Result<web::HtmlElement> {
        let note = self.div(NOTE_CLASS)?;
        let placement = batch_placement(batch.position);
        dom::set_styles(
            &note,
            placement.iter().map(|(k, v)| (*k, v.as_str())),
        );
        for piece in &batch.pieces {
            let el = self.div(&piece_class(piece))?;
            let vars = piece_vars(piece);
            dom::set_styles(&el, vars.iter().map(|(k, v)| (*k, v.as_str())));
            note.append_child(&el).map_err(|e| anyhow!("{:?}", e))?;
        }
        self.container
            .append_child(&note)
            .map_err(|e| anyhow!("{:?}", e))?;
        // Flush layout so the class change below starts the transition.
        _ = note.offset_width();
        _ = note.class_list().add_1(ANIMATED_CLASS);
        Ok(note)
    }
}

impl ParticleAnimator for DomParticles {
    fn animate(&mut self, batch: &ParticleBatch) {
        match self.build(batch) {
            Ok(note) => self.notes.push(note),
            Err(e) => log::error!("[particles] batch {} not rendered: {:?}", batch.sequence, e),
        }
    }

    fn clear(&mut self) {
        log::debug!("[particles] removing {} batches", self.notes.len());
        for note in self.notes.drain(..) {
            note.remove();
        }
    }
}
