//! Form rendering module
//!
//! - `field_renderer`: single field with its validation message
//! - `registration_form`: club and sponsor forms with the action panel

mod field_renderer;
mod registration_form;

pub use registration_form::draw as draw_registration_form;
