mod preview;

pub use self::preview::{Preview, PreviewOperation};

// Render and Http are Crux's built-in capabilities, used as they are.
pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub preview: Preview<Event>,
}
