//! Side effects the core asks the shell to perform.
//!
//! Crux's built-in Render capability covers view updates; the one remote
//! fetch goes through `crux_http`.
mod http;

pub use crux_core::render::Render;
pub use crux_http::Http;

pub use self::http::{into_http_result, HttpError, HttpResponse, HttpResult, ValidatedUrl};

use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
}
