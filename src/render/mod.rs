pub mod notices;
pub mod post;

pub use post::{RenderOptions, render_post};
