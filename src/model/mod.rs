pub mod config;
pub mod event;
pub mod flow;
pub mod item;
pub mod record;
pub mod section;
pub mod settings;

pub use config::*;
pub use event::*;
pub use flow::*;
pub use item::*;
pub use record::*;
pub use section::*;
pub use settings::*;
