mod feeders;
pub mod form;
mod input;
mod output;
mod styles;
mod tui;
mod view;

pub use feeders::spawn_tui_feeders;
pub use form::FormDefaults;
pub use tui::{TuiActor, TuiMsg, TuiSettings};
pub use view::{SUBTITLE, TITLE};
