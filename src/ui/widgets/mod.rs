//! TUI widgets.

mod arbi_table;
mod help;
mod login_form;
mod notifications;
mod status_bar;
mod tab_bar;
mod user_list;

pub use arbi_table::{PairTable, TrackTable};
pub use help::HelpPanel;
pub use login_form::LoginFormWidget;
pub use notifications::{render_error, render_notification};
pub use status_bar::{StatusBar, format_countdown};
pub use tab_bar::TabBar;
pub use user_list::UserList;
