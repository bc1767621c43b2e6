//! Tower mini-game: per-server sessions, the shop, and the menu state machine.
//!
//! Nothing in here talks to Discord; the game plugin does that.

pub mod error;
pub mod menu;
pub mod render;
pub mod session;
pub mod shop;
pub mod stage;
pub mod store;

pub use error::GameError;
pub use menu::{press, resume, Action, Menu, Notice};
pub use session::{Caller, Visibility};
pub use stage::StageTable;
pub use store::SessionStore;
