pub mod gui_session;
#[cfg(windows)]
pub mod sap_gui;
#[cfg(not(windows))]
pub mod sap_gui_unsupported;
pub mod session_locator;
pub mod settle;

pub use gui_session::{controls, GuiSession, VKey};
#[cfg(windows)]
pub use sap_gui::{SapGuiLocator, SapGuiSession};
#[cfg(not(windows))]
pub use sap_gui_unsupported::{SapGuiLocator, SapGuiSession};
pub use session_locator::{HeldSession, SessionHandle, SessionLocator};
pub use settle::Settle;
