//! The components module contains all shared components for our app.

mod app;
mod app_view;
mod audio_manager;
mod geolocation;
mod icons;
mod sidebar;
pub mod views;

pub use app::*;
pub use app_view::*;
pub use audio_manager::*;
pub use geolocation::*;
pub use icons::*;
pub use sidebar::*;
// Views are accessed via views::ViewName
