//! Animated particle background driven by a shared theme store.
//!
//! Renders a full-viewport canvas with:
//! - Drifting particles with perspective sizing, fading trails and glow
//! - Pointer repulsion and connection lines between nearby particles
//! - Expanding energy waves, grid, scanline and glitch layers per style
//! - Palettes that follow the active [`Theme`] via [`ThemeStore`] subscriptions
//!
//! # Example
//!
//! ```ignore
//! use portfolio_field::{ParticleFieldCanvas, ThemeStore, ThemeToggle, VisualStyle};
//!
//! let store = ThemeStore::from_browser();
//! view! {
//!     <ParticleFieldCanvas store=store.clone() style=VisualStyle::enhanced() />
//!     <ThemeToggle store=store />
//! }
//! ```

mod component;
pub mod particles;
mod render;
pub mod store;
pub mod style;
pub mod theme;

pub use component::{FieldError, ParticleFieldCanvas, ThemeToggle};
pub use particles::ParticleField;
pub use store::{ThemeStore, ThemeStorage};
pub use style::{FieldConfig, VisualStyle};
pub use theme::Theme;
