//! portfolio-field: animated particle background for a portfolio page.
//!
//! This crate provides a WASM-based background component that renders drifting,
//! pointer-reactive particles on a canvas, together with a persisted theme store
//! that every themed surface subscribes to.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

// Only needed to enable the `js` backend for `rand` on wasm.
use getrandom as _;

pub mod components;

pub use components::particle_field::{
	FieldConfig, ParticleField, ParticleFieldCanvas, Theme, ThemeStore, ThemeToggle, VisualStyle,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("portfolio-field: logging initialized");
}

/// Parse a field configuration document.
pub fn parse_field_config(json: &str) -> Result<VisualStyle, serde_json::Error> {
	serde_json::from_str::<FieldConfig>(json).map(FieldConfig::into_style)
}

/// Load the background style from a script element with id="field-config".
/// Expected format: JSON with optional { preset, particle_count, ... }
fn load_field_style() -> Option<VisualStyle> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("field-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match parse_field_config(&json_text) {
		Ok(style) => {
			info!(
				"portfolio-field: loaded style {} with {} particles",
				style.name, style.particle_count
			);
			Some(style)
		}
		Err(e) => {
			warn!("portfolio-field: failed to parse field config: {}", e);
			None
		}
	}
}

/// Main application component.
/// Restores the theme, loads the background style from the DOM and mounts both.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let store = ThemeStore::from_browser();
	let style = load_field_style().unwrap_or_default();

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Portfolio" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<ParticleFieldCanvas store=store.clone() style=style />
		<div class="theme-toggle-anchor">
			<ThemeToggle store=store />
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn config_document_selects_preset() {
		let style = parse_field_config(r#"{ "preset": "cyberpunk" }"#).unwrap();
		assert_eq!(style, VisualStyle::cyberpunk());
	}

	#[test]
	fn malformed_config_is_an_error() {
		assert!(parse_field_config("{ preset: ").is_err());
	}
}
