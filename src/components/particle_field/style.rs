//! Visual style descriptors.
//!
//! A single engine drives every background variant; a [`VisualStyle`] picks the
//! numeric parameters and which drawing layers are enabled.

use serde::Deserialize;

use super::particles::TIME_STEP;

/// Drawing layers that can be toggled per style.
#[derive(Clone, Debug, PartialEq)]
pub struct Layers {
	/// Fading tail behind each particle.
	pub trails: bool,
	/// Radial glow around each particle core.
	pub glow: bool,
	/// Lines between nearby particles.
	pub connections: bool,
	/// Expanding rings centered on the viewport.
	pub waves: bool,
	/// Slowly rotating linear gradient tinted with the energy color.
	pub gradient_overlay: bool,
	/// Full-surface gradient whose three stops cycle through the hue wheel.
	pub hue_cycle: bool,
	/// Grid lines; scrolling when `grid_scroll` is set, pulsing otherwise.
	pub grid: bool,
	/// Scroll the grid diagonally instead of pulsing it.
	pub grid_scroll: bool,
	/// Horizontal scanning band.
	pub scanline: bool,
	/// Bars sweeping across the middle of the viewport.
	pub data_streams: Option<DataStreams>,
	/// Random glitch bars.
	pub glitch: Glitch,
}

/// How often glitch bars are drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Glitch {
	/// No glitch bars.
	Off,
	/// Full-width bar with the given per-frame probability.
	Rare(f64),
	/// This many random bars every frame.
	Burst(usize),
}

/// Geometry of the data-stream layer.
///
/// Bar `i` sits at `x = (time * 100 + i * spacing) mod (width + wrap_pad) - lead_in`
/// and `y = sin(time + i) * amplitude + height / 2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataStreams {
	/// Bars drawn per frame.
	pub count: usize,
	/// Horizontal gap between consecutive bars.
	pub spacing: f64,
	/// Travel past the right edge before a bar re-enters.
	pub wrap_pad: f64,
	/// Shift applied after wrapping, so bars enter from off-screen.
	pub lead_in: f64,
	/// Vertical swing around the middle of the viewport.
	pub amplitude: f64,
	/// Bar width bounds `(min, max)`, rolled per frame. Equal bounds fix the width.
	pub width: (f64, f64),
	/// Bar height.
	pub height: f64,
	/// Upper bound of the per-bar alpha rolled each frame.
	pub max_alpha: f64,
}

/// Complete description of a background variant.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualStyle {
	/// Preset identifier, as accepted in the page config.
	pub name: &'static str,
	/// Active particle count kept constant across frames.
	pub particle_count: usize,
	/// Points kept per particle trail.
	pub trail_capacity: usize,
	/// Pointer repulsion radius in pixels. Zero disables pointer interaction.
	pub interaction_radius: f64,
	/// Maximum distance for a connection line.
	pub proximity_threshold: f64,
	/// Number of concurrent energy rings.
	pub wave_count: usize,
	/// Grid cell size in pixels.
	pub grid_size: f64,
	/// Clock advance per frame.
	pub time_step: f64,
	/// Shortest particle lifetime, in frames.
	pub life_min: f64,
	/// Longest particle lifetime, in frames (exclusive).
	pub life_max: f64,
	/// Enabled drawing layers.
	pub layers: Layers,
}

impl VisualStyle {
	/// Drifting particles with trails, glow, connections and energy waves (default).
	pub fn particle_field() -> Self {
		Self {
			name: "particle-field",
			particle_count: 150,
			trail_capacity: 10,
			interaction_radius: 150.0,
			proximity_threshold: 120.0,
			wave_count: 3,
			grid_size: 50.0,
			time_step: TIME_STEP,
			life_min: 200.0,
			life_max: 500.0,
			layers: Layers {
				trails: true,
				glow: true,
				connections: true,
				waves: true,
				gradient_overlay: true,
				hue_cycle: false,
				grid: false,
				grid_scroll: false,
				scanline: false,
				data_streams: None,
				glitch: Glitch::Off,
			},
		}
	}

	/// Scrolling grid, scanline, data streams and a lighter particle web.
	///
	/// Particles here ignore the pointer and live 50 to 150 frames.
	pub fn enhanced() -> Self {
		Self {
			name: "enhanced",
			particle_count: 100,
			trail_capacity: 0,
			interaction_radius: 0.0,
			proximity_threshold: 100.0,
			wave_count: 0,
			grid_size: 50.0,
			time_step: TIME_STEP,
			life_min: 50.0,
			life_max: 150.0,
			layers: Layers {
				trails: false,
				glow: false,
				connections: true,
				waves: false,
				gradient_overlay: false,
				hue_cycle: false,
				grid: true,
				grid_scroll: true,
				scanline: true,
				data_streams: Some(DataStreams {
					count: 10,
					spacing: 80.0,
					wrap_pad: 200.0,
					lead_in: 100.0,
					amplitude: 100.0,
					width: (10.0, 60.0),
					height: 2.0,
					max_alpha: 100.0 / 255.0,
				}),
				glitch: Glitch::Rare(0.01),
			},
		}
	}

	/// Pulsing static grid with vertical data streams, constant glitch bars
	/// and no particles.
	pub fn cyberpunk() -> Self {
		Self {
			name: "cyberpunk",
			particle_count: 0,
			trail_capacity: 0,
			interaction_radius: 0.0,
			proximity_threshold: 0.0,
			wave_count: 0,
			grid_size: 50.0,
			time_step: TIME_STEP,
			life_min: 200.0,
			life_max: 500.0,
			layers: Layers {
				trails: false,
				glow: false,
				connections: false,
				waves: false,
				gradient_overlay: false,
				hue_cycle: false,
				grid: true,
				grid_scroll: false,
				scanline: false,
				data_streams: Some(DataStreams {
					count: 20,
					spacing: 50.0,
					wrap_pad: 100.0,
					lead_in: 0.0,
					amplitude: 50.0,
					width: (2.0, 2.0),
					height: 10.0,
					max_alpha: 0.8,
				}),
				glitch: Glitch::Burst(5),
			},
		}
	}

	/// A slow hue-cycling gradient wash and nothing else.
	pub fn gradient() -> Self {
		Self {
			name: "gradient",
			particle_count: 0,
			trail_capacity: 0,
			interaction_radius: 0.0,
			proximity_threshold: 0.0,
			wave_count: 0,
			grid_size: 50.0,
			time_step: TIME_STEP / 2.0,
			life_min: 200.0,
			life_max: 500.0,
			layers: Layers {
				trails: false,
				glow: false,
				connections: false,
				waves: false,
				gradient_overlay: false,
				hue_cycle: true,
				grid: false,
				grid_scroll: false,
				scanline: false,
				data_streams: None,
				glitch: Glitch::Off,
			},
		}
	}

	/// Style for a named preset.
	pub fn from_preset(preset: StylePreset) -> Self {
		match preset {
			StylePreset::ParticleField => Self::particle_field(),
			StylePreset::Enhanced => Self::enhanced(),
			StylePreset::Cyberpunk => Self::cyberpunk(),
			StylePreset::Gradient => Self::gradient(),
		}
	}
}

impl Default for VisualStyle {
	fn default() -> Self {
		Self::particle_field()
	}
}

/// Named starting points for a [`FieldConfig`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylePreset {
	/// [`VisualStyle::particle_field`].
	#[default]
	ParticleField,
	/// [`VisualStyle::enhanced`].
	Enhanced,
	/// [`VisualStyle::cyberpunk`].
	Cyberpunk,
	/// [`VisualStyle::gradient`].
	Gradient,
}

/// Page-supplied configuration, read from an embedded JSON element.
///
/// Every field is optional; unset fields keep the preset's value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
	/// Base style the overrides apply to.
	pub preset: StylePreset,
	/// Overrides [`VisualStyle::particle_count`].
	pub particle_count: Option<usize>,
	/// Overrides [`VisualStyle::trail_capacity`].
	pub trail_capacity: Option<usize>,
	/// Overrides [`VisualStyle::interaction_radius`]; negative values clamp to zero.
	pub interaction_radius: Option<f64>,
	/// Overrides [`VisualStyle::proximity_threshold`]; negative values clamp to zero.
	pub proximity_threshold: Option<f64>,
}

impl FieldConfig {
	/// Resolve the preset and apply overrides.
	pub fn into_style(self) -> VisualStyle {
		let mut style = VisualStyle::from_preset(self.preset);
		if let Some(n) = self.particle_count {
			style.particle_count = n;
		}
		if let Some(n) = self.trail_capacity {
			style.trail_capacity = n;
		}
		if let Some(r) = self.interaction_radius {
			style.interaction_radius = r.max(0.0);
		}
		if let Some(t) = self.proximity_threshold {
			style.proximity_threshold = t.max(0.0);
		}
		style
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_is_particle_field() {
		let style = VisualStyle::default();
		assert_eq!(style.particle_count, 150);
		assert_eq!(style.trail_capacity, 10);
		assert_eq!(style.proximity_threshold, 120.0);
		assert_eq!((style.life_min, style.life_max), (200.0, 500.0));
		assert!(style.layers.connections);
		assert!(style.layers.data_streams.is_none());
	}

	#[test]
	fn empty_config_yields_default_preset() {
		let cfg: FieldConfig = serde_json::from_str("{}").unwrap();
		assert_eq!(cfg.into_style(), VisualStyle::particle_field());
	}

	#[test]
	fn preset_and_overrides_apply() {
		let cfg: FieldConfig = serde_json::from_str(
			r#"{ "preset": "enhanced", "particle_count": 42, "interaction_radius": -5 }"#,
		)
		.unwrap();
		let style = cfg.into_style();
		assert_eq!(style.name, "enhanced");
		assert_eq!(style.particle_count, 42);
		assert_eq!(style.interaction_radius, 0.0);
		assert!(style.layers.scanline);
	}

	#[test]
	fn enhanced_ignores_pointer_and_lives_short() {
		let style = VisualStyle::enhanced();
		assert_eq!(style.interaction_radius, 0.0);
		assert_eq!((style.life_min, style.life_max), (50.0, 150.0));
		let streams = style.layers.data_streams.unwrap();
		assert_eq!(streams.count, 10);
		assert_eq!(streams.height, 2.0);
	}

	#[test]
	fn cyberpunk_streams_are_fixed_width() {
		let streams = VisualStyle::cyberpunk().layers.data_streams.unwrap();
		assert_eq!(streams.count, 20);
		assert_eq!(streams.width, (2.0, 2.0));
		assert_eq!(streams.lead_in, 0.0);
	}

	#[test]
	fn gradient_preset_parses_and_runs_at_half_speed() {
		let cfg: FieldConfig = serde_json::from_str(r#"{ "preset": "gradient" }"#).unwrap();
		let style = cfg.into_style();
		assert_eq!(style, VisualStyle::gradient());
		assert_eq!(style.particle_count, 0);
		assert!(style.layers.hue_cycle);
		assert!(!style.layers.gradient_overlay);
		assert!((style.time_step - 0.005).abs() < 1e-12);
	}

	#[test]
	fn unknown_preset_fails_to_parse() {
		assert!(serde_json::from_str::<FieldConfig>(r#"{ "preset": "vaporwave" }"#).is_err());
	}
}
