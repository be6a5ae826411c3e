//! Visual themes for the animated background.
//!
//! Every theme maps to a static [`Palette`]. Switching themes swaps which
//! palette table the engine reads; nothing is recomputed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `0.0..=1.0`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color, opacity replaced.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Multiply the existing alpha by `factor`.
	pub fn fade(self, factor: f64) -> Self {
		Self {
			a: (self.a * factor).clamp(0.0, 1.0),
			..self
		}
	}

	/// CSS color string: `#rrggbb` when opaque, `rgba(..)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Colors a theme contributes to the background.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
	/// Low-opacity fill drawn every frame; leaves motion trails instead of a hard clear.
	pub background: Color,
	/// Particle colors, one picked per particle at spawn.
	pub particles: &'static [Color],
	/// Stroke for connection lines.
	pub connection: Color,
	/// Accent for energy waves, gradient overlay and glitch bars.
	pub energy: Color,
	/// Stroke for the grid layer.
	pub grid: Color,
}

impl Palette {
	/// Particle color for a palette slot, wrapping around.
	pub fn particle(&self, index: usize) -> Color {
		if self.particles.is_empty() {
			return self.energy;
		}
		self.particles[index % self.particles.len()]
	}
}

static DARK: Palette = Palette {
	background: Color::rgba(0, 0, 0, 0.03),
	particles: &[
		Color::rgb(0, 255, 255),
		Color::rgb(255, 0, 255),
		Color::rgb(255, 255, 0),
		Color::rgb(0, 255, 136),
		Color::rgb(255, 0, 128),
	],
	connection: Color::rgba(0, 255, 255, 0.3),
	energy: Color::rgb(0, 255, 255),
	grid: Color::rgba(0, 255, 255, 0.1),
};

static LIGHT: Palette = Palette {
	background: Color::rgba(248, 250, 252, 0.02),
	particles: &[
		Color::rgb(59, 130, 246),  // Blue
		Color::rgb(139, 92, 246),  // Violet
		Color::rgb(6, 182, 212),   // Cyan
		Color::rgb(16, 185, 129),  // Emerald
		Color::rgb(245, 158, 11),  // Amber
	],
	connection: Color::rgba(59, 130, 246, 0.3),
	energy: Color::rgb(59, 130, 246),
	grid: Color::rgba(59, 130, 246, 0.1),
};

static CYBERPUNK: Palette = Palette {
	background: Color::rgba(10, 10, 10, 0.03),
	particles: &[
		Color::rgb(0, 255, 65),
		Color::rgb(255, 0, 128),
		Color::rgb(255, 255, 0),
		Color::rgb(0, 255, 255),
		Color::rgb(255, 69, 0),
	],
	connection: Color::rgba(0, 255, 65, 0.4),
	energy: Color::rgb(0, 255, 65),
	grid: Color::rgba(0, 255, 65, 0.15),
};

static NEON: Palette = Palette {
	background: Color::rgba(15, 15, 35, 0.02),
	particles: &[
		Color::rgb(255, 107, 157), // Pink
		Color::rgb(78, 205, 196),  // Turquoise
		Color::rgb(255, 230, 109), // Butter
		Color::rgb(168, 230, 207), // Mint
		Color::rgb(255, 138, 128), // Coral
	],
	connection: Color::rgba(255, 107, 157, 0.3),
	energy: Color::rgb(255, 107, 157),
	grid: Color::rgba(255, 107, 157, 0.12),
};

/// The fixed set of selectable themes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
	/// Cyan and magenta on black.
	#[default]
	Dark,
	/// Blues and violets on a pale tint.
	Light,
	/// High contrast greens and pinks.
	Cyberpunk,
	/// Pastel holographic tones.
	Neon,
}

impl Theme {
	/// All themes in menu order.
	pub const ALL: [Theme; 4] = [Theme::Dark, Theme::Light, Theme::Cyberpunk, Theme::Neon];

	/// Stable identifier used for persistence and CSS classes.
	pub fn id(self) -> &'static str {
		match self {
			Theme::Dark => "dark",
			Theme::Light => "light",
			Theme::Cyberpunk => "cyberpunk",
			Theme::Neon => "neon",
		}
	}

	/// Human-readable name for menus.
	pub fn name(self) -> &'static str {
		match self {
			Theme::Dark => "Dark Cyber",
			Theme::Light => "Light Neural",
			Theme::Cyberpunk => "Neon City",
			Theme::Neon => "Hologram",
		}
	}

	/// One-line menu description.
	pub fn description(self) -> &'static str {
		match self {
			Theme::Dark => "Classic dark cyberpunk theme",
			Theme::Light => "Clean light futuristic theme",
			Theme::Cyberpunk => "High contrast neon theme",
			Theme::Neon => "Vibrant holographic theme",
		}
	}

	/// CSS class applied to the document root while this theme is active.
	pub fn css_class(self) -> String {
		format!("theme-{}", self.id())
	}

	/// Static palette table for this theme.
	pub fn palette(self) -> &'static Palette {
		match self {
			Theme::Dark => &DARK,
			Theme::Light => &LIGHT,
			Theme::Cyberpunk => &CYBERPUNK,
			Theme::Neon => &NEON,
		}
	}
}

impl fmt::Display for Theme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.id())
	}
}

/// Returned when a string names no known theme.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme `{0}`")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
	type Err = UnknownTheme;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Theme::ALL
			.into_iter()
			.find(|t| t.id() == s.trim())
			.ok_or_else(|| UnknownTheme(s.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ids_round_trip_through_from_str() {
		for theme in Theme::ALL {
			assert_eq!(theme.id().parse::<Theme>(), Ok(theme));
		}
	}

	#[test]
	fn unknown_id_is_rejected() {
		let err = "ultraviolet".parse::<Theme>().unwrap_err();
		assert_eq!(err, UnknownTheme("ultraviolet".into()));
	}

	#[test]
	fn every_palette_has_five_particle_colors() {
		for theme in Theme::ALL {
			assert_eq!(theme.palette().particles.len(), 5, "{theme}");
		}
	}

	#[test]
	fn palette_slot_wraps() {
		let p = Theme::Neon.palette();
		assert_eq!(p.particle(5), p.particle(0));
	}

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(0, 255, 136).to_css(), "#00ff88");
		assert_eq!(
			Color::rgba(0, 255, 255, 0.3).to_css(),
			"rgba(0, 255, 255, 0.3)"
		);
		assert_eq!(Theme::Cyberpunk.css_class(), "theme-cyberpunk");
	}

	#[test]
	fn serde_uses_lowercase_ids() {
		let json = serde_json::to_string(&Theme::Cyberpunk).unwrap();
		assert_eq!(json, "\"cyberpunk\"");
		let back: Theme = serde_json::from_str("\"light\"").unwrap();
		assert_eq!(back, Theme::Light);
	}
}
