//! Canvas rendering for the particle field.
//!
//! Drawing happens in passes, back to front:
//! 1. Background fade and optional gradient overlay / hue cycle / grid
//! 2. Energy waves
//! 3. Connection lines
//! 4. Particles (trail, glow, core)
//! 5. Scanline, data streams and glitch bars
//!
//! Failed draw calls are ignored; a frame with a bad call is still presented.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::particles::{GlitchBar, Particle, ParticleField};
use super::theme::{Color, Palette};

const TRANSPARENT: &str = "rgba(0, 0, 0, 0)";

/// Renders one frame of the field to the canvas.
pub fn render(field: &ParticleField, ctx: &CanvasRenderingContext2d) {
	let palette = field.palette();
	let layers = &field.style().layers;

	draw_background(field, ctx, palette);
	if layers.gradient_overlay {
		draw_gradient_overlay(field, ctx, palette);
	}
	if layers.hue_cycle {
		draw_hue_cycle(field, ctx);
	}
	if layers.grid {
		draw_grid(field, ctx, palette);
	}
	if layers.waves {
		draw_energy_waves(field, ctx, palette);
	}
	if layers.connections {
		draw_connections(field, ctx, palette);
	}
	for p in field.particles() {
		if layers.trails {
			draw_trail(ctx, p);
		}
		draw_particle(ctx, p, layers.glow);
	}
	if layers.scanline {
		draw_scanline(field, ctx, palette);
	}
	draw_bars(ctx, field.streams(), palette);
	draw_bars(ctx, field.glitches(), palette);
}

fn draw_background(field: &ParticleField, ctx: &CanvasRenderingContext2d, palette: &Palette) {
	ctx.set_fill_style_str(&palette.background.to_css());
	ctx.fill_rect(0.0, 0.0, field.width(), field.height());
}

fn draw_gradient_overlay(field: &ParticleField, ctx: &CanvasRenderingContext2d, palette: &Palette) {
	let t = field.time();
	let gradient = ctx.create_linear_gradient(
		0.0,
		0.0,
		field.width() * (t * 0.5).cos(),
		field.height() * (t * 0.3).sin(),
	);
	let _ = gradient.add_color_stop(0.0, TRANSPARENT);
	let _ = gradient.add_color_stop(0.5, &palette.energy.with_alpha(5.0 / 255.0).to_css());
	let _ = gradient.add_color_stop(1.0, TRANSPARENT);

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, field.width(), field.height());
}

fn draw_hue_cycle(field: &ParticleField, ctx: &CanvasRenderingContext2d) {
	let g = field.hue_gradient();
	let gradient = ctx.create_linear_gradient(g.from.0, g.from.1, g.to.0, g.to.1);
	for (offset, hue) in [0.0, 0.5, 1.0].into_iter().zip(g.hues) {
		let _ = gradient.add_color_stop(offset, &format!("hsl({hue}, 100%, 50%)"));
	}

	ctx.set_global_alpha(0.05);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, field.width(), field.height());
	ctx.set_global_alpha(1.0);
}

fn draw_grid(field: &ParticleField, ctx: &CanvasRenderingContext2d, palette: &Palette) {
	let size = field.style().grid_size;
	if size <= 0.0 {
		return;
	}
	let (w, h) = (field.width(), field.height());
	let (ox, oy) = field.grid_offset();

	let color = if field.style().layers.grid_scroll {
		palette.grid
	} else {
		// Static grids pulse instead of scrolling.
		palette
			.grid
			.with_alpha((palette.grid.a + field.time().sin() * 0.05).clamp(0.0, 1.0))
	};
	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(1.0);
	ctx.begin_path();

	let mut x = -ox;
	while x < w + size {
		ctx.move_to(x, 0.0);
		ctx.line_to(x, h);
		x += size;
	}
	let mut y = -oy;
	while y < h + size {
		ctx.move_to(0.0, y);
		ctx.line_to(w, y);
		y += size;
	}
	ctx.stroke();
}

fn draw_energy_waves(field: &ParticleField, ctx: &CanvasRenderingContext2d, palette: &Palette) {
	let (cx, cy) = (field.width() / 2.0, field.height() / 2.0);
	ctx.set_stroke_style_str(&palette.energy.to_css());
	ctx.set_line_width(2.0);

	for wave in field.energy_waves() {
		ctx.set_global_alpha(wave.opacity);
		ctx.begin_path();
		let _ = ctx.arc(cx, cy, wave.radius, 0.0, PI * 2.0);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_connections(field: &ParticleField, ctx: &CanvasRenderingContext2d, palette: &Palette) {
	ctx.set_stroke_style_str(&palette.connection.to_css());
	ctx.set_line_width(1.0);

	for line in field.connections() {
		ctx.set_global_alpha(line.opacity);
		ctx.begin_path();
		ctx.move_to(line.from.0, line.from.1);
		ctx.line_to(line.to.0, line.to.1);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_trail(ctx: &CanvasRenderingContext2d, p: &Particle) {
	let len = p.trail.len();
	if len == 0 {
		return;
	}
	ctx.set_fill_style_str(&p.color.to_css());
	for (index, point) in p.trail.iter().enumerate() {
		ctx.set_global_alpha(point.alpha * index as f64 / len as f64);
		ctx.begin_path();
		let _ = ctx.arc(point.x, point.y, p.size * 0.3, 0.0, PI * 2.0);
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_particle(ctx: &CanvasRenderingContext2d, p: &Particle, glow: bool) {
	ctx.set_global_alpha(p.alpha);

	if glow {
		draw_glow(ctx, p.x, p.y, p.size * 3.0, p.color);
	}

	ctx.set_fill_style_str(&p.color.to_css());
	ctx.begin_path();
	let _ = ctx.arc(p.x, p.y, p.size, 0.0, PI * 2.0);
	ctx.fill();

	ctx.set_global_alpha(1.0);
}

fn draw_glow(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, color: Color) {
	let Ok(gradient) = ctx.create_radial_gradient(x, y, 0.0, x, y, radius) else {
		return;
	};
	let _ = gradient.add_color_stop(0.0, &color.to_css());
	let _ = gradient.add_color_stop(0.5, &color.fade(0.5).to_css());
	let _ = gradient.add_color_stop(1.0, TRANSPARENT);

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, PI * 2.0);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}

fn draw_scanline(field: &ParticleField, ctx: &CanvasRenderingContext2d, palette: &Palette) {
	let y = field.scanline_y();
	let gradient = ctx.create_linear_gradient(0.0, y - 50.0, 0.0, y + 50.0);
	let _ = gradient.add_color_stop(0.0, TRANSPARENT);
	let _ = gradient.add_color_stop(0.5, &palette.energy.with_alpha(0x60 as f64 / 255.0).to_css());
	let _ = gradient.add_color_stop(1.0, TRANSPARENT);

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, y - 50.0, field.width(), 100.0);
}

fn draw_bars(ctx: &CanvasRenderingContext2d, bars: &[GlitchBar], palette: &Palette) {
	for bar in bars {
		ctx.set_fill_style_str(&palette.energy.with_alpha(bar.alpha).to_css());
		ctx.fill_rect(bar.x, bar.y, bar.width, bar.height);
	}
}
