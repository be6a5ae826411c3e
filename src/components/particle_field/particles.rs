//! Particle simulation for the animated background.
//!
//! The field keeps a fixed number of particle slots. Each frame every particle
//! is advanced; slots whose life ran out are pushed onto a free list and
//! respawned in place before the frame ends, so the population never changes
//! and no per-frame allocation happens after startup.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::style::{DataStreams, Glitch, VisualStyle};
use super::theme::{Color, Palette, Theme};

/// Depth range for the synthetic z coordinate.
pub const DEPTH: f64 = 1000.0;
/// Velocity impulse at zero distance from the pointer.
pub const REPULSION_STRENGTH: f64 = 0.5;
/// Alpha boost at zero distance from the pointer.
pub const PROXIMITY_BOOST: f64 = 0.1;
/// Opacity of a connection line between two coincident particles.
pub const CONNECTION_OPACITY: f64 = 0.3;
/// Ring radius growth per clock unit.
pub const WAVE_SPEED: f64 = 100.0;
/// Radius gap between consecutive rings.
pub const WAVE_SPACING: f64 = 100.0;
/// Radius at which a ring wraps back to zero.
pub const WAVE_MAX_RADIUS: f64 = 800.0;
/// Opacity of a ring at radius zero.
pub const WAVE_OPACITY: f64 = 0.1;
/// Horizontal data-stream travel per clock unit.
pub const STREAM_SPEED: f64 = 100.0;
/// Default simulation clock advance per frame.
pub const TIME_STEP: f64 = 0.01;

const MAX_ALPHA_FROM_LIFE: f64 = 0.8;
const MIN_SIZE: f64 = 0.5;
const BASE_SIZE: f64 = 3.0;

/// A recorded past position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
	/// Horizontal position.
	pub x: f64,
	/// Vertical position.
	pub y: f64,
	/// Half the particle's alpha when recorded.
	pub alpha: f64,
}

/// Bounded history of positions; the oldest point is evicted first.
#[derive(Clone, Debug)]
pub struct Trail {
	points: VecDeque<TrailPoint>,
	capacity: usize,
}

impl Trail {
	/// Empty trail holding at most `capacity` points.
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			points: VecDeque::with_capacity(capacity),
			capacity,
		}
	}

	/// Record a point, evicting the oldest when full.
	pub fn push(&mut self, point: TrailPoint) {
		if self.capacity == 0 {
			return;
		}
		if self.points.len() == self.capacity {
			self.points.pop_front();
		}
		self.points.push_back(point);
	}

	/// Number of recorded points.
	pub fn len(&self) -> usize {
		self.points.len()
	}

	/// Whether no point is recorded.
	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}

	/// Maximum number of points kept.
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Points from oldest to newest.
	pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
		self.points.iter()
	}

	fn clear(&mut self) {
		self.points.clear();
	}
}

/// One animated dot.
#[derive(Clone, Debug)]
pub struct Particle {
	/// Horizontal position in pixels.
	pub x: f64,
	/// Vertical position in pixels.
	pub y: f64,
	/// Synthetic depth, only used for perspective sizing.
	pub z: f64,
	/// Horizontal velocity per frame.
	pub vx: f64,
	/// Vertical velocity per frame.
	pub vy: f64,
	/// Depth velocity per frame.
	pub vz: f64,
	/// Core radius, recomputed from depth each frame.
	pub size: f64,
	/// Fixed at spawn from the palette active at that moment.
	pub color: Color,
	/// Current opacity.
	pub alpha: f64,
	/// Frames left before the slot is recycled.
	pub life: f64,
	/// Lifetime rolled at spawn.
	pub max_life: f64,
	/// Recent positions.
	pub trail: Trail,
	boost: f64,
}

/// Apparent size for a given depth.
pub fn perspective_size(z: f64) -> f64 {
	(BASE_SIZE * DEPTH / (DEPTH + z)).max(MIN_SIZE)
}

/// Wrap `v` into `0..=max`, re-entering at the opposite edge.
fn wrap(v: f64, max: f64) -> f64 {
	if v < 0.0 {
		max
	} else if v > max {
		0.0
	} else {
		v
	}
}

/// Lifetime in frames, drawn from `min..max` and never below one frame.
fn roll_lifetime<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
	let min = min.max(1.0);
	if max > min { rng.gen_range(min..max) } else { min }
}

impl Particle {
	fn spawn<R: Rng>(
		rng: &mut R,
		width: f64,
		height: f64,
		palette: &Palette,
		style: &VisualStyle,
	) -> Self {
		let mut p = Self {
			x: 0.0,
			y: 0.0,
			z: 0.0,
			vx: 0.0,
			vy: 0.0,
			vz: 0.0,
			size: 0.0,
			color: palette.energy,
			alpha: 0.0,
			life: 0.0,
			max_life: 0.0,
			trail: Trail::with_capacity(style.trail_capacity),
			boost: 0.0,
		};
		p.respawn(rng, width, height, palette, (style.life_min, style.life_max));
		p
	}

	/// Reinitialize this slot as a fresh particle, keeping the trail buffer.
	fn respawn<R: Rng>(
		&mut self,
		rng: &mut R,
		width: f64,
		height: f64,
		palette: &Palette,
		(life_min, life_max): (f64, f64),
	) {
		let max_life = roll_lifetime(rng, life_min, life_max);
		self.x = rng.gen_range(0.0..1.0) * width;
		self.y = rng.gen_range(0.0..1.0) * height;
		self.z = rng.gen_range(0.0..DEPTH);
		self.vx = rng.gen_range(-1.0..1.0);
		self.vy = rng.gen_range(-1.0..1.0);
		self.vz = rng.gen_range(-2.5..2.5);
		self.size = rng.gen_range(1.0..5.0);
		self.color = palette.particle(rng.gen_range(0..palette.particles.len().max(1)));
		self.alpha = rng.gen_range(0.2..1.0);
		self.life = max_life;
		self.max_life = max_life;
		self.boost = 0.0;
		self.trail.clear();
	}

	/// Advance one frame. Returns `false` once the particle has expired.
	fn advance(&mut self, width: f64, height: f64, pointer: Option<(f64, f64)>, radius: f64) -> bool {
		self.trail.push(TrailPoint {
			x: self.x,
			y: self.y,
			alpha: self.alpha * 0.5,
		});

		self.x += self.vx;
		self.y += self.vy;
		self.z += self.vz;

		self.boost = 0.0;
		if let Some((px, py)) = pointer {
			let (dx, dy) = (self.x - px, self.y - py);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist < radius {
				let force = (radius - dist) / radius;
				let (ux, uy) = if dist > 0.0 {
					(dx / dist, dy / dist)
				} else {
					(1.0, 0.0)
				};
				self.vx += ux * force * REPULSION_STRENGTH;
				self.vy += uy * force * REPULSION_STRENGTH;
				self.boost = force * PROXIMITY_BOOST;
			}
		}

		self.size = perspective_size(self.z);

		self.x = wrap(self.x, width);
		self.y = wrap(self.y, height);
		self.z = wrap(self.z, DEPTH);

		self.life -= 1.0;
		let ratio = (self.life / self.max_life).max(0.0);
		self.alpha = (ratio * MAX_ALPHA_FROM_LIFE + self.boost).min(1.0);

		self.life > 0.0
	}
}

/// One expanding energy ring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wave {
	/// Ring radius in pixels.
	pub radius: f64,
	/// Stroke opacity.
	pub opacity: f64,
}

/// Ring `index` at simulation time `time`.
pub fn energy_wave(time: f64, index: usize) -> Wave {
	let radius = (time * WAVE_SPEED + index as f64 * WAVE_SPACING).rem_euclid(WAVE_MAX_RADIUS);
	Wave {
		radius,
		opacity: (1.0 - radius / WAVE_MAX_RADIUS) * WAVE_OPACITY,
	}
}

/// Opacity of a connection line at `distance`, or `None` past the threshold.
pub fn connection_opacity(distance: f64, threshold: f64) -> Option<f64> {
	if distance < threshold {
		Some((1.0 - distance / threshold) * CONNECTION_OPACITY)
	} else {
		None
	}
}

/// A line to draw between two particles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
	/// First endpoint.
	pub from: (f64, f64),
	/// Second endpoint.
	pub to: (f64, f64),
	/// Stroke opacity.
	pub opacity: f64,
}

/// A filled rectangle rolled for the current frame (glitch or data-stream bar).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlitchBar {
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
	/// Bar width.
	pub width: f64,
	/// Bar height.
	pub height: f64,
	/// Fill opacity.
	pub alpha: f64,
}

/// Top-left corner of data-stream bar `index`.
pub fn data_stream_position(
	streams: &DataStreams,
	time: f64,
	index: usize,
	width: f64,
	height: f64,
) -> (f64, f64) {
	let i = index as f64;
	let period = (width + streams.wrap_pad).max(1.0);
	let x = (time * STREAM_SPEED + i * streams.spacing).rem_euclid(period) - streams.lead_in;
	let y = (time + i).sin() * streams.amplitude + height / 2.0;
	(x, y)
}

/// Geometry and hues of the hue-cycling gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HueGradient {
	/// Gradient start point.
	pub from: (f64, f64),
	/// Gradient end point.
	pub to: (f64, f64),
	/// Hues in degrees for the stops at 0, 0.5 and 1, each 120 degrees apart.
	pub hues: [f64; 3],
}

/// Hue-cycling gradient at clock `time` over a `width` x `height` surface.
///
/// Both endpoints orbit the surface on out-of-phase sines; the base hue turns
/// 50 degrees per clock unit.
pub fn hue_gradient(time: f64, width: f64, height: f64) -> HueGradient {
	let base = (time * 50.0).rem_euclid(360.0);
	HueGradient {
		from: (
			width * (0.5 + 0.5 * (time * 0.5).sin()),
			height * (0.5 + 0.5 * (time * 0.3).cos()),
		),
		to: (
			width * (0.5 + 0.5 * (time * 0.4).cos()),
			height * (0.5 + 0.5 * (time * 0.6).sin()),
		),
		hues: [base, (base + 120.0) % 360.0, (base + 240.0) % 360.0],
	}
}

/// The particle engine: owns every particle and the frame clock.
pub struct ParticleField {
	particles: Vec<Particle>,
	free: Vec<usize>,
	glitches: Vec<GlitchBar>,
	streams: Vec<GlitchBar>,
	palette: &'static Palette,
	style: VisualStyle,
	width: f64,
	height: f64,
	time: f64,
	pointer: Option<(f64, f64)>,
	rng: SmallRng,
}

impl ParticleField {
	/// Seed a field from OS entropy.
	pub fn new(style: VisualStyle, theme: Theme, width: f64, height: f64) -> Self {
		Self::with_rng(style, theme, width, height, SmallRng::from_entropy())
	}

	/// Build a field with a caller-supplied generator (deterministic when seeded).
	pub fn with_rng(
		style: VisualStyle,
		theme: Theme,
		width: f64,
		height: f64,
		mut rng: SmallRng,
	) -> Self {
		let palette = theme.palette();
		let particles = (0..style.particle_count)
			.map(|_| Particle::spawn(&mut rng, width, height, palette, &style))
			.collect();

		Self {
			particles,
			free: Vec::with_capacity(style.particle_count),
			glitches: Vec::new(),
			streams: Vec::new(),
			palette,
			style,
			width,
			height,
			time: 0.0,
			pointer: None,
			rng,
		}
	}

	/// Advance the simulation by one frame.
	pub fn step(&mut self) {
		self.time += self.style.time_step;

		let (width, height) = (self.width, self.height);
		let radius = self.style.interaction_radius;
		let lifetime = (self.style.life_min, self.style.life_max);
		for (slot, p) in self.particles.iter_mut().enumerate() {
			if !p.advance(width, height, self.pointer, radius) {
				self.free.push(slot);
			}
		}

		while let Some(slot) = self.free.pop() {
			self.particles[slot].respawn(&mut self.rng, width, height, self.palette, lifetime);
		}

		self.roll_glitches();
		self.roll_streams();
	}

	fn roll_streams(&mut self) {
		self.streams.clear();
		let Some(streams) = self.style.layers.data_streams else {
			return;
		};
		let (min_w, max_w) = streams.width;
		for i in 0..streams.count {
			let (x, y) = data_stream_position(&streams, self.time, i, self.width, self.height);
			let width = if max_w > min_w {
				self.rng.gen_range(min_w..max_w)
			} else {
				min_w
			};
			let alpha = if streams.max_alpha > 0.0 {
				self.rng.gen_range(0.0..streams.max_alpha)
			} else {
				0.0
			};
			self.streams.push(GlitchBar {
				x,
				y,
				width,
				height: streams.height,
				alpha,
			});
		}
	}

	fn roll_glitches(&mut self) {
		self.glitches.clear();
		let (w, h) = (self.width, self.height);
		match self.style.layers.glitch {
			Glitch::Off => {}
			Glitch::Rare(chance) => {
				if self.rng.gen_bool(chance.clamp(0.0, 1.0)) {
					self.glitches.push(GlitchBar {
						x: 0.0,
						y: self.rng.gen_range(0.0..1.0) * h,
						width: w,
						height: self.rng.gen_range(1.0..6.0),
						alpha: 0.25,
					});
				}
			}
			Glitch::Burst(count) => {
				for _ in 0..count {
					self.glitches.push(GlitchBar {
						x: self.rng.gen_range(0.0..1.0) * w,
						y: self.rng.gen_range(0.0..1.0) * h,
						width: self.rng.gen_range(50.0..250.0),
						height: self.rng.gen_range(1.0..6.0),
						alpha: self.rng.gen_range(0.0..0.3),
					});
				}
			}
		}
	}

	/// Swap the palette used for new particles and background layers.
	/// Existing particles keep their colors.
	pub fn set_theme(&mut self, theme: Theme) {
		self.palette = theme.palette();
	}

	/// Pointer position in surface coordinates.
	pub fn set_pointer(&mut self, x: f64, y: f64) {
		self.pointer = Some((x, y));
	}

	/// Forget the pointer once it leaves the page; repulsion stops.
	pub fn clear_pointer(&mut self) {
		self.pointer = None;
	}

	/// Current pointer position, if any.
	pub fn pointer(&self) -> Option<(f64, f64)> {
		self.pointer
	}

	/// Resize the field bounds, scaling particle positions proportionally.
	///
	/// A field that had no area (mounted while hidden) cannot be scaled, so
	/// every particle is respawned across the new bounds instead.
	pub fn resize(&mut self, width: f64, height: f64) {
		if self.width <= 0.0 || self.height <= 0.0 {
			self.width = width;
			self.height = height;
			let lifetime = (self.style.life_min, self.style.life_max);
			for p in &mut self.particles {
				p.respawn(&mut self.rng, width, height, self.palette, lifetime);
			}
			return;
		}

		let scale_x = width / self.width;
		let scale_y = height / self.height;

		for p in &mut self.particles {
			p.x *= scale_x;
			p.y *= scale_y;
			for point in p.trail.points.iter_mut() {
				point.x *= scale_x;
				point.y *= scale_y;
			}
		}

		self.width = width;
		self.height = height;
	}

	/// All particle pairs closer than the proximity threshold.
	///
	/// Quadratic in the particle count; this dominates frame cost.
	pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
		let threshold = self.style.proximity_threshold;
		self.particles.iter().enumerate().flat_map(move |(i, a)| {
			self.particles[i + 1..].iter().filter_map(move |b| {
				let (dx, dy) = (a.x - b.x, a.y - b.y);
				let dist = (dx * dx + dy * dy).sqrt();
				connection_opacity(dist, threshold).map(|opacity| Connection {
					from: (a.x, a.y),
					to: (b.x, b.y),
					opacity,
				})
			})
		})
	}

	/// Rings for the current frame.
	pub fn energy_waves(&self) -> impl Iterator<Item = Wave> + use<> {
		let time = self.time;
		(0..self.style.wave_count).map(move |i| energy_wave(time, i))
	}

	/// Vertical center of the scanning band.
	pub fn scanline_y(&self) -> f64 {
		(self.time * 200.0).rem_euclid(self.height + 100.0)
	}

	/// Grid scroll offset; zero when the grid is static.
	pub fn grid_offset(&self) -> (f64, f64) {
		let size = self.style.grid_size;
		if !self.style.layers.grid_scroll || size <= 0.0 {
			return (0.0, 0.0);
		}
		(
			(self.time * 20.0).rem_euclid(size),
			(self.time * 15.0).rem_euclid(size),
		)
	}

	/// Hue-cycling gradient for the current frame.
	pub fn hue_gradient(&self) -> HueGradient {
		hue_gradient(self.time, self.width, self.height)
	}

	/// Live particles, one per slot.
	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	/// Glitch bars rolled for the current frame.
	pub fn glitches(&self) -> &[GlitchBar] {
		&self.glitches
	}

	/// Data-stream bars rolled for the current frame.
	pub fn streams(&self) -> &[GlitchBar] {
		&self.streams
	}

	/// Palette for new particles and background layers.
	pub fn palette(&self) -> &'static Palette {
		self.palette
	}

	/// Active style.
	pub fn style(&self) -> &VisualStyle {
		&self.style
	}

	/// Simulation clock.
	pub fn time(&self) -> f64 {
		self.time
	}

	/// Surface width in pixels.
	pub fn width(&self) -> f64 {
		self.width
	}

	/// Surface height in pixels.
	pub fn height(&self) -> f64 {
		self.height
	}

	#[cfg(test)]
	fn particles_mut(&mut self) -> &mut [Particle] {
		&mut self.particles
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn field_with(style: VisualStyle, theme: Theme) -> ParticleField {
		ParticleField::with_rng(style, theme, 800.0, 600.0, SmallRng::seed_from_u64(7))
	}

	fn field() -> ParticleField {
		field_with(VisualStyle::default(), Theme::Dark)
	}

	fn still(p: &mut Particle, x: f64, y: f64) {
		p.x = x;
		p.y = y;
		p.vx = 0.0;
		p.vy = 0.0;
		p.vz = 0.0;
	}

	#[test]
	fn population_is_constant() {
		let mut f = field();
		assert_eq!(f.particles().len(), 150);
		// Longer than the maximum lifetime, so every slot is recycled.
		for _ in 0..1200 {
			f.step();
			assert_eq!(f.particles().len(), 150);
		}
	}

	#[test]
	fn life_strictly_decreases_until_respawn() {
		let mut f = field();
		let mut previous: Vec<f64> = f.particles().iter().map(|p| p.life).collect();
		for _ in 0..600 {
			f.step();
			for (slot, p) in f.particles().iter().enumerate() {
				assert!(p.life > 0.0, "expired particle left in slot {slot}");
				let before = previous[slot];
				if p.life >= before {
					// Only a slot that just expired may come back with more life.
					assert!(before - 1.0 <= 0.0, "slot {slot} gained life");
				} else {
					assert!((before - p.life - 1.0).abs() < 1e-9);
				}
				previous[slot] = p.life;
			}
		}
	}

	#[test]
	fn trails_never_exceed_capacity() {
		let mut f = field();
		for _ in 0..50 {
			f.step();
			for p in f.particles() {
				assert!(p.trail.len() <= 10);
			}
		}
		assert!(f.particles().iter().any(|p| p.trail.len() == 10));
	}

	#[test]
	fn trail_evicts_oldest() {
		let mut t = Trail::with_capacity(2);
		for i in 0..3 {
			t.push(TrailPoint {
				x: i as f64,
				y: 0.0,
				alpha: 1.0,
			});
		}
		let xs: Vec<f64> = t.iter().map(|p| p.x).collect();
		assert_eq!(xs, vec![1.0, 2.0]);

		let mut none = Trail::with_capacity(0);
		none.push(TrailPoint {
			x: 0.0,
			y: 0.0,
			alpha: 1.0,
		});
		assert!(none.is_empty());
	}

	#[test]
	fn positions_wrap_to_opposite_edge() {
		let mut f = field();
		{
			let ps = f.particles_mut();
			still(&mut ps[0], 799.5, 300.0);
			ps[0].vx = 1.0;
			still(&mut ps[1], 0.5, 300.0);
			ps[1].vx = -1.0;
			still(&mut ps[2], 400.0, 599.5);
			ps[2].vy = 1.0;
			still(&mut ps[3], 400.0, 0.5);
			ps[3].vy = -1.0;
			for p in ps.iter_mut() {
				p.life = 100.0;
			}
		}
		f.step();
		let ps = f.particles();
		assert_eq!(ps[0].x, 0.0);
		assert_eq!(ps[1].x, 800.0);
		assert_eq!(ps[2].y, 0.0);
		assert_eq!(ps[3].y, 600.0);
		for p in ps {
			assert!((0.0..=800.0).contains(&p.x));
			assert!((0.0..=600.0).contains(&p.y));
			assert!((0.0..=DEPTH).contains(&p.z));
		}
	}

	#[test]
	fn pointer_repels_within_radius() {
		let mut f = field();
		{
			let ps = f.particles_mut();
			still(&mut ps[0], 100.0, 100.0);
			still(&mut ps[1], 600.0, 100.0);
			ps[0].life = 100.0;
			ps[1].life = 100.0;
		}
		f.set_pointer(90.0, 100.0);
		f.step();

		let near = &f.particles()[0];
		assert!(near.vx > 0.0, "pushed away from pointer");
		assert!(near.vy.abs() < 1e-12);
		// (150 - 10) / 150 * 0.5
		assert!((near.vx - 140.0 / 150.0 * REPULSION_STRENGTH).abs() < 1e-9);

		let far = &f.particles()[1];
		assert_eq!((far.vx, far.vy), (0.0, 0.0));
	}

	#[test]
	fn pointer_exactly_at_radius_does_not_repel() {
		let mut f = field();
		{
			let p = &mut f.particles_mut()[0];
			still(p, 100.0, 100.0);
			p.life = 100.0;
		}
		f.set_pointer(250.0, 100.0);
		f.step();
		assert_eq!((f.particles()[0].vx, f.particles()[0].vy), (0.0, 0.0));
	}

	#[test]
	fn pointer_just_inside_radius_repels() {
		let mut f = field();
		{
			let p = &mut f.particles_mut()[0];
			still(p, 100.0, 100.0);
			p.life = 100.0;
		}
		f.set_pointer(249.9, 100.0);
		f.step();
		let p = &f.particles()[0];
		assert!(p.vx < 0.0);
		assert!((p.vx + 0.1 / 150.0 * REPULSION_STRENGTH).abs() < 1e-9);
	}

	#[test]
	fn cleared_pointer_stops_repulsion() {
		let mut f = field();
		{
			let p = &mut f.particles_mut()[0];
			still(p, 100.0, 100.0);
			p.life = 100.0;
		}
		f.set_pointer(90.0, 100.0);
		f.clear_pointer();
		assert_eq!(f.pointer(), None);
		f.step();
		assert_eq!(f.particles()[0].vx, 0.0);
	}

	#[test]
	fn lifetimes_follow_style_range() {
		let mut f = field_with(VisualStyle::enhanced(), Theme::Dark);
		for _ in 0..400 {
			f.step();
			for p in f.particles() {
				assert!((50.0..150.0).contains(&p.max_life), "{}", p.max_life);
			}
		}
		for p in field().particles() {
			assert!((200.0..500.0).contains(&p.max_life));
		}
	}

	#[test]
	fn degenerate_lifetime_range_uses_minimum() {
		let mut rng = SmallRng::seed_from_u64(1);
		assert_eq!(roll_lifetime(&mut rng, 80.0, 80.0), 80.0);
		assert_eq!(roll_lifetime(&mut rng, 0.0, 0.0), 1.0);
	}

	#[test]
	fn pointer_boosts_alpha() {
		let mut f = field();
		{
			let ps = f.particles_mut();
			still(&mut ps[0], 100.0, 100.0);
			still(&mut ps[1], 500.0, 500.0);
			for p in ps[..2].iter_mut() {
				p.life = 100.0;
				p.max_life = 200.0;
			}
		}
		f.set_pointer(100.0, 100.0);
		f.step();
		let ps = f.particles();
		assert!(ps[0].alpha > ps[1].alpha);
		assert!(ps[0].alpha <= 1.0);
	}

	#[test]
	fn size_follows_depth() {
		assert_eq!(perspective_size(0.0), 3.0);
		assert_eq!(perspective_size(1000.0), 1.5);
		assert!(perspective_size(1e9) >= 0.5);
	}

	#[test]
	fn connection_opacity_falls_off_linearly() {
		assert_eq!(connection_opacity(60.0, 120.0), Some(0.15));
		assert_eq!(connection_opacity(120.0, 120.0), None);
		assert_eq!(connection_opacity(150.0, 120.0), None);
	}

	#[test]
	fn connections_only_for_close_pairs() {
		let style = VisualStyle {
			particle_count: 3,
			..VisualStyle::default()
		};
		let mut f = field_with(style, Theme::Dark);
		{
			let ps = f.particles_mut();
			still(&mut ps[0], 100.0, 100.0);
			still(&mut ps[1], 160.0, 100.0);
			still(&mut ps[2], 700.0, 500.0);
		}
		let lines: Vec<Connection> = f.connections().collect();
		assert_eq!(lines.len(), 1);
		assert_eq!(lines[0].from, (100.0, 100.0));
		assert_eq!(lines[0].to, (160.0, 100.0));
		assert!((lines[0].opacity - (1.0 - 60.0 / 120.0) * 0.3).abs() < 1e-12);
	}

	#[test]
	fn waves_stay_in_range() {
		let mut f = field();
		for _ in 0..2000 {
			f.step();
			let waves: Vec<Wave> = f.energy_waves().collect();
			assert_eq!(waves.len(), 3);
			for w in waves {
				assert!((0.0..WAVE_MAX_RADIUS).contains(&w.radius));
				assert!(w.opacity > 0.0 && w.opacity <= WAVE_OPACITY);
			}
		}
	}

	#[test]
	fn theme_swap_recolors_new_particles_only() {
		let mut f = field();
		let before: Vec<Color> = f.particles().iter().map(|p| p.color).collect();
		f.set_theme(Theme::Light);
		assert_eq!(f.palette(), Theme::Light.palette());
		let after: Vec<Color> = f.particles().iter().map(|p| p.color).collect();
		assert_eq!(before, after);

		for _ in 0..600 {
			f.step();
		}
		let light = Theme::Light.palette().particles;
		assert!(f.particles().iter().all(|p| light.contains(&p.color)));
	}

	#[test]
	fn resize_scales_positions() {
		let mut f = field();
		let (x, y) = (f.particles()[0].x, f.particles()[0].y);
		f.resize(1600.0, 300.0);
		assert!((f.particles()[0].x - x * 2.0).abs() < 1e-9);
		assert!((f.particles()[0].y - y * 0.5).abs() < 1e-9);
		assert_eq!((f.width(), f.height()), (1600.0, 300.0));
	}

	#[test]
	fn resize_from_empty_bounds_reseeds() {
		let mut f = ParticleField::with_rng(
			VisualStyle::default(),
			Theme::Dark,
			0.0,
			0.0,
			SmallRng::seed_from_u64(7),
		);
		assert!(f.particles().iter().all(|p| p.x == 0.0 && p.y == 0.0));
		f.resize(800.0, 600.0);
		let max_x = f.particles().iter().map(|p| p.x).fold(0.0, f64::max);
		let max_y = f.particles().iter().map(|p| p.y).fold(0.0, f64::max);
		assert!(max_x > 10.0);
		assert!(max_y > 10.0);
		for p in f.particles() {
			assert!((0.0..800.0).contains(&p.x));
			assert!((0.0..600.0).contains(&p.y));
		}
	}

	#[test]
	fn data_stream_positions() {
		let enhanced = VisualStyle::enhanced().layers.data_streams.unwrap();
		let (x, y) = data_stream_position(&enhanced, 0.0, 3, 800.0, 600.0);
		assert_eq!(x, 140.0);
		assert!((y - (3.0f64.sin() * 100.0 + 300.0)).abs() < 1e-9);
		// Wraps at width + pad, then shifts left by the lead-in.
		let (x, _) = data_stream_position(&enhanced, 10.5, 0, 800.0, 600.0);
		assert!((x - -50.0).abs() < 1e-9);

		let cyber = VisualStyle::cyberpunk().layers.data_streams.unwrap();
		let (x, y) = data_stream_position(&cyber, 1.0, 0, 800.0, 600.0);
		assert!((x - 100.0).abs() < 1e-9);
		assert!((y - (1.0f64.sin() * 50.0 + 300.0)).abs() < 1e-9);
	}

	#[test]
	fn streams_roll_each_frame_when_enabled() {
		let mut f = field_with(VisualStyle::enhanced(), Theme::Dark);
		assert!(f.streams().is_empty());
		for _ in 0..10 {
			f.step();
		}
		let streams = VisualStyle::enhanced().layers.data_streams.unwrap();
		assert_eq!(f.streams().len(), 10);
		for (i, bar) in f.streams().iter().enumerate() {
			let (x, y) = data_stream_position(&streams, f.time(), i, 800.0, 600.0);
			assert_eq!((bar.x, bar.y), (x, y));
			assert!((10.0..60.0).contains(&bar.width));
			assert_eq!(bar.height, 2.0);
			assert!(bar.alpha < 100.0 / 255.0);
		}

		let mut cyber = field_with(VisualStyle::cyberpunk(), Theme::Cyberpunk);
		cyber.step();
		assert_eq!(cyber.streams().len(), 20);
		assert!(cyber.streams().iter().all(|b| b.width == 2.0 && b.height == 10.0));

		let mut plain = field();
		plain.step();
		assert!(plain.streams().is_empty());
	}

	#[test]
	fn hue_gradient_orbits_and_cycles() {
		let g = hue_gradient(0.0, 800.0, 600.0);
		assert_eq!(g.from, (400.0, 600.0));
		assert_eq!(g.to, (800.0, 300.0));
		assert_eq!(g.hues, [0.0, 120.0, 240.0]);

		assert_eq!(hue_gradient(3.0, 800.0, 600.0).hues, [150.0, 270.0, 30.0]);
	}

	#[test]
	fn gradient_clock_runs_at_half_speed() {
		let mut f = field_with(VisualStyle::gradient(), Theme::Neon);
		let mut default = field();
		for _ in 0..100 {
			f.step();
			default.step();
		}
		assert!((f.time() - 0.5).abs() < 1e-9);
		assert!((default.time() - 1.0).abs() < 1e-9);
		assert_eq!(f.hue_gradient(), hue_gradient(f.time(), 800.0, 600.0));
	}

	#[test]
	fn burst_glitch_rolls_every_frame() {
		let mut f = field_with(VisualStyle::cyberpunk(), Theme::Cyberpunk);
		assert!(f.particles().is_empty());
		f.step();
		assert_eq!(f.glitches().len(), 5);
		assert_eq!(field().glitches().len(), 0);
	}

	#[test]
	fn grid_offset_only_when_scrolling() {
		let mut f = field_with(VisualStyle::enhanced(), Theme::Dark);
		for _ in 0..10 {
			f.step();
		}
		let (ox, oy) = f.grid_offset();
		assert!(ox > 0.0 && ox < 50.0);
		assert!(oy > 0.0 && oy < 50.0);
		assert_eq!(field().grid_offset(), (0.0, 0.0));
	}
}
