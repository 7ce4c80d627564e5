//! Force-directed layout simulation.
//!
//! A velocity-Verlet style relaxation in the manner of d3-force: each tick
//! cools `alpha` towards `alpha_target`, accumulates link, many-body and
//! collision forces into body velocities, recenters the layout, then
//! integrates positions. Pinned bodies stay exactly where they are pinned.
//!
//! World coordinates are centered on the origin; the view transform maps the
//! origin to the middle of the canvas.

use std::f64::consts::PI;

use serde::Deserialize;

/// Tunable simulation parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Target separation of linked bodies.
	pub link_distance: f64,
	/// Many-body strength. Negative values repel.
	pub charge: f64,
	/// Distances below this are treated as this value by the many-body force.
	pub charge_distance_min: f64,
	/// Collision radius of every body.
	pub collide_radius: f64,
	/// Fraction of an overlap resolved per tick, in `[0, 1]`.
	pub collide_strength: f64,
	/// Fraction of the centroid offset removed per tick, in `[0, 1]`. Kept
	/// small so a pinned body can pull its neighbors off center.
	pub center_strength: f64,
	/// The simulation idles once `alpha` falls below this.
	pub alpha_min: f64,
	/// Rate at which `alpha` approaches `alpha_target`.
	pub alpha_decay: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// `alpha_target` while a body is being dragged.
	pub reheat_target: f64,
	/// Upper bound on per-tick displacement.
	pub max_velocity: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: 100.0,
			charge: -30.0,
			charge_distance_min: 1.0,
			collide_radius: 40.0,
			collide_strength: 1.0,
			center_strength: 0.05,
			alpha_min,
			// Reaches alpha_min after ~300 ticks from a cold start.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			reheat_target: 0.3,
			max_velocity: 50.0,
		}
	}
}

impl SimulationConfig {
	/// Clamps parameters into ranges where the integration stays bounded.
	fn sanitized(mut self) -> Self {
		let defaults = Self::default();
		let finite_or = |v: f64, d: f64| if v.is_finite() { v } else { d };
		self.link_distance = finite_or(self.link_distance, defaults.link_distance).max(1.0);
		self.charge = finite_or(self.charge, defaults.charge).clamp(-1000.0, 1000.0);
		self.charge_distance_min = finite_or(self.charge_distance_min, 1.0).max(0.01);
		self.collide_radius = finite_or(self.collide_radius, defaults.collide_radius).max(0.0);
		self.collide_strength = finite_or(self.collide_strength, 1.0).clamp(0.0, 1.0);
		self.center_strength =
			finite_or(self.center_strength, defaults.center_strength).clamp(0.0, 1.0);
		self.alpha_min = finite_or(self.alpha_min, defaults.alpha_min).clamp(1e-6, 0.5);
		self.alpha_decay = finite_or(self.alpha_decay, defaults.alpha_decay).clamp(1e-4, 1.0);
		self.velocity_decay = finite_or(self.velocity_decay, 0.4).clamp(0.0, 1.0);
		self.reheat_target = finite_or(self.reheat_target, 0.3).clamp(0.0, 1.0);
		self.max_velocity = finite_or(self.max_velocity, defaults.max_velocity).max(0.1);
		self
	}
}

/// Physical state of one node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Body {
	/// World x.
	pub x: f64,
	/// World y.
	pub y: f64,
	/// Velocity carried into the next tick.
	pub vx: f64,
	/// Vertical counterpart of `vx`.
	pub vy: f64,
	/// Position the body is held at, set while it is dragged.
	pub fixed: Option<(f64, f64)>,
}

#[derive(Clone, Debug)]
struct Link {
	source: usize,
	target: usize,
	strength: f64,
	/// Share of the correction applied to the target.
	bias: f64,
}

/// Force simulation over a fixed set of bodies and links.
#[derive(Clone, Debug)]
pub struct Simulation {
	bodies: Vec<Body>,
	links: Vec<Link>,
	config: SimulationConfig,
	alpha: f64,
	alpha_target: f64,
	jiggle_state: u64,
}

impl Simulation {
	/// Seeds `count` bodies on a ring around the origin and links them by
	/// index pairs. Out-of-range and self links are ignored.
	pub fn new(count: usize, links: &[(usize, usize)], config: SimulationConfig) -> Self {
		let config = config.sanitized();
		let bodies = initial_bodies(count, config.collide_radius);

		let mut degree = vec![0usize; count];
		let links: Vec<(usize, usize)> = links
			.iter()
			.copied()
			.filter(|&(s, t)| s < count && t < count && s != t)
			.collect();
		for &(s, t) in &links {
			degree[s] += 1;
			degree[t] += 1;
		}
		let links = links
			.into_iter()
			.map(|(source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				Link {
					source,
					target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		Self {
			bodies,
			links,
			config,
			alpha: 1.0,
			alpha_target: 0.0,
			jiggle_state: 0x9e37_79b9_7f4a_7c15,
		}
	}

	/// All bodies, in the order they were created.
	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	/// Body at `index`.
	pub fn body(&self, index: usize) -> Option<&Body> {
		self.bodies.get(index)
	}

	/// Number of bodies.
	pub fn len(&self) -> usize {
		self.bodies.len()
	}

	/// True when there are no bodies.
	pub fn is_empty(&self) -> bool {
		self.bodies.is_empty()
	}

	/// Configuration after sanitizing.
	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	/// True once the simulation has cooled and nothing is reheating it.
	pub fn is_settled(&self) -> bool {
		self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
	}

	/// Moves a body without disturbing the rest of the simulation.
	pub fn set_position(&mut self, index: usize, x: f64, y: f64) {
		if let Some(body) = self.bodies.get_mut(index) {
			body.x = x;
			body.y = y;
			body.vx = 0.0;
			body.vy = 0.0;
		}
	}

	/// Pins a body to `(x, y)` and reheats so its neighbors react.
	pub fn pin(&mut self, index: usize, x: f64, y: f64) {
		if let Some(body) = self.bodies.get_mut(index) {
			body.fixed = Some((x, y));
			body.x = x;
			body.y = y;
			body.vx = 0.0;
			body.vy = 0.0;
			self.alpha_target = self.config.reheat_target;
		}
	}

	/// Releases a pinned body and lets the simulation cool again.
	pub fn unpin(&mut self, index: usize) {
		if let Some(body) = self.bodies.get_mut(index) {
			body.fixed = None;
		}
		if self.bodies.iter().all(|b| b.fixed.is_none()) {
			self.alpha_target = 0.0;
		}
	}

	/// Advances the simulation by one step. Returns false without doing any
	/// work when there is nothing to simulate.
	pub fn tick(&mut self) -> bool {
		if self.bodies.is_empty() || self.is_settled() {
			return false;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		self.apply_links();
		self.apply_charge();
		self.apply_collision();
		self.apply_center();
		self.integrate();
		true
	}

	/// Runs up to `ticks` steps, stopping early once settled.
	pub fn run(&mut self, ticks: usize) -> usize {
		(0..ticks).take_while(|_| self.tick()).count()
	}

	fn apply_links(&mut self) {
		let alpha = self.alpha;
		let distance = self.config.link_distance;
		for link in &self.links {
			let (s, t) = (&self.bodies[link.source], &self.bodies[link.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = jiggle(&mut self.jiggle_state);
			}
			if y == 0.0 {
				y = jiggle(&mut self.jiggle_state);
			}
			let len = (x * x + y * y).sqrt();
			let scale = (len - distance) / len * alpha * link.strength;
			x *= scale;
			y *= scale;

			let target = &mut self.bodies[link.target];
			target.vx -= x * link.bias;
			target.vy -= y * link.bias;
			let source = &mut self.bodies[link.source];
			source.vx += x * (1.0 - link.bias);
			source.vy += y * (1.0 - link.bias);
		}
	}

	fn apply_charge(&mut self) {
		let strength = self.config.charge * self.alpha;
		let min2 = self.config.charge_distance_min * self.config.charge_distance_min;
		let n = self.bodies.len();
		for i in 0..n {
			let (mut dvx, mut dvy) = (0.0, 0.0);
			for j in 0..n {
				if i == j {
					continue;
				}
				let mut x = self.bodies[j].x - self.bodies[i].x;
				let mut y = self.bodies[j].y - self.bodies[i].y;
				if x == 0.0 {
					x = jiggle(&mut self.jiggle_state);
				}
				if y == 0.0 {
					y = jiggle(&mut self.jiggle_state);
				}
				let mut l = x * x + y * y;
				if l < min2 {
					l = (min2 * l).sqrt();
				}
				let w = strength / l;
				dvx += x * w;
				dvy += y * w;
			}
			self.bodies[i].vx += dvx;
			self.bodies[i].vy += dvy;
		}
	}

	fn apply_collision(&mut self) {
		let r = self.config.collide_radius;
		if r <= 0.0 {
			return;
		}
		let reach = r + r;
		let strength = self.config.collide_strength;
		let n = self.bodies.len();
		for i in 0..n {
			let (xi, yi) = {
				let b = &self.bodies[i];
				(b.x + b.vx, b.y + b.vy)
			};
			for j in (i + 1)..n {
				let (xj, yj) = {
					let b = &self.bodies[j];
					(b.x + b.vx, b.y + b.vy)
				};
				let mut x = xi - xj;
				let mut y = yi - yj;
				let mut l = x * x + y * y;
				if l >= reach * reach {
					continue;
				}
				if x == 0.0 {
					x = jiggle(&mut self.jiggle_state);
					l += x * x;
				}
				if y == 0.0 {
					y = jiggle(&mut self.jiggle_state);
					l += y * y;
				}
				let len = l.sqrt();
				let push = (reach - len) / len * strength;
				x *= push;
				y *= push;
				// Equal radii split the correction evenly.
				self.bodies[i].vx += x * 0.5;
				self.bodies[i].vy += y * 0.5;
				self.bodies[j].vx -= x * 0.5;
				self.bodies[j].vy -= y * 0.5;
			}
		}
	}

	/// Moves free bodies so the layout mean drifts towards the origin by
	/// `center_strength` of its offset per tick. Pinned bodies count towards
	/// the mean but are never moved.
	fn apply_center(&mut self) {
		let n = self.bodies.len() as f64;
		let (sx, sy) = self
			.bodies
			.iter()
			.fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
		let strength = self.config.center_strength;
		let (dx, dy) = (sx / n * strength, sy / n * strength);
		for body in self.bodies.iter_mut().filter(|b| b.fixed.is_none()) {
			body.x -= dx;
			body.y -= dy;
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.config.velocity_decay;
		let max = self.config.max_velocity;
		for body in &mut self.bodies {
			if let Some((fx, fy)) = body.fixed {
				body.x = fx;
				body.y = fy;
				body.vx = 0.0;
				body.vy = 0.0;
				continue;
			}
			body.vx *= keep;
			body.vy *= keep;
			let speed = (body.vx * body.vx + body.vy * body.vy).sqrt();
			if speed > max {
				let f = max / speed;
				body.vx *= f;
				body.vy *= f;
			}
			body.x += body.vx;
			body.y += body.vy;
		}
	}
}

fn initial_bodies(count: usize, collide_radius: f64) -> Vec<Body> {
	if count == 1 {
		return vec![Body::default()];
	}
	let radius = (100.0f64).max(count as f64 * collide_radius / PI);
	(0..count)
		.map(|i| {
			let angle = (i as f64) * 2.0 * PI / count as f64;
			Body {
				x: radius * angle.cos(),
				y: radius * angle.sin(),
				..Body::default()
			}
		})
		.collect()
}

/// Tiny deterministic offset used to separate coincident bodies.
fn jiggle(state: &mut u64) -> f64 {
	*state ^= *state << 13;
	*state ^= *state >> 7;
	*state ^= *state << 17;
	((*state >> 11) as f64 / (1u64 << 53) as f64 - 0.5) * 1e-6
}

#[cfg(test)]
mod tests {
	use super::*;

	fn distance(a: &Body, b: &Body) -> f64 {
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	#[test]
	fn empty_simulation_never_ticks() {
		let mut sim = Simulation::new(0, &[], SimulationConfig::default());
		assert!(sim.is_empty());
		assert!(!sim.tick());
		assert_eq!(sim.run(10), 0);
	}

	#[test]
	fn single_body_sits_at_center() {
		let mut sim = Simulation::new(1, &[], SimulationConfig::default());
		sim.run(50);
		let body = &sim.bodies()[0];
		assert_eq!((body.x, body.y), (0.0, 0.0));
		assert!(body.vx.is_finite() && body.vy.is_finite());
	}

	#[test]
	fn linked_pair_settles_near_link_distance() {
		let mut sim = Simulation::new(2, &[(0, 1)], SimulationConfig::default());
		let ticks = sim.run(1000);
		assert!(ticks < 1000, "simulation never settled");
		assert!(sim.is_settled());
		assert!(!sim.tick());

		let d = distance(&sim.bodies()[0], &sim.bodies()[1]);
		assert!((85.0..130.0).contains(&d), "distance {d}");
	}

	#[test]
	fn unlinked_bodies_do_not_overlap() {
		let mut sim = Simulation::new(12, &[], SimulationConfig::default());
		sim.run(1000);
		let bodies = sim.bodies();
		for i in 0..bodies.len() {
			for j in (i + 1)..bodies.len() {
				let d = distance(&bodies[i], &bodies[j]);
				assert!(d >= 40.0, "bodies {i} and {j} only {d} apart");
			}
		}
	}

	#[test]
	fn centroid_returns_to_origin() {
		let links = [(0, 1), (1, 2), (2, 3), (3, 0), (0, 4)];
		let mut sim = Simulation::new(5, &links, SimulationConfig::default());
		assert!(sim.run(2000) < 2000);
		let n = sim.len() as f64;
		let cx: f64 = sim.bodies().iter().map(|b| b.x).sum::<f64>() / n;
		let cy: f64 = sim.bodies().iter().map(|b| b.y).sum::<f64>() / n;
		assert!(cx.abs() < 5.0 && cy.abs() < 5.0, "centroid ({cx}, {cy})");
	}

	#[test]
	fn coincident_bodies_separate_without_blowing_up() {
		let mut sim = Simulation::new(30, &[(0, 1), (1, 2)], SimulationConfig::default());
		for i in 0..30 {
			sim.set_position(i, 0.0, 0.0);
		}
		sim.run(400);
		for body in sim.bodies() {
			assert!(body.x.is_finite() && body.y.is_finite());
		}
		let d = distance(&sim.bodies()[0], &sim.bodies()[1]);
		assert!(d > 1.0);
	}

	#[test]
	fn pinned_body_holds_until_released() {
		let mut sim = Simulation::new(3, &[(0, 1), (1, 2)], SimulationConfig::default());
		sim.run(1000);
		assert!(sim.is_settled());

		sim.pin(1, 250.0, -80.0);
		assert!(!sim.is_settled(), "pinning must reheat");
		for _ in 0..100 {
			assert!(sim.tick());
			let body = &sim.bodies()[1];
			assert_eq!((body.x, body.y), (250.0, -80.0));
		}

		sim.unpin(1);
		assert_eq!(sim.bodies()[1].fixed, None);
		sim.tick();
		let body = &sim.bodies()[1];
		assert_ne!((body.x, body.y), (250.0, -80.0), "released body should move");
		assert!(sim.run(1000) < 1000);
		assert!(sim.is_settled());
	}

	#[test]
	fn dragged_body_pulls_its_neighbor_along() {
		let mut sim = Simulation::new(2, &[(0, 1)], SimulationConfig::default());
		sim.run(1000);

		sim.pin(0, 300.0, 0.0);
		for _ in 0..300 {
			sim.tick();
		}
		let (pinned, free) = (&sim.bodies()[0], &sim.bodies()[1]);
		assert_eq!((pinned.x, pinned.y), (300.0, 0.0));
		let d = distance(pinned, free);
		let limit = 2.0 * sim.config().link_distance;
		assert!(d < limit, "neighbor left behind at ({}, {}), {d} away", free.x, free.y);
		assert!(free.x > 0.0, "neighbor should stay on the dragged side");
	}

	#[test]
	fn hostile_config_is_bounded() {
		let config = SimulationConfig {
			charge: f64::NAN,
			velocity_decay: -3.0,
			max_velocity: f64::INFINITY,
			..SimulationConfig::default()
		};
		let mut sim = Simulation::new(10, &[(0, 1)], config);
		assert_eq!(sim.config().charge, -30.0);
		sim.run(500);
		assert!(sim.bodies().iter().all(|b| b.x.is_finite() && b.y.is_finite()));
	}
}
