//! Layout state and interaction tracking.
//!
//! Wraps the [`Simulation`] with the subgraph it lays out, the pan/zoom view
//! transform, drag and pan gestures, hover highlighting and the selected node.
//! One `ForceGraphState` exists per canvas; [`ForceGraphState::reseed`]
//! replaces the simulation whenever the displayed subgraph changes.

use std::collections::{HashMap, HashSet};

use log::info;

use super::scale::{ScaleConfig, ScaledValues, ZoomConfig};
use super::simulation::{Simulation, SimulationConfig};
use crate::graph::{EntityId, Graph, Node};

/// Pointer travel, in screen pixels, below which a press counts as a click.
const CLICK_SLOP: f64 = 3.0;

/// Pan and zoom transform applied to the whole view.
#[derive(Clone, Debug)]
pub struct ViewTransform {
	/// Screen x of the world origin.
	pub x: f64,
	/// Screen y of the world origin.
	pub y: f64,
	/// Zoom factor, kept within the configured zoom bounds.
	pub k: f64,
}

impl ViewTransform {
	/// Zooms by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, bounds: &ZoomConfig) {
		let new_k = bounds.clamp(self.k * factor);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

/// An in-progress node drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
	/// Set once the pointer leaves the click slop.
	pub moved: bool,
}

/// An in-progress background pan.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// How a finished drag ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragRelease {
	/// Body that was dragged.
	pub node_idx: usize,
	/// False when the pointer never left the click slop, i.e. a click.
	pub moved: bool,
}

/// Seconds a highlight is held before it may fade.
const MIN_HOLD_TIME: f64 = 0.12;
const FADE_IN_SPEED: f64 = 6.0;
const FADE_OUT_SPEED: f64 = 4.0;
/// Intensities below this are dropped.
const VISIBLE: f64 = 0.005;

/// Smoothly animated hover highlight of a node and its direct neighbors.
///
/// Each node carries its own intensity in `[0, 1]` that eases towards 1 while
/// the node is in the target set and decays towards 0 afterwards, so moving
/// between nodes cross-fades instead of snapping.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	pub hovered: Option<usize>,
	target: HashSet<usize>,
	intensity: HashMap<usize, f64>,
	ring: HashMap<usize, f64>,
	hold: HashMap<usize, f64>,
	max: f64,
}

impl HighlightState {
	pub fn set_hover(&mut self, node: Option<usize>, links: &[(usize, usize)]) {
		if self.hovered == node {
			return;
		}
		self.hovered = node;
		self.target.clear();

		let Some(idx) = node else {
			return;
		};
		self.target.insert(idx);
		for &(s, t) in links {
			if s == idx {
				self.target.insert(t);
			} else if t == idx {
				self.target.insert(s);
			}
		}
		for &n in &self.target {
			self.hold.insert(n, MIN_HOLD_TIME);
		}
	}

	/// Exponential smoothing: fast ease-in, slower fade-out after the hold.
	pub fn tick(&mut self, dt: f64) {
		let rise = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let decay = (-FADE_OUT_SPEED * dt).exp();

		for &idx in &self.target {
			let v = self.intensity.entry(idx).or_insert(0.0);
			*v += (1.0 - *v) * rise;
		}
		if let Some(idx) = self.hovered {
			let v = self.ring.entry(idx).or_insert(0.0);
			*v += (1.0 - *v) * rise;
		}

		let target = &self.target;
		self.hold.retain(|idx, left| {
			if target.contains(idx) {
				return true;
			}
			*left -= dt;
			*left > 0.0
		});

		let hold = &self.hold;
		let mut max: f64 = 0.0;
		self.intensity.retain(|idx, v| {
			if !target.contains(idx) && !hold.contains_key(idx) {
				*v *= decay;
			}
			max = max.max(*v);
			*v > VISIBLE
		});

		let hovered = self.hovered;
		self.ring.retain(|idx, v| {
			if hovered != Some(*idx) && !hold.contains_key(idx) {
				*v *= decay;
			}
			*v > VISIBLE
		});

		self.max = max;
	}

	pub fn node_intensity(&self, idx: usize) -> f64 {
		self.intensity.get(&idx).copied().unwrap_or(0.0)
	}

	pub fn ring_intensity(&self, idx: usize) -> f64 {
		self.ring.get(&idx).copied().unwrap_or(0.0)
	}

	/// Geometric mean of the endpoint intensities.
	pub fn edge_intensity(&self, a: usize, b: usize) -> f64 {
		(self.node_intensity(a) * self.node_intensity(b)).sqrt()
	}

	pub fn max_intensity(&self) -> f64 {
		self.max
	}
}

/// Layout simulation plus everything the canvas needs to draw and interact.
pub struct ForceGraphState {
	/// Subgraph currently laid out; indices match simulation bodies.
	pub graph: Graph,
	/// Positions for `graph.nodes`, index for index.
	pub simulation: Simulation,
	/// Current pan and zoom.
	pub transform: ViewTransform,
	/// Node drag in progress, if any.
	pub drag: DragState,
	/// Background pan in progress, if any.
	pub pan: PanState,
	/// Hover highlight intensities.
	pub highlight: HighlightState,
	/// Entity whose investigation is open.
	pub selected: Option<EntityId>,
	/// Canvas width in CSS pixels.
	pub width: f64,
	/// Canvas height in CSS pixels.
	pub height: f64,
	/// Cleared once the simulation settles; the render loop keeps drawing.
	pub animation_running: bool,
	/// Seconds of animation, driving the dash flow on suspicious edges.
	pub flow_time: f64,
	config: SimulationConfig,
	links: Vec<(usize, usize)>,
	index: HashMap<EntityId, usize>,
}

impl ForceGraphState {
	/// Lays out `graph` on a `width` x `height` canvas with the origin centered.
	pub fn new(graph: Graph, width: f64, height: f64, config: SimulationConfig) -> Self {
		let (links, index) = index_links(&graph);
		let simulation = Simulation::new(graph.nodes.len(), &links, config.clone());
		Self {
			graph,
			simulation,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			selected: None,
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
			config,
			links,
			index,
		}
	}

	/// Tears down the running simulation and starts a new one for `graph`.
	///
	/// Nodes that were already on screen keep their positions; new nodes start
	/// on the seed ring. Gestures and hover are reset because their indices
	/// refer to the old subgraph. The view transform is kept.
	pub fn reseed(&mut self, graph: Graph) {
		let previous: HashMap<EntityId, (f64, f64)> = self
			.graph
			.nodes
			.iter()
			.zip(self.simulation.bodies())
			.map(|(node, body)| (node.id, (body.x, body.y)))
			.collect();

		let (links, index) = index_links(&graph);
		let mut simulation = Simulation::new(graph.nodes.len(), &links, self.config.clone());
		for (i, node) in graph.nodes.iter().enumerate() {
			if let Some(&(x, y)) = previous.get(&node.id) {
				simulation.set_position(i, x, y);
			}
		}

		info!(
			"risk-graph: layout reseeded with {} nodes, {} links",
			graph.nodes.len(),
			links.len()
		);

		self.graph = graph;
		self.simulation = simulation;
		self.links = links;
		self.index = index;
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.highlight = HighlightState::default();
		self.animation_running = true;
	}

	/// Edges as index pairs into `graph.nodes`.
	pub fn links(&self) -> &[(usize, usize)] {
		&self.links
	}

	/// Node at `idx`.
	pub fn node(&self, idx: usize) -> Option<&Node> {
		self.graph.nodes.get(idx)
	}

	/// Index of the node for `id`, if it is in the current subgraph.
	pub fn index_of(&self, id: EntityId) -> Option<usize> {
		self.index.get(&id).copied()
	}

	/// World position of node `idx`.
	pub fn position(&self, idx: usize) -> Option<(f64, f64)> {
		self.simulation.body(idx).map(|b| (b.x, b.y))
	}

	/// Converts a canvas point to world coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let hit = ScaledValues::new(config, self.transform.k).hit_radius;
		self.simulation
			.bodies()
			.iter()
			.enumerate()
			.rev()
			.find(|(_, b)| ((b.x - gx).powi(2) + (b.y - gy).powi(2)).sqrt() < hit)
			.map(|(idx, _)| idx)
	}

	/// Starts dragging `idx`: pins it where it is and reheats the layout.
	pub fn begin_drag(&mut self, idx: usize, sx: f64, sy: f64) {
		let Some((x, y)) = self.position(idx) else {
			return;
		};
		self.drag = DragState {
			node_idx: Some(idx),
			start_x: sx,
			start_y: sy,
			node_start_x: x,
			node_start_y: y,
			moved: false,
		};
		self.simulation.pin(idx, x, y);
		self.animation_running = true;
	}

	/// Moves the dragged node's pin to follow the pointer.
	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.drag.node_idx else {
			return;
		};
		let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
		if (dx * dx + dy * dy).sqrt() > CLICK_SLOP {
			self.drag.moved = true;
		}
		let k = self.transform.k;
		self.simulation.pin(
			idx,
			self.drag.node_start_x + dx / k,
			self.drag.node_start_y + dy / k,
		);
	}

	/// Ends the drag, releasing the pin.
	pub fn end_drag(&mut self) -> Option<DragRelease> {
		let idx = self.drag.node_idx.take()?;
		self.simulation.unpin(idx);
		let moved = std::mem::take(&mut self.drag.moved);
		Some(DragRelease {
			node_idx: idx,
			moved,
		})
	}

	/// True while a node is held.
	pub fn is_dragging(&self) -> bool {
		self.drag.node_idx.is_some()
	}

	/// Starts panning the view from the screen point `(sx, sy)`.
	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	/// Moves the view with the pointer. Ignored unless a pan is active.
	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
		self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
	}

	/// Ends the pan.
	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Wheel zoom anchored at the pointer: scrolling up (`delta_y < 0`) zooms
	/// in, down zooms out. Purely horizontal scrolls leave the view alone.
	pub fn wheel_zoom(&mut self, sx: f64, sy: f64, delta_y: f64, config: &ZoomConfig) {
		let factor = if delta_y < 0.0 {
			config.wheel_step
		} else if delta_y > 0.0 {
			1.0 / config.wheel_step
		} else {
			return;
		};
		self.transform.zoom_at(sx, sy, factor, config);
	}

	/// Highlights `node` and its neighbors, or fades everything out on `None`.
	pub fn set_hover(&mut self, node: Option<usize>) {
		self.highlight.set_hover(node, &self.links);
	}

	/// Marks `id` as selected. An id outside the subgraph draws no ring.
	pub fn select(&mut self, id: Option<EntityId>) {
		self.selected = id;
	}

	/// True when node `idx` is the selected entity.
	pub fn is_selected(&self, idx: usize) -> bool {
		match (self.selected, self.node(idx)) {
			(Some(id), Some(node)) => node.id == id,
			_ => false,
		}
	}

	/// One animation frame: a single simulation step plus highlight easing.
	pub fn tick(&mut self, dt: f64) {
		if self.animation_running && !self.simulation.tick() {
			self.animation_running = false;
		}
		self.flow_time += dt;
		self.highlight.tick(dt);
	}

	/// Keeps the world origin centered when the canvas changes size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
	}
}

fn index_links(graph: &Graph) -> (Vec<(usize, usize)>, HashMap<EntityId, usize>) {
	let index: HashMap<EntityId, usize> = graph
		.nodes
		.iter()
		.enumerate()
		.map(|(i, n)| (n.id, i))
		.collect();
	let links = graph
		.edges
		.iter()
		.filter_map(|e| Some((*index.get(&e.source)?, *index.get(&e.target)?)))
		.collect();
	(links, index)
}
