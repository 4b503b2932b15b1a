//! Electrostatic many-body sandbox
//!
//! Free charges move under pairwise Coulomb forces (semi-implicit Euler with
//! damping), bounce off the canvas edges and collide elastically. The field
//! is drawn either as a sampled vector grid or as integrated field lines.

pub mod charge;
pub mod field;
pub mod scenario;

pub use charge::{Charge, ChargePatch};
pub use field::{FieldLine, LineEnd};
pub use scenario::Scenario;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SandboxError;
use crate::platform::{InputEvent, InputHub, RawInput};
use crate::renderer::{Color, Glow, Stroke, Surface, TextStyle, arrow};
use crate::settings::{ElectrostaticsConfig, Settings};
use crate::sim::{EventQueue, Rect, SimEvent, SimulationModel, Vector2};

/// Atom nucleus/electron parameters for `spawn_atom`
const NUCLEUS_Q: f32 = 50.0;
const NUCLEUS_MASS: f32 = 100.0;
const NUCLEUS_RADIUS: f32 = 25.0;
const ELECTRON_Q: f32 = -10.0;
const ELECTRON_MASS: f32 = 1.0;
const ELECTRON_RADIUS: f32 = 8.0;
const ORBIT_RADIUS: f32 = 150.0;

/// Jitter around the center for charges added without a position
const ADD_JITTER: f32 = 50.0;

const BACKGROUND: Color = Color::hex(0x18181b);

/// How the field is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationMode {
    #[default]
    Vectors,
    Lines,
}

impl FromStr for VisualizationMode {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vectors" | "vector" => Ok(VisualizationMode::Vectors),
            "lines" | "line" => Ok(VisualizationMode::Lines),
            _ => Err(SandboxError::UnknownVisualization(s.to_string())),
        }
    }
}

#[derive(Debug)]
pub struct ElectrostaticsModel {
    width: f32,
    height: f32,
    config: ElectrostaticsConfig,
    glow: bool,
    hints: bool,
    charges: Vec<Charge>,
    next_id: u32,
    playing: bool,
    mode: VisualizationMode,
    scenario: Scenario,
    selected: Option<u32>,
    drag_offset: Vector2,
    input: InputHub,
    events: EventQueue,
    rng: Pcg32,
    destroyed: bool,
}

impl ElectrostaticsModel {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_settings(width, height, &Settings::default())
    }

    pub fn with_settings(width: f32, height: f32, settings: &Settings) -> Self {
        let mut model = Self {
            width,
            height,
            config: settings.electrostatics.clone(),
            glow: settings.effective_glow(),
            hints: settings.hints,
            charges: Vec::new(),
            next_id: 1,
            playing: true,
            mode: VisualizationMode::default(),
            scenario: Scenario::default(),
            selected: None,
            drag_offset: Vector2::ZERO,
            input: InputHub::new(),
            events: EventQueue::new(),
            rng: Pcg32::seed_from_u64(settings.seed),
            destroyed: false,
        };
        model.load_scenario(Scenario::default());
        log::info!("Electrostatics initialized ({}x{})", width, height);
        model
    }

    fn next_charge_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // === Host setters ===

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_visualization_mode(&mut self, mode: VisualizationMode) {
        self.mode = mode;
    }

    pub fn visualization_mode(&self) -> VisualizationMode {
        self.mode
    }

    /// Add a free charge; without a position it lands near the center
    pub fn add_charge(&mut self, q: f32, pos: Option<Vector2>) -> u32 {
        let pos = pos.unwrap_or_else(|| {
            let jitter = Vector2::new(
                self.rng.random_range(-ADD_JITTER..ADD_JITTER),
                self.rng.random_range(-ADD_JITTER..ADD_JITTER),
            );
            Vector2::new(self.width / 2.0, self.height / 2.0) + jitter
        });
        let id = self.next_charge_id();
        let mut charge = Charge::new(id, pos, q, self.config.default_mass, self.config.default_radius);
        charge.clamp_to(self.width, self.height);
        charge.spawn = charge.pos;
        self.charges.push(charge);
        id
    }

    /// Replace all charges with a preset layout
    pub fn load_scenario(&mut self, scenario: Scenario) {
        self.charges.clear();
        self.set_selection(None);
        self.scenario = scenario;

        let placements = scenario.layout(self.width, self.height, &mut self.rng);
        for p in placements {
            let id = self.next_charge_id();
            let mut charge = Charge::new(id, p.pos, p.q, self.config.default_mass, self.config.default_radius);
            charge.is_fixed = p.fixed;
            // Fixed offsets can overhang a small canvas
            charge.clamp_to(self.width, self.height);
            charge.spawn = charge.pos;
            self.charges.push(charge);
        }
        log::info!(
            "Loaded scenario '{}' ({} charges)",
            scenario.as_str(),
            self.charges.len()
        );
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Add a pinned heavy nucleus at the center with one electron in a
    /// circular orbit around it.
    ///
    /// The orbital speed balances the Coulomb attraction:
    /// `v = sqrt(k·|q1·q2| / (m·r))`.
    pub fn spawn_atom(&mut self) {
        let center = Vector2::new(self.width / 2.0, self.height / 2.0);

        let nucleus_id = self.next_charge_id();
        let nucleus = Charge::new(nucleus_id, center, NUCLEUS_Q, NUCLEUS_MASS, NUCLEUS_RADIUS).fixed();

        let speed =
            (self.config.physics_k * (NUCLEUS_Q * ELECTRON_Q).abs() / (ELECTRON_MASS * ORBIT_RADIUS)).sqrt();
        let electron_id = self.next_charge_id();
        let electron = Charge::new(
            electron_id,
            center + Vector2::new(ORBIT_RADIUS, 0.0),
            ELECTRON_Q,
            ELECTRON_MASS,
            ELECTRON_RADIUS,
        )
        .with_velocity(Vector2::new(0.0, -speed));

        self.charges.push(nucleus);
        self.charges.push(electron);
        log::info!("Spawned atom (orbital speed {:.1})", speed);
    }

    /// Patch one charge; returns false when the id is unknown
    pub fn update_charge_properties(&mut self, id: u32, patch: ChargePatch) -> bool {
        let (width, height) = (self.width, self.height);
        let Some(charge) = self.charges.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        patch.apply(charge);
        charge.clamp_to(width, height);
        let snapshot = charge.clone();
        if self.selected == Some(id) {
            self.events.push(SimEvent::SelectionChanged(Some(snapshot)));
        }
        true
    }

    /// Set the charge of the current selection
    pub fn update_selected_charge(&mut self, q: f32) {
        if let Some(id) = self.selected {
            self.update_charge_properties(
                id,
                ChargePatch {
                    q: Some(q),
                    ..Default::default()
                },
            );
        }
    }

    /// Return every charge to its spawn point at rest
    pub fn reset_positions(&mut self) {
        for c in &mut self.charges {
            c.pos = c.spawn;
            c.vel = Vector2::ZERO;
            c.acc = Vector2::ZERO;
            c.is_dragging = false;
            c.clear_trail();
        }
    }

    // === Snapshots ===

    pub fn charges(&self) -> &[Charge] {
        &self.charges
    }

    pub fn charge(&self, id: u32) -> Option<&Charge> {
        self.charges.iter().find(|c| c.id == id)
    }

    pub fn selected_charge(&self) -> Option<Charge> {
        self.selected.and_then(|id| self.charge(id)).cloned()
    }

    /// Canvas bounds
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn input(&mut self) -> &mut InputHub {
        &mut self.input
    }

    // === Pointer interaction ===

    fn set_selection(&mut self, id: Option<u32>) {
        if self.selected == id {
            return;
        }
        self.selected = id;
        let snapshot = self.selected_charge();
        self.events.push(SimEvent::SelectionChanged(snapshot));
    }

    fn on_pointer_down(&mut self, pos: Vector2) {
        let hit = self.charges.iter_mut().find(|c| pos.dist(c.pos) < c.radius);
        let clicked = hit.map(|c| {
            c.is_dragging = true;
            self.drag_offset = c.pos - pos;
            c.id
        });
        self.set_selection(clicked);
    }

    fn on_pointer_move(&mut self, pos: Vector2) {
        let (width, height) = (self.width, self.height);
        for c in self.charges.iter_mut().filter(|c| c.is_dragging) {
            c.pos = pos + self.drag_offset;
            c.vel = Vector2::ZERO;
            c.clear_trail();
            c.clamp_to(width, height);
        }
    }

    fn on_pointer_up(&mut self) {
        for c in &mut self.charges {
            c.is_dragging = false;
        }
    }

    // === Physics ===

    /// One integration step
    fn step(&mut self, dt: f32) {
        let cfg = &self.config;

        // Forces from a consistent snapshot of positions
        let forces: Vec<Vector2> = self
            .charges
            .iter()
            .map(|c1| {
                if !c1.is_free() {
                    return Vector2::ZERO;
                }
                self.charges
                    .iter()
                    .filter(|c2| c2.id != c1.id)
                    .fold(Vector2::ZERO, |f, c2| {
                        f + field::coulomb_force(c1, c2, cfg.physics_k, cfg.max_force)
                    })
            })
            .collect();

        for (c, force) in self.charges.iter_mut().zip(forces) {
            if !c.is_free() {
                continue;
            }
            c.acc = force / c.mass;
            c.vel = c.vel + c.acc * dt;
            c.vel = c.vel * cfg.damping;
            c.pos = c.pos + c.vel * dt;
            c.record_trail();
            bounce_off_walls(c, self.width, self.height, cfg.wall_restitution);
        }

        resolve_collisions(&mut self.charges, cfg.collision_restitution);
    }

    // === Drawing ===

    fn draw_vector_field(&self, surface: &mut dyn Surface) {
        let cell = self.config.field_cell_size;
        for sample in field::sample_grid(self.width, self.height, cell, &self.charges, self.config.visual_k) {
            let mag = sample.field.mag();
            if mag <= 0.5 {
                continue;
            }
            let color = Color::heat(mag / 10.0);
            let len = mag.min(cell * 0.8);
            let end = sample.point + sample.field.normalize() * len;
            arrow(surface, sample.point, end, 3.0, Stroke::solid(color, 1.0));
        }
    }

    fn draw_field_lines(&self, surface: &mut dyn Surface) {
        let stroke = Stroke::solid(Color::rgba(255, 255, 255, 0.35), 1.0);
        for line in field::trace_all(&self.charges, self.config.visual_k, self.width, self.height) {
            surface.polyline(&line.points, stroke);
        }
    }

    fn draw_charges(&self, surface: &mut dyn Surface) {
        for c in &self.charges {
            let color = Color::polarity(c.q);
            if c.trail.len() > 1 {
                let points: Vec<Vector2> = c.trail.iter().copied().collect();
                surface.polyline(&points, Stroke::solid(color.with_alpha(0.4), 2.0));
            }

            if self.glow {
                surface.set_glow(Some(Glow { blur: 15.0, color }));
            }
            surface.fill_circle(c.pos, c.radius, color);
            surface.set_glow(None);

            if self.selected == Some(c.id) {
                surface.stroke_circle(c.pos, c.radius, Stroke::solid(Color::WHITE, 2.0));
            }
            if c.is_fixed {
                surface.stroke_circle(c.pos, c.radius + 4.0, Stroke::dashed(color, 1.0, 4.0, 4.0));
            }

            let label = if c.q > 0.0 { "+" } else if c.q < 0.0 { "-" } else { "0" };
            surface.text(label, c.pos, TextStyle::new(Color::WHITE, 12.0).centered());
        }
    }
}

/// Reflect off canvas edges, keeping the disc in bounds
fn bounce_off_walls(c: &mut Charge, width: f32, height: f32, restitution: f32) {
    let (mut pos, mut vel) = (c.pos, c.vel);
    if pos.x < c.radius {
        pos.x = c.radius;
        vel.x *= -restitution;
    } else if pos.x > width - c.radius {
        pos.x = width - c.radius;
        vel.x *= -restitution;
    }
    if pos.y < c.radius {
        pos.y = c.radius;
        vel.y *= -restitution;
    } else if pos.y > height - c.radius {
        pos.y = height - c.radius;
        vel.y *= -restitution;
    }
    c.pos = pos;
    c.vel = vel;
}

/// Separate overlapping discs and apply an impulse along the contact normal.
///
/// Pinned and dragged charges have zero inverse mass.
fn resolve_collisions(charges: &mut [Charge], restitution: f32) {
    let n = charges.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (left, right) = charges.split_at_mut(j);
            let a = &mut left[i];
            let b = &mut right[0];

            let delta = b.pos - a.pos;
            let dist = delta.mag();
            let min_dist = a.radius + b.radius;
            if dist >= min_dist || dist == 0.0 {
                continue;
            }

            let inv_a = a.inv_mass();
            let inv_b = b.inv_mass();
            if inv_a == 0.0 && inv_b == 0.0 {
                continue;
            }

            let normal = delta / dist;
            let push = normal * ((min_dist - dist) / 2.0);
            if a.is_free() {
                a.pos -= push;
            }
            if b.is_free() {
                b.pos += push;
            }

            let vel_along_normal = (b.vel - a.vel).dot(normal);
            if vel_along_normal > 0.0 {
                continue;
            }
            let impulse = -(1.0 + restitution) * vel_along_normal / (inv_a + inv_b);
            a.vel -= normal * (impulse * inv_a);
            b.vel += normal * (impulse * inv_b);
        }
    }
}

impl SimulationModel for ElectrostaticsModel {
    fn update(&mut self, dt: f32) {
        if self.destroyed || !self.playing {
            return;
        }
        self.step(dt);
    }

    fn draw(&mut self, surface: &mut dyn Surface) {
        if self.destroyed {
            return;
        }
        surface.clear(BACKGROUND);
        match self.mode {
            VisualizationMode::Vectors => self.draw_vector_field(surface),
            VisualizationMode::Lines => self.draw_field_lines(surface),
        }
        self.draw_charges(surface);

        if self.hints {
            surface.text(
                &format!(
                    "Drag charges | {} | {} charges",
                    if self.playing { "Running" } else { "Paused" },
                    self.charges.len()
                ),
                Vector2::new(20.0, self.height - 20.0),
                TextStyle::new(Color::WHITE, 14.0).mono(),
            );
        }
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        for c in &mut self.charges {
            c.clamp_to(width, height);
        }
        log::info!("Electrostatics resized to {}x{}", width, height);
    }

    fn destroy(&mut self) {
        self.input.destroy();
        self.destroyed = true;
        log::info!("Electrostatics destroyed");
    }

    fn handle_input(&mut self, raw: RawInput) {
        if self.destroyed {
            return;
        }
        match self.input.apply(raw) {
            Some(InputEvent::PointerDown { pos, .. }) => self.on_pointer_down(pos),
            Some(InputEvent::PointerMove { pos }) => self.on_pointer_move(pos),
            Some(InputEvent::PointerUp { .. }) => self.on_pointer_up(),
            _ => {}
        }
    }

    fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, DrawList};

    const W: f32 = 800.0;
    const H: f32 = 600.0;

    fn model() -> ElectrostaticsModel {
        ElectrostaticsModel::new(W, H)
    }

    fn click(m: &mut ElectrostaticsModel, pos: Vector2) {
        m.handle_input(RawInput::PointerDown {
            x: pos.x,
            y: pos.y,
            button: 0,
        });
    }

    #[test]
    fn test_dipole_layout() {
        let mut m = model();
        m.load_scenario(Scenario::Dipole);
        let cs = m.charges();
        assert_eq!(cs.len(), 2);
        assert!(cs[0].q * cs[1].q < 0.0);
        assert_eq!(cs[0].pos.y, H / 2.0);
        assert_eq!(cs[1].pos.y, H / 2.0);
        let mid = (cs[0].pos.x + cs[1].pos.x) / 2.0;
        assert!((mid - W / 2.0).abs() < 1e-4);
        assert!(cs[0].pos.x != cs[1].pos.x);
    }

    #[test]
    fn test_spawn_atom_orbit_is_circular() {
        let mut m = model();
        m.load_scenario(Scenario::Dipole);
        m.spawn_atom();
        let cs = m.charges();
        let nucleus = &cs[cs.len() - 2];
        let electron = &cs[cs.len() - 1];
        assert!(nucleus.is_fixed);
        assert_eq!(nucleus.mass, 100.0);
        assert_eq!(nucleus.q, 50.0);
        assert_eq!(electron.q, -10.0);

        let r_vec = electron.pos - nucleus.pos;
        let r = r_vec.mag();
        assert!((r - 150.0).abs() < 1e-3);
        let expected = (m.config.physics_k * (nucleus.q * electron.q).abs() / (electron.mass * r)).sqrt();
        assert!((electron.vel.mag() - expected).abs() < 1e-3);
        assert!(electron.vel.dot(r_vec).abs() < 1e-3);
    }

    #[test]
    fn test_paused_update_is_noop() {
        let mut m = model();
        m.set_playing(false);
        let before: Vec<Vector2> = m.charges().iter().map(|c| c.pos).collect();
        m.update(0.05);
        let after: Vec<Vector2> = m.charges().iter().map(|c| c.pos).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_dipole_attracts() {
        let mut m = model();
        m.load_scenario(Scenario::Dipole);
        let gap = m.charges()[1].pos.x - m.charges()[0].pos.x;
        for _ in 0..10 {
            m.update(1.0 / 60.0);
        }
        let new_gap = m.charges()[1].pos.x - m.charges()[0].pos.x;
        assert!(new_gap < gap);
        assert!(m.charges()[0].trail.len() == 10);
    }

    #[test]
    fn test_fixed_charges_never_move() {
        let mut m = model();
        m.load_scenario(Scenario::Line);
        let pinned: Vec<Vector2> = m.charges().iter().filter(|c| c.is_fixed).map(|c| c.pos).collect();
        for _ in 0..120 {
            m.update(1.0 / 60.0);
        }
        let after: Vec<Vector2> = m.charges().iter().filter(|c| c.is_fixed).map(|c| c.pos).collect();
        assert_eq!(pinned, after);
    }

    #[test]
    fn test_wall_bounce() {
        let mut m = model();
        m.load_scenario(Scenario::Dipole);
        m.set_playing(true);
        let id = m.add_charge(0.0, Some(Vector2::new(30.0, 300.0)));
        m.update_charge_properties(
            id,
            ChargePatch {
                vel_x: Some(-2000.0),
                ..Default::default()
            },
        );
        m.update(0.05);
        let c = m.charge(id).unwrap();
        assert!(c.pos.x >= c.radius);
        assert!(c.vel.x > 0.0);
    }

    #[test]
    fn test_collision_separates_and_bounces() {
        let mut a = Charge::new(1, Vector2::new(100.0, 100.0), 0.0, 1.0, 20.0).with_velocity(Vector2::new(10.0, 0.0));
        let mut b = Charge::new(2, Vector2::new(130.0, 100.0), 0.0, 1.0, 20.0).with_velocity(Vector2::new(-10.0, 0.0));
        a.spawn = a.pos;
        b.spawn = b.pos;
        let mut cs = vec![a, b];
        resolve_collisions(&mut cs, 0.8);
        // Each pushed half the 10px overlap
        assert!((cs[0].pos.x - 95.0).abs() < 1e-4);
        assert!((cs[1].pos.x - 135.0).abs() < 1e-4);
        assert!((cs[0].vel.x + 8.0).abs() < 1e-4);
        assert!((cs[1].vel.x - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_fixed_charge_acts_as_infinite_mass() {
        let wall = Charge::new(1, Vector2::new(100.0, 100.0), 0.0, 1.0, 20.0).fixed();
        let ball = Charge::new(2, Vector2::new(135.0, 100.0), 0.0, 1.0, 20.0).with_velocity(Vector2::new(-10.0, 0.0));
        let mut cs = vec![wall, ball];
        resolve_collisions(&mut cs, 0.8);
        assert_eq!(cs[0].pos, Vector2::new(100.0, 100.0));
        assert_eq!(cs[0].vel, Vector2::ZERO);
        assert!((cs[1].vel.x - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_drag_selects_moves_and_releases() {
        let mut m = model();
        m.load_scenario(Scenario::Dipole);
        let target = m.charges()[0].clone();
        click(&mut m, target.pos + Vector2::new(5.0, 0.0));

        let events = m.drain_events();
        assert!(matches!(events.last(), Some(SimEvent::SelectionChanged(Some(c))) if c.id == target.id));
        assert!(m.charge(target.id).unwrap().is_dragging);

        m.handle_input(RawInput::PointerMove { x: 205.0, y: 155.0 });
        let c = m.charge(target.id).unwrap();
        // Offset from the grab point is preserved
        assert_eq!(c.pos, Vector2::new(200.0, 155.0));
        assert_eq!(c.vel, Vector2::ZERO);
        assert!(c.trail.is_empty());

        m.handle_input(RawInput::PointerUp {
            x: 205.0,
            y: 155.0,
            button: 0,
        });
        assert!(m.charges().iter().all(|c| !c.is_dragging));
    }

    #[test]
    fn test_drag_clamps_to_canvas() {
        let mut m = model();
        m.load_scenario(Scenario::Dipole);
        let target = m.charges()[0].clone();
        click(&mut m, target.pos);
        m.handle_input(RawInput::PointerMove { x: -500.0, y: 9000.0 });
        let c = m.charge(target.id).unwrap();
        assert_eq!(c.pos, Vector2::new(c.radius, H - c.radius));
    }

    #[test]
    fn test_clicking_empty_space_deselects() {
        let mut m = model();
        m.load_scenario(Scenario::Dipole);
        let pos = m.charges()[0].pos;
        click(&mut m, pos);
        m.drain_events();
        click(&mut m, Vector2::new(5.0, 5.0));
        assert_eq!(m.drain_events(), vec![SimEvent::SelectionChanged(None)]);
        assert!(m.selected_charge().is_none());
    }

    #[test]
    fn test_update_properties_notifies_when_selected() {
        let mut m = model();
        m.load_scenario(Scenario::Dipole);
        let (id, pos) = (m.charges()[0].id, m.charges()[0].pos);
        click(&mut m, pos);
        m.drain_events();
        assert!(m.update_charge_properties(
            id,
            ChargePatch {
                q: Some(-75.0),
                mass: Some(3.0),
                ..Default::default()
            }
        ));
        let events = m.drain_events();
        assert!(matches!(&events[..], [SimEvent::SelectionChanged(Some(c))] if c.q == -75.0 && c.mass == 3.0));
        assert!(!m.update_charge_properties(9999, ChargePatch::default()));
    }

    #[test]
    fn test_reset_positions() {
        let mut m = model();
        m.load_scenario(Scenario::Quadrupole);
        let spawns: Vec<Vector2> = m.charges().iter().map(|c| c.pos).collect();
        for _ in 0..30 {
            m.update(1.0 / 60.0);
        }
        m.reset_positions();
        let now: Vec<Vector2> = m.charges().iter().map(|c| c.pos).collect();
        assert_eq!(spawns, now);
        assert!(m.charges().iter().all(|c| c.vel == Vector2::ZERO && c.trail.is_empty()));
    }

    #[test]
    fn test_add_charge_defaults_near_center() {
        let mut m = model();
        let id = m.add_charge(-50.0, None);
        let c = m.charge(id).unwrap();
        assert!((c.pos.x - W / 2.0).abs() <= ADD_JITTER);
        assert!((c.pos.y - H / 2.0).abs() <= ADD_JITTER);
        assert_eq!(c.q, -50.0);
    }

    #[test]
    fn test_visualization_modes_draw() {
        let mut m = model();
        m.load_scenario(Scenario::Dipole);
        let mut list = DrawList::new(W, H);
        m.draw(&mut list);
        let arrows = list.count(|c| matches!(c, DrawCommand::Line { .. }));
        assert!(arrows > 0);

        m.set_visualization_mode("lines".parse().unwrap());
        list.clear_commands();
        m.draw(&mut list);
        let lines = list.count(|c| matches!(c, DrawCommand::Polyline { .. }));
        assert_eq!(lines, field::lines_for_charge(50.0));
    }

    #[test]
    fn test_visualization_mode_parse() {
        assert_eq!("Vectors".parse::<VisualizationMode>().unwrap(), VisualizationMode::Vectors);
        assert!("heatmap".parse::<VisualizationMode>().is_err());
    }

    fn inside(c: &Charge, w: f32, h: f32) -> bool {
        (c.radius..=w - c.radius).contains(&c.pos.x) && (c.radius..=h - c.radius).contains(&c.pos.y)
    }

    #[test]
    fn test_scenarios_fit_small_canvas() {
        let (w, h) = (200.0, 150.0);
        let mut m = ElectrostaticsModel::new(w, h);
        for scenario in [Scenario::Default, Scenario::Line, Scenario::Quadrupole] {
            m.load_scenario(scenario);
            assert!(!m.charges().is_empty());
            for c in m.charges() {
                assert!(inside(c, w, h), "{:?} charge {} at {:?}", scenario, c.id, c.pos);
                assert_eq!(c.spawn, c.pos);
            }
        }
    }

    #[test]
    fn test_patched_position_stays_on_canvas() {
        let mut m = model();
        m.load_scenario(Scenario::Dipole);
        let id = m.charges()[0].id;
        m.update_charge_properties(
            id,
            ChargePatch {
                pos_x: Some(-500.0),
                pos_y: Some(H * 4.0),
                ..Default::default()
            },
        );
        let c = m.charge(id).unwrap();
        assert!(inside(c, W, H));
        assert_eq!(c.pos, Vector2::new(c.radius, H - c.radius));
    }
}
