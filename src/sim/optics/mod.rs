//! Wave optics puzzle
//!
//! A laser leaves the source and must reach the target through a generated
//! maze; the player places flat mirrors to route it. Two propagation
//! strategies share the same wall grid:
//! - `Raycast` (default): discrete ray with mirror bounces, binary signal
//! - `Stencil`: full-field Yee stencil, smoothed signal
//!
//! Resizing rebuilds the grid and a fresh maze; mirrors and fields are lost.

pub mod grid;
pub mod maze;
pub mod mirror;
pub mod raycast;
pub mod stencil;

pub use grid::{GridPos, Material, WallGrid};
pub use maze::MazeLayout;
pub use mirror::{BRUSH_ANGLES, Mirror, next_brush_angle};
pub use raycast::{LaserPath, Raycaster};
pub use stencil::StencilField;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SandboxError;
use crate::platform::{InputEvent, InputHub, KeyCode, MouseButton, RawInput};
use crate::renderer::{Color, Glow, Image, Stroke, Surface, TextStyle};
use crate::settings::{OpticsConfig, Settings};
use crate::sim::{EventQueue, Rect, SimEvent, SimulationModel, Vector2};

/// Paint brush radius in cells (stencil mode)
const BRUSH_RADIUS: i32 = 3;
const SOURCE_RADIUS: f32 = 6.0;
const MIRROR_COLOR: Color = Color::hex(0xaaaaff);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropagationMode {
    #[default]
    Raycast,
    Stencil,
}

impl PropagationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropagationMode::Raycast => "raycast",
            PropagationMode::Stencil => "stencil",
        }
    }
}

impl FromStr for PropagationMode {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raycast" | "laser" | "rays" => Ok(PropagationMode::Raycast),
            "stencil" | "fdtd" | "field" => Ok(PropagationMode::Stencil),
            _ => Err(SandboxError::UnknownPropagation(s.to_string())),
        }
    }
}

#[derive(Debug)]
pub struct WaveOpticsModel {
    width: f32,
    height: f32,
    config: OpticsConfig,
    seed: u64,
    hints: bool,
    glow: bool,

    grid: WallGrid,
    /// Grid as generated, before any painting
    base_grid: WallGrid,
    layout: MazeLayout,

    mirrors: Vec<Mirror>,
    next_mirror_id: u32,
    brush_angle: u16,

    mode: PropagationMode,
    material: Material,
    frequency: f32,
    painting: bool,

    path: LaserPath,
    stencil: StencilField,
    signal: f32,

    wall_image: Image,
    field_image: Image,

    input: InputHub,
    events: EventQueue,
    rng: Pcg32,
    levels_generated: u32,
    destroyed: bool,
}

impl WaveOpticsModel {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_settings(width, height, &Settings::default())
    }

    pub fn with_settings(width: f32, height: f32, settings: &Settings) -> Self {
        let config = settings.optics.clone().validated();
        let grid = WallGrid::for_canvas(width, height, config.scale);
        let stencil = StencilField::new(grid.cols(), grid.rows());
        let mut model = Self {
            width,
            height,
            frequency: config.frequency,
            config,
            seed: settings.seed,
            hints: settings.hints,
            glow: settings.effective_glow(),
            base_grid: grid.clone(),
            grid,
            layout: MazeLayout {
                source: (0, 0),
                target: (0, 0),
                play: (0, 0, 0, 0),
            },
            mirrors: Vec::new(),
            next_mirror_id: 1,
            brush_angle: BRUSH_ANGLES[0],
            mode: PropagationMode::default(),
            material: Material::Reflector,
            painting: false,
            path: LaserPath::default(),
            stencil,
            signal: 0.0,
            wall_image: Image::new(1, 1),
            field_image: Image::new(1, 1),
            input: InputHub::new(),
            events: EventQueue::new(),
            rng: Pcg32::seed_from_u64(settings.seed),
            levels_generated: 0,
            destroyed: false,
        };
        model.regenerate_level();
        model
    }

    // === Level ===

    /// New maze from the seeded RNG; mirrors, fields and signal are cleared
    pub fn regenerate_level(&mut self) {
        self.layout = maze::generate(&mut self.grid, &self.config, &mut self.rng);
        self.base_grid = self.grid.clone();
        self.levels_generated += 1;
        self.mirrors.clear();
        self.stencil.reset();
        self.set_signal(0.0);
        self.grid.render_into(&mut self.wall_image);
        log::info!(
            "Generated maze #{} (seed {}, {}x{} cells, {} wall cells)",
            self.levels_generated,
            self.seed,
            self.grid.cols(),
            self.grid.rows(),
            self.grid.count(Material::Absorber)
        );
    }

    /// Drop mirrors and painted cells, keeping the current maze
    pub fn reset_walls(&mut self) {
        self.mirrors.clear();
        self.grid = self.base_grid.clone();
        self.grid.render_into(&mut self.wall_image);
        self.stencil.reset();
        self.set_signal(0.0);
    }

    /// Replace the wall grid; rejected unless its size matches the canvas
    pub fn set_walls(&mut self, grid: WallGrid) -> bool {
        if grid.cols() != self.grid.cols() || grid.rows() != self.grid.rows() {
            log::warn!(
                "Ignoring wall grid {}x{} (expected {}x{})",
                grid.cols(),
                grid.rows(),
                self.grid.cols(),
                self.grid.rows()
            );
            return false;
        }
        self.base_grid = grid.clone();
        self.grid = grid;
        self.grid.render_into(&mut self.wall_image);
        self.stencil.reset();
        true
    }

    /// Move source and target (cells)
    pub fn set_endpoints(&mut self, source: GridPos, target: GridPos) {
        self.layout.source = source;
        self.layout.target = target;
        self.stencil.reset();
    }

    pub fn walls(&self) -> &WallGrid {
        &self.grid
    }

    pub fn layout(&self) -> &MazeLayout {
        &self.layout
    }

    pub fn source(&self) -> Vector2 {
        WallGrid::cell_origin(self.layout.source, self.config.scale)
    }

    pub fn target(&self) -> Vector2 {
        WallGrid::cell_origin(self.layout.target, self.config.scale)
    }

    // === Mirrors ===

    /// Place a mirror with the current brush at a pixel position.
    ///
    /// Rejected outside the grid or on an absorber cell. Accepted mirrors are
    /// announced with `SimEvent::MirrorPlaced`.
    pub fn propose_mirror(&mut self, pos: Vector2) -> bool {
        let (gx, gy) = WallGrid::cell_at(pos, self.config.scale);
        if !self.grid.in_bounds(gx, gy) || self.grid.get(gx, gy) == Material::Absorber {
            log::debug!("Mirror rejected at cell ({}, {})", gx, gy);
            return false;
        }
        let mirror = Mirror {
            id: self.next_mirror_id,
            x: gx,
            y: gy,
            angle: self.brush_angle,
            length: self.config.mirror_length,
        };
        self.next_mirror_id += 1;
        self.mirrors.push(mirror);
        self.events.push(SimEvent::MirrorPlaced(mirror));
        true
    }

    /// Replace the whole mirror list
    pub fn set_mirrors(&mut self, mirrors: Vec<Mirror>) {
        self.next_mirror_id = mirrors
            .iter()
            .map(|m| m.id + 1)
            .max()
            .unwrap_or(1)
            .max(self.next_mirror_id);
        self.mirrors = mirrors;
    }

    pub fn mirrors(&self) -> &[Mirror] {
        &self.mirrors
    }

    pub fn clear_mirrors(&mut self) {
        self.mirrors.clear();
    }

    pub fn rotate_brush(&mut self) {
        self.brush_angle = next_brush_angle(self.brush_angle);
    }

    pub fn brush_angle(&self) -> u16 {
        self.brush_angle
    }

    // === Propagation ===

    pub fn set_propagation_mode(&mut self, mode: PropagationMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.stencil.reset();
        self.painting = false;
        log::info!("Propagation mode: {}", mode.as_str());
    }

    pub fn propagation_mode(&self) -> PropagationMode {
        self.mode
    }

    /// Source angular frequency per sub-step (stencil mode)
    pub fn set_frequency(&mut self, frequency: f32) {
        if frequency.is_finite() {
            self.frequency = frequency;
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Paint brush material (stencil mode)
    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn signal_strength(&self) -> f32 {
        self.signal
    }

    pub fn laser_path(&self) -> &LaserPath {
        &self.path
    }

    fn set_signal(&mut self, signal: f32) {
        if signal != self.signal {
            self.signal = signal;
            self.events.push(SimEvent::SignalUpdated(signal));
        }
    }

    fn cast_laser(&mut self) {
        let raycaster = Raycaster {
            grid: &self.grid,
            mirrors: &self.mirrors,
            scale: self.config.scale,
        };
        self.path = raycaster.trace(self.source(), self.target(), self.config.target_radius);
        let signal = if self.path.hit_target { 100.0 } else { 0.0 };
        self.set_signal(signal);
    }

    fn step_stencil(&mut self) {
        for _ in 0..self.config.substeps {
            self.stencil.step(&self.grid, self.layout.source, self.frequency);
            self.stencil.sample_signal(self.layout.target);
        }
        self.set_signal(self.stencil.signal());
    }

    // === Input ===

    fn paint(&mut self, pos: Vector2) {
        let (gx, gy) = WallGrid::cell_at(pos, self.config.scale);
        self.grid.paint_disc(gx, gy, BRUSH_RADIUS, self.material);
        self.grid.render_into(&mut self.wall_image);
    }

    fn on_pointer_down(&mut self, pos: Vector2, button: MouseButton) {
        if button != MouseButton::Left {
            return;
        }
        match self.mode {
            PropagationMode::Raycast => {
                self.propose_mirror(pos);
            }
            PropagationMode::Stencil => {
                self.painting = true;
                self.paint(pos);
            }
        }
    }

    // === Drawing ===

    fn grid_rect(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.grid.cols() as f32 * self.config.scale,
            self.grid.rows() as f32 * self.config.scale,
        )
    }

    fn draw_mirrors(&self, surface: &mut dyn Surface) {
        let stroke = Stroke::solid(MIRROR_COLOR, 4.0);
        for m in &self.mirrors {
            let (a, b) = m.segment(self.config.scale);
            surface.line(a, b, stroke);
        }
    }

    fn draw_laser(&self, surface: &mut dyn Surface) {
        if self.path.points.len() < 2 {
            return;
        }
        if self.glow {
            surface.set_glow(Some(Glow {
                blur: 10.0,
                color: Color::LASER,
            }));
        }
        surface.polyline(&self.path.points, Stroke::solid(Color::LASER, 2.0));
        surface.set_glow(None);
    }

    fn draw_endpoints(&self, surface: &mut dyn Surface) {
        surface.fill_circle(self.source(), SOURCE_RADIUS, Color::LASER);

        let lit = self.signal / 100.0;
        let target = self.target();
        if self.glow {
            surface.set_glow(Some(Glow {
                blur: 10.0 + lit * 20.0,
                color: Color::LASER,
            }));
        }
        surface.fill_circle(target, self.config.target_radius, Color::LASER.with_alpha(0.2 + lit * 0.8));
        surface.set_glow(None);
        surface.stroke_circle(target, self.config.target_radius, Stroke::solid(Color::WHITE, 2.0));
    }

    fn draw_ghost_mirror(&self, surface: &mut dyn Surface) {
        let pointer = self.input.pointer();
        if pointer.x <= 0.0 || pointer.y <= 0.0 {
            return;
        }
        let ghost = Mirror {
            id: 0,
            x: 0,
            y: 0,
            angle: self.brush_angle,
            length: self.config.mirror_length,
        };
        let (a, b) = ghost.segment(self.config.scale);
        surface.line(
            pointer + a,
            pointer + b,
            Stroke::dashed(Color::WHITE.with_alpha(0.5), 4.0, 5.0, 5.0),
        );
    }

    fn hint(&self) -> String {
        match self.mode {
            PropagationMode::Raycast => format!(
                "Left Click: Place Mirror | 'R': Rotate ({}\u{b0}) | Mirrors: {}",
                self.brush_angle,
                self.mirrors.len()
            ),
            PropagationMode::Stencil => format!(
                "Click/Drag: Paint {} | Signal: {:.0}%",
                self.material.as_str(),
                self.signal
            ),
        }
    }
}

impl SimulationModel for WaveOpticsModel {
    fn update(&mut self, _dt: f32) {
        if self.destroyed {
            return;
        }
        match self.mode {
            PropagationMode::Raycast => self.cast_laser(),
            PropagationMode::Stencil => self.step_stencil(),
        }
    }

    fn draw(&mut self, surface: &mut dyn Surface) {
        if self.destroyed {
            return;
        }
        surface.clear(Color::BLACK);
        let dest = self.grid_rect();
        match self.mode {
            PropagationMode::Raycast => {
                surface.draw_image(&self.wall_image, dest);
                self.draw_mirrors(surface);
                self.draw_laser(surface);
                self.draw_endpoints(surface);
                self.draw_ghost_mirror(surface);
            }
            PropagationMode::Stencil => {
                self.stencil.render_into(&self.grid, &mut self.field_image);
                surface.draw_image(&self.field_image, dest);
                self.draw_endpoints(surface);
            }
        }

        if self.hints {
            surface.text(
                &self.hint(),
                Vector2::new(20.0, self.height - 20.0),
                TextStyle::new(Color::WHITE, 14.0).mono(),
            );
        }
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.grid = WallGrid::for_canvas(width, height, self.config.scale);
        self.stencil = StencilField::new(self.grid.cols(), self.grid.rows());
        self.path = LaserPath::default();
        self.regenerate_level();
        log::info!("Optics resized to {}x{}", width, height);
    }

    fn destroy(&mut self) {
        self.input.destroy();
        self.destroyed = true;
        log::info!("Optics destroyed");
    }

    fn handle_input(&mut self, raw: RawInput) {
        if self.destroyed {
            return;
        }
        match self.input.apply(raw) {
            Some(InputEvent::PointerDown { pos, button }) => self.on_pointer_down(pos, button),
            Some(InputEvent::PointerMove { pos }) => {
                if self.painting && self.mode == PropagationMode::Stencil {
                    self.paint(pos);
                }
            }
            Some(InputEvent::PointerUp { .. }) => self.painting = false,
            Some(InputEvent::KeyDown { code: KeyCode::KeyR }) => self.rotate_brush(),
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

    /// Model with an empty grid and endpoints on one row
    fn open_level() -> WaveOpticsModel {
        let mut m = WaveOpticsModel::new(W, H);
        let (cols, rows) = (m.walls().cols(), m.walls().rows());
        assert!(m.set_walls(WallGrid::new(cols, rows)));
        m.set_endpoints((20, 50), (200, 50));
        m.drain_events();
        m
    }

    fn left_click(m: &mut WaveOpticsModel, x: f32, y: f32) {
        m.handle_input(RawInput::PointerDown { x, y, button: 0 });
        m.handle_input(RawInput::PointerUp { x, y, button: 0 });
    }

    #[test]
    fn test_clear_line_of_sight_lights_target() {
        let mut m = open_level();
        m.update(0.016);
        assert_eq!(m.signal_strength(), 100.0);
        assert_eq!(m.drain_events(), vec![SimEvent::SignalUpdated(100.0)]);

        // Unchanged signal is not re-announced
        m.update(0.016);
        assert!(m.drain_events().is_empty());
    }

    #[test]
    fn test_absorber_between_blocks_signal() {
        let mut m = open_level();
        m.update(0.016);
        let mut grid = m.walls().clone();
        grid.fill_rect(100, 0, 5, grid.rows() as i32, Material::Absorber);
        assert!(m.set_walls(grid));
        m.update(0.016);
        assert_eq!(m.signal_strength(), 0.0);
        assert_eq!(
            m.drain_events(),
            vec![SimEvent::SignalUpdated(100.0), SimEvent::SignalUpdated(0.0)]
        );
    }

    #[test]
    fn test_mirror_routes_laser_to_target() {
        let mut m = open_level();
        m.set_endpoints((20, 20), (100, 100));
        m.update(0.016);
        assert_eq!(m.signal_strength(), 0.0);

        // 45 degrees turns a rightward ray downward
        m.rotate_brush();
        assert!(m.propose_mirror(Vector2::new(200.5, 40.5)));
        m.update(0.016);
        assert_eq!(m.signal_strength(), 100.0);
        assert_eq!(m.laser_path().bounces, 1);
    }

    #[test]
    fn test_propose_mirror_rejects_absorber() {
        let mut m = WaveOpticsModel::new(W, H);
        m.drain_events();
        // The border band is solid
        assert!(!m.propose_mirror(Vector2::new(4.0, 4.0)));
        assert!(!m.propose_mirror(Vector2::new(-10.0, 50.0)));
        assert!(m.mirrors().is_empty());
        assert!(m.drain_events().is_empty());
    }

    #[test]
    fn test_click_places_mirror_with_brush_angle() {
        let mut m = WaveOpticsModel::new(W, H);
        m.drain_events();
        m.handle_input(RawInput::KeyDown { code: "KeyR".into() });
        m.handle_input(RawInput::KeyDown { code: "KeyR".into() });
        assert_eq!(m.brush_angle(), 90);

        let src = m.source();
        left_click(&mut m, src.x + 20.0, src.y + 20.0);
        let events = m.drain_events();
        assert!(matches!(&events[..], [SimEvent::MirrorPlaced(mirror)] if mirror.angle == 90));
        assert_eq!(m.mirrors().len(), 1);

        // Right click never places
        m.handle_input(RawInput::PointerDown {
            x: src.x,
            y: src.y,
            button: 2,
        });
        assert_eq!(m.mirrors().len(), 1);
    }

    #[test]
    fn test_set_mirrors_replaces_list() {
        let mut m = WaveOpticsModel::new(W, H);
        let mirror = Mirror {
            id: 41,
            x: 150,
            y: 100,
            angle: 45,
            length: 15.0,
        };
        m.set_mirrors(vec![mirror]);
        assert_eq!(m.mirrors(), &[mirror]);
        let src = m.source();
        assert!(m.propose_mirror(src));
        assert_eq!(m.mirrors()[1].id, 42);
        m.clear_mirrors();
        assert!(m.mirrors().is_empty());
    }

    #[test]
    fn test_laser_path_respects_caps() {
        let mut m = WaveOpticsModel::new(W, H);
        m.update(0.016);
        let path = m.laser_path();
        assert!(path.points.len() >= 2);
        assert!(path.bounces <= crate::consts::MAX_BOUNCES);
        assert!(path.length() <= crate::consts::MAX_RAY_DISTANCE + 1e-2);
    }

    #[test]
    fn test_regenerate_is_seeded() {
        let a = WaveOpticsModel::with_settings(W, H, &Settings::with_seed(7));
        let b = WaveOpticsModel::with_settings(W, H, &Settings::with_seed(7));
        assert_eq!(a.walls(), b.walls());
        assert_eq!(a.layout(), b.layout());
    }

    #[test]
    fn test_out_of_range_config_is_clamped() {
        let mut settings = Settings::with_seed(3);
        settings.optics.scale = 0.0;
        settings.optics.min_region = 0;
        let m = WaveOpticsModel::with_settings(400.0, 300.0, &settings);
        assert_eq!((m.walls().cols(), m.walls().rows()), (400, 300));
        assert_eq!(m.layout().play, (100, 75, 200, 150));
    }

    #[test]
    fn test_resize_reinitializes() {
        let mut m = WaveOpticsModel::new(W, H);
        let src = m.source();
        assert!(m.propose_mirror(src));
        m.resize(400.0, 300.0);
        assert_eq!((m.walls().cols(), m.walls().rows()), (200, 150));
        assert!(m.mirrors().is_empty());
        assert_eq!(m.signal_strength(), 0.0);
    }

    #[test]
    fn test_reset_walls_restores_maze() {
        let mut m = WaveOpticsModel::new(W, H);
        let original = m.walls().clone();
        m.set_propagation_mode(PropagationMode::Stencil);
        m.set_material(Material::Absorber);
        let src = m.source();
        left_click(&mut m, src.x, src.y);
        assert_ne!(m.walls(), &original);
        m.reset_walls();
        assert_eq!(m.walls(), &original);
    }

    #[test]
    fn test_stencil_paint_and_drag() {
        let mut m = open_level();
        m.set_propagation_mode("stencil".parse().unwrap());
        m.set_material("reflector".parse().unwrap());
        m.handle_input(RawInput::PointerDown {
            x: 100.0,
            y: 100.0,
            button: 0,
        });
        m.handle_input(RawInput::PointerMove { x: 160.0, y: 100.0 });
        m.handle_input(RawInput::PointerUp {
            x: 160.0,
            y: 100.0,
            button: 0,
        });
        assert_eq!(m.walls().get(50, 50), Material::Reflector);
        assert_eq!(m.walls().get(80, 50), Material::Reflector);
        // Released: moves no longer paint
        m.handle_input(RawInput::PointerMove { x: 300.0, y: 300.0 });
        assert_eq!(m.walls().get(150, 150), Material::Air);
        assert!(m.mirrors().is_empty());
    }

    #[test]
    fn test_stencil_signal_ramps() {
        let mut m = open_level();
        m.set_propagation_mode(PropagationMode::Stencil);
        m.set_endpoints((50, 50), (52, 50));
        for _ in 0..100 {
            m.update(0.016);
        }
        let s = m.signal_strength();
        assert!(s > 0.0 && s <= 100.0);
        assert!(m
            .drain_events()
            .iter()
            .all(|e| matches!(e, SimEvent::SignalUpdated(v) if (0.0..=100.0).contains(v))));
    }

    #[test]
    fn test_draw_raycast_scene() {
        let mut m = open_level();
        m.update(0.016);
        m.handle_input(RawInput::PointerMove { x: 300.0, y: 300.0 });
        let mut list = DrawList::new(W, H);
        m.draw(&mut list);
        assert_eq!(list.count(|c| matches!(c, DrawCommand::Image { .. })), 1);
        assert_eq!(list.count(|c| matches!(c, DrawCommand::Polyline { .. })), 1);
        // Ghost mirror preview
        assert_eq!(
            list.count(|c| matches!(c, DrawCommand::Line { stroke, .. } if stroke.dash.is_some())),
            1
        );
        assert!(list.texts().iter().any(|t| t.contains("Mirrors: 0")));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("FDTD".parse::<PropagationMode>().unwrap(), PropagationMode::Stencil);
        assert!("prism".parse::<PropagationMode>().is_err());
    }
}
