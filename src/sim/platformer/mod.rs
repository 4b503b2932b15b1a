//! Magnetic platformer
//!
//! The player is a charged ball. Gravity, held movement keys and the
//! inverse-square pull or push of each magnet drive it. Touching a magnet of
//! opposite polarity sticks the ball to its surface until a magnet jump
//! launches it away. Reaching the goal box wins the level; falling off the
//! bottom restarts it.

pub mod level;
pub mod player;

pub use level::{Level, Magnet, Platform};
pub use player::{Particle, Player};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::platform::{InputEvent, InputHub, KeyCode, RawInput};
use crate::renderer::{Color, Glow, Stroke, Surface, TextStyle};
use crate::settings::{PlatformerConfig, Settings};
use crate::sim::{EventQueue, Rect, SimEvent, SimulationModel, Vector2};

/// Falling this far below the canvas restarts the level
const DEATH_DEPTH: f32 = 100.0;
/// Vertical tolerance for landing on a platform top or bumping its underside
const LANDING_TOLERANCE: f32 = 10.0;
/// Tethers are drawn to magnets closer than this
const TETHER_RANGE: f32 = 400.0;

const LEFT_KEYS: [KeyCode; 2] = [KeyCode::ArrowLeft, KeyCode::KeyA];
const RIGHT_KEYS: [KeyCode; 2] = [KeyCode::ArrowRight, KeyCode::KeyD];

const BACKGROUND: Color = Color::hex(0x0f172a);
const PLATFORM: Color = Color::hex(0x334155);
const PLATFORM_TOP: Color = Color::hex(0x475569);
const ATTRACT_TETHER: Color = Color::rgba(74, 222, 128, 0.6);
const REPEL_TETHER: Color = Color::rgba(248, 113, 113, 0.6);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformerPhase {
    #[default]
    Playing,
    /// Terminal until reset
    Won,
}

#[derive(Debug)]
pub struct PlatformerModel {
    width: f32,
    height: f32,
    config: PlatformerConfig,
    hints: bool,
    glow: bool,
    reduced_motion: bool,

    phase: PlatformerPhase,
    player: Player,
    level: Level,
    /// Index of the magnet the player is stuck to
    stuck: Option<usize>,
    jump_cooldown: f32,
    particles: Vec<Particle>,
    pulse_time: f32,

    input: InputHub,
    events: EventQueue,
    rng: Pcg32,
    destroyed: bool,
}

impl PlatformerModel {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_settings(width, height, &Settings::default())
    }

    pub fn with_settings(width: f32, height: f32, settings: &Settings) -> Self {
        log::info!("Platformer initialized ({}x{})", width, height);
        Self {
            width,
            height,
            config: settings.platformer.clone(),
            hints: settings.hints,
            glow: settings.effective_glow(),
            reduced_motion: settings.reduced_motion,
            phase: PlatformerPhase::Playing,
            player: Player::spawn(height),
            level: Level::standard(width, height),
            stuck: None,
            jump_cooldown: 0.0,
            particles: Vec::new(),
            pulse_time: 0.0,
            input: InputHub::new(),
            events: EventQueue::new(),
            rng: Pcg32::seed_from_u64(settings.seed),
            destroyed: false,
        }
    }

    fn restart(&mut self) {
        self.phase = PlatformerPhase::Playing;
        self.player = Player::spawn(self.height);
        self.level = Level::standard(self.width, self.height);
        self.stuck = None;
        self.jump_cooldown = 0.0;
        self.particles.clear();
        self.pulse_time = 0.0;
    }

    /// Restart the level from scratch
    pub fn reset(&mut self) {
        self.restart();
        self.events.push(SimEvent::LevelReset);
        log::info!("Level reset");
    }

    // === Snapshots ===

    pub fn phase(&self) -> PlatformerPhase {
        self.phase
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn magnets(&self) -> &[Magnet] {
        &self.level.magnets
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.level.platforms
    }

    pub fn goal(&self) -> Rect {
        self.level.goal
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn stuck_magnet(&self) -> Option<&Magnet> {
        self.stuck.and_then(|i| self.level.magnets.get(i))
    }

    pub fn jump_cooldown(&self) -> f32 {
        self.jump_cooldown
    }

    // === Actions ===

    pub fn toggle_polarity(&mut self) {
        self.player.toggle_polarity();
    }

    /// Ground jump, or a magnet jump while stuck
    pub fn jump(&mut self) {
        if self.player.grounded {
            self.player.vel.y = -self.config.jump_speed;
            self.player.grounded = false;
        } else if self.stuck.is_some() {
            self.magnet_jump();
        }
    }

    /// Launch straight away from the magnet's center and start the cooldown
    pub fn magnet_jump(&mut self) {
        let Some(magnet) = self.stuck_magnet().copied() else {
            return;
        };
        let dir = (self.player.pos - magnet.pos).normalize();
        self.player.vel = dir * self.config.magnet_jump_speed;
        self.stuck = None;
        self.jump_cooldown = self.config.jump_cooldown;
    }

    fn on_key(&mut self, code: KeyCode) {
        if code == KeyCode::KeyR {
            self.reset();
            return;
        }
        // Polarity stays switchable after the win; movement does not
        if code.is_shift() {
            self.toggle_polarity();
            return;
        }
        if self.phase != PlatformerPhase::Playing {
            return;
        }
        match code {
            KeyCode::Space => self.jump(),
            KeyCode::ArrowUp | KeyCode::KeyW => self.magnet_jump(),
            _ => {}
        }
    }

    // === Physics ===

    /// Gravity, input and magnet forces; sticks on contact with an attracting magnet
    fn accumulate_forces(&mut self, dt: f32) -> Vector2 {
        let cfg = &self.config;
        let mut acc = Vector2::ZERO;
        if self.input.any_held(&LEFT_KEYS) {
            acc.x -= cfg.move_force;
        }
        if self.input.any_held(&RIGHT_KEYS) {
            acc.x += cfg.move_force;
        }
        if self.stuck.is_none() {
            acc.y += cfg.gravity;
        }
        if self.jump_cooldown > 0.0 {
            self.jump_cooldown -= dt;
        }

        for (i, magnet) in self.level.magnets.iter().enumerate() {
            let r_vec = self.player.pos - magnet.pos;
            let dist = r_vec.mag();
            let contact = self.player.radius + magnet.radius;

            if self.player.overlaps(magnet) && self.player.is_attracted_to(magnet) && self.jump_cooldown <= 0.0 {
                self.stuck = Some(i);
                self.player.pos = magnet.pos + r_vec.normalize() * contact;
                self.player.vel = Vector2::ZERO;
                acc = Vector2::ZERO;
                continue;
            }
            if self.stuck == Some(i) {
                continue;
            }

            let d = dist.max(cfg.min_magnet_distance);
            let force = (cfg.magnet_k * self.player.q * magnet.q / (d * d))
                .clamp(-cfg.max_magnet_force, cfg.max_magnet_force);
            acc += r_vec.normalize() * force;
        }
        acc
    }

    fn integrate(&mut self, acc: Vector2, dt: f32) {
        let cfg = &self.config;
        let p = &mut self.player;
        p.acc = acc;
        if self.stuck.is_some() {
            return;
        }
        p.vel += acc * dt;
        p.vel = p.vel * cfg.damping;
        if p.grounded {
            p.vel.x *= cfg.ground_friction;
        }
        p.vel = p.vel.clamp_mag(cfg.max_speed);
        p.pos += p.vel * dt;
    }

    /// Edges and platforms; returns false when the player fell out
    fn collide(&mut self) -> bool {
        let restitution = self.config.wall_restitution;
        let p = &mut self.player;
        p.grounded = false;

        if p.pos.x < p.radius {
            p.pos.x = p.radius;
            p.vel.x *= -restitution;
        }
        if p.pos.x > self.width - p.radius {
            p.pos.x = self.width - p.radius;
            p.vel.x *= -restitution;
        }
        if p.pos.y > self.height + DEATH_DEPTH {
            return false;
        }
        if p.pos.y < p.radius {
            p.pos.y = p.radius;
            p.vel.y *= -restitution;
        }

        for plat in &self.level.platforms {
            if !plat.spans_x(p.pos.x) {
                continue;
            }
            if p.pos.y + p.radius <= plat.top() || p.pos.y - p.radius >= plat.bottom() {
                continue;
            }
            if p.vel.y > 0.0 && p.pos.y < plat.top() + LANDING_TOLERANCE {
                p.pos.y = plat.top() - p.radius;
                p.vel.y = 0.0;
                p.grounded = true;
            } else if p.vel.y < 0.0 && p.pos.y > plat.bottom() - LANDING_TOLERANCE {
                p.pos.y = plat.bottom() + p.radius;
                p.vel.y = 0.0;
            }
        }
        true
    }

    fn check_goal(&mut self) {
        if !self.level.goal.contains(self.player.pos) {
            return;
        }
        self.phase = PlatformerPhase::Won;
        self.particles = player::burst(self.player.pos, self.config.burst_particles, &mut self.rng);
        self.events.push(SimEvent::LevelComplete);
        log::info!("Level complete after {:.1}s", self.pulse_time);
    }

    fn step_particles(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.step(dt);
        }
        self.particles.retain(Particle::is_alive);
    }

    // === Drawing ===

    fn draw_level(&self, surface: &mut dyn Surface) {
        for plat in &self.level.platforms {
            surface.fill_rect(*plat, PLATFORM);
            surface.fill_rect(Rect::new(plat.x, plat.y, plat.w, 4.0), PLATFORM_TOP);
        }

        let goal = self.level.goal;
        let pulse = if self.reduced_motion {
            0.4
        } else {
            0.3 + 0.2 * (self.pulse_time * 5.0).sin()
        };
        surface.fill_rect(goal, Color::GOLD.with_alpha(pulse));
        surface.stroke_rect(goal, Stroke::solid(Color::GOLD, 2.0));
        surface.text(
            "GOAL",
            Vector2::new(goal.x + 25.0, goal.y + 35.0),
            TextStyle::new(Color::GOLD, 16.0),
        );

        for p in &self.particles {
            surface.set_alpha(p.life.clamp(0.0, 1.0));
            surface.fill_rect(
                Rect::new(p.pos.x, p.pos.y, player::PARTICLE_SIZE, player::PARTICLE_SIZE),
                p.color,
            );
        }
        surface.set_alpha(1.0);

        for m in &self.level.magnets {
            let color = Color::polarity(m.q);
            surface.fill_circle(m.pos, m.radius, color);
            surface.stroke_circle(m.pos, m.radius + 5.0, Stroke::solid(color.with_alpha(0.3), 2.0));
            let sign = if m.q > 0.0 { "+" } else { "-" };
            surface.text(sign, m.pos, TextStyle::new(Color::WHITE, 20.0).centered());
        }
    }

    fn draw_player(&self, surface: &mut dyn Surface) {
        let p = &self.player;
        if self.glow {
            surface.set_glow(Some(Glow {
                blur: 15.0,
                color: Color::WHITE,
            }));
        }
        surface.fill_circle(p.pos, p.radius, Color::polarity(p.q));
        surface.stroke_circle(p.pos, p.radius, Stroke::solid(Color::WHITE, 3.0));
        surface.set_glow(None);

        for dx in [-5.0, 5.0] {
            surface.fill_circle(p.pos + Vector2::new(dx, -2.0), 3.0, Color::WHITE);
        }

        for m in &self.level.magnets {
            let dist = p.pos.dist(m.pos);
            if dist >= TETHER_RANGE {
                continue;
            }
            let width = (6.0 * (1.0 - dist / TETHER_RANGE)).max(1.0);
            let stroke = if p.is_attracted_to(m) {
                Stroke::solid(ATTRACT_TETHER, width)
            } else {
                Stroke::dashed(REPEL_TETHER, width, 10.0, 10.0)
            };
            surface.line(p.pos, m.pos, stroke);
        }
    }

    fn draw_hud(&self, surface: &mut dyn Surface) {
        let center = Vector2::new(self.width / 2.0, self.height / 2.0);
        match self.phase {
            PlatformerPhase::Won => {
                surface.fill_rect(
                    Rect::new(0.0, 0.0, self.width, self.height),
                    Color::rgba(0, 0, 0, 0.7),
                );
                surface.text("LEVEL COMPLETE!", center, TextStyle::new(Color::WHITE, 40.0).centered());
                surface.text(
                    "Press 'R' to Restart",
                    center + Vector2::new(0.0, 40.0),
                    TextStyle::new(Color::WHITE, 20.0).centered(),
                );
            }
            PlatformerPhase::Playing if self.hints => {
                surface.text(
                    "Controls: Arrows to Move | Space to Jump | Shift to Switch Polarity",
                    Vector2::new(20.0, 30.0),
                    TextStyle::new(Color::WHITE, 16.0),
                );
            }
            PlatformerPhase::Playing => {}
        }
    }
}

impl SimulationModel for PlatformerModel {
    fn update(&mut self, dt: f32) {
        if self.destroyed {
            return;
        }
        if self.phase == PlatformerPhase::Won {
            self.step_particles(dt);
            return;
        }

        let acc = self.accumulate_forces(dt);
        self.integrate(acc, dt);
        if !self.collide() {
            log::info!("Player fell out of the level");
            self.reset();
            return;
        }
        self.pulse_time += dt;
        self.check_goal();
    }

    fn draw(&mut self, surface: &mut dyn Surface) {
        if self.destroyed {
            return;
        }
        surface.clear(BACKGROUND);
        self.draw_level(surface);
        self.draw_player(surface);
        self.draw_hud(surface);
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.level = Level::standard(width, height);
        self.stuck = None;
        let r = self.player.radius;
        self.player.pos = Vector2::new(
            self.player.pos.x.clamp(r, (width - r).max(r)),
            self.player.pos.y.clamp(r, (height - r).max(r)),
        );
        log::info!("Platformer resized to {}x{}", width, height);
    }

    fn destroy(&mut self) {
        self.input.destroy();
        self.destroyed = true;
        log::info!("Platformer destroyed");
    }

    fn handle_input(&mut self, raw: RawInput) {
        if self.destroyed {
            return;
        }
        if let Some(InputEvent::KeyDown { code }) = self.input.apply(raw) {
            self.on_key(code);
        }
    }

    fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }
}
