//! Polarity Lab entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_host {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use polarity_lab::platform::{FrameRequest, RawInput, Scheduler};
    use polarity_lab::renderer::CanvasSurface;
    use polarity_lab::sim::{SimEvent, Simulation, SimulationKind, SimulationModel};
    use polarity_lab::Settings;

    /// Host instance holding the active model and its surface
    struct Host {
        sim: Simulation,
        surface: CanvasSurface,
        scheduler: Scheduler,
        canvas: HtmlCanvasElement,
        settings: Settings,
    }

    impl Host {
        fn forward(&mut self, raw: RawInput) {
            self.sim.handle_input(raw);
            self.flush_events();
        }

        fn flush_events(&mut self) {
            for event in self.sim.drain_events() {
                match event {
                    SimEvent::SelectionChanged(Some(c)) => log::info!("Selected charge {} (q={})", c.id, c.q),
                    SimEvent::SelectionChanged(None) => log::info!("Selection cleared"),
                    SimEvent::SignalUpdated(s) => log::debug!("Signal {:.1}", s),
                    SimEvent::MirrorPlaced(m) => log::info!("Mirror {} at ({}, {})", m.id, m.x, m.y),
                    SimEvent::LevelComplete => log::info!("Level complete!"),
                    SimEvent::LevelReset => log::info!("Level reset"),
                }
            }
        }

        /// Match the backing store to the CSS size and tell the model
        fn fit_canvas(&mut self) {
            let (w, h) = client_size(&self.canvas);
            self.canvas.set_width(w as u32);
            self.canvas.set_height(h as u32);
            self.surface.set_size(w, h);
            self.sim.resize(w, h);
        }

        /// Swap models when the URL hash names a different one
        fn switch_to(&mut self, kind: SimulationKind) {
            if kind == self.sim.kind() {
                return;
            }
            self.sim.destroy();
            let (w, h) = client_size(&self.canvas);
            self.sim = Simulation::new(kind, w, h, &self.settings);
            log::info!("Switched to {}", kind.as_str());
        }
    }

    fn client_size(canvas: &HtmlCanvasElement) -> (f32, f32) {
        (canvas.client_width().max(1) as f32, canvas.client_height().max(1) as f32)
    }

    fn kind_from_hash() -> SimulationKind {
        let hash = web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default();
        let name = hash.trim_start_matches('#');
        if name.is_empty() {
            return SimulationKind::default();
        }
        name.parse().unwrap_or_else(|e| {
            log::warn!("{}; using the default model", e);
            SimulationKind::default()
        })
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Polarity Lab starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let settings = Settings::load();
        let (w, h) = client_size(&canvas);
        canvas.set_width(w as u32);
        canvas.set_height(h as u32);

        let kind = kind_from_hash();
        let host = Rc::new(RefCell::new(Host {
            sim: Simulation::new(kind, w, h, &settings),
            surface: CanvasSurface::new(&canvas)?,
            scheduler: Scheduler::new(),
            canvas: canvas.clone(),
            settings,
        }));
        log::info!("Running {} at {}x{}", kind.as_str(), w, h);

        setup_pointer_handlers(&canvas, host.clone());
        setup_keyboard(&window, host.clone());
        setup_window_handlers(&window, host.clone());

        // performance.now() and rAF timestamps share a clock
        let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
        host.borrow_mut().scheduler.start(now);
        request_animation_frame(host)?;
        Ok(())
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, host: Rc<RefCell<Host>>) {
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                host.borrow_mut().forward(RawInput::PointerMove {
                    x: event.offset_x() as f32,
                    y: event.offset_y() as f32,
                });
            });
            let _ = canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                host.borrow_mut().forward(RawInput::PointerDown {
                    x: event.offset_x() as f32,
                    y: event.offset_y() as f32,
                    button: event.button(),
                });
            });
            let _ = canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                host.borrow_mut().forward(RawInput::PointerUp {
                    x: event.offset_x() as f32,
                    y: event.offset_y() as f32,
                    button: event.button(),
                });
            });
            let _ = canvas.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Right click is an erase/cancel gesture, not a menu
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.prevent_default();
            });
            let _ = canvas.add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(window: &web_sys::Window, host: Rc<RefCell<Host>>) {
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                // Keep Space and the arrows from scrolling the page
                if matches!(event.code().as_str(), "Space" | "ArrowUp" | "ArrowDown") {
                    event.prevent_default();
                }
                if event.repeat() {
                    return;
                }
                host.borrow_mut().forward(RawInput::KeyDown { code: event.code() });
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                host.borrow_mut().forward(RawInput::KeyUp { code: event.code() });
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_window_handlers(window: &web_sys::Window, host: Rc<RefCell<Host>>) {
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                host.borrow_mut().fit_canvas();
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                host.borrow_mut().switch_to(kind_from_hash());
            });
            let _ = window.add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let next = host.clone();
        let closure = Closure::once(move |time: f64| frame_loop(next, time));
        let id = window.request_animation_frame(closure.as_ref().unchecked_ref())?;
        closure.forget();
        host.borrow_mut().scheduler.post(FrameRequest(id));
        Ok(())
    }

    fn frame_loop(host: Rc<RefCell<Host>>, time: f64) {
        {
            let mut guard = host.borrow_mut();
            let h = &mut *guard;
            if h.scheduler.run_frame(time, &mut h.sim, &mut h.surface).is_none() {
                return;
            }
            h.flush_events();
        }

        if let Err(e) = request_animation_frame(host) {
            log::error!("Frame loop stopped: {:?}", e);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_host::run()
}

/// Headless smoke run: steps every model for a few seconds against a recorder
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use polarity_lab::platform::Scheduler;
    use polarity_lab::renderer::DrawList;
    use polarity_lab::sim::{Simulation, SimulationKind, SimulationModel};
    use polarity_lab::Settings;

    env_logger::init();
    log::info!("Polarity Lab (native) starting...");
    log::info!("Interactive mode runs in the browser - build for wasm32 and serve index.html");

    let settings = Settings::load();
    let (width, height) = (800.0, 600.0);
    let frames = 180;

    for kind in [
        SimulationKind::Electrostatics,
        SimulationKind::WaveOptics,
        SimulationKind::Platformer,
    ] {
        let mut sim = Simulation::new(kind, width, height, &settings);
        let mut surface = DrawList::new(width, height);
        let mut scheduler = Scheduler::new();
        scheduler.start(0.0);

        let mut commands = 0;
        let mut events = 0;
        for frame in 1..=frames {
            surface.clear_commands();
            scheduler.run_frame(frame as f64 * 1000.0 / 60.0, &mut sim, &mut surface);
            commands += surface.len();
            for event in sim.drain_events() {
                log::debug!("{}: {:?}", kind.as_str(), event);
                events += 1;
            }
        }
        sim.destroy();

        println!(
            "{:<15} {} frames, {:.0} draw commands/frame, {} events",
            kind.as_str(),
            frames,
            commands as f32 / frames as f32,
            events
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
