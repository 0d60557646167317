//! Road Rush entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, HtmlCanvasElement};

    use road_rush::audio::{AudioManager, SoundCue};
    use road_rush::consts::*;
    use road_rush::renderer::RoadRenderState;
    use road_rush::settings::Settings;
    use road_rush::sim::{GameEvent, GameState, TickInput, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RoadRenderState>,
        settings: Settings,
        audio: AudioManager,
        audio_unlocked: bool,
        input: TickInput,
        accumulator: f32,
        last_time: f64,
        score_display: Element,
        lives_display: Element,
    }

    impl Game {
        fn new(seed: u64, settings: Settings, score_display: Element, lives_display: Element) -> Self {
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_music_volume(settings.music_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            Self {
                state: GameState::new(seed),
                render_state: None,
                settings,
                audio,
                audio_unlocked: false,
                input: TickInput::default(),
                accumulator: 0.0,
                last_time: 0.0,
                score_display,
                lives_display,
            }
        }

        /// Run simulation ticks under the fixed-timestep accumulator
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.steer_left = false;
                self.input.steer_right = false;
                self.input.jump = false;
            }
        }

        /// Audio cues and the game-over alert come out of the event queue
        fn drain_events(&mut self) {
            for event in self.state.drain_events() {
                match event {
                    GameEvent::Jumped => self.audio.play(SoundCue::Jump),
                    GameEvent::Collision { .. } => self.audio.play(SoundCue::Collision),
                    GameEvent::GameOver { final_score } => {
                        log::info!("Game over with score {}", final_score);
                        self.audio.stop_running_loop();
                        if let Some(window) = web_sys::window() {
                            let _ = window
                                .alert_with_message(&format!("Game over! Final score: {}", final_score));
                        }
                    }
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, &self.settings, time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            self.score_display
                .set_text_content(Some(&format!("Score: {}", self.state.score)));

            let hearts: String = (0..STARTING_LIVES)
                .map(|i| if i < self.state.lives { "\u{2764}\u{fe0f}" } else { "\u{1f90d}" })
                .collect();
            self.lives_display
                .set_text_content(Some(&format!("Lives: {}", hearts)));
        }

        /// One-shot gesture unlock; later calls are no-ops
        fn try_unlock_audio(&mut self) {
            if self.audio_unlocked {
                return;
            }
            if self.audio.unlock() {
                self.audio_unlocked = true;
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Road Rush starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Missing HUD elements are an unrecoverable startup precondition
        let score_display = document
            .get_element_by_id("score")
            .expect("no score display");
        let lives_display = document
            .get_element_by_id("lives")
            .expect("no lives display");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(
            seed,
            settings,
            score_display,
            lives_display,
        )));

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RoadRenderState::new(surface, &adapter, width, height).await;
        game.borrow_mut().render_state = Some(render_state);
        game.borrow_mut().update_hud();

        setup_input_handlers(game.clone());
        setup_resize_handler(&canvas, game.clone());
        setup_blur_handlers(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Road Rush running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Keyboard: steering, jump, and the first-gesture audio unlock
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" => g.input.steer_left = true,
                    "ArrowRight" => g.input.steer_right = true,
                    " " | "Spacebar" => g.input.jump = true,
                    _ => {}
                }
                g.try_unlock_audio();
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Any click also counts as the unlock gesture
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().try_unlock_audio();
            });
            let _ = document
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let canvas = canvas.clone();

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let window = web_sys::window().unwrap();
            let dpr = window.device_pixel_ratio();
            let width = (canvas.client_width() as f64 * dpr) as u32;
            let height = (canvas.client_height() as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);
            if let Some(ref mut render_state) = game.borrow_mut().render_state {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_blur_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Mute while the window is unfocused (if enabled)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().audio.set_muted(false);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.drain_events();
            g.render(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use road_rush::consts::*;
    use road_rush::sim::{GameEvent, GameState, TickInput, tick};

    env_logger::init();
    log::info!("Road Rush (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1);
    let mut state = GameState::new(seed);

    // Ten simulated seconds of weaving and jumping
    for frame in 0u32..600 {
        let input = TickInput {
            steer_left: frame % 180 == 0,
            steer_right: frame % 180 == 90,
            jump: frame % 75 == 30,
        };
        tick(&mut state, &input, SIM_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::Jumped => log::debug!("frame {}: jump", frame),
                GameEvent::Collision { lives_left } => {
                    log::info!("frame {}: collision, {} lives left", frame, lives_left)
                }
                GameEvent::GameOver { final_score } => {
                    log::info!("frame {}: game over, final score {}", frame, final_score)
                }
            }
        }
    }

    println!(
        "Simulated 600 frames: score={}, lives={}, speed={:.3}, obstacles={}",
        state.score,
        state.lives,
        state.speed,
        state.obstacles.len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
