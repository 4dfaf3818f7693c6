//! Petal Run entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement};

    use petal_run::sim::{CardView, EntityKind, LetterScore, RunSnapshot, WordleRow};
    use petal_run::story::Narration;
    use petal_run::{PresentationSurface, Session};

    /// Draws the run on a 2D canvas and everything else as DOM
    struct CanvasSurface {
        document: Document,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        ground_y: f64,
    }

    impl CanvasSurface {
        fn element(&self, id: &str) -> Option<Element> {
            self.document.get_element_by_id(id)
        }

        fn set_visible(&self, id: &str, visible: bool) {
            if let Some(el) = self.element(id) {
                let style = if visible { "display: block" } else { "display: none" };
                let _ = el.set_attribute("style", style);
            }
        }

        fn set_html(&self, id: &str, html: &str) {
            if let Some(el) = self.element(id) {
                el.set_inner_html(html);
            }
        }
    }

    impl PresentationSurface for CanvasSurface {
        fn render(&mut self, frame: &RunSnapshot<'_>) {
            self.set_visible("gameCanvas", true);
            self.set_visible("puzzleContainer", false);

            let width = self.canvas.width() as f64;
            let height = self.canvas.height() as f64;
            self.ctx.clear_rect(0.0, 0.0, width, height);

            self.ctx.set_fill_style_str("#32CD32");
            self.ctx
                .fill_rect(0.0, self.ground_y, width, height - self.ground_y);

            let p = frame.player;
            self.ctx.set_fill_style_str("blue");
            self.ctx
                .fill_rect(p.pos.x as f64, p.pos.y as f64, p.size.x as f64, p.size.y as f64);

            for entity in frame.entities {
                let color = match entity.kind {
                    EntityKind::Flower => "magenta",
                    EntityKind::Obstacle => "red",
                };
                let r = entity.rect;
                self.ctx.set_fill_style_str(color);
                self.ctx
                    .fill_rect(r.pos.x as f64, r.pos.y as f64, r.size.x as f64, r.size.y as f64);
            }
        }

        fn render_wordle(&mut self, rows: &[WordleRow]) {
            self.set_visible("gameCanvas", false);
            self.set_visible("puzzleContainer", true);

            let mut html = String::new();
            for row in rows {
                html.push_str("<div class=\"wordle-row\">");
                for (i, letter) in row.letters.iter().enumerate() {
                    let class = match row.scores.map(|s| s[i]) {
                        Some(LetterScore::Correct) => "tile correct",
                        Some(LetterScore::Present) => "tile present",
                        Some(LetterScore::Absent) => "tile absent",
                        None => "tile",
                    };
                    let text = letter.map(String::from).unwrap_or_default();
                    html.push_str(&format!("<div class=\"{class}\">{text}</div>"));
                }
                html.push_str("</div>");
            }
            self.set_html("puzzleContainer", &html);
        }

        fn render_memory(&mut self, cards: &[CardView<'_>]) {
            self.set_visible("gameCanvas", false);
            self.set_visible("puzzleContainer", true);

            let mut html = String::from("<div class=\"memory-grid\">");
            for card in cards {
                let face = match card.face {
                    Some(symbol) => format!("<img src=\"{symbol}\" alt=\"memory\">"),
                    None => "?".to_string(),
                };
                html.push_str(&format!(
                    "<div class=\"memory-card\" data-card=\"{}\">{}</div>",
                    card.id, face
                ));
            }
            html.push_str("</div>");
            self.set_html("puzzleContainer", &html);
        }

        fn show_narration(&mut self, narration: &Narration) {
            let mut html = format!("<h2>{}</h2><p>{}</p>", narration.heading, narration.body);
            if let Some(prompt) = narration.prompt {
                html.push_str(&format!("<button id=\"continueButton\">{prompt}</button>"));
                self.set_visible("gameCanvas", false);
                self.set_visible("puzzleContainer", false);
            }
            self.set_html("narration", &html);
        }

        fn notify(&mut self, message: &str) {
            if let Some(window) = web_sys::window() {
                let _ = window.alert_with_message(message);
            }
        }

        fn show_end_screen(&mut self) {
            self.set_visible("gameContainer", false);
            self.set_visible("endScreen", true);
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        surface: CanvasSurface,
        last_time: f64,
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
        log::info!("Petal Run starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or("missing #gameCanvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let seed = js_sys::Date::now() as u64;
        let session = Session::new(seed);
        let ground_y = session.tuning().ground_y as f64;
        let surface = CanvasSurface {
            document,
            canvas,
            ctx,
            ground_y,
        };

        let game = Rc::new(RefCell::new(Game {
            session,
            surface,
            last_time: 0.0,
        }));
        {
            let mut g = game.borrow_mut();
            let Game { session, surface, .. } = &mut *g;
            session.start(surface);
        }

        setup_keyboard(game.clone())?;
        setup_clicks(game.clone())?;
        request_animation_frame(game);

        log::info!("Petal Run running with seed {}", seed);
        Ok(())
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            let Game { session, surface, .. } = &mut *g;
            match event.key().as_str() {
                " " | "ArrowUp" => {
                    event.prevent_default();
                    session.on_jump_input();
                }
                "Backspace" => session.on_backspace(surface),
                "Enter" => session.on_submit(surface),
                key => {
                    let mut chars = key.chars();
                    if let (Some(c), None) = (chars.next(), chars.next()) {
                        session.on_letter_input(c, surface);
                    }
                }
            }
        });
        window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_clicks(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let mut g = game.borrow_mut();
            let Game { session, surface, .. } = &mut *g;

            if target.id() == "continueButton" {
                session.on_continue_acknowledged(surface);
                return;
            }
            let card = target
                .closest(".memory-card")
                .ok()
                .flatten()
                .and_then(|el| el.get_attribute("data-card"))
                .and_then(|id| id.parse::<usize>().ok());
            if let Some(id) = card {
                session.on_card_selected(id, surface);
            }
        });
        document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
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
                0.0
            };
            g.last_time = time;

            let Game { session, surface, .. } = &mut *g;
            session.advance(dt, surface);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Petal Run (native) starting...");
    log::info!("Native mode plays a headless demo - run with `trunk serve` for the web version");

    if let Err(err) = native::run_demo(std::env::args().skip(1)) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use petal_run::sim::Autopilot;
    use petal_run::surface::LogSurface;
    use petal_run::{LevelPhase, Session, Tuning, TuningError};

    /// Give up after ten simulated minutes
    const MAX_DEMO_STEPS: u64 = 60 * 60 * 10;

    /// Usage: `petal-run [tuning.json] [seed]`
    pub fn run_demo(mut args: impl Iterator<Item = String>) -> Result<(), TuningError> {
        let tuning = match args.next() {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(2025);

        let mut session = Session::with_tuning(seed, tuning)?;
        let mut surface = LogSurface::default();
        let mut pilot = Autopilot::with_decoys(&["ROSES", "HEART"]);

        session.start(&mut surface);
        while session.phase() != LevelPhase::Complete && session.now_ticks() < MAX_DEMO_STEPS {
            pilot.act(&mut session, &mut surface);
            session.step(&mut surface);
        }

        let snapshot = session.snapshot();
        log::info!(
            "Demo finished in {:?} after {} ticks: {} flowers, {} run attempt(s)",
            snapshot.phase,
            snapshot.ticks,
            snapshot.flowers_collected,
            snapshot.level1_attempts
        );
        Ok(())
    }
}
