//! Menu Walkthrough
//!
//! This example drives a simulated game from an unknown screen into a match.
//!
//! Key concepts:
//! - A recovery state that identifies the current screen by its landmarks
//! - Image-driven states that click a button and move on
//! - Real template matching (NCC) against rendered frames
//! - Structured logs through tracing
//!
//! Run with: RUST_LOG=menupilot=debug cargo run --example menu_walkthrough

use image::{GrayImage, Luma};
use menupilot::action::{InputDevice, InputError, MouseButton};
use menupilot::builder::{NavigatorBuilder, StateGraphBuilder};
use menupilot::config::NavigatorConfig;
use menupilot::core::Point;
use menupilot::states::{ImageState, RecoveryState, TerminalState};
use menupilot::vision::{CaptureError, Frame, FrameSource, Template, TemplateLibrary};
use std::cell::RefCell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

const SCREEN_W: u32 = 256;
const SCREEN_H: u32 = 160;
const BUTTON_W: u32 = 24;
const BUTTON_H: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Title,
    MainMenu,
    ModeSelect,
    InMatch,
}

struct Button {
    template: &'static str,
    seed: u32,
    at: (u32, u32),
    leads_to: Option<Screen>,
}

fn buttons(screen: Screen) -> Vec<Button> {
    match screen {
        Screen::Title => vec![Button {
            template: "press_start.png",
            seed: 1,
            at: (116, 120),
            leads_to: Some(Screen::MainMenu),
        }],
        Screen::MainMenu => vec![
            Button {
                template: "play.png",
                seed: 2,
                at: (40, 40),
                leads_to: Some(Screen::ModeSelect),
            },
            Button {
                template: "settings.png",
                seed: 3,
                at: (40, 80),
                leads_to: None,
            },
        ],
        Screen::ModeSelect => vec![Button {
            template: "quick_match.png",
            seed: 4,
            at: (180, 90),
            leads_to: Some(Screen::InMatch),
        }],
        Screen::InMatch => vec![Button {
            template: "hud.png",
            seed: 5,
            at: (8, 8),
            leads_to: None,
        }],
    }
}

/// Deterministic texture so every button has a distinct pattern.
fn texture(seed: u32) -> GrayImage {
    GrayImage::from_fn(BUTTON_W, BUTTON_H, |x, y| {
        let mut v = seed.wrapping_mul(2_654_435_761)
            ^ x.wrapping_mul(73_856_093)
            ^ y.wrapping_mul(19_349_663);
        v ^= v >> 13;
        v = v.wrapping_mul(0x5bd1_e995);
        v ^= v >> 15;
        Luma([(v & 0xff) as u8])
    })
}

fn render(screen: Screen) -> GrayImage {
    let mut frame = GrayImage::from_pixel(SCREEN_W, SCREEN_H, Luma([40]));
    for button in buttons(screen) {
        image::imageops::replace(
            &mut frame,
            &texture(button.seed),
            i64::from(button.at.0),
            i64::from(button.at.1),
        );
    }
    frame
}

/// The game the navigator plays. Clicks on buttons switch screens; escape
/// backs out one level.
struct Game {
    screen: Screen,
}

impl Game {
    fn click(&mut self, p: Point) {
        let hit = buttons(self.screen).into_iter().find(|b| {
            let (x, y) = (b.at.0 as i32, b.at.1 as i32);
            p.x >= x && p.x < x + BUTTON_W as i32 && p.y >= y && p.y < y + BUTTON_H as i32
        });
        if let Some(next) = hit.and_then(|b| b.leads_to) {
            println!("  game: {:?} -> {:?}", self.screen, next);
            self.screen = next;
        }
    }

    fn escape(&mut self) {
        self.screen = match self.screen {
            Screen::ModeSelect => Screen::MainMenu,
            Screen::MainMenu | Screen::Title => Screen::Title,
            Screen::InMatch => Screen::InMatch,
        };
    }
}

struct Display {
    game: Rc<RefCell<Game>>,
}

impl FrameSource for Display {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        Ok(Frame::new(render(self.game.borrow().screen)))
    }
}

struct Pointer {
    game: Rc<RefCell<Game>>,
}

impl InputDevice for Pointer {
    fn move_to(&mut self, _position: Point) -> Result<(), InputError> {
        Ok(())
    }

    fn click(&mut self, position: Point, button: MouseButton) -> Result<(), InputError> {
        if button == MouseButton::Left {
            self.game.borrow_mut().click(position);
        }
        Ok(())
    }

    fn press_key(&mut self, key: &str) -> Result<(), InputError> {
        if key == "esc" {
            self.game.borrow_mut().escape();
        }
        Ok(())
    }

    fn key_combination(&mut self, _keys: &[&str]) -> Result<(), InputError> {
        Ok(())
    }

    fn type_char(&mut self, _ch: char) -> Result<(), InputError> {
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("menupilot=info")),
        )
        .init();

    println!("=== Menu Walkthrough ===\n");

    let game = Rc::new(RefCell::new(Game {
        screen: Screen::MainMenu,
    }));

    let templates = TemplateLibrary::from_templates(
        [
            Screen::Title,
            Screen::MainMenu,
            Screen::ModeSelect,
            Screen::InMatch,
        ]
        .into_iter()
        .flat_map(buttons)
        .map(|b| Template::new(b.template, texture(b.seed))),
    );

    let graph = StateGraphBuilder::new()
        .state(
            RecoveryState::new("undefined_menu")
                .detect("hud.png", "in_match")
                .detect("quick_match.png", "mode_select")
                .detect("play.png", "main_menu")
                .detect("press_start.png", "title")
                .with_safe_point(Point::new(250, 150)),
        )
        .image_state("title", "press_start.png", "main_menu")
        .state(
            ImageState::new("main_menu", "play.png", "mode_select")
                .with_description("open the mode picker"),
        )
        .image_state("mode_select", "quick_match.png", "in_match")
        .state(TerminalState::new("in_match"))
        .build()
        .expect("state graph is well formed");

    let mut config = NavigatorConfig::default();
    config.vision.threshold = 0.9;
    config.vision.timeout = 1.0;
    config.vision.check_interval = 0.05;
    config.vision.post_click_delay = 0.05;
    config.vision.probe_timeout = 0.1;
    config.navigation.state_transition_delay = 0.01;

    let mut navigator = NavigatorBuilder::new()
        .config(config)
        .graph(graph)
        .templates(templates)
        .frame_source(Display {
            game: Rc::clone(&game),
        })
        .input(Pointer {
            game: Rc::clone(&game),
        })
        .build()
        .expect("navigator assembles");

    let termination = navigator.run().expect("navigation runs");

    println!("\nTermination: {termination}");
    println!("Path: {}", navigator.history().get_path().join(" -> "));

    let stats = navigator.statistics();
    println!("Transitions: {}", stats.total_transitions);
    println!("Success rate: {:.0}%", stats.success_rate * 100.0);
    println!("Mean state time: {:?}", stats.mean_duration);
    for (state, visits) in &stats.visits {
        println!("  {state}: {visits} visit(s)");
    }

    if let Some(report) = navigator.report() {
        match report.to_json() {
            Ok(json) => println!("\nReport:\n{json}"),
            Err(e) => eprintln!("could not encode report: {e}"),
        }
    }
}
