//! Quire replay harness
//!
//! Loads a scene, feeds it a script of input steps through the transform
//! engine, and prints the resulting scene as JSON.
//!
//! ```text
//! quire-replay <scene.json> <script.json> [settings.json]
//! ```
//!
//! A script is a JSON array of steps:
//! ```json
//! [
//!   { "type": "down", "x": 50, "y": 50 },
//!   { "type": "move", "x": 148, "y": 50 },
//!   { "type": "up", "x": 148, "y": 50, "shift": true },
//!   { "type": "undo" }
//! ]
//! ```

use kurbo::Point;
use quire_core::{Key, Modifiers, Scene, Settings, TransformEngine};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Error)]
enum ReplayError {
    #[error("usage: quire-replay <scene.json> <script.json> [settings.json]")]
    Usage,
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize scene: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One scripted input step.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Step {
    Down {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    Move {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    Up {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    DoubleClick {
        x: f64,
        y: f64,
    },
    Escape,
    Interrupt,
    Undo,
    Redo,
    Group,
    Ungroup,
    Delete,
    Zoom {
        scale: f64,
    },
}

fn modifiers(shift: bool) -> Modifiers {
    if shift { Modifiers::SHIFT } else { Modifiers::NONE }
}

fn read(path: &Path) -> Result<String, ReplayError> {
    std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn apply(engine: &mut TransformEngine, step: &Step) {
    match *step {
        Step::Down { x, y, shift } => engine.pointer_down(Point::new(x, y), modifiers(shift)),
        Step::Move { x, y, shift } => engine.pointer_move(Point::new(x, y), modifiers(shift)),
        Step::Up { x, y, shift } => engine.pointer_up(Point::new(x, y), modifiers(shift)),
        Step::DoubleClick { x, y } => engine.double_click(Point::new(x, y)),
        Step::Escape => engine.handle_key(Key::Escape),
        Step::Interrupt => engine.interrupt(),
        Step::Undo => {
            if !engine.undo() {
                log::info!("Nothing to undo");
            }
        }
        Step::Redo => {
            if !engine.redo() {
                log::info!("Nothing to redo");
            }
        }
        Step::Group => {
            if engine.group_selection().is_none() {
                log::info!("Selection cannot be grouped");
            }
        }
        Step::Ungroup => {
            if !engine.ungroup_selection() {
                log::info!("No group selected");
            }
        }
        Step::Delete => {
            engine.delete_selection();
        }
        Step::Zoom { scale } => engine.set_view_scale(scale),
    }
}

fn run(args: &[String]) -> Result<String, ReplayError> {
    let (scene_path, script_path) = match args {
        [scene, script] | [scene, script, _] => (Path::new(scene), Path::new(script)),
        _ => return Err(ReplayError::Usage),
    };
    let settings = match args.get(2) {
        Some(path) => Settings::load_or_default(Path::new(path)),
        None => Settings::default(),
    };

    let scene = Scene::from_json(&read(scene_path)?).map_err(|source| ReplayError::Parse {
        path: scene_path.to_path_buf(),
        source,
    })?;
    let steps: Vec<Step> =
        serde_json::from_str(&read(script_path)?).map_err(|source| ReplayError::Parse {
            path: script_path.to_path_buf(),
            source,
        })?;

    log::info!("Replaying {} steps over {} items", steps.len(), scene.len());
    let mut engine = TransformEngine::new(scene, settings);
    for step in &steps {
        log::debug!("Step {step:?}");
        apply(&mut engine, step);
    }
    // A script that ends mid-gesture leaves nothing provisional behind.
    engine.interrupt();

    for (index, command) in engine.history().entries().iter().enumerate() {
        let marker = if index < engine.history().undo_depth() {
            "done"
        } else {
            "undone"
        };
        log::info!("History: {} ({marker})", command.label());
    }
    Ok(engine.scene().to_json()?)
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
