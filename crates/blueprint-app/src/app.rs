//! Command parsing and the application lifecycle.

use crate::shortcuts::ShortcutRegistry;
use blueprint_core::{
    Blueprint, BlueprintError, CanvasEvent, DrawingCanvas, EditError, InputEvent, Key, KeyEvent,
    MouseButton, PointerEvent, Settings, SettingsError,
};
use blueprint_render::{RenderContext, Renderer, RendererError, SkiaRenderer};
use kurbo::Point;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Usage text printed by `help` and on argument errors.
pub const USAGE: &str = "\
Usage: blueprint <command> [options]

Commands:
  new <file>                    Create an empty blueprint from the current settings
  info <file>                   Print a summary of a blueprint
  export <file> <out.png>       Render a blueprint to PNG
      --width <px> --height <px>  Fixed output size (scene is scaled to fit)
      --grid                      Draw the grid
  unify <file> [--out <file>]   Merge touching paths
  demo <out.json>               Replay a drawing session through the canvas
      --script <events.json>      Input events to replay (default: built-in)
      --png <out.png>             Also render the result
  shortcuts                     List canvas shortcuts
  help                          Show this message";

/// Pointer position used when rendering without a live cursor.
const OFFSCREEN: Point = Point::new(-1.0e6, -1.0e6);

/// Flags that take a value.
const VALUE_FLAGS: &[&str] = &["--width", "--height", "--out", "--script", "--png"];

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Blueprint(#[from] BlueprintError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("Invalid script: {0}")]
    Script(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("{0} (see `blueprint help`)")]
    Usage(String),
}

/// Result type for application commands.
pub type AppResult<T> = Result<T, AppError>;

/// PNG export options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub grid: bool,
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New {
        file: PathBuf,
    },
    Info {
        file: PathBuf,
    },
    Export {
        file: PathBuf,
        output: PathBuf,
        options: ExportOptions,
    },
    Unify {
        file: PathBuf,
        output: Option<PathBuf>,
    },
    Demo {
        output: PathBuf,
        script: Option<PathBuf>,
        png: Option<PathBuf>,
    },
    Shortcuts,
    Help,
}

/// Positional arguments and flags of one command line.
struct ParsedArgs<'a> {
    positional: Vec<&'a str>,
    values: Vec<(&'a str, &'a str)>,
    switches: Vec<&'a str>,
}

impl<'a> ParsedArgs<'a> {
    fn parse(args: &'a [String]) -> AppResult<Self> {
        let mut parsed = Self {
            positional: Vec::new(),
            values: Vec::new(),
            switches: Vec::new(),
        };
        let mut iter = args.iter().map(String::as_str);
        while let Some(arg) = iter.next() {
            if VALUE_FLAGS.contains(&arg) {
                let value = iter
                    .next()
                    .ok_or_else(|| AppError::Usage(format!("Missing value for {arg}")))?;
                parsed.values.push((arg, value));
            } else if arg.starts_with("--") {
                parsed.switches.push(arg);
            } else {
                parsed.positional.push(arg);
            }
        }
        Ok(parsed)
    }

    fn path(&self, index: usize, what: &str) -> AppResult<PathBuf> {
        self.positional
            .get(index)
            .map(PathBuf::from)
            .ok_or_else(|| AppError::Usage(format!("Missing {what}")))
    }

    fn value(&self, flag: &str) -> Option<&'a str> {
        self.values
            .iter()
            .rev()
            .find(|(name, _)| *name == flag)
            .map(|(_, value)| *value)
    }

    fn dimension(&self, flag: &str) -> AppResult<Option<u32>> {
        self.value(flag)
            .map(|value| match value.parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(AppError::Usage(format!("{flag} expects a positive integer"))),
            })
            .transpose()
    }

    fn switch(&self, flag: &str) -> bool {
        self.switches.contains(&flag)
    }

    fn reject_unknown(&self, allowed: &[&str]) -> AppResult<()> {
        let unknown = self
            .switches
            .iter()
            .copied()
            .chain(self.values.iter().map(|(name, _)| *name))
            .find(|flag| !allowed.contains(flag));
        match unknown {
            Some(flag) => Err(AppError::Usage(format!("Unknown option {flag}"))),
            None => Ok(()),
        }
    }
}

impl Command {
    /// Parse the arguments following the program name.
    pub fn parse(args: &[String]) -> AppResult<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };
        let args = ParsedArgs::parse(rest)?;
        let command = match name.as_str() {
            "new" => {
                args.reject_unknown(&[])?;
                Command::New {
                    file: args.path(0, "blueprint file")?,
                }
            }
            "info" => {
                args.reject_unknown(&[])?;
                Command::Info {
                    file: args.path(0, "blueprint file")?,
                }
            }
            "export" => {
                args.reject_unknown(&["--width", "--height", "--grid"])?;
                Command::Export {
                    file: args.path(0, "blueprint file")?,
                    output: args.path(1, "output PNG file")?,
                    options: ExportOptions {
                        width: args.dimension("--width")?,
                        height: args.dimension("--height")?,
                        grid: args.switch("--grid"),
                    },
                }
            }
            "unify" => {
                args.reject_unknown(&["--out"])?;
                Command::Unify {
                    file: args.path(0, "blueprint file")?,
                    output: args.value("--out").map(PathBuf::from),
                }
            }
            "demo" => {
                args.reject_unknown(&["--script", "--png"])?;
                Command::Demo {
                    output: args.path(0, "output blueprint file")?,
                    script: args.value("--script").map(PathBuf::from),
                    png: args.value("--png").map(PathBuf::from),
                }
            }
            "shortcuts" => Command::Shortcuts,
            "help" | "--help" | "-h" => Command::Help,
            other => return Err(AppError::Usage(format!("Unknown command '{other}'"))),
        };
        Ok(command)
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Settings file. `None` runs with defaults and never persists.
    pub settings_path: Option<PathBuf>,
    /// Write the live settings back on shutdown.
    pub persist_settings: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let settings_path = match Settings::default_path() {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("{e}; settings will not be persisted");
                None
            }
        };
        Self {
            settings_path,
            persist_settings: true,
        }
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    settings: Settings,
}

impl App {
    /// Create an application, loading settings from the configured path.
    pub fn with_config(config: AppConfig) -> Self {
        let settings = config
            .settings_path
            .as_deref()
            .map(Settings::load_or_default)
            .unwrap_or_default();
        Self { config, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run one command.
    pub fn run(&mut self, command: Command) -> AppResult<()> {
        log::debug!("Running {command:?}");
        match command {
            Command::New { file } => self.create(&file),
            Command::Info { file } => {
                let blueprint = Blueprint::load(&file)?;
                println!("{}", info_report(&blueprint));
                Ok(())
            }
            Command::Export {
                file,
                output,
                options,
            } => {
                let canvas = self.open(&file)?;
                self.export_png(&canvas, &output, options)
            }
            Command::Unify { file, output } => {
                let mut canvas = self.open(&file)?;
                let merges = canvas.unify_paths();
                let target = output.as_deref().unwrap_or(&file);
                canvas.create_blueprint().save(target)?;
                println!(
                    "{merges} merge(s), {} path(s) written to {}",
                    canvas.paths().len(),
                    target.display()
                );
                Ok(())
            }
            Command::Demo {
                output,
                script,
                png,
            } => {
                let events = match script {
                    Some(path) => load_script(&path)?,
                    None => default_script(),
                };
                let mut canvas = DrawingCanvas::from_settings(&self.settings)?;
                let notifications = replay(&mut canvas, &events);
                log::info!(
                    "Replayed {} input events, {} notifications",
                    events.len(),
                    notifications.len()
                );
                canvas.create_blueprint().save(&output)?;
                if let Some(png) = png {
                    self.export_png(&canvas, &png, ExportOptions::default())?;
                }
                self.settings = canvas.settings();
                println!("{}", info_report(&canvas.create_blueprint()));
                Ok(())
            }
            Command::Shortcuts => {
                ShortcutRegistry::print_all();
                Ok(())
            }
            Command::Help => {
                println!("{USAGE}");
                Ok(())
            }
        }
    }

    /// Persist the live settings.
    pub fn shutdown(&self) {
        if !self.config.persist_settings {
            return;
        }
        let Some(path) = self.config.settings_path.as_deref() else {
            return;
        };
        if let Err(e) = self.settings.save(path) {
            log::warn!("Failed to save settings: {e}");
        }
    }

    fn create(&self, file: &Path) -> AppResult<()> {
        if file.exists() {
            return Err(AppError::Usage(format!(
                "{} already exists",
                file.display()
            )));
        }
        let canvas = DrawingCanvas::from_settings(&self.settings)?;
        canvas.create_blueprint().save(file)?;
        println!("Created {}", file.display());
        Ok(())
    }

    fn open(&self, file: &Path) -> AppResult<DrawingCanvas> {
        let blueprint = Blueprint::load(file)?;
        let mut canvas = DrawingCanvas::from_settings(&self.settings)?;
        canvas.load_blueprint(&blueprint);
        Ok(canvas)
    }

    fn export_png(
        &self,
        canvas: &DrawingCanvas,
        output: &Path,
        options: ExportOptions,
    ) -> AppResult<()> {
        let scene = canvas.scene(OFFSCREEN, options.grid || canvas.show_grid());
        let ctx = match (options.width, options.height) {
            (None, None) => RenderContext::new(&scene),
            (width, height) => {
                let default = RenderContext::new(&scene);
                let width = width.unwrap_or(default.width);
                let height = height.unwrap_or(default.height);
                RenderContext::with_output_size(&scene, width, height).fit_to_output()
            }
        };
        let png = SkiaRenderer::new().render_png(&ctx)?;
        fs::write(output, &png)
            .map_err(|e| AppError::Io(format!("Failed to write {}: {}", output.display(), e)))?;
        log::info!(
            "Exported {}x{} PNG to {}",
            ctx.width,
            ctx.height,
            output.display()
        );
        Ok(())
    }
}

/// One-paragraph summary of a blueprint.
pub fn info_report(blueprint: &Blueprint) -> String {
    format!(
        "{} path(s), {} point(s), total length {:.1}\ncanvas {}x{}, grid cell {}",
        blueprint.paths.len(),
        blueprint.point_count(),
        blueprint.total_length(),
        blueprint.canvas_size.width,
        blueprint.canvas_size.height,
        blueprint.grid_dimension
    )
}

fn load_script(path: &Path) -> AppResult<Vec<InputEvent>> {
    let json = fs::read_to_string(path)
        .map_err(|e| AppError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&json).map_err(|e| AppError::Script(format!("{}: {}", path.display(), e)))
}

/// Feed input events through the canvas and collect its notifications.
pub fn replay(canvas: &mut DrawingCanvas, events: &[InputEvent]) -> Vec<CanvasEvent> {
    let mut notifications = Vec::new();
    for event in events {
        match event {
            InputEvent::Pointer(pointer) => canvas.handle_pointer_event(*pointer),
            InputEvent::Key(key) => canvas.handle_key_event(key),
        }
        notifications.extend(canvas.take_events());
    }
    notifications
}

fn stroke(events: &mut Vec<InputEvent>, button: MouseButton, from: Point, to: Point, steps: u32) {
    events.push(InputEvent::Pointer(PointerEvent::Down {
        position: from,
        button,
    }));
    for i in 1..steps {
        let position = from.lerp(to, f64::from(i) / f64::from(steps));
        events.push(InputEvent::Pointer(PointerEvent::Move { position }));
    }
    events.push(InputEvent::Pointer(PointerEvent::Up {
        position: to,
        button,
    }));
}

/// Built-in session: three free-form strokes, an erase gesture across the
/// first stroke and an undo of that erase.
pub fn default_script() -> Vec<InputEvent> {
    let mut events = Vec::new();
    let left = MouseButton::Left;
    stroke(&mut events, left, Point::new(70.0, 70.0), Point::new(280.0, 70.0), 21);
    stroke(&mut events, left, Point::new(280.0, 140.0), Point::new(280.0, 280.0), 14);
    stroke(&mut events, left, Point::new(70.0, 280.0), Point::new(210.0, 280.0), 14);
    stroke(
        &mut events,
        MouseButton::Right,
        Point::new(175.0, 40.0),
        Point::new(175.0, 100.0),
        6,
    );
    for key_event in [
        KeyEvent::Pressed(Key::Control),
        KeyEvent::Pressed(Key::Char('z')),
        KeyEvent::Released(Key::Char('z')),
        KeyEvent::Released(Key::Control),
    ] {
        events.push(InputEvent::Key(key_event));
    }
    events
}
