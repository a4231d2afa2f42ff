use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use cross_xdg::BaseDirs;
use ratatui::style::Color;

use crate::error::EngineError;
use crate::scheduler::Cadences;
use crate::state::{MachineConfig, DEFAULT_CAPACITY, DEFAULT_MODULUS};

const CONFIG_FILE: &str = "bf-stepper.toml";

#[derive(Debug, Clone)]
pub struct Colors {
    pub program_title_focused: Color,
    pub program_title_unfocused: Color,
    pub program_token: Color,
    pub program_current: Color,

    pub output_title_focused: Color,
    pub output_title_unfocused: Color,
    pub output_value: Color,
    pub output_error: Color,

    pub tape_border_focused: Color,
    pub tape_border_unfocused: Color,
    pub tape_index: Color,
    pub tape_cell_empty: Color,
    pub tape_cell_nonzero: Color,
    pub tape_cell_pointer: Color,

    pub status_text: Color,
    pub status_running: Color,
    pub status_done: Color,
    pub dialog_title: Color,
    pub dialog_bg: Color,
    pub dialog_text: Color,
    pub help_hint: Color,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            program_title_focused: Color::Cyan,
            program_title_unfocused: Color::Gray,
            program_token: Color::White,
            program_current: Color::Yellow,

            output_title_focused: Color::Cyan,
            output_title_unfocused: Color::Gray,
            output_value: Color::White,
            output_error: Color::Red,

            tape_border_focused: Color::Cyan,
            tape_border_unfocused: Color::Gray,
            tape_index: Color::DarkGray,
            tape_cell_empty: Color::DarkGray,
            tape_cell_nonzero: Color::White,
            tape_cell_pointer: Color::Yellow,

            status_text: Color::White,
            status_running: Color::Green,
            status_done: Color::Magenta,
            dialog_title: Color::White,
            dialog_bg: Color::Black,
            dialog_text: Color::White,
            help_hint: Color::Gray,
        }
    }
}

/// Engine-facing settings after resolving flags, environment and file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub machine: MachineConfig,
    pub cadences: Cadences,
}

/// Values given on the command line. `None` defers to env, then file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub capacity: Option<usize>,
    pub modulus: Option<u16>,
    pub run_delay_ms: Option<u64>,
    pub ff_delay_ms: Option<u64>,
}

impl Settings {
    /// Resolve from the process environment and the user's config file.
    pub fn resolve(overrides: Overrides) -> Result<Self, EngineError> {
        let file = config_path().and_then(|p| fs::read_to_string(p).ok());
        Self::resolve_with(overrides, file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Resolution order: flags -> env -> `[engine]` file section -> defaults.
    /// Unparseable env or file values are ignored.
    pub fn resolve_with<F>(overrides: Overrides, file: Option<&str>, env: F) -> Result<Self, EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sections = file.map(parse_sections).unwrap_or_default();
        let engine = sections.get("engine");
        let lookup = |env_key: &str, file_key: &str| -> Option<String> {
            env(env_key).or_else(|| engine.and_then(|m| m.get(file_key).cloned()))
        };

        let capacity = overrides
            .capacity
            .or_else(|| lookup("BF_CAPACITY", "capacity").and_then(|s| s.trim().parse().ok()))
            .unwrap_or(DEFAULT_CAPACITY);
        let modulus = overrides
            .modulus
            .or_else(|| lookup("BF_MODULUS", "modulus").and_then(|s| s.trim().parse().ok()))
            .unwrap_or(DEFAULT_MODULUS);
        let run_delay = overrides
            .run_delay_ms
            .or_else(|| lookup("BF_RUN_DELAY_MS", "run_delay_ms").and_then(|s| s.trim().parse().ok()))
            .unwrap_or(Cadences::DEFAULT_NORMAL_MS);
        let ff_delay = overrides
            .ff_delay_ms
            .or_else(|| lookup("BF_FF_DELAY_MS", "fast_delay_ms").and_then(|s| s.trim().parse().ok()))
            .unwrap_or(Cadences::DEFAULT_FAST_FORWARD_MS);

        Ok(Self {
            machine: MachineConfig::new(capacity, modulus)?,
            cadences: Cadences {
                normal: Duration::from_millis(run_delay),
                fast_forward: Duration::from_millis(ff_delay),
            },
        })
    }
}

static COLORS: OnceLock<Colors> = OnceLock::new();

pub fn colors() -> &'static Colors {
    COLORS.get_or_init(|| {
        config_path()
            .and_then(|p| fs::read_to_string(p).ok())
            .map(|content| colors_from_str(&content))
            .unwrap_or_default()
    })
}

fn config_path() -> Option<PathBuf> {
    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push(CONFIG_FILE);
    Some(path)
}

fn parse_color(value: &str) -> Option<Color> {
    let s = value.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
    } else {
        // Try named colors matching ratatui::style::Color variants
        let name = s.to_ascii_lowercase();
        return Some(match name.as_str() {
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            "gray" | "grey" => Color::Gray,
            "darkgray" | "dark_grey" | "darkgrey" | "dark_gray" => Color::DarkGray,
            "lightred" | "light_red" => Color::LightRed,
            "lightgreen" | "light_green" => Color::LightGreen,
            "lightblue" | "light_blue" => Color::LightBlue,
            "lightmagenta" | "light_magenta" => Color::LightMagenta,
            "lightcyan" | "light_cyan" => Color::LightCyan,
            "white" => Color::White,
            _ => return None,
        });
    }
    None
}

/// Very small hand-rolled parser: `[section]` headers and `key = value`
/// pairs. Values may be quoted. Lines starting with `#` are comments.
fn parse_sections(content: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            current = Some(line[1..line.len()-1].trim().to_string());
            continue;
        }
        let Some(section) = current.as_ref() else { continue; };
        if let Some(eq) = line.find('=') {
            let key = line[..eq].trim().to_string();
            let val_raw = line[eq+1..].trim();
            // Accept quoted or unquoted
            let val = if val_raw.starts_with('"') && val_raw.ends_with('"') && val_raw.len() >= 2 {
                val_raw[1..val_raw.len()-1].to_string()
            } else { val_raw.to_string() };
            sections.entry(section.clone()).or_default().insert(key, val);
        }
    }
    sections
}

fn colors_from_str(content: &str) -> Colors {
    let sections = parse_sections(content);
    let mut cfg = Colors::default();
    let Some(map) = sections.get("colors") else {
        return cfg;
    };

    macro_rules! set {
        ($($field:ident),* $(,)?) => {
            $(
                if let Some(v) = map.get(stringify!($field)).and_then(|s| parse_color(s)) { cfg.$field = v; }
            )*
        };
    }

    set!(
        program_title_focused,
        program_title_unfocused,
        program_token,
        program_current,
        output_title_focused,
        output_title_unfocused,
        output_value,
        output_error,
        tape_border_focused,
        tape_border_unfocused,
        tape_index,
        tape_cell_empty,
        tape_cell_nonzero,
        tape_cell_pointer,
        status_text,
        status_running,
        status_done,
        dialog_title,
        dialog_bg,
        dialog_text,
        help_hint,
    );

    cfg
}
