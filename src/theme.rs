//! ANSI palette for the headless `run` command. The TUI palette lives in
//! `config::Colors`.

pub mod catppuccin {
    use nu_ansi_term::Color;
    pub struct Mocha;
    impl Mocha {
        // Base colors
        pub const TEXT: Color = Color::Rgb(205, 214, 244);  // Text
        pub const SURFACE2: Color = Color::Rgb(108, 112, 134);  // Subtle dim

        // Accents
        pub const RED: Color = Color::Rgb(243, 139, 168);
        pub const YELLOW: Color = Color::Rgb(249, 226, 175);
        pub const BLUE: Color = Color::Rgb(137, 180, 250);
        pub const TEAL: Color = Color::Rgb(148, 226, 213);
    }
}

use nu_ansi_term::Style;

/// Styles applied to `run` output, or plain when color is off.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub value: Style,
    pub error: Style,
    pub dim: Style,
    pub pointer: Style,
    pub instruction: Style,
    pub action: Style,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        use catppuccin::Mocha;
        if !enabled {
            return Self {
                value: Style::new(),
                error: Style::new(),
                dim: Style::new(),
                pointer: Style::new(),
                instruction: Style::new(),
                action: Style::new(),
            };
        }
        Self {
            value: Mocha::TEXT.normal(),
            error: Mocha::RED.bold(),
            dim: Mocha::SURFACE2.normal(),
            pointer: Mocha::BLUE.normal(),
            instruction: Mocha::YELLOW.bold(),
            action: Mocha::TEAL.normal(),
        }
    }
}
