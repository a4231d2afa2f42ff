use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use tracing::error;

use crate::commands::MachineArgs;
use crate::config::{Overrides, Settings};
use crate::logging;
use crate::session::Session;
use crate::tui::{self, App};

/// Loaded when neither code nor a file is given. Prints "Hello World!\n".
pub const DEFAULT_PROGRAM: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct TuiArgs {
    /// Load Brainfuck code from PATH on startup
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<String>,

    /// Brainfuck code to load on startup
    #[arg(value_name = "code")]
    pub code: Option<String>,

    #[command(flatten)]
    pub machine: MachineArgs,

    /// Delay between steps while running, in milliseconds (default 25)
    #[arg(long = "run-delay", value_name = "MS")]
    pub run_delay_ms: Option<u64>,

    /// Delay between steps while fast-forwarding, in milliseconds (default 1)
    #[arg(long = "ff-delay", value_name = "MS")]
    pub ff_delay_ms: Option<u64>,

    /// Write diagnostics to PATH (filtered by RUST_LOG)
    #[arg(long = "log", value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

// Public entry point for the TUI from main.rs
pub fn run(program: &str, args: TuiArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    if args.file.is_some() && args.code.is_some() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let source = match (&args.file, args.code) {
        (Some(path), _) => match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        },
        (None, Some(code)) => code,
        (None, None) => DEFAULT_PROGRAM.to_string(),
    };

    let overrides = Overrides {
        run_delay_ms: args.run_delay_ms,
        ff_delay_ms: args.ff_delay_ms,
        ..args.machine.overrides()
    };
    let settings = match Settings::resolve(overrides) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
    };

    // Held until exit so buffered log lines reach the file.
    let _log_guard = match args.log.as_deref().map(logging::init_file).transpose() {
        Ok(guard) => guard.flatten(),
        Err(e) => {
            eprintln!("{program}: failed to open log file: {e}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    let session = Session::load(&source, settings.machine, settings.cadences);
    let mut app = App::new(session, source, args.file);
    match tui::run(&mut app) {
        Ok(()) => 0,
        Err(e) => {
            error!(target: "tui", error = %e, "terminal_failed");
            eprintln!("{program}: terminal error: {e}");
            let _ = io::stderr().flush();
            1
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} tui [OPTIONS] ["<code>"]   # Step through Brainfuck code in a terminal visualizer
  {0} tui [OPTIONS] --file <PATH>

Options:
  --file,     -f <PATH>   Load Brainfuck code from PATH
  --capacity, -c <CELLS>  Tape size (default 4096)
  --modulus,  -m <M>      Cell wraparound, 2..=256 (default 128)
  --run-delay <MS>        Delay between steps while running (default 25)
  --ff-delay <MS>         Delay between steps while fast-forwarding (default 1)
  --log <PATH>            Write diagnostics to PATH (filter with RUST_LOG)
  --help,     -h          Show this help

Description:
  Shows the program, tape and output log, and executes one instruction at a
  time. Without code, a Hello World program is loaded.

Keys:
    - s / Right   step          r / F5   run        f   fast-forward
    - p / Space   pause         x        reset      a   toggle ASCII cells
    - e           edit program (Ctrl+S or F5 applies, Esc cancels)
    - Tab         switch pane   F1 / ?   help       q   quit
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
