use std::env;
use std::io::{self, Write};

use bf::commands::run::{self, RunArgs};
use bf::commands::tui::{self, TuiArgs};
use bf::logging;
use clap::{Parser, Subcommand};

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [--trace|-t] [--ascii|-a] "<code>"   # Run Brainfuck code to completion
  {0} run [--trace|-t] --file <PATH>          # Run Brainfuck code loaded from file
  {0} tui ["<code>"]                          # Step through code in the terminal visualizer
  {0} tui --file <PATH>                       # Visualize code loaded from file

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bf", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(RunArgs),
    Tui(TuiArgs),
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bf"));

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        print_top_usage_and_exit(&program, if cli.help { 0 } else { 2 });
    };
    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match command {
        Command::Run(args) => {
            logging::init_stderr();
            run::run(&program, args)
        }
        // The TUI owns the screen; it sets up file logging itself when asked.
        Command::Tui(args) => tui::run(&program, args),
    };

    std::process::exit(code);
}
