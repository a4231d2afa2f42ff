use clap::Args;
use std::{fs, thread};
use std::io::{self, IsTerminal, Write};
use std::sync::{mpsc, Arc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::cli_util::{print_engine_error, print_fault};
use crate::commands::MachineArgs;
use crate::config::Settings;
use crate::engine::StepOutcome;
use crate::error::EngineError;
use crate::session::{Session, StepControl};
use crate::state::{ExecutionState, OutputEvent};
use crate::theme::Palette;

/// How long to wait for a cancelled worker to hand back its partial state.
const CANCEL_GRACE: Duration = Duration::from_millis(500);

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a step-by-step table of operations instead of the output log
    #[arg(short = 't', long = "trace")]
    pub trace: bool,

    /// Print emitted values as raw characters instead of `: <value>` lines
    #[arg(short = 'a', long = "ascii")]
    pub ascii: bool,

    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    #[command(flatten)]
    pub machine: MachineArgs,

    /// Wall-clock timeout in milliseconds (fallback BF_TIMEOUT_MS; default 2_000)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

type WorkerResult = (Session, Result<usize, EngineError>);

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        trace,
        ascii,
        file,
        code,
        machine,
        timeout_ms,
        max_steps,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let code_str = if let Some(path) = file {
        match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    } else {
        code.join("")
    };

    let settings = match Settings::resolve(machine.overrides()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
    };

    // Resolve limits: flags -> env -> defaults
    let timeout_ms = timeout_ms
        .or_else(|| std::env::var("BF_TIMEOUT_MS").ok().and_then(|s| s.parse::<u64>().ok()))
        .unwrap_or(2_000);
    let max_steps = max_steps
        .or_else(|| std::env::var("BF_MAX_STEPS").ok().and_then(|s| s.parse::<u64>().ok()))
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX));

    let cancel = Arc::new(AtomicBool::new(false));

    // Ctrl+C cancels the run cooperatively; partial output is still printed.
    let cancel_on_signal = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        cancel_on_signal.store(true, Ordering::Relaxed);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    let palette = Palette::new(io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none());
    let session = Session::load(&code_str, settings.machine, settings.cadences);

    // Execute on a worker thread with cooperative cancellation
    let (tx, rx) = mpsc::channel::<WorkerResult>();
    let ctrl = StepControl::new(max_steps, cancel.clone());
    thread::spawn(move || {
        let mut session = session;
        let res = if trace {
            trace_to_end(&mut session, &ctrl, palette)
        } else {
            session.run_to_end(&ctrl)
        };
        let _ = tx.send((session, res));
    });

    let timeout = Duration::from_millis(timeout_ms);
    let exit_code = match rx.recv_timeout(timeout) {
        Ok((session, res)) => finish(program, &session, res, trace, ascii, palette),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            if let Ok((session, _)) = rx.recv_timeout(CANCEL_GRACE) {
                if !trace {
                    print_output_log(session.snapshot(), ascii, palette);
                }
            }
            eprintln!("Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)");
            let _ = io::stderr().flush();
            1
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => 1,
    };

    let _ = io::stdout().flush();
    exit_code
}

fn finish(
    program: &str,
    session: &Session,
    res: Result<usize, EngineError>,
    trace: bool,
    ascii: bool,
    palette: Palette,
) -> i32 {
    let state = session.snapshot();
    if !trace {
        print_output_log(state, ascii, palette);
    }

    if let Err(err) = res {
        print_engine_error(program, &err);
        return 1;
    }

    match state.fault() {
        Some(fault) => {
            print_fault(Some(program), session.program(), &fault);
            1
        }
        None => 0,
    }
}

/// Print emitted values. Error records are reported separately on stderr.
fn print_output_log(state: &ExecutionState, ascii: bool, palette: Palette) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if ascii {
        let bytes: Vec<u8> = state.emitted_values().collect();
        let _ = out.write_all(&bytes);
        // For readability, ensure output ends with a newline
        let _ = writeln!(out);
    } else {
        for event in state.output() {
            if let OutputEvent::Value(_) = event {
                let _ = writeln!(out, "{}", palette.value.paint(event.to_string()));
            }
        }
    }
    let _ = out.flush();
}

/// Run to completion while printing one table row per step.
fn trace_to_end(session: &mut Session, ctrl: &StepControl, palette: Palette) -> Result<usize, EngineError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = writeln!(out, "{}", palette.dim.paint("STEP | IP  | PTR | CELL | INSTR | ACTION"));
    let _ = writeln!(
        out,
        "{}",
        palette.dim.paint("-----+-----+-----+------+-------+------------------------------------------------")
    );

    let mut ptr_before = session.snapshot().tape_pointer();
    let mut cell_before = session.snapshot().current_cell();
    let mut step = 0usize;
    let res = session.run_observed(ctrl, |state, outcome| {
        let row = match outcome {
            StepOutcome::Applied { ip, token, effect, .. } => Some((*ip, token.as_char(), effect.to_string())),
            StepOutcome::Faulted(fault) => Some((fault.ip, fault.kind.as_char(), fault.to_string())),
            StepOutcome::Frozen => None,
        };
        if let Some((ip, instr, action)) = row {
            let action = if matches!(outcome, StepOutcome::Faulted(_)) {
                palette.error.paint(action)
            } else {
                palette.action.paint(action)
            };
            let _ = writeln!(
                out,
                "{:<4} | {} | {:<3} | {:<4} |  {}    | {}",
                step,
                palette.pointer.paint(format!("{ip:<3}")),
                ptr_before,
                cell_before,
                palette.instruction.paint(instr.to_string()),
                action
            );
            step += 1;
        }
        ptr_before = state.tape_pointer();
        cell_before = state.current_cell();
    });
    let _ = out.flush();
    res
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,      -f <PATH>  Read Brainfuck code from PATH instead of positional "<code>"
  --trace,     -t         Print a step-by-step table of operations instead of the output log
  --ascii,     -a         Print emitted values as characters instead of `: <value>` lines
  --capacity,  -c <CELLS> Tape size (default 4096)
  --modulus,   -m <M>     Cell wraparound, 2..=256 (default 128)
  --timeout <MS>          Wall-clock timeout (default 2000)
  --max-steps <N>         Abort after N steps (default unlimited)
  --help,      -h         Show this help

Notes:
- Characters outside of Brainfuck's ><+-.,[] are ignored.
- Input (`,`) is not supported and does nothing.
- Cells wrap at 128 unless --modulus says otherwise.
- An unmatched bracket stops the program when it is reached; the error is
  printed with the offending instruction marked and the exit code is 1.

Examples:
- Load Brainfuck code from a file:
    {0} run --file ./program.bf
- Watch every step of a small loop:
    {0} run --trace "++[>+<-]>."
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
