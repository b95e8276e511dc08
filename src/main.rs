//! dbgsh - a scriptable debugger console.

mod cli;
mod logging;

use cli::{Cli, InputPlan};
use dbgsh::commands::{load_commands, CommandRegistry, Dispatcher, HelpLocator};
use dbgsh::config::Config;
use dbgsh::console::{
    Console, ConsoleExit, EditorSource, ExternalEvaluator, PythonEvaluator, QueuedSource,
    ReaderSource, ScriptEvaluator,
};
use dbgsh::error::{Result, ShellError};
use dbgsh::interrupt::InterruptFlag;
use dbgsh::session::{ProcessSession, KCORE_PATH};
use std::fs::File;
use std::io::{BufReader, IsTerminal};
use tracing::{error, info, warn};

fn main() {
    let cli = Cli::parse_args();

    logging::init(logging::LogTarget::from_flag(cli.log_stderr));

    if let Err(e) = run(cli) {
        error!("{}: {}", e.category(), e);
        eprintln!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let session = match cli.pid {
        Some(pid) => ProcessSession::attach(pid).map_err(|e| {
            ShellError::session(format!("Cannot attach to process {pid}: {e}"))
        })?,
        None if cli.kernel => ProcessSession::kernel().map_err(|e| {
            ShellError::session(format!("Cannot open {KCORE_PATH}: {e}"))
        })?,
        None => ProcessSession::detached(),
    };

    // Registration completes before any input is read.
    let mut registry = CommandRegistry::new();
    load_commands(&mut registry, &session, &[])
        .map_err(|e| ShellError::internal(format!("Command registration failed: {e}")))?;

    let interrupt = InterruptFlag::new();
    if let Err(e) = interrupt.install_ctrl_c_listener() {
        warn!("Could not install Ctrl-C listener: {e}");
    }

    let help = HelpLocator::new(cli.help_dir(&config));
    let dispatcher = Dispatcher::new(registry, help, interrupt);
    let script = &config.script;
    let evaluator: Box<dyn ScriptEvaluator> = if script.persistent {
        Box::new(PythonEvaluator::new(script.interpreter.clone()).with_pid(session.pid()))
    } else {
        Box::new(
            ExternalEvaluator::new(script.interpreter.clone(), script.args.clone())
                .with_pid(session.pid()),
        )
    };
    let mut console = Console::new(dispatcher, Box::new(session), evaluator);
    let mut stdout = std::io::stdout();

    let exit = match cli.input_plan() {
        InputPlan::Commands(lines) => {
            let mut source = QueuedSource::new(lines);
            console.run(&mut source, &mut stdout)?
        }
        InputPlan::File(path) => {
            let file = File::open(&path).map_err(|e| {
                ShellError::input(format!("Cannot open {}: {e}", path.display()))
            })?;
            let mut source = ReaderSource::new(BufReader::new(file));
            console.run(&mut source, &mut stdout)?
        }
        InputPlan::Stdin if std::io::stdin().is_terminal() => {
            let mut editor = EditorSource::new(config.history_file.clone())?;
            let exit = console.run(&mut editor, &mut stdout);
            editor.save_history();
            exit?
        }
        InputPlan::Stdin => {
            let mut source = ReaderSource::new(std::io::stdin().lock());
            console.run(&mut source, &mut stdout)?
        }
    };

    match exit {
        ConsoleExit::EndOfInput => info!("Console finished at end of input"),
        ConsoleExit::ExitRequested => info!("Console finished on exit request"),
    }
    Ok(())
}
