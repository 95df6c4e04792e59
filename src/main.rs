use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use lino::editor::Editor;
use lino::key::TermKeys;
use lino::logger;
use lino::screen::Screen;
use lino::session;
use lino::terminal::Terminal;

/// A modal line editor for the terminal
#[derive(Parser, Debug)]
#[command(name = "lino", version, about, long_about = None)]
struct Cli {
    /// File to edit
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Write debug logs to this file (filter with LINO_LOG)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<()> {
    let mut editor = Editor::open(&cli.file)
        .with_context(|| format!("failed to open {}", cli.file.display()))?;

    let mut terminal = Terminal::new().context("failed to set up terminal")?;
    let (cols, rows) = terminal.size();
    let mut screen = Screen::new(rows, cols);
    let mut keys = TermKeys::new(io::stdin());

    let result = session::run(&mut editor, &mut screen, &mut keys, terminal.stdout());
    // エラー表示の前に端末を戻す。セッションのエラーを優先して返す
    let restored = terminal.restore().context("failed to restore terminal");
    result?;
    restored
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ガードは終了まで保持する
    let _log_guard = match cli.log_file.as_deref().map(logger::init).transpose() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("lino: {e}");
            return ExitCode::FAILURE;
        }
    };

    if _log_guard.is_some() {
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            tracing::error!(panic = %panic_info, "panic");
            default_hook(panic_info);
        }));
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "fatal error");
            eprintln!("lino: {e:#}");
            ExitCode::FAILURE
        }
    }
}
