use anyhow::{Context, Result};
use clap::Parser;
use doomsweeper_core::{CellCount, Coord, Preferences};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

mod app;
mod render;
mod settings;

use app::App;
use settings::Settings;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Where settings and the auto-save live
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    #[arg(long)]
    width: Option<Coord>,
    #[arg(long)]
    height: Option<Coord>,
    #[arg(long)]
    mines: Option<CellCount>,

    /// Resume an interrupted game without asking
    #[arg(short, long)]
    resume: bool,

    /// Show mines on hidden cells
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_nanos() as u64)
    });
    log::debug!("seed: {}", seed);

    let mut settings = Settings::load(&args.data_dir)?;
    if args.width.is_some() || args.height.is_some() || args.mines.is_some() {
        let current = settings.preferences;
        settings.preferences = Preferences::new(
            (
                args.width.unwrap_or(current.width),
                args.height.unwrap_or(current.height),
            ),
            args.mines.unwrap_or(current.mines),
        );
    }
    settings.debug_mode |= args.debug;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout().lock();
    let mut app = App::new(seed, settings, args.data_dir.clone());

    if doomsweeper_core::has_quick_save(&args.data_dir) {
        let accept = args.resume || ask_resume(&mut input, &mut stdout)?;
        app.resume(accept, &mut stdout)?;
    }

    log::debug!("App started");
    app.run(input, stdout)
}

fn ask_resume(input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    write!(out, "An unfinished game was found. Resume it? [Y/n] ")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer).context("reading answer")?;
    Ok(!answer.trim().eq_ignore_ascii_case("n"))
}
