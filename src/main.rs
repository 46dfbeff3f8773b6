// Question bank browser.
// - loads data/manifest.json (or --manifest / QBANK_MANIFEST) and every category file it lists
// - filters by search text, category, difficulty and author; sorts by any card field
// - --html prints the rendered card list instead of opening the TUI

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};

use qbank::config::{default_keymap, load_keymap, resolve_manifest_path, theme_of, ThemeKind};
use qbank::render::render_page;
use qbank::tui::{run_app, App};
use qbank::{load_bank, Controller, FsSource};

#[derive(Debug, Clone, Parser)]
#[command(name = "qbank-tui", about = "Browse and filter a question bank", version)]
struct Cli {
    /// Manifest path; defaults to $QBANK_MANIFEST or the nearest data/manifest.json
    #[arg(long, short = 'm')]
    manifest: Option<PathBuf>,

    /// Colour theme
    #[arg(long, value_enum, default_value_t = ThemeKind::Dark)]
    theme: ThemeKind,

    /// Print the summary line and every card as HTML, then exit
    #[arg(long, action = ArgAction::SetTrue)]
    html: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let manifest = resolve_manifest_path(cli.manifest.clone());
    info!("manifest: {}", manifest.display());

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let source = FsSource::new(manifest);
    let bank = rt
        .block_on(load_bank(&source))
        .context("Error loading question bank.")?;
    let controller = Controller::new(bank);

    if cli.html {
        println!("{}", render_page(&controller.cards(), controller.bank().len()));
        return Ok(());
    }

    let keymap = load_keymap().unwrap_or_else(|_| default_keymap());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(controller, source, theme_of(cli.theme), keymap);
    let res = run_app(&mut terminal, &mut app, &rt);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}
