pub mod app_dirs;
pub mod bubble;
pub mod game;
pub mod highscore;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod timer;
pub mod ui;

use crate::bubble::SpawnProfile;
use crate::game::GameSession;
use crate::highscore::{BestScoreStore, FileBestScoreStore};
use crate::runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner, TICK_RATE_MS};
use crate::session::SessionConfig;
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

/// pop bubbles against the clock, straight from your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A bubble-popping arcade round in the terminal: bubbles spawn, drift away after five seconds, and smaller ones are worth more. Stray clicks cost half a point; your best score sticks around between runs."
)]
pub struct Cli {
    /// number of seconds in a round
    #[clap(short = 's', long, default_value_t = 30)]
    pub seconds: u32,

    /// seed for the bubble randomizer (repeatable rounds)
    #[clap(long)]
    pub seed: Option<u64>,

    /// force a sizing profile instead of deriving it from terminal width
    #[clap(short = 'p', long, value_enum, default_value_t = Profile::Auto)]
    pub profile: Profile,

    /// clear the stored best score and exit
    #[clap(long)]
    pub reset_best: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum Profile {
    Auto,
    Compact,
    Wide,
}

impl Profile {
    fn spawn_profile(&self) -> Option<SpawnProfile> {
        match self {
            Profile::Auto => None,
            Profile::Compact => Some(SpawnProfile::COMPACT),
            Profile::Wide => Some(SpawnProfile::WIDE),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Ready,
    Playing,
    Summary,
}

#[derive(Debug)]
pub struct App {
    pub cli: Option<Cli>,
    pub session: GameSession,
    pub state: AppState,
    /// Play area from the last layout pass, for pointer mapping.
    pub play_area: Rect,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        let config = SessionConfig {
            session_secs: cli.seconds.max(1),
            ..SessionConfig::default()
        };
        let store = Box::new(FileBestScoreStore::new());
        let mut session = match cli.seed {
            Some(seed) => GameSession::with_seed(config, store, seed),
            None => GameSession::new(config, store),
        };
        session.set_profile_override(cli.profile.spawn_profile());

        Self {
            cli: Some(cli),
            session,
            state: AppState::Ready,
            play_area: Rect::default(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.reset_best {
        let mut store = FileBestScoreStore::new();
        store.save(0)?;
        println!("best score cleared");
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let events = CrosstermEventSource::new();
    let ticker = FixedTicker::new(Duration::from_millis(TICK_RATE_MS));
    let runner = Runner::new(events, ticker);

    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            GameEvent::Tick => {
                app.session.advance(TICK_RATE_MS);
                if app.state == AppState::Playing && !app.session.is_active() {
                    app.state = AppState::Summary;
                }
            }
            GameEvent::Resize => {}
            GameEvent::Mouse(mouse) => {
                // Only the press counts: drags, releases and moves would
                // turn one physical input into several logical ones.
                if app.state == AppState::Playing
                    && mouse.kind == MouseEventKind::Down(MouseButton::Left)
                {
                    if let Some((x, y)) = ui::pointer_to_px(app.play_area, mouse.column, mouse.row)
                    {
                        app.session.pointer_down(x, y);
                    }
                }
            }
            GameEvent::Key(key) => match key.code {
                KeyCode::Esc => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char('s') | KeyCode::Char(' ') => {
                    // Start silently ignores a running round
                    app.session.start();
                    if app.session.is_active() {
                        app.state = AppState::Playing;
                    }
                }
                KeyCode::Char('r') => {
                    app.session.reset();
                    app.state = AppState::Ready;
                }
                _ => {}
            },
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    let (_, play, _) = ui::screen_chunks(f.area());
    app.play_area = play;
    // Viewport query: spawn bounds follow the current terminal size
    app.session.set_play_area(ui::play_area_px(play));
    f.render_widget(&*app, f.area());
}
