mod command;
mod history;
mod renderer;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use patience::autofinish::Step;
use patience::{CardGame, Castle, SeedPolicy, Table, Variant, Zone, ZoneKind};
use ratatui::Frame;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Position, Rect, Size};
use ratatui::Terminal;
use tracing::{debug, info, warn};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use command::{Command, parse_event};
use history::{GameRecord, History};
use renderer::{CardFace, Status, TerminalSurface, paint_card, render_help, terminal_card_set};

#[derive(Parser)]
#[command(version, about = "Beleaguered Castle and friends in the terminal")]
struct Args {
    /// Deal seed: 0 picks a random deal, a positive value replays that deal
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    seed: i64,

    /// Which game to play
    #[arg(short, long, value_enum, default_value_t = Variant::BeleagueredCastle)]
    variant: Variant,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,

    /// Write the log to this file; without it log output is discarded
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Neither read nor write the game history
    #[arg(long, default_value_t = false)]
    no_history: bool,
}

/// Ticks between auto-finish moves, so the cards can be seen travelling.
const TICK: Duration = Duration::from_millis(40);

/// A card being dragged with the mouse.
struct Drag {
    zone: Zone,
    face: Option<CardFace>,
    /// Pointer position relative to the card's top-left corner.
    grab: (u16, u16),
    at: Position,
}

struct App {
    table: Table<Castle, CardFace>,
    surface: TerminalSurface,
    history: Option<History>,
    seed: u64,
    status: Status,
    drag: Option<Drag>,
    auto_finishing: bool,
    show_help: bool,
    quit: bool,
}

impl App {
    fn new(variant: Variant, seed: u64, history: Option<History>, screen: Size) -> Self {
        let board = table_area(screen).as_size();
        let mut table = Table::new(Castle::new(variant));
        table.set_work_area(board);
        table.resize(board);
        table.initialise(terminal_card_set(), SeedPolicy::Fixed(seed));

        let mut app = App {
            table,
            surface: TerminalSurface::new(board),
            history,
            seed,
            status: Status::Info(String::new()),
            drag: None,
            auto_finishing: false,
            show_help: false,
            quit: false,
        };
        app.begin_record();
        app
    }

    fn variant(&self) -> Variant {
        self.table.game().variant()
    }

    fn begin_record(&mut self) {
        let (seed, variant) = (self.seed, self.variant());
        if let Some(history) = &mut self.history {
            history.push(GameRecord::new(seed, variant, history::now()));
        }
        self.status = Status::Info(format!(
            "{} #{} · drag cards with the mouse · ? for help",
            self.table.info().title,
            seed
        ));
    }

    /// Bring the current record up to date and write the history out.
    fn end_record(&mut self) {
        let moves = self.table.moves_made();
        let won = self.table.game().is_game_won();
        let Some(history) = &mut self.history else {
            return;
        };
        if let Some(record) = history.last_mut() {
            record.moves = moves;
            record.won = won;
            record.end_time.get_or_insert_with(history::now);
        }
        if let Err(err) = history.save() {
            warn!(%err, "history not saved");
        }
    }

    fn note_progress(&mut self, auto_finished: bool) {
        let moves = self.table.moves_made();
        let won = self.table.game().is_game_won();
        if let Some(record) = self.history.as_mut().and_then(History::last_mut) {
            record.moves = moves;
            record.auto_finished |= auto_finished;
            if won && !record.won {
                record.won = true;
                record.end_time = Some(history::now());
            }
        }
        if won {
            let score = self
                .history
                .as_ref()
                .map(|h| h.score(self.variant()))
                .map(|(won, played)| format!(" · {} of {} won", won, played))
                .unwrap_or_default();
            self.status = Status::Won(format!("Solved in {} moves{} · n for a new deal", moves, score));
        } else if self.table.game().legal_moves().is_empty() {
            self.status = Status::Info("No moves left · n for a new deal, r to replay".into());
        }
    }

    fn deal(&mut self, seed: u64) {
        self.end_record();
        self.seed = seed;
        self.drag = None;
        self.auto_finishing = false;
        self.table.set_seed(SeedPolicy::Fixed(seed));
        self.table.restart();
        self.begin_record();
    }

    fn handle(&mut self, command: Command) {
        if self.auto_finishing && !matches!(command, Command::Quit | Command::Resize(_)) {
            return;
        }
        match command {
            Command::PickUp(at) => self.pick_up(at),
            Command::Drag(at) => {
                if let Some(drag) = &mut self.drag {
                    drag.at = at;
                }
            }
            Command::Drop(at) => self.drop_at(at),
            Command::PlayToBest(at) => self.play_to_best(at),
            Command::AutoFinish => {
                if self.table.auto_finish_available() {
                    info!("auto-finish started");
                    self.auto_finishing = true;
                } else {
                    self.status = Status::Error("Auto-finish needs every row in descending order".into());
                }
            }
            Command::NewGame => self.deal(fresh_seed()),
            Command::RestartDeal => self.deal(self.seed),
            Command::Help => self.show_help = !self.show_help,
            Command::Resize(screen) => {
                let board = table_area(screen).as_size();
                self.surface.resize(board);
                self.table.set_work_area(board);
                self.table.resize(board);
            }
            Command::Quit => self.quit = true,
        }
    }

    fn pick_up(&mut self, at: Position) {
        if let Some(drag) = self.drag.take() {
            self.table.replace_card(&drag.zone);
        }
        let Some(zone) = self.table.zone_at(ZoneKind::PickUp, at) else {
            return;
        };
        let Some(lifted) = self.table.pick_up_cards(&zone) else {
            return;
        };
        self.drag = Some(Drag {
            zone,
            face: lifted.image.cloned(),
            grab: (at.x - zone.bounds.x, at.y - zone.bounds.y),
            at,
        });
    }

    fn drop_at(&mut self, at: Position) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        let Some(target) = self.table.zone_at(ZoneKind::Drop, at) else {
            self.table.replace_card(&drag.zone);
            return;
        };
        if target.region == drag.zone.region {
            self.table.replace_card(&drag.zone);
            return;
        }
        if let Err(err) = self.table.game().check_move(drag.zone.region, target.region) {
            self.status = Status::Error(err.to_string());
        }
        if self.table.move_card(&drag.zone, &target) {
            self.note_progress(false);
        }
    }

    fn play_to_best(&mut self, at: Position) {
        let Some(zone) = self.table.zone_at(ZoneKind::PickUp, at) else {
            return;
        };
        match self.table.play_to_best(zone.region) {
            Some(to) => {
                debug!(from = %zone.region, %to, "played to best");
                self.note_progress(false);
            }
            None => self.status = Status::Error("That card has nowhere to go".into()),
        }
    }

    fn tick(&mut self) {
        if !self.auto_finishing {
            return;
        }
        match self.table.auto_finish_step() {
            Step::Moved(_) => self.note_progress(true),
            Step::Won => {
                self.auto_finishing = false;
                self.note_progress(true);
            }
            Step::Unavailable | Step::Stalled => {
                self.auto_finishing = false;
                self.status = Status::Error("Auto-finish stopped".into());
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.table.redraw(&mut self.surface);

        let screen = frame.area();
        let board = table_area(screen.as_size());
        frame.render_widget(&self.surface, board);

        if let Some(drag) = &self.drag {
            let card = self.table.layout().metrics().map(|m| m.card);
            if let (Some(face), Some(card)) = (&drag.face, card) {
                let area = Rect::new(
                    drag.at.x.saturating_sub(drag.grab.0),
                    drag.at.y.saturating_sub(drag.grab.1),
                    card.width,
                    card.height,
                );
                paint_card(frame.buffer_mut(), face, area.intersection(board));
            }
        }

        let status_line = Rect::new(screen.x, screen.bottom().saturating_sub(1), screen.width, 1);
        self.status.render(status_line.intersection(screen), frame.buffer_mut());

        if self.show_help {
            render_help(self.table.info().title, board, frame.buffer_mut());
        }
    }
}

/// A random seed that `--seed` can replay: positive and within `i64`.
fn fresh_seed() -> u64 {
    rand::random_range(1..=i64::MAX as u64)
}

/// The requested seed when it names a deal, otherwise a fresh one.
fn replayable_seed(requested: i64) -> u64 {
    u64::try_from(requested)
        .ok()
        .filter(|&s| s > 0)
        .unwrap_or_else(fresh_seed)
}

/// Everything but the status line.
fn table_area(screen: Size) -> Rect {
    Rect::new(0, 0, screen.width, screen.height.saturating_sub(1))
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> anyhow::Result<()> {
    while !app.quit {
        terminal.draw(|frame| app.draw(frame))?;

        if event::poll(TICK)? {
            if let Some(command) = parse_event(&event::read()?) {
                app.handle(command);
            }
        }
        app.tick();
    }
    app.end_record();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level, args.log_file.as_deref())?;

    let seed = replayable_seed(args.seed);
    info!(seed, variant = ?args.variant, "starting");

    let history = (!args.no_history).then(History::load);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let screen = terminal.size()?;
    let mut app = App::new(args.variant, seed, history, screen);
    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn initialize_logging(level: LevelFilter, log_file: Option<&Path>) -> anyhow::Result<()> {
    let writer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        // The terminal belongs to the game.
        None => BoxMakeWriter::new(io::sink),
    };

    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_ansi(false)
                .with_writer(writer),
        )
        .with(filter)
        .init();
    Ok(())
}
