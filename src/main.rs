use std::{
    fs::File,
    io::{self, stdout},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use blockdrop::config::{
    DEFAULT_BASE_TICK_MS, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_MIN_TICK_MS,
    DEFAULT_SCORE_PER_LEVEL,
};
use blockdrop::{
    CellState, Game, GameConfig, PieceProvider, RandomPieceProvider, SeededPieceProvider,
};

/// Falling-block puzzle game in the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Board width in cells.
    #[arg(long, default_value_t = DEFAULT_GRID_WIDTH)]
    width: usize,

    /// Board height in cells.
    #[arg(long, default_value_t = DEFAULT_GRID_HEIGHT)]
    height: usize,

    /// Delay between ticks at level 1, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_BASE_TICK_MS)]
    base_tick_ms: u64,

    /// Shortest delay between ticks, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_MIN_TICK_MS)]
    min_tick_ms: u64,

    /// Score needed for each level.
    #[arg(long, default_value_t = DEFAULT_SCORE_PER_LEVEL)]
    score_per_level: u32,

    /// Seed for the piece sequence. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (filtered by RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";
const PREVIEW_WIDTH: u16 = 12;
const INFO_WIDTH: u16 = 14;

fn cell_color(cell: CellState) -> Color {
    match cell.tag() {
        1 => Color::Cyan,
        2 => Color::Red,
        3 => Color::Green,
        4 => Color::Rgb(128, 0, 255),
        5 => Color::Yellow,
        6 => Color::Rgb(255, 165, 0),
        7 => Color::Blue,
        _ => Color::White,
    }
}

fn cell_span(cell: CellState) -> Span<'static> {
    match cell {
        CellState::Empty => Span::raw(EMPTY_CHAR),
        _ => Span::styled(BLOCK_CHAR, Style::default().fg(cell_color(cell))),
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game) {
    let area = frame.size();
    render_game(frame, game, area);

    if game.is_game_over() {
        render_popup(frame, area, " Game Over ", "GAME OVER", Color::Red, "R to restart");
    } else if !game.is_running() {
        render_popup(frame, area, " Paused ", "PAUSED", Color::Yellow, "P to continue");
    }
}

fn render_game(frame: &mut Frame, game: &Game, area: Rect) {
    let board = game.board();
    let grid_display_width = (board.width() as u16 * CELL_WIDTH) + 2;
    let grid_display_height = board.height() as u16 + 2;
    let total_width = grid_display_width + PREVIEW_WIDTH + INFO_WIDTH + 4;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Preview][Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(PREVIEW_WIDTH),
        Constraint::Length(INFO_WIDTH),
    ])
    .split(game_row);

    render_grid(frame, game, horizontal[0]);
    render_preview(frame, game, horizontal[1]);
    render_info(frame, game, horizontal[2]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→↓: Move | Space: Drop | Z/X: Rotate | P: Pause | R: Restart | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blockdrop ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = game
        .render_grid()
        .into_iter()
        .map(|row| Line::from(row.into_iter().map(cell_span).collect::<Vec<_>>()))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_preview(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from("")];
    for row in game.next_piece().shape().rows() {
        let mut spans = vec![Span::raw(" ")];
        spans.extend(row.iter().copied().map(cell_span));
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score())),
        Line::from(""),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", game.level())),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_popup(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    headline: &str,
    color: Color,
    hint: &str,
) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(headline.to_string(), Style::default().fg(color))),
        Line::from(""),
        Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(paragraph, centered_rect(24, 9, area));
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Input
// ============================================================================

/// Applies a key press. Returns false when the player asked to quit.
fn handle_key(game: &mut Game, code: KeyCode) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return false,
        KeyCode::Char('p') | KeyCode::Char('P') => game.toggle_pause(),
        KeyCode::Char('r') | KeyCode::Char('R') => game.restart(),
        KeyCode::Left => game.move_left(),
        KeyCode::Right => game.move_right(),
        KeyCode::Down => game.move_down(),
        KeyCode::Char(' ') => game.hard_drop(),
        KeyCode::Char('z') | KeyCode::Char('Z') => {
            game.rotate_counter_clockwise();
        }
        KeyCode::Char('x') | KeyCode::Char('X') => {
            game.rotate_clockwise();
        }
        _ => {}
    }
    true
}

// ============================================================================
// Main Loop
// ============================================================================

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("failed to install logger")?;
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, game: &mut Game) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| render(frame, game))?;

        let tick_duration = Duration::from_millis(game.tick_interval_ms());
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !handle_key(game, key.code) {
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= tick_duration {
            game.tick();
            last_tick = Instant::now();
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = GameConfig {
        grid_width: args.width,
        grid_height: args.height,
        base_tick_ms: args.base_tick_ms,
        min_tick_ms: args.min_tick_ms,
        score_per_level: args.score_per_level,
        ..GameConfig::default()
    };
    let provider: Box<dyn PieceProvider> = match args.seed {
        Some(seed) => Box::new(SeededPieceProvider::new(seed)),
        None => Box::new(RandomPieceProvider),
    };
    let mut game = Game::with_config(config, provider).context("invalid game configuration")?;

    enable_raw_mode().context("failed to enable raw mode")?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut game);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}
