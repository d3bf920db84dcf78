//! ninja-dash - live terminal dashboard for a ninja logistics installation
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering and input mapping
//! - App Layer - session state, push channel lifecycle, export dispatch
//! - Network Layer (Tokio) - sync websocket and export requests

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use ninja_dash::app::{AppActor, Session};
use ninja_dash::catalog::ItemCatalog;
use ninja_dash::config::{CatalogSource, Cli, Config};
use ninja_dash::messages::ui_events::{key_to_ui_event, mouse_to_ui_event, AppTab, Hit, InputContext};
use ninja_dash::messages::{GridView, NetworkCommand, NetworkResponse, RenderState, UiEvent};
use ninja_dash::network::client::create_client;
use ninja_dash::network::NetworkActor;
use ninja_dash::ui::{self, fit, fuel_color, grid_layout, link_color};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load(Cli::parse()).context("Failed to load configuration")?;

    // Initialize logging to file; the terminal belongs to the UI
    let log_dir = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let log_name = config
        .log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "ninja-dash.log".into());
    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    tracing::info!(page = %config.page_url, area = %config.area_id, "starting");

    // The catalog has to be in place before the first render
    let catalog = match &config.catalog {
        CatalogSource::Url(url) => ItemCatalog::fetch(&create_client(), url)
            .await
            .with_context(|| format!("Failed to load item catalog from {}", url))?,
        CatalogSource::File(path) => ItemCatalog::load_file(path)
            .with_context(|| format!("Failed to load item catalog from {}", path.display()))?,
    };
    tracing::info!(items = catalog.len(), "item catalog loaded");

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(config.endpoints.export.clone(), net_resp_tx);
    let network_handle = tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let session = Session::new(&config.area_id, config.endpoints.sync.clone(), catalog);
    let app_actor = AppActor::new(session, net_cmd_tx, render_tx);
    let app_handle = tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    let result = run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await;

    // Let the actors close the channel before the runtime goes away
    let _ = app_handle.await;
    let _ = network_handle.await;
    tracing::info!("stopped");

    result
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();
    let mut hits: Vec<Hit> = Vec::new();

    loop {
        // Draw with current state, remembering where each stack landed
        terminal.draw(|f| {
            hits.clear();
            draw_ui(f, &current_state, &mut hits);
        })?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            let ctx = InputContext {
                active_tab: current_state.active_tab,
                show_help: current_state.show_help,
                prompt_open: current_state.prompt_open,
            };
            let ui_event = match event::read()? {
                Event::Key(key) => key_to_ui_event(key, ctx),
                Event::Mouse(mouse) => mouse_to_ui_event(mouse, &hits, ctx),
                _ => None,
            };
            if let Some(ui_event) = ui_event {
                let quit = ui_event == UiEvent::Quit;
                let _ = ui_tx.send(ui_event);
                if quit {
                    break;
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState, hits: &mut Vec<Hit>) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_tab_bar(f, state, main_chunks[0]);

    match state.active_tab {
        AppTab::Storage => draw_storage_tab(f, state, main_chunks[1], hits),
        AppTab::Turtles => draw_turtles_tab(f, state, main_chunks[1]),
    }

    draw_status_bar(f, state, main_chunks[2]);

    if state.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_tab_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(0)])
        .split(area);

    let selected = match state.active_tab {
        AppTab::Storage => 0,
        AppTab::Turtles => 1,
    };
    f.render_widget(ui::render_tabs(&[" 1:Storage ", " 2:Turtles "], selected), chunks[0]);

    let shape = state.area_shape.as_deref().unwrap_or("no details yet");
    let info = Line::from(vec![
        Span::styled(state.area_id.as_str(), Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("  {}", shape), Style::default().fg(Color::DarkGray)),
    ])
    .right_aligned();
    f.render_widget(Paragraph::new(info), chunks[1]);
}

fn draw_storage_tab(f: &mut Frame, state: &RenderState, area: Rect, hits: &mut Vec<Hit>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(50), // Inventory
            Constraint::Percentage(25), // Pending exports
            Constraint::Percentage(25), // In flight
        ])
        .split(area);

    for (grid, chunk) in state.grids.iter().zip(chunks.iter()) {
        draw_grid(f, grid, *chunk, hits);
    }
}

fn draw_grid(f: &mut Frame, view: &GridView, area: Rect, hits: &mut Vec<Hit>) {
    let border_style = if view.focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} ({}) ", view.grid.title(), view.cells.len()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if view.cells.is_empty() {
        let empty = Paragraph::new("nothing here").style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, inner);
        return;
    }

    let selected = view.cells.iter().position(|c| c.selected);
    for (index, rect) in grid_layout(inner, view.cells.len(), selected) {
        let cell = &view.cells[index];
        let width = rect.width.saturating_sub(2) as usize;

        let border = if cell.prompt.is_some() {
            Style::default().fg(Color::Yellow)
        } else if cell.selected {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let title = match &cell.icon {
            Some(icon) => format!("[{}] {}", icon, cell.name),
            None => cell.name.clone(),
        };
        let second = match &cell.prompt {
            Some(text) => Line::from(Span::styled(format!("> {}", text), Style::default().fg(Color::Yellow))),
            None => Line::from(Span::styled(cell.count.as_str(), Style::default().bold())).right_aligned(),
        };

        let body = Paragraph::new(vec![Line::from(fit(&title, width)), second])
            .block(Block::default().borders(Borders::ALL).border_style(border));
        f.render_widget(body, rect);

        if let Some(text) = &cell.prompt {
            let max_x = rect.x.saturating_add(rect.width.saturating_sub(2));
            let typed = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
            let cursor_x = rect.x.saturating_add(3).saturating_add(typed).min(max_x);
            f.set_cursor_position(Position::new(cursor_x, rect.y.saturating_add(2)));
        }

        if view.grid.accepts_press() {
            hits.push(Hit {
                area: rect,
                grid: view.grid,
                element_id: cell.element_id.clone(),
            });
        }
    }
}

fn draw_turtles_tab(f: &mut Frame, state: &RenderState, area: Rect) {
    let header = Row::new(vec!["Label", "Fuel", "Ver", "Free", "Activity"])
        .style(Style::default().fg(Color::Yellow).bold());

    let rows: Vec<Row> = state
        .workers
        .iter()
        .skip(state.worker_scroll as usize)
        .map(|w| {
            let mut activity = vec![Line::from(w.activity.as_str())];
            if let Some(fatal) = &w.fatal {
                activity.push(Line::from(Span::styled(fatal.as_str(), Style::default().fg(Color::Red))));
            }
            let height = activity.len() as u16;
            Row::new(vec![
                Cell::from(w.label.as_str()).style(Style::default().bold()),
                Cell::from(w.fuel.as_str()).style(Style::default().fg(fuel_color(&w.fuel))),
                Cell::from(w.version.as_str()),
                Cell::from(w.inventory.as_str()),
                Cell::from(Text::from(activity)),
            ])
            .height(height)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Turtles ({}) (↑/↓ scroll) ", state.workers.len())),
    );
    f.render_widget(table, area);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let mut spans = vec![
        Span::styled(
            format!(" {} ", state.link_state.as_str()),
            Style::default().fg(Color::Black).bg(link_color(state.link_state)),
        ),
        Span::styled(
            format!(" {} #{} ", state.sync_url, state.attempts),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    match state.activity.first() {
        Some(entry) => spans.push(Span::styled(
            format!("| {} {} ", entry.timestamp.format("%H:%M:%S"), entry.text),
            Style::default().fg(if entry.ok { Color::Green } else { Color::Red }),
        )),
        None => spans.push(Span::styled(
            "| Enter:export 1  b:export 64  n:quantity  ?:help  q:quit ",
            Style::default().fg(Color::DarkGray),
        )),
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 NINJA DASH - Controls

 STORAGE
   Tab / Shift+Tab    Switch grid
   Arrows             Select stack
   Enter / click      Export 1 (pending exports: cancel 1)
   b / Shift+click    Export 64
   n / Ctrl+click     Ask for a quantity
   Enter / Esc        Confirm / drop the quantity prompt

 TURTLES
   ↑ / ↓              Scroll

 GENERAL
   1 / 2              Storage / Turtles tab
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text).block(block).wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
