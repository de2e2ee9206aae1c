//! Terminal UI for Gravity Four.

mod app;
mod input;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use gravity_four::{SessionClient, SessionEvent, WebSocketConnector, dispatch};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, error::TryRecvError};
use tracing::{debug, error, info, instrument};

use app::App;
use input::{Action, handle_key};

const INPUT_POLL: Duration = Duration::from_millis(50);

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Runs the terminal client until the user quits.
#[instrument(skip(client))]
pub async fn run_tui(
    mut client: SessionClient<WebSocketConnector>,
    game_id: String,
    player_name: String,
) -> Result<()> {
    info!("Starting Gravity Four TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut events = client.connect(&game_id, &player_name).await;
    let mut app = App::new(game_id, player_name);

    let res = run_game(&mut terminal, &mut client, &mut events, &mut app).await;

    client.disconnect().await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    res
}

/// Draw, drain session events, handle input; repeat until quit.
async fn run_game(
    terminal: &mut Term,
    client: &mut SessionClient<WebSocketConnector>,
    events: &mut UnboundedReceiver<SessionEvent>,
    app: &mut App,
) -> Result<()> {
    loop {
        loop {
            match events.try_recv() {
                Ok(event) => {
                    debug!(?event, "Session event");
                    dispatch(app, &event);
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        let mut hits = Vec::new();
        terminal.draw(|frame| hits = ui::draw(frame, app))?;
        app.set_hit_targets(hits);

        if !event::poll(INPUT_POLL)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match handle_key(app, key.code) {
                    Some(Action::Quit) => {
                        info!("User quit");
                        return Ok(());
                    }
                    Some(Action::Intent(intent)) => intent.apply(client),
                    None => {}
                }
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                if let Some(target) = app.target_at(mouse.column, mouse.row) {
                    app.set_cursor((target.x(), target.y()));
                    target.intent().apply(client);
                }
            }
            _ => {}
        }
    }
}
