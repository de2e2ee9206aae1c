//! Keyboard handling.

use super::app::App;
use crossterm::event::KeyCode;
use gravity_four::UserIntent;
use tracing::debug;

/// What a key press asks the event loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Forward an intent to the session.
    Intent(UserIntent),
    /// Leave the game.
    Quit,
}

/// Moves the cursor with the arrow keys, staying inside a `cols x rows` board.
pub fn move_cursor(cursor: (usize, usize), key: KeyCode, cols: usize, rows: usize) -> (usize, usize) {
    let (x, y) = cursor;
    match key {
        KeyCode::Left => (x.saturating_sub(1), y),
        KeyCode::Right if x + 1 < cols => (x + 1, y),
        KeyCode::Up => (x, y.saturating_sub(1)),
        KeyCode::Down if y + 1 < rows => (x, y + 1),
        _ => cursor,
    }
}

/// Maps a key press to an action, updating cursor and offer state on `app`.
pub fn handle_key(app: &mut App, key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),

        KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => {
            let (cols, rows) = app
                .grid()
                .map(|grid| (grid.column_count(), grid.row_count()))?;
            app.set_cursor(move_cursor(app.cursor(), key, cols, rows));
            None
        }

        KeyCode::Enter | KeyCode::Char(' ') => {
            app.grid()?;
            let (x, y) = app.cursor();
            Some(Action::Intent(UserIntent::Move { x, y }))
        }

        KeyCode::Char('r') => {
            if app.take_rematch_offer() {
                Some(Action::Intent(UserIntent::PlayAgain))
            } else {
                debug!("No rematch on offer");
                None
            }
        }

        KeyCode::Char(c @ '1'..='9') => {
            let column = c.to_digit(10)? as usize - 1;
            let y = app.grid()?.landing_row(column)?;
            app.set_cursor((column, y));
            Some(Action::Intent(UserIntent::Move { x: column, y }))
        }

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gravity_four::{
        GameSnapshot, Grid, PlayerSlot, RenderSink, SessionIdentity, TurnState, project,
    };

    fn app_with(grid: Grid) -> App {
        let snapshot = GameSnapshot::new(
            grid.clone(),
            vec![
                PlayerSlot::new(0, "alice".to_string(), 0),
                PlayerSlot::new(1, "bob".to_string(), 1),
            ],
            TurnState::new(0, false),
            "alice's turn".to_string(),
        );
        let mut app = App::new("g1", "alice");
        app.render(&project(&snapshot, &SessionIdentity::player(0)), &grid);
        app
    }

    #[test]
    fn test_move_cursor_stays_on_board() {
        assert_eq!(move_cursor((0, 0), KeyCode::Left, 7, 6), (0, 0));
        assert_eq!(move_cursor((0, 0), KeyCode::Up, 7, 6), (0, 0));
        assert_eq!(move_cursor((6, 5), KeyCode::Right, 7, 6), (6, 5));
        assert_eq!(move_cursor((6, 5), KeyCode::Down, 7, 6), (6, 5));
        assert_eq!(move_cursor((3, 3), KeyCode::Right, 7, 6), (4, 3));
        assert_eq!(move_cursor((3, 3), KeyCode::Down, 7, 6), (3, 4));
    }

    #[test]
    fn test_enter_requests_move_at_cursor() {
        let mut app = app_with(Grid::empty(6, 7).unwrap());
        handle_key(&mut app, KeyCode::Right);
        assert_eq!(
            handle_key(&mut app, KeyCode::Enter),
            Some(Action::Intent(UserIntent::Move { x: 1, y: 5 }))
        );
    }

    #[test]
    fn test_digit_drops_into_landing_row() {
        let grid = Grid::from_wire(&[
            vec![-1, -1, -1],
            vec![-1, -1, -1],
            vec![-1, 0, -1],
        ])
        .unwrap();
        let mut app = app_with(grid);
        assert_eq!(
            handle_key(&mut app, KeyCode::Char('2')),
            Some(Action::Intent(UserIntent::Move { x: 1, y: 1 }))
        );
        assert_eq!(app.cursor(), (1, 1));
        assert_eq!(handle_key(&mut app, KeyCode::Char('9')), None);
    }

    #[test]
    fn test_rematch_only_when_offered() {
        let mut app = app_with(Grid::empty(6, 7).unwrap());
        assert_eq!(handle_key(&mut app, KeyCode::Char('r')), None);
        app.offer_rematch();
        assert_eq!(
            handle_key(&mut app, KeyCode::Char('r')),
            Some(Action::Intent(UserIntent::PlayAgain))
        );
        assert_eq!(handle_key(&mut app, KeyCode::Char('r')), None);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new("g1", "alice");
        assert_eq!(handle_key(&mut app, KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(handle_key(&mut app, KeyCode::Esc), Some(Action::Quit));
        assert_eq!(handle_key(&mut app, KeyCode::Enter), None);
    }
}
