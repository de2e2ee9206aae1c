//! Gravity Four client library.
//!
//! Client side of a networked, turn-based gravity-drop grid game. The server
//! is authoritative; this crate keeps a session in sync with it, pre-filters
//! illegal moves and projects each snapshot into render-ready state.
//!
//! # Architecture
//!
//! - **Grid / rules**: pure board model and move legality (`gravity_four_grid`)
//! - **Protocol**: JSON wire frames in both directions
//! - **Session**: sans-I/O state machine for one connection
//! - **Client**: async driver owning the transport
//! - **Projector**: snapshot to view state, plus the rematch latch
//! - **Render**: the presentation seam
//!
//! # Example
//!
//! ```no_run
//! use gravity_four::{Endpoint, IdPlacement, SessionClient, SessionEvent, WebSocketConnector};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let endpoint = Endpoint::parse("ws://localhost:8292/ws", IdPlacement::Path)?;
//! let mut client = SessionClient::new(WebSocketConnector, endpoint);
//! let mut events = client.connect("abc123", "alice").await;
//! while let Some(event) = events.recv().await {
//!     if let SessionEvent::Updated { view, .. } = &event {
//!         if *view.is_local_players_turn() {
//!             client.request_move(3, 5);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod client;
mod config;
mod projector;
mod protocol;
mod render;
mod session;
mod snapshot;
mod transport;

// Crate-level exports - Session driver
pub use client::{DEFAULT_SHUTDOWN_TIMEOUT, SessionClient};

// Crate-level exports - Configuration
pub use config::{
    ClientConfig, ConfigError, DEFAULT_SHUTDOWN_TIMEOUT_MS, Endpoint, IdPlacement, PlayerNameError,
    validate_player_name,
};

// Crate-level exports - Projection
pub use projector::{RematchLatch, ViewState, project, project_with_turn_hint};

// Crate-level exports - Wire protocol
pub use protocol::{
    Inbound, MoveIntent, ProtocolError, SPECTATOR_PLAYER_INDEX, ServerUpdate,
    decode_server_frame,
};

// Crate-level exports - Presentation seam
pub use render::{CellTarget, RenderSink, UserIntent, cell_targets, dispatch};

// Crate-level exports - Session state machine
pub use session::{
    CONNECTION_TERMINATED_MESSAGE, CloseKind, ConnectionState, OutgoingMove, SessionCore,
    SessionEvent,
};

// Crate-level exports - Snapshot types
pub use snapshot::{GameSnapshot, PlayerSlot, SessionIdentity, TurnState};

// Crate-level exports - Transport
pub use transport::{Connector, Transport, TransportError, WebSocketConnector, WebSocketTransport};

// Crate-level exports - Grid types
pub use gravity_four_grid::{
    Cell, ColorIndex, EMPTY_WIRE_VALUE, Grid, GridError, MoveError, Placement, check_move,
    is_legal, legal_moves,
};
