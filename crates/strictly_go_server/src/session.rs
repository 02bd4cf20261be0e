//! Game session management for concurrent games.

use crate::config::ServerConfig;
use crate::events::{EventSink, NullSink};
use crate::manager::GameManager;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use strictly_go::{Color, GamePhase, GameSummary, MoveError, PlayerColor};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Unique identifier for a player.
pub type PlayerId = String;

/// Type of player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerType {
    /// Human player.
    Human,
    /// Automated player driving the same operations.
    Bot,
}

/// A player seated in a session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Player {
    /// Player's unique ID.
    id: PlayerId,
    /// Player's name.
    name: String,
    /// Type of player.
    player_type: PlayerType,
    /// Stone color this player uses.
    color: Color,
}

/// Why a session request failed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SessionError {
    /// No session with this id.
    #[display("Session {} not found", _0)]
    NotFound(SessionId),
    /// A session with this id already exists.
    #[display("Session {} already exists", _0)]
    AlreadyExists(SessionId),
    /// The manager holds as many sessions as configured.
    #[display("Session limit of {} reached", _0)]
    CapacityReached(usize),
    /// Both seats are taken.
    #[display("Session {} already has 2 players", _0)]
    Full(SessionId),
    /// The game is no longer waiting for players.
    #[display("Session {} is not accepting players ({})", _0, _1)]
    Closed(SessionId, GamePhase),
    /// The player is not seated in the session.
    #[display("Player {} is not in this session", _0)]
    UnknownPlayer(PlayerId),
    /// The game rejected the request.
    #[display("{}", _0)]
    Game(MoveError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Game(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MoveError> for SessionError {
    fn from(err: MoveError) -> Self {
        SessionError::Game(err)
    }
}

/// A game with its two seats.
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Session ID.
    pub id: SessionId,
    /// The game, shared with every thread driving a player.
    pub game: Arc<GameManager>,
    /// Black seat.
    pub black: Option<Player>,
    /// White seat.
    pub white: Option<Player>,
}

impl GameSession {
    /// Creates an empty session.
    #[instrument(skip(game))]
    pub fn new(id: SessionId, game: Arc<GameManager>) -> Self {
        info!(session_id = %id, "Creating new game session");
        Self {
            id,
            game,
            black: None,
            white: None,
        }
    }

    /// Seats a player in the first free seat, black first.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn register_player(
        &mut self,
        id: PlayerId,
        name: String,
        player_type: PlayerType,
    ) -> Result<Color, SessionError> {
        let (seat, color) = if self.black.is_none() {
            (&mut self.black, Color::Black)
        } else if self.white.is_none() {
            (&mut self.white, Color::White)
        } else {
            warn!(player_id = %id, "Session already has 2 players");
            return Err(SessionError::Full(self.id.clone()));
        };
        info!(player_id = %id, %color, "Registering player");
        *seat = Some(Player {
            id,
            name,
            player_type,
            color,
        });
        Ok(color)
    }

    /// Frees the seat of `color` if `player_id` holds it.
    fn vacate(&mut self, color: Color, player_id: &str) {
        let seat = match color {
            Color::Black => &mut self.black,
            Color::White => &mut self.white,
        };
        if seat.as_ref().is_some_and(|player| player.id == player_id) {
            *seat = None;
        }
    }

    /// Gets the player with the given ID.
    pub fn get_player(&self, player_id: &str) -> Option<&Player> {
        [self.black.as_ref(), self.white.as_ref()]
            .into_iter()
            .flatten()
            .find(|player| player.id == player_id)
    }

    /// Returns true once both seats are taken.
    pub fn is_full(&self) -> bool {
        self.black.is_some() && self.white.is_some()
    }
}

/// Manages all game sessions.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<SessionId, GameSession>>>,
    config: ServerConfig,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("sessions", &self.list_sessions())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a session manager whose games notify `sink`.
    #[instrument(skip(sink))]
    pub fn new(config: ServerConfig, sink: Arc<dyn EventSink>) -> Self {
        info!(max_sessions = config.max_sessions(), "Creating session manager");
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            config,
            sink,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, GameSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a new game session.
    #[instrument(skip(self))]
    pub fn create_session(&self, id: SessionId) -> Result<Arc<GameManager>, SessionError> {
        let mut sessions = self.lock();

        if sessions.contains_key(&id) {
            warn!(session_id = %id, "Session already exists");
            return Err(SessionError::AlreadyExists(id));
        }
        if sessions.len() >= *self.config.max_sessions() {
            warn!(session_id = %id, "Session limit reached");
            return Err(SessionError::CapacityReached(*self.config.max_sessions()));
        }

        let game = Arc::new(GameManager::new(
            *self.config.first_player(),
            Arc::clone(&self.sink),
        ));
        sessions.insert(id.clone(), GameSession::new(id.clone(), Arc::clone(&game)));

        info!(session_id = %id, "Created new session");
        Ok(game)
    }

    /// Gets a session's game by ID.
    #[instrument(skip(self))]
    pub fn get_session(&self, id: &str) -> Option<Arc<GameManager>> {
        let game = self.lock().get(id).map(|session| Arc::clone(&session.game));
        if game.is_none() {
            debug!(session_id = id, "Session not found");
        }
        game
    }

    /// Lists all session IDs, sorted.
    pub fn list_sessions(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Removes a session. Players still holding its game keep it alive.
    #[instrument(skip(self))]
    pub fn remove_session(&self, id: &str) -> Option<Arc<GameManager>> {
        let removed = self.lock().remove(id).map(|session| session.game);
        if removed.is_some() {
            info!(session_id = id, "Session removed");
        }
        removed
    }

    /// Atomically seats a player. The game starts when the second seat is
    /// filled. Returns the assigned color.
    #[instrument(skip(self))]
    pub fn register_player(
        &self,
        session_id: &str,
        player_id: PlayerId,
        name: String,
        player_type: PlayerType,
    ) -> Result<Color, SessionError> {
        let (color, game) = {
            let mut sessions = self.lock();
            let session = sessions
                .get_mut(session_id)
                .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
            let phase = session.game.game_state();
            if phase != GamePhase::NotInitialized {
                warn!(%phase, "Session no longer accepts players");
                return Err(SessionError::Closed(session_id.to_string(), phase));
            }
            let color = session.register_player(player_id.clone(), name, player_type)?;
            let game = session.is_full().then(|| Arc::clone(&session.game));
            (color, game)
        };

        if let Some(game) = game {
            if let Err(err) = game.start_game() {
                warn!(error = %err, "Game did not start, freeing seat");
                if let Some(session) = self.lock().get_mut(session_id) {
                    session.vacate(color, &player_id);
                }
                return Err(err.into());
            }
        }
        Ok(color)
    }

    /// Color of `player_id` in the session.
    pub fn player_color(&self, session_id: &str, player_id: &str) -> Option<Color> {
        self.lock()
            .get(session_id)
            .and_then(|session| session.get_player(player_id))
            .map(|player| player.color)
    }

    /// Copy of a session's seats.
    pub fn players(&self, session_id: &str) -> Option<(Option<Player>, Option<Player>)> {
        self.lock()
            .get(session_id)
            .map(|session| (session.black.clone(), session.white.clone()))
    }

    /// The player left: the game is abandoned in the opponent's favor.
    /// Moves already applied stay on the board.
    #[instrument(skip(self))]
    pub fn disconnect(&self, session_id: &str, player_id: &str) -> Result<GameSummary, SessionError> {
        let (color, game) = {
            let sessions = self.lock();
            let session = sessions
                .get(session_id)
                .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
            let player = session
                .get_player(player_id)
                .ok_or_else(|| SessionError::UnknownPlayer(player_id.to_string()))?;
            (player.color, Arc::clone(&session.game))
        };

        info!(%color, "Player disconnected");
        Ok(game.abandon(PlayerColor::from(color))?)
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(ServerConfig::default(), Arc::new(NullSink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_go::GamePhase;

    #[test]
    fn test_seats_fill_black_then_white() {
        let manager = SessionManager::default();
        manager.create_session("s".into()).unwrap();
        let first = manager
            .register_player("s", "a".into(), "Ann".into(), PlayerType::Human)
            .unwrap();
        let second = manager
            .register_player("s", "b".into(), "Bot".into(), PlayerType::Bot)
            .unwrap();
        assert_eq!(first, Color::Black);
        assert_eq!(second, Color::White);
        assert_eq!(manager.player_color("s", "b"), Some(Color::White));
        assert_eq!(
            manager.register_player("s", "c".into(), "Cy".into(), PlayerType::Human),
            Err(SessionError::Full("s".into()))
        );
    }

    #[test]
    fn test_game_starts_with_second_player() {
        let manager = SessionManager::default();
        let game = manager.create_session("s".into()).unwrap();
        manager
            .register_player("s", "a".into(), "Ann".into(), PlayerType::Human)
            .unwrap();
        assert_eq!(game.game_state(), GamePhase::NotInitialized);
        manager
            .register_player("s", "b".into(), "Ben".into(), PlayerType::Human)
            .unwrap();
        assert_eq!(game.game_state(), GamePhase::Running);
    }

    #[test]
    fn test_abandoned_session_refuses_new_player() {
        let manager = SessionManager::default();
        let game = manager.create_session("s".into()).unwrap();
        manager
            .register_player("s", "a".into(), "Ann".into(), PlayerType::Human)
            .unwrap();
        manager.disconnect("s", "a").unwrap();
        assert_eq!(game.game_state(), GamePhase::Finished);

        assert_eq!(
            manager.register_player("s", "b".into(), "Ben".into(), PlayerType::Human),
            Err(SessionError::Closed("s".into(), GamePhase::Finished))
        );
        let (black, white) = manager.players("s").unwrap();
        assert_eq!(black.map(|player| player.id), Some("a".to_string()));
        assert!(white.is_none());
        assert_eq!(manager.player_color("s", "b"), None);
    }

    #[test]
    fn test_vacate_frees_only_the_matching_player() {
        let mut session = GameSession::new("s".into(), Arc::new(GameManager::default()));
        session
            .register_player("a".into(), "Ann".into(), PlayerType::Human)
            .unwrap();
        session
            .register_player("b".into(), "Ben".into(), PlayerType::Bot)
            .unwrap();

        session.vacate(Color::Black, "b");
        assert!(session.is_full());

        session.vacate(Color::White, "b");
        assert!(session.white.is_none());
        assert!(session.get_player("a").is_some());
        assert_eq!(
            session.register_player("c".into(), "Cy".into(), PlayerType::Human),
            Ok(Color::White)
        );
    }

    #[test]
    fn test_duplicate_session_rejected() {
        let manager = SessionManager::default();
        manager.create_session("s".into()).unwrap();
        assert_eq!(
            manager.create_session("s".into()).unwrap_err(),
            SessionError::AlreadyExists("s".into())
        );
    }
}
