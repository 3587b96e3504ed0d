//! A single two-player room: seats, board, turn order, and fan-out.
//!
//! Every state change that clients must see is pushed from here, through
//! each participant's outbound queue, before the method returns. A move
//! either fully applies (mutation + broadcast) or is rejected before
//! anything changes.

use gridduel_protocol::{Grid, Marker, RoomId, ServerMessage};
use gridduel_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::rules::{detect_winner, is_full};
use crate::{IllegalMove, RoomError};

/// Seats per room.
pub const MAX_PARTICIPANTS: usize = 2;

/// Outbound queue feeding a participant's connection writer.
pub type ParticipantSender = mpsc::UnboundedSender<ServerMessage>;

/// A seated participant: who they are, which marker they play, and where
/// their messages go.
#[derive(Debug)]
pub struct Participant {
    conn_id: ConnectionId,
    marker: Marker,
    sender: ParticipantSender,
}

impl Participant {
    /// The connection this participant is bound to.
    pub fn conn_id(&self) -> ConnectionId {
        self.conn_id
    }

    /// The marker this participant plays.
    pub fn marker(&self) -> Marker {
        self.marker
    }
}

/// What a successful join hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    pub marker: Marker,
    pub board: Grid,
    pub room_id: RoomId,
}

/// Result of a legal move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The game goes on; `next_turn` moves next.
    Continue { next_turn: Marker },
    /// The mover completed a line. The board has been reset.
    Won(Marker),
    /// The board filled with no line. The board has been reset.
    Draw,
}

/// Result of removing a connection from a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// The connection had no seat here; nothing changed.
    NotSeated,
    /// One participant remains and was told the game is over.
    OpponentNotified,
    /// Nobody is left. The caller must drop the room.
    Empty,
}

/// One isolated game between at most two participants.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    /// Join order; index 0 joined first.
    participants: Vec<Participant>,
    grid: Grid,
    next_turn: Marker,
}

impl Room {
    /// Creates an empty room with a clear board and `X` to move.
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            participants: Vec::with_capacity(MAX_PARTICIPANTS),
            grid: Grid::new(),
            next_turn: Marker::X,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn next_turn(&self) -> Marker {
        self.next_turn
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= MAX_PARTICIPANTS
    }

    /// Returns the marker played by `conn_id`, if seated.
    pub fn marker_of(&self, conn_id: ConnectionId) -> Option<Marker> {
        self.participants
            .iter()
            .find(|p| p.conn_id == conn_id)
            .map(|p| p.marker)
    }

    /// Seats a participant.
    ///
    /// The first seat gets `X`. The second gets whichever marker the
    /// seated participant doesn't hold, so a newcomer after a disconnect
    /// never duplicates a marker. The joiner is sent `init`; filling the
    /// second seat broadcasts `start`.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyInRoom`] - `conn_id` already has a seat
    /// - [`RoomError::RoomFull`] - both seats are taken
    pub fn join(
        &mut self,
        conn_id: ConnectionId,
        sender: ParticipantSender,
    ) -> Result<Joined, RoomError> {
        if self.marker_of(conn_id).is_some() {
            return Err(RoomError::AlreadyInRoom(conn_id, self.id.clone()));
        }
        if self.is_full() {
            return Err(RoomError::RoomFull(self.id.clone()));
        }

        let marker = match self.participants.first() {
            Some(seated) => seated.marker.opponent(),
            None => Marker::X,
        };
        self.participants.push(Participant {
            conn_id,
            marker,
            sender,
        });
        tracing::info!(
            room_id = %self.id,
            %conn_id,
            %marker,
            participants = self.participants.len(),
            "participant joined"
        );

        let joined = Joined {
            marker,
            board: self.grid,
            room_id: self.id.clone(),
        };
        self.send_to(
            conn_id,
            ServerMessage::Init {
                symbol: marker,
                board: self.grid,
                room_id: self.id.clone(),
            },
        );

        if self.is_full() {
            tracing::info!(room_id = %self.id, "game started");
            self.broadcast(&ServerMessage::start());
        }

        Ok(joined)
    }

    /// Places the mover's marker on `index`.
    ///
    /// # Errors
    /// Returns the [`IllegalMove`] reason when the sender isn't seated,
    /// the opponent hasn't arrived, the cell is off the board or taken, or
    /// it isn't the sender's turn. Nothing is mutated or sent in that case.
    pub fn apply_move(
        &mut self,
        conn_id: ConnectionId,
        index: usize,
    ) -> Result<MoveOutcome, IllegalMove> {
        let marker = self.marker_of(conn_id).ok_or(IllegalMove::NotSeated)?;
        if !self.is_full() {
            return Err(IllegalMove::WaitingForOpponent);
        }
        if self.next_turn != marker {
            return Err(IllegalMove::NotYourTurn(self.next_turn));
        }
        if !self.grid.place(index, marker) {
            return Err(match self.grid.cells().get(index) {
                Some(_) => IllegalMove::CellOccupied(index),
                None => IllegalMove::CellOutOfRange(index),
            });
        }
        self.next_turn = marker.opponent();

        if let Some(winner) = detect_winner(&self.grid) {
            tracing::info!(room_id = %self.id, %winner, "game won");
            self.broadcast(&ServerMessage::won(winner));
            self.reset();
            return Ok(MoveOutcome::Won(winner));
        }
        if is_full(&self.grid) {
            tracing::info!(room_id = %self.id, "game drawn");
            self.broadcast(&ServerMessage::draw());
            self.reset();
            return Ok(MoveOutcome::Draw);
        }

        tracing::debug!(
            room_id = %self.id,
            %marker,
            index,
            next_turn = %self.next_turn,
            "move applied"
        );
        self.broadcast(&ServerMessage::Update {
            board: self.grid,
            next_turn: self.next_turn,
        });
        Ok(MoveOutcome::Continue {
            next_turn: self.next_turn,
        })
    }

    /// Frees `conn_id`'s seat.
    ///
    /// A remaining participant gets an `end` notice and a fresh board.
    pub fn remove_participant(&mut self, conn_id: ConnectionId) -> Departure {
        let before = self.participants.len();
        self.participants.retain(|p| p.conn_id != conn_id);
        if self.participants.len() == before {
            return Departure::NotSeated;
        }

        tracing::info!(
            room_id = %self.id,
            %conn_id,
            participants = self.participants.len(),
            "participant left"
        );

        if self.participants.is_empty() {
            return Departure::Empty;
        }
        self.broadcast(&ServerMessage::opponent_disconnected());
        self.reset();
        Departure::OpponentNotified
    }

    /// Sends `msg` to every seated participant.
    ///
    /// Queues whose connection has gone away are skipped silently; seats
    /// are only freed through [`remove_participant`](Self::remove_participant).
    pub fn broadcast(&self, msg: &ServerMessage) {
        for participant in &self.participants {
            let _ = participant.sender.send(msg.clone());
        }
    }

    /// Sends `msg` to one seated participant.
    fn send_to(&self, conn_id: ConnectionId, msg: ServerMessage) {
        if let Some(participant) =
            self.participants.iter().find(|p| p.conn_id == conn_id)
        {
            let _ = participant.sender.send(msg);
        }
    }

    /// Clears the board and gives `X` the first move of the rematch.
    fn reset(&mut self) {
        self.grid.clear();
        self.next_turn = Marker::X;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridduel_protocol::EndReason;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn room() -> Room {
        Room::new(RoomId::from("r1"))
    }

    /// Seats `id` and returns its inbox.
    fn seat(room: &mut Room, id: u64) -> UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        room.join(conn(id), tx).expect("join should succeed");
        rx
    }

    fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    /// Two seated participants with their join traffic drained.
    fn started() -> (
        Room,
        UnboundedReceiver<ServerMessage>,
        UnboundedReceiver<ServerMessage>,
    ) {
        let mut room = room();
        let mut x = seat(&mut room, 1);
        let mut o = seat(&mut room, 2);
        drain(&mut x);
        drain(&mut o);
        (room, x, o)
    }

    // =====================================================================
    // join()
    // =====================================================================

    #[test]
    fn test_join_first_gets_x_and_init() {
        let mut room = room();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let joined = room.join(conn(1), tx).unwrap();

        assert_eq!(joined.marker, Marker::X);
        assert_eq!(joined.room_id, RoomId::from("r1"));
        assert_eq!(
            drain(&mut rx),
            vec![ServerMessage::Init {
                symbol: Marker::X,
                board: Grid::new(),
                room_id: RoomId::from("r1"),
            }]
        );
    }

    #[test]
    fn test_join_second_gets_o_and_both_get_start() {
        let mut room = room();
        let mut x = seat(&mut room, 1);
        drain(&mut x);

        let mut o = seat(&mut room, 2);

        let o_msgs = drain(&mut o);
        assert!(matches!(
            o_msgs[0],
            ServerMessage::Init {
                symbol: Marker::O,
                ..
            }
        ));
        assert_eq!(o_msgs[1], ServerMessage::start());
        assert_eq!(drain(&mut x), vec![ServerMessage::start()]);
    }

    #[test]
    fn test_join_third_is_rejected_and_changes_nothing() {
        let (mut room, mut x, mut o) = started();
        room.apply_move(conn(1), 4).unwrap();
        drain(&mut x);
        drain(&mut o);
        let grid_before = *room.grid();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let result = room.join(conn(3), tx);

        assert_eq!(result, Err(RoomError::RoomFull(RoomId::from("r1"))));
        assert_eq!(room.participant_count(), 2);
        assert_eq!(room.marker_of(conn(1)), Some(Marker::X));
        assert_eq!(room.marker_of(conn(2)), Some(Marker::O));
        assert_eq!(room.next_turn(), Marker::O);
        assert_eq!(*room.grid(), grid_before);
        assert!(drain(&mut rx).is_empty());
        assert!(drain(&mut x).is_empty());
    }

    #[test]
    fn test_join_same_connection_twice_is_rejected() {
        let mut room = room();
        let _x = seat(&mut room, 1);
        let (tx, _rx) = mpsc::unbounded_channel();

        let result = room.join(conn(1), tx);

        assert!(matches!(result, Err(RoomError::AlreadyInRoom(c, _)) if c == conn(1)));
        assert_eq!(room.participant_count(), 1);
    }

    #[test]
    fn test_join_after_x_left_newcomer_takes_x() {
        let (mut room, _x, mut o) = started();
        room.remove_participant(conn(1));
        drain(&mut o);

        let (tx, _rx) = mpsc::unbounded_channel();
        let joined = room.join(conn(3), tx).unwrap();

        assert_eq!(joined.marker, Marker::X);
        assert_eq!(drain(&mut o), vec![ServerMessage::start()]);
    }

    // =====================================================================
    // apply_move()
    // =====================================================================

    #[test]
    fn test_apply_move_broadcasts_update_and_flips_turn() {
        let (mut room, mut x, mut o) = started();

        let outcome = room.apply_move(conn(1), 0).unwrap();

        assert_eq!(
            outcome,
            MoveOutcome::Continue {
                next_turn: Marker::O
            }
        );
        let mut board = Grid::new();
        board.place(0, Marker::X);
        let expected = ServerMessage::Update {
            board,
            next_turn: Marker::O,
        };
        assert_eq!(drain(&mut x), vec![expected.clone()]);
        assert_eq!(drain(&mut o), vec![expected]);
    }

    #[test]
    fn test_apply_move_turn_alternates() {
        let (mut room, _x, _o) = started();
        let mut expected = Marker::X;
        for (who, index) in [(1, 0), (2, 4), (1, 8), (2, 2)] {
            assert_eq!(room.next_turn(), expected);
            room.apply_move(conn(who), index).unwrap();
            expected = expected.opponent();
            assert_eq!(room.next_turn(), expected);
        }
    }

    #[test]
    fn test_apply_move_occupied_cell_is_ignored() {
        let (mut room, mut x, mut o) = started();
        room.apply_move(conn(1), 0).unwrap();
        drain(&mut x);
        drain(&mut o);
        let before = *room.grid();

        let result = room.apply_move(conn(2), 0);

        assert_eq!(result, Err(IllegalMove::CellOccupied(0)));
        assert_eq!(*room.grid(), before);
        assert_eq!(room.next_turn(), Marker::O);
        assert!(drain(&mut x).is_empty());
        assert!(drain(&mut o).is_empty());
    }

    #[test]
    fn test_apply_move_wrong_turn_is_ignored() {
        let (mut room, mut x, _o) = started();

        let result = room.apply_move(conn(2), 4);

        assert_eq!(result, Err(IllegalMove::NotYourTurn(Marker::X)));
        assert!(room.grid().is_empty());
        assert!(drain(&mut x).is_empty());
    }

    #[test]
    fn test_apply_move_before_opponent_arrives_is_ignored() {
        let mut room = room();
        let mut x = seat(&mut room, 1);
        drain(&mut x);

        let result = room.apply_move(conn(1), 4);

        assert_eq!(result, Err(IllegalMove::WaitingForOpponent));
        assert!(room.grid().is_empty());
        assert!(drain(&mut x).is_empty());
    }

    #[test]
    fn test_apply_move_from_stranger_is_ignored() {
        let (mut room, _x, _o) = started();
        assert_eq!(room.apply_move(conn(9), 4), Err(IllegalMove::NotSeated));
        assert!(room.grid().is_empty());
    }

    #[test]
    fn test_apply_move_off_board_is_ignored() {
        let (mut room, _x, _o) = started();
        assert_eq!(
            room.apply_move(conn(1), 9),
            Err(IllegalMove::CellOutOfRange(9))
        );
        assert_eq!(room.next_turn(), Marker::X);
    }

    #[test]
    fn test_apply_move_win_broadcasts_end_and_resets() {
        let (mut room, mut x, mut o) = started();
        for (who, index) in [(1, 0), (2, 3), (1, 1), (2, 4)] {
            room.apply_move(conn(who), index).unwrap();
        }
        drain(&mut x);
        drain(&mut o);

        let outcome = room.apply_move(conn(1), 2).unwrap();

        assert_eq!(outcome, MoveOutcome::Won(Marker::X));
        assert_eq!(drain(&mut x), vec![ServerMessage::won(Marker::X)]);
        assert_eq!(drain(&mut o), vec![ServerMessage::won(Marker::X)]);
        assert!(room.grid().is_empty());
        assert_eq!(room.next_turn(), Marker::X);
        assert_eq!(room.participant_count(), 2);
    }

    #[test]
    fn test_apply_move_draw_broadcasts_end_and_resets() {
        // X | O | X
        // X | O | X
        // O | X | O
        let (mut room, mut x, mut o) = started();
        let moves = [(1, 0), (2, 1), (1, 2), (2, 4), (1, 3), (2, 6), (1, 5), (2, 8)];
        for (who, index) in moves {
            room.apply_move(conn(who), index).unwrap();
        }
        drain(&mut x);
        drain(&mut o);

        let outcome = room.apply_move(conn(1), 7).unwrap();

        assert_eq!(outcome, MoveOutcome::Draw);
        let msgs = drain(&mut o);
        assert!(matches!(
            msgs.as_slice(),
            [ServerMessage::End {
                reason: EndReason::Draw,
                winner: None,
                ..
            }]
        ));
        assert_eq!(drain(&mut x), msgs);
        assert!(room.grid().is_empty());
        assert_eq!(room.next_turn(), Marker::X);
    }

    #[test]
    fn test_apply_move_rematch_starts_with_x() {
        let (mut room, _x, _o) = started();
        for (who, index) in [(1, 0), (2, 3), (1, 1), (2, 4), (1, 2)] {
            room.apply_move(conn(who), index).unwrap();
        }

        assert_eq!(
            room.apply_move(conn(2), 0),
            Err(IllegalMove::NotYourTurn(Marker::X))
        );
        assert!(room.apply_move(conn(1), 0).is_ok());
    }

    // =====================================================================
    // remove_participant()
    // =====================================================================

    #[test]
    fn test_remove_participant_notifies_remaining_and_resets() {
        let (mut room, _x, mut o) = started();
        room.apply_move(conn(1), 4).unwrap();
        drain(&mut o);

        let departure = room.remove_participant(conn(1));

        assert_eq!(departure, Departure::OpponentNotified);
        assert_eq!(drain(&mut o), vec![ServerMessage::opponent_disconnected()]);
        assert!(room.grid().is_empty());
        assert_eq!(room.next_turn(), Marker::X);
        assert_eq!(room.participant_count(), 1);
    }

    #[test]
    fn test_remove_participant_last_one_reports_empty() {
        let mut room = room();
        let _x = seat(&mut room, 1);

        assert_eq!(room.remove_participant(conn(1)), Departure::Empty);
        assert!(room.is_empty());
    }

    #[test]
    fn test_remove_participant_stranger_is_noop() {
        let (mut room, mut x, _o) = started();

        assert_eq!(room.remove_participant(conn(9)), Departure::NotSeated);
        assert_eq!(room.participant_count(), 2);
        assert!(drain(&mut x).is_empty());
    }

    #[test]
    fn test_broadcast_skips_closed_queue() {
        let (room, x, mut o) = started();
        drop(x);

        room.broadcast(&ServerMessage::start());

        assert_eq!(drain(&mut o), vec![ServerMessage::start()]);
        assert_eq!(room.participant_count(), 2);
    }
}
