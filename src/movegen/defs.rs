/* =======================================================================
Windmill is a chess move generator and perft engine.

Windmill is written in the Rust programming language. It generates
strictly legal moves and walks the game tree to produce perft statistics,
using concepts which are well-known and in use by most if not all
classical bitboard-based chess engines.

Windmill is free software: you can redistribute it and/or modify it under
the terms of the GNU General Public License version 3 as published by
the Free Software Foundation.

Windmill is distributed in the hope that it will be useful, but WITHOUT
ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License
for more details.

You should have received a copy of the GNU General Public License along
with this program.  If not, see <http://www.gnu.org/licenses/>.
======================================================================= */

pub use super::magics::Magic;
use crate::board::defs::{Direction, Slots};
use crate::defs::{Bitboard, NrOf, Square, EMPTY, FULL, INVALID_SQUARE};

// The non-king slots, in emission order.
pub const NON_KING_SLOTS: [usize; 7] = [
    Slots::KNIGHT1,
    Slots::KNIGHT2,
    Slots::BISHOP1,
    Slots::BISHOP2,
    Slots::ROOK1,
    Slots::ROOK2,
    Slots::QUEEN,
];

// The two slider geometries the magic tables cover. A queen is the union
// of both.
#[derive(Copy, Clone, PartialEq)]
pub enum Slider {
    Rook,
    Bishop,
}

impl Slider {
    pub const fn directions(self) -> [Direction; 4] {
        match self {
            Slider::Rook => [
                Direction::Up,
                Direction::Right,
                Direction::Down,
                Direction::Left,
            ],
            Slider::Bishop => [
                Direction::UpLeft,
                Direction::UpRight,
                Direction::DownRight,
                Direction::DownLeft,
            ],
        }
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum MoveType {
    Push,
    Capture,
    EpCapture,
    Castle,
}

// What the walker needs to know about an emitted move, besides the
// successor board itself. For castling, from and to are the king's
// squares by convention.
#[derive(Copy, Clone, Debug)]
pub struct MoveInfo {
    pub move_type: MoveType,
    pub from: Square,
    pub to: Square,
    pub is_promotion: bool,
    // The moved (or promoted) piece attacks the enemy king from its
    // destination.
    pub is_direct_check: bool,
    // Moving uncovered a check from a stationary piece behind the mover.
    pub is_discovered_check: bool,
}

impl MoveInfo {
    // The pseudo-move that "led to" the root position of a walk.
    pub fn root() -> Self {
        Self {
            move_type: MoveType::Push,
            from: INVALID_SQUARE,
            to: INVALID_SQUARE,
            is_promotion: false,
            is_direct_check: false,
            is_discovered_check: false,
        }
    }

    pub fn gives_check(&self) -> bool {
        self.is_direct_check || self.is_discovered_check
    }
}

// Pawn destination sets, one bitboard per move shape. The from-square of
// each destination is implied by the shape and the moving side.
#[derive(Copy, Clone, Default)]
pub struct PawnMoves {
    pub pushes_one: Bitboard,
    pub pushes_two: Bitboard,
    pub captures_left: Bitboard,
    pub captures_right: Bitboard,
    pub ep_left: Bitboard,
    pub ep_right: Bitboard,
}

// Squares from which each piece type would deliver check to the enemy
// king, on the current occupancy.
#[derive(Copy, Clone, Default)]
pub struct DirectChecks {
    pub pawn: Bitboard,
    pub knight: Bitboard,
    pub bishop: Bitboard,
    pub rook: Bitboard,
}

// Our pieces that shield the enemy king from one of our own sliders, by
// ray flavour, plus the special cases where set membership alone cannot
// decide: pawns (a pawn move may stay on its own shield line), the
// en-passant capture (the captured pawn can be the shield), and castling
// (the rook may check through the vacated squares).
#[derive(Copy, Clone, Default)]
pub struct DiscoveredChecks {
    pub diag_pieces: Bitboard,
    pub orthog_pieces: Bitboard,
    pub pawn_push: Bitboard,
    pub pawn_left: Bitboard,
    pub pawn_right: Bitboard,
    pub ep_left: bool,
    pub ep_right: bool,
    pub kingside_castling: bool,
    pub queenside_castling: bool,
}

// Pinned pieces and their movement rays. ray[square] is FULL for
// unpinned squares, so "moves & ray[from]" needs no branch. For a pinned
// piece the ray runs from next to the king up to and including the
// pinning slider.
#[derive(Copy, Clone)]
pub struct Pins {
    pub diag: Bitboard,
    pub orthog: Bitboard,
    pub ray: [Bitboard; NrOf::SQUARES + 1],
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            diag: EMPTY,
            orthog: EMPTY,
            ray: [FULL; NrOf::SQUARES + 1],
        }
    }
}

impl Pins {
    pub fn all(&self) -> Bitboard {
        self.diag | self.orthog
    }
}

// Everything the move generator knows about one position, bundled. The
// destination bitboards are already strictly legal; emission only has to
// walk them.
pub struct LegalMoves {
    // The side not to move is in check: the position cannot have come
    // from a legal move. Nothing else in the bundle is valid then.
    pub illegal_position: bool,

    pub n_checks: u8,
    pub checkers: Bitboard,
    pub pins: Pins,

    pub pawns: PawnMoves,
    // Destinations per slot, king included.
    pub piece_moves: [Bitboard; NrOf::PIECE_SLOTS],
    // Destinations per occupied promotion slot.
    pub promo_moves: [Bitboard; NrOf::PROMO_SLOTS],
    pub can_castle: u8,

    pub direct: DirectChecks,
    pub discovered: DiscoveredChecks,

    // Occupancy context the emitter reuses.
    pub your_pieces: Bitboard,
    pub all_pieces: Bitboard,
    pub their_king: Square,
}

impl LegalMoves {
    pub fn new() -> Self {
        Self {
            illegal_position: false,
            n_checks: 0,
            checkers: EMPTY,
            pins: Pins::default(),
            pawns: PawnMoves::default(),
            piece_moves: [EMPTY; NrOf::PIECE_SLOTS],
            promo_moves: [EMPTY; NrOf::PROMO_SLOTS],
            can_castle: 0,
            direct: DirectChecks::default(),
            discovered: DiscoveredChecks::default(),
            your_pieces: EMPTY,
            all_pieces: EMPTY,
            their_king: INVALID_SQUARE,
        }
    }
}

impl Default for LegalMoves {
    fn default() -> Self {
        Self::new()
    }
}
