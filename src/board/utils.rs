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

use super::representation::{pawns_on_legal_ranks, Board};
use crate::defs::{other, Side, Sides, EMPTY, INVALID_SQUARE};
use crate::misc::bits;
use crate::movegen::attacks;
use crate::movegen::MoveGenerator;

// Structural sanity of a position: both kings present, pawns off the
// back ranks, no square doubly occupied, at most sixteen men per side,
// and the side that is NOT to move not in check. Reachable positions
// always pass; this exists for tests and for boards built by hand.
pub fn is_valid(mg: &MoveGenerator, board: &Board, side_to_move: Side) -> bool {
    for side in [Sides::WHITE, Sides::BLACK] {
        let state = &board.sides[side];

        if state.king_square() == INVALID_SQUARE {
            return false;
        }
        if !pawns_on_legal_ranks(state.pawns) {
            return false;
        }
        // Fewer occupancy bits than men means two men share a square.
        if state.men() != bits::count(state.occupancy()) {
            return false;
        }
        if state.men() > 16 {
            return false;
        }
    }

    let white_bb = board.sides[Sides::WHITE].occupancy();
    let black_bb = board.sides[Sides::BLACK].occupancy();
    if white_bb & black_bb != EMPTY {
        return false;
    }

    let them = other(side_to_move);
    let my_bbs = attacks::piece_bbs(&board.sides[side_to_move]);
    let their_king = board.sides[them].king_square();

    mg.attackers_to(their_king, &my_bbs, side_to_move, board.occupancy()) == EMPTY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::defs::{Slots, Squares};
    use crate::board::fen;

    #[test]
    fn the_starting_position_is_valid() {
        let mg = MoveGenerator::new();
        assert!(is_valid(&mg, &Board::starting(), Sides::WHITE));
        assert!(is_valid(&mg, &Board::starting(), Sides::BLACK));
    }

    #[test]
    fn a_board_with_the_wrong_side_in_check_is_invalid() {
        let mg = MoveGenerator::new();
        // White queen gives check, but it is White's move.
        let (board, _) =
            fen::read("4k3/4Q3/8/8/8/8/8/4K3 w - - 0 1").expect("must parse");

        assert!(!is_valid(&mg, &board, Sides::WHITE));
        assert!(is_valid(&mg, &board, Sides::BLACK));
    }

    #[test]
    fn overlapping_men_are_invalid() {
        let mg = MoveGenerator::new();
        let mut board = Board::starting();
        // Park a white knight on a white pawn.
        board.sides[Sides::WHITE].piece_squares[Slots::KNIGHT1] = Squares::E1 + 8;

        assert!(!is_valid(&mg, &board, Sides::WHITE));

        let mut board = Board::starting();
        // Park a black knight on a white pawn.
        board.sides[Sides::BLACK].piece_squares[Slots::KNIGHT1] = Squares::E1 + 8;

        assert!(!is_valid(&mg, &board, Sides::WHITE));
    }
}
