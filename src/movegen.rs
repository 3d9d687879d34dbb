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

// The MoveGenerator owns every precomputed table: king and knight
// attacks, pawn capture targets per side, the eight ray tables, and the
// dense magic attack tables for the sliders. All tables have a zeroed
// sentinel row (or slot) for INVALID_SQUARE, so an absent piece never
// attacks anything and never reads out of bounds. The tables are built
// once at startup and are read-only afterwards.

pub mod attacks;
pub mod create;
pub mod defs;
mod init;
mod legal;
pub mod makemove;
mod magics;

use crate::board::defs::{Direction, ALL_DIRECTIONS, BB_SQUARES};
use crate::defs::{Bitboard, NrOf, Side, Sides, Square, EMPTY};
use defs::Magic;

// These are the exact sizes needed for the rook and bishop attack
// boards: the sum over all squares of 2^(mask bits). One extra slot at
// the end stays empty and serves the sentinel square.
pub const ROOK_TABLE_SIZE: usize = 102_400;
pub const BISHOP_TABLE_SIZE: usize = 5_248;

type SquareTable = [Bitboard; NrOf::SQUARES + 1];

pub struct MoveGenerator {
    king: SquareTable,
    knight: SquareTable,
    pawns: [SquareTable; Sides::BOTH],
    rays: [SquareTable; NrOf::DIRECTIONS],
    rook: Vec<Bitboard>,
    bishop: Vec<Bitboard>,
    rook_magics: [Magic; NrOf::SQUARES + 1],
    bishop_magics: [Magic; NrOf::SQUARES + 1],
}

impl MoveGenerator {
    pub fn new() -> Self {
        let magic: Magic = Default::default();
        let mut mg = Self {
            king: [EMPTY; NrOf::SQUARES + 1],
            knight: [EMPTY; NrOf::SQUARES + 1],
            pawns: [[EMPTY; NrOf::SQUARES + 1]; Sides::BOTH],
            rays: [[EMPTY; NrOf::SQUARES + 1]; NrOf::DIRECTIONS],
            rook: vec![EMPTY; ROOK_TABLE_SIZE + 1],
            bishop: vec![EMPTY; BISHOP_TABLE_SIZE + 1],
            rook_magics: [magic; NrOf::SQUARES + 1],
            bishop_magics: [magic; NrOf::SQUARES + 1],
        };

        mg.init_king();
        mg.init_knight();
        mg.init_pawns();
        mg.init_rays();
        mg.init_magics(defs::Slider::Rook);
        mg.init_magics(defs::Slider::Bishop);

        mg
    }

    pub fn king_attacks(&self, square: Square) -> Bitboard {
        self.king[square]
    }

    pub fn knight_attacks(&self, square: Square) -> Bitboard {
        self.knight[square]
    }

    // The capture targets of a pawn of `side` standing on `square`. Also
    // usable in reverse: the squares from which a pawn of the OTHER side
    // would attack `square`.
    pub fn pawn_attacks(&self, side: Side, square: Square) -> Bitboard {
        self.pawns[side][square]
    }

    pub fn rook_attacks(&self, square: Square, occupancy: Bitboard) -> Bitboard {
        let index = self.rook_magics[square].get_index(occupancy);
        self.rook[index]
    }

    pub fn bishop_attacks(&self, square: Square, occupancy: Bitboard) -> Bitboard {
        let index = self.bishop_magics[square].get_index(occupancy);
        self.bishop[index]
    }

    pub fn queen_attacks(&self, square: Square, occupancy: Bitboard) -> Bitboard {
        self.rook_attacks(square, occupancy) | self.bishop_attacks(square, occupancy)
    }

    // Squares strictly beyond `square` in the given direction, on an
    // empty board.
    pub fn ray(&self, direction: Direction, square: Square) -> Bitboard {
        self.rays[direction as usize][square]
    }

    // Squares strictly between two squares on a shared rank, file or
    // diagonal; empty when the squares are not aligned.
    pub fn between(&self, from: Square, to: Square) -> Bitboard {
        let bb_to = BB_SQUARES[to];

        for direction in ALL_DIRECTIONS {
            let ray = self.ray(direction, from);
            if ray & bb_to > 0 {
                return ray & !self.ray(direction, to) & !bb_to;
            }
        }

        EMPTY
    }

    // The full line through two aligned squares, both endpoints
    // included, spanning the whole board; empty when not aligned. A
    // piece shielding a slider keeps shielding exactly as long as it
    // stays on this line.
    pub fn line(&self, from: Square, to: Square) -> Bitboard {
        let bb_to = BB_SQUARES[to];

        for direction in ALL_DIRECTIONS {
            let ray = self.ray(direction, from);
            if ray & bb_to > 0 {
                return ray
                    | self.ray(direction.opposite(), from)
                    | BB_SQUARES[from];
            }
        }

        EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::INVALID_SQUARE;

    #[test]
    fn sentinel_square_attacks_nothing() {
        let mg = MoveGenerator::new();

        assert_eq!(mg.king_attacks(INVALID_SQUARE), EMPTY);
        assert_eq!(mg.knight_attacks(INVALID_SQUARE), EMPTY);
        assert_eq!(mg.pawn_attacks(Sides::WHITE, INVALID_SQUARE), EMPTY);
        assert_eq!(mg.pawn_attacks(Sides::BLACK, INVALID_SQUARE), EMPTY);
        assert_eq!(mg.rook_attacks(INVALID_SQUARE, EMPTY), EMPTY);
        assert_eq!(mg.rook_attacks(INVALID_SQUARE, !EMPTY), EMPTY);
        assert_eq!(mg.bishop_attacks(INVALID_SQUARE, 0xDEAD_BEEF), EMPTY);
        assert_eq!(mg.queen_attacks(INVALID_SQUARE, EMPTY), EMPTY);
    }

    #[test]
    fn between_and_line() {
        let mg = MoveGenerator::new();

        // e1 (4) to e8 (60): the e-file in between.
        assert_eq!(
            mg.between(4, 60),
            BB_SQUARES[12] | BB_SQUARES[20] | BB_SQUARES[28] | BB_SQUARES[36] | BB_SQUARES[44] | BB_SQUARES[52]
        );
        // Adjacent and unaligned squares have nothing in between.
        assert_eq!(mg.between(4, 12), EMPTY);
        assert_eq!(mg.between(0, 12), EMPTY);

        // The line through b2 (9) and c3 (18) is the whole long diagonal.
        let diagonal = mg.line(9, 18);
        assert_eq!(
            diagonal,
            BB_SQUARES[0] | BB_SQUARES[9] | BB_SQUARES[18] | BB_SQUARES[27] | BB_SQUARES[36]
                | BB_SQUARES[45] | BB_SQUARES[54] | BB_SQUARES[63]
        );
        assert_eq!(mg.line(0, 10), EMPTY);
    }

    #[test]
    fn slider_attacks_match_the_ray_walk_reference() {
        use super::create;
        use super::defs::Slider;

        let mg = MoveGenerator::new();

        for slider in [Slider::Rook, Slider::Bishop] {
            for square in 0..NrOf::SQUARES {
                let mask = create::blocker_mask(slider, square);
                let blockers = create::blocker_boards(mask);
                let expected = create::attack_boards(slider, square, &blockers);

                for (blocker, want) in blockers.iter().zip(expected.iter()) {
                    let got = match slider {
                        Slider::Rook => mg.rook_attacks(square, *blocker),
                        Slider::Bishop => mg.bishop_attacks(square, *blocker),
                    };
                    assert_eq!(got, *want, "square {square}");
                }
            }
        }
    }
}
