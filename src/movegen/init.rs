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

use super::create;
use super::defs::{Magic, Slider};
use super::magics::{BISHOP_MAGIC_NRS, ROOK_MAGIC_NRS};
use super::{MoveGenerator, BISHOP_TABLE_SIZE, ROOK_TABLE_SIZE};
use crate::board::defs::{Direction, RangeOf, ALL_DIRECTIONS, BB_SQUARES};
use crate::defs::{Sides, EMPTY, INVALID_SQUARE};

impl MoveGenerator {
    // One step in every direction; Direction::step drops anything that
    // would leave the board. Entry 64 stays empty.
    pub(super) fn init_king(&mut self) {
        for sq in RangeOf::SQUARES {
            let bb_square = BB_SQUARES[sq];
            let mut bb_moves = EMPTY;

            for direction in ALL_DIRECTIONS {
                bb_moves |= direction.step(bb_square);
            }

            self.king[sq] = bb_moves;
        }
    }

    // A knight jump is two steps straight plus one to the side. Stepping
    // drops off-board bits at every stage, so jumps that leave the board
    // vanish on their own.
    pub(super) fn init_knight(&mut self) {
        const JUMPS: [(Direction, Direction); 8] = [
            (Direction::Up, Direction::Left),
            (Direction::Up, Direction::Right),
            (Direction::Right, Direction::Up),
            (Direction::Right, Direction::Down),
            (Direction::Down, Direction::Right),
            (Direction::Down, Direction::Left),
            (Direction::Left, Direction::Down),
            (Direction::Left, Direction::Up),
        ];

        for sq in RangeOf::SQUARES {
            let bb_square = BB_SQUARES[sq];
            let mut bb_moves = EMPTY;

            for (ahead, aside) in JUMPS {
                bb_moves |= aside.step(ahead.step(ahead.step(bb_square)));
            }

            self.knight[sq] = bb_moves;
        }
    }

    pub(super) fn init_pawns(&mut self) {
        for sq in RangeOf::SQUARES {
            self.pawns[Sides::WHITE][sq] = create::pawn_targets(Sides::WHITE, sq);
            self.pawns[Sides::BLACK][sq] = create::pawn_targets(Sides::BLACK, sq);
        }
    }

    // Full rays on an empty board, for each direction and origin.
    pub(super) fn init_rays(&mut self) {
        for direction in ALL_DIRECTIONS {
            for sq in RangeOf::SQUARES {
                self.rays[direction as usize][sq] = create::bb_ray(EMPTY, sq, direction);
            }
        }
    }

    // Fill the dense attack table from the embedded magic numbers. Every
    // blocker permutation of every square must land in its own, still
    // empty slot within the square's range; any collision or gap means a
    // corrupted magic constant, and the assertions stop the program
    // before it can generate a single wrong move. This check runs on
    // every startup, so the embedded constants are verified against the
    // ray-walk reference each time.
    pub(super) fn init_magics(&mut self, slider: Slider) {
        let is_rook = slider == Slider::Rook;
        let mut offset = 0;

        for sq in RangeOf::SQUARES {
            let mask = create::blocker_mask(slider, sq);
            let bits = mask.count_ones();
            let permutations = 2u64.pow(bits);
            let end = offset + permutations - 1;
            let blocker_boards = create::blocker_boards(mask);
            let attack_boards = create::attack_boards(slider, sq, &blocker_boards);

            let magic = Magic {
                mask,
                shift: (64 - bits) as u8,
                offset,
                nr: if is_rook {
                    ROOK_MAGIC_NRS[sq]
                } else {
                    BISHOP_MAGIC_NRS[sq]
                },
            };

            for (i, blocker) in blocker_boards.iter().enumerate() {
                let index = magic.get_index(*blocker);
                let table = if is_rook {
                    &mut self.rook[..]
                } else {
                    &mut self.bishop[..]
                };

                assert!(
                    index >= offset as usize && index <= end as usize,
                    "indexing error: magic number for square {sq} is corrupted"
                );
                assert!(
                    table[index] == EMPTY,
                    "attack table index not empty: magic number for square {sq} is corrupted"
                );
                table[index] = attack_boards[i];
            }

            if is_rook {
                self.rook_magics[sq] = magic;
            } else {
                self.bishop_magics[sq] = magic;
            }

            offset += permutations;
        }

        // A perfect hash fills its table exactly.
        let expectation = if is_rook {
            ROOK_TABLE_SIZE
        } else {
            BISHOP_TABLE_SIZE
        } as u64;
        assert!(
            offset == expectation,
            "initializing magics failed: check magic numbers"
        );

        // The sentinel square hashes every occupancy to the one empty
        // slot past the table, so absent sliders attack nothing.
        let sentinel = Magic {
            mask: EMPTY,
            shift: 0,
            offset,
            nr: 0,
        };
        if is_rook {
            self.rook_magics[INVALID_SQUARE] = sentinel;
        } else {
            self.bishop_magics[INVALID_SQUARE] = sentinel;
        }
    }
}
