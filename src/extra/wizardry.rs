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

// wizardry.rs finds magic numbers. It is not needed to run the engine;
// the numbers it found are embedded in movegen::magics. It stays
// compiled in behind the --wizardry flag so the tables can be
// regenerated if they are ever corrupted.

use crate::board::defs::{RangeOf, SQUARE_NAME};
use crate::defs::{Bitboard, Square, EMPTY};
use crate::movegen::create;
use crate::movegen::defs::{Magic, Slider};
use crate::movegen::{BISHOP_TABLE_SIZE, ROOK_TABLE_SIZE};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

// Random search for a perfect-hash multiplier per square: try sparse
// random numbers until one indexes every blocker permutation of the
// square without a collision, then print it in table-ready form.
pub fn find_magics(slider: Slider) {
    let is_rook = slider == Slider::Rook;
    let mut rook_table: Vec<Bitboard> = vec![EMPTY; ROOK_TABLE_SIZE];
    let mut bishop_table: Vec<Bitboard> = vec![EMPTY; BISHOP_TABLE_SIZE];
    let mut random = ChaChaRng::from_entropy();
    let mut offset = 0;

    println!(
        "Finding magics for: {}",
        if is_rook { "Rook" } else { "Bishop" }
    );

    for sq in RangeOf::SQUARES {
        let mask = create::blocker_mask(slider, sq);
        let bits = mask.count_ones();
        let permutations = 2u64.pow(bits);
        let end = offset + permutations - 1;
        let blocker_boards = create::blocker_boards(mask);
        let attack_boards = create::attack_boards(slider, sq, &blocker_boards);

        let mut try_this = Magic {
            mask,
            shift: (64 - bits) as u8,
            offset,
            nr: 0,
        };
        let mut found = false;
        let mut attempts = 0;

        while !found {
            attempts += 1;
            found = true;

            // Sparse candidates work best: AND three randoms together.
            try_this.nr = random.gen::<u64>() & random.gen::<u64>() & random.gen::<u64>();

            for (i, blocker) in blocker_boards.iter().enumerate() {
                let index = try_this.get_index(*blocker);
                let table = if is_rook {
                    &mut rook_table[..]
                } else {
                    &mut bishop_table[..]
                };

                if table[index] == EMPTY {
                    let fail_low = index < offset as usize;
                    let fail_high = index > end as usize;
                    assert!(!fail_low && !fail_high, "indexing error");
                    table[index] = attack_boards[i];
                } else {
                    // Collision: wipe this square's slice and try the
                    // next candidate.
                    for wipe_index in offset..=end {
                        table[wipe_index as usize] = EMPTY;
                    }
                    found = false;
                    break;
                }
            }
        }

        found_magic(sq, &try_this, offset, end, attempts);
        offset += permutations;
    }

    let expected = if is_rook {
        ROOK_TABLE_SIZE
    } else {
        BISHOP_TABLE_SIZE
    } as u64;
    assert!(
        offset == expected,
        "creating magics failed: permutations were skipped"
    );
}

fn found_magic(square: Square, m: &Magic, offset: u64, end: u64, attempts: u64) {
    println!(
        "{}: {:24}u64 (offset: {:6}, end: {:6}, attempts: {})",
        SQUARE_NAME[square], m.nr, offset, end, attempts
    );
}
