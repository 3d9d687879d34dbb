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

use crate::board::defs::{PromoPiece, SQUARE_NAME};
use crate::defs::Square;

// "e4" -> 28, and so on. The index of the name is the square number. If
// the square is not found, None is returned.
pub fn algebraic_square_to_number(algebraic_square: &str) -> Option<Square> {
    SQUARE_NAME
        .iter()
        .position(|&element| element == algebraic_square)
}

pub fn promotion_piece_letter_to_kind(piece_letter: char) -> Option<PromoPiece> {
    match piece_letter.to_ascii_lowercase() {
        'q' => Some(PromoPiece::Queen),
        'r' => Some(PromoPiece::Rook),
        'b' => Some(PromoPiece::Bishop),
        'n' => Some(PromoPiece::Knight),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_names_round_trip() {
        assert_eq!(algebraic_square_to_number("a1"), Some(0));
        assert_eq!(algebraic_square_to_number("h8"), Some(63));
        assert_eq!(algebraic_square_to_number("e4"), Some(28));
        assert_eq!(algebraic_square_to_number("j9"), None);
    }

    #[test]
    fn promotion_letters() {
        assert_eq!(promotion_piece_letter_to_kind('q'), Some(PromoPiece::Queen));
        assert_eq!(promotion_piece_letter_to_kind('N'), Some(PromoPiece::Knight));
        assert_eq!(promotion_piece_letter_to_kind('k'), None);
    }
}
