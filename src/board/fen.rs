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

// fen.rs reads an FEN-string and converts it into a board plus the side
// to move, and writes a board back out as FEN. Parsing fails on anything
// structurally, lexically or semantically wrong; the move generator never
// sees a board this module rejected.
//
// Physical pieces are tied to positional slots with this rule: per piece
// type, squares on the side's home rank (scanned from the a-file) claim
// the numbered slots first, then any remaining squares in board order.
// Pieces beyond the slot count go into the promotion arena, so a position
// with three knights parses into two slot knights plus a promoted knight.

use super::defs::{
    home_offset, home_rank, rank_of, Castling, PromoPiece, PromoSlot, Slots, Squares,
    BB_SQUARES,
};
use super::representation::{
    ep_rank, pawns_on_legal_ranks, Board, ColorState,
};
use crate::defs::{
    other, Bitboard, NrOf, Side, Sides, Square, INVALID_SQUARE, MAX_GAME_MOVES, MAX_MOVE_RULE,
};
use crate::misc::{bits, parse};
use if_chain::if_chain;
use smallvec::SmallVec;
use std::fmt;

const NR_OF_FEN_PARTS: usize = 6;
const SHORT_FEN_PARTS: usize = 4;
const CASTLING_RIGHTS: &str = "KQkq-";
const SPLITTER: char = '/';
const DASH: char = '-';
const EM_DASH: char = '–';

// Squares of one piece type, collected during parsing. Ten covers the
// theoretical worst case of two slot pieces plus eight promotions.
type SquareList = SmallVec<[Square; 10]>;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum FenError {
    PartCount,
    PiecePlacement,
    Color,
    Castling,
    EnPassant,
    HalfmoveClock,
    FullmoveNumber,
    KingCount,
    PawnOnBackRank,
    TooManyPieces,
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let explanation = match self {
            Self::PartCount => "must have 4 or 6 parts",
            Self::PiecePlacement => "pieces and squares incorrect",
            Self::Color => "color selection incorrect",
            Self::Castling => "castling rights incorrect",
            Self::EnPassant => "en-passant square incorrect",
            Self::HalfmoveClock => "half-move clock incorrect",
            Self::FullmoveNumber => "full-move number incorrect",
            Self::KingCount => "each side must have exactly one king",
            Self::PawnOnBackRank => "pawns can not stand on rank 1 or 8",
            Self::TooManyPieces => "too many pieces for one side",
        };
        write!(f, "FEN: {explanation}")
    }
}

pub type FenResult = Result<(Board, Side), FenError>;

// ===== Reading ===== //

pub fn read(fen_string: &str) -> FenResult {
    let mut parts: Vec<String> = fen_string
        .replace(EM_DASH, "-")
        .split_whitespace()
        .map(String::from)
        .collect();

    // The clock fields are optional; fill in the defaults if absent.
    if parts.len() == SHORT_FEN_PARTS {
        parts.push(String::from("0"));
        parts.push(String::from("1"));
    }

    if parts.len() != NR_OF_FEN_PARTS {
        return Err(FenError::PartCount);
    }

    let side_to_move = color(&parts[1])?;
    let mut board = Board::empty();

    pieces(&mut board, &parts[0])?;
    castling(&mut board, &parts[2])?;
    ep(&mut board, side_to_move, &parts[3])?;
    hmc(&parts[4])?;
    fmn(&parts[5])?;

    Ok((board, side_to_move))
}

// Part 1: piece placement. Collect the squares per side and piece type
// first; slot assignment needs them all before it can begin.
fn pieces(board: &mut Board, part: &str) -> Result<(), FenError> {
    #[derive(Default)]
    struct Collected {
        pawns: Bitboard,
        kings: SquareList,
        queens: SquareList,
        rooks: SquareList,
        bishops: SquareList,
        knights: SquareList,
    }

    let mut collected: [Collected; Sides::BOTH] = [Collected::default(), Collected::default()];
    let mut rank = 7usize;
    let mut file = 0usize;

    for c in part.chars() {
        match c {
            SPLITTER => {
                if file != NrOf::FILES || rank == 0 {
                    return Err(FenError::PiecePlacement);
                }
                rank -= 1;
                file = 0;
            }
            '1'..='8' => {
                file += c as usize - '0' as usize;
                if file > NrOf::FILES {
                    return Err(FenError::PiecePlacement);
                }
            }
            _ => {
                if file >= NrOf::FILES {
                    return Err(FenError::PiecePlacement);
                }
                let square = rank * NrOf::FILES + file;
                let side = if c.is_ascii_uppercase() {
                    Sides::WHITE
                } else {
                    Sides::BLACK
                };
                let for_side = &mut collected[side];

                match c.to_ascii_lowercase() {
                    'p' => for_side.pawns |= BB_SQUARES[square],
                    'n' => for_side.knights.push(square),
                    'b' => for_side.bishops.push(square),
                    'r' => for_side.rooks.push(square),
                    'q' => for_side.queens.push(square),
                    'k' => for_side.kings.push(square),
                    _ => return Err(FenError::PiecePlacement),
                }
                file += 1;
            }
        }
    }

    if rank != 0 || file != NrOf::FILES {
        return Err(FenError::PiecePlacement);
    }

    for side in [Sides::WHITE, Sides::BLACK] {
        let c = &mut collected[side];
        let state = &mut board.sides[side];

        if c.kings.len() != 1 {
            return Err(FenError::KingCount);
        }
        state.piece_squares[Slots::KING] = c.kings[0];

        state.pawns = c.pawns;
        if !pawns_on_legal_ranks(state.pawns) {
            return Err(FenError::PawnOnBackRank);
        }

        assign_pair(state, &mut c.knights, side, Slots::KNIGHT1, Slots::KNIGHT2, PromoPiece::Knight)?;
        assign_pair(state, &mut c.bishops, side, Slots::BISHOP1, Slots::BISHOP2, PromoPiece::Bishop)?;
        assign_pair(state, &mut c.rooks, side, Slots::ROOK1, Slots::ROOK2, PromoPiece::Rook)?;

        sort_home_rank_first(&mut c.queens, side);
        let mut queens = c.queens.iter();
        if let Some(&square) = queens.next() {
            state.piece_squares[Slots::QUEEN] = square;
        }
        for &square in queens {
            add_promo(state, PromoPiece::Queen, square)?;
        }

        if state.men() > 16 {
            return Err(FenError::TooManyPieces);
        }
    }

    Ok(())
}

// Home-rank squares come first (by file), which makes them claim the
// numbered slots; off-rank pieces follow in board order.
fn sort_home_rank_first(list: &mut SquareList, side: Side) {
    let home = home_rank(side);
    list.sort_unstable_by_key(|&square| ((rank_of(square) != home) as usize, square));
}

fn assign_pair(
    state: &mut ColorState,
    list: &mut SquareList,
    side: Side,
    slot1: usize,
    slot2: usize,
    kind: PromoPiece,
) -> Result<(), FenError> {
    sort_home_rank_first(list, side);

    let mut iter = list.iter();
    if let Some(&square) = iter.next() {
        state.piece_squares[slot1] = square;
    }
    if let Some(&square) = iter.next() {
        state.piece_squares[slot2] = square;
    }
    for &square in iter {
        add_promo(state, kind, square)?;
    }

    Ok(())
}

fn add_promo(state: &mut ColorState, kind: PromoPiece, square: Square) -> Result<(), FenError> {
    let index = bits::lsb(!(state.active_promos as u64) & 0xFF);

    if index >= NrOf::PROMO_SLOTS {
        return Err(FenError::TooManyPieces);
    }
    state.active_promos |= 1u8 << index;
    state.promos[index] = PromoSlot { kind, square };

    Ok(())
}

// Part 2: the color to move.
fn color(part: &str) -> Result<Side, FenError> {
    let mut result = Err(FenError::Color);

    if_chain! {
        if part.len() == 1;
        if let Some(c) = part.chars().next();
        then {
            match c {
                'w' => result = Ok(Sides::WHITE),
                'b' => result = Ok(Sides::BLACK),
                _ => (),
            }
        }
    }

    result
}

// Part 3: castling rights. A right is only accepted when the king and
// the matching rook actually stand on their home squares.
fn castling(board: &mut Board, part: &str) -> Result<(), FenError> {
    if part.is_empty() || part.len() > 4 {
        return Err(FenError::Castling);
    }

    for c in part.chars() {
        if !CASTLING_RIGHTS.contains(c) {
            return Err(FenError::Castling);
        }

        let (side, right) = match c {
            'K' => (Sides::WHITE, Castling::KINGSIDE),
            'Q' => (Sides::WHITE, Castling::QUEENSIDE),
            'k' => (Sides::BLACK, Castling::KINGSIDE),
            'q' => (Sides::BLACK, Castling::QUEENSIDE),
            _ => {
                if part.len() != 1 {
                    return Err(FenError::Castling);
                }
                return Ok(());
            }
        };

        if !right_is_consistent(board, side, right) {
            return Err(FenError::Castling);
        }
        board.sides[side].castling |= right;
    }

    Ok(())
}

fn right_is_consistent(board: &Board, side: Side, right: u8) -> bool {
    let offset = home_offset(side);
    let state = &board.sides[side];
    let rook_home = if right == Castling::KINGSIDE {
        Squares::H1 + offset
    } else {
        Squares::A1 + offset
    };

    state.king_square() == Squares::E1 + offset
        && (state.piece_squares[Slots::ROOK1] == rook_home
            || state.piece_squares[Slots::ROOK2] == rook_home)
}

// Part 4: the en-passant square. It describes the double push the side
// NOT to move just made, so it is stored in that side's state, on that
// side's en-passant rank.
fn ep(board: &mut Board, side_to_move: Side, part: &str) -> Result<(), FenError> {
    if part.len() == 1 {
        return if part.starts_with(DASH) {
            Ok(())
        } else {
            Err(FenError::EnPassant)
        };
    }

    let pushing_side = other(side_to_move);
    let mut result = Err(FenError::EnPassant);

    if_chain! {
        if part.len() == 2;
        if let Some(square) = parse::algebraic_square_to_number(part);
        if rank_of(square) == ep_rank(pushing_side);
        then {
            board.sides[pushing_side].en_passant = square;
            result = Ok(());
        }
    }

    result
}

// Part 5: the half-move clock. Validated, but a board carries no clocks,
// so the value is discarded.
fn hmc(part: &str) -> Result<(), FenError> {
    let mut result = Err(FenError::HalfmoveClock);

    if_chain! {
        if part.len() == 1 || part.len() == 2 || part.len() == 3;
        if let Ok(value) = part.parse::<u8>();
        if value <= MAX_MOVE_RULE;
        then {
            result = Ok(());
        }
    }

    result
}

// Part 6: the full-move number. Also validated and discarded.
fn fmn(part: &str) -> Result<(), FenError> {
    let mut result = Err(FenError::FullmoveNumber);

    if_chain! {
        if !part.is_empty() && part.len() <= 4;
        if let Ok(value) = part.parse::<u16>();
        if value <= MAX_GAME_MOVES;
        then {
            result = Ok(());
        }
    }

    result
}

// ===== Writing ===== //

// The inverse of read(). The clock fields are normalised to "0 1".
pub fn write(board: &Board, side_to_move: Side) -> String {
    let ascii = super::display::char_board(board);
    let mut result = String::from("");

    for rank in (0..NrOf::RANKS).rev() {
        let mut empty = 0;

        for file in 0..NrOf::FILES {
            let piece = ascii[rank * NrOf::FILES + file];
            if piece == '.' {
                empty += 1;
            } else {
                if empty > 0 {
                    result += &empty.to_string();
                    empty = 0;
                }
                result.push(piece);
            }
        }

        if empty > 0 {
            result += &empty.to_string();
        }
        if rank > 0 {
            result.push(SPLITTER);
        }
    }

    result.push(' ');
    result.push(if side_to_move == Sides::WHITE { 'w' } else { 'b' });
    result.push(' ');
    result += &board.castling_as_string();
    result.push(' ');

    let ep_square = board.sides[other(side_to_move)].en_passant;
    if ep_square == INVALID_SQUARE {
        result.push(DASH);
    } else {
        result += super::defs::SQUARE_NAME[ep_square];
    }

    result += " 0 1";
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::{FEN_KIWIPETE_POSITION, FEN_START_POSITION};

    #[test]
    fn starting_position_parses_to_the_starting_board() {
        let (board, side) = read(FEN_START_POSITION).expect("startpos must parse");
        assert_eq!(side, Sides::WHITE);
        assert!(board == Board::starting());
    }

    #[test]
    fn four_part_fen_is_accepted() {
        let (board, _) = read("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -")
            .expect("short FEN must parse");
        assert!(board == Board::starting());
    }

    #[test]
    fn round_trips() {
        let fens = [
            FEN_START_POSITION,
            FEN_KIWIPETE_POSITION,
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RqK b kq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        ];

        for fen in fens {
            let (board, side) = read(fen).expect("suite FEN must parse");
            let written = write(&board, side);
            let original: Vec<&str> = fen.split_whitespace().collect();
            let produced: Vec<&str> = written.split_whitespace().collect();
            assert_eq!(&produced[0..4], &original[0..4], "round trip failed: {fen}");
        }
    }

    #[test]
    fn ep_square_lands_in_the_pushing_sides_state() {
        let (board, side) =
            read("rnbqkbnr/pppp1ppp/8/8/4p3/8/PPPPPPPP/RNBQKBNR w - e3 0 1").expect("must parse");
        // Hypothetical position: the e3 target belongs to Black's own
        // double push, so it is stored with Black, the side not to move.
        assert_eq!(side, Sides::WHITE);
        assert_eq!(board.sides[Sides::BLACK].en_passant, 20);
        assert_eq!(board.sides[Sides::WHITE].en_passant, INVALID_SQUARE);
    }

    #[test]
    fn extra_pieces_enter_the_promotion_arena() {
        // Position 4 has two black queens: g1 sits lower than a3, so g1
        // takes the queen slot and a3 becomes a promoted queen.
        let (board, _) =
            read("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RqK b kq - 0 1")
                .expect("must parse");
        let black = &board.sides[Sides::BLACK];

        assert_eq!(black.piece_squares[Slots::QUEEN], Squares::G1);
        assert_eq!(black.active_promos, 0b0000_0001);
        assert_eq!(black.promos[0].kind, PromoPiece::Queen);
        assert_eq!(black.promos[0].square, 16); // a3
    }

    #[test]
    fn structural_and_semantic_errors_are_rejected() {
        // Structural: five parts.
        assert_eq!(
            read("8/8/8/8/8/8/8/8 w - - 0").unwrap_err(),
            FenError::PartCount
        );
        // Lexical: bad piece letter.
        assert_eq!(
            read("xnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap_err(),
            FenError::PiecePlacement
        );
        // Rank with nine squares.
        assert_eq!(
            read("9/8/8/8/8/8/8/8 w - - 0 1").unwrap_err(),
            FenError::PiecePlacement
        );
        // Missing kings.
        assert_eq!(
            read("8/8/8/8/8/8/8/8 w - - 0 1").unwrap_err(),
            FenError::KingCount
        );
        // Two white kings.
        assert_eq!(
            read("4k3/8/8/8/8/8/8/KK6 w - - 0 1").unwrap_err(),
            FenError::KingCount
        );
        // Pawn on its promotion rank.
        assert_eq!(
            read("P3k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap_err(),
            FenError::PawnOnBackRank
        );
        // Castling right without the rook at home.
        assert_eq!(
            read("4k3/8/8/8/8/8/8/4K3 w K - 0 1").unwrap_err(),
            FenError::Castling
        );
        // En-passant square on a wrong rank.
        assert_eq!(
            read("4k3/8/8/8/8/8/8/4K3 w - e5 0 1").unwrap_err(),
            FenError::EnPassant
        );
        // Bad color.
        assert_eq!(
            read("4k3/8/8/8/8/8/8/4K3 x - - 0 1").unwrap_err(),
            FenError::Color
        );
    }
}
