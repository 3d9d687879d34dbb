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

// legal.rs produces the LegalMoves bundle: strictly legal destination
// sets for every man of the side to move, plus the check and discovery
// annotations the walker classifies leaves with. The pipeline is:
//
//   1. occupancies and the pieces checking our king
//   2. pins (x-ray from our king), one movement ray per pinned piece
//   3. the evasion move mask (everything / block-or-capture / nothing)
//   4. pawn sets, piece sets, promo sets, all restricted by mask and ray
//   5. en-passant, validated by simulating the two-pawn removal
//   6. king moves against enemy attacks computed with our king lifted
//   7. castling, with path emptiness and attack checks
//   8. direct-check squares and discovery shields for the annotations
//
// Double check skips 4, 5 and 7: only the king may move.

use super::attacks::{self, PieceBbs};
use super::defs::{LegalMoves, Pins, NON_KING_SLOTS};
use super::MoveGenerator;
use crate::board::defs::{home_offset, Castling, Slots, Squares, BB_SQUARES};
use crate::board::{Board, ColorState};
use crate::defs::{other, Bitboard, Side, Square, EMPTY, FULL, INVALID_SQUARE};
use crate::misc::bits;

impl MoveGenerator {
    pub fn gen_legal_moves(&self, board: &Board, us: Side) -> LegalMoves {
        let them = other(us);
        let my_state = &board.sides[us];
        let your_state = &board.sides[them];
        let my_bbs = attacks::piece_bbs(my_state);
        let your_bbs = attacks::piece_bbs(your_state);
        let all_pieces = my_bbs.all | your_bbs.all;
        let king_square = my_state.king_square();

        let mut lm = LegalMoves::new();
        lm.your_pieces = your_bbs.all;
        lm.all_pieces = all_pieces;
        lm.their_king = your_state.king_square();

        // If the side that just moved is still in check, an illegal move
        // slipped through upstream. Report instead of generating.
        if self.attackers_to(lm.their_king, &my_bbs, us, all_pieces) != EMPTY {
            lm.illegal_position = true;
            return lm;
        }

        lm.checkers = self.attackers_to(king_square, &your_bbs, them, all_pieces);
        lm.n_checks = bits::count(lm.checkers);

        self.find_pins(king_square, &my_bbs, &your_bbs, all_pieces, &mut lm.pins);

        let move_mask = match lm.n_checks {
            0 => FULL,
            1 => lm.checkers | self.between(king_square, bits::lsb(lm.checkers)),
            _ => EMPTY,
        };

        self.direct_checks(them, all_pieces, &mut lm);
        self.discovered_checks(us, &my_bbs, all_pieces, &mut lm);

        if lm.n_checks < 2 {
            self.pawn_moves(board, us, &my_bbs, &your_bbs, all_pieces, move_mask, &mut lm);
            self.piece_moves(my_state, &my_bbs, all_pieces, move_mask, &mut lm);
            self.castling(my_state, us, your_state, all_pieces, &mut lm);
        }

        self.king_moves(us, king_square, your_state, &my_bbs, all_pieces, &mut lm);

        lm
    }

    // X-ray from our king: attack once with the real occupancy, again
    // with our first blockers lifted, and the difference shows the enemy
    // sliders that would hit the king but for exactly one of our men.
    // That man is pinned to the ray between king and pinner.
    fn find_pins(
        &self,
        king_square: Square,
        my_bbs: &PieceBbs,
        your_bbs: &PieceBbs,
        all_pieces: Bitboard,
        pins: &mut Pins,
    ) {
        let orthog_attacks = self.rook_attacks(king_square, all_pieces);
        let orthog_blockers = orthog_attacks & my_bbs.all;
        let orthog_xray =
            orthog_attacks ^ self.rook_attacks(king_square, all_pieces ^ orthog_blockers);
        let mut pinners = orthog_xray & your_bbs.orthog;
        while pinners > 0 {
            let pinner = bits::next(&mut pinners);
            let ray = self.between(king_square, pinner);
            let pinned = ray & my_bbs.all;
            debug_assert_eq!(bits::count(pinned), 1);
            pins.orthog |= pinned;
            pins.ray[bits::lsb(pinned)] = ray | BB_SQUARES[pinner];
        }

        let diag_attacks = self.bishop_attacks(king_square, all_pieces);
        let diag_blockers = diag_attacks & my_bbs.all;
        let diag_xray =
            diag_attacks ^ self.bishop_attacks(king_square, all_pieces ^ diag_blockers);
        let mut pinners = diag_xray & your_bbs.diag;
        while pinners > 0 {
            let pinner = bits::next(&mut pinners);
            let ray = self.between(king_square, pinner);
            let pinned = ray & my_bbs.all;
            debug_assert_eq!(bits::count(pinned), 1);
            pins.diag |= pinned;
            pins.ray[bits::lsb(pinned)] = ray | BB_SQUARES[pinner];
        }
    }

    // The squares a piece of each type would check the enemy king from,
    // on the current occupancy. A move landing in the matching set is a
    // direct check.
    fn direct_checks(&self, them: Side, all_pieces: Bitboard, lm: &mut LegalMoves) {
        lm.direct.pawn = self.pawn_attacks(them, lm.their_king);
        lm.direct.knight = self.knight_attacks(lm.their_king);
        lm.direct.bishop = self.bishop_attacks(lm.their_king, all_pieces);
        lm.direct.rook = self.rook_attacks(lm.their_king, all_pieces);
    }

    // Our men shielding the enemy king from one of our own sliders,
    // found by x-raying from the enemy king. A shield piece discovers
    // check when it leaves its shield line. For pawns the line test is
    // folded in here, per move shape, so emission stays a mask lookup.
    fn discovered_checks(
        &self,
        us: Side,
        my_bbs: &PieceBbs,
        all_pieces: Bitboard,
        lm: &mut LegalMoves,
    ) {
        let their_king = lm.their_king;

        let orthog_attacks = self.rook_attacks(their_king, all_pieces);
        let orthog_blockers = orthog_attacks & my_bbs.all;
        let orthog_xray =
            orthog_attacks ^ self.rook_attacks(their_king, all_pieces ^ orthog_blockers);
        let mut sliders = orthog_xray & my_bbs.orthog;
        while sliders > 0 {
            let slider = bits::next(&mut sliders);
            lm.discovered.orthog_pieces |= self.between(their_king, slider) & my_bbs.all;
        }

        let diag_attacks = self.bishop_attacks(their_king, all_pieces);
        let diag_blockers = diag_attacks & my_bbs.all;
        let diag_xray =
            diag_attacks ^ self.bishop_attacks(their_king, all_pieces ^ diag_blockers);
        let mut sliders = diag_xray & my_bbs.diag;
        while sliders > 0 {
            let slider = bits::next(&mut sliders);
            lm.discovered.diag_pieces |= self.between(their_king, slider) & my_bbs.all;
        }

        let mut shield_pawns =
            (lm.discovered.diag_pieces | lm.discovered.orthog_pieces) & my_bbs.pawns;
        while shield_pawns > 0 {
            let pawn = bits::next(&mut shield_pawns);
            let bb_pawn = BB_SQUARES[pawn];
            let shield_line = self.line(their_king, pawn);

            // The push target is taken geometrically; whether the push
            // is playable is decided elsewhere, the mask is only read
            // for moves that are.
            if attacks::pawns_push_one(us, bb_pawn, EMPTY) & shield_line == EMPTY {
                lm.discovered.pawn_push |= bb_pawn;
            }
            if attacks::pawns_left_attacks(us, bb_pawn) & shield_line == EMPTY {
                lm.discovered.pawn_left |= bb_pawn;
            }
            if attacks::pawns_right_attacks(us, bb_pawn) & shield_line == EMPTY {
                lm.discovered.pawn_right |= bb_pawn;
            }
        }
    }

    fn pawn_moves(
        &self,
        board: &Board,
        us: Side,
        my_bbs: &PieceBbs,
        your_bbs: &PieceBbs,
        all_pieces: Bitboard,
        move_mask: Bitboard,
        lm: &mut LegalMoves,
    ) {
        let my_state = &board.sides[us];
        let pinned = lm.pins.all();
        let free_pawns = my_state.pawns & !pinned;

        let mut one = attacks::pawns_push_one(us, free_pawns, all_pieces);
        let mut two = attacks::pawns_push_two(us, one, all_pieces);
        let mut left = attacks::pawns_left_attacks(us, free_pawns);
        let mut right = attacks::pawns_right_attacks(us, free_pawns);

        // Pinned pawns go one by one: each contribution is clipped to
        // its own pin ray.
        let mut pinned_pawns = my_state.pawns & pinned;
        while pinned_pawns > 0 {
            let square = bits::next(&mut pinned_pawns);
            let ray = lm.pins.ray[square];
            let bb_pawn = BB_SQUARES[square];
            let single = attacks::pawns_push_one(us, bb_pawn, all_pieces) & ray;

            one |= single;
            two |= attacks::pawns_push_two(us, single, all_pieces) & ray;
            left |= attacks::pawns_left_attacks(us, bb_pawn) & ray;
            right |= attacks::pawns_right_attacks(us, bb_pawn) & ray;
        }

        lm.pawns.pushes_one = one & move_mask;
        lm.pawns.pushes_two = two & move_mask;
        lm.pawns.captures_left = left & your_bbs.all & move_mask;
        lm.pawns.captures_right = right & your_bbs.all & move_mask;

        // En passant. The capture square differs from the destination,
        // so the usual masks do not apply; instead the capture is
        // simulated and the king checked directly. That covers the
        // rank-pin through both disappearing pawns in one go. While the
        // simulated occupancy is at hand, the discovery flag for the
        // enemy king is computed from it as well.
        let ep_square = board.sides[other(us)].en_passant;
        if ep_square == INVALID_SQUARE {
            return;
        }

        let bb_ep = BB_SQUARES[ep_square];
        let capture_square = attacks::pawn_push_from(us, ep_square);
        let bb_captured = BB_SQUARES[capture_square];

        // In check, the capture must itself address the check: either
        // the bypassed pawn is the checker, or the capturing pawn lands
        // on the block square of a slider check.
        let evades =
            lm.n_checks == 0 || (lm.checkers & bb_captured) > 0 || (bb_ep & move_mask) > 0;
        if !evades {
            return;
        }

        let king_square = my_state.king_square();

        for take_left in [true, false] {
            let candidate = if take_left { left } else { right } & bb_ep;
            if candidate == EMPTY {
                continue;
            }

            let from = if take_left {
                attacks::pawn_left_from(us, ep_square)
            } else {
                attacks::pawn_right_from(us, ep_square)
            };
            let occ_after = (all_pieces ^ BB_SQUARES[from] ^ bb_captured) | bb_ep;

            let exposed = (self.rook_attacks(king_square, occ_after) & your_bbs.orthog)
                | (self.bishop_attacks(king_square, occ_after) & your_bbs.diag);
            if exposed > 0 {
                continue;
            }

            let reveals = (self.rook_attacks(lm.their_king, occ_after) & my_bbs.orthog)
                | (self.bishop_attacks(lm.their_king, occ_after) & my_bbs.diag);
            if take_left {
                lm.pawns.ep_left = bb_ep;
                lm.discovered.ep_left = reveals > 0;
            } else {
                lm.pawns.ep_right = bb_ep;
                lm.discovered.ep_right = reveals > 0;
            }
        }
    }

    // Knights, bishops, rooks, the queen and all live promo pieces: the
    // attack set, minus our own men, clipped by the evasion mask and the
    // pin ray. A vacant slot contributes nothing via the sentinel; a
    // pinned knight dies here because none of its jumps stay on any ray.
    fn piece_moves(
        &self,
        my_state: &ColorState,
        my_bbs: &PieceBbs,
        all_pieces: Bitboard,
        move_mask: Bitboard,
        lm: &mut LegalMoves,
    ) {
        for slot in NON_KING_SLOTS {
            let square = my_state.piece_squares[slot];
            lm.piece_moves[slot] = self.slot_attacks(slot, square, all_pieces)
                & !my_bbs.all
                & move_mask
                & lm.pins.ray[square];
        }

        let mut active = my_state.active_promos as Bitboard;
        while active > 0 {
            let index = bits::next(&mut active);
            let promo = my_state.promos[index];
            lm.promo_moves[index] = self.promo_attacks(promo.kind, promo.square, all_pieces)
                & !my_bbs.all
                & move_mask
                & lm.pins.ray[promo.square];
        }
    }

    // King destinations are checked against the enemy attack picture
    // computed with our king lifted off the board, so a slider's ray
    // correctly extends through the square the king retreats over.
    fn king_moves(
        &self,
        us: Side,
        king_square: Square,
        your_state: &ColorState,
        my_bbs: &PieceBbs,
        all_pieces: Bitboard,
        lm: &mut LegalMoves,
    ) {
        let them = other(us);
        let occ_no_king = all_pieces ^ BB_SQUARES[king_square];
        let your_attacks = self.piece_attacks(your_state, them, occ_no_king).all_attacks;

        lm.piece_moves[Slots::KING] =
            self.king_attacks(king_square) & !my_bbs.all & !your_attacks;
    }

    // Castling needs the path between king and rook empty, the king's
    // square, crossing square and destination unattacked (here with the
    // king still on the board), and the rook actually at home in either
    // rook slot. The discovery flag asks whether the rook, from its
    // destination, checks the enemy king through the vacated squares.
    fn castling(
        &self,
        my_state: &ColorState,
        us: Side,
        your_state: &ColorState,
        all_pieces: Bitboard,
        lm: &mut LegalMoves,
    ) {
        if my_state.castling == Castling::NONE {
            return;
        }

        let them = other(us);
        let your_attacks = self.piece_attacks(your_state, them, all_pieces).all_attacks;
        let offset = home_offset(us);
        let e1 = Squares::E1 + offset;

        if my_state.castling & Castling::KINGSIDE > 0 {
            let f1 = Squares::F1 + offset;
            let g1 = Squares::G1 + offset;
            let h1 = Squares::H1 + offset;
            let blockers = BB_SQUARES[f1] | BB_SQUARES[g1];
            let king_path = BB_SQUARES[e1] | BB_SQUARES[f1] | BB_SQUARES[g1];
            let rook_home = my_state.piece_squares[Slots::ROOK1] == h1
                || my_state.piece_squares[Slots::ROOK2] == h1;

            if rook_home && (all_pieces & blockers) == EMPTY && (your_attacks & king_path) == EMPTY
            {
                lm.can_castle |= Castling::KINGSIDE;

                let occ_after = (all_pieces ^ BB_SQUARES[e1] ^ BB_SQUARES[h1])
                    | BB_SQUARES[f1]
                    | BB_SQUARES[g1];
                lm.discovered.kingside_castling =
                    self.rook_attacks(f1, occ_after) & BB_SQUARES[lm.their_king] > 0;
            }
        }

        if my_state.castling & Castling::QUEENSIDE > 0 {
            let a1 = Squares::A1 + offset;
            let b1 = Squares::B1 + offset;
            let c1 = Squares::C1 + offset;
            let d1 = Squares::D1 + offset;
            let blockers = BB_SQUARES[b1] | BB_SQUARES[c1] | BB_SQUARES[d1];
            let king_path = BB_SQUARES[e1] | BB_SQUARES[d1] | BB_SQUARES[c1];
            let rook_home = my_state.piece_squares[Slots::ROOK1] == a1
                || my_state.piece_squares[Slots::ROOK2] == a1;

            if rook_home && (all_pieces & blockers) == EMPTY && (your_attacks & king_path) == EMPTY
            {
                lm.can_castle |= Castling::QUEENSIDE;

                let occ_after = (all_pieces ^ BB_SQUARES[e1] ^ BB_SQUARES[a1])
                    | BB_SQUARES[c1]
                    | BB_SQUARES[d1];
                lm.discovered.queenside_castling =
                    self.rook_attacks(d1, occ_after) & BB_SQUARES[lm.their_king] > 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fen;

    // Count of destination bits; each set is disjoint per source pawn
    // or piece, so summing the sets counts moves. Promotions would count
    // one instead of four here, but the scenarios below have none.
    fn moves_in(lm: &LegalMoves) -> u32 {
        let mut count = lm.pawns.pushes_one.count_ones()
            + lm.pawns.pushes_two.count_ones()
            + lm.pawns.captures_left.count_ones()
            + lm.pawns.captures_right.count_ones()
            + lm.pawns.ep_left.count_ones()
            + lm.pawns.ep_right.count_ones();
        for bb in lm.piece_moves {
            count += bb.count_ones();
        }
        for bb in lm.promo_moves {
            count += bb.count_ones();
        }
        count += (lm.can_castle & Castling::KINGSIDE > 0) as u32;
        count += (lm.can_castle & Castling::QUEENSIDE > 0) as u32;
        count
    }

    #[test]
    fn starting_position_has_twenty_moves() {
        let mg = MoveGenerator::new();
        let (board, side) = fen::read(crate::defs::FEN_START_POSITION).expect("must parse");
        let lm = mg.gen_legal_moves(&board, side);

        assert!(!lm.illegal_position);
        assert_eq!(lm.n_checks, 0);
        assert_eq!(moves_in(&lm), 20);
        assert_eq!(lm.can_castle, Castling::NONE);
    }

    #[test]
    fn pinned_knight_cannot_move() {
        // Knight on e4 pinned by the rook on e8.
        let mg = MoveGenerator::new();
        let (board, side) = fen::read("4r1k1/8/8/8/4N3/8/8/4K3 w - - 0 1").expect("must parse");
        let lm = mg.gen_legal_moves(&board, side);

        assert_eq!(lm.pins.orthog, BB_SQUARES[28]);
        assert_eq!(lm.piece_moves[Slots::KNIGHT1], EMPTY);
    }

    #[test]
    fn pinned_rook_slides_along_the_pin_ray() {
        // Rook on e4 pinned by the rook on e8 may still move on the
        // e-file, up to and including the pinner.
        let mg = MoveGenerator::new();
        let (board, side) = fen::read("4r1k1/8/8/8/4R3/8/8/4K3 w - - 0 1").expect("must parse");
        let lm = mg.gen_legal_moves(&board, side);

        let e_file_ray = mg.between(4, 60) | BB_SQUARES[60];
        assert_eq!(lm.piece_moves[Slots::ROOK1], e_file_ray & !BB_SQUARES[28]);
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        // The rook on e8 and the knight on f3 both give check; even the
        // queen on a2 must stand still.
        let mg = MoveGenerator::new();
        let (board, side) =
            fen::read("4r1k1/8/8/8/8/5n2/Q7/4K3 w - - 0 1").expect("must parse");
        let lm = mg.gen_legal_moves(&board, side);

        assert_eq!(lm.n_checks, 2);
        assert_eq!(lm.piece_moves[Slots::QUEEN], EMPTY);
        assert!(lm.piece_moves[Slots::KING] > 0);
    }

    #[test]
    fn check_can_only_be_answered_on_the_check_ray() {
        // The rook on e8 checks the king on e1. The rook on a4 has one
        // legal move: blocking on e4.
        let mg = MoveGenerator::new();
        let (board, side) = fen::read("4r1k1/8/8/8/R7/8/8/4K3 w - - 0 1").expect("must parse");
        let lm = mg.gen_legal_moves(&board, side);

        assert_eq!(lm.n_checks, 1);
        assert_eq!(lm.piece_moves[Slots::ROOK1], BB_SQUARES[28]); // a4-e4 block
    }

    #[test]
    fn en_passant_exposing_the_king_on_the_rank_is_rejected() {
        let mg = MoveGenerator::new();
        let (board, side) =
            fen::read("8/8/8/KPp4r/5p1k/8/4P1P1/8 w - c6 0 1").expect("must parse");
        let lm = mg.gen_legal_moves(&board, side);

        assert_eq!(lm.pawns.ep_left, EMPTY);
        assert_eq!(lm.pawns.ep_right, EMPTY);
    }

    #[test]
    fn en_passant_is_found_when_sound() {
        let mg = MoveGenerator::new();
        let (board, side) =
            fen::read("rnbqkb1r/pppppp1p/7n/6pP/8/8/PPPPPPP1/RNBQKBNR w KQkq g6 0 1")
                .expect("must parse");
        let lm = mg.gen_legal_moves(&board, side);

        // The h5 pawn may capture the g5 pawn en passant to g6: from
        // White's view that is a capture toward the a-file.
        assert_eq!(lm.pawns.ep_left, BB_SQUARES[46]);
        assert_eq!(lm.pawns.ep_right, EMPTY);
    }

    #[test]
    fn castling_through_an_attacked_square_is_rejected() {
        // Black rook on f8 guards f1: no white kingside castling, but
        // queenside is fine.
        let mg = MoveGenerator::new();
        let (board, side) =
            fen::read("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").expect("must parse");
        let lm = mg.gen_legal_moves(&board, side);

        assert_eq!(lm.can_castle, Castling::QUEENSIDE);
    }

    #[test]
    fn castling_with_a_blocked_path_is_rejected() {
        let mg = MoveGenerator::new();
        let (board, side) =
            fen::read("4k3/8/8/8/8/8/8/Rn2K2R w KQ - 0 1").expect("must parse");
        let lm = mg.gen_legal_moves(&board, side);

        assert_eq!(lm.can_castle, Castling::KINGSIDE);
    }

    #[test]
    fn generation_is_a_pure_function_of_the_board() {
        let mg = MoveGenerator::new();
        let (board, side) = fen::read(crate::defs::FEN_KIWIPETE_POSITION).expect("must parse");

        let first = mg.gen_legal_moves(&board, side);
        let second = mg.gen_legal_moves(&board, side);

        assert_eq!(first.pawns.pushes_one, second.pawns.pushes_one);
        assert_eq!(first.piece_moves, second.piece_moves);
        assert_eq!(first.can_castle, second.can_castle);
        assert_eq!(first.checkers, second.checkers);
    }
}
