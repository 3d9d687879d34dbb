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

// makemove.rs drives the LegalMoves bundle: it materialises each legal
// move as a successor board through the mutation primitives and hands
// (board, MoveInfo) to a caller-supplied continuation. No move list is
// built anywhere.
//
// Emission order is fixed and documented: pawn single pushes, double
// pushes, captures toward the a-file, captures toward the h-file,
// en-passant (a-file side first), then the slots Knight1, Knight2,
// Bishop1, Bishop2, Rook1, Rook2, Queen, then promo pieces by ascending
// arena index, castling (kingside first), and the king last. Within a
// set, destinations come in ascending square order; each promotion
// emits queen, rook, bishop, knight in that order.

use super::attacks;
use super::defs::{DirectChecks, LegalMoves, MoveInfo, MoveType, NON_KING_SLOTS};
use super::MoveGenerator;
use crate::board::defs::{
    home_offset, Castling, PromoPiece, Slots, Squares, BB_RANKS, BB_SQUARES, PROMO_PIECES,
};
use crate::board::{moving, promotion_rank, Board, PieceMap};
use crate::defs::{other, Bitboard, Side, Square, EMPTY};
use crate::misc::bits;

// Generate all legal moves of `us` and feed every successor position to
// the handler. Returns false (emitting nothing) when the position is
// illegal, i.e. the side not to move is in check.
pub fn make_all_legal_moves<F>(mg: &MoveGenerator, board: &Board, us: Side, handler: &mut F) -> bool
where
    F: FnMut(&Board, &MoveInfo),
{
    let lm = mg.gen_legal_moves(board, us);
    if lm.illegal_position {
        return false;
    }

    let your_map = PieceMap::of(&board.sides[other(us)]);

    // Under double check everything but the king stands still.
    if lm.n_checks < 2 {
        pawn_pushes(mg, board, us, &lm, false, handler);
        pawn_pushes(mg, board, us, &lm, true, handler);
        pawn_captures(mg, board, us, &lm, &your_map, true, handler);
        pawn_captures(mg, board, us, &lm, &your_map, false, handler);
        ep_captures(board, us, &lm, handler);

        for slot in NON_KING_SLOTS {
            slot_moves(mg, board, us, &lm, &your_map, slot, handler);
        }
        promo_piece_moves(mg, board, us, &lm, &your_map, handler);
        castling_moves(board, us, &lm, handler);
    }

    slot_moves(mg, board, us, &lm, &your_map, Slots::KING, handler);

    true
}

// A promotion checks when the piece the pawn became attacks the enemy
// king on the occupancy as it stands after the move. The precomputed
// direct-check sets cannot answer this: the pawn may itself have been
// the blocker between its promotion square and the king.
fn promo_gives_check(
    mg: &MoveGenerator,
    lm: &LegalMoves,
    kind: PromoPiece,
    from: Square,
    to: Square,
) -> bool {
    let occ_after = (lm.all_pieces ^ BB_SQUARES[from]) | BB_SQUARES[to];

    mg.promo_attacks(kind, to, occ_after) & BB_SQUARES[lm.their_king] > 0
}

fn pawn_pushes<F>(
    mg: &MoveGenerator,
    board: &Board,
    us: Side,
    lm: &LegalMoves,
    two: bool,
    handler: &mut F,
) where
    F: FnMut(&Board, &MoveInfo),
{
    let mut bb = if two {
        lm.pawns.pushes_two
    } else {
        lm.pawns.pushes_one
    };

    // A single push can land on the promotion rank; a double push never.
    if !two {
        let mut promotions = bb & BB_RANKS[promotion_rank(us)];
        bb &= !promotions;

        while promotions > 0 {
            let to = bits::next(&mut promotions);
            let from = attacks::pawn_push_from(us, to);
            let is_discovered_check = lm.discovered.pawn_push & BB_SQUARES[from] > 0;

            for kind in PROMO_PIECES {
                let next = moving::push_pawn_to_promo(board, us, from, to, kind);
                handler(
                    &next,
                    &MoveInfo {
                        move_type: MoveType::Push,
                        from,
                        to,
                        is_promotion: true,
                        is_direct_check: promo_gives_check(mg, lm, kind, from, to),
                        is_discovered_check,
                    },
                );
            }
        }
    }

    while bb > 0 {
        let to = bits::next(&mut bb);
        let from = if two {
            attacks::pawn_push_two_from(us, to)
        } else {
            attacks::pawn_push_from(us, to)
        };
        let next = if two {
            moving::push_pawn_two(board, us, from, to)
        } else {
            moving::push_pawn(board, us, from, to)
        };

        handler(
            &next,
            &MoveInfo {
                move_type: MoveType::Push,
                from,
                to,
                is_promotion: false,
                is_direct_check: lm.direct.pawn & BB_SQUARES[to] > 0,
                is_discovered_check: lm.discovered.pawn_push & BB_SQUARES[from] > 0,
            },
        );
    }
}

fn pawn_captures<F>(
    mg: &MoveGenerator,
    board: &Board,
    us: Side,
    lm: &LegalMoves,
    your_map: &PieceMap,
    take_left: bool,
    handler: &mut F,
) where
    F: FnMut(&Board, &MoveInfo),
{
    let (mut bb, discovery_mask) = if take_left {
        (lm.pawns.captures_left, lm.discovered.pawn_left)
    } else {
        (lm.pawns.captures_right, lm.discovered.pawn_right)
    };

    let from_of = |to: Square| {
        if take_left {
            attacks::pawn_left_from(us, to)
        } else {
            attacks::pawn_right_from(us, to)
        }
    };

    let mut promotions = bb & BB_RANKS[promotion_rank(us)];
    bb &= !promotions;

    while promotions > 0 {
        let to = bits::next(&mut promotions);
        let from = from_of(to);
        let is_discovered_check = discovery_mask & BB_SQUARES[from] > 0;

        for kind in PROMO_PIECES {
            let next = if your_map.is_promo_on(to) {
                moving::capture_promo_with_pawn_to_promo(board, us, your_map, from, to, kind)
            } else {
                moving::capture_with_pawn_to_promo(board, us, your_map, from, to, kind)
            };
            handler(
                &next,
                &MoveInfo {
                    move_type: MoveType::Capture,
                    from,
                    to,
                    is_promotion: true,
                    is_direct_check: promo_gives_check(mg, lm, kind, from, to),
                    is_discovered_check,
                },
            );
        }
    }

    while bb > 0 {
        let to = bits::next(&mut bb);
        let from = from_of(to);
        let next = if your_map.is_promo_on(to) {
            moving::capture_promo_with_pawn(board, us, your_map, from, to)
        } else {
            moving::capture_with_pawn(board, us, your_map, from, to)
        };

        handler(
            &next,
            &MoveInfo {
                move_type: MoveType::Capture,
                from,
                to,
                is_promotion: false,
                is_direct_check: lm.direct.pawn & BB_SQUARES[to] > 0,
                is_discovered_check: discovery_mask & BB_SQUARES[from] > 0,
            },
        );
    }
}

fn ep_captures<F>(board: &Board, us: Side, lm: &LegalMoves, handler: &mut F)
where
    F: FnMut(&Board, &MoveInfo),
{
    for take_left in [true, false] {
        let (bb, is_discovered_check) = if take_left {
            (lm.pawns.ep_left, lm.discovered.ep_left)
        } else {
            (lm.pawns.ep_right, lm.discovered.ep_right)
        };
        if bb == EMPTY {
            continue;
        }

        // There is at most one en-passant target per position.
        let to = bits::lsb(bb);
        let from = if take_left {
            attacks::pawn_left_from(us, to)
        } else {
            attacks::pawn_right_from(us, to)
        };
        let capture_square = attacks::pawn_push_from(us, to);
        let next = moving::capture_ep(board, us, from, to, capture_square);

        handler(
            &next,
            &MoveInfo {
                move_type: MoveType::EpCapture,
                from,
                to,
                is_promotion: false,
                is_direct_check: lm.direct.pawn & BB_SQUARES[to] > 0,
                is_discovered_check,
            },
        );
    }
}

// The direct-check squares for a slot piece, by the slot's piece type.
fn slot_direct_checks(slot: usize, direct: &DirectChecks) -> Bitboard {
    match slot {
        Slots::KNIGHT1 | Slots::KNIGHT2 => direct.knight,
        Slots::BISHOP1 | Slots::BISHOP2 => direct.bishop,
        Slots::ROOK1 | Slots::ROOK2 => direct.rook,
        Slots::QUEEN => direct.bishop | direct.rook,
        // A king never delivers check himself.
        _ => EMPTY,
    }
}

fn slot_moves<F>(
    mg: &MoveGenerator,
    board: &Board,
    us: Side,
    lm: &LegalMoves,
    your_map: &PieceMap,
    slot: usize,
    handler: &mut F,
) where
    F: FnMut(&Board, &MoveInfo),
{
    let from = board.sides[us].piece_squares[slot];
    let moves = lm.piece_moves[slot];
    if moves == EMPTY {
        return;
    }

    let direct_checks = slot_direct_checks(slot, &lm.direct);
    // A shield piece discovers check unless it stays on the line
    // between the enemy king and the slider behind it.
    let is_shield =
        (lm.discovered.diag_pieces | lm.discovered.orthog_pieces) & BB_SQUARES[from] > 0;
    let shield_line = if is_shield {
        mg.line(lm.their_king, from)
    } else {
        EMPTY
    };

    let mut pushes = moves & !lm.your_pieces;
    while pushes > 0 {
        let to = bits::next(&mut pushes);
        let next = moving::push_piece(board, us, slot, from, to);

        handler(
            &next,
            &MoveInfo {
                move_type: MoveType::Push,
                from,
                to,
                is_promotion: false,
                is_direct_check: direct_checks & BB_SQUARES[to] > 0,
                is_discovered_check: is_shield && shield_line & BB_SQUARES[to] == EMPTY,
            },
        );
    }

    let mut captures = moves & lm.your_pieces;
    while captures > 0 {
        let to = bits::next(&mut captures);
        let next = if your_map.is_promo_on(to) {
            moving::capture_promo_with_piece(board, us, your_map, slot, from, to)
        } else {
            moving::capture_with_piece(board, us, your_map, slot, from, to)
        };

        handler(
            &next,
            &MoveInfo {
                move_type: MoveType::Capture,
                from,
                to,
                is_promotion: false,
                is_direct_check: direct_checks & BB_SQUARES[to] > 0,
                is_discovered_check: is_shield && shield_line & BB_SQUARES[to] == EMPTY,
            },
        );
    }
}

fn promo_piece_moves<F>(
    mg: &MoveGenerator,
    board: &Board,
    us: Side,
    lm: &LegalMoves,
    your_map: &PieceMap,
    handler: &mut F,
) where
    F: FnMut(&Board, &MoveInfo),
{
    let my_state = &board.sides[us];
    let mut active = my_state.active_promos as Bitboard;

    while active > 0 {
        let index = bits::next(&mut active);
        let promo = my_state.promos[index];
        let from = promo.square;
        let moves = lm.promo_moves[index];
        if moves == EMPTY {
            continue;
        }

        let direct_checks = match promo.kind {
            PromoPiece::Queen => lm.direct.bishop | lm.direct.rook,
            PromoPiece::Rook => lm.direct.rook,
            PromoPiece::Bishop => lm.direct.bishop,
            PromoPiece::Knight => lm.direct.knight,
        };
        let is_shield =
            (lm.discovered.diag_pieces | lm.discovered.orthog_pieces) & BB_SQUARES[from] > 0;
        let shield_line = if is_shield {
            mg.line(lm.their_king, from)
        } else {
            EMPTY
        };

        let mut pushes = moves & !lm.your_pieces;
        while pushes > 0 {
            let to = bits::next(&mut pushes);
            let next = moving::push_promo_piece(board, us, index, promo.kind, to);

            handler(
                &next,
                &MoveInfo {
                    move_type: MoveType::Push,
                    from,
                    to,
                    is_promotion: false,
                    is_direct_check: direct_checks & BB_SQUARES[to] > 0,
                    is_discovered_check: is_shield && shield_line & BB_SQUARES[to] == EMPTY,
                },
            );
        }

        let mut captures = moves & lm.your_pieces;
        while captures > 0 {
            let to = bits::next(&mut captures);
            let next = if your_map.is_promo_on(to) {
                moving::capture_promo_with_promo_piece(board, us, index, promo.kind, your_map, to)
            } else {
                moving::capture_with_promo_piece(board, us, index, promo.kind, your_map, to)
            };

            handler(
                &next,
                &MoveInfo {
                    move_type: MoveType::Capture,
                    from,
                    to,
                    is_promotion: false,
                    is_direct_check: direct_checks & BB_SQUARES[to] > 0,
                    is_discovered_check: is_shield && shield_line & BB_SQUARES[to] == EMPTY,
                },
            );
        }
    }
}

// Castling reports the king's from and to square; the rook's check from
// its destination was precomputed as the castling discovery flag.
fn castling_moves<F>(board: &Board, us: Side, lm: &LegalMoves, handler: &mut F)
where
    F: FnMut(&Board, &MoveInfo),
{
    let offset = home_offset(us);

    if lm.can_castle & Castling::KINGSIDE > 0 {
        let next = moving::castle(board, us, Castling::KINGSIDE);
        handler(
            &next,
            &MoveInfo {
                move_type: MoveType::Castle,
                from: Squares::E1 + offset,
                to: Squares::G1 + offset,
                is_promotion: false,
                is_direct_check: false,
                is_discovered_check: lm.discovered.kingside_castling,
            },
        );
    }

    if lm.can_castle & Castling::QUEENSIDE > 0 {
        let next = moving::castle(board, us, Castling::QUEENSIDE);
        handler(
            &next,
            &MoveInfo {
                move_type: MoveType::Castle,
                from: Squares::E1 + offset,
                to: Squares::C1 + offset,
                is_promotion: false,
                is_direct_check: false,
                is_discovered_check: lm.discovered.queenside_castling,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fen;
    use crate::defs::{Sides, FEN_START_POSITION};

    fn collect_moves(fen_string: &str) -> Vec<MoveInfo> {
        let mg = MoveGenerator::new();
        let (board, side) = fen::read(fen_string).expect("must parse");
        let mut moves = Vec::new();

        let ok = make_all_legal_moves(&mg, &board, side, &mut |_, mi| moves.push(*mi));
        assert!(ok, "position must be legal");

        moves
    }

    #[test]
    fn starting_position_emits_twenty_moves() {
        let moves = collect_moves(FEN_START_POSITION);
        assert_eq!(moves.len(), 20);
        assert!(moves.iter().all(|m| m.move_type == MoveType::Push));
        assert!(moves.iter().all(|m| !m.gives_check()));
    }

    #[test]
    fn emission_is_deterministic() {
        let first = collect_moves(crate::defs::FEN_KIWIPETE_POSITION);
        let second = collect_moves(crate::defs::FEN_KIWIPETE_POSITION);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.from, b.from);
            assert_eq!(a.to, b.to);
            assert_eq!(a.move_type, b.move_type);
        }
    }

    #[test]
    fn promotions_emit_four_moves_each() {
        // One white pawn on a7, kings tucked away: four promotions plus
        // king moves.
        let moves = collect_moves("8/P7/8/8/8/8/k6K/8 w - - 0 1");
        let promos: Vec<&MoveInfo> = moves.iter().filter(|m| m.is_promotion).collect();

        assert_eq!(promos.len(), 4);
        assert!(promos.iter().all(|m| m.move_type == MoveType::Push));
    }

    #[test]
    fn promotion_direct_check_sees_through_the_former_pawn() {
        // The pawn on a7 blocks the a-file; after promoting, the new
        // queen or rook checks the king on a5 down that same file.
        let moves = collect_moves("8/P7/8/k7/8/8/8/7K w - - 0 1");
        let promos: Vec<&MoveInfo> = moves.iter().filter(|m| m.is_promotion).collect();

        assert_eq!(promos.len(), 4);
        // Queen and rook promotions check; bishop and knight do not.
        let checking = promos.iter().filter(|m| m.is_direct_check).count();
        assert_eq!(checking, 2);
    }

    #[test]
    fn ep_capture_leaves_exactly_the_right_pawns() {
        let mg = MoveGenerator::new();
        let (board, side) =
            fen::read("rnbqkb1r/pppppp1p/7n/6pP/8/8/PPPPPPP1/RNBQKBNR w KQkq g6 0 1")
                .expect("must parse");
        let mut ep_board = None;

        make_all_legal_moves(&mg, &board, side, &mut |b, mi| {
            if mi.move_type == MoveType::EpCapture {
                ep_board = Some(*b);
            }
        });

        let after = ep_board.expect("the en-passant capture must be emitted");
        let g5 = 38;
        let g6 = 46;
        let h5 = 39;

        // The white pawn stands on g6, the black pawn on g5 is gone, the
        // white pawn is gone from h5, and the ep square is cleared.
        assert!(after.sides[Sides::WHITE].pawns & crate::board::defs::BB_SQUARES[g6] > 0);
        assert_eq!(
            after.sides[Sides::BLACK].pawns & crate::board::defs::BB_SQUARES[g5],
            EMPTY
        );
        assert_eq!(
            after.sides[Sides::WHITE].pawns & crate::board::defs::BB_SQUARES[h5],
            EMPTY
        );
        assert_eq!(
            after.sides[Sides::BLACK].en_passant,
            crate::defs::INVALID_SQUARE
        );
        // Everything else is untouched.
        assert_eq!(after.sides[Sides::BLACK].piece_squares, board.sides[Sides::BLACK].piece_squares);
    }

    #[test]
    fn double_pushes_set_the_ep_square_for_the_mover() {
        let mg = MoveGenerator::new();
        let (board, side) = fen::read("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").expect("must parse");
        let mut seen = 0;

        make_all_legal_moves(&mg, &board, side, &mut |b, mi| {
            if mi.to == 28 {
                // e2-e4: the skipped square e3 becomes White's ep square.
                assert_eq!(b.sides[Sides::WHITE].en_passant, 20);
                seen += 1;
            } else {
                assert_eq!(b.sides[Sides::WHITE].en_passant, crate::defs::INVALID_SQUARE);
            }
        });

        assert_eq!(seen, 1);
    }

    #[test]
    fn moves_from_the_start_never_touch_castling_rights() {
        let mg = MoveGenerator::new();
        let board = Board::starting();

        make_all_legal_moves(&mg, &board, Sides::WHITE, &mut |b, _| {
            assert_eq!(b.sides[Sides::WHITE].castling, Castling::ALL);
            assert_eq!(b.sides[Sides::BLACK].castling, Castling::ALL);
            assert_eq!(b.sides[Sides::WHITE].king_square(), Squares::E1);
            assert_eq!(b.sides[Sides::BLACK].king_square(), Squares::E8);
        });
    }
}
