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

// perft.rs walks the legal game tree to a fixed depth and counts leaf
// nodes by category. The walker is the primary correctness harness: the
// node counts of the standard test positions are known exactly, so any
// generator bug shows up as a wrong number.
//
// The recursion is continuation-driven: move generation hands each
// successor board straight into the next ply, no move list in between.
// Leaves are classified from the MoveInfo annotations alone; only the
// checkmate probe runs the generator once more at depth zero.

use crate::board::Board;
use crate::defs::{other, Side};
use crate::movegen::defs::{MoveInfo, MoveType};
use crate::movegen::makemove::make_all_legal_moves;
use crate::movegen::MoveGenerator;
use std::time::Instant;

#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct PerftStats {
    pub nodes: u64,
    pub captures: u64,
    pub eps: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    // Checks where the checking piece is not the moved piece. Castling
    // checks land here as well: the rook checks, the king "moved".
    pub discovery_checks: u64,
    pub double_checks: u64,
    pub checkmates: u64,
    // Positions whose generation was refused because the side not to
    // move was in check. Stays zero unless the generator is broken.
    pub invalids: u64,
}

pub fn perft(mg: &MoveGenerator, board: &Board, us: Side, depth: u8) -> PerftStats {
    let mut stats = PerftStats::default();

    perft_impl(mg, board, us, depth, &MoveInfo::root(), &mut stats);

    stats
}

fn perft_impl(
    mg: &MoveGenerator,
    board: &Board,
    us: Side,
    depth: u8,
    move_info: &MoveInfo,
    stats: &mut PerftStats,
) {
    if depth == 0 {
        classify_leaf(mg, board, us, move_info, stats);
        return;
    }

    let legal = make_all_legal_moves(mg, board, us, &mut |next, mi| {
        perft_impl(mg, next, other(us), depth - 1, mi, stats);
    });

    if !legal {
        stats.invalids += 1;
    }
}

// Count the leaf under every category the move that produced it belongs
// to. `us` is the side to move in the leaf position, i.e. the side that
// is in check if the move checked.
fn classify_leaf(
    mg: &MoveGenerator,
    board: &Board,
    us: Side,
    move_info: &MoveInfo,
    stats: &mut PerftStats,
) {
    stats.nodes += 1;

    match move_info.move_type {
        MoveType::Capture => stats.captures += 1,
        MoveType::EpCapture => {
            stats.captures += 1;
            stats.eps += 1;
        }
        MoveType::Castle => stats.castles += 1,
        MoveType::Push => (),
    }

    if move_info.is_promotion {
        stats.promotions += 1;
    }

    if !move_info.gives_check() {
        return;
    }

    stats.checks += 1;
    if move_info.is_direct_check && move_info.is_discovered_check {
        stats.double_checks += 1;
    } else if move_info.is_discovered_check {
        stats.discovery_checks += 1;
    }

    // Checkmate iff the checked side has no reply.
    let mut has_reply = false;
    make_all_legal_moves(mg, board, us, &mut |_, _| has_reply = true);
    if !has_reply {
        stats.checkmates += 1;
    }
}

// Run perft for all depths up to and including `depth`, collecting
// timing information along the way.
pub fn run(mg: &MoveGenerator, board: &Board, us: Side, depth: u8) {
    let mut total_time: u128 = 0;
    let mut total_nodes: u64 = 0;

    println!("Benchmarking perft 1-{depth}:");

    for d in 1..=depth {
        let now = Instant::now();
        let stats = perft(mg, board, us, d);
        let elapsed = now.elapsed().as_millis().max(1);
        let leaves_per_second = ((stats.nodes * 1000) as f64 / elapsed as f64).floor();

        total_time += elapsed;
        total_nodes += stats.nodes;

        println!(
            "Perft {d}: {} ({} ms, {} leaves/sec)",
            stats.nodes, elapsed, leaves_per_second
        );
        println!(
            "    captures {}, ep {}, castles {}, promotions {}, checks {}, \
             discoveries {}, doubles {}, checkmates {}",
            stats.captures,
            stats.eps,
            stats.castles,
            stats.promotions,
            stats.checks,
            stats.discovery_checks,
            stats.double_checks,
            stats.checkmates
        );

        if stats.invalids > 0 {
            println!("    INVALID POSITIONS: {}", stats.invalids);
        }
    }

    let final_lnps = ((total_nodes * 1000) as f64 / total_time as f64).floor();
    println!("Total time spent: {total_time} ms");
    println!("Execution speed: {final_lnps} leaves/second");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fen;
    use crate::defs::FEN_START_POSITION;

    fn stats_for(fen_string: &str, depth: u8) -> PerftStats {
        let mg = MoveGenerator::new();
        let (board, side) = fen::read(fen_string).expect("must parse");

        perft(&mg, &board, side, depth)
    }

    #[test]
    fn depth_zero_is_one_bare_node() {
        let stats = stats_for(FEN_START_POSITION, 0);
        assert_eq!(stats.nodes, 1);
        assert_eq!(stats.captures, 0);
        assert_eq!(stats.checks, 0);
    }

    #[test]
    fn shallow_starting_position_counts() {
        let d1 = stats_for(FEN_START_POSITION, 1);
        assert_eq!(d1.nodes, 20);

        let d2 = stats_for(FEN_START_POSITION, 2);
        assert_eq!(d2.nodes, 400);

        let d3 = stats_for(FEN_START_POSITION, 3);
        assert_eq!(d3.nodes, 8_902);
        assert_eq!(d3.captures, 34);
        assert_eq!(d3.checks, 12);
        assert_eq!(d3.invalids, 0);
    }

    #[test]
    fn fools_mate_is_counted_as_checkmate() {
        // After 1.f3 e5 2.g4: Qh4 mate is among Black's depth-1 moves.
        let stats = stats_for(
            "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2",
            1,
        );
        assert_eq!(stats.checks, 1);
        assert_eq!(stats.checkmates, 1);
    }

    #[test]
    fn stalemate_produces_no_nodes_and_no_mate() {
        // Black to move, no legal moves but no check either.
        let stats = stats_for("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 1);
        assert_eq!(stats.nodes, 0);
        assert_eq!(stats.checkmates, 0);
        assert_eq!(stats.invalids, 0);
    }
}
