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

use windmill::board::fen;
use windmill::defs::{Sides, FEN_KIWIPETE_POSITION};
use windmill::extra::wizardry;
use windmill::misc::cmdline::CmdLine;
use windmill::movegen::defs::Slider;
use windmill::movegen::MoveGenerator;
use windmill::perft;

fn main() {
    let cmdline = CmdLine::new();

    if cmdline.has_wizardry() {
        wizardry::find_magics(Slider::Rook);
        wizardry::find_magics(Slider::Bishop);
        return;
    }

    let fen_string = if cmdline.has_kiwipete() {
        String::from(FEN_KIWIPETE_POSITION)
    } else {
        cmdline.fen()
    };

    match fen::read(&fen_string) {
        Ok((board, side)) => {
            let mg = MoveGenerator::new();

            println!("{board}");
            println!(
                "{:<14}{}",
                "Side to move:",
                if side == Sides::WHITE { "White" } else { "Black" }
            );

            let depth = cmdline.perft();
            if depth > 0 {
                perft::run(&mg, &board, side, depth);
            }
        }
        Err(error) => {
            println!("{error}");
            std::process::exit(1);
        }
    }
}
