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

use crate::defs::{About, FEN_START_POSITION};
use clap::{Arg, ArgAction, ArgMatches, Command};

// Consts for command line options, flags and arguments

struct CmdLineArgs;
impl CmdLineArgs {
    // FEN
    const FEN_LONG: &'static str = "fen";
    const FEN_SHORT: char = 'f';
    const FEN_HELP: &'static str = "Set up the given position";

    // Perft
    const PERFT_LONG: &'static str = "perft";
    const PERFT_SHORT: char = 'p';
    const PERFT_HELP: &'static str = "Run perft to the given depth";
    const PERFT_DEFAULT: &'static str = "0";

    // Kiwipete
    const KIWI_LONG: &'static str = "kiwipete";
    const KIWI_SHORT: char = 'k';
    const KIWI_HELP: &'static str = "Set up the Kiwipete position (ignore --fen)";

    // Wizardry
    const WIZARDRY_LONG: &'static str = "wizardry";
    const WIZARDRY_SHORT: char = 'w';
    const WIZARDRY_HELP: &'static str = "Generate magic numbers and exit";
}

pub struct CmdLine {
    arguments: ArgMatches,
}

impl CmdLine {
    pub fn new() -> Self {
        Self {
            arguments: Self::get(),
        }
    }

    pub fn fen(&self) -> String {
        self.arguments
            .get_one::<String>(CmdLineArgs::FEN_LONG)
            .cloned()
            .unwrap_or_else(|| String::from(FEN_START_POSITION))
    }

    pub fn perft(&self) -> u8 {
        self.arguments
            .get_one::<u8>(CmdLineArgs::PERFT_LONG)
            .copied()
            .unwrap_or(0)
    }

    pub fn has_kiwipete(&self) -> bool {
        self.arguments.get_flag(CmdLineArgs::KIWI_LONG)
    }

    pub fn has_wizardry(&self) -> bool {
        self.arguments.get_flag(CmdLineArgs::WIZARDRY_LONG)
    }

    fn get() -> ArgMatches {
        Command::new(About::ENGINE)
            .version(About::VERSION)
            .arg(
                Arg::new(CmdLineArgs::FEN_LONG)
                    .short(CmdLineArgs::FEN_SHORT)
                    .long(CmdLineArgs::FEN_LONG)
                    .help(CmdLineArgs::FEN_HELP)
                    .num_args(1)
                    .default_value(FEN_START_POSITION),
            )
            .arg(
                Arg::new(CmdLineArgs::PERFT_LONG)
                    .short(CmdLineArgs::PERFT_SHORT)
                    .long(CmdLineArgs::PERFT_LONG)
                    .help(CmdLineArgs::PERFT_HELP)
                    .num_args(1)
                    .value_parser(clap::value_parser!(u8))
                    .default_value(CmdLineArgs::PERFT_DEFAULT),
            )
            .arg(
                Arg::new(CmdLineArgs::KIWI_LONG)
                    .short(CmdLineArgs::KIWI_SHORT)
                    .long(CmdLineArgs::KIWI_LONG)
                    .help(CmdLineArgs::KIWI_HELP)
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new(CmdLineArgs::WIZARDRY_LONG)
                    .short(CmdLineArgs::WIZARDRY_SHORT)
                    .long(CmdLineArgs::WIZARDRY_LONG)
                    .help(CmdLineArgs::WIZARDRY_HELP)
                    .action(ArgAction::SetTrue),
            )
            .get_matches()
    }
}

impl Default for CmdLine {
    fn default() -> Self {
        Self::new()
    }
}
