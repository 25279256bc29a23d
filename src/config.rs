use std::path::PathBuf;

use clap::Parser;
use tui_dispatch_debug::DebugCliArgs;

use crate::api::{DEFAULT_API_BASE, DEFAULT_SPRITE_BASE};
use crate::roster::DEFAULT_CONCURRENCY;
use crate::state::{Category, Quantity};

/// Browse Pokémon by type in the terminal
#[derive(Parser, Debug)]
#[command(name = "typedex")]
#[command(about = "Browse Pokémon by type, with a card grid and artwork preview")]
pub struct Args {
    /// Type shown on startup
    #[arg(long, short, value_enum, default_value_t = Category::Fire)]
    pub category: Category,

    /// How many Pokémon to list: 50, 100, 300, 1000 or all
    #[arg(long = "quantity", short = 'n', default_value = "50", value_parser = parse_quantity)]
    pub quantity: Quantity,

    /// PokeAPI base URL
    #[arg(long, env = "TYPEDEX_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Base URL for official artwork PNGs
    #[arg(long, env = "TYPEDEX_SPRITE_BASE", default_value = DEFAULT_SPRITE_BASE)]
    pub sprite_base: String,

    /// Maximum detail lookups in flight (minimum 1)
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY as u64, value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: u64,

    /// Never download or draw artwork
    #[arg(long)]
    pub no_artwork: bool,

    /// Draw artwork even when the terminal is not recognised as kitty-capable
    #[arg(long, conflicts_with = "no_artwork")]
    pub force_artwork: bool,

    /// Log file (defaults to the user cache directory)
    #[arg(long, env = "TYPEDEX_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Debug-level logging for typedex
    #[arg(long, short)]
    pub verbose: bool,

    #[command(flatten)]
    pub debug: DebugCliArgs,
}

impl Args {
    /// Artwork is drawn on kitty-capable terminals unless turned off.
    pub fn show_artwork(&self, kitty_graphics: bool) -> bool {
        !self.no_artwork && (self.force_artwork || kitty_graphics)
    }
}

fn parse_quantity(value: &str) -> Result<Quantity, String> {
    value.parse()
}
