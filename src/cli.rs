use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "map2bbc", author, version, about)]
pub struct Cli {
    /// Input Tiled .world file
    pub input: PathBuf,
    /// Output BeebAsm source file
    pub output: PathBuf,

    /// Output in Mountain Panic packed format
    #[arg(short, long)]
    pub packed: bool,

    /// Write packed tiles without behaviour flags
    #[arg(long)]
    pub raw_tiles: bool,

    /// JSON tile flag table replacing the built-in one
    #[arg(long, value_name = "FILE", conflicts_with = "tileset")]
    pub tile_flags: Option<PathBuf>,

    /// Tiled tileset whose tile properties define the flags
    #[arg(long, value_name = "FILE")]
    pub tileset: Option<PathBuf>,

    /// Also write the level data as a raw binary blob
    #[arg(long, value_name = "FILE")]
    pub binary: Option<PathBuf>,
}
