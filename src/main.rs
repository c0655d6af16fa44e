//! Passivetris: a self-playing falling-block board for the terminal.

mod app;
mod input;
mod logger;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use passivetris::{PaletteKind, Rgb, SimConfig};
use std::time::Duration;

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        logger::init(path, args.log_level)?;
    }
    let background = args
        .background
        .as_deref()
        .map(Rgb::from_hex)
        .transpose()
        .context("invalid --background colour")?;
    let config = SimConfig {
        palette: PaletteKind::from(args.palette).into(),
        shapes: None,
        cell_size: args.cell_size,
        time_step: args.time_step_ms.map(Duration::from_millis),
        seed: args.seed,
    };
    let mut app = App::new(args, config, background)?;
    app.run()
}

/// Decorative falling blocks in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "passivetris",
    version,
    about = "A self-playing falling-block board for the terminal. Nothing to steer; just watch.",
    long_about = "Passivetris fills the terminal with a falling-block board that plays itself.\n\n\
        Blocks drop at a steady cadence, lock into the pile and full rows clear. When the pile \
        reaches the top the board starts over.\n\n\
        KEYS:\n  q / Esc   Quit    r   Start over    f   Random pile\n\n\
        The terminal is treated as a surface with one pixel per column and two per row; \
        --cell-size sets how many pixels each block covers."
)]
pub struct Args {
    /// Surface pixels per block edge. 7 or more shows all three shades of a block.
    #[arg(short, long, default_value = "4", value_name = "PX")]
    pub cell_size: u16,

    /// Milliseconds between one-row drops. Random between 50 and 100 when not set.
    #[arg(short, long, value_name = "MS")]
    pub time_step_ms: Option<u64>,

    /// Colour palette for the blocks.
    #[arg(short, long, default_value = "default")]
    pub palette: Palette,

    /// Background colour as #RRGGBB or #RGB. Uses the terminal background if not set.
    #[arg(short, long, value_name = "HEX")]
    pub background: Option<String>,

    /// Seed for block selection and placement, for reproducible runs.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Start every board with a random settled pile in the lower half.
    #[arg(long)]
    pub prefill: bool,

    /// Target render frames per second (one simulation tick per frame).
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Width of the outer shade, as a fraction of half a block.
    #[arg(long, default_value = "0.33", value_name = "FRACTION")]
    pub outer: f32,

    /// Width of the middle shade, as a fraction of half a block.
    #[arg(long, default_value = "0.33", value_name = "FRACTION")]
    pub middle: f32,

    /// Append engine logs to this file (the terminal itself is busy drawing).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<std::path::PathBuf>,

    /// Log verbosity for --log-file: off, error, warn, info, debug, trace.
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    pub log_level: log::LevelFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Default,

    #[value(alias = "bw", alias = "mono")]
    BlackAndWhite,
}

impl From<Palette> for PaletteKind {
    fn from(palette: Palette) -> Self {
        match palette {
            Palette::Default => Self::Default,
            Palette::BlackAndWhite => Self::BlackAndWhite,
        }
    }
}
