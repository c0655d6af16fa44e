//! Passivetris engine: a self-playing falling-block board for decorative displays.
//!
//! Blocks spawn above the board, fall on their own cadence, lock into the pile, full rows
//! clear and the pile drops. When a block cannot even enter the board the game restarts, so
//! the simulation runs for as long as the host keeps delivering ticks. No player input exists.
//!
//! The host owns drawing and timing. It reports the surface size with
//! [`Simulation::resize`], calls [`Simulation::advance`] once per frame, and reads
//! [`Simulation::grid`] and [`Simulation::active`] to render.
//!
//! ```
//! use passivetris::{SimConfig, Simulation, Tick};
//! use std::time::{Duration, Instant};
//!
//! let mut sim = Simulation::new(SimConfig {
//!     seed: Some(7),
//!     time_step: Some(Duration::ZERO),
//!     ..SimConfig::default()
//! })?;
//! sim.resize(200, 400)?;
//! assert_eq!(sim.advance(Instant::now())?, Tick::Stepped);
//! # Ok::<(), passivetris::EngineError>(())
//! ```

pub mod active;
pub mod collision;
pub mod error;
pub mod fill;
pub mod grid;
pub mod lines;
pub mod palette;
pub mod shape;
pub mod sim;

pub use active::{ActiveBlock, SPAWN_Y, rotate, spawn};
pub use collision::can_place;
pub use error::EngineError;
pub use fill::randomly_fill;
pub use grid::{Cell, Dimensions, Grid};
pub use lines::{Resolution, level_for, resolve};
pub use palette::{Palette, PaletteError, PaletteKind, Rgb, Tones};
pub use shape::{Catalog, MASK_SIZE, Mask, Shape, create_catalog};
pub use sim::{DEFAULT_CELL_SIZE, Phase, SimConfig, Simulation, Tick};
