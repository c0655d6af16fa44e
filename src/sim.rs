//! Tick driver: owns one board and advances it once per externally delivered tick.
//!
//! Nothing here steers the block. Each tick either moves the active block one row down
//! (when the cadence deadline has passed), or locks it, clears lines and spawns the next one.
//! A block that cannot get fully into the grid restarts the game; the loop never ends.

use crate::active::{self, ActiveBlock};
use crate::error::EngineError;
use crate::fill;
use crate::grid::{Dimensions, Grid};
use crate::lines;
use crate::palette::Palette;
use crate::shape::{Catalog, MASK_SIZE, Shape, create_catalog};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Pixels per cell when the host does not choose.
pub const DEFAULT_CELL_SIZE: u16 = 20;

/// A block resting with its frame this high never entered the grid.
const ENTRY_ROW: i32 = -1;

/// Shortest randomly chosen cadence; the random part adds up to the same again.
const BASE_TIME_STEP: Duration = Duration::from_millis(50);

/// Options that shape a simulation. Everything the engine needs arrives here, not through
/// ambient state, and [`Simulation::reconfigure`] applies changes explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub palette: Palette,
    /// Replaces the seven-family catalog when set.
    pub shapes: Option<Vec<Shape>>,
    /// Surface pixels per cell, both axes.
    pub cell_size: u16,
    /// Minimum time between one-row descents; random in 50..100 ms when unset.
    pub time_step: Option<Duration>,
    /// RNG seed; drawn from the thread RNG when unset.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            shapes: None,
            cell_size: DEFAULT_CELL_SIZE,
            time_step: None,
            seed: None,
        }
    }
}

impl SimConfig {
    fn catalog(&self) -> Result<Catalog, EngineError> {
        match &self.shapes {
            Some(shapes) => Catalog::custom(shapes.clone()),
            None => Ok(create_catalog(&self.palette)),
        }
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.cell_size == 0 {
            return Err(EngineError::InvalidCellSize);
        }
        Ok(())
    }
}

/// Where the active block stands relative to the pile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Falling,
    Resting,
    Locking,
    Spawning,
    Reset,
}

/// What a call to [`Simulation::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Block can fall but its cadence deadline has not passed.
    Waiting,
    /// Block moved down one row.
    Stepped,
    /// Block locked into the pile and a new one spawned.
    Locked { cleared: u32 },
    /// Block never entered the grid; the board restarted.
    Reset,
}

#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    catalog: Catalog,
    rng: StdRng,
    seed: u64,
    time_step: Duration,
    /// Last surface size reported by the host, in pixels.
    surface: Option<(u32, u32)>,
    dims: Option<Dimensions>,
    grid: Option<Grid>,
    active: Option<ActiveBlock>,
    phase: Phase,
    next_step: Option<Instant>,
    lines_cleared: u32,
    level: u32,
}

fn random_time_step(rng: &mut impl Rng) -> Duration {
    let jitter = rng.random_range(0..BASE_TIME_STEP.as_micros() as u64);
    BASE_TIME_STEP + Duration::from_micros(jitter)
}

impl Simulation {
    /// A simulation with no board yet; call [`Simulation::resize`] or
    /// [`Simulation::with_dimensions`] before advancing it.
    pub fn new(config: SimConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let catalog = config.catalog()?;
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        let time_step = config
            .time_step
            .unwrap_or_else(|| random_time_step(&mut rng));
        log::info!(
            "simulation seed={seed} time_step={}ms shapes={}",
            time_step.as_millis(),
            catalog.len()
        );
        Ok(Self {
            config,
            catalog,
            rng,
            seed,
            time_step,
            surface: None,
            dims: None,
            grid: None,
            active: None,
            phase: Phase::Reset,
            next_step: None,
            lines_cleared: 0,
            level: 0,
        })
    }

    /// Derive the board size from a surface of `px_width` x `px_height` pixels and start over.
    pub fn resize(&mut self, px_width: u32, px_height: u32) -> Result<Dimensions, EngineError> {
        let dims = Dimensions::from_surface(px_width, px_height, self.config.cell_size)?;
        self.surface = Some((px_width, px_height));
        self.dims = Some(dims);
        self.reset()?;
        Ok(dims)
    }

    /// Use an explicit board size and start over.
    pub fn with_dimensions(&mut self, dims: Dimensions) -> Result<(), EngineError> {
        self.dims = Some(dims);
        self.reset()
    }

    /// Fresh empty board of the current size and a new block. Line totals carry over.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        let dims = self.fresh_grid("reset")?;
        log::info!(
            "reset board {}x{} (lines so far {})",
            dims.width,
            dims.height,
            self.lines_cleared
        );
        self.spawn()
    }

    /// Swap in an empty board of the current size. The resolver pass over it never clears
    /// anything but keeps the counters in step.
    fn fresh_grid(&mut self, operation: &'static str) -> Result<Dimensions, EngineError> {
        let dims = self.dims.ok_or(EngineError::not_initialized(operation))?;
        let mut grid = Grid::new(dims);
        let res = lines::resolve(&mut grid, self.lines_cleared);
        self.lines_cleared = res.lines_cleared;
        self.level = res.level;
        self.grid = Some(grid);
        Ok(dims)
    }

    /// Apply new options. A different cell size changes the board size, so it resets.
    pub fn reconfigure(&mut self, config: SimConfig) -> Result<(), EngineError> {
        config.validate()?;
        let catalog = config.catalog()?;
        let cell_size_changed = config.cell_size != self.config.cell_size;
        if config.time_step != self.config.time_step {
            self.time_step = config
                .time_step
                .unwrap_or_else(|| random_time_step(&mut self.rng));
        }
        self.catalog = catalog;
        self.config = config;

        if cell_size_changed && self.dims.is_some() {
            if let Some((w, h)) = self.surface {
                self.dims = Some(Dimensions::from_surface(w, h, self.config.cell_size)?);
            }
            self.reset()?;
        }
        Ok(())
    }

    fn spawn(&mut self) -> Result<(), EngineError> {
        let dims = self.dims.ok_or(EngineError::not_initialized("spawn"))?;
        self.active = Some(active::spawn(&self.catalog, &mut self.rng, dims.width));
        self.phase = Phase::Falling;
        Ok(())
    }

    /// Run the state machine for one tick at time `now`.
    pub fn advance(&mut self, now: Instant) -> Result<Tick, EngineError> {
        let mut outcome = Tick::Waiting;
        loop {
            match self.phase {
                Phase::Falling => {
                    let grid = self
                        .grid
                        .as_ref()
                        .ok_or(EngineError::not_initialized("check movement"))?;
                    let block = self
                        .active
                        .as_mut()
                        .ok_or(EngineError::not_initialized("check movement"))?;
                    if !block.can_move(grid, 0, 1) {
                        self.phase = Phase::Resting;
                        continue;
                    }
                    if self.next_step.is_some_and(|due| now < due) {
                        return Ok(Tick::Waiting);
                    }
                    self.next_step = Some(now + self.time_step);
                    block.y += 1;
                    return Ok(Tick::Stepped);
                }
                Phase::Resting => {
                    let block = self
                        .active
                        .as_ref()
                        .ok_or(EngineError::not_initialized("rest block"))?;
                    self.phase = if block.y < ENTRY_ROW {
                        Phase::Reset
                    } else {
                        Phase::Locking
                    };
                }
                Phase::Locking => {
                    let cleared = self.lock_active()?;
                    outcome = Tick::Locked { cleared };
                    self.phase = Phase::Spawning;
                }
                Phase::Reset => {
                    log::debug!("block stuck above the board, restarting");
                    self.fresh_grid("reset")?;
                    outcome = Tick::Reset;
                    self.phase = Phase::Spawning;
                }
                Phase::Spawning => {
                    self.spawn()?;
                    return Ok(outcome);
                }
            }
        }
    }

    fn lock_active(&mut self) -> Result<u32, EngineError> {
        let grid = self
            .grid
            .as_mut()
            .ok_or(EngineError::not_initialized("add block to pile"))?;
        let block = self
            .active
            .as_ref()
            .ok_or(EngineError::not_initialized("add block to pile"))?;
        let written = grid.lock(&block.shape, block.x, block.y);
        log::debug!("locked block at ({}, {}), {written} cells", block.x, block.y);
        let res = lines::resolve(grid, self.lines_cleared);
        self.lines_cleared = res.lines_cleared;
        self.level = res.level;
        Ok(res.cleared)
    }

    /// Turn the active block a quarter if it fits where it is. Returns whether it turned.
    /// The tick loop never calls this.
    pub fn rotate_active(&mut self) -> Result<bool, EngineError> {
        let grid = self
            .grid
            .as_ref()
            .ok_or(EngineError::not_initialized("rotate block"))?;
        let block = self
            .active
            .as_mut()
            .ok_or(EngineError::not_initialized("rotate block"))?;
        let mask = active::rotate(block, grid);
        let turned = mask != block.shape.mask;
        block.shape.mask = mask;
        Ok(turned)
    }

    /// Replace the active block, e.g. to script a specific drop. The frame must overlap the
    /// board's columns and sit no further than one board height above it.
    pub fn place_active(&mut self, block: ActiveBlock) -> Result<(), EngineError> {
        let grid = self
            .grid
            .as_ref()
            .ok_or(EngineError::not_initialized("place block"))?;
        let frame = MASK_SIZE as i64;
        let (width, rows) = (grid.width() as i64, grid.rows() as i64);
        let (x, y) = (i64::from(block.x), i64::from(block.y));
        if !(-frame..=width).contains(&x) || !(-(rows + frame)..=rows).contains(&y) {
            return Err(EngineError::OutOfRange {
                x: block.x,
                y: block.y,
            });
        }
        self.active = Some(block);
        self.phase = Phase::Falling;
        Ok(())
    }

    /// Fill the lower half of the board with a random settled pile.
    pub fn randomly_fill(&mut self) -> Result<(), EngineError> {
        let grid = self
            .grid
            .as_mut()
            .ok_or(EngineError::not_initialized("fill board"))?;
        fill::randomly_fill(grid, &self.catalog, &mut self.rng);
        Ok(())
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn active(&self) -> Option<&ActiveBlock> {
        self.active.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dims
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn time_step(&self) -> Duration {
        self.time_step
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use crate::active::SPAWN_Y;
    use crate::shape::Mask;

    fn config(step_ms: u64) -> SimConfig {
        SimConfig {
            time_step: Some(Duration::from_millis(step_ms)),
            seed: Some(1234),
            ..SimConfig::default()
        }
    }

    fn square() -> Shape {
        create_catalog(&Palette::default()).shapes()[0]
    }

    #[test]
    fn operations_before_dimensions_fail() {
        let mut sim = Simulation::new(config(10)).unwrap();
        let now = Instant::now();
        assert!(matches!(sim.advance(now), Err(EngineError::NotInitialized { .. })));
        assert!(matches!(sim.reset(), Err(EngineError::NotInitialized { .. })));
        assert!(matches!(sim.randomly_fill(), Err(EngineError::NotInitialized { .. })));
        assert!(matches!(sim.rotate_active(), Err(EngineError::NotInitialized { .. })));
        assert!(sim.grid().is_none());
        assert!(sim.active().is_none());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let zero = SimConfig {
            cell_size: 0,
            ..SimConfig::default()
        };
        assert_eq!(Simulation::new(zero).unwrap_err(), EngineError::InvalidCellSize);
        let empty = SimConfig {
            shapes: Some(Vec::new()),
            ..SimConfig::default()
        };
        assert_eq!(Simulation::new(empty).unwrap_err(), EngineError::EmptyCatalog);
    }

    #[test]
    fn default_time_step_is_between_50_and_100_ms() {
        for seed in 0..20 {
            let sim = Simulation::new(SimConfig {
                seed: Some(seed),
                ..SimConfig::default()
            })
            .unwrap();
            assert!(sim.time_step() >= Duration::from_millis(50));
            assert!(sim.time_step() < Duration::from_millis(100));
        }
    }

    #[test]
    fn resize_derives_dimensions_and_spawns() {
        let mut sim = Simulation::new(config(10)).unwrap();
        let dims = sim.resize(200, 410).unwrap();
        assert_eq!(dims, Dimensions::new(10, 20));
        assert_eq!(sim.phase(), Phase::Falling);
        let block = sim.active().unwrap();
        assert_eq!(block.y, -4);
        assert_eq!(sim.grid().unwrap().occupied_count(), 0);
    }

    #[test]
    fn cadence_gates_descent() {
        let mut sim = Simulation::new(config(100)).unwrap();
        sim.with_dimensions(Dimensions::new(10, 20)).unwrap();
        let t0 = Instant::now();
        assert_eq!(sim.advance(t0).unwrap(), Tick::Stepped);
        let y = sim.active().unwrap().y;
        assert_eq!(sim.advance(t0 + Duration::from_millis(50)).unwrap(), Tick::Waiting);
        assert_eq!(sim.active().unwrap().y, y);
        assert_eq!(sim.advance(t0 + Duration::from_millis(100)).unwrap(), Tick::Stepped);
        assert_eq!(sim.active().unwrap().y, y + 1);
    }

    #[test]
    fn resting_block_locks_and_respawns() {
        let mut sim = Simulation::new(config(0)).unwrap();
        sim.with_dimensions(Dimensions::new(10, 20)).unwrap();
        sim.place_active(ActiveBlock {
            shape: square(),
            x: 0,
            y: 18,
        })
        .unwrap();
        let outcome = sim.advance(Instant::now()).unwrap();
        assert_eq!(outcome, Tick::Locked { cleared: 0 });
        let grid = sim.grid().unwrap();
        assert_eq!(grid.occupied_count(), 4);
        assert!(grid.is_occupied(1, 19) && grid.is_occupied(2, 20));
        assert_eq!(sim.active().unwrap().y, -4);
        assert_eq!(sim.phase(), Phase::Falling);
    }

    #[test]
    fn blocked_spawn_restarts_board() {
        let shapes = vec![square()];
        let mut sim = Simulation::new(SimConfig {
            shapes: Some(shapes),
            ..config(0)
        })
        .unwrap();
        sim.with_dimensions(Dimensions::new(10, 20)).unwrap();
        let tones = Palette::default().t;
        // Everything but column 0 is full, so no row is complete and squares cannot enter.
        let grid = sim.grid.as_mut().unwrap();
        for y in 0..=20 {
            for x in 1..10 {
                grid.set(x, y, Cell::filled(tones));
            }
        }
        let now = Instant::now();
        assert_eq!(sim.advance(now).unwrap(), Tick::Stepped);
        assert_eq!(sim.advance(now).unwrap(), Tick::Reset);
        assert_eq!(sim.grid().unwrap().occupied_count(), 0);
        assert_eq!(sim.lines_cleared(), 0);
        assert_eq!(sim.active().unwrap().y, -4);
    }

    #[test]
    fn block_entering_the_board_locks_instead_of_resetting() {
        let mut sim = Simulation::new(config(0)).unwrap();
        sim.with_dimensions(Dimensions::new(10, 20)).unwrap();
        let tones = Palette::default().z;
        let grid = sim.grid.as_mut().unwrap();
        for y in 2..=20 {
            grid.set(4, y, Cell::filled(tones));
        }
        // Square mask rows 1..=2: at y=-1 it covers rows 0..=1 right above the column.
        sim.place_active(ActiveBlock {
            shape: square(),
            x: 3,
            y: -1,
        })
        .unwrap();
        assert_eq!(sim.advance(Instant::now()).unwrap(), Tick::Locked { cleared: 0 });
        assert!(sim.grid().unwrap().is_occupied(4, 0));
    }

    #[test]
    fn rotate_active_commits_only_legal_turns() {
        let straight = create_catalog(&Palette::default()).shapes()[1];
        let mut sim = Simulation::new(config(0)).unwrap();
        sim.with_dimensions(Dimensions::new(10, 20)).unwrap();
        sim.place_active(ActiveBlock {
            shape: straight,
            x: 7,
            y: 5,
        })
        .unwrap();
        assert!(!sim.rotate_active().unwrap());
        assert_eq!(sim.active().unwrap().shape.mask, straight.mask);

        sim.place_active(ActiveBlock {
            shape: straight,
            x: 3,
            y: 5,
        })
        .unwrap();
        assert!(sim.rotate_active().unwrap());
        assert_eq!(
            sim.active().unwrap().shape.mask,
            Mask::from_rows(["....", "####", "....", "...."])
        );
    }

    #[test]
    fn reconfigure_cell_size_resets_with_new_dimensions() {
        let mut sim = Simulation::new(config(0)).unwrap();
        sim.resize(200, 400).unwrap();
        sim.randomly_fill().unwrap();
        assert!(sim.grid().unwrap().occupied_count() > 0);

        sim.reconfigure(SimConfig {
            cell_size: 10,
            ..config(0)
        })
        .unwrap();
        assert_eq!(sim.dimensions(), Some(Dimensions::new(20, 40)));
        assert_eq!(sim.grid().unwrap().occupied_count(), 0);
    }

    #[test]
    fn reconfigure_cell_size_resets_explicit_board() {
        let mut sim = Simulation::new(config(0)).unwrap();
        sim.with_dimensions(Dimensions::new(10, 20)).unwrap();
        sim.randomly_fill().unwrap();
        assert!(sim.grid().unwrap().occupied_count() > 0);

        sim.reconfigure(SimConfig {
            cell_size: 5,
            ..config(0)
        })
        .unwrap();
        assert_eq!(sim.dimensions(), Some(Dimensions::new(10, 20)));
        assert_eq!(sim.grid().unwrap().occupied_count(), 0);
        assert_eq!(sim.active().map(|b| b.y), Some(SPAWN_Y));
    }

    #[test]
    fn reconfigure_cell_size_before_sizing_is_deferred() {
        let mut sim = Simulation::new(config(0)).unwrap();
        sim.reconfigure(SimConfig {
            cell_size: 5,
            ..config(0)
        })
        .unwrap();
        assert!(sim.grid().is_none());
        assert_eq!(sim.resize(50, 100).unwrap(), Dimensions::new(10, 20));
    }

    #[test]
    fn place_active_rejects_far_positions() {
        let mut sim = Simulation::new(config(0)).unwrap();
        sim.with_dimensions(Dimensions::new(10, 20)).unwrap();
        let far = [
            (i32::MAX, 0),
            (i32::MIN, 0),
            (0, i32::MAX),
            (0, i32::MIN),
            (11, 0),
            (-5, 0),
            (0, 22),
            (0, -26),
        ];
        for (x, y) in far {
            let err = sim
                .place_active(ActiveBlock { shape: square(), x, y })
                .unwrap_err();
            assert_eq!(err, EngineError::OutOfRange { x, y });
        }
        for (x, y) in [(-4, -25), (10, 21), (3, SPAWN_Y)] {
            sim.place_active(ActiveBlock { shape: square(), x, y }).unwrap();
            sim.advance(Instant::now()).unwrap();
        }
    }

    #[test]
    fn reconfigure_palette_keeps_board() {
        let mut sim = Simulation::new(config(0)).unwrap();
        sim.resize(200, 400).unwrap();
        sim.randomly_fill().unwrap();
        let filled = sim.grid().unwrap().occupied_count();

        sim.reconfigure(SimConfig {
            palette: Palette::black_and_white(),
            ..config(0)
        })
        .unwrap();
        assert_eq!(sim.grid().unwrap().occupied_count(), filled);
        assert!(
            sim.catalog()
                .shapes()
                .iter()
                .all(|s| s.tones == Palette::black_and_white().square)
        );
    }

    #[test]
    fn same_seed_same_game() {
        let run = || {
            let mut sim = Simulation::new(config(0)).unwrap();
            sim.with_dimensions(Dimensions::new(8, 12)).unwrap();
            let now = Instant::now();
            for _ in 0..400 {
                sim.advance(now).unwrap();
            }
            (sim.grid().unwrap().clone(), *sim.active().unwrap())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn long_run_never_errors() {
        let mut sim = Simulation::new(config(0)).unwrap();
        sim.with_dimensions(Dimensions::new(6, 10)).unwrap();
        let now = Instant::now();
        let mut resets = 0;
        for _ in 0..5000 {
            if sim.advance(now).unwrap() == Tick::Reset {
                resets += 1;
            }
            let block = sim.active().unwrap();
            assert!(block.cells().all(|(x, _)| (0..6).contains(&x)));
        }
        assert!(resets > 0);
    }
}
