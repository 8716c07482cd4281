//! Game-state engine for a 5x5 "Mines" probability game.
//!
//! A configurable number of bombs hides on a 25-cell grid. The player
//! reveals cells one at a time; each safe reveal grows a payout
//! multiplier, and the player may cash out at any point or keep going.
//! A cosmetic "AI predictor" scores every cell with a display-only
//! safety percentage and suggests a next pick - it derives nothing the
//! client does not already hold and is deliberately not real inference.
//!
//! The engine is synchronous and single-threaded. All randomness flows
//! through a seedable source, so a fixed seed replays identical rounds.
//!
//! ```rust
//! use mines_engine::{GameEngine, GameParams};
//!
//! let mut engine = GameEngine::with_seed(42);
//! engine.start(GameParams { bombs: 3, bet: 100 })?;
//!
//! // Reveal the predictor's suggestion, then take the payout.
//! let pick = engine.recommend().unwrap();
//! engine.reveal(pick.index)?;
//! let payout = engine.cash_out()?;
//! assert_eq!(payout, 124); // x1.24 after one safe reveal against 3 bombs
//! # Ok::<(), mines_engine::InvalidMove>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod logic;
pub mod predictor;
pub mod rng;

pub use config::{BOMB_PRESETS, GameParams, MAX_BOMBS, MIN_BOMBS, PredictorConfig};
pub use data::{
    Cell, CellState, CellView, GRID_SIZE, Phase, Round, RoundSnapshot, SessionStats, TOTAL_CELLS,
};
pub use error::InvalidMove;
pub use logic::{GameEngine, Reveal, multiplier};
pub use predictor::Recommendation;
pub use rng::EngineRng;
