use serde::{Deserialize, Serialize};

/// Width and height of the square grid.
pub const GRID_SIZE: usize = 5;
/// Number of cells on the grid.
pub const TOTAL_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Visibility state of a cell. `Marked` and `Flagged` exist for
/// presentation layers that want bomb markers; the engine itself only
/// ever moves cells from `Hidden` to `Revealed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Hidden,
    Marked,
    Flagged,
    Revealed,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub bomb: bool,
    /// Bombs in the Moore neighborhood, fixed at round start.
    pub adjacent: u8,
    pub state: CellState,
    /// Advisory "safety" percentage (0-100) recomputed every turn.
    pub probability: u8,
}

/// Lifecycle of a round. `Won` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Won,
    Lost,
}

/// One playthrough from grid generation to win or loss.
#[derive(Debug, Clone)]
pub struct Round {
    pub cells: Vec<Cell>,
    pub bombs: usize,
    pub bet: u64,
    /// Safe cells revealed so far.
    pub revealed: usize,
    /// Current payout factor, locked in by a cash-out.
    pub multiplier: f64,
    pub phase: Phase,
}

impl Round {
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Number of non-bomb cells on the grid.
    pub fn safe_total(&self) -> usize {
        TOTAL_CELLS - self.bombs
    }
}

/// In-bounds Moore neighbors of a cell index.
pub fn neighbors(index: usize) -> Vec<usize> {
    let row = (index / GRID_SIZE) as i32;
    let col = (index % GRID_SIZE) as i32;
    let mut out = Vec::with_capacity(8);

    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }

            let new_row = row + dy;
            let new_col = col + dx;

            if new_row >= 0
                && new_row < GRID_SIZE as i32
                && new_col >= 0
                && new_col < GRID_SIZE as i32
            {
                out.push((new_row as usize) * GRID_SIZE + new_col as usize);
            }
        }
    }

    out
}

/// Running aggregates across rounds, reset only on process restart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub games_played: u32,
    pub wins: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_profit: i64,
}

impl SessionStats {
    pub(crate) fn record_win(&mut self, profit: i64) {
        self.games_played += 1;
        self.wins += 1;
        self.current_streak += 1;
        self.best_streak = self.best_streak.max(self.current_streak);
        self.total_profit += profit;
    }

    pub(crate) fn record_loss(&mut self, bet: u64) {
        self.games_played += 1;
        self.current_streak = 0;
        self.total_profit -= bet as i64;
    }
}

/// Presentation view of a single cell.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "state")]
pub enum CellView {
    #[serde(rename = "hidden")]
    Hidden { probability: u8 },
    #[serde(rename = "revealed")]
    Revealed { adjacent: u8 },
    #[serde(rename = "bomb")]
    Bomb,
}

impl From<&Cell> for CellView {
    fn from(value: &Cell) -> Self {
        match value.state {
            CellState::Revealed if value.bomb => Self::Bomb,
            CellState::Revealed => Self::Revealed {
                adjacent: value.adjacent,
            },
            _ => Self::Hidden {
                probability: value.probability,
            },
        }
    }
}

/// Full round state as queried by the presentation layer after each call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub bombs: usize,
    pub bet: u64,
    pub revealed: usize,
    pub multiplier: f64,
    pub active: bool,
    pub won: bool,
    pub lost: bool,
    /// Presentation-only flag, no engine effect.
    pub show_probabilities: bool,
    pub grid: Vec<Vec<CellView>>,
}

impl RoundSnapshot {
    pub(crate) fn of(round: &Round, show_probabilities: bool) -> Self {
        Self {
            bombs: round.bombs,
            bet: round.bet,
            revealed: round.revealed,
            multiplier: round.multiplier,
            active: round.phase == Phase::Active,
            won: round.phase == Phase::Won,
            lost: round.phase == Phase::Lost,
            show_probabilities,
            grid: round
                .cells
                .iter()
                .map(|cell| cell.into())
                .collect::<Vec<CellView>>()
                .chunks(GRID_SIZE)
                .map(|chunk| chunk.to_vec())
                .collect(),
        }
    }
}
