//! The "AI predictor": per-cell display probabilities and the suggested
//! next cell.
//!
//! Nothing here is real inference. The scores are a heuristic over state
//! the client already holds, shaped so that safe cells trend upward as
//! revealed safe neighbors accumulate and bombs collapse toward the
//! floor. They are recomputed from scratch after every safe reveal.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PredictorConfig;
use crate::data::{CellState, Round, neighbors};
use crate::rng::EngineRng;

/// The heuristically "safest" hidden cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub index: usize,
    pub probability: u8,
}

/// Rescore every cell's display probability in place.
pub(crate) fn score(round: &mut Round, config: &PredictorConfig, rng: &mut EngineRng) {
    let hidden_total = round
        .cells
        .iter()
        .filter(|c| c.state != CellState::Revealed)
        .count();
    let revealed_bombs = round
        .cells
        .iter()
        .filter(|c| c.state == CellState::Revealed && c.bomb)
        .count();
    let bombs_remaining = round.bombs - revealed_bombs;
    let any_safe_revealed = round
        .cells
        .iter()
        .any(|c| c.state == CellState::Revealed && !c.bomb);

    for index in 0..round.cells.len() {
        let cell = &round.cells[index];

        let probability = match cell.state {
            CellState::Revealed => {
                if cell.bomb {
                    0
                } else {
                    100
                }
            }
            _ if cell.bomb => rng.percent_in(config.bomb_display_min, config.bomb_display_max),
            _ => {
                let base =
                    (hidden_total - bombs_remaining) as f64 / hidden_total as f64 * 100.0;

                let mut proximity = 0i32;
                for n in neighbors(index) {
                    let neighbor = &round.cells[n];
                    if neighbor.state != CellState::Revealed || neighbor.bomb {
                        continue;
                    }
                    if neighbor.adjacent == 0 {
                        proximity += config.clear_bonus;
                    } else {
                        proximity -= config.crowd_penalty * neighbor.adjacent as i32;
                    }
                }

                let position_bonus = if any_safe_revealed {
                    config.reveal_bonus
                } else {
                    0
                };

                let raw = base + (proximity + position_bonus) as f64;
                raw.clamp(config.floor as f64, config.ceiling as f64)
                    .round() as u8
            }
        };

        round.cells[index].probability = probability;
    }

    debug!(
        "rescored {} hidden cells ({} bombs unaccounted)",
        hidden_total, bombs_remaining
    );
}

/// Pick the hidden safe cell with the highest display probability.
///
/// Ties go to the cell with more revealed safe neighbors, then to the
/// lower index. Returns `None` once the round is over or no hidden safe
/// cell remains.
pub(crate) fn recommend(round: &Round) -> Option<Recommendation> {
    if !round.is_active() {
        return None;
    }

    let mut best: Option<(usize, u8, usize)> = None;

    for (index, cell) in round.cells.iter().enumerate() {
        if cell.state != CellState::Hidden || cell.bomb {
            continue;
        }

        let safe_neighbors = neighbors(index)
            .into_iter()
            .filter(|&n| {
                let neighbor = &round.cells[n];
                neighbor.state == CellState::Revealed && !neighbor.bomb
            })
            .count();

        let better = match best {
            None => true,
            Some((_, probability, neighbors_seen)) => {
                cell.probability > probability
                    || (cell.probability == probability && safe_neighbors > neighbors_seen)
            }
        };

        if better {
            best = Some((index, cell.probability, safe_neighbors));
        }
    }

    best.map(|(index, probability, _)| Recommendation { index, probability })
}
