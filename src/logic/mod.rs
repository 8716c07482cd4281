//! Round lifecycle: grid generation, reveals, cash-out and session
//! bookkeeping. Every operation runs to completion synchronously;
//! rejected moves leave the engine untouched.

use tracing::{debug, info, instrument, warn};

use crate::config::{GameParams, MAX_BOMBS, MIN_BOMBS, PredictorConfig};
use crate::data::{
    Cell, CellState, Phase, Round, RoundSnapshot, SessionStats, TOTAL_CELLS, neighbors,
};
use crate::error::InvalidMove;
use crate::predictor::{self, Recommendation};
use crate::rng::EngineRng;

/// Payout factor after `revealed` safe reveals against `bombs` bombs,
/// rounded to two decimal places.
pub fn multiplier(bombs: usize, revealed: usize) -> f64 {
    let safe = (TOTAL_CELLS - bombs) as f64;
    let base = (safe / (safe - revealed as f64 + 1.0)).powf(1.5);
    let bomb_factor = 1.0 + bombs as f64 / TOTAL_CELLS as f64 * 2.0;
    (base * bomb_factor * 100.0).round() / 100.0
}

fn payout(bet: u64, multiplier: f64) -> u64 {
    (bet as f64 * multiplier).round() as u64
}

/// Outcome of an accepted reveal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reveal {
    /// Safe cell, round continues at the new multiplier.
    Safe { multiplier: f64 },
    /// Last safe cell, round won with full payout.
    Cleared { payout: u64 },
    /// Bomb, round lost.
    Bomb,
}

/// The game engine. Owns the active round and the session stats; both
/// are only ever mutated through the operations below.
#[derive(Debug, Clone)]
pub struct GameEngine {
    round: Option<Round>,
    stats: SessionStats,
    predictor: PredictorConfig,
    rng: EngineRng,
    show_probabilities: bool,
}

fn place_bombs(count: usize, rng: &mut EngineRng) -> Vec<bool> {
    let mut bombs = vec![false; TOTAL_CELLS];
    let mut placed = 0;
    // Rejection sampling is fine at this domain size.
    while placed < count {
        let index = rng.index(TOTAL_CELLS);
        if !bombs[index] {
            bombs[index] = true;
            placed += 1;
        }
    }
    bombs
}

fn count_adjacent_bombs(bombs: &[bool], index: usize) -> u8 {
    neighbors(index).into_iter().filter(|&n| bombs[n]).count() as u8
}

fn build_round(params: GameParams, bombs: &[bool]) -> Round {
    let cells = bombs
        .iter()
        .enumerate()
        .map(|(i, &bomb)| Cell {
            bomb,
            adjacent: count_adjacent_bombs(bombs, i),
            state: CellState::Hidden,
            probability: 0,
        })
        .collect();

    Round {
        cells,
        bombs: params.bombs,
        bet: params.bet,
        revealed: 0,
        multiplier: 1.0,
        phase: Phase::Active,
    }
}

impl GameEngine {
    /// Engine with an entropy-seeded random source.
    pub fn new() -> Self {
        Self::with_rng(EngineRng::from_entropy())
    }

    /// Engine with a fixed seed, replaying identical rounds.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(EngineRng::new(seed))
    }

    pub fn with_rng(rng: EngineRng) -> Self {
        Self {
            round: None,
            stats: SessionStats::default(),
            predictor: PredictorConfig::default(),
            rng,
            show_probabilities: true,
        }
    }

    /// Replace the predictor constants.
    pub fn with_predictor(mut self, config: PredictorConfig) -> Self {
        self.predictor = config;
        self
    }

    fn validate(params: &GameParams) -> Result<(), InvalidMove> {
        if !(MIN_BOMBS..=MAX_BOMBS).contains(&params.bombs) {
            warn!("rejecting start with {} bombs", params.bombs);
            return Err(InvalidMove::BombCountOutOfRange {
                bombs: params.bombs,
            });
        }
        if params.bet == 0 {
            warn!("rejecting start with zero bet");
            return Err(InvalidMove::InvalidBet);
        }
        Ok(())
    }

    /// Start a fresh round. An active round is abandoned with no effect
    /// on the session stats.
    #[instrument(level = "trace", skip(self))]
    pub fn start(&mut self, params: GameParams) -> Result<(), InvalidMove> {
        Self::validate(&params)?;
        let layout = place_bombs(params.bombs, &mut self.rng);
        self.install(params, &layout);
        Ok(())
    }

    /// Start a round with an explicit bomb layout, for replays and tests.
    #[instrument(level = "trace", skip(self))]
    pub fn start_with_layout(
        &mut self,
        params: GameParams,
        bomb_indices: &[usize],
    ) -> Result<(), InvalidMove> {
        Self::validate(&params)?;

        if bomb_indices.len() != params.bombs {
            return Err(InvalidMove::BadLayout);
        }
        let mut layout = vec![false; TOTAL_CELLS];
        for &index in bomb_indices {
            if index >= TOTAL_CELLS || layout[index] {
                return Err(InvalidMove::BadLayout);
            }
            layout[index] = true;
        }

        self.install(params, &layout);
        Ok(())
    }

    fn install(&mut self, params: GameParams, layout: &[bool]) {
        if self.round.as_ref().is_some_and(Round::is_active) {
            debug!("abandoning active round on restart");
        }
        info!(
            "starting round: {} bombs, bet {}",
            params.bombs, params.bet
        );

        let mut round = build_round(params, layout);
        predictor::score(&mut round, &self.predictor, &mut self.rng);
        self.round = Some(round);
    }

    /// Reveal one hidden cell.
    #[instrument(level = "trace", skip(self))]
    pub fn reveal(&mut self, index: usize) -> Result<Reveal, InvalidMove> {
        let round = match self.round.as_mut() {
            Some(round) => round,
            None => {
                warn!("reveal with no round started");
                return Err(InvalidMove::NoRound);
            }
        };
        if !round.is_active() {
            warn!("ignoring reveal on finished round");
            return Err(InvalidMove::RoundOver);
        }
        if index >= TOTAL_CELLS {
            warn!("invalid reveal index: {}", index);
            return Err(InvalidMove::OutOfBounds { index });
        }
        if round.cells[index].state != CellState::Hidden {
            debug!("ignoring reveal on non-hidden cell {}", index);
            return Err(InvalidMove::NotHidden { index });
        }

        if round.cells[index].bomb {
            round.cells[index].state = CellState::Revealed;
            round.cells[index].probability = 0;
            round.phase = Phase::Lost;
            self.stats.record_loss(round.bet);
            info!("bomb at cell {} - round lost", index);
            return Ok(Reveal::Bomb);
        }

        round.cells[index].state = CellState::Revealed;
        round.cells[index].probability = 100;
        round.revealed += 1;
        round.multiplier = multiplier(round.bombs, round.revealed);
        debug!(
            "cell {} safe ({} adjacent), multiplier x{}",
            index, round.cells[index].adjacent, round.multiplier
        );

        if round.revealed == round.safe_total() {
            round.phase = Phase::Won;
            let payout = payout(round.bet, round.multiplier);
            self.stats.record_win(payout as i64 - round.bet as i64);
            info!("all safe cells revealed - payout {}", payout);
            return Ok(Reveal::Cleared { payout });
        }

        predictor::score(round, &self.predictor, &mut self.rng);
        Ok(Reveal::Safe {
            multiplier: round.multiplier,
        })
    }

    /// End the round early, locking in the current multiplier.
    #[instrument(level = "trace", skip(self))]
    pub fn cash_out(&mut self) -> Result<u64, InvalidMove> {
        let round = match self.round.as_mut() {
            Some(round) => round,
            None => {
                warn!("cash-out with no round started");
                return Err(InvalidMove::NoRound);
            }
        };
        if !round.is_active() {
            warn!("ignoring cash-out on finished round");
            return Err(InvalidMove::RoundOver);
        }
        if round.revealed == 0 {
            warn!("ignoring cash-out before any reveal");
            return Err(InvalidMove::NothingRevealed);
        }

        round.phase = Phase::Won;
        let payout = payout(round.bet, round.multiplier);
        self.stats.record_win(payout as i64 - round.bet as i64);
        info!(
            "cashed out at x{} - payout {}",
            round.multiplier, payout
        );
        Ok(payout)
    }

    /// Suggested next cell, or `None` when the round is over or no
    /// hidden safe cell remains.
    pub fn recommend(&self) -> Option<Recommendation> {
        self.round.as_ref().and_then(predictor::recommend)
    }

    /// The current round, bomb layout included. This engine makes no
    /// attempt at hiding ground truth from its caller.
    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Serializable view of the current round for the presentation layer.
    pub fn snapshot(&self) -> Option<RoundSnapshot> {
        self.round
            .as_ref()
            .map(|round| RoundSnapshot::of(round, self.show_probabilities))
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Presentation-only toggle carried through to snapshots; has no
    /// effect on the engine itself.
    pub fn set_show_probabilities(&mut self, show: bool) {
        self.show_probabilities = show;
    }

    pub fn show_probabilities(&self) -> bool {
        self.show_probabilities
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_matches_reference_values() {
        // One safe reveal with 3 bombs: (22/22)^1.5 * 1.24 = 1.24.
        assert_eq!(multiplier(3, 1), 1.24);
        // First reveal with 2 bombs: (23/23)^1.5 * 1.16 = 1.16.
        assert_eq!(multiplier(2, 1), 1.16);
    }

    #[test]
    fn multiplier_is_monotonic() {
        for bombs in MIN_BOMBS..=MAX_BOMBS {
            let safe = TOTAL_CELLS - bombs;
            let mut last = 0.0;
            for revealed in 1..=safe {
                let m = multiplier(bombs, revealed);
                assert!(m >= last, "bombs={bombs} revealed={revealed}");
                last = m;
            }
        }
    }

    #[test]
    fn every_bomb_count_places_exactly_that_many() {
        for bombs in MIN_BOMBS..=MAX_BOMBS {
            let mut engine = GameEngine::with_seed(bombs as u64);
            engine
                .start(GameParams { bombs, bet: 10 })
                .expect("valid params");

            let round = engine.round().unwrap();
            assert_eq!(round.cells.len(), TOTAL_CELLS);
            assert_eq!(round.cells.iter().filter(|c| c.bomb).count(), bombs);
            assert_eq!(round.safe_total(), TOTAL_CELLS - bombs);
            assert!(round.is_active());
            assert_eq!(round.multiplier, 1.0);
            assert_eq!(round.revealed, 0);
        }
    }

    #[test]
    fn adjacent_counts_match_brute_force() {
        let mut engine = GameEngine::with_seed(99);
        engine.start(GameParams { bombs: 7, bet: 1 }).unwrap();

        let round = engine.round().unwrap();
        for (i, cell) in round.cells.iter().enumerate() {
            let expected = neighbors(i)
                .into_iter()
                .filter(|&n| round.cells[n].bomb)
                .count() as u8;
            assert_eq!(cell.adjacent, expected, "cell {i}");
        }
    }

    #[test]
    fn same_seed_replays_the_same_grid() {
        let mut a = GameEngine::with_seed(1234);
        let mut b = GameEngine::with_seed(1234);
        a.start(GameParams::default()).unwrap();
        b.start(GameParams::default()).unwrap();

        let bombs_a: Vec<_> = a.round().unwrap().cells.iter().map(|c| c.bomb).collect();
        let bombs_b: Vec<_> = b.round().unwrap().cells.iter().map(|c| c.bomb).collect();
        assert_eq!(bombs_a, bombs_b);
    }

    #[test]
    fn start_rejects_out_of_range_params() {
        let mut engine = GameEngine::with_seed(5);

        assert_eq!(
            engine.start(GameParams { bombs: 1, bet: 100 }),
            Err(InvalidMove::BombCountOutOfRange { bombs: 1 })
        );
        assert_eq!(
            engine.start(GameParams { bombs: 8, bet: 100 }),
            Err(InvalidMove::BombCountOutOfRange { bombs: 8 })
        );
        assert_eq!(
            engine.start(GameParams { bombs: 3, bet: 0 }),
            Err(InvalidMove::InvalidBet)
        );
        assert!(engine.round().is_none());
    }

    #[test]
    fn start_with_layout_validates_indices() {
        let mut engine = GameEngine::with_seed(5);
        let params = GameParams { bombs: 3, bet: 100 };

        assert_eq!(
            engine.start_with_layout(params, &[0, 1]),
            Err(InvalidMove::BadLayout)
        );
        assert_eq!(
            engine.start_with_layout(params, &[0, 1, 25]),
            Err(InvalidMove::BadLayout)
        );
        assert_eq!(
            engine.start_with_layout(params, &[0, 1, 1]),
            Err(InvalidMove::BadLayout)
        );
        assert!(engine.start_with_layout(params, &[0, 1, 2]).is_ok());
    }

    #[test]
    fn fixed_scenario_reveal_then_bomb() {
        let mut engine = GameEngine::with_seed(0);
        engine
            .start_with_layout(GameParams { bombs: 3, bet: 100 }, &[0, 1, 2])
            .unwrap();

        let outcome = engine.reveal(24).unwrap();
        assert_eq!(outcome, Reveal::Safe { multiplier: 1.24 });
        assert_eq!(engine.round().unwrap().revealed, 1);

        let outcome = engine.reveal(0).unwrap();
        assert_eq!(outcome, Reveal::Bomb);

        let round = engine.round().unwrap();
        assert_eq!(round.phase, Phase::Lost);
        // A bomb reveal never touches the safe-reveal counter.
        assert_eq!(round.revealed, 1);

        let stats = engine.stats();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.wins, 0);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.total_profit, -100);
    }

    #[test]
    fn reveal_rejections_leave_state_untouched() {
        let mut engine = GameEngine::with_seed(8);
        assert_eq!(engine.reveal(0), Err(InvalidMove::NoRound));

        engine
            .start_with_layout(GameParams { bombs: 2, bet: 50 }, &[10, 11])
            .unwrap();

        assert_eq!(engine.reveal(25), Err(InvalidMove::OutOfBounds { index: 25 }));

        engine.reveal(0).unwrap();
        assert_eq!(engine.reveal(0), Err(InvalidMove::NotHidden { index: 0 }));
        assert_eq!(engine.round().unwrap().revealed, 1);

        engine.reveal(10).unwrap(); // bomb, round over
        assert_eq!(engine.reveal(1), Err(InvalidMove::RoundOver));
        assert_eq!(engine.stats().games_played, 1);
    }

    #[test]
    fn revealing_every_safe_cell_wins() {
        let mut engine = GameEngine::with_seed(2);
        engine
            .start_with_layout(GameParams { bombs: 2, bet: 100 }, &[0, 1])
            .unwrap();

        let mut last = Reveal::Safe { multiplier: 1.0 };
        for index in 2..TOTAL_CELLS {
            last = engine.reveal(index).unwrap();
        }

        let round = engine.round().unwrap();
        assert_eq!(round.phase, Phase::Won);
        assert_eq!(round.revealed, 23);

        let expected_payout = payout(100, multiplier(2, 23));
        assert_eq!(last, Reveal::Cleared { payout: expected_payout });

        let stats = engine.stats();
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.total_profit, expected_payout as i64 - 100);
    }

    #[test]
    fn cash_out_requires_a_revealed_cell() {
        let mut engine = GameEngine::with_seed(3);
        assert_eq!(engine.cash_out(), Err(InvalidMove::NoRound));

        engine
            .start_with_layout(GameParams { bombs: 3, bet: 100 }, &[0, 1, 2])
            .unwrap();
        assert_eq!(engine.cash_out(), Err(InvalidMove::NothingRevealed));

        // Rejection left the round running.
        let round = engine.round().unwrap();
        assert!(round.is_active());
        assert_eq!(engine.stats().games_played, 0);
    }

    #[test]
    fn cash_out_locks_in_the_multiplier() {
        let mut engine = GameEngine::with_seed(3);
        engine
            .start_with_layout(GameParams { bombs: 3, bet: 100 }, &[0, 1, 2])
            .unwrap();
        engine.reveal(24).unwrap();

        let payout = engine.cash_out().unwrap();
        assert_eq!(payout, 124); // 100 * 1.24

        let round = engine.round().unwrap();
        assert_eq!(round.phase, Phase::Won);

        let stats = engine.stats();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.best_streak, 1);
        assert_eq!(stats.total_profit, 24);

        // Terminal round, no further actions.
        assert_eq!(engine.cash_out(), Err(InvalidMove::RoundOver));
        assert_eq!(engine.reveal(23), Err(InvalidMove::RoundOver));
    }

    #[test]
    fn restart_abandons_the_active_round_silently() {
        let mut engine = GameEngine::with_seed(6);
        engine
            .start_with_layout(GameParams { bombs: 2, bet: 100 }, &[0, 1])
            .unwrap();
        engine.reveal(24).unwrap();

        engine.start(GameParams { bombs: 5, bet: 10 }).unwrap();

        let round = engine.round().unwrap();
        assert_eq!(round.bombs, 5);
        assert_eq!(round.revealed, 0);
        assert_eq!(engine.stats().games_played, 0);
    }

    #[test]
    fn multiplier_never_decreases_during_play() {
        let mut engine = GameEngine::with_seed(77);
        engine.start(GameParams { bombs: 5, bet: 100 }).unwrap();

        let mut last = 1.0;
        while let Some(pick) = engine.recommend() {
            match engine.reveal(pick.index).unwrap() {
                Reveal::Safe { multiplier } => {
                    assert!(multiplier >= last);
                    last = multiplier;
                }
                Reveal::Cleared { .. } => break,
                Reveal::Bomb => unreachable!("recommendation never picks a bomb"),
            }
        }
    }

    #[test]
    fn snapshot_reflects_round_state() {
        let mut engine = GameEngine::with_seed(4);
        assert!(engine.snapshot().is_none());

        engine
            .start_with_layout(GameParams { bombs: 2, bet: 100 }, &[0, 1])
            .unwrap();
        engine.reveal(24).unwrap();
        engine.set_show_probabilities(false);

        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.grid.len(), crate::data::GRID_SIZE);
        assert!(snapshot.grid.iter().all(|row| row.len() == crate::data::GRID_SIZE));
        assert_eq!(snapshot.revealed, 1);
        assert!(snapshot.active && !snapshot.won && !snapshot.lost);
        assert!(!snapshot.show_probabilities);
        assert_eq!(
            snapshot.grid[4][4],
            crate::data::CellView::Revealed { adjacent: 0 }
        );
    }
}
