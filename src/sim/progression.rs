//! Level progression, run timer, rank and start countdown

use serde::{Deserialize, Serialize};

use super::stickiness::PropTag;
use crate::config::ConfigError;
use crate::consts::COUNTDOWN_START;

/// Player's rank of completion. Ordered best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlayerRank {
    Gold,
    Silver,
    Bronze,
}

impl PlayerRank {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerRank::Gold => "Gold",
            PlayerRank::Silver => "Silver",
            PlayerRank::Bronze => "Bronze",
        }
    }

    /// Localization key for this rank's name
    pub fn localization_key(&self) -> String {
        format!("Rank {}", self.as_str())
    }
}

/// Time limits for each rank, in seconds.
///
/// `gold_time < silver_time` is expected but not enforced; with the limits
/// swapped nobody ever gets Silver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankThresholds {
    pub gold_time: f32,
    pub silver_time: f32,
}

impl RankThresholds {
    pub fn rank_for_time(&self, elapsed: f32) -> PlayerRank {
        if elapsed <= self.gold_time {
            PlayerRank::Gold
        } else if elapsed <= self.silver_time {
            PlayerRank::Silver
        } else {
            PlayerRank::Bronze
        }
    }
}

/// One level: collect `num_to_collect` props of the `stage` class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDef {
    pub stage: PropTag,
    pub num_to_collect: u32,
}

/// Current phase of the run. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Tutorial screen and start countdown
    #[default]
    Countdown,
    /// Active gameplay
    InGame,
    /// Goal reached
    GameOver,
}

/// What the countdown shows for a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownDisplay {
    Number(u8),
    Go,
    Hidden,
}

impl CountdownDisplay {
    pub fn from_value(value: i32) -> Self {
        match value {
            v if v > 0 => CountdownDisplay::Number(v.min(u8::MAX as i32) as u8),
            0 => CountdownDisplay::Go,
            _ => CountdownDisplay::Hidden,
        }
    }
}

/// Result of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownStep {
    pub display: CountdownDisplay,
    /// The countdown has retired; show the first collection target
    pub finished: bool,
}

/// Result of completing a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Moved on to this level index
    Advanced { level: usize },
    /// The last level was completed
    FinishedAll,
}

/// Mutable per-run progress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub props_collected: u32,
    pub current_level: usize,
    pub elapsed_time: f32,
    pub finished_all_levels: bool,
    pub phase: GamePhase,
}

/// Tracks collection progress through the configured levels
#[derive(Debug, Clone)]
pub struct StageProgression {
    levels: Vec<LevelDef>,
    ranks: RankThresholds,
    run: RunState,
    /// Countdown value while counting, `None` before start and after retiring
    countdown: Option<i32>,
}

impl StageProgression {
    pub fn new(levels: Vec<LevelDef>, ranks: RankThresholds) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        Ok(Self {
            levels,
            ranks,
            run: RunState::default(),
            countdown: None,
        })
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn phase(&self) -> GamePhase {
        self.run.phase
    }

    pub fn levels(&self) -> &[LevelDef] {
        &self.levels
    }

    pub fn current_level(&self) -> &LevelDef {
        &self.levels[self.run.current_level]
    }

    /// Props still needed for the current level
    pub fn remaining(&self) -> u32 {
        self.current_level()
            .num_to_collect
            .saturating_sub(self.run.props_collected)
    }

    pub fn rank_for_time(&self, elapsed: f32) -> PlayerRank {
        self.ranks.rank_for_time(elapsed)
    }

    pub fn current_rank(&self) -> PlayerRank {
        self.rank_for_time(self.run.elapsed_time)
    }

    /// The ball only moves during gameplay
    pub fn can_move(&self) -> bool {
        self.run.phase == GamePhase::InGame
    }

    /// The goal only counts once every level is done
    pub fn can_finish(&self) -> bool {
        self.run.phase == GamePhase::InGame && self.run.finished_all_levels
    }

    /// Accumulate run time; only counts during gameplay
    pub fn add_elapsed(&mut self, dt: f32) {
        if self.run.phase == GamePhase::InGame {
            self.run.elapsed_time += dt;
        }
    }

    fn enter_phase(&mut self, phase: GamePhase) {
        if phase > self.run.phase {
            log::info!("Phase {:?} -> {:?}", self.run.phase, phase);
            self.run.phase = phase;
        }
    }

    /// End the run (goal reached)
    pub fn finish(&mut self) {
        self.enter_phase(GamePhase::GameOver);
    }

    /// Count one collected prop, completing the level when the target is hit
    pub fn increment_collected(&mut self) -> Option<StageOutcome> {
        self.run.props_collected += 1;
        if !self.run.finished_all_levels
            && self.run.props_collected >= self.current_level().num_to_collect
        {
            self.on_stage_completed()
        } else {
            None
        }
    }

    /// Advance to the next level, or mark the run finished the first time
    /// the last level completes
    pub fn on_stage_completed(&mut self) -> Option<StageOutcome> {
        if self.run.current_level + 1 < self.levels.len() {
            self.run.current_level += 1;
            self.run.props_collected = 0;
            log::info!("Level {} reached", self.run.current_level + 1);
            Some(StageOutcome::Advanced {
                level: self.run.current_level,
            })
        } else if !self.run.finished_all_levels {
            self.run.finished_all_levels = true;
            log::info!("All {} levels completed", self.levels.len());
            Some(StageOutcome::FinishedAll)
        } else {
            None
        }
    }

    /// Arm the countdown at its start value
    pub fn start_countdown(&mut self) {
        if self.run.phase == GamePhase::Countdown && self.countdown.is_none() {
            self.countdown = Some(COUNTDOWN_START);
        }
    }

    pub fn countdown_active(&self) -> bool {
        self.countdown.is_some()
    }

    /// What the countdown shows right now
    pub fn countdown_display(&self) -> CountdownDisplay {
        CountdownDisplay::from_value(self.countdown.unwrap_or(-1))
    }

    /// One countdown second: show the value, then count down. Gameplay
    /// starts on "Go"; the tick after that retires the countdown.
    pub fn countdown_tick(&mut self) -> Option<CountdownStep> {
        let value = self.countdown?;
        let display = CountdownDisplay::from_value(value);
        if value >= 0 {
            if value == 0 {
                self.enter_phase(GamePhase::InGame);
            }
            self.countdown = Some(value - 1);
            Some(CountdownStep {
                display,
                finished: false,
            })
        } else {
            self.countdown = None;
            self.enter_phase(GamePhase::InGame);
            Some(CountdownStep {
                display,
                finished: true,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RANKS: RankThresholds = RankThresholds {
        gold_time: 60.0,
        silver_time: 120.0,
    };

    fn levels(counts: &[u32]) -> Vec<LevelDef> {
        let tags = [PropTag::Small, PropTag::Medium, PropTag::Large];
        counts
            .iter()
            .enumerate()
            .map(|(i, &n)| LevelDef {
                stage: tags[i % tags.len()],
                num_to_collect: n,
            })
            .collect()
    }

    fn in_game(counts: &[u32]) -> StageProgression {
        let mut p = StageProgression::new(levels(counts), RANKS).unwrap();
        p.start_countdown();
        while p.countdown_tick().is_some() {}
        assert_eq!(p.phase(), GamePhase::InGame);
        p
    }

    #[test]
    fn test_empty_levels_rejected() {
        assert!(matches!(
            StageProgression::new(Vec::new(), RANKS),
            Err(ConfigError::NoLevels)
        ));
    }

    #[test]
    fn test_rank_boundaries() {
        assert_eq!(RANKS.rank_for_time(0.0), PlayerRank::Gold);
        assert_eq!(RANKS.rank_for_time(60.0), PlayerRank::Gold);
        assert_eq!(RANKS.rank_for_time(60.01), PlayerRank::Silver);
        assert_eq!(RANKS.rank_for_time(120.0), PlayerRank::Silver);
        assert_eq!(RANKS.rank_for_time(500.0), PlayerRank::Bronze);
    }

    #[test]
    fn test_countdown_sequence() {
        let mut p = StageProgression::new(levels(&[2]), RANKS).unwrap();
        assert_eq!(p.countdown_display(), CountdownDisplay::Hidden);
        assert!(p.countdown_tick().is_none());

        p.start_countdown();
        let mut shown = Vec::new();
        let mut phases = Vec::new();
        while let Some(step) = p.countdown_tick() {
            shown.push(step.display);
            phases.push(p.phase());
            assert_eq!(step.finished, step.display == CountdownDisplay::Hidden);
        }
        assert_eq!(
            shown,
            vec![
                CountdownDisplay::Number(3),
                CountdownDisplay::Number(2),
                CountdownDisplay::Number(1),
                CountdownDisplay::Go,
                CountdownDisplay::Hidden,
            ]
        );
        assert_eq!(phases[2], GamePhase::Countdown);
        assert_eq!(phases[3], GamePhase::InGame);
        assert!(!p.countdown_active());
    }

    #[test]
    fn test_countdown_cannot_restart_after_game_started() {
        let mut p = in_game(&[2]);
        p.start_countdown();
        assert!(!p.countdown_active());
    }

    #[test]
    fn test_elapsed_only_counts_in_game() {
        let mut p = StageProgression::new(levels(&[2]), RANKS).unwrap();
        p.add_elapsed(5.0);
        assert_eq!(p.run().elapsed_time, 0.0);
        let mut p = in_game(&[2]);
        p.add_elapsed(5.0);
        p.finish();
        p.add_elapsed(5.0);
        assert_eq!(p.run().elapsed_time, 5.0);
    }

    #[test]
    fn test_advance_resets_count() {
        let mut p = in_game(&[2, 3, 1]);
        assert_eq!(p.increment_collected(), None);
        assert_eq!(p.remaining(), 1);
        assert_eq!(
            p.increment_collected(),
            Some(StageOutcome::Advanced { level: 1 })
        );
        assert_eq!(p.run().current_level, 1);
        assert_eq!(p.run().props_collected, 0);
        assert_eq!(p.remaining(), 3);
        assert_eq!(p.current_level().stage, PropTag::Medium);
    }

    #[test]
    fn test_last_level_completes_once() {
        let mut p = in_game(&[1, 2]);
        assert!(p.increment_collected().is_some());
        assert_eq!(p.increment_collected(), None);
        assert_eq!(p.increment_collected(), Some(StageOutcome::FinishedAll));
        assert!(p.can_finish());
        for _ in 0..5 {
            assert_eq!(p.increment_collected(), None);
        }
        assert_eq!(p.on_stage_completed(), None);
        assert_eq!(p.run().current_level, 1);
        assert_eq!(p.remaining(), 0);
    }

    #[test]
    fn test_can_finish_requires_in_game() {
        let mut p = StageProgression::new(levels(&[0]), RANKS).unwrap();
        assert_eq!(p.increment_collected(), Some(StageOutcome::FinishedAll));
        assert!(!p.can_finish());
        p.start_countdown();
        while p.countdown_tick().is_some() {}
        assert!(p.can_finish());
        p.finish();
        assert!(!p.can_finish());
        assert!(!p.can_move());
    }

    #[test]
    fn test_phase_never_regresses() {
        let mut p = in_game(&[1]);
        p.finish();
        p.enter_phase(GamePhase::InGame);
        p.enter_phase(GamePhase::Countdown);
        assert_eq!(p.phase(), GamePhase::GameOver);
    }

    proptest! {
        #[test]
        fn prop_rank_monotonic(t1 in 0.0f32..400.0, dt in 0.0f32..400.0) {
            let t2 = t1 + dt;
            prop_assert!(RANKS.rank_for_time(t1) <= RANKS.rank_for_time(t2));
        }

        #[test]
        fn prop_single_completion_per_level(need in 1u32..20, extra in 0u32..20) {
            let mut p = in_game(&[need]);
            let completions = (0..need + extra)
                .filter_map(|_| p.increment_collected())
                .count();
            prop_assert_eq!(completions, 1);
        }
    }
}
