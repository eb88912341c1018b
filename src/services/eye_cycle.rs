use serde::Serialize;
use std::time::Duration;

pub const PHASE_DWELL: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EyePhase {
    Open,
    LeftClosed,
    RightClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    None,
    Down,
    Up,
}

impl EyePhase {
    pub fn scroll_direction(&self) -> ScrollDirection {
        match self {
            EyePhase::Open => ScrollDirection::None,
            EyePhase::LeftClosed => ScrollDirection::Down,
            EyePhase::RightClosed => ScrollDirection::Up,
        }
    }
}

/// Hero demo: wink left, rest, wink right, then a longer rest.
const CYCLE: [EyePhase; 6] = [
    EyePhase::Open,
    EyePhase::LeftClosed,
    EyePhase::Open,
    EyePhase::RightClosed,
    EyePhase::Open,
    EyePhase::Open,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EyeDemoFrame {
    pub step: usize,
    pub phase: EyePhase,
    pub scroll: ScrollDirection,
    pub remaining_ms: u64,
}

/// Frame of the demo cycle `elapsed` after it started.
pub fn frame_at(elapsed: Duration) -> EyeDemoFrame {
    let dwell = PHASE_DWELL.as_millis();
    let elapsed_ms = elapsed.as_millis();
    let step = ((elapsed_ms / dwell) % CYCLE.len() as u128) as usize;
    let phase = CYCLE[step];
    EyeDemoFrame {
        step,
        phase,
        scroll: phase.scroll_direction(),
        remaining_ms: (dwell - elapsed_ms % dwell) as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_winks_left_then_right() {
        let phases: Vec<EyePhase> = (0..6)
            .map(|i| frame_at(PHASE_DWELL * i).phase)
            .collect();
        assert_eq!(phases, CYCLE.to_vec());
        assert_eq!(frame_at(PHASE_DWELL).scroll, ScrollDirection::Down);
        assert_eq!(frame_at(PHASE_DWELL * 3).scroll, ScrollDirection::Up);
    }

    #[test]
    fn cycle_wraps_after_six_phases() {
        assert_eq!(frame_at(PHASE_DWELL * 6).step, 0);
        assert_eq!(frame_at(PHASE_DWELL * 7).phase, EyePhase::LeftClosed);
    }

    #[test]
    fn remaining_time_counts_down_within_phase() {
        assert_eq!(frame_at(Duration::ZERO).remaining_ms, 1500);
        assert_eq!(frame_at(Duration::from_millis(1600)).remaining_ms, 1400);
    }
}
