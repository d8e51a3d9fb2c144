use stimrig_core::Method;

/// Staircase state for one adaptive variable.
///
/// Stepped once per trial from the previous trial's binary outcome:
/// 0 moves the index up, 1 moves it down, subject to the method's run rule.
/// The index never leaves `[0, len-1]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdaptiveState {
    pub index: usize,
    run: u32,
    starting: bool,
}

impl AdaptiveState {
    pub fn new() -> AdaptiveState {
        AdaptiveState {
            index: 0,
            run: 0,
            starting: true,
        }
    }

    /// Trial-0 reset: force the configured initial index and forget any run.
    pub fn reset(&mut self, initial: usize, len: usize) {
        self.index = initial.min(len.saturating_sub(1));
        self.run = 0;
        self.starting = true;
    }

    pub fn step(&mut self, method: Method, outcome: u8, len: usize) {
        let top = len.saturating_sub(1);
        match method {
            Method::None => {}
            Method::Zero => match outcome {
                0 => self.index = 1.min(top),
                1 => self.index = 0,
                _ => {}
            },
            Method::One => match outcome {
                0 => {
                    if self.index < top {
                        self.index += 1;
                    }
                }
                1 => {
                    if self.index > 0 {
                        self.index -= 1;
                    }
                }
                _ => {}
            },
            Method::Two => self.step_staircase(outcome, 1, top),
            Method::Three => self.step_staircase(outcome, 2, top),
        }
    }

    /// Shared rule for the 2-up and 3-up staircases: an up outcome always
    /// moves up and clears the run; a down outcome only moves down once the
    /// run reaches `trigger` (or right away while still starting).
    fn step_staircase(&mut self, outcome: u8, trigger: u32, top: usize) {
        match outcome {
            0 => {
                self.run = 0;
                self.starting = false;
                if self.index < top {
                    self.index += 1;
                }
            }
            1 => {
                if self.run == trigger || self.starting {
                    self.run = 0;
                    if self.index > 0 {
                        self.index -= 1;
                    }
                } else {
                    self.run += 1;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(method: Method, initial: usize, len: usize, outcomes: &[u8]) -> Vec<usize> {
        let mut state = AdaptiveState::new();
        state.reset(initial, len);
        outcomes
            .iter()
            .map(|&o| {
                state.step(method, o, len);
                state.index
            })
            .collect()
    }

    #[test]
    fn method_one_walks_up_and_clamps_at_bottom() {
        assert_eq!(trace(Method::One, 0, 5, &[0, 0, 0]), vec![1, 2, 3]);
        assert_eq!(trace(Method::One, 0, 5, &[1, 1, 1]), vec![0, 0, 0]);
    }

    #[test]
    fn method_one_clamps_at_top() {
        assert_eq!(trace(Method::One, 3, 5, &[0, 0, 0]), vec![4, 4, 4]);
    }

    #[test]
    fn method_zero_is_a_flag() {
        assert_eq!(trace(Method::Zero, 0, 3, &[0, 0, 1, 0]), vec![1, 1, 0, 1]);
    }

    #[test]
    fn method_two_steps_down_on_second_consecutive_down() {
        assert_eq!(trace(Method::Two, 0, 5, &[0, 1, 1, 1]), vec![1, 1, 0, 0]);
    }

    #[test]
    fn method_two_steps_down_immediately_while_starting() {
        // no up outcome has been seen yet, a single down outcome moves down
        assert_eq!(trace(Method::Two, 2, 5, &[1]), vec![1]);
    }

    #[test]
    fn method_three_steps_down_on_third_consecutive_down() {
        assert_eq!(trace(Method::Three, 0, 5, &[0, 1, 1, 1]), vec![1, 1, 1, 0]);
    }

    #[test]
    fn up_outcome_clears_the_run() {
        // the interleaved up outcome keeps resetting the run, no down step
        assert_eq!(
            trace(Method::Three, 2, 5, &[0, 1, 1, 0, 1, 1]),
            vec![3, 3, 3, 4, 4, 4]
        );
    }

    #[test]
    fn index_stays_in_range_for_any_sequence() {
        for method in [Method::Zero, Method::One, Method::Two, Method::Three] {
            let mut state = AdaptiveState::new();
            state.reset(2, 4);
            for i in 0..200u32 {
                let outcome = ((i * 7 + i / 3) % 2) as u8;
                state.step(method, outcome, 4);
                assert!(state.index < 4);
            }
        }
    }

    #[test]
    fn reset_clamps_initial_index() {
        let mut state = AdaptiveState::new();
        state.reset(10, 3);
        assert_eq!(state.index, 2);
    }
}
