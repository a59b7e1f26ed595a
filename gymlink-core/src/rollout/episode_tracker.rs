//! Bookkeeping of episode returns across vectorized environments.

/// Accumulates unshaped rewards per environment and remembers the returns of
/// the most recent finished episodes.
///
/// Finished episodes are written into a circular history of `window` entries,
/// at index `episode_count % window`.
#[derive(Debug, Clone)]
pub struct EpisodeTracker {
    running_rewards: Vec<f32>,
    history: Vec<f32>,
    episode_count: usize,
}

impl EpisodeTracker {
    /// Constructs a tracker for `num_envs` environments averaging over `window` episodes.
    pub fn new(num_envs: usize, window: usize) -> Self {
        assert!(window >= 1, "window of the reward average must be at least 1");
        Self {
            running_rewards: vec![0.0; num_envs],
            history: vec![0.0; window],
            episode_count: 0,
        }
    }

    /// Adds the rewards of one step and closes the episodes flagged in `is_done`.
    ///
    /// Returns the number of episodes finished on this step.
    pub fn observe(&mut self, real_rewards: &[f32], is_done: &[bool]) -> usize {
        assert_eq!(real_rewards.len(), self.running_rewards.len());
        assert_eq!(is_done.len(), self.running_rewards.len());

        let mut finished = 0;
        for (i, (&r, &done)) in real_rewards.iter().zip(is_done).enumerate() {
            self.running_rewards[i] += r;
            if done {
                let ix = self.episode_count % self.history.len();
                self.history[ix] = self.running_rewards[i];
                self.running_rewards[i] = 0.0;
                self.episode_count += 1;
                finished += 1;
            }
        }
        finished
    }

    /// Rewards accumulated so far in the current episode of each environment.
    pub fn running_rewards(&self) -> &[f32] {
        &self.running_rewards
    }

    /// Returns of the finished episodes kept in the window.
    ///
    /// Before the window is full, only the written entries are returned, in
    /// order of completion. After that, the slice is the raw circular buffer.
    pub fn history(&self) -> &[f32] {
        &self.history[..self.episode_count.min(self.history.len())]
    }

    /// Total number of finished episodes.
    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    /// Mean return over the window, or `None` if no episode has finished yet.
    pub fn average(&self) -> Option<f32> {
        let filled = self.history();
        if filled.is_empty() {
            None
        } else {
            Some(filled.iter().sum::<f32>() / filled.len() as f32)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_single_env_matches_reference() {
        let script = [
            (1.0, false),
            (2.0, false),
            (3.0, true),
            (-1.0, false),
            (0.5, true),
            (4.0, false),
        ];
        let mut tracker = EpisodeTracker::new(1, 10);

        let mut running = 0.0;
        let mut finished = vec![];
        for &(r, done) in script.iter() {
            tracker.observe(&[r], &[done]);
            running += r;
            if done {
                finished.push(running);
                running = 0.0;
            }
            assert_eq!(tracker.running_rewards(), &[running]);
        }

        assert_eq!(tracker.history(), finished.as_slice());
        assert_eq!(tracker.episode_count(), 2);
        assert_eq!(tracker.average(), Some((6.0 - 0.5) / 2.0));
    }

    #[test]
    fn test_window_wraps() {
        let mut tracker = EpisodeTracker::new(1, 3);
        assert_eq!(tracker.average(), None);

        for ep in 1..=5 {
            tracker.observe(&[ep as f32], &[true]);
        }

        // episodes 4 and 5 overwrote slots 0 and 1
        assert_eq!(tracker.history(), &[4.0, 5.0, 3.0]);
        assert_eq!(tracker.episode_count(), 5);
        assert_eq!(tracker.average(), Some(4.0));
    }

    #[test]
    fn test_envs_are_independent() {
        let mut tracker = EpisodeTracker::new(2, 10);
        assert_eq!(tracker.observe(&[1.0, 10.0], &[false, false]), 0);
        assert_eq!(tracker.observe(&[1.0, 10.0], &[false, true]), 1);
        assert_eq!(tracker.running_rewards(), &[2.0, 0.0]);
        assert_eq!(tracker.history(), &[20.0]);
        assert_eq!(tracker.observe(&[1.0, 1.0], &[true, true]), 2);
        assert_eq!(tracker.history(), &[20.0, 3.0, 1.0]);
    }
}
