//! This module defines [SearchParameters].

use crate::error::Error;

/// Default number of search attempts
pub const DEFAULT_MAX_TRIES: usize = 3;
/// Default probability of a random walk step
pub const DEFAULT_NOISE: f64 = 0.05;
/// Flips per grounded variable if no flip budget is given
pub const FLIP_MULTIPLIER: usize = 10;

/// External parameters affecting the search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParameters {
    /// Flip budget of each attempt;
    /// defaults to [FLIP_MULTIPLIER] times the number of grounded variables
    pub max_flips: Option<usize>,
    /// Number of attempts
    pub max_tries: usize,
    /// Probability of flipping a random atom instead of the best one
    pub noise: f64,
    /// Seed of the random number generator;
    /// a random seed is drawn if none is given
    pub seed: Option<u64>,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            max_flips: None,
            max_tries: DEFAULT_MAX_TRIES,
            noise: DEFAULT_NOISE,
            seed: None,
        }
    }
}

impl SearchParameters {
    /// Set the flip budget of each attempt.
    pub fn with_max_flips(mut self, max_flips: usize) -> Self {
        self.max_flips = Some(max_flips);
        self
    }

    /// Set the number of attempts.
    pub fn with_max_tries(mut self, max_tries: usize) -> Self {
        self.max_tries = max_tries;
        self
    }

    /// Set the probability of a random walk step.
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Set the seed of the random number generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that all parameters are within range.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_tries == 0 {
            return Err(Error::InvalidParameter {
                parameter: "max_tries",
                reason: "at least one attempt is required".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.noise) {
            return Err(Error::InvalidParameter {
                parameter: "noise",
                reason: format!("{} is not a probability", self.noise),
            });
        }

        Ok(())
    }

    /// Return the flip budget for a program with `grounded_variables` variables
    /// occurring in ground rules.
    pub fn flip_budget(&self, grounded_variables: usize) -> usize {
        self.max_flips
            .unwrap_or(FLIP_MULTIPLIER * grounded_variables)
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn defaults() {
        let parameters = SearchParameters::default();

        assert_eq!(parameters.max_tries, DEFAULT_MAX_TRIES);
        assert_eq!(parameters.noise, DEFAULT_NOISE);
        assert_eq!(parameters.flip_budget(7), 70);
        assert_eq!(parameters.with_max_flips(5).flip_budget(7), 5);
        assert!(parameters.validate().is_ok());
    }

    #[test]
    fn validation() {
        let parameters = SearchParameters::default();

        assert!(matches!(
            parameters.with_max_tries(0).validate(),
            Err(Error::InvalidParameter { parameter: "max_tries", .. })
        ));
        assert!(matches!(
            parameters.with_noise(1.5).validate(),
            Err(Error::InvalidParameter { parameter: "noise", .. })
        ));
        assert!(matches!(
            parameters.with_noise(f64::NAN).validate(),
            Err(Error::InvalidParameter { parameter: "noise", .. })
        ));
        assert!(parameters.with_noise(1.0).with_seed(4).validate().is_ok());
    }
}
