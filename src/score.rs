pub const MAX_STARS: u8 = 5;

/// Star score kept in half-star units so it only ever moves in exact 0.5 steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score {
    half_stars: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Star {
    Full,
    Half,
    Lost,
}

impl Score {
    pub fn full() -> Self {
        Self {
            half_stars: MAX_STARS * 2,
        }
    }

    pub fn value(self) -> f64 {
        self.half_stars as f64 / 2.0
    }

    /// Half a star off for a wrong answer, never below zero.
    pub fn penalize(&mut self) {
        self.half_stars = self.half_stars.saturating_sub(1);
    }

    /// Star `i` (1-based) is full when the score reaches `i`, half when it
    /// reaches `i - 0.5`, lost otherwise.
    pub fn stars(self) -> [Star; MAX_STARS as usize] {
        std::array::from_fn(|idx| {
            let full_at = (idx as u8 + 1) * 2;
            if self.half_stars >= full_at {
                Star::Full
            } else if self.half_stars + 1 >= full_at {
                Star::Half
            } else {
                Star::Lost
            }
        })
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::full()
    }
}
