use std::fmt;

use rand::{rngs::StdRng, Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
}

impl Operator {
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '×',
        }
    }

    fn apply(&self, a: u32, b: u32) -> u32 {
        match self {
            Operator::Add => a + b,
            Operator::Subtract => a - b,
            Operator::Multiply => a * b,
        }
    }
}

/// An arithmetic question shown next to the submit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenge {
    a: u32,
    b: u32,
    operator: Operator,
    answer: u32,
}

impl Challenge {
    /// Rendered before the page has a randomness source, so server and
    /// browser agree on the first paint.
    pub const PLACEHOLDER: Challenge = Challenge {
        a: 5,
        b: 3,
        operator: Operator::Add,
        answer: 8,
    };

    fn new(a: u32, b: u32, operator: Operator) -> Self {
        let (a, b) = match operator {
            Operator::Subtract if a < b => (b, a),
            _ => (a, b),
        };
        Self {
            a,
            b,
            operator,
            answer: operator.apply(a, b),
        }
    }

    pub fn operands(&self) -> (u32, u32) {
        (self.a, self.b)
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn answer(&self) -> u32 {
        self.answer
    }

    /// Compares user input against the answer. Anything that isn't a
    /// number counts as wrong.
    pub fn verify(&self, input: &str) -> bool {
        input
            .trim()
            .parse::<i64>()
            .is_ok_and(|n| n == i64::from(self.answer))
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} = ?", self.a, self.operator.symbol(), self.b)
    }
}

/// Produces challenges once a randomness source has been attached.
///
/// Starts uninitialized and hands out [`Challenge::PLACEHOLDER`] until
/// [`ChallengeGenerator::initialize`] is called from a context that has
/// entropy (the hydrated browser).
#[derive(Debug, Default)]
pub struct ChallengeGenerator {
    rng: Option<StdRng>,
}

impl ChallengeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn initialize(&mut self) {
        if self.rng.is_none() {
            self.rng = Some(StdRng::from_entropy());
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.rng.is_some()
    }

    pub fn generate(&mut self) -> Challenge {
        let Some(rng) = self.rng.as_mut() else {
            return Challenge::PLACEHOLDER;
        };
        let operator = match rng.gen_range(0..3) {
            0 => Operator::Add,
            1 => Operator::Subtract,
            _ => Operator::Multiply,
        };
        let max = match operator {
            Operator::Multiply => 5,
            Operator::Add | Operator::Subtract => 9,
        };
        Challenge::new(rng.gen_range(1..=max), rng.gen_range(1..=max), operator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninitialized_generator_returns_placeholder() {
        let mut generator = ChallengeGenerator::new();
        assert!(!generator.is_initialized());
        for _ in 0..5 {
            assert_eq!(generator.generate(), Challenge::PLACEHOLDER);
        }
        assert_eq!(Challenge::PLACEHOLDER.to_string(), "5 + 3 = ?");
        assert_eq!(Challenge::PLACEHOLDER.answer(), 8);
    }

    #[test]
    fn test_generated_challenges_stay_in_range() {
        let mut generator = ChallengeGenerator::seeded(7);
        let mut seen = Vec::new();
        for _ in 0..2000 {
            let challenge = generator.generate();
            let (a, b) = challenge.operands();
            let op = challenge.operator();
            match op {
                Operator::Add => {
                    assert!((1..=9).contains(&a) && (1..=9).contains(&b));
                }
                Operator::Subtract => {
                    assert!((1..=9).contains(&a) && (1..=9).contains(&b));
                    assert!(a >= b, "{challenge} should not go negative");
                }
                Operator::Multiply => {
                    assert!((1..=5).contains(&a) && (1..=5).contains(&b));
                }
            }
            assert_eq!(challenge.answer(), op.apply(a, b));
            if !seen.contains(&op) {
                seen.push(op);
            }
        }
        assert_eq!(seen.len(), 3, "every operator should come up");
    }

    #[test]
    fn test_subtraction_swaps_operands() {
        let challenge = Challenge::new(2, 7, Operator::Subtract);
        assert_eq!(challenge.operands(), (7, 2));
        assert_eq!(challenge.answer(), 5);
    }

    #[test]
    fn test_verify() {
        let challenge = Challenge::new(4, 5, Operator::Multiply);
        assert!(challenge.verify("20"));
        assert!(challenge.verify(" 20 "));
        assert!(!challenge.verify("21"));
        assert!(!challenge.verify("-20"));
        assert!(!challenge.verify("twenty"));
        assert!(!challenge.verify(""));
    }

    #[test]
    fn test_initialize_keeps_existing_source() {
        let mut generator = ChallengeGenerator::seeded(1);
        let mut reference = ChallengeGenerator::seeded(1);
        generator.initialize();
        assert_eq!(generator.generate(), reference.generate());
    }
}
