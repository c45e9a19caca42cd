use crate::config::{ConfigRow, Operator};
use crate::error::{GameError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Number(i64),
    Operator(Operator),
    Equals,
    Unknown,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Equals => f.write_str("="),
            Token::Unknown => f.write_str("?"),
        }
    }
}

/// Where the generator gets its operands from.
pub trait NumberSource: fmt::Debug {
    /// Draw an integer from `lo..=hi`. Callers guarantee `lo <= hi`.
    fn draw(&mut self, lo: i64, hi: i64) -> i64;
}

/// Uniform draws from a `rand` RNG.
#[derive(Debug, Clone)]
pub struct RandomSource<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomSource<StdRng> {
    /// Seeded when a seed is given (reproducible games), from entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng)
    }
}

impl<R: Rng + fmt::Debug> NumberSource for RandomSource<R> {
    fn draw(&mut self, lo: i64, hi: i64) -> i64 {
        if lo >= hi {
            return hi;
        }
        self.rng.gen_range(lo..=hi)
    }
}

/// Replays a fixed list of draws, each pulled into the feasible range. Once
/// exhausted it keeps answering the low bound.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    draws: VecDeque<i64>,
}

impl ScriptedSource {
    pub fn new<I: IntoIterator<Item = i64>>(draws: I) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }
}

impl NumberSource for ScriptedSource {
    fn draw(&mut self, lo: i64, hi: i64) -> i64 {
        self.draws
            .pop_front()
            .map(|v| v.max(lo).min(hi))
            .unwrap_or(lo)
    }
}

/// Feasible operand range for `row`, given the operator written before it and
/// the running result so far.
///
/// After `-` the high bound is capped at the running result so the chain never
/// goes negative. After `/` zero is excluded; if nothing positive is left the
/// range collapses to `1..=1`. In every case `lo` is narrowed down to `hi`
/// rather than failing when `min > max`.
pub fn clamp_range(row: &ConfigRow, prev_operator: Option<Operator>, running_result: i64) -> (i64, i64) {
    match prev_operator {
        Some(Operator::Sub) => {
            let hi = row.max.min(running_result);
            (row.min.min(hi), hi)
        }
        Some(Operator::Div) => {
            let hi = row.max.max(1);
            (row.min.max(1).min(hi), hi)
        }
        _ => (row.min.min(row.max), row.max),
    }
}

/// Builds the token sequence `n0 op0 n1 op1 ... nk = ?` from the config rows.
///
/// The last row's operator is treated as `=` whatever it says; `=` anywhere
/// else is rejected.
pub fn generate<S: NumberSource + ?Sized>(rows: &[ConfigRow], source: &mut S) -> Result<Vec<Token>> {
    if rows.is_empty() {
        return Err(GameError::InvalidConfig("config has no rows".into()));
    }

    let last = rows.len() - 1;
    let mut tokens = Vec::with_capacity(rows.len() * 2 + 1);
    let mut running_result = 0;
    let mut prev_operator = None;

    for (idx, row) in rows.iter().enumerate() {
        let (lo, hi) = clamp_range(row, prev_operator, running_result);
        let number = source.draw(lo, hi);

        running_result = match prev_operator {
            None => number,
            Some(op) => op.apply(running_result, number).ok_or_else(|| {
                GameError::InvalidConfig(format!("row {} would divide by zero", idx + 1))
            })?,
        };
        tokens.push(Token::Number(number));

        if idx == last {
            tokens.push(Token::Equals);
            tokens.push(Token::Unknown);
        } else if row.operator.is_arithmetic() {
            tokens.push(Token::Operator(row.operator));
            prev_operator = Some(row.operator);
        } else {
            return Err(GameError::InvalidConfig(format!(
                "row {} uses '=' before the last row",
                idx + 1
            )));
        }
    }

    log::debug!(
        "generated {} = {}",
        tokens.iter().take(tokens.len() - 2).map(Token::to_string).collect::<Vec<_>>().join(" "),
        running_result
    );
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn row(min: i64, max: i64, operator: Operator) -> ConfigRow {
        ConfigRow::new(min, max, operator)
    }

    #[test]
    fn scripted_default_scenario() {
        let cfg = GameConfig::default();
        let mut source = ScriptedSource::new([10, 15, 7]);
        let tokens = generate(cfg.rows(), &mut source).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number(10),
                Token::Operator(Operator::Add),
                Token::Number(15),
                Token::Operator(Operator::Sub),
                Token::Number(7),
                Token::Equals,
                Token::Unknown,
            ]
        );
        let text: Vec<String> = tokens.iter().map(Token::to_string).collect();
        assert_eq!(text.join(" "), "10 + 15 - 7 = ?");
    }

    #[test]
    fn clamp_after_subtraction_caps_at_running_result() {
        assert_eq!(clamp_range(&row(7, 20, Operator::Equals), Some(Operator::Sub), 12), (7, 12));
        // min above the cap narrows down instead of failing
        assert_eq!(clamp_range(&row(7, 20, Operator::Equals), Some(Operator::Sub), 3), (3, 3));
    }

    #[test]
    fn clamp_other_operators_keep_row_bounds() {
        assert_eq!(clamp_range(&row(7, 20, Operator::Add), None, 0), (7, 20));
        assert_eq!(clamp_range(&row(7, 20, Operator::Add), Some(Operator::Add), 3), (7, 20));
        assert_eq!(clamp_range(&row(7, 20, Operator::Add), Some(Operator::Mul), 3), (7, 20));
        assert_eq!(clamp_range(&row(9, 4, Operator::Add), Some(Operator::Add), 3), (4, 4));
    }

    #[test]
    fn clamp_after_division_excludes_zero() {
        assert_eq!(clamp_range(&row(0, 5, Operator::Add), Some(Operator::Div), 30), (1, 5));
        assert_eq!(clamp_range(&row(0, 0, Operator::Add), Some(Operator::Div), 30), (1, 1));
        assert_eq!(clamp_range(&row(-4, -1, Operator::Add), Some(Operator::Div), 30), (1, 1));
    }

    #[test]
    fn division_by_scripted_zero_is_lifted_to_one() {
        let rows = [row(8, 8, Operator::Div), row(0, 3, Operator::Add), row(1, 1, Operator::Equals)];
        let tokens = generate(&rows, &mut ScriptedSource::new([8, 0, 1])).unwrap();
        assert_eq!(tokens[2], Token::Number(1));
    }

    #[test]
    fn empty_config_is_invalid() {
        assert_matches!(
            generate(&[], &mut ScriptedSource::default()),
            Err(GameError::InvalidConfig(_))
        );
    }

    #[test]
    fn early_equals_is_invalid() {
        let rows = [row(1, 2, Operator::Equals), row(1, 2, Operator::Add), row(1, 2, Operator::Equals)];
        assert_matches!(
            generate(&rows, &mut ScriptedSource::default()),
            Err(GameError::InvalidConfig(_))
        );
    }

    #[test]
    fn last_row_is_terminal_whatever_its_sign() {
        let rows = [row(1, 1, Operator::Add), row(2, 2, Operator::Mul)];
        let tokens = generate(&rows, &mut ScriptedSource::default()).unwrap();
        assert_eq!(&tokens[3..], &[Token::Equals, Token::Unknown]);
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let cfg = GameConfig::default();
        let a = generate(cfg.rows(), &mut RandomSource::from_seed(Some(42))).unwrap();
        let b = generate(cfg.rows(), &mut RandomSource::from_seed(Some(42))).unwrap();
        assert_eq!(a, b);
    }

    fn arb_config() -> impl Strategy<Value = Vec<ConfigRow>> {
        let arb_row = (0i64..40, 0i64..40, prop::sample::select(Operator::ARITHMETIC.to_vec()))
            .prop_map(|(min, max, op)| ConfigRow::new(min, max, op));
        (prop::collection::vec(arb_row, 2..8), 0i64..40, 0i64..40).prop_map(|(mut rows, min, max)| {
            rows.push(ConfigRow::new(min, max, Operator::Equals));
            rows
        })
    }

    proptest! {
        #[test]
        fn chain_never_goes_negative_or_divides_by_zero(rows in arb_config(), seed in any::<u64>()) {
            let tokens = generate(&rows, &mut RandomSource::from_seed(Some(seed))).unwrap();
            prop_assert_eq!(tokens.len(), rows.len() * 2 + 1);

            let mut running = match tokens[0] {
                Token::Number(n) => n,
                other => panic!("expected number, got {:?}", other),
            };
            for pair in tokens[1..tokens.len() - 2].chunks(2) {
                match (pair[0], pair[1]) {
                    (Token::Operator(op), Token::Number(n)) => {
                        if op == Operator::Div {
                            prop_assert_ne!(n, 0);
                        }
                        running = op.apply(running, n).unwrap();
                        prop_assert!(running >= 0, "running result went negative: {:?}", tokens);
                    }
                    other => panic!("unexpected tokens {:?}", other),
                }
            }
        }
    }
}
