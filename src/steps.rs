use crate::equation::Token;
use crate::error::{GameError, Result};
use itertools::Itertools;

/// One binary operation the player resolves, spanning two number tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub start_token: usize,
    pub end_token: usize,
    pub expected_result: i64,
    pub wrong_count: u32,
    pub duration_label: Option<String>,
}

impl Step {
    fn new(index: usize, expected_result: i64) -> Self {
        Self {
            start_token: 2 * index,
            end_token: 2 * (index + 1),
            expected_result,
            wrong_count: 0,
            duration_label: None,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.duration_label.is_some()
    }
}

fn number_at(tokens: &[Token], index: usize) -> Result<i64> {
    match tokens.get(index) {
        Some(Token::Number(n)) => Ok(*n),
        _ => Err(GameError::MalformedEquation {
            index,
            reason: "expected a number",
        }),
    }
}

/// Running result after each operator, folding the chain left to right.
/// Entry `i` is the value of `n0 op0 n1 ... op_i n_{i+1}`.
pub fn running_results(tokens: &[Token]) -> Result<Vec<i64>> {
    let mut running = number_at(tokens, 0)?;
    let mut results = Vec::new();
    let mut idx = 1;

    loop {
        match tokens.get(idx) {
            Some(Token::Operator(op)) if op.is_arithmetic() => {
                let rhs = number_at(tokens, idx + 1)?;
                running = op.apply(running, rhs).ok_or(GameError::MalformedEquation {
                    index: idx + 1,
                    reason: "division by zero",
                })?;
                results.push(running);
                idx += 2;
            }
            Some(Token::Equals) => break,
            _ => {
                return Err(GameError::MalformedEquation {
                    index: idx,
                    reason: "expected an operator or '='",
                })
            }
        }
    }

    match tokens.get(idx + 1) {
        Some(Token::Unknown) if tokens.len() == idx + 2 => Ok(results),
        _ => Err(GameError::MalformedEquation {
            index: idx + 1,
            reason: "expected '?' closing the equation",
        }),
    }
}

/// One step per operator, each expecting the running result at that point.
pub fn plan(tokens: &[Token]) -> Result<Vec<Step>> {
    let steps = running_results(tokens)?
        .into_iter()
        .enumerate()
        .map(|(index, expected)| Step::new(index, expected))
        .collect();
    Ok(steps)
}

/// The true answer replacing `?`: the last running result, or the lone number
/// of a one-row equation.
pub fn final_result(tokens: &[Token]) -> Result<i64> {
    match running_results(tokens)?.last() {
        Some(result) => Ok(*result),
        None => number_at(tokens, 0),
    }
}

/// The equation as text with the unknown replaced by `answer`.
pub fn display_text(tokens: &[Token], answer: i64) -> String {
    tokens
        .iter()
        .map(|token| match token {
            Token::Unknown => answer.to_string(),
            other => other.to_string(),
        })
        .join(" ")
}

/// The expression solved at step `index`: `n0 op n1` for the first step, then
/// `previous_result op n`.
pub fn step_expression(tokens: &[Token], steps: &[Step], index: usize) -> String {
    let step = &steps[index];
    let lhs = if index == 0 {
        tokens[step.start_token].to_string()
    } else {
        steps[index - 1].expected_result.to_string()
    };
    format!("{} {} {}", lhs, tokens[step.end_token - 1], tokens[step.end_token])
}
