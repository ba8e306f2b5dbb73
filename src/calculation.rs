/// Calculation Engine
///
/// The five supported arithmetic operations and the pure evaluation function.
/// A calculation's result is always derived from (operation, inputs) on
/// demand; it is never stored as an independent source of truth.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CalculationError;

/// Supported operation types, in wire format: "addition", "subtraction",
/// "multiplication", "division", "power".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Power,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
            Operation::Power => "power",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CalculationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "addition" => Ok(Operation::Addition),
            "subtraction" => Ok(Operation::Subtraction),
            "multiplication" => Ok(Operation::Multiplication),
            "division" => Ok(Operation::Division),
            "power" => Ok(Operation::Power),
            other => Err(CalculationError::UnsupportedOperation(other.to_string())),
        }
    }
}

/// Evaluate an operation over an ordered input sequence.
///
/// # Rules
/// - addition/subtraction/multiplication/division fold left over two or
///   more inputs
/// - division by zero is rejected
/// - power requires exactly two inputs; a non-finite result (e.g. 0^-1)
///   is rejected
pub fn evaluate(operation: Operation, inputs: &[f64]) -> Result<f64, CalculationError> {
    if operation == Operation::Power {
        if inputs.len() != 2 {
            return Err(CalculationError::PowerArity(inputs.len()));
        }
        let result = inputs[0].powf(inputs[1]);
        if !result.is_finite() {
            return Err(CalculationError::NonFiniteResult);
        }
        return Ok(result);
    }

    if inputs.len() < 2 {
        return Err(CalculationError::NotEnoughInputs(inputs.len()));
    }

    let mut acc = inputs[0];
    for &value in &inputs[1..] {
        acc = match operation {
            Operation::Addition => acc + value,
            Operation::Subtraction => acc - value,
            Operation::Multiplication => acc * value,
            Operation::Division => {
                if value == 0.0 {
                    return Err(CalculationError::DivisionByZero);
                }
                acc / value
            }
            Operation::Power => unreachable!("handled above"),
        };
    }

    if !acc.is_finite() {
        return Err(CalculationError::NonFiniteResult);
    }

    Ok(acc)
}
