//! Routes a `/bfhl` body to the kernel or the AI delegate by its single key.
//!
//! All shape and bound checks happen in [`Operation::parse`], before any
//! computation runs.

use super::ai::AiDelegate;
use super::math::{self, KernelError, DIVISOR_MAX_ELEMENTS, FIBONACCI_MAX, PRIME_MAX_ELEMENTS};
use crate::dtos::OperationOutput;
use crate::error::BfhlError;
use metrics::counter;
use serde_json::{Map, Value};

/// Longest accepted `AI` question, in characters.
pub const AI_QUESTION_MAX_CHARS: usize = 500;

/// A validated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Fibonacci(i64),
    Prime(Vec<i64>),
    Lcm(Vec<i64>),
    Hcf(Vec<i64>),
    Ai(String),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Fibonacci(_) => "fibonacci",
            Operation::Prime(_) => "prime",
            Operation::Lcm(_) => "lcm",
            Operation::Hcf(_) => "hcf",
            Operation::Ai(_) => "AI",
        }
    }

    pub fn parse(body: &Value) -> Result<Self, BfhlError> {
        let (key, value) = single_entry(body)?;

        match key.as_str() {
            "fibonacci" => parse_fibonacci(value),
            "prime" => integer_array(value, "Prime", PRIME_MAX_ELEMENTS).map(Operation::Prime),
            "lcm" => divisor_array(value, "LCM").map(Operation::Lcm),
            "hcf" => divisor_array(value, "HCF").map(Operation::Hcf),
            "AI" => parse_question(value).map(Operation::Ai),
            other => Err(BfhlError::UnknownKey(other.to_string())),
        }
    }
}

fn single_entry(body: &Value) -> Result<(&String, &Value), BfhlError> {
    let object: &Map<String, Value> = body
        .as_object()
        .ok_or_else(|| BfhlError::InvalidBody("Invalid request body".to_string()))?;

    let mut entries = object.iter();
    match (entries.next(), entries.next()) {
        (None, _) => Err(BfhlError::InvalidBody(
            "Request body cannot be empty".to_string(),
        )),
        (Some(entry), None) => Ok(entry),
        (Some(_), Some(_)) => Err(BfhlError::InvalidBody(
            "Request must contain exactly one key".to_string(),
        )),
    }
}

/// A JSON number with no fractional part (`5` and `5.0` both qualify).
fn is_integral(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        _ => false,
    }
}

/// Integral JSON number that fits in an `i64`.
fn as_integer(value: &Value) -> Option<i64> {
    if !is_integral(value) {
        return None;
    }
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let f = value.as_f64()?;
    (f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

fn parse_fibonacci(value: &Value) -> Result<Operation, BfhlError> {
    if !is_integral(value) {
        return Err(BfhlError::invalid_input("Fibonacci input must be an integer"));
    }
    let negative = value.as_f64().is_some_and(|f| f < 0.0);
    if negative {
        return Err(BfhlError::invalid_input("Fibonacci input must be non-negative"));
    }
    match as_integer(value) {
        Some(n) if n <= FIBONACCI_MAX => Ok(Operation::Fibonacci(n)),
        _ => Err(BfhlError::invalid_input("Fibonacci input too large (max 50)")),
    }
}

fn integer_array(value: &Value, label: &str, max: usize) -> Result<Vec<i64>, BfhlError> {
    let items = value
        .as_array()
        .ok_or_else(|| BfhlError::invalid_input(format!("{} input must be an array", label)))?;
    if items.is_empty() {
        return Err(BfhlError::invalid_input(format!(
            "{} array cannot be empty",
            label
        )));
    }
    if items.len() > max {
        return Err(BfhlError::invalid_input(format!(
            "Array too large (max {} elements)",
            max
        )));
    }
    items
        .iter()
        .map(as_integer)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| BfhlError::invalid_input("All elements must be integers"))
}

fn divisor_array(value: &Value, label: &str) -> Result<Vec<i64>, BfhlError> {
    let values = integer_array(value, label, DIVISOR_MAX_ELEMENTS)?;
    if values.contains(&0) {
        return Err(BfhlError::invalid_input(format!(
            "{} array cannot contain zero",
            label
        )));
    }
    Ok(values)
}

fn parse_question(value: &Value) -> Result<String, BfhlError> {
    let question = value
        .as_str()
        .ok_or_else(|| BfhlError::invalid_input("AI input must be a string"))?;
    if question.trim().is_empty() {
        return Err(BfhlError::invalid_input("AI question cannot be empty"));
    }
    if question.chars().count() > AI_QUESTION_MAX_CHARS {
        return Err(BfhlError::invalid_input(
            "Question too long (max 500 characters)",
        ));
    }
    Ok(question.to_string())
}

/// Stateless request router shared by all handlers.
#[derive(Clone)]
pub struct Dispatcher {
    ai: AiDelegate,
}

impl Dispatcher {
    pub fn new(ai: AiDelegate) -> Self {
        Self { ai }
    }

    /// Validate `body` and run the selected operation.
    pub async fn dispatch(&self, body: &Value) -> Result<OperationOutput, BfhlError> {
        let operation = match Operation::parse(body) {
            Ok(operation) => operation,
            Err(err) => {
                record_outcome("none", err.kind());
                return Err(err);
            }
        };

        let name = operation.name();
        tracing::info!(operation = name, "Dispatching bfhl operation");

        let result = self.run(operation).await;
        match &result {
            Ok(_) => record_outcome(name, "ok"),
            Err(err) => record_outcome(name, err.kind()),
        }
        result
    }

    /// Kernel work runs on the blocking pool so a large `prime` array cannot
    /// stall the async workers serving other requests.
    pub async fn run(&self, operation: Operation) -> Result<OperationOutput, BfhlError> {
        match operation {
            Operation::Fibonacci(n) => {
                run_kernel(move || math::fibonacci(n).map(OperationOutput::Sequence)).await
            }
            Operation::Prime(values) => {
                run_kernel(move || math::filter_primes(&values).map(OperationOutput::Primes)).await
            }
            Operation::Lcm(values) => {
                run_kernel(move || math::lcm_of(&values).map(OperationOutput::Number)).await
            }
            Operation::Hcf(values) => {
                run_kernel(move || math::hcf_of(&values).map(OperationOutput::Number)).await
            }
            Operation::Ai(question) => Ok(OperationOutput::Answer(self.ai.answer(&question).await?)),
        }
    }
}

async fn run_kernel<F>(kernel: F) -> Result<OperationOutput, BfhlError>
where
    F: FnOnce() -> Result<OperationOutput, KernelError> + Send + 'static,
{
    let output = tokio::task::spawn_blocking(kernel)
        .await
        .map_err(|e| BfhlError::Internal(anyhow::Error::new(e)))??;
    Ok(output)
}

fn record_outcome(operation: &'static str, outcome: &'static str) {
    counter!("bfhl_operations_total", "operation" => operation, "outcome" => outcome).increment(1);
}
