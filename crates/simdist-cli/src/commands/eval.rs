//! Evaluate a single operation on inline inputs.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use simdist_core::dispatch::{self, Tier};
use simdist_core::{BitVector, Family, Operands, Operation, Output, SparseSlice, evaluate, f16};

use crate::OutputFormat;
use crate::output::{self, Format};

/// Operands for one evaluation, in their textual form.
#[derive(Debug, Deserialize)]
pub struct EvalArgs {
    /// Operation name or alias.
    #[serde(default)]
    pub operation: String,
    /// First operand.
    pub a: String,
    /// Second operand, for pairwise operations.
    #[serde(default)]
    pub b: Option<String>,
}

impl EvalArgs {
    /// Loads operands from a JSON file of the form `{"a": "...", "b": "..."}`.
    pub fn from_file(operation: &str, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut args: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        args.operation = operation.to_string();
        Ok(args)
    }
}

/// Result of one evaluation.
#[derive(Debug, Serialize)]
struct EvalOutput {
    operation: Operation,
    tier: Tier,
    result: Output,
}

fn items(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_floats(raw: &str) -> Result<Vec<f32>> {
    items(raw)
        .map(|s| s.parse().with_context(|| format!("invalid number `{s}`")))
        .collect()
}

fn parse_halves(raw: &str) -> Result<Vec<f16>> {
    Ok(parse_floats(raw)?.into_iter().map(f16::from_f32).collect())
}

fn parse_word(s: &str) -> Result<u64> {
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(bin) = s.strip_prefix("0b") {
        (bin, 2)
    } else {
        (s, 10)
    };
    u64::from_str_radix(&digits.replace('_', ""), radix).with_context(|| format!("invalid word `{s}`"))
}

fn parse_bits(raw: &str) -> Result<BitVector> {
    let words = items(raw).map(parse_word).collect::<Result<Vec<_>>>()?;
    let bits = words.len() * u64::BITS as usize;
    Ok(BitVector::from_words(words, bits)?)
}

fn parse_sparse<V>(raw: &str, value: impl Fn(f32) -> V) -> Result<(Vec<u32>, Vec<V>)> {
    let mut indices = Vec::new();
    let mut values = Vec::new();
    for item in items(raw) {
        let (index, val) = item
            .split_once(':')
            .with_context(|| format!("expected `index:value`, got `{item}`"))?;
        indices.push(
            index
                .trim()
                .parse()
                .with_context(|| format!("invalid index `{index}`"))?,
        );
        let val: f32 = val
            .trim()
            .parse()
            .with_context(|| format!("invalid value `{val}`"))?;
        values.push(value(val));
    }
    Ok((indices, values))
}

fn compute(args: &EvalArgs) -> Result<EvalOutput> {
    let op: Operation = args.operation.parse()?;
    let b = match (op.takes_pair(), args.b.as_deref()) {
        (true, None) => bail!("`{op}` takes two operands; pass --b"),
        (false, Some(_)) => bail!("`{op}` takes a single operand"),
        (_, b) => b.unwrap_or_default(),
    };
    let a = args.a.as_str();

    let result = match op.family() {
        Family::DenseF32 => {
            let (a, b) = (parse_floats(a)?, parse_floats(b)?);
            let operands = if op.takes_pair() {
                Operands::F32Pair(&a, &b)
            } else {
                Operands::F32(&a)
            };
            evaluate(op, operands)?
        }
        Family::DenseF16 => {
            let (a, b) = (parse_halves(a)?, parse_halves(b)?);
            let operands = if op.takes_pair() {
                Operands::F16Pair(&a, &b)
            } else {
                Operands::F16(&a)
            };
            evaluate(op, operands)?
        }
        Family::Binary => {
            let (a, b) = (parse_bits(a)?, parse_bits(b)?);
            let operands = if op.takes_pair() {
                Operands::BitsPair(&a, &b)
            } else {
                Operands::Bits(&a)
            };
            evaluate(op, operands)?
        }
        Family::SparseF32 => {
            let (li, lv) = parse_sparse(a, |v| v)?;
            let (ri, rv) = parse_sparse(b, |v| v)?;
            let lhs = SparseSlice::new(&li, &lv)?;
            let rhs = SparseSlice::new(&ri, &rv)?;
            evaluate(op, Operands::Sparse(lhs, rhs))?
        }
        Family::SparseF16 => {
            let (li, lv) = parse_sparse(a, f16::from_f32)?;
            let (ri, rv) = parse_sparse(b, f16::from_f32)?;
            let lhs = SparseSlice::new(&li, &lv)?;
            let rhs = SparseSlice::new(&ri, &rv)?;
            evaluate(op, Operands::SparseF16(lhs, rhs))?
        }
    };
    tracing::debug!(operation = %op, %result, "evaluated");

    Ok(EvalOutput {
        operation: op,
        tier: dispatch::table().tier_of(op),
        result,
    })
}

/// Run the eval command.
pub fn run(args: &EvalArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let out = compute(args)?;

    match Format::from(format) {
        Format::Json => output::print_json(&out, quiet)?,
        Format::Table => {
            let items = vec![
                ("Operation", out.operation.to_string()),
                ("Tier", out.tier.to_string()),
                ("Result", out.result.to_string()),
            ];
            output::print_key_value_table(&items, quiet);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(operation: &str, a: &str, b: Option<&str>) -> EvalArgs {
        EvalArgs {
            operation: operation.to_string(),
            a: a.to_string(),
            b: b.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_words() {
        assert_eq!(parse_word("10").unwrap(), 10);
        assert_eq!(parse_word("0b1010").unwrap(), 10);
        assert_eq!(parse_word("0xff_ff").unwrap(), 0xffff);
        assert!(parse_word("0xzz").is_err());
    }

    #[test]
    fn test_parse_sparse() {
        let (idx, val) = parse_sparse("1:0.5, 4:-2", |v| v).unwrap();
        assert_eq!(idx, vec![1, 4]);
        assert_eq!(val, vec![0.5, -2.0]);
        assert!(parse_sparse("1=0.5", |v| v).is_err());
    }

    #[test]
    fn test_compute_dense() {
        let out = compute(&args("f32_dot", "1,2,3,4,5", Some("5,4,3,2,1"))).unwrap();
        assert_eq!(out.operation, Operation::F32Dot);
        assert!((out.result.as_scalar().unwrap() - 35.0).abs() < 1e-4);

        let out = compute(&args("f16_min_max", "-1, 3, 0.5", None)).unwrap();
        assert_eq!(out.result, Output::MinMax { min: -1.0, max: 3.0 });
    }

    #[test]
    fn test_compute_binary_and_sparse() {
        let out = compute(&args("binary_hamming", "0b1010", Some("0b1100"))).unwrap();
        assert_eq!(out.result, Output::Scalar(2.0));

        let out = compute(&args("sparse_dot", "1:1,3:1,5:1", Some("2:1,3:1,4:1"))).unwrap();
        assert_eq!(out.result, Output::Scalar(1.0));
    }

    #[test]
    fn test_compute_rejects_bad_arity() {
        assert!(compute(&args("f32_dot", "1,2", None)).is_err());
        assert!(compute(&args("f32_sum", "1,2", Some("3,4"))).is_err());
    }

    #[test]
    fn test_compute_rejects_unsorted_sparse() {
        let err = compute(&args("sparse_sl2", "3:1,1:1", Some("1:1"))).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"), "{err}");
    }
}
