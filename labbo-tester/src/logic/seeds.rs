use anyhow::{Result, bail};
use std::collections::BTreeSet;

pub const DEFAULT_SEED: u64 = 1337;

/// Resolve a list of CLI seed arguments into unique seeds, in first-seen order.
///
/// Accepts decimal integers (negative values use their magnitude), `0x`
/// prefixed hex, and `range:START..END` for a run of consecutive seeds.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seen = BTreeSet::new();
    let mut seeds = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        for seed in parse_token(token)? {
            if seen.insert(seed) {
                seeds.push(seed);
            }
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }
    Ok(seeds)
}

fn parse_token(token: &str) -> Result<Vec<u64>> {
    if let Some(range) = token.strip_prefix("range:") {
        let Some((start, end)) = range.split_once("..") else {
            bail!("Seed range needs START..END: {token}");
        };
        let start = parse_single(start)?;
        let end = parse_single(end)?;
        if end < start {
            bail!("Seed range is empty: {token}");
        }
        return Ok((start..end).collect());
    }
    Ok(vec![parse_single(token)?])
}

fn parse_single(token: &str) -> Result<u64> {
    let token = token.trim();
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .map_err(|err| anyhow::anyhow!("Bad hex seed {token}: {err}"));
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    if let Ok(value) = token.parse::<u64>() {
        return Ok(value);
    }
    bail!("Unrecognized seed token: {token}")
}
