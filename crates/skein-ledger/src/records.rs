//! Headerless CSV record shapes of the ledger dataset.
//!
//! Four files make up a dataset snapshot:
//! - `transactions.csv`: `timestamp,blockId,txId,isCoinbase,fee`
//! - `inputs.csv`:       `txId,prevTxId,prevTxpos`
//! - `outputs.csv`:      `txId,position,addressId,amount,scripttype`
//! - address mapping:    `hash,addressId`
//!
//! Fields are plain integers (booleans as `0`/`1` or `true`/`false`,
//! fee optionally empty), so records are split on commas; each parser
//! carries the 1-based line number for error context.

use std::fmt::Display;
use std::str::FromStr;

use skein_core::types::{AddressId, TxId};

use crate::error::LedgerError;

fn split_exact<'a, const N: usize>(
    line: &'a str,
    lineno: u64,
    what: &str,
) -> Result<[&'a str; N], LedgerError> {
    let mut fields = [""; N];
    let mut parts = line.split(',');
    for (i, slot) in fields.iter_mut().enumerate() {
        *slot = parts.next().ok_or_else(|| LedgerError::MalformedRecord {
            line: lineno,
            reason: format!("{what}: expected {N} fields, got {i}"),
        })?;
    }
    if parts.next().is_some() {
        return Err(LedgerError::MalformedRecord {
            line: lineno,
            reason: format!("{what}: expected {N} fields, got more"),
        });
    }
    Ok(fields)
}

fn parse_field<T>(raw: &str, lineno: u64, name: &str) -> Result<T, LedgerError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| LedgerError::MalformedRecord {
            line: lineno,
            reason: format!("{name}: {e}"),
        })
}

fn parse_bool(raw: &str, lineno: u64, name: &str) -> Result<bool, LedgerError> {
    match raw.trim() {
        "0" | "false" | "False" => Ok(false),
        "1" | "true" | "True" => Ok(true),
        other => Err(LedgerError::MalformedRecord {
            line: lineno,
            reason: format!("{name}: invalid boolean {other:?}"),
        }),
    }
}

/// One row of `transactions.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRecord {
    /// Unix timestamp of the containing block.
    pub timestamp: i64,
    /// Height of the containing block.
    pub block: u32,
    pub tx: TxId,
    pub coinbase: bool,
    /// Fee in base units; absent for coinbase rows in some snapshots.
    pub fee: Option<u64>,
}

impl TxRecord {
    pub fn parse(line: &str, lineno: u64) -> Result<Self, LedgerError> {
        let [timestamp, block, tx, coinbase, fee] = split_exact(line, lineno, "transaction")?;
        Ok(Self {
            timestamp: parse_field(timestamp, lineno, "timestamp")?,
            block: parse_field(block, lineno, "blockId")?,
            tx: TxId(parse_field(tx, lineno, "txId")?),
            coinbase: parse_bool(coinbase, lineno, "isCoinbase")?,
            fee: if fee.trim().is_empty() {
                None
            } else {
                Some(parse_field(fee, lineno, "fee")?)
            },
        })
    }
}

/// One row of `inputs.csv`: a spend of output `prev_pos` of `prev_tx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRecord {
    pub tx: TxId,
    pub prev_tx: TxId,
    pub prev_pos: u16,
}

impl InputRecord {
    pub fn parse(line: &str, lineno: u64) -> Result<Self, LedgerError> {
        let [tx, prev_tx, prev_pos] = split_exact(line, lineno, "input")?;
        Ok(Self {
            tx: TxId(parse_field(tx, lineno, "txId")?),
            prev_tx: TxId(parse_field(prev_tx, lineno, "prevTxId")?),
            prev_pos: parse_field(prev_pos, lineno, "prevTxpos")?,
        })
    }
}

/// One row of `outputs.csv`: output `position` of `tx` pays `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputRecord {
    pub tx: TxId,
    pub position: u16,
    pub address: AddressId,
    /// Amount in base units.
    pub amount: u64,
    /// Script type tag as encoded by the dataset.
    pub script_type: i32,
}

impl OutputRecord {
    pub fn parse(line: &str, lineno: u64) -> Result<Self, LedgerError> {
        let [tx, position, address, amount, script_type] = split_exact(line, lineno, "output")?;
        Ok(Self {
            tx: TxId(parse_field(tx, lineno, "txId")?),
            position: parse_field(position, lineno, "position")?,
            address: AddressId(parse_field(address, lineno, "addressId")?),
            amount: parse_field(amount, lineno, "amount")?,
            script_type: parse_field(script_type, lineno, "scripttype")?,
        })
    }
}

/// One row of the address mapping file: `hash,addressId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    /// Human-readable address hash; unused by clustering, kept for
    /// downstream label attachment.
    pub hash: String,
    pub address: AddressId,
}

impl AddressRecord {
    pub fn parse(line: &str, lineno: u64) -> Result<Self, LedgerError> {
        let [hash, address] = split_exact(line, lineno, "address mapping")?;
        Ok(Self {
            hash: hash.trim().to_owned(),
            address: AddressId(parse_field(address, lineno, "addressId")?),
        })
    }
}
