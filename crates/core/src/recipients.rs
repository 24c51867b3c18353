use crate::{error::Error, Result};
use alloy::primitives::Address;
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::error;

/// A validated transfer destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Recipient {
    pub address: Address,
}

/// Parses `input` the way wallet libraries validate addresses: 40 hex digits with an optional
/// `0x` prefix. Mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> Option<Address> {
    let hex = input.strip_prefix("0x").unwrap_or(input);
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let address = Address::from_str(hex).ok()?;
    let mixed_case = hex.chars().any(|c| c.is_ascii_lowercase())
        && hex.chars().any(|c| c.is_ascii_uppercase());
    if mixed_case && address.to_checksum(None)[2..] != *hex {
        return None;
    }
    Some(address)
}

/// One address per line; blank and invalid lines are dropped.
pub fn parse_recipients(contents: &str) -> Vec<Recipient> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_address)
        .map(|address| Recipient { address })
        .collect()
}

/// Newline-delimited recipient list on disk. Re-read on every call.
#[derive(Debug, Clone)]
pub struct RecipientBook {
    path: PathBuf,
}

impl RecipientBook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current recipients. An unreadable file yields an empty list.
    pub fn load(&self) -> Vec<Recipient> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => parse_recipients(&contents),
            Err(e) => {
                error!("Failed to load recipients from {}: {e}", self.path.display());
                vec![]
            }
        }
    }

    pub fn count(&self) -> usize {
        self.load().len()
    }

    /// Validates `input` and appends it to the file in checksum form.
    pub fn add(&self, input: &str) -> Result<Address> {
        let address =
            parse_address(input.trim()).ok_or_else(|| Error::InvalidAddress(input.to_owned()))?;
        let needs_newline = std::fs::read_to_string(&self.path)
            .map(|contents| !contents.is_empty() && !contents.ends_with('\n'))
            .unwrap_or(false);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if needs_newline {
            writeln!(file)?;
        }
        writeln!(file, "{}", address.to_checksum(None))?;
        Ok(address)
    }
}
