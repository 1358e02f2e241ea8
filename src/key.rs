//! Materialization of sequence ids into fixed-width keys.

use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::generator::fnv_hash64;

/// Width of a key unless configured otherwise.
pub const DEFAULT_KEY_WIDTH: usize = 19;

/// Widest key accepted by the configuration.
pub const MAX_KEY_WIDTH: usize = 64;

/// A key, rendered as a fixed-width string.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(String);

impl Key {
    /// Zero-pads `value` to `width` digits. Longer renderings keep their
    /// leading `width` characters.
    pub fn from_u64(value: u64, width: usize) -> Self {
        Self::fit(format!("{value:0width$}"), width)
    }

    pub fn from_i64(value: i64, width: usize) -> Self {
        Self::from_u64(value as u64, width)
    }

    /// Zero-pads the six-decimal rendering of `value` to `width` characters.
    pub fn from_f64(value: f64, width: usize) -> Self {
        Self::fit(format!("{value:0width$.6}"), width)
    }

    pub fn from_f32(value: f32, width: usize) -> Self {
        Self::from_f64(f64::from(value), width)
    }

    fn fit(mut rendered: String, width: usize) -> Self {
        rendered.truncate(width);
        Key(rendered)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How synthetic keys are derived from sequence ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum InsertOrder {
    /// Keys are the hash of the id, so consecutive ids are scattered.
    Hashed,
    /// Keys are the id itself.
    Ordered,
}

/// Literal keys loaded from a keyset file, indexed by sequence id.
pub struct Keyset {
    keys: Vec<u64>,
}

impl Keyset {
    /// Loads at most `capacity` keys from the file at `path`.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn load(path: &Path, capacity: u64) -> Result<Option<Self>> {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to open keyset file {}", path.display()))
            }
        };

        let keyset = Self::read(BufReader::new(file), capacity)
            .with_context(|| format!("Failed to read keyset file {}", path.display()))?;
        Ok(Some(keyset))
    }

    /// Reads whitespace-separated unsigned integers until the end of input,
    /// until `capacity` keys are read, or until a token which is not
    /// an unsigned integer.
    pub fn read<R: BufRead>(reader: R, capacity: u64) -> Result<Self> {
        let mut keys = Vec::new();

        // Raw bytes: a token which is not UTF-8 ends the keyset like any
        // other malformed token instead of failing the whole read.
        'lines: for line in reader.split(b'\n') {
            let line = line?;
            let tokens = line
                .split(|b| b.is_ascii_whitespace())
                .filter(|token| !token.is_empty());
            for token in tokens {
                if keys.len() as u64 >= capacity {
                    break 'lines;
                }
                match parse_key(token) {
                    Some(key) => keys.push(key),
                    None => {
                        tracing::warn!(
                            token = %String::from_utf8_lossy(token),
                            loaded = keys.len(),
                            "keyset contains a token which is not a key, ignoring the rest"
                        );
                        break 'lines;
                    }
                }
            }
        }

        Ok(Self { keys })
    }

    pub fn len(&self) -> u64 {
        self.keys.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Panics if `id` is not below `len()`.
    pub fn get(&self, id: u64) -> u64 {
        assert!(
            id < self.len(),
            "sequence id {} is outside of the keyset of {} keys",
            id,
            self.len()
        );
        self.keys[id as usize]
    }
}

fn parse_key(token: &[u8]) -> Option<u64> {
    std::str::from_utf8(token).ok()?.parse().ok()
}

/// Maps sequence ids to keys, either through a keyset or synthetically.
///
/// The encoding and the key width are fixed for the lifetime of the key space.
pub enum KeySpace {
    Table { keyset: Keyset, width: usize },
    Synthetic { order: InsertOrder, width: usize },
}

impl KeySpace {
    pub fn synthetic(order: InsertOrder, width: usize) -> Self {
        KeySpace::Synthetic { order, width }
    }

    pub fn table(keyset: Keyset, width: usize) -> Self {
        KeySpace::Table { keyset, width }
    }

    /// Opens the keyset at `path`, falling back to synthetic keys
    /// if there is no such file.
    pub fn open(path: &Path, capacity: u64, order: InsertOrder, width: usize) -> Result<Self> {
        match Keyset::load(path, capacity)? {
            Some(keyset) => {
                tracing::info!(
                    path = %path.display(),
                    keys = keyset.len(),
                    capacity,
                    "loaded keyset"
                );
                Ok(Self::table(keyset, width))
            }
            None => {
                tracing::warn!(
                    path = %path.display(),
                    "keyset file not found, falling back to synthetic keys"
                );
                Ok(Self::synthetic(order, width))
            }
        }
    }

    /// Encodes `id` into its key. Encoding the same id always yields
    /// the same key.
    ///
    /// Panics if the key space is backed by a keyset which has no key for `id`.
    pub fn encode(&self, id: u64) -> Key {
        match self {
            KeySpace::Table { keyset, width } => Key::from_u64(keyset.get(id), *width),
            KeySpace::Synthetic {
                order: InsertOrder::Hashed,
                width,
            } => Key::from_u64(fnv_hash64(id), *width),
            KeySpace::Synthetic {
                order: InsertOrder::Ordered,
                width,
            } => Key::from_u64(id, *width),
        }
    }

    pub fn width(&self) -> usize {
        match self {
            KeySpace::Table { width, .. } | KeySpace::Synthetic { width, .. } => *width,
        }
    }

    /// Number of addressable ids, if the key space is bounded.
    pub fn loaded_count(&self) -> Option<u64> {
        match self {
            KeySpace::Table { keyset, .. } => Some(keyset.len()),
            KeySpace::Synthetic { .. } => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            KeySpace::Table { keyset, width } => {
                format!("keyset of {} keys, width {}", keyset.len(), width)
            }
            KeySpace::Synthetic { order, width } => {
                format!("synthetic ({}), width {}", order.as_ref(), width)
            }
        }
    }
}
