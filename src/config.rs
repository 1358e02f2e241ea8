use std::path::PathBuf;

use anyhow::{Context, Result};
use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::generator::ZIPFIAN_CONSTANT;
use crate::key::{InsertOrder, DEFAULT_KEY_WIDTH, MAX_KEY_WIDTH};
use crate::numeric::{parse_integer, parse_real};
use crate::properties::Properties;

pub const READ_PROPORTION_PROPERTY: &str = "readproportion";
pub const UPDATE_PROPORTION_PROPERTY: &str = "updateproportion";
pub const INSERT_PROPORTION_PROPERTY: &str = "insertproportion";
pub const SCAN_PROPORTION_PROPERTY: &str = "scanproportion";
pub const READMODIFYWRITE_PROPORTION_PROPERTY: &str = "readmodifywriteproportion";
pub const PROPORTION_DEFAULT: &str = "0";

/// Options are "uniform", "zipfian" and "latest".
pub const REQUEST_DISTRIBUTION_PROPERTY: &str = "requestdistribution";
pub const REQUEST_DISTRIBUTION_DEFAULT: &str = "uniform";

pub const ZIPFIAN_SKEWNESS_PROPERTY: &str = "zipfian_skewness";

pub const MAX_SCAN_LENGTH_PROPERTY: &str = "maxscanlength";
pub const MAX_SCAN_LENGTH_DEFAULT: &str = "1000";

/// Options are "uniform" and "zipfian" (favoring short scans).
pub const SCAN_LENGTH_DISTRIBUTION_PROPERTY: &str = "scanlengthdistribution";
pub const SCAN_LENGTH_DISTRIBUTION_DEFAULT: &str = "uniform";

/// Number of records populated by the load phase.
pub const RECORD_COUNT_PROPERTY: &str = "recordcount";
pub const RECORD_COUNT_DEFAULT: &str = "1000";

/// Number of operations issued by the transaction phase.
pub const OPERATION_COUNT_PROPERTY: &str = "operationcount";
pub const OPERATION_COUNT_DEFAULT: &str = "1000";

pub const INSERT_START_PROPERTY: &str = "insertstart";
pub const INSERT_START_DEFAULT: &str = "0";

/// Options are "hashed" and "ordered".
pub const INSERT_ORDER_PROPERTY: &str = "insertorder";
pub const INSERT_ORDER_DEFAULT: &str = "hashed";

/// Width of the generated keys.
pub const ZERO_PADDING_PROPERTY: &str = "zeropadding";

pub const RANDOM_SEED_PROPERTY: &str = "randomseed";

/// Path of a file with literal keys. Set by the `-F` command line flag.
pub const DATASET_FILE_PROPERTY: &str = "dataset_file";

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum RequestDistribution {
    Uniform,
    Zipfian,
    Latest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum ScanLengthDistribution {
    Uniform,
    Zipfian,
}

/// Proportions of the transaction-phase operations.
///
/// They do not need to sum up to 1, only to something positive.
#[derive(Clone, Debug, PartialEq)]
pub struct Proportions {
    pub read: f64,
    pub update: f64,
    pub insert: f64,
    pub scan: f64,
    pub read_modify_write: f64,
}

impl Proportions {
    pub fn total(&self) -> f64 {
        self.read + self.update + self.insert + self.scan + self.read_modify_write
    }
}

/// Validated configuration of a workload. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkloadConfig {
    pub proportions: Proportions,
    pub request_distribution: RequestDistribution,
    pub zipfian_skewness: f64,
    pub max_scan_length: usize,
    pub scan_length_distribution: ScanLengthDistribution,
    pub record_count: u64,
    pub operation_count: u64,
    pub insert_start: u64,
    pub insert_order: InsertOrder,
    pub key_width: usize,
    pub seed: Option<u64>,
    pub dataset_file: Option<PathBuf>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            proportions: Proportions {
                read: 0.0,
                update: 0.0,
                insert: 0.0,
                scan: 0.0,
                read_modify_write: 0.0,
            },
            request_distribution: RequestDistribution::Uniform,
            zipfian_skewness: ZIPFIAN_CONSTANT,
            max_scan_length: 1000,
            scan_length_distribution: ScanLengthDistribution::Uniform,
            record_count: 1000,
            operation_count: 1000,
            insert_start: 0,
            insert_order: InsertOrder::Hashed,
            key_width: DEFAULT_KEY_WIDTH,
            seed: None,
            dataset_file: None,
        }
    }
}

impl WorkloadConfig {
    /// Builds the configuration from properties. Unknown properties are ignored.
    pub fn from_properties(props: &Properties) -> Result<Self> {
        let proportion = |name: &str| -> Result<f64> {
            let value = props.get_or(name, PROPORTION_DEFAULT);
            parse_real(value).with_context(|| format!("Invalid {name}: {value:?}"))
        };
        let integer = |name: &str, default: &str| -> Result<u64> {
            let value = props.get_or(name, default);
            parse_integer(value).with_context(|| format!("Invalid {name}: {value:?}"))
        };

        let proportions = Proportions {
            read: proportion(READ_PROPORTION_PROPERTY)?,
            update: proportion(UPDATE_PROPORTION_PROPERTY)?,
            insert: proportion(INSERT_PROPORTION_PROPERTY)?,
            scan: proportion(SCAN_PROPORTION_PROPERTY)?,
            read_modify_write: proportion(READMODIFYWRITE_PROPORTION_PROPERTY)?,
        };

        let request_distribution =
            parse_choice(props, REQUEST_DISTRIBUTION_PROPERTY, REQUEST_DISTRIBUTION_DEFAULT)?;
        let scan_length_distribution = parse_choice(
            props,
            SCAN_LENGTH_DISTRIBUTION_PROPERTY,
            SCAN_LENGTH_DISTRIBUTION_DEFAULT,
        )?;
        let insert_order = parse_choice(props, INSERT_ORDER_PROPERTY, INSERT_ORDER_DEFAULT)?;

        let zipfian_skewness = match props.get(ZIPFIAN_SKEWNESS_PROPERTY) {
            Some(value) => parse_real(value)
                .with_context(|| format!("Invalid {ZIPFIAN_SKEWNESS_PROPERTY}: {value:?}"))?,
            None => ZIPFIAN_CONSTANT,
        };

        let max_scan_length = {
            let value = props.get_or(MAX_SCAN_LENGTH_PROPERTY, MAX_SCAN_LENGTH_DEFAULT);
            parse_integer::<usize>(value)
                .with_context(|| format!("Invalid {MAX_SCAN_LENGTH_PROPERTY}: {value:?}"))?
        };
        let key_width = match props.get(ZERO_PADDING_PROPERTY) {
            Some(value) => parse_integer::<usize>(value)
                .with_context(|| format!("Invalid {ZERO_PADDING_PROPERTY}: {value:?}"))?,
            None => DEFAULT_KEY_WIDTH,
        };
        let seed = props
            .get(RANDOM_SEED_PROPERTY)
            .map(|value| {
                parse_integer::<u64>(value)
                    .with_context(|| format!("Invalid {RANDOM_SEED_PROPERTY}: {value:?}"))
            })
            .transpose()?;

        let config = Self {
            proportions,
            request_distribution,
            zipfian_skewness,
            max_scan_length,
            scan_length_distribution,
            record_count: integer(RECORD_COUNT_PROPERTY, RECORD_COUNT_DEFAULT)?,
            operation_count: integer(OPERATION_COUNT_PROPERTY, OPERATION_COUNT_DEFAULT)?,
            insert_start: integer(INSERT_START_PROPERTY, INSERT_START_DEFAULT)?,
            insert_order,
            key_width,
            seed,
            dataset_file: props
                .get(DATASET_FILE_PROPERTY)
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the constraints which cannot be expressed by the field types.
    pub fn validate(&self) -> Result<()> {
        let p = &self.proportions;
        for (name, value) in [
            (READ_PROPORTION_PROPERTY, p.read),
            (UPDATE_PROPORTION_PROPERTY, p.update),
            (INSERT_PROPORTION_PROPERTY, p.insert),
            (SCAN_PROPORTION_PROPERTY, p.scan),
            (READMODIFYWRITE_PROPORTION_PROPERTY, p.read_modify_write),
        ] {
            anyhow::ensure!(
                value.is_finite() && value >= 0.0,
                "{} must be a non-negative number, got {}",
                name,
                value
            );
        }
        anyhow::ensure!(
            p.total() > 0.0,
            "At least one operation proportion must be positive"
        );
        anyhow::ensure!(
            self.zipfian_skewness.is_finite() && self.zipfian_skewness >= 0.0,
            "{} must be a non-negative number, got {}",
            ZIPFIAN_SKEWNESS_PROPERTY,
            self.zipfian_skewness
        );
        anyhow::ensure!(
            self.max_scan_length > 0,
            "{} must be greater than zero",
            MAX_SCAN_LENGTH_PROPERTY
        );
        anyhow::ensure!(
            (1..=MAX_KEY_WIDTH).contains(&self.key_width),
            "{} must be between 1 and {}, got {}",
            ZERO_PADDING_PROPERTY,
            MAX_KEY_WIDTH,
            self.key_width
        );
        anyhow::ensure!(
            self.insert_start
                .checked_add(self.key_space_size())
                .is_some(),
            "{} + key space size overflows",
            INSERT_START_PROPERTY
        );
        Ok(())
    }

    /// Number of keys the transaction phase may address: the loaded records
    /// plus a generous estimate of the records inserted by transactions.
    pub fn key_space_size(&self) -> u64 {
        let new_keys = (self.operation_count as f64 * self.proportions.insert * 2.0).ceil() as u64;
        self.record_count.saturating_add(new_keys).max(1)
    }

    /// Upper bound on the number of keys read from a keyset file.
    pub fn keyset_capacity(&self) -> u64 {
        let inserts = self.operation_count as f64 * (self.proportions.insert + 0.1);
        self.insert_start
            .saturating_add(self.record_count)
            .saturating_add(inserts as u64)
    }

    pub fn print_settings(&self) {
        let p = &self.proportions;
        println!("******************** Workload Settings ********************");
        println!("Operation ratio:");
        println!("  Read: {}", p.read);
        println!("  Update: {}", p.update);
        println!("  Insert: {}", p.insert);
        println!("  Scan: {}", p.scan);
        println!("  Read-modify-write: {}", p.read_modify_write);
        println!("Request distribution: {}", self.request_distribution.as_ref());
        println!("Zipfian skewness: {}", self.zipfian_skewness);
        println!(
            "Scan length: {} up to {}",
            self.scan_length_distribution.as_ref(),
            self.max_scan_length
        );
        println!("Record count: {}", self.record_count);
        println!("Operation count: {}", self.operation_count);
        println!("Insert start: {}", self.insert_start);
        println!("Insert order: {}", self.insert_order.as_ref());
        println!("Key width: {}", self.key_width);
        match self.seed {
            Some(seed) => println!("Random seed: {}", seed),
            None => println!("Random seed: random"),
        }
        match &self.dataset_file {
            Some(path) => println!("Keyset file: {}", path.display()),
            None => println!("Keyset file: none"),
        }
        println!();
    }
}

fn parse_choice<T>(props: &Properties, name: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr<Err = strum::ParseError>,
{
    let value = props.get_or(name, default);
    T::from_str(value.trim()).with_context(|| format!("Unknown {name}: {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_defaults() {
        let config = WorkloadConfig::from_properties(&props(&[("readproportion", "1")])).unwrap();
        let expected = WorkloadConfig {
            proportions: Proportions {
                read: 1.0,
                ..WorkloadConfig::default().proportions
            },
            ..WorkloadConfig::default()
        };
        assert_eq!(config, expected);
    }

    #[test]
    fn test_all_properties() {
        let config = WorkloadConfig::from_properties(&props(&[
            ("readproportion", "0.5"),
            ("updateproportion", "0.2"),
            ("insertproportion", "0.1"),
            ("scanproportion", "0.1"),
            ("readmodifywriteproportion", "0.1"),
            ("requestdistribution", "Zipfian"),
            ("zipfian_skewness", "1.2"),
            ("maxscanlength", "100"),
            ("scanlengthdistribution", "zipfian"),
            ("recordcount", "10k"),
            ("operationcount", "1m"),
            ("insertstart", "5"),
            ("insertorder", "ordered"),
            ("zeropadding", "24"),
            ("randomseed", "1234"),
            ("dataset_file", "keys.txt"),
            ("fieldcount", "10"), // <- Unknown, ignored
        ]))
        .unwrap();

        assert_eq!(config.proportions.update, 0.2);
        assert_eq!(config.request_distribution, RequestDistribution::Zipfian);
        assert_eq!(config.zipfian_skewness, 1.2);
        assert_eq!(config.max_scan_length, 100);
        assert_eq!(config.scan_length_distribution, ScanLengthDistribution::Zipfian);
        assert_eq!(config.record_count, 10_000);
        assert_eq!(config.operation_count, 1_000_000);
        assert_eq!(config.insert_start, 5);
        assert_eq!(config.insert_order, InsertOrder::Ordered);
        assert_eq!(config.key_width, 24);
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.dataset_file, Some(PathBuf::from("keys.txt")));
    }

    #[test]
    fn test_configuration_errors() {
        let bads: &[&[(&str, &str)]] = &[
            &[],                                                    // <- All proportions zero
            &[("readproportion", "0"), ("updateproportion", "0")],
            &[("readproportion", "-1"), ("updateproportion", "2")],
            &[("readproportion", "abc")],
            &[("readproportion", "1"), ("requestdistribution", "hotspot")],
            &[("readproportion", "1"), ("scanlengthdistribution", "latest")],
            &[("readproportion", "1"), ("recordcount", "ten")],
            &[("readproportion", "1"), ("operationcount", "-5")],
            &[("readproportion", "1"), ("insertstart", "1.5")],
            &[("readproportion", "1"), ("maxscanlength", "0")],
            &[("readproportion", "1"), ("zeropadding", "0")],
            &[("readproportion", "1"), ("zeropadding", "65")],
            &[("readproportion", "1"), ("zeropadding", "1b")],
            &[("readproportion", "1"), ("zipfian_skewness", "-0.5")],
            &[("readproportion", "1"), ("insertorder", "shuffled")],
            &[("readproportion", "1"), ("randomseed", "x")],
        ];

        for pairs in bads {
            println!("Parsing: {:?}", pairs);
            WorkloadConfig::from_properties(&props(pairs)).unwrap_err();
        }
    }

    #[test]
    fn test_error_names_the_property() {
        let err = WorkloadConfig::from_properties(&props(&[
            ("readproportion", "1"),
            ("requestdistribution", "hotspot"),
        ]))
        .unwrap_err();
        assert!(format!("{:#}", err).contains("requestdistribution"), "{:#}", err);
    }

    #[test]
    fn test_widest_key() {
        let config = WorkloadConfig::from_properties(&props(&[
            ("readproportion", "1"),
            ("zeropadding", "64"),
        ]))
        .unwrap();
        assert_eq!(config.key_width, MAX_KEY_WIDTH);

        let err = WorkloadConfig::from_properties(&props(&[
            ("readproportion", "1"),
            ("zeropadding", "1b"),
        ]))
        .unwrap_err();
        assert!(format!("{:#}", err).contains("zeropadding"), "{:#}", err);
    }

    #[test]
    fn test_key_space_size() {
        let mut config = WorkloadConfig {
            record_count: 100,
            operation_count: 50,
            ..WorkloadConfig::default()
        };
        assert_eq!(config.key_space_size(), 100);

        config.proportions.insert = 0.1;
        assert_eq!(config.key_space_size(), 110);

        config.record_count = 0;
        config.operation_count = 0;
        assert_eq!(config.key_space_size(), 1);
    }

    #[test]
    fn test_keyset_capacity() {
        let config = WorkloadConfig {
            record_count: 100,
            operation_count: 50,
            insert_start: 10,
            ..WorkloadConfig::default()
        };
        assert_eq!(config.keyset_capacity(), 115);
    }
}
