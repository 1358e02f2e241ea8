use std::iter::Iterator;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use ycsb_gen::config::DATASET_FILE_PROPERTY;
use ycsb_gen::properties::Properties;
use ycsb_gen::version;

pub const DATASET_OUTPUT_FILE: &str = "dataset.dat";
pub const QUERY_OUTPUT_FILE: &str = "query.dat";

const USAGE: &str = "\
Options:
  -P <propertyfile>   load workload properties from the file; can be repeated,
                      later files override earlier ones
  -F <datasetfile>    take the keys from the given keyset file
  -o <dir>            directory for dataset.dat and query.dat (default: .)
  --query_only        do not write dataset.dat
  -p <name=value>     set a single property, overriding the property files
  --version           print version information and exit
  -h, --help          print this message and exit";

// Explicitly marked as `pub(crate)`, because with `pub` rustc doesn't
// complain about fields which are never read
pub(crate) struct YcsbGenArgs {
    pub property_files: Vec<PathBuf>,
    pub overrides: Vec<(String, String)>,
    pub dataset_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub query_only: bool,
}

pub(crate) enum ParseResult {
    Config(Box<YcsbGenArgs>),
    HelpDisplayed,
    VersionDisplayed,
}

impl YcsbGenArgs {
    /// Merges the property files and the `-p` overrides, in this order.
    /// A keyset given with `-F` takes precedence over both.
    pub fn load_properties(&self) -> Result<Properties> {
        let mut props = Properties::new();
        for path in &self.property_files {
            props.load_file(path)?;
        }
        for (name, value) in &self.overrides {
            props.set(name, value);
        }
        if let Some(path) = &self.dataset_file {
            let path = path
                .to_str()
                .with_context(|| format!("Keyset path is not valid UTF-8: {}", path.display()))?;
            props.set(DATASET_FILE_PROPERTY, path);
        }
        Ok(props)
    }

    pub fn dataset_output(&self) -> PathBuf {
        self.output_dir.join(DATASET_OUTPUT_FILE)
    }

    pub fn query_output(&self) -> PathBuf {
        self.output_dir.join(QUERY_OUTPUT_FILE)
    }
}

// Parses the command line. Returns `None` if the arguments are invalid,
// after printing the usage when `print_info` is set.
pub(crate) fn parse_ycsb_gen_args<I, S>(mut args: I, print_info: bool) -> Option<ParseResult>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let program_name = args
        .next()
        .map(|name| name.as_ref().to_owned())
        .unwrap_or_else(|| "ycsb-gen".to_owned());

    match parse_flags(args) {
        Ok(ParseResult::HelpDisplayed) => {
            if print_info {
                print_usage(&program_name);
            }
            Some(ParseResult::HelpDisplayed)
        }
        Ok(ParseResult::VersionDisplayed) => {
            if print_info {
                println!("{}", version::format_version_info_human());
            }
            Some(ParseResult::VersionDisplayed)
        }
        Ok(config) => Some(config),
        Err(err) => {
            if print_info {
                eprintln!("Failed to parse flags: {:#}", err);
                print_usage(&program_name);
            }
            None
        }
    }
}

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} [options]", program_name);
    eprintln!("{}", USAGE);
}

fn parse_flags<I, S>(args: I) -> Result<ParseResult>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.map(|arg| arg.as_ref().to_owned()).peekable();
    anyhow::ensure!(args.peek().is_some(), "No arguments given");

    let mut parsed = YcsbGenArgs {
        property_files: Vec::new(),
        overrides: Vec::new(),
        dataset_file: None,
        output_dir: PathBuf::from("."),
        query_only: false,
    };

    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .with_context(|| format!("Missing argument after {}", flag))
        };
        match flag.as_str() {
            "-P" => parsed.property_files.push(PathBuf::from(value()?)),
            "-F" => parsed.dataset_file = Some(PathBuf::from(value()?)),
            "-o" => parsed.output_dir = PathBuf::from(value()?),
            "-p" => parsed.overrides.push(parse_override(&value()?)?),
            "--query_only" => parsed.query_only = true,
            "--version" => return Ok(ParseResult::VersionDisplayed),
            "-h" | "--help" => return Ok(ParseResult::HelpDisplayed),
            _ => anyhow::bail!("Unknown option: {}", flag),
        }
    }

    anyhow::ensure!(
        !parsed.property_files.is_empty() || !parsed.overrides.is_empty(),
        "No workload given: pass a property file with -P or properties with -p"
    );
    validate_output_dir(&parsed.output_dir)?;

    Ok(ParseResult::Config(Box::new(parsed)))
}

fn parse_override(s: &str) -> Result<(String, String)> {
    let (name, value) = s
        .split_once('=')
        .with_context(|| format!("Expected name=value, got {:?}", s))?;
    let name = name.trim();
    anyhow::ensure!(!name.is_empty(), "Empty property name in {:?}", s);
    Ok((name.to_owned(), value.trim().to_owned()))
}

fn validate_output_dir(dir: &Path) -> Result<()> {
    anyhow::ensure!(
        !dir.as_os_str().is_empty(),
        "Output directory must not be empty"
    );
    anyhow::ensure!(
        !dir.is_file(),
        "Output directory {} is a regular file",
        dir.display()
    );
    Ok(())
}
