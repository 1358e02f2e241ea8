//! Flat string-to-string configuration, loaded from property files.
//!
//! The file format is the usual `name=value` one: one property per line,
//! blank lines and lines starting with `#` or `!` are ignored, and
//! whitespace around names and values is insignificant.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

lazy_static! {
    static ref PROPERTY_LINE: Regex = Regex::new(r"^\s*([^=]*?)\s*=\s*(.*?)\s*$").unwrap();
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties {
    values: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges properties read from `reader`. Properties which are already
    /// present are overridden.
    pub fn load<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            let caps = PROPERTY_LINE
                .captures(trimmed)
                .ok_or_else(|| anyhow::anyhow!("line {}: expected name=value, got {:?}", i + 1, trimmed))?;
            let name = &caps[1];
            anyhow::ensure!(!name.is_empty(), "line {}: empty property name", i + 1);
            self.set(name, &caps[2]);
        }
        Ok(())
    }

    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open property file {}", path.display()))?;
        self.load(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to parse property file {}", path.display()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Properties {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut props = Properties::new();
        for (name, value) in iter {
            props.set(name, value);
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load() {
        let data = "\
# Yahoo! Cloud System Benchmark
! Workload A

recordcount=1000
operationcount = 2000
requestdistribution=  zipfian
empty=
";
        let mut props = Properties::new();
        props.load(data.as_bytes()).unwrap();

        assert_eq!(props.get("recordcount"), Some("1000"));
        assert_eq!(props.get("operationcount"), Some("2000"));
        assert_eq!(props.get("requestdistribution"), Some("zipfian"));
        assert_eq!(props.get("empty"), Some(""));
        assert_eq!(props.get("missing"), None);
        assert_eq!(props.get_or("missing", "uniform"), "uniform");
        assert_eq!(props.iter().count(), 4);
    }

    #[test]
    fn test_later_loads_override() {
        let mut props = Properties::new();
        props.load("a=1\nb=2".as_bytes()).unwrap();
        props.load("b=3\nc=4".as_bytes()).unwrap();

        let expected: Properties = [("a", "1"), ("b", "3"), ("c", "4")].into_iter().collect();
        assert_eq!(props, expected);
    }

    #[test]
    fn test_value_may_contain_equals_sign() {
        let mut props = Properties::new();
        props.load("filter = a=b".as_bytes()).unwrap();
        assert_eq!(props.get("filter"), Some("a=b"));
    }

    #[test]
    fn test_malformed_lines() {
        let mut props = Properties::new();
        let err = props.load("a=1\njust some words\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{}", err);

        assert!(Properties::new().load(" = value".as_bytes()).is_err());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "readproportion=0.5").unwrap();
        writeln!(file, "updateproportion=0.5").unwrap();

        let mut props = Properties::new();
        props.load_file(file.path()).unwrap();
        assert_eq!(props.get("readproportion"), Some("0.5"));

        let missing = file.path().with_extension("missing");
        assert!(props.load_file(&missing).is_err());
    }
}
