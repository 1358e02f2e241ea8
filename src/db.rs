use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::key::Key;
use crate::workload::Operation;

/// The storage side of a run: receives the generated requests.
pub trait Db {
    fn insert(&mut self, key: &Key) -> Result<()>;
    fn read(&mut self, key: &Key) -> Result<()>;
    fn update(&mut self, key: &Key) -> Result<()>;
    fn scan(&mut self, key: &Key, len: usize) -> Result<()>;

    fn read_modify_write(&mut self, key: &Key) -> Result<()> {
        self.read(key)?;
        self.update(key)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Records every request as a line of text:
///
/// ```text
/// INSERT <key>
/// READ <key>
/// UPDATE <key>
/// SCAN <key> <len>
/// ```
///
/// A read-modify-write is recorded as a `READ` followed by an `UPDATE`.
pub struct TraceDb<W: Write> {
    out: W,
}

impl TraceDb<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create trace file {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TraceDb<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn record(&mut self, op: Operation, key: &Key) -> Result<()> {
        writeln!(self.out, "{} {}", op, key)?;
        Ok(())
    }
}

impl<W: Write> Db for TraceDb<W> {
    fn insert(&mut self, key: &Key) -> Result<()> {
        self.record(Operation::Insert, key)
    }

    fn read(&mut self, key: &Key) -> Result<()> {
        self.record(Operation::Read, key)
    }

    fn update(&mut self, key: &Key) -> Result<()> {
        self.record(Operation::Update, key)
    }

    fn scan(&mut self, key: &Key, len: usize) -> Result<()> {
        writeln!(self.out, "{} {} {}", Operation::Scan, key, len)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
