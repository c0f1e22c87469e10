//! # Address Resolver
//!
//! Resolves the address identifiers of one crash log against the symbol
//! database and rewrites frame lines with the names found.
//!
//! ## Database format
//!
//! ```text
//! <header line, ignored>
//! 5 FirstFunction
//! 10 SecondFunction_
//! 20 ThirdFunction
//! ```
//!
//! Lines are sorted by id, ascending and without duplicates. The database is
//! large, so it is never loaded: [`IdScanner`] walks it once, in step with the
//! sorted ids of the log (a merge join). Resolving `K` ids against `D` lines
//! costs `O(D + K)` and holds a single line in memory.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::document::CrashLogDocument;
use crate::error::{CrashLabelError, Result};
use crate::frame::StackFrameMatch;
use crate::types::{AddressId, SymbolName, SymbolTable};

/// Forward-only cursor over a sorted symbol database.
///
/// ## Contract
///
/// [`probe`](Self::probe) must be called with strictly ascending ids. The
/// cursor never moves backwards, so a repeated or smaller id is never found.
/// Debug builds assert the ordering.
#[derive(Debug)]
pub struct IdScanner<R>
{
    reader: R,
    path: PathBuf,
    /// Next unconsumed database line, or `None` at end of file.
    pending: Option<Vec<u8>>,
    /// Line number of `pending` (1-based, header is line 1).
    line_number: usize,
    last_probe: Option<AddressId>,
}

impl IdScanner<BufReader<File>>
{
    /// Open the database at `path` and position the cursor after the header.
    ///
    /// ## Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn open(path: &Path) -> Result<Self>
    {
        Self::new(BufReader::new(File::open(path)?), path)
    }
}

impl<R: BufRead> IdScanner<R>
{
    /// Build a scanner over `reader`, skipping the header line.
    ///
    /// `path` is only used in error messages.
    ///
    /// ## Errors
    ///
    /// Returns an error if the first lines cannot be read.
    pub fn new(mut reader: R, path: &Path) -> Result<Self>
    {
        let mut header = Vec::new();
        reader.read_until(b'\n', &mut header)?;

        let mut scanner = Self {
            reader,
            path: path.to_path_buf(),
            pending: None,
            line_number: 1,
            last_probe: None,
        };
        scanner.advance()?;
        Ok(scanner)
    }

    fn advance(&mut self) -> io::Result<()>
    {
        let mut line = Vec::new();
        self.pending = if self.reader.read_until(b'\n', &mut line)? == 0 {
            None
        } else {
            self.line_number += 1;
            Some(line)
        };
        Ok(())
    }

    fn corrupt(&self, reason: impl Into<String>) -> CrashLabelError
    {
        CrashLabelError::CorruptDatabase {
            path: self.path.clone(),
            line: self.line_number,
            reason: reason.into(),
        }
    }

    fn parse_pending(&self, line: &[u8]) -> Result<(AddressId, SymbolName)>
    {
        let mut fields = line.split(u8::is_ascii_whitespace).filter(|field| !field.is_empty());
        let (Some(id), Some(name), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(self.corrupt("expected `<id> <name>`"));
        };
        let id = AddressId::parse_ascii(id)
            .ok_or_else(|| self.corrupt(format!("invalid id {:?}", String::from_utf8_lossy(id))))?;
        Ok((id, SymbolName::new(name)))
    }

    /// Find the name for `id`, advancing the cursor no further than needed.
    ///
    /// A database line with a larger id stays pending, so the next probe starts
    /// from it.
    ///
    /// ## Errors
    ///
    /// Returns [`CrashLabelError::CorruptDatabase`] if a line the cursor passes
    /// over cannot be parsed, or an I/O error from the reader.
    pub fn probe(&mut self, id: AddressId) -> Result<Option<SymbolName>>
    {
        debug_assert!(
            self.last_probe.map_or(true, |last| last < id),
            "probes must be strictly ascending: {id} after {:?}",
            self.last_probe
        );
        self.last_probe = Some(id);

        while let Some(line) = self.pending.as_deref() {
            let (line_id, name) = self.parse_pending(line)?;
            if line_id == id {
                self.advance()?;
                return Ok(Some(name));
            }
            if line_id > id {
                return Ok(None);
            }
            self.advance()?;
        }
        Ok(None)
    }
}

/// Distinct ids of a call stack together with the output column width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameScan
{
    /// Distinct ids in ascending order, ready for [`IdScanner::probe`].
    pub ids: Vec<AddressId>,
    /// Column at which resolved names start.
    pub width: usize,
}

impl FrameScan
{
    /// `true` if the call stack contains no frame with an id.
    pub fn is_empty(&self) -> bool
    {
        self.ids.is_empty()
    }
}

/// Collect the distinct frame ids and the padding width of a call stack.
pub fn collect_ids(document: &CrashLogDocument) -> FrameScan
{
    let mut ids = BTreeSet::new();
    let mut width = 0;
    for frame in document.call_stack().iter().filter_map(|line| StackFrameMatch::extract(line)) {
        ids.insert(frame.id);
        width = width.max(frame.padded_width());
    }

    FrameScan {
        ids: ids.into_iter().collect(),
        width,
    }
}

/// Look up `ids` in the database at `database` with a single forward scan.
///
/// A database that does not exist or cannot be opened yields an empty table.
///
/// ## Errors
///
/// Returns an error if the database is corrupt or fails mid-read.
pub fn resolve(database: &Path, ids: &[AddressId]) -> Result<SymbolTable>
{
    let mut scanner = match IdScanner::open(database) {
        Ok(scanner) => scanner,
        Err(CrashLabelError::Io(err)) => {
            if err.kind() == io::ErrorKind::NotFound {
                debug!("Symbol database {} not found", database.display());
            } else {
                warn!("Cannot open symbol database {}: {err}", database.display());
            }
            return Ok(SymbolTable::new());
        }
        Err(err) => return Err(err),
    };

    resolve_with(&mut scanner, ids)
}

/// Look up ascending `ids` with an already-open scanner.
///
/// ## Errors
///
/// Propagates errors from [`IdScanner::probe`].
pub fn resolve_with<R: BufRead>(scanner: &mut IdScanner<R>, ids: &[AddressId]) -> Result<SymbolTable>
{
    let mut table = SymbolTable::new();
    for &id in ids {
        if let Some(name) = scanner.probe(id)? {
            table.insert(id, name);
        }
    }
    debug!("Resolved {} of {} address ids", table.len(), ids.len());
    Ok(table)
}

/// Rewrite one call stack line using resolved names.
///
/// - Lines that are not frames are returned unchanged.
/// - Frames whose id is unresolved are reduced to their frame text.
/// - Resolved frames get their frame text padded to `width`, then the name
///   without trailing `_`/`*` decorations.
///
/// ## Example
///
/// ```rust
/// use crashlabel_core::resolver::rewrite_line;
/// use crashlabel_core::types::{AddressId, SymbolName, SymbolTable};
///
/// let mut table = SymbolTable::new();
/// table.insert(AddressId::new(7), SymbolName::new("Update_"));
///
/// let line = b"\t[0] 0xAB G.exe+1A -> 7+0x2\n";
/// assert_eq!(rewrite_line(line, &table, 24), b"\t[0] 0xAB G.exe+1A      Update\n");
/// ```
pub fn rewrite_line(line: &[u8], table: &SymbolTable, width: usize) -> Vec<u8>
{
    let Some(frame) = StackFrameMatch::extract(line) else {
        return line.to_vec();
    };

    let mut out = frame.frame.to_vec();
    if let Some(name) = table.get(frame.id) {
        let cleaned = name.cleaned();
        out.reserve(width.saturating_sub(out.len()) + cleaned.len() + 1);
        out.resize(out.len().max(width), b' ');
        out.extend_from_slice(cleaned);
    }
    out.push(b'\n');
    out
}
