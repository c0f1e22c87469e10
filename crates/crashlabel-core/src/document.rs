//! # Crash Log Document
//!
//! Line-oriented model of a crash report.
//!
//! A crash report is split into three runs of raw byte lines:
//!
//! ```text
//! preamble    everything up to and including "PROBABLE CALL STACK:\n"
//! call stack  the frames that follow, up to a blank line or "REGISTERS:\n"
//! trailer     the rest of the file, starting with a blank line
//! ```
//!
//! Lines keep their `\n` terminators so that writing the three runs back out
//! reproduces the file. Nothing is decoded; any encoding survives untouched.
//!
//! A log that never reaches a marker still parses: whatever was collected is
//! kept, and the remaining runs are simply empty.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Line that opens the call stack section (kept in the preamble).
pub const CALL_STACK_MARKER: &[u8] = b"PROBABLE CALL STACK:\n";

/// Line that can close the call stack section instead of a blank line.
pub const REGISTERS_MARKER: &[u8] = b"REGISTERS:\n";

/// Blank line separating the call stack from the trailer.
pub const BLANK_LINE: &[u8] = b"\n";

/// A parsed crash report.
///
/// One document is built per processed log: it is read once, rewritten at most
/// once, and written back only if [`changed`](Self::changed) is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrashLogDocument
{
    preamble: Vec<Vec<u8>>,
    call_stack: Vec<Vec<u8>>,
    trailer: Vec<Vec<u8>>,
    changed: bool,
}

/// Parser position while segmenting a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section
{
    Preamble,
    CallStack,
    Trailer,
}

impl CrashLogDocument
{
    /// Segment an in-memory crash report.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use crashlabel_core::CrashLogDocument;
    ///
    /// let doc = CrashLogDocument::parse(b"header\nPROBABLE CALL STACK:\n\tframe\n\nREGISTERS:\n");
    /// assert_eq!(doc.preamble().len(), 2);
    /// assert_eq!(doc.call_stack(), &[b"\tframe\n".to_vec()]);
    /// assert_eq!(doc.trailer().len(), 2);
    /// ```
    pub fn parse(bytes: &[u8]) -> Self
    {
        let mut doc = Self::default();
        let mut section = Section::Preamble;
        for line in bytes.split_inclusive(|&byte| byte == b'\n') {
            section = doc.push_line(section, line);
        }
        doc
    }

    /// Segment a crash report read line by line from `reader`.
    ///
    /// ## Errors
    ///
    /// Returns any I/O error raised by the reader.
    pub fn from_reader<R: BufRead>(mut reader: R) -> io::Result<Self>
    {
        let mut doc = Self::default();
        let mut section = Section::Preamble;
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(doc);
            }
            section = doc.push_line(section, &line);
        }
    }

    /// Read and segment the crash report at `path`.
    ///
    /// ## Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn read(path: &Path) -> io::Result<Self>
    {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    fn push_line(&mut self, section: Section, line: &[u8]) -> Section
    {
        match section {
            Section::Preamble => {
                self.preamble.push(line.to_vec());
                if line == CALL_STACK_MARKER {
                    Section::CallStack
                } else {
                    Section::Preamble
                }
            }
            Section::CallStack => {
                if line == REGISTERS_MARKER {
                    // Keep a blank separator ahead of the register dump.
                    self.trailer.push(BLANK_LINE.to_vec());
                    self.trailer.push(line.to_vec());
                    Section::Trailer
                } else if line == BLANK_LINE {
                    self.trailer.push(line.to_vec());
                    Section::Trailer
                } else {
                    self.call_stack.push(line.to_vec());
                    Section::CallStack
                }
            }
            Section::Trailer => {
                self.trailer.push(line.to_vec());
                Section::Trailer
            }
        }
    }

    /// Lines up to and including the call stack marker.
    pub fn preamble(&self) -> &[Vec<u8>]
    {
        &self.preamble
    }

    /// Call stack lines, in file order.
    pub fn call_stack(&self) -> &[Vec<u8>]
    {
        &self.call_stack
    }

    /// Lines after the call stack, starting with the blank separator.
    pub fn trailer(&self) -> &[Vec<u8>]
    {
        &self.trailer
    }

    /// `true` once a rewrite has altered at least one call stack line.
    pub fn changed(&self) -> bool
    {
        self.changed
    }

    /// Replace every call stack line with `transform(line)`.
    ///
    /// [`changed`](Self::changed) is set if any line differs from the original.
    pub fn rewrite_call_stack<F>(&mut self, mut transform: F)
    where
        F: FnMut(&[u8]) -> Vec<u8>,
    {
        let rewritten: Vec<Vec<u8>> = self.call_stack.iter().map(|line| transform(line.as_slice())).collect();
        self.replace_call_stack(rewritten);
    }

    /// Fallible variant of [`rewrite_call_stack`](Self::rewrite_call_stack).
    ///
    /// All lines are transformed before anything is replaced, so if `transform`
    /// fails the document is left exactly as it was.
    ///
    /// ## Errors
    ///
    /// Returns the first error produced by `transform`.
    pub fn try_rewrite_call_stack<F, E>(&mut self, mut transform: F) -> Result<(), E>
    where
        F: FnMut(&[u8]) -> Result<Vec<u8>, E>,
    {
        let rewritten = self
            .call_stack
            .iter()
            .map(|line| transform(line.as_slice()))
            .collect::<Result<Vec<_>, E>>()?;
        self.replace_call_stack(rewritten);
        Ok(())
    }

    fn replace_call_stack(&mut self, rewritten: Vec<Vec<u8>>)
    {
        if rewritten != self.call_stack {
            self.changed = true;
            self.call_stack = rewritten;
        }
    }

    fn lines(&self) -> impl Iterator<Item = &Vec<u8>>
    {
        self.preamble.iter().chain(&self.call_stack).chain(&self.trailer)
    }

    /// Concatenate preamble, call stack, and trailer.
    pub fn serialize(&self) -> Vec<u8>
    {
        let mut out = Vec::with_capacity(self.lines().map(Vec::len).sum());
        for line in self.lines() {
            out.extend_from_slice(line);
        }
        out
    }

    /// Write the serialized document to `writer`.
    ///
    /// ## Errors
    ///
    /// Returns any I/O error raised by the writer.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()>
    {
        for line in self.lines() {
            writer.write_all(line)?;
        }
        writer.flush()
    }
}
