//! # Stack Frame Lines
//!
//! Recognizes call stack lines that carry an address identifier:
//!
//! ```text
//! \t[ 0] 0x7FF6ABCDEF00 SkyrimSE.exe+01ABCDEF -> 12345+0x10
//! └──────────────── frame ─────────────────┘    └─ id ┘
//! ```
//!
//! Matching is byte-level and case-sensitive (hex digits are uppercase). It is
//! anchored at the start of the line; anything after the module offset is
//! ignored.

use once_cell::sync::Lazy;
use regex::bytes::Regex;

use crate::types::AddressId;

static FRAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u)^(?P<frame>\t\[ *[0-9]+\] 0x[0-9A-F]+ .*\+[0-9A-F]+) -> (?P<id>[0-9]+)\+0x[0-9A-F]+")
        .expect("frame pattern is valid")
});

/// A call stack line that matched the frame shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackFrameMatch<'a>
{
    /// Frame text before `" -> "`: index, address, and module offset.
    pub frame: &'a [u8],
    /// Identifier following `" -> "`.
    pub id: AddressId,
}

impl<'a> StackFrameMatch<'a>
{
    /// Match `line` against the frame shape.
    ///
    /// Returns `None` if the line is not a frame, including when the identifier
    /// does not fit in a `u64`.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use crashlabel_core::frame::StackFrameMatch;
    ///
    /// let line = b"\t[  0] 0x00007FF6ABCDEF00 SkyrimSE.exe+01ABCDEF -> 12345+0x10\n";
    /// let frame = StackFrameMatch::extract(line).unwrap();
    /// assert_eq!(frame.frame, b"\t[  0] 0x00007FF6ABCDEF00 SkyrimSE.exe+01ABCDEF");
    /// assert_eq!(frame.id.value(), 12345);
    ///
    /// assert!(StackFrameMatch::extract(b"\t[  1] 0x00007FF6ABCDEF10 SkyrimSE.exe+01ABCDF0\n").is_none());
    /// ```
    pub fn extract(line: &'a [u8]) -> Option<Self>
    {
        let captures = FRAME_PATTERN.captures(line)?;
        let frame = captures.name("frame")?.as_bytes();
        let id = AddressId::parse_ascii(captures.name("id")?.as_bytes())?;
        Some(Self { frame, id })
    }

    /// Width this frame needs in the padded output column.
    ///
    /// One more than the frame text so a separator always follows it.
    pub fn padded_width(&self) -> usize
    {
        self.frame.len() + 1
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_extract_with_and_without_index_padding()
    {
        let padded = StackFrameMatch::extract(b"\t[  3] 0xABC Fallout4.exe+1A -> 7+0xF\n").unwrap();
        assert_eq!(padded.id, AddressId::new(7));

        let tight = StackFrameMatch::extract(b"\t[12] 0xABC Fallout4.exe+1A -> 7+0xF\n").unwrap();
        assert_eq!(tight.frame, b"\t[12] 0xABC Fallout4.exe+1A");
    }

    #[test]
    fn test_extract_requires_uppercase_hex()
    {
        assert!(StackFrameMatch::extract(b"\t[0] 0xabc Game.exe+1A -> 7+0xF\n").is_none());
        assert!(StackFrameMatch::extract(b"\t[0] 0xABC Game.exe+1a -> 7+0xF\n").is_none());
        assert!(StackFrameMatch::extract(b"\t[0] 0xABC Game.exe+1A -> 7+0xf\n").is_none());
    }

    #[test]
    fn test_extract_requires_leading_tab()
    {
        assert!(StackFrameMatch::extract(b"[0] 0xABC Game.exe+1A -> 7+0xF\n").is_none());
        assert!(StackFrameMatch::extract(b" \t[0] 0xABC Game.exe+1A -> 7+0xF\n").is_none());
    }

    #[test]
    fn test_extract_rejects_overflowing_id()
    {
        assert!(StackFrameMatch::extract(b"\t[0] 0xABC Game.exe+1A -> 99999999999999999999+0xF\n").is_none());
    }

    #[test]
    fn test_extract_ignores_trailing_text()
    {
        let frame = StackFrameMatch::extract(b"\t[0] 0xABC Game.exe+1A -> 42+0xF\tsomething\n").unwrap();
        assert_eq!(frame.id, AddressId::new(42));
        assert_eq!(frame.padded_width(), frame.frame.len() + 1);
    }

    #[test]
    fn test_extract_tolerates_non_utf8_module_names()
    {
        let frame = StackFrameMatch::extract(b"\t[0] 0xABC G\xffme.exe+1A -> 42+0xF\n").unwrap();
        assert_eq!(frame.frame, b"\t[0] 0xABC G\xffme.exe+1A");
    }
}
