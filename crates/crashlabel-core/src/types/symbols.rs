//! Symbol name and lookup table types.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use super::AddressId;

/// Decoration characters the database appends to some names.
const NAME_DECORATIONS: &[u8] = b"_*";

/// A symbol name exactly as stored in the database.
///
/// Names are kept as raw bytes: the crash log is rewritten byte-for-byte and
/// nothing here assumes an encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolName(Vec<u8>);

impl SymbolName
{
    /// Construct from the raw database bytes.
    pub fn new(raw: impl Into<Vec<u8>>) -> Self
    {
        Self(raw.into())
    }

    /// Raw name as stored in the database.
    pub fn as_bytes(&self) -> &[u8]
    {
        &self.0
    }

    /// Name with trailing `_` and `*` decorations removed.
    ///
    /// ```rust
    /// use crashlabel_core::types::SymbolName;
    ///
    /// assert_eq!(SymbolName::new("SomeFunction_*_").cleaned(), b"SomeFunction");
    /// ```
    pub fn cleaned(&self) -> &[u8]
    {
        let end = self
            .0
            .iter()
            .rposition(|byte| !NAME_DECORATIONS.contains(byte))
            .map_or(0, |pos| pos + 1);
        &self.0[..end]
    }
}

impl fmt::Display for SymbolName
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Resolved names for the identifiers found in one crash log.
///
/// Only identifiers that were actually found in the database have an entry;
/// an empty table means nothing in the log could be labeled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable
{
    names: BTreeMap<AddressId, SymbolName>,
}

impl SymbolTable
{
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Record the name for `id`, replacing any previous entry.
    pub fn insert(&mut self, id: AddressId, name: SymbolName)
    {
        self.names.insert(id, name);
    }

    /// Look up the name for `id`.
    pub fn get(&self, id: AddressId) -> Option<&SymbolName>
    {
        self.names.get(&id)
    }

    /// Number of resolved identifiers.
    pub fn len(&self) -> usize
    {
        self.names.len()
    }

    /// `true` if no identifier was resolved.
    pub fn is_empty(&self) -> bool
    {
        self.names.is_empty()
    }

    /// Entries in ascending identifier order.
    pub fn iter(&self) -> btree_map::Iter<'_, AddressId, SymbolName>
    {
        self.names.iter()
    }
}

impl FromIterator<(AddressId, SymbolName)> for SymbolTable
{
    fn from_iter<I: IntoIterator<Item = (AddressId, SymbolName)>>(iter: I) -> Self
    {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
