//! Borrowing decoder cursor over an encoded buffer.

use alloy_primitives::U256;

use crate::{error::MalformedEncoding, DIRECT_INT_MAX, EMPTY_LIST, EMPTY_STRING, SHORT_PAYLOAD_MAX};

/// Kind of a decoded element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Int,
    String,
    List,
}

/// Parsed leading-byte information: where the payload starts and how long
/// it runs. Produced only after bounds and minimality checks.
#[derive(Debug, Clone, Copy)]
struct Header {
    kind: Kind,
    prefix: usize,
    payload: usize,
}

/// A view of one encoded element.
///
/// The cursor never copies: child elements and payloads are crops of the
/// same buffer. An `Item` may be backed by a buffer that extends past the
/// element; [`Item::size`] reports where the element ends. Typed extractors
/// answer with the canonical default (zero, the empty slice) when called on
/// another kind; structural accessors report [`MalformedEncoding`] instead
/// of reading out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item<'a> {
    data: &'a [u8],
}

impl<'a> Item<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// The view with no bytes at all; distinct from an empty string or an
    /// empty list.
    pub const fn null() -> Self {
        Self { data: &[] }
    }

    pub fn is_null(&self) -> bool {
        self.data.is_empty()
    }

    /// Zero-length string or zero-length list.
    pub fn is_empty(&self) -> bool {
        matches!(self.first(), Some(EMPTY_STRING | EMPTY_LIST))
    }

    pub fn is_int(&self) -> bool {
        matches!(self.first(), Some(b) if b < EMPTY_STRING)
    }

    /// Integer representable in 64 bits.
    pub fn is_slim_int(&self) -> bool {
        matches!(self.first(), Some(b) if b < 0x20)
    }

    /// Integer needing the 256-bit tier.
    pub fn is_fat_int(&self) -> bool {
        matches!(self.first(), Some(b) if (0x20..0x38).contains(&b))
    }

    /// Length-prefixed integer wider than 256 bits.
    pub fn is_big_int(&self) -> bool {
        matches!(self.first(), Some(b) if (0x38..0x40).contains(&b))
    }

    pub fn is_string(&self) -> bool {
        matches!(self.first(), Some(b) if (EMPTY_STRING..EMPTY_LIST).contains(&b))
    }

    pub fn is_list(&self) -> bool {
        matches!(self.first(), Some(b) if (EMPTY_LIST..0xc0).contains(&b))
    }

    /// Total encoded size of the element: header plus payload.
    pub fn size(&self) -> Result<usize, MalformedEncoding> {
        let h = self.header()?;
        Ok(h.prefix + h.payload)
    }

    /// The element's exact encoded bytes, cropped to [`Item::size`].
    pub fn raw(&self) -> Result<&'a [u8], MalformedEncoding> {
        Ok(&self.data[..self.size()?])
    }

    /// String payload. Empty for every other kind.
    pub fn as_bytes(&self) -> &'a [u8] {
        match self.header() {
            Ok(Header {
                kind: Kind::String,
                prefix,
                payload,
            }) => &self.data[prefix..prefix + payload],
            _ => &[],
        }
    }

    /// Minimal big-endian magnitude of an integer. Empty for zero and for
    /// every other kind.
    pub fn int_be_bytes(&self) -> &'a [u8] {
        match self.header() {
            Ok(Header {
                kind: Kind::Int,
                prefix,
                payload,
            }) => {
                if payload == 0 {
                    // direct form: the leading byte is the value
                    if self.data[0] == 0 {
                        &[]
                    } else {
                        &self.data[..1]
                    }
                } else {
                    &self.data[prefix..prefix + payload]
                }
            }
            _ => &[],
        }
    }

    /// Integer value if it fits 64 bits, zero otherwise.
    pub fn to_u64(&self) -> u64 {
        let mag = self.int_be_bytes();
        if mag.len() > 8 {
            return 0;
        }
        mag.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
    }

    /// Integer value if it fits 256 bits, zero otherwise.
    pub fn to_u256(&self) -> U256 {
        let mag = self.int_be_bytes();
        if mag.len() > 32 {
            return U256::ZERO;
        }
        U256::from_be_slice(mag)
    }

    /// Iterates the children of a list. Empty for every other kind.
    pub fn iter(&self) -> Iter<'a> {
        match self.header() {
            Ok(Header {
                kind: Kind::List,
                prefix,
                payload,
            }) => Iter {
                rest: &self.data[prefix..prefix + payload],
            },
            _ => Iter { rest: &[] },
        }
    }

    /// Number of children of a list; zero for every other kind. O(n): child
    /// sizes are computed by walking.
    pub fn item_count(&self) -> Result<usize, MalformedEncoding> {
        let mut count = 0;
        for child in self.iter() {
            child?;
            count += 1;
        }
        Ok(count)
    }

    /// The `index`-th child of a list, by walking the preceding children.
    /// The null item when out of range or not a list.
    pub fn at(&self, index: usize) -> Result<Item<'a>, MalformedEncoding> {
        let mut children = self.iter();
        for _ in 0..index {
            match children.next() {
                Some(child) => {
                    child?;
                }
                None => return Ok(Item::null()),
            }
        }
        children.next().unwrap_or(Ok(Item::null()))
    }

    /// Deep well-formedness check: the element and every transitive child
    /// parse, and list payloads are exactly filled by their children.
    pub fn validate(&self) -> Result<(), MalformedEncoding> {
        let h = self.header()?;
        if let Kind::List = h.kind {
            for child in self.iter() {
                child?.validate()?;
            }
        }
        Ok(())
    }

    fn first(&self) -> Option<u8> {
        self.data.first().copied()
    }

    fn need(&self, len: usize) -> Result<(), MalformedEncoding> {
        if self.data.len() < len {
            Err(MalformedEncoding::Truncated)
        } else {
            Ok(())
        }
    }

    fn header(&self) -> Result<Header, MalformedEncoding> {
        let b0 = *self.data.first().ok_or(MalformedEncoding::Truncated)?;
        match b0 {
            0x00..=0x17 => Ok(Header {
                kind: Kind::Int,
                prefix: 1,
                payload: 0,
            }),
            0x18..=0x37 => {
                let payload = (b0 - DIRECT_INT_MAX) as usize;
                self.need(1 + payload)?;
                if self.data[1] == 0 || (payload == 1 && self.data[1] <= DIRECT_INT_MAX) {
                    return Err(MalformedEncoding::NonMinimalInteger);
                }
                Ok(Header {
                    kind: Kind::Int,
                    prefix: 1,
                    payload,
                })
            }
            0x38..=0x3f => {
                let (prefix, payload) = self.long_length(b0 - 0x37)?;
                if payload <= 32 {
                    return Err(MalformedEncoding::NonMinimalLength);
                }
                if self.data[prefix] == 0 {
                    return Err(MalformedEncoding::NonMinimalInteger);
                }
                Ok(Header {
                    kind: Kind::Int,
                    prefix,
                    payload,
                })
            }
            0x40..=0x77 => {
                let payload = (b0 - EMPTY_STRING) as usize;
                self.need(1 + payload)?;
                Ok(Header {
                    kind: Kind::String,
                    prefix: 1,
                    payload,
                })
            }
            0x78..=0x7f => {
                let (prefix, payload) = self.long_length(b0 - 0x77)?;
                if payload <= SHORT_PAYLOAD_MAX {
                    return Err(MalformedEncoding::NonMinimalLength);
                }
                Ok(Header {
                    kind: Kind::String,
                    prefix,
                    payload,
                })
            }
            0x80..=0xb7 => {
                let payload = (b0 - EMPTY_LIST) as usize;
                self.need(1 + payload)?;
                Ok(Header {
                    kind: Kind::List,
                    prefix: 1,
                    payload,
                })
            }
            0xb8..=0xbf => {
                let (prefix, payload) = self.long_length(b0 - 0xb7)?;
                if payload <= SHORT_PAYLOAD_MAX {
                    return Err(MalformedEncoding::NonMinimalLength);
                }
                Ok(Header {
                    kind: Kind::List,
                    prefix,
                    payload,
                })
            }
            0xc0..=0xff => Err(MalformedEncoding::Reserved(b0)),
        }
    }

    /// Reads a big-endian length of `len_len` bytes after the leading byte
    /// and bounds-checks the payload it declares. Returns (prefix, payload).
    fn long_length(&self, len_len: u8) -> Result<(usize, usize), MalformedEncoding> {
        let len_len = len_len as usize;
        self.need(1 + len_len)?;
        let be = &self.data[1..1 + len_len];
        if be[0] == 0 {
            return Err(MalformedEncoding::NonMinimalLength);
        }
        let wide = be.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
        let payload = usize::try_from(wide).map_err(|_| MalformedEncoding::Truncated)?;
        let prefix = 1 + len_len;
        self.need(
            prefix
                .checked_add(payload)
                .ok_or(MalformedEncoding::Truncated)?,
        )?;
        Ok((prefix, payload))
    }
}

/// Iterator over the children of a list, yielding each child cropped to its
/// own encoding. A child that overruns the remaining payload surfaces as
/// [`MalformedEncoding::ListOverflow`] and ends the iteration.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Iter<'a> {
    type Item = Result<Item<'a>, MalformedEncoding>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let head = Item::new(self.rest);
        match head.size() {
            Ok(size) => {
                let (child, rest) = self.rest.split_at(size);
                self.rest = rest;
                Some(Ok(Item::new(child)))
            }
            Err(err) => {
                self.rest = &[];
                // truncation relative to the cropped payload means the
                // declared children overflow it
                Some(Err(match err {
                    MalformedEncoding::Truncated => MalformedEncoding::ListOverflow,
                    other => other,
                }))
            }
        }
    }
}
