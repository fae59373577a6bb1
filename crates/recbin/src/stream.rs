//! Streaming encoder producing a RecBin byte buffer.

use alloy_primitives::U256;

use crate::{DIRECT_INT_MAX, EMPTY_LIST, EMPTY_STRING, SHORT_PAYLOAD_MAX};

/// Appends elements to a growing byte buffer.
///
/// Lists declare their element count up front via [`Stream::append_list`];
/// since the wire header carries the payload *length*, the header bytes are
/// inserted retroactively once the declared number of elements has been
/// appended. Closing a list counts as one appended element of the enclosing
/// list.
#[derive(Debug, Default)]
pub struct Stream {
    out: Vec<u8>,
    /// Open lists, innermost last: header insertion offset and elements
    /// still expected.
    pending: Vec<PendingList>,
}

#[derive(Debug)]
struct PendingList {
    offset: usize,
    remaining: usize,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a non-negative integer in its unique minimal form.
    pub fn append_int(&mut self, value: u64) -> &mut Self {
        if value <= DIRECT_INT_MAX as u64 {
            self.out.push(value as u8);
        } else {
            let be = value.to_be_bytes();
            let skip = be.iter().take_while(|b| **b == 0).count();
            self.out.push(0x17 + (be.len() - skip) as u8);
            self.out.extend_from_slice(&be[skip..]);
        }
        self.note_appended()
    }

    /// Appends a 256-bit integer. Values that fit 64 bits produce the same
    /// bytes [`Stream::append_int`] would.
    pub fn append_u256(&mut self, value: U256) -> &mut Self {
        if value <= U256::from(DIRECT_INT_MAX) {
            self.out.push(value.to::<u8>());
        } else {
            let be = value.to_be_bytes_trimmed_vec();
            self.out.push(0x17 + be.len() as u8);
            self.out.extend_from_slice(&be);
        }
        self.note_appended()
    }

    /// Appends an arbitrary-precision non-negative integer given as its
    /// big-endian magnitude. Leading zero bytes are ignored; magnitudes of
    /// up to 32 bytes take the same form the fixed-width appenders produce.
    pub fn append_bigint(&mut self, magnitude: &[u8]) -> &mut Self {
        let skip = magnitude.iter().take_while(|b| **b == 0).count();
        let mag = &magnitude[skip..];
        match mag {
            [] => {
                self.out.push(0);
            }
            [b] if *b <= DIRECT_INT_MAX => {
                self.out.push(*b);
            }
            _ if mag.len() <= 32 => {
                self.out.push(0x17 + mag.len() as u8);
                self.out.extend_from_slice(mag);
            }
            _ => {
                let be = (mag.len() as u64).to_be_bytes();
                let len_skip = be.iter().take_while(|b| **b == 0).count();
                self.out.push(0x37 + (be.len() - len_skip) as u8);
                self.out.extend_from_slice(&be[len_skip..]);
                self.out.extend_from_slice(mag);
            }
        }
        self.note_appended()
    }

    /// Appends a byte string.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.push_length(bytes.len(), EMPTY_STRING);
        self.out.extend_from_slice(bytes);
        self.note_appended()
    }

    /// Opens a list of exactly `count` elements.
    pub fn append_list(&mut self, count: usize) -> &mut Self {
        if count == 0 {
            self.out.push(EMPTY_LIST);
            self.note_appended()
        } else {
            self.pending.push(PendingList {
                offset: self.out.len(),
                remaining: count,
            });
            self
        }
    }

    /// Appends an already-encoded fragment as a single element. Used when a
    /// caller embeds a fully serialized sub-structure.
    pub fn append_raw(&mut self, encoded: &[u8]) -> &mut Self {
        self.out.extend_from_slice(encoded);
        self.note_appended()
    }

    /// True once every opened list has received its declared elements.
    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }

    /// Finishes the stream and hands back the buffer.
    ///
    /// # Panics
    ///
    /// Panics if a list opened with [`Stream::append_list`] is still missing
    /// elements; that is a bug in the caller, not a data error.
    pub fn out(self) -> Vec<u8> {
        assert!(self.pending.is_empty(), "unclosed list in stream");
        self.out
    }

    fn push_length(&mut self, len: usize, base: u8) {
        if len <= SHORT_PAYLOAD_MAX {
            self.out.push(base + len as u8);
        } else {
            let be = (len as u64).to_be_bytes();
            let skip = be.iter().take_while(|b| **b == 0).count();
            self.out.push(base + 0x37 + (be.len() - skip) as u8);
            self.out.extend_from_slice(&be[skip..]);
        }
    }

    fn note_appended(&mut self) -> &mut Self {
        while let Some(top) = self.pending.last_mut() {
            top.remaining -= 1;
            if top.remaining > 0 {
                break;
            }
            let offset = top.offset;
            self.pending.pop();
            let payload = self.out.len() - offset;
            let mut header = [0u8; 9];
            let header_len = if payload <= SHORT_PAYLOAD_MAX {
                header[0] = EMPTY_LIST + payload as u8;
                1
            } else {
                let be = (payload as u64).to_be_bytes();
                let skip = be.iter().take_while(|b| **b == 0).count();
                header[0] = 0xb7 + (be.len() - skip) as u8;
                header[1..1 + be.len() - skip].copy_from_slice(&be[skip..]);
                1 + be.len() - skip
            };
            self.out
                .splice(offset..offset, header[..header_len].iter().copied());
            // the closed list is itself one element of its parent
        }
        self
    }
}
