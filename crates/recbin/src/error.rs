use thiserror::Error;

/// Decoding failure over an untrusted buffer.
///
/// Any of these means the buffer is not a canonical RecBin encoding. The
/// cursor never reads past the end of the buffer while detecting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedEncoding {
    /// Leading byte in the reserved `0xc0..=0xff` range.
    #[error("reserved leading byte {0:#04x}")]
    Reserved(u8),

    /// A declared payload or length runs past the end of the buffer.
    #[error("declared length overruns the buffer")]
    Truncated,

    /// A length-of-length with leading zero bytes, or a long form used where
    /// the short form suffices.
    #[error("length is not minimally encoded")]
    NonMinimalLength,

    /// An integer payload with a leading zero byte, or an indirect form used
    /// for a value that has a direct encoding.
    #[error("integer is not minimally encoded")]
    NonMinimalInteger,

    /// A list's children run past the payload length declared by its header.
    #[error("list children overflow the declared payload")]
    ListOverflow,
}
