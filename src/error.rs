use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("multiplication count is undefined for a zero exponent")]
    ZeroExponent,
    #[error("key is too short: {message} message bits, {key} key bits")]
    KeyTooShort { message: usize, key: usize },
    #[error("cannot pad {len} bits to a width of {width}")]
    PadOverflow { len: usize, width: usize },
    #[error("bit sequence of length {0} is not a multiple of 7")]
    RaggedBits(usize),
    #[error("{0:?} is not a 7-bit ascii character")]
    NotAscii(char),
    #[error("{0:?} is not a bit")]
    InvalidBit(char),
    #[error("modulus must be larger than 1")]
    InvalidGroup,
}

pub type Result<T> = std::result::Result<T, Error>;
