use quick_xml::Error as XMLError;
use std::{str::Utf8Error, string::FromUtf8Error};
use thiserror::Error;

/// Wrapper around `std::Result`
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Error, Debug)]
pub enum Error {
    /// [`std::io`] related error.
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// Decoding related error.
    /// Maybe the XML declaration has an encoding value that it doesn't recognize,
    /// or it doesn't match its actual encoding.
    #[error("Cannot decode XML")]
    CannotDecode,
    /// The text has characters the original encoding cannot represent.
    #[error("Cannot encode XML as {0}")]
    CannotEncode(&'static str),
    /// Assorted errors while parsing XML.
    #[error("Malformed XML: {0}")]
    MalformedXml(String),
    /// An insertion needs an existing group to attach to.
    #[error("Group `{group}` does not exist")]
    MissingContainer { group: String },
}

impl From<XMLError> for Error {
    fn from(err: XMLError) -> Error {
        match err {
            XMLError::EndEventMismatch { expected, found } => Error::MalformedXml(format!(
                "Closing tag mismatch. Expected {}, found {}",
                expected, found,
            )),
            XMLError::Io(err) => Error::Io(err),
            XMLError::Utf8(_) => Error::CannotDecode,
            err => Error::MalformedXml(err.to_string()),
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_: FromUtf8Error) -> Error {
        Error::CannotDecode
    }
}

impl From<Utf8Error> for Error {
    fn from(_: Utf8Error) -> Error {
        Error::CannotDecode
    }
}
