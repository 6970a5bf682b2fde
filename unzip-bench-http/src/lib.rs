#![forbid(unsafe_code)]

mod client;
mod error;
mod estimate;
pub mod multipart;
mod types;

pub use client::HttpClient;
pub use error::{Error, HttpTransportErrorKind, Result};
pub use multipart::{EncodedForm, encode_file};
pub use types::{HttpRequest, HttpResponse};
