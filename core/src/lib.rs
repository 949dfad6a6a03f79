pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod interceptor;
pub mod response;
pub mod validation;

pub use error::HttpException;
pub use validation::{Dto, ValidatedJson, ValidationErrors};
