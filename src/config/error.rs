use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric variable could not be parsed.
    #[error("cannot parse `{key}` as a number: {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    /// A boolean variable holds something other than true/false/1/0/yes/no/on/off.
    #[error("cannot parse `{key}` as a flag: {value:?}")]
    InvalidFlag { key: &'static str, value: String },

    /// The listen port is not a valid TCP port.
    #[error("`{key}` is not a valid TCP port: {value:?}")]
    InvalidPort { key: &'static str, value: String },
}
