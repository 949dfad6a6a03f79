use std::collections::HashMap;

/// Read access to environment-style key/value pairs.
///
/// The process environment is the production source; tests hand in a map
/// instead of mutating global state.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;

    /// Like [`EnvSource::var`], but whitespace-only values count as unset.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|value| !value.trim().is_empty())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for [(&str, &str)] {
    fn var(&self, key: &str) -> Option<String> {
        self.iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| (*value).to_owned())
    }
}

impl<const N: usize> EnvSource for [(&str, &str); N] {
    fn var(&self, key: &str) -> Option<String> {
        self.as_slice().var(key)
    }
}

/// Trait for building configuration structs
///
/// Implementors decide which variables they read and how strictly they
/// parse them. The binary builds its configuration once at startup and
/// hands it to request handlers through application state.
pub trait ConfigBuilder: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build the configuration instance from the given source
    fn build<E: EnvSource + ?Sized>(env: &E) -> Result<Self, Self::Error>;

    fn from_process_env() -> Result<Self, Self::Error> {
        Self::build(&ProcessEnv)
    }
}
