use std::path::PathBuf;

/// Loads `.env` from the working directory or its parents, if there is one.
pub async fn init_env() -> Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(err) if err.not_found() => Ok(None),
        Err(err) => Err(err),
    }
}
