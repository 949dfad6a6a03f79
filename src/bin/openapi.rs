//! Writes the OpenAPI document to `api.json`, or to the path given as the
//! first argument.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "api.json".to_owned());

    harbor::docs::generate_docs(&path).await?;
    println!("wrote {}", path);

    Ok(())
}
