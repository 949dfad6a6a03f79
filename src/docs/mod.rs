use tokio::io::AsyncWriteExt;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use harbor_core::response::{ErrorBody, ErrorMessage};

use crate::app::controller::HealthControllerApi;
use crate::app::response::HealthResponse;

/// Interactive documentation UI.
pub const DOCS_PATH: &str = "/api/docs";
/// Raw OpenAPI document.
pub const DOCS_JSON_PATH: &str = "/api/docs-json";

#[derive(OpenApi)]
#[openapi(
    nest(
        (path = "/api/v1", api = HealthControllerApi)
    ),
    components(schemas(ErrorBody, ErrorMessage, HealthResponse)),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness and deployment information")
    ),
    info(title = "Harbor API", description = "API Docs")
)]
pub struct MainApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui(openapi: utoipa::openapi::OpenApi) -> SwaggerUi {
    SwaggerUi::new(DOCS_PATH).url(DOCS_JSON_PATH, openapi)
}

/// Writes the OpenAPI document to `path`, replacing any previous file.
pub async fn generate_docs(path: &str) -> anyhow::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await?;

    let docs = MainApiDoc::openapi().to_pretty_json()?;

    file.write_all(docs.as_bytes()).await?;
    file.flush().await?;

    Ok(())
}
