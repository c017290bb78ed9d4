use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Html,
    Json,
};
use tracing::instrument;

use crate::adapters::http::{error::ApiError, state::HttpState};
use crate::application::dto::AnalyzeResponse;
use crate::domain::errors::DomainError;

const UPLOAD_FIELD: &str = "file";

const HOME_PAGE: &str = r#"<html>
    <body>
        <h1>Driving Behavior Detection</h1>
        <form action="/api/analyze-image" method="post" enctype="multipart/form-data">
            <input type="file" name="file" accept="image/*">
            <button type="submit">Analyze</button>
        </form>
    </body>
</html>"#;

pub async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

#[instrument(name = "analyze_image", skip_all)]
pub async fn analyze_image(
    State(st): State<HttpState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut multipart = multipart.map_err(|r| ApiError::new(r.status(), r.body_text()))?;
    let bytes = read_upload(&mut multipart).await?;
    let report = st.analysis.analyze(bytes).await?;
    Ok(Json(report.into()))
}

/// Lee el campo `file`; el resto de campos se ignoran.
async fn read_upload(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
            return Ok(data.to_vec());
        }
    }
    Err(DomainError::InvalidInput(format!("missing multipart field '{UPLOAD_FIELD}'")).into())
}
