use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::WithRejection;
use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::{debug, info};

use palette_core::ExtractError;
use palette_types::api::{ExtractPaletteRequest, ExtractPaletteResponse};

use crate::error::ApiError;
use crate::run_blocking;
use crate::state::AppState;

pub const MAX_COLORS: usize = 16;

/// POST /palette/extract: dominant colors of a remote or inline image.
pub async fn extract_palette(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<ExtractPaletteRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    if req.count == 0 || req.count > MAX_COLORS {
        return Err(ApiError::BadRequest(format!(
            "count must be between 1 and {}",
            MAX_COLORS
        )));
    }

    let bytes = match (req.url.as_deref(), req.image_base64.as_deref()) {
        (Some(url), None) => fetch_image(&state, url).await?,
        (None, Some(data)) => decode_inline(data, state.max_image_bytes)?,
        _ => {
            return Err(ApiError::BadRequest(
                "Provide exactly one of url or imageBase64".to_string(),
            ));
        }
    };
    debug!("Extracting {} colors from {} byte image", req.count, bytes.len());

    let extractor = state.clone();
    let (count, include_frequencies) = (req.count, req.include_frequencies);
    let colors = run_blocking(move || {
        Ok(extractor
            .extractor
            .extract_colors(&bytes, count, include_frequencies)?)
    })
    .await?;

    info!("Extracted {} colors", colors.len());
    Ok(Json(ExtractPaletteResponse { colors }))
}

async fn fetch_image(state: &AppState, url: &str) -> Result<Vec<u8>, ApiError> {
    let url = reqwest::Url::parse(url).map_err(|e| ApiError::BadRequest(format!("Invalid url: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::BadRequest(format!(
            "Unsupported url scheme '{}'",
            url.scheme()
        )));
    }

    let mut response = state
        .http
        .get(url.clone())
        .send()
        .await
        .map_err(|e| ExtractError::image_load(url.to_string(), e))?;

    if !response.status().is_success() {
        return Err(ExtractError::image_load_msg(format!(
            "{} returned {}",
            url,
            response.status()
        ))
        .into());
    }

    let too_large = || {
        ApiError::PayloadTooLarge(format!(
            "Image exceeds {} bytes",
            state.max_image_bytes
        ))
    };
    if response
        .content_length()
        .is_some_and(|len| len > state.max_image_bytes as u64)
    {
        return Err(too_large());
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ExtractError::image_load(url.to_string(), e))?
    {
        if body.len() + chunk.len() > state.max_image_bytes {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }

    debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(body)
}

/// Accepts bare base64 or a `data:image/...;base64,` URL.
fn decode_inline(data: &str, max_bytes: usize) -> Result<Vec<u8>, ApiError> {
    let payload = match data.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, payload)| payload)
            .ok_or_else(|| ApiError::BadRequest("Malformed data url".to_string()))?,
        None => data,
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ApiError::BadRequest(format!("Invalid imageBase64: {}", e)))?;
    if bytes.len() > max_bytes {
        return Err(ApiError::PayloadTooLarge(format!(
            "Image exceeds {} bytes",
            max_bytes
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_accepts_data_url_prefix() {
        let encoded = STANDARD.encode(b"abc");
        assert_eq!(decode_inline(&encoded, 16).unwrap(), b"abc");

        let data_url = format!("data:image/png;base64,{}", encoded);
        assert_eq!(decode_inline(&data_url, 16).unwrap(), b"abc");
    }

    #[test]
    fn inline_rejects_bad_input() {
        assert!(matches!(
            decode_inline("not base64!", 16),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            decode_inline("data:image/png;base64", 16),
            Err(ApiError::BadRequest(_))
        ));

        let big = STANDARD.encode([0u8; 32]);
        assert!(matches!(
            decode_inline(&big, 16),
            Err(ApiError::PayloadTooLarge(_))
        ));
    }
}
