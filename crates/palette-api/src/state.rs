use std::sync::Arc;

use palette_core::ColorExtractor;
use palette_db::Database;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub extractor: ColorExtractor,
    /// Client for fetching images by URL. Its timeout bounds every fetch.
    pub http: reqwest::Client,
    pub max_image_bytes: usize,
}
