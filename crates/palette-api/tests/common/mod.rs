//! Helpers shared by the integration test binaries.
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{Days, Local, NaiveDate};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use palette_api::state::{AppState, AppStateInner};
use palette_core::ColorExtractor;
use palette_db::Database;
use palette_types::api::Claims;

pub const SECRET: &str = "test-secret";

pub fn setup() -> (Router, AppState) {
    setup_with_limit(1024 * 1024)
}

pub fn setup_with_limit(max_image_bytes: usize) -> (Router, AppState) {
    let state: AppState = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        jwt_secret: SECRET.to_string(),
        extractor: ColorExtractor::default(),
        http: reqwest::Client::builder().no_proxy().build().unwrap(),
        max_image_bytes,
    });
    (palette_api::router(state.clone()), state)
}

pub fn token(user_id: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: 4_102_444_800, // 2100-01-01
        username: Some(user_id.to_string()),
        email: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(user)));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn days_ago(n: u64) -> String {
    (today() - Days::new(n)).format("%Y-%m-%d").to_string()
}

pub fn attempt(date: &str, won: bool, attempts: u8) -> Value {
    let guessed = won.then_some(25);
    json!({
        "date": date,
        "targetPokemonId": 25,
        "guesses": [1, 4, 25],
        "attempts": attempts,
        "won": won,
        "pokemonGuessed": guessed,
        "hintsUsed": 1,
    })
}

pub fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}
