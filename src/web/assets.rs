//! Embedded stylesheet and script

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct SiteAssets;

/// GET /assets/{*path}
pub async fn serve_asset(Path(path): Path<String>) -> Response {
    let decoded = urlencoding::decode(&path).map(|p| p.into_owned()).unwrap_or(path);

    match SiteAssets::get(decoded.trim_start_matches('/')) {
        Some(content) => (
            [
                (header::CONTENT_TYPE, get_content_type(&decoded)),
                (header::CACHE_CONTROL, "public, max-age=3600"),
            ],
            content.data.into_owned(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Get content type from file extension
fn get_content_type(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or("") {
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(get_content_type("site.css"), "text/css; charset=utf-8");
        assert_eq!(get_content_type("site.js"), "application/javascript; charset=utf-8");
        assert_eq!(get_content_type("photo.JPG.webp"), "image/webp");
        assert_eq!(get_content_type("README"), "application/octet-stream");
    }

    #[test]
    fn test_assets_are_embedded() {
        assert!(SiteAssets::get("site.css").is_some());
        assert!(SiteAssets::get("site.js").is_some());
        assert!(SiteAssets::get("missing.css").is_none());
    }
}
