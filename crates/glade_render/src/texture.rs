use std::path::Path;

use image::RgbaImage;

/// Decode an image file into straight-alpha RGBA8.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, String> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| format!("Failed to open image {}: {e}", path.display()))?;
    let decoded = reader
        .decode()
        .map_err(|e| format!("Failed to decode image {}: {e}", path.display()))?;
    Ok(decoded.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "glade_texture_test_{}_{}_{}.png",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn load_rgba_round_trips_png() {
        let path = temp_file_path("png");
        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(2, 1, image::Rgba([10, 20, 30, 255]));
        image.save(&path).expect("write png");

        let loaded = load_rgba(&path).expect("png should load");
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.get_pixel(2, 1).0, [10, 20, 30, 255]);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_rgba_reports_missing_file() {
        let err = load_rgba(Path::new("definitely/not/here.png")).expect_err("should fail");
        assert!(err.contains("Failed to open image"));
    }
}
