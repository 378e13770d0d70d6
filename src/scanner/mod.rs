//! 診断対象画像の収集とアップロード前処理

use crate::error::{FarmaidError, Result};
use farmaid_common::image::is_image_mime;
use farmaid_common::ImageSource;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];

fn is_image_extension(ext: &str) -> bool {
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| is_image_extension(&ext.to_string_lossy()))
        .unwrap_or(false)
}

/// フォルダ直下の画像をファイル名順に列挙
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(FarmaidError::FileNotFound(folder.display().to_string()));
    }

    let mut images: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && has_image_extension(p))
        .collect();

    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// ファイルならそのまま、フォルダなら直下の画像一覧
pub fn collect_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.exists() {
        return Err(FarmaidError::FileNotFound(path.display().to_string()));
    }

    let images = scan_folder(path)?;
    if images.is_empty() {
        return Err(FarmaidError::NoImagesFound(path.display().to_string()));
    }
    Ok(images)
}

/// 画像を読み込み、アップロード用の ImageSource を作る
///
/// 長辺が `max_size` を超える場合は縮小して JPEG に再エンコードする。
/// `max_size` が 0 なら縮小しない。画像として解釈できないファイルはエラー。
pub fn prepare_upload(path: &Path, max_size: u32) -> Result<ImageSource> {
    if !path.is_file() {
        return Err(FarmaidError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());

    let reader = ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(|e| FarmaidError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    let format = reader
        .format()
        .ok_or_else(|| FarmaidError::ImageLoad(format!("{}: 画像形式を判別できません", path.display())))?;

    let mime_type = format.to_mime_type().to_string();
    if !is_image_mime(&mime_type) {
        return Err(FarmaidError::ImageLoad(format!("{}: 非対応の形式です", path.display())));
    }

    let image = reader
        .decode()
        .map_err(|e| FarmaidError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    if max_size == 0 || (image.width() <= max_size && image.height() <= max_size) {
        return Ok(ImageSource::File {
            file_name,
            mime_type,
            bytes,
        });
    }

    let resized = downscale(&image, max_size, path)?;
    debug!(
        file = %file_name,
        width = image.width(),
        height = image.height(),
        bytes = resized.len(),
        "downscaled before upload"
    );

    Ok(ImageSource::File {
        file_name: jpeg_file_name(&file_name),
        mime_type: ImageFormat::Jpeg.to_mime_type().to_string(),
        bytes: resized,
    })
}

fn downscale(image: &DynamicImage, max_size: u32, path: &Path) -> Result<Vec<u8>> {
    // JPEG はアルファを持てないので RGB に落とす
    let rgb = DynamicImage::ImageRgb8(image.thumbnail(max_size, max_size).to_rgb8());
    let mut buffer = Cursor::new(Vec::new());
    rgb.write_to(&mut buffer, ImageFormat::Jpeg)
        .map_err(|e| FarmaidError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    Ok(buffer.into_inner())
}

fn jpeg_file_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    format!("{}.jpg", stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbaImage::from_pixel(width, height, image::Rgba([30, 160, 60, 255]))
            .save(path)
            .expect("PNG保存失敗");
    }

    #[test]
    fn test_is_image_extension() {
        assert!(is_image_extension("jpg"));
        assert!(is_image_extension("JPG"));
        assert!(is_image_extension("webp"));
        assert!(!is_image_extension("txt"));
        assert!(!is_image_extension("pdf"));
    }

    #[test]
    fn test_scan_folder_sorted_and_filtered() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("c.jpg"), b"x").expect("書き込み失敗");
        fs::write(dir.path().join("a.PNG"), b"x").expect("書き込み失敗");
        fs::write(dir.path().join("notes.txt"), b"x").expect("書き込み失敗");
        fs::create_dir(dir.path().join("sub")).expect("作成失敗");
        fs::write(dir.path().join("sub").join("b.jpg"), b"x").expect("書き込み失敗");

        let images = scan_folder(dir.path()).expect("スキャン失敗");
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap_or_default().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PNG", "c.jpg"]);
    }

    #[test]
    fn test_collect_inputs() {
        let dir = tempdir().expect("Failed to create temp dir");
        assert!(matches!(
            collect_inputs(dir.path()),
            Err(FarmaidError::NoImagesFound(_))
        ));
        assert!(matches!(
            collect_inputs(&dir.path().join("missing.jpg")),
            Err(FarmaidError::FileNotFound(_))
        ));

        let file = dir.path().join("leaf.jpg");
        fs::write(&file, b"x").expect("書き込み失敗");
        assert_eq!(collect_inputs(&file).expect("収集失敗"), vec![file]);
    }

    #[test]
    fn test_prepare_upload_keeps_small_image() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("leaf.png");
        write_png(&path, 8, 6);

        let source = prepare_upload(&path, 1568).expect("前処理失敗");
        match source {
            ImageSource::File { file_name, mime_type, bytes } => {
                assert_eq!(file_name, "leaf.png");
                assert_eq!(mime_type, "image/png");
                assert_eq!(bytes, fs::read(&path).expect("読込失敗"));
            }
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[test]
    fn test_prepare_upload_downscales_to_jpeg() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("field.png");
        write_png(&path, 40, 20);

        let source = prepare_upload(&path, 10).expect("前処理失敗");
        match source {
            ImageSource::File { file_name, mime_type, bytes } => {
                assert_eq!(file_name, "field.jpg");
                assert_eq!(mime_type, "image/jpeg");
                let decoded = image::load_from_memory(&bytes).expect("デコード失敗");
                assert_eq!((decoded.width(), decoded.height()), (10, 5));
            }
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[test]
    fn test_prepare_upload_rejects_non_image() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("fake.jpg");
        fs::write(&path, b"this is not an image").expect("書き込み失敗");

        assert!(matches!(
            prepare_upload(&path, 1568),
            Err(FarmaidError::ImageLoad(_))
        ));
    }
}
