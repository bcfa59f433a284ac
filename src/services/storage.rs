// src/services/storage.rs

use std::io::Cursor;
use std::path::PathBuf;

use async_trait::async_trait;
use image::ImageFormat;
use serde::Deserialize;
use tokio::fs;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// O armazenamento de imagens visto pelo resto da aplicação: sobe bytes e
// resolve uma referência para uma URL exibível. A implementação local grava
// em disco; o contrato permite trocar por um bucket sem tocar os serviços.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError>;
    async fn resolve(&self, reference: &str) -> Result<String, AppError>;
    async fn read(&self, reference: &str) -> Result<(Vec<u8>, &'static str), AppError>;
}

pub struct LocalImageStore {
    media_dir: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    pub fn new(media_dir: PathBuf, public_base_url: String) -> Self {
        Self {
            media_dir,
            public_base_url,
        }
    }

    // Referências são nomes de arquivo gerados por nós; qualquer coisa com
    // separador de caminho é rejeitada.
    fn path_for(&self, reference: &str) -> Result<PathBuf, AppError> {
        if reference.is_empty()
            || reference.contains('/')
            || reference.contains('\\')
            || reference.contains("..")
        {
            return Err(AppError::PhotoNotFound);
        }
        Ok(self.media_dir.join(reference))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError> {
        let extension = extension_for(content_type).ok_or(AppError::UnsupportedImage)?;
        let reference = format!("{}.{}", Uuid::new_v4(), extension);

        fs::create_dir_all(&self.media_dir)
            .await
            .map_err(|e| AppError::InternalServerError(e.into()))?;
        let path = self.media_dir.join(&reference);
        fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::InternalServerError(e.into()))?;

        tracing::info!("📷 Imagem gravada em {}", path.display());
        Ok(reference)
    }

    async fn resolve(&self, reference: &str) -> Result<String, AppError> {
        // URLs completas gravadas por versões antigas passam direto
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(reference.to_string());
        }
        let path = self.path_for(reference)?;
        match fs::try_exists(&path).await {
            Ok(true) => Ok(format!("{}/api/photos/{}", self.public_base_url, reference)),
            _ => Err(AppError::PhotoNotFound),
        }
    }

    async fn read(&self, reference: &str) -> Result<(Vec<u8>, &'static str), AppError> {
        let path = self.path_for(reference)?;
        let bytes = fs::read(&path).await.map_err(|_| AppError::PhotoNotFound)?;
        Ok((bytes, content_type_for(reference)))
    }
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

fn content_type_for(reference: &str) -> &'static str {
    match reference.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

// Retângulo de recorte vindo do diálogo de foto, em pixels da imagem.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

// Valida o formato e aplica o recorte opcional antes da gravação. PNG e
// WEBP recortados saem como PNG; JPEG continua JPEG.
pub fn process_image(
    bytes: &[u8],
    crop: Option<CropRect>,
) -> Result<(Vec<u8>, &'static str), AppError> {
    let format = image::guess_format(bytes).map_err(|_| AppError::UnsupportedImage)?;
    let content_type = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::WebP => "image/webp",
        _ => return Err(AppError::UnsupportedImage),
    };

    let Some(crop) = crop else {
        return Ok((bytes.to_vec(), content_type));
    };

    let img = image::load_from_memory(bytes).map_err(|_| AppError::UnsupportedImage)?;
    let in_bounds = crop.width > 0
        && crop.height > 0
        && crop.x.checked_add(crop.width).is_some_and(|x| x <= img.width())
        && crop.y.checked_add(crop.height).is_some_and(|y| y <= img.height());
    if !in_bounds {
        return Err(AppError::InvalidCrop);
    }

    let cropped = img.crop_imm(crop.x, crop.y, crop.width, crop.height);
    let (output_format, output_type) = match format {
        ImageFormat::Jpeg => (ImageFormat::Jpeg, "image/jpeg"),
        _ => (ImageFormat::Png, "image/png"),
    };

    let mut out = Cursor::new(Vec::new());
    cropped
        .write_to(&mut out, output_format)
        .map_err(|e| AppError::InternalServerError(e.into()))?;
    Ok((out.into_inner(), output_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_recorte_dentro_dos_limites() {
        let bytes = png_bytes(8, 8);
        let crop = CropRect { x: 2, y: 2, width: 4, height: 4 };
        let (out, content_type) = process_image(&bytes, Some(crop)).unwrap();
        assert_eq!(content_type, "image/png");
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));
    }

    #[test]
    fn test_recorte_fora_dos_limites() {
        let bytes = png_bytes(8, 8);
        let crop = CropRect { x: 6, y: 6, width: 4, height: 4 };
        assert!(matches!(
            process_image(&bytes, Some(crop)),
            Err(AppError::InvalidCrop)
        ));
    }

    #[test]
    fn test_recorte_vazio_rejeitado() {
        let bytes = png_bytes(8, 8);
        let crop = CropRect { x: 0, y: 0, width: 0, height: 4 };
        assert!(matches!(
            process_image(&bytes, Some(crop)),
            Err(AppError::InvalidCrop)
        ));
    }

    #[test]
    fn test_bytes_invalidos() {
        assert!(matches!(
            process_image(b"isso nao e uma imagem", None),
            Err(AppError::UnsupportedImage)
        ));
    }

    #[test]
    fn test_sem_recorte_preserva_bytes() {
        let bytes = png_bytes(4, 4);
        let (out, content_type) = process_image(&bytes, None).unwrap();
        assert_eq!(out, bytes);
        assert_eq!(content_type, "image/png");
    }
}
