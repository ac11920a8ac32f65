use super::{texture_file_name, ExtractReport};
use crate::error::{Error, PathContext, Result};
use base64::Engine;
use gltf::image::Source;
use std::path::Path;

const PNG_MIME: &str = "image/png";

/// Bytes of one image and its mime type, if it is embedded in the file.
enum Payload {
    Embedded(Vec<u8>, Option<String>),
    External(String),
}

/// Splits a `data:` URI into its mime type and decoded bytes.
fn decode_data_uri(uri: &str) -> Option<(Option<String>, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, data) = rest.split_once(',')?;
    let mut parts = header.split(';');
    let mime = parts.next().filter(|m| !m.is_empty()).map(String::from);
    if !parts.any(|p| p == "base64") {
        return None;
    }
    let bytes = base64::engine::general_purpose::STANDARD.decode(data).ok()?;
    Some((mime, bytes))
}

fn payload(image: &gltf::Image, buffers: &[gltf::buffer::Data]) -> std::result::Result<Payload, String> {
    match image.source() {
        Source::View { view, mime_type } => {
            let Some(buf) = buffers.get(view.buffer().index()) else {
                return Err(format!("missing buffer {}", view.buffer().index()));
            };
            let start = view.offset();
            let bytes = start
                .checked_add(view.length())
                .and_then(|end| buf.get(start..end));
            let Some(bytes) = bytes else {
                return Err(format!("buffer view {} is out of bounds", view.index()));
            };
            Ok(Payload::Embedded(bytes.to_vec(), Some(mime_type.to_string())))
        }
        Source::Uri { uri, mime_type } if uri.starts_with("data:") => {
            let Some((uri_mime, bytes)) = decode_data_uri(uri) else {
                return Err(String::from("malformed data URI"));
            };
            Ok(Payload::Embedded(bytes, uri_mime.or(mime_type.map(String::from))))
        }
        Source::Uri { uri, .. } => Ok(Payload::External(uri.to_string())),
    }
}

/// Writes `bytes` as a PNG, re-encoding anything that is not already one.
fn write_png(bytes: &[u8], mime: Option<&str>, dst: &Path) -> Result<()> {
    if mime == Some(PNG_MIME) {
        std::fs::write(dst, bytes).at(dst)?;
        return Ok(());
    }
    let img = image::load_from_memory(bytes)?;
    img.save_with_format(dst, image::ImageFormat::Png)?;
    Ok(())
}

/// Extracts every embedded image of a GLB/glTF file into `out_dir`.
pub fn extract(scene: &Path, out_dir: &Path) -> Result<ExtractReport> {
    let gltf::Gltf { document, blob } = gltf::Gltf::open(scene)?;
    let buffers = gltf::import_buffers(&document, scene.parent(), blob)?;

    let materials = document
        .materials()
        .enumerate()
        .map(|(i, m)| m.name().map(String::from).unwrap_or_else(|| format!("mat_{i}")))
        .collect();
    let mut report = ExtractReport {
        materials,
        ..Default::default()
    };
    for m in &report.materials {
        log::debug!("Material: {m}");
    }

    let num_images = document.images().len();
    if num_images == 0 {
        log::info!("No images found in {}", scene.display());
        return Ok(report);
    }
    log::info!("Found {num_images} images in {}", scene.display());

    for image in document.images() {
        let i = image.index();
        let file_name = texture_file_name(image.name(), i);
        let dst = out_dir.join(&file_name);

        let (bytes, mime) = match payload(&image, &buffers) {
            Ok(Payload::Embedded(bytes, mime)) => (bytes, mime),
            Ok(Payload::External(uri)) => {
                log::info!("Image {i} references external file: {uri}");
                report.external.push(uri);
                continue;
            }
            Err(e) => {
                log::warn!("Error extracting image {i}: {e}");
                report.failed.push((file_name, e));
                continue;
            }
        };
        if std::fs::exists(&dst).at(&dst)? {
            log::debug!("{file_name} already exists, skipping");
            report.existing.push(dst);
            continue;
        }
        match write_png(&bytes, mime.as_deref(), &dst) {
            Ok(()) => {
                log::info!("Extracted {file_name}");
                report.saved.push(dst);
            }
            Err(e @ (Error::Image(_) | Error::File(..))) => {
                log::warn!("Error extracting image {i}: {e}");
                report.failed.push((file_name, e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(report)
}

#[test]
fn test_decode_data_uri() {
    let (mime, bytes) = decode_data_uri("data:image/png;base64,AAEC").unwrap();
    assert_eq!(mime.as_deref(), Some("image/png"));
    assert_eq!(bytes, [0, 1, 2]);

    let (mime, _) = decode_data_uri("data:;base64,AAEC").unwrap();
    assert_eq!(mime, None);

    assert!(decode_data_uri("data:image/png,raw").is_none());
    assert!(decode_data_uri("textures/a.png").is_none());
}
