#![cfg(feature = "gltf")]

use base64::Engine;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use texmap::extract::{extract, report_mtl_refs};
use texmap::Config;

fn encode(color: [u8; 4], fmt: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::from(RgbaImage::from_pixel(2, 2, Rgba(color)));
    let img = match fmt {
        ImageFormat::Jpeg => DynamicImage::from(img.to_rgb8()),
        _ => img,
    };
    let mut out = Cursor::new(vec![]);
    img.write_to(&mut out, fmt).unwrap();
    out.into_inner()
}

fn pad(mut v: Vec<u8>, with: u8) -> Vec<u8> {
    while v.len() % 4 != 0 {
        v.push(with);
    }
    v
}

/// A GLB with one material and the given images packed into its binary chunk.
fn write_glb(p: &Path, images: &[(&str, &str, Vec<u8>)]) {
    let mut bin = vec![];
    let mut views = vec![];
    let mut imgs = vec![];
    for (i, (name, mime, bytes)) in images.iter().enumerate() {
        views.push(format!(
            r#"{{"buffer":0,"byteOffset":{},"byteLength":{}}}"#,
            bin.len(),
            bytes.len()
        ));
        imgs.push(format!(
            r#"{{"name":"{name}","bufferView":{i},"mimeType":"{mime}"}}"#
        ));
        bin.extend_from_slice(bytes);
        bin = pad(bin, 0);
    }
    let json = format!(
        r#"{{"asset":{{"version":"2.0"}},"materials":[{{"name":"Material_0.1000"}}],"buffers":[{{"byteLength":{}}}],"bufferViews":[{}],"images":[{}]}}"#,
        bin.len(),
        views.join(","),
        imgs.join(",")
    );
    let json = pad(json.into_bytes(), b' ');

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = vec![];
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    fs::write(p, glb).unwrap();
}

#[test]
fn test_extract_glb() {
    let tmp = tempfile::tempdir().unwrap();
    let scene = tmp.path().join("ValeroRefinery.glb");
    let png = encode([255, 0, 0, 255], ImageFormat::Png);
    let jpg = encode([0, 0, 255, 255], ImageFormat::Jpeg);
    write_glb(
        &scene,
        &[
            ("Image_0.1000", "image/png", png.clone()),
            ("Image_0.1001", "image/jpeg", jpg),
        ],
    );

    let out = tmp.path().join("extracted_textures");
    let report = extract(&scene, &out, &Config::default()).unwrap();
    assert_eq!(report.materials, ["Material_0.1000"]);
    assert_eq!(report.saved.len(), 2);
    assert!(report.failed.is_empty());

    // png payloads are written untouched
    assert_eq!(fs::read(out.join("Image_0.1000.png")).unwrap(), png);
    // anything else is converted
    let converted = image::open(out.join("Image_0.1001.png")).unwrap();
    assert_eq!(converted.width(), 2);
    assert_eq!(
        image::guess_format(&fs::read(out.join("Image_0.1001.png")).unwrap()).unwrap(),
        ImageFormat::Png
    );

    // second run leaves existing files alone
    let again = extract(&scene, &out, &Config::default()).unwrap();
    assert!(again.saved.is_empty());
    assert_eq!(again.existing.len(), 2);
}

#[test]
fn test_extract_gltf_data_uri_and_external() {
    let tmp = tempfile::tempdir().unwrap();
    let png = encode([0, 255, 0, 255], ImageFormat::Png);
    let b64 = base64::engine::general_purpose::STANDARD.encode(&png);
    let json = format!(
        r#"{{"asset":{{"version":"2.0"}},"images":[{{"uri":"data:image/png;base64,{b64}"}},{{"uri":"textures/wall.png"}}]}}"#
    );
    let scene = tmp.path().join("scene.gltf");
    fs::write(&scene, json).unwrap();

    let out = tmp.path().join("out");
    let report = extract(&scene, &out, &Config::default()).unwrap();
    assert_eq!(report.saved, [out.join("texture_0.png")]);
    assert_eq!(report.external, ["textures/wall.png"]);
    assert_eq!(fs::read(out.join("texture_0.png")).unwrap(), png);
}

#[test]
fn test_unknown_scene() {
    let tmp = tempfile::tempdir().unwrap();
    let r = extract(tmp.path().join("model.obj"), tmp.path(), &Config::default());
    assert!(matches!(r, Err(texmap::Error::UnknownScene(_))));
}

#[test]
fn test_report_mtl_refs() {
    let tmp = tempfile::tempdir().unwrap();
    let mtl = tmp.path().join("ValeroWA02C.mtl");
    assert_eq!(report_mtl_refs(&mtl).unwrap(), None);

    fs::write(&mtl, "newmtl A\nmap_Kd a.png  \nillum 2\nmap_Bump b.png\n").unwrap();
    assert_eq!(
        report_mtl_refs(&mtl).unwrap().unwrap(),
        ["map_Kd a.png", "map_Bump b.png"]
    );
}

#[test]
fn test_bad_image_is_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let scene = tmp.path().join("scene.glb");
    let png = encode([255, 255, 0, 255], ImageFormat::Png);
    write_glb(
        &scene,
        &[
            ("Image_bad", "image/jpeg", b"not a jpeg at all".to_vec()),
            ("Image_good", "image/png", png),
        ],
    );

    let out = tmp.path().join("out");
    let report = extract(&scene, &out, &Config::default()).unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "Image_bad.png");
    assert_eq!(report.saved, [out.join("Image_good.png")]);
    assert!(!out.join("Image_bad.png").exists());
}

#[test]
fn test_overflowing_view_is_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let json = r#"{"asset":{"version":"2.0"},"buffers":[{"byteLength":4,"uri":"data:application/octet-stream;base64,AAAAAA=="}],"bufferViews":[{"buffer":0,"byteOffset":18446744073709551615,"byteLength":4}],"images":[{"bufferView":0,"mimeType":"image/png"}]}"#;
    let scene = tmp.path().join("scene.gltf");
    fs::write(&scene, json).unwrap();

    let report = extract(&scene, tmp.path().join("out"), &Config::default()).unwrap();
    assert!(report.saved.is_empty());
    assert_eq!(report.failed.len(), 1);
}

#[test]
fn test_scene_without_images() {
    let tmp = tempfile::tempdir().unwrap();
    let scene = tmp.path().join("empty.gltf");
    fs::write(
        &scene,
        r#"{"asset":{"version":"2.0"},"materials":[{"name":"Material_0.1000"}]}"#,
    )
    .unwrap();

    let report = extract(&scene, tmp.path().join("out"), &Config::default()).unwrap();
    assert_eq!(report.materials, ["Material_0.1000"]);
    assert!(report.saved.is_empty());
    assert!(report.failed.is_empty());
    assert!(report.external.is_empty());
}
