use super::ExtractReport;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Run inside Blender, walks image texture nodes and saves packed images.
/// Reports one `texmap:<kind>\t<value>` line per event on stdout.
const SCRIPT: &str = include_str!("blender_extract.py");

const TAG: &str = "texmap:";

/// Command running the extraction script on `scene` in background mode.
pub fn command(blender: &Path, scene: &Path, out_dir: &Path) -> Command {
    let mut cmd = Command::new(blender);
    cmd.arg("--background")
        .arg(scene)
        .arg("--python-exit-code")
        .arg("1")
        .arg("--python-expr")
        .arg(SCRIPT)
        .arg("--")
        .arg(out_dir);
    cmd
}

/// Collects the events the script printed, ignoring Blender's own output.
pub fn parse_report(stdout: &str) -> ExtractReport {
    let mut report = ExtractReport::default();
    for l in stdout.lines() {
        let Some(event) = l.strip_prefix(TAG) else {
            continue;
        };
        let Some((kind, value)) = event.split_once('\t') else {
            log::warn!("Malformed line from blender: {l}");
            continue;
        };
        match kind {
            "material" => {
                log::info!("Processing material: {value}");
                report.materials.push(value.to_string());
            }
            "saved" => {
                log::info!("  Saved texture: {value}");
                report.saved.push(PathBuf::from(value));
            }
            "existing" => report.existing.push(PathBuf::from(value)),
            "external" => {
                log::info!("  Image {value} is not packed, skipping");
                report.external.push(value.to_string());
            }
            "failed" => {
                let (name, why) = value.split_once('\t').unwrap_or((value, ""));
                log::warn!("  Failed to save {name}: {why}");
                report.failed.push((name.to_string(), why.to_string()));
            }
            k => log::warn!("Unknown event from blender {k:?}"),
        }
    }
    report
}

/// Extracts packed textures of a `.blend` file by running `blender` on it.
pub fn extract(blender: &Path, scene: &Path, out_dir: &Path) -> Result<ExtractReport> {
    let output = command(blender, scene, out_dir)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .map_err(|e| Error::Spawn(blender.into(), e))?;
    if !output.status.success() {
        return Err(Error::Blender(output.status));
    }
    Ok(parse_report(&String::from_utf8_lossy(&output.stdout)))
}

#[test]
fn test_parse_report() {
    let stdout = "\
Blender 4.1.0 (hash abc built 2024-03-25)
Read blend: \"/tmp/ValeroWA02C.blend\"
texmap:material\tMaterial_0.1000
texmap:saved\t/tmp/out/Image_0.1000.png
texmap:material\tMaterial_0.1001
texmap:external\tImage_0.1001
texmap:existing\t/tmp/out/Image_0.1002.png
texmap:failed\tImage_bad.png\tno pixels
texmap:garbage
Blender quit
";
    let r = parse_report(stdout);
    assert_eq!(r.materials, ["Material_0.1000", "Material_0.1001"]);
    assert_eq!(r.saved, [PathBuf::from("/tmp/out/Image_0.1000.png")]);
    assert_eq!(r.existing, [PathBuf::from("/tmp/out/Image_0.1002.png")]);
    assert_eq!(r.external, ["Image_0.1001"]);
    assert_eq!(
        r.failed,
        [(String::from("Image_bad.png"), String::from("no pixels"))]
    );
}

#[test]
fn test_command_args() {
    let cmd = command(
        Path::new("/opt/blender/blender"),
        Path::new("scene.blend"),
        Path::new("extracted_textures"),
    );
    assert_eq!(cmd.get_program(), "/opt/blender/blender");
    let args: Vec<_> = cmd.get_args().collect();
    assert_eq!(args.len(), 8);
    assert_eq!(args[0], "--background");
    assert_eq!(args[1], "scene.blend");
    // a raising script must not look like a successful run
    assert_eq!(args[2], "--python-exit-code");
    assert_eq!(args[3], "1");
    assert_eq!(args[4], "--python-expr");
    assert!(args[5].to_string_lossy().contains("bpy.data.materials"));
    assert_eq!(args[6], "--");
    assert_eq!(args[7], "extracted_textures");
}

#[cfg(unix)]
#[test]
fn test_failing_blender_is_an_error() {
    let tmp = std::env::temp_dir();
    let r = extract(Path::new("false"), Path::new("scene.blend"), &tmp);
    assert!(matches!(r, Err(Error::Blender(status)) if !status.success()));

    let r = extract(Path::new("/nonexistent/blender"), Path::new("scene.blend"), &tmp);
    assert!(matches!(r, Err(Error::Spawn(..))));
}
