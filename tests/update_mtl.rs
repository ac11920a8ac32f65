use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use texmap::relocate::{relocate, stage_renamed};
use texmap::{update_mtl, Config, Naming, TextureMap};

const MTL: &str = "\
# Blender 3.6.0 MTL File: 'ValeroRefinery.blend'
# www.blender.org

newmtl Material_0.1000
Ns 250.000000
Ka 1.000000 1.000000 1.000000
Kd 0.800000 0.800000 0.800000
Ks 0.500000 0.500000 0.500000
Ke 0.000000 0.000000 0.000000
Ni 1.450000
d 1.000000
illum 2

newmtl Material_0.1001
Ns 250.000000
Kd 0.800000 0.800000 0.800000
d 1.000000
illum 2

newmtl Pipe_Steel
Kd 0.300000 0.300000 0.300000
illum 1

newmtl Material_0.1002
Kd 0.1 0.1 0.1
";

fn setup(dir: &Path) -> Config {
    fs::write(dir.join("ValeroRefinery.mtl"), MTL).unwrap();
    let tex = dir.join("extracted_textures");
    fs::create_dir(&tex).unwrap();
    fs::write(tex.join("Image_0.1000.png"), b"tex 1000").unwrap();
    fs::write(tex.join("Image_0.1002.png"), b"tex 1002").unwrap();
    fs::write(tex.join("Image_0.1001.jpg"), b"wrong ext").unwrap();
    Config {
        model: String::from("ValeroRefinery"),
        work_dir: dir.to_path_buf(),
        ..Config::default()
    }
}

fn dir_contents(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            let name = e.file_name().into_string().unwrap();
            (name, fs::read(e.path()).unwrap())
        })
        .collect()
}

#[test]
fn test_update_mtl_workflow() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = setup(tmp.path());

    let summary = update_mtl(&cfg).unwrap();
    assert_eq!(summary.materials, 4);
    assert_eq!(summary.textures, 2);
    assert_eq!(summary.mapping.len(), 2);
    assert_eq!(summary.mapping["Material_0.1000"], "Image_0.1000.png");
    assert_eq!(summary.mapping["Material_0.1002"], "Image_0.1002.png");
    // Material_0.1002 has no `illum` line, so only one reference is added.
    assert_eq!(summary.inserted, 1);

    let renamed = dir_contents(&tmp.path().join("renamed_textures"));
    assert_eq!(renamed.len(), 2);
    assert_eq!(renamed["Material_0.1000.png"], b"tex 1000");
    assert_eq!(renamed["Material_0.1002.png"], b"tex 1002");

    assert_eq!(
        summary.updated_mtl,
        tmp.path().join("ValeroRefinery_updated.mtl")
    );
    let updated = fs::read_to_string(&summary.updated_mtl).unwrap();
    let expected = MTL.replacen(
        "d 1.000000\nillum 2\n\nnewmtl Material_0.1001",
        "d 1.000000\nillum 2\nmap_Kd Material_0.1000.png\n\nnewmtl Material_0.1001",
        1,
    );
    assert_ne!(expected, MTL);
    assert_eq!(updated, expected);

    // the original is left alone
    assert_eq!(
        fs::read_to_string(tmp.path().join("ValeroRefinery.mtl")).unwrap(),
        MTL
    );
}

#[test]
fn test_update_mtl_is_rerunnable() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = setup(tmp.path());

    update_mtl(&cfg).unwrap();
    let first_dir = dir_contents(&tmp.path().join("renamed_textures"));
    let first_mtl = fs::read(cfg.updated_mtl_path()).unwrap();

    fs::write(tmp.path().join("renamed_textures/stale.png"), b"old").unwrap();
    update_mtl(&cfg).unwrap();
    assert_eq!(dir_contents(&tmp.path().join("renamed_textures")), first_dir);
    assert_eq!(fs::read(cfg.updated_mtl_path()).unwrap(), first_mtl);
}

#[test]
fn test_missing_texture_dir_maps_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = setup(tmp.path());
    fs::remove_dir_all(tmp.path().join("extracted_textures")).unwrap();

    let summary = update_mtl(&cfg).unwrap();
    assert!(summary.mapping.is_empty());
    assert_eq!(summary.inserted, 0);
    assert_eq!(fs::read_to_string(cfg.updated_mtl_path()).unwrap(), MTL);
    assert!(tmp.path().join("renamed_textures").is_dir());
}

#[test]
fn test_missing_mtl_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = Config {
        model: String::from("absent"),
        work_dir: tmp.path().to_path_buf(),
        ..Config::default()
    };
    assert!(matches!(update_mtl(&cfg), Err(texmap::Error::File(..))));
}

#[test]
fn test_stage_skips_missing_source() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("Image_1.png"), b"1").unwrap();

    let mut mapping = TextureMap::new();
    mapping.insert(String::from("Material_1"), String::from("Image_1.png"));
    mapping.insert(String::from("Material_2"), String::from("Image_2.png"));

    let naming = Naming::default();
    let once = stage_renamed(&mapping, &src, &dst, &naming).unwrap();
    assert_eq!(once, [dst.join("Material_1.png")]);
    let twice = stage_renamed(&mapping, &src, &dst, &naming).unwrap();
    assert_eq!(once, twice);
    assert_eq!(dir_contents(&dst).len(), 1);
}

#[test]
fn test_relocate() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("renamed_textures");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("Material_1.png"), b"new").unwrap();
    fs::write(src.join("notes.txt"), b"skip").unwrap();
    fs::write(tmp.path().join("Material_1.png"), b"old").unwrap();

    let naming = Naming::default();
    let copied = relocate(&src, tmp.path(), &naming).unwrap();
    assert_eq!(copied, [tmp.path().join("Material_1.png")]);
    assert_eq!(fs::read(tmp.path().join("Material_1.png")).unwrap(), b"new");
    assert!(!tmp.path().join("notes.txt").exists());

    let none = relocate(tmp.path().join("absent"), tmp.path(), &naming).unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_relocate_onto_itself_keeps_textures() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("renamed_textures");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("Material_1.png"), b"texture bytes").unwrap();

    let naming = Naming::default();
    let r = relocate(&dir, &dir, &naming);
    assert!(matches!(r, Err(texmap::Error::SameDirectory(_))));
    // the same directory through a different spelling
    let r = relocate(&dir, tmp.path().join("renamed_textures/."), &naming);
    assert!(matches!(r, Err(texmap::Error::SameDirectory(_))));
    assert_eq!(fs::read(dir.join("Material_1.png")).unwrap(), b"texture bytes");
}

#[test]
fn test_stage_onto_source_keeps_textures() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("extracted_textures");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("Image_1.png"), b"1").unwrap();

    let mut mapping = TextureMap::new();
    mapping.insert(String::from("Material_1"), String::from("Image_1.png"));
    let r = stage_renamed(&mapping, &dir, &dir, &Naming::default());
    assert!(matches!(r, Err(texmap::Error::SameDirectory(_))));
    assert_eq!(fs::read(dir.join("Image_1.png")).unwrap(), b"1");
}

#[test]
fn test_copy_error_names_both_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("src");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("Material_1.png"), b"1").unwrap();
    // a directory where the copy should land
    let dst = tmp.path().join("dst");
    fs::create_dir_all(dst.join("Material_1.png")).unwrap();

    match relocate(&src, &dst, &Naming::default()) {
        Err(texmap::Error::Copy(from, to, _)) => {
            assert_eq!(from, src.join("Material_1.png"));
            assert_eq!(to, dst.join("Material_1.png"));
        }
        other => panic!("expected a copy error, got {other:?}"),
    }
}
