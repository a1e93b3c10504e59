use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use partview::loader::{
    AssetFormat, AssetLoad, AssetSource, CancelToken, FsSource, LoadError, LoadPoll, Progress,
    load_scene,
};
use partview::model::PartId;
use serde_json::json;

const TRIANGLE_JSON: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [ { "nodes": [0] } ],
    "nodes": [
        { "name": "Root", "children": [1] },
        { "name": "Blade", "mesh": 0, "translation": [0, 2, 0], "extras": { "serial": "B-17" } }
    ],
    "meshes": [ { "name": "blade-mesh", "primitives": [ { "attributes": { "POSITION": 0 } } ] } ],
    "accessors": [ {
        "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
        "min": [0, 0, 0], "max": [1, 1, 0]
    } ],
    "bufferViews": [ { "buffer": 0, "byteLength": 36 } ],
    "buffers": [ { "byteLength": 36 BUFFER_URI } ]
}"#;

fn triangle_bin() -> Vec<u8> {
    [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        .iter()
        .flat_map(|f| f.to_le_bytes())
        .collect()
}

fn pad(mut bytes: Vec<u8>, fill: u8) -> Vec<u8> {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
    bytes
}

fn triangle_glb() -> Vec<u8> {
    let json = pad(TRIANGLE_JSON.replace("BUFFER_URI", "").into_bytes(), b' ');
    let bin = pad(triangle_bin(), 0);
    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin);
    out
}

/// In-memory files keyed by path.
#[derive(Default)]
struct MemorySource(HashMap<Utf8PathBuf, Vec<u8>>);

impl AssetSource for MemorySource {
    fn open(&mut self, path: &Utf8Path) -> io::Result<(Box<dyn Read + Send>, Option<u64>)> {
        let bytes = self
            .0
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))?;
        let len = bytes.len() as u64;
        Ok((Box::new(Cursor::new(bytes)), Some(len)))
    }
}

/// Hands out one byte per read, slowly.
struct Trickle(usize);

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.0 == 0 || buf.is_empty() {
            return Ok(0);
        }
        std::thread::sleep(Duration::from_millis(1));
        self.0 -= 1;
        buf[0] = b'#';
        Ok(1)
    }
}

struct TrickleSource;

impl AssetSource for TrickleSource {
    fn open(&mut self, _path: &Utf8Path) -> io::Result<(Box<dyn Read + Send>, Option<u64>)> {
        Ok((Box::new(Trickle(100_000)), Some(100_000)))
    }
}

fn wait(load: &mut AssetLoad) -> Result<partview::scene::SceneGraph, LoadError> {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        match load.poll() {
            LoadPoll::Done(result) => return result,
            LoadPoll::Pending(_) => {
                assert!(Instant::now() < deadline, "load did not finish");
                std::thread::sleep(Duration::from_millis(5));
            }
        }
    }
}

#[test]
fn format_from_extension() {
    assert_eq!(AssetFormat::from_path(Utf8Path::new("a/b.GLB")).unwrap(), AssetFormat::Gltf);
    assert_eq!(AssetFormat::from_path(Utf8Path::new("b.gltf")).unwrap(), AssetFormat::Gltf);
    assert_eq!(AssetFormat::from_path(Utf8Path::new("c.obj")).unwrap(), AssetFormat::Obj);
    assert!(matches!(
        AssetFormat::from_path(Utf8Path::new("d.fbx")),
        Err(LoadError::UnsupportedFormat { .. })
    ));
    assert!(AssetFormat::from_path(Utf8Path::new("noext")).is_err());
}

#[test]
fn glb_nodes_become_parts_with_extras() {
    let mut source = MemorySource::default();
    source.0.insert("turbine.glb".into(), triangle_glb());
    let scene = load_scene(&mut source, Utf8Path::new("turbine.glb"), &CancelToken::new(), |_| {}).unwrap();

    assert_eq!(scene.len(), 2);
    let parts = scene.parts();
    assert_eq!(parts.len(), 1);
    let blade = &parts[0];
    assert_eq!(blade.name, "Blade");
    assert!(matches!(blade.id, PartId::Node(_)));
    assert_eq!(blade.metadata.get("serial"), Some(&json!("B-17")));
    assert_eq!(blade.metadata.get("gltf_index"), Some(&json!(1)));
    assert_eq!(blade.metadata.get("mesh"), Some(&json!("blade-mesh")));

    let node = scene.find_part(&blade.id).unwrap();
    let root = scene.node(node).unwrap().parent.unwrap();
    assert_eq!(scene.node(root).unwrap().name, "Root");
    let b = scene.bounds().unwrap();
    assert!((b.min.y - 2.0).abs() < 1e-5 && (b.max.y - 3.0).abs() < 1e-5);
}

#[test]
fn gltf_with_external_buffer_reads_next_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8Path::from_path(dir.path()).unwrap();
    std::fs::write(root.join("tri.bin"), triangle_bin()).unwrap();
    std::fs::write(
        root.join("tri.gltf"),
        TRIANGLE_JSON.replace("BUFFER_URI", r#", "uri": "tri.bin""#),
    )
    .unwrap();

    let scene = load_scene(&mut FsSource, &root.join("tri.gltf"), &CancelToken::new(), |_| {})
        .unwrap();
    assert_eq!(scene.parts()[0].name, "Blade");
}

#[test]
fn obj_objects_become_parts() {
    let text = "\
o Base
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
o Arm
v 0 0 1
v 1 0 1
v 0 1 1
f 5 6 7
";
    let mut source = MemorySource::default();
    source.0.insert("robot.obj".into(), text.as_bytes().to_vec());
    let scene = load_scene(&mut source, Utf8Path::new("robot.obj"), &CancelToken::new(), |_| {}).unwrap();

    let parts = scene.parts();
    let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Base", "Arm"]);
    assert_eq!(parts[0].metadata.get("polygon_count"), Some(&json!(1)));
    let base = scene.node(scene.find_part(&parts[0].id).unwrap()).unwrap();
    assert_eq!(base.mesh.as_ref().unwrap().geometry.triangle_count(), 2);
}

fn decode_obj(file: &str, text: &str) -> Vec<partview::model::PartInfo> {
    let mut source = MemorySource::default();
    source.0.insert(file.into(), text.as_bytes().to_vec());
    load_scene(&mut source, Utf8Path::new(file), &CancelToken::new(), |_| {})
        .unwrap()
        .parts()
}

#[test]
fn obj_groups_split_an_unnamed_object() {
    let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
g Left
f 1 2 3
g Right
f 1 3 4
f 2 3 4
";
    let parts = decode_obj("pair.obj", text);
    let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Left", "Right"]);
    assert_eq!(parts[1].metadata.get("polygon_count"), Some(&json!(2)));
    assert_eq!(parts[1].metadata.get("obj_groups"), Some(&json!(["Right"])));
}

#[test]
fn obj_without_names_is_one_part_named_after_the_file() {
    let parts = decode_obj("m.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "m");
    assert!(parts[0].metadata.get("obj_groups").is_none());
}

#[test]
fn obj_material_switches_stay_in_one_group() {
    let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
g Shell
usemtl steel
f 1 2 3
usemtl rubber
f 1 3 4
";
    let parts = decode_obj("shell.obj", text);
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "Shell");
    assert_eq!(parts[0].metadata.get("polygon_count"), Some(&json!(2)));
    assert_eq!(
        parts[0].metadata.get("obj_materials"),
        Some(&json!(["steel", "rubber"]))
    );
}

#[test]
fn obj_negative_indices_are_relative() {
    let parts = decode_obj("rel.obj", "o Tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n");
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "Tri");
}

#[test]
fn malformed_obj_is_an_obj_error() {
    let mut source = MemorySource::default();
    source.0.insert("bad.obj".into(), b"v 0 0\n".to_vec());
    let err = load_scene(&mut source, Utf8Path::new("bad.obj"), &CancelToken::new(), |_| {})
        .unwrap_err();
    assert!(matches!(err, LoadError::Obj { .. }), "{err}");
}

#[test]
fn obj_without_faces_is_empty() {
    let mut source = MemorySource::default();
    source.0.insert("points.obj".into(), b"v 0 0 0\nv 1 0 0\n".to_vec());
    let err = load_scene(&mut source, Utf8Path::new("points.obj"), &CancelToken::new(), |_| {}).unwrap_err();
    assert!(matches!(err, LoadError::Empty { .. }), "{err}");
}

#[test]
fn garbage_glb_is_a_gltf_error() {
    let mut source = MemorySource::default();
    source.0.insert("bad.glb".into(), b"not a model".to_vec());
    let err = load_scene(&mut source, Utf8Path::new("bad.glb"), &CancelToken::new(), |_| {}).unwrap_err();
    assert!(matches!(err, LoadError::Gltf(_)), "{err}");
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_scene(
        &mut FsSource,
        Utf8Path::new("/no/such/dir/model.obj"),
        &CancelToken::new(),
        |_| {},
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("/no/such/dir/model.obj"));
}

#[test]
fn unsupported_format_is_rejected_before_reading() {
    let mut source = MemorySource::default();
    let err = load_scene(&mut source, Utf8Path::new("part.fbx"), &CancelToken::new(), |_| {}).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
}

#[test]
fn progress_counts_up_to_total() {
    let mut source = MemorySource::default();
    let glb = triangle_glb();
    let len = glb.len() as u64;
    source.0.insert("t.glb".into(), glb);
    let mut seen: Vec<Progress> = Vec::new();
    load_scene(&mut source, Utf8Path::new("t.glb"), &CancelToken::new(), |p| seen.push(p)).unwrap();

    assert_eq!(seen.first(), Some(&Progress { loaded: 0, total: Some(len) }));
    assert_eq!(seen.last().unwrap().loaded, len);
    assert_eq!(seen.last().unwrap().fraction(), Some(1.0));
    assert!(seen.windows(2).all(|w| w[0].loaded <= w[1].loaded));
}

#[test]
fn cancelled_token_stops_the_load() {
    let token = CancelToken::new();
    token.cancel();
    let mut source = MemorySource::default();
    source.0.insert("t.glb".into(), triangle_glb());
    let err = load_scene(&mut source, Utf8Path::new("t.glb"), &token, |_| {}).unwrap_err();
    assert!(matches!(err, LoadError::Cancelled));
}

#[test]
fn background_load_finishes() {
    let mut source = MemorySource::default();
    source.0.insert("t.glb".into(), triangle_glb());
    let mut load = AssetLoad::spawn("t.glb", source, None);
    assert_eq!(load.path(), "t.glb");
    let scene = wait(&mut load).unwrap();
    assert_eq!(scene.parts().len(), 1);
    // Done is reported once.
    assert!(matches!(load.poll(), LoadPoll::Pending(_)));
}

#[test]
fn background_load_can_be_cancelled() {
    let mut load = AssetLoad::spawn("slow.obj", TrickleSource, None);
    std::thread::sleep(Duration::from_millis(20));
    load.cancel();
    assert!(load.is_cancelled());
    assert!(matches!(wait(&mut load), Err(LoadError::Cancelled)));
}

#[test]
fn background_load_wakes_the_caller() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    let wakes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&wakes);
    let mut source = MemorySource::default();
    source.0.insert("t.glb".into(), triangle_glb());
    let mut load = AssetLoad::spawn(
        "t.glb",
        source,
        Some(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })),
    );
    wait(&mut load).unwrap();
    assert!(wakes.load(Ordering::SeqCst) >= 2);
    assert!(load.progress().loaded > 0);
}
