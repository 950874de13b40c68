use futures::executor::block_on;
use serde_json::{json, Value};

use crate::assets::AssetCategory;
use crate::core::config::EditorConfig;
use crate::session::EditorSession;

use super::fixtures::{minimal_glb, ClipDecoder};

fn assert_json_close(actual: &Value, expected: &Value, path: &str) {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap(), b.as_f64().unwrap());
            assert!((a - b).abs() < 1e-4, "{path}: {a} != {b}");
        }
        (Value::Array(a), Value::Array(b)) => {
            assert_eq!(a.len(), b.len(), "{path}: array length");
            for (i, (a, b)) in a.iter().zip(b).enumerate() {
                assert_json_close(a, b, &format!("{path}[{i}]"));
            }
        }
        (Value::Object(a), Value::Object(b)) => {
            let mut keys: Vec<_> = a.keys().collect();
            let mut expected_keys: Vec<_> = b.keys().collect();
            keys.sort();
            expected_keys.sort();
            assert_eq!(keys, expected_keys, "{path}: keys");
            for (key, value) in a {
                assert_json_close(value, &b[key], &format!("{path}.{key}"));
            }
        }
        _ => assert_eq!(actual, expected, "{path}"),
    }
}

fn session_with_models() -> EditorSession {
    let mut session = EditorSession::with_decoder(EditorConfig::default(), Box::new(ClipDecoder));
    session.blobs().insert("blob:robot", minimal_glb());
    session.blobs().insert("blob:tree", minimal_glb());
    session
        .registry_mut()
        .add_asset(AssetCategory::Models, "robot.glb", "blob:robot");
    session
        .registry_mut()
        .add_asset(AssetCategory::Models, "tree.glb", "blob:tree");
    session
}

#[test]
fn test_serialized_level_matches_loaded_level() {
    let level = json!([
        {
            "name": "guard",
            "modelName": "robot.glb",
            "type": "GameObject",
            "noCollider": false,
            "animation": "Die",
            "position": {"x": 1.5, "y": 0.0, "z": -2.0},
            "rotation": {"x": 0.1, "y": 0.4, "z": -0.3},
            "scale": {"x": 1.0, "y": 2.0, "z": 1.0},
            "behaviors": [
                {
                    "type": "MoveByCheckpoints",
                    "checkpoints": [
                        {"position": {"x": 0.0, "y": 0.0, "z": 0.0}},
                        {"position": {"x": 3.0, "y": 0.0, "z": 0.0}, "rotation": {"x": 0.0, "y": 1.0, "z": 0.0}}
                    ],
                    "speed": 2.0,
                    "loop": true
                },
                {"type": "Destructable", "health": 30.0, "destroyDelay": 1.0, "deathAnimation": "Die"}
            ]
        },
        {
            "name": "oak",
            "modelName": "tree.glb",
            "type": "GameObject",
            "noCollider": true,
            "animation": "Idle",
            "position": {"x": 0.0, "y": 0.0, "z": 5.0},
            "rotation": {"x": 0.0, "y": 0.0, "z": 0.0},
            "scale": {"x": 3.0, "y": 3.0, "z": 3.0}
        }
    ]);

    let mut session = session_with_models();
    let report = block_on(session.load_scene_from_json(&level.to_string())).unwrap();
    assert_eq!(report.loaded.len(), 2);

    let saved: Value = serde_json::from_str(&session.serialize_scene().unwrap()).unwrap();
    assert_json_close(&saved, &level, "$");
}

#[test]
fn test_defaults_are_normalized_on_save() {
    let mut session = session_with_models();
    let report = block_on(session.load_scene_from_json(r#"[{"name": "bare", "modelName": "robot.glb"}]"#)).unwrap();
    assert_eq!(report.loaded.len(), 1);

    let saved: Value = serde_json::from_str(&session.serialize_scene().unwrap()).unwrap();
    let expected = json!([{
        "name": "bare",
        "modelName": "robot.glb",
        "type": "GameObject",
        "noCollider": false,
        "animation": "Idle",
        "position": {"x": 0.0, "y": 0.0, "z": 0.0},
        "rotation": {"x": 0.0, "y": 0.0, "z": 0.0},
        "scale": {"x": 1.0, "y": 1.0, "z": 1.0}
    }]);
    assert_json_close(&saved, &expected, "$");
}

#[test]
fn test_unregistered_items_do_not_block_the_rest() {
    let mut session = session_with_models();
    let level = r#"[
        {"name": "a", "modelName": "robot.glb"},
        {"name": "ghost", "modelName": "ghost.glb"},
        {"name": "b", "modelName": "tree.glb"}
    ]"#;
    let report = block_on(session.load_scene_from_json(level)).unwrap();

    let scene = session.scene().unwrap();
    let names: Vec<_> = scene
        .objects()
        .iter()
        .map(|key| scene.node(*key).unwrap().name.as_str())
        .collect();
    assert_eq!(names, ["a", "b"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "ghost");
    assert!(scene.find_object_by_name("ghost").is_none());
}
