use gdtext_core::value::Value;
use gdtext_parser::{
    error::{ErrorCode, ParseError, Severity},
    parse_scene, parse_scene_with_diagnostics, parse_settings, patch, set_setting,
};

#[test]
fn test_minimal_scene() {
    let doc = parse_scene("[gd_scene format=3]\n\n[node name=\"Root\" type=\"Node2D\"]\n");

    assert_eq!(doc.nodes.len(), 1);
    let root = &doc.nodes[0];
    assert_eq!(root.name, "Root");
    assert_eq!(root.parent, None);
    assert_eq!(root.type_name.as_deref(), Some("Node2D"));
    assert_eq!(doc.header.format, 3);
    assert_eq!(doc.header.load_steps, 1);
}

#[test]
fn test_remove_root_with_connection() {
    let source = r#"[gd_scene format=3]

[node name="Player" type="Area2D"]

[node name="Sprite" type="Sprite2D" parent="."]

[connection signal="body_entered" from="Player" to="Player" method="_on_body_entered"]
"#;

    let text = patch::remove_node(source, "Player");
    let doc = parse_scene(&text);

    assert!(doc.nodes.iter().all(|node| node.name != "Player"));
    assert!(doc.connections.iter().all(|c| c.from != "Player" && c.to != "Player"));
    assert_eq!(doc.nodes.len(), 1);
    assert_eq!(doc.nodes[0].name, "Sprite");
}

#[test]
fn test_rename_by_full_segment() {
    let source = r#"[node name="Root" type="Node"]

[node name="A" type="Node" parent="."]

[node name="AA" type="Node" parent="."]

[node name="child" type="Node" parent="A"]

[node name="leaf" type="Node" parent="A/child"]
"#;

    let text = patch::rename_node(source, "A", "B");
    let doc = parse_scene(&text);

    assert!(doc.find_child(Some("."), "B").is_some());
    assert!(doc.find_child(Some("."), "AA").is_some());
    assert!(doc.find_child(Some("B"), "child").is_some());
    assert!(doc.find_child(Some("B/child"), "leaf").is_some());
    assert!(!text.contains("parent=\"A"));
}

#[test]
fn test_properties_decode_lazily() {
    let source = r#"[node name="Root" type="Node2D"]
position = Vector2(16, -8.5)
modulate = Color(1, 0.5, 0.25)
texture = ExtResource("1_tex")
points = PackedVector2Array(0, 0, 1, 1)
tags = ["a", 2, true]
"#;
    let doc = parse_scene(source);

    assert_eq!(doc.nodes[0].properties["position"], "Vector2(16, -8.5)");
    assert_eq!(
        doc.property("Root", "modulate"),
        Some(Value::Color { r: 1.0, g: 0.5, b: 0.25, a: 1.0 })
    );
    assert_eq!(
        doc.property("Root", "texture"),
        Some(Value::ResourceRef("ExtResource(\"1_tex\")".to_string()))
    );
    assert_eq!(
        doc.property("Root", "points"),
        Some(Value::Opaque("PackedVector2Array(0, 0, 1, 1)".to_string()))
    );
    assert_eq!(
        doc.property("Root", "tags"),
        Some(Value::Array(vec![
            Value::String("a".to_string()),
            Value::Number(2.0),
            Value::Bool(true),
        ]))
    );
}

#[test]
fn test_incomplete_declarations_are_dropped() {
    let source = r#"[gd_scene format=3]
[ext_resource type="Script" id="1"]
[sub_resource id="2"]
radius = 4.0
[node type="Node"]
[connection signal="pressed" from="." to="."]
[node name="Kept"]
"#;
    let (doc, diagnostics) = parse_scene_with_diagnostics(source);

    assert!(doc.ext_resources.is_empty());
    assert!(doc.sub_resources.is_empty());
    assert!(doc.connections.is_empty());
    assert_eq!(doc.nodes.len(), 1);
    assert_eq!(diagnostics.len(), 4);
    assert!(diagnostics.iter().all(|d| d.code() == Some(ErrorCode::E100)));
    assert!(diagnostics.iter().all(|d| d.severity() == Severity::Warning));
}

#[test]
fn test_diagnostics_escalate_to_parse_error() {
    let (_, diagnostics) = parse_scene_with_diagnostics("stray = 1\n[node name=\"A\"\n");
    let err = ParseError::new(diagnostics);

    assert_eq!(err.diagnostics().len(), 2);
    assert!(err.diagnostics().iter().all(|d| d.severity() == Severity::Error));
    assert!(err.to_string().starts_with("error["));
    assert!(err.to_string().ends_with("(+1 more)"));
}

#[test]
fn test_settings_new_section() {
    let text = "config_version=5\n\n[application]\nconfig/name=\"Demo\"\n";
    let updated = set_setting(text, "physics/common/physics_fps", "120");

    assert!(updated.starts_with(text));
    assert!(updated.contains("[physics]\ncommon/physics_fps=120"));
    assert_eq!(parse_settings(&updated).get("physics/common/physics_fps"), Some("120"));
}

#[test]
fn test_input_actions_keep_multi_line_values() {
    let source = r#"[input]

ui_jump={
"deadzone": 0.2,
"events": [Object(InputEventKey,"resource_local_to_scene":false,"keycode":32)]
}
ui_fire={
"deadzone": 0.5,
"events": []
}
"#;
    let doc = parse_settings(source);
    let actions = doc.input_actions();

    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].name, "ui_jump");
    assert!(actions[0].raw.ends_with("\"keycode\":32)]\n}"));
    assert_eq!(actions[0].deadzone(), Some(0.2));
    assert_eq!(actions[1].deadzone(), Some(0.5));
}
