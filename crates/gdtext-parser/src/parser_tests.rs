//! Tests running the readers and patchers together.
//!
//! Every patch is checked two ways: the parsed result must show the change,
//! and the text around the edited lines must be untouched.

use gdtext_core::scene::Connection;
use proptest::prelude::*;

use crate::{parse_scene, parse_settings, patch, set_setting};

const PLAYER: &str = r#"[gd_scene load_steps=3 format=3 uid="uid://b8x"]

[ext_resource type="Script" path="res://player.gd" id="1_pl"]
[ext_resource type="Texture2D" uid="uid://ic" path="res://icon.svg" id="2_ic"]

[sub_resource type="RectangleShape2D" id="RectangleShape2D_1"]
size = Vector2(16, 32)

; the player itself
[node name="Player" type="CharacterBody2D"]
script = ExtResource("1_pl")
speed = 300.0

[node name="Sprite" type="Sprite2D" parent="."]
texture = ExtResource("2_ic")

[node name="Hitbox" type="Area2D" parent="Sprite"]

[node name="Shape" type="CollisionShape2D" parent="Sprite/Hitbox"]
shape = SubResource("RectangleShape2D_1")

[node name="SpriteFX" type="Node2D" parent="."]

[connection signal="body_entered" from="Player" to="Player" method="_on_body_entered"]
[connection signal="area_entered" from="Sprite/Hitbox" to="." method="_on_hit"]
"#;

fn node_names(source: &str) -> Vec<String> {
    parse_scene(source)
        .nodes
        .into_iter()
        .map(|node| node.name)
        .collect()
}

#[test]
fn test_remove_root_keeps_children() {
    let text = patch::remove_node(PLAYER, "Player");
    let doc = parse_scene(&text);

    assert!(doc.find_node("Player").is_none());
    assert!(doc.find_node("Sprite").is_some());
    assert!(!text.contains("[node name=\"Player\""));
    assert!(doc.connections.is_empty());
    assert!(text.contains("; the player itself\n"));
}

#[test]
fn test_remove_nested_node_by_path() {
    let text = patch::remove_node(PLAYER, "Sprite/Hitbox");
    let doc = parse_scene(&text);

    assert_eq!(node_names(&text), ["Player", "Sprite", "Shape", "SpriteFX"]);
    assert_eq!(doc.connections.len(), 1);
    assert_eq!(doc.connections[0].signal, "body_entered");
}

#[test]
fn test_remove_missing_node_is_noop() {
    assert_eq!(patch::remove_node(PLAYER, "Ghost"), PLAYER);
}

#[test]
fn test_rename_updates_paths_by_segment() {
    let text = patch::rename_node(PLAYER, "Sprite", "Body");
    let doc = parse_scene(&text);

    assert_eq!(node_names(&text), ["Player", "Body", "Hitbox", "Shape", "SpriteFX"]);
    assert_eq!(doc.find_node("Hitbox").unwrap().parent.as_deref(), Some("Body"));
    assert_eq!(doc.find_node("Shape").unwrap().parent.as_deref(), Some("Body/Hitbox"));
    assert_eq!(doc.connections[1].from, "Body/Hitbox");
    assert_eq!(doc.find_node("SpriteFX").unwrap().parent.as_deref(), Some("."));
}

#[test]
fn test_rename_editable_path() {
    let text = "[node name=\"Level\" parent=\".\" instance=ExtResource(\"1\")]\n\n[editable path=\"Level/Door\"]\n";
    let renamed = patch::rename_node(text, "Level", "World");

    assert!(renamed.contains("[node name=\"World\" parent=\".\""));
    assert!(renamed.contains("[editable path=\"World/Door\"]"));
}

#[test]
fn test_set_property_replace_and_insert() {
    let text = patch::set_property(PLAYER, "Player", "speed", "450.0");
    assert_eq!(
        parse_scene(&text).property("Player", "speed").unwrap().as_number(),
        Some(450.0)
    );
    assert_eq!(text.len(), PLAYER.len());

    let text = patch::set_property(&text, "Hitbox", "monitoring", "false");
    assert!(text.contains(
        "[node name=\"Hitbox\" type=\"Area2D\" parent=\"Sprite\"]\nmonitoring = false\n\n[node name=\"Shape\""
    ));
}

#[test]
fn test_set_property_on_root_and_path() {
    let text = patch::set_property(PLAYER, ".", "visible", "false");
    let text = patch::set_property(&text, "Sprite/Hitbox/Shape", "disabled", "true");
    let doc = parse_scene(&text);

    assert_eq!(doc.root().unwrap().properties["visible"], "false");
    assert_eq!(doc.find_node("Shape").unwrap().properties["disabled"], "true");
}

#[test]
fn test_set_property_on_missing_node_is_noop() {
    assert_eq!(patch::set_property(PLAYER, "Ghost", "x", "1"), PLAYER);
}

#[test]
fn test_remove_property() {
    let text = patch::remove_property(PLAYER, "Player", "speed");
    assert!(!parse_scene(&text).root().unwrap().properties.contains_key("speed"));
    assert_eq!(text, PLAYER.replace("speed = 300.0\n", ""));

    assert_eq!(patch::remove_property(PLAYER, "Player", "missing"), PLAYER);
}

#[test]
fn test_add_node_goes_before_connections() {
    let node = patch::NewNode::new("Camera")
        .with_type("Camera2D")
        .with_parent(".")
        .with_group("cameras");
    let text = patch::add_node(PLAYER, &node);
    let doc = parse_scene(&text);

    assert_eq!(doc.nodes.last().unwrap().name, "Camera");
    assert_eq!(doc.nodes.last().unwrap().groups, ["cameras"]);
    assert_eq!(doc.connections.len(), 2);
    assert!(text.contains("[node name=\"SpriteFX\" type=\"Node2D\" parent=\".\"]\n\n[node name=\"Camera\""));
}

#[test]
fn test_add_node_to_empty_scene() {
    let text = patch::add_node("[gd_scene format=3]\n", &patch::NewNode::new("Root").with_type("Node"));
    assert_eq!(text, "[gd_scene format=3]\n\n[node name=\"Root\" type=\"Node\"]\n");
}

#[test]
fn test_add_ext_resource_allocates_next_id() {
    let (text, id) = patch::add_ext_resource(PLAYER, "AudioStream", "res://jump.ogg", Some("uid://jmp"));
    let doc = parse_scene(&text);

    assert_eq!(id, "3");
    assert_eq!(doc.header.load_steps, 4);
    assert_eq!(doc.ext_resources.len(), 3);
    assert_eq!(doc.ext_resource("3").unwrap().uid.as_deref(), Some("uid://jmp"));
}

#[test]
fn test_add_ext_resource_without_existing() {
    let (text, id) = patch::add_ext_resource("[gd_scene format=3]\n\n[node name=\"A\"]\n", "Script", "res://a.gd", None);

    assert_eq!(id, "1");
    assert_eq!(
        text,
        "[gd_scene format=3]\n\n[ext_resource type=\"Script\" path=\"res://a.gd\" id=\"1\"]\n\n[node name=\"A\"]\n"
    );
}

#[test]
fn test_connect_and_disconnect() {
    let mut connection = Connection::new("timeout", "Sprite", ".", "_on_timeout");
    connection.flags = Some(3);
    let text = patch::add_connection(PLAYER, &connection);
    let doc = parse_scene(&text);

    assert_eq!(doc.connections.len(), 3);
    assert!(doc.has_connection(&connection));
    assert_eq!(doc.connections[2].flags, Some(3));

    let text = patch::remove_connection(&text, "timeout", "Sprite", ".", "_on_timeout");
    assert_eq!(text, PLAYER);
}

#[test]
fn test_first_connection_gets_blank_separator() {
    let text = patch::add_connection("[node name=\"A\"]\n", &Connection::new("ready", ".", ".", "_go"));
    assert_eq!(
        text,
        "[node name=\"A\"]\n\n[connection signal=\"ready\" from=\".\" to=\".\" method=\"_go\"]\n"
    );
}

#[test]
fn test_settings_round_trip() {
    let text = "config_version=5\n\n[application]\nconfig/name=\"Demo\"\n";
    let text = set_setting(text, "application/config/name", "\"Renamed\"");
    let text = set_setting(&text, "physics/common/physics_fps", "120");
    let doc = parse_settings(&text);

    assert_eq!(doc.get("application/config/name"), Some("\"Renamed\""));
    assert_eq!(doc.get("physics/common/physics_fps"), Some("120"));
    assert!(text.ends_with("[physics]\ncommon/physics_fps=120\n"));
}

proptest! {
    #[test]
    fn prop_set_property_is_idempotent(
        node in prop::sample::select(vec!["Player", "Sprite", "Hitbox", "Shape", "."]),
        key in "[a-z_]{1,12}",
        value in "[1-9][0-9]{0,3}",
    ) {
        let once = patch::set_property(PLAYER, node, &key, &value);
        let twice = patch::set_property(&once, node, &key, &value);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(parse_scene(&once).property(node, &key).map(|v| v.to_string()), Some(value));
    }

    #[test]
    fn prop_rename_only_touches_full_segments(suffix in "[A-Z][a-z]{0,4}") {
        let text = patch::rename_node(PLAYER, "Sprite", &format!("Sprite{suffix}"));
        let doc = parse_scene(&text);
        prop_assert!(doc.find_node("SpriteFX").is_some());
        prop_assert_eq!(
            doc.find_node("Hitbox").unwrap().parent.clone(),
            Some(format!("Sprite{suffix}"))
        );
    }
}
