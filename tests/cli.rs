use std::path::PathBuf;
use std::process::Command;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn reflow(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_reflow"))
        .args(args)
        .output()
        .expect("failed to run reflow")
}

fn component<'a>(document: &'a serde_json::Value, id: &str) -> &'a serde_json::Value {
    document["components"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == id)
        .unwrap_or_else(|| panic!("component {} missing", id))
}

fn rect(value: &serde_json::Value) -> [i64; 4] {
    ["left", "top", "width", "height"].map(|key| value[key].as_i64().unwrap())
}

#[test]
fn json_output_contains_absolute_boxes() {
    let path = fixture("login_form.json");
    let output = reflow(&[path.to_str().unwrap(), "--width", "400", "--height", "300", "--format", "json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["bounds"]["width"], 400);
    assert_eq!(document["componentCount"], 11);

    assert_eq!(rect(component(&document, "title")), [0, 0, 400, 24]);
    assert_eq!(rect(component(&document, "form")), [0, 30, 400, 232]);
    assert_eq!(rect(component(&document, "user_label")), [10, 40, 70, 20]);
    assert_eq!(rect(component(&document, "user_field")), [88, 40, 160, 20]);
    assert_eq!(rect(component(&document, "ok")), [270, 272, 60, 24]);
    assert_eq!(rect(component(&document, "cancel")), [336, 272, 60, 24]);
    assert_eq!(component(&document, "help")["placed"], false);
}

#[test]
fn tree_output_lists_every_component() {
    let path = fixture("login_form.json");
    let output = reflow(&[path.to_str().unwrap(), "--width", "400", "--height", "300"]);
    assert!(output.status.success());

    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.starts_with("window pos:(0,0) size:(400,300) [BorderLayout]"));
    assert!(text.contains("└── buttons"));
    assert!(text.contains("help unplaced (hidden)"));
}

#[test]
fn detailed_output_describes_containers() {
    let path = fixture("login_form.json");
    let output = reflow(&[path.to_str().unwrap(), "--format", "detailed"]);
    assert!(output.status.success());

    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("form: FormLayout (4 children)"));
    assert!(text.contains("Bounds: 800,600"));
}

#[test]
fn unreadable_layout_still_produces_output() {
    let path = fixture("broken_layout.json");
    let output = reflow(&[path.to_str().unwrap(), "--format", "json"]);
    assert!(output.status.success());

    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rect(component(&document, "a")), [0, 0, 0, 0]);
}

#[test]
fn missing_file_and_unknown_format_fail() {
    let output = reflow(&["does/not/exist.json"]);
    assert!(!output.status.success());

    let path = fixture("login_form.json");
    let output = reflow(&[path.to_str().unwrap(), "--format", "xml"]);
    assert!(!output.status.success());
}
