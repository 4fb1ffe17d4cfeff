use std::fs;
use std::path::PathBuf;

use weft_cli::{compile_cmd, parse_assignment, render_cmd};
use weft_core::Value;

fn write_template(tag: &str, src: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../target/weft-cli-tests")
        .join(format!("{}-{tag}", std::process::id()));
    fs::create_dir_all(&dir).expect("create test dir");
    let path = dir.join(format!("{tag}.html"));
    fs::write(&path, src).expect("write template");
    path
}

#[test]
fn compile_prints_listing_named_after_file() {
    let input = write_template(
        "counter",
        r#"<button :disabled="busy" @click="increment">{{ count }}</button>"#,
    );
    let listing = compile_cmd(&input, false, None).expect("compile");

    assert!(listing.starts_with("template counter\n"), "{listing}");
    assert!(listing.contains("root = create <button>"));
    assert!(listing.contains("[busy] root.disabled = busy"));
    assert!(listing.contains("on root 'click' -> increment"));
}

#[test]
fn compile_with_adopted_root_and_name() {
    let input = write_template("panel", r#"<section class="panel"></section>"#);
    let listing = compile_cmd(&input, true, Some("side-panel")).expect("compile");
    assert!(listing.starts_with("template side-panel\n"));
    assert!(listing.contains("root = adopt root"));
}

#[test]
fn render_builds_then_applies_updates() {
    let input = write_template(
        "greeting",
        r#"<p class="greeting" data-count="{{ count }}">Hello, {{ name }}!</p>"#,
    );
    let props = vec![
        parse_assignment("name=Ann").unwrap(),
        parse_assignment("count=2").unwrap(),
    ];
    let updates = vec![parse_assignment("name=Bea").unwrap()];

    let out = render_cmd(&input, &props, &updates, false).expect("render");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            r#"<p class="greeting" data-count="2">Hello, Ann!</p>"#,
            "-- 1 steps, 0 failed",
            r#"<p class="greeting" data-count="2">Hello, Bea!</p>"#,
        ]
    );
}

#[test]
fn render_into_adopted_root() {
    let input = write_template("card", r#"<article>{{ title }}</article>"#);
    let props = vec![parse_assignment("title=News").unwrap()];
    let out = render_cmd(&input, &props, &[], true).expect("render");
    assert_eq!(out, "<article>News</article>\n");
}

#[test]
fn errors_carry_context() {
    let missing = PathBuf::from("/nonexistent/weft/template.html");
    let err = compile_cmd(&missing, false, None).unwrap_err();
    assert!(err.to_string().contains("failed to read"));

    let input = write_template("broken", "<div><span></div></span>");
    let err = compile_cmd(&input, false, None).unwrap_err();
    assert!(err.to_string().contains("failed to parse"));
    assert!(format!("{err:#}").contains("does not match"));
}

#[test]
fn assignments_parse_literals() {
    let a = parse_assignment("on=true").unwrap();
    assert_eq!((a.name.as_str(), a.value()), ("on", Value::Bool(true)));
    assert_eq!(parse_assignment("n=1.5").unwrap().value(), Value::Number(1.5));
    assert_eq!(
        parse_assignment("s=a=b").unwrap().value(),
        Value::from("a=b")
    );
    assert!(parse_assignment("novalue").is_err());
    assert!(parse_assignment("=1").is_err());
}
