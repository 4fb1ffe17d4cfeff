use std::rc::Rc;

use weft_template::{
    CompileError, CompileOptions, HandlerSpec, ParseError, TemplateCache, TemplateError,
    TemplateNode, ValueSpec,
};

#[test]
fn same_ast_compiles_once() {
    let ast = Rc::new(TemplateNode::element("p").text(ValueSpec::property("msg")));
    let mut cache = TemplateCache::new();
    let options = CompileOptions::default();

    let a = cache.get_or_compile(&ast, &options).unwrap();
    let b = cache.get_or_compile(&ast, &options).unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 1);

    // An equal but distinct tree is a different template.
    let twin = Rc::new(TemplateNode::element("p").text(ValueSpec::property("msg")));
    let c = cache.get_or_compile(&twin, &options).unwrap();
    assert!(!Rc::ptr_eq(&a, &c));

    // So is the same tree compiled for an adopted root.
    let adopted = cache
        .get_or_compile(&ast, &CompileOptions::default().adopt_root())
        .unwrap();
    assert!(!adopted.creates_root());
    assert_eq!(cache.len(), 3);
}

#[test]
fn source_text_is_a_key() {
    let mut cache = TemplateCache::new();
    let options = CompileOptions::named("badge");
    let src = r#"<span class="badge">{{ count }}</span>"#;

    let a = cache.get_or_compile_source(src, &options).unwrap();
    let b = cache.get_or_compile_source(src, &options).unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(a.name(), "badge");
    assert!(!cache.is_empty());
}

#[test]
fn failures_are_not_cached() {
    let mut cache = TemplateCache::new();
    let err = cache
        .get_or_compile_source("<a></b>", &CompileOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        TemplateError::Parse(ParseError::MismatchedClose { .. })
    ));
    assert!(cache.is_empty());
}

#[test]
fn options_are_part_of_the_key() {
    let ast = Rc::new(
        TemplateNode::element("button").on("click", HandlerSpec::Method("nope".into())),
    );
    let mut cache = TemplateCache::new();
    let lenient = cache.get_or_compile(&ast, &CompileOptions::default()).unwrap();
    assert_eq!(lenient.name(), "template");

    let strict = CompileOptions::default().with_methods(["save"]);
    assert_eq!(
        cache.get_or_compile(&ast, &strict).unwrap_err(),
        CompileError::UnknownHandler {
            tag: "button".into(),
            event: "click".into(),
            method: "nope".into()
        }
    );

    let renamed = cache
        .get_or_compile(&ast, &CompileOptions::named("other"))
        .unwrap();
    assert_eq!(renamed.name(), "other");
    assert!(!Rc::ptr_eq(&lenient, &renamed));

    let src = "<x-box></x-box>";
    let nested = cache
        .get_or_compile_source(src, &CompileOptions::default())
        .unwrap();
    let plain = cache
        .get_or_compile_source(
            src,
            &CompileOptions {
                nested_component: |_: &str| false,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(nested.refresh_steps().len(), 1);
    assert!(plain.refresh_steps().is_empty());
    assert_eq!(cache.len(), 4);
}
