use weft_core::Value;
use weft_dom::Namespace;
use weft_template::{
    CompileError, CompileOptions, HandlerSpec, Op, TemplateNode, ValueSpec, compile, compile_with,
};

fn op_names(ops: &[Op]) -> Vec<&'static str> {
    ops.iter().map(Op::name).collect()
}

#[test]
fn steps_are_emitted_in_node_order() {
    let ast = TemplateNode::element("div").child(
        TemplateNode::element("x-gauge")
            .attach("gauge")
            .attr("level", ValueSpec::property("level"))
            .on("change", HandlerSpec::Method("changed".into()))
            .text(ValueSpec::constant("hi")),
    );
    let t = compile(&ast, "root", true).unwrap();

    assert_eq!(
        op_names(t.build_ops()),
        vec!["create", "create", "attach", "attr", "flush", "on", "text", "append", "append"]
    );
    let refresh: Vec<Op> = t.refresh_steps().iter().map(|s| s.op().clone()).collect();
    assert_eq!(op_names(&refresh), vec!["attr", "flush"]);
    assert!(t.refresh_steps()[1].is_unconditional());
}

#[test]
fn constant_template_has_no_refresh_steps() {
    let ast = TemplateNode::element("p")
        .attr("title", ValueSpec::constant("fixed"))
        .text(ValueSpec::constant("plain"));
    let t = compile(&ast, "root", true).unwrap();
    assert!(t.refresh_steps().is_empty());
    assert_eq!(t.build_ops().len(), 4);
}

#[test]
fn known_pairs_become_property_writes() {
    let ast = TemplateNode::element("input")
        .attr("value", ValueSpec::property("text"))
        .attr("class", ValueSpec::constant("field"))
        .attr("style", ValueSpec::constant("color: red"))
        .attr("data-kind", ValueSpec::constant("x"));
    let t = compile(&ast, "root", true).unwrap();

    let written: Vec<String> = t
        .build_ops()
        .iter()
        .filter_map(|op| match op {
            Op::SetProperty { path, .. } => Some(format!("prop {path}")),
            Op::SetAttribute { name, .. } => Some(format!("attr {name}")),
            _ => None,
        })
        .collect();
    assert_eq!(
        written,
        vec![
            "prop value",
            "prop className",
            "prop style.cssText",
            "attr data-kind"
        ]
    );
}

#[test]
fn namespaces_are_inherited_and_class_stays_an_attribute() {
    let ast = TemplateNode::element("svg")
        .namespace("svg")
        .child(TemplateNode::element("circle").attr("class", ValueSpec::constant("dot")))
        .child(TemplateNode::element("foreignObject").child(
            TemplateNode::element("div").namespace("http://www.w3.org/1999/xhtml"),
        ));
    let t = compile(&ast, "root", true).unwrap();

    let created: Vec<(String, Namespace)> = t
        .build_ops()
        .iter()
        .filter_map(|op| match op {
            Op::CreateElement { tag, namespace, .. } => Some((tag.clone(), *namespace)),
            _ => None,
        })
        .collect();
    assert_eq!(
        created,
        vec![
            ("svg".to_string(), Namespace::Svg),
            ("circle".to_string(), Namespace::Svg),
            ("foreignObject".to_string(), Namespace::Svg),
            ("div".to_string(), Namespace::Html),
        ]
    );
    assert!(t.build_ops().iter().any(
        |op| matches!(op, Op::SetAttribute { name, .. } if name == "class")
    ));
}

#[test]
fn adopted_root_is_not_created_or_flushed() {
    let ast = TemplateNode::element("x-panel")
        .attr("open", ValueSpec::property("open"))
        .child(TemplateNode::element("x-inner").attr("level", ValueSpec::property("level")));
    let t = compile(&ast, "host", false).unwrap();

    assert!(!t.creates_root());
    assert!(matches!(t.build_ops()[0], Op::AdoptRoot { slot: 0 }));
    let flushed: Vec<usize> = t
        .build_ops()
        .iter()
        .filter_map(|op| match op {
            Op::FlushNested { slot } => Some(*slot),
            _ => None,
        })
        .collect();
    assert_eq!(flushed, vec![1]);
    assert_eq!(t.slot_name(0), "host");
}

#[test]
fn nested_convention_is_configurable() {
    let ast = TemplateNode::element("div").child(TemplateNode::element("Gauge"));
    let options = CompileOptions {
        nested_component: |tag: &str| tag.starts_with(char::is_uppercase),
        ..Default::default()
    };
    let t = compile_with(&ast, &options).unwrap();
    assert!(t
        .build_ops()
        .iter()
        .any(|op| matches!(op, Op::FlushNested { slot: 1 })));

    let plain = compile(&ast, "root", true).unwrap();
    assert!(!plain
        .build_ops()
        .iter()
        .any(|op| matches!(op, Op::FlushNested { .. })));
}

#[test]
fn nested_flush_runs_on_every_refresh() {
    let ast = TemplateNode::element("x-clock").attr("zone", ValueSpec::constant("utc"));
    let t = compile(&ast, "root", true).unwrap();
    assert!(t
        .build_ops()
        .iter()
        .any(|op| matches!(op, Op::FlushNested { .. })));
    assert_eq!(t.refresh_steps().len(), 1);
    let flush = &t.refresh_steps()[0];
    assert!(matches!(flush.op(), Op::FlushNested { slot: 0 }));
    assert!(flush.is_unconditional());
    assert!(t.to_string().contains("  [*] flush root\n"));
}

#[test]
fn node_without_tag_or_expression_is_rejected() {
    let err = compile(&TemplateNode::default(), "root", true).unwrap_err();
    assert_eq!(
        err,
        CompileError::MissingTagOrExpression {
            path: "root".into()
        }
    );

    let ast = TemplateNode::element("div")
        .child(TemplateNode::element("span"))
        .child(TemplateNode::default());
    let err = compile(&ast, "root", true).unwrap_err();
    assert_eq!(
        err,
        CompileError::MissingTagOrExpression {
            path: "root/1".into()
        }
    );
}

#[test]
fn expression_children_become_text_nodes() {
    let ast = TemplateNode::element("div")
        .child(TemplateNode::text_node(ValueSpec::property("name")));
    let t = compile(&ast, "root", true).unwrap();
    assert_eq!(op_names(t.build_ops()), vec!["create", "text", "append"]);
    assert_eq!(t.refresh_steps().len(), 1);
}

#[test]
fn text_nodes_with_element_parts_are_rejected() {
    let labelled = TemplateNode::text_node(ValueSpec::property("name"))
        .attr("title", ValueSpec::constant("x"));
    let ast = TemplateNode::element("div").child(labelled);
    assert_eq!(
        compile(&ast, "root", true).unwrap_err(),
        CompileError::TextWithElementParts {
            path: "root/0".into()
        }
    );

    let wired = TemplateNode::text_node(ValueSpec::property("name"))
        .on("click", HandlerSpec::Method("go".into()));
    let ast = TemplateNode::element("div").child(TemplateNode::element("p")).child(wired);
    assert_eq!(
        compile(&ast, "root", true).unwrap_err(),
        CompileError::TextWithElementParts {
            path: "root/1".into()
        }
    );
}

#[test]
fn text_root_is_rejected() {
    let ast = TemplateNode::text_node(ValueSpec::constant("x"));
    assert_eq!(compile(&ast, "root", true).unwrap_err(), CompileError::TextRoot);
}

#[test]
fn unknown_namespace_is_rejected() {
    let ast = TemplateNode::element("div").child(TemplateNode::element("g").namespace("vml"));
    assert_eq!(
        compile(&ast, "root", true).unwrap_err(),
        CompileError::UnknownNamespace {
            tag: "g".into(),
            namespace: "vml".into()
        }
    );
}

#[test]
fn duplicate_attach_points_across_nodes_are_rejected() {
    let ast = TemplateNode::element("div")
        .child(TemplateNode::element("span").attach("label"))
        .child(TemplateNode::element("em").attach("label"));
    assert_eq!(
        compile(&ast, "root", true).unwrap_err(),
        CompileError::DuplicateAttachPoint {
            name: "label".into()
        }
    );

    // Repeating a name on the same node is harmless.
    let ast = TemplateNode::element("div").attach("x").attach("x");
    let t = compile(&ast, "root", true).unwrap();
    let attaches = t
        .build_ops()
        .iter()
        .filter(|op| matches!(op, Op::Attach { .. }))
        .count();
    assert_eq!(attaches, 1);
}

#[test]
fn unknown_handlers_are_rejected_when_methods_are_known() {
    let ast = TemplateNode::element("button")
        .on("click", HandlerSpec::Method("save".into()))
        .on("focus", HandlerSpec::Method("track".into()));
    let options = CompileOptions::named("form").with_methods(["save"]);
    assert_eq!(
        compile_with(&ast, &options).unwrap_err(),
        CompileError::UnknownHandler {
            tag: "button".into(),
            event: "focus".into(),
            method: "track".into()
        }
    );

    // Without a method list the check is deferred to dispatch.
    assert!(compile(&ast, "root", true).is_ok());
}

#[test]
fn listing_shows_build_and_gated_refresh() {
    let ast = TemplateNode::element("button")
        .attr("disabled", ValueSpec::property("busy"))
        .text(ValueSpec::property("label"));
    let t = compile_with(&ast, &CompileOptions::named("save-button")).unwrap();
    let listing = t.to_string();

    assert!(listing.starts_with("template save-button\n"));
    assert!(listing.contains("  root = create <button>\n"));
    assert!(listing.contains("  root.disabled = busy\n"));
    assert!(listing.contains("  [busy] root.disabled = busy\n"));
    assert!(listing.contains("  [label] n1.text = label\n"));
    assert!(listing.contains("  append n1 to root\n"));
}
