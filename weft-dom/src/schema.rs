//! Declarative element schema: which properties each element kind exposes,
//! which properties reflect to attributes, and the namespaces we know.

use std::fmt;

/// Element namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
    MathMl,
}

impl Namespace {
    /// Accepts a short prefix (`html`, `svg`, `math`, `mathml`) or the full URI.
    pub fn resolve(raw: &str) -> Option<Namespace> {
        match raw.trim() {
            "html" | "xhtml" | "http://www.w3.org/1999/xhtml" => Some(Namespace::Html),
            "svg" | "http://www.w3.org/2000/svg" => Some(Namespace::Svg),
            "math" | "mathml" | "http://www.w3.org/1998/Math/MathML" => Some(Namespace::MathMl),
            _ => None,
        }
    }

    pub fn uri(self) -> &'static str {
        match self {
            Namespace::Html => "http://www.w3.org/1999/xhtml",
            Namespace::Svg => "http://www.w3.org/2000/svg",
            Namespace::MathMl => "http://www.w3.org/1998/Math/MathML",
        }
    }

    pub fn is_html(self) -> bool {
        self == Namespace::Html
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Namespace::Html => "html",
            Namespace::Svg => "svg",
            Namespace::MathMl => "math",
        })
    }
}

/// Dotted path to a settable node property, e.g. `value` or `style.cssText`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath(Vec<String>);

impl PropertyPath {
    pub fn new(name: impl Into<String>) -> Self {
        PropertyPath(vec![name.into()])
    }

    pub fn dotted(path: &str) -> Self {
        PropertyPath(path.split('.').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The first segment: the property the owning object exposes.
    pub fn head(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or("")
    }

    pub fn leaf(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_nested(&self) -> bool {
        self.0.len() > 1
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Properties present on every HTML element.
const GLOBAL_PROPERTIES: &[&str] = &[
    "id",
    "className",
    "title",
    "lang",
    "dir",
    "hidden",
    "tabIndex",
    "accessKey",
    "draggable",
    "spellcheck",
    "contentEditable",
    "style",
    "textContent",
    "innerHTML",
    "slot",
];

/// Properties present on namespaced (SVG, MathML) elements.
const FOREIGN_PROPERTIES: &[&str] = &["id", "className", "style", "tabIndex"];

fn element_properties(tag: &str) -> &'static [&'static str] {
    match tag {
        "input" => &[
            "value",
            "defaultValue",
            "checked",
            "defaultChecked",
            "indeterminate",
            "disabled",
            "type",
            "name",
            "placeholder",
            "readOnly",
            "required",
            "autofocus",
            "min",
            "max",
            "step",
            "multiple",
            "maxLength",
            "minLength",
            "pattern",
            "size",
            "src",
            "alt",
        ],
        "button" => &["disabled", "type", "name", "value", "autofocus"],
        "textarea" => &[
            "value",
            "defaultValue",
            "disabled",
            "name",
            "placeholder",
            "readOnly",
            "required",
            "rows",
            "cols",
            "maxLength",
            "wrap",
        ],
        "select" => &["value", "disabled", "name", "multiple", "required", "size", "selectedIndex"],
        "option" => &["value", "disabled", "label", "selected", "defaultSelected", "text"],
        "optgroup" => &["disabled", "label"],
        "fieldset" => &["disabled", "name"],
        "form" => &["action", "method", "name", "target", "noValidate", "enctype"],
        "label" => &["htmlFor"],
        "output" => &["htmlFor", "name", "value"],
        "a" => &["href", "target", "rel", "download", "hreflang", "type"],
        "area" => &["href", "target", "rel", "alt", "coords", "shape"],
        "img" => &["src", "alt", "width", "height", "srcset", "sizes", "useMap", "isMap"],
        "iframe" => &["src", "name", "width", "height", "allow", "srcdoc"],
        "video" | "audio" => &[
            "src",
            "autoplay",
            "controls",
            "loop",
            "muted",
            "preload",
            "currentTime",
            "volume",
        ],
        "td" | "th" => &["colSpan", "rowSpan", "headers"],
        "col" | "colgroup" => &["span"],
        "ol" => &["start", "reversed", "type"],
        "li" => &["value"],
        "progress" => &["value", "max"],
        "meter" => &["value", "min", "max", "low", "high", "optimum"],
        "details" => &["open"],
        "dialog" => &["open"],
        "script" => &["src", "type", "async", "defer"],
        "link" => &["href", "rel", "type", "media"],
        _ => &[],
    }
}

/// HTML attribute names whose property has a different name.
pub const ATTRIBUTE_ALIASES: &[(&str, &str)] = &[("class", "className"), ("for", "htmlFor")];

/// The built-in property list of an element kind: global properties plus the
/// element's own. Custom elements declare theirs at definition time, see
/// [`defined_properties`](crate::custom::defined_properties).
pub fn property_names(tag: &str, namespace: Namespace) -> Vec<String> {
    if !namespace.is_html() {
        return FOREIGN_PROPERTIES.iter().map(|p| p.to_string()).collect();
    }
    GLOBAL_PROPERTIES
        .iter()
        .chain(element_properties(tag))
        .map(|p| p.to_string())
        .collect()
}

/// How a property mirrors into an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reflect {
    /// Attribute holds the stringified value; null removes it.
    String(&'static str),
    /// Attribute is present (empty) iff the value is truthy.
    Bool(&'static str),
}

/// Properties whose writes are mirrored into attributes.
pub fn reflection(path: &str) -> Option<Reflect> {
    Some(match path {
        "id" => Reflect::String("id"),
        "className" => Reflect::String("class"),
        "htmlFor" => Reflect::String("for"),
        "title" => Reflect::String("title"),
        "lang" => Reflect::String("lang"),
        "dir" => Reflect::String("dir"),
        "style.cssText" => Reflect::String("style"),
        "name" => Reflect::String("name"),
        "type" => Reflect::String("type"),
        "href" => Reflect::String("href"),
        "src" => Reflect::String("src"),
        "alt" => Reflect::String("alt"),
        "placeholder" => Reflect::String("placeholder"),
        "tabIndex" => Reflect::String("tabindex"),
        "hidden" => Reflect::Bool("hidden"),
        "disabled" => Reflect::Bool("disabled"),
        "readOnly" => Reflect::Bool("readonly"),
        "required" => Reflect::Bool("required"),
        "multiple" => Reflect::Bool("multiple"),
        "open" => Reflect::Bool("open"),
        _ => return None,
    })
}
