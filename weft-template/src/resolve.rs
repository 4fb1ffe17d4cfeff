//! Attribute name -> node property resolution.
//!
//! Each (tag, namespace) pair gets a map from lower-cased property name to
//! canonical property path, built from the element schema the first time the
//! tag is seen and kept for the rest of the thread's life. Properties declared
//! by custom element definitions are looked up in the registry on each call,
//! so a tag may be defined after its map was built.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use weft_dom::custom;
use weft_dom::schema::{self, ATTRIBUTE_ALIASES};
use weft_dom::{Namespace, PropertyPath};

#[derive(Debug, Default)]
pub struct PropertyMap {
    by_lower: HashMap<String, PropertyPath>,
}

impl PropertyMap {
    fn for_tag(tag: &str, namespace: Namespace) -> Self {
        let mut by_lower = HashMap::new();
        for name in schema::property_names(tag, namespace) {
            let path = if name == "style" {
                PropertyPath::dotted("style.cssText")
            } else {
                PropertyPath::new(name.as_str())
            };
            by_lower.insert(name.to_ascii_lowercase(), path);
        }
        for (attr, prop) in ATTRIBUTE_ALIASES {
            if let Some(path) = by_lower.get(&prop.to_ascii_lowercase()).cloned() {
                by_lower.insert(attr.to_string(), path);
            }
        }
        Self { by_lower }
    }

    pub fn get(&self, attr: &str) -> Option<&PropertyPath> {
        self.by_lower.get(&attr.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.by_lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_lower.is_empty()
    }
}

thread_local! {
    static PROPERTY_MAPS: RefCell<HashMap<(String, Namespace), Rc<PropertyMap>>> =
        RefCell::new(HashMap::new());
}

/// The cached property map for a tag, computing it on first use.
pub fn property_map(tag: &str, namespace: Namespace) -> Rc<PropertyMap> {
    let key = (tag.to_string(), namespace);
    if let Some(map) = PROPERTY_MAPS.with(|maps| maps.borrow().get(&key).cloned()) {
        return map;
    }
    let map = Rc::new(PropertyMap::for_tag(tag, namespace));
    log::trace!("property map for <{tag}> ({namespace}): {} entries", map.len());
    PROPERTY_MAPS.with(|maps| maps.borrow_mut().insert(key, map.clone()));
    map
}

pub fn is_cached(tag: &str, namespace: Namespace) -> bool {
    PROPERTY_MAPS.with(|maps| maps.borrow().contains_key(&(tag.to_string(), namespace)))
}

fn is_class_list(attr: &str) -> bool {
    attr.eq_ignore_ascii_case("class") || attr.eq_ignore_ascii_case("classname")
}

/// Resolve an attribute to a settable property path, or `None` for generic
/// attribute semantics.
///
/// Namespaced elements never resolve `class`: their class property is not a
/// plain string, so the attribute is written instead.
pub fn resolve(tag: &str, namespace: Namespace, attr: &str) -> Option<PropertyPath> {
    if !namespace.is_html() && is_class_list(attr) {
        return None;
    }
    if let Some(path) = property_map(tag, namespace).get(attr) {
        return Some(path.clone());
    }
    if !namespace.is_html() {
        return None;
    }
    custom::defined_properties(tag)?
        .into_iter()
        .find(|p| p.eq_ignore_ascii_case(attr))
        .map(PropertyPath::new)
}
