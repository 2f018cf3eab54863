//! Assembles the output document from rendered modules and the logo.

use crate::logo::Transform;
use crate::render::ModuleRect;
use crate::svg::{Element, Node, SVG_NAMESPACE};

/// Creates the root `<svg>` element for a square canvas of `size` pixels.
pub fn new_tree(size: u32) -> Element {
    Element::new("svg")
        .with_attr("width", size)
        .with_attr("height", size)
        .with_attr("version", "1.1")
        .with_attr("xmlns", SVG_NAMESPACE)
}

/// Root element holding one `<rect>` per module.
pub fn modules_to_tree(size: u32, rects: &[ModuleRect], fill: &str) -> Element {
    let mut root = new_tree(size);
    for rect in rects {
        root.push(Node::Element(
            Element::new("rect")
                .with_attr("x", rect.x)
                .with_attr("y", rect.y)
                .with_attr("width", rect.size)
                .with_attr("height", rect.size)
                .with_attr("fill", fill),
        ));
    }
    root
}

/// Builds the final document and moves the logo's children into it.
///
/// The children of `logo` keep their order inside a `<g>` carrying
/// `transform`. Prefixed namespace declarations of the logo (`xmlns:xlink`
/// and friends) are copied to the new root so the moved nodes stay valid.
pub fn compose(
    size: u32,
    rects: &[ModuleRect],
    fill: &str,
    transform: &Transform,
    logo: Element,
) -> Element {
    let mut root = modules_to_tree(size, rects, fill);
    for (key, value) in &logo.attributes {
        if key.starts_with("xmlns:") && root.attr(key).is_none() {
            root.attributes.push((key.clone(), value.clone()));
        }
    }
    let mut group = Element::new("g").with_attr("transform", transform);
    group.children = logo.into_children();
    root.push(Node::Element(group));
    root
}
