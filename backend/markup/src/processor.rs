//! Post-processing of model-generated markup.
//!
//! Generated documents are instrumented for in-browser editing
//! (`contenteditable` tagging plus wrapper divs around form controls) and
//! normalized into a fixed full-viewport layout with a single
//! `div.generated-content` container around the body content.

use ego_tree::NodeId;
use html5ever::tendril::StrTendril;
use html5ever::{LocalName, Namespace, QualName};
use once_cell::sync::Lazy;
use scraper::node::Node;
use scraper::{Html, Selector};

use crate::dom::{adopt_fragment, adopt_subtree};

/// Elements whose text is edited in place.
static EDITABLE_TAGS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td, th, label, button, select, option, textarea, table").unwrap()
});

/// Form controls that additionally get an editable wrapper div.
static WRAPPABLE_TAGS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input, select, button").unwrap());

static HEAD: Lazy<Selector> = Lazy::new(|| Selector::parse("head").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// Fixed style block appended to every generated document: full-viewport flex
/// layout plus the `.generated-content` container rule.
const LAYOUT_CSS: &str = "
    html, body {
        height: 100%;
        margin: 0;
        padding: 0;
        overflow: hidden;
        display: flex;
        justify-content: center;
        align-items: center;
        flex-direction: column;
    }
    .generated-content {
        width: 100%;
        height: 100%;
        box-sizing: border-box;
        background-color: rgba(255, 255, 255, 0.2);
        display: flex;
        flex-direction: column;
        justify-content: center;
        align-items: center;
        padding: 20px;
        margin: 0;
        text-align: center;
        position: relative;
        flex-grow: 1;
    }
    .generated-content img {
        max-width: 100%;
        height: auto;
    }
    .generated-content select, .generated-content input, .generated-content button {
        pointer-events: auto;
    }
";

/// Full pipeline for freshly generated documents: editability tagging plus
/// layout normalization.
pub fn process_generated(markup: &str) -> String {
    let mut doc = Html::parse_document(markup);
    make_editable(&mut doc);
    normalize_layout(&mut doc);
    serialize(&doc)
}

/// Pipeline for edited documents. The edit prompt hands the model an already
/// normalized document, so only editability tagging is reapplied.
pub fn process_edited(markup: &str) -> String {
    let mut doc = Html::parse_document(markup);
    make_editable(&mut doc);
    serialize(&doc)
}

/// Mark editable elements in place and wrap each form control in a
/// `<div contenteditable="true">`, in document order, one wrap level deep.
pub fn make_editable(doc: &mut Html) {
    let editable: Vec<NodeId> = doc.select(&EDITABLE_TAGS).map(|el| el.id()).collect();
    for id in editable {
        set_attr(doc, id, "contenteditable", "true");
    }

    let wrappable: Vec<NodeId> = doc.select(&WRAPPABLE_TAGS).map(|el| el.id()).collect();
    for id in wrappable {
        wrap_in_editable_div(doc, id);
    }
}

/// Append the fixed layout style block to `<head>` and move all body content
/// into exactly one appended `<div class="generated-content">`.
///
/// Not idempotent: a second pass wraps the wrapper. The generation prompts
/// instruct the model not to emit a redundant inner container, and no
/// structural de-duplication happens if it does anyway.
pub fn normalize_layout(doc: &mut Html) {
    append_head_style(doc, LAYOUT_CSS);
    wrap_body_content(doc);
}

/// Set a cover background image on `body` via a style rule in `<head>`.
pub fn set_body_background(markup: &str, image_url: &str) -> String {
    let mut doc = Html::parse_document(markup);
    let css = format!(
        "body {{ background-image: url(\"{image_url}\"); \
         background-size: cover; background-repeat: no-repeat; }}"
    );
    append_head_style(&mut doc, &css);
    serialize(&doc)
}

/// Re-serialize a document into normalized markup text.
pub fn serialize(doc: &Html) -> String {
    doc.root_element().html()
}

fn attr_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(name))
}

fn set_attr(doc: &mut Html, id: NodeId, name: &str, value: &str) {
    if let Some(mut node) = doc.tree.get_mut(id) {
        if let Node::Element(el) = node.value() {
            el.attrs.insert(attr_name(name), StrTendril::from(value));
        }
    }
}

fn wrap_in_editable_div(doc: &mut Html, target: NodeId) {
    let Some(wrapper) = adopt_fragment(&mut doc.tree, "<div contenteditable=\"true\"></div>")
    else {
        return;
    };
    if let Some(mut node) = doc.tree.get_mut(target) {
        node.insert_id_before(wrapper);
    }
    if let Some(mut node) = doc.tree.get_mut(wrapper) {
        node.append_id(target);
    }
}

fn append_head_style(doc: &mut Html, css: &str) {
    let Some(style) = adopt_fragment(&mut doc.tree, &format!("<style>{css}</style>")) else {
        return;
    };
    if let Some(head) = ensure_head(doc) {
        if let Some(mut node) = doc.tree.get_mut(head) {
            node.append_id(style);
        }
    }
}

/// Find `<head>`, creating one under the root element if missing. Document
/// parsing always synthesizes a head, so the creation branch only runs for
/// trees built some other way.
fn ensure_head(doc: &mut Html) -> Option<NodeId> {
    if let Some(head) = doc.select(&HEAD).next() {
        return Some(head.id());
    }
    let template = Html::parse_document("");
    let src = template.select(&HEAD).next()?;
    let head = adopt_subtree(&mut doc.tree, *src);
    let root = doc.root_element().id();
    doc.tree.get_mut(root)?.prepend_id(head);
    Some(head)
}

fn wrap_body_content(doc: &mut Html) {
    let Some(body) = doc.select(&BODY).next().map(|el| el.id()) else {
        return;
    };
    let Some(wrapper) = adopt_fragment(&mut doc.tree, "<div class=\"generated-content\"></div>")
    else {
        return;
    };
    if let Some(mut node) = doc.tree.get_mut(wrapper) {
        node.reparent_from_id_append(body);
    }
    if let Some(mut node) = doc.tree.get_mut(body) {
        node.append_id(wrapper);
    }
}
