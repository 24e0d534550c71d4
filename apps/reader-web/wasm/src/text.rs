//! Plain-text document paragraphs in the DOM
//!
//! A document container's element children are its paragraphs, in order.
//! Offsets coming from the engine count Unicode scalar values; DOM text nodes
//! are indexed in UTF-16 code units, so every split goes through
//! [`utf16_offset`].

use crate::canvas::smooth_scroll;
use crate::console;
use highlight_core::{TextBlock, TextContainer};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Node, ScrollLogicalPosition, Text};

/// UTF-16 index of the `char_offset`-th scalar value in `text`
///
/// Offsets past the end clamp to the UTF-16 length of `text`.
pub fn utf16_offset(text: &str, char_offset: usize) -> u32 {
    text.chars()
        .take(char_offset)
        .map(char::len_utf16)
        .sum::<usize>() as u32
}

/// Text nodes under `root` in document order
fn text_nodes(root: &Node) -> Vec<Text> {
    let mut found = Vec::new();
    let children = root.child_nodes();
    for i in 0..children.length() {
        let Some(child) = children.get(i) else {
            continue;
        };
        if child.node_type() == Node::TEXT_NODE {
            if let Ok(text) = child.dyn_into::<Text>() {
                found.push(text);
            }
        } else if child.node_type() == Node::ELEMENT_NODE {
            found.extend(text_nodes(&child));
        }
    }
    found
}

/// One paragraph element
#[derive(Debug, Clone)]
pub struct DomParagraph {
    document: Document,
    element: Element,
}

impl DomParagraph {
    pub fn new(document: Document, element: Element) -> Self {
        Self { document, element }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    fn try_wrap(&self, start: usize, end: usize, class: &str) -> Result<bool, JsValue> {
        let mut consumed = 0;
        let mut wrapped = false;

        for node in text_nodes(&self.element) {
            if consumed >= end {
                break;
            }
            let data = node.data();
            let node_start = consumed;
            consumed += data.chars().count();

            let from = start.max(node_start);
            let to = end.min(consumed);
            if from >= to {
                continue;
            }

            let local_from = utf16_offset(&data, from - node_start);
            let local_to = utf16_offset(&data, to - node_start);
            let node_len = utf16_offset(&data, usize::MAX);

            let middle = if local_from > 0 {
                node.split_text(local_from)?
            } else {
                node
            };
            if local_to < node_len {
                middle.split_text(local_to - local_from)?;
            }

            let Some(parent) = middle.parent_node() else {
                continue;
            };
            let mark = self.document.create_element("mark")?;
            mark.set_class_name(class);
            parent.replace_child(&mark, &middle)?;
            mark.append_child(&middle)?;
            wrapped = true;
        }

        Ok(wrapped)
    }
}

impl TextBlock for DomParagraph {
    type Snapshot = String;

    fn text_len(&self) -> usize {
        self.element
            .text_content()
            .map(|text| text.chars().count())
            .unwrap_or(0)
    }

    fn snapshot(&self) -> String {
        self.element.inner_html()
    }

    fn restore(&self, snapshot: &String) {
        self.element.set_inner_html(snapshot);
    }

    fn wrap_range(&self, start: usize, end: usize, class: &str) -> bool {
        match self.try_wrap(start, end, class) {
            Ok(wrapped) => wrapped,
            Err(e) => {
                console::warn(&format!("Failed to wrap text range {}..{}", start, end), &e);
                false
            }
        }
    }

    fn scroll_into_view(&self) {
        self.element
            .scroll_into_view_with_scroll_into_view_options(&smooth_scroll(
                ScrollLogicalPosition::Center,
            ));
    }
}

/// The element whose children are the document's paragraphs
#[derive(Debug, Clone)]
pub struct DomContainer {
    document: Document,
    element: Element,
}

impl DomContainer {
    pub fn new(document: Document, element: Element) -> Self {
        Self { document, element }
    }

    /// Look up a container element by id
    ///
    /// # Errors
    /// Returns JsValue error if no element has that id
    pub fn by_id(document: &Document, id: &str) -> Result<Self, JsValue> {
        let element = document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("Document container '{}' not found", id)))?;
        Ok(Self::new(document.clone(), element))
    }
}

impl TextContainer for DomContainer {
    type Block = DomParagraph;

    fn blocks(&self) -> Vec<DomParagraph> {
        let children = self.element.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .map(|element| DomParagraph::new(self.document.clone(), element))
            .collect()
    }
}
