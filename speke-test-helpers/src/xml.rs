/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Element tag frequency tables for CPIX documents
//!
//! Tags are reported in Clark notation: `{urn:dashif:org:cpix}ContentKey` for namespaced
//! elements, the bare local name otherwise. Whole documents are streamed with [`element_tags`];
//! already parsed [`roxmltree`] nodes can be counted one level deep with
//! [`count_child_element_tags_for_element`].

use std::collections::BTreeMap;
use thiserror::Error;
use xmlparser::{ElementEnd, Token, Tokenizer};

/// Qualified tag name -> number of elements with that name
pub type TagCounts = BTreeMap<String, usize>;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum XmlError {
    #[error("malformed xml")]
    Syntax(#[from] xmlparser::Error),
    #[error("namespace prefix `{prefix}` of element `{prefix}:{local}` is not bound")]
    UnboundPrefix { prefix: String, local: String },
    #[error("closing tag `{found}` does not match open element `{expected}`")]
    MismatchedClose { expected: String, found: String },
    #[error("closing tag `{found}` has no open element")]
    UnexpectedClose { found: String },
    #[error("element `{name}` is never closed")]
    UnclosedElement { name: String },
    #[error("document has no root element")]
    NoRootElement,
    #[error("document has more than one root element")]
    MultipleRootElements,
    #[error("unsupported selector `{0}`, expected `./{{ns}}Name` or `.//{{ns}}Name`")]
    UnsupportedSelector(String),
}

fn raw_name(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

fn clark_name(namespace: Option<&str>, local: &str) -> String {
    match namespace {
        Some(namespace) if !namespace.is_empty() => format!("{{{}}}{}", namespace, local),
        _ => local.to_string(),
    }
}

/// Element start tag whose attributes are still being read
struct StartTag<'a> {
    prefix: &'a str,
    local: &'a str,
    // (prefix, namespace); the default namespace has an empty prefix
    namespaces: Vec<(&'a str, &'a str)>,
}

struct OpenElement<'a> {
    prefix: &'a str,
    local: &'a str,
    name: String,
    namespaces: Vec<(&'a str, &'a str)>,
}

/// Stream the qualified tag of every element in `xml`
///
/// One item is produced per element, when the element ends, so children are reported before
/// their parents. Iteration stops after the first error.
pub fn element_tags(xml: &str) -> ElementTags<'_> {
    ElementTags {
        tokenizer: Tokenizer::from(xml),
        start: None,
        open: Vec::new(),
        seen_root: false,
        done: false,
    }
}

/// Iterator returned by [`element_tags`]
pub struct ElementTags<'a> {
    tokenizer: Tokenizer<'a>,
    start: Option<StartTag<'a>>,
    open: Vec<OpenElement<'a>>,
    seen_root: bool,
    done: bool,
}

impl<'a> ElementTags<'a> {
    fn lookup(&self, start: &StartTag<'a>, prefix: &str) -> Option<&'a str> {
        start
            .namespaces
            .iter()
            .rev()
            .chain(
                self.open
                    .iter()
                    .rev()
                    .flat_map(|element| element.namespaces.iter().rev()),
            )
            .find(|(bound, _)| *bound == prefix)
            .map(|(_, namespace)| *namespace)
    }

    fn resolve(&self, start: &StartTag<'a>) -> Result<String, XmlError> {
        let namespace = match start.prefix {
            "" => self.lookup(start, ""),
            "xml" => Some(XML_NAMESPACE),
            prefix => Some(self.lookup(start, prefix).ok_or_else(|| {
                XmlError::UnboundPrefix {
                    prefix: prefix.to_string(),
                    local: start.local.to_string(),
                }
            })?),
        };
        Ok(clark_name(namespace, start.local))
    }

    fn step(&mut self, token: Token<'a>) -> Result<Option<String>, XmlError> {
        match token {
            Token::ElementStart { prefix, local, .. } => {
                if self.open.is_empty() && self.seen_root {
                    return Err(XmlError::MultipleRootElements);
                }
                self.seen_root = true;
                self.start = Some(StartTag {
                    prefix: prefix.as_str(),
                    local: local.as_str(),
                    namespaces: Vec::new(),
                });
            }
            Token::Attribute {
                prefix,
                local,
                value,
                ..
            } => {
                if let Some(start) = self.start.as_mut() {
                    match (prefix.as_str(), local.as_str()) {
                        ("xmlns", bound) => start.namespaces.push((bound, value.as_str())),
                        ("", "xmlns") => start.namespaces.push(("", value.as_str())),
                        _ => {}
                    }
                }
            }
            Token::ElementEnd {
                end: ElementEnd::Open,
                ..
            } => {
                if let Some(start) = self.start.take() {
                    let name = self.resolve(&start)?;
                    self.open.push(OpenElement {
                        prefix: start.prefix,
                        local: start.local,
                        name,
                        namespaces: start.namespaces,
                    });
                }
            }
            Token::ElementEnd {
                end: ElementEnd::Empty,
                ..
            } => {
                if let Some(start) = self.start.take() {
                    return self.resolve(&start).map(Some);
                }
            }
            Token::ElementEnd {
                end: ElementEnd::Close(prefix, local),
                ..
            } => {
                let found = raw_name(prefix.as_str(), local.as_str());
                let element = self
                    .open
                    .pop()
                    .ok_or_else(|| XmlError::UnexpectedClose {
                        found: found.clone(),
                    })?;
                if element.prefix != prefix.as_str() || element.local != local.as_str() {
                    return Err(XmlError::MismatchedClose {
                        expected: raw_name(element.prefix, element.local),
                        found,
                    });
                }
                return Ok(Some(element.name));
            }
            _ => {}
        }
        Ok(None)
    }

    fn finish(&self) -> Result<(), XmlError> {
        if let Some(element) = self.open.last() {
            return Err(XmlError::UnclosedElement {
                name: raw_name(element.prefix, element.local),
            });
        }
        if !self.seen_root {
            return Err(XmlError::NoRootElement);
        }
        Ok(())
    }
}

impl<'a> Iterator for ElementTags<'a> {
    type Item = Result<String, XmlError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let token = match self.tokenizer.next() {
                Some(Ok(token)) => token,
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err.into()));
                }
                None => {
                    self.done = true;
                    return self.finish().err().map(Err);
                }
            };
            match self.step(token) {
                Ok(Some(name)) => return Some(Ok(name)),
                Ok(None) => continue,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Count every element of the document by qualified tag
pub fn count_tags(xml: &str) -> Result<TagCounts, XmlError> {
    let mut counts = TagCounts::new();
    for tag in element_tags(xml) {
        *counts.entry(tag?).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Qualified tag of a parsed element
pub fn qualified_name(node: roxmltree::Node<'_, '_>) -> String {
    let tag = node.tag_name();
    clark_name(tag.namespace(), tag.name())
}

/// Count the immediate element children of `parent` by qualified tag
///
/// Grandchildren are not visited.
pub fn count_child_element_tags_for_element(parent: roxmltree::Node<'_, '_>) -> TagCounts {
    let mut counts = TagCounts::new();
    for child in parent.children().filter(|child| child.is_element()) {
        *counts.entry(qualified_name(child)).or_insert(0) += 1;
    }
    counts
}

/// Find the elements matching `selector` below `node`
///
/// `./{ns}Name` matches element children, `.//{ns}Name` matches all element descendants.
/// `*` in place of the name matches any element.
pub fn select<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    selector: &str,
) -> Result<Vec<roxmltree::Node<'a, 'input>>, XmlError> {
    let (descendants, name) = if let Some(name) = selector.strip_prefix(".//") {
        (true, name)
    } else if let Some(name) = selector.strip_prefix("./") {
        (false, name)
    } else {
        return Err(XmlError::UnsupportedSelector(selector.to_string()));
    };
    let local = match name.strip_prefix('{') {
        Some(rest) => rest.split_once('}').map(|(_, local)| local),
        None => Some(name),
    };
    match local {
        Some(local)
            if !local.is_empty() && !local.contains(|c| matches!(c, '/' | '[' | '@' | '{')) => {}
        _ => return Err(XmlError::UnsupportedSelector(selector.to_string())),
    }

    let matches = |candidate: &roxmltree::Node<'_, '_>| {
        candidate.is_element() && (name == "*" || qualified_name(*candidate) == name)
    };
    Ok(if descendants {
        node.descendants().skip(1).filter(matches).collect()
    } else {
        node.children().filter(matches).collect()
    })
}
