// src/page/template.rs
// =============================================================================
// A small mustache-style template engine for the redirect page.
//
// Supported tags:
//   {{name}}              value, HTML-escaped
//   {{{name}}} {{& name}} value, raw
//   {{#name}}..{{/name}}  block rendered when name has a non-empty value
//   {{^name}}..{{/name}}  block rendered when name is missing or empty
//   {{! comment }}        dropped
//
// The template is parsed once into a tree and rendered per page, so a
// malformed template fails the build before any page is written.
// =============================================================================

use std::collections::HashMap;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Var { name: String, escape: bool },
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

/// Values available to a template; missing keys render empty
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: HashMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// Sets `key` when there is a value, leaves it missing otherwise
    pub fn set_opt(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, Error> {
        // Open sections: (name, inverted, nodes collected before the section)
        let mut stack: Vec<(String, bool, Vec<Node>)> = Vec::new();
        let mut nodes = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                nodes.push(Node::Text(rest[..start].to_string()));
            }

            let after = &rest[start + 2..];
            let (tag, raw, remaining) = if let Some(inner) = after.strip_prefix('{') {
                let end = inner
                    .find("}}}")
                    .ok_or_else(|| Error::Template("unclosed '{{{' tag".to_string()))?;
                (inner[..end].trim(), true, &inner[end + 3..])
            } else {
                let end = after
                    .find("}}")
                    .ok_or_else(|| Error::Template("unclosed '{{' tag".to_string()))?;
                (after[..end].trim(), false, &after[end + 2..])
            };
            rest = remaining;

            if raw {
                nodes.push(Node::Var {
                    name: tag.to_string(),
                    escape: false,
                });
                continue;
            }

            match tag.chars().next() {
                Some('!') => {}
                Some(c @ ('#' | '^')) => {
                    let name = tag[1..].trim().to_string();
                    stack.push((name, c == '^', std::mem::take(&mut nodes)));
                }
                Some('/') => {
                    let name = tag[1..].trim();
                    let (open, inverted, parent) = stack.pop().ok_or_else(|| {
                        Error::Template(format!("closing tag '{}' without a section", name))
                    })?;
                    if open != name {
                        return Err(Error::Template(format!(
                            "section '{}' closed by '{}'",
                            open, name
                        )));
                    }
                    let children = std::mem::replace(&mut nodes, parent);
                    nodes.push(Node::Section {
                        name: open,
                        inverted,
                        children,
                    });
                }
                Some('&') => nodes.push(Node::Var {
                    name: tag[1..].trim().to_string(),
                    escape: false,
                }),
                _ => nodes.push(Node::Var {
                    name: tag.to_string(),
                    escape: true,
                }),
            }
        }

        if let Some((name, _, _)) = stack.last() {
            return Err(Error::Template(format!("section '{}' is never closed", name)));
        }
        if !rest.is_empty() {
            nodes.push(Node::Text(rest.to_string()));
        }

        Ok(Template { nodes })
    }

    pub fn render(&self, context: &Context) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, context, &mut out);
        out
    }
}

fn render_nodes(nodes: &[Node], context: &Context, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var { name, escape } => {
                if let Some(value) = context.get(name) {
                    if *escape {
                        escape_html_into(value, out);
                    } else {
                        out.push_str(value);
                    }
                }
            }
            Node::Section {
                name,
                inverted,
                children,
            } => {
                if context.is_truthy(name) != *inverted {
                    render_nodes(children, context, out);
                }
            }
        }
    }
}

fn escape_html_into(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
}
