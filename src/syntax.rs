//! Language-neutral model of the source constructs route detection cares about.
//!
//! Extractors lower tree-sitter nodes into these owned variants right after parsing, then
//! match on them instead of probing node kinds and fields all over the place. Anything the
//! model does not cover lowers to [`Expr::Other`].

use tree_sitter::Node;

/// An expression found on a decorator or in a router call's argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Bare identifier: `login_required`
    Name(String),
    /// Attribute access: `app.route`, `limiter.limit`
    Attribute { value: Box<Expr>, attr: String },
    /// Call with positional and keyword arguments: `app.route("/x", methods=["GET"])`
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<(String, Expr)>,
    },
    /// String literal with escapes resolved
    Str(String),
    /// List, tuple or array literal
    List(Vec<Expr>),
    /// Any construct without a variant (lambdas, f-strings, numbers, ...)
    Other,
}

impl Expr {
    /// The string value, if this is a plain string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Expr]> {
        match self {
            Expr::List(items) => Some(items),
            _ => None,
        }
    }

    /// Resolves the name a decorator or middleware is known by.
    ///
    /// A bare name is itself, an attribute access is its final attribute, and a call is
    /// named after the thing being called. Arguments are discarded.
    pub fn callee_name(&self) -> Option<&str> {
        match self {
            Expr::Name(name) => Some(name),
            Expr::Attribute { attr, .. } => Some(attr),
            Expr::Call { func, .. } => func.callee_name(),
            _ => None,
        }
    }

    /// The terminal attribute of a call's callee: `"route"` for `app.route(...)`.
    pub fn called_attribute(&self) -> Option<&str> {
        match self {
            Expr::Call { func, .. } => match func.as_ref() {
                Expr::Attribute { attr, .. } => Some(attr),
                _ => None,
            },
            _ => None,
        }
    }

    /// Positional argument `index` of a call.
    pub fn arg(&self, index: usize) -> Option<&Expr> {
        match self {
            Expr::Call { args, .. } => args.get(index),
            _ => None,
        }
    }

    /// Keyword argument `name` of a call.
    pub fn keyword(&self, name: &str) -> Option<&Expr> {
        match self {
            Expr::Call { keywords, .. } => keywords
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

/// A function definition together with everything attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSite {
    pub name: String,
    /// Decorators in source order, top to bottom
    pub decorators: Vec<Expr>,
    pub docstring: Option<String>,
    /// One-based line of the definition
    pub line: usize,
}

/// Get text content of a node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// One-based line a node starts on
pub fn node_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Named children of a node, skipping comments
pub fn named_children<'tree>(node: &Node<'tree>) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Visit all nodes in a tree in pre-order (iterative to avoid stack overflow)
pub fn visit_all<F>(node: &Node, mut visitor: F)
where
    F: FnMut(&Node),
{
    let mut cursor = node.walk();
    let mut did_visit_children = false;

    loop {
        if !did_visit_children {
            visitor(&cursor.node());

            if cursor.goto_first_child() {
                continue;
            }
        }

        if cursor.goto_next_sibling() {
            did_visit_children = false;
            continue;
        }

        if !cursor.goto_parent() {
            break;
        }
        did_visit_children = true;
    }
}

/// Resolve the common backslash escapes of a quoted literal body
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\n') => {}
            Some(other @ ('\\' | '\'' | '"' | '`' | '/')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}
