use crate::extractor::{
    ExtractorConfig, Framework, HttpMethod, RouteExtractor, RouteSite, UNKNOWN_PATH,
};
use crate::parser::ParsedFile;
use crate::syntax::{self, Expr};
use log::debug;
use tree_sitter::Node;

/// Router methods that declare a route
const EXPRESS_VERBS: &[&str] = &["get", "post", "put", "patch", "delete", "head", "options"];

/// Handler name recorded for inline arrow functions and function expressions
const ANONYMOUS_HANDLER: &str = "<anonymous>";

/// Express route extractor
///
/// Understands both declaration styles:
///
/// ```javascript
/// /** List users */
/// router.get("/users", auth, listUsers);
///
/// router.route("/users/:id")
///   /** Fetch one */
///   .get(loadUser)
///   /** Replace one */
///   .put(auth, saveUser);
/// ```
///
/// In the chained style each verb only sees the `/** */` block written directly in front of
/// its own `.verb`, so documentation never leaks between siblings. Links that are not verbs
/// (`.all(auth)`) are stepped over. The name of the chain's root call comes from
/// [`ExtractorConfig::route_attribute`].
pub struct ExpressExtractor {
    config: ExtractorConfig,
}

impl ExpressExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

/// A `/** ... */` comment with its byte range
#[derive(Debug, Clone)]
struct DocComment {
    start: usize,
    end: usize,
    text: String,
}

impl RouteExtractor for ExpressExtractor {
    fn framework(&self) -> Framework {
        Framework::Express
    }

    fn extract_file(&self, parsed_file: &ParsedFile) -> Vec<RouteSite> {
        let source = parsed_file.source.as_str();
        let root = parsed_file.tree.root_node();
        let comments = collect_doc_comments(&root, source);

        let mut sites: Vec<(usize, RouteSite)> = Vec::new();
        syntax::visit_all(&root, |node| {
            if node.kind() == "call_expression" {
                if let Some(found) = route_site(node, source, &comments, &self.config) {
                    sites.push(found);
                }
            }
        });

        // the walk reaches outer calls of a chain first; report in source order instead
        sites.sort_by_key(|(verb_start, _)| *verb_start);

        debug!(
            "Found {} Express route sites in {}",
            sites.len(),
            parsed_file.path.display()
        );
        sites.into_iter().map(|(_, site)| site).collect()
    }
}

/// Recognizes `X.verb(...)` calls and returns the site keyed by the verb token's offset.
fn route_site(
    call: &Node,
    source: &str,
    comments: &[DocComment],
    config: &ExtractorConfig,
) -> Option<(usize, RouteSite)> {
    let function = call.child_by_field_name("function")?;
    if function.kind() != "member_expression" {
        return None;
    }
    let property = function.child_by_field_name("property")?;
    let verb = syntax::node_text(&property, source);
    if !EXPRESS_VERBS.contains(&verb) {
        return None;
    }
    let method = HttpMethod::parse(verb)?;
    let object = function.child_by_field_name("object")?;
    let args = call
        .child_by_field_name("arguments")
        .map(|arguments| lower_arguments(&arguments, source))
        .unwrap_or_default();

    let (path, callbacks, doc) = match chain_path(&object, source, &config.route_attribute) {
        Some(path) => {
            // router.route(path).verb(...handlers)
            let doc = doc_between(comments, object.end_byte(), property.start_byte());
            (path, args.as_slice(), doc)
        }
        None => {
            // X.verb(path, ...middlewares, handler)
            if args.len() < 2 {
                return None;
            }
            let path = args[0].as_str().filter(|p| is_route_path(p))?.to_string();
            let statement = enclosing_statement(call);
            let doc = doc_before(comments, source, statement.start_byte());
            (path, &args[1..], doc)
        }
    };

    let (handler, middleware_args) = match callbacks.split_last() {
        Some((handler, rest)) => (handler.callee_name().unwrap_or(ANONYMOUS_HANDLER), rest),
        None => (ANONYMOUS_HANDLER, callbacks),
    };

    let site = RouteSite {
        handler: handler.to_string(),
        methods: vec![method],
        path,
        middlewares: middleware_names(middleware_args),
        doc,
        line: syntax::node_line(&property),
    };
    Some((property.start_byte(), site))
}

/// Follows call links (`.get(...)`, `.all(...)`) down to the `.route(path)` root (named by
/// `route_attribute`), returning its path. `None` when the chain bottoms out in anything but that call.
fn chain_path(node: &Node, source: &str, route_attribute: &str) -> Option<String> {
    let mut current = *node;
    loop {
        if current.kind() != "call_expression" {
            return None;
        }
        let function = current.child_by_field_name("function")?;
        if function.kind() != "member_expression" {
            return None;
        }
        let property = syntax::node_text(&function.child_by_field_name("property")?, source);

        if property == route_attribute {
            let path = current
                .child_by_field_name("arguments")
                .map(|arguments| lower_arguments(&arguments, source))
                .and_then(|args| args.first().and_then(Expr::as_str).map(str::to_string))
                .unwrap_or_else(|| UNKNOWN_PATH.to_string());
            return Some(path);
        }
        current = function.child_by_field_name("object")?;
    }
}

fn is_route_path(path: &str) -> bool {
    path.starts_with('/') || path == "*"
}

/// Names of middleware arguments; arrays are flattened, inline functions are skipped.
fn middleware_names(args: &[Expr]) -> Vec<String> {
    let mut names = Vec::new();
    for arg in args {
        match arg {
            Expr::List(items) => names.extend(middleware_names(items)),
            other => {
                if let Some(name) = other.callee_name() {
                    names.push(name.to_string());
                }
            }
        }
    }
    names
}

/// The statement a call belongs to, for locating the doc block in front of it
fn enclosing_statement<'tree>(node: &Node<'tree>) -> Node<'tree> {
    let mut current = *node;
    while let Some(parent) = current.parent() {
        if matches!(parent.kind(), "program" | "statement_block" | "switch_case") {
            break;
        }
        current = parent;
    }
    current
}

fn collect_doc_comments(root: &Node, source: &str) -> Vec<DocComment> {
    let mut comments = Vec::new();
    syntax::visit_all(root, |node| {
        if node.kind() == "comment" {
            let text = syntax::node_text(node, source);
            if text.starts_with("/**") {
                comments.push(DocComment {
                    start: node.start_byte(),
                    end: node.end_byte(),
                    text: clean_jsdoc(text),
                });
            }
        }
    });
    comments.sort_by_key(|comment| comment.start);
    comments
}

/// The last doc block lying entirely inside `[from, to)`
fn doc_between(comments: &[DocComment], from: usize, to: usize) -> Option<String> {
    comments
        .iter()
        .filter(|comment| comment.start >= from && comment.end <= to)
        .last()
        .map(|comment| comment.text.clone())
}

/// The doc block ending right before `offset`, separated from it only by whitespace
fn doc_before(comments: &[DocComment], source: &str, offset: usize) -> Option<String> {
    let comment = comments.iter().filter(|comment| comment.end <= offset).last()?;
    let gap = source.get(comment.end..offset)?;
    if gap.trim().is_empty() {
        Some(comment.text.clone())
    } else {
        None
    }
}

/// Strips the `/**`, `*/` and leading `*` decoration from a JSDoc block
fn clean_jsdoc(text: &str) -> String {
    let inner = text
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");

    inner
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('*').unwrap_or(line).trim()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn lower_arguments(arguments: &Node, source: &str) -> Vec<Expr> {
    syntax::named_children(arguments)
        .iter()
        .filter(|arg| arg.kind() != "spread_element")
        .map(|arg| lower_expr(arg, source))
        .collect()
}

fn lower_expr(node: &Node, source: &str) -> Expr {
    match node.kind() {
        "identifier" => Expr::Name(syntax::node_text(node, source).to_string()),
        "member_expression" => {
            let (Some(object), Some(property)) = (
                node.child_by_field_name("object"),
                node.child_by_field_name("property"),
            ) else {
                return Expr::Other;
            };
            Expr::Attribute {
                value: Box::new(lower_expr(&object, source)),
                attr: syntax::node_text(&property, source).to_string(),
            }
        }
        "call_expression" => {
            let Some(function) = node.child_by_field_name("function") else {
                return Expr::Other;
            };
            Expr::Call {
                func: Box::new(lower_expr(&function, source)),
                args: node
                    .child_by_field_name("arguments")
                    .map(|arguments| lower_arguments(&arguments, source))
                    .unwrap_or_default(),
                keywords: Vec::new(),
            }
        }
        "string" | "template_string" => js_string(node, source).map_or(Expr::Other, Expr::Str),
        "array" => Expr::List(
            syntax::named_children(node)
                .iter()
                .map(|item| lower_expr(item, source))
                .collect(),
        ),
        "parenthesized_expression" => syntax::named_children(node)
            .first()
            .map_or(Expr::Other, |inner| lower_expr(inner, source)),
        _ => Expr::Other,
    }
}

/// Value of a quoted or template string; `None` when a template has substitutions.
fn js_string(node: &Node, source: &str) -> Option<String> {
    if node.kind() == "template_string" {
        let parts = syntax::named_children(node);
        if parts.iter().any(|part| part.kind() == "template_substitution") {
            return None;
        }
        let raw = syntax::node_text(node, source);
        let body = raw.strip_prefix('`')?.strip_suffix('`')?;
        return Some(syntax::unescape(body));
    }

    let mut value = String::new();
    for part in syntax::named_children(node) {
        match part.kind() {
            "string_fragment" => value.push_str(syntax::node_text(&part, source)),
            "escape_sequence" => value.push_str(&syntax::unescape(syntax::node_text(&part, source))),
            "template_substitution" => return None,
            _ => {}
        }
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AstParser;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn parse_code(code: &str) -> ParsedFile {
        AstParser::new(Framework::Express)
            .unwrap()
            .parse_source(Path::new("app.js"), code.to_string())
            .expect("Failed to parse test code")
    }

    fn extract(code: &str) -> Vec<RouteSite> {
        ExpressExtractor::new(ExtractorConfig::default()).extract_sites(&[parse_code(code)])
    }

    #[test]
    fn test_basic_routes_and_middlewares() {
        let sites = extract(
            r#"
const express = require('express');
const app = express();

function auth(req, res, next) { next(); }
function getUsers(req, res) { res.send('Users'); }

app.get("/users", auth, getUsers);
app.post("/login", (req, res) => res.send('Login'));
"#,
        );

        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].path, "/users");
        assert_eq!(sites[0].methods, vec![HttpMethod::Get]);
        assert_eq!(sites[0].middlewares, vec!["auth"]);
        assert_eq!(sites[0].handler, "getUsers");

        assert_eq!(sites[1].path, "/login");
        assert_eq!(sites[1].methods, vec![HttpMethod::Post]);
        assert!(sites[1].middlewares.is_empty());
        assert_eq!(sites[1].handler, ANONYMOUS_HANDLER);
    }

    #[test]
    fn test_parameterized_and_array_middlewares() {
        let sites = extract(
            r#"
router.delete('/users/:id', rateLimit({ max: 5 }), [auth.required, validate], controller.remove);
"#,
        );

        assert_eq!(sites[0].middlewares, vec!["rateLimit", "required", "validate"]);
        assert_eq!(sites[0].handler, "remove");
        assert_eq!(sites[0].methods, vec![HttpMethod::Delete]);
    }

    #[test]
    fn test_jsdoc_before_statement() {
        let sites = extract(
            r#"
/**
 * List users
 * @tag Users
 */
app.get('/users', listUsers);

/** Orphaned block */
const x = 1;
app.get('/other', other);

// line comments are not docs
app.get('/third', third);
"#,
        );

        assert_eq!(sites[0].doc.as_deref(), Some("\nList users\n@tag Users\n"));
        assert_eq!(sites[1].doc, None);
        assert_eq!(sites[2].doc, None);
    }

    #[test]
    fn test_non_route_calls_are_ignored() {
        let sites = extract(
            r#"
app.get('env');
cache.get(key, fallback);
headers.get("content-type", other);
app.use('/api', router);
app.listen(3000);
"#,
        );

        assert!(sites.is_empty());
    }

    #[test]
    fn test_chained_route_style_keeps_docs_per_verb() {
        let sites = extract(
            r#"
router.route('/books/:id')
  /**
   * Fetch a book
   * @tag Books
   */
  .get(loadBook)
  .put(auth, saveBook)
  /** Remove a book */
  .delete(auth, removeBook);
"#,
        );

        assert_eq!(sites.len(), 3);
        let methods: Vec<HttpMethod> = sites.iter().map(|s| s.methods[0]).collect();
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Put, HttpMethod::Delete]);
        assert!(sites.iter().all(|s| s.path == "/books/:id"));

        assert!(sites[0].doc.as_deref().unwrap().contains("Fetch a book"));
        assert_eq!(sites[1].doc, None);
        assert!(sites[2].doc.as_deref().unwrap().contains("Remove a book"));

        assert!(sites[0].middlewares.is_empty());
        assert_eq!(sites[1].middlewares, vec!["auth"]);
        assert_eq!(sites[2].handler, "removeBook");
    }

    #[test]
    fn test_chained_route_steps_over_non_verb_links() {
        let sites = extract(
            r#"
router.route('/books/:id')
  .all(auth)
  /** Fetch a book */
  .get(loadBook)
  .put(saveBook);
"#,
        );

        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].methods, vec![HttpMethod::Get]);
        assert_eq!(sites[1].methods, vec![HttpMethod::Put]);
        assert!(sites.iter().all(|s| s.path == "/books/:id"));
        assert_eq!(sites[0].doc.as_deref(), Some("Fetch a book"));
        assert_eq!(sites[0].handler, "loadBook");
        assert_eq!(sites[1].doc, None);
        assert_eq!(sites[1].handler, "saveBook");
    }

    #[test]
    fn test_chain_root_name_comes_from_config() {
        let code = "router.path('/books').get(listBooks);";
        let config = ExtractorConfig {
            route_attribute: "path".to_string(),
            ..ExtractorConfig::default()
        };

        let sites = ExpressExtractor::new(config).extract_sites(&[parse_code(code)]);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].path, "/books");

        assert!(extract(code).is_empty());
    }

    #[test]
    fn test_express_router_and_nested_registration() {
        let sites = extract(
            r#"
const router = express.Router();

function register(app) {
  app.patch(`/profile`, auth, update);
}

module.exports = router.get("/profile", (req, res) => res.send('Profile'));
"#,
        );

        let paths: Vec<&str> = sites.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["/profile", "/profile"]);
        assert_eq!(sites[0].methods, vec![HttpMethod::Patch]);
        assert_eq!(sites[1].methods, vec![HttpMethod::Get]);
    }

    #[test]
    fn test_template_with_substitution_is_not_a_path() {
        let sites = extract("app.get(`${base}/x`, handler);");
        assert!(sites.is_empty());
    }

    #[test]
    fn test_clean_jsdoc() {
        assert_eq!(clean_jsdoc("/** One liner */"), "One liner");
        assert_eq!(
            clean_jsdoc("/**\n   * First\n   * @returns {object} 200 - OK\n   */"),
            "\nFirst\n@returns {object} 200 - OK\n"
        );
    }
}
