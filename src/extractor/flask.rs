use crate::extractor::{
    ExtractorConfig, Framework, HttpMethod, RouteExtractor, RouteSite, UNKNOWN_PATH,
};
use crate::parser::ParsedFile;
use crate::syntax::{self, Expr, FunctionSite};
use log::{debug, warn};
use tree_sitter::Node;

/// Verbs Flask exposes as decorator shortcuts (`@app.get("/x")`)
const SHORTCUT_VERBS: &[&str] = &["get", "post", "put", "patch", "delete"];

/// Flask route extractor
///
/// A function is a route site when exactly one of its decorators is a routing call:
/// `@<anything>.route(...)` or one of the verb shortcuts. All other decorators become the
/// site's middlewares, named after their callee.
pub struct FlaskExtractor {
    config: ExtractorConfig,
}

/// How a routing decorator states its methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoutingCall {
    /// `.route(path, methods=[...])`
    Route,
    /// `.get(path)`, `.post(path)`, ...
    Shortcut(HttpMethod),
}

impl RouteExtractor for FlaskExtractor {
    fn framework(&self) -> Framework {
        Framework::Flask
    }

    fn extract_file(&self, parsed_file: &ParsedFile) -> Vec<RouteSite> {
        let source = parsed_file.source.as_str();
        let mut functions = Vec::new();

        syntax::visit_all(&parsed_file.tree.root_node(), |node| {
            if node.kind() == "decorated_definition" {
                if let Some(function) = lower_decorated_function(node, source) {
                    functions.push(function);
                }
            }
        });

        let sites: Vec<RouteSite> = functions
            .iter()
            .filter_map(|function| self.site_from_function(function))
            .collect();

        debug!(
            "Found {} Flask route sites in {}",
            sites.len(),
            parsed_file.path.display()
        );
        sites
    }
}

impl FlaskExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Builds a route site from a decorated function, if it carries exactly one routing
    /// decorator.
    pub fn site_from_function(&self, function: &FunctionSite) -> Option<RouteSite> {
        let routing: Vec<(usize, RoutingCall)> = function
            .decorators
            .iter()
            .enumerate()
            .filter_map(|(idx, decorator)| self.routing_call(decorator).map(|call| (idx, call)))
            .collect();

        let (route_idx, call) = match routing.as_slice() {
            [] => return None,
            [single] => *single,
            _ => {
                warn!(
                    "Skipping {} (line {}): {} routing decorators on one function",
                    function.name,
                    function.line,
                    routing.len()
                );
                return None;
            }
        };
        let decorator = &function.decorators[route_idx];

        let path = decorator
            .arg(0)
            .or_else(|| decorator.keyword("rule"))
            .and_then(Expr::as_str)
            .unwrap_or(UNKNOWN_PATH)
            .to_string();

        let methods = match call {
            RoutingCall::Route => self.declared_methods(decorator, &function.name),
            RoutingCall::Shortcut(method) => vec![method],
        };

        let middlewares = function
            .decorators
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != route_idx)
            .filter_map(|(_, other)| match other.callee_name() {
                Some(name) => Some(name.to_string()),
                None => {
                    debug!("Ignoring unnamed decorator on {}: {:?}", function.name, other);
                    None
                }
            })
            .collect();

        Some(RouteSite {
            handler: function.name.clone(),
            methods,
            path,
            middlewares,
            doc: function.docstring.clone(),
            line: function.line,
        })
    }

    fn routing_call(&self, decorator: &Expr) -> Option<RoutingCall> {
        let attr = decorator.called_attribute()?;
        if attr == self.config.route_attribute {
            return Some(RoutingCall::Route);
        }
        if SHORTCUT_VERBS.contains(&attr) {
            return HttpMethod::parse(attr).map(RoutingCall::Shortcut);
        }
        None
    }

    /// Reads `methods=[...]`, falling back to the default verb when it is absent or not a
    /// literal list.
    fn declared_methods(&self, decorator: &Expr, handler: &str) -> Vec<HttpMethod> {
        let Some(methods) = decorator.keyword("methods") else {
            return vec![self.config.default_method];
        };
        let Some(items) = methods.as_list() else {
            debug!("Non-literal methods on {}, using default verb", handler);
            return vec![self.config.default_method];
        };

        items
            .iter()
            .filter_map(|item| {
                let raw = item.as_str()?;
                let method = HttpMethod::parse(raw);
                if method.is_none() {
                    warn!("Ignoring unknown HTTP method {:?} on {}", raw, handler);
                }
                method
            })
            .collect()
    }
}

/// Lowers a `decorated_definition` wrapping a function into a [`FunctionSite`].
fn lower_decorated_function(node: &Node, source: &str) -> Option<FunctionSite> {
    let definition = node.child_by_field_name("definition")?;
    if definition.kind() != "function_definition" {
        return None;
    }
    let name = syntax::node_text(&definition.child_by_field_name("name")?, source).to_string();

    let decorators = syntax::named_children(node)
        .into_iter()
        .filter(|child| child.kind() == "decorator")
        .map(|decorator| {
            syntax::named_children(&decorator)
                .first()
                .map(|expr| lower_expr(expr, source))
                .unwrap_or(Expr::Other)
        })
        .collect();

    Some(FunctionSite {
        name,
        decorators,
        docstring: docstring(&definition, source),
        line: syntax::node_line(&definition),
    })
}

/// The first statement of a function body, when it is a string literal
fn docstring(function: &Node, source: &str) -> Option<String> {
    let body = function.child_by_field_name("body")?;
    let first = syntax::named_children(&body).into_iter().next()?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = syntax::named_children(&first).into_iter().next()?;
    lower_expr(&expr, source).as_str().map(str::to_string)
}

fn lower_expr(node: &Node, source: &str) -> Expr {
    match node.kind() {
        "identifier" => Expr::Name(syntax::node_text(node, source).to_string()),
        "attribute" => {
            let (Some(object), Some(attr)) = (
                node.child_by_field_name("object"),
                node.child_by_field_name("attribute"),
            ) else {
                return Expr::Other;
            };
            Expr::Attribute {
                value: Box::new(lower_expr(&object, source)),
                attr: syntax::node_text(&attr, source).to_string(),
            }
        }
        "call" => lower_call(node, source),
        "string" => python_string(node, source).map_or(Expr::Other, Expr::Str),
        "concatenated_string" => syntax::named_children(node)
            .iter()
            .map(|part| python_string(part, source))
            .collect::<Option<String>>()
            .map_or(Expr::Other, Expr::Str),
        "list" | "tuple" => Expr::List(
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

fn lower_call(node: &Node, source: &str) -> Expr {
    let Some(function) = node.child_by_field_name("function") else {
        return Expr::Other;
    };

    let mut args = Vec::new();
    let mut keywords = Vec::new();

    if let Some(arguments) = node.child_by_field_name("arguments") {
        if arguments.kind() == "argument_list" {
            for arg in syntax::named_children(&arguments) {
                match arg.kind() {
                    "keyword_argument" => {
                        if let (Some(name), Some(value)) = (
                            arg.child_by_field_name("name"),
                            arg.child_by_field_name("value"),
                        ) {
                            keywords.push((
                                syntax::node_text(&name, source).to_string(),
                                lower_expr(&value, source),
                            ));
                        }
                    }
                    "list_splat" | "dictionary_splat" => {}
                    _ => args.push(lower_expr(&arg, source)),
                }
            }
        }
    }

    Expr::Call {
        func: Box::new(lower_expr(&function, source)),
        args,
        keywords,
    }
}

/// Value of a Python string literal; `None` for f-strings with interpolations.
fn python_string(node: &Node, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }

    let mut raw = false;
    let mut content = String::new();
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        match child.kind() {
            "string_start" => {
                let prefix = syntax::node_text(&child, source);
                raw = prefix.contains(&['r', 'R'][..]);
            }
            "string_content" => content.push_str(syntax::node_text(&child, source)),
            "interpolation" => return None,
            _ => {}
        }
    }

    Some(if raw { content } else { syntax::unescape(&content) })
}
