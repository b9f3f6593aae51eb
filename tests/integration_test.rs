use pretty_assertions::assert_eq;
use route_docgen::{
    backend::{Backend, SourceBackend},
    detector::FrameworkDetector,
    extract_routes,
    renderer::{render_markdown, serialize_json, serialize_yaml},
    Framework, HttpMethod, MetadataValue, Parameter, ParameterLocation, ReturnEntry,
    RouteRecord,
};
use tempfile::TempDir;

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn find<'a>(routes: &'a [RouteRecord], method: HttpMethod, path: &str) -> &'a RouteRecord {
    routes
        .iter()
        .find(|r| r.method == method && r.path == path)
        .unwrap_or_else(|| panic!("missing route {} {}", method, path))
}

fn params(record: &RouteRecord) -> &[Parameter] {
    record
        .metadata
        .get("param")
        .and_then(MetadataValue::as_params)
        .unwrap_or(&[])
}

fn text(value: &str) -> MetadataValue {
    MetadataValue::Text(value.to_string())
}

#[test]
fn test_flask_end_to_end_extraction() {
    let flask_code = include_str!("fixtures/flask_app.py");
    let temp_dir = create_test_project(vec![("app/app.py", flask_code)]);

    let detection = FrameworkDetector::detect(temp_dir.path()).expect("Failed to detect");
    assert_eq!(detection.frameworks, vec![Framework::Flask]);

    let routes = extract_routes(temp_dir.path(), Framework::Flask).expect("Failed to extract");

    let summary: Vec<(HttpMethod, &str)> =
        routes.iter().map(|r| (r.method, r.path.as_str())).collect();
    assert_eq!(
        summary,
        vec![
            (HttpMethod::Get, "/health"),
            (HttpMethod::Get, "/users"),
            (HttpMethod::Post, "/users"),
            (HttpMethod::Get, "/users/{user_id}"),
            (HttpMethod::Delete, "/tokens/{token}"),
            (HttpMethod::Post, "/reports/{report_id}"),
        ]
    );

    // A route with no documentation still gets a record
    let health = find(&routes, HttpMethod::Get, "/health");
    assert_eq!(health.description, "");
    assert!(health.middlewares.is_empty());
    assert!(health.metadata.is_empty());
}

#[test]
fn test_flask_methods_share_documentation() {
    let temp_dir = create_test_project(vec![("app.py", include_str!("fixtures/flask_app.py"))]);
    let routes = extract_routes(temp_dir.path(), Framework::Flask).unwrap();

    let get = find(&routes, HttpMethod::Get, "/users");
    let post = find(&routes, HttpMethod::Post, "/users");

    assert_eq!(get.description, "List or create users");
    assert_eq!(get.description, post.description);
    assert_eq!(get.metadata, post.metadata);
    assert_eq!(get.metadata["tag"], text("Users"));
}

#[test]
fn test_flask_typed_path_parameter_with_docs() {
    let temp_dir = create_test_project(vec![("app.py", include_str!("fixtures/flask_app.py"))]);
    let routes = extract_routes(temp_dir.path(), Framework::Flask).unwrap();

    let record = find(&routes, HttpMethod::Get, "/users/{user_id}");
    assert_eq!(record.description, "Get a user by id");
    assert_eq!(record.middlewares, vec!["login_required"]);

    assert_eq!(
        params(record),
        &[
            Parameter {
                description: "User ID".to_string(),
                ..Parameter::path("user_id", "integer")
            },
            Parameter {
                name: "verbose".to_string(),
                location: ParameterLocation::Query,
                param_type: "boolean".to_string(),
                required: false,
                description: "Include profile details".to_string(),
                format: None,
            },
        ]
    );

    assert_eq!(
        record.metadata["tag"],
        MetadataValue::List(vec!["Users".to_string(), "Authentication".to_string()])
    );
    assert_eq!(
        record.metadata["returns"],
        MetadataValue::Returns(vec![
            ReturnEntry {
                return_type: "User".to_string(),
                status_code: 200,
                description: "Success".to_string(),
            },
            ReturnEntry {
                return_type: "Error".to_string(),
                status_code: 404,
                description: "Not found".to_string(),
            },
        ])
    );
}

#[test]
fn test_flask_malformed_tags_are_dropped() {
    let temp_dir = create_test_project(vec![("app.py", include_str!("fixtures/flask_app.py"))]);
    let routes = extract_routes(temp_dir.path(), Framework::Flask).unwrap();

    let record = find(&routes, HttpMethod::Delete, "/tokens/{token}");
    assert_eq!(record.description, "Revoke a token");

    let mut token = Parameter::path("token", "string");
    token.description = "token parameter".to_string();
    token.format = Some("uuid".to_string());
    assert_eq!(params(record), &[token]);

    assert!(!record.metadata.contains_key("returns"));
    assert_eq!(record.metadata["deprecated"], text(""));
}

#[test]
fn test_flask_shortcut_decorator_and_untyped_parameter() {
    let temp_dir = create_test_project(vec![("app.py", include_str!("fixtures/flask_app.py"))]);
    let routes = extract_routes(temp_dir.path(), Framework::Flask).unwrap();

    let record = find(&routes, HttpMethod::Post, "/reports/{report_id}");
    assert_eq!(record.description, "Queue a report");
    assert_eq!(record.middlewares, vec!["login_required"]);

    let report_id = &params(record)[0];
    assert_eq!(report_id.param_type, "string");
    assert_eq!(report_id.description, "report_id parameter");
    assert!(report_id.required);
}

#[test]
fn test_express_end_to_end_extraction() {
    let express_code = include_str!("fixtures/express_app.js");
    let temp_dir = create_test_project(vec![
        ("src/server.js", express_code),
        ("node_modules/express/index.js", "app.get('/vendored', handler);"),
    ]);

    let detection = FrameworkDetector::detect(temp_dir.path()).expect("Failed to detect");
    assert_eq!(detection.frameworks, vec![Framework::Express]);

    let routes = extract_routes(temp_dir.path(), Framework::Express).unwrap();

    let summary: Vec<(HttpMethod, &str)> =
        routes.iter().map(|r| (r.method, r.path.as_str())).collect();
    assert_eq!(
        summary,
        vec![
            (HttpMethod::Get, "/orders"),
            (HttpMethod::Post, "/orders"),
            (HttpMethod::Get, "/orders/{orderId}"),
            (HttpMethod::Put, "/orders/{orderId}"),
            (HttpMethod::Delete, "/orders/{orderId}"),
        ]
    );

    let list = find(&routes, HttpMethod::Get, "/orders");
    assert_eq!(list.description, "List all orders");
    assert_eq!(list.middlewares, vec!["auth"]);
    assert_eq!(list.metadata["tag"], text("Orders"));
    assert_eq!(params(list)[0].location, ParameterLocation::Query);
    assert!(!params(list)[0].required);

    let create = find(&routes, HttpMethod::Post, "/orders");
    assert_eq!(create.description, "Create an order");
    assert_eq!(create.middlewares, vec!["auth", "validate"]);
    assert_eq!(params(create)[0].location, ParameterLocation::Body);
    assert!(params(create)[0].required);
}

#[test]
fn test_express_chained_routes_keep_their_own_docs() {
    let temp_dir = create_test_project(vec![("server.js", include_str!("fixtures/express_app.js"))]);
    let routes = extract_routes(temp_dir.path(), Framework::Express).unwrap();

    let get = find(&routes, HttpMethod::Get, "/orders/{orderId}");
    let put = find(&routes, HttpMethod::Put, "/orders/{orderId}");
    let delete = find(&routes, HttpMethod::Delete, "/orders/{orderId}");

    assert_eq!(get.description, "Fetch one order");
    assert!(get.metadata.contains_key("returns"));
    assert!(!get.metadata.contains_key("tag"));
    assert!(get.middlewares.is_empty());

    assert_eq!(put.description, "Replace an order");
    assert_eq!(put.metadata["tag"], text("Admin"));
    assert!(!put.metadata.contains_key("returns"));
    assert_eq!(put.middlewares, vec!["auth"]);

    assert_eq!(delete.description, "");
    assert_eq!(delete.middlewares, vec!["auth"]);

    for record in [get, put, delete] {
        let mut order_id = Parameter::path("orderId", "string");
        order_id.description = "orderId parameter".to_string();
        assert_eq!(params(record), &[order_id]);
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let temp_dir = create_test_project(vec![
        ("api/app.py", include_str!("fixtures/flask_app.py")),
        ("api/more/views.py", "@app.put('/items/<int:id>')\ndef put_item(id):\n    pass\n"),
    ]);
    let backend = SourceBackend::new(Framework::Flask);

    let first = backend.parse(temp_dir.path()).unwrap();
    let second = backend.parse(temp_dir.path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(serialize_json(&first).unwrap(), serialize_json(&second).unwrap());
    assert_eq!(first.last().map(|r| r.path.as_str()), Some("/items/{id}"));
}

#[test]
fn test_normalized_paths_have_no_native_syntax() {
    let temp_dir = create_test_project(vec![
        ("app.py", include_str!("fixtures/flask_app.py")),
        ("server.js", include_str!("fixtures/express_app.js")),
    ]);

    for framework in [Framework::Flask, Framework::Express] {
        for record in extract_routes(temp_dir.path(), framework).unwrap() {
            assert!(!record.path.contains('<'), "{}", record.path);
            assert!(!record.path.contains(':'), "{}", record.path);
        }
    }
}

#[test]
fn test_markdown_output_for_flask_project() {
    let temp_dir = create_test_project(vec![("app.py", include_str!("fixtures/flask_app.py"))]);
    let routes = extract_routes(temp_dir.path(), Framework::Flask).unwrap();

    let markdown = render_markdown(&routes);

    assert!(markdown.starts_with("# API Documentation\n"));
    assert!(markdown.contains("## GET /users/{user_id}"));
    assert!(markdown.contains("| user_id | path | integer | yes | User ID |"));
    assert!(markdown.contains("| 404 | Error | Not found |"));
    assert!(markdown.contains("**tag:** Users, Authentication"));
    assert!(markdown.contains("| token | path | string (uuid) | yes | token parameter |"));
}

#[test]
fn test_yaml_output_round_trips() {
    let temp_dir = create_test_project(vec![("server.js", include_str!("fixtures/express_app.js"))]);
    let routes = extract_routes(temp_dir.path(), Framework::Express).unwrap();

    let yaml = serialize_yaml(&routes).unwrap();
    let parsed: Vec<RouteRecord> = serde_yaml::from_str(&yaml).unwrap();

    assert_eq!(parsed, routes);
}

#[cfg(unix)]
#[test]
fn test_external_backend_consumes_rendered_json() {
    use route_docgen::backend::ExternalBackend;

    let temp_dir = create_test_project(vec![("app.py", include_str!("fixtures/flask_app.py"))]);
    let routes = extract_routes(temp_dir.path(), Framework::Flask).unwrap();

    let output_dir = TempDir::new().unwrap();
    let json_path = output_dir.path().join("routes.json");
    std::fs::write(&json_path, serialize_json(&routes).unwrap()).unwrap();

    // The external parser prints a precomputed route list for whatever root it is given
    let backend = ExternalBackend::new(
        "sh",
        vec![
            "-c".to_string(),
            format!("test -d \"$1\" && cat '{}'", json_path.display()),
            "sh".to_string(),
        ],
    );

    assert_eq!(backend.parse(temp_dir.path()).unwrap(), routes);
}

#[test]
fn test_missing_input_root() {
    let result = extract_routes("/nonexistent/project", Framework::Flask);
    assert!(matches!(result, Err(route_docgen::Error::NotFound(_))));
}
