use gantry::{handlers, Bytes, Context, Engine, ErrorEntry, Method, Request, StatusCode};
use http::header::CONTENT_TYPE;
use serde::Serialize;
use std::sync::{Arc, Mutex};

fn get(path: &str) -> Request {
    http::Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Bytes::new())
        .unwrap()
}

// Middleware that copies the context's recorded errors out after the chain.
fn observe(into: &Arc<Mutex<Vec<ErrorEntry>>>) -> impl gantry::Handler {
    let into = into.clone();
    move |ctx: &mut Context| {
        ctx.next();
        into.lock().unwrap().extend(ctx.errors().iter().cloned());
    }
}

#[derive(Serialize)]
struct User {
    name: &'static str,
    admin: bool,
}

// Serialize impl that always fails, for exercising the 500 fallback.
struct Unencodable;

impl Serialize for Unencodable {
    fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("refuses to encode"))
    }
}

#[test]
fn json_sets_body_and_content_type() {
    let mut app = Engine::new();
    app.get("/user", |ctx: &mut Context| {
        ctx.json(200, &User { name: "alice", admin: true });
    });

    let response = app.handle_request(get("/user"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body, serde_json::json!({"name": "alice", "admin": true}));
}

#[test]
fn json_failure_becomes_a_recorded_500() {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let mut app = Engine::new();
    app.handle(
        Method::GET,
        "/bad",
        handlers![observe(&errors), |ctx: &mut Context| {
            ctx.json(200, &Unencodable);
        }],
    );

    let response = app.handle_request(get("/bad"));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "text/plain; charset=utf-8"
    );
    let body = std::str::from_utf8(response.body()).unwrap();
    assert!(body.starts_with("json encoding failed"), "body: {body}");

    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.starts_with("json encoding failed"));
}

#[cfg(feature = "xml")]
#[test]
fn xml_sets_body_and_content_type() {
    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    let mut app = Engine::new();
    app.get("/point", |ctx: &mut Context| {
        ctx.xml(200, &Point { x: 1, y: 2 });
    });

    let response = app.handle_request(get("/point"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "application/xml"
    );
    assert_eq!(response.body().as_ref(), b"<Point><x>1</x><y>2</y></Point>");
}

#[test]
fn string_sets_plain_text() {
    let mut app = Engine::new();
    app.get("/greet", |ctx: &mut Context| ctx.string(200, "hi there"));

    let response = app.handle_request(get("/greet"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "text/plain; charset=utf-8"
    );
    assert_eq!(response.body().as_ref(), b"hi there");
}

#[test]
fn data_writes_raw_bytes_without_content_type() {
    let mut app = Engine::new();
    app.get("/raw", |ctx: &mut Context| {
        ctx.data(200, &b"\x00\x01\x02"[..]);
    });

    let response = app.handle_request(get("/raw"));
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(CONTENT_TYPE).is_none());
    assert_eq!(response.body().as_ref(), b"\x00\x01\x02");
}

#[cfg(feature = "templates")]
#[test]
fn html_renders_a_named_template() {
    let mut app = Engine::new();
    app.add_template("hello.html", "Hello {{ name }}!");
    app.get("/hello", |ctx: &mut Context| {
        ctx.html(200, "hello.html", &serde_json::json!({"name": "world"}));
    });

    let response = app.handle_request(get("/hello"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );
    assert_eq!(response.body().as_ref(), b"Hello world!");
}

#[cfg(feature = "templates")]
#[test]
fn html_with_unknown_template_becomes_a_recorded_500() {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let mut app = Engine::new();
    app.add_template("known.html", "present");
    app.handle(
        Method::GET,
        "/page",
        handlers![observe(&errors), |ctx: &mut Context| {
            ctx.html(200, "missing.html", &serde_json::json!({}));
        }],
    );

    let response = app.handle_request(get("/page"));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = std::str::from_utf8(response.body()).unwrap();
    assert!(body.starts_with("template rendering failed"), "body: {body}");
    assert_eq!(errors.lock().unwrap().len(), 1);
}

#[cfg(feature = "templates")]
#[test]
fn html_without_a_template_store_becomes_a_recorded_500() {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let mut app = Engine::new();
    app.handle(
        Method::GET,
        "/page",
        handlers![observe(&errors), |ctx: &mut Context| {
            ctx.html(200, "any.html", &serde_json::json!({}));
        }],
    );

    let response = app.handle_request(get("/page"));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = std::str::from_utf8(response.body()).unwrap();
    assert!(body.starts_with("no templates loaded"), "body: {body}");

    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].meta, serde_json::json!({"template": "any.html"}));
}

#[test]
fn render_after_render_overwrites_the_response() {
    let mut app = Engine::new();
    app.get("/twice", |ctx: &mut Context| {
        ctx.string(200, "first");
        ctx.json(201, &serde_json::json!({"second": true}));
    });

    let response = app.handle_request(get("/twice"));
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body, serde_json::json!({"second": true}));
}
