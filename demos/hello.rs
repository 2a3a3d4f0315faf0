//! A small application touching most of the surface: grouped routes, path
//! parameters, per-route middleware, templates, and the bundled
//! logger/recovery stack.
//!
//! Run with `cargo run --example hello`, then try:
//!
//! ```text
//! curl http://127.0.0.1:8080/
//! curl http://127.0.0.1:8080/greet/alice
//! curl http://127.0.0.1:8080/api/users/42
//! curl -H 'authorization: token' http://127.0.0.1:8080/api/admin/stats
//! ```

use gantry::{handlers, Context, Engine};

fn require_token(ctx: &mut Context) {
    if ctx.request().headers().get("authorization").is_none() {
        ctx.fail(401, "missing authorization header");
    }
}

fn main() -> std::io::Result<()> {
    env_logger::init();

    let mut app = Engine::with_default_stack();
    app.add_template("greet.html", "<h1>Hello {{ name }}!</h1>");

    app.get("/", |ctx: &mut Context| ctx.string(200, "hello world"));

    app.get("/greet/:name", |ctx: &mut Context| {
        let name = ctx.param("name").unwrap_or("stranger").to_owned();
        ctx.html(200, "greet.html", &serde_json::json!({ "name": name }));
    });

    let mut api = app.group("/api");
    api.get("/users/:id", |ctx: &mut Context| {
        let id = ctx.param("id").unwrap_or_default().to_owned();
        ctx.json(200, &serde_json::json!({ "id": id, "status": "active" }));
    });

    let mut admin = api.group("/admin");
    admin.use_middleware(require_token);
    admin.get("/stats", |ctx: &mut Context| {
        ctx.json(200, &serde_json::json!({ "uptime": "forever" }));
    });

    app.handle(
        http::Method::GET,
        "/slow",
        handlers![
            |ctx: &mut Context| {
                let start = std::time::Instant::now();
                ctx.next();
                log::info!("slow route took {:?}", start.elapsed());
            },
            |ctx: &mut Context| {
                std::thread::sleep(std::time::Duration::from_millis(100));
                ctx.string(200, "done");
            },
        ],
    );

    app.run("127.0.0.1:8080")
}
