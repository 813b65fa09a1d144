//! Minimal strata example — an authenticated API gate.
//!
//! Run with:
//!   RUST_LOG=trace cargo run --example basic
//!
//! Two requests go through the same registrations: one carrying an
//! authorization header, one without. The anonymous request trips the
//! guard, which skips the rest of its group with `ExitArray` — the chain
//! itself still reaches the terminal handler.

use strata::{boxed, from_fn, BoxFuture, Config, Exchange, Middleware, Outcome, Registry, Signal};
use tracing::info;

/// What the handlers share: the http request plus the reply being built.
type Gate = Exchange<http::Request<()>, Reply>;

#[derive(Debug, Default)]
struct Reply {
    status: u16,
    notes: Vec<String>,
}

async fn audit(gate: &mut Gate) {
    info!(
        method = %gate.request.method(),
        path = gate.request.uri().path(),
        "request received"
    );
}

/// Rejects requests missing a header. Carries its configuration the way
/// any stateful middleware does: as plain struct fields.
struct RequireHeader {
    name: &'static str,
}

impl Middleware<Gate> for RequireHeader {
    fn invoke<'a>(&'a self, gate: &'a mut Gate) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            if gate.request.headers().contains_key(self.name) {
                Ok(None)
            } else {
                gate.response.status = 401;
                gate.response.notes.push(format!("missing `{}` header", self.name));
                // Skip the rest of this group; the chain itself moves on.
                Ok(Some(Signal::ExitArray))
            }
        })
    }
}

async fn mark_verified(gate: &mut Gate) {
    gate.response.notes.push("credentials verified".to_owned());
}

// GET /api/users — only reached as the chain's terminal entry.
async fn list_users(gate: &mut Gate) {
    if gate.response.status == 401 {
        return;
    }
    gate.response.status = 200;
    gate.response.notes.push(r#"[{"id":1,"name":"alice"}]"#.to_owned());
}

/// One registry per request: build, register, execute, discard.
async fn run_gate(request: http::Request<()>) -> Reply {
    let mut registry = Registry::new(Exchange::new(request, Reply::default()));

    registry.add_group(
        "/api/(.*)",
        vec![
            boxed(from_fn(audit)),
            boxed(RequireHeader { name: "authorization" }),
            boxed(from_fn(mark_verified)),
        ],
        Config::default().transparent(),
    );
    registry.add("/api/users", from_fn(list_users), Config::default().methods(["GET"]));

    registry.execute().await.unwrap().response
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let authorized = http::Request::builder()
        .method("GET")
        .uri("/api/users?page=1")
        .header("authorization", "Bearer demo")
        .body(())
        .unwrap();
    let reply = run_gate(authorized).await;
    println!("authorized: {} {:?}", reply.status, reply.notes);

    let anonymous = http::Request::builder()
        .method("GET")
        .uri("/api/users")
        .body(())
        .unwrap();
    let reply = run_gate(anonymous).await;
    println!("anonymous:  {} {:?}", reply.status, reply.notes);
}
