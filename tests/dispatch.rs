//! Chain execution semantics, end to end.

use std::sync::{Arc, Mutex};

use strata::{boxed, from_fn, Config, Error, Registry, RequestModel, Signal};

struct Ctx {
    path: String,
    method: String,
    calls: Vec<&'static str>,
}

impl Ctx {
    fn request(method: &str, path: &str) -> Self {
        Self { path: path.to_owned(), method: method.to_owned(), calls: Vec::new() }
    }

    fn get(path: &str) -> Self {
        Self::request("GET", path)
    }
}

impl RequestModel for Ctx {
    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> &str {
        &self.method
    }
}

async fn first(cx: &mut Ctx) {
    cx.calls.push("first");
}

async fn second(cx: &mut Ctx) {
    cx.calls.push("second");
}

async fn third(cx: &mut Ctx) {
    cx.calls.push("third");
}

async fn fourth(cx: &mut Ctx) {
    cx.calls.push("fourth");
}

async fn second_exits_array(cx: &mut Ctx) -> Signal {
    cx.calls.push("second");
    Signal::ExitArray
}

async fn guard_exits_chain(cx: &mut Ctx) -> Signal {
    cx.calls.push("guard");
    Signal::ExitChain
}

async fn member_with_chain_signal(cx: &mut Ctx) -> Signal {
    cx.calls.push("member");
    Signal::ContinueChain
}

#[tokio::test]
async fn runs_only_the_matching_route() {
    let mut registry = Registry::new(Ctx::get("/api/a"));
    registry.add("/api/a", from_fn(first), Config::default());
    registry.add("/api/b", from_fn(second), Config::default());
    assert_eq!(registry.len(), 2);

    let cx = registry.execute().await.unwrap();
    assert_eq!(cx.calls, ["first"]);
}

#[tokio::test]
async fn transparent_entries_all_run() {
    let mut registry = Registry::new(Ctx::get("/api/a"));
    registry.add("/api/(.*)", from_fn(first), Config::default().transparent());
    registry.add("/api/a", from_fn(second), Config::default().transparent());
    registry.add("(.*)/api/a", from_fn(third), Config::default().transparent());

    let cx = registry.execute().await.unwrap();
    assert_eq!(cx.calls, ["first", "second", "third"]);
}

#[tokio::test]
async fn walk_stops_at_the_first_opaque_match() {
    let mut registry = Registry::new(Ctx::get("/api/a"));
    registry.add("/api/(.*)", from_fn(first), Config::default().transparent());
    registry.add("/api/a", from_fn(second), Config::default());
    registry.add("(.*)/api/a", from_fn(third), Config::default().transparent());

    let cx = registry.execute().await.unwrap();
    assert_eq!(cx.calls, ["first", "second"]);
}

#[tokio::test]
async fn query_string_is_stripped_before_matching() {
    let mut registry = Registry::new(Ctx::get("/api/a?test=123"));
    registry.add("/api/a", from_fn(first), Config::default());

    let cx = registry.execute().await.unwrap();
    assert_eq!(cx.calls, ["first"]);
}

#[tokio::test]
async fn fragment_is_stripped_before_matching() {
    let mut registry = Registry::new(Ctx::get("/api/a#section"));
    registry.add("/api/a", from_fn(first), Config::default());

    let cx = registry.execute().await.unwrap();
    assert_eq!(cx.calls, ["first"]);
}

#[tokio::test]
async fn exit_array_skips_the_rest_of_its_group_only() {
    let mut registry = Registry::new(Ctx::get("/api/a/b/c"));
    registry.add_group(
        "/api/(.*)",
        vec![
            boxed(from_fn(first)),
            boxed(from_fn(second_exits_array)),
            boxed(from_fn(third)),
        ],
        Config::default().transparent(),
    );
    registry.add("/api/a/b/c", from_fn(fourth), Config::default());

    let cx = registry.execute().await.unwrap();
    assert_eq!(cx.calls, ["first", "second", "fourth"]);
}

#[tokio::test]
async fn completed_group_resumes_the_chain() {
    let mut registry = Registry::new(Ctx::get("/api/a"));
    registry.add_group(
        "/api/(.*)",
        vec![boxed(from_fn(first)), boxed(from_fn(second))],
        Config::default().transparent(),
    );
    registry.add("/api/a", from_fn(third), Config::default());

    let cx = registry.execute().await.unwrap();
    assert_eq!(cx.calls, ["first", "second", "third"]);
}

#[tokio::test]
async fn exit_array_from_a_single_entry_does_not_stop_the_chain() {
    let mut registry = Registry::new(Ctx::get("/api/a"));
    registry.add("/api/(.*)", from_fn(second_exits_array), Config::default().transparent());
    registry.add("/api/a", from_fn(first), Config::default());

    let cx = registry.execute().await.unwrap();
    assert_eq!(cx.calls, ["second", "first"]);
}

#[tokio::test]
async fn chain_signal_from_a_member_reads_as_array_continue() {
    let mut registry = Registry::new(Ctx::get("/api/a"));
    registry.add_group(
        "/api/(.*)",
        vec![boxed(from_fn(member_with_chain_signal)), boxed(from_fn(second))],
        Config::default().transparent(),
    );
    registry.add("/api/a", from_fn(third), Config::default());

    let cx = registry.execute().await.unwrap();
    assert_eq!(cx.calls, ["member", "second", "third"]);
}

#[tokio::test]
async fn exit_chain_from_a_handler_ends_the_chain() {
    let mut registry = Registry::new(Ctx::get("/api/a"));
    registry.add("/api/(.*)", from_fn(guard_exits_chain), Config::default().transparent());
    registry.add("/api/a", from_fn(first), Config::default());

    let cx = registry.execute().await.unwrap();
    assert_eq!(cx.calls, ["guard"]);
}

#[tokio::test]
async fn same_middleware_runs_once_per_matching_entry() {
    let mut registry = Registry::new(Ctx::get("/api/a"));
    registry.add("/api/(.*)", from_fn(first), Config::default().transparent());
    registry.add("/api/a", from_fn(first), Config::default());

    let cx = registry.execute().await.unwrap();
    assert_eq!(cx.calls, ["first", "first"]);
}

#[tokio::test]
async fn method_scoped_entries_select_by_method() {
    let mut registry = Registry::new(Ctx::get("/api/a"));
    registry.add("/api/a", from_fn(first), Config::default().methods(["GET"]));
    registry.add("/api/a", from_fn(second), Config::default().methods(["POST"]));

    let cx = registry.execute().await.unwrap();
    assert_eq!(cx.calls, ["first"]);
}

#[tokio::test]
async fn unscoped_entry_matches_any_method() {
    let mut registry = Registry::new(Ctx::request("DELETE", "/api/a"));
    registry.add("/api/a", from_fn(first), Config::default());

    let cx = registry.execute().await.unwrap();
    assert_eq!(cx.calls, ["first"]);
}

#[tokio::test]
async fn empty_registry_completes_without_calls() {
    let registry = Registry::new(Ctx::get("/api/a"));
    let cx = registry.execute().await.unwrap();
    assert!(cx.calls.is_empty());
}

// ── Insertion-order independence ──────────────────────────────────────────────

async fn on_get(cx: &mut Ctx) {
    cx.calls.push("GET");
}

async fn on_post(cx: &mut Ctx) {
    cx.calls.push("POST");
}

async fn on_put(cx: &mut Ctx) {
    cx.calls.push("PUT");
}

async fn on_delete(cx: &mut Ctx) {
    cx.calls.push("DELETE");
}

fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn heap(items: &mut Vec<usize>, k: usize, out: &mut Vec<Vec<usize>>) {
        if k == 1 {
            out.push(items.clone());
            return;
        }
        for i in 0..k {
            heap(items, k - 1, out);
            if k % 2 == 0 {
                items.swap(i, k - 1);
            } else {
                items.swap(0, k - 1);
            }
        }
    }

    let mut items: Vec<usize> = (0..n).collect();
    let mut out = Vec::new();
    heap(&mut items, n, &mut out);
    out
}

#[tokio::test]
async fn method_dispatch_ignores_insertion_order() {
    // Every one of the 24 ways to add four method-scoped entries for the
    // same route must dispatch a GET to the GET handler alone.
    for order in permutations(4) {
        let mut registry = Registry::new(Ctx::get("/api/a"));
        for &slot in &order {
            match slot {
                0 => registry.add("/api/a", from_fn(on_delete), Config::default().methods(["DELETE"])),
                1 => registry.add("/api/a", from_fn(on_get), Config::default().methods(["GET"])),
                2 => registry.add("/api/a", from_fn(on_post), Config::default().methods(["POST"])),
                _ => registry.add("/api/a", from_fn(on_put), Config::default().methods(["PUT"])),
            }
        }

        let cx = registry.execute().await.unwrap();
        assert_eq!(cx.calls, ["GET"], "insertion order {order:?}");
    }
}

#[tokio::test]
async fn identical_registries_dispatch_identically() {
    fn build() -> Registry<Ctx> {
        let mut registry = Registry::new(Ctx::get("/api/a"));
        registry.add("/api/(.*)", from_fn(first), Config::default().transparent());
        registry.add_group(
            "/api/a",
            vec![boxed(from_fn(second)), boxed(from_fn(third))],
            Config::default(),
        );
        registry
    }

    let one = build().execute().await.unwrap();
    let two = build().execute().await.unwrap();
    assert_eq!(one.calls, two.calls);
    assert_eq!(one.calls, ["first", "second", "third"]);
}

// ── Fault propagation ─────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct SharedCtx {
    path: String,
    method: String,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl RequestModel for SharedCtx {
    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> &str {
        &self.method
    }
}

async fn noted(cx: &mut SharedCtx) {
    cx.calls.lock().unwrap().push("noted");
}

async fn failing(_cx: &mut SharedCtx) -> Result<(), std::io::Error> {
    Err(std::io::Error::other("backend unreachable"))
}

async fn never_reached(cx: &mut SharedCtx) {
    cx.calls.lock().unwrap().push("never");
}

fn shared(path: &str) -> (SharedCtx, Arc<Mutex<Vec<&'static str>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let cx = SharedCtx {
        path: path.to_owned(),
        method: "GET".to_owned(),
        calls: Arc::clone(&calls),
    };
    (cx, calls)
}

#[tokio::test]
async fn middleware_fault_aborts_the_chain() {
    let (cx, calls) = shared("/api/a");
    let mut registry = Registry::new(cx);
    registry.add("/api/(.*)", from_fn(noted), Config::default().transparent());
    registry.add("/api/a", from_fn(failing), Config::default().transparent());
    registry.add("(.*)/api/a", from_fn(never_reached), Config::default());

    let err = registry.execute().await.unwrap_err();
    assert!(matches!(err, Error::Handler(_)));
    assert!(err.to_string().contains("middleware failed"));
    assert_eq!(*calls.lock().unwrap(), ["noted"]);
}

#[tokio::test]
async fn fault_inside_a_group_aborts_the_chain_too() {
    let (cx, calls) = shared("/api/a");
    let mut registry = Registry::new(cx);
    registry.add_group(
        "/api/(.*)",
        vec![boxed(from_fn(noted)), boxed(from_fn(failing)), boxed(from_fn(never_reached))],
        Config::default().transparent(),
    );
    registry.add("/api/a", from_fn(never_reached), Config::default());

    let err = registry.execute().await.unwrap_err();
    assert!(matches!(err, Error::Handler(_)));
    assert_eq!(*calls.lock().unwrap(), ["noted"]);
}
