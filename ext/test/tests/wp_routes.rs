//! End-to-end tests against the bundled WordPress route table.

use pathwright_test::prelude::*;
use std::sync::Once;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn client() -> Client {
    init_tracing();
    wp_client("https://example.com/wp-json")
}

#[test]
fn post_revision_round_trip() {
    let client = client();
    let transport = RecordingTransport::new();

    let mut post = client.resource("posts").unwrap();
    post.set("id", 4).unwrap().set("revisions", 52).unwrap();
    post.execute(&transport, Method::Delete).unwrap();

    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::Delete);
    assert_eq!(sent[0].path, "/wp/v2/posts/4/revisions/52");
    assert_eq!(
        sent[0].url,
        "https://example.com/wp-json/wp/v2/posts/4/revisions/52"
    );
}

#[test]
fn autosave_of_post_uses_alias_node() {
    let client = client();
    let mut post = client.resource("posts").unwrap();
    post.set("parent", 4).unwrap().set("autosaves", 9).unwrap();
    assert_eq!(post.render_path().unwrap(), "posts/4/autosaves/9");
    assert_eq!(post.allowed_methods().unwrap(), [Method::Get, Method::Head]);
}

#[test]
fn handlers_do_not_share_state() {
    let client = client();
    let mut first = client.resource("pages").unwrap();
    first.set("id", 1).unwrap();
    let second = client.resource("pages").unwrap();
    assert_eq!(second.render_path().unwrap(), "pages");
    assert_eq!(first.render_path().unwrap(), "pages/1");
}

#[test]
fn method_not_offered_never_reaches_transport() {
    let client = client();
    let transport = RecordingTransport::new();

    let mut media = client.resource("media").unwrap();
    media.set("id", 3).unwrap().select("post-process").unwrap();
    let err = media.execute(&transport, Method::Get).unwrap_err();
    assert!(matches!(err, RouteError::MethodNotAllowed { .. }));
    assert!(transport.requests().is_empty());

    assert_eq!(media.execute(&transport, Method::Post).unwrap(), 1);
}

#[test]
fn head_rides_on_get() {
    let client = client();
    let transport = RecordingTransport::new();
    let types = client.resource("types").unwrap();
    types.execute(&transport, Method::Head).unwrap();
    assert_eq!(transport.requests()[0].method.as_http(), "HEAD");
}

#[test]
fn query_parameters_are_encoded() {
    let client = client();
    let mut posts = client.resource("posts").unwrap();
    posts.param("search", "hello world").param("per_page", 5);
    assert_eq!(
        posts.render_uri().unwrap(),
        "https://example.com/wp-json/wp/v2/posts?per_page=5&search=hello%20world"
    );
}

#[test]
fn other_namespace_through_client() {
    let client = client();
    let embed = client.handler("oembed/1.0", "embed").unwrap();
    assert_eq!(
        embed.render_uri().unwrap(),
        "https://example.com/wp-json/oembed/1.0/embed"
    );
}

#[test]
fn incomplete_path_message_names_the_gap() {
    let client = client();
    let mut post = client.resource("posts").unwrap();
    post.set("revisions", 52).unwrap();
    let message = post.render_path().unwrap_err().to_string();
    assert_eq!(
        message,
        "incomplete path \"posts/{id|parent}/revisions/52\": no value for level(s) 1"
    );
}

#[test]
fn trace_shows_every_level() {
    let client = client();
    let mut post = client.resource("posts").unwrap();
    post.set("id", "x").unwrap();
    let trace = post.trace();
    assert!(!trace.is_complete());
    assert_eq!(trace.steps.len(), 2);
    assert_eq!(trace.first_failure().map(|s| s.level), Some(1));
}

#[test]
fn resource_titles_come_from_schema() {
    let index = wp_index();
    assert_eq!(index.resource("wp/v2", "posts").unwrap().title(), Some("post"));
    assert_eq!(index.resource("wp/v2", "types").unwrap().title(), Some("type"));
    assert_eq!(index.resource("oembed/1.0", "embed").unwrap().title(), None);
}
