//! Fetch a served feed over HTTP and render it, as the CLI does.

use pretty_assertions::assert_eq;
use rss_reader::feed::{fetch_document, render, FeedBuilder, FetchSettings, OutputFormat};
use std::num::NonZeroUsize;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn local_settings() -> FetchSettings {
    FetchSettings {
        allow_private_hosts: true,
        backoff_base_ms: 1,
        ..FetchSettings::default()
    }
}

async fn serve(body: String) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .mount(&server)
        .await;
    server
}

fn built_feed() -> String {
    FeedBuilder::new()
        .field("title", "Served Feed")
        .field("link", "https://served.example.com")
        .field("category", vec!["One".to_string(), "Two".to_string()])
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_fetch_then_render_text() {
    let server = serve(built_feed()).await;
    let client = reqwest::Client::new();

    let document = fetch_document(&client, &format!("{}/rss", server.uri()), &local_settings())
        .await
        .unwrap();
    let lines = render(&document, None, OutputFormat::Text).unwrap();

    assert_eq!(
        lines,
        [
            "Feed: Served Feed",
            "Link: https://served.example.com",
            "Categories: One, Two",
        ]
    );
}

#[tokio::test]
async fn test_fetch_then_render_json_with_limit() {
    let mut xml = String::from("<rss><channel><title>Many</title>");
    for i in 0..5 {
        xml.push_str(&format!("<item><title>Story {i}</title></item>"));
    }
    xml.push_str("</channel></rss>");

    let server = serve(xml).await;
    let client = reqwest::Client::new();
    let document = fetch_document(&client, &format!("{}/rss", server.uri()), &local_settings())
        .await
        .unwrap();

    let lines = render(&document, NonZeroUsize::new(3), OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&lines.join("\n")).unwrap();
    assert_eq!(value["items"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["items"][2]["title"], "Story 2");
}

#[tokio::test]
async fn test_served_html_is_missing_section() {
    let server = serve("<html><body><p>Not a feed</p></body></html>".to_string()).await;
    let client = reqwest::Client::new();
    let document = fetch_document(&client, &format!("{}/rss", server.uri()), &local_settings())
        .await
        .unwrap();

    let err = render(&document, None, OutputFormat::Text).unwrap_err();
    assert!(err.to_string().contains("No <channel> or <feed>"));
}
