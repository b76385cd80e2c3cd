//! Integration tests for sitemap and page fetching
//!
//! These tests use wiremock to serve sitemaps and pages over real HTTP.

use sage::crawler::{build_http_client, fetch_page, PageError, StatusPolicy};
use sage::sitemap::{fetch_sitemap, SitemapError, SitemapParseError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn urlset(urls: &[String]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    for url in urls {
        xml.push_str(&format!("<url><loc>{}</loc></url>", url));
    }
    xml.push_str("</urlset>");
    xml
}

fn sitemap_index(urls: &[String]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push_str(r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    for url in urls {
        xml.push_str(&format!("<sitemap><loc>{}</loc></sitemap>", url));
    }
    xml.push_str("</sitemapindex>");
    xml
}

async fn serve(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_sitemap_keeps_document_order() {
    let server = MockServer::start().await;
    let base = server.uri();
    let urls = vec![
        format!("{}/c", base),
        format!("{}/a", base),
        format!("{}/b", base),
    ];
    serve(&server, "/sitemap.xml", 200, urlset(&urls)).await;

    let client = build_http_client().unwrap();
    let entries = fetch_sitemap(&client, &format!("{}/sitemap.xml", base))
        .await
        .unwrap();

    let locations: Vec<_> = entries.iter().map(|e| e.location.clone()).collect();
    assert_eq!(locations, urls);
}

#[tokio::test]
async fn test_fetch_sitemap_index_expands_children_in_order() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve(
        &server,
        "/index.xml",
        200,
        sitemap_index(&[format!("{}/one.xml", base), format!("{}/two.xml", base)]),
    )
    .await;
    serve(
        &server,
        "/one.xml",
        200,
        urlset(&[format!("{}/1", base), format!("{}/2", base)]),
    )
    .await;
    serve(&server, "/two.xml", 200, urlset(&[format!("{}/3", base)])).await;

    let client = build_http_client().unwrap();
    let entries = fetch_sitemap(&client, &format!("{}/index.xml", base))
        .await
        .unwrap();

    let locations: Vec<_> = entries.iter().map(|e| e.location.clone()).collect();
    assert_eq!(
        locations,
        vec![
            format!("{}/1", base),
            format!("{}/2", base),
            format!("{}/3", base)
        ]
    );
}

#[tokio::test]
async fn test_fetch_sitemap_rejects_nested_index() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve(
        &server,
        "/index.xml",
        200,
        sitemap_index(&[format!("{}/nested.xml", base)]),
    )
    .await;
    serve(
        &server,
        "/nested.xml",
        200,
        sitemap_index(&[format!("{}/deeper.xml", base)]),
    )
    .await;

    let client = build_http_client().unwrap();
    let result = fetch_sitemap(&client, &format!("{}/index.xml", base)).await;

    match result {
        Err(SitemapError::Parse { url, source }) => {
            assert_eq!(url, format!("{}/nested.xml", base));
            assert!(matches!(source, SitemapParseError::NestedIndex));
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_sitemap_status_error() {
    let server = MockServer::start().await;
    serve(&server, "/sitemap.xml", 404, "missing".to_string()).await;

    let client = build_http_client().unwrap();
    let err = fetch_sitemap(&client, &format!("{}/sitemap.xml", server.uri()))
        .await
        .unwrap_err();

    assert!(err.is_fetch());
    assert!(matches!(err, SitemapError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_fetch_sitemap_invalid_xml() {
    let server = MockServer::start().await;
    serve(&server, "/sitemap.xml", 200, "<html>not a sitemap</html>".to_string()).await;

    let client = build_http_client().unwrap();
    let err = fetch_sitemap(&client, &format!("{}/sitemap.xml", server.uri()))
        .await
        .unwrap_err();

    assert!(!err.is_fetch());
    assert!(matches!(
        err,
        SitemapError::Parse {
            source: SitemapParseError::UnexpectedRoot(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_fetch_sitemap_unreachable_host() {
    let client = build_http_client().unwrap();
    let err = fetch_sitemap(&client, "http://127.0.0.1:1/sitemap.xml")
        .await
        .unwrap_err();

    assert!(matches!(err, SitemapError::Fetch { .. }));
}

#[tokio::test]
async fn test_fetch_page_returns_body() {
    let server = MockServer::start().await;
    serve(&server, "/page", 200, "<html><body>hi</body></html>".to_string()).await;

    let client = build_http_client().unwrap();
    let url = format!("{}/page", server.uri());
    let page = fetch_page(&client, &url, StatusPolicy::default())
        .await
        .unwrap();

    assert_eq!(page.url, url);
    assert_eq!(page.status_code, 200);
    assert_eq!(page.body, "<html><body>hi</body></html>");
}

#[tokio::test]
async fn test_fetch_page_accepts_client_errors() {
    let server = MockServer::start().await;
    serve(&server, "/gone", 404, "<h1>Not Found</h1>".to_string()).await;

    let client = build_http_client().unwrap();
    let page = fetch_page(
        &client,
        &format!("{}/gone", server.uri()),
        StatusPolicy::default(),
    )
    .await
    .unwrap();

    assert_eq!(page.status_code, 404);
    assert_eq!(page.body, "<h1>Not Found</h1>");
}

#[tokio::test]
async fn test_fetch_page_rejects_server_errors() {
    let server = MockServer::start().await;
    serve(&server, "/broken", 500, "oops".to_string()).await;

    let client = build_http_client().unwrap();
    let url = format!("{}/broken", server.uri());
    let err = fetch_page(&client, &url, StatusPolicy::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PageError::Upstream { status: 500, .. }));
    assert_eq!(err.url(), url);
}

#[tokio::test]
async fn test_fetch_page_custom_threshold() {
    let server = MockServer::start().await;
    serve(&server, "/gone", 404, "missing".to_string()).await;

    let client = build_http_client().unwrap();
    let err = fetch_page(
        &client,
        &format!("{}/gone", server.uri()),
        StatusPolicy::reject_from(400),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PageError::Upstream { status: 404, .. }));
}

#[tokio::test]
async fn test_fetch_page_transport_error() {
    let client = build_http_client().unwrap();
    let err = fetch_page(&client, "http://127.0.0.1:1/2", StatusPolicy::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PageError::Transport { .. }));
}
