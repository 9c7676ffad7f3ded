//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, including files written to disk.

use std::path::PathBuf;
use tempfile::TempDir;
use trawler::config::{Config, FileSelector};
use trawler::crawler::{crawl, MATCHING_PAGES_DIR};
use trawler::output::CrawlSummary;
use trawler::state::PageState;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted in a scratch directory
fn create_test_config(seed: &str, selector: &str, root: &TempDir) -> Config {
    let mut config = Config::new(seed, selector.parse::<FileSelector>().unwrap());
    config.crawler.delay = 0.0;
    config.crawler.max_depth = 0;
    config.crawler.max_concurrent = 4;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.output.root = root.path().to_string_lossy().into_owned();
    config
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, route: &str, bytes: &[u8], expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_unvisited(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .expect(0)
        .mount(server)
        .await;
}

async fn run(config: Config) -> (CrawlSummary, PathBuf) {
    let output_dir = config.output_dir().expect("Failed to compute output dir");
    let summary = crawl(config).await.expect("Crawl failed");
    (summary, output_dir)
}

#[tokio::test]
async fn test_seed_only_crawl_downloads_files() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(
        &server,
        "/",
        r#"<html><body>
        <img src="/img/a.gif"><img src="/img/b.gif">
        <a href="/img/c.gif">c</a>
        <a href="/img/photo.png">not selected</a>
        <a href="/one.html">one</a><a href="/two.html">two</a>
        </body></html>"#,
    )
    .await;
    mount_file(&server, "/img/a.gif", b"GIF89a-a", 1).await;
    mount_file(&server, "/img/b.gif", b"GIF89a-b", 1).await;
    mount_file(&server, "/img/c.gif", b"GIF89a-c", 1).await;
    mount_file(&server, "/img/photo.png", b"PNG", 0).await;
    mount_unvisited(&server, "/one.html").await;
    mount_unvisited(&server, "/two.html").await;

    let root = TempDir::new().unwrap();
    let config = create_test_config(&seed, ".gif", &root);
    let (summary, output_dir) = run(config).await;

    assert_eq!(summary.pages_crawled(), 1);
    assert_eq!(summary.files_downloaded(), 3);
    assert_eq!(summary.pages_saved(), 0);
    assert_eq!(summary.stats.count(PageState::Processed), 1);

    assert_eq!(std::fs::read(output_dir.join("a.gif")).unwrap(), b"GIF89a-a");
    assert!(output_dir.join("b.gif").exists());
    assert!(output_dir.join("c.gif").exists());
    assert!(!output_dir.join("photo.png").exists());
    assert!(output_dir.ends_with("gif"));
}

#[tokio::test]
async fn test_depth_one_crawl_follows_child_pages() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(
        &server,
        "/",
        r#"<a href="/p1.html">1</a><a href="/p2.html">2</a><img src="/root.gif">"#,
    )
    .await;
    mount_page(
        &server,
        "/p1.html",
        r#"<img src="/one.gif"><a href="/p3.html">deeper</a>"#,
    )
    .await;
    mount_page(&server, "/p2.html", r#"<img src="/two.gif"><img src="/one.gif">"#).await;
    mount_unvisited(&server, "/p3.html").await;
    mount_file(&server, "/root.gif", b"r", 1).await;
    mount_file(&server, "/one.gif", b"1", 1).await;
    mount_file(&server, "/two.gif", b"2", 1).await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&seed, ".gif", &root);
    config.crawler.max_depth = 1;
    let (summary, output_dir) = run(config).await;

    assert_eq!(summary.pages_crawled(), 3);
    assert_eq!(summary.files_downloaded(), 3);
    assert_eq!(summary.stats.pages_by_depth.get(&0), Some(&1));
    assert_eq!(summary.stats.pages_by_depth.get(&1), Some(&2));
    for name in ["root.gif", "one.gif", "two.gif"] {
        assert!(output_dir.join(name).exists(), "missing {}", name);
    }
}

#[tokio::test]
async fn test_existing_file_is_not_downloaded_again() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", r#"<img src="/kept.gif"><img src="/new.gif">"#).await;
    mount_file(&server, "/kept.gif", b"remote", 0).await;
    mount_file(&server, "/new.gif", b"fresh", 1).await;

    let root = TempDir::new().unwrap();
    let config = create_test_config(&seed, ".gif", &root);
    let output_dir = config.output_dir().unwrap();
    std::fs::create_dir_all(&output_dir).unwrap();
    std::fs::write(output_dir.join("kept.gif"), b"local").unwrap();

    let (summary, _) = run(config).await;

    assert_eq!(summary.files_downloaded(), 1);
    assert_eq!(summary.stats.files_skipped, 1);
    assert_eq!(std::fs::read(output_dir.join("kept.gif")).unwrap(), b"local");
    assert_eq!(std::fs::read(output_dir.join("new.gif")).unwrap(), b"fresh");
}

#[tokio::test]
async fn test_matching_pages_are_saved_once_per_name() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(
        &server,
        "/",
        r#"<a href="/docs/">docs</a><a href="/docs">docs again</a><a href="/plain.html">plain</a>"#,
    )
    .await;
    mount_page(&server, "/docs/", "<p>The SECRET is here</p>").await;
    mount_page(&server, "/docs", "<p>another secret</p>").await;
    mount_page(&server, "/plain.html", "<p>nothing to see</p>").await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&seed, ".gif", &root);
    config.crawler.max_depth = 1;
    config.content.pattern = Some("secret".to_string());
    let (summary, output_dir) = run(config).await;

    assert_eq!(summary.pages_crawled(), 4);
    assert_eq!(summary.pages_saved(), 1);

    let saved_dir = output_dir.join(MATCHING_PAGES_DIR);
    let saved: Vec<_> = std::fs::read_dir(&saved_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(saved, vec![std::ffi::OsString::from("docs.html")]);
}

#[tokio::test]
async fn test_invalid_pattern_does_not_stop_crawl() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", r#"<img src="/a.gif">"#).await;
    mount_file(&server, "/a.gif", b"a", 1).await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&seed, ".gif", &root);
    config.content.pattern = Some("(unclosed".to_string());
    let (summary, output_dir) = run(config).await;

    assert_eq!(summary.files_downloaded(), 1);
    assert_eq!(summary.pages_saved(), 0);
    assert!(!output_dir.join(MATCHING_PAGES_DIR).exists());
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private/\n"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        r#"<a href="/private/page.html">p</a><a href="/public.html">ok</a>"#,
    )
    .await;
    mount_page(&server, "/public.html", "<p>public</p>").await;
    mount_unvisited(&server, "/private/page.html").await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&seed, ".gif", &root);
    config.crawler.max_depth = 1;
    config.crawler.respect_robots = true;
    let (summary, _) = run(config).await;

    assert_eq!(summary.pages_crawled(), 2);
}

#[tokio::test]
async fn test_unreachable_robots_fails_open() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/", r#"<a href="/private/page.html">p</a>"#).await;
    mount_page(&server, "/private/page.html", "<p>reachable</p>").await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&seed, ".gif", &root);
    config.crawler.max_depth = 1;
    config.crawler.respect_robots = true;
    let (summary, _) = run(config).await;

    assert_eq!(summary.pages_crawled(), 2);
}

#[tokio::test]
async fn test_fragments_are_fetched_once() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(
        &server,
        "/",
        r##"<a href="/page.html#top">a</a><a href="/page.html#bottom">b</a>
        <a href="/page.html">c</a><a href="#local">d</a>"##,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/page.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>page</p>", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&seed, ".gif", &root);
    config.crawler.max_depth = 1;
    let (summary, _) = run(config).await;

    assert_eq!(summary.pages_crawled(), 2);
}

#[tokio::test]
async fn test_domain_restriction() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(
        &server,
        "/",
        &format!(r#"<a href="{}/elsewhere.html">off site</a>"#, other.uri()),
    )
    .await;
    mount_unvisited(&other, "/elsewhere.html").await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&seed, ".gif", &root);
    config.crawler.max_depth = 2;
    let (summary, _) = run(config).await;

    assert_eq!(summary.pages_crawled(), 1);
}

#[tokio::test]
async fn test_domain_restriction_disabled() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(
        &server,
        "/",
        &format!(r#"<a href="{}/elsewhere.html">off site</a>"#, other.uri()),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/elsewhere.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>away</p>", "text/html"))
        .expect(1)
        .mount(&other)
        .await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&seed, ".gif", &root);
    config.crawler.max_depth = 1;
    config.crawler.same_domain_only = false;
    let (summary, _) = run(config).await;

    assert_eq!(summary.pages_crawled(), 2);
}

#[tokio::test]
async fn test_page_budget_limits_fetches() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    let links: String = (0..8)
        .map(|i| format!(r#"<a href="/page{}.html">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &links).await;
    for i in 0..8 {
        mount_page(&server, &format!("/page{}.html", i), "<p>leaf</p>").await;
    }

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&seed, ".gif", &root);
    config.crawler.max_depth = 1;
    config.crawler.max_pages = 3;
    let (summary, _) = run(config).await;

    assert_eq!(summary.pages_crawled(), 3);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_failed_pages_are_counted_not_fatal() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(
        &server,
        "/",
        r#"<a href="/gone.html">gone</a><a href="/broken.html">broken</a><img src="/ok.gif">"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_file(&server, "/ok.gif", b"ok", 1).await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(&seed, ".gif", &root);
    config.crawler.max_depth = 1;
    let (summary, _) = run(config).await;

    assert_eq!(summary.pages_crawled(), 3);
    assert_eq!(summary.files_downloaded(), 1);
    assert_eq!(summary.stats.count(PageState::DeadLink), 1);
    assert_eq!(summary.stats.count(PageState::Failed), 1);
}

#[tokio::test]
async fn test_invalid_seed_is_rejected_before_crawling() {
    let root = TempDir::new().unwrap();
    let config = create_test_config("ftp://example.com/", ".gif", &root);

    let result = crawl(config).await;
    assert!(result.is_err());
    assert!(!result.unwrap_err().is_recoverable());
}
