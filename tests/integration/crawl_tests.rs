//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock help sites and drive seeding and
//! crawl steps end-to-end over real HTTP.

use support_harvest::config::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
use support_harvest::crawler::Coordinator;
use support_harvest::output::{export_feed, FeedChannel};
use support_harvest::state::{LinkKind, QueueStatus};
use support_harvest::storage::{Article, Storage};
use tempfile::TempDir;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
fn create_test_config(origin: &str, dir: &TempDir) -> Config {
    Config {
        crawler: CrawlerConfig {
            lang: "ko".to_string(),
            politeness_delay_ms: 5, // Very short for testing
            ..CrawlerConfig::default()
        },
        site: SiteConfig {
            origin: origin.to_string(),
            enforce_https: false,
            ..SiteConfig::default()
        },
        user_agent: UserAgentConfig {
            agent: "TestHarvester/1.0".to_string(),
        },
        output: OutputConfig {
            database_path: dir.path().join("harvest.db").display().to_string(),
            feed_path: dir.path().join("articles.xml").display().to_string(),
        },
    }
}

async fn mount_page(server: &MockServer, page_path: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

fn answer_page(title: &str, extra: &str) -> String {
    format!(
        r#"<html><head><title>ignored</title></head><body>
        <nav><a href="/a/topic/100">Back</a></nav>
        <h1>{}</h1>
        <article class="article-container">
          <p>{} explained.</p>
          {}
        </article>
        </body></html>"#,
        title, title, extra
    )
}

/// Mounts a small help site: two topics and three answers
async fn mount_site(server: &MockServer) {
    let base_url = server.uri();

    mount_page(
        server,
        "/a/topic/100",
        200,
        format!(
            r#"<html><body>
            <a href="/a/answer/1?ref_topic=100">Add users</a>
            <a href="{}/a/answer/1">Add users (absolute)</a>
            <div data-href="/a/answer/2"></div>
            <a href="/a/topic/200?ref_topic=100">More topics</a>
            <a href="/a/topic/100">This topic</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;

    mount_page(
        server,
        "/a/topic/200",
        200,
        r#"<html><body><script>window.data = {"items":[{"url":"\/a\/answer\/3"}]};</script></body></html>"#
            .to_string(),
    )
    .await;

    mount_page(
        server,
        "/a/answer/1",
        200,
        answer_page("Add users", r#"<p>Next: <a href="/a/answer/2">Remove users</a></p>"#),
    )
    .await;
    mount_page(server, "/a/answer/2", 200, answer_page("Remove users", "")).await;
    mount_page(
        server,
        "/a/answer/3",
        200,
        answer_page("Rename users", "<ul><li>Open the console</li><li>Rename</li></ul>"),
    )
    .await;
}

#[tokio::test]
async fn test_full_harvest_drains_frontier() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &dir);
    let mut coordinator = Coordinator::open(&config).unwrap();

    let seed = coordinator
        .seed_from_topic(&format!("{}/a/topic/100", base_url), "ko")
        .await
        .unwrap();
    assert_eq!(seed.seed_url, format!("{}/a/topic/100?hl=ko", base_url));
    assert_eq!(seed.topics, 2);
    assert_eq!(seed.answers, 2);
    assert_eq!(coordinator.storage().count_pending().unwrap(), 4);

    let first = coordinator.crawl_step("ko", 20).await.unwrap();
    assert_eq!(first.topics, 2);
    assert_eq!(first.answers, 2);
    assert_eq!(first.inserted, 2);
    assert_eq!(first.errors, 0);
    assert_eq!(first.pending, 1, "answer 3 is discovered by topic 200");

    let second = coordinator.crawl_step("ko", 20).await.unwrap();
    assert_eq!(second.answers, 1);
    assert_eq!(second.inserted, 1);
    assert_eq!(second.pending, 0);

    let storage = coordinator.storage();
    assert_eq!(storage.count_queue_items().unwrap(), 5);
    assert_eq!(storage.count_by_status(QueueStatus::Done).unwrap(), 5);
    assert_eq!(storage.count_articles().unwrap(), 3);

    let articles = storage.list_articles().unwrap();
    let first_article = articles
        .iter()
        .find(|a| a.link == format!("{}/a/answer/1?hl=ko", base_url))
        .unwrap();
    assert_eq!(first_article.title, "Add users");
    assert!(first_article.description.starts_with("Add users explained."));
    assert!(first_article
        .description
        .contains(&format!("Remove users ({}/a/answer/2?hl=ko)", base_url)));
    assert!(!first_article.description.contains("Back"));
    assert_eq!(
        first_article.guid,
        Article::fingerprint(&first_article.link, &first_article.description)
    );

    let third = articles.iter().find(|a| a.title == "Rename users").unwrap();
    assert!(third.description.contains("- Open the console\n- Rename"));
}

#[tokio::test]
async fn test_requests_carry_language_and_agent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/a/answer/7"))
        .and(query_param("hl", "ko"))
        .and(header_exists("accept-language"))
        .and(header("user-agent", "TestHarvester/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(answer_page("Seven", "")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &dir);
    let mut coordinator = Coordinator::open(&config).unwrap();
    coordinator
        .storage_mut()
        .enqueue(LinkKind::Answer, &format!("{}/a/answer/7?hl=ko", base_url))
        .unwrap();

    let summary = coordinator.crawl_step("ko", 1).await.unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.errors, 0);
}

#[tokio::test]
async fn test_unreachable_item_stays_in_progress() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &dir);
    let mut coordinator = Coordinator::open(&config).unwrap();

    let ok_1 = format!("{}/a/answer/1?hl=ko", base_url);
    // Nothing listens on the discard port
    let dead = "http://127.0.0.1:9/a/answer/9?hl=ko".to_string();
    let ok_2 = format!("{}/a/answer/2?hl=ko", base_url);
    for url in [&ok_1, &dead, &ok_2] {
        coordinator.storage_mut().enqueue(LinkKind::Answer, url).unwrap();
    }

    let summary = coordinator.crawl_step("ko", 3).await.unwrap();
    assert_eq!(summary.answers, 2);
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.pending, 1);

    let status = |url: &str| {
        coordinator
            .storage()
            .get_queue_item(LinkKind::Answer, url)
            .unwrap()
            .unwrap()
            .status
    };
    assert_eq!(status(&ok_1), QueueStatus::Done);
    assert_eq!(status(&dead), QueueStatus::InProgress);
    assert_eq!(status(&ok_2), QueueStatus::Done);
}

#[tokio::test]
async fn test_error_status_page_is_harvested() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(
        &mock_server,
        "/a/answer/404",
        404,
        "<html><body><h1>Not Found</h1><p>Gone.</p></body></html>".to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &dir);
    let mut coordinator = Coordinator::open(&config).unwrap();
    coordinator
        .storage_mut()
        .enqueue(LinkKind::Answer, &format!("{}/a/answer/404?hl=ko", base_url))
        .unwrap();

    let summary = coordinator.crawl_step("ko", 1).await.unwrap();
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.inserted, 1);
    assert_eq!(coordinator.storage().list_articles().unwrap()[0].title, "Not Found");
}

#[tokio::test]
async fn test_frontier_survives_reopen() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &dir);
    let seed_url = format!("{}/a/topic/100", base_url);

    {
        let mut coordinator = Coordinator::open(&config).unwrap();
        coordinator.seed_from_topic(&seed_url, "ko").await.unwrap();
        coordinator.crawl_step("ko", 1).await.unwrap();
    }

    let mut coordinator = Coordinator::open(&config).unwrap();
    assert_eq!(coordinator.storage().count_queue_items().unwrap(), 5);
    assert_eq!(coordinator.storage().count_by_status(QueueStatus::Done).unwrap(), 1);

    // Discovered links are never enqueued twice, whatever their status
    let again = coordinator.seed_from_topic(&seed_url, "ko").await.unwrap();
    assert_eq!(again.topics, 0);
    assert_eq!(again.answers, 0);

    let summary = coordinator.crawl_step("ko", 20).await.unwrap();
    assert_eq!(summary.pending, 0);
    assert_eq!(coordinator.storage().count_articles().unwrap(), 3);
}

#[tokio::test]
async fn test_export_feed_after_harvest() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &dir);
    let mut coordinator = Coordinator::open(&config).unwrap();
    coordinator
        .seed_from_topic(&format!("{}/a/topic/100", base_url), "ko")
        .await
        .unwrap();
    while coordinator.crawl_step("ko", 20).await.unwrap().pending > 0 {}

    let feed_path = std::path::Path::new(&config.output.feed_path);
    let written = export_feed(
        coordinator.storage(),
        &FeedChannel::for_site(&config.site.origin),
        feed_path,
    )
    .unwrap();
    assert_eq!(written, 3);

    let rss = std::fs::read_to_string(feed_path).unwrap();
    assert_eq!(rss.matches("<item>").count(), 3);
    assert!(rss.contains("<title>Add users</title>"));
}
