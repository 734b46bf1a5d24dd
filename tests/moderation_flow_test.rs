//! Integration tests for moderation operations (lock, ban, unban, move).

use std::sync::Arc;
use std::time::Duration;

use modactif::{Client, Error, HttpTransport};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A logged-in page carrying the moderation token.
const CONTEXT_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <form action="/search" method="get">
    <input type="hidden" name="tid" value="a1b2c3">
  </form>
</body></html>"#;

/// A logged-out page: no token anywhere.
const ANONYMOUS_PAGE: &str = "<!DOCTYPE html><html><body><p>Bienvenue</p></body></html>";

fn client_for(server: &MockServer) -> Client {
    let transport = HttpTransport::new(&server.uri()).expect("Failed to build transport");
    Client::from_transport(Arc::new(transport), "/")
}

async fn mount_context(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_lock_returns_results_in_input_order() {
    let server = MockServer::start().await;
    mount_context(&server, CONTEXT_PAGE).await;

    // The first topic answers slowest; ordering must still follow input.
    Mock::given(method("GET"))
        .and(path("/modcp"))
        .and(query_param("mode", "lock"))
        .and(query_param("t", "42"))
        .and(query_param("tid", "a1b2c3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(150))
                .set_body_raw(
                    r#"<p>Le sujet a été verrouillé avec succès</p>
                       <a href="/t42-premier-sujet">Retour au sujet</a>"#,
                    "text/html",
                ),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/modcp"))
        .and(query_param("mode", "lock"))
        .and(query_param("t", "43"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<p>Le sujet a été verrouillé avec succès</p>
               <a href="/t43-second-sujet">Retour au sujet</a>"#,
            "text/html",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let results = client.topic([42u32, 43]).lock().await.expect("lock failed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].ids.topic_id, Some(42));
    assert_eq!(results[1].ids.topic_id, Some(43));
    for result in &results {
        assert!(result.ok, "lock should succeed: {}", result.message);
        assert_eq!(result.action, modactif::ActionKind::TopicLock);
    }
    assert_eq!(results[0].links.topic.as_deref(), Some("/t42-premier-sujet"));
}

#[tokio::test]
async fn test_missing_token_fails_before_any_request() {
    let server = MockServer::start().await;
    mount_context(&server, ANONYMOUS_PAGE).await;
    // No /modcp mock: reaching the endpoint would fail the test with a 404
    // bridge result rather than the expected error.

    let client = client_for(&server);
    let err = client.topic(42u32).lock().await.expect_err("lock should fail");
    assert!(matches!(err, Error::MissingToken), "got {err:?}");
}

#[tokio::test]
async fn test_ban_fanout_preserves_input_order() {
    let server = MockServer::start().await;
    mount_context(&server, CONTEXT_PAGE).await;

    for (user_id, delay_ms) in [(10u32, 200u64), (11, 50), (12, 0)] {
        Mock::given(method("POST"))
            .and(path("/modcp"))
            .and(body_string_contains(format!("user_id={user_id}")))
            .and(body_string_contains("mode=ban"))
            .and(body_string_contains("ban_user_date=3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(delay_ms))
                    .set_body_raw(
                        format!("<p>L'utilisateur {user_id} a été banni avec succès</p>"),
                        "text/html",
                    ),
            )
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    let options = modactif::BanOptions {
        days: 3,
        reason: "flood".to_string(),
    };
    let results = client.user([10u32, 11, 12]).ban(&options).await.expect("ban failed");

    assert_eq!(results.len(), 3);
    for (result, user_id) in results.iter().zip([10u32, 11, 12]) {
        assert!(result.ok, "ban should succeed: {}", result.message);
        assert_eq!(result.action, modactif::ActionKind::UserBan);
        assert!(
            result.message.contains(&user_id.to_string()),
            "result out of order: expected user {user_id} in {:?}",
            result.message
        );
    }
}

#[tokio::test]
async fn test_unban_is_one_admin_request() {
    let server = MockServer::start().await;
    mount_context(&server, CONTEXT_PAGE).await;

    Mock::given(method("POST"))
        .and(path("/admin/index.forum"))
        .and(query_param("mode", "ban_control"))
        .and(query_param("tid", "a1b2c3"))
        .and(body_string_contains("users_to_unban%5B%5D=10"))
        .and(body_string_contains("users_to_unban%5B%5D=11"))
        .and(body_string_contains("unban_users=1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<p>Les utilisateurs sélectionnés ont été débannis</p>",
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.user([10u32, 11]).unban().await.expect("unban failed");

    assert!(result.ok, "unban should succeed: {}", result.message);
    assert_eq!(result.action, modactif::ActionKind::UserUnban);
}

#[tokio::test]
async fn test_move_rejects_missing_destination() {
    let server = MockServer::start().await;
    mount_context(&server, CONTEXT_PAGE).await;

    let client = client_for(&server);
    let err = client
        .topic(42u32)
        .move_to(0)
        .await
        .expect_err("move without destination should fail");
    assert!(matches!(err, Error::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn test_context_is_fetched_once_per_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(CONTEXT_PAGE.to_string(), "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/modcp"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<p>Le sujet a été envoyé à la corbeille</p>",
            "text/html",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.topic(1u32).trash().await.expect("first trash failed");
    client.topic(2u32).trash().await.expect("second trash failed");
    // MockServer verifies the expect(1) on drop.
}
