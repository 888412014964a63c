//! Integration tests for the day vote.

mod common;

use axum::http::StatusCode;
use serde_json::json;

async fn vote(app: &axum::Router, voter: &str, target: &str) -> serde_json::Value {
    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/votes",
        &json!({ "voterId": voter, "targetId": target }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json
}

#[tokio::test]
async fn test_tie_then_runoff_settles_the_vote() {
    // Arrange
    let app = common::build_test_app(common::build_test_state());
    common::post_json(app.clone(), "/api/v1/day/start", &json!({})).await;

    // Act: a tie between bob and carol
    vote(&app, "alice", "bob").await;
    vote(&app, "dave", "bob").await;
    vote(&app, "erin", "carol").await;
    let tied = vote(&app, "bob", "carol").await;

    // Assert
    assert_eq!(tied["tally"]["isTie"], true);
    assert_eq!(tied["tally"]["winner"], serde_json::Value::Null);
    assert_eq!(tied["tally"]["tiedCandidates"], json!(["bob", "carol"]));

    // Act: the runoff clears the board and restricts targets
    let (status, state) = common::post_json(
        app.clone(),
        "/api/v1/votes/runoff",
        &json!({ "candidates": tied["tally"]["tiedCandidates"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["isRunoff"], true);

    let refused = vote(&app, "alice", "erin").await;
    vote(&app, "alice", "bob").await;
    let decided = vote(&app, "erin", "bob").await;

    // Assert
    assert_eq!(refused["success"], false);
    assert_eq!(refused["tally"]["counts"], json!({}));
    assert_eq!(decided["success"], true);
    assert_eq!(decided["tally"]["winner"], "bob");
    assert_eq!(decided["tally"]["counts"], json!({ "bob": 2 }));
}

#[tokio::test]
async fn test_revote_replaces_the_previous_choice() {
    let app = common::build_test_app(common::build_test_state());

    vote(&app, "alice", "bob").await;
    let json = vote(&app, "alice", "carol").await;

    assert_eq!(json["tally"]["counts"], json!({ "carol": 1 }));
    let (_, snapshot) = common::get_json(app, "/api/v1/session").await;
    assert_eq!(snapshot["votes"], json!({ "alice": "carol" }));
}

#[tokio::test]
async fn test_empty_voter_is_refused() {
    let app = common::build_test_app(common::build_test_state());

    let json = vote(&app, "", "bob").await;

    assert_eq!(json["success"], false);
}
