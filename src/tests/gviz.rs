use super::*;
use crate::{
    auction::BidSubmission,
    service::{SubmissionController, SubmitError},
    source::*,
};
use std::sync::Arc;
use url::Url;
use wiremock::{
    matchers::{body_string_contains, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn wrap(json: &str) -> String {
    format!("/*O_o*/\ngoogle.visualization.Query.setResponse({json});")
}

const LOTS_JSON: &str = r#"{"version":"0.6","status":"ok","table":{"cols":[],"rows":[
    {"c":[{"v":"Lot 1"},{"v":"https://img.example/1.jpg"}]},
    {"c":[null,{"v":"https://img.example/orphan.jpg"}]},
    {"c":[{"v":2.0},null]},
    {"c":[{"v":"Lot 3"},{"v":""}]}
]}}"#;

const BIDS_JSON: &str = r#"{"table":{"rows":[
    {"c":[{"v":"Lot 1"},{"v":500.0}]},
    {"c":[{"v":"Lot 3"},{"v":null}]},
    {"c":[{"v":2},{"v":"700"}]},
    {"c":[{"v":null},{"v":900}]}
]}}"#;

#[test]
fn parses_lot_listing_rows() -> Result<()> {
    let rows = parse_response(&wrap(LOTS_JSON))?;

    assert_eq!(
        lots_from_rows(&rows),
        vec![
            Lot::new("Lot 1", Some("https://img.example/1.jpg".to_owned())),
            Lot::new("2", None),
            Lot::new("Lot 3", None),
        ]
    );
    Ok(())
}

#[test]
fn parses_bid_board_rows() -> Result<()> {
    let rows = parse_response(&wrap(BIDS_JSON))?;

    assert_eq!(
        bids_from_rows(&rows)?,
        bids(&[("Lot 1", 500), ("Lot 3", 0), ("2", 700)])
    );
    Ok(())
}

#[test]
fn rejects_unusable_bid_values() -> Result<()> {
    for value in ["-100", "412.5", "\"lots\"", "true"] {
        let json = format!(r#"{{"table":{{"rows":[{{"c":[{{"v":"A"}},{{"v":{value}}}]}}]}}}}"#);
        let rows = parse_response(&wrap(&json))?;
        assert!(bids_from_rows(&rows).is_err(), "{value} should not parse");
    }
    Ok(())
}

#[test]
fn rejects_unwrapped_or_malformed_responses() {
    assert!(parse_response(LOTS_JSON).is_err());
    assert!(parse_response("google.visualization.Query.setResponse({\"table\":").is_err());
    assert!(parse_response(&wrap("{\"rows\":[]}")).is_err());
}

fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()?)
}

#[tokio::test]
async fn loads_a_session_from_the_spreadsheet() -> Result<()> {
    let server = MockServer::start().await;
    for (sheet, json) in [(LOT_LISTINGS_SHEET, LOTS_JSON), (BID_BOARD_SHEET, BIDS_JSON)] {
        Mock::given(method("GET"))
            .and(path("/spreadsheets/d/sheet-id/gviz/tq"))
            .and(query_param("tqx", "out:json"))
            .and(query_param("sheet", sheet))
            .respond_with(ResponseTemplate::new(200).set_body_string(wrap(json)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let source = GvizCatalogSource::new(
        http_client()?,
        Url::parse(&server.uri())?,
        "sheet-id",
        LOT_LISTINGS_SHEET,
        BID_BOARD_SHEET,
    );
    let session = Session::load(&source).await?;

    assert_eq!(session.catalog.lots(), ["Lot 1", "2", "Lot 3"]);
    assert_eq!(session.board.get("Lot 1"), 500);
    assert_eq!(session.board.get("2"), 700);
    assert_eq!(session.board.get("Lot 3"), 0);
    Ok(())
}

#[tokio::test]
async fn sheet_errors_fail_the_load() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = GvizCatalogSource::new(
        http_client()?,
        Url::parse(&server.uri())?,
        "sheet-id",
        LOT_LISTINGS_SHEET,
        BID_BOARD_SHEET,
    );
    assert!(Session::load(&source).await.is_err());
    Ok(())
}

#[tokio::test]
async fn web_app_recorder_posts_the_bid_form() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/exec"))
        .and(body_string_contains("saleLot=Lot+1"))
        .and(body_string_contains("bidderName=Ada+Lovelace"))
        .and(body_string_contains("biddingNumber=17"))
        .and(body_string_contains("bidAmount=500"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "success"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let recorder = WebAppBidRecorder::new(
        http_client()?,
        Url::parse(&format!("{}/exec", server.uri()))?,
    );
    recorder.record("Lot 1", "Ada Lovelace", "17", 500).await?;
    Ok(())
}

#[tokio::test]
async fn web_app_recorder_failures() -> Result<()> {
    for response in [
        ResponseTemplate::new(500),
        ResponseTemplate::new(200).set_body_string("<html>moved</html>"),
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "error"})),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(response)
            .mount(&server)
            .await;

        let recorder = WebAppBidRecorder::new(http_client()?, Url::parse(&server.uri())?);
        assert!(recorder.record("Lot 1", "Ada", "17", 500).await.is_err());
    }
    Ok(())
}

#[tokio::test]
async fn web_app_recorder_times_out() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"result": "success"}))
                .set_delay(std::time::Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_millis(100))
        .build()?;
    let recorder = WebAppBidRecorder::new(client, Url::parse(&server.uri())?);

    let err = recorder
        .record("Lot 1", "Ada", "17", 500)
        .await
        .expect_err("response is too slow");
    assert!(
        err.downcast_ref::<reqwest::Error>()
            .map_or(false, reqwest::Error::is_timeout),
        "unexpected error: {err:?}"
    );

    // through the controller a timeout is an ordinary failed submission
    let mut session = session_with(&["Lot 1"], &[]).await?;
    let mut controller = SubmissionController::new(Arc::new(recorder));
    let err = controller
        .submit(
            &mut session,
            BidSubmission {
                lot: "Lot 1".to_owned(),
                bidder_name: "Ada".to_owned(),
                bidder_number: "17".to_owned(),
                amount: Some(500),
            },
        )
        .await
        .expect_err("response is too slow");
    assert!(matches!(err, SubmitError::Submission(_)));
    assert_eq!(session.board.get("Lot 1"), 0);
    Ok(())
}
