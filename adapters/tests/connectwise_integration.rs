use adapters::ConnectWiseClient;
use chrono::NaiveDate;
use config::ConnectWiseConfig;
use errors::SourceError;
use recap_core::{RecordDirectory, RecordQuery, RecordSource};
use serde_json::json;
use wiremock::matchers::{basic_auth, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ConnectWiseConfig {
    ConnectWiseConfig {
        company_id: "acme".to_string(),
        public_key: "pub".to_string(),
        private_key: "priv".to_string(),
        client_id: Some("client-123".to_string()),
        api_base: Some(server.uri()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_get_notes_maps_fields_and_sends_auth() {
    let mock_server = MockServer::start().await;
    let client = ConnectWiseClient::new(&config_for(&mock_server)).unwrap();

    Mock::given(method("GET"))
        .and(path("/service/tickets/42/notes"))
        .and(basic_auth("acme+pub", "priv"))
        .and(header("clientId", "client-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "dateCreated": "2024-01-01T10:00:00Z", "text": "Replaced toner" },
            { "dateCreated": "2024-01-02T09:00:00Z", "text": null }
        ])))
        .mount(&mock_server)
        .await;

    let notes = client.get_notes("42").await.unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].created_at, "2024-01-01T10:00:00Z");
    assert_eq!(notes[0].text, "Replaced toner");
    assert_eq!(notes[1].text, "");
}

#[tokio::test]
async fn test_get_time_entries_filters_by_ticket() {
    let mock_server = MockServer::start().await;
    let client = ConnectWiseClient::new(&config_for(&mock_server)).unwrap();

    Mock::given(method("GET"))
        .and(path("/time/entries"))
        .and(query_param("conditions", "ticket/id=42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "actualHours": 1.5 },
            { "actualHours": null },
            {}
        ])))
        .mount(&mock_server)
        .await;

    let entries = client.get_time_entries("42").await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].hours, Some(1.5));
    assert_eq!(entries[1].hours, None);
    assert_eq!(entries[2].hours, None);
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let mock_server = MockServer::start().await;
    let client = ConnectWiseClient::new(&config_for(&mock_server)).unwrap();

    Mock::given(method("GET"))
        .and(path("/service/tickets/9/notes"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&mock_server)
        .await;

    let err = client.get_notes("9").await.unwrap_err();
    assert_eq!(
        err,
        SourceError::Status {
            endpoint: "service/tickets/9/notes".to_string(),
            status: 404,
            body: Some("not found".to_string())
        }
    );
}

#[tokio::test]
async fn test_malformed_payload_is_an_error() {
    let mock_server = MockServer::start().await;
    let client = ConnectWiseClient::new(&config_for(&mock_server)).unwrap();

    Mock::given(method("GET"))
        .and(path("/time/entries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&mock_server)
        .await;

    let err = client.get_time_entries("1").await.unwrap_err();
    assert!(matches!(err, SourceError::Malformed { .. }));
}

#[tokio::test]
async fn test_fetch_records_concatenates_boards_service_first() {
    let mock_server = MockServer::start().await;
    let client = ConnectWiseClient::new(&config_for(&mock_server)).unwrap();
    let conditions = "(owner/identifier=\"jdoe\") AND (dateEntered >= [2024-01-01] AND dateEntered <= [2024-03-31])";

    Mock::given(method("GET"))
        .and(path("/service/tickets"))
        .and(query_param("conditions", conditions))
        .and(query_param("orderBy", "dateEntered desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "summary": "VPN down", "dateEntered": "2024-01-05", "dateClosed": "2024-01-06" },
            { "id": 2, "summary": "New laptop", "dateEntered": "2024-02-01" }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/project/tickets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 100, "summary": "Office move" }
        ])))
        .mount(&mock_server)
        .await;

    let query = RecordQuery::for_owner("jdoe").between(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    );
    let records = client.fetch_records(&query).await.unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "100"]);
    assert_eq!(records[0].reference_date.as_deref(), Some("2024-01-06"));
    assert_eq!(records[1].reference_date.as_deref(), Some("2024-02-01"));
    assert_eq!(records[2].reference_date, None);
}

#[tokio::test]
async fn test_fetch_records_walks_pages_until_short_page() {
    let mock_server = MockServer::start().await;
    let config = ConnectWiseConfig {
        page_size: 2,
        ..config_for(&mock_server)
    };
    let client = ConnectWiseClient::new(&config).unwrap();

    Mock::given(method("GET"))
        .and(path("/service/tickets"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "summary": "a" },
            { "id": 2, "summary": "b" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/service/tickets"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 3, "summary": "c" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/project/tickets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let records = client.fetch_records(&RecordQuery::default()).await.unwrap();
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn test_fetch_records_drops_rows_repeated_across_pages() {
    let mock_server = MockServer::start().await;
    let config = ConnectWiseConfig {
        page_size: 2,
        ..config_for(&mock_server)
    };
    let client = ConnectWiseClient::new(&config).unwrap();

    Mock::given(method("GET"))
        .and(path("/service/tickets"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 9, "summary": "newest" },
            { "id": 8, "summary": "older" }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/service/tickets"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 8, "summary": "older" }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/project/tickets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 9, "summary": "newest" }
        ])))
        .mount(&mock_server)
        .await;

    let records = client.fetch_records(&RecordQuery::default()).await.unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["9", "8"]);
}

#[tokio::test]
async fn test_failed_board_is_treated_as_empty() {
    let mock_server = MockServer::start().await;
    let client = ConnectWiseClient::new(&config_for(&mock_server)).unwrap();

    Mock::given(method("GET"))
        .and(path("/service/tickets"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/project/tickets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 5, "summary": "Cabling" }
        ])))
        .mount(&mock_server)
        .await;

    let records = client.fetch_records(&RecordQuery::default()).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "5");
}

#[tokio::test]
async fn test_list_members_active_only() {
    let mock_server = MockServer::start().await;
    let client = ConnectWiseClient::new(&config_for(&mock_server)).unwrap();

    Mock::given(method("GET"))
        .and(path("/system/members"))
        .and(query_param("conditions", "inactiveFlag=false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "identifier": "jdoe", "firstName": "Jane", "lastName": "Doe" },
            { "firstName": "No", "lastName": "Identifier" },
            { "identifier": "bot", "firstName": "", "lastName": "" }
        ])))
        .mount(&mock_server)
        .await;

    let members = client.list_members().await.unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].identifier, "jdoe");
    assert_eq!(members[0].name, "Jane Doe");
    assert_eq!(members[1].name, "");
}

#[tokio::test]
async fn test_sample_ticket_returns_first_raw_ticket() {
    let mock_server = MockServer::start().await;
    let client = ConnectWiseClient::new(&config_for(&mock_server)).unwrap();

    Mock::given(method("GET"))
        .and(path("/service/tickets"))
        .and(query_param("pageSize", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 77, "summary": "Raw", "board": { "name": "Help Desk" } }
        ])))
        .mount(&mock_server)
        .await;

    let ticket = client.sample_ticket().await.unwrap().unwrap();
    assert_eq!(ticket["board"]["name"], "Help Desk");
}
