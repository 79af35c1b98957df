//! Catalog types, catalog type attributes and catalog entries against a mocked
//! incident.io API.

mod common;

use common::{annotations, configured, request_bodies};
use serde_json::{json, Value};
use terraform_provider_incident::testing::{
    assert_client_error, assert_plan_no_changes, assert_plan_replaces,
    assert_plan_updates_in_place,
};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn team_type(name: &str, version: i64, attributes: Value) -> Value {
    json!({
        "catalog_type": {
            "id": "01TEAM",
            "name": name,
            "description": "Owning team",
            "type_name": "Custom[\"Team\"]",
            "annotations": {"incident.io/terraform/version": "1.2.3"},
            "schema": {"version": version, "attributes": attributes}
        }
    })
}

fn team_state(name: &str) -> Value {
    json!({
        "id": "01TEAM",
        "name": name,
        "type_name": "Custom[\"Team\"]",
        "description": "Owning team",
        "source_repo_url": null
    })
}

mod catalog_type {
    use super::*;

    #[tokio::test]
    async fn test_create_derives_type_name() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/catalog_types"))
            .and(body_partial_json(json!({
                "name": "Team",
                "description": "Owning team",
                "annotations": annotations()
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(team_type("Team", 1, json!([]))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/catalog_types/01TEAM"))
            .respond_with(ResponseTemplate::new(200).set_body_json(team_type("Team", 1, json!([]))))
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let state = assert_ok!(
            tester
                .lifecycle_create(
                    "incident_catalog_type",
                    json!({"name": "Team", "description": "Owning team"}),
                )
                .await
        );

        assert_eq!(state, team_state("Team"));

        let created = request_bodies(&server, "POST", "/v2/catalog_types").await;
        assert_eq!(created.len(), 1);
        assert!(created[0].get("type_name").is_none());
        assert!(created[0].get("source_repo_url").is_none());
    }

    #[tokio::test]
    async fn test_replan_of_created_type_is_empty() {
        let server = MockServer::start().await;
        let tester = configured(&server).await;

        let plan = assert_ok!(
            tester
                .plan_update(
                    "incident_catalog_type",
                    team_state("Team"),
                    json!({"name": "Team", "description": "Owning team"}),
                )
                .await
        );

        assert_plan_no_changes(&plan);
        assert_eq!(plan.planned_state, team_state("Team"));
    }

    #[tokio::test]
    async fn test_blank_repo_url_replans_empty() {
        let server = MockServer::start().await;
        let tester = configured(&server).await;

        let plan = assert_ok!(
            tester
                .plan_update(
                    "incident_catalog_type",
                    team_state("Team"),
                    json!({"name": "Team", "description": "Owning team", "source_repo_url": ""}),
                )
                .await
        );

        assert_plan_no_changes(&plan);
        assert_eq!(plan.planned_state["source_repo_url"], Value::Null);
    }

    #[tokio::test]
    async fn test_update_never_sends_type_name() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v2/catalog_types/01TEAM"))
            .and(body_json(json!({
                "name": "Teams",
                "description": "Owning team",
                "annotations": annotations()
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(team_type("Teams", 1, json!([]))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/catalog_types/01TEAM"))
            .respond_with(ResponseTemplate::new(200).set_body_json(team_type("Teams", 1, json!([]))))
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let plan = assert_ok!(
            tester
                .plan_update(
                    "incident_catalog_type",
                    team_state("Team"),
                    json!({"name": "Teams", "description": "Owning team"}),
                )
                .await
        );
        assert_plan_updates_in_place(&plan);

        let state = assert_ok!(
            tester
                .lifecycle_update(
                    "incident_catalog_type",
                    team_state("Team"),
                    json!({"name": "Teams", "description": "Owning team"}),
                )
                .await
        );
        assert_eq!(state, team_state("Teams"));
    }

    #[tokio::test]
    async fn test_changing_type_name_replaces() {
        let server = MockServer::start().await;
        let tester = configured(&server).await;

        let plan = assert_ok!(
            tester
                .plan_update(
                    "incident_catalog_type",
                    team_state("Team"),
                    json!({
                        "name": "Team",
                        "description": "Owning team",
                        "type_name": "Custom[\"Squad\"]"
                    }),
                )
                .await
        );

        assert_plan_replaces(&plan);
    }

    #[tokio::test]
    async fn test_read_after_delete_fails() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v2/catalog_types/01TEAM"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/catalog_types/01TEAM"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_string(r#"{"type":"not_found","status":404}"#),
            )
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        assert_ok!(
            tester
                .lifecycle_delete("incident_catalog_type", team_state("Team"))
                .await
        );

        let err = assert_err!(tester.read("incident_catalog_type", team_state("Team")).await);
        assert_client_error(&err, "Unable to read catalog type, got error:");
        assert_client_error(&err, r#""type":"not_found""#);
    }
}

mod catalog_type_attributes {
    use super::*;

    #[tokio::test]
    async fn test_create_submits_full_schema_at_current_version() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/catalog_types/01TEAM"))
            .respond_with(ResponseTemplate::new(200).set_body_json(team_type("Team", 3, json!([]))))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/catalog_types/01TEAM/actions/update_schema"))
            .and(body_json(json!({
                "version": 3,
                "attributes": [
                    {"name": "Slack channel", "type": "SlackChannel", "array": false},
                    {"name": "Members", "type": "User", "array": true}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(team_type(
                "Team",
                4,
                json!([
                    {"id": "01A", "name": "Slack channel", "type": "SlackChannel", "array": false},
                    {"id": "01B", "name": "Members", "type": "User", "array": true}
                ]),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let plan = assert_ok!(
            tester
                .plan_create(
                    "incident_catalog_type_attributes",
                    json!({
                        "catalog_type_id": "01TEAM",
                        "attributes": [
                            {"name": "Slack channel", "type": "SlackChannel"},
                            {"name": "Members", "type": "User", "array": true}
                        ]
                    }),
                )
                .await
        );
        let state = assert_ok!(
            tester
                .create("incident_catalog_type_attributes", plan.planned_state)
                .await
        );

        assert_eq!(state["id"], "01TEAM");
        assert_eq!(state["catalog_type_id"], "01TEAM");
        assert_eq!(state["attributes"][0]["id"], "01A");
        assert_eq!(state["attributes"][1]["array"], true);
    }

    #[tokio::test]
    async fn test_delete_submits_empty_schema() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/catalog_types/01TEAM"))
            .respond_with(ResponseTemplate::new(200).set_body_json(team_type(
                "Team",
                7,
                json!([{"id": "01A", "name": "Owner", "type": "String", "array": false}]),
            )))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2/catalog_types/01TEAM/actions/update_schema"))
            .and(body_json(json!({"version": 7, "attributes": []})))
            .respond_with(ResponseTemplate::new(200).set_body_json(team_type("Team", 8, json!([]))))
            .expect(1)
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        assert_ok!(
            tester
                .delete(
                    "incident_catalog_type_attributes",
                    json!({
                        "id": "01TEAM",
                        "catalog_type_id": "01TEAM",
                        "attributes": [{"id": "01A", "name": "Owner", "type": "String", "array": false}]
                    }),
                )
                .await
        );
    }

    #[tokio::test]
    async fn test_import_reads_schema() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/catalog_types/01TEAM"))
            .respond_with(ResponseTemplate::new(200).set_body_json(team_type(
                "Team",
                2,
                json!([{"id": "01A", "name": "Owner", "type": "String", "array": false}]),
            )))
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let state = assert_ok!(
            tester
                .lifecycle_import("incident_catalog_type_attributes", "01TEAM")
                .await
        );

        assert_eq!(
            state,
            json!({
                "id": "01TEAM",
                "catalog_type_id": "01TEAM",
                "attributes": [{"id": "01A", "name": "Owner", "type": "String", "array": false}]
            })
        );
    }
}

mod catalog_entry {
    use super::*;

    fn entry(name: &str) -> Value {
        json!({
            "catalog_entry": {
                "id": "01ENTRY",
                "catalog_type_id": "01TEAM",
                "name": name,
                "aliases": ["payments"],
                "rank": 0,
                "attribute_values": {
                    "01A": {"value": {"literal": "#payments", "label": "#payments"}},
                    "01B": {"array_value": [{"literal": "01U"}, {"literal": "02U"}]}
                }
            }
        })
    }

    #[tokio::test]
    async fn test_create_sends_bindings_and_annotations() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/catalog_entries"))
            .and(body_json(json!({
                "catalog_type_id": "01TEAM",
                "name": "Payments",
                "aliases": ["payments"],
                "attribute_values": {
                    "01A": {"value": {"literal": "#payments"}},
                    "01B": {"array_value": [{"literal": "01U"}, {"literal": "02U"}]}
                },
                "annotations": annotations()
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(entry("Payments")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/catalog_entries/01ENTRY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(entry("Payments")))
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let state = assert_ok!(
            tester
                .lifecycle_create(
                    "incident_catalog_entry",
                    json!({
                        "catalog_type_id": "01TEAM",
                        "name": "Payments",
                        "aliases": ["payments"],
                        "external_id": "",
                        "attribute_values": [
                            {"attribute": "01A", "value": "#payments"},
                            {"attribute": "01B", "array_value": ["01U", "02U"]},
                            {"attribute": "01C", "array_value": []}
                        ]
                    }),
                )
                .await
        );

        assert_eq!(state["id"], "01ENTRY");
        assert_eq!(state["rank"], 0);
        assert!(state["external_id"].is_null());
        assert_eq!(state["attribute_values"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_moving_entry_to_another_type_replaces() {
        let server = MockServer::start().await;
        let tester = configured(&server).await;

        let prior = json!({
            "id": "01ENTRY",
            "catalog_type_id": "01TEAM",
            "name": "Payments",
            "external_id": null,
            "aliases": null,
            "rank": 0,
            "attribute_values": null
        });
        let plan = assert_ok!(
            tester
                .plan_update(
                    "incident_catalog_entry",
                    prior,
                    json!({"catalog_type_id": "01SERVICE", "name": "Payments"}),
                )
                .await
        );

        assert_plan_replaces(&plan);
        assert_eq!(plan.planned_state["rank"], 0);
    }

    #[tokio::test]
    async fn test_update_error_carries_body() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v2/catalog_entries/01ENTRY"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_string(r#"{"errors":[{"message":"external_id already in use"}]}"#),
            )
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let err = assert_err!(
            tester
                .update(
                    "incident_catalog_entry",
                    json!({"id": "01ENTRY"}),
                    json!({
                        "id": "01ENTRY",
                        "catalog_type_id": "01TEAM",
                        "name": "Payments",
                        "external_id": "PAY"
                    }),
                )
                .await
        );

        assert_client_error(&err, "external_id already in use");
    }
}
