//! Severities, incident roles, statuses, custom fields and custom field
//! options against a mocked incident.io API.

mod common;

use common::{configured, request_bodies};
use serde_json::{json, Value};
use terraform_provider_incident::testing::{
    assert_client_error, assert_plan_changes_attribute, assert_plan_does_not_change_attribute,
    assert_plan_no_changes, assert_plan_replaces, assert_plan_updates_in_place,
};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod severity {
    use super::*;

    fn severity(rank: i64) -> Value {
        json!({
            "severity": {
                "id": "01SEV",
                "name": "Minor",
                "description": "Issues with low impact",
                "rank": rank
            }
        })
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/severities"))
            .and(body_json(json!({"name": "Minor", "description": "Issues with low impact"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(severity(2)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/severities/01SEV"))
            .respond_with(ResponseTemplate::new(200).set_body_json(severity(2)))
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let state = assert_ok!(
            tester
                .lifecycle_create(
                    "incident_severity",
                    json!({"name": "Minor", "description": "Issues with low impact"}),
                )
                .await
        );

        assert_eq!(
            state,
            json!({"id": "01SEV", "name": "Minor", "description": "Issues with low impact", "rank": 2})
        );
    }

    #[tokio::test]
    async fn test_import_matches_create() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/severities/01SEV"))
            .respond_with(ResponseTemplate::new(200).set_body_json(severity(2)))
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let imported = assert_ok!(tester.lifecycle_import("incident_severity", "01SEV").await);

        assert_eq!(
            imported,
            json!({"id": "01SEV", "name": "Minor", "description": "Issues with low impact", "rank": 2})
        );

        let plan = assert_ok!(
            tester
                .plan_update(
                    "incident_severity",
                    imported,
                    json!({"name": "Minor", "description": "Issues with low impact"}),
                )
                .await
        );
        assert_plan_no_changes(&plan);
    }

    #[tokio::test]
    async fn test_create_conflict_reports_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/severities"))
            .respond_with(ResponseTemplate::new(422).set_body_string(
                r#"{"type":"validation_error","errors":[{"message":"name is already taken"}]}"#,
            ))
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let err = assert_err!(
            tester
                .lifecycle_create(
                    "incident_severity",
                    json!({"name": "Minor", "description": "Issues with low impact"}),
                )
                .await
        );

        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.summary, "Client Error");
        assert_eq!(
            diagnostic.detail.as_deref(),
            Some(
                r#"Unable to create severity, got error: {"type":"validation_error","errors":[{"message":"name is already taken"}]}"#
            )
        );
    }
}

mod incident_role {
    use super::*;

    fn role(name: &str) -> Value {
        json!({
            "incident_role": {
                "id": "01ROLE",
                "name": name,
                "description": "Keeps everyone informed",
                "instructions": "Post updates every 30 minutes",
                "shortform": "comms",
                "role_type": "custom"
            }
        })
    }

    fn config(name: &str) -> Value {
        json!({
            "name": name,
            "description": "Keeps everyone informed",
            "instructions": "Post updates every 30 minutes",
            "shortform": "comms"
        })
    }

    #[tokio::test]
    async fn test_update_in_place() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v1/incident_roles/01ROLE"))
            .and(body_json(config("Communications")))
            .respond_with(ResponseTemplate::new(200).set_body_json(role("Communications")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/incident_roles/01ROLE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(role("Communications")))
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let mut prior = config("Comms lead");
        prior["id"] = json!("01ROLE");

        let plan = assert_ok!(
            tester
                .plan_update("incident_incident_role", prior.clone(), config("Communications"))
                .await
        );
        assert_plan_changes_attribute(&plan, "name");
        assert_plan_does_not_change_attribute(&plan, "id");
        assert_plan_updates_in_place(&plan);

        let state = assert_ok!(
            tester
                .lifecycle_update("incident_incident_role", prior, config("Communications"))
                .await
        );
        assert_eq!(state["name"], "Communications");
        assert_eq!(state["id"], "01ROLE");
        assert!(state.get("role_type").is_none());
    }

    #[tokio::test]
    async fn test_delete_failure_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/incident_roles/01ROLE"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string("the incident lead role cannot be deleted"),
            )
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let err = assert_err!(
            tester
                .delete("incident_incident_role", json!({"id": "01ROLE"}))
                .await
        );
        assert_client_error(&err, "Unable to delete incident role");
        assert_client_error(&err, "cannot be deleted");
    }
}

mod status {
    use super::*;

    fn status(name: &str) -> Value {
        json!({
            "incident_status": {
                "id": "01STATUS",
                "name": name,
                "description": "Impact is understood",
                "category": "live",
                "rank": 3
            }
        })
    }

    fn state(name: &str) -> Value {
        json!({
            "id": "01STATUS",
            "name": name,
            "description": "Impact is understood",
            "category": "live"
        })
    }

    #[tokio::test]
    async fn test_update_never_sends_category() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v1/incident_statuses/01STATUS"))
            .and(body_json(json!({"name": "Fixing", "description": "Impact is understood"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(status("Fixing")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/incident_statuses/01STATUS"))
            .respond_with(ResponseTemplate::new(200).set_body_json(status("Fixing")))
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let updated = assert_ok!(
            tester
                .lifecycle_update(
                    "incident_status",
                    state("Identified"),
                    json!({"name": "Fixing", "description": "Impact is understood", "category": "live"}),
                )
                .await
        );

        assert_eq!(updated, state("Fixing"));
    }

    #[tokio::test]
    async fn test_changing_category_replaces() {
        let server = MockServer::start().await;
        let tester = configured(&server).await;

        let plan = assert_ok!(
            tester
                .plan_update(
                    "incident_status",
                    state("Identified"),
                    json!({"name": "Identified", "description": "Impact is understood", "category": "learning"}),
                )
                .await
        );
        assert_plan_replaces(&plan);
    }

    #[tokio::test]
    async fn test_unknown_category_fails_validation() {
        let server = MockServer::start().await;
        let tester = configured(&server).await;

        assert_ok!(
            tester
                .validate_resource_config(
                    "incident_status",
                    json!({"name": "Fixing", "description": "Working on it", "category": "closed"}),
                )
                .await
        );
        assert_err!(
            tester
                .validate_resource_config(
                    "incident_status",
                    json!({"name": "Fixing", "description": "Working on it", "category": "open"}),
                )
                .await
        );
    }
}

mod custom_field {
    use super::*;

    fn field(name: &str) -> Value {
        json!({
            "custom_field": {
                "id": "01FIELD",
                "name": name,
                "description": "Which team owns the incident",
                "field_type": "single_select",
                "required": "before_closure",
                "show_before_creation": true,
                "show_before_closure": true,
                "show_before_update": false,
                "show_in_announcement_post": true
            }
        })
    }

    fn config(name: &str) -> Value {
        json!({
            "name": name,
            "description": "Which team owns the incident",
            "field_type": "single_select",
            "required": "before_closure",
            "show_before_creation": true,
            "show_before_closure": true,
            "show_before_update": false
        })
    }

    #[tokio::test]
    async fn test_create_and_update_round_trip() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/custom_fields"))
            .and(body_json(config("Team")))
            .respond_with(ResponseTemplate::new(201).set_body_json(field("Team")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/v1/custom_fields/01FIELD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(field("Owning team")))
            .expect(1)
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let plan = assert_ok!(tester.plan_create("incident_custom_field", config("Team")).await);
        let created = assert_ok!(tester.create("incident_custom_field", plan.planned_state).await);
        assert_eq!(created["id"], "01FIELD");
        assert_eq!(created["show_in_announcement_post"], true);

        let plan = assert_ok!(
            tester
                .plan_update("incident_custom_field", created.clone(), config("Owning team"))
                .await
        );
        assert_plan_updates_in_place(&plan);
        assert_plan_does_not_change_attribute(&plan, "show_in_announcement_post");

        let updated = assert_ok!(
            tester
                .update("incident_custom_field", created, plan.planned_state)
                .await
        );
        assert_eq!(updated["name"], "Owning team");

        let sent = request_bodies(&server, "PUT", "/v1/custom_fields/01FIELD").await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].get("field_type").is_none());
        assert_eq!(sent[0]["show_in_announcement_post"], true);
    }

    #[tokio::test]
    async fn test_changing_field_type_replaces() {
        let server = MockServer::start().await;
        let tester = configured(&server).await;

        let mut prior = config("Team");
        prior["id"] = json!("01FIELD");
        prior["show_in_announcement_post"] = json!(true);
        let mut proposed = config("Team");
        proposed["field_type"] = json!("multi_select");

        let plan = assert_ok!(tester.plan_update("incident_custom_field", prior, proposed).await);
        assert_plan_replaces(&plan);
    }
}

mod custom_field_option {
    use super::*;

    fn option(sort_key: i64) -> Value {
        json!({
            "custom_field_option": {
                "id": "01OPT",
                "custom_field_id": "01FIELD",
                "value": "Payments",
                "sort_key": sort_key
            }
        })
    }

    #[tokio::test]
    async fn test_create_defaults_sort_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/custom_field_options"))
            .and(body_json(json!({
                "custom_field_id": "01FIELD",
                "value": "Payments",
                "sort_key": 1000
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(option(1000)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/custom_field_options/01OPT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(option(1000)))
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let state = assert_ok!(
            tester
                .lifecycle_create(
                    "incident_custom_field_option",
                    json!({"custom_field_id": "01FIELD", "value": "Payments"}),
                )
                .await
        );

        assert_eq!(
            state,
            json!({"id": "01OPT", "custom_field_id": "01FIELD", "value": "Payments", "sort_key": 1000})
        );
    }

    #[tokio::test]
    async fn test_update_keeps_owner_out_of_body() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v1/custom_field_options/01OPT"))
            .and(body_json(json!({"value": "Payments", "sort_key": 10})))
            .respond_with(ResponseTemplate::new(200).set_body_json(option(10)))
            .expect(1)
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let prior = json!({"id": "01OPT", "custom_field_id": "01FIELD", "value": "Payments", "sort_key": 1000});
        let plan = assert_ok!(
            tester
                .plan_update(
                    "incident_custom_field_option",
                    prior.clone(),
                    json!({"custom_field_id": "01FIELD", "value": "Payments", "sort_key": 10}),
                )
                .await
        );
        assert_plan_changes_attribute(&plan, "sort_key");

        let updated = assert_ok!(
            tester
                .update("incident_custom_field_option", prior, plan.planned_state)
                .await
        );
        assert_eq!(updated["sort_key"], 10);
    }
}
