use axum::http::StatusCode;
use axum_test::TestServer;
use draftsmith::api::middleware::SecurityConfig;
use draftsmith::api::{create_router_with_security, AppState};
use draftsmith::models::*;
use draftsmith::store::Store;
use serde_json::{json, Value};

fn setup() -> TestServer {
    setup_with_security(SecurityConfig::disabled())
}

fn setup_with_security(security: SecurityConfig) -> TestServer {
    let store = Store::open_memory().expect("Failed to create store");
    store.migrate().expect("Failed to migrate");
    let state = AppState::new(store, None);
    let app = create_router_with_security(state, security);
    TestServer::new(app).expect("Failed to create test server")
}

async fn create_test_project(server: &TestServer) -> Project {
    server
        .post("/api/v1/projects")
        .json(&CreateProjectInput {
            title: "Test Project".to_string(),
            context: Some("Project context".to_string()),
            team: None,
            institution: None,
            settings: None,
        })
        .await
        .json::<Project>()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();
        let response = server.get("/api/v1/health").await;
        response.assert_status_ok();
    }
}

mod projects {
    use super::*;

    #[tokio::test]
    async fn create_returns_the_new_project() {
        let server = setup();
        let response = server
            .post("/api/v1/projects")
            .json(&CreateProjectInput {
                title: "Fresh".to_string(),
                context: None,
                team: None,
                institution: None,
                settings: None,
            })
            .await;

        response.assert_status(StatusCode::CREATED);
        let project: Project = response.json();
        assert_eq!(project.title, "Fresh");
        assert!(project.sections.is_empty());
    }

    #[tokio::test]
    async fn get_returns_404_for_unknown_project() {
        let server = setup();
        let response = server
            .get(&format!("/api/v1/projects/{}", uuid::Uuid::new_v4()))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_changes_metadata() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .put(&format!("/api/v1/projects/{}", project.id))
            .json(&json!({"title": "Renamed"}))
            .await;

        response.assert_status_ok();
        let updated: Project = response.json();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.context, "Project context");
    }

    #[tokio::test]
    async fn delete_removes_the_project() {
        let server = setup();
        let project = create_test_project(&server).await;

        server
            .delete(&format!("/api/v1/projects/{}", project.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format!("/api/v1/projects/{}", project.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_returns_projects_ordered_by_title() {
        let server = setup();
        for title in ["Zebra", "Alpha"] {
            server
                .post("/api/v1/projects")
                .json(&json!({"title": title}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let projects: Vec<Project> = server.get("/api/v1/projects").await.json();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].title, "Alpha");
        assert_eq!(projects[1].title, "Zebra");
    }
}

mod sections {
    use super::*;

    #[tokio::test]
    async fn create_root_section_defaults_the_prompt() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .post(&format!("/api/v1/projects/{}/sections", project.id))
            .json(&json!({"name": "Overview"}))
            .await;

        response.assert_status(StatusCode::CREATED);
        let section: SectionNode = response.json();
        assert_eq!(section.name, "Overview");
        // Plain sections embed project title and context in their prompt.
        assert!(section.prompt.contains("Test Project"));
        assert!(section.prompt.contains("Project context"));
    }

    #[tokio::test]
    async fn create_nested_section_under_a_parent() {
        let server = setup();
        let project = create_test_project(&server).await;

        let parent: SectionNode = server
            .post(&format!("/api/v1/projects/{}/sections", project.id))
            .json(&json!({"name": "Methods"}))
            .await
            .json();

        let response = server
            .post(&format!("/api/v1/projects/{}/sections", project.id))
            .json(&json!({"name": "Setup", "parent_id": parent.id}))
            .await;

        response.assert_status(StatusCode::CREATED);

        let loaded: Project = server
            .get(&format!("/api/v1/projects/{}", project.id))
            .await
            .json();
        assert_eq!(loaded.sections[0].children[0].name, "Setup");
    }

    #[tokio::test]
    async fn create_under_missing_parent_returns_404() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .post(&format!("/api/v1/projects/{}/sections", project.id))
            .json(&json!({"name": "Orphan", "parent_id": uuid::Uuid::new_v4()}))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_patches_section_fields() {
        let server = setup();
        let project = create_test_project(&server).await;
        let section: SectionNode = server
            .post(&format!("/api/v1/projects/{}/sections", project.id))
            .json(&json!({"name": "Intro"}))
            .await
            .json();

        let response = server
            .put(&format!(
                "/api/v1/projects/{}/sections/{}",
                project.id, section.id
            ))
            .json(&json!({"content": "Drafted by hand."}))
            .await;

        response.assert_status_ok();
        let updated: SectionNode = response.json();
        assert_eq!(updated.content, "Drafted by hand.");
        assert_eq!(updated.id, section.id);
        assert!(updated.last_generated_at.is_none());
    }

    #[tokio::test]
    async fn update_missing_section_returns_404() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .put(&format!(
                "/api/v1/projects/{}/sections/{}",
                project.id,
                uuid::Uuid::new_v4()
            ))
            .json(&json!({"content": "x"}))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_removes_the_whole_subtree() {
        let server = setup();
        let project = create_test_project(&server).await;
        let parent: SectionNode = server
            .post(&format!("/api/v1/projects/{}/sections", project.id))
            .json(&json!({"name": "Methods"}))
            .await
            .json();
        server
            .post(&format!("/api/v1/projects/{}/sections", project.id))
            .json(&json!({"name": "Setup", "parent_id": parent.id}))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .delete(&format!(
                "/api/v1/projects/{}/sections/{}",
                project.id, parent.id
            ))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let loaded: Project = server
            .get(&format!("/api/v1/projects/{}", project.id))
            .await
            .json();
        assert!(loaded.sections.is_empty());
    }

    #[tokio::test]
    async fn numbering_reflects_tree_position() {
        let server = setup();
        let project = create_test_project(&server).await;
        let first: SectionNode = server
            .post(&format!("/api/v1/projects/{}/sections", project.id))
            .json(&json!({"name": "Intro"}))
            .await
            .json();
        let second: SectionNode = server
            .post(&format!("/api/v1/projects/{}/sections", project.id))
            .json(&json!({"name": "Methods"}))
            .await
            .json();
        let child: SectionNode = server
            .post(&format!("/api/v1/projects/{}/sections", project.id))
            .json(&json!({"name": "Setup", "parent_id": second.id}))
            .await
            .json();

        let numbering: Value = server
            .get(&format!(
                "/api/v1/projects/{}/sections/{}/numbering",
                project.id, child.id
            ))
            .await
            .json();
        assert_eq!(numbering["numbering"], "2.1");

        let numbering: Value = server
            .get(&format!(
                "/api/v1/projects/{}/sections/{}/numbering",
                project.id, first.id
            ))
            .await
            .json();
        assert_eq!(numbering["numbering"], "1");
    }
}

mod outline {
    use super::*;

    #[tokio::test]
    async fn apply_replaces_the_section_tree() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .post(&format!("/api/v1/projects/{}/outline", project.id))
            .json(&json!([
                {"name": "Intro"},
                {"name": "Diagram: Flow", "children": [{"name": "Detail"}]}
            ]))
            .await;

        response.assert_status_ok();
        let updated: Project = response.json();
        assert_eq!(updated.sections.len(), 2);
        assert_eq!(updated.sections[1].children.len(), 1);
        assert!(updated.sections[1].prompt.contains("diagram"));
    }

    #[tokio::test]
    async fn invalid_outline_is_rejected_with_the_reason() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .post(&format!("/api/v1/projects/{}/outline", project.id))
            .json(&json!([{"name": ""}]))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.text().contains("missing or invalid name"));

        // The live project is untouched.
        let loaded: Project = server
            .get(&format!("/api/v1/projects/{}", project.id))
            .await
            .json();
        assert!(loaded.sections.is_empty());
    }

    #[tokio::test]
    async fn outline_exceeding_the_depth_limit_is_rejected_whole() {
        let server = setup();
        // Default settings: constrained with max_depth 2.
        let project = create_test_project(&server).await;

        let response = server
            .post(&format!("/api/v1/projects/{}/outline", project.id))
            .json(&json!([{"name": "A", "children": [
                {"name": "B", "children": [
                    {"name": "C", "children": [{"name": "D"}]}
                ]}
            ]}]))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.text().contains("maximum depth"));
    }

    #[tokio::test]
    async fn unconstrained_projects_skip_the_depth_check() {
        let server = setup();
        let project: Project = server
            .post("/api/v1/projects")
            .json(&json!({
                "title": "Deep Document",
                "settings": {"min_sections": 1, "max_depth": 1, "constrained": false}
            }))
            .await
            .json();

        let response = server
            .post(&format!("/api/v1/projects/{}/outline", project.id))
            .json(&json!([{"name": "A", "children": [
                {"name": "B", "children": [{"name": "C"}]}
            ]}]))
            .await;

        response.assert_status_ok();
        let updated: Project = response.json();
        assert_eq!(updated.sections[0].children[0].children[0].name, "C");
    }
}

mod undo {
    use super::*;

    #[tokio::test]
    async fn undo_restores_the_previous_state() {
        let server = setup();
        let project = create_test_project(&server).await;

        server
            .post(&format!("/api/v1/projects/{}/outline", project.id))
            .json(&json!([{"name": "Intro"}, {"name": "Methods"}]))
            .await
            .assert_status_ok();
        server
            .post(&format!("/api/v1/projects/{}/sections", project.id))
            .json(&json!({"name": "Results"}))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post(&format!("/api/v1/projects/{}/undo", project.id))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["restored"], true);

        let loaded: Project = server
            .get(&format!("/api/v1/projects/{}", project.id))
            .await
            .json();
        assert_eq!(loaded.sections.len(), 2);
    }

    #[tokio::test]
    async fn undo_with_no_edits_reports_nothing_to_undo() {
        let server = setup();
        let project = create_test_project(&server).await;

        let body: Value = server
            .post(&format!("/api/v1/projects/{}/undo", project.id))
            .await
            .json();
        assert_eq!(body["restored"], false);
    }
}

mod generation {
    use super::*;

    #[tokio::test]
    async fn outline_generation_without_a_generator_returns_503() {
        let server = setup();
        let project = create_test_project(&server).await;

        server
            .post(&format!("/api/v1/projects/{}/outline/generate", project.id))
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn content_generation_without_a_generator_returns_503() {
        let server = setup();
        let project = create_test_project(&server).await;
        let section: SectionNode = server
            .post(&format!("/api/v1/projects/{}/sections", project.id))
            .json(&json!({"name": "Intro"}))
            .await
            .json();

        server
            .post(&format!(
                "/api/v1/projects/{}/sections/{}/generate",
                project.id, section.id
            ))
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn requests_without_a_key_are_rejected_when_one_is_configured() {
        let server = setup_with_security(SecurityConfig::with_api_key("secret"));
        server
            .get("/api/v1/projects")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn requests_with_the_key_pass() {
        let server = setup_with_security(SecurityConfig::with_api_key("secret"));
        server
            .get("/api/v1/projects")
            .authorization_bearer("secret")
            .await
            .assert_status_ok();
    }
}
