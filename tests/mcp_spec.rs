//! MCP server integration tests.
//!
//! Tests are organized into three sections:
//! - Design tools: Phase 1 queue and artifact registration
//! - Implementation tools: Phase 2 queue
//! - Context tools: metadata sections and phase status

use std::path::Path;

use architect_manager::mcp::*;
use architect_manager::models::*;
use tempfile::TempDir;

const REQUIREMENTS: &str = r#"
id: R1
name: Checkout
children:
  - id: R1.1
    name: Cart
  - id: R1.2
    name: Payment
"#;

/// Helper to create a server and a project with a requirements document.
fn setup() -> (McpServer, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("requirements.yaml"), REQUIREMENTS)
        .expect("Failed to write requirements");
    (McpServer::new(), dir)
}

fn queue_request(root: &Path) -> QueueRequest {
    QueueRequest {
        project_root: root.display().to_string(),
        requirements_path: "requirements.yaml".to_string(),
    }
}

fn ui_request(root: &Path, id: &str, path: &str) -> RegisterUiComponentRequest {
    RegisterUiComponentRequest {
        project_root: root.display().to_string(),
        id: id.to_string(),
        path: path.to_string(),
        related_req_id: "R1.1".to_string(),
        ..Default::default()
    }
}

// ============================================================
// Design Tools Tests
// ============================================================

mod design_tools {
    use super::*;

    mod init_top_down_queue {
        use super::*;

        #[tokio::test]
        async fn initializes_queue_and_reports_length() {
            let (server, dir) = setup();

            let response = server
                .init_queue(Phase::Design, queue_request(dir.path()))
                .expect("Tool failed");

            assert!(matches!(
                response.outcome,
                InitOutcome::Initialized { queue_length: 3, .. }
            ));
            assert_eq!(
                response.message,
                "Initialized Phase 1 queue with 3 items for requirements file: requirements.yaml"
            );
        }

        #[tokio::test]
        async fn second_call_is_informational() {
            let (server, dir) = setup();
            server
                .init_queue(Phase::Design, queue_request(dir.path()))
                .unwrap();

            let response = server
                .init_queue(Phase::Design, queue_request(dir.path()))
                .expect("Already initialized is not an error");

            assert!(matches!(
                response.outcome,
                InitOutcome::AlreadyInitialized { .. }
            ));
        }

        #[tokio::test]
        async fn returns_error_for_blank_project_root() {
            let (server, _dir) = setup();

            let result = server.init_queue(
                Phase::Design,
                QueueRequest {
                    project_root: "  ".to_string(),
                    requirements_path: "requirements.yaml".to_string(),
                },
            );

            assert!(result.is_err());
        }

        #[tokio::test]
        async fn returns_error_for_missing_document() {
            let (server, dir) = setup();
            let mut request = queue_request(dir.path());
            request.requirements_path = "nope.yaml".to_string();

            let result = server.init_queue(Phase::Design, request);

            assert!(result.is_err());
        }
    }

    mod reset_top_down_queue {
        use super::*;

        #[tokio::test]
        async fn always_rebuilds() {
            let (server, dir) = setup();
            server
                .init_queue(Phase::Design, queue_request(dir.path()))
                .unwrap();
            server
                .pop_queue(Phase::Design, queue_request(dir.path()))
                .unwrap();

            let response = server
                .reset_queue(queue_request(dir.path()))
                .expect("Tool failed");

            assert!(response.message.starts_with("Reset Phase 1 queue"));
            let task = server
                .pop_queue(Phase::Design, queue_request(dir.path()))
                .unwrap();
            assert_eq!(task.task().unwrap().progress, "1/3");
        }
    }

    mod pop_req_to_design {
        use super::*;

        #[tokio::test]
        async fn walks_the_tree_then_completes() {
            let (server, dir) = setup();
            server
                .init_queue(Phase::Design, queue_request(dir.path()))
                .unwrap();

            let ids: Vec<String> = (0..3)
                .map(|_| {
                    let outcome = server
                        .pop_queue(Phase::Design, queue_request(dir.path()))
                        .expect("Tool failed");
                    outcome.task().unwrap().requirement.id.clone().unwrap()
                })
                .collect();
            assert_eq!(ids, vec!["R1", "R1.1", "R1.2"]);

            let done = server
                .pop_queue(Phase::Design, queue_request(dir.path()))
                .unwrap();
            assert!(done.is_completed());
        }

        #[tokio::test]
        async fn serializes_with_status_tag() {
            let (server, dir) = setup();
            server
                .init_queue(Phase::Design, queue_request(dir.path()))
                .unwrap();

            let outcome = server
                .pop_queue(Phase::Design, queue_request(dir.path()))
                .unwrap();
            let json = serde_json::to_value(&outcome).unwrap();

            assert_eq!(json["status"], "success");
            assert_eq!(json["progress"], "1/3");
            assert_eq!(json["requirement"]["children"][0]["id"], "R1.1");
        }

        #[tokio::test]
        async fn returns_error_before_init() {
            let (server, dir) = setup();

            let result = server.pop_queue(Phase::Design, queue_request(dir.path()));

            assert!(result.is_err());
        }
    }

    mod register_ui_component {
        use super::*;

        #[tokio::test]
        async fn registers_and_links() {
            let (server, dir) = setup();
            server
                .init_queue(Phase::Design, queue_request(dir.path()))
                .unwrap();
            let input: RegisterUiInput =
                ui_request(dir.path(), "UI-Cart", "web/src/Cart.vue").into();

            let reply = server.register(input.into()).expect("Tool failed");

            match reply {
                RegistrationReply::Registered(response) => {
                    assert_eq!(
                        response.message,
                        "Success: Registered UI UI-Cart and linked to R1.1"
                    );
                    assert_eq!(response.outcome.link, LinkOutcome::Linked);
                }
                other => panic!("expected registration, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn validation_failure_is_a_tool_result_not_an_error() {
            let (server, dir) = setup();
            std::fs::create_dir_all(dir.path().join("docs")).unwrap();
            std::fs::write(
                dir.path().join("docs/metadata_index.yaml"),
                "frontend:\n  root: web/src\nconstraints:\n  allowed_frontend_ext: [\".vue\"]\n",
            )
            .unwrap();
            let input: RegisterUiInput =
                ui_request(dir.path(), "UI-Cart", "web/src/Cart.tsx").into();

            let reply = server.register(input.into()).expect("Tool failed");

            match reply {
                RegistrationReply::Rejected(message) => {
                    assert!(message.starts_with("ValidationError:"));
                    assert!(message.contains(".tsx"));
                }
                other => panic!("expected rejection, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn returns_error_for_missing_id() {
            let (server, dir) = setup();
            let input: RegisterUiInput = ui_request(dir.path(), "", "web/src/Cart.vue").into();

            let result = server.register(input.into());

            assert!(result.is_err());
        }
    }
}

// ============================================================
// Implementation Tools Tests
// ============================================================

mod implementation_tools {
    use super::*;

    mod pop_req_to_implement {
        use super::*;

        #[tokio::test]
        async fn pops_leaves_first_with_interfaces() {
            let (server, dir) = setup();
            server
                .init_queue(Phase::Design, queue_request(dir.path()))
                .unwrap();
            let input: RegisterUiInput =
                ui_request(dir.path(), "UI-Cart", "web/src/Cart.vue").into();
            server.register(input.into()).unwrap();
            server
                .init_queue(Phase::Implementation, queue_request(dir.path()))
                .unwrap();

            let outcome = server
                .pop_queue(Phase::Implementation, queue_request(dir.path()))
                .expect("Tool failed");

            let task = outcome.task().expect("a task");
            assert_eq!(task.requirement.id.as_deref(), Some("R1.1"));
            let interfaces = task.requirement_interfaces.as_ref().unwrap();
            assert_eq!(interfaces.ui[0].id, "UI-Cart");
            assert_eq!(
                interfaces.ui[0].record.path.as_deref(),
                Some("web/src/Cart.vue")
            );
        }
    }
}

// ============================================================
// Context Tools Tests
// ============================================================

mod context_tools {
    use super::*;

    mod get_metadata_section {
        use super::*;

        #[tokio::test]
        async fn returns_section_from_custom_metadata_file() {
            let (server, dir) = setup();
            std::fs::create_dir_all(dir.path().join("docs")).unwrap();
            std::fs::write(
                dir.path().join("docs/metadata_index.yaml"),
                "metadata_file: docs/arch.md\nsections:\n  db: Database\n",
            )
            .unwrap();
            std::fs::write(
                dir.path().join("docs/arch.md"),
                "# Arch\n## Database\nPostgres\n## Cache\nRedis\n",
            )
            .unwrap();

            let section = server
                .metadata_section(MetadataSectionRequest {
                    project_root: dir.path().display().to_string(),
                    section_key: "db".to_string(),
                })
                .expect("Tool failed");

            assert_eq!(section.start_line, 2);
            assert_eq!(section.end_line, 4);
            assert_eq!(section.content, "## Database\nPostgres");
        }

        #[tokio::test]
        async fn returns_error_without_index() {
            let (server, dir) = setup();

            let result = server.metadata_section(MetadataSectionRequest {
                project_root: dir.path().display().to_string(),
                section_key: "db".to_string(),
            });

            assert!(result.is_err());
        }
    }

    mod get_phase_status {
        use super::*;

        #[tokio::test]
        async fn defaults_to_design_phase() {
            let (server, dir) = setup();
            server
                .init_queue(Phase::Design, queue_request(dir.path()))
                .unwrap();

            let status = server
                .phase_status(PhaseStatusRequest {
                    project_root: dir.path().display().to_string(),
                    phase: None,
                })
                .expect("Tool failed");

            assert_eq!(status.phase, Phase::Design);
            assert_eq!(status.total, 3);
            assert_eq!(status.next_id.as_deref(), Some("R1"));
        }

        #[tokio::test]
        async fn returns_error_for_invalid_phase() {
            let (server, dir) = setup();

            let result = server.phase_status(PhaseStatusRequest {
                project_root: dir.path().display().to_string(),
                phase: Some("three".to_string()),
            });

            assert!(result.is_err());
        }
    }
}
