#[cfg(test)]
mod tests {
    use hyper::{body, Body, Client, Method, Request};
    use std::{collections::HashMap, fs, io::Write};
    use tfvcr::{
        Cassette, Error, HarnessConfiguration, InteractionData, Origin, PlaybackServer,
        RequestData, ResponseData, TestCase, TestStep, VcrMode,
    };
    use tfvcr_presubmit::{
        diff_processor, publish, summarize, BuildState, CollaboratorError, CommentRenderer,
        DiffCommentData, Downstream, ErrorLedger, GithubClient, ProviderReport, PublishContext,
        ServiceLabeler,
    };

    fn init_logging() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn recorded_session() -> Cassette {
        Cassette::from_interactions(vec![
            InteractionData {
                interaction_number: 0,
                request_data: RequestData {
                    url: "https://compute.googleapis.com/compute/v1/projects/p/global/networks".into(),
                    method: "POST".into(),
                    headers: headers(&[
                        ("Content-Type", "application/json"),
                        ("User-Agent", "Terraform/1.5.7 terraform-provider-google-beta/5.0.0"),
                    ]),
                    body: r#"{"name":"net","autoCreateSubnetworks":false}"#.into(),
                },
                response_data: ResponseData {
                    status_code: 200,
                    headers: headers(&[("Content-Type", "application/json")]),
                    body: r#"{"kind":"compute#operation","status":"DONE"}"#.into(),
                },
            },
            InteractionData {
                interaction_number: 1,
                request_data: RequestData {
                    url: "https://compute.googleapis.com/compute/v1/projects/p/global/networks/net?alt=json".into(),
                    method: "GET".into(),
                    headers: HashMap::new(),
                    body: String::new(),
                },
                response_data: ResponseData {
                    status_code: 200,
                    headers: headers(&[("Content-Type", "application/json")]),
                    body: r#"{"name":"net"}"#.into(),
                },
            },
        ])
    }

    fn replaying_configuration(dir: &std::path::Path) -> HarnessConfiguration {
        let dir = dir.to_string_lossy().into_owned();
        HarnessConfiguration::from_lookup(move |key: &str| match key {
            "VCR_MODE" => Some("REPLAYING".to_string()),
            "VCR_PATH" => Some(dir.clone()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn replays_a_cassette_from_disk() {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        let configuration = replaying_configuration(dir.path());
        assert_eq!(configuration.mode(), VcrMode::Replaying);
        recorded_session()
            .save(configuration.cassette_path("TestAccComputeNetwork_basic").unwrap())
            .unwrap();

        let cassette = configuration.load_cassette("TestAccComputeNetwork_basic").unwrap();
        let server = PlaybackServer::start(cassette, Origin::new("https", "compute.googleapis.com"))
            .await
            .unwrap();
        let client = Client::new();

        let create = Request::builder()
            .method(Method::POST)
            .uri(server.url("/compute/v1/projects/p/global/networks"))
            .header("Content-Type", "application/json")
            .header("User-Agent", "Terraform/1.6.0 terraform-provider-google/5.1.0")
            .body(Body::from(r#"{"autoCreateSubnetworks": false, "name": "net"}"#))
            .unwrap();
        let response = client.request(create).await.unwrap();
        assert_eq!(response.status(), 200);
        let operation = body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&operation[..], br#"{"kind":"compute#operation","status":"DONE"}"#);

        let read = client
            .get(
                server
                    .url("/compute/v1/projects/p/global/networks/net?alt=json")
                    .parse()
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(read.status(), 200);

        server.finish().await.unwrap();
    }

    #[tokio::test]
    async fn second_read_of_a_single_recording_fails() {
        init_logging();
        let server = PlaybackServer::start(
            recorded_session(),
            Origin::new("https", "compute.googleapis.com"),
        )
        .await
        .unwrap();
        let client = Client::new();
        let url = server.url("/compute/v1/projects/p/global/networks/net?alt=json");

        let first = client.get(url.parse().unwrap()).await.unwrap();
        let second = client.get(url.parse().unwrap()).await.unwrap();

        assert_eq!(first.status(), 200);
        assert_eq!(second.status(), 500);
        match server.finish().await {
            Err(Error::UnmatchedRequests(requests)) => assert_eq!(
                requests,
                vec!["GET https://compute.googleapis.com/compute/v1/projects/p/global/networks/net?alt=json".to_string()]
            ),
            other => panic!("expected unmatched requests, got {:?}", other),
        }
    }

    const SUBSCRIPTION_CONFIG: &str = r#"resource "google_pubsub_topic" "example" {
  provider = google-beta
  name     = "example-topic"
}

resource "google_pubsub_subscription" "example" {
  provider = google-beta
  name     = "example-subscription"
  topic    = google_pubsub_topic.example.id
}
"#;

    const PROVIDERLESS_CONFIG: &str = r#"resource "google_pubsub_topic" "example" {
  name = "example-topic"
}
"#;

    #[test]
    fn release_diff_expands_an_acceptance_test() {
        init_logging();
        let mut configuration = HarnessConfiguration::new(VcrMode::Live);
        configuration.set_release_diff("google-beta", "google-local");
        let test_case = TestCase::new(
            "TestAccPubsubSubscription_basic",
            vec![
                TestStep::with_config(SUBSCRIPTION_CONFIG),
                TestStep::import("google_pubsub_subscription.example"),
                TestStep::with_config(PROVIDERLESS_CONFIG),
                TestStep::import("google_pubsub_topic.example"),
                TestStep::with_config(SUBSCRIPTION_CONFIG.replace("example-subscription", "renamed")),
            ],
        );
        let mut log = tempfile::NamedTempFile::new().unwrap();

        let expanded = configuration.prepare_test_case(test_case, log.as_file_mut());
        log.flush().unwrap();

        assert_eq!(expanded.steps.len(), 8);
        let plan_only: Vec<_> = expanded.steps.iter().map(|s| s.plan_only).collect();
        assert_eq!(plan_only, vec![false, true, false, false, true, false, false, true]);

        let retargeted = expanded.steps[1].config.as_deref().unwrap();
        assert_eq!(retargeted.matches("provider = google-local").count(), 2);
        assert!(!retargeted.contains("google-beta"));

        let inserted = expanded.steps[4].config.as_deref().unwrap();
        assert!(inserted.starts_with("resource \"google_pubsub_topic\" \"example\" {\n  provider = google-local\n"));

        let contents = fs::read_to_string(log.path()).unwrap();
        assert!(contents.starts_with("TestAccPubsubSubscription_basic: comparing google-beta with google-local"));
    }

    #[derive(Default)]
    struct RecordingGithub {
        statuses: std::cell::RefCell<Vec<(String, BuildState)>>,
        comments: std::cell::RefCell<Vec<String>>,
    }

    impl GithubClient for RecordingGithub {
        fn post_build_status(
            &self,
            _pr_number: u64,
            context: &str,
            state: BuildState,
            _target_url: &str,
            _commit_sha: &str,
        ) -> Result<(), CollaboratorError> {
            self.statuses.borrow_mut().push((context.into(), state));
            Ok(())
        }

        fn add_labels(&self, _pr_number: u64, _labels: &[String]) -> Result<(), CollaboratorError> {
            Err("403 Resource not accessible by integration".into())
        }

        fn post_comment(&self, _pr_number: u64, comment: &str) -> Result<(), CollaboratorError> {
            self.comments.borrow_mut().push(comment.into());
            Ok(())
        }
    }

    struct PubsubLabeler;

    impl ServiceLabeler for PubsubLabeler {
        fn has_rules(&self) -> bool {
            true
        }

        fn labels_for(&self, resources: &[String]) -> Vec<String> {
            resources
                .iter()
                .filter(|r| self.covers(r))
                .map(|_| "service/pubsub".to_string())
                .collect()
        }

        fn covers(&self, resource: &str) -> bool {
            resource.starts_with("google_pubsub_")
        }
    }

    struct JsonRenderer;

    impl CommentRenderer for JsonRenderer {
        fn render(&self, data: &DiffCommentData) -> Result<String, CollaboratorError> {
            Ok(serde_json::to_string(data)?)
        }
    }

    #[test]
    fn diff_processor_output_becomes_a_comment() {
        init_logging();
        let mut beta = ProviderReport::new(Downstream::Beta);
        beta.breaking_changes = diff_processor::parse_breaking_changes(
            r#"[{"Message":"Resource `google_pubsub_lite_topic` was removed","DocumentationReference":""}]"#,
        )
        .unwrap();
        beta.schema_diff = diff_processor::parse_schema_diff(
            r#"{"AddedResources":["google_pubsub_schema_revision"],"ModifiedResources":null,"RemovedResources":["google_pubsub_lite_topic"]}"#,
        )
        .unwrap();
        beta.changed_files = vec!["google-beta/services/pubsub/resource_pubsub_topic.go".into()];
        let mut errors = ErrorLedger::new();
        errors.push(Downstream::Conversion, "Failed to clone repo at new branch");

        let summary = summarize(Vec::new(), &[beta], &[], &PubsubLabeler, errors);
        let github = RecordingGithub::default();
        let ctx = PublishContext {
            pr_number: 9000,
            commit_sha: "sha1".into(),
            target_url: "https://example.com".into(),
        };
        publish(summary, &ctx, &github, &JsonRenderer).unwrap();

        let comment: serde_json::Value =
            serde_json::from_str(&github.comments.borrow()[0]).unwrap();
        assert_eq!(comment["AddedResources"][0], "google_pubsub_schema_revision");
        assert_eq!(comment["Errors"][0]["Title"], "`terraform-google-conversion`");
        assert_eq!(comment["Errors"][1]["Title"], "Other");
        assert_eq!(comment["Errors"][1]["Errors"][0], "Failed to update service labels");
        assert!(github
            .statuses
            .borrow()
            .iter()
            .any(|(context, state)| context == "terraform-provider-breaking-change-test"
                && *state == BuildState::Failure));
    }
}
