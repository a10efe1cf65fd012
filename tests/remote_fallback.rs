//! Remote explanation cascade against a mock chat-completion service.

use std::sync::Arc;
use std::time::Duration;

use assert_cmd::Command;
use httpmock::prelude::*;
use serde_json::{Value, json};
use tempfile::tempdir;

use assessor::assessment::Assessor;
use assessor::core::Selection;
use assessor::explain::{ExplanationSource, RemoteSettings, remote_chain};
use assessor::test_utils::fixtures::{
    SAMPLE_GUIDANCE_JSON, SAMPLE_RUBRIC_JSON, sample_guidance, sample_rubric,
    selections_with_weights,
};

fn completion(content: &str) -> Value {
    json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]})
}

fn settings(server: &MockServer) -> RemoteSettings {
    RemoteSettings {
        base_url: server.base_url(),
        api_key: "integration-key".to_string(),
        timeout: Duration::from_secs(5),
        max_tokens: 200,
        max_chars: 1200,
        temperature: 0.2,
    }
}

fn variants(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

fn run_with(
    server: &MockServer,
    names: &[&str],
    selections: Vec<Selection>,
) -> assessor::assessment::Outcome {
    let chain = remote_chain(Some(settings(server)), &variants(names)).unwrap();
    let assessor = Assessor::builder()
        .rubric(Arc::new(sample_rubric()))
        .guidance(Arc::new(sample_guidance()))
        .remote(chain)
        .build();
    let mut source = selections;
    assessor.run(&mut source, None, None).unwrap()
}

#[test]
fn primary_variant_answers_every_weak_area() {
    let server = MockServer::start();
    let primary = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .header("authorization", "Bearer integration-key")
            .body_includes("\"model\":\"primary\"");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(completion("  Only grant what the feature needs.  "));
    });

    let rubric = sample_rubric();
    let outcome = run_with(&server, &["primary"], selections_with_weights(&rubric, &[5, 0, 10, 2]));

    assert_eq!(outcome.remediations.len(), 3);
    primary.assert_calls(3);
    for remediation in &outcome.remediations {
        assert_eq!(remediation.explanation.text, "Only grant what the feature needs.");
        assert_eq!(
            remediation.explanation.source,
            ExplanationSource::Remote {
                variant: "primary".to_string()
            }
        );
    }
}

#[test]
fn exhausted_remote_matches_offline_output() {
    let server = MockServer::start();
    let failing = server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(503).body("overloaded");
    });

    let rubric = sample_rubric();
    let weights = [5, 0, 10, 2];
    let remote = run_with(&server, &["a", "b"], selections_with_weights(&rubric, &weights));
    // Each weak area tries both variants.
    failing.assert_calls(6);

    let offline = Assessor::builder()
        .rubric(Arc::new(sample_rubric()))
        .guidance(Arc::new(sample_guidance()))
        .build();
    let mut source = selections_with_weights(&rubric, &weights);
    let offline = offline.run(&mut source, None, None).unwrap();

    assert_eq!(remote.remediations, offline.remediations);
    assert!(
        remote
            .remediations
            .iter()
            .all(|r| !matches!(r.explanation.source, ExplanationSource::Remote { .. }))
    );
}

#[test]
fn blank_key_never_contacts_the_service() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(completion("unused"));
    });

    let mut blank = settings(&server);
    blank.api_key = "   ".to_string();
    assert!(remote_chain(Some(blank), &variants(&["primary"])).unwrap().is_none());
    assert!(remote_chain(None, &variants(&["primary"])).unwrap().is_none());
    any.assert_calls(0);
}

#[test]
fn cli_run_falls_back_to_second_variant() {
    let server = MockServer::start();
    let primary = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_includes("\"model\":\"primary\"");
        then.status(500).body("boom");
    });
    let secondary = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_includes("\"model\":\"secondary\"");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(completion("Switch location access to While Using App."));
    });

    let dir = tempdir().unwrap();
    let config = format!(
        concat!(
            "[explain]\n",
            "api_key = \"integration-key\"\n",
            "base_url = \"{}\"\n",
            "variants = [\"primary\", \"secondary\"]\n",
            "timeout = \"5s\"\n",
        ),
        server.base_url()
    );
    std::fs::write(dir.path().join("assessor.toml"), config).unwrap();
    std::fs::write(dir.path().join("rubric.json"), SAMPLE_RUBRIC_JSON).unwrap();
    std::fs::write(dir.path().join("guidance.json"), SAMPLE_GUIDANCE_JSON).unwrap();
    // Only Q1 is imperfect.
    std::fs::write(dir.path().join("answers.json"), r#"{"Q1": 3, "Q2": 1, "Q3": 1, "Q4": 1}"#)
        .unwrap();

    let output = Command::cargo_bin("assessor")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("ASSESSOR_API_KEY")
        .env_remove("ASSESSOR_BASE_URL")
        .env_remove("ASSESSOR_VARIANTS")
        .env_remove("ASSESSOR_REMOTE_ENABLED")
        .args([
            "--quiet",
            "--json",
            "--config",
            "assessor.toml",
            "run",
            "--rubric",
            "rubric.json",
            "--guidance",
            "guidance.json",
            "--answers",
            "answers.json",
            "--no-save",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    let remediation = &json["data"]["remediations"][0];
    assert_eq!(remediation["explanation"]["text"], "Switch location access to While Using App.");
    assert_eq!(remediation["explanation"]["source"]["kind"], "remote");
    assert_eq!(remediation["explanation"]["source"]["variant"], "secondary");
    primary.assert_calls(1);
    secondary.assert_calls(1);
}
