use super::*;
use crate::ports::completion_client::CompletionError;
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use trio_domain::{
    AggregationMethod, AggregationOutcome, CandidateStatus, CompletionDetails,
    ConversationMessage, GenerationParams, PromptRole, RawModelRef, TrioDetails,
};

// ==================== Test Infrastructure ====================

type Reply = Result<String, CompletionError>;

#[derive(Debug, Clone)]
struct RecordedCall {
    model: String,
    messages: Vec<ConversationMessage>,
}

impl RecordedCall {
    fn system_prompt(&self) -> &str {
        self.messages[0].text()
    }

    fn last_text(&self) -> &str {
        self.messages.last().map(|m| m.text()).unwrap_or_default()
    }
}

/// Client that replies from per-model scripts and records every call.
///
/// Models without a scripted reply answer `reply from <model>`.
#[derive(Default)]
struct ScriptedClient {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    fn new() -> Self {
        Self::default()
    }

    fn reply(self, model: &str, text: &str) -> Self {
        self.push(model, Ok(text.to_string()))
    }

    fn fail(self, model: &str, error: CompletionError) -> Self {
        self.push(model, Err(error))
    }

    fn delay(self, model: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(model.to_string(), delay);
        self
    }

    fn push(self, model: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn calls_to(&self, model: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.model == model)
            .collect()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[ConversationMessage],
        _params: &GenerationParams,
    ) -> Result<String, CompletionError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            messages: messages.to_vec(),
        });

        let delay = self.delays.lock().unwrap().get(model).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self
            .replies
            .lock()
            .unwrap()
            .get_mut(model)
            .and_then(|queue| queue.pop_front());
        scripted.unwrap_or_else(|| Ok(format!("reply from {}", model)))
    }
}

#[derive(Default)]
struct RecordingLogger {
    events: Mutex<Vec<ConversationEvent>>,
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn setup(client: ScriptedClient) -> (RunCompletionUseCase<ScriptedClient>, Arc<ScriptedClient>) {
    let client = Arc::new(client);
    (RunCompletionUseCase::new(client.clone()), client)
}

fn conversation() -> Vec<ConversationMessage> {
    vec![
        ConversationMessage::system("Be concise."),
        ConversationMessage::user("What is Rust?"),
    ]
}

fn spec(value: serde_json::Value) -> RawModelRef {
    serde_json::from_value(value).unwrap()
}

fn input(model: RawModelRef) -> RunCompletionInput {
    RunCompletionInput::new(model, conversation())
}

fn ensemble(method: &str, members: &[&str]) -> RawModelRef {
    spec(json!({
        "ensemble": members.iter().map(|m| json!({"model": m})).collect::<Vec<_>>(),
        "aggregation_method": method,
    }))
}

fn trio(a: &str, b: &str, c: &str) -> RawModelRef {
    spec(json!({"trio": [{"model": a}, {"model": b}, {"model": c}]}))
}

fn outcome(output: &RunCompletionOutput) -> &AggregationOutcome {
    match &output.details {
        Some(CompletionDetails::Ensemble(outcome)) => outcome,
        other => panic!("expected ensemble details, got {:?}", other),
    }
}

fn trio_details(output: &RunCompletionOutput) -> &TrioDetails {
    match &output.details {
        Some(CompletionDetails::Trio(details)) => details,
        other => panic!("expected trio details, got {:?}", other),
    }
}

fn upstream_500() -> CompletionError {
    CompletionError::Upstream {
        status: 500,
        body: "boom".to_string(),
    }
}

// ==================== Validation ====================

#[tokio::test]
async fn test_empty_messages_rejected_without_calls() {
    let (use_case, client) = setup(ScriptedClient::new());
    let error = use_case
        .execute(RunCompletionInput::new("m".into(), vec![]))
        .await
        .unwrap_err();

    assert!(error.is_client_error());
    assert_eq!(
        error,
        RunCompletionError::Domain(DomainError::validation(
            "messages",
            "At least one message is required"
        ))
    );
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_empty_model_name_rejected() {
    let (use_case, client) = setup(ScriptedClient::new());
    let error = use_case.execute(input("   ".into())).await.unwrap_err();

    match error {
        RunCompletionError::Domain(e) => assert_eq!(e.field(), Some("model")),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_judge_without_judge_model_makes_no_calls() {
    let (use_case, client) = setup(ScriptedClient::new());
    let error = use_case
        .execute(input(ensemble("judge", &["a", "b"])))
        .await
        .unwrap_err();

    match error {
        RunCompletionError::Domain(e) => assert_eq!(e.field(), Some("model.judge_model")),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_too_deep_rejected_before_any_call() {
    let client = Arc::new(ScriptedClient::new());
    let use_case = RunCompletionUseCase::new(client.clone())
        .with_params(ExecutionParams::default().with_max_depth(1));

    let nested = spec(json!({
        "trio": [
            {"model": {"ensemble": [{"model": "x"}], "aggregation_method": "concat"}},
            {"model": "b"},
            {"model": "c"}
        ]
    }));
    let error = use_case.execute(input(nested)).await.unwrap_err();

    assert_eq!(
        error,
        RunCompletionError::Domain(DomainError::CompositionTooDeep { max_depth: 1 })
    );
    assert!(client.calls().is_empty());
}

// ==================== Pass-through ====================

#[tokio::test]
async fn test_pass_through_forwards_conversation_unmodified() {
    let (use_case, client) = setup(ScriptedClient::new().reply("m", "Hello"));
    let output = use_case.execute(input("  m  ".into())).await.unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, "m");
    assert_eq!(calls[0].messages, conversation());

    assert_eq!(output.response.model, "m");
    assert_eq!(output.response.content(), "Hello");
    assert!(output.details.is_none());
}

#[tokio::test]
async fn test_pass_through_propagates_upstream_error() {
    let (use_case, _client) = setup(ScriptedClient::new().fail("m", upstream_500()));
    let error = use_case.execute(input("m".into())).await.unwrap_err();

    assert_eq!(error, RunCompletionError::Completion(upstream_500()));
    assert!(!error.is_client_error());
}

#[tokio::test(start_paused = true)]
async fn test_pass_through_timeout() {
    let client = Arc::new(ScriptedClient::new().delay("m", Duration::from_secs(60)));
    let use_case = RunCompletionUseCase::new(client).with_params(
        ExecutionParams::default().with_call_timeout(Some(Duration::from_secs(1))),
    );

    let error = use_case.execute(input("m".into())).await.unwrap_err();
    assert!(error.is_timeout());
}

// ==================== Trio ====================

#[tokio::test]
async fn test_trio_synthesizes_both_drafts() {
    let client = ScriptedClient::new()
        .reply("a", "A")
        .reply("b", "B")
        .reply("c", "Final");
    let (use_case, client) = setup(client);

    let output = use_case.execute(input(trio("a", "b", "c"))).await.unwrap();

    assert_eq!(output.response.content(), "Final");
    assert_eq!(output.response.model, "trio-1.0");
    assert_eq!(client.calls().len(), 3);

    let c_call = &client.calls_to("c")[0];
    assert_eq!(c_call.system_prompt(), PromptRole::Synthesizer.system_prompt());
    assert_eq!(c_call.last_text(), "Draft 1:\nA\n\nDraft 2:\nB");

    let details = trio_details(&output);
    assert_eq!(details.response_a, "A");
    assert_eq!(details.response_b, "B");
    assert_eq!(
        (details.model_a.as_str(), details.model_b.as_str(), details.model_c.as_str()),
        ("a", "b", "c")
    );
    assert!(details.fallback.is_none());
}

#[tokio::test]
async fn test_trio_with_failed_a_still_synthesizes() {
    let client = ScriptedClient::new()
        .fail("a", upstream_500())
        .reply("b", "B")
        .reply("c", "Final");
    let (use_case, client) = setup(client);

    let output = use_case.execute(input(trio("a", "b", "c"))).await.unwrap();

    assert_eq!(output.response.content(), "Final");
    let c_call = &client.calls_to("c")[0];
    assert_eq!(c_call.last_text(), "Draft 1:\n(no response)\n\nDraft 2:\nB");

    let details = trio_details(&output);
    assert_eq!(details.response_a, "");
    assert!(details.error_a.as_deref().unwrap().contains("500"));
    assert_eq!(details.response_b, "B");
    assert!(details.error_b.is_none());
}

#[tokio::test]
async fn test_trio_both_drafts_failed() {
    let client = ScriptedClient::new()
        .fail("a", upstream_500())
        .fail("b", CompletionError::Network("refused".to_string()));
    let (use_case, client) = setup(client);

    let error = use_case.execute(input(trio("a", "b", "c"))).await.unwrap_err();

    assert!(matches!(
        error,
        RunCompletionError::Domain(DomainError::AllMembersFailed(_))
    ));
    assert!(client.calls_to("c").is_empty());
}

#[tokio::test]
async fn test_trio_synthesizer_failure_falls_back_to_first_draft() {
    let client = ScriptedClient::new()
        .reply("a", "A")
        .reply("b", "B")
        .fail("c", CompletionError::Timeout);
    let (use_case, _client) = setup(client);

    let output = use_case.execute(input(trio("a", "b", "c"))).await.unwrap();

    assert_eq!(output.response.content(), "A");
    assert!(trio_details(&output).fallback.is_some());
}

#[tokio::test]
async fn test_member_layers_host_prompt_and_seeds() {
    let (use_case, client) = setup(ScriptedClient::new());
    let model = spec(json!({
        "trio": [
            {"model": "a", "system_prompt": "You are a skeptic."},
            {"model": "b"},
            {"model": "c"}
        ]
    }));
    use_case.execute(input(model)).await.unwrap();

    let a_call = &client.calls_to("a")[0];
    assert_eq!(
        a_call.messages,
        vec![
            ConversationMessage::system(PromptRole::Member.system_prompt()),
            ConversationMessage::system("You are a skeptic."),
            ConversationMessage::tool_invocation("hsp", "get_host_system_prompt"),
            ConversationMessage::tool_result("hsp", "Be concise."),
            ConversationMessage::user("What is Rust?"),
        ]
    );

    // B has no seeds of its own
    let b_call = &client.calls_to("b")[0];
    assert_eq!(b_call.messages.len(), 4);
}

// ==================== Ensemble ====================

#[tokio::test]
async fn test_random_makes_exactly_one_call() {
    let (use_case, client) = setup(ScriptedClient::new());
    let output = use_case
        .execute(input(ensemble("random", &["a", "b", "c"])))
        .await
        .unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    let chosen = calls[0].model.clone();
    assert!(["a", "b", "c"].contains(&chosen.as_str()));
    assert_eq!(output.response.content(), format!("reply from {}", chosen));

    let outcome = outcome(&output);
    let winner = outcome.winner_index.unwrap();
    assert_eq!(outcome.candidates[winner].model, chosen);
    assert_eq!(outcome.candidates[winner].status, CandidateStatus::Ok);
    let skipped = outcome
        .candidates
        .iter()
        .filter(|c| c.status == CandidateStatus::Skipped)
        .count();
    assert_eq!(skipped, 2);
}

#[tokio::test]
async fn test_random_chosen_member_failure_fails_request() {
    let client = ScriptedClient::new().fail("only", upstream_500());
    let (use_case, _client) = setup(client);

    let error = use_case
        .execute(input(ensemble("random", &["only"])))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        RunCompletionError::Domain(DomainError::AllMembersFailed(_))
    ));
}

#[tokio::test]
async fn test_acceptance_voting_ranks_accepted_then_preferred() {
    let client = ScriptedClient::new()
        .reply("a", "A")
        .reply("a", "ACCEPTED: 1, 2\nPREFERRED: 2")
        .reply("b", "B")
        .reply("b", "ACCEPTED: 2\nPREFERRED: 2")
        .reply("c", "C")
        .reply("c", "ACCEPTED: 1, 2, 3\nPREFERRED: 1");
    let (use_case, client) = setup(client);

    let output = use_case
        .execute(input(ensemble("acceptance_voting", &["a", "b", "c"])))
        .await
        .unwrap();

    assert_eq!(client.calls().len(), 6);
    assert_eq!(output.response.content(), "B");

    let outcome = outcome(&output);
    assert_eq!(outcome.winner_index, Some(1));
    assert_eq!(outcome.aggregation_method, AggregationMethod::AcceptanceVoting);
    assert_eq!(outcome.candidates[0].accepted, Some(2));
    assert_eq!(outcome.candidates[0].preferred, Some(1));
    assert_eq!(outcome.candidates[1].accepted, Some(3));
    assert_eq!(outcome.candidates[1].preferred, Some(2));
    assert_eq!(outcome.candidates[2].accepted, Some(1));

    let ballot_call = &client.calls_to("a")[1];
    assert_eq!(ballot_call.system_prompt(), PromptRole::Voter.system_prompt());
    assert_eq!(
        ballot_call.last_text(),
        "Draft 1:\nA\n\nDraft 2:\nB\n\nDraft 3:\nC"
    );
}

#[tokio::test]
async fn test_acceptance_voting_tie_goes_to_lowest_index() {
    let client = ScriptedClient::new()
        .reply("a", "A")
        .reply("a", "ACCEPTED: 1, 2")
        .reply("b", "B")
        .reply("b", "They are both fine.");
    let (use_case, _client) = setup(client);

    let output = use_case
        .execute(input(ensemble("acceptance_voting", &["a", "b"])))
        .await
        .unwrap();

    assert_eq!(output.response.content(), "A");
    assert_eq!(outcome(&output).winner_index, Some(0));
}

#[tokio::test]
async fn test_acceptance_voting_excludes_failed_members() {
    let client = ScriptedClient::new()
        .fail("a", CompletionError::Network("down".to_string()))
        .reply("b", "B")
        .reply("b", "ACCEPTED: 2\nPREFERRED: 2")
        .reply("c", "C")
        .reply("c", "ACCEPTED: 2\nPREFERRED: 2");
    let (use_case, client) = setup(client);

    let output = use_case
        .execute(input(ensemble("acceptance_voting", &["a", "b", "c"])))
        .await
        .unwrap();

    // Failed member neither votes nor is voted on
    assert_eq!(client.calls().len(), 5);
    assert_eq!(client.calls_to("a").len(), 1);
    assert_eq!(
        client.calls_to("b")[1].last_text(),
        "Draft 1:\nB\n\nDraft 2:\nC"
    );

    assert_eq!(output.response.content(), "C");
    let outcome = outcome(&output);
    assert_eq!(outcome.winner_index, Some(2));
    assert_eq!(outcome.candidates[0].status, CandidateStatus::Failed);
    assert_eq!(outcome.candidates[0].accepted, None);
    assert_eq!(outcome.candidates[2].accepted, Some(2));
}

#[tokio::test]
async fn test_failed_ballot_counts_as_abstention() {
    let client = ScriptedClient::new()
        .reply("a", "A")
        .fail("a", CompletionError::Network("reset".to_string()))
        .reply("b", "B")
        .reply("b", "ACCEPTED: 2\nPREFERRED: 2")
        .reply("c", "C")
        .reply("c", "ACCEPTED: 1, 2\nPREFERRED: 1");
    let (use_case, client) = setup(client);

    let output = use_case
        .execute(input(ensemble("acceptance_voting", &["a", "b", "c"])))
        .await
        .unwrap();

    assert_eq!(client.calls().len(), 6);
    assert_eq!(output.response.content(), "B");
    let outcome = outcome(&output);
    assert_eq!(outcome.winner_index, Some(1));
    assert_eq!(outcome.candidates[0].accepted, Some(1));
    assert_eq!(outcome.candidates[0].preferred, Some(1));
    assert_eq!(outcome.candidates[1].accepted, Some(2));
    assert_eq!(outcome.candidates[1].preferred, Some(1));
    assert_eq!(outcome.candidates[2].accepted, Some(0));
    assert_eq!(outcome.candidates[2].preferred, Some(0));
}

#[tokio::test]
async fn test_single_survivor_still_votes() {
    let client = ScriptedClient::new()
        .reply("a", "A")
        .reply("a", "ACCEPTED: 1\nPREFERRED: 1")
        .fail("b", CompletionError::Timeout);
    let (use_case, client) = setup(client);

    let output = use_case
        .execute(input(ensemble("acceptance_voting", &["a", "b"])))
        .await
        .unwrap();

    assert_eq!(client.calls_to("a").len(), 2);
    assert_eq!(output.response.content(), "A");
}

#[tokio::test]
async fn test_judge_picks_numbered_draft() {
    let client = ScriptedClient::new()
        .reply("a", "X")
        .reply("b", "Y")
        .reply("j", "Draft 2 is clearly better.");
    let (use_case, client) = setup(client);

    let model = spec(json!({
        "ensemble": [{"model": "a"}, {"model": "b"}],
        "aggregation_method": "judge",
        "judge_model": "j"
    }));
    let output = use_case.execute(input(model)).await.unwrap();

    assert_eq!(client.calls().len(), 3);
    assert_eq!(output.response.content(), "Y");
    assert_eq!(outcome(&output).winner_index, Some(1));
    assert!(outcome(&output).fallback.is_none());

    let judge_call = &client.calls_to("j")[0];
    assert_eq!(judge_call.system_prompt(), PromptRole::Judge.system_prompt());
    assert_eq!(judge_call.last_text(), "Draft 1:\nX\n\nDraft 2:\nY");
}

#[tokio::test]
async fn test_judge_index_maps_to_original_member() {
    let client = ScriptedClient::new()
        .fail("a", upstream_500())
        .reply("b", "Y")
        .reply("c", "Z")
        .reply("j", "2");
    let (use_case, _client) = setup(client);

    let model = spec(json!({
        "ensemble": [{"model": "a"}, {"model": "b"}, {"model": "c"}],
        "aggregation_method": "judge",
        "judge_model": "j"
    }));
    let output = use_case.execute(input(model)).await.unwrap();

    assert_eq!(output.response.content(), "Z");
    assert_eq!(outcome(&output).winner_index, Some(2));
}

#[tokio::test]
async fn test_unparseable_judge_falls_back_to_first() {
    let client = ScriptedClient::new()
        .reply("a", "X")
        .reply("b", "Y")
        .reply("j", "I cannot decide.");
    let (use_case, _client) = setup(client);

    let model = spec(json!({
        "ensemble": [{"model": "a"}, {"model": "b"}],
        "aggregation_method": "judge",
        "judge_model": "j"
    }));
    let output = use_case.execute(input(model)).await.unwrap();

    assert_eq!(output.response.content(), "X");
    assert_eq!(outcome(&output).winner_index, Some(0));
    assert!(outcome(&output).fallback.is_some());
}

#[tokio::test]
async fn test_failed_judge_call_falls_back_to_first() {
    let client = ScriptedClient::new()
        .reply("a", "X")
        .reply("b", "Y")
        .fail("j", upstream_500());
    let (use_case, client) = setup(client);

    let model = spec(json!({
        "ensemble": [{"model": "a"}, {"model": "b"}],
        "aggregation_method": "judge",
        "judge_model": "j"
    }));
    let output = use_case.execute(input(model)).await.unwrap();

    assert_eq!(client.calls().len(), 3);
    assert_eq!(output.response.content(), "X");
    let outcome = outcome(&output);
    assert_eq!(outcome.winner_index, Some(0));
    assert!(outcome.fallback.as_deref().unwrap().contains("judge failed"));
}

#[tokio::test]
async fn test_synthesize_uses_synthesizer_output() {
    let client = ScriptedClient::new()
        .reply("a", "X")
        .reply("b", "Y")
        .reply("s", "Merged");
    let (use_case, client) = setup(client);

    let model = spec(json!({
        "ensemble": [{"model": "a"}, {"model": "b"}],
        "aggregation_method": "synthesize",
        "synthesize_model": "s"
    }));
    let output = use_case.execute(input(model)).await.unwrap();

    assert_eq!(client.calls().len(), 3);
    assert_eq!(output.response.content(), "Merged");
    assert_eq!(outcome(&output).winner_index, None);
    assert_eq!(
        client.calls_to("s")[0].last_text(),
        "Draft 1:\nX\n\nDraft 2:\nY"
    );
}

#[tokio::test]
async fn test_synthesizer_failure_falls_back_to_first_survivor() {
    let client = ScriptedClient::new()
        .fail("a", upstream_500())
        .reply("b", "Y")
        .fail("s", CompletionError::Timeout);
    let (use_case, _client) = setup(client);

    let model = spec(json!({
        "ensemble": [{"model": "a"}, {"model": "b"}],
        "aggregation_method": "synthesize",
        "synthesize_model": "s"
    }));
    let output = use_case.execute(input(model)).await.unwrap();

    assert_eq!(output.response.content(), "Y");
    let outcome = outcome(&output);
    assert_eq!(outcome.winner_index, Some(1));
    assert!(outcome.fallback.as_deref().unwrap().contains("synthesizer failed"));
}

#[tokio::test]
async fn test_concat_labeled_join() {
    let client = ScriptedClient::new().reply("a", "X").reply("b", "Y");
    let (use_case, client) = setup(client);

    let output = use_case
        .execute(input(ensemble("concat", &["a", "b"])))
        .await
        .unwrap();

    assert_eq!(client.calls().len(), 2);
    assert_eq!(
        output.response.content(),
        "### Response 1 (a)\nX\n\n### Response 2 (b)\nY"
    );
    let outcome = outcome(&output);
    assert_eq!(outcome.winner_index, None);
    assert_eq!(outcome.candidates.len(), 2);
    assert_eq!(outcome.candidates[0].response, "X");
    assert_eq!(outcome.candidates[1].response, "Y");
}

#[tokio::test(start_paused = true)]
async fn test_fan_out_keeps_member_order() {
    let client = ScriptedClient::new()
        .reply("a", "X")
        .reply("b", "Y")
        .delay("a", Duration::from_secs(5));
    let (use_case, _client) = setup(client);

    let output = use_case
        .execute(input(ensemble("concat", &["a", "b"])))
        .await
        .unwrap();

    assert_eq!(
        output.response.content(),
        "### Response 1 (a)\nX\n\n### Response 2 (b)\nY"
    );
}

#[tokio::test(start_paused = true)]
async fn test_member_timeout_is_member_failure() {
    let client = Arc::new(
        ScriptedClient::new()
            .reply("b", "Y")
            .delay("a", Duration::from_secs(60)),
    );
    let use_case = RunCompletionUseCase::new(client).with_params(
        ExecutionParams::default().with_call_timeout(Some(Duration::from_secs(1))),
    );

    let output = use_case
        .execute(input(ensemble("concat", &["a", "b"])))
        .await
        .unwrap();

    assert_eq!(output.response.content(), "### Response 2 (b)\nY");
    let outcome = outcome(&output);
    assert_eq!(outcome.candidates[0].status, CandidateStatus::Failed);
    assert_eq!(outcome.candidates[0].error.as_deref(), Some("Upstream call failed: Timeout"));
}

#[tokio::test]
async fn test_all_members_failed() {
    let client = ScriptedClient::new()
        .fail("a", upstream_500())
        .fail("b", upstream_500());
    let (use_case, _client) = setup(client);

    let error = use_case
        .execute(input(ensemble("concat", &["a", "b"])))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        RunCompletionError::Domain(DomainError::AllMembersFailed(_))
    ));
    assert!(!error.is_client_error());
}

// ==================== Nesting ====================

#[tokio::test]
async fn test_nested_trio_inherits_outer_seeds() {
    let (use_case, client) = setup(ScriptedClient::new());
    let model = spec(json!({
        "ensemble": [
            {
                "model": {"trio": [
                    {"model": "x", "system_prompt": "inner"},
                    {"model": "y"},
                    {"model": "z"}
                ]},
                "system_prompt": "outer"
            },
            {"model": "b"}
        ],
        "aggregation_method": "concat"
    }));
    let output = use_case.execute(input(model)).await.unwrap();

    assert_eq!(client.calls().len(), 4);
    assert_eq!(
        output.response.content(),
        "### Response 1 (trio)\nreply from z\n\n### Response 2 (b)\nreply from b"
    );

    let x_call = &client.calls_to("x")[0];
    assert_eq!(x_call.messages[1], ConversationMessage::system("outer"));
    assert_eq!(x_call.messages[2], ConversationMessage::system("inner"));

    let z_call = &client.calls_to("z")[0];
    assert_eq!(z_call.messages[1], ConversationMessage::system("outer"));
    assert_eq!(
        z_call.last_text(),
        "Draft 1:\nreply from x\n\nDraft 2:\nreply from y"
    );

    // The unseeded sibling sees no seeds at all
    assert_eq!(client.calls_to("b")[0].messages.len(), 4);
    assert_eq!(outcome(&output).candidates[0].model, "trio");
}

#[tokio::test]
async fn test_nested_ensemble_failure_is_member_failure() {
    let client = ScriptedClient::new()
        .fail("x", upstream_500())
        .reply("b", "B")
        .reply("c", "C");
    let (use_case, _client) = setup(client);

    let model = spec(json!({
        "trio": [
            {"model": {"ensemble": [{"model": "x"}], "aggregation_method": "concat"}},
            {"model": "b"},
            {"model": "c"}
        ]
    }));
    let output = use_case.execute(input(model)).await.unwrap();

    assert_eq!(output.response.content(), "C");
    let details = trio_details(&output);
    assert_eq!(details.model_a, "ensemble");
    assert!(details.error_a.is_some());
}

// ==================== Trace logging ====================

#[tokio::test]
async fn test_trace_events_are_logged() {
    let logger = Arc::new(RecordingLogger::default());
    let client = Arc::new(ScriptedClient::new());
    let use_case = RunCompletionUseCase::new(client).with_conversation_logger(logger.clone());

    use_case
        .execute(input(ensemble("concat", &["a", "b"])))
        .await
        .unwrap();

    let types: Vec<_> = logger
        .events
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(
        types,
        vec![
            "member_generated",
            "member_generated",
            "aggregation_completed",
            "completion_finished"
        ]
    );
}

#[tokio::test]
async fn test_failed_composite_is_logged() {
    let logger = Arc::new(RecordingLogger::default());
    let client = Arc::new(ScriptedClient::new().fail("a", upstream_500()));
    let use_case = RunCompletionUseCase::new(client).with_conversation_logger(logger.clone());

    let _ = use_case.execute(input(ensemble("concat", &["a"]))).await;

    let events = logger.events.lock().unwrap();
    assert_eq!(events.last().unwrap().event_type, "completion_failed");
}
