use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::api::{ApiContent, ApiMessage};
use crate::core::completion::{CompletionClient, CompletionError};
use crate::core::message::MessageContent;

enum FakeOutcome {
    Reply(String),
    Fail(String),
}

#[derive(Default)]
struct FakeClient {
    script: Mutex<VecDeque<FakeOutcome>>,
    text_calls: Mutex<Vec<Vec<ApiMessage>>>,
    vision_calls: Mutex<Vec<(String, String)>>,
}

impl FakeClient {
    fn scripted(outcomes: Vec<FakeOutcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(outcomes.into()),
            ..Default::default()
        })
    }

    fn replies(replies: &[&str]) -> Arc<Self> {
        Self::scripted(
            replies
                .iter()
                .map(|r| FakeOutcome::Reply(r.to_string()))
                .collect(),
        )
    }

    fn next_outcome(&self) -> Result<String, CompletionError> {
        match self.script.lock().unwrap().pop_front() {
            Some(FakeOutcome::Reply(text)) => Ok(text),
            Some(FakeOutcome::Fail(message)) => Err(CompletionError::Api(message)),
            None => Ok(String::new()),
        }
    }
}

#[async_trait]
impl CompletionClient for FakeClient {
    async fn complete_text(&self, messages: Vec<ApiMessage>) -> Result<String, CompletionError> {
        self.text_calls.lock().unwrap().push(messages);
        self.next_outcome()
    }

    async fn complete_vision(
        &self,
        prompt: String,
        image_url: String,
    ) -> Result<String, CompletionError> {
        self.vision_calls.lock().unwrap().push((prompt, image_url));
        self.next_outcome()
    }
}

fn fast_options() -> ChatOptions {
    ChatOptions {
        chunk_limit: 8,
        reveal_interval: Duration::from_millis(1),
    }
}

fn context() -> SeedContext {
    SeedContext {
        project_brief: "brief text".to_string(),
        csv: "epoch,loss\n0,1.0".to_string(),
        yaml: "lr: 0.01".to_string(),
    }
}

async fn wait_until_idle(session: &ChatSession) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while session.is_typing() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "reveal never finished"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

fn last_visible_text(session: &ChatSession) -> String {
    session
        .visible_transcript()
        .last()
        .and_then(|m| m.content.as_text().map(str::to_string))
        .unwrap_or_default()
}

#[test]
fn training_seed_starts_with_instructions_then_chunks_then_greeting() {
    let client = FakeClient::replies(&[]);
    let session = ChatSession::training(client, fast_options(), &context());

    let transcript = session.transcript();
    assert_eq!(
        transcript[0].content.as_text(),
        Some(prompt::SYSTEM_INSTRUCTION)
    );
    assert!(transcript[0].role.is_system());

    let chunk_texts: Vec<&str> = transcript[1..transcript.len() - 1]
        .iter()
        .map(|m| {
            assert!(m.role.is_system());
            m.content.as_text().unwrap()
        })
        .collect();
    let brief_count = chunk_texts
        .iter()
        .filter(|t| t.starts_with("Project Brief chunk"))
        .count();
    let csv_count = chunk_texts
        .iter()
        .filter(|t| t.starts_with("results.csv data chunk"))
        .count();
    let yaml_count = chunk_texts
        .iter()
        .filter(|t| t.starts_with("args.yaml data chunk"))
        .count();
    assert!(brief_count > 0 && csv_count > 0 && yaml_count > 0);
    assert_eq!(brief_count + csv_count + yaml_count, chunk_texts.len());

    // Fixed order: brief, then csv, then yaml.
    let first_csv = chunk_texts
        .iter()
        .position(|t| t.starts_with("results.csv"))
        .unwrap();
    let last_brief = chunk_texts
        .iter()
        .rposition(|t| t.starts_with("Project Brief"))
        .unwrap();
    let first_yaml = chunk_texts
        .iter()
        .position(|t| t.starts_with("args.yaml"))
        .unwrap();
    assert!(last_brief < first_csv && first_csv < first_yaml);

    let greeting = transcript.last().unwrap();
    assert!(greeting.role.is_assistant());
    assert_eq!(greeting.content.as_text(), Some(prompt::TRAINING_GREETING));

    // Rendered transcript hides the seeded system messages.
    assert_eq!(session.visible_transcript().len(), 1);
}

#[tokio::test]
async fn send_appends_user_turn_and_reveals_the_reply() {
    let client = FakeClient::replies(&["the loss is decreasing"]);
    let mut session = ChatSession::training(Arc::clone(&client) as Arc<dyn CompletionClient>, fast_options(), &context());

    session.send("how is the loss?").await.expect("send");
    assert!(session.is_typing());
    wait_until_idle(&session).await;

    let visible = session.visible_transcript();
    let user_turn = &visible[visible.len() - 2];
    assert!(user_turn.role.is_user());
    assert_eq!(user_turn.content.as_text(), Some("how is the loss?"));
    assert_eq!(last_visible_text(&session), "the loss is decreasing");
}

#[tokio::test]
async fn send_is_a_no_op_while_a_reply_is_revealing() {
    let long_reply = "x".repeat(2000);
    let client = FakeClient::replies(&[long_reply.as_str()]);
    let mut session = ChatSession::training(Arc::clone(&client) as Arc<dyn CompletionClient>, fast_options(), &context());

    session.send("first").await.expect("send");
    assert!(session.is_typing());

    session.send("second").await.expect("ignored send");
    wait_until_idle(&session).await;

    let user_turns: Vec<_> = session
        .visible_transcript()
        .into_iter()
        .filter(|m| m.role.is_user())
        .collect();
    assert_eq!(user_turns.len(), 1);
    assert_eq!(client.text_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn stop_freezes_the_prefix_and_accepts_the_next_send() {
    let long_reply = "abcdefghij".repeat(200);
    let client = FakeClient::scripted(vec![
        FakeOutcome::Reply(long_reply.clone()),
        FakeOutcome::Reply("second reply".to_string()),
    ]);
    let mut session = ChatSession::training(Arc::clone(&client) as Arc<dyn CompletionClient>, fast_options(), &context());

    session.send("first").await.expect("send");
    tokio::time::sleep(Duration::from_millis(15)).await;
    session.stop();
    assert!(!session.is_typing());

    let prefix = last_visible_text(&session);
    assert!(long_reply.starts_with(&prefix));
    assert!(prefix.chars().count() < long_reply.chars().count());

    session.send("second").await.expect("accepted send");
    wait_until_idle(&session).await;
    assert_eq!(last_visible_text(&session), "second reply");
}

#[tokio::test]
async fn non_text_user_turns_are_filtered_from_the_text_path() {
    let client = FakeClient::replies(&["vision says", "synthesis", "text reply"]);
    let mut session = ChatSession::training(Arc::clone(&client) as Arc<dyn CompletionClient>, fast_options(), &context());

    session.attach_image(AttachedImage {
        data: "QUJD".to_string(),
        description: "labels.jpg".to_string(),
    });
    session.send("explain this image").await.expect("image send");
    wait_until_idle(&session).await;

    session.send("and a plain question").await.expect("text send");
    wait_until_idle(&session).await;

    let text_calls = client.text_calls.lock().unwrap();
    let full_transcript_call = text_calls.last().expect("text path called");
    for message in full_transcript_call.iter() {
        assert!(
            matches!(message.content, ApiContent::Text(_)),
            "image turns must not reach the text path"
        );
    }
}

#[tokio::test]
async fn training_image_turn_pipes_vision_through_text_and_consumes_attachment() {
    let client = FakeClient::replies(&["vision analysis", "final synthesis"]);
    let mut session = ChatSession::training(Arc::clone(&client) as Arc<dyn CompletionClient>, fast_options(), &context());

    session.attach_image(AttachedImage {
        data: "QUJD".to_string(),
        description: "labels.jpg".to_string(),
    });
    session.send("explain the attached image").await.expect("send");
    wait_until_idle(&session).await;

    // Vision ran once with the data URL, then its output became the sole
    // user message of a text completion.
    let vision_calls = client.vision_calls.lock().unwrap();
    assert_eq!(vision_calls.len(), 1);
    assert!(vision_calls[0].0.contains("labels.jpg"));
    assert_eq!(vision_calls[0].1, "data:image/jpeg;base64,QUJD");

    let text_calls = client.text_calls.lock().unwrap();
    assert_eq!(text_calls.len(), 1);
    assert_eq!(text_calls[0].len(), 1);
    match &text_calls[0][0].content {
        ApiContent::Text(text) => assert_eq!(text, "vision analysis"),
        other => panic!("expected text content, got {other:?}"),
    }

    assert_eq!(last_visible_text(&session), "final synthesis");
    assert!(session.attached_image().is_none(), "attachment is single-use");

    // The transcript shows the image the user attached.
    let image_turns: Vec<_> = session
        .visible_transcript()
        .into_iter()
        .filter(|m| matches!(m.content, MessageContent::ImageRef { .. }))
        .collect();
    assert_eq!(image_turns.len(), 1);
}

#[tokio::test]
async fn detection_chat_without_an_image_degrades_to_a_notice() {
    let client = FakeClient::replies(&[]);
    let mut session = ChatSession::detection(Arc::clone(&client) as Arc<dyn CompletionClient>, fast_options(), None);

    session.send("what did you detect?").await.expect("send");

    assert!(!session.is_typing());
    assert_eq!(last_visible_text(&session), prompt::NO_IMAGE_AVAILABLE);
    assert!(client.vision_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn detection_chat_introduces_the_image_once_then_follows_up() {
    let client = FakeClient::replies(&["intro analysis", "follow-up analysis"]);
    let image = AttachedImage {
        data: "QUJD".to_string(),
        description: "annotated frame".to_string(),
    };
    let mut session =
        ChatSession::detection(Arc::clone(&client) as Arc<dyn CompletionClient>, fast_options(), Some(image));

    assert_eq!(
        last_visible_text(&session),
        prompt::DETECTION_GREETING,
        "detection chat is seeded with the greeting only"
    );

    session.send("what is in the image?").await.expect("send");
    wait_until_idle(&session).await;
    assert_eq!(last_visible_text(&session), "intro analysis");

    session.send("is the couch detection correct?").await.expect("send");
    wait_until_idle(&session).await;
    assert_eq!(last_visible_text(&session), "follow-up analysis");

    let vision_calls = client.vision_calls.lock().unwrap();
    assert_eq!(vision_calls.len(), 2);
    assert!(vision_calls[0].0.contains("class labels"));
    assert!(vision_calls[1]
        .0
        .contains("\"is the couch detection correct?\""));
    // Both turns ground in the same image.
    assert_eq!(vision_calls[0].1, vision_calls[1].1);
    assert!(client.text_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn collaborator_failure_keeps_the_transcript_and_clears_typing() {
    let client = FakeClient::scripted(vec![FakeOutcome::Fail("model overloaded".to_string())]);
    let mut session = ChatSession::training(Arc::clone(&client) as Arc<dyn CompletionClient>, fast_options(), &context());

    let error = session.send("hello?").await.expect_err("failure surfaces");
    assert!(error.to_string().contains("model overloaded"));

    assert!(!session.is_typing());
    let visible = session.visible_transcript();
    let last = visible.last().unwrap();
    assert!(last.role.is_user(), "user turn is not rolled back");
    assert_eq!(last.content.as_text(), Some("hello?"));
}

#[tokio::test]
async fn empty_replies_fall_back_to_the_stock_notice() {
    let client = FakeClient::replies(&[""]);
    let mut session = ChatSession::training(Arc::clone(&client) as Arc<dyn CompletionClient>, fast_options(), &context());

    session.send("anything?").await.expect("send");
    wait_until_idle(&session).await;

    assert_eq!(last_visible_text(&session), prompt::NO_RESPONSE);
}

#[tokio::test]
async fn reseeding_discards_the_prior_transcript() {
    let client = FakeClient::replies(&["a reply"]);
    let mut session = ChatSession::training(Arc::clone(&client) as Arc<dyn CompletionClient>, fast_options(), &context());

    session.send("question").await.expect("send");
    wait_until_idle(&session).await;
    assert!(session.visible_transcript().len() > 1);

    session.seed_training(&SeedContext {
        project_brief: "new brief".to_string(),
        csv: String::new(),
        yaml: String::new(),
    });

    let visible = session.visible_transcript();
    assert_eq!(visible.len(), 1);
    assert_eq!(
        visible[0].content.as_text(),
        Some(prompt::TRAINING_GREETING)
    );
    assert!(!session.is_typing());
}
