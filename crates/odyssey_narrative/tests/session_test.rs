//! Journey session tests with scripted generators.

use async_trait::async_trait;
use odyssey_core::{
    CharacterProfile, FALLBACK_CHOICES, GenerateRequest, GenerateResponse, ImageRequest,
    ImageResponse,
};
use odyssey_error::{
    GenerationError, GenerationErrorKind, NarrativeErrorKind, OdysseyErrorKind, OdysseyResult,
};
use odyssey_interface::{ImageGenerator, SessionStore, TextGenerator};
use odyssey_narrative::{
    JourneySession, MarkdownExporter, PendingTurn, SessionSettings, SessionSnapshot, StageTracker,
};
use odyssey_storage::{FileSystemImageStorage, FileSystemSessionStore};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

const OPENING: &str =
    "Pip wakes in a dark burrow.\n\n1. Light a torch\n2. Call for Max\n3. Go back to sleep";
const NEXT: &str = "A letter arrives by owl.\n\n1. Read it\n2. Hide it\n3. Burn it";
const DESCRIPTION: &str = "Pip holding a torch in a round burrow.";

#[derive(Default)]
struct Script {
    replies: Mutex<VecDeque<OdysseyResult<String>>>,
    scenario_calls: AtomicUsize,
    description_calls: AtomicUsize,
}

/// Text generator that answers scenario prompts from a script and
/// illustration prompts with a fixed description.
#[derive(Clone, Default)]
struct ScriptedText {
    script: Arc<Script>,
    delay: Option<Duration>,
}

impl ScriptedText {
    fn new(replies: impl IntoIterator<Item = OdysseyResult<String>>) -> Self {
        let script = Script {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        };
        Self {
            script: Arc::new(script),
            delay: None,
        }
    }

    fn replying(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())))
    }

    fn scenario_calls(&self) -> usize {
        self.script.scenario_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedText {
    async fn generate(&self, req: &GenerateRequest) -> OdysseyResult<GenerateResponse> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let system = req
            .messages()
            .first()
            .map(|m| m.content().as_str())
            .unwrap_or_default();
        if system.contains("image descriptions") {
            self.script.description_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(GenerateResponse::new(DESCRIPTION));
        }

        self.script.scenario_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(NEXT.to_string()))
            .map(GenerateResponse::new)
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-text"
    }
}

/// Image generator that returns a tiny PNG header or fails every time.
#[derive(Clone, Default)]
struct ScriptedImages {
    fail: bool,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ImageGenerator for ScriptedImages {
    async fn generate_image(&self, req: &ImageRequest) -> OdysseyResult<ImageResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(req.prompt(), DESCRIPTION);
        if self.fail {
            return Err(GenerationError::new(GenerationErrorKind::Api {
                status_code: 400,
                message: "content policy".to_string(),
            })
            .into());
        }
        Ok(ImageResponse::new(vec![0x89, 0x50, 0x4E, 0x47], "image/png"))
    }

    fn image_model_name(&self) -> &str {
        "scripted-image"
    }
}

fn hero() -> CharacterProfile {
    CharacterProfile::builder()
        .name("Pip")
        .creature("hedgehog")
        .distinguishing_feature("a lantern tail")
        .challenge("Overcoming fear")
        .goal("cross the dark forest")
        .build()
        .unwrap()
}

fn session(
    text: ScriptedText,
    images: ScriptedImages,
) -> JourneySession<ScriptedText, ScriptedImages> {
    JourneySession::new(
        hero(),
        SessionSettings::default(),
        StageTracker::hero_journey(),
        text,
        images,
    )
    .unwrap()
}

fn labels<T: TextGenerator, I: ImageGenerator>(session: &JourneySession<T, I>) -> Vec<&'static str> {
    session.log().iter().map(|e| e.kind().label()).collect()
}

fn narrative_kind(err: &odyssey_error::OdysseyError) -> Option<&NarrativeErrorKind> {
    match err.kind() {
        OdysseyErrorKind::Narrative(e) => Some(&e.kind),
        _ => None,
    }
}

#[tokio::test]
async fn opening_turn_records_scenario_and_image() {
    let text = ScriptedText::replying(&[OPENING]);
    let mut session = session(text.clone(), ScriptedImages::default());

    let report = session.begin().await.unwrap();

    assert_eq!(report.scenario().narrative(), "Pip wakes in a dark burrow.");
    assert_eq!(
        report.scenario().choices(),
        &["Light a torch", "Call for Max", "Go back to sleep"]
    );
    assert_eq!(*report.stage_index(), 0);
    assert_eq!(report.stage(), "The Ordinary World");
    assert!(!*report.advanced());
    assert!(report.image().is_some());
    assert_eq!(labels(&session), vec!["scenario", "image"]);
    assert!(session.pending().is_none());
    assert_eq!(text.script.description_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn choosing_advances_one_stage_and_logs_in_order() {
    let mut session = session(ScriptedText::replying(&[OPENING, NEXT]), ScriptedImages::default());
    session.begin().await.unwrap();

    let report = session.choose(0).await.unwrap();

    assert!(*report.advanced());
    assert_eq!(report.stage(), "The Call to Adventure");
    assert_eq!(
        labels(&session),
        vec!["scenario", "image", "choice", "outcome", "scenario", "image"]
    );
    let events = session.log().all();
    assert_eq!(events[2].kind().text(), Some("Light a torch"));
    assert_eq!(events[3].kind().text(), Some("You chose to light a torch."));
    assert_eq!(*events[2].stage_index(), 0);
    assert_eq!(*events[4].stage_index(), 1);
}

#[tokio::test]
async fn failed_choice_leaves_session_untouched_until_retry() {
    let text = ScriptedText::new([
        Ok(OPENING.to_string()),
        Err(GenerationError::new(GenerationErrorKind::Api {
            status_code: 503,
            message: "overloaded".to_string(),
        })
        .into()),
    ]);
    let mut session = session(text.clone(), ScriptedImages::default());
    session.begin().await.unwrap();
    let log_before = session.log().clone();
    let tracker_before = session.tracker().clone();

    let err = session.choose(1).await.unwrap_err();

    assert!(err.is_generation_failure());
    assert_eq!(session.log(), &log_before);
    assert_eq!(session.tracker(), &tracker_before);
    assert_eq!(
        session.pending(),
        Some(&PendingTurn::Choice {
            index: 1,
            text: "Call for Max".to_string()
        })
    );

    let report = session.retry().await.unwrap();
    assert!(*report.advanced());
    assert!(session.pending().is_none());
    assert_eq!(session.log().last_choice(), Some("Call for Max"));
    assert_eq!(text.scenario_calls(), 3);
}

#[tokio::test]
async fn empty_narrative_is_a_generation_failure() {
    let mut session = session(ScriptedText::replying(&["   \n\n1. A"]), ScriptedImages::default());

    let err = session.begin().await.unwrap_err();

    assert!(err.is_generation_failure());
    assert!(session.log().is_empty());
    assert_eq!(session.pending(), Some(&PendingTurn::Opening));

    let report = session.retry().await.unwrap();
    assert_eq!(report.scenario().narrative(), "A letter arrives by owl.");
}

#[tokio::test]
async fn image_failure_is_recorded_and_turn_still_succeeds() {
    let images = ScriptedImages {
        fail: true,
        ..Default::default()
    };
    let mut session = session(ScriptedText::replying(&[OPENING]), images.clone());

    let report = session.begin().await.unwrap();

    assert!(report.image().is_none());
    assert!(report.image_error().as_deref().unwrap().contains("Illustration unavailable"));
    assert_eq!(labels(&session), vec!["scenario", "error"]);
    assert_eq!(images.calls.load(Ordering::SeqCst), 1);
    assert!(session.current_scenario().is_some());
}

#[tokio::test]
async fn multi_paragraph_scenarios_stay_whole() {
    let mut session = session(
        ScriptedText::replying(&[
            "Pip wakes in a dark burrow.\n\nA strange light glows outside.\n\n1. Light a torch\n2. Call for Max\n3. Go back to sleep",
        ]),
        ScriptedImages::default(),
    );

    let report = session.begin().await.unwrap();

    assert_eq!(
        report.scenario().narrative(),
        "Pip wakes in a dark burrow.\n\nA strange light glows outside."
    );
    assert_eq!(
        report.scenario().choices(),
        &["Light a torch", "Call for Max", "Go back to sleep"]
    );
    assert!(!report.used_fallback());
}

#[tokio::test]
async fn retry_tells_a_choiceless_scenario_again() {
    let text = ScriptedText::replying(&[
        "The fog rolls in.",
        "The fog rolls in.\n\n1. Follow the lantern\n2. Wait for dawn\n3. Call for Max",
    ]);
    let images = ScriptedImages::default();
    let mut session = session(text.clone(), images.clone());

    let opening = session.begin().await.unwrap();
    assert!(opening.used_fallback());
    assert_eq!(opening.scenario().choices(), &FALLBACK_CHOICES);
    let tracker_before = session.tracker().clone();

    let report = session.choose(0).await.unwrap();

    assert!(!report.used_fallback());
    assert!(!*report.advanced());
    assert_eq!(*report.stage_index(), 0);
    assert_eq!(report.stage(), "The Ordinary World");
    assert_eq!(session.tracker(), &tracker_before);
    assert_eq!(session.log().last_choice(), None);
    assert_eq!(labels(&session), vec!["scenario", "image", "scenario", "image"]);
    assert_eq!(
        session.current_scenario().unwrap().choices(),
        &["Follow the lantern", "Wait for dawn", "Call for Max"]
    );

    // The choiceless telling was not cached, the illustration was.
    assert_eq!(text.scenario_calls(), 2);
    assert!(report.image().is_some());
    assert_eq!(text.script.description_calls.load(Ordering::SeqCst), 1);
    assert_eq!(images.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_retell_changes_nothing_and_can_be_retried() {
    let text = ScriptedText::new([
        Ok(OPENING.to_string()),
        Ok("The path splits and the fog rolls in.".to_string()),
        Err(GenerationError::new(GenerationErrorKind::Api {
            status_code: 503,
            message: "overloaded".to_string(),
        })
        .into()),
    ]);
    let settings = SessionSettings::default().with_illustrate(false);
    let mut session = JourneySession::new(
        hero(),
        settings,
        StageTracker::hero_journey(),
        text.clone(),
        ScriptedImages::default(),
    )
    .unwrap();
    session.begin().await.unwrap();
    assert!(session.choose(0).await.unwrap().used_fallback());
    let log_before = session.log().clone();
    let tracker_before = session.tracker().clone();

    let err = session.choose(0).await.unwrap_err();

    assert!(err.is_generation_failure());
    assert_eq!(session.log(), &log_before);
    assert_eq!(session.tracker(), &tracker_before);
    assert_eq!(session.pending(), Some(&PendingTurn::Retell));

    let report = session.retry().await.unwrap();
    assert_eq!(report.scenario().narrative(), "A letter arrives by owl.");
    assert!(!*report.advanced());
    assert_eq!(report.stage(), "The Call to Adventure");
    assert_eq!(session.tracker(), &tracker_before);
    assert!(session.pending().is_none());
    assert_eq!(session.log().last_choice(), Some("Light a torch"));
    assert_eq!(
        labels(&session),
        vec!["scenario", "choice", "outcome", "scenario", "scenario"]
    );
    assert_eq!(text.scenario_calls(), 4);
}

#[tokio::test]
async fn continue_cautiously_is_an_ordinary_choice() {
    let mut session = session(
        ScriptedText::replying(&["The fog rolls in.", NEXT]),
        ScriptedImages::default(),
    );
    session.begin().await.unwrap();

    let report = session.choose(1).await.unwrap();

    assert!(*report.advanced());
    assert_eq!(report.stage(), "The Call to Adventure");
    assert_eq!(session.log().last_choice(), Some("Continue cautiously"));
    let outcome = session
        .log()
        .iter()
        .find(|e| e.kind().label() == "outcome")
        .and_then(|e| e.kind().text());
    assert_eq!(outcome, Some("You chose to continue cautiously."));
}

#[tokio::test]
async fn ending_the_journey_stops_the_session() {
    let dir = TempDir::new().unwrap();
    let text = ScriptedText::replying(&["The fog rolls in."]);
    let mut session = session(text.clone(), ScriptedImages::default());
    session.begin().await.unwrap();

    let report = session.choose(2).await.unwrap();

    assert!(*report.ended());
    assert!(!*report.complete());
    assert!(session.is_ended());
    assert!(session.is_finished());
    assert!(!session.is_complete());
    assert_eq!(session.log().last_choice(), Some("End journey"));
    assert_eq!(labels(&session), vec!["scenario", "image", "choice", "outcome"]);

    let err = session.choose(0).await.unwrap_err();
    assert_eq!(narrative_kind(&err), Some(&NarrativeErrorKind::JourneyEnded));
    let err = session.retry().await.unwrap_err();
    assert_eq!(narrative_kind(&err), Some(&NarrativeErrorKind::JourneyEnded));
    assert_eq!(text.scenario_calls(), 1);

    let snapshot = session.snapshot();
    assert!(*snapshot.ended());
    assert!(snapshot.is_finished());

    let storage = FileSystemImageStorage::new(dir.path()).unwrap();
    let doc = MarkdownExporter::new(dir.path())
        .render(&snapshot, &storage)
        .await
        .unwrap();
    assert!(doc.contains("*The journey ended early.*"));
    assert!(!doc.contains("*The journey is complete.*"));

    let restored =
        JourneySession::restore(snapshot, ScriptedText::default(), ScriptedImages::default())
            .unwrap();
    assert!(restored.is_ended());
}

#[tokio::test]
async fn misuse_is_reported_without_model_calls() {
    let text = ScriptedText::replying(&[OPENING]);
    let mut session = session(text.clone(), ScriptedImages::default());

    let err = session.choose(0).await.unwrap_err();
    assert_eq!(narrative_kind(&err), Some(&NarrativeErrorKind::NotStarted));

    let err = session.retry().await.unwrap_err();
    assert_eq!(narrative_kind(&err), Some(&NarrativeErrorKind::NothingToRetry));

    session.begin().await.unwrap();
    let err = session.begin().await.unwrap_err();
    assert_eq!(narrative_kind(&err), Some(&NarrativeErrorKind::AlreadyStarted));

    let err = session.choose(7).await.unwrap_err();
    assert_eq!(
        narrative_kind(&err),
        Some(&NarrativeErrorKind::InvalidChoice {
            index: 7,
            available: 3
        })
    );
    assert_eq!(text.scenario_calls(), 1);
}

#[tokio::test]
async fn short_journey_completes_and_refuses_more_choices() {
    let settings = SessionSettings::default().with_illustrate(false);
    let mut session = JourneySession::new(
        hero(),
        settings,
        StageTracker::new(["Home", "Road", "Return"]).unwrap(),
        ScriptedText::replying(&[OPENING]),
        ScriptedImages::default(),
    )
    .unwrap();

    session.begin().await.unwrap();
    assert!(!*session.choose(0).await.unwrap().complete());
    let last = session.choose(0).await.unwrap();
    assert!(*last.complete());
    assert_eq!(last.stage(), "Return");
    assert_eq!(*session.tracker().progress(), 68.0);

    let err = session.choose(0).await.unwrap_err();
    assert_eq!(narrative_kind(&err), Some(&NarrativeErrorKind::JourneyComplete));
}

#[tokio::test]
async fn slow_model_calls_time_out() {
    let text = ScriptedText {
        delay: Some(Duration::from_secs(5)),
        ..ScriptedText::replying(&[OPENING])
    };
    let settings = SessionSettings::default().with_call_timeout_secs(Some(1));
    let mut session = JourneySession::new(
        hero(),
        settings,
        StageTracker::hero_journey(),
        text,
        ScriptedImages::default(),
    )
    .unwrap();

    let err = session.begin().await.unwrap_err();
    assert!(err.is_generation_failure());
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn snapshot_survives_the_filesystem_store() {
    let dir = TempDir::new().unwrap();
    let store = FileSystemSessionStore::new(dir.path());
    let mut original = session(ScriptedText::replying(&[OPENING]), ScriptedImages::default());
    original.begin().await.unwrap();
    original.choose(2).await.unwrap();

    original.save_to(&store).await.unwrap();
    let loaded: SessionSnapshot = store.load(original.session_id()).await.unwrap().unwrap();
    let mut restored = JourneySession::restore(
        loaded,
        ScriptedText::default(),
        ScriptedImages::default(),
    )
    .unwrap();

    assert_eq!(restored.session_id(), original.session_id());
    assert_eq!(restored.log(), original.log());
    assert_eq!(restored.tracker(), original.tracker());
    assert_eq!(restored.current_scenario(), original.current_scenario());

    let report = restored.choose(0).await.unwrap();
    assert_eq!(report.stage(), "Refusal of the Call");
}

#[tokio::test]
async fn markdown_export_follows_log_order() {
    let dir = TempDir::new().unwrap();
    let mut session = session(ScriptedText::replying(&[OPENING, NEXT]), ScriptedImages::default());
    session.begin().await.unwrap();
    session.choose(0).await.unwrap();

    let storage = FileSystemImageStorage::new(dir.path()).unwrap();
    let doc = MarkdownExporter::new(dir.path())
        .render(&session.snapshot(), &storage)
        .await
        .unwrap();

    let position = |needle: &str| doc.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
    assert!(doc.starts_with("# Pip's Journey"));
    assert!(position("## The Ordinary World") < position("Pip wakes in a dark burrow."));
    assert!(position("Pip wakes in a dark burrow.") < position("![Pip holding a torch"));
    assert!(position("![Pip holding a torch") < position("> You chose: **Light a torch**"));
    assert!(position("> You chose: **Light a torch**") < position("## The Call to Adventure"));
    assert!(position("## The Call to Adventure") < position("A letter arrives by owl."));
    assert!(doc.contains("](images/"));
}
