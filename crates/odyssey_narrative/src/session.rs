//! The interactive journey: one hero, one story, turn by turn.

use crate::{
    PromptBuilder, ResponseParser, SessionSettings, SessionSnapshot, StageTracker, StoryLog,
    ParseOutcome,
};
use derive_getters::Getters;
use odyssey_cache::{ScenarioCache, Signature};
use odyssey_core::{
    ArtStyle, CharacterProfile, FallbackChoice, GenerateRequest, ImageHandle, ImageRequest,
    ImageSize, Message, ParsedScenario, StoryEvent, StoryEventKind,
};
use odyssey_error::{
    GenerationError, GenerationErrorKind, NarrativeError, NarrativeErrorKind, OdysseyResult,
};
use odyssey_interface::{ImageGenerator, SessionStore, TextGenerator};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A turn that was started but has not produced a scenario yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PendingTurn {
    /// The opening scenario
    Opening,
    /// Continuation after the player picked `text` (position `index`)
    Choice {
        /// Position in the offered list
        index: usize,
        /// Choice text
        text: String,
    },
    /// Another telling of the current scenario, replacing one that came
    /// back without choices
    Retell,
}

/// Outcome recorded when the player stops the journey early.
const ENDED_OUTCOME: &str = "The journey ends here.";

/// What a successful turn produced.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct TurnReport {
    /// The new scenario and its choices
    scenario: ParsedScenario,
    /// Stage index the scenario belongs to
    stage_index: usize,
    /// Stage label
    stage: String,
    /// True when this turn moved the hero to a new stage
    advanced: bool,
    /// True when the final stage has been reached
    complete: bool,
    /// True when the player stopped the journey
    ended: bool,
    /// Illustration, when one was produced
    image: Option<ImageHandle>,
    /// Why the illustration is missing, when it failed
    image_error: Option<String>,
}

impl TurnReport {
    /// True when the choices are the fallback set.
    pub fn used_fallback(&self) -> bool {
        self.scenario.uses_fallback()
    }
}

/// A hero's journey in progress.
///
/// The session owns everything a turn touches: the stage tracker, the story
/// log and the caches. Nothing about the story is kept anywhere else, so
/// several sessions can run side by side in one process.
///
/// A turn only mutates the session once its scenario has been generated and
/// parsed. If generation fails the session is left exactly as it was and the
/// failed turn can be re-run with [`JourneySession::retry`].
pub struct JourneySession<T, I> {
    session_id: String,
    profile: CharacterProfile,
    settings: SessionSettings,
    tracker: StageTracker,
    log: StoryLog,
    current: Option<ParsedScenario>,
    pending: Option<PendingTurn>,
    ended: bool,
    text: T,
    images: I,
    parser: ResponseParser,
    prompts: PromptBuilder,
    scenarios: ScenarioCache<ParsedScenario>,
    illustrations: ScenarioCache<ImageHandle>,
}

impl<T, I> std::fmt::Debug for JourneySession<T, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JourneySession")
            .field("session_id", &self.session_id)
            .field("hero", &self.profile.identity())
            .field("stage", &self.tracker.current_stage())
            .field("events", &self.log.len())
            .field("pending", &self.pending)
            .field("ended", &self.ended)
            .finish()
    }
}

impl<T: TextGenerator, I: ImageGenerator> JourneySession<T, I> {
    /// Create a session with a fresh id and an empty story.
    pub fn new(
        profile: CharacterProfile,
        settings: SessionSettings,
        tracker: StageTracker,
        text: T,
        images: I,
    ) -> OdysseyResult<Self> {
        let session_id = uuid::Uuid::new_v4().to_string();
        info!(
            session_id = %session_id,
            hero = %profile.identity(),
            stages = tracker.stage_count(),
            text_model = text.model_name(),
            "Created journey session"
        );
        Self::assemble(
            session_id,
            profile,
            settings,
            tracker,
            StoryLog::new(),
            None,
            None,
            false,
            text,
            images,
        )
    }

    /// Rebuild a session from a snapshot.
    ///
    /// Caches start empty.
    pub fn restore(snapshot: SessionSnapshot, text: T, images: I) -> OdysseyResult<Self> {
        snapshot.validate()?;
        let (_, session_id, profile, settings, tracker, log, current, pending, ended, saved_at) =
            snapshot.dissolve();
        info!(
            session_id = %session_id,
            events = log.len(),
            stage = %tracker.current_stage(),
            ended,
            saved_at = %saved_at,
            "Restored journey session"
        );
        Self::assemble(
            session_id, profile, settings, tracker, log, current, pending, ended, text, images,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        session_id: String,
        profile: CharacterProfile,
        settings: SessionSettings,
        tracker: StageTracker,
        log: StoryLog,
        current: Option<ParsedScenario>,
        pending: Option<PendingTurn>,
        ended: bool,
        text: T,
        images: I,
    ) -> OdysseyResult<Self> {
        let parser = ResponseParser::new(settings.parser_config())?;
        let scenarios = ScenarioCache::new(settings.cache().clone());
        let illustrations = ScenarioCache::new(settings.cache().clone());
        Ok(Self {
            session_id,
            profile,
            settings,
            tracker,
            log,
            current,
            pending,
            ended,
            text,
            images,
            parser,
            prompts: PromptBuilder::new(),
            scenarios,
            illustrations,
        })
    }

    /// Session id.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The hero.
    pub fn profile(&self) -> &CharacterProfile {
        &self.profile
    }

    /// Session knobs.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Stage progress.
    pub fn tracker(&self) -> &StageTracker {
        &self.tracker
    }

    /// Story so far.
    pub fn log(&self) -> &StoryLog {
        &self.log
    }

    /// Scenario awaiting a choice.
    pub fn current_scenario(&self) -> Option<&ParsedScenario> {
        self.current.as_ref()
    }

    /// Turn that failed and can be retried.
    pub fn pending(&self) -> Option<&PendingTurn> {
        self.pending.as_ref()
    }

    /// True once the hero has reached the final stage.
    pub fn is_complete(&self) -> bool {
        self.tracker.is_complete()
    }

    /// True once the player has chosen to stop the journey.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// True when no further turns can be taken.
    pub fn is_finished(&self) -> bool {
        self.ended || self.is_complete()
    }

    /// True once the opening scenario exists.
    pub fn is_started(&self) -> bool {
        !self.log.is_empty()
    }

    /// Generate the opening scenario.
    ///
    /// # Errors
    ///
    /// [`NarrativeErrorKind::AlreadyStarted`] if the story has begun, or a
    /// generation error if the model call fails.
    pub async fn begin(&mut self) -> OdysseyResult<TurnReport> {
        if self.is_started() {
            return Err(NarrativeError::new(NarrativeErrorKind::AlreadyStarted).into());
        }
        self.run_turn(PendingTurn::Opening).await
    }

    /// Pick the choice at `index` (zero-based) and generate what happens next.
    ///
    /// When the current scenario offers the fallback set, "Retry" tells the
    /// scenario again without recording a choice or moving the tracker, and
    /// "End journey" stops the session. "Continue cautiously" is an ordinary
    /// choice.
    ///
    /// # Errors
    ///
    /// [`NarrativeErrorKind::NotStarted`] before [`begin`](Self::begin),
    /// [`NarrativeErrorKind::JourneyEnded`] after the player stopped,
    /// [`NarrativeErrorKind::JourneyComplete`] after the final stage,
    /// [`NarrativeErrorKind::InvalidChoice`] for an index outside the offered
    /// list, or a generation error if the model call fails.
    pub async fn choose(&mut self, index: usize) -> OdysseyResult<TurnReport> {
        let Some(current) = &self.current else {
            return Err(NarrativeError::new(NarrativeErrorKind::NotStarted).into());
        };
        if self.ended {
            return Err(NarrativeError::new(NarrativeErrorKind::JourneyEnded).into());
        }
        if self.tracker.is_complete() {
            return Err(NarrativeError::new(NarrativeErrorKind::JourneyComplete).into());
        }
        let Some(text) = current.choice(index).map(str::to_string) else {
            return Err(NarrativeError::new(NarrativeErrorKind::InvalidChoice {
                index,
                available: current.choices().len(),
            })
            .into());
        };
        match current.fallback_choice(index) {
            Some(FallbackChoice::Retry) => self.run_turn(PendingTurn::Retell).await,
            Some(FallbackChoice::EndJourney) => {
                let scenario = current.clone();
                Ok(self.end_journey(&text, scenario))
            }
            Some(FallbackChoice::ContinueCautiously) | None => {
                self.run_turn(PendingTurn::Choice { index, text }).await
            }
        }
    }

    /// Re-run the turn that last failed.
    ///
    /// # Errors
    ///
    /// [`NarrativeErrorKind::JourneyEnded`] after the player stopped, or
    /// [`NarrativeErrorKind::NothingToRetry`] when no turn is pending.
    pub async fn retry(&mut self) -> OdysseyResult<TurnReport> {
        if self.ended {
            return Err(NarrativeError::new(NarrativeErrorKind::JourneyEnded).into());
        }
        let Some(turn) = self.pending.clone() else {
            return Err(NarrativeError::new(NarrativeErrorKind::NothingToRetry).into());
        };
        info!(session_id = %self.session_id, ?turn, "Retrying turn");
        self.run_turn(turn).await
    }

    /// Capture the session for persistence.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(
            self.session_id.clone(),
            self.profile.clone(),
            self.settings.clone(),
            self.tracker.clone(),
            self.log.clone(),
            self.current.clone(),
            self.pending.clone(),
            self.ended,
        )
    }

    /// Snapshot the session into `store` under its id.
    pub async fn save_to<S>(&self, store: &S) -> OdysseyResult<()>
    where
        S: SessionStore<SessionSnapshot>,
    {
        store.save(&self.session_id, &self.snapshot()).await
    }

    fn change_per_choice(&self) -> f64 {
        self.settings
            .change_per_choice()
            .unwrap_or_else(|| self.tracker.default_change_per_choice())
    }

    /// Stop the journey at the player's request.
    fn end_journey(&mut self, choice: &str, scenario: ParsedScenario) -> TurnReport {
        let stage_index = *self.tracker.current_stage_index();
        self.log.append(StoryEvent::choice(stage_index, choice));
        self.log.append(StoryEvent::outcome(stage_index, ENDED_OUTCOME));
        self.ended = true;
        self.pending = None;
        info!(
            session_id = %self.session_id,
            stage = %self.tracker.current_stage(),
            "Journey ended by the player"
        );

        TurnReport {
            scenario,
            stage_index,
            stage: self.tracker.current_stage().to_string(),
            advanced: false,
            complete: self.tracker.is_complete(),
            ended: true,
            image: None,
            image_error: None,
        }
    }

    /// Context for telling the current scenario again.
    ///
    /// Trailing scenarios are the tellings being replaced, so they are
    /// dropped. What remains ends with the choice that led here, if any.
    fn retell_context(&self) -> (Vec<StoryEvent>, Option<String>, String) {
        let mut events = self.log.context_tail(self.log.len());
        while matches!(
            events.last().map(StoryEvent::kind),
            Some(StoryEventKind::Scenario(_))
        ) {
            events.pop();
        }
        let choice = match events.last().map(StoryEvent::kind) {
            Some(StoryEventKind::Choice(text)) => Some(text.clone()),
            _ => None,
        };
        let previous = events
            .iter()
            .rev()
            .find_map(|event| match event.kind() {
                StoryEventKind::Scenario(text) => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_default();
        let keep = *self.settings.history_window() + usize::from(choice.is_some());
        let context = events.split_off(events.len().saturating_sub(keep));
        (context, choice, previous)
    }

    #[tracing::instrument(skip(self), fields(session_id = %self.session_id))]
    async fn run_turn(&mut self, turn: PendingTurn) -> OdysseyResult<TurnReport> {
        self.pending = Some(turn.clone());

        // Work on a projection so a failed call leaves the tracker untouched.
        let change = self.change_per_choice();
        let stage_before = *self.tracker.current_stage_index();
        let mut projected = self.tracker.clone();
        let (context, choice, previous) = match &turn {
            PendingTurn::Retell => self.retell_context(),
            PendingTurn::Opening | PendingTurn::Choice { .. } => {
                let mut context = self.log.context_tail(*self.settings.history_window());
                let choice = match &turn {
                    PendingTurn::Choice { text, .. } => Some(text.clone()),
                    _ => None,
                };
                if let Some(choice) = &choice {
                    context.push(StoryEvent::choice(stage_before, choice.as_str()));
                }
                let previous = self.log.last_scenario().unwrap_or_default().to_string();
                (context, choice, previous)
            }
        };
        let advanced = match turn {
            PendingTurn::Choice { .. } => projected.apply_change(change),
            PendingTurn::Opening | PendingTurn::Retell => false,
        };

        let style = self.settings.art_style().clone();
        let prompt = self.prompts.build(
            &self.profile,
            projected.current_stage(),
            &context,
            *self.settings.age_band(),
            style.as_ref(),
        );
        let request = GenerateRequest::builder()
            .messages(vec![
                Message::system(self.prompts.system_prompt()),
                Message::user(prompt),
            ])
            .max_tokens(*self.settings.max_tokens())
            .build()?;

        let band = self
            .settings
            .age_band()
            .map(|band| band.to_string())
            .unwrap_or_default();
        let key = Signature::from_parts([
            "scenario",
            self.profile.portrait().as_str(),
            self.profile.challenge().as_str(),
            self.profile.goal().as_str(),
            projected.current_stage(),
            previous.as_str(),
            choice.as_deref().unwrap_or_default(),
            band.as_str(),
            style.as_ref().map(ArtStyle::as_str).unwrap_or_default(),
        ]);

        let limit = self.settings.call_timeout();
        let scenario = self
            .scenarios
            .get_or_compute(&key, || {
                write_scenario(&self.text, &self.parser, &request, limit)
            })
            .await;
        let scenario = match scenario {
            Ok(scenario) => {
                // A telling without choices should not be served again.
                if scenario.uses_fallback() {
                    self.scenarios.invalidate(&key);
                }
                scenario
            }
            Err(err) => {
                warn!(error = %err, "Scenario generation failed, session unchanged");
                return Err(err);
            }
        };

        if let PendingTurn::Choice { text, .. } = &turn {
            self.log.append(StoryEvent::choice(stage_before, text.as_str()));
            self.log
                .append(StoryEvent::outcome(stage_before, outcome_text(text)));
            self.tracker.apply_change(change);
        }
        let stage_index = *self.tracker.current_stage_index();
        self.log
            .append(StoryEvent::scenario(stage_index, scenario.narrative().clone()));
        self.current = Some(scenario.clone());
        self.pending = None;

        info!(
            stage_index,
            stage = %self.tracker.current_stage(),
            advanced,
            retold = matches!(turn, PendingTurn::Retell),
            choices = scenario.choices().len(),
            fallback = scenario.uses_fallback(),
            "Turn complete"
        );

        let (image, image_error) = if *self.settings.illustrate() {
            self.illustrate_current(&scenario, style.unwrap_or_default(), limit)
                .await
        } else {
            debug!("Illustration disabled");
            (None, None)
        };

        Ok(TurnReport {
            stage_index,
            stage: self.tracker.current_stage().to_string(),
            advanced,
            complete: self.tracker.is_complete(),
            ended: false,
            scenario,
            image,
            image_error,
        })
    }

    /// Illustrate an accepted scenario. Failures become an `Error` event.
    async fn illustrate_current(
        &mut self,
        scenario: &ParsedScenario,
        style: ArtStyle,
        limit: Option<Duration>,
    ) -> (Option<ImageHandle>, Option<String>) {
        let stage_index = *self.tracker.current_stage_index();
        let portrait = self.profile.portrait();
        let key = Signature::from_parts([
            "image",
            scenario.narrative().as_str(),
            portrait.as_str(),
            style.as_str(),
        ]);
        let size = *self.settings.image_size();

        let result = self
            .illustrations
            .get_or_compute(&key, || {
                illustrate(
                    &self.text,
                    &self.images,
                    &self.prompts,
                    &self.profile,
                    scenario.narrative(),
                    &style,
                    size,
                    limit,
                )
            })
            .await;

        match result {
            Ok(handle) => {
                self.log.append(StoryEvent::image(stage_index, handle.clone()));
                (Some(handle), None)
            }
            Err(err) => {
                warn!(error = %err, "Illustration failed, continuing without image");
                let message = format!("Illustration unavailable: {}", err.kind());
                self.log.append(StoryEvent::error(stage_index, message.clone()));
                (None, Some(message))
            }
        }
    }
}

/// Player-facing feedback for a choice.
fn outcome_text(choice: &str) -> String {
    let choice = choice.trim().trim_end_matches(['.', '!', '?']);
    let mut chars = choice.chars();
    let lowered = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!("You chose to {}.", lowered)
}

/// Run `call`, failing with a timeout error after `limit`.
async fn bounded<F, V>(limit: Option<Duration>, call: F) -> OdysseyResult<V>
where
    F: Future<Output = OdysseyResult<V>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| GenerationError::new(GenerationErrorKind::Timeout(limit.as_secs())))?,
        None => call.await,
    }
}

async fn write_scenario<T: TextGenerator>(
    text: &T,
    parser: &ResponseParser,
    request: &GenerateRequest,
    limit: Option<Duration>,
) -> OdysseyResult<ParsedScenario> {
    let response = bounded(limit, text.generate(request)).await?;
    match parser.parse(response.text()) {
        ParseOutcome::Parsed(scenario) => {
            if scenario.choices().is_empty() {
                warn!("Completion had no choices, offering fallback set");
            }
            Ok(scenario.with_fallback())
        }
        ParseOutcome::EmptyNarrative => {
            Err(GenerationError::new(GenerationErrorKind::EmptyNarrative).into())
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn illustrate<T: TextGenerator, I: ImageGenerator>(
    text: &T,
    images: &I,
    prompts: &PromptBuilder,
    profile: &CharacterProfile,
    narrative: &str,
    style: &ArtStyle,
    size: ImageSize,
    limit: Option<Duration>,
) -> OdysseyResult<ImageHandle> {
    let request = GenerateRequest::builder()
        .messages(vec![
            Message::system(prompts.image_system_prompt()),
            Message::user(prompts.image_prompt(narrative, profile, style)),
        ])
        .build()?;
    let description = bounded(limit, text.generate(&request)).await?.into_text();
    let description = description.trim();
    if description.is_empty() {
        return Err(GenerationError::new(GenerationErrorKind::EmptyResponse).into());
    }
    debug!(words = description.split_whitespace().count(), "Illustration described");

    let request = ImageRequest::builder()
        .prompt(description)
        .size(size)
        .build()?;
    let image = bounded(limit, images.generate_image(&request)).await?;
    Ok(image.into_handle(description))
}
