//! Prompt construction.
//!
//! Everything here is a pure function of its inputs; no I/O, no state.

use odyssey_core::{AgeBand, ArtStyle, CharacterProfile, StoryEvent, StoryEventKind};
use std::fmt::Write as _;

const STORYTELLER_SYSTEM_PROMPT: &str =
    "You are a master storyteller crafting an engaging hero's journey for children.";

const ILLUSTRATOR_SYSTEM_PROMPT: &str =
    "You are an expert at creating vivid, concise image descriptions for illustrations.";

const ORDINALS: [&str; 5] = ["First", "Second", "Third", "Fourth", "Fifth"];

/// Builds the prompts sent to the text model.
///
/// # Examples
///
/// ```
/// use odyssey_core::{AgeBand, CharacterProfile};
/// use odyssey_narrative::PromptBuilder;
///
/// let hero = CharacterProfile::builder()
///     .name("Pip")
///     .creature("hedgehog")
///     .distinguishing_feature("a lantern tail")
///     .challenge("Overcoming fear")
///     .goal("cross the dark forest")
///     .build()
///     .unwrap();
///
/// let prompt = PromptBuilder::new().build(&hero, "The Ordinary World", &[], Some(AgeBand::Young), None);
/// assert!(prompt.contains("opening scenario for Pip the hedgehog"));
/// assert!(prompt.contains("followed by 2 possible choices"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    /// Create a builder.
    pub fn new() -> Self {
        Self
    }

    /// System message for scenario generation.
    pub fn system_prompt(&self) -> &'static str {
        STORYTELLER_SYSTEM_PROMPT
    }

    /// System message for illustration descriptions.
    pub fn image_system_prompt(&self) -> &'static str {
        ILLUSTRATOR_SYSTEM_PROMPT
    }

    /// Scenario prompt for the given stage.
    ///
    /// An empty `history_tail` means the story is just starting; otherwise
    /// the prompt continues from the recent events, ending with the player's
    /// latest choice if there is one.
    pub fn build(
        &self,
        character: &CharacterProfile,
        stage: &str,
        history_tail: &[StoryEvent],
        age_band: Option<AgeBand>,
        art_style: Option<&ArtStyle>,
    ) -> String {
        let choice_count = AgeBand::choice_count_for(age_band);
        let mut prompt = String::new();

        if history_tail.is_empty() {
            let _ = write!(
                prompt,
                "Create an opening scenario for {} in their ordinary world, \
                 facing the challenge of {} with the goal of {}.",
                character.portrait(),
                character.challenge().to_lowercase(),
                character.goal()
            );
        } else {
            let _ = write!(
                prompt,
                "Continue the story for {} in the \"{}\" stage of their journey \
                 to overcome {} and achieve {}.",
                character.portrait(),
                stage,
                character.challenge().to_lowercase(),
                character.goal()
            );
            prompt.push_str("\n\nStory so far:\n");
            for event in history_tail {
                if let Some(line) = Self::history_line(character, event) {
                    prompt.push_str(&line);
                    prompt.push('\n');
                }
            }
        }

        prompt.push_str("\n\n");
        prompt.push_str(AgeBand::vocabulary_for(age_band).guidance());

        if let Some(style) = art_style {
            let _ = write!(
                prompt,
                " The scene will be illustrated in the style of {}, so include concrete visual details.",
                style
            );
        }

        prompt.push_str("\n\n");
        prompt.push_str(&Self::format_instruction(choice_count));
        prompt
    }

    /// Prompt asking the text model to describe an illustration of `scenario`.
    pub fn image_prompt(
        &self,
        scenario: &str,
        character: &CharacterProfile,
        art_style: &ArtStyle,
    ) -> String {
        format!(
            "Create a vivid, single-paragraph description for an illustration capturing \
             a key moment in this scenario:\n\n{}\n\n\
             The image should feature {}. Focus on the hero's actions, the setting, \
             and any important elements. The description should be suitable for \
             creating an image in the style of {}. Keep the description under 50 words \
             and make it visually compelling.",
            scenario.trim(),
            character.portrait(),
            art_style
        )
    }

    fn history_line(character: &CharacterProfile, event: &StoryEvent) -> Option<String> {
        match event.kind() {
            StoryEventKind::Scenario(text) => Some(format!("Scenario: {}", text.trim())),
            StoryEventKind::Choice(text) => Some(format!("{} chose: {}", character.name(), text)),
            StoryEventKind::Outcome(_) | StoryEventKind::Image(_) | StoryEventKind::Error(_) => {
                None
            }
        }
    }

    fn format_instruction(choice_count: usize) -> String {
        let mut text = format!(
            "Provide a vivid, engaging scenario description followed by {} possible choices. \
             Do not include labels such as [Scenario Description] or [Choices]. \
             Format the response as:\n\nScenario description\n",
            choice_count
        );
        for position in 1..=choice_count {
            let ordinal = ORDINALS.get(position - 1).copied().unwrap_or("Another");
            let _ = write!(text, "\n{}. {} choice", position, ordinal);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn continuation_names_stage_and_last_choice() {
        let history = vec![
            StoryEvent::scenario(0, "Pip wakes up."),
            StoryEvent::image(0, odyssey_core::ImageHandle::new(vec![1], "image/png", "x")),
            StoryEvent::choice(0, "Peek outside"),
        ];
        let prompt = PromptBuilder::new().build(&hero(), "The Call to Adventure", &history, None, None);

        assert!(prompt.starts_with("Continue the story for Pip the hedgehog with a lantern tail"));
        assert!(prompt.contains("in the \"The Call to Adventure\" stage of their journey"));
        assert!(!prompt.contains("the The"));
        assert!(prompt.contains("Scenario: Pip wakes up."));
        assert!(prompt.contains("Pip chose: Peek outside"));
        assert!(prompt.contains("3. Third choice"));
    }

    #[test]
    fn art_style_is_mentioned_only_when_given() {
        let builder = PromptBuilder::new();
        let style = ArtStyle::from("Watercolor");
        let with = builder.build(&hero(), "The Ordeal", &[], None, Some(&style));
        let without = builder.build(&hero(), "The Ordeal", &[], None, None);
        assert!(with.contains("style of Watercolor"));
        assert!(!without.contains("style of"));
    }

    #[test]
    fn vocabulary_tracks_age_band() {
        let builder = PromptBuilder::new();
        let young = builder.build(&hero(), "The Ordeal", &[], Some(AgeBand::Young), None);
        let teen = builder.build(&hero(), "The Ordeal", &[], Some(AgeBand::Teen), None);
        assert!(young.contains("short sentences"));
        assert!(teen.contains("rich vocabulary"));
        assert!(!young.contains("3. Third choice"));
    }

    #[test]
    fn same_inputs_same_prompt() {
        let builder = PromptBuilder::new();
        let a = builder.build(&hero(), "The Ordeal", &[], Some(AgeBand::Middle), None);
        let b = builder.build(&hero(), "The Ordeal", &[], Some(AgeBand::Middle), None);
        assert_eq!(a, b);
    }

    #[test]
    fn image_prompt_mentions_style_and_hero() {
        let prompt = PromptBuilder::new().image_prompt(
            "  Pip crosses a rope bridge.  ",
            &hero(),
            &ArtStyle::default(),
        );
        assert!(prompt.contains("Pip crosses a rope bridge."));
        assert!(prompt.contains("feature Pip the hedgehog with a lantern tail"));
        assert!(prompt.contains("style of Digital painting"));
        assert!(prompt.contains("under 50 words"));
    }
}
