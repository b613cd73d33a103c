//! `play` and `resume`: the interactive story loop.

use super::console::Console;
use super::sessions::load_snapshot;
use crate::OdysseyConfig;
use crate::cli::PlayArgs;
use odyssey_core::{ArtStyle, CharacterProfile, SUGGESTED_CHALLENGES};
use odyssey_error::OdysseyResult;
use odyssey_models::OpenAIClient;
use odyssey_narrative::{JourneySession, PendingTurn, TurnReport};
use odyssey_storage::{FileSystemImageStorage, FileSystemSessionStore, ImageStorage};
use std::error::Error;
use tracing::{info, warn};

type Session = JourneySession<OpenAIClient, OpenAIClient>;

/// Where a running journey keeps its snapshot and illustrations.
struct Stores {
    sessions: FileSystemSessionStore,
    media: FileSystemImageStorage,
}

impl Stores {
    fn open(config: &OdysseyConfig) -> OdysseyResult<Self> {
        Ok(Self {
            sessions: FileSystemSessionStore::new(config.storage().session_dir()),
            media: FileSystemImageStorage::new(config.storage().media_dir())?,
        })
    }
}

/// Start a new journey.
pub async fn play(args: PlayArgs, config: &OdysseyConfig) -> Result<(), Box<dyn Error>> {
    let mut console = Console::stdin();
    let profile = hero_from(&args, &mut console).await?;
    let settings = config.session_settings(
        args.age_band,
        args.art_style.map(ArtStyle::new),
        !args.no_images,
    )?;

    let client = OpenAIClient::new(config.openai_config()?)?;
    let stores = Stores::open(config)?;
    let mut session = JourneySession::new(
        profile,
        settings,
        config.tracker()?,
        client.clone(),
        client,
    )?;

    println!(
        "\nBeginning the journey of {} (session {})\n",
        session.profile().portrait(),
        session.session_id()
    );
    let opening = session.begin().await;
    show_turn(opening, &session, &stores).await;

    story_loop(&mut session, &mut console, &stores).await
}

/// Continue a saved journey.
pub async fn resume(session_id: &str, config: &OdysseyConfig) -> Result<(), Box<dyn Error>> {
    let stores = Stores::open(config)?;
    let snapshot = load_snapshot(&stores.sessions, session_id).await?;
    let client = OpenAIClient::new(config.openai_config()?)?;
    let mut session = JourneySession::restore(snapshot, client.clone(), client)?;
    info!(session_id, events = session.log().len(), "Resumed journey");

    println!(
        "\nWelcome back, {}. Stage {}/{}: {}\n",
        session.profile().name(),
        session.tracker().current_stage_index() + 1,
        session.tracker().stage_count(),
        session.tracker().current_stage()
    );
    if session.is_ended() {
        println!("This journey was ended early. Export it to read the story.");
        return Ok(());
    }
    if matches!(session.pending(), Some(PendingTurn::Opening)) {
        println!("The story has not been told yet. Press r to begin.");
    } else if let Some(scenario) = session.current_scenario() {
        println!("{}\n", scenario.narrative().trim());
        print_choices(scenario.choices());
        if session.pending().is_some() {
            println!("\nYour last choice was never answered. Press r to try it again.");
        }
    } else {
        println!("Starting from the beginning.");
        let opening = session.begin().await;
        show_turn(opening, &session, &stores).await;
    }

    let mut console = Console::stdin();
    story_loop(&mut session, &mut console, &stores).await
}

async fn story_loop(
    session: &mut Session,
    console: &mut Console,
    stores: &Stores,
) -> Result<(), Box<dyn Error>> {
    while !session.is_finished() {
        let prompt = match session.current_scenario() {
            Some(scenario) => format!(
                "\nChoose 1-{}, r to retry, q to save and quit: ",
                scenario.choices().len()
            ),
            None => "\nr to retry, q to save and quit: ".to_string(),
        };
        let Some(answer) = console.ask(&prompt).await? else {
            break;
        };

        let turn = match answer.to_lowercase().as_str() {
            "q" | "quit" => break,
            "r" | "retry" => session.retry().await,
            other => match other.parse::<usize>() {
                Ok(number) if number >= 1 => session.choose(number - 1).await,
                _ => {
                    println!("Enter a choice number, r or q.");
                    continue;
                }
            },
        };
        show_turn(turn, session, stores).await;
    }

    if session.is_complete() {
        println!(
            "\n*** {} has completed the hero's journey! ***",
            session.profile().name()
        );
    } else if session.is_ended() {
        println!(
            "\n{}'s journey ends here, at {}.",
            session.profile().name(),
            session.tracker().current_stage()
        );
    }
    session.save_to(&stores.sessions).await?;
    println!(
        "\nSaved. Resume with `odyssey resume {0}` or export with `odyssey export {0} --out story.md`",
        session.session_id()
    );
    Ok(())
}

async fn show_turn(turn: OdysseyResult<TurnReport>, session: &Session, stores: &Stores) {
    let report = match turn {
        Ok(report) => report,
        Err(e) if e.is_generation_failure() => {
            println!("\nThe storyteller stumbled: {}", e);
            println!("Press r to try again.");
            return;
        }
        Err(e) => {
            println!("\n{}", e);
            return;
        }
    };

    if *report.ended() {
        return;
    }
    if *report.advanced() || session.log().turn_count() <= 1 {
        println!(
            "\n== Stage {}/{}: {} ({:.0}% of the journey) ==",
            report.stage_index() + 1,
            session.tracker().stage_count(),
            report.stage(),
            session.tracker().journey_fraction() * 100.0
        );
    }
    println!("\n{}\n", report.scenario().narrative().trim());

    if let Some(image) = report.image() {
        match stores.media.store(image).await {
            Ok(stored) => println!("[Illustration: {}]\n", stored.path().display()),
            Err(e) => warn!(error = %e, "Could not save illustration"),
        }
    }
    if let Some(note) = report.image_error() {
        println!("(No illustration this time: {})\n", note);
    }

    if !*report.complete() {
        print_choices(report.scenario().choices());
    }
}

fn print_choices(choices: &[String]) {
    for (i, choice) in choices.iter().enumerate() {
        println!("  {}. {}", i + 1, choice);
    }
}

/// Fill in whatever hero details were not given on the command line.
async fn hero_from(
    args: &PlayArgs,
    console: &mut Console,
) -> Result<CharacterProfile, Box<dyn Error>> {
    let name = answer_or_ask(&args.name, "What is your hero's name? ", console).await?;
    let creature =
        answer_or_ask(&args.creature, "What kind of creature are they? ", console).await?;
    let feature = answer_or_ask(&args.feature, "What makes them stand out? ", console).await?;

    let challenge = match &args.challenge {
        Some(challenge) => challenge.clone(),
        None => {
            println!("What challenge do they face?");
            print_choices(&SUGGESTED_CHALLENGES.map(String::from));
            let answer = console
                .ask_required("Pick a number or describe your own: ")
                .await?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=SUGGESTED_CHALLENGES.len()).contains(&n) => {
                    SUGGESTED_CHALLENGES[n - 1].to_string()
                }
                _ => answer,
            }
        }
    };

    let goal = answer_or_ask(&args.goal, "What do they want to achieve? ", console).await?;

    let profile = CharacterProfile::builder()
        .name(name)
        .creature(creature)
        .distinguishing_feature(feature)
        .challenge(challenge)
        .goal(goal)
        .build()?;
    Ok(profile)
}

async fn answer_or_ask(
    given: &Option<String>,
    prompt: &str,
    console: &mut Console,
) -> std::io::Result<String> {
    match given {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => console.ask_required(prompt).await,
    }
}
