use crate::infra::{load_registry, read_profile, InMemoryProfileStore, InMemoryRewardPublisher};
use chrono::Utc;
use clap::Args;
use cosmic_beats::error::AppError;
use cosmic_beats::profiles::{
    CompletionEngine, CompletionEvaluation, CompletionResult, DjProfile, Equipment, Location,
    Profile, ProfileCompletionService, ProfileId, Role, RoleProfile, SchemaRegistry, SocialLinks,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Profile document (JSON) to score
    #[arg(long)]
    pub(crate) profile: PathBuf,
    /// Schema document replacing the built-in role schemas
    #[arg(long)]
    pub(crate) schema: Option<PathBuf>,
    /// Print the completion result as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SchemaArgs {
    /// Role name (dj, raver, club, reporter, festival)
    pub(crate) role: Role,
    /// Schema document replacing the built-in role schemas
    #[arg(long)]
    pub(crate) schema: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Schema document replacing the built-in role schemas
    #[arg(long)]
    pub(crate) schema: Option<PathBuf>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let registry = load_registry(args.schema.as_deref())?;
    let profile = read_profile(&args.profile)?;
    let result = CompletionEngine::new(registry).evaluate(&profile);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for line in completion_report(&profile, &result) {
            println!("{line}");
        }
    }
    Ok(())
}

pub(crate) fn run_schema(args: SchemaArgs) -> Result<(), AppError> {
    let registry = load_registry(args.schema.as_deref())?;
    for line in schema_listing(&registry, args.role) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let registry = load_registry(args.schema.as_deref())?;
    let store = Arc::new(InMemoryProfileStore::default());
    let publisher = Arc::new(InMemoryRewardPublisher::default());
    let service = ProfileCompletionService::new(store, publisher.clone(), registry);

    println!("Profile completion demo");
    let mut dj = DjProfile {
        dj_name: "Nova Pulse".to_string(),
        ..DjProfile::default()
    };
    let mut profile = Profile::new(
        ProfileId("dj-demo".to_string()),
        "novapulse",
        RoleProfile::Dj(dj.clone()),
        Utc::now(),
    );

    let evaluation = service.register(profile.clone())?;
    println!("- Registered {} with only a DJ name", profile.id);
    print_evaluation(&evaluation);

    for step in demo_steps() {
        (step.apply)(&mut dj);
        profile.details = RoleProfile::Dj(dj.clone());
        let evaluation = service.save(profile.clone())?;
        println!("- {}", step.label);
        print_evaluation(&evaluation);
    }

    let view = service.completion(&profile.id)?;
    let badges: Vec<&str> = view.badges.iter().map(|badge| badge.label()).collect();
    println!(
        "\nFinal balance: {} BeatCoins | badges: {} | {} reward notices sent",
        view.beatcoins,
        if badges.is_empty() {
            "none".to_string()
        } else {
            badges.join(", ")
        },
        publisher.events().len()
    );
    Ok(())
}

struct DemoStep {
    label: &'static str,
    apply: fn(&mut DjProfile),
}

fn demo_steps() -> Vec<DemoStep> {
    vec![
        DemoStep {
            label: "Added music style, biography and home city",
            apply: |dj: &mut DjProfile| {
                dj.music_style = "Melodic techno".to_string();
                dj.biography = "Warehouse resident since 2019.".to_string();
                dj.location = Location {
                    city: "Berlin".to_string(),
                    ..Location::default()
                };
            },
        },
        DemoStep {
            label: "Uploaded a profile image and linked SoundCloud",
            apply: |dj: &mut DjProfile| {
                dj.profile_image = Some("https://cdn.cosmicbeats.app/nova.png".to_string());
                dj.social_links = SocialLinks {
                    soundcloud: Some("https://soundcloud.com/novapulse".to_string()),
                    ..SocialLinks::default()
                };
            },
        },
        DemoStep {
            label: "Cleared the biography",
            apply: |dj: &mut DjProfile| dj.biography.clear(),
        },
        DemoStep {
            label: "Rewrote the biography and listed equipment",
            apply: |dj: &mut DjProfile| {
                dj.biography = "Peak-time techno, vinyl only.".to_string();
                dj.equipment = Equipment {
                    decks: vec!["Technics SL-1210".to_string()],
                    ..Equipment::default()
                };
            },
        },
    ]
}

fn print_evaluation(evaluation: &CompletionEvaluation) {
    println!(
        "  Completion {}% -> {}% ({}/{} fields)",
        evaluation.previous_percentage,
        evaluation.completion.percentage,
        evaluation.completion.completed_fields,
        evaluation.completion.total_fields
    );
    match &evaluation.reward {
        Some(grant) => {
            let badge = if grant.reward.badge_earned {
                " + Profile Complete badge"
            } else {
                ""
            };
            println!(
                "  Crossed {}%: +{} BeatCoins{} (balance {})",
                grant.threshold.percentage(),
                grant.reward.beatcoins_awarded,
                badge,
                grant.beatcoins_total
            );
        }
        None => println!("  No new threshold crossed"),
    }
}

pub(crate) fn completion_report(profile: &Profile, result: &CompletionResult) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}): {}% complete, {}/{} fields",
        profile.id,
        profile.role().label(),
        result.percentage,
        result.completed_fields,
        result.total_fields
    )];

    let reward = result.reward();
    if reward.is_empty() {
        lines.push("Reward tier: none yet".to_string());
    } else {
        lines.push(format!(
            "Reward tier: {} BeatCoins{}",
            reward.beatcoins_awarded,
            if reward.badge_earned {
                " + Profile Complete badge"
            } else {
                ""
            }
        ));
    }

    if !result.incomplete_fields.is_empty() {
        lines.push("Missing fields:".to_string());
        for requirement in &result.incomplete_fields {
            lines.push(format!(
                "  - {} [{}] ({})",
                requirement.label,
                requirement.importance.label(),
                requirement.path
            ));
        }
    }
    lines
}

pub(crate) fn schema_listing(registry: &SchemaRegistry, role: Role) -> Vec<String> {
    let requirements = registry.required_fields(role);
    if requirements.is_empty() {
        return vec![format!("No schema registered for {}", role.label())];
    }

    let mut lines = vec![format!(
        "{} profiles require {} fields:",
        role.label(),
        requirements.len()
    )];
    lines.extend(requirements.iter().map(|requirement| {
        format!(
            "  - {:<16} {} [{}]",
            requirement.path,
            requirement.label,
            requirement.importance.label()
        )
    }));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn dj(details: DjProfile) -> Profile {
        Profile::new(
            ProfileId("dj-report".to_string()),
            "nova",
            RoleProfile::Dj(details),
            Utc::now(),
        )
    }

    #[test]
    fn report_lists_missing_fields_with_importance() {
        let profile = dj(DjProfile {
            dj_name: "Nova Pulse".to_string(),
            ..DjProfile::default()
        });
        let result = CompletionEngine::default().evaluate(&profile);

        let lines = completion_report(&profile, &result);

        assert!(lines[0].contains("14% complete, 1/7 fields"));
        assert_eq!(lines[1], "Reward tier: none yet");
        assert_eq!(lines[2], "Missing fields:");
        assert_eq!(lines.len(), 3 + 6);
        assert!(lines[3].contains("musicStyle"));
    }

    #[test]
    fn schema_listing_reports_unregistered_roles() {
        let registry = SchemaRegistry::standard().without_role(Role::Club);

        let lines = schema_listing(&registry, Role::Club);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("No schema registered"));

        let lines = schema_listing(&registry, Role::Festival);
        assert_eq!(lines.len(), 7);
        assert!(lines[3].contains("dates.startsOn"));
    }

    #[test]
    fn demo_steps_finish_with_a_complete_profile() {
        let mut details = DjProfile {
            dj_name: "Nova Pulse".to_string(),
            ..DjProfile::default()
        };
        for step in demo_steps() {
            (step.apply)(&mut details);
        }

        let profile = dj(details);
        assert_eq!(
            CompletionEngine::default().calculate_percentage(&profile),
            100
        );
    }

    #[test]
    fn demo_runs_against_the_builtin_schemas() {
        run_demo(DemoArgs::default()).expect("demo completes");
    }

    #[test]
    fn score_reads_profile_documents() {
        let path = std::env::temp_dir().join(format!(
            "cosmic-beats-score-{}.json",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"{
                "id": "raver-file",
                "username": "lena",
                "createdAt": "2025-05-01T20:00:00Z",
                "role": "raver",
                "favoriteGenres": ["techno"]
            }"#,
        )
        .expect("write profile");

        let result = run_score(ScoreArgs {
            profile: path.clone(),
            schema: None,
            json: true,
        });
        fs::remove_file(&path).ok();

        result.expect("score succeeds");
    }

    #[test]
    fn score_rejects_malformed_documents() {
        let path = std::env::temp_dir().join(format!(
            "cosmic-beats-malformed-{}.json",
            std::process::id()
        ));
        fs::write(&path, "{ \"role\": \"dj\"").expect("write profile");

        let result = run_score(ScoreArgs {
            profile: path.clone(),
            schema: None,
            json: false,
        });
        fs::remove_file(&path).ok();

        assert!(matches!(result, Err(AppError::ProfileDocument(_))));
    }
}
