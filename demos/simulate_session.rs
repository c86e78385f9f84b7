//! Run a simulated study session end to end
//!
//! A synthetic observer with fixed per-cone thresholds answers a staircase
//! for each cone channel; the session then classifies, builds the custom
//! filter and prints how a few colors come out under it and under the
//! recommended preset.

use cone_adapt::{
    ConeChannel, Direction, FilterKind, SessionContext, StaircaseController, StudyConfig,
    ThresholdMethod, Trial,
};
use std::{env, path::Path, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    let config = match args.get(1) {
        Some(path) => match StudyConfig::from_json_file(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e.user_message());
                process::exit(1);
            }
        },
        None => StudyConfig::default_study(),
    };

    // Observer with weak L cones
    let observer = [(ConeChannel::L, 28.0), (ConeChannel::M, 4.0), (ConeChannel::S, 5.0)];
    let directions = Direction::ALL;

    let mut staircase = StaircaseController::new(config.staircase.clone());
    let mut trials = Vec::new();
    for (channel, truth) in observer {
        staircase.reset();
        let mut n = 0;
        while !staircase.is_complete() {
            let contrast = staircase.current_contrast();
            let presented = directions[n % directions.len()];
            let chosen = if contrast >= truth {
                presented
            } else {
                directions[(n + 1) % directions.len()]
            };
            trials.push(Trial::new(channel, presented, chosen, contrast, 1500));
            staircase.record(contrast >= truth);
            n += 1;
        }
    }

    let method = ThresholdMethod::from(&config.staircase);
    let mut session = SessionContext::new(config);
    let profile = match session.record_cone_trials(&trials, method) {
        Ok(profile) => profile.clone(),
        Err(e) => {
            eprintln!("Estimation failed: {}", e.user_message());
            process::exit(1);
        }
    };

    if let Some(result) = session.cone_result() {
        for channel in ConeChannel::ALL {
            let m = result.channel(channel);
            println!(
                "{}: threshold {:.2}% (±{:.2}), logCS {:.2}, score {}, {}",
                channel, m.threshold, m.std_error, m.log_sensitivity, m.score, m.category
            );
        }
    }
    println!("Profile: {} severity {:.3}", profile.axis, profile.severity);

    let preset = session
        .recommended_preset()
        .map(FilterKind::from)
        .unwrap_or(FilterKind::Grayscale);
    let (Some(custom), Some(baseline)) = (
        session.active_filter(FilterKind::Custom),
        session.active_filter(preset),
    ) else {
        eprintln!("No filter available");
        process::exit(1);
    };

    println!();
    println!("{:<10} {:<10} {:<10}", "input", "custom", preset.to_string());
    for hex in ["#cc3333", "#33cc33", "#3366cc", "#e0a030", "#808080"] {
        println!("{:<10} {:<10} {:<10}", hex, custom.apply_hex(hex), baseline.apply_hex(hex));
    }
}
