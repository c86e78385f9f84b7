//! Generate the default study configuration file
//!
//! Creates a JSON config with all default parameters

use cone_adapt::StudyConfig;
use std::{env, path::Path, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <output_config.json>", args[0]);
        eprintln!();
        eprintln!("Example:");
        eprintln!("  {} study/config.json", args[0]);
        process::exit(1);
    }

    let output_path = Path::new(&args[1]);

    if let Some(parent) = output_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            process::exit(1);
        }
    }

    let config = StudyConfig::default_study();

    match config.to_json_file(output_path) {
        Ok(_) => {
            eprintln!("Configuration saved to {}", output_path.display());
            eprintln!();
            eprintln!("Config summary:");
            eprintln!(
                "  Staircase: start {:.0}%, ×{} / ×{}, {} trials per cone",
                config.staircase.initial_contrast,
                config.staircase.correct_step_down,
                config.staircase.incorrect_step_up,
                config.staircase.trials_per_cone
            );
            eprintln!(
                "  Reversals: last {}, discard first {}",
                config.staircase.last_n_reversals, config.staircase.discard_first_reversals
            );
            eprintln!(
                "  Categories: Possible > {:.0}%, Deficient > {:.0}%",
                config.scoring.possible_threshold, config.scoring.deficient_threshold
            );
            eprintln!(
                "  Filter: hue ≤ {:.0}°, saturation ≤ +{:.2}, luminance ≤ +{:.2}",
                config.filter.max_hue_angle,
                config.filter.max_saturation_boost,
                config.filter.max_luminance_gain
            );
        }
        Err(e) => {
            eprintln!("Error saving config: {}", e.user_message());
            process::exit(1);
        }
    }
}
