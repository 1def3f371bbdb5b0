/// Figure inspector: builds the avatar for a settings file, prints its
/// scene tree, then plays an action for a while and reports joint poses.
///
/// Usage: figure_inspect [--settings <path>] [--config <path>]
///                       [--action <name>] [--seconds <n>] [--speak] [--seed <n>]
///
/// Actions: idle, wave, tellStory, listen, celebrate, love
use avatar_engine::core::config::AvatarConfig;
use avatar_engine::core::engine::AvatarEngine;
use avatar_engine::core::figure::Figure;
use avatar_engine::core::scene::NodePath;
use avatar_engine::schema::appearance::AppearanceSettings;
use avatar_engine::schema::state::Action;
use std::path::Path;

/// Simulation step, roughly one display frame.
const FRAME: f32 = 1.0 / 60.0;

fn parse_action(name: &str) -> Option<Action> {
    match name {
        "idle" => Some(Action::Idle),
        "wave" => Some(Action::Wave),
        "tellStory" => Some(Action::TellStory),
        "listen" => Some(Action::Listen),
        "celebrate" => Some(Action::Celebrate),
        "love" => Some(Action::Love),
        _ => None,
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let mut settings_path = None;
    let mut config_path = None;
    let mut action = Action::Idle;
    let mut seconds: f32 = 3.0;
    let mut speak = false;
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--settings" if i + 1 < args.len() => {
                i += 1;
                settings_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--action" if i + 1 < args.len() => {
                i += 1;
                action = parse_action(&args[i]).unwrap_or_else(|| {
                    eprintln!("Unknown action: {}", args[i]);
                    std::process::exit(1);
                });
            }
            "--seconds" if i + 1 < args.len() => {
                i += 1;
                seconds = args[i].parse().unwrap_or(3.0);
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            "--speak" => speak = true,
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let settings = match &settings_path {
        Some(path) => match AppearanceSettings::load_from_ron(Path::new(path)) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading settings: {}", e);
                std::process::exit(1);
            }
        },
        None => AppearanceSettings::default(),
    };

    let config = match &config_path {
        Some(path) => match AvatarConfig::load_from_ron(Path::new(path)) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        },
        None => AvatarConfig::default(),
    };

    let mut engine = match AvatarEngine::builder()
        .settings(settings)
        .config(config)
        .seed(seed)
        .build()
    {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error building avatar: {}", e);
            std::process::exit(1);
        }
    };

    let Some(figure) = engine.figure() else {
        eprintln!("No figure was built");
        std::process::exit(1);
    };
    println!("=== Scene ({} nodes) ===", figure.root.len());
    print!("{}", figure.root.outline());

    let stage = engine.stage();
    let (top, bottom) = stage.backdrop();
    println!();
    println!(
        "Backdrop: {} ({:?} -> {:?}), filter {}",
        stage.background.label(),
        top.to_rgba8(),
        bottom.to_rgba8(),
        stage.filter.label()
    );

    engine.apply_action(action);
    engine.apply_lip_sync(speak);

    println!();
    println!("=== {:?} for {:.1}s ===", action, seconds);
    let frames = (seconds / FRAME).ceil() as usize;
    let report_every = (0.5 / FRAME).round() as usize;
    for frame in 1..=frames {
        engine.tick(FRAME);
        if frame % report_every == 0 || frame == frames {
            if let Some(figure) = engine.figure() {
                report(engine.now(), figure);
            }
        }
    }
}

fn report(now: f64, figure: &Figure) {
    let rot = |path: &NodePath| {
        figure
            .node(path)
            .map(|n| n.transform.rotation)
            .unwrap_or_default()
    };
    let scale = |path: &NodePath| {
        figure
            .node(path)
            .map(|n| n.transform.scale)
            .unwrap_or_default()
    };
    let p = &figure.parts;
    println!(
        "t={:5.2}  rSh={:>5.2?} rEl={:>5.2?} head={:>5.2?} mouthY={:.2} eyeY={:.2}",
        now,
        rot(&p.right_shoulder).to_array(),
        rot(&p.right_elbow).x,
        rot(&p.head).z,
        scale(&p.mouth).y,
        scale(&p.eye_l).y,
    );
}

fn print_usage() {
    println!("Usage: figure_inspect [--settings <path>] [--config <path>]");
    println!("                      [--action <name>] [--seconds <n>] [--speak] [--seed <n>]");
    println!();
    println!("Actions: idle, wave, tellStory, listen, celebrate, love");
}
