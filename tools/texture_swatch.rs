/// Texture swatch: renders one outfit pattern to a PNG.
///
/// Usage: texture_swatch --pattern <key> --color <key> --out <path> [--seed <n>]
///
/// Pattern keys: solid, stripes, polkaDots, plaid, floral
/// Color keys:   lavender, teal, rose, navy, floral
use avatar_engine::core::texture::generate_texture_with_rng;
use avatar_engine::schema::appearance::{OutfitColor, OutfitPattern};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut pattern = OutfitPattern::default();
    let mut color = OutfitColor::default();
    let mut out = None;
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--pattern" if i + 1 < args.len() => {
                i += 1;
                pattern = OutfitPattern::from_key(&args[i]).unwrap_or_else(|| {
                    eprintln!("Unknown pattern: {}", args[i]);
                    std::process::exit(1);
                });
            }
            "--color" if i + 1 < args.len() => {
                i += 1;
                color = OutfitColor::from_key(&args[i]).unwrap_or_else(|| {
                    eprintln!("Unknown color: {}", args[i]);
                    std::process::exit(1);
                });
            }
            "--out" if i + 1 < args.len() => {
                i += 1;
                out = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(out) = out else {
        eprintln!("Error: --out is required");
        std::process::exit(1);
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let texture = match generate_texture_with_rng(pattern, color.color(), &mut rng) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error generating texture: {}", e);
            std::process::exit(1);
        }
    };

    let (w, h) = (texture.width(), texture.height());
    if let Err(e) = texture.into_image().save(&out) {
        eprintln!("Error writing {}: {}", out, e);
        std::process::exit(1);
    }
    println!(
        "Wrote {} {} swatch ({}x{}) to {}",
        color.label(),
        pattern.label(),
        w,
        h,
        out
    );
}

fn print_usage() {
    println!("Usage: texture_swatch --pattern <key> --color <key> --out <path> [--seed <n>]");
    println!();
    println!("Patterns:");
    for p in OutfitPattern::ALL {
        println!("  {:<10} {}", p.key(), p.label());
    }
    println!("Colors:");
    for c in OutfitColor::ALL {
        println!("  {:<10} {}", c.key(), c.label());
    }
}
