use clap::Parser;
use std::path::PathBuf;
use std::process;
use steedman::{
    explore_by_depth, find_next_steps, grid_notation_of, parse_progression_text_with,
    parse_tokens, ExplorationReport, GrammarConfig, GrammarError, NotationMode,
};
use tracing_subscriber::EnvFilter;

/// Explore Steedman jazz-grammar rewrites of a chord progression.
#[derive(Parser, Debug)]
#[command(name = "steedman", version)]
struct Cli {
    /// Progression as CSV ("I@4,IV@2,V7@2"), JSON ('["I@4","IV@2"]' or
    /// '[{"chord":"I","duration":4}]'), or grid notation ("| I / I / V7 / V7 |").
    progression: String,

    /// Notation of the progression: auto, duration or grid.
    #[arg(long)]
    mode: Option<NotationMode>,

    /// Maximum number of rule applications to explore.
    #[arg(long, allow_negative_numbers = true)]
    depth: Option<i64>,

    /// List one-step rule applications instead of the depth search.
    #[arg(long)]
    steps: bool,

    /// Also print each sequence in grid notation.
    #[arg(long)]
    grid: bool,

    /// Emit JSON output.
    #[arg(long)]
    json: bool,

    /// YAML file with default settings.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), GrammarError> {
    let mut config = match &cli.config {
        Some(path) => GrammarConfig::load(path)?,
        None => GrammarConfig::default(),
    };
    if let Some(mode) = cli.mode {
        config.notation = mode;
    }
    if let Some(depth) = cli.depth {
        config.depth = depth;
    }

    let (progression, notation) =
        parse_progression_text_with(&cli.progression, config.notation, &config.grid)?;
    tracing::debug!(%notation, chords = progression.len(), "parsed progression");

    if cli.steps {
        print_steps(cli, &config, &progression)
    } else {
        print_levels(cli, &config, &progression)
    }
}

fn print_steps(
    cli: &Cli,
    config: &GrammarConfig,
    progression: &[steedman::TimedChord],
) -> Result<(), GrammarError> {
    let applications = find_next_steps(progression);
    if cli.json {
        println!("{}", to_json(&applications));
        return Ok(());
    }

    println!("One-step rewrites ({})", applications.len());
    if applications.is_empty() {
        println!("  (none)");
    }
    for (idx, app) in applications.iter().enumerate() {
        println!(
            "  {}. rule {} span [{}, {}): {} -> {}",
            idx + 1,
            app.rule,
            app.start,
            app.end,
            app.before.join(" / "),
            app.replacement.join(" / ")
        );
        println!("     {}", app.result_with_span_marked());
        if cli.grid {
            print_grid(config, &app.result, "     ");
        }
    }
    Ok(())
}

fn print_levels(
    cli: &Cli,
    config: &GrammarConfig,
    progression: &[steedman::TimedChord],
) -> Result<(), GrammarError> {
    let levels = explore_by_depth(progression, config.depth)?;
    if cli.json {
        let report = ExplorationReport::new(config.depth as usize, levels);
        println!("{}", to_json(&report));
        return Ok(());
    }

    println!("Depth search (max depth = {})", config.depth);
    for (level, sequences) in &levels {
        let noun = if sequences.len() == 1 { "sequence" } else { "sequences" };
        println!("\nLevel {} ({} {})", level, sequences.len(), noun);
        if sequences.is_empty() {
            println!("  (none)");
            continue;
        }
        for (idx, sequence) in sequences.iter().enumerate() {
            println!("  {}. {}", idx + 1, sequence.join(" / "));
            if cli.grid {
                print_grid(config, sequence, "     ");
            }
        }
    }
    Ok(())
}

/// Grid rendering is best effort: sequences with subdivisions beyond the
/// configured maximum are listed in token form only.
fn print_grid(config: &GrammarConfig, tokens: &[String], indent: &str) {
    let rendered = parse_tokens(tokens).and_then(|seq| grid_notation_of(&seq, &config.grid));
    match rendered {
        Ok(grid) => {
            for line in grid.lines() {
                println!("{}{}", indent, line);
            }
        }
        Err(e) => tracing::debug!(error = %e, "sequence has no grid rendering"),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        process::exit(1);
    })
}
