use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use masonry_flow::random::DEFAULT_SHUFFLE_SEED;
use masonry_flow::{
    CardStack, ContentFilter, DataSource, FlowConfig, MasonryEngine, SeededRandom, Size,
    StackConfig, TextMetricsSurface,
};

#[derive(Parser)]
#[command(name = "masonry-flow", version, about = "Run the masonry feed or card stack headlessly")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lay out a feed and advance it for a number of frames
    Simulate {
        /// JSON array of records, or an object with a `quotes` array
        #[arg(long)]
        data: PathBuf,
        /// JSON FlowConfig; missing fields use defaults
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 1600.0)]
        width: f64,
        #[arg(long, default_value_t = 900.0)]
        height: f64,
        #[arg(long, default_value_t = 600)]
        frames: u32,
        #[arg(long)]
        seed: Option<u64>,
        /// Print every live card instead of a summary
        #[arg(long)]
        full: bool,
    },
    /// Deal the card stack and swipe through it
    Stack {
        #[arg(long)]
        data: PathBuf,
        #[arg(long, default_value_t = 10)]
        swipes: usize,
        #[arg(long)]
        seed: Option<u64>,
        /// Only include these sectors (repeatable)
        #[arg(long)]
        sector: Vec<String>,
        /// Only include these categories (repeatable)
        #[arg(long)]
        category: Vec<String>,
        /// Only include these subcategories (repeatable)
        #[arg(long)]
        subcategory: Vec<String>,
    },
}

#[derive(Serialize)]
struct Summary {
    columns: usize,
    card_width: f64,
    virtual_offset: f64,
    live_cards: usize,
    column_heights: Vec<f64>,
    digest: String,
}

fn rng_for(seed: Option<u64>) -> SeededRandom {
    seed.map(SeededRandom::new)
        .unwrap_or_else(SeededRandom::from_clock)
}

fn load_data(path: &Path) -> anyhow::Result<DataSource> {
    DataSource::from_json_file(path)
        .with_context(|| format!("failed to load data from {}", path.display()))
}

fn simulate(
    data: PathBuf,
    config: Option<PathBuf>,
    size: Size,
    frames: u32,
    seed: Option<u64>,
    full: bool,
) -> anyhow::Result<()> {
    let data = load_data(&data)?;
    let config = match config {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            FlowConfig::from_json_str(&text)?
        }
        None => FlowConfig::default(),
    };

    let mut engine =
        MasonryEngine::initialize(size, config, data, TextMetricsSurface::new(), rng_for(seed))?;
    for _ in 0..frames {
        engine.tick(1.0);
    }

    let snapshot = engine.snapshot();
    if full {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        let summary = Summary {
            columns: snapshot.columns,
            card_width: snapshot.card_width,
            virtual_offset: snapshot.virtual_offset,
            live_cards: snapshot.cards.len(),
            column_heights: snapshot.column_heights.clone(),
            digest: snapshot.digest(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn stack(
    data: PathBuf,
    swipes: usize,
    seed: Option<u64>,
    filter: ContentFilter,
) -> anyhow::Result<()> {
    let data = load_data(&data)?.shuffled(&mut SeededRandom::new(DEFAULT_SHUFFLE_SEED));
    let mut stack = CardStack::new(data, StackConfig::default(), rng_for(seed))?;
    if !filter.is_empty() {
        stack.set_filter(filter);
    }

    for step in 0..=swipes {
        let Some(top) = stack.top() else {
            println!("stack is empty");
            break;
        };
        let label = stack
            .content(top)
            .map(|c| format!("{} | {} | {}", c.stack_header(), c.category, c.text))
            .unwrap_or_default();
        println!("{:>3}: #{} {} {}", step, top.number(), top.color, label);
        if step < swipes {
            stack.next();
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Simulate {
            data,
            config,
            width,
            height,
            frames,
            seed,
            full,
        } => simulate(data, config, Size { width, height }, frames, seed, full),
        Command::Stack {
            data,
            swipes,
            seed,
            sector,
            category,
            subcategory,
        } => stack(
            data,
            swipes,
            seed,
            ContentFilter {
                sectors: sector,
                categories: category,
                subcategories: subcategory,
            },
        ),
    }
}
