use anyhow::Context;
use buildspace_advice::{GeminiClient, THEMES, request_hint};
use buildspace_common::{BlockPos, GameConfig, Material};
use buildspace_kernel::{Interaction, InteractionKind, Surface, World};
use buildspace_render::{DebugTextRenderer, Renderer};
use buildspace_session::{GameEvent, Session, demo_world};
use buildspace_tools::WorldInspector;
use clap::{Parser, Subcommand};
use glam::Vec3;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "buildspace-cli", about = "Headless tools for the buildspace sandbox")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, materials and the effective configuration
    Info,
    /// Run the player simulation headless with some keys held
    Simulate {
        /// Simulated time in seconds
        #[arg(short, long, default_value = "2.0")]
        seconds: f32,
        /// Physical key names to hold for the whole run (e.g. KeyW, Space)
        #[arg(long)]
        hold: Vec<String>,
        /// Start with the starter structure
        #[arg(long)]
        demo_blocks: bool,
        /// Print the final scene
        #[arg(long)]
        render: bool,
    },
    /// Build a tower, then rebuild it from the recorded edit history
    Replay {
        /// Tower height
        #[arg(short = 'n', long, default_value = "5")]
        height: u32,
    },
    /// Summarise a world
    Inspect {
        /// Inspect the starter structure instead of an empty world
        #[arg(long)]
        demo_blocks: bool,
    },
    /// Ask the advice service for a building idea
    Advice {
        /// Theme to ask about (defaults to the first built-in theme)
        theme: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("buildspace-cli v{}", env!("CARGO_PKG_VERSION"));
            let materials: Vec<_> = Material::ALL.iter().map(|m| m.name()).collect();
            println!("materials: {}", materials.join(", "));
            let hotbar: Vec<_> = Material::HOTBAR.iter().map(|m| m.name()).collect();
            println!("hot-bar: {}", hotbar.join(", "));
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Simulate {
            seconds,
            hold,
            demo_blocks,
            render,
        } => {
            let world = if demo_blocks { demo_world() } else { World::new() };
            let mut session = Session::with_world(config, world);
            for code in &hold {
                session.push(GameEvent::key(code.as_str(), true));
            }
            let dt = session.config().physics.fixed_dt();
            let steps = (seconds / dt).round() as u32;
            for _ in 0..steps {
                session.update(dt);
            }
            let p = session.player_position();
            let v = session.player_velocity();
            println!("ticks: {}", session.ticks());
            println!("player: pos=({:.3}, {:.3}, {:.3}) vel=({:.3}, {:.3}, {:.3})", p.x, p.y, p.z, v.x, v.y, v.z);
            if render {
                print!("{}", DebugTextRenderer::new().render(&session.frame()));
            }
        }
        Commands::Replay { height } => {
            let mut session = Session::new(config);
            session.push(GameEvent::SelectMaterial(Material::Cobblestone));
            session.push(GameEvent::Interact(Interaction {
                surface: Surface::Ground {
                    point: Vec3::new(4.3, -0.5, 4.3),
                },
                kind: InteractionKind::Secondary,
            }));
            // Stack on top faces, then knock out the middle and undo once.
            for y in 0..height.saturating_sub(1) {
                session.push(GameEvent::Interact(Interaction {
                    surface: Surface::BlockFace {
                        position: BlockPos::new(5, y as i32, 5).center(),
                        face_index: 2,
                    },
                    kind: InteractionKind::Secondary,
                }));
            }
            session.push(GameEvent::Interact(Interaction {
                surface: Surface::BlockFace {
                    position: BlockPos::new(5, (height / 2) as i32, 5).center(),
                    face_index: 0,
                },
                kind: InteractionKind::Primary,
            }));
            session.push(GameEvent::Undo);
            session.update(0.0);

            let rebuilt = World::replay(session.history());
            println!("events: {}", session.history().len());
            println!("live:     {}", WorldInspector::summary(session.world()));
            println!("replayed: {}", WorldInspector::summary(&rebuilt));
            let ok = rebuilt.state_hash() == session.world().state_hash();
            println!("Match: {}", if ok { "OK" } else { "MISMATCH" });
            if !ok {
                anyhow::bail!("replay diverged from live world");
            }
        }
        Commands::Inspect { demo_blocks } => {
            let world = if demo_blocks { demo_world() } else { World::new() };
            println!("{}", WorldInspector::summary(&world));
            for block in world.blocks() {
                if let Some(info) = WorldInspector::inspect(&world, block.position) {
                    println!("  {info}");
                }
            }
        }
        Commands::Advice { theme } => {
            let theme = theme.unwrap_or_else(|| THEMES[0].to_string());
            let client = GeminiClient::from_env(&config.advice);
            if !client.has_credentials() {
                tracing::warn!(
                    "{} is not set; the fallback idea will be shown",
                    config.advice.api_key_env
                );
            }
            println!("{}", request_hint(&client, &theme));
        }
    }

    Ok(())
}
