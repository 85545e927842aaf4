//! Example Bot
//!
//! Registers a handful of commands and components, then replays a scripted
//! sequence of interactions through the runtime in place of a real gateway
//! connection.
//!
//! # Stateless Components
//!
//! The `ping` command answers with a button whose custom ID carries the
//! caller's name. Pressing it routes to the `pong` component, which reads the
//! name back from its arguments:
//!
//! ```text
//! /ping ─▶ "Ping! [button: pong?Al$a;ice]" ─▶ press ─▶ "Pong! by Al&ice"
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --package example-bot
//! cargo run --package example-bot -- --manifest
//! SUGAR_DISPATCH__ERROR_REPLY="Oops" cargo run --package example-bot
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use sugar::core::testing::MockInteraction;
use sugar::prelude::*;
use sugar::runtime::RuntimeBuilder;
use tracing::info;

#[derive(Debug, Parser)]
#[command(about = "Replays scripted interactions through the Sugar runtime")]
struct Args {
    /// Configuration file (defaults to sugar.toml in the current directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile.
    #[arg(short, long)]
    profile: Option<String>,

    /// Print the command manifest as JSON and exit.
    #[arg(long)]
    manifest: bool,
}

// ============================================================================
// Middlewares
// ============================================================================

#[derive(Debug, Clone)]
struct ExampleA(String);

#[derive(Debug, Clone)]
struct ExampleB(String);

async fn example_middleware_a(ctx: Context) -> Context {
    ctx.with(ExampleA("exampleA".to_string()))
}

async fn example_middleware_b(ctx: Context) -> Result<Context, BoxError> {
    let a = ctx.require::<ExampleA>()?.0.clone();
    Ok(ctx.with(ExampleB(format!("{a}, exampleB"))))
}

// ============================================================================
// Handlers
// ============================================================================

const COLORS: [(&str, &str); 5] = [
    ("white", "#ffffff"),
    ("black", "#000000"),
    ("red", "#ff0000"),
    ("green", "#00ff00"),
    ("blue", "#0000ff"),
];

async fn color_autocomplete(interaction: BoxedInteraction) -> Vec<AutocompleteChoice> {
    let focused = interaction.focused_value().unwrap_or_default();
    COLORS
        .iter()
        .filter(|(name, _)| name.starts_with(focused))
        .map(|(name, code)| AutocompleteChoice::new(*name, *code))
        .collect()
}

async fn middleware_test(ctx: Context) -> Result<String, BoxError> {
    let a = &ctx.require::<ExampleA>()?.0;
    let b = &ctx.require::<ExampleB>()?.0;
    Ok(format!("exampleA: {a}, exampleB: {b}"))
}

async fn pong(ctx: Context) -> Result<String, BoxError> {
    Ok(format!("Pong! by {}", ctx.arg(0)?))
}

async fn quote(_ctx: Context) -> &'static str {
    "This is a context menu command!"
}

/// Custom IDs of the buttons the script presses.
struct Buttons {
    pong: String,
    hello: String,
}

fn build_registry(ids: &IdGenerator) -> (Registry, Buttons) {
    let pong = component("pong").handler(pong);
    let hello = ComponentBuilder::generated(ids).handler(|_ctx: Context| async { "Hello, world!" });
    let buttons = Buttons {
        pong: pong.custom_id_with(["Al&ice"]),
        hello: hello.routing_key().to_string(),
    };
    let button_id = buttons.pong.clone();

    let registry = Registry::builder()
        .register(
            slash_command("ping")
                .description("Send button and message!")
                .middleware(guild_only("This command only works in servers."))
                .handler(move |_ctx: Context| {
                    let reply = format!("Ping! [button: {button_id}]");
                    async move { reply }
                }),
        )
        .register(
            slash_command("middleware-test")
                .description("Return result of middleware test.")
                .middleware(example_middleware_a)
                .middleware(example_middleware_b)
                .handler(middleware_test),
        )
        .register(
            slash_command("color")
                .description("Get color code.")
                .autocomplete(color_autocomplete)
                .handler(|_ctx: Context| async { "Color code: #ffffff" }),
        )
        .register(
            message_command("Test Context")
                .middleware(guild_only("This command only works in servers."))
                .handler(quote),
        )
        .register(pong)
        .register(hello)
        .build();

    (registry, buttons)
}

fn script(buttons: &Buttons) -> Vec<Arc<MockInteraction>> {
    vec![
        MockInteraction::slash("ping").in_guild("1").by_user("alice"),
        MockInteraction::slash("ping"),
        MockInteraction::slash("middleware-test").in_guild("1"),
        MockInteraction::autocomplete("color", "b"),
        MockInteraction::message_context("Test Context").in_guild("1"),
        MockInteraction::button(&buttons.pong),
        MockInteraction::button(&buttons.hello),
        MockInteraction::button("pong"),
        MockInteraction::button("removed-in-v2?1&2"),
        MockInteraction::slash("doesnotexist"),
    ]
    .into_iter()
    .map(Arc::new)
    .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let ids = IdGenerator::with_prefix("demo");
    let (registry, buttons) = build_registry(&ids);

    if args.manifest {
        println!("{}", registry.manifest_json()?);
        return Ok(());
    }

    let mut builder = RuntimeBuilder::new();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &args.profile {
        builder = builder.profile(profile);
    }
    let runtime = builder.build(registry)?;

    let (sender, receiver) = runtime.channel();
    let interactions = script(&buttons);
    let feed = {
        let interactions = interactions.clone();
        tokio::spawn(async move {
            for interaction in interactions {
                let boxed: BoxedInteraction = interaction;
                if sender.send(boxed).await.is_err() {
                    break;
                }
            }
        })
    };

    runtime.run(receiver).await?;
    feed.await?;

    for interaction in &interactions {
        let id = interaction
            .custom_id_raw()
            .or(interaction.command_name())
            .unwrap_or_default();
        for reply in interaction.replies() {
            info!(interaction = id, reply = %reply, "Reply");
        }
        for choices in interaction.responses() {
            let names: Vec<&str> = choices.iter().map(|c| c.name.as_str()).collect();
            info!(interaction = id, ?names, "Autocomplete");
        }
    }
    info!(stats = %runtime.stats(), "Done");

    Ok(())
}
