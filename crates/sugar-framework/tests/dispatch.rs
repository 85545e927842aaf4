//! End-to-end dispatch behaviour against a scripted interaction.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sugar_core::custom_id::{compose, encode};
use sugar_core::testing::MockInteraction;
use sugar_core::{AutocompleteChoice, BoxedInteraction, HandlerKind};
use sugar_framework::prelude::*;
use sugar_framework::{DispatchError, Registry};
use tokio_test::assert_ok;
use tower::{Service, ServiceExt};

#[derive(Debug, Clone)]
struct ExampleA(String);

#[derive(Debug, Clone)]
struct ExampleB(String);

#[derive(Debug, Clone, Default)]
struct Trail(Vec<&'static str>);

fn mark(name: &'static str) -> impl Fn(Context) -> std::future::Ready<Context> + Send + Sync {
    move |ctx: Context| {
        let mut trail = ctx.get::<Trail>().cloned().unwrap_or_default();
        trail.0.push(name);
        std::future::ready(ctx.with(trail))
    }
}

fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    (Arc::clone(&count), count)
}

#[tokio::test]
async fn component_receives_decoded_args() {
    let registry = Registry::builder()
        .register(component("pong").handler(|ctx: Context| async move {
            assert_eq!(ctx.args(), ["Al&ice".to_string()]);
            "Pong!"
        }))
        .build();
    let dispatcher = Dispatcher::new(registry);

    let identifier = format!("pong?{}", encode("Al&ice"));
    assert_eq!(identifier, "pong?Al$a;ice");

    let (mock, interaction) = MockInteraction::button(identifier).shared();
    assert!(dispatcher.dispatch(interaction).await.is_completed());
    assert_eq!(mock.replies(), vec!["Pong!"]);
}

#[tokio::test]
async fn middlewares_build_on_each_other() {
    let registry = Registry::builder()
        .register(
            slash_command("middleware-test")
                .middleware(|ctx: Context| async move { ctx.with(ExampleA("exampleA".into())) })
                .middleware(|ctx: Context| async move {
                    let a = ctx.require::<ExampleA>()?.0.clone();
                    Ok::<_, BoxError>(ctx.with(ExampleB(format!("{a}, exampleB"))))
                })
                .handler(|ctx: Context| async move {
                    Ok::<_, BoxError>(ctx.require::<ExampleB>()?.0.clone())
                }),
        )
        .build();
    let dispatcher = Dispatcher::new(registry);

    let (mock, interaction) = MockInteraction::slash("middleware-test").shared();
    assert!(dispatcher.dispatch(interaction).await.is_completed());
    assert_eq!(mock.replies(), vec!["exampleA, exampleB"]);
}

#[tokio::test]
async fn unknown_command_is_a_quiet_miss() {
    let (invoked, count) = counter();
    let registry = Registry::builder()
        .register(slash_command("ping").handler(move |_ctx: Context| {
            count.fetch_add(1, Ordering::SeqCst);
            async {}
        }))
        .build();
    let dispatcher = Dispatcher::new(registry);

    let (mock, interaction) = MockInteraction::slash("doesnotexist").shared();
    match dispatcher.dispatch(interaction).await {
        DispatchOutcome::NotFound { kind, key } => {
            assert_eq!(kind, HandlerKind::SlashCommand);
            assert_eq!(key, "doesnotexist");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
    assert!(mock.replies().is_empty());
}

#[tokio::test]
async fn stale_component_is_a_miss() {
    let dispatcher = Dispatcher::builder(Registry::default())
        .log_not_found(false)
        .build();
    let (_, interaction) = MockInteraction::button("old-button?1&2").shared();
    assert!(dispatcher.dispatch(interaction).await.is_not_found());
}

#[tokio::test]
async fn handler_sees_markers_in_registration_order() {
    let registry = Registry::builder()
        .register(
            slash_command("order")
                .middleware(mark("m1"))
                .middleware(mark("m2"))
                .middleware(mark("m3"))
                .handler(|ctx: Context| async move {
                    ctx.get::<Trail>().map(|t| t.0.join(","))
                }),
        )
        .build();
    let dispatcher = Dispatcher::new(registry);

    let (mock, interaction) = MockInteraction::slash("order").shared();
    dispatcher.dispatch(interaction).await;
    assert_eq!(mock.replies(), vec!["m1,m2,m3"]);
}

#[tokio::test]
async fn slow_middleware_still_runs_first() {
    let registry = Registry::builder()
        .register(
            slash_command("slow")
                .middleware(|ctx: Context| async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    mark("slow")(ctx).await
                })
                .middleware(mark("fast"))
                .handler(|ctx: Context| async move {
                    ctx.get::<Trail>().map(|t| t.0.join(","))
                }),
        )
        .build();
    let dispatcher = Dispatcher::new(registry);

    let (mock, interaction) = MockInteraction::slash("slow").shared();
    dispatcher.dispatch(interaction).await;
    assert_eq!(mock.replies(), vec!["slow,fast"]);
}

#[tokio::test]
async fn stop_skips_later_middlewares_and_handler() {
    let (m3_runs, m3_count) = counter();
    let (handler_runs, handler_count) = counter();
    let registry = Registry::builder()
        .register(
            slash_command("veto")
                .middleware(mark("m1"))
                .middleware(|_ctx: Context| async move { Flow::Stop })
                .middleware(move |ctx: Context| {
                    m3_count.fetch_add(1, Ordering::SeqCst);
                    async move { ctx }
                })
                .handler(move |_ctx: Context| {
                    handler_count.fetch_add(1, Ordering::SeqCst);
                    async {}
                }),
        )
        .build();
    let dispatcher = Dispatcher::new(registry);

    let (_, interaction) = MockInteraction::slash("veto").shared();
    let outcome = dispatcher.dispatch(interaction).await;
    assert!(matches!(outcome, DispatchOutcome::Stopped { index: 1 }));
    assert_eq!(m3_runs.load(Ordering::SeqCst), 0);
    assert_eq!(handler_runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn middleware_error_aborts_with_one_error() {
    let (handler_runs, handler_count) = counter();
    let registry = Registry::builder()
        .register(
            slash_command("abort")
                .middleware(mark("m1"))
                .middleware(|_ctx: Context| async move { Err::<Context, _>("permission lookup failed") })
                .middleware(mark("m3"))
                .handler(move |_ctx: Context| {
                    handler_count.fetch_add(1, Ordering::SeqCst);
                    async {}
                }),
        )
        .build();
    let dispatcher = Dispatcher::new(registry);

    let (mock, interaction) = MockInteraction::slash("abort").shared();
    match dispatcher.dispatch(interaction).await {
        DispatchOutcome::Failed(err) => {
            assert_eq!(err.middleware_index(), Some(1));
            assert!(err.to_string().contains("permission lookup failed"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(handler_runs.load(Ordering::SeqCst), 0);
    assert!(mock.replies().is_empty());
}

#[tokio::test]
async fn handler_error_sends_configured_reply() {
    let registry = Registry::builder()
        .register(component("needs-arg").handler(|ctx: Context| async move {
            Ok::<_, BoxError>(ctx.arg(0)?.to_string())
        }))
        .build();
    let dispatcher = Dispatcher::builder(registry)
        .error_reply("Something went wrong.")
        .build();

    let (mock, interaction) = MockInteraction::button("needs-arg").shared();
    let outcome = dispatcher.dispatch(interaction).await;
    assert!(matches!(
        outcome.error(),
        Some(DispatchError::Handler { .. })
    ));
    assert_eq!(mock.replies(), vec!["Something went wrong."]);
}

#[tokio::test]
async fn guild_guard_stops_direct_messages() {
    let registry = Registry::builder()
        .register(
            message_command("Quote")
                .middleware(guild_only("Servers only"))
                .handler(|_ctx: Context| async { "quoted" }),
        )
        .build();
    let dispatcher = Dispatcher::new(registry);

    let (dm, interaction) = MockInteraction::message_context("Quote").shared();
    assert!(matches!(
        dispatcher.dispatch(interaction).await,
        DispatchOutcome::Stopped { index: 0 }
    ));
    assert_eq!(dm.replies(), vec!["Servers only"]);

    let (guild, interaction) = MockInteraction::message_context("Quote")
        .in_guild("42")
        .shared();
    assert!(dispatcher.dispatch(interaction).await.is_completed());
    assert_eq!(guild.replies(), vec!["quoted"]);
}

#[tokio::test]
async fn autocomplete_bypasses_middlewares() {
    let (middleware_runs, middleware_count) = counter();
    let registry = Registry::builder()
        .register(
            slash_command("color")
                .middleware(move |_ctx: Context| {
                    middleware_count.fetch_add(1, Ordering::SeqCst);
                    async { Flow::Stop }
                })
                .autocomplete(|interaction: BoxedInteraction| async move {
                    let focused = interaction.focused_value().unwrap_or_default().to_string();
                    ["white", "black", "wheat"]
                        .into_iter()
                        .filter(|c| c.starts_with(&focused))
                        .map(|c| AutocompleteChoice::new(c, c))
                        .collect::<Vec<_>>()
                })
                .handler(|_ctx: Context| async {}),
        )
        .register(slash_command("plain").handler(|_ctx: Context| async {}))
        .build();
    let dispatcher = Dispatcher::new(registry);

    let (mock, interaction) = MockInteraction::autocomplete("color", "wh").shared();
    assert!(matches!(
        dispatcher.dispatch(interaction).await,
        DispatchOutcome::AutocompleteHandled
    ));
    assert_eq!(middleware_runs.load(Ordering::SeqCst), 0);
    let names: Vec<String> = mock.responses()[0].iter().map(|c| c.name.clone()).collect();
    assert_eq!(names, vec!["white", "wheat"]);

    let (_, interaction) = MockInteraction::autocomplete("plain", "").shared();
    assert!(matches!(
        dispatcher.dispatch(interaction).await,
        DispatchOutcome::AutocompleteUnsupported
    ));
}

#[tokio::test]
async fn same_handler_dispatched_concurrently() {
    let registry = Registry::builder()
        .register(
            component("echo")
                .middleware(|ctx: Context| async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    ctx
                })
                .middleware(mark("seen"))
                .handler(|ctx: Context| async move {
                    let trail = ctx.get::<Trail>().map(|t| t.0.len()).unwrap_or_default();
                    format!("{}:{trail}", ctx.args().join(","))
                }),
        )
        .build();
    let dispatcher = Dispatcher::new(registry);

    let mut mocks = Vec::new();
    let mut tasks = Vec::new();
    for i in 0..8 {
        let (mock, interaction) = MockInteraction::button(compose("echo", [i.to_string()])).shared();
        mocks.push((i, mock));
        let dispatcher = dispatcher.clone();
        tasks.push(async move { dispatcher.dispatch(interaction).await });
    }
    let outcomes = futures::future::join_all(tasks).await;
    assert!(outcomes.iter().all(DispatchOutcome::is_completed));
    for (i, mock) in mocks {
        assert_eq!(mock.replies(), vec![format!("{i}:1")]);
    }
}

#[tokio::test]
async fn other_interactions_are_ignored() {
    let dispatcher = Dispatcher::new(Registry::default());
    let (_, interaction) = MockInteraction::other().shared();
    assert!(matches!(
        dispatcher.dispatch(interaction).await,
        DispatchOutcome::Ignored
    ));
}

#[tokio::test]
async fn dispatcher_as_tower_service() {
    let registry = Registry::builder()
        .register(user_command("Info").handler(|_ctx: Context| async { "info" }))
        .build();
    let mut service = Dispatcher::new(registry);

    let (mock, interaction) = MockInteraction::user_context("Info").shared();
    let outcome = assert_ok!(service.ready().await).call(interaction).await;
    assert!(assert_ok!(outcome).is_completed());

    let (_, interaction) = MockInteraction::user_context("Missing").shared();
    let outcome = assert_ok!(Dispatcher::new(Registry::default()).oneshot(interaction).await);
    assert!(outcome.is_not_found());
    assert_eq!(mock.replies(), vec!["info"]);
}
