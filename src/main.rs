#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

use std::env;

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use tileworld::app::App;
use tileworld::config::load_config;
use tileworld::constants::LOOP_TIME;
use tileworld::events::Inbox;
use tileworld::game::{Client, FrameScheduler};
use tileworld::logging::setup_logging;
use tileworld::platform::headless::{self, GeneratedWorld, LoopbackServer};
use tileworld::state::ClientState;

/// Maps per side of the generated loopback world.
const WORLD_SIZE: u32 = 5;

/// Reads `--frames N` from the command line; without it the loop runs until stopped.
fn frame_limit(mut args: impl Iterator<Item = String>) -> Result<Option<u64>> {
    let mut limit = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--frames" => {
                let value = args.next().ok_or_else(|| anyhow!("--frames needs a value"))?;
                limit = Some(value.parse().with_context(|| format!("invalid frame count '{value}'"))?);
            }
            other => bail!("unknown argument '{other}'"),
        }
    }
    Ok(limit)
}

pub fn main() -> Result<()> {
    setup_logging();

    let limit = frame_limit(env::args().skip(1))?;
    let options = load_config().context("failed to load configuration")?;

    let inbox = Inbox::new();
    let server = LoopbackServer::new(inbox.sender(), GeneratedWorld::new(WORLD_SIZE));
    let platform = headless::platform(Box::new(server), &options.intro_images);
    let scheduler = FrameScheduler::new(Client::new(options, inbox, platform));
    let mut app = App::new(scheduler.clone());

    info!("Starting frame loop ({:.3}ms)", LOOP_TIME.as_secs_f32() * 1000.0);
    loop {
        // No menu to click through headless; enter the game as soon as it is offered.
        scheduler.with(|client| {
            if client.state() == ClientState::Menu && !client.session().join_requested {
                client.request_join();
            }
        });

        if !app.run() {
            bail!("client stopped after entering the error state");
        }
        if limit.is_some_and(|limit| app.frames() >= limit) {
            break;
        }
    }

    scheduler.with(|client| {
        if client.session().logged_in {
            client.logout(false);
        }
    });
    info!(frames = app.frames(), "Exiting");
    Ok(())
}
