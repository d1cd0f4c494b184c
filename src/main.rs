//! Terminal runner (default binary).
//!
//! Merges the gravity timer, the randomness timer and keyboard input into a
//! single action stream, folds it through the pure reducer, and hands every
//! resulting state to the renderer (and, when enabled, the observation feed).
//! One event is fully reduced before the next is admitted.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossterm::event::{self, Event, KeyEventKind};

use blockfall::core::{reduce, State};
use blockfall::feed::ObservationFeed;
use blockfall::input::{should_quit, RepeatGuard};
use blockfall::term::{CanvasView, TerminalRenderer, Viewport};
use blockfall::types::{Action, RNG_RATE_MS, TICK_RATE_MS};

struct Options {
    observe_port: Option<u16>,
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut observe_port = None;
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--observe-port" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --observe-port"))?;
                let port = v
                    .parse::<u16>()
                    .map_err(|_| anyhow!("invalid port: {}", v))?;
                observe_port = Some(port);
            }
            other => return Err(anyhow!("unknown argument: {}", other)),
        }
        i += 1;
    }
    Ok(Options { observe_port })
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_options(&args)?;

    let feed = match options.observe_port {
        Some(port) => Some(ObservationFeed::bind(port)?),
        None => None,
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, feed);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer, mut feed: Option<ObservationFeed>) -> Result<()> {
    let mut state = State::initial();
    let mut view = CanvasView::new();
    let mut guard = RepeatGuard::new();

    let tick_period = Duration::from_millis(TICK_RATE_MS);
    let rng_period = Duration::from_millis(RNG_RATE_MS);
    let mut next_tick = Instant::now() + tick_period;
    let mut next_rng = Instant::now() + rng_period;
    let mut tick_count: i64 = 0;
    let mut rng_count: i64 = 0;
    let mut last_update = Instant::now();

    loop {
        // Render, then publish. Side effects happen strictly after the state
        // they describe.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let fb = view.render(&state, Viewport::new(w, h));
        term.draw(&fb)?;
        if let Some(feed) = feed.as_mut() {
            feed.publish(&state);
        }

        // Input with a timeout until whichever timer fires first.
        let deadline = next_tick.min(next_rng);
        let timeout = deadline.saturating_duration_since(Instant::now());

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press => {
                        if should_quit(key) {
                            return Ok(());
                        }
                        if let Some(action) = guard.key_press(key.code) {
                            state = reduce(&state, &action);
                        }
                    }
                    KeyEventKind::Repeat => {
                        // Held keys never regenerate their action.
                    }
                    KeyEventKind::Release => guard.key_release(key.code),
                },
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        let now = Instant::now();
        guard.update(now.duration_since(last_update).as_millis() as u64);
        last_update = now;

        // Timers run for the whole session; reset never touches them.
        while now >= next_rng {
            rng_count += 1;
            state = reduce(&state, &Action::RngGen { elapsed: rng_count });
            next_rng += rng_period;
        }
        while now >= next_tick {
            tick_count += 1;
            state = reduce(&state, &Action::Tick { elapsed: tick_count });
            next_tick += tick_period;
        }
    }
}
