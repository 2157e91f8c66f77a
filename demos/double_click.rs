//! Double-Click Recognition
//!
//! This example feeds a scripted stream of mouse events through the
//! double-click machine, once fast enough and once too slowly.
//!
//! Key concepts:
//! - Press/release pairs within the timeout complete the gesture
//! - A timeout notifier wakes the event loop when the second click is late
//! - Lifecycle hooks observe start and termination of a recognized gesture
//!
//! Run with: RUST_LOG=gesture_fsm=debug cargo run --example double_click

use gesture_fsm::config::GestureConfig;
use gesture_fsm::engine::{ActionResult, FsmHandler};
use gesture_fsm::gestures::{DoubleClickFsm, InputEvent};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

struct Announcer;

impl FsmHandler<InputEvent> for Announcer {
    fn on_starting(&mut self) -> ActionResult {
        println!("  -> gesture started");
        Ok(())
    }

    fn on_terminating(&mut self) -> ActionResult {
        println!("  -> double-click!");
        Ok(())
    }

    fn on_cancelling(&mut self) {
        println!("  -> gesture cancelled");
    }
}

enum Wake {
    Input(InputEvent),
    Timeout,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Double-Click Recognition ===\n");

    let config = GestureConfig {
        double_click_timeout_ms: 200,
    };
    let mut double_click = DoubleClickFsm::with_config(&config);
    double_click
        .build_fsm(Some(Box::new(Announcer)))
        .expect("double-click graph is valid");

    let (sender, receiver) = mpsc::channel();
    let waker = sender.clone();
    double_click
        .fsm_mut()
        .set_timeout_notifier(Arc::new(move || {
            let _ = waker.send(Wake::Timeout);
        }));

    println!("Fast clicks on button 1:");
    for event in [
        InputEvent::press_at(1, 10.0, 10.0),
        InputEvent::release_at(1, 10.0, 10.0),
        InputEvent::press_at(1, 11.0, 10.0),
        InputEvent::release_at(1, 11.0, 10.0),
    ] {
        sender.send(Wake::Input(event)).expect("receiver alive");
    }
    drain(&mut double_click, &receiver, Duration::from_millis(50));
    println!(
        "  final state: {}, data: {:?}\n",
        double_click.fsm().current_state_name(),
        double_click.params().data()
    );

    double_click.reset();

    println!("One click, then silence:");
    for event in [InputEvent::press(1), InputEvent::release(1)] {
        sender.send(Wake::Input(event)).expect("receiver alive");
    }
    drain(&mut double_click, &receiver, Duration::from_millis(500));
    println!(
        "  final state: {}\n",
        double_click.fsm().current_state_name()
    );

    println!("=== Example Complete ===");
}

/// Run the event loop until nothing arrives for `idle`.
fn drain(double_click: &mut DoubleClickFsm, receiver: &mpsc::Receiver<Wake>, idle: Duration) {
    while let Ok(wake) = receiver.recv_timeout(idle) {
        match wake {
            Wake::Input(event) => {
                let consumed = double_click.process(&event);
                println!(
                    "  {:<12} consumed={consumed:<5} state={}",
                    event.kind_label(),
                    double_click.fsm().current_state_name()
                );
            }
            Wake::Timeout => {
                if double_click.poll_timeouts() {
                    println!("  -> second click came too late");
                }
            }
        }
    }
}
