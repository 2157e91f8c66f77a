//! Drag-Lock Gesture
//!
//! This example grabs an object with a double-click, drags it around and
//! drops it with a second double-click of the same button.
//!
//! Key concepts:
//! - Sub-machine transitions reuse the double-click gesture three times
//! - The locked button is pinned into the nested double-clicks
//! - Moves of other buttons are ignored
//! - A snapshot shows which machines are active mid-gesture
//!
//! Run with: RUST_LOG=gesture_fsm=debug cargo run --example drag_lock

use gesture_fsm::gestures::{DragLockFsm, InputEvent};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Drag-Lock Gesture ===\n");

    let mut drag = DragLockFsm::new();
    drag.build_fsm(None).expect("drag-lock graph is valid");

    let script = [
        InputEvent::press_at(1, 0.0, 0.0),
        InputEvent::release_at(1, 0.0, 0.0),
        InputEvent::press_at(1, 0.0, 0.0),
        InputEvent::release_at(1, 0.0, 0.0),
        InputEvent::move_to(1, 12.0, 4.0),
        InputEvent::move_to(3, 99.0, 99.0),
        InputEvent::move_to(1, 40.0, 18.0),
        InputEvent::press_at(1, 40.0, 18.0),
    ];

    for event in &script {
        let consumed = drag.process(event);
        println!(
            "{:<10} consumed={consumed:<5} path={}",
            event.kind_label(),
            drag.fsm().active_path().join(" > ")
        );
    }

    println!("\nMid-drop snapshot:");
    match drag.fsm().snapshot().to_json_pretty() {
        Ok(json) => println!("{json}"),
        Err(err) => println!("snapshot failed: {err}"),
    }

    for event in [
        InputEvent::release_at(1, 40.0, 18.0),
        InputEvent::press_at(1, 40.0, 18.0),
        InputEvent::release_at(1, 41.0, 18.0),
    ] {
        drag.process(&event);
    }

    let data = drag.params().data();
    println!("\nFinal state: {}", drag.fsm().current_state_name());
    println!("Locked button: {:?}", data.lock_button);
    println!("Moves: {}", data.moves);
    println!("Dropped at: {:?}", data.drop_position);

    println!("\n=== Example Complete ===");
}
