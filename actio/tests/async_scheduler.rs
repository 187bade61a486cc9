//! Driving after-work phases from an async task.

#![cfg(all(feature = "macros", feature = "async"))]

mod common;

use actio::{
    Action, ActionBuilder, AsyncScheduler, Tags,
    testing::{Phase, RecordingHandler},
};
use common::{Selectable, init_tracing};
use std::time::Duration;

#[tokio::test]
async fn after_work_runs_inside_the_loop_future() {
    init_tracing();
    let (scheduler, run_loop) = AsyncScheduler::channel();
    let handler: RecordingHandler = RecordingHandler::new();
    let action: Action<_> = Action::new(handler.clone(), Tags::empty(), scheduler.clone());
    ActionBuilder::new()
        .untargeted()
        .reg_only::<dyn Selectable>()
        .pack(&action)
        .unwrap();

    let selection = action.handler_impl::<dyn Selectable>().unwrap();
    selection.on_select(1);
    selection.on_select(2);

    while action.in_flight() > 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(handler.count(Phase::AfterWork), 0);

    scheduler.close();
    assert_eq!(run_loop.run().await, 2);
    assert_eq!(handler.count(Phase::AfterWork), 2);
}
