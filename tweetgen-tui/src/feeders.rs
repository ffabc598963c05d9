use crate::tui::{TuiActor, TuiMsg};
use crossterm::event;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time;
use tweetgen_actors::actor::Addr;
use tweetgen_actors::system::ShutdownHandle;

/// How often the input thread checks for shutdown between key presses.
const INPUT_POLL: Duration = Duration::from_millis(100);
const TICK: Duration = Duration::from_millis(80);

/// Start the terminal input thread and the redraw tick task.
pub fn spawn_tui_feeders(tui: Addr<TuiActor>, shutdown: ShutdownHandle) -> std::io::Result<()> {
    let tui_in = tui.clone();
    let mut shutdown_input = shutdown.subscribe();
    std::thread::Builder::new()
        .name("tweetgen-input".into())
        .spawn(move || {
            loop {
                match shutdown_input.try_recv() {
                    Err(TryRecvError::Empty) => {}
                    _ => break,
                }
                let ready = match event::poll(INPUT_POLL) {
                    Ok(ready) => ready,
                    Err(e) => {
                        let _ = tui_in.blocking_send(TuiMsg::OpError(format!("input: {e}")));
                        break;
                    }
                };
                if !ready {
                    continue;
                }
                let msg = match event::read() {
                    Ok(e) => TuiMsg::InputEvent(e),
                    Err(e) => TuiMsg::OpError(format!("input: {e}")),
                };
                if tui_in.blocking_send(msg).is_err() {
                    break;
                }
            }
            tracing::debug!("input thread stopped");
        })?;

    let mut shutdown_tick = shutdown.subscribe();
    tokio::spawn(async move {
        let mut interval = time::interval(TICK);
        loop {
            tokio::select! {
                _ = shutdown_tick.recv() => break,
                _ = interval.tick() => {
                    let _ = tui.try_send(TuiMsg::Tick);
                }
            }
        }
    });
    Ok(())
}
