// Presentation gate: hold a draw result back until the reveal animation has run.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::Instant;

/// A draw result released by the gate.
#[derive(Debug, Clone, PartialEq)]
pub struct Revealed<T> {
    pub value: T,
    /// True when the request outlasted the animation and the terminal phase had to wait.
    pub stalled: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum RevealError<E> {
    #[error("reveal cancelled")]
    Cancelled,
    #[error("draw failed: {0}")]
    Failed(E),
}

/// Runs the animation timer and the draw concurrently and yields once both are done.
///
/// Cancelling through `cancel` abandons the wait; the draw itself may still commit
/// server-side and its quota is not refunded.
pub async fn reveal<T, E, F>(
    min_duration: Duration,
    draw: F,
    cancel: &Notify,
) -> Result<Revealed<T>, RevealError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    let timer = async {
        tokio::time::sleep(min_duration).await;
        Instant::now()
    };
    let request = async {
        let result = draw.await;
        (result, Instant::now())
    };
    let gate = async { tokio::join!(timer, request) };

    tokio::select! {
        _ = cancel.notified() => Err(RevealError::Cancelled),
        (animation_done, (result, draw_done)) = gate => {
            let stalled = draw_done > animation_done;
            result
                .map(|value| Revealed { value, stalled })
                .map_err(RevealError::Failed)
        }
    }
}
