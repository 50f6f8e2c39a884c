use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use tokio_stream::wrappers::ReceiverStream;

use textly_chat::{TurnEvent, TurnStream};

/// Serve a turn's events as `text/event-stream`
///
/// Each event becomes one `data:` frame. When the client disconnects the
/// receiver is dropped here; the turn task keeps running and still commits.
pub fn sse_response(events: TurnStream) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = ReceiverStream::new(events).map(|event| Ok::<Event, Infallible>(to_sse_event(&event)));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn to_sse_event(event: &TurnEvent) -> Event {
    Event::default().data(event.to_sse_payload())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_frames_follow_channel_order() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(TurnEvent::Content("a\nb".into())).await.unwrap();
        tx.send(TurnEvent::MessageId("m1".into())).await.unwrap();
        tx.send(TurnEvent::Done).await.unwrap();
        drop(tx);

        let response = sse_response(rx).into_response();
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "text/event-stream"
        );
        assert_eq!(response.headers()["cache-control"].to_str().unwrap(), "no-cache");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(
            body,
            "data: a\\nb\n\ndata: {\"message_id\":\"m1\"}\n\ndata: [DONE]\n\n"
        );
    }
}
