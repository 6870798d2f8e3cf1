//! Server-sent `ping` events for long-lived `GET /mcp` connections
//!
//! The interval timer lives inside the stream, so it is dropped together with the
//! response body when the client disconnects.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::Event;
use chrono::{DateTime, Utc};
use futures_util::{stream, Stream};
use serde_json::json;
use tokio::time::{self, MissedTickBehavior};

pub fn ping_stream(period: Duration) -> impl Stream<Item = Result<Event, Infallible>> {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    stream::unfold(ticker, |mut ticker| async move {
        ticker.tick().await;
        Some((Ok(ping_event(Utc::now())), ticker))
    })
}

pub fn ping_event(now: DateTime<Utc>) -> Event {
    Event::default()
        .event("ping")
        .data(json!({ "timestamp": unix_seconds(now) }).to_string())
}

fn unix_seconds(now: DateTime<Utc>) -> f64 {
    now.timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use futures_util::StreamExt;

    use super::*;

    #[test]
    fn unix_seconds_keeps_sub_second_precision() {
        let now = Utc
            .timestamp_opt(1_700_000_000, 250_000_000)
            .single()
            .expect("valid timestamp");
        assert_eq!(unix_seconds(now), 1_700_000_000.25);
    }

    #[tokio::test(start_paused = true)]
    async fn first_ping_is_immediate_and_next_waits_one_period() {
        let period = Duration::from_secs(30);
        let stream = ping_stream(period);
        futures_util::pin_mut!(stream);

        let started = time::Instant::now();
        assert!(stream.next().await.is_some());
        assert_eq!(started.elapsed(), Duration::ZERO);

        assert!(stream.next().await.is_some());
        assert_eq!(started.elapsed(), period);
    }
}
