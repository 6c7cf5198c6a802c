//! HTTP collaborators used by display clients against a remote server.

use std::sync::Arc;

use async_stream::stream;
use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::dto::events::{
    EVENT_HANDSHAKE, EVENT_TEAM_CREATED, EVENT_TEAM_DELETED, EVENT_TEAM_UPDATED, TeamDeletedPayload,
    TeamEventPayload,
};
use crate::sync::channel::{ChangeChannel, ChannelMessage, ChannelStatus};
use crate::sync::fetcher::{FetchError, SnapshotFetcher};
use crate::sync::model::{ChangeEvent, TeamRecord};

/// Snapshot fetcher backed by the public read endpoint.
#[derive(Clone)]
pub struct HttpSnapshotFetcher {
    client: Client,
    teams_url: Arc<str>,
}

#[derive(Debug, Deserialize)]
struct TeamsPayload {
    teams: Vec<TeamRecord>,
}

impl HttpSnapshotFetcher {
    /// Build a fetcher for the server at `base_url`.
    pub fn new(client: Client, base_url: &str) -> Self {
        let teams_url = format!("{}/api/teams", base_url.trim_end_matches('/'));
        HttpSnapshotFetcher {
            client,
            teams_url: Arc::from(teams_url),
        }
    }
}

impl SnapshotFetcher for HttpSnapshotFetcher {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<TeamRecord>, FetchError>> {
        let client = self.client.clone();
        let url = self.teams_url.clone();
        Box::pin(async move {
            let response = client
                .get(url.as_ref())
                .send()
                .await
                .map_err(|source| FetchError::with_source("snapshot request failed", source))?;
            if !response.status().is_success() {
                return Err(FetchError::new(format!(
                    "snapshot endpoint returned {}",
                    response.status()
                )));
            }
            let payload: TeamsPayload = response
                .json()
                .await
                .map_err(|source| FetchError::with_source("snapshot payload invalid", source))?;
            Ok(payload.teams)
        })
    }
}

/// Change channel backed by the server's SSE feed.
///
/// The server sends a handshake event on every fresh subscription; receiving
/// it is what acknowledges the channel as connected. Team events are
/// normalized into [`ChangeEvent`]s here, and payloads that do not parse are
/// dropped with a warning rather than forwarded.
pub struct SseChangeChannel {
    client: Client,
    events_url: Arc<str>,
}

impl SseChangeChannel {
    /// Build a channel for the server at `base_url`.
    pub fn new(client: Client, base_url: &str) -> Self {
        let events_url = format!("{}/api/events", base_url.trim_end_matches('/'));
        SseChangeChannel {
            client,
            events_url: Arc::from(events_url),
        }
    }
}

impl ChangeChannel for SseChangeChannel {
    fn open(&mut self) -> BoxStream<'static, ChannelMessage> {
        let client = self.client.clone();
        let url = self.events_url.clone();
        let messages = stream! {
            let response = match client
                .get(url.as_ref())
                .header(header::ACCEPT, "text/event-stream")
                .send()
                .await
            {
                Ok(response) => response,
                Err(error) => {
                    yield ChannelMessage::Status(ChannelStatus::Failed(format!(
                        "subscribe request failed: {error}"
                    )));
                    return;
                }
            };
            if response.status() != StatusCode::OK {
                yield ChannelMessage::Status(ChannelStatus::Failed(format!(
                    "subscribe endpoint returned {}",
                    response.status()
                )));
                return;
            }

            let mut parser = FrameParser::default();
            let mut chunks = response.bytes_stream();
            while let Some(chunk) = chunks.next().await {
                match chunk {
                    Ok(bytes) => {
                        for frame in parser.push(&bytes) {
                            if let Some(message) = normalize_frame(frame) {
                                yield message;
                            }
                        }
                    }
                    Err(error) => {
                        yield ChannelMessage::Status(ChannelStatus::Failed(format!(
                            "event stream broke: {error}"
                        )));
                        return;
                    }
                }
            }
        };
        messages.boxed()
    }
}

/// One decoded server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    event: String,
    data: String,
}

/// Incremental SSE frame decoder.
///
/// Bytes arrive in arbitrary chunks; lines are only interpreted once their
/// terminating newline has been seen, and a blank line dispatches the frame
/// accumulated so far. Comment lines (keep-alives) are skipped.
#[derive(Debug, Default)]
struct FrameParser {
    buffer: Vec<u8>,
    event: String,
    data: String,
}

impl FrameParser {
    fn push(&mut self, bytes: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw[..newline]);
            let line = line.strip_suffix('\r').unwrap_or(&line);

            if line.is_empty() {
                if let Some(frame) = self.take_frame() {
                    frames.push(frame);
                }
            } else if let Some(name) = line.strip_prefix("event:") {
                self.event = name.trim_start().to_string();
            } else if let Some(payload) = line.strip_prefix("data:") {
                let payload = payload.strip_prefix(' ').unwrap_or(payload);
                if !self.data.is_empty() {
                    self.data.push('\n');
                }
                self.data.push_str(payload);
            }
            // Anything else (comments, unknown fields) is ignored.
        }
        frames
    }

    fn take_frame(&mut self) -> Option<Frame> {
        if self.event.is_empty() && self.data.is_empty() {
            return None;
        }
        Some(Frame {
            event: std::mem::take(&mut self.event),
            data: std::mem::take(&mut self.data),
        })
    }
}

fn normalize_frame(frame: Frame) -> Option<ChannelMessage> {
    match frame.event.as_str() {
        EVENT_HANDSHAKE => Some(ChannelMessage::Status(ChannelStatus::Connected)),
        EVENT_TEAM_CREATED => {
            parse_team(&frame.data).map(|team| ChannelMessage::Event(ChangeEvent::Insert(team)))
        }
        EVENT_TEAM_UPDATED => {
            parse_team(&frame.data).map(|team| ChannelMessage::Event(ChangeEvent::Update(team)))
        }
        EVENT_TEAM_DELETED => match serde_json::from_str::<TeamDeletedPayload>(&frame.data) {
            Ok(payload) => Some(ChannelMessage::Event(ChangeEvent::Delete(payload.team_id))),
            Err(error) => {
                warn!(error = %error, "dropping malformed team.deleted payload");
                None
            }
        },
        other => {
            debug!(event = %other, "ignoring unrecognized server event");
            None
        }
    }
}

fn parse_team(data: &str) -> Option<TeamRecord> {
    match serde_json::from_str::<TeamEventPayload>(data) {
        Ok(payload) => Some(payload.team),
        Err(error) => {
            warn!(error = %error, "dropping malformed team event payload");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::model::TeamStatus;
    use uuid::Uuid;

    fn frame(event: &str, data: &str) -> Frame {
        Frame {
            event: event.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn parser_handles_frames_split_across_chunks() {
        let mut parser = FrameParser::default();
        assert!(parser.push(b"event: team.del").is_empty());
        assert!(parser.push(b"eted\ndata: {\"team_id\"").is_empty());
        let frames = parser.push(b": \"x\"}\n\n");
        assert_eq!(frames, vec![frame("team.deleted", "{\"team_id\": \"x\"}")]);
    }

    #[test]
    fn parser_skips_comment_keepalives() {
        let mut parser = FrameParser::default();
        let frames = parser.push(b": keep-alive\n\nevent: handshake\ndata: {}\n\n");
        assert_eq!(frames, vec![frame("handshake", "{}")]);
    }

    #[test]
    fn parser_joins_multi_line_data() {
        let mut parser = FrameParser::default();
        let frames = parser.push(b"event: x\ndata: a\ndata: b\n\n");
        assert_eq!(frames, vec![frame("x", "a\nb")]);
    }

    #[test]
    fn parser_tolerates_crlf_line_endings() {
        let mut parser = FrameParser::default();
        let frames = parser.push(b"event: handshake\r\ndata: {}\r\n\r\n");
        assert_eq!(frames, vec![frame("handshake", "{}")]);
    }

    #[test]
    fn handshake_frame_acknowledges_the_subscription() {
        let message = normalize_frame(frame(EVENT_HANDSHAKE, "{\"stream\":\"teams\"}"));
        assert_eq!(
            message,
            Some(ChannelMessage::Status(ChannelStatus::Connected))
        );
    }

    #[test]
    fn team_created_frame_becomes_an_insert_event() {
        let record = TeamRecord {
            id: Uuid::new_v4(),
            name: "Circuit Breakers".to_string(),
            score: 12,
            status: TeamStatus::Active,
            last_score_update: None,
        };
        let payload = serde_json::to_string(&TeamEventPayload {
            team: record.clone(),
        })
        .unwrap();

        let message = normalize_frame(frame(EVENT_TEAM_CREATED, &payload));
        assert_eq!(
            message,
            Some(ChannelMessage::Event(ChangeEvent::Insert(record)))
        );
    }

    #[test]
    fn team_deleted_frame_becomes_a_delete_event() {
        let id = Uuid::new_v4();
        let payload = serde_json::to_string(&TeamDeletedPayload { team_id: id }).unwrap();
        let message = normalize_frame(frame(EVENT_TEAM_DELETED, &payload));
        assert_eq!(message, Some(ChannelMessage::Event(ChangeEvent::Delete(id))));
    }

    #[test]
    fn malformed_payloads_are_dropped_not_forwarded() {
        assert_eq!(normalize_frame(frame(EVENT_TEAM_CREATED, "not json")), None);
        assert_eq!(normalize_frame(frame(EVENT_TEAM_DELETED, "{}")), None);
    }

    #[test]
    fn unrecognized_events_are_ignored() {
        assert_eq!(normalize_frame(frame("lobby.opened", "{}")), None);
    }
}
