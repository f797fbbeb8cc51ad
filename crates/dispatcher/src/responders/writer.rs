//! WriterResponder - one JSON line per response

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::instrument;

use contracts::{ContractError, Responder, ResponseEnvelope};

#[derive(Serialize)]
struct ResponseLine<'a> {
    status: u16,
    body: &'a ResponseEnvelope,
}

/// Responder writing `{"status":..,"body":..}` lines to an async writer
pub struct WriterResponder<W> {
    name: String,
    writer: W,
}

impl<W> WriterResponder<W> {
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: AsyncWrite + Unpin + Send> Responder for WriterResponder<W> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "writer_responder_respond", skip(self, envelope), fields(responder = %self.name))]
    async fn respond(
        &mut self,
        envelope: &ResponseEnvelope,
        status: u16,
    ) -> Result<(), ContractError> {
        let mut line = serde_json::to_vec(&ResponseLine {
            status,
            body: envelope,
        })
        .map_err(|e| ContractError::respond(&self.name, e.to_string()))?;
        line.push(b'\n');

        self.writer.write_all(&line).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::DispatchResponse;
    use serde_json::json;

    #[tokio::test]
    async fn test_writes_json_lines() {
        let mut responder = WriterResponder::new("buf", Vec::new());
        let ok = DispatchResponse::ok(json!({ "n": 1 }));
        let err = DispatchResponse::error(400, "No body");
        responder.respond(&ok.envelope, ok.status).await.unwrap();
        responder.respond(&err.envelope, err.status).await.unwrap();

        let out = String::from_utf8(responder.into_inner()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], r#"{"status":200,"body":{"data":{"n":1}}}"#);
        assert_eq!(lines[1], r#"{"status":400,"body":{"error":"No body"}}"#);
    }
}
