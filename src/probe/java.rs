//! Server List Ping (édition Java) : échange status sur TCP, trames
//! préfixées par un VarInt de longueur. La latence rapportée est
//! l'aller-retour du paquet ping/pong final.

use serde::Deserialize;
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::{round_ms, PingOutcome, ProbeError};

/// -1 en VarInt : le client ne s'engage sur aucune version de protocole.
const STATUS_PROTOCOL_VERSION: i32 = -1;
const NEXT_STATE_STATUS: i32 = 1;
const PACKET_HANDSHAKE: i32 = 0x00;
const PACKET_STATUS_REQUEST: i32 = 0x00;
const PACKET_PING: i32 = 0x01;

/// Les réponses status transportent du JSON (favicon base64 compris).
const MAX_FRAME_LEN: usize = 1024 * 1024;

#[derive(Debug, Deserialize)]
struct StatusPayload {
    players: PlayersPayload,
}

#[derive(Debug, Deserialize)]
struct PlayersPayload {
    online: i64,
    max: i64,
}

pub(super) async fn query(host: &str, port: u16) -> Result<PingOutcome, ProbeError> {
    let mut stream = TcpStream::connect((host, port)).await?;

    write_frame(&mut stream, &handshake_body(host, port)).await?;
    write_frame(&mut stream, &status_request_body()).await?;

    let frame = read_frame(&mut stream).await?;
    let mut cursor = frame.as_slice();
    if read_varint(&mut cursor)? != PACKET_STATUS_REQUEST {
        return Err(ProbeError::Protocol("unexpected status packet id"));
    }
    let json = read_string(&mut cursor)?;
    let status: StatusPayload = serde_json::from_str(&json)?;

    // ping/pong dédié pour mesurer la latence, comme le client vanilla
    let sent = Instant::now();
    write_frame(&mut stream, &ping_body(0)).await?;
    let pong = read_frame(&mut stream).await?;
    let latency_ms = round_ms(sent.elapsed());
    let mut cursor = pong.as_slice();
    if read_varint(&mut cursor)? != PACKET_PING {
        return Err(ProbeError::Protocol("unexpected pong packet id"));
    }

    Ok(PingOutcome {
        online_players: status.players.online.max(0) as u32,
        max_players: status.players.max.max(0) as u32,
        latency_ms,
    })
}

fn handshake_body(host: &str, port: u16) -> Vec<u8> {
    let mut body = Vec::with_capacity(host.len() + 16);
    write_varint(&mut body, PACKET_HANDSHAKE);
    write_varint(&mut body, STATUS_PROTOCOL_VERSION);
    write_string(&mut body, host);
    body.extend_from_slice(&port.to_be_bytes());
    write_varint(&mut body, NEXT_STATE_STATUS);
    body
}

fn status_request_body() -> Vec<u8> {
    let mut body = Vec::with_capacity(1);
    write_varint(&mut body, PACKET_STATUS_REQUEST);
    body
}

fn ping_body(payload: i64) -> Vec<u8> {
    let mut body = Vec::with_capacity(9);
    write_varint(&mut body, PACKET_PING);
    body.extend_from_slice(&payload.to_be_bytes());
    body
}

async fn write_frame(stream: &mut TcpStream, body: &[u8]) -> Result<(), ProbeError> {
    let mut frame = Vec::with_capacity(body.len() + 5);
    write_varint(&mut frame, body.len() as i32);
    frame.extend_from_slice(body);
    stream.write_all(&frame).await?;
    Ok(())
}

async fn read_frame(stream: &mut TcpStream) -> Result<Vec<u8>, ProbeError> {
    let len = read_varint_stream(stream).await?;
    if len <= 0 || len as usize > MAX_FRAME_LEN {
        return Err(ProbeError::Protocol("bad frame length"));
    }
    let mut body = vec![0u8; len as usize];
    stream.read_exact(&mut body).await?;
    Ok(body)
}

fn write_varint(out: &mut Vec<u8>, value: i32) {
    let mut rest = value as u32;
    loop {
        let byte = (rest & 0x7F) as u8;
        rest >>= 7;
        if rest == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn read_varint(input: &mut &[u8]) -> Result<i32, ProbeError> {
    let mut value: u32 = 0;
    for shift in 0..5 {
        let byte = *input.first().ok_or(ProbeError::UnexpectedEof)?;
        *input = &input[1..];
        value |= u32::from(byte & 0x7F) << (shift * 7);
        if byte & 0x80 == 0 {
            return Ok(value as i32);
        }
    }
    Err(ProbeError::Protocol("varint too long"))
}

async fn read_varint_stream(stream: &mut TcpStream) -> Result<i32, ProbeError> {
    let mut value: u32 = 0;
    for shift in 0..5 {
        let byte = stream.read_u8().await?;
        value |= u32::from(byte & 0x7F) << (shift * 7);
        if byte & 0x80 == 0 {
            return Ok(value as i32);
        }
    }
    Err(ProbeError::Protocol("varint too long"))
}

fn write_string(out: &mut Vec<u8>, text: &str) {
    write_varint(out, text.len() as i32);
    out.extend_from_slice(text.as_bytes());
}

fn read_string(input: &mut &[u8]) -> Result<String, ProbeError> {
    let len = read_varint(input)?;
    if len < 0 || len as usize > input.len() {
        return Err(ProbeError::UnexpectedEof);
    }
    let (raw, rest) = input.split_at(len as usize);
    *input = rest;
    String::from_utf8(raw.to_vec()).map_err(|_| ProbeError::Protocol("string is not utf-8"))
}
