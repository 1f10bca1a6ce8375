//! Unconnected ping RakNet (édition Bedrock) : un datagramme UDP aller,
//! un pong retour portant une chaîne "server id" à champs séparés par des
//! points-virgules. Même construction à la main que le magic packet
//! Wake-on-LAN : identifiant, horodatage, 16 octets de magic, GUID.

use std::time::Instant;
use tokio::net::UdpSocket;

use super::{round_ms, PingOutcome, ProbeError};

const UNCONNECTED_PING: u8 = 0x01;
const UNCONNECTED_PONG: u8 = 0x1C;

/// Séquence fixe qui marque les messages RakNet hors connexion.
const OFFLINE_MESSAGE_MAGIC: [u8; 16] = [
    0x00, 0xFF, 0xFF, 0x00, 0xFE, 0xFE, 0xFE, 0xFE, 0xFD, 0xFD, 0xFD, 0xFD, 0x12, 0x34, 0x56,
    0x78,
];

/// GUID client arbitraire mais stable : le serveur l'écho seulement.
const CLIENT_GUID: i64 = 0x4E_49_4D_42_55_53;

/// En-tête du pong avant la chaîne : id + time i64 + guid i64 + magic.
const PONG_HEADER_LEN: usize = 1 + 8 + 8 + 16;

pub(super) async fn query(host: &str, port: u16) -> Result<PingOutcome, ProbeError> {
    let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
    socket.connect((host, port)).await?;

    let sent = Instant::now();
    socket.send(&ping_datagram(0)).await?;

    let mut buf = [0u8; 2048];
    let received = socket.recv(&mut buf).await?;
    let latency_ms = round_ms(sent.elapsed());

    let (online_players, max_players) = parse_pong(&buf[..received])?;
    Ok(PingOutcome {
        online_players,
        max_players,
        latency_ms,
    })
}

fn ping_datagram(timestamp: i64) -> Vec<u8> {
    let mut datagram = Vec::with_capacity(33);
    datagram.push(UNCONNECTED_PING);
    datagram.extend_from_slice(&timestamp.to_be_bytes());
    datagram.extend_from_slice(&OFFLINE_MESSAGE_MAGIC);
    datagram.extend_from_slice(&CLIENT_GUID.to_be_bytes());
    datagram
}

fn parse_pong(datagram: &[u8]) -> Result<(u32, u32), ProbeError> {
    if datagram.first() != Some(&UNCONNECTED_PONG) {
        return Err(ProbeError::Protocol("unexpected pong packet id"));
    }
    let body = datagram
        .get(PONG_HEADER_LEN..)
        .ok_or(ProbeError::UnexpectedEof)?;
    let (len_bytes, rest) = body.split_first_chunk::<2>().ok_or(ProbeError::UnexpectedEof)?;
    let len = u16::from_be_bytes(*len_bytes) as usize;
    let raw = rest.get(..len).ok_or(ProbeError::UnexpectedEof)?;
    let text =
        std::str::from_utf8(raw).map_err(|_| ProbeError::Protocol("server id is not utf-8"))?;
    parse_server_id(text)
}

/// "MCPE;motd;protocole;version;joueurs;max;guid;..." — seuls les champs
/// 4 et 5 nous intéressent.
fn parse_server_id(text: &str) -> Result<(u32, u32), ProbeError> {
    let mut fields = text.split(';');
    let online = fields
        .nth(4)
        .and_then(|f| f.parse().ok())
        .ok_or(ProbeError::Protocol("missing online player count"))?;
    let max = fields
        .next()
        .and_then(|f| f.parse().ok())
        .ok_or(ProbeError::Protocol("missing max player count"))?;
    Ok((online, max))
}
