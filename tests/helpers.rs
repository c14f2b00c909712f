// Shared test helpers: domain source fixtures and a local fake DNS server.
//
// Included from the integration test files with `mod helpers;`.

use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::{NULL, TXT};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Header row of the Afnic open-data CSV (12 columns).
#[allow(dead_code)]
pub const AFNIC_HEADER: &str = "Nom de domaine;Pays BE;Departement BE;Ville BE;Nom BE;Sous domaine;Type du titulaire;Pays titulaire;Departement titulaire;Date de creation;Date de retrait du WHOIS;Date de retrait";

/// Writes a zip archive at `path` holding the given `(name, contents)` entries.
#[allow(dead_code)]
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = std::fs::File::create(path).expect("Failed to create archive");
    let mut zip = ZipWriter::new(file);
    for (name, contents) in entries {
        zip.start_file(*name, SimpleFileOptions::default())
            .expect("Failed to start archive entry");
        zip.write_all(contents.as_bytes())
            .expect("Failed to write archive entry");
    }
    zip.finish().expect("Failed to finish archive");
}

/// Writes a plain domain list at `dir/name`.
#[allow(dead_code)]
pub fn write_list(dir: &Path, name: &str, domains: &[&str]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, domains.join("\n")).expect("Failed to write domain list");
    path
}

/// Fake recursive resolver answering on one loopback port over UDP and TCP.
///
/// Zone contents:
/// - `signed.test.`: DS `12345 8 2 AABB`, two apex TXT (one SPF), a DKIM TXT
///   and a DMARC policy
/// - `big.test.`: apex TXT is truncated over UDP, served in full over TCP
/// - anything else: NXDOMAIN
#[allow(dead_code)]
pub async fn spawn_fake_resolver() -> SocketAddr {
    let (udp, tcp) = bind_same_port().await;
    let addr = udp.local_addr().expect("Failed to read UDP address");

    tokio::spawn(async move {
        let mut buf = vec![0u8; 4096];
        loop {
            let Ok((len, peer)) = udp.recv_from(&mut buf).await else {
                return;
            };
            if let Some(reply) = answer(&buf[..len], false) {
                let _ = udp.send_to(&reply, peer).await;
            }
        }
    });

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = tcp.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut len_buf = [0u8; 2];
                if stream.read_exact(&mut len_buf).await.is_err() {
                    return;
                }
                let mut request = vec![0u8; usize::from(u16::from_be_bytes(len_buf))];
                if stream.read_exact(&mut request).await.is_err() {
                    return;
                }
                if let Some(reply) = answer(&request, true) {
                    let len = (reply.len() as u16).to_be_bytes();
                    let _ = stream.write_all(&len).await;
                    let _ = stream.write_all(&reply).await;
                }
            });
        }
    });

    addr
}

/// A loopback address where nothing listens, for unreachable-resolver tests.
#[allow(dead_code)]
pub async fn closed_udp_port() -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind UDP socket");
    socket.local_addr().expect("Failed to read UDP address")
}

async fn bind_same_port() -> (UdpSocket, TcpListener) {
    for _ in 0..20 {
        let udp = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind UDP socket");
        let addr = udp.local_addr().expect("Failed to read UDP address");
        if let Ok(tcp) = TcpListener::bind(addr).await {
            return (udp, tcp);
        }
    }
    panic!("Could not bind UDP and TCP on the same loopback port");
}

fn txt_record(owner: &Name, text: &str) -> Record {
    Record::from_rdata(
        owner.clone(),
        300,
        RData::TXT(TXT::new(vec![text.to_string()])),
    )
}

fn answer(request: &[u8], over_tcp: bool) -> Option<Vec<u8>> {
    let request = Message::from_vec(request).ok()?;
    let question = request.queries().first()?.clone();
    let owner = question.name().clone();

    let mut reply = Message::new();
    reply
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(true)
        .set_response_code(ResponseCode::NoError);
    reply.add_query(question.clone());

    let owner_str = owner.to_ascii();
    match (owner_str.as_str(), question.query_type()) {
        ("signed.test.", RecordType::DS) => {
            reply.add_answer(Record::from_rdata(
                owner,
                300,
                RData::Unknown {
                    code: RecordType::DS,
                    rdata: NULL::with(vec![0x30, 0x39, 8, 2, 0xAA, 0xBB]),
                },
            ));
        }
        ("signed.test.", RecordType::TXT) => {
            reply.add_answer(txt_record(&owner, "google-site-verification=abc"));
            reply.add_answer(txt_record(&owner, "v=spf1 -all"));
        }
        ("_domainkey.signed.test.", RecordType::TXT) => {
            reply.add_answer(txt_record(&owner, "k=rsa; p=ABC"));
        }
        ("_dmarc.signed.test.", RecordType::TXT) => {
            reply.add_answer(txt_record(&owner, "v=DMARC1; p=reject"));
        }
        ("big.test.", RecordType::TXT) if !over_tcp => {
            reply.set_truncated(true);
        }
        ("big.test.", RecordType::TXT) => {
            reply.add_answer(txt_record(&owner, "v=spf1 include:_spf.big.test ~all"));
        }
        _ => {
            reply.set_response_code(ResponseCode::NXDomain);
        }
    }

    reply.to_vec().ok()
}
