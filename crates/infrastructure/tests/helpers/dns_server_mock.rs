use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record};
use hickory_proto::serialize::binary::BinEncodable;
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio_util::sync::CancellationToken;

/// How the stub misbehaves, if at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubBehavior {
    /// UDP answers come back empty with the TC bit; TCP answers are complete.
    pub truncate_udp: bool,
    /// Every answer carries an id different from the query's.
    pub mismatched_id: bool,
    /// Every answer echoes `other.example.` instead of the asked question.
    pub wrong_question: bool,
}

/// Authoritative stub on 127.0.0.1 serving A records over UDP and TCP on
/// the same port. Unknown names get NXDOMAIN.
pub struct StubAuthority {
    addr: SocketAddr,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    shutdown: CancellationToken,
}

struct StubState {
    records: HashMap<String, Vec<Ipv4Addr>>,
    behavior: StubBehavior,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
}

impl StubAuthority {
    pub async fn start(records: &[(&str, &[Ipv4Addr])]) -> Self {
        Self::start_with(records, StubBehavior::default()).await
    }

    pub async fn start_with(records: &[(&str, &[Ipv4Addr])], behavior: StubBehavior) -> Self {
        let (udp, tcp) = bind_pair().await;
        let addr = udp.local_addr().unwrap();

        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));
        let state = Arc::new(StubState {
            records: records
                .iter()
                .map(|(name, ips)| (name.to_string(), ips.to_vec()))
                .collect(),
            behavior,
            udp_queries: Arc::clone(&udp_queries),
            tcp_queries: Arc::clone(&tcp_queries),
        });
        let shutdown = CancellationToken::new();

        tokio::spawn(serve_udp(udp, Arc::clone(&state), shutdown.clone()));
        tokio::spawn(serve_tcp(tcp, state, shutdown.clone()));

        Self {
            addr,
            udp_queries,
            tcp_queries,
            shutdown,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }
}

impl Drop for StubAuthority {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// UDP socket that reads nothing and never answers.
pub async fn black_hole() -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    (socket, addr)
}

async fn bind_pair() -> (UdpSocket, TcpListener) {
    for _ in 0..16 {
        let udp = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = udp.local_addr().unwrap();
        if let Ok(tcp) = TcpListener::bind(addr).await {
            return (udp, tcp);
        }
    }
    panic!("could not bind UDP and TCP on the same port");
}

async fn serve_udp(socket: UdpSocket, state: Arc<StubState>, shutdown: CancellationToken) {
    let mut buf = vec![0u8; 4096];

    loop {
        let (len, peer) = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut buf) => match received {
                Ok(received) => received,
                Err(_) => continue,
            },
        };

        state.udp_queries.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = state.answer(&buf[..len], true) {
            let _ = socket.send_to(&reply, peer).await;
        }
    }
}

async fn serve_tcp(listener: TcpListener, state: Arc<StubState>, shutdown: CancellationToken) {
    loop {
        let stream = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(_) => continue,
            },
        };

        tokio::spawn(serve_tcp_connection(stream, Arc::clone(&state)));
    }
}

async fn serve_tcp_connection(mut stream: TcpStream, state: Arc<StubState>) {
    loop {
        let mut len_buf = [0u8; 2];
        if stream.read_exact(&mut len_buf).await.is_err() {
            return;
        }
        let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
        if stream.read_exact(&mut query).await.is_err() {
            return;
        }

        state.tcp_queries.fetch_add(1, Ordering::SeqCst);
        let Some(reply) = state.answer(&query, false) else {
            return;
        };

        let len = (reply.len() as u16).to_be_bytes();
        if stream.write_all(&len).await.is_err() || stream.write_all(&reply).await.is_err() {
            return;
        }
    }
}

impl StubState {
    fn answer(&self, query_bytes: &[u8], over_udp: bool) -> Option<Vec<u8>> {
        let query = Message::from_vec(query_bytes).ok()?;
        let question = query.queries().first()?.clone();

        let mut response = query.clone();
        response.set_message_type(MessageType::Response);
        response.set_authoritative(true);

        match self.records.get(&question.name().to_ascii()) {
            Some(ips) => {
                for ip in ips {
                    response.add_answer(Record::from_rdata(
                        question.name().clone(),
                        60,
                        RData::A(A(*ip)),
                    ));
                }
            }
            None => {
                response.set_response_code(ResponseCode::NXDomain);
            }
        }

        if over_udp && self.behavior.truncate_udp {
            response.take_answers();
            response.set_truncated(true);
        }
        if self.behavior.mismatched_id {
            response.set_id(query.id().wrapping_add(1));
        }
        if self.behavior.wrong_question {
            let other = Name::from_ascii("other.example.").ok()?;
            response.take_queries();
            response.add_query(Query::query(other, question.query_type()));
        }

        response.to_vec().ok()
    }
}
