use ferrous_relay_domain::{Authority, Protocol};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::Ipv4Addr;
use std::time::Duration;

pub fn authority(address: &str, suffix: &str) -> Authority {
    Authority::new(address, 53, Protocol::Udp, Duration::from_secs(2)).with_suffix(suffix)
}

pub fn question(name: &str, record_type: RecordType) -> Query {
    Query::query(Name::from_ascii(name).unwrap(), record_type)
}

pub fn query_message(id: u16, names: &[&str]) -> Message {
    let mut message = Message::new();
    message.set_id(id);
    message.set_message_type(MessageType::Query);
    message.set_op_code(OpCode::Query);
    message.set_recursion_desired(true);
    for name in names {
        message.add_query(question(name, RecordType::A));
    }
    message
}

pub fn a_record(name: &str, ip: Ipv4Addr) -> Record {
    Record::from_rdata(Name::from_ascii(name).unwrap(), 60, RData::A(A(ip)))
}

pub fn answer_for(question: &Query, ips: &[Ipv4Addr]) -> Message {
    let mut message = Message::new();
    message.set_message_type(MessageType::Response);
    message.set_op_code(OpCode::Query);
    message.add_query(question.clone());
    for ip in ips {
        message.add_answer(Record::from_rdata(
            question.name().clone(),
            60,
            RData::A(A(*ip)),
        ));
    }
    message
}

pub fn a_addresses(message: &Message) -> Vec<Ipv4Addr> {
    message
        .answers()
        .iter()
        .filter_map(|record| match record.data() {
            RData::A(a) => Some(a.0),
            _ => None,
        })
        .collect()
}
