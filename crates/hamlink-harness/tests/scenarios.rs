//! End-to-end scenarios driving a real [`hamlink_client::Client`] against the
//! in-process reference server.

use std::sync::Arc;

use hamlink_client::{Client, ClientConfig, Key, Record};
use hamlink_core::{DbFlags, HamError, OperationFlags, StatusCode, TxnFlags};
use hamlink_harness::{ChannelTransport, Server};
use hamlink_proto::Encoding;

async fn connect(encoding: Encoding) -> Client {
    let server = Arc::new(Server::new());
    let transport = Box::new(ChannelTransport::new(server, encoding));
    let config = ClientConfig { encoding, ..ClientConfig::default() };
    Client::connect("local.db", transport, config).await.expect("connect")
}

#[tokio::test]
async fn connect_create_insert_find() {
    let client = connect(Encoding::Schema).await;
    let db = client.create_db(13, 0, Vec::new()).await.expect("create_db");

    let key = Key::new(b"k".to_vec());
    let record = Record::new(b"v".to_vec());
    db.insert(None, &key, &record, OperationFlags::empty()).await.expect("insert");

    let found = db.find(None, &key, &Record::none(), OperationFlags::empty()).await.expect("find");
    assert_eq!(found.record.data, Some(b"v".to_vec()));
}

#[tokio::test]
async fn record_number_insert_assigns_an_eight_byte_key() {
    let client = connect(Encoding::Schema).await;
    let db = client.create_db(13, DbFlags::RECORD_NUMBER.bits(), Vec::new()).await.expect("create_db");
    assert!(db.is_record_number());

    let assigned =
        db.insert(None, &Key::none(), &Record::new(b"x".to_vec()), OperationFlags::empty()).await.expect("insert");
    assert_eq!(assigned.len(), 8);
    assert_eq!(u64::from_le_bytes(assigned.try_into().unwrap()), 1);
}

#[tokio::test]
async fn approximate_find_reports_the_matched_relation() {
    let client = connect(Encoding::Schema).await;
    let db = client.create_db(13, 0, Vec::new()).await.expect("create_db");

    for n in [10u32, 20, 30] {
        let key = Key::new(n.to_be_bytes().to_vec());
        db.insert(None, &key, &Record::new(b"r".to_vec()), OperationFlags::empty()).await.expect("insert");
    }

    let probe = Key::new(25u32.to_be_bytes().to_vec());
    let leq = db.find(None, &probe, &Record::none(), OperationFlags::LEQ).await.expect("find leq");
    assert_eq!(leq.key.data, Some(20u32.to_be_bytes().to_vec()));
    assert!(leq.relation.contains(hamlink_core::ApproxMatch::LT));

    let geq = db.find(None, &probe, &Record::none(), OperationFlags::GEQ).await.expect("find geq");
    assert_eq!(geq.key.data, Some(30u32.to_be_bytes().to_vec()));
    assert!(geq.relation.contains(hamlink_core::ApproxMatch::GT));
}

#[tokio::test]
async fn cursor_moves_first_next_last_then_exhausts() {
    let client = connect(Encoding::Schema).await;
    let db = client.create_db(13, 0, Vec::new()).await.expect("create_db");

    for byte in [1u8, 2, 3] {
        let key = Key::new(vec![byte]);
        db.insert(None, &key, &Record::new(vec![byte]), OperationFlags::empty()).await.expect("insert");
    }

    let cursor = db.create_cursor(None, 0).await.expect("cursor_create");

    let first = cursor.move_to(&Key::none(), &Record::none(), OperationFlags::FIRST).await.expect("first");
    assert_eq!(first.key.data, Some(vec![1]));

    let next = cursor.move_to(&Key::none(), &Record::none(), OperationFlags::NEXT).await.expect("next");
    assert_eq!(next.key.data, Some(vec![2]));

    let last = cursor.move_to(&Key::none(), &Record::none(), OperationFlags::LAST).await.expect("last");
    assert_eq!(last.key.data, Some(vec![3]));

    let exhausted = cursor.move_to(&Key::none(), &Record::none(), OperationFlags::NEXT).await;
    assert_eq!(exhausted.unwrap_err(), HamError::Engine(StatusCode::KEY_NOT_FOUND));
}

#[tokio::test]
async fn transaction_abort_rolls_back_its_writes() {
    let client = connect(Encoding::Schema).await;
    let db = client.create_db(13, 0, Vec::new()).await.expect("create_db");

    let txn = client.begin_txn(None, TxnFlags::empty()).await.expect("begin_txn");

    let key = Key::new(b"a".to_vec());
    let record = Record::new(b"1".to_vec());
    db.insert(Some(&txn), &key, &record, OperationFlags::empty()).await.expect("insert in txn");

    let seen = db.find(Some(&txn), &key, &Record::none(), OperationFlags::empty()).await.expect("find in txn");
    assert_eq!(seen.record.data, Some(b"1".to_vec()));

    txn.abort(0).await.expect("abort");

    let after_abort = db.find(None, &key, &Record::none(), OperationFlags::empty()).await;
    assert_eq!(after_abort.unwrap_err(), HamError::Engine(StatusCode::KEY_NOT_FOUND));
}

#[tokio::test]
async fn fixed_encoding_round_trips_the_same_scenario() {
    let client = connect(Encoding::Fixed).await;
    let db = client.create_db(7, 0, Vec::new()).await.expect("create_db");

    let key = Key::new(b"fixed".to_vec());
    let record = Record::new(b"value".to_vec());
    db.insert(None, &key, &record, OperationFlags::empty()).await.expect("insert");

    let found = db.find(None, &key, &Record::none(), OperationFlags::empty()).await.expect("find");
    assert_eq!(found.record.data, Some(b"value".to_vec()));
}
