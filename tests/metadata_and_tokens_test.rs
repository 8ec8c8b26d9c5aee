mod common;

use alloy_primitives::U256;
use auction_ledger::domain::event::{AuctionCreated, AuctionRegistered};
use auction_ledger::domain::AuctionEvent;
use auction_ledger::{IngestOutcome, StaticMetadataResolver};
use common::*;
use serde_json::json;

const REGISTRY: alloy_primitives::Address = alloy_primitives::Address::repeat_byte(0x4e);

fn created(lot_id: u64, info_hash: Option<&str>) -> AuctionEvent {
    AuctionEvent::AuctionCreated(AuctionCreated {
        lot_id,
        info_hash: info_hash.map(str::to_string),
    })
}

#[tokio::test]
async fn test_created_lot_resolves_info() {
    let metadata = StaticMetadataResolver::new().with_document(
        "QmLot1",
        json!({
            "name": "Launch",
            "description": "First sale",
            "links": {"website": "https://example.org", "discord": 42}
        }),
    );
    let mut harness = Harness::with_metadata(emp_reader(), metadata).await;
    harness.send(100, created(1, Some("QmLot1"))).await.unwrap();

    let info = harness.repo.get_lot_info("QmLot1").await.unwrap().unwrap();
    assert_eq!(info.lot, lot_key(1));
    assert_eq!(info.name.as_deref(), Some("Launch"));
    assert_eq!(info.description.as_deref(), Some("First sale"));
    assert_eq!(info.links.len(), 1);
    assert_eq!(harness.lot(1).await.info_hash.as_deref(), Some("QmLot1"));
}

#[tokio::test]
async fn test_unavailable_metadata_does_not_fail_creation() {
    let mut harness = Harness::new(emp_reader()).await;
    let outcome = harness.send(100, created(1, Some("QmMissing"))).await.unwrap();
    assert!(matches!(outcome, IngestOutcome::Applied { .. }));
    assert!(harness.repo.get_lot_info("QmMissing").await.unwrap().is_none());
    assert!(harness.repo.get_lot(&lot_key(1)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_registry_event_attaches_partial_info() {
    let metadata = StaticMetadataResolver::new().with_document("QmReg", json!({"name": "Only a name"}));
    let mut harness = Harness::with_metadata(emp_reader(), metadata).await;
    harness
        .send_from(
            REGISTRY,
            100,
            AuctionEvent::AuctionRegistered(AuctionRegistered {
                auction_house: HOUSE,
                lot_id: 3,
                info_hash: "QmReg".to_string(),
            }),
        )
        .await
        .unwrap();

    let infos = harness.repo.lot_infos_for(&lot_key(3)).await.unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].name.as_deref(), Some("Only a name"));
    assert_eq!(infos[0].description, None);
    assert!(infos[0].links.is_empty());
}

#[tokio::test]
async fn test_tokens_read_once_across_lots() {
    let reader = emp_reader()
        .with_lot(2, lot_data(U256::ZERO, U256::ZERO), routing("EMPA"), fees())
        .with_lot_module(2, EMP_MODULE)
        .with_emp_data(2, emp_data(0));
    let mut harness = Harness::new(reader).await;

    harness.send(100, created(1, None)).await.unwrap();
    harness.send(101, created(2, None)).await.unwrap();

    assert_eq!(harness.reader.token_reads(BASE), 1);
    assert_eq!(harness.reader.token_reads(QUOTE), 1);
    assert_eq!(harness.lot(2).await.quote_token, QUOTE);
}
