//! Tests for strongly-typed identifiers

use core_kernel::{ClaimId, OwnerId, SubmissionId};
use uuid::Uuid;

#[test]
fn test_prefixes() {
    assert_eq!(ClaimId::prefix(), "CLM");
    assert_eq!(SubmissionId::prefix(), "SUB");
}

#[test]
fn test_parse_with_and_without_prefix() {
    let uuid = Uuid::new_v4();
    let with_prefix: ClaimId = format!("CLM-{uuid}").parse().unwrap();
    let bare: ClaimId = uuid.to_string().parse().unwrap();

    assert_eq!(with_prefix, bare);
    assert_eq!(with_prefix.as_uuid(), &uuid);
}

#[test]
fn test_parse_rejects_garbage() {
    assert!("CLM-not-a-uuid".parse::<ClaimId>().is_err());
}

#[test]
fn test_v7_ids_are_time_ordered() {
    let first = ClaimId::new_v7();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = ClaimId::new_v7();

    assert!(first < second);
}

#[test]
fn test_claim_id_serializes_as_bare_uuid() {
    let id = ClaimId::new();
    let json = serde_json::to_string(&id).unwrap();

    assert_eq!(json, format!("\"{}\"", id.as_uuid()));
}

#[test]
fn test_owner_id_is_transparent() {
    let owner = OwnerId::new("user-42");
    assert_eq!(serde_json::to_string(&owner).unwrap(), "\"user-42\"");
    assert_eq!(owner.to_string(), "user-42");
    assert_eq!(OwnerId::from("user-42"), owner);
}
