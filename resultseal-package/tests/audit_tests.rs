mod support;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use resultseal_crypto::PrivateKey;
use resultseal_package::{
    to_canonical_json, AuditEntry, AuditLedger, AuditRole, PackageError, ReaderConfig,
    ResultsReader,
};
use support::{alice, bob, created_entry, edit_manifest, notes_package, open_as, public, signer};

fn first_signature(manifest: &serde_json::Value) -> String {
    manifest["audit"]
        .as_object()
        .unwrap()
        .keys()
        .next()
        .unwrap()
        .clone()
}

// ── Ledger ──

#[test]
fn signature_is_keyed_by_base64() {
    let mut ledger = AuditLedger::new();
    let signature = ledger.record(created_entry(), signer()).unwrap();

    let raw = STANDARD.decode(&signature).unwrap();
    assert_eq!(raw.len(), 256);
    assert_eq!(ledger.len(), 1);
    ledger.verify_all(signer().public_key()).unwrap();
}

#[test]
fn identical_entries_collapse() {
    let mut ledger = AuditLedger::new();
    let first = ledger.record(created_entry(), signer()).unwrap();
    let second = ledger.record(created_entry(), signer()).unwrap();
    assert_eq!(first, second);
    assert_eq!(ledger.len(), 1);
}

#[test]
fn empty_ledger_never_verifies() {
    let err = AuditLedger::new().verify_all(signer().public_key()).unwrap_err();
    assert!(matches!(err, PackageError::EmptyAudit));
}

#[test]
fn one_bad_entry_rejects_the_ledger() {
    let mut ledger = AuditLedger::new();
    ledger.record(created_entry(), signer()).unwrap();
    ledger
        .record(AuditEntry::new("reviewed", "org-7", AuditRole::Admin), alice())
        .unwrap();

    let err = ledger.verify_all(signer().public_key()).unwrap_err();
    assert!(matches!(
        err,
        PackageError::InvalidSignature { ref action, ref entity_id }
            if action == "reviewed" && entity_id == "org-7"
    ));
}

#[test]
fn canonical_form_ignores_field_order() {
    let a: AuditEntry = serde_json::from_str(
        r#"{"role":"researcher","timestamp":"2024-01-02T03:04:05.006Z","entityId":"r-9","action":"exported"}"#,
    )
    .unwrap();
    let b: AuditEntry = serde_json::from_str(
        r#"{"action":"exported","entityId":"r-9","timestamp":"2024-01-02T03:04:05.006Z","role":"researcher"}"#,
    )
    .unwrap();

    assert_eq!(a.canonical_bytes().unwrap(), b.canonical_bytes().unwrap());
    assert_eq!(
        to_canonical_json(&a).unwrap(),
        a.canonical_bytes().unwrap()
    );
    let signature = a.sign(signer()).unwrap();
    b.verify(&signature, signer().public_key()).unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn signature_survives_json_round_trip(
        action in "\\PC{0,24}",
        entity_id in "\\PC{0,24}",
        role in 0usize..3,
    ) {
        let role = [AuditRole::Admin, AuditRole::Researcher, AuditRole::Member][role];
        let entry = AuditEntry::new(action, entity_id, role);
        let signature = entry.sign(signer()).unwrap();

        let json = serde_json::to_string(&entry).unwrap();
        let parsed: AuditEntry = serde_json::from_str(&json).unwrap();
        prop_assert!(parsed.verify(&signature, signer().public_key()).is_ok());
    }
}

#[test]
fn unknown_role_rejected() {
    let parsed = serde_json::from_str::<AuditEntry>(
        r#"{"action":"created","entityId":"u","timestamp":"2024-01-01T00:00:00.000Z","role":"owner"}"#,
    );
    assert!(parsed.is_err());
}

// ── Tamper detection through the reader ──

#[test]
fn flipped_signature_byte_rejects_package() {
    let bytes = edit_manifest(notes_package(), |manifest| {
        let signature = first_signature(manifest);
        let audit = manifest["audit"].as_object_mut().unwrap();
        let entry = audit.remove(&signature).unwrap();

        let mut raw = STANDARD.decode(&signature).unwrap();
        raw[0] ^= 0x01;
        audit.insert(STANDARD.encode(raw), entry);
    });

    let mut reader = open_as(bytes, alice());
    let err = reader.verify().unwrap_err();
    assert!(matches!(err, PackageError::InvalidSignature { .. }), "got {err:?}");
}

#[test]
fn edited_entry_rejects_package() {
    let bytes = edit_manifest(notes_package(), |manifest| {
        let signature = first_signature(manifest);
        manifest["audit"][&signature]["entityId"] = "user-2".into();
    });

    let err = open_as(bytes, alice()).verify().unwrap_err();
    assert!(matches!(
        err,
        PackageError::InvalidSignature { ref entity_id, .. } if entity_id == "user-2"
    ));
}

#[test]
fn edited_timestamp_rejects_package() {
    let bytes = edit_manifest(notes_package(), |manifest| {
        let signature = first_signature(manifest);
        manifest["audit"][&signature]["timestamp"] = "2024-05-01T12:00:00Z".into();
    });

    assert!(open_as(bytes, alice()).verify().is_err());
}

#[test]
fn wrong_trusted_signer_rejects_package() {
    let config = ReaderConfig::new(public(bob()), alice().clone());
    let mut reader = ResultsReader::open(notes_package(), config).unwrap();
    assert!(matches!(
        reader.verify(),
        Err(PackageError::InvalidSignature { .. })
    ));
}

#[test]
fn rejected_package_releases_nothing() {
    let bytes = edit_manifest(notes_package(), |manifest| {
        let signature = first_signature(manifest);
        manifest["audit"][&signature]["action"] = "deleted".into();
    });

    let mut reader = open_as(bytes.clone(), alice());
    assert!(matches!(
        reader.read_file("notes.txt"),
        Err(PackageError::InvalidSignature { .. })
    ));
    assert!(!reader.is_verified());

    // The failure sticks.
    assert!(matches!(reader.verify(), Err(PackageError::InvalidSignature { .. })));
    assert!(matches!(reader.manifest(), Err(PackageError::InvalidSignature { .. })));

    assert!(matches!(
        open_as(bytes, alice()).entries().err(),
        Some(PackageError::InvalidSignature { .. })
    ));
}

#[tokio::test]
async fn rejected_package_releases_nothing_in_parallel() {
    let bytes = edit_manifest(notes_package(), |manifest| {
        manifest["audit"] = serde_json::json!({});
    });

    let err = open_as(bytes, alice()).decrypt_all().await.err().unwrap();
    assert!(matches!(err, PackageError::EmptyAudit));
}

#[test]
fn verification_runs_implicitly_and_once() {
    let mut reader = open_as(notes_package(), alice());
    assert!(!reader.is_verified());
    reader.read_file("notes.txt").unwrap();
    assert!(reader.is_verified());

    let manifest = reader.manifest().unwrap();
    let (_, entry) = manifest.audit().iter().next().unwrap();
    assert_eq!(entry, &created_entry());
}

#[test]
fn signer_can_be_any_rsa_key() {
    let other: &PrivateKey = bob();
    let mut writer = support::writer_for(&[alice()]);
    writer.add_file_for_all("a.txt", b"a").unwrap();
    writer.record_audit(created_entry(), other).unwrap();

    let config = ReaderConfig::new(public(other), alice().clone());
    let mut reader = ResultsReader::open(writer.seal_to_bytes().unwrap(), config).unwrap();
    reader.verify().unwrap();
}
