mod support;

use pretty_assertions::assert_eq;
use resultseal_package::{
    ArchiveSink, ArchiveSource, PackageError, PackageResult, PlainFile, ResultsManifest,
    ResultsWriter, WriterConfig, ZipSource, MANIFEST_ENTRY,
};
use support::{alice, bob, carol, created_entry, public, signer, writer_for};

// ── Building ──

#[test]
fn add_file_records_metadata_and_recipients() {
    let mut writer = writer_for(&[alice(), bob()]);
    writer.add_file_for_all("data/results.csv", b"a,b\n1,2\n").unwrap();

    let record = writer.manifest().file("data/results.csv").unwrap();
    assert_eq!(record.path(), "data/results.csv");
    assert_eq!(record.original_byte_length(), 8);
    assert_eq!(record.content_type(), "text/csv");

    let mut expected = vec![alice().fingerprint().clone(), bob().fingerprint().clone()];
    expected.sort();
    let recipients: Vec<_> = record.recipients().cloned().collect();
    assert_eq!(recipients, expected);
}

#[test]
fn explicit_recipients_override_config() {
    let mut writer = writer_for(&[alice(), bob()]);
    writer
        .add_file("only-carol.txt", b"for carol", &[public(carol())])
        .unwrap();

    let record = writer.manifest().file("only-carol.txt").unwrap();
    assert!(record.wrapped_key(carol().fingerprint()).is_some());
    assert!(record.wrapped_key(alice().fingerprint()).is_none());
    assert_eq!(record.wrapped_keys().len(), 1);
}

#[test]
fn duplicate_recipient_wrapped_once() {
    let mut writer = writer_for(&[]);
    writer
        .add_file("x.txt", b"x", &[public(alice()), public(alice())])
        .unwrap();
    assert_eq!(writer.manifest().file("x.txt").unwrap().wrapped_keys().len(), 1);
}

#[test]
fn every_file_gets_a_fresh_iv() {
    let mut writer = writer_for(&[alice()]);
    writer.add_file_for_all("one.txt", b"same").unwrap();
    writer.add_file_for_all("two.txt", b"same").unwrap();

    let one = *writer.manifest().file("one.txt").unwrap().iv();
    let two = *writer.manifest().file("two.txt").unwrap().iv();
    assert_ne!(one, two);
}

#[test]
fn empty_content_is_allowed() {
    let mut writer = writer_for(&[alice()]);
    writer.add_file_for_all("empty.bin", b"").unwrap();
    assert_eq!(
        writer.manifest().file("empty.bin").unwrap().original_byte_length(),
        0
    );
}

// ── Rejections ──

#[test]
fn duplicate_path_rejected() {
    let mut writer = writer_for(&[alice()]);
    writer.add_file_for_all("notes.txt", b"first").unwrap();

    let err = writer.add_file_for_all("notes.txt", b"second").unwrap_err();
    assert!(matches!(err, PackageError::DuplicatePath(ref p) if p == "notes.txt"));
    assert!(!writer.is_poisoned());
}

#[test]
fn reserved_and_malformed_paths_rejected() {
    let mut writer = writer_for(&[alice()]);
    for path in ["", MANIFEST_ENTRY, "folder/"] {
        let err = writer.add_file_for_all(path, b"x").unwrap_err();
        assert!(
            matches!(err, PackageError::InvalidPath { .. }),
            "{path:?} gave {err:?}"
        );
    }
    assert!(writer.manifest().is_empty());
}

#[test]
fn no_recipients_rejected() {
    let mut writer = writer_for(&[]);
    let err = writer.add_file_for_all("lonely.txt", b"x").unwrap_err();
    assert!(matches!(err, PackageError::NoRecipients(ref p) if p == "lonely.txt"));
}

// ── Poisoning ──

/// Accepts `budget` entries, then fails every write.
struct FlakySink {
    budget: usize,
    written: Vec<String>,
}

impl ArchiveSink for FlakySink {
    type Output = Vec<String>;

    fn create_entry(&mut self, name: &str, _bytes: &[u8]) -> PackageResult<()> {
        if self.budget == 0 {
            return Err(PackageError::Archive("disk full".into()));
        }
        self.budget -= 1;
        self.written.push(name.to_string());
        Ok(())
    }

    fn finish(self) -> PackageResult<Vec<String>> {
        Ok(self.written)
    }
}

fn flaky_writer(budget: usize) -> ResultsWriter<FlakySink> {
    let sink = FlakySink {
        budget,
        written: Vec::new(),
    };
    ResultsWriter::with_archive(sink, WriterConfig::new(vec![public(alice())]))
}

#[test]
fn failed_container_write_poisons_writer() {
    let mut writer = flaky_writer(1);
    writer.add_file_for_all("first.txt", b"first").unwrap();
    writer.record_audit(created_entry(), signer()).unwrap();
    assert!(!writer.is_poisoned());

    let err = writer.add_file_for_all("second.txt", b"second").unwrap_err();
    assert!(matches!(err, PackageError::Archive(_)));
    assert!(writer.is_poisoned());
    assert!(!writer.manifest().contains("second.txt"));

    assert!(matches!(
        writer.add_file_for_all("third.txt", b"third"),
        Err(PackageError::WriterPoisoned)
    ));
    assert!(matches!(
        writer.record_audit(created_entry(), signer()),
        Err(PackageError::WriterPoisoned)
    ));
    assert!(matches!(writer.seal(), Err(PackageError::WriterPoisoned)));
}

#[test]
fn rejected_input_does_not_poison_writer() {
    let mut writer = flaky_writer(2);
    assert!(writer.add_file_for_all(MANIFEST_ENTRY, b"x").is_err());
    assert!(!writer.is_poisoned());

    writer.add_file_for_all("only.txt", b"x").unwrap();
    writer.record_audit(created_entry(), signer()).unwrap();
    assert_eq!(writer.seal().unwrap(), vec!["only.txt", MANIFEST_ENTRY]);
}

// ── Sealing ──

#[test]
fn seal_without_audit_fails_first() {
    let writer = writer_for(&[alice()]);
    assert!(matches!(writer.seal(), Err(PackageError::EmptyAudit)));

    let mut writer = writer_for(&[alice()]);
    writer.add_file_for_all("a.txt", b"a").unwrap();
    assert!(matches!(writer.seal(), Err(PackageError::EmptyAudit)));
}

#[test]
fn seal_without_files_fails() {
    let mut writer = writer_for(&[alice()]);
    writer.record_audit(created_entry(), signer()).unwrap();
    assert!(matches!(writer.seal(), Err(PackageError::EmptyManifest)));
}

#[test]
fn sealed_container_has_files_then_manifest() {
    let mut writer = writer_for(&[alice()]);
    writer.add_file_for_all("b.txt", b"bee").unwrap();
    writer.add_file_for_all("a.txt", b"ay").unwrap();
    writer.record_audit(created_entry(), signer()).unwrap();
    let bytes = writer.seal_to_bytes().unwrap();

    let mut source = ZipSource::from_bytes(bytes).unwrap();
    assert_eq!(source.list_entries(), vec!["b.txt", "a.txt", MANIFEST_ENTRY]);

    let ciphertext = source.read_entry("a.txt").unwrap();
    assert_eq!(ciphertext.len(), 16);
    assert_ne!(&ciphertext[..2], b"ay");

    let manifest = ResultsManifest::from_json(&source.read_entry(MANIFEST_ENTRY).unwrap()).unwrap();
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest.audit().len(), 1);
}

#[test]
fn record_audit_returns_storage_key() {
    let mut writer = writer_for(&[alice()]);
    let signature = writer.record_audit(created_entry(), signer()).unwrap();
    assert_eq!(writer.manifest().audit().get(&signature), Some(&created_entry()));
}

// ── Batches ──

#[tokio::test]
async fn add_files_preserves_input_order() {
    let mut writer = writer_for(&[alice()]);
    let files: Vec<PlainFile> = (0..6)
        .map(|i| PlainFile::new(format!("part-{i}.txt"), format!("chunk {i}")))
        .collect();
    writer.add_files(files).await.unwrap();
    writer.record_audit(created_entry(), signer()).unwrap();
    let bytes = writer.seal_to_bytes().unwrap();

    let source = ZipSource::from_bytes(bytes).unwrap();
    let names = source.list_entries();
    let expected: Vec<String> = (0..6)
        .map(|i| format!("part-{i}.txt"))
        .chain([MANIFEST_ENTRY.to_string()])
        .collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn add_files_rejects_duplicates_inside_batch() {
    let mut writer = writer_for(&[alice()]);
    let files = vec![
        PlainFile::new("same.txt", "one"),
        PlainFile::new("other.txt", "two"),
        PlainFile::new("same.txt", "three"),
    ];
    let err = writer.add_files(files).await.unwrap_err();

    assert!(matches!(err, PackageError::DuplicatePath(ref p) if p == "same.txt"));
    assert!(writer.manifest().is_empty(), "nothing from a rejected batch is added");
}

#[tokio::test]
async fn add_files_rejects_path_already_in_manifest() {
    let mut writer = writer_for(&[alice()]);
    writer.add_file_for_all("existing.txt", b"x").unwrap();

    let err = writer
        .add_files(vec![PlainFile::new("new.txt", "y"), PlainFile::new("existing.txt", "z")])
        .await
        .unwrap_err();
    assert!(matches!(err, PackageError::DuplicatePath(_)));
    assert_eq!(writer.manifest().len(), 1);
}

#[tokio::test]
async fn empty_batch_is_noop() {
    let mut writer = writer_for(&[alice()]);
    writer.add_files(Vec::new()).await.unwrap();
    assert!(writer.manifest().is_empty());
}
