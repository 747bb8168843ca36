//! Corpus store tests: JSON directories, SQLite import and load, legacy
//! documents and degraded loading.

use binsniff::config::{AppConfig, CorpusConfig, CorpusFormat};
use binsniff::corpus::parse_document;
use binsniff::matching::MinHasher;
use binsniff::model::{ExtractedFeatures, SignatureType};
use binsniff::{
    open_store, CorpusCache, GenericityFilter, JsonSignatureStore, SignatureMatcher,
    SignatureStore, SqliteSignatureStore,
};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write_documents(dir: &Path) {
    let zlib = json!({
        "component": {
            "name": "zlib",
            "version": "1.2.13",
            "license": "Zlib",
            "publisher": "Jean-loup Gailly and Mark Adler",
            "category": "compression"
        },
        "signature_metadata": { "version": "1.0.0", "signature_count": 3, "source": "manual" },
        "signatures": [
            { "id": "zlib_1", "type": "function_pattern", "pattern": "deflateInit2_", "confidence": 0.9 },
            { "id": "zlib_2", "type": "string_pattern", "pattern": "incorrect header check", "confidence": 0.8 },
            { "id": "zlib_3", "type": "string_pattern", "pattern": "error", "confidence": 0.9 }
        ]
    });
    let ffmpeg = json!({
        "package": "FFmpeg",
        "publisher": "FFmpeg team",
        "license": "LGPL-2.1",
        "symbols": ["av_register_all", "ffmpeg_version_info", "avformat_open_input_ex", "ab"]
    });
    std::fs::write(dir.join("zlib.json"), zlib.to_string()).expect("write");
    std::fs::write(dir.join("ffmpeg.json"), ffmpeg.to_string()).expect("write");
    std::fs::write(dir.join("broken.json"), "{\"component\": ").expect("write");
}

fn matcher_for(store: &dyn SignatureStore) -> SignatureMatcher {
    let config = AppConfig::default();
    let cache = CorpusCache::load(
        store,
        GenericityFilter::from_config(&config.genericity),
        &config.matching,
        &config.fuzzy,
    );
    SignatureMatcher::new(Arc::new(cache), &config)
}

fn import_all(docs: &Path, db: &Path) -> SqliteSignatureStore {
    let config = AppConfig::default();
    let filter = GenericityFilter::from_config(&config.genericity);
    let hasher = MinHasher::from_config(&config.fuzzy);
    let store = SqliteSignatureStore::create(db).expect("create db");
    for name in ["zlib.json", "ffmpeg.json"] {
        let text = std::fs::read_to_string(docs.join(name)).expect("read");
        let doc = parse_document(&text).expect("parse");
        store
            .import_document(&doc, Some(&filter), Some(&hasher))
            .expect("import");
    }
    store
}

#[test]
fn json_directory_skips_broken_documents() {
    let tmp = TempDir::new().expect("tempdir");
    write_documents(tmp.path());

    let loaded = JsonSignatureStore::new(tmp.path()).load_all().expect("loads");

    assert_eq!(loaded.report.components, 2);
    assert_eq!(loaded.report.skipped_documents, 1);
    assert_eq!(loaded.components.len(), 2);
}

#[test]
fn sqlite_and_json_stores_agree_on_matches() {
    let tmp = TempDir::new().expect("tempdir");
    let docs = tmp.path().join("docs");
    std::fs::create_dir(&docs).expect("mkdir");
    write_documents(&docs);
    let db = tmp.path().join("signatures.db");
    drop(import_all(&docs, &db));

    let features = ExtractedFeatures::from_strings(["incorrect header check", "error"])
        .with_functions(["deflateInit2_", "av_register_all"]);

    let from_json = matcher_for(&JsonSignatureStore::new(&docs)).match_features(&features, 0.3, false);
    let sqlite = SqliteSignatureStore::open_read_only(&db).expect("open");
    let from_sqlite = matcher_for(&sqlite).match_features(&features, 0.3, false);

    let summarize = |matches: &[binsniff::ComponentMatch]| -> Vec<(String, String)> {
        matches
            .iter()
            .map(|m| (m.component.clone(), format!("{:.4}", m.confidence)))
            .collect()
    };
    assert_eq!(summarize(&from_json), summarize(&from_sqlite));
    assert_eq!(from_sqlite.len(), 2);
    assert_eq!(from_sqlite[0].component, "zlib@1.2.13");
}

#[test]
fn legacy_symbol_documents_get_rule_based_confidence() {
    let tmp = TempDir::new().expect("tempdir");
    let docs = tmp.path().join("docs");
    std::fs::create_dir(&docs).expect("mkdir");
    write_documents(&docs);
    let store = import_all(&docs, &tmp.path().join("signatures.db"));

    let loaded = store.load_all().expect("loads");
    let confidence_of = |pattern: &str| {
        loaded
            .signatures
            .iter()
            .find(|s| s.pattern == pattern)
            .map(|s| s.confidence)
    };

    // prefix rule wins over the package-name rule
    assert_eq!(confidence_of("av_register_all"), Some(0.85));
    assert_eq!(confidence_of("ffmpeg_version_info"), Some(0.9));
    assert_eq!(confidence_of("ab"), None);

    let ffmpeg = loaded
        .components
        .values()
        .find(|c| c.name == "FFmpeg")
        .expect("component");
    assert_eq!(ffmpeg.display_name(), "FFmpeg");
    assert_eq!(ffmpeg.license.as_deref(), Some("LGPL-2.1"));
    assert!(loaded
        .signatures
        .iter()
        .filter(|s| s.component_id == ffmpeg.id)
        .all(|s| s.sig_type == SignatureType::String));
}

#[test]
fn reimport_reports_duplicates() {
    let tmp = TempDir::new().expect("tempdir");
    write_documents(tmp.path());
    let db = tmp.path().join("signatures.db");
    let store = import_all(tmp.path(), &db);
    let before = store.signature_count().expect("count");

    let text = std::fs::read_to_string(tmp.path().join("zlib.json")).expect("read");
    let summary = store
        .import_document(&parse_document(&text).expect("parse"), None, None)
        .expect("import");

    // "error" was filtered the first time and is new now
    assert_eq!(summary.duplicates, 2);
    assert_eq!(summary.inserted, 1);
    assert_eq!(store.signature_count().expect("count"), before + 1);
}

#[test]
fn corrupt_database_degrades_to_empty_cache() {
    let tmp = TempDir::new().expect("tempdir");
    let db = tmp.path().join("signatures.db");
    std::fs::write(&db, b"this is definitely not a sqlite database, just bytes").expect("write");

    let config = CorpusConfig {
        path: Some(db),
        format: CorpusFormat::Auto,
    };
    let app = AppConfig::default();
    let cache = match open_store(&config) {
        Ok(store) => CorpusCache::load(
            store.as_ref(),
            GenericityFilter::new(),
            &app.matching,
            &app.fuzzy,
        ),
        Err(_) => CorpusCache::degraded(GenericityFilter::new(), &app.fuzzy),
    };

    assert!(cache.is_empty());
    assert!(cache.is_degraded());
}

#[test]
fn auto_format_picks_store_by_path_kind() {
    let tmp = TempDir::new().expect("tempdir");
    let dir_config = CorpusConfig {
        path: Some(tmp.path().to_path_buf()),
        format: CorpusFormat::Auto,
    };
    let store = open_store(&dir_config).expect("directory store");
    assert!(store.describe().starts_with("signature directory"));

    let missing = CorpusConfig {
        path: Some(tmp.path().join("absent.db")),
        format: CorpusFormat::Auto,
    };
    assert!(open_store(&missing).is_err());
}
