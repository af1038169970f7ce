//! Integration tests for the Tekken tokenizer.
//!
//! Runs against a synthetic byte-complete vocabulary (all 256 single bytes at
//! ranks 0-255) extended with a handful of common English merges, so every
//! property can be checked without shipping a full 131k-entry model file.

use tekkenizer::{
    from_model_file, from_pretrained, SpecialTokenPolicy, SpecialTokenRegistry, Tokenizer,
    TokenizerConfig, TokenizerError, Vocabulary,
};

const NUM_SPECIAL: u32 = 19;

const WORDS: [(&str, u32); 9] = [
    ("th", 256),
    ("he", 257),
    ("er", 258),
    ("in", 259),
    ("the", 260),
    ("ing", 261),
    ("tion", 262),
    ("and", 263),
    ("for", 264),
];

fn test_vocabulary() -> Vocabulary {
    let mut entries: Vec<(Vec<u8>, u32)> = (0u32..=255).map(|b| (vec![b as u8], b)).collect();
    entries.extend(WORDS.iter().map(|(w, r)| (w.as_bytes().to_vec(), *r)));
    Vocabulary::from_entries(entries).unwrap()
}

fn create_tokenizer() -> Tokenizer {
    let config = TokenizerConfig {
        vocab_size: 512,
        num_special_tokens: NUM_SPECIAL,
        pattern: String::new(),
        version: "v3".to_string(),
    };
    Tokenizer::new(
        test_vocabulary(),
        config,
        SpecialTokenRegistry::canonical(NUM_SPECIAL),
    )
    .unwrap()
}

// =============================================================================
// Round-trip and empty-input properties
// =============================================================================

#[test]
fn test_ascii_round_trip() {
    let tokenizer = create_tokenizer();
    let cases = [
        "the quick brown fox",
        "nothing interesting",
        "for the record",
        "punctuation, too!",
        "   leading and trailing   ",
    ];
    for text in cases {
        let ids = tokenizer.encode(text, false, false);
        let decoded = tokenizer.decode(&ids, SpecialTokenPolicy::Ignore).unwrap();
        assert_eq!(decoded, text, "round trip failed for {text:?}");
    }
}

#[test]
fn test_empty_text_and_empty_ids() {
    let tokenizer = create_tokenizer();
    assert!(tokenizer.encode("", false, false).is_empty());
    assert!(tokenizer.encode("", true, true).is_empty());
    assert_eq!(
        tokenizer.decode(&[], SpecialTokenPolicy::Raise).unwrap(),
        ""
    );
}

// =============================================================================
// Sequence markers
// =============================================================================

#[test]
fn test_bos_marker() {
    let tokenizer = create_tokenizer();
    for text in ["the", "x", "for the record"] {
        let plain = tokenizer.encode(text, false, false);
        let marked = tokenizer.encode(text, true, false);
        assert_eq!(marked.len(), plain.len() + 1);
        assert_eq!(marked[0], tokenizer.bos_id());
        assert_eq!(&marked[1..], plain.as_slice());
    }
}

#[test]
fn test_eos_marker() {
    let tokenizer = create_tokenizer();
    for text in ["the", "x", "for the record"] {
        let plain = tokenizer.encode(text, false, false);
        let marked = tokenizer.encode(text, false, true);
        assert_eq!(marked.len(), plain.len() + 1);
        assert_eq!(marked[marked.len() - 1], tokenizer.eos_id());
        assert_eq!(&marked[..marked.len() - 1], plain.as_slice());
    }
}

#[test]
fn test_anchor_ids() {
    let tokenizer = create_tokenizer();
    assert_eq!(tokenizer.unk_id(), 0);
    assert_eq!(tokenizer.bos_id(), 1);
    assert_eq!(tokenizer.eos_id(), 2);
    assert_eq!(tokenizer.pad_id(), 11);
    assert_eq!(tokenizer.vocab_size(), 512);
    assert_eq!(tokenizer.num_special_tokens(), NUM_SPECIAL);
}

// =============================================================================
// Special id range
// =============================================================================

#[test]
fn test_special_range_predicate() {
    let tokenizer = create_tokenizer();
    for id in 0..NUM_SPECIAL {
        assert!(tokenizer.is_special_token(id), "id {id} should be special");
    }
    for id in NUM_SPECIAL..NUM_SPECIAL + 300 {
        assert!(!tokenizer.is_special_token(id), "id {id} should be ordinary");
    }
}

// =============================================================================
// Batch operations
// =============================================================================

#[test]
fn test_encode_batch_matches_individual() {
    let tokenizer = create_tokenizer();
    let texts: Vec<String> = ["the", "", "thing", "for the record", "zzz"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let batch = tokenizer.encode_batch(&texts, false, false);
    assert_eq!(batch.len(), texts.len());
    for (text, ids) in texts.iter().zip(&batch) {
        assert_eq!(ids, &tokenizer.encode(text, false, false));
    }
}

#[test]
fn test_decode_batch_matches_individual() {
    let tokenizer = create_tokenizer();
    let texts: Vec<String> = ["the", "", "thinking"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let batch = tokenizer.encode_batch(&texts, true, true);

    let decoded = tokenizer
        .decode_batch(&batch, SpecialTokenPolicy::Ignore)
        .unwrap();
    assert_eq!(decoded, texts);
}

#[test]
fn test_count_tokens() {
    let tokenizer = create_tokenizer();
    for text in ["", "the", "for the record", "qqq"] {
        assert_eq!(
            tokenizer.count_tokens(text),
            tokenizer.encode(text, false, false).len()
        );
    }
}

// =============================================================================
// Merge determinism
// =============================================================================

#[test]
fn test_merge_table_order() {
    let tokenizer = create_tokenizer();
    let priorities: Vec<u32> = tokenizer.merges().iter().map(|m| m.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort_unstable();
    assert_eq!(priorities, sorted, "merge table must be sorted by priority");

    // ("t","h") at 256 comes before the merge derived from "the" at 260.
    let first = tokenizer.merges().iter().next().unwrap();
    assert_eq!((first.first.as_slice(), first.second.as_slice()), (b"t".as_slice(), b"h".as_slice()));
    assert_eq!(first.priority, 256);
    assert!(tokenizer.merges().iter().any(|m| m.priority == 260));
}

#[test]
fn test_first_valid_split_parity() {
    // "he" is itself an entry, so "the" derives ("t","he") at split 1; after
    // ("t","h") fires the sequence [th, e] matches no derived merge. The
    // reference behaves identically and this must not be "fixed".
    let tokenizer = create_tokenizer();
    let the = tokenizer
        .merges()
        .iter()
        .find(|m| m.priority == 260)
        .unwrap();
    assert_eq!(the.first, b"t");
    assert_eq!(the.second, b"he");

    let ids = tokenizer.encode("the", false, false);
    assert_eq!(ids, vec![256 + NUM_SPECIAL, b'e' as u32 + NUM_SPECIAL]);
}

#[test]
fn test_two_stage_merge_collapses_to_one_token() {
    // "ing" derives ("in","g") because "ng" is not an entry: ("i","n") at
    // priority 259 fires first, then ("in","g") at 261, one final token.
    let tokenizer = create_tokenizer();
    let ids = tokenizer.encode("ing", false, false);
    assert_eq!(ids, vec![261 + NUM_SPECIAL]);
}

#[test]
fn test_unsplittable_token_contributes_no_merge() {
    // No split of "tion" has both halves in the vocabulary, so rank 262
    // appears in no merge and "tion" never collapses fully.
    let tokenizer = create_tokenizer();
    assert!(tokenizer.merges().iter().all(|m| m.priority != 262));
    let ids = tokenizer.encode("tion", false, false);
    assert!(ids.len() > 1);
}

// =============================================================================
// Decode policies
// =============================================================================

#[test]
fn test_decode_policy_scenario() {
    let tokenizer = create_tokenizer();
    // id 65 is ordinary: rank 46, the single byte '.'.
    let ids = [1u32, 65, 2];

    let ignored = tokenizer.decode(&ids, SpecialTokenPolicy::Ignore).unwrap();
    assert_eq!(ignored, ".");

    let kept = tokenizer.decode(&ids, SpecialTokenPolicy::Keep).unwrap();
    assert_eq!(kept, "<s>.</s>");

    let raised = tokenizer.decode(&ids, SpecialTokenPolicy::Raise);
    assert!(matches!(
        raised,
        Err(TokenizerError::SpecialTokenEncountered(1))
    ));
}

#[test]
fn test_stringify_is_keep() {
    let tokenizer = create_tokenizer();
    let mut ids = tokenizer.encode("the", true, true);
    ids.push(tokenizer.pad_id());
    assert_eq!(
        tokenizer.stringify(&ids),
        tokenizer.decode(&ids, SpecialTokenPolicy::Keep).unwrap()
    );
    assert!(tokenizer.stringify(&ids).ends_with("<pad>"));
}

#[test]
fn test_unnamed_in_range_id_gets_placeholder() {
    let config = TokenizerConfig {
        vocab_size: 512,
        num_special_tokens: 25,
        pattern: String::new(),
        version: "v3".to_string(),
    };
    let tokenizer = Tokenizer::new(
        test_vocabulary(),
        config,
        SpecialTokenRegistry::canonical(25),
    )
    .unwrap();

    assert!(tokenizer.is_special_token(22));
    let kept = tokenizer.decode(&[22], SpecialTokenPolicy::Keep).unwrap();
    assert_eq!(kept, "<SPECIAL_22>");
}

// =============================================================================
// Strategy parity
// =============================================================================

#[test]
fn test_accelerated_strategy_parity() {
    let baseline = create_tokenizer();
    let accelerated = create_tokenizer().accelerated(true);
    let cases = [
        "",
        "the",
        "ing",
        "thinking",
        "the thing in the thing",
        "forthright information",
        "no merges here: qqq",
    ];
    for text in cases {
        assert_eq!(
            baseline.encode(text, false, false),
            accelerated.encode(text, false, false),
            "strategies diverged on {text:?}"
        );
    }
}

// =============================================================================
// Model file loading
// =============================================================================

fn write_model_file(dir: &std::path::Path, name: &str) -> std::path::PathBuf {
    use base64::{engine::general_purpose::STANDARD, Engine};

    let mut vocab = Vec::new();
    for b in 0u32..=255 {
        vocab.push(serde_json::json!({
            "token_bytes": STANDARD.encode([b as u8]),
            "rank": b,
        }));
    }
    for (word, rank) in WORDS {
        vocab.push(serde_json::json!({
            "token_bytes": STANDARD.encode(word.as_bytes()),
            "rank": rank,
        }));
    }
    let model = serde_json::json!({
        "config": {
            "default_vocab_size": 512,
            "default_num_special_tokens": NUM_SPECIAL,
            "pattern": "\\S+|\\s+",
            "version": "v3",
        },
        "vocab": vocab,
    });

    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(&model).unwrap()).unwrap();
    path
}

#[test]
fn test_load_model_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_model_file(dir.path(), "tekken_test.json");

    let tokenizer = from_model_file(&path).unwrap();
    assert_eq!(tokenizer.vocab_size(), 512);
    assert_eq!(tokenizer.num_special_tokens(), NUM_SPECIAL);
    assert_eq!(tokenizer.pattern(), r"\S+|\s+");

    let reference = create_tokenizer();
    for text in ["the", "thinking", "for the record"] {
        assert_eq!(
            tokenizer.encode(text, true, true),
            reference.encode(text, true, true)
        );
    }
}

#[test]
fn test_from_pretrained_resolves_release_file() {
    let dir = tempfile::tempdir().unwrap();
    write_model_file(dir.path(), "tekken_240911.json");

    let tokenizer = from_pretrained(dir.path(), "240911").unwrap();
    assert_eq!(tokenizer.version(), "v3");

    // The other release file is absent.
    let missing = from_pretrained(dir.path(), "240718");
    assert!(matches!(missing, Err(TokenizerError::ModelNotFound(_))));

    // Unknown tags fail before touching the filesystem.
    let unknown = from_pretrained(dir.path(), "latest");
    assert!(matches!(unknown, Err(TokenizerError::UnknownPretrained(_))));
}
