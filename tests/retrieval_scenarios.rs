// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use huddle::embedding::{split_sentences, ChunkConfig, HashingProvider, SentenceChunker};
use huddle::{Retriever, RetrieverConfig, RetrieverError, EMPTY_SOURCE};

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn retriever_with(max_chars: usize) -> Retriever {
    Retriever::new(
        Box::new(HashingProvider::new(256)),
        RetrieverConfig::default().with_max_chars(max_chars),
    )
    .unwrap()
}

#[test]
fn single_short_file_yields_one_chunk() {
    let dir = TempDir::new().unwrap();
    let text = "The QB threw deep. He was pressured. The pass fell incomplete.";
    write_file(&dir.path().join("recap.txt"), text);

    let retriever = retriever_with(1200);
    let summary = retriever.build(dir.path()).unwrap();
    assert_eq!(summary.files, 1);
    assert_eq!(summary.chunks, 1);

    let chunks = retriever.chunks();
    assert_eq!(chunks[0].source, "recap.txt");
    assert_eq!(chunks[0].text, text);
}

#[test]
fn long_file_of_short_sentences_is_split_on_sentence_boundaries() {
    let dir = TempDir::new().unwrap();
    let mut text = String::new();
    let mut n = 0;
    while text.len() < 3000 {
        text.push_str(&format!("Play {:03} was a run. ", n));
        n += 1;
    }
    write_file(&dir.path().join("log.txt"), &text);

    let retriever = retriever_with(100);
    retriever.build(dir.path()).unwrap();
    let chunks = retriever.chunks();

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.text.chars().count() <= 120);
        assert!(chunk.text.starts_with("Play "));
        assert!(chunk.text.ends_with("was a run."));
    }

    let rejoined: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(rejoined.join(" "), split_sentences(&text).join(" "));
    assert_eq!(retriever.len(), retriever.matrix_rows());
}

#[test]
fn empty_directory_searches_return_sentinel() {
    let dir = TempDir::new().unwrap();
    let retriever = retriever_with(1200);

    let summary = retriever.build(dir.path()).unwrap();
    assert_eq!(summary.files, 0);
    assert_eq!(summary.chunks, 1);

    let hits = retriever.search("who should I start at flex", 3).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].chunk.source, EMPTY_SOURCE);
    assert!(hits[0].chunk.is_sentinel());
}

#[test]
fn missing_directory_behaves_like_empty() {
    let dir = TempDir::new().unwrap();
    let retriever = retriever_with(1200);

    let summary = retriever.build(dir.path().join("does-not-exist")).unwrap();
    assert_eq!(summary.chunks, 1);
    assert!(retriever.chunks()[0].is_sentinel());
}

#[test]
fn matching_document_ranks_above_unrelated_one() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir.path().join("a.txt"),
        "Justin Jefferson leads the league in receiving yards.",
    );
    write_file(
        &dir.path().join("b.txt"),
        "The stadium parking lots open four hours before kickoff.",
    );

    let retriever = retriever_with(1200);
    retriever.build(dir.path()).unwrap();

    let hits = retriever
        .search("Justin Jefferson leads the league in receiving yards.", 1)
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].chunk.source, "a.txt");
    assert!(hits[0].score > 0.99);

    let all = retriever.search("receiving yards", 10).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn only_top_level_text_files_are_indexed() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("news.txt"), "Trade deadline is Tuesday.");
    write_file(&dir.path().join("roster.csv"), "name,pos\nAllen,QB\n");
    write_file(&dir.path().join("archive").join("old.txt"), "Last season.");
    fs::write(dir.path().join("garbled.txt"), b"Bye week \xfe\xff ahead. Plan now.").unwrap();

    let retriever = retriever_with(1200);
    let summary = retriever.build(dir.path()).unwrap();
    assert_eq!(summary.files, 2);

    let sources: Vec<String> = retriever.chunks().into_iter().map(|c| c.source).collect();
    assert_eq!(sources, vec!["garbled.txt", "news.txt"]);
}

#[cfg(unix)]
#[test]
fn build_continues_past_unreadable_file() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("depth.txt"), "Kelce is the top tight end.");
    let locked = dir.path().join("private.txt");
    write_file(&locked, "Trade talks are ongoing.");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read(&locked).is_ok() {
        // Running with privileges that bypass file modes.
        return;
    }

    let retriever = retriever_with(1200);
    let summary = retriever.build(dir.path()).unwrap();
    assert_eq!(summary.files, 1);

    let hits = retriever.search("tight end", 5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].chunk.source, "depth.txt");
}

#[test]
fn independent_retrievers_do_not_share_state() {
    let first = TempDir::new().unwrap();
    write_file(&first.path().join("a.txt"), "First corpus.");
    let second = TempDir::new().unwrap();
    write_file(&second.path().join("b.txt"), "Second corpus. More text.");

    let one = retriever_with(1200);
    let two = retriever_with(10);
    one.build(first.path()).unwrap();

    assert_eq!(one.len(), 1);
    assert!(matches!(two.search("corpus", 1), Err(RetrieverError::NotBuilt)));

    two.build(second.path()).unwrap();
    assert_eq!(two.len(), 2);
    assert_eq!(one.chunks()[0].source, "a.txt");
}

#[test]
fn chunker_is_usable_standalone() {
    let chunker = SentenceChunker::new(ChunkConfig::new(30).unwrap());
    let chunks = chunker.chunk_text("Start Bijan. Sit the rookie! Who else? Nobody.");
    assert_eq!(chunks, vec!["Start Bijan. Sit the rookie!", "Who else? Nobody."]);
}
