//! End-to-end citation pipeline tests: extract, dedupe, sort, format.

use hermes_tools::{
    dedupe_citations, extract_citations, format_citations, insert_citation_markers,
    sort_citations, CitationOrder, SearchHit,
};

fn three_scored_hits() -> Vec<SearchHit> {
    vec![
        SearchHit::new("First", "https://one.example.com")
            .with_score(0.95)
            .with_snippet("alpha snippet"),
        SearchHit::new("Second", "https://two.example.com")
            .with_score(0.88)
            .with_snippet("beta snippet"),
        SearchHit::new("Third", "https://three.example.com")
            .with_score(0.72)
            .with_snippet("gamma snippet"),
    ]
}

#[test]
fn relevance_order_matches_scores() {
    let mut citations = extract_citations(&three_scored_hits());
    // shuffle the input order before sorting
    citations.swap(0, 2);
    sort_citations(&mut citations, CitationOrder::Relevance);

    let titles: Vec<&str> = citations.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second", "Third"]);
    let scores: Vec<f64> = citations.iter().filter_map(|c| c.score).collect();
    assert_eq!(scores, vec![0.95, 0.88, 0.72]);
}

#[test]
fn empty_input_formats_to_empty_string() {
    assert_eq!(format_citations(&[]), "");
}

#[test]
fn full_pipeline_search_to_annotated_answer() {
    let hits = vec![
        SearchHit::new("Climate Report 2026 - UN News", "https://news.un.org/report/")
            .with_score(0.9)
            .with_snippet("global temperatures rose again"),
        SearchHit::new("Climate Report 2026", "https://news.un.org/report")
            .with_score(0.8)
            .with_author("UN Panel"),
        SearchHit::new("Background", "https://example.com/blog/climate")
            .with_score(0.5)
            .with_snippet("historical context for the data"),
    ];

    let citations = dedupe_citations(extract_citations(&hits));
    assert_eq!(citations.len(), 2);
    assert_eq!(citations[0].title, "Climate Report 2026");
    assert_eq!(citations[0].authors, vec!["UN Panel"]);

    let answer = "Recent data shows global temperatures rose again, with \
                  historical context for the data available elsewhere.";
    let annotated = insert_citation_markers(answer, &citations);
    assert!(annotated.contains("rose again[1]"));
    assert!(annotated.contains("for the data[2]"));

    let block = format_citations(&citations);
    assert!(block.starts_with("Sources:"));
    assert!(block.contains("[1] Climate Report 2026"));
}

#[test]
fn dedupe_is_idempotent_over_mixed_input() {
    let hits = vec![
        SearchHit::new("A", "https://a.com/x/").with_author("One"),
        SearchHit::new("A again", "https://a.com/x").with_author("Two"),
        SearchHit::new("B", "https://b.com"),
        SearchHit::new("B", "https://b.com/"),
    ];
    let once = dedupe_citations(extract_citations(&hits));
    let twice = dedupe_citations(once.clone());

    assert_eq!(once.len(), 2);
    assert_eq!(twice.len(), 2);
    for (a, b) in once.iter().zip(twice.iter()) {
        assert_eq!(a.url, b.url);
        assert_eq!(a.title, b.title);
        assert_eq!(a.authors, b.authors);
    }
}
