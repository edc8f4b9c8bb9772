use engine::{build_index, CatalogEntry, PackageType};
use proptest::prelude::*;

const WORDS: &[&str] = &["beach", "resort", "spa", "goa", "villa", "the", "hill", "lake", "of", "palace", "pool"];

fn corpus_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::collection::vec(prop::sample::select(WORDS), 0..6), 1..12)
        .prop_map(|docs| docs.into_iter().map(|d| d.join(" ")).collect())
}

fn entries(texts: &[String]) -> Vec<CatalogEntry> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| CatalogEntry::new(i.to_string(), PackageType::Standard, "Pune", "", t.as_str(), 1.0))
        .collect()
}

proptest! {
    #[test]
    fn rows_are_unit_or_zero(texts in corpus_strategy()) {
        let index = build_index(entries(&texts)).unwrap();
        let w = index.weights();
        for i in 0..w.num_rows() {
            let norm = w.norm(i);
            prop_assert!(w.row(i).is_empty() || (norm - 1.0).abs() < 1e-9);
            prop_assert!(w.row(i).iter().all(|tw| tw.weight >= 0.0));
        }
    }

    #[test]
    fn similarity_is_symmetric_with_unit_diagonal(texts in corpus_strategy()) {
        let index = build_index(entries(&texts)).unwrap();
        let sim = index.similarity();
        let w = index.weights();
        for i in 0..sim.len() {
            let expected = if w.row(i).is_empty() { 0.0 } else { 1.0 };
            prop_assert_eq!(sim.get(i, i), expected);
            for j in 0..sim.len() {
                prop_assert_eq!(sim.get(i, j), sim.get(j, i));
                prop_assert!(!sim.get(i, j).is_nan());
                prop_assert!(sim.get(i, j) <= 1.0 + 1e-9);
            }
        }
    }

    #[test]
    fn rebuild_is_idempotent(texts in corpus_strategy()) {
        let a = build_index(entries(&texts)).unwrap();
        let b = build_index(entries(&texts)).unwrap();
        prop_assert_eq!(a.similarity(), b.similarity());
    }
}
