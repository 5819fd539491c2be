//! Topic modeling: TF-IDF vectors clustered with spherical k-means
//!
//! Everything is deterministic: the vocabulary is sorted, seeds are chosen by
//! farthest-point traversal starting from the first document, and ties break
//! toward the lower index.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Topic id given to documents with no tokens
pub const OUTLIER_TOPIC: i32 = -1;

const MAX_ITERATIONS: usize = 50;
const LABEL_TERMS: usize = 3;
const KEPT_TERMS: usize = 10;

/// One discovered topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicInfo {
    pub id: i32,
    /// `{id}_{w1}_{w2}_{w3}`
    pub label: String,
    /// Number of documents assigned
    pub size: usize,
    /// Highest-weighted terms with their centroid weight
    pub terms: Vec<(String, f64)>,
}

/// Result of fitting topics to a corpus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicModel {
    /// Topic per document, `-1` for outliers
    pub assignments: Vec<i32>,
    /// Cosine similarity of each document to its topic centroid
    pub probabilities: Vec<f64>,
    /// Topics ordered by id (largest first)
    pub topics: Vec<TopicInfo>,
}

impl TopicModel {
    /// Label of a topic id
    pub fn label(&self, topic: i32) -> String {
        self.topics
            .iter()
            .find(|t| t.id == topic)
            .map_or_else(|| format!("{topic}_outlier"), |t| t.label.clone())
    }
}

/// Smoothed TF-IDF with L2-normalised rows
struct TfIdf {
    terms: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TfIdf {
    fn fit(docs: &[&Vec<String>]) -> Self {
        let vocabulary: BTreeMap<&str, usize> = docs
            .iter()
            .flat_map(|d| d.iter().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t, i))
            .collect();

        let n_docs = docs.len() as f64;
        let mut doc_freq = vec![0usize; vocabulary.len()];
        for doc in docs {
            let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in unique {
                doc_freq[vocabulary[term]] += 1;
            }
        }
        let idf: Vec<f64> = doc_freq
            .iter()
            .map(|&df| ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let rows = docs
            .iter()
            .map(|doc| {
                let mut row = vec![0.0; vocabulary.len()];
                for term in doc.iter() {
                    row[vocabulary[term.as_str()]] += 1.0;
                }
                let len = doc.len() as f64;
                for (w, idf) in row.iter_mut().zip(&idf) {
                    *w = *w / len * idf;
                }
                normalize(&mut row);
                row
            })
            .collect();

        Self {
            terms: vocabulary.into_keys().map(str::to_string).collect(),
            rows,
        }
    }
}

fn normalize(v: &mut [f64]) {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Index of the centroid most similar to `row`, with its similarity
fn nearest(row: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let sim = dot(row, c);
        if sim > best.1 {
            best = (i, sim);
        }
    }
    best
}

fn farthest_point_seeds(rows: &[Vec<f64>], k: usize) -> Vec<Vec<f64>> {
    let mut seeds = vec![rows[0].clone()];
    let mut closest: Vec<f64> = rows.iter().map(|r| dot(r, &rows[0])).collect();

    while seeds.len() < k {
        let (next, _) = closest
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (i, &sim)| {
                if sim < best.1 { (i, sim) } else { best }
            });
        let seed = rows[next].clone();
        for (c, r) in closest.iter_mut().zip(rows) {
            *c = c.max(dot(r, &seed));
        }
        seeds.push(seed);
    }
    seeds
}

fn kmeans(rows: &[Vec<f64>], k: usize) -> (Vec<usize>, Vec<Vec<f64>>) {
    let mut centroids = farthest_point_seeds(rows, k);
    let mut assignments: Vec<usize> = rows.iter().map(|r| nearest(r, &centroids).0).collect();

    for _ in 0..MAX_ITERATIONS {
        let dims = rows[0].len();
        let mut sums = vec![vec![0.0; dims]; k];
        for (row, &cluster) in rows.iter().zip(&assignments) {
            for (s, x) in sums[cluster].iter_mut().zip(row) {
                *s += x;
            }
        }
        for (centroid, mut sum) in centroids.iter_mut().zip(sums) {
            if sum.iter().any(|x| x.abs() > 0.0) {
                normalize(&mut sum);
                *centroid = sum;
            }
        }

        let next: Vec<usize> = rows.iter().map(|r| nearest(r, &centroids).0).collect();
        if next == assignments {
            break;
        }
        assignments = next;
    }

    (assignments, centroids)
}

fn automatic_topic_count(documents: usize) -> usize {
    ((documents as f64 / 2.0).sqrt().round() as usize).max(1)
}

/// Assign every document to a topic
///
/// `docs` are lemma lists. With `n_topics = None` the count is
/// `max(1, round(sqrt(n / 2)))` over the non-empty documents; it never
/// exceeds that number of documents.
pub fn generate_topics(docs: &[Vec<String>], n_topics: Option<usize>) -> TopicModel {
    let mut model = TopicModel {
        assignments: vec![OUTLIER_TOPIC; docs.len()],
        probabilities: vec![0.0; docs.len()],
        topics: Vec::new(),
    };

    let indexed: Vec<(usize, &Vec<String>)> =
        docs.iter().enumerate().filter(|(_, d)| !d.is_empty()).collect();
    if indexed.is_empty() {
        return model;
    }

    let bodies: Vec<&Vec<String>> = indexed.iter().map(|(_, d)| *d).collect();
    let tfidf = TfIdf::fit(&bodies);
    let k = n_topics
        .unwrap_or_else(|| automatic_topic_count(bodies.len()))
        .clamp(1, bodies.len());

    let (clusters, centroids) = kmeans(&tfidf.rows, k);

    let mut sizes: HashMap<usize, usize> = HashMap::new();
    for &c in &clusters {
        *sizes.entry(c).or_default() += 1;
    }
    let mut order: Vec<usize> = sizes.keys().copied().collect();
    order.sort_by(|a, b| sizes[b].cmp(&sizes[a]).then(a.cmp(b)));
    let renumber: HashMap<usize, i32> = order
        .iter()
        .enumerate()
        .map(|(id, &cluster)| (cluster, id as i32))
        .collect();

    for (((doc_index, _), &cluster), row) in indexed.iter().zip(&clusters).zip(&tfidf.rows) {
        model.assignments[*doc_index] = renumber[&cluster];
        model.probabilities[*doc_index] = dot(row, &centroids[cluster]).clamp(0.0, 1.0);
    }

    model.topics = order
        .iter()
        .map(|&cluster| {
            let id = renumber[&cluster];
            let mut weighted: Vec<(String, f64)> = tfidf
                .terms
                .iter()
                .cloned()
                .zip(centroids[cluster].iter().copied())
                .filter(|(_, w)| *w > 0.0)
                .collect();
            weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            weighted.truncate(KEPT_TERMS);

            let mut label = id.to_string();
            for (term, _) in weighted.iter().take(LABEL_TERMS) {
                label.push('_');
                label.push_str(term);
            }

            TopicInfo {
                id,
                label,
                size: sizes[&cluster],
                terms: weighted,
            }
        })
        .collect();

    model
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(words: &str) -> Vec<String> {
        words.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_two_clear_topics() {
        let docs = vec![
            doc("cricket match win"),
            doc("stock market rally"),
            doc("cricket match team"),
            doc("stock market fall"),
        ];
        let model = generate_topics(&docs, Some(2));

        assert_eq!(model.assignments[0], model.assignments[2]);
        assert_eq!(model.assignments[1], model.assignments[3]);
        assert_ne!(model.assignments[0], model.assignments[1]);
        assert_eq!(model.topics.len(), 2);
        assert!(model.topics.iter().all(|t| t.size == 2));

        let cricket = model.label(model.assignments[0]);
        assert!(cricket.ends_with("_cricket_match_team"), "{cricket}");
        assert!(model.probabilities.iter().all(|p| *p > 0.5 && *p <= 1.0));
    }

    #[test]
    fn test_topics_numbered_by_size() {
        let docs = vec![
            doc("election vote"),
            doc("rain flood"),
            doc("rain flood storm"),
            doc("rain storm"),
        ];
        let model = generate_topics(&docs, Some(2));
        let rain = model.assignments[1];
        assert_eq!(rain, 0);
        assert_eq!(model.assignments[0], 1);
        assert_eq!(model.topics[0].size, 3);
    }

    #[test]
    fn test_outliers_and_empty_corpus() {
        let model = generate_topics(&[doc(""), doc("budget tax")], None);
        assert_eq!(model.assignments, vec![OUTLIER_TOPIC, 0]);
        assert!(model.probabilities[0].abs() < f64::EPSILON);
        assert_eq!(model.label(OUTLIER_TOPIC), "-1_outlier");

        let empty = generate_topics(&[doc(""), doc("")], None);
        assert_eq!(empty.assignments, vec![OUTLIER_TOPIC, OUTLIER_TOPIC]);
        assert!(empty.topics.is_empty());
    }

    #[test]
    fn test_topic_count() {
        assert_eq!(automatic_topic_count(1), 1);
        assert_eq!(automatic_topic_count(4), 1);
        assert_eq!(automatic_topic_count(18), 3);
        assert_eq!(automatic_topic_count(50), 5);

        // More topics than documents is clamped
        let model = generate_topics(&[doc("a b"), doc("c d")], Some(10));
        assert_eq!(model.topics.len(), 2);
    }

    #[test]
    fn test_deterministic() {
        let docs: Vec<Vec<String>> = (0..12)
            .map(|i| doc(&format!("term{} shared{} common", i % 3, i % 4)))
            .collect();
        assert_eq!(generate_topics(&docs, None), generate_topics(&docs, None));
    }
}
