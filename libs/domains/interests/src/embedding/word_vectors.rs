use async_trait::async_trait;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::EmbeddingProvider;
use crate::error::{InterestError, InterestResult};

/// Averages pre-trained word vectors over the tokens of a text.
///
/// Reads the plain-text format shared by GloVe and word2vec (`--binary 0`):
/// one `word v1 v2 ... vN` entry per line. A word2vec header line
/// (`<count> <dimension>`) is skipped when present.
#[derive(Debug, Clone)]
pub struct WordVectorProvider {
    vectors: HashMap<String, Vec<f32>>,
    dimension: usize,
}

impl WordVectorProvider {
    pub fn load(path: impl AsRef<Path>) -> InterestResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            InterestError::Config(format!("cannot open word vectors {}: {e}", path.display()))
        })?;
        let provider = Self::from_reader(BufReader::new(file))?;

        tracing::info!(
            path = %path.display(),
            words = provider.vectors.len(),
            dimension = provider.dimension,
            "Loaded word vectors"
        );
        Ok(provider)
    }

    pub fn from_reader(reader: impl BufRead) -> InterestResult<Self> {
        let mut vectors = HashMap::new();
        let mut dimension = None;

        for (index, line) in reader.lines().enumerate() {
            let line =
                line.map_err(|e| InterestError::Config(format!("reading word vectors: {e}")))?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };

            let values = parts
                .map(str::parse::<f32>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| {
                    InterestError::Config(format!("word vectors line {}: {e}", index + 1))
                })?;

            // word2vec header: "<vocab size> <dimension>"
            if index == 0 && values.len() == 1 && word.parse::<usize>().is_ok() {
                continue;
            }

            match dimension {
                None => dimension = Some(values.len()),
                Some(d) if d != values.len() => {
                    return Err(InterestError::Config(format!(
                        "word vectors line {} has {} values, expected {d}",
                        index + 1,
                        values.len()
                    )));
                }
                Some(_) => {}
            }

            vectors.insert(word.to_lowercase(), values);
        }

        match dimension {
            Some(dimension) if dimension > 0 => Ok(Self { vectors, dimension }),
            _ => Err(InterestError::Config(
                "word vectors file is empty".to_string(),
            )),
        }
    }

    pub fn from_vectors(vectors: HashMap<String, Vec<f32>>, dimension: usize) -> Self {
        Self { vectors, dimension }
    }

    /// Mean of the vectors of known tokens; zero when none are known.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut sum = vec![0.0f32; self.dimension];
        let mut known = 0usize;

        for token in tokenize(text) {
            if let Some(vector) = self.vectors.get(&token) {
                for (acc, value) in sum.iter_mut().zip(vector) {
                    *acc += value;
                }
                known += 1;
            }
        }

        if known > 0 {
            let count = known as f32;
            for value in &mut sum {
                *value /= count;
            }
        }
        sum
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl EmbeddingProvider for WordVectorProvider {
    fn name(&self) -> &'static str {
        "word-vectors"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> InterestResult<Vec<f32>> {
        Ok(self.embed_sync(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const GLOVE: &str = "chess 1.0 0.0 0.0\nboard 0.0 1.0 0.0\ncooking 0.0 0.0 1.0\n";

    fn provider() -> WordVectorProvider {
        WordVectorProvider::from_reader(Cursor::new(GLOVE)).unwrap()
    }

    #[test]
    fn test_loads_glove_format() {
        let provider = provider();
        assert_eq!(provider.dimension(), 3);
        assert_eq!(provider.embed_sync("chess"), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_skips_word2vec_header() {
        let text = format!("3 3\n{GLOVE}");
        let provider = WordVectorProvider::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(provider.dimension(), 3);
    }

    #[test]
    fn test_averages_known_tokens_case_insensitively() {
        assert_eq!(
            provider().embed_sync("Chess-Board club"),
            vec![0.5, 0.5, 0.0]
        );
    }

    #[test]
    fn test_unknown_or_blank_text_is_zero() {
        let provider = provider();
        assert_eq!(provider.embed_sync("knitting"), vec![0.0; 3]);
        assert_eq!(provider.embed_sync("   "), vec![0.0; 3]);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err = WordVectorProvider::from_reader(Cursor::new("a 1 2\nb 1\n")).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_rejects_empty_file() {
        assert!(WordVectorProvider::from_reader(Cursor::new("")).is_err());
    }
}
