//! Strict decoding of string-encoded embeddings such as `"[0.1, -0.2, 0.3]"`.

use ndarray::Array1;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmbeddingDecodeError {
    #[error("embedding must be enclosed in '[' and ']'")]
    MissingBrackets,

    #[error("embedding has no elements")]
    Empty,

    #[error("embedding element {index} is empty")]
    EmptyElement { index: usize },

    #[error("embedding element {index} is not a number: '{token}'")]
    InvalidNumber { index: usize, token: String },
}

/// Decode a bracketed, comma-separated list of floats.
///
/// `nan` and `inf` tokens decode successfully; callers decide whether such
/// vectors may take part in ranking.
pub fn decode_embedding(raw: &str) -> Result<Array1<f64>, EmbeddingDecodeError> {
    let inner = raw
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or(EmbeddingDecodeError::MissingBrackets)?;

    if inner.trim().is_empty() {
        return Err(EmbeddingDecodeError::Empty);
    }

    let values = inner
        .split(',')
        .enumerate()
        .map(|(index, token)| {
            let token = token.trim();
            if token.is_empty() {
                return Err(EmbeddingDecodeError::EmptyElement { index });
            }
            token
                .parse::<f64>()
                .map_err(|_| EmbeddingDecodeError::InvalidNumber {
                    index,
                    token: token.to_string(),
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    Ok(Array1::from(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_list() {
        let v = decode_embedding("[0.1, -0.2, 3e-2]").unwrap();
        assert_eq!(v.to_vec(), vec![0.1, -0.2, 0.03]);
    }

    #[test]
    fn test_decode_tolerates_outer_whitespace() {
        let v = decode_embedding("  [1,2]\n").unwrap();
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn test_decode_rejects_missing_brackets() {
        assert_eq!(
            decode_embedding("0.1, 0.2"),
            Err(EmbeddingDecodeError::MissingBrackets)
        );
        assert_eq!(
            decode_embedding("[0.1, 0.2"),
            Err(EmbeddingDecodeError::MissingBrackets)
        );
    }

    #[test]
    fn test_decode_rejects_empty_and_trailing_comma() {
        assert_eq!(decode_embedding("[ ]"), Err(EmbeddingDecodeError::Empty));
        assert_eq!(
            decode_embedding("[0.1, ]"),
            Err(EmbeddingDecodeError::EmptyElement { index: 1 })
        );
    }

    #[test]
    fn test_decode_rejects_garbage_token() {
        match decode_embedding("[0.1, abc]") {
            Err(EmbeddingDecodeError::InvalidNumber { index, token }) => {
                assert_eq!(index, 1);
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_decode_error_messages() {
        assert_eq!(
            EmbeddingDecodeError::EmptyElement { index: 2 }.to_string(),
            "embedding element 2 is empty"
        );
        assert_eq!(
            decode_embedding("[1, x]").unwrap_err().to_string(),
            "embedding element 1 is not a number: 'x'"
        );
    }

    #[test]
    fn test_decode_keeps_nan() {
        let v = decode_embedding("[nan, 0.5]").unwrap();
        assert!(v[0].is_nan());
        assert_eq!(v[1], 0.5);
    }
}
