use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::Error;

/// One page of a provider stream. `continuation == None` ends the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedList<T> {
    pub continuation: Option<String>,
    pub items: Vec<T>,
}

impl<T> PaginatedList<T> {
    pub fn new(continuation: Option<String>, items: Vec<T>) -> Self {
        PaginatedList {
            continuation,
            items,
        }
    }

    pub fn terminal(items: Vec<T>) -> Self {
        PaginatedList {
            continuation: None,
            items,
        }
    }

    pub fn empty() -> Self {
        Self::terminal(Vec::new())
    }

    #[cfg(test)]
    pub fn is_last(&self) -> bool {
        self.continuation.is_none()
    }
}

/// Serializes a provider-specific cursor into an opaque token.
pub fn encode_continuation<C: Serialize>(
    continuation: &C,
) -> Result<String, Error> {
    Ok(serde_json::to_string(continuation)?)
}

pub fn decode_continuation<C: DeserializeOwned>(
    continuation: Option<&str>,
) -> Result<Option<C>, Error> {
    match continuation {
        Some(token) => serde_json::from_str(token)
            .map(Some)
            .map_err(|e| Error::InvalidContinuation(format!("{}: {}", token, e))),
        None => Ok(None),
    }
}

/// Cursor of a table read in ascending `Id` order.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KeysetContinuation {
    pub id: i64,
}

impl KeysetContinuation {
    pub fn after_id(continuation: Option<&str>) -> Result<i64, Error> {
        Ok(decode_continuation::<KeysetContinuation>(continuation)?
            .unwrap_or_default()
            .id)
    }

    /// A page shorter than `limit` is the last one.
    pub fn next(
        last_id: Option<i64>,
        count: usize,
        limit: i64,
    ) -> Result<Option<String>, Error> {
        match last_id {
            Some(id) if count as i64 >= limit => {
                Ok(Some(encode_continuation(&KeysetContinuation { id })?))
            },
            _ => Ok(None),
        }
    }
}

/// Cursor of an offset-paginated read.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SkipContinuation {
    pub skip: i64,
}

impl SkipContinuation {
    pub fn skip(continuation: Option<&str>) -> Result<i64, Error> {
        Ok(decode_continuation::<SkipContinuation>(continuation)?
            .unwrap_or_default()
            .skip)
    }

    pub fn next(skip: i64, count: usize, limit: i64) -> Result<Option<String>, Error> {
        if count == 0 || (count as i64) < limit {
            return Ok(None);
        }

        Ok(Some(encode_continuation(&SkipContinuation {
            skip: skip + count as i64,
        })?))
    }
}
