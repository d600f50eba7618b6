//! The `{data, error}` result envelope every wrapper call returns.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{CheckoutError, FaultKind};

/// Normalized result of one outbound call.
///
/// Exactly one of [`data`](Envelope::data) and [`error`](Envelope::error) is
/// present. The envelope is built from a `Result`, so the other branch is
/// unrepresentable.
#[derive(Debug)]
pub struct Envelope<T>(Result<T, CheckoutError>);

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self(Ok(data))
    }

    pub fn err(error: CheckoutError) -> Self {
        Self(Err(error))
    }

    pub fn data(&self) -> Option<&T> {
        self.0.as_ref().ok()
    }

    pub fn error(&self) -> Option<&CheckoutError> {
        self.0.as_ref().err()
    }

    pub fn is_ok(&self) -> bool {
        self.0.is_ok()
    }

    pub fn is_err(&self) -> bool {
        self.0.is_err()
    }

    pub fn into_data(self) -> Option<T> {
        self.0.ok()
    }

    pub fn into_result(self) -> Result<T, CheckoutError> {
        self.0
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Envelope<U> {
        Envelope(self.0.map(f))
    }

    /// Collapse into the `{success, data}` shape. The fault is dropped.
    pub fn into_outcome(self) -> Outcome<T> {
        match self.0 {
            Ok(data) => Outcome {
                success: true,
                data: Some(data),
            },
            Err(_) => Outcome {
                success: false,
                data: None,
            },
        }
    }
}

impl<T> From<Result<T, CheckoutError>> for Envelope<T> {
    fn from(result: Result<T, CheckoutError>) -> Self {
        Self(result)
    }
}

impl<T> From<Envelope<T>> for Result<T, CheckoutError> {
    fn from(envelope: Envelope<T>) -> Self {
        envelope.0
    }
}

/// Serialized form of a fault inside an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: FaultKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&CheckoutError> for ErrorBody {
    fn from(error: &CheckoutError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            status: error.status(),
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRepr<'a, T> {
    data: Option<&'a T>,
    error: Option<ErrorBody>,
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EnvelopeRepr {
            data: self.data(),
            error: self.error().map(ErrorBody::from),
        }
        .serialize(serializer)
    }
}

/// The `{success, data}` variant of the envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub success: bool,
    pub data: Option<T>,
}
