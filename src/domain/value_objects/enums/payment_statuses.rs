use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Status vocabulary observed from the PIX gateway. The gateway owns the
/// vocabulary, so unknown strings are preserved verbatim instead of being
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Approved,
    Expired,
    InProcess,
    Canceled,
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Expired => "expired",
            PaymentStatus::InProcess => "in_process",
            PaymentStatus::Canceled => "canceled",
            PaymentStatus::Other(status) => status.as_str(),
        }
    }

    pub fn from_str(status: &str) -> Self {
        match status {
            "pending" => PaymentStatus::Pending,
            "approved" => PaymentStatus::Approved,
            "expired" => PaymentStatus::Expired,
            "in_process" => PaymentStatus::InProcess,
            "canceled" => PaymentStatus::Canceled,
            other => PaymentStatus::Other(other.to_string()),
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, PaymentStatus::Approved)
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, PaymentStatus::Expired)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(PaymentStatus::from_str(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_round_trip() {
        for raw in ["pending", "approved", "expired", "in_process", "canceled"] {
            assert_eq!(PaymentStatus::from_str(raw).as_str(), raw);
        }
    }

    #[test]
    fn unknown_status_is_preserved_verbatim() {
        let status = PaymentStatus::from_str("charged_back");
        assert_eq!(status, PaymentStatus::Other("charged_back".to_string()));
        assert_eq!(status.as_str(), "charged_back");
        assert!(!status.is_approved());
    }
}
