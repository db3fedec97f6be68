use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Serializes any `Display` enum as its query-string token.
macro_rules! serialize_as_token {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }
        )+
    };
}

fn invalid(field: &str, value: &str) -> CoreError {
    CoreError::InvalidInput(field.to_string(), value.to_string())
}

/// Which enrollment milestone anchors a report's from/to bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Submitted,
    WelcomeCall,
    /// The first cleared payment, falling back to the second then first scheduled payment.
    Payment,
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DateField::Submitted => "submitted",
            DateField::WelcomeCall => "welcome_call",
            DateField::Payment => "payment",
        })
    }
}

impl FromStr for DateField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(DateField::Submitted),
            "welcome_call" => Ok(DateField::WelcomeCall),
            "payment" => Ok(DateField::Payment),
            other => Err(invalid("date_field", other)),
        }
    }
}

/// Enrollment-status filter: derived buckets or an exact stored status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentStatusFilter {
    /// Neither cancelled nor NSF.
    Active,
    Cancels,
    Nsfs,
    /// Not cancelled, regardless of NSF.
    NotClosed,
    Exact(String),
}

impl fmt::Display for EnrollmentStatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrollmentStatusFilter::Active => f.write_str("active"),
            EnrollmentStatusFilter::Cancels => f.write_str("cancels"),
            EnrollmentStatusFilter::Nsfs => f.write_str("nsfs"),
            EnrollmentStatusFilter::NotClosed => f.write_str("not_closed"),
            EnrollmentStatusFilter::Exact(status) => f.write_str(status),
        }
    }
}

impl FromStr for EnrollmentStatusFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "active" => EnrollmentStatusFilter::Active,
            "cancels" => EnrollmentStatusFilter::Cancels,
            "nsfs" => EnrollmentStatusFilter::Nsfs,
            "not_closed" => EnrollmentStatusFilter::NotClosed,
            other => EnrollmentStatusFilter::Exact(other.to_string()),
        })
    }
}

/// Lead-report status buckets. These differ from the enrollment buckets:
/// "active" reads the contact status and "not_closed" means never submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeadStatusType {
    #[default]
    All,
    Active,
    Cancels,
    Nsfs,
    NotClosed,
}

impl fmt::Display for LeadStatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LeadStatusType::All => "all",
            LeadStatusType::Active => "active",
            LeadStatusType::Cancels => "cancels",
            LeadStatusType::Nsfs => "nsfs",
            LeadStatusType::NotClosed => "not_closed",
        })
    }
}

impl FromStr for LeadStatusType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(LeadStatusType::All),
            "active" => Ok(LeadStatusType::Active),
            "cancels" => Ok(LeadStatusType::Cancels),
            "nsfs" => Ok(LeadStatusType::Nsfs),
            "not_closed" => Ok(LeadStatusType::NotClosed),
            other => Err(invalid("status_type", other)),
        }
    }
}

/// Has / has-not a ready-to-settle date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyFlag {
    Ready,
    NotReady,
}

impl fmt::Display for ReadyFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReadyFlag::Ready => "ready",
            ReadyFlag::NotReady => "not_ready",
        })
    }
}

impl FromStr for ReadyFlag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(ReadyFlag::Ready),
            "not_ready" => Ok(ReadyFlag::NotReady),
            other => Err(invalid("ready_flag", other)),
        }
    }
}

/// Mutually exclusive settlement states on the negotiator report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiatorReportType {
    /// Ready to settle, no settlement yet.
    Ready,
    /// Neither ready nor settled.
    NotReady,
    Settled,
}

impl fmt::Display for NegotiatorReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NegotiatorReportType::Ready => "ready",
            NegotiatorReportType::NotReady => "not_ready",
            NegotiatorReportType::Settled => "settled",
        })
    }
}

impl FromStr for NegotiatorReportType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(NegotiatorReportType::Ready),
            "not_ready" => Ok(NegotiatorReportType::NotReady),
            "settled" => Ok(NegotiatorReportType::Settled),
            other => Err(invalid("report_type", other)),
        }
    }
}

/// Servicing company, derived from the enrollment plan name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Company {
    Ldr,
    Progress,
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Company::Ldr => "ldr",
            Company::Progress => "progress",
        })
    }
}

impl FromStr for Company {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ldr" => Ok(Company::Ldr),
            "progress" => Ok(Company::Progress),
            _ => Err(invalid("company", s)),
        }
    }
}

/// The terminal enrollment events that have their own report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalEvent {
    Cancel,
    Nsf,
}

impl TerminalEvent {
    /// Prefix used for export file names.
    pub fn slug(self) -> &'static str {
        match self {
            TerminalEvent::Cancel => "cancel",
            TerminalEvent::Nsf => "nsf",
        }
    }
}

impl fmt::Display for TerminalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

serialize_as_token!(
    DateField,
    EnrollmentStatusFilter,
    LeadStatusType,
    ReadyFlag,
    NegotiatorReportType,
    Company,
    TerminalEvent,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_enrollment_status_is_an_exact_match() {
        assert_eq!("active".parse(), Ok(EnrollmentStatusFilter::Active));
        assert_eq!(
            "Graduated".parse(),
            Ok(EnrollmentStatusFilter::Exact("Graduated".into()))
        );
    }

    #[test]
    fn company_is_case_insensitive() {
        assert_eq!("PROGRESS".parse(), Ok(Company::Progress));
        assert!("acme".parse::<Company>().is_err());
    }

    #[test]
    fn tokens_round_trip_through_display() {
        for field in [DateField::Submitted, DateField::WelcomeCall, DateField::Payment] {
            assert_eq!(field.to_string().parse(), Ok(field));
        }
        assert_eq!(serde_json::to_string(&ReadyFlag::NotReady).unwrap(), "\"not_ready\"");
    }
}
