//! Strongly-typed value objects used by domain records.
//!
//! These wrappers enforce basic invariants (e.g., positive identifiers,
//! upper-cased callsigns, validated email) so that once a value reaches the
//! domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateEmail;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided email failed format validation.
    #[error("invalid email address")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Numeric code did not map onto a known enumeration member.
    #[error("unknown {kind} code {code}")]
    UnknownCode { kind: &'static str, code: i32 },
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(Uid, "Internal user identifier assigned by the platform.");
id_newtype!(Cid, "Community member number shown to pilots and controllers.");
id_newtype!(ActivityId, "Unique identifier for a scheduled activity.");
id_newtype!(FacilityId, "Unique identifier for a controller position within an activity.");
id_newtype!(PilotId, "Unique identifier for a pilot sign-up within an activity.");
id_newtype!(TicketId, "Unique identifier for a support ticket.");
id_newtype!(AnnouncementId, "Unique identifier for an announcement.");
id_newtype!(RecordId, "Unique identifier for a controller record entry.");
id_newtype!(ApplicationId, "Unique identifier for a controller application.");
id_newtype!(AuditLogId, "Unique identifier for an audit log entry.");

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(trimmed))
    }

    /// Borrow the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Upper-cased, trimmed radio callsign (e.g. `CCA1234`, `ZBAA_TWR`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Callsign(String);

impl Callsign {
    /// Normalizes the callsign to upper case and rejects empty values.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let inner = NonEmptyString::new(value)?.into_inner().to_uppercase();
        if inner.chars().any(char::is_whitespace) {
            return Err(TypeConstraintError::InvalidValue(format!(
                "callsign `{inner}` contains whitespace"
            )));
        }
        Ok(Self(inner))
    }

    /// Borrow the callsign as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Callsign {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Callsign {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for Callsign {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lower-cased and validated email address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validates and normalizes an email string.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let normalized = email.into().trim().to_lowercase();
        if normalized.validate_email() {
            Ok(Self(normalized))
        } else {
            Err(TypeConstraintError::InvalidEmail)
        }
    }

    /// Borrow the email as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the owned inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for EmailAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Generates an enumeration backed by the integer codes the server uses.
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident = $code:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every member in ascending code order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Integer code exchanged with the server.
            pub const fn code(self) -> i32 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            /// Human readable label.
            pub const fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(code: i32) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok($name::$variant),)+
                    _ => Err(TypeConstraintError::UnknownCode { kind: $kind, code }),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.code()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_i32(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = i32::deserialize(deserializer)?;
                $name::try_from(code).map_err(serde::de::Error::custom)
            }
        }
    };
}

code_enum! {
    /// Controller rating ladder; `Ban` sits below the ordinary member.
    Rating, "rating" {
        Ban = -1 => "Ban",
        Normal = 0 => "Normal",
        Observer = 1 => "Observer",
        Stu1 = 2 => "STU1",
        Stu2 = 3 => "STU2",
        Stu3 = 4 => "STU3",
        Ctr1 = 5 => "CTR1",
        Ctr2 = 6 => "CTR2",
        Ctr3 = 7 => "CTR3",
        Instructor1 = 8 => "Instructor1",
        Instructor2 = 9 => "Instructor2",
        Instructor3 = 10 => "Instructor3",
        Supervisor = 11 => "Supervisor",
        Administrator = 12 => "Administrator",
    }
}

code_enum! {
    /// Lifecycle of a controller application.
    ApplicationStatus, "application status" {
        Submitted = 0 => "Submitted",
        Processing = 1 => "Processing",
        Passed = 2 => "Passed",
        Rejected = 3 => "Rejected",
    }
}

code_enum! {
    /// Category picked when a ticket is opened.
    TicketType, "ticket type" {
        Suggestion = 0 => "Suggestion",
        Bug = 1 => "Bug report",
        Complaint = 2 => "Complaint",
        Praise = 3 => "Praise",
        Other = 4 => "Other",
    }
}

code_enum! {
    /// Kind of entry in a controller's training record.
    ControllerRecordType, "controller record type" {
        Interview = 0 => "Interview",
        Simulator = 1 => "Simulator",
        RatingChange = 2 => "Rating change",
        Training = 3 => "Training",
        UnderMonitorChange = 4 => "Under-monitor change",
        SoloChange = 5 => "Solo change",
        GuestChange = 6 => "Guest change",
        Other = 7 => "Other",
    }
}

code_enum! {
    /// Publishing department of an announcement.
    AnnouncementType, "announcement type" {
        Normal = 0 => "General",
        ControllerCenter = 1 => "ATC center",
        Technical = 2 => "Technical team",
    }
}

/// Byte count rendered with binary units (`512B`, `1.50KB`, `2.00MB`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub const KB: u64 = 1024;
    pub const MB: u64 = 1024 * Self::KB;
    pub const GB: u64 = 1024 * Self::MB;
}

impl Display for ByteSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let size = self.0;
        if size < Self::KB {
            write!(f, "{size}B")
        } else if size < Self::MB {
            write!(f, "{:.2}KB", size as f64 / Self::KB as f64)
        } else if size < Self::GB {
            write!(f, "{:.2}MB", size as f64 / Self::MB as f64)
        } else {
            write!(f, "{:.2}GB", size as f64 / Self::GB as f64)
        }
    }
}

/// Resolves a server-relative asset path against the backend URL.
///
/// Absolute `http(s)` URLs and empty values are returned unchanged.
pub fn resolve_asset_url(backend_url: &str, path: &str) -> String {
    if path.is_empty() || path.starts_with("http") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        backend_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
