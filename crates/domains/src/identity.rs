//! # Claimant Identity
//!
//! Who is asserting ownership of an item. Each role carries its own required
//! fields, so a Staff claim can never be missing a department and a Student
//! claim can never be missing a roll number.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::validation::{is_valid_email, is_valid_phone, is_valid_roll_number};

/// The four kinds of people who can claim an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ClaimantRole {
    #[default]
    Student,
    Staff,
    Guard,
    Helper,
}

impl ClaimantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimantRole::Student => "Student",
            ClaimantRole::Staff => "Staff",
            ClaimantRole::Guard => "Guard",
            ClaimantRole::Helper => "Helper",
        }
    }
}

impl fmt::Display for ClaimantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity snapshot captured when a claim is submitted.
///
/// Serialized with a `userType` tag so stored documents keep the shape the
/// portal's forms already use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "userType", rename_all_fields = "camelCase")]
pub enum ClaimantIdentity {
    Student {
        student_name: String,
        roll_number: String,
        study_year: String,
        contact_number: String,
        email: String,
    },
    Staff {
        staff_name: String,
        staff_department: String,
        mobile_no: String,
        email: String,
    },
    Guard {
        guard_name: String,
        email: String,
    },
    Helper {
        helper_name: String,
        email: String,
    },
}

/// Key used to reject a second concurrent claim by the same person.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClaimantKey {
    pub role: ClaimantRole,
    pub identifier: String,
    pub email: String,
}

impl ClaimantIdentity {
    pub fn role(&self) -> ClaimantRole {
        match self {
            ClaimantIdentity::Student { .. } => ClaimantRole::Student,
            ClaimantIdentity::Staff { .. } => ClaimantRole::Staff,
            ClaimantIdentity::Guard { .. } => ClaimantRole::Guard,
            ClaimantIdentity::Helper { .. } => ClaimantRole::Helper,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            ClaimantIdentity::Student { email, .. }
            | ClaimantIdentity::Staff { email, .. }
            | ClaimantIdentity::Guard { email, .. }
            | ClaimantIdentity::Helper { email, .. } => email,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            ClaimantIdentity::Student { student_name, .. } => student_name,
            ClaimantIdentity::Staff { staff_name, .. } => staff_name,
            ClaimantIdentity::Guard { guard_name, .. } => guard_name,
            ClaimantIdentity::Helper { helper_name, .. } => helper_name,
        }
    }

    /// The field that distinguishes two claimants of the same role:
    /// roll number for students, the person's name otherwise.
    pub fn identifier(&self) -> &str {
        match self {
            ClaimantIdentity::Student { roll_number, .. } => roll_number,
            _ => self.display_name(),
        }
    }

    pub fn key(&self) -> ClaimantKey {
        ClaimantKey {
            role: self.role(),
            identifier: self.identifier().to_string(),
            email: self.email().to_ascii_lowercase(),
        }
    }

    /// Trims every field, lowercases the email and enforces the per-role
    /// format rules. Nothing is persisted until this succeeds.
    pub fn validated(self) -> Result<Self> {
        let identity = self.normalized();
        match &identity {
            ClaimantIdentity::Student {
                student_name,
                roll_number,
                study_year,
                contact_number,
                email,
            } => {
                require_all(
                    &[student_name, roll_number, study_year, contact_number, email],
                    "All student fields are required: studentName, studentId, studentYear, contactNumber, email",
                )?;
                if !is_valid_roll_number(roll_number) {
                    return Err(AppError::validation("Roll number must be exactly 5 digits"));
                }
                if !is_valid_phone(contact_number) {
                    return Err(AppError::validation("Contact number must be exactly 10 digits"));
                }
            }
            ClaimantIdentity::Staff {
                staff_name,
                staff_department,
                mobile_no,
                email,
            } => {
                require_all(
                    &[staff_name, staff_department, mobile_no, email],
                    "All staff fields are required: staffName, staffDepartment, mobileNo, email",
                )?;
                if !is_valid_phone(mobile_no) {
                    return Err(AppError::validation("Mobile number must be exactly 10 digits"));
                }
            }
            ClaimantIdentity::Guard { guard_name, email } => {
                require_all(&[guard_name, email], "All guard fields are required: guardName, email")?;
            }
            ClaimantIdentity::Helper { helper_name, email } => {
                require_all(&[helper_name, email], "All helper fields are required: helperName, email")?;
            }
        }

        if !is_valid_email(identity.email()) {
            return Err(AppError::validation("Please provide a valid email address"));
        }
        Ok(identity)
    }

    fn normalized(self) -> Self {
        let t = |s: String| s.trim().to_string();
        let mail = |s: String| s.trim().to_ascii_lowercase();
        match self {
            ClaimantIdentity::Student {
                student_name,
                roll_number,
                study_year,
                contact_number,
                email,
            } => ClaimantIdentity::Student {
                student_name: t(student_name),
                roll_number: t(roll_number),
                study_year: t(study_year),
                contact_number: t(contact_number),
                email: mail(email),
            },
            ClaimantIdentity::Staff {
                staff_name,
                staff_department,
                mobile_no,
                email,
            } => ClaimantIdentity::Staff {
                staff_name: t(staff_name),
                staff_department: t(staff_department),
                mobile_no: t(mobile_no),
                email: mail(email),
            },
            ClaimantIdentity::Guard { guard_name, email } => ClaimantIdentity::Guard {
                guard_name: t(guard_name),
                email: mail(email),
            },
            ClaimantIdentity::Helper { helper_name, email } => ClaimantIdentity::Helper {
                helper_name: t(helper_name),
                email: mail(email),
            },
        }
    }
}

fn require_all(fields: &[&String], message: &str) -> Result<()> {
    if fields.iter().any(|f| f.is_empty()) {
        return Err(AppError::validation(message));
    }
    Ok(())
}

/// Flat claim form as submitted by the portal.
///
/// Every field is optional on the wire; `into_identity` dispatches on
/// `user_type` and pulls out only the fields that role needs. Format rules
/// are enforced later, once the target item is known to accept claims.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimForm {
    pub user_type: Option<ClaimantRole>,
    pub student_name: Option<String>,
    pub student_id: Option<String>,
    pub student_year: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub staff_name: Option<String>,
    pub staff_department: Option<String>,
    pub mobile_no: Option<String>,
    pub guard_name: Option<String>,
    pub helper_name: Option<String>,
}

impl ClaimForm {
    /// Builds the typed identity for the form's role without validating it.
    /// Role defaults to Student, matching the portal's claim form.
    pub fn into_identity(self) -> ClaimantIdentity {
        let f = |v: Option<String>| v.unwrap_or_default();
        match self.user_type.unwrap_or_default() {
            ClaimantRole::Student => ClaimantIdentity::Student {
                student_name: f(self.student_name),
                roll_number: f(self.student_id),
                study_year: f(self.student_year),
                contact_number: f(self.contact_number),
                email: f(self.email),
            },
            ClaimantRole::Staff => ClaimantIdentity::Staff {
                staff_name: f(self.staff_name),
                staff_department: f(self.staff_department),
                mobile_no: f(self.mobile_no),
                email: f(self.email),
            },
            ClaimantRole::Guard => ClaimantIdentity::Guard {
                guard_name: f(self.guard_name),
                email: f(self.email),
            },
            ClaimantRole::Helper => ClaimantIdentity::Helper {
                helper_name: f(self.helper_name),
                email: f(self.email),
            },
        }
    }
}
