use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The storage string doubles as the serde name.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(UserRole {
    Patient => "pasien",
    Doctor => "dokter",
    AdminStaff => "petugas_administrasi",
    PharmacyStaff => "petugas_apotek",
    ClinicOwner => "pemilik_klinik",
});

str_enum!(QueueStatus {
    Waiting => "waiting",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(PrescriptionStatus {
    Pending => "pending",
    Filled => "filled",
});

str_enum!(PaymentStatus {
    Pending => "pending",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(PaymentMethod {
    Cash => "cash",
    Debit => "debit",
    Credit => "credit",
    Transfer => "transfer",
});

impl UserRole {
    pub const ALL: [UserRole; 5] = [
        UserRole::Patient,
        UserRole::Doctor,
        UserRole::AdminStaff,
        UserRole::PharmacyStaff,
        UserRole::ClinicOwner,
    ];

    /// Display label shown in the dashboard header.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Patient => "Pasien",
            Self::Doctor => "Dokter",
            Self::AdminStaff => "Petugas Administrasi",
            Self::PharmacyStaff => "Petugas Apotek",
            Self::ClinicOwner => "Pemilik Klinik",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_tags_round_trip() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::from_str(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_invalid_enum() {
        let err = UserRole::from_str("perawat").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn serde_uses_storage_strings() {
        let json = serde_json::to_string(&QueueStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let role: UserRole = serde_json::from_str("\"petugas_apotek\"").unwrap();
        assert_eq!(role, UserRole::PharmacyStaff);
    }

    #[test]
    fn payment_method_rejects_unknown() {
        assert!(PaymentMethod::from_str("bitcoin").is_err());
        assert_eq!(PaymentMethod::from_str("transfer").unwrap(), PaymentMethod::Transfer);
    }
}
