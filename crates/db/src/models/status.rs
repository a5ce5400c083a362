//! Text-valued status enums.
//!
//! Each variant's string matches the CHECK constraint on the corresponding
//! column.

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Return the stored column value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }

            /// Parse a stored column value.
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $( $val => Some($name::$variant), )+
                    _ => None,
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

define_text_enum! {
    /// Lifecycle of a gateway payment.
    PaymentStatus {
        Pending = "pending",
        Completed = "completed",
        Failed = "failed",
    }
}

define_text_enum! {
    /// Which feature produced a history record.
    SummaryKind {
        Summary = "summary",
        Translate = "translate",
        Keypoints = "keypoints",
        TitleGenerator = "title-generator",
        Simplify = "simplify",
    }
}

define_text_enum! {
    /// Referral redemption state.
    ReferralStatus {
        Pending = "pending",
        Completed = "completed",
    }
}
