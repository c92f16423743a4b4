//! Helper macro for port error enums.
//!
//! Every variant carries a single `message` field. The macro derives
//! `thiserror::Error`, adds a snake_case constructor per variant, and exposes
//! the message and variant name for logging.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { message: String },
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    pub fn [<$variant:snake>](message: impl Into<String>) -> Self {
                        Self::$variant {
                            message: message.into(),
                        }
                    }
                }
            )*

            /// Detail text carried by the variant.
            pub fn message(&self) -> &str {
                match self {
                    $( Self::$variant { message } => message.as_str(), )*
                }
            }

            /// Variant name for structured log fields.
            pub const fn kind(&self) -> &'static str {
                match self {
                    $( Self::$variant { .. } => stringify!($variant), )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum LedgerPortError {
            Connection => "ledger unavailable: {message}",
            StaleState => "ledger row changed: {message}",
        }
    }

    #[test]
    fn constructors_accept_str() {
        let err = LedgerPortError::connection("pool closed");
        assert_eq!(err.to_string(), "ledger unavailable: pool closed");
        assert_eq!(err.message(), "pool closed");
    }

    #[test]
    fn multi_word_variants_get_snake_case_constructors() {
        let err = LedgerPortError::stale_state(String::from("wallet 7"));
        assert_eq!(err.kind(), "StaleState");
        assert_eq!(err.to_string(), "ledger row changed: wallet 7");
    }
}
