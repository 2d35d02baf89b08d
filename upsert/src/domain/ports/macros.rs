//! Helper macro for declaring collaborator error enums.

macro_rules! define_port_error {
    (@ctor $name:ident $variant:ident) => {
        ::paste::paste! {
            #[doc = "Construct this variant."]
            #[must_use]
            pub const fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $name:ident $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $name $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $name:ident $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = "Construct this variant."]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $name:ident $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $name
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($(#[$field_meta:meta])* $field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($(#[$field_meta])* $field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $name $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructor coverage for generated port errors.
    define_port_error! {
        /// Error used only by these tests.
        pub enum ProbeError {
            /// Single string field.
            Connection {
                /// Detail text.
                message: String
            } => "connection: {message}",
            /// Numeric field.
            Retries {
                /// Attempt count.
                count: u32
            } => "retries: {count}",
            /// Mixed fields.
            Rejected {
                /// Object name.
                table: String,
                /// Attempt count.
                count: u32
            } => "rejected {table} after {count}",
            /// No fields.
            Closed => "closed",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        assert_eq!(
            ProbeError::connection("refused").to_string(),
            "connection: refused"
        );
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        assert_eq!(ProbeError::retries(3_u32).to_string(), "retries: 3");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        assert_eq!(
            ProbeError::rejected("pets", 2_u32).to_string(),
            "rejected pets after 2"
        );
    }

    #[test]
    fn unit_variants_get_constructors() {
        assert_eq!(ProbeError::closed(), ProbeError::Closed);
    }
}
