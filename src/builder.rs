//! Builder macro for configuration types.

/// Generate a validating builder for a configuration type.
///
/// The configuration type must implement `Default`; every field the builder
/// leaves unset takes the default's value. The macro generates:
/// - A builder struct holding each field as an `Option`
/// - One setter per field, accepting `impl Into<T>`
/// - A `build()` method that fills defaults and runs the `validate` function
/// - A `builder()` method on the config type
///
/// # Field categories
///
/// - `values { field: Type }`: plain config fields
/// - `options { field: Type }`: `Option<Type>` config fields; the setter
///   takes the inner type
///
/// For `usize` fields, callers must use suffixed literals (e.g., `10usize`)
/// because `i32 -> usize` has no `Into` impl.
macro_rules! impl_builder {
    (
        $Config:ident => $Builder:ident {
            values { $( $field:ident : $ty:ty ),* $(,)? }
            options { $( $opt_field:ident : $opt_ty:ty ),* $(,)? }
            validate = $validate:path;
        }
    ) => {
        #[doc = concat!("Builder for [`", stringify!($Config), "`].")]
        #[derive(Debug, Clone, Default)]
        pub struct $Builder {
            $( $field: Option<$ty>, )*
            $( $opt_field: Option<$opt_ty>, )*
        }

        impl $Config {
            #[doc = concat!("Start a [`", stringify!($Builder), "`] over the default configuration.")]
            pub fn builder() -> $Builder {
                $Builder::default()
            }
        }

        impl $Builder {
            $(
                pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                    self.$field = Some(value.into());
                    self
                }
            )*

            $(
                pub fn $opt_field(mut self, value: impl Into<$opt_ty>) -> Self {
                    self.$opt_field = Some(value.into());
                    self
                }
            )*

            pub fn build(self) -> Result<$Config, $crate::error::BuilderError> {
                let defaults = $Config::default();
                let config = $Config {
                    $( $field: self.$field.unwrap_or(defaults.$field), )*
                    $( $opt_field: self.$opt_field.or(defaults.$opt_field), )*
                };
                $validate(&config)?;
                Ok(config)
            }
        }
    };
}

pub(crate) use impl_builder;
