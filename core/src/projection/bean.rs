//! Projections into caller-defined result types.

use std::marker::PhantomData;

use super::{MappingContext, Projector};
use crate::error::{QueryError, Result};
use crate::expr::Expression;
use crate::row::RowReader;
use crate::statement::Projection;
use crate::value::{FromValue, Value};

/// A type built positionally from a fixed number of columns.
///
/// Usually implemented with [`constructor_target!`](crate::constructor_target).
pub trait ConstructorTarget: Sized {
    const ARITY: usize;

    fn construct(args: &mut Arguments) -> Result<Self>;
}

/// A type whose fields are assigned by name.
///
/// Usually implemented with [`field_target!`](crate::field_target).
pub trait FieldTarget: Default {
    /// Returns `Ok(false)` when the target has no field called `name`.
    fn assign_field(&mut self, name: &str, value: Value) -> Result<bool>;
}

/// A type populated through named setter methods.
///
/// Usually implemented with [`setter_target!`](crate::setter_target).
pub trait SetterTarget: Default {
    /// Returns `Ok(false)` when the target has no property called `name`.
    fn set_property(&mut self, name: &str, value: Value) -> Result<bool>;
}

/// Constructor arguments in projection order.
pub struct Arguments {
    values: std::vec::IntoIter<Value>,
    position: usize,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Converts the next argument.
    #[allow(clippy::should_implement_trait)]
    pub fn next<T: FromValue>(&mut self) -> Result<T> {
        let value = self.values.next().ok_or_else(|| {
            QueryError::ProjectionError(format!("missing constructor argument {}", self.position))
        })?;
        self.position += 1;
        T::from_value(value).map_err(|error| {
            QueryError::ProjectionError(format!(
                "constructor argument {}: {error}",
                self.position - 1
            ))
        })
    }
}

fn target_name<T>() -> &'static str {
    std::any::type_name::<T>()
}

/// Positional binding into `T`.
pub struct Constructor<T> {
    args: Vec<Expression>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Constructor<T> {
    pub fn new(args: Vec<Expression>) -> Self {
        Self {
            args,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Constructor<T> {
    fn clone(&self) -> Self {
        Self::new(self.args.clone())
    }
}

impl<T: ConstructorTarget> Projector for Constructor<T> {
    type Output = T;

    fn projection(&self) -> Projection {
        Projection::ConstructorBinding {
            target: target_name::<T>(),
            args: self.args.clone(),
        }
    }

    fn map_row(&self, reader: &mut RowReader, _ctx: &mut MappingContext<'_>) -> Result<T> {
        if self.args.len() != T::ARITY {
            return Err(QueryError::ProjectionError(format!(
                "`{}` takes {} argument(s), projection has {}",
                target_name::<T>(),
                T::ARITY,
                self.args.len()
            )));
        }
        let mut args = Arguments::new(reader.take(self.args.len())?);
        T::construct(&mut args)
    }
}

/// Names of the bound columns: explicit alias, else the field name of a path.
fn binding_names(target: &str, fields: &[Expression]) -> Result<Vec<String>> {
    fields
        .iter()
        .map(|field| {
            field.binding_name().map(str::to_owned).ok_or_else(|| {
                QueryError::ProjectionError(format!(
                    "cannot bind {field:?} into `{target}` without an alias"
                ))
            })
        })
        .collect()
}

macro_rules! named_binding {
    ($(#[$meta:meta])* $name:ident, $bound:ident, $variant:ident, $assign:ident) => {
        $(#[$meta])*
        pub struct $name<T> {
            fields: Vec<Expression>,
            _marker: PhantomData<fn() -> T>,
        }

        impl<T> $name<T> {
            pub fn new(fields: Vec<Expression>) -> Self {
                Self {
                    fields,
                    _marker: PhantomData,
                }
            }
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                Self::new(self.fields.clone())
            }
        }

        impl<T: $bound> Projector for $name<T> {
            type Output = T;

            fn projection(&self) -> Projection {
                Projection::$variant {
                    target: target_name::<T>(),
                    fields: self.fields.clone(),
                }
            }

            fn map_row(&self, reader: &mut RowReader, _ctx: &mut MappingContext<'_>) -> Result<T> {
                let names = binding_names(target_name::<T>(), &self.fields)?;
                let mut target = T::default();
                for name in names {
                    let value = reader.next_value()?;
                    // Columns without a matching member are ignored
                    target.$assign(&name, value)?;
                }
                Ok(target)
            }
        }
    };
}

named_binding!(
    /// Named binding by field assignment into `T`.
    Fields, FieldTarget, FieldBinding, assign_field
);
named_binding!(
    /// Named binding through the setters of `T`.
    Setters, SetterTarget, SetterBinding, set_property
);

/// Implements [`ConstructorTarget`] for a struct, taking the listed fields in order.
///
/// ```
/// use quarry_core::{constructor_target, projection::ConstructorTarget};
///
/// struct MemberDto {
///     username: String,
///     age: i64,
/// }
///
/// constructor_target!(MemberDto { username: String, age: i64 });
///
/// assert_eq!(<MemberDto as ConstructorTarget>::ARITY, 2);
/// ```
#[macro_export]
macro_rules! constructor_target {
    ($target:ident { $($field:ident : $ty:ty),+ $(,)? }) => {
        impl $crate::projection::ConstructorTarget for $target {
            const ARITY: usize = [$(stringify!($field)),+].len();

            fn construct(args: &mut $crate::projection::Arguments) -> $crate::Result<Self> {
                Ok(Self {
                    $($field: args.next::<$ty>()?),+
                })
            }
        }
    };
}

/// Implements [`FieldTarget`] for a struct over the listed fields.
#[macro_export]
macro_rules! field_target {
    ($target:ident { $($field:ident : $ty:ty),+ $(,)? }) => {
        impl $crate::projection::FieldTarget for $target {
            fn assign_field(
                &mut self,
                name: &str,
                value: $crate::value::Value,
            ) -> $crate::Result<bool> {
                match name {
                    $(
                        stringify!($field) => {
                            self.$field = <$ty as $crate::value::FromValue>::from_value(value)?;
                            Ok(true)
                        }
                    )+
                    _ => Ok(false),
                }
            }
        }
    };
}

/// Implements [`SetterTarget`] by routing each property name to a setter method.
#[macro_export]
macro_rules! setter_target {
    ($target:ident { $($property:ident => $setter:ident($ty:ty)),+ $(,)? }) => {
        impl $crate::projection::SetterTarget for $target {
            fn set_property(
                &mut self,
                name: &str,
                value: $crate::value::Value,
            ) -> $crate::Result<bool> {
                match name {
                    $(
                        stringify!($property) => {
                            self.$setter(<$ty as $crate::value::FromValue>::from_value(value)?);
                            Ok(true)
                        }
                    )+
                    _ => Ok(false),
                }
            }
        }
    };
}
