/// Implements [`Reflect`](crate::Reflect) for leaf types that parse from text.
///
/// The types must implement `Default` and `FromStr` (with a displayable error).
///
/// ```
/// use core::str::FromStr;
///
/// use instruct_core::Reflect;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Email(String);
///
/// impl FromStr for Email {
///     type Err = String;
///
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         match s.contains('@') {
///             true => Ok(Email(s.to_owned())),
///             false => Err(format!("not an email address: {s}")),
///         }
///     }
/// }
///
/// instruct_core::reflect_from_str!(Email);
///
/// assert_eq!(Email::SHAPE.type_identifier, "Email");
/// let parse = Email::SHAPE.vtable.parse.unwrap();
/// let email = parse("ann@example.com").unwrap();
/// assert_eq!(*email.downcast::<Email>().unwrap(), Email("ann@example.com".into()));
/// assert_eq!(parse("ann").unwrap_err(), "not an email address: ann");
/// ```
#[macro_export]
macro_rules! reflect_from_str {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $crate::Reflect for $ty {
                const SHAPE: &'static $crate::Shape = &const {
                    $crate::ShapeBuilder::<$ty>::new(stringify!($ty))
                        .with_default()
                        .with_parse()
                        .build()
                };
            }
        )*
    };
}
