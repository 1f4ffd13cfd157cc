//! Field keys.

use std::fmt;

/// Identifier selecting one field of a [crate::structure::Structure].
///
/// Keys are usually a small fieldless enum. One value is reserved as [Key::END]
/// and may never be used for a real field.
///
/// ```
/// use bitlayout::key::Key;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
/// enum Header {
///     Version,
///     Length,
///     End,
/// }
///
/// impl Key for Header {
///     const END: Self = Header::End;
/// }
/// ```
pub trait Key: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    /// Reserved terminator key.
    const END: Self;

    /// Debug rendering used in error payloads.
    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

macro_rules! impl_numeric_key {
    ($($t:ty),*) => {
        $(
            impl Key for $t {
                const END: Self = <$t>::MAX;
            }
        )*
    };
}

impl_numeric_key!(u8, u16, u32);
