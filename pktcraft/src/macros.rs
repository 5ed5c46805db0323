macro_rules! header_field_range_accessors {
    ( $(($get_range: ident, $get_range_mut: ident, $left: literal..$right: literal $(,)?)),* $(,)? )
    => {
        $(
            #[inline]
            fn $get_range(buf: &[u8]) -> &[u8] {
                &buf[$left..$right]
            }

            #[inline]
            fn $get_range_mut(buf: &mut [u8]) -> &mut [u8] {
                &mut buf[$left..$right]
            }
        )*
    }
}

// Expands to one accessor per control bit, forwarding to the `flag` or
// `set_flag` method of the surrounding impl block.
macro_rules! flag_accessors {
    (get: $( ($get: ident, $flag: ident) ),* $(,)? ) => {
        $(
            #[inline]
            pub fn $get(&self) -> bool {
                self.flag($crate::tcp::TcpFlags::$flag)
            }
        )*
    };
    (set: $( ($set: ident, $flag: ident) ),* $(,)? ) => {
        $(
            #[inline]
            pub fn $set(&mut self, value: bool) {
                self.set_flag($crate::tcp::TcpFlags::$flag, value)
            }
        )*
    };
}

macro_rules! enum_sim {
    (
        $(#[$enum_attr: meta])*
        pub struct $tname:ident ($size_t:ty) {
            $(
                $(#[$arm_attr: meta])*
                $enum_arm:ident = $num_exp:expr
            ),+ $(,)?
        }
    ) => {
        #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
        $(#[$enum_attr])*
        pub struct $tname($size_t);

        impl $tname {
            $(
                $(#[$arm_attr])*
                pub const $enum_arm: Self = Self($num_exp);
            )+

            /// Get the raw value.
            #[inline]
            pub const fn raw(&self) -> $size_t {
                self.0
            }
        }

        impl ::core::convert::From<$size_t> for $tname {
            #[inline]
            fn from(value: $size_t) -> $tname {
                $tname(value)
            }
        }

        impl ::core::convert::From<$tname> for $size_t {
            #[inline]
            fn from(value: $tname) -> $size_t {
                value.0
            }
        }
    };
}
