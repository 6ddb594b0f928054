#[doc(hidden)]
#[macro_export]
macro_rules! builder {
    (
        $( #[ $( $meta:tt )* ] )*
        $vis:vis struct $name:ident {
            $(
                $( #[doc=$doc:expr] )*
                $field:ident : $type:ty,
            )*
        }
    ) => {
        $( #[ $( $meta )* ] )*
        $vis struct $name {
            $(
                $( #[doc=$doc] )*
                $field : $type,
            )*
        }

        impl $name {
            $(
                pub fn $field(mut self, value: $type) -> Self {
                    self.$field = value;
                    self
                }
            )*
        }
    }
}

#[macro_export]
macro_rules! format_err {
    ($($arg:tt)*) => {
        $crate::Error::from(anyhow::anyhow!($($arg)*))
    }
}

#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::format_err!($($arg)*))
    }
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            $crate::bail!($($arg)*);
        }
    }
}
