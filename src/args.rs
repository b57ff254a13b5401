use bytes::Bytes;

/// Converts a typed value into the flat argument list sent with a command.
///
/// Scalars write one argument. `Option`, `()`, sequences and tuples write zero or more, which
/// is how optional slots, variadic slots and option groups are expressed: `()` or `None`
/// omits an optional slot, `vec!["a", "b"]` fills a variadic one, and `("EX", 10)` writes a
/// flag followed by its value.
pub trait ToArgs {
    fn write_args(&self, out: &mut Vec<Bytes>);

    fn to_args(&self) -> Vec<Bytes> {
        let mut out = Vec::new();
        self.write_args(&mut out);
        out
    }
}

impl<T: ToArgs + ?Sized> ToArgs for &T {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        (**self).write_args(out)
    }
}

impl ToArgs for str {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        out.push(Bytes::copy_from_slice(self.as_bytes()));
    }
}

impl ToArgs for String {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        self.as_str().write_args(out)
    }
}

impl ToArgs for Bytes {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        out.push(self.clone());
    }
}

macro_rules! display_args {
    ($($ty:ty),*) => {
        $(
            impl ToArgs for $ty {
                fn write_args(&self, out: &mut Vec<Bytes>) {
                    out.push(Bytes::from(self.to_string()));
                }
            }
        )*
    };
}

display_args!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl ToArgs for () {
    fn write_args(&self, _out: &mut Vec<Bytes>) {}
}

impl<T: ToArgs> ToArgs for Option<T> {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        if let Some(value) = self {
            value.write_args(out);
        }
    }
}

impl<T: ToArgs> ToArgs for [T] {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        for item in self {
            item.write_args(out);
        }
    }
}

impl<T: ToArgs, const N: usize> ToArgs for [T; N] {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        self.as_slice().write_args(out)
    }
}

impl<T: ToArgs> ToArgs for Vec<T> {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        self.as_slice().write_args(out)
    }
}

macro_rules! tuple_args {
    ($($ty:ident $value:ident),+) => {
        impl<$($ty: ToArgs),+> ToArgs for ($($ty,)+) {
            fn write_args(&self, out: &mut Vec<Bytes>) {
                let ($($value,)+) = self;
                $($value.write_args(out);)+
            }
        }
    };
}

tuple_args!(A a);
tuple_args!(A a, B b);
tuple_args!(A a, B b, C c);
tuple_args!(A a, B b, C c, D d);
tuple_args!(A a, B b, C c, D d, E e);

/// Expiration option group shared by `SET`, `GETEX` and friends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Expiration {
    /// Seconds from now.
    Ex(u64),
    /// Milliseconds from now.
    Px(u64),
    /// Unix time in seconds.
    ExAt(u64),
    /// Unix time in milliseconds.
    PxAt(u64),
    /// Retain the current time to live (`SET` only).
    KeepTtl,
    /// Remove the current time to live (`GETEX` only).
    Persist,
}

impl ToArgs for Expiration {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        match self {
            Expiration::Ex(seconds) => ("EX", seconds).write_args(out),
            Expiration::Px(millis) => ("PX", millis).write_args(out),
            Expiration::ExAt(seconds) => ("EXAT", seconds).write_args(out),
            Expiration::PxAt(millis) => ("PXAT", millis).write_args(out),
            Expiration::KeepTtl => "KEEPTTL".write_args(out),
            Expiration::Persist => "PERSIST".write_args(out),
        }
    }
}

/// Existence condition shared by `SET`, `EXPIRE`, `ZADD` and friends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Condition {
    /// Only act when the key (or member) does not exist yet.
    Nx,
    /// Only act when the key (or member) already exists.
    Xx,
    /// Only when the new expiry is greater than the current one.
    Gt,
    /// Only when the new expiry is less than the current one.
    Lt,
}

impl ToArgs for Condition {
    fn write_args(&self, out: &mut Vec<Bytes>) {
        let token = match self {
            Condition::Nx => "NX",
            Condition::Xx => "XX",
            Condition::Gt => "GT",
            Condition::Lt => "LT",
        };
        token.write_args(out)
    }
}
