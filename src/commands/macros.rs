/// Arity of a table argument from its optional `[flag]` suffix.
macro_rules! arity {
    () => {
        $crate::descriptor::Arity::One
    };
    (optional) => {
        $crate::descriptor::Arity::Optional
    };
    (multiple) => {
        $crate::descriptor::Arity::Multiple
    };
    (optional_multiple) => {
        $crate::descriptor::Arity::OptionalMultiple
    };
}

/// Expands the command table into the `COMMANDS` descriptor slice and the `Commands` trait,
/// with one provided method per entry that encodes its arguments in declaration order and
/// hands them to `dispatch`.
///
/// ```text
/// /// Doc comment for the method.
/// method => "NAME", Group, since "1.0.0", complexity "O(1)" (
///     argument: Kind [arity],
/// );
/// ```
macro_rules! commands {
    ($(
        $(#[$meta:meta])*
        $method:ident => $name:literal, $group:ident, since $since:literal, complexity $complexity:literal (
            $( $arg:ident : $kind:ident $([$arity:ident])? ),* $(,)?
        );
    )*) => {
        /// Descriptors of every command with a generated method, in table order.
        pub static COMMANDS: &[CommandDescriptor] = &[
            $(
                CommandDescriptor {
                    name: $name,
                    method: stringify!($method),
                    group: Group::$group,
                    since: $since,
                    complexity: $complexity,
                    arguments: &[
                        $(
                            ArgumentDescriptor {
                                name: stringify!($arg),
                                kind: ArgumentKind::$kind,
                                arity: arity!($($arity)?),
                            },
                        )*
                    ],
                },
            )*
        ];

        /// One method per store command.
        ///
        /// Implementors only provide [`dispatch`](Commands::dispatch); what a call produces
        /// depends on the receiver: a future of the reply for a
        /// [`Forwarder`](crate::Forwarder), the queue itself for a [`Batch`](crate::Batch).
        pub trait Commands: Sized {
            type Output;

            /// Handles command `name` with its already encoded arguments.
            fn dispatch(self, name: &str, args: Vec<Bytes>) -> Self::Output;

            $(
                $(#[$meta])*
                ///
                #[doc = concat!("Available since ", $since, ". Complexity: ", $complexity)]
                fn $method(self $(, $arg: impl ToArgs)*) -> Self::Output {
                    #[allow(unused_mut)]
                    let mut args = Vec::new();
                    $( $arg.write_args(&mut args); )*
                    self.dispatch($name, args)
                }
            )*
        }
    };
}
