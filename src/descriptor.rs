use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Declarative metadata for one store command. Documentation only: the forwarder never uses
/// it to validate arguments.
#[derive(Debug, PartialEq)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub method: &'static str,
    pub group: Group,
    /// Server version that introduced the command.
    pub since: &'static str,
    pub complexity: &'static str,
    pub arguments: &'static [ArgumentDescriptor],
}

impl CommandDescriptor {
    /// Smallest number of arguments the command accepts, not counting its name.
    pub fn min_arity(&self) -> usize {
        self.arguments
            .iter()
            .filter(|arg| matches!(arg.arity, Arity::One | Arity::Multiple))
            .map(|arg| arg.kind.width())
            .sum()
    }

    /// Whether the command accepts an unbounded number of arguments.
    pub fn is_variadic(&self) -> bool {
        self.arguments
            .iter()
            .any(|arg| matches!(arg.arity, Arity::Multiple | Arity::OptionalMultiple))
    }
}

#[derive(Debug, PartialEq)]
pub struct ArgumentDescriptor {
    pub name: &'static str,
    pub kind: ArgumentKind,
    pub arity: Arity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ArgumentKind {
    Key,
    String,
    Integer,
    Double,
    Pattern,
    UnixTime,
    /// Several values written together, e.g. a field/value pair.
    Block,
    /// Exactly one of a set of alternatives, e.g. `BEFORE | AFTER`.
    OneOf,
    /// A flag with no value, e.g. `WITHSCORES`.
    PureToken,
}

impl ArgumentKind {
    /// Arguments a single occurrence of this slot contributes at minimum.
    fn width(&self) -> usize {
        match self {
            ArgumentKind::Block => 2,
            _ => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Arity {
    One,
    Optional,
    Multiple,
    OptionalMultiple,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Group {
    Connection,
    Server,
    Generic,
    String,
    Hash,
    List,
    Set,
    SortedSet,
    Pubsub,
}
