//! Operator enums with their ESTree spellings.

macro_rules! operator_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            #[must_use]
            pub fn parse(text: &str) -> Option<Self> {
                match text {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }
    };
}

operator_enum!(
    /// Binary operators (arithmetic, comparison, bitwise, `in`, `instanceof`).
    BinaryOperator {
        Equal => "==",
        NotEqual => "!=",
        StrictEqual => "===",
        StrictNotEqual => "!==",
        Less => "<",
        LessEqual => "<=",
        Greater => ">",
        GreaterEqual => ">=",
        ShiftLeft => "<<",
        ShiftRight => ">>",
        ShiftRightUnsigned => ">>>",
        Add => "+",
        Subtract => "-",
        Multiply => "*",
        Divide => "/",
        Remainder => "%",
        Exponent => "**",
        BitOr => "|",
        BitXor => "^",
        BitAnd => "&",
        In => "in",
        InstanceOf => "instanceof",
    }
);

operator_enum!(
    LogicalOperator {
        Or => "||",
        And => "&&",
        Nullish => "??",
    }
);

operator_enum!(
    UnaryOperator {
        Minus => "-",
        Plus => "+",
        Not => "!",
        BitNot => "~",
        TypeOf => "typeof",
        Void => "void",
        Delete => "delete",
    }
);

operator_enum!(
    UpdateOperator {
        Increment => "++",
        Decrement => "--",
    }
);

operator_enum!(
    AssignmentOperator {
        Assign => "=",
        AddAssign => "+=",
        SubtractAssign => "-=",
        MultiplyAssign => "*=",
        DivideAssign => "/=",
        RemainderAssign => "%=",
        ExponentAssign => "**=",
        ShiftLeftAssign => "<<=",
        ShiftRightAssign => ">>=",
        ShiftRightUnsignedAssign => ">>>=",
        BitOrAssign => "|=",
        BitXorAssign => "^=",
        BitAndAssign => "&=",
        OrAssign => "||=",
        AndAssign => "&&=",
        NullishAssign => "??=",
    }
);

impl AssignmentOperator {
    /// Whether the assignment reads the target before writing it.
    #[must_use]
    pub const fn is_compound(self) -> bool {
        !matches!(self, Self::Assign)
    }
}
