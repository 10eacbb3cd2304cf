//! Built-in members of literal values: what calling them returns, which
//! arguments they call back, and whether they mutate their receiver.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use shaker_common::PathKey;

/// Result type of a built-in member call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnType {
    String,
    Number,
    Boolean,
    Unknown,
}

#[derive(Clone, Copy, Debug)]
pub struct MemberDescription {
    pub returns: ReturnType,
    /// Argument positions invoked as callbacks (`arr.map(fn)`).
    pub calls_args: &'static [usize],
    pub mutates_self: bool,
}

pub type MemberTable = FxHashMap<&'static str, MemberDescription>;

const fn returns(returns: ReturnType) -> MemberDescription {
    MemberDescription {
        returns,
        calls_args: &[],
        mutates_self: false,
    }
}

const fn callback(returns: ReturnType) -> MemberDescription {
    MemberDescription {
        returns,
        calls_args: &[0],
        mutates_self: false,
    }
}

const MUTATES: MemberDescription = MemberDescription {
    returns: ReturnType::Unknown,
    calls_args: &[],
    mutates_self: true,
};

fn extend(base: &MemberTable, members: &[(&'static str, MemberDescription)]) -> MemberTable {
    let mut table = base.clone();
    table.extend(members.iter().copied());
    table
}

pub static OBJECT_MEMBERS: Lazy<MemberTable> = Lazy::new(|| {
    [
        ("hasOwnProperty", returns(ReturnType::Boolean)),
        ("isPrototypeOf", returns(ReturnType::Boolean)),
        ("propertyIsEnumerable", returns(ReturnType::Boolean)),
        ("toLocaleString", returns(ReturnType::String)),
        ("toString", returns(ReturnType::String)),
        ("valueOf", returns(ReturnType::Unknown)),
    ]
    .into_iter()
    .collect()
});

pub static ARRAY_MEMBERS: Lazy<MemberTable> = Lazy::new(|| {
    use ReturnType::{Boolean, Number, String, Unknown};
    extend(
        &OBJECT_MEMBERS,
        &[
            ("concat", returns(Unknown)),
            ("copyWithin", MUTATES),
            ("every", callback(Boolean)),
            ("fill", MUTATES),
            ("filter", callback(Unknown)),
            ("find", callback(Unknown)),
            ("findIndex", callback(Number)),
            ("forEach", callback(Unknown)),
            ("includes", returns(Boolean)),
            ("indexOf", returns(Number)),
            ("join", returns(String)),
            ("lastIndexOf", returns(Number)),
            ("map", callback(Unknown)),
            ("pop", MUTATES),
            ("push", MUTATES),
            ("reduce", callback(Unknown)),
            ("reduceRight", callback(Unknown)),
            ("reverse", MUTATES),
            ("shift", MUTATES),
            ("slice", returns(Unknown)),
            ("some", callback(Boolean)),
            (
                "sort",
                MemberDescription {
                    returns: Unknown,
                    calls_args: &[0],
                    mutates_self: true,
                },
            ),
            ("splice", MUTATES),
            ("unshift", MUTATES),
        ],
    )
});

pub static BOOLEAN_MEMBERS: Lazy<MemberTable> =
    Lazy::new(|| extend(&OBJECT_MEMBERS, &[("valueOf", returns(ReturnType::Boolean))]));

pub static NUMBER_MEMBERS: Lazy<MemberTable> = Lazy::new(|| {
    use ReturnType::{Number, String};
    extend(
        &OBJECT_MEMBERS,
        &[
            ("toExponential", returns(String)),
            ("toFixed", returns(String)),
            ("toLocaleString", returns(String)),
            ("toPrecision", returns(String)),
            ("valueOf", returns(Number)),
        ],
    )
});

pub static STRING_MEMBERS: Lazy<MemberTable> = Lazy::new(|| {
    use ReturnType::{Boolean, Number, String, Unknown};
    extend(
        &OBJECT_MEMBERS,
        &[
            ("charAt", returns(String)),
            ("charCodeAt", returns(Number)),
            ("codePointAt", returns(Number)),
            ("concat", returns(String)),
            ("endsWith", returns(Boolean)),
            ("includes", returns(Boolean)),
            ("indexOf", returns(Number)),
            ("lastIndexOf", returns(Number)),
            ("localeCompare", returns(Number)),
            ("match", returns(Unknown)),
            ("normalize", returns(String)),
            ("padEnd", returns(String)),
            ("padStart", returns(String)),
            ("repeat", returns(String)),
            (
                "replace",
                MemberDescription {
                    returns: String,
                    calls_args: &[1],
                    mutates_self: false,
                },
            ),
            ("search", returns(Number)),
            ("slice", returns(String)),
            ("split", returns(Unknown)),
            ("startsWith", returns(Boolean)),
            ("substr", returns(String)),
            ("substring", returns(String)),
            ("toLocaleLowerCase", returns(String)),
            ("toLocaleUpperCase", returns(String)),
            ("toLowerCase", returns(String)),
            ("toUpperCase", returns(String)),
            ("trim", returns(String)),
            ("valueOf", returns(String)),
        ],
    )
});

/// The member a single-key path names in `table`, if it is a known built-in.
#[must_use]
pub fn lookup<'t>(table: &'t MemberTable, path: &[PathKey]) -> Option<&'t MemberDescription> {
    match path {
        [PathKey::Name(name)] => table.get(&**name),
        _ => None,
    }
}
