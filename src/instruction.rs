use std::fmt;
use std::str::FromStr;

use crate::decoder::{
    arguments, resolve_jumplabel, resolve_memref, resolve_name, resolve_value, resolve_values,
    MemRef,
};
use crate::error::ErrorKind;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mnemonic {
    Inbox,
    Outbox,
    CopyFrom,
    CopyTo,
    BumpUp,
    BumpDown,
    Add,
    Sub,
    Init,
    Name,
    Jump,
    JumpNeg,
    JumpZero,
    Data,
}

/// When a jump is taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    Always,
    /// Accumulator holds a negative integer.
    Negative,
    /// Accumulator holds integer zero.
    Zero,
}

/// Instruction with its arguments resolved to their syntactic kinds.
///
/// Nothing here has been checked against the machine yet: names may be undefined, addresses
/// out of range and labels missing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Inbox,
    Outbox,
    CopyFrom(MemRef),
    CopyTo(MemRef),
    BumpUp(MemRef),
    BumpDown(MemRef),
    Add(MemRef),
    Sub(MemRef),
    Init(MemRef, Value),
    Name(MemRef, String),
    Jump(Condition, String),
    Data(Vec<Value>),
}

impl Mnemonic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Outbox => "outbox",
            Self::CopyFrom => "copyfrom",
            Self::CopyTo => "copyto",
            Self::BumpUp => "bump+",
            Self::BumpDown => "bump-",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Init => "init",
            Self::Name => "name",
            Self::Jump => "jump",
            Self::JumpNeg => "jumpneg",
            Self::JumpZero => "jumpzero",
            Self::Data => "data",
        }
    }

    /// Counted by both the size and the steps statistics.
    pub fn is_effectful(&self) -> bool {
        !matches!(self, Self::Init | Self::Name | Self::Data)
    }
}

impl FromStr for Mnemonic {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mnemonic = match s {
            "inbox" => Self::Inbox,
            "outbox" => Self::Outbox,
            "copyfrom" => Self::CopyFrom,
            "copyto" => Self::CopyTo,
            "bump+" => Self::BumpUp,
            "bump-" => Self::BumpDown,
            "add" => Self::Add,
            "sub" => Self::Sub,
            "init" => Self::Init,
            "name" => Self::Name,
            "jump" => Self::Jump,
            "jumpneg" => Self::JumpNeg,
            "jumpzero" => Self::JumpZero,
            "data" => Self::Data,
            _ => {
                return Err(ErrorKind::UnknownInstruction {
                    mnemonic: s.to_string(),
                })
            }
        };
        Ok(mnemonic)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Instruction {
    /// Resolve the raw arguments of a line according to the shape `mnemonic` expects.
    pub fn parse(mnemonic: Mnemonic, args: &str) -> Result<Self, ErrorKind> {
        use Mnemonic as M;
        let name = mnemonic.as_str();
        let instr = match mnemonic {
            M::Inbox => {
                arguments(name, args, 0)?;
                Self::Inbox
            }
            M::Outbox => {
                arguments(name, args, 0)?;
                Self::Outbox
            }
            M::CopyFrom => Self::CopyFrom(Self::memref(name, args)?),
            M::CopyTo => Self::CopyTo(Self::memref(name, args)?),
            M::BumpUp => Self::BumpUp(Self::memref(name, args)?),
            M::BumpDown => Self::BumpDown(Self::memref(name, args)?),
            M::Add => Self::Add(Self::memref(name, args)?),
            M::Sub => Self::Sub(Self::memref(name, args)?),
            M::Init => {
                let args = arguments(name, args, 2)?;
                Self::Init(resolve_memref(args[0])?, resolve_value(args[1])?)
            }
            M::Name => {
                let args = arguments(name, args, 2)?;
                // Accept both `name 2 $a` and `name $a 2`
                match resolve_name(args[1]) {
                    Ok(symbol) => Self::Name(resolve_memref(args[0])?, symbol),
                    Err(err) => match resolve_memref(args[1]) {
                        Ok(memref) if !memref.is_symbolic() => {
                            Self::Name(memref, resolve_name(args[0])?)
                        }
                        _ => return Err(err),
                    },
                }
            }
            M::Jump => Self::Jump(Condition::Always, Self::label(name, args)?),
            M::JumpNeg => Self::Jump(Condition::Negative, Self::label(name, args)?),
            M::JumpZero => Self::Jump(Condition::Zero, Self::label(name, args)?),
            M::Data => Self::Data(resolve_values(args)?),
        };
        Ok(instr)
    }

    fn memref(mnemonic: &str, args: &str) -> Result<MemRef, ErrorKind> {
        let args = arguments(mnemonic, args, 1)?;
        resolve_memref(args[0])
    }

    fn label(mnemonic: &str, args: &str) -> Result<String, ErrorKind> {
        let args = arguments(mnemonic, args, 1)?;
        resolve_jumplabel(args[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::Target;
    use crate::error::Expected;

    fn direct(address: i64) -> MemRef {
        MemRef {
            target: Target::Address(address),
            indirect: false,
        }
    }

    fn parse(mnemonic: &str, args: &str) -> Result<Instruction, ErrorKind> {
        Instruction::parse(mnemonic.parse()?, args)
    }

    #[test]
    fn mnemonics() {
        for name in [
            "inbox", "outbox", "copyfrom", "copyto", "bump+", "bump-", "add", "sub", "init",
            "name", "jump", "jumpneg", "jumpzero", "data",
        ] {
            assert_eq!(name.parse::<Mnemonic>().unwrap().as_str(), name);
        }
        assert_eq!(
            "outhbox".parse::<Mnemonic>(),
            Err(ErrorKind::UnknownInstruction {
                mnemonic: "outhbox".into()
            })
        );
        assert!("Inbox".parse::<Mnemonic>().is_err());
        assert!(!Mnemonic::Data.is_effectful());
        assert!(Mnemonic::JumpZero.is_effectful());
    }

    #[test]
    fn parse_shapes() {
        assert_eq!(parse("inbox", ""), Ok(Instruction::Inbox));
        assert_eq!(parse("copyto", "3"), Ok(Instruction::CopyTo(direct(3))));
        assert_eq!(
            parse("init", "0 'z'"),
            Ok(Instruction::Init(direct(0), Value::Char('z')))
        );
        assert_eq!(
            parse("jumpneg", ":done"),
            Ok(Instruction::Jump(Condition::Negative, "done".into()))
        );
        assert_eq!(
            parse("data", "1 'a' -2"),
            Ok(Instruction::Data(vec![
                Value::Int(1),
                Value::Char('a'),
                Value::Int(-2)
            ]))
        );
        assert_eq!(parse("data", ""), Ok(Instruction::Data(vec![])));
    }

    #[test]
    fn parse_name_either_order() {
        let expected = Ok(Instruction::Name(direct(2), "a".into()));
        assert_eq!(parse("name", "2 $a"), expected);
        assert_eq!(parse("name", "$a 2"), expected);
        assert_eq!(
            parse("name", "$a $b"),
            Ok(Instruction::Name(
                MemRef {
                    target: Target::Name("a".into()),
                    indirect: false
                },
                "b".into()
            ))
        );
        assert!(matches!(
            parse("name", "2 3"),
            Err(ErrorKind::Syntax {
                expected: Expected::Name,
                ..
            })
        ));
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            parse("outbox", "1"),
            Err(ErrorKind::Arity {
                expected: 0,
                found: 1,
                ..
            })
        ));
        assert!(matches!(
            parse("init", "0"),
            Err(ErrorKind::Arity {
                expected: 2,
                found: 1,
                ..
            })
        ));
        assert!(matches!(
            parse("init", "0 zz"),
            Err(ErrorKind::Syntax {
                expected: Expected::Literal,
                ..
            })
        ));
        assert!(matches!(
            parse("jump", "loop"),
            Err(ErrorKind::Syntax {
                expected: Expected::Label,
                ..
            })
        ));
        assert!(matches!(
            parse("add", "{1}"),
            Err(ErrorKind::Syntax {
                expected: Expected::MemRef,
                ..
            })
        ));
    }
}
