//! CIL instruction model
//!
//! `OpCode` covers the full ECMA-335 opcode table, deserialised from the
//! textual mnemonic (`"ldc.i4.0"`, `{"br.s": 12}`). Rules never match on
//! opcodes directly; they go through [`OpCode::category`] or the predicates
//! on [`Instruction`].

use serde::{Deserialize, Serialize};

/// Line number reserved by the PDB format for compiler-hidden sequence points
pub const HIDDEN_LINE: u32 = 0x00FE_EFEE;

/// Source-line mapping attached to an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum SourceLine {
    Line(u32),
    /// Compiler-generated sequence point, never counted
    Hidden,
}

impl SourceLine {
    /// The visible line number, if any
    pub fn visible(self) -> Option<u32> {
        match self {
            SourceLine::Line(n) => Some(n),
            SourceLine::Hidden => None,
        }
    }
}

impl From<u32> for SourceLine {
    fn from(line: u32) -> Self {
        if line == HIDDEN_LINE {
            SourceLine::Hidden
        } else {
            SourceLine::Line(line)
        }
    }
}

impl From<SourceLine> for u32 {
    fn from(line: SourceLine) -> Self {
        match line {
            SourceLine::Line(n) => n,
            SourceLine::Hidden => HIDDEN_LINE,
        }
    }
}

/// Operation category used by the metric engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCategory {
    Nop,
    Box,
    Unbox,
    /// `ldarg.0` .. `ldarg.3`, index encoded in the opcode
    LoadArgShort(u16),
    /// `ldarg` / `ldarg.s`, index carried as operand
    LoadArg(u16),
    Other,
}

/// CIL opcodes with their operands, one variant per ECMA-335 mnemonic.
///
/// Token operands (methods, fields, types, signatures) are carried as their
/// full names; branch operands are target offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpCode {
    #[serde(rename = "nop")]
    Nop,
    #[serde(rename = "break")]
    Break,

    // Arguments and locals
    #[serde(rename = "ldarg.0")]
    Ldarg0,
    #[serde(rename = "ldarg.1")]
    Ldarg1,
    #[serde(rename = "ldarg.2")]
    Ldarg2,
    #[serde(rename = "ldarg.3")]
    Ldarg3,
    #[serde(rename = "ldarg.s")]
    LdargS(u8),
    #[serde(rename = "ldarg")]
    Ldarg(u16),
    #[serde(rename = "ldarga.s")]
    LdargaS(u8),
    #[serde(rename = "ldarga")]
    Ldarga(u16),
    #[serde(rename = "starg.s")]
    StargS(u8),
    #[serde(rename = "starg")]
    Starg(u16),
    #[serde(rename = "ldloc.0")]
    Ldloc0,
    #[serde(rename = "ldloc.1")]
    Ldloc1,
    #[serde(rename = "ldloc.2")]
    Ldloc2,
    #[serde(rename = "ldloc.3")]
    Ldloc3,
    #[serde(rename = "ldloc.s")]
    LdlocS(u8),
    #[serde(rename = "ldloc")]
    Ldloc(u16),
    #[serde(rename = "ldloca.s")]
    LdlocaS(u8),
    #[serde(rename = "ldloca")]
    Ldloca(u16),
    #[serde(rename = "stloc.0")]
    Stloc0,
    #[serde(rename = "stloc.1")]
    Stloc1,
    #[serde(rename = "stloc.2")]
    Stloc2,
    #[serde(rename = "stloc.3")]
    Stloc3,
    #[serde(rename = "stloc.s")]
    StlocS(u8),
    #[serde(rename = "stloc")]
    Stloc(u16),
    #[serde(rename = "arglist")]
    Arglist,

    // Constants
    #[serde(rename = "ldnull")]
    Ldnull,
    #[serde(rename = "ldc.i4.m1")]
    LdcI4M1,
    #[serde(rename = "ldc.i4.0")]
    LdcI40,
    #[serde(rename = "ldc.i4.1")]
    LdcI41,
    #[serde(rename = "ldc.i4.2")]
    LdcI42,
    #[serde(rename = "ldc.i4.3")]
    LdcI43,
    #[serde(rename = "ldc.i4.4")]
    LdcI44,
    #[serde(rename = "ldc.i4.5")]
    LdcI45,
    #[serde(rename = "ldc.i4.6")]
    LdcI46,
    #[serde(rename = "ldc.i4.7")]
    LdcI47,
    #[serde(rename = "ldc.i4.8")]
    LdcI48,
    #[serde(rename = "ldc.i4.s")]
    LdcI4S(i8),
    #[serde(rename = "ldc.i4")]
    LdcI4(i32),
    #[serde(rename = "ldc.i8")]
    LdcI8(i64),
    #[serde(rename = "ldc.r4")]
    LdcR4(f32),
    #[serde(rename = "ldc.r8")]
    LdcR8(f64),
    #[serde(rename = "ldstr")]
    Ldstr(String),
    #[serde(rename = "dup")]
    Dup,
    #[serde(rename = "pop")]
    Pop,

    // Calls
    #[serde(rename = "jmp")]
    Jmp(String),
    #[serde(rename = "call")]
    Call(String),
    #[serde(rename = "calli")]
    Calli(String),
    #[serde(rename = "callvirt")]
    Callvirt(String),
    #[serde(rename = "newobj")]
    Newobj(String),
    #[serde(rename = "ldftn")]
    Ldftn(String),
    #[serde(rename = "ldvirtftn")]
    Ldvirtftn(String),
    #[serde(rename = "ret")]
    Ret,

    // Branches
    #[serde(rename = "br.s")]
    BrS(u32),
    #[serde(rename = "brfalse.s")]
    BrfalseS(u32),
    #[serde(rename = "brtrue.s")]
    BrtrueS(u32),
    #[serde(rename = "beq.s")]
    BeqS(u32),
    #[serde(rename = "bge.s")]
    BgeS(u32),
    #[serde(rename = "bgt.s")]
    BgtS(u32),
    #[serde(rename = "ble.s")]
    BleS(u32),
    #[serde(rename = "blt.s")]
    BltS(u32),
    #[serde(rename = "bne.un.s")]
    BneUnS(u32),
    #[serde(rename = "bge.un.s")]
    BgeUnS(u32),
    #[serde(rename = "bgt.un.s")]
    BgtUnS(u32),
    #[serde(rename = "ble.un.s")]
    BleUnS(u32),
    #[serde(rename = "blt.un.s")]
    BltUnS(u32),
    #[serde(rename = "br")]
    Br(u32),
    #[serde(rename = "brfalse")]
    Brfalse(u32),
    #[serde(rename = "brtrue")]
    Brtrue(u32),
    #[serde(rename = "beq")]
    Beq(u32),
    #[serde(rename = "bge")]
    Bge(u32),
    #[serde(rename = "bgt")]
    Bgt(u32),
    #[serde(rename = "ble")]
    Ble(u32),
    #[serde(rename = "blt")]
    Blt(u32),
    #[serde(rename = "bne.un")]
    BneUn(u32),
    #[serde(rename = "bge.un")]
    BgeUn(u32),
    #[serde(rename = "bgt.un")]
    BgtUn(u32),
    #[serde(rename = "ble.un")]
    BleUn(u32),
    #[serde(rename = "blt.un")]
    BltUn(u32),
    #[serde(rename = "switch")]
    Switch(Vec<u32>),
    #[serde(rename = "leave.s")]
    LeaveS(u32),
    #[serde(rename = "leave")]
    Leave(u32),

    // Exception handling
    #[serde(rename = "endfinally", alias = "endfault")]
    Endfinally,
    #[serde(rename = "endfilter")]
    Endfilter,
    #[serde(rename = "throw")]
    Throw,
    #[serde(rename = "rethrow")]
    Rethrow,

    // Indirect access
    #[serde(rename = "ldind.i1")]
    LdindI1,
    #[serde(rename = "ldind.u1")]
    LdindU1,
    #[serde(rename = "ldind.i2")]
    LdindI2,
    #[serde(rename = "ldind.u2")]
    LdindU2,
    #[serde(rename = "ldind.i4")]
    LdindI4,
    #[serde(rename = "ldind.u4")]
    LdindU4,
    #[serde(rename = "ldind.i8")]
    LdindI8,
    #[serde(rename = "ldind.i")]
    LdindI,
    #[serde(rename = "ldind.r4")]
    LdindR4,
    #[serde(rename = "ldind.r8")]
    LdindR8,
    #[serde(rename = "ldind.ref")]
    LdindRef,
    #[serde(rename = "stind.ref")]
    StindRef,
    #[serde(rename = "stind.i1")]
    StindI1,
    #[serde(rename = "stind.i2")]
    StindI2,
    #[serde(rename = "stind.i4")]
    StindI4,
    #[serde(rename = "stind.i8")]
    StindI8,
    #[serde(rename = "stind.r4")]
    StindR4,
    #[serde(rename = "stind.r8")]
    StindR8,
    #[serde(rename = "stind.i")]
    StindI,

    // Arithmetic and comparison
    #[serde(rename = "add")]
    Add,
    #[serde(rename = "add.ovf")]
    AddOvf,
    #[serde(rename = "add.ovf.un")]
    AddOvfUn,
    #[serde(rename = "sub")]
    Sub,
    #[serde(rename = "sub.ovf")]
    SubOvf,
    #[serde(rename = "sub.ovf.un")]
    SubOvfUn,
    #[serde(rename = "mul")]
    Mul,
    #[serde(rename = "mul.ovf")]
    MulOvf,
    #[serde(rename = "mul.ovf.un")]
    MulOvfUn,
    #[serde(rename = "div")]
    Div,
    #[serde(rename = "div.un")]
    DivUn,
    #[serde(rename = "rem")]
    Rem,
    #[serde(rename = "rem.un")]
    RemUn,
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
    #[serde(rename = "xor")]
    Xor,
    #[serde(rename = "shl")]
    Shl,
    #[serde(rename = "shr")]
    Shr,
    #[serde(rename = "shr.un")]
    ShrUn,
    #[serde(rename = "neg")]
    Neg,
    #[serde(rename = "not")]
    Not,
    #[serde(rename = "ceq")]
    Ceq,
    #[serde(rename = "cgt")]
    Cgt,
    #[serde(rename = "cgt.un")]
    CgtUn,
    #[serde(rename = "clt")]
    Clt,
    #[serde(rename = "clt.un")]
    CltUn,
    #[serde(rename = "ckfinite")]
    Ckfinite,

    // Conversions
    #[serde(rename = "conv.i1")]
    ConvI1,
    #[serde(rename = "conv.i2")]
    ConvI2,
    #[serde(rename = "conv.i4")]
    ConvI4,
    #[serde(rename = "conv.i8")]
    ConvI8,
    #[serde(rename = "conv.i")]
    ConvI,
    #[serde(rename = "conv.u1")]
    ConvU1,
    #[serde(rename = "conv.u2")]
    ConvU2,
    #[serde(rename = "conv.u4")]
    ConvU4,
    #[serde(rename = "conv.u8")]
    ConvU8,
    #[serde(rename = "conv.u")]
    ConvU,
    #[serde(rename = "conv.r4")]
    ConvR4,
    #[serde(rename = "conv.r8")]
    ConvR8,
    #[serde(rename = "conv.r.un")]
    ConvRUn,
    #[serde(rename = "conv.ovf.i1")]
    ConvOvfI1,
    #[serde(rename = "conv.ovf.i2")]
    ConvOvfI2,
    #[serde(rename = "conv.ovf.i4")]
    ConvOvfI4,
    #[serde(rename = "conv.ovf.i8")]
    ConvOvfI8,
    #[serde(rename = "conv.ovf.i")]
    ConvOvfI,
    #[serde(rename = "conv.ovf.u1")]
    ConvOvfU1,
    #[serde(rename = "conv.ovf.u2")]
    ConvOvfU2,
    #[serde(rename = "conv.ovf.u4")]
    ConvOvfU4,
    #[serde(rename = "conv.ovf.u8")]
    ConvOvfU8,
    #[serde(rename = "conv.ovf.u")]
    ConvOvfU,
    #[serde(rename = "conv.ovf.i1.un")]
    ConvOvfI1Un,
    #[serde(rename = "conv.ovf.i2.un")]
    ConvOvfI2Un,
    #[serde(rename = "conv.ovf.i4.un")]
    ConvOvfI4Un,
    #[serde(rename = "conv.ovf.i8.un")]
    ConvOvfI8Un,
    #[serde(rename = "conv.ovf.i.un")]
    ConvOvfIUn,
    #[serde(rename = "conv.ovf.u1.un")]
    ConvOvfU1Un,
    #[serde(rename = "conv.ovf.u2.un")]
    ConvOvfU2Un,
    #[serde(rename = "conv.ovf.u4.un")]
    ConvOvfU4Un,
    #[serde(rename = "conv.ovf.u8.un")]
    ConvOvfU8Un,
    #[serde(rename = "conv.ovf.u.un")]
    ConvOvfUUn,

    // Fields
    #[serde(rename = "ldfld")]
    Ldfld(String),
    #[serde(rename = "ldflda")]
    Ldflda(String),
    #[serde(rename = "stfld")]
    Stfld(String),
    #[serde(rename = "ldsfld")]
    Ldsfld(String),
    #[serde(rename = "ldsflda")]
    Ldsflda(String),
    #[serde(rename = "stsfld")]
    Stsfld(String),

    // Objects and value types
    #[serde(rename = "box")]
    Box(String),
    #[serde(rename = "unbox")]
    Unbox(String),
    #[serde(rename = "unbox.any")]
    UnboxAny(String),
    #[serde(rename = "castclass")]
    Castclass(String),
    #[serde(rename = "isinst")]
    Isinst(String),
    #[serde(rename = "initobj")]
    Initobj(String),
    #[serde(rename = "cpobj")]
    Cpobj(String),
    #[serde(rename = "ldobj")]
    Ldobj(String),
    #[serde(rename = "stobj")]
    Stobj(String),
    #[serde(rename = "ldtoken")]
    Ldtoken(String),
    #[serde(rename = "sizeof")]
    Sizeof(String),
    #[serde(rename = "mkrefany")]
    Mkrefany(String),
    #[serde(rename = "refanyval")]
    Refanyval(String),
    #[serde(rename = "refanytype")]
    Refanytype,

    // Arrays
    #[serde(rename = "newarr")]
    Newarr(String),
    #[serde(rename = "ldlen")]
    Ldlen,
    #[serde(rename = "ldelema")]
    Ldelema(String),
    #[serde(rename = "ldelem.i1")]
    LdelemI1,
    #[serde(rename = "ldelem.u1")]
    LdelemU1,
    #[serde(rename = "ldelem.i2")]
    LdelemI2,
    #[serde(rename = "ldelem.u2")]
    LdelemU2,
    #[serde(rename = "ldelem.i4")]
    LdelemI4,
    #[serde(rename = "ldelem.u4")]
    LdelemU4,
    #[serde(rename = "ldelem.i8")]
    LdelemI8,
    #[serde(rename = "ldelem.i")]
    LdelemI,
    #[serde(rename = "ldelem.r4")]
    LdelemR4,
    #[serde(rename = "ldelem.r8")]
    LdelemR8,
    #[serde(rename = "ldelem.ref")]
    LdelemRef,
    #[serde(rename = "ldelem")]
    Ldelem(String),
    #[serde(rename = "stelem.i")]
    StelemI,
    #[serde(rename = "stelem.i1")]
    StelemI1,
    #[serde(rename = "stelem.i2")]
    StelemI2,
    #[serde(rename = "stelem.i4")]
    StelemI4,
    #[serde(rename = "stelem.i8")]
    StelemI8,
    #[serde(rename = "stelem.r4")]
    StelemR4,
    #[serde(rename = "stelem.r8")]
    StelemR8,
    #[serde(rename = "stelem.ref")]
    StelemRef,
    #[serde(rename = "stelem")]
    Stelem(String),

    // Memory blocks
    #[serde(rename = "localloc")]
    Localloc,
    #[serde(rename = "cpblk")]
    Cpblk,
    #[serde(rename = "initblk")]
    Initblk,

    // Prefixes
    #[serde(rename = "constrained.")]
    Constrained(String),
    #[serde(rename = "unaligned.")]
    Unaligned(u8),
    #[serde(rename = "volatile.")]
    Volatile,
    #[serde(rename = "tail.")]
    Tail,
    #[serde(rename = "readonly.")]
    Readonly,
    #[serde(rename = "no.")]
    No(u8),
}

impl OpCode {
    pub fn category(&self) -> OpCategory {
        use OpCode::*;
        match self {
            Nop => OpCategory::Nop,
            Box(_) => OpCategory::Box,
            Unbox(_) => OpCategory::Unbox,
            Ldarg0 => OpCategory::LoadArgShort(0),
            Ldarg1 => OpCategory::LoadArgShort(1),
            Ldarg2 => OpCategory::LoadArgShort(2),
            Ldarg3 => OpCategory::LoadArgShort(3),
            LdargS(index) => OpCategory::LoadArg(u16::from(*index)),
            Ldarg(index) => OpCategory::LoadArg(*index),
            Break | LdargaS(_) | Ldarga(_) | StargS(_) | Starg(_) | Ldloc0 | Ldloc1 | Ldloc2
            | Ldloc3 | LdlocS(_) | Ldloc(_) | LdlocaS(_) | Ldloca(_) | Stloc0 | Stloc1 | Stloc2
            | Stloc3 | StlocS(_) | Stloc(_) | Arglist | Ldnull | LdcI4M1 | LdcI40 | LdcI41 | LdcI42
            | LdcI43 | LdcI44 | LdcI45 | LdcI46 | LdcI47 | LdcI48 | LdcI4S(_) | LdcI4(_) | LdcI8(_)
            | LdcR4(_) | LdcR8(_) | Ldstr(_) | Dup | Pop | Jmp(_) | Call(_) | Calli(_) | Callvirt(_)
            | Newobj(_) | Ldftn(_) | Ldvirtftn(_) | Ret | BrS(_) | BrfalseS(_) | BrtrueS(_)
            | BeqS(_) | BgeS(_) | BgtS(_) | BleS(_) | BltS(_) | BneUnS(_) | BgeUnS(_) | BgtUnS(_)
            | BleUnS(_) | BltUnS(_) | Br(_) | Brfalse(_) | Brtrue(_) | Beq(_) | Bge(_) | Bgt(_)
            | Ble(_) | Blt(_) | BneUn(_) | BgeUn(_) | BgtUn(_) | BleUn(_) | BltUn(_) | Switch(_)
            | LeaveS(_) | Leave(_) | Endfinally | Endfilter | Throw | Rethrow | LdindI1 | LdindU1
            | LdindI2 | LdindU2 | LdindI4 | LdindU4 | LdindI8 | LdindI | LdindR4 | LdindR8
            | LdindRef | StindRef | StindI1 | StindI2 | StindI4 | StindI8 | StindR4 | StindR8
            | StindI | Add | AddOvf | AddOvfUn | Sub | SubOvf | SubOvfUn | Mul | MulOvf | MulOvfUn
            | Div | DivUn | Rem | RemUn | And | Or | Xor | Shl | Shr | ShrUn | Neg | Not | Ceq | Cgt
            | CgtUn | Clt | CltUn | Ckfinite | ConvI1 | ConvI2 | ConvI4 | ConvI8 | ConvI | ConvU1
            | ConvU2 | ConvU4 | ConvU8 | ConvU | ConvR4 | ConvR8 | ConvRUn | ConvOvfI1 | ConvOvfI2
            | ConvOvfI4 | ConvOvfI8 | ConvOvfI | ConvOvfU1 | ConvOvfU2 | ConvOvfU4 | ConvOvfU8
            | ConvOvfU | ConvOvfI1Un | ConvOvfI2Un | ConvOvfI4Un | ConvOvfI8Un | ConvOvfIUn
            | ConvOvfU1Un | ConvOvfU2Un | ConvOvfU4Un | ConvOvfU8Un | ConvOvfUUn | Ldfld(_)
            | Ldflda(_) | Stfld(_) | Ldsfld(_) | Ldsflda(_) | Stsfld(_) | UnboxAny(_) | Castclass(_)
            | Isinst(_) | Initobj(_) | Cpobj(_) | Ldobj(_) | Stobj(_) | Ldtoken(_) | Sizeof(_)
            | Mkrefany(_) | Refanyval(_) | Refanytype | Newarr(_) | Ldlen | Ldelema(_) | LdelemI1
            | LdelemU1 | LdelemI2 | LdelemU2 | LdelemI4 | LdelemU4 | LdelemI8 | LdelemI | LdelemR4
            | LdelemR8 | LdelemRef | Ldelem(_) | StelemI | StelemI1 | StelemI2 | StelemI4 | StelemI8
            | StelemR4 | StelemR8 | StelemRef | Stelem(_) | Localloc | Cpblk | Initblk
            | Constrained(_) | Unaligned(_) | Volatile | Tail | Readonly
            | No(_) => OpCategory::Other,
        }
    }
}

/// A single instruction in a method body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    #[serde(default)]
    pub offset: u32,
    pub op: OpCode,
    /// Debug-symbol line mapping, absent when no sequence point starts here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<SourceLine>,
}

impl Instruction {
    pub fn new(op: OpCode) -> Self {
        Self {
            offset: 0,
            op,
            line: None,
        }
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(SourceLine::from(line));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.line = Some(SourceLine::Hidden);
        self
    }

    pub fn category(&self) -> OpCategory {
        self.op.category()
    }

    /// Whether this instruction loads argument 0, in either encoding.
    ///
    /// In an instance method argument 0 is the receiver (`this`).
    pub fn is_receiver_load(&self) -> bool {
        matches!(
            self.category(),
            OpCategory::LoadArgShort(0) | OpCategory::LoadArg(0)
        )
    }

    /// Compiler-inserted markers and conversions that do not reflect authored code
    pub fn is_elided_from_size(&self) -> bool {
        matches!(
            self.category(),
            OpCategory::Nop | OpCategory::Box | OpCategory::Unbox
        )
    }
}
