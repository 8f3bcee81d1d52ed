//! Script parser
//!
//! One command per line:
//!
//! ```text
//! write   <addr> <byte>...           raw write, payload bytes as given
//! write32 <addr> <int|float>         32-bit word (float literals are f32 bits)
//! write64 <addr> <int|float>         64-bit word (float literals are f64 bits)
//! read    <addr>                     32-bit register read
//! raw     read|write <addr> <byte>...  any shape, including unsupported ones
//! opcode  <slot> <kind> <a> <b> <c>  store an opcode record
//! exec    <op> <dst> <src0> [<src1>] dispatch an operation
//! slot    <slot> <op>                run an EXECUTE_OP slot as <op>
//! reset                              clear registers, opcodes, counters
//! ```

use crate::error::{Result, ScriptError};
use crate::lexer::{tokenize, Token};
use fpu_spec::{BusDirection, BusTransaction, OpcodeKind, OpcodeRecord, OperationId, OperationRequest};
use std::str::FromStr;

/// One parsed script command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Transaction(BusTransaction),
    Opcode { slot: usize, record: OpcodeRecord },
    Execute(OperationRequest),
    ExecuteSlot { slot: usize, op: OperationId },
    Reset,
}

/// A command with its source line
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub command: Command,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub lines: Vec<ScriptLine>,
}

impl Script {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.lines.iter().map(|l| &l.command)
    }
}

/// Parse a whole script. Blank lines and comments are skipped.
pub fn parse_script(source: &str) -> Result<Script> {
    let mut lines = Vec::new();
    for (i, text) in source.lines().enumerate() {
        let line = i + 1;
        let tokens = tokenize(text).map_err(|column| ScriptError::SyntaxError {
            line,
            column,
            message: "Unrecognized character".to_string(),
        })?;
        if tokens.is_empty() {
            continue;
        }
        let command = parse_command(line, &tokens)?;
        lines.push(ScriptLine { line, command });
    }
    Ok(Script { lines })
}

/// Parse one command from its tokens
pub fn parse_command(line: usize, tokens: &[(Token, usize)]) -> Result<Command> {
    let mut cur = Cursor { line, tokens, pos: 0 };
    let name = cur.identifier("command")?.to_ascii_lowercase();

    let command = match name.as_str() {
        "write" => {
            let address = cur.byte("address")?;
            let payload = cur.rest_bytes()?;
            Command::Transaction(BusTransaction::new(BusDirection::Write, address, payload))
        }
        "write32" => {
            let address = cur.byte("address")?;
            let word = cur.word32()?;
            Command::Transaction(BusTransaction::write32(address, word))
        }
        "write64" => {
            let address = cur.byte("address")?;
            let word = cur.word64()?;
            Command::Transaction(BusTransaction::write64(address, word))
        }
        "read" => Command::Transaction(BusTransaction::read(cur.byte("address")?)),
        "raw" => {
            let direction = match cur.identifier("direction")?.to_ascii_lowercase().as_str() {
                "read" | "r" => BusDirection::Read,
                "write" | "w" => BusDirection::Write,
                other => return Err(cur.syntax(format!("Expected read or write, found '{}'", other))),
            };
            let address = cur.byte("address")?;
            let payload = cur.rest_bytes()?;
            Command::Transaction(BusTransaction::new(direction, address, payload))
        }
        "opcode" => {
            let slot = cur.index("slot")?;
            let kind_name = cur.identifier("opcode kind")?;
            let kind = OpcodeKind::from_mnemonic(kind_name).ok_or_else(|| ScriptError::UnknownOpcodeKind {
                line,
                name: kind_name.to_string(),
            })?;
            let a = cur.byte("operand")?;
            let b = cur.byte("operand")?;
            let c = cur.byte("operand")?;
            Command::Opcode {
                slot,
                record: OpcodeRecord::new(kind, a, b, c),
            }
        }
        "exec" => {
            let op = cur.operation()?;
            let destination = cur.index("destination")?;
            let source0 = cur.index("source")?;
            let source1 = if op.is_unary() && cur.at_end() {
                0
            } else {
                cur.index("source")?
            };
            Command::Execute(OperationRequest::new(op, destination, source0, source1))
        }
        "slot" => {
            let slot = cur.index("slot")?;
            let op = cur.operation()?;
            Command::ExecuteSlot { slot, op }
        }
        "reset" => Command::Reset,
        _ => return Err(ScriptError::UnknownCommand { line, name: name.clone() }),
    };

    cur.finish()?;
    Ok(command)
}

struct Cursor<'a> {
    line: usize,
    tokens: &'a [(Token, usize)],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn column(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |(_, c)| *c)
    }

    fn syntax(&self, message: String) -> ScriptError {
        ScriptError::SyntaxError {
            line: self.line,
            column: self.column(),
            message,
        }
    }

    fn invalid(&self, message: String) -> ScriptError {
        ScriptError::InvalidValue {
            line: self.line,
            message,
        }
    }

    fn next(&mut self, what: &str) -> Result<&'a Token> {
        match self.tokens.get(self.pos) {
            Some((token, _)) => {
                self.pos += 1;
                Ok(token)
            }
            None => Err(self.syntax(format!("Expected {}", what))),
        }
    }

    fn identifier(&mut self, what: &str) -> Result<&'a str> {
        match self.next(what)? {
            Token::Identifier(name) => Ok(name.as_str()),
            other => {
                self.pos -= 1;
                Err(self.syntax(format!("Expected {}, found {:?}", what, other)))
            }
        }
    }

    fn integer(&mut self, what: &str) -> Result<u64> {
        match self.next(what)? {
            Token::Hex(value) => Ok(*value),
            Token::Number(value) if *value >= 0 => Ok(*value as u64),
            Token::Number(value) => Err(self.invalid(format!("{} must not be negative: {}", what, value))),
            other => {
                self.pos -= 1;
                Err(self.syntax(format!("Expected {}, found {:?}", what, other)))
            }
        }
    }

    fn byte(&mut self, what: &str) -> Result<u8> {
        let value = self.integer(what)?;
        u8::try_from(value).map_err(|_| self.invalid(format!("{} {} does not fit in a byte", what, value)))
    }

    fn index(&mut self, what: &str) -> Result<usize> {
        let value = self.integer(what)?;
        usize::try_from(value).map_err(|_| self.invalid(format!("{} {} is too large", what, value)))
    }

    fn rest_bytes(&mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        while !self.at_end() {
            bytes.push(self.byte("payload byte")?);
        }
        Ok(bytes)
    }

    /// Parse a float literal (or `inf`/`nan`) directly at the target width
    fn float_literal<T: FromStr>(&mut self) -> Option<T> {
        let text = match self.tokens.get(self.pos) {
            Some((Token::Float(text), _)) => text.as_str(),
            Some((Token::Identifier(name), _))
                if name.eq_ignore_ascii_case("inf") || name.eq_ignore_ascii_case("nan") =>
            {
                name.as_str()
            }
            _ => return None,
        };
        let value = text.parse().ok()?;
        self.pos += 1;
        Some(value)
    }

    fn word32(&mut self) -> Result<u32> {
        if let Some(value) = self.float_literal::<f32>() {
            return Ok(value.to_bits());
        }
        let value = self.integer("value")?;
        u32::try_from(value).map_err(|_| self.invalid(format!("value {:#x} does not fit in 32 bits", value)))
    }

    fn word64(&mut self) -> Result<u64> {
        if let Some(value) = self.float_literal::<f64>() {
            return Ok(value.to_bits());
        }
        self.integer("value")
    }

    fn operation(&mut self) -> Result<OperationId> {
        let name = self.identifier("operation")?;
        OperationId::from_mnemonic(name).ok_or_else(|| ScriptError::UnknownOperation {
            line: self.line,
            name: name.to_string(),
        })
    }

    fn finish(&self) -> Result<()> {
        match self.tokens.get(self.pos) {
            None => Ok(()),
            Some((token, _)) => Err(self.syntax(format!("Unexpected trailing {:?}", token))),
        }
    }
}
