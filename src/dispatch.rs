// Procedure dispatch
//
// The `Registry` is built once from the static program tables and is then
// read-only; it is shared by reference (or `Arc`) between any number of
// threads. `dissect` is the only entry point: bytes, offset and the
// (program, version, procedure, direction) identity in, a field tree and
// the consumed offset out.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::dissector::{DecodeOptions, Dissector};
use crate::programs::{ProcedureDecoder, ProgramTable, TABLES};
use crate::protocol::cursor::ByteCursor;
use crate::protocol::error::DecodeResult;
use crate::protocol::fields::{self, DuplicateField, FieldRegistry};
use crate::protocol::value::{self, Field};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Call,
    Reply,
    /// Reply rejected before the procedure ran
    ErrorReply,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "call" => Ok(Direction::Call),
            "reply" => Ok(Direction::Reply),
            "error" | "error-reply" => Ok(Direction::ErrorReply),
            other => Err(format!("unknown direction '{other}' (call, reply, error)")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Call => f.write_str("Call"),
            Direction::Reply => f.write_str("Reply"),
            Direction::ErrorReply => f.write_str("Error reply"),
        }
    }
}

/// Why a payload was left undecoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gap {
    UnknownProgram {
        program: u32,
        version: u32,
    },
    UnknownProcedure {
        program: u32,
        version: u32,
        procedure: u32,
    },
    NotImplemented {
        program: u32,
        version: u32,
        procedure: u32,
    },
}

impl fmt::Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gap::UnknownProgram { program, version } => {
                write!(f, "unknown program {program} version {version}")
            }
            Gap::UnknownProcedure {
                program,
                version,
                procedure,
            } => write!(f, "unknown procedure {procedure} in {program}/{version}"),
            Gap::NotImplemented {
                program,
                version,
                procedure,
            } => write!(f, "no decoder for procedure {procedure} in {program}/{version}"),
        }
    }
}

/// Result of one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dissection {
    pub program: u32,
    pub version: u32,
    pub procedure: u32,
    pub direction: Direction,
    pub program_name: Option<&'static str>,
    pub procedure_name: Option<&'static str>,
    pub start: usize,
    /// Offset just past the last decoded field
    pub end: usize,
    pub fields: Vec<Field>,
    pub gap: Option<Gap>,
    /// Bytes left in the buffer after the decoder finished
    pub trailing: usize,
}

impl Dissection {
    pub fn find(&self, abbrev: &str) -> Option<&Field> {
        value::find(&self.fields, abbrev)
    }

    pub fn consumed(&self) -> usize {
        self.end - self.start
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    DuplicateField(#[from] DuplicateField),

    #[error("program {program} version {version} registered twice")]
    DuplicateProgram { program: u32, version: u32 },

    #[error("procedure {procedure} listed twice in {program}/{version}")]
    DuplicateProcedure {
        program: u32,
        version: u32,
        procedure: u32,
    },
}

pub struct Registry {
    tables: HashMap<(u32, u32), &'static ProgramTable>,
    fields: FieldRegistry,
    options: DecodeOptions,
}

impl Registry {
    /// Every built-in program with default decode options
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::with_options(DecodeOptions::default())
    }

    pub fn with_options(options: DecodeOptions) -> Result<Self, RegistryError> {
        Self::from_tables(TABLES, options)
    }

    pub fn from_tables(
        tables: &[&'static ProgramTable],
        options: DecodeOptions,
    ) -> Result<Self, RegistryError> {
        let mut map = HashMap::with_capacity(tables.len());
        for table in tables {
            let mut seen = std::collections::HashSet::new();
            for p in table.procedures {
                if !seen.insert(p.number) {
                    return Err(RegistryError::DuplicateProcedure {
                        program: table.program,
                        version: table.version,
                        procedure: p.number,
                    });
                }
            }
            if map.insert((table.program, table.version), *table).is_some() {
                return Err(RegistryError::DuplicateProgram {
                    program: table.program,
                    version: table.version,
                });
            }
        }
        let fields = FieldRegistry::build(fields::ALL)?;
        debug!(
            "Registry built: {} programs, {} fields",
            map.len(),
            fields.len()
        );
        Ok(Self {
            tables: map,
            fields,
            options,
        })
    }

    pub fn table(&self, program: u32, version: u32) -> Option<&'static ProgramTable> {
        self.tables.get(&(program, version)).copied()
    }

    /// Tables ordered by program then version
    pub fn tables(&self) -> Vec<&'static ProgramTable> {
        let mut all: Vec<_> = self.tables.values().copied().collect();
        all.sort_by_key(|t| (t.program, t.version));
        all
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode one message body starting at `offset`.
    ///
    /// Unknown and undecodable procedures return `Ok` with `gap` set and
    /// `end == start`. Only a body that contradicts its grammar is an error.
    pub fn dissect(
        &self,
        buf: &Bytes,
        offset: usize,
        program: u32,
        version: u32,
        procedure: u32,
        direction: Direction,
    ) -> DecodeResult<Dissection> {
        let cur = ByteCursor::at(buf.clone(), offset)?;

        let mut dis = Dissection {
            program,
            version,
            procedure,
            direction,
            program_name: None,
            procedure_name: None,
            start: offset,
            end: offset,
            fields: Vec::new(),
            gap: None,
            trailing: 0,
        };

        let Some(table) = self.table(program, version) else {
            debug!("No table for program {}/{}", program, version);
            dis.gap = Some(Gap::UnknownProgram { program, version });
            return Ok(dis);
        };
        dis.program_name = Some(table.name);

        let Some(desc) = table.procedure(procedure) else {
            debug!("{}: no procedure {}", table.name, procedure);
            dis.gap = Some(Gap::UnknownProcedure {
                program,
                version,
                procedure,
            });
            return Ok(dis);
        };
        dis.procedure_name = Some(desc.name);

        let decoder = match direction {
            Direction::Call => desc.call,
            Direction::Reply => desc.reply,
            Direction::ErrorReply => ProcedureDecoder::Implemented(table.error_reply),
        };
        let ProcedureDecoder::Implemented(decode) = decoder else {
            debug!("{} {} {}: not decoded", table.name, desc.name, direction);
            dis.gap = Some(Gap::NotImplemented {
                program,
                version,
                procedure,
            });
            return Ok(dis);
        };

        debug!(
            "Dissecting {} {} {} at offset {}",
            table.name, desc.name, direction, offset
        );

        let mut d = Dissector::new(cur, &self.options);
        if let Err(e) = decode(&mut d) {
            warn!("{} {} {}: {}", table.name, desc.name, direction, e);
            return Err(e);
        }

        dis.end = d.offset();
        dis.trailing = d.remaining();
        dis.fields = d.into_fields();
        if dis.trailing > 0 {
            warn!(
                "{} {} {}: {} trailing bytes after offset {}",
                table.name, desc.name, direction, dis.trailing, dis.end
            );
        }
        Ok(dis)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("tables", &self.tables.len())
            .field("fields", &self.fields.len())
            .field("options", &self.options)
            .finish()
    }
}
