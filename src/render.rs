// Text rendering of dissections
//
// One line per field, children indented under their parent:
//
//   GlusterD Management (1238433/1) PROBE_QUERY Call
//     UUID: abababab-abab-abab-abab-abababababab
//     Hostname: "hostname1"
//     Port: 24007

use std::fmt::{self, Write};

use crate::dispatch::Dissection;
use crate::protocol::dict::Dictionary;
use crate::protocol::fields::{Base, FieldKind, HeaderField};
use crate::protocol::value::{Field, Value};

const INDENT: &str = "  ";

/// `Display` adapter with rendering options
pub struct Render<'a> {
    dissection: &'a Dissection,
    show_offsets: bool,
}

impl<'a> Render<'a> {
    pub fn new(dissection: &'a Dissection) -> Self {
        Self {
            dissection,
            show_offsets: false,
        }
    }

    pub fn show_offsets(mut self, on: bool) -> Self {
        self.show_offsets = on;
        self
    }
}

impl fmt::Display for Render<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dis = self.dissection;
        match dis.program_name {
            Some(name) => write!(f, "{name} ({}/{})", dis.program, dis.version)?,
            None => write!(f, "Program {}/{}", dis.program, dis.version)?,
        }
        match dis.procedure_name {
            Some(name) => write!(f, " {name}")?,
            None => write!(f, " procedure {}", dis.procedure)?,
        }
        writeln!(f, " {}", dis.direction)?;

        if let Some(gap) = &dis.gap {
            writeln!(f, "{INDENT}[{gap}]")?;
        }
        for field in &dis.fields {
            self.field(f, field, 1)?;
        }
        if dis.trailing > 0 {
            writeln!(f, "{INDENT}[{} trailing bytes]", dis.trailing)?;
        }
        Ok(())
    }
}

impl Render<'_> {
    fn field(&self, f: &mut fmt::Formatter<'_>, field: &Field, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            f.write_str(INDENT)?;
        }
        if self.show_offsets {
            write!(f, "[{}+{}] ", field.offset, field.len)?;
        }
        write!(f, "{}", field.info.name)?;

        match &field.value {
            Value::Node(children) => {
                if field.info.kind == FieldKind::List {
                    write!(f, " ({} items)", children.len())?;
                }
                writeln!(f)?;
                for child in children {
                    self.field(f, child, depth + 1)?;
                }
                return Ok(());
            }
            Value::Dict(dict) => {
                writeln!(f, ": {} items", dict.len())?;
                return dict_entries(f, dict, depth + 1);
            }
            value => write!(f, ": {}", format_value(field.info, value))?,
        }
        if let Some(note) = &field.note {
            write!(f, " ({note})")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Dissection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Render::new(self), f)
    }
}

fn dict_entries(f: &mut fmt::Formatter<'_>, dict: &Dictionary, depth: usize) -> fmt::Result {
    for entry in dict.iter() {
        for _ in 0..depth {
            f.write_str(INDENT)?;
        }
        writeln!(f, "{}: {}", entry.key, dict_value(&entry.value))?;
    }
    Ok(())
}

/// Printable values as text (one trailing NUL dropped), anything else as hex
fn dict_value(raw: &[u8]) -> String {
    let text = raw.strip_suffix(&[0]).unwrap_or(raw);
    match std::str::from_utf8(text) {
        Ok(s) if s.chars().all(|c| !c.is_control() || c == '\n' || c == '\t') => {
            format!("{s:?}")
        }
        _ => hex(raw),
    }
}

fn hex(raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len() * 2);
    for b in raw {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Scalar value text, following the field's base and value strings
pub fn format_value(info: &HeaderField, value: &Value) -> String {
    match value {
        Value::U32(v) => integer(info, u64::from(*v), 8, info.lookup(*v)),
        Value::I32(v) => {
            let named = info.lookup(*v as u32);
            match (info.base, named) {
                (Base::Dec | Base::None, None) => v.to_string(),
                (Base::Dec | Base::None, Some(name)) => format!("{name} ({v})"),
                _ => integer(info, u64::from(*v as u32), 8, named),
            }
        }
        Value::U64(v) => integer(info, *v, 16, None),
        Value::Gfid(g) => format_gfid(g),
        Value::Uuid(words) => format_uuid(words),
        Value::Str(s) => format!("{s:?}"),
        Value::Dict(d) => format!("{} items", d.len()),
        Value::Node(children) => format!("{} children", children.len()),
    }
}

fn integer(info: &HeaderField, v: u64, width: usize, named: Option<&str>) -> String {
    let text = match info.base {
        Base::Hex => format!("0x{v:0width$x}"),
        Base::Oct => format!("0{v:o}"),
        Base::Dec | Base::None => v.to_string(),
    };
    match named {
        Some(name) => format!("{name} ({text})"),
        None => text,
    }
}

/// 8-4-4-4-12 hex digits
pub fn format_gfid(g: &[u8; 16]) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        hex(&g[0..4]),
        hex(&g[4..6]),
        hex(&g[6..8]),
        hex(&g[8..10]),
        hex(&g[10..16])
    )
}

/// Each word printed as two (or more) hex digits, grouped 4-2-2-2-6
pub fn format_uuid(words: &[u32; 16]) -> String {
    let group = |r: std::ops::Range<usize>| {
        words[r].iter().fold(String::new(), |mut s, w| {
            let _ = write!(s, "{w:02x}");
            s
        })
    };
    format!(
        "{}-{}-{}-{}-{}",
        group(0..4),
        group(4..6),
        group(6..8),
        group(8..10),
        group(10..16)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Direction, Registry};
    use crate::programs::{GD_MGMT_PROGRAM, GLUSTER3_1_FOP_PROGRAM};
    use crate::protocol::encode::WireWriter;
    use crate::protocol::fields::{CMD, FLAGS, GFSID, IA_DEV, OP, PORT};

    #[test]
    fn test_uuid_grouping() {
        let words: [u32; 16] = std::array::from_fn(|i| i as u32);
        assert_eq!(
            format_uuid(&words),
            "00010203-0405-0607-0809-0a0b0c0d0e0f"
        );
    }

    #[test]
    fn test_gfid_grouping() {
        let g: [u8; 16] = std::array::from_fn(|i| (i as u8) * 0x11);
        assert_eq!(format_gfid(&g), "00112233-4455-6677-8899-aabbccddeeff");
    }

    #[test]
    fn test_integer_bases() {
        assert_eq!(format_value(&FLAGS, &Value::U32(0o644)), "0644");
        assert_eq!(format_value(&IA_DEV, &Value::U64(0x801)), "0x0000000000000801");
        assert_eq!(format_value(&GFSID, &Value::U64(1)), "0x0000000000000001");
        assert_eq!(format_value(&PORT, &Value::I32(-1)), "-1");
        assert_eq!(format_value(&OP, &Value::U32(1)), "CREATE_VOLUME (1)");
        assert_eq!(format_value(&CMD, &Value::I32(2)), "GF_LK_SETLKW (2)");
    }

    #[test]
    fn test_dict_values() {
        assert_eq!(dict_value(b"gv0\0"), "\"gv0\"");
        assert_eq!(dict_value(&[0xff, 0x01]), "ff01");
    }

    #[test]
    fn test_render_probe() {
        let mut w = WireWriter::new();
        w.uuid(&[0; 16]).unwrap().string("hostname1").unwrap().i32(24007).unwrap();
        let buf = w.into_bytes();
        let dis = Registry::builtin()
            .unwrap()
            .dissect(&buf, 0, GD_MGMT_PROGRAM, 1, 1, Direction::Call)
            .unwrap();

        let text = dis.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "GlusterD Management (1238433/1) PROBE_QUERY Call");
        assert!(lines[2].ends_with(": \"hostname1\""), "{}", lines[2]);
        assert!(lines[3].ends_with(": 24007"), "{}", lines[3]);

        let with_offsets = Render::new(&dis).show_offsets(true).to_string();
        assert!(with_offsets.contains("[64+16]"), "{with_offsets}");
    }

    #[test]
    fn test_render_nested_and_notes() {
        let mut w = WireWriter::new();
        w.common(-1, libc::ENOENT).unwrap();
        w.raw(&[0; 200]).unwrap();
        let buf = w.into_bytes();
        let dis = Registry::builtin()
            .unwrap()
            .dissect(&buf, 0, GLUSTER3_1_FOP_PROGRAM, 310, 5, Direction::Reply)
            .unwrap();
        let text = dis.to_string();
        assert!(text.contains("No such file or directory"), "{text}");
        // iatt children sit one level deeper than the iatt itself
        let parent = text.lines().find(|l| l.trim_start().starts_with("PreParent")).unwrap();
        let depth = parent.len() - parent.trim_start().len();
        let next = text.lines().skip_while(|l| *l != parent).nth(1).unwrap();
        assert_eq!(next.len() - next.trim_start().len(), depth + INDENT.len());
    }

    #[test]
    fn test_render_gap() {
        let dis = Registry::builtin()
            .unwrap()
            .dissect(&bytes::Bytes::new(), 0, 7, 1, 3, Direction::Call)
            .unwrap();
        let text = dis.to_string();
        assert!(text.starts_with("Program 7/1 procedure 3 Call"));
        assert!(text.contains("[unknown program 7 version 1]"));
    }
}
