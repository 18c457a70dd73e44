//! fort.13 nodal attribute file support
//!
//! The run framework only cares about one attribute,
//! `mannings_n_at_sea_floor`: it reads the default value and the exception
//! table from an existing file, and writes complete single-attribute files
//! for generated roughness fields.
//!
//! Layout: header line, node count, attribute count, then per attribute a
//! declaration block (name, units, values-per-node, default), then per
//! attribute an exception block (name, exception count, `node value` lines).

use super::{file_label, parse_field};
use crate::domain::errors::GridError;
use crate::domain::Result;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::iter::Enumerate;
use std::path::Path;
use std::str::Lines;

/// The nodal attribute holding Manning's n roughness
pub const MANNING_ATTRIBUTE: &str = "mannings_n_at_sea_floor";

/// Exceptions smaller than this are folded into the default on write
const WRITE_EPSILON: f64 = 1e-12;

/// Parsed view of one attribute in a fort.13 file
#[derive(Debug, Clone)]
pub struct NodalAttribute {
    pub default: f64,
    /// Node id (1-based) to value, for nodes that differ from the default
    pub exceptions: BTreeMap<u32, f64>,
}

fn next_line<'a>(
    lines: &mut Enumerate<Lines<'a>>,
    file: &str,
    record: usize,
) -> Result<(usize, &'a str)> {
    lines
        .next()
        .map(|(n, l)| (n + 1, l))
        .ok_or_else(|| {
            GridError::Truncated {
                file: file.to_string(),
                record,
            }
            .into()
        })
}

/// Reads the Manning's n attribute from a fort.13 file
pub fn read_manning(path: impl AsRef<Path>) -> Result<NodalAttribute> {
    read_attribute(path, MANNING_ATTRIBUTE)
}

/// Reads the default Manning's n value only
pub fn read_manning_default(path: impl AsRef<Path>) -> Result<f64> {
    Ok(read_manning(path)?.default)
}

/// Reads a named attribute from a fort.13 file
pub fn read_attribute(path: impl AsRef<Path>, name: &str) -> Result<NodalAttribute> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(GridError::FileNotFound(path.display().to_string()).into());
    }
    let file = file_label(path);
    let contents = fs::read_to_string(path)?;
    let mut lines = contents.lines().enumerate();

    let _header = next_line(&mut lines, &file, 0)?;
    let (line_no, count_line) = next_line(&mut lines, &file, 0)?;
    let _node_count: usize = parse_field(
        count_line.split_whitespace().next(),
        &file,
        line_no,
        "node count",
    )?;
    let (line_no, attr_line) = next_line(&mut lines, &file, 0)?;
    let attr_count: usize = parse_field(
        attr_line.split_whitespace().next(),
        &file,
        line_no,
        "attribute count",
    )?;

    // Declaration blocks: name, units, values-per-node, default(s)
    let mut defaults: BTreeMap<String, f64> = BTreeMap::new();
    for i in 0..attr_count {
        let (_, name_line) = next_line(&mut lines, &file, i)?;
        let attr_name = name_line.trim().to_string();
        let _units = next_line(&mut lines, &file, i)?;
        let (line_no, dims_line) = next_line(&mut lines, &file, i)?;
        let dims: usize = parse_field(
            dims_line.split_whitespace().next(),
            &file,
            line_no,
            "values per node",
        )?;
        let (line_no, default_line) = next_line(&mut lines, &file, i)?;
        let default: f64 = parse_field(
            default_line.split_whitespace().next(),
            &file,
            line_no,
            "default value",
        )?;
        if dims == 1 {
            defaults.insert(attr_name, default);
        }
    }

    let default = *defaults
        .get(name)
        .ok_or_else(|| GridError::MissingAttribute(name.to_string()))?;

    // Exception blocks: name, count, node/value lines
    for i in 0..attr_count {
        let (_, name_line) = next_line(&mut lines, &file, i)?;
        let attr_name = name_line.trim().to_string();
        let (line_no, count_line) = next_line(&mut lines, &file, i)?;
        let exception_count: usize = parse_field(
            count_line.split_whitespace().next(),
            &file,
            line_no,
            "exception count",
        )?;
        let mut exceptions = BTreeMap::new();
        for j in 0..exception_count {
            let (line_no, line) = next_line(&mut lines, &file, j)?;
            let mut fields = line.split_whitespace();
            let node: u32 = parse_field(fields.next(), &file, line_no, "node id")?;
            let value: f64 = parse_field(fields.next(), &file, line_no, "attribute value")?;
            exceptions.insert(node, value);
        }
        if attr_name == name {
            return Ok(NodalAttribute {
                default,
                exceptions,
            });
        }
    }

    Err(GridError::MissingAttribute(name.to_string()).into())
}

/// Writes a single-attribute fort.13 for a generated Manning's n field
///
/// Nodes whose value matches the default are left to the default; the rest
/// go into the exception table. `field` is indexed by 0-based node index.
pub fn write_manning_field(
    path: impl AsRef<Path>,
    header: &str,
    default: f64,
    field: &[f64],
) -> Result<()> {
    let mut out = fs::File::create(path.as_ref())?;
    writeln!(out, "{header}")?;
    writeln!(out, "{}", field.len())?;
    writeln!(out, "1")?;
    writeln!(out, "{MANNING_ATTRIBUTE}")?;
    writeln!(out, "unitless")?;
    writeln!(out, "1")?;
    writeln!(out, "{default:.6}")?;
    let exceptions: Vec<(usize, f64)> = field
        .iter()
        .enumerate()
        .filter(|(_, v)| (**v - default).abs() > WRITE_EPSILON)
        .map(|(i, v)| (i + 1, *v))
        .collect();
    writeln!(out, "{MANNING_ATTRIBUTE}")?;
    writeln!(out, "{}", exceptions.len())?;
    for (node, value) in exceptions {
        writeln!(out, "{node} {value:.6}")?;
    }
    Ok(())
}
