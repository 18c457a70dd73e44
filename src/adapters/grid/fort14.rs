//! fort.14 mesh file reader and writer
//!
//! Layout: a free-text name line, a counts line (`ne np`), `np` node lines
//! (`id x y depth`), `ne` element lines (`id 3 n1 n2 n3`), then the boundary
//! table. The boundary table is carried verbatim; the framework never edits
//! boundaries, it only needs written meshes to round-trip.

use super::{file_label, parse_field};
use crate::domain::errors::GridError;
use crate::domain::ids::NodeId;
use crate::domain::mesh::{Element, Mesh, Node};
use crate::domain::Result;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Reads a mesh from a fort.14 file
pub fn read_mesh(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(GridError::FileNotFound(path.display().to_string()).into());
    }
    let file = file_label(path);
    let contents = fs::read_to_string(path)?;
    let mut lines = contents.lines().enumerate();

    let (_, name_line) = lines.next().ok_or_else(|| GridError::Truncated {
        file: file.clone(),
        record: 0,
    })?;
    let name = name_line.trim().to_string();

    let (line_no, counts_line) = lines.next().ok_or_else(|| GridError::Truncated {
        file: file.clone(),
        record: 0,
    })?;
    let mut fields = counts_line.split_whitespace();
    let element_count: usize = parse_field(fields.next(), &file, line_no + 1, "element count")?;
    let node_count: usize = parse_field(fields.next(), &file, line_no + 1, "node count")?;

    let mut nodes = Vec::with_capacity(node_count);
    for i in 0..node_count {
        let (line_no, line) = lines.next().ok_or(GridError::Truncated {
            file: file.clone(),
            record: i,
        })?;
        let mut fields = line.split_whitespace();
        let id: u32 = parse_field(fields.next(), &file, line_no + 1, "node id")?;
        if id as usize != i + 1 {
            return Err(GridError::Malformed {
                file,
                line: line_no + 1,
                message: format!("node ids must be contiguous from 1, got {id}"),
            }
            .into());
        }
        let x: f64 = parse_field(fields.next(), &file, line_no + 1, "x coordinate")?;
        let y: f64 = parse_field(fields.next(), &file, line_no + 1, "y coordinate")?;
        let depth: f64 = parse_field(fields.next(), &file, line_no + 1, "depth")?;
        nodes.push(Node { x, y, depth });
    }

    let mut elements = Vec::with_capacity(element_count);
    for i in 0..element_count {
        let (line_no, line) = lines.next().ok_or(GridError::Truncated {
            file: file.clone(),
            record: node_count + i,
        })?;
        let mut fields = line.split_whitespace();
        let _id: u32 = parse_field(fields.next(), &file, line_no + 1, "element id")?;
        let vertex_count: usize =
            parse_field(fields.next(), &file, line_no + 1, "vertex count")?;
        if vertex_count != 3 {
            return Err(GridError::Malformed {
                file,
                line: line_no + 1,
                message: format!("only triangular elements supported, got {vertex_count} vertices"),
            }
            .into());
        }
        let mut vertices = [NodeId::from_index(0); 3];
        for v in &mut vertices {
            let raw: u32 = parse_field(fields.next(), &file, line_no + 1, "node reference")?;
            *v = NodeId::new(raw).map_err(|message| GridError::Malformed {
                file: file.clone(),
                line: line_no + 1,
                message,
            })?;
        }
        elements.push(Element { nodes: vertices });
    }

    let boundary_lines: Vec<String> = lines.map(|(_, l)| l.to_string()).collect();

    let mesh = Mesh {
        name,
        nodes,
        elements,
        boundary_lines,
    };
    mesh.validate()?;
    Ok(mesh)
}

/// Writes a mesh to a fort.14 file
pub fn write_mesh(path: impl AsRef<Path>, mesh: &Mesh) -> Result<()> {
    let mut out = fs::File::create(path.as_ref())?;
    writeln!(out, "{}", mesh.name)?;
    writeln!(out, "{} {}", mesh.element_count(), mesh.node_count())?;
    for (i, node) in mesh.nodes.iter().enumerate() {
        writeln!(
            out,
            "{} {:.8} {:.8} {:.8}",
            i + 1,
            node.x,
            node.y,
            node.depth
        )?;
    }
    for (i, element) in mesh.elements.iter().enumerate() {
        writeln!(
            out,
            "{} 3 {} {} {}",
            i + 1,
            element.nodes[0],
            element.nodes[1],
            element.nodes[2]
        )?;
    }
    for line in &mesh.boundary_lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
